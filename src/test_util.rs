//! Helpers shared by the unit tests.

use parking_lot::Once;

static SET_LOGGER_ONCE: Once = Once::new();

/// Installs the env_logger backend once per process.
///
/// Call at the start of tests that emit logs, then run with
/// `RUST_LOG=trace` to see them.
pub(crate) fn init() { SET_LOGGER_ONCE.call_once(env_logger::init); }
