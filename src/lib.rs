//! Cache-friendly component storage for entity-component-system runtimes.
//!
//! sparsec provides the storage layer of an ECS and nothing else: the
//! per-component tables that map opaque entity ids to component values, and
//! the allocator that hands out those ids. Scheduling, queries and event
//! dispatch belong to the layer above; this crate only assumes that a single
//! logical owner drives each table at a time.
//!
//! # Two table flavors
//!
//! Both tables are sparse sets: a paged [`SparseIndex`] maps an entity id to
//! the position of its component, so existence checks and lookups are O(1)
//! regardless of how ids are distributed.
//!
//! [`DenseTable`] keeps components in one packed vector. Iteration is a plain
//! slice walk and removal swaps the last element into the hole, so component
//! positions (and addresses) are *unstable* across mutation. Use it for
//! components that are cheap to move and iterated in bulk.
//!
//! [`StableTable`] keeps components in fixed-size pages and never moves them
//! on removal; the vacated slot becomes a tombstone that later insertions
//! reuse. A component's address holds until that entity is removed or
//! [`pack`](StableTable::pack) compacts the table. Use it for components
//! referenced by address or expensive to move.
//!
//! The shared surface of both lives in the [`Table`] trait, so systems can be
//! generic over the flavor without paying for dynamic dispatch.
//!
//! # Entity allocation
//!
//! [`EntityAlloc`] issues ids starting from 1, recycling released ids from a
//! sorted list of coalesced free ranges. Ids carry no generation counter:
//! reuse hands back the raw id, and it is the caller's job not to hold on to
//! ids it released.
//!
//! ```
//! use sparsec::{DenseTable, EntityAlloc, Table};
//!
//! let mut alloc = EntityAlloc::default();
//! let mut healths = DenseTable::<u32>::default();
//!
//! let goblin = alloc.add();
//! healths.add(goblin, 7);
//! *healths.get_mut(goblin) -= 3;
//! assert_eq!(*healths.get(goblin), 4);
//!
//! healths.remove(goblin);
//! alloc.remove(goblin);
//! ```
//!
//! # What mutation is allowed when
//!
//! Tables are single-writer: while any reference or iterator into a table is
//! alive, no mutating operation may run. In Rust this is not a convention but
//! the borrow checker's job, which is why the iterator types borrow the whole
//! table. Precondition violations (adding a present entity, removing an
//! absent one) are programmer errors checked by `debug_assert!`; release
//! builds fail on the out-of-bounds sentinel index instead.

#![warn(missing_docs)]

pub mod entity;
pub use entity::{
    ealloc::EntityAlloc, Entity, EntityIndex, EntityRange, NULL_ENTITY, NULL_INDEX,
};

pub mod sparse;
pub use sparse::SparseIndex;

pub mod table;
pub use table::{DenseTable, StableTable, Table};

#[cfg(test)]
mod test_util;
