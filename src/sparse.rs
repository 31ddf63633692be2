//! Paged mapping from entity ids to component positions.

use xias::Xias;

use crate::entity::{Entity, EntityIndex, NULL_INDEX};

/// A sparse array of [`EntityIndex`] values keyed by entity id.
///
/// Storage is split into pages of `PAGE_SIZE` slots, materialized only when a
/// key in their range is first inserted. Entity ids tend to populate a dense
/// prefix of the id space, so the page list stays short without reserving
/// `O(max_id)` memory up front.
///
/// Every slot holds either a mapped index or [`NULL_INDEX`]; a missing page
/// reads as all-null. `PAGE_SIZE` must be a nonzero power of two.
pub struct SparseIndex<const PAGE_SIZE: usize = 1024> {
    pages: Vec<Option<Box<[EntityIndex; PAGE_SIZE]>>>,
}

impl<const PAGE_SIZE: usize> Default for SparseIndex<PAGE_SIZE> {
    fn default() -> Self { Self::new() }
}

impl<const PAGE_SIZE: usize> SparseIndex<PAGE_SIZE> {
    const VALID_PAGE: () = assert!(
        PAGE_SIZE > 0 && PAGE_SIZE.is_power_of_two(),
        "page size must be a nonzero power of two"
    );

    /// Creates an empty index with no pages allocated.
    pub fn new() -> Self {
        // monomorphization-time page size validation
        let () = Self::VALID_PAGE;
        Self { pages: Vec::new() }
    }

    fn page_of(key: Entity) -> usize { key.small_int::<usize>() / PAGE_SIZE }

    fn slot_of(key: Entity) -> usize { key.small_int::<usize>() & (PAGE_SIZE - 1) }

    /// Returns the slot for `key`, materializing its page if missing.
    fn slot_mut(&mut self, key: Entity) -> &mut EntityIndex {
        let page_index = Self::page_of(key);
        if self.pages.len() <= page_index {
            self.pages.resize_with(page_index + 1, || None);
        }
        let page = self.pages[page_index]
            .get_or_insert_with(|| Box::new([NULL_INDEX; PAGE_SIZE]));
        &mut page[Self::slot_of(key)]
    }

    /// Maps `key` to `value`.
    ///
    /// `value` must not be [`NULL_INDEX`] and `key` must be unmapped, both
    /// debug-checked. Use [`assign`](Self::assign) to overwrite.
    pub fn insert(&mut self, key: Entity, value: EntityIndex) {
        debug_assert!(value != NULL_INDEX, "cannot insert the null index");
        let slot = self.slot_mut(key);
        debug_assert!(*slot == NULL_INDEX, "key {key} is already mapped");
        *slot = value;
    }

    /// Maps `key` to `value` whether or not it was mapped, returning the
    /// previous value (possibly [`NULL_INDEX`]).
    pub fn assign(&mut self, key: Entity, value: EntityIndex) -> EntityIndex {
        debug_assert!(value != NULL_INDEX, "cannot assign the null index");
        let slot = self.slot_mut(key);
        std::mem::replace(slot, value)
    }

    /// Looks up `key`, returning [`NULL_INDEX`] if unmapped.
    pub fn get(&self, key: Entity) -> EntityIndex {
        match self.pages.get(Self::page_of(key)) {
            Some(Some(page)) => page[Self::slot_of(key)],
            _ => NULL_INDEX,
        }
    }

    /// Whether `key` is currently mapped.
    pub fn contains(&self, key: Entity) -> bool { self.get(key) != NULL_INDEX }

    /// Unmaps `key`. The key must be mapped (debug-checked).
    pub fn remove(&mut self, key: Entity) {
        let slot = self.slot_mut(key);
        debug_assert!(*slot != NULL_INDEX, "key {key} is not mapped");
        *slot = NULL_INDEX;
    }

    /// Unmaps `key` and returns the value it held.
    ///
    /// The key must be mapped (debug-checked); on violation in release builds
    /// this returns [`NULL_INDEX`], which every caller in this crate turns
    /// into an out-of-bounds panic rather than silent corruption.
    pub fn extract(&mut self, key: Entity) -> EntityIndex {
        let slot = self.slot_mut(key);
        debug_assert!(*slot != NULL_INDEX, "key {key} is not mapped");
        std::mem::replace(slot, NULL_INDEX)
    }

    /// Unmaps every key while keeping all pages allocated.
    ///
    /// The initializer value *is* the sentinel, so clearing is a page refill
    /// with no per-key bookkeeping.
    pub fn clear(&mut self) {
        for page in self.pages.iter_mut().flatten() {
            page.fill(NULL_INDEX);
        }
    }

    /// Drops every page, returning the index to its freshly-created state.
    pub fn release(&mut self) {
        self.pages.clear();
        self.pages.shrink_to_fit();
    }
}
