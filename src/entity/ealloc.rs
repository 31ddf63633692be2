//! Entity id allocation and recycling.
//!
//! Ids are issued from a monotonic gauge starting at 1. Released ids are kept
//! in a sorted list of coalesced half-open ranges and reissued front-first,
//! so long-lived worlds churn through a small id prefix instead of growing
//! the sparse pages of every table forever.

use super::{Entity, EntityRange, NULL_ENTITY};

/// Issues and recycles entity ids.
///
/// The allocator tracks liveness only in aggregate: every id in `(0, last]`
/// is either held by the caller or sits in exactly one free range. It does
/// not know *which* table an id is attached to, and it trusts callers not to
/// release an id twice (debug-checked).
#[derive(Debug, Default)]
pub struct EntityAlloc {
    /// The largest id ever issued. 0 before the first allocation.
    last: Entity,
    /// Released ids, sorted by `begin`, non-empty, non-overlapping and
    /// non-adjacent.
    free: Vec<EntityRange>,
}

impl EntityAlloc {
    /// Creates an allocator that has issued nothing yet.
    pub fn new() -> Self { Self::default() }

    /// Issues one entity id.
    ///
    /// Recycles the lowest released id if any, otherwise advances the gauge.
    /// Never returns 0 or [`NULL_ENTITY`].
    ///
    /// # Panics
    /// Panics if the 32-bit id space is exhausted.
    pub fn add(&mut self) -> Entity {
        if let Some(head) = self.free.first_mut() {
            let entity = head.begin;
            head.begin += 1;
            let drained = head.is_empty();
            if drained {
                self.free.remove(0);
            }
            entity
        } else {
            self.last += 1;
            assert!(self.last != NULL_ENTITY, "entity id space exhausted");
            self.last
        }
    }

    /// Issues `count` contiguous ids as one range.
    ///
    /// Takes the front of the first free range large enough, otherwise
    /// extends the gauge. Free ranges are not combined to satisfy a request,
    /// so a fragmented free list can grow the gauge even while holding more
    /// than `count` ids in total.
    ///
    /// # Panics
    /// Panics if the 32-bit id space is exhausted.
    pub fn add_range(&mut self, count: Entity) -> EntityRange {
        if let Some(index) = self.free.iter().position(|range| range.len() >= count) {
            let range = &mut self.free[index];
            let allocated = EntityRange::new(range.begin, range.begin + count);
            range.begin += count;
            let drained = range.is_empty();
            if drained {
                self.free.remove(index);
            }
            return allocated;
        }

        let new_last = self.last.checked_add(count).expect("entity id space exhausted");
        assert!(new_last != NULL_ENTITY, "entity id space exhausted");
        let allocated = EntityRange::new(self.last + 1, new_last + 1);
        log::trace!("entity gauge grown to {new_last} for a range of {count}");
        self.last = new_last;
        allocated
    }

    /// Releases one entity id for reuse.
    ///
    /// Releasing the most recently issued id unwinds the gauge directly; the
    /// free list is not consulted, so ranges freed earlier that become
    /// adjacent to the gauge stay in the list. Any other id is merged into an
    /// adjacent free range, or inserted as a new single-id range.
    ///
    /// The id must be live: issued, not already released (debug-checked).
    pub fn remove(&mut self, entity: Entity) {
        debug_assert!(
            entity != 0 && entity <= self.last,
            "entity {entity} was never issued by this allocator"
        );
        debug_assert!(
            self.free.iter().all(|range| !range.contains(entity)),
            "entity {entity} released twice"
        );

        if entity == self.last {
            self.last -= 1;
            return;
        }

        let index = self.free.partition_point(|range| range.begin <= entity);
        let extends_prev = index > 0 && self.free[index - 1].end == entity;
        let extends_next =
            index < self.free.len() && self.free[index].begin == entity + 1;
        match (extends_prev, extends_next) {
            // the released id bridges its two neighbours into one range
            (true, true) => {
                self.free[index - 1].end = self.free[index].end;
                self.free.remove(index);
            }
            (true, false) => self.free[index - 1].end += 1,
            (false, true) => self.free[index].begin -= 1,
            (false, false) => {
                self.free.insert(index, EntityRange::new(entity, entity + 1));
            }
        }
    }

    /// Releases a whole range of ids for reuse.
    ///
    /// Same policy as [`remove`](Self::remove): a range ending at the gauge
    /// unwinds it, anything else is merged into adjacent free ranges or
    /// inserted whole.
    ///
    /// Every id in the range must be live (debug-checked).
    pub fn remove_range(&mut self, range: EntityRange) {
        if range.is_empty() {
            return;
        }
        debug_assert!(
            range.begin != 0 && range.end <= self.last + 1,
            "range {range} was never issued by this allocator"
        );
        debug_assert!(
            self.free
                .iter()
                .all(|free| free.end <= range.begin || free.begin >= range.end),
            "range {range} overlaps already released ids"
        );

        if range.end - 1 == self.last {
            self.last = range.begin - 1;
            return;
        }

        let index = self.free.partition_point(|free| free.begin <= range.begin);
        let extends_prev = index > 0 && self.free[index - 1].end == range.begin;
        let extends_next = index < self.free.len() && self.free[index].begin == range.end;
        match (extends_prev, extends_next) {
            (true, true) => {
                self.free[index - 1].end = self.free[index].end;
                self.free.remove(index);
            }
            (true, false) => self.free[index - 1].end = range.end,
            (false, true) => self.free[index].begin = range.begin,
            (false, false) => self.free.insert(index, range),
        }
    }

    /// The largest id issued so far, 0 if none.
    pub fn last(&self) -> Entity { self.last }
}
