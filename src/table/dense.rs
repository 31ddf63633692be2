use std::cmp;
use std::ops::ControlFlow;
use std::slice;

use xias::Xias;

use super::{chase_swap_cycles, order_from_less, Table};
use crate::entity::{Entity, EntityIndex, EntityRange, NULL_INDEX};
use crate::sparse::SparseIndex;

/// A packed component table with unstable indices.
///
/// Components live in one contiguous vector, parallel to the entity list;
/// the sparse index maps an entity to its current position. Removal swaps
/// the last component into the vacated slot, so positions returned by
/// [`get_unstable`](Table::get_unstable) and references into the table are
/// invalidated by any mutation.
///
/// `PAGE_SIZE` is the sparse-index page width, a nonzero power of two.
pub struct DenseTable<C, const PAGE_SIZE: usize = 1024> {
    indices:    SparseIndex<PAGE_SIZE>,
    entities:   Vec<Entity>,
    components: Vec<C>,
}

impl<C, const PAGE_SIZE: usize> Default for DenseTable<C, PAGE_SIZE> {
    fn default() -> Self { Self::new() }
}

impl<C, const PAGE_SIZE: usize> DenseTable<C, PAGE_SIZE> {
    /// Creates an empty table with no buffers allocated.
    pub fn new() -> Self {
        Self {
            indices:    SparseIndex::new(),
            entities:   Vec::new(),
            components: Vec::new(),
        }
    }

    /// The packed component slice, indexed by unstable index.
    pub fn components(&self) -> &[C] { &self.components }

    fn position(&self, entity: Entity) -> usize {
        let index = self.indices.get(entity);
        debug_assert!(
            index != NULL_INDEX,
            "entity {entity} has no component in this table"
        );
        index.small_int::<usize>()
    }

    /// Asserts the packed/sparse alignment that must hold between any two
    /// public operations.
    #[cfg(test)]
    pub(crate) fn check_consistency(&self) {
        assert_eq!(self.entities.len(), self.components.len(), "lockstep broken");
        for (position, &entity) in self.entities.iter().enumerate() {
            assert_eq!(
                self.indices.get(entity).small_int::<usize>(),
                position,
                "sparse index misaligned for entity {entity}"
            );
        }
    }
}

impl<C, const PAGE_SIZE: usize> Table for DenseTable<C, PAGE_SIZE> {
    type Comp = C;

    const STABLE: bool = false;

    fn count(&self) -> EntityIndex { self.entities.len().small_int::<EntityIndex>() }

    fn exists(&self, entity: Entity) -> bool { self.indices.contains(entity) }

    fn add(&mut self, entity: Entity, component: C) -> &mut C {
        debug_assert!(
            !self.indices.contains(entity),
            "entity {entity} already has a component in this table"
        );
        let index = self.components.len().small_int::<EntityIndex>();
        self.indices.insert(entity, index);
        self.entities.push(entity);
        self.components.push(component);
        self.components.last_mut().expect("just pushed")
    }

    fn try_add(&mut self, entity: Entity, component: C) -> &mut C {
        let index = self.indices.get(entity);
        if index != NULL_INDEX {
            let slot = &mut self.components[index.small_int::<usize>()];
            *slot = component;
            slot
        } else {
            self.add(entity, component)
        }
    }

    fn try_add_with(&mut self, entity: Entity, update: impl FnOnce(&mut C)) -> &mut C
    where
        C: Default,
    {
        let index = self.indices.get(entity);
        if index != NULL_INDEX {
            let slot = &mut self.components[index.small_int::<usize>()];
            update(slot);
            slot
        } else {
            let mut component = C::default();
            update(&mut component);
            self.add(entity, component)
        }
    }

    fn add_range(&mut self, range: EntityRange, component: &C)
    where
        C: Clone,
    {
        self.add_range_with(range, |_| component.clone());
    }

    fn add_range_with(&mut self, range: EntityRange, mut fill: impl FnMut(Entity) -> C) {
        let extra = range.len().small_int::<usize>();
        self.entities.reserve(extra);
        self.components.reserve(extra);
        for entity in range {
            debug_assert!(
                !self.indices.contains(entity),
                "entity {entity} already has a component in this table"
            );
            let index = self.components.len().small_int::<EntityIndex>();
            self.indices.insert(entity, index);
            self.entities.push(entity);
            self.components.push(fill(entity));
        }
    }

    fn remove(&mut self, entity: Entity) {
        let _ = self.extract(entity);
    }

    fn try_remove(&mut self, entity: Entity) -> bool {
        if self.indices.contains(entity) {
            self.remove(entity);
            true
        } else {
            false
        }
    }

    fn remove_range(&mut self, range: EntityRange) {
        let mut holes: Vec<EntityIndex> = Vec::new();
        for entity in range {
            if self.indices.contains(entity) {
                holes.push(self.indices.extract(entity));
            }
        }
        if holes.is_empty() {
            return;
        }
        log::trace!(
            "bulk-removing {} of {} dense components",
            holes.len(),
            self.entities.len()
        );
        holes.sort_unstable_by(|a, b| b.cmp(a));

        // Compact the live tail into the holes, largest first. `source` only
        // passes over live slots because every hole above it was consumed in
        // an earlier iteration; it wraps below zero exactly when the table
        // empties, and the final bump-up restores the length either way.
        let mut source =
            self.entities.len().small_int::<EntityIndex>().wrapping_sub(1);
        for &hole in &holes {
            if source != hole {
                self.components
                    .swap(source.small_int::<usize>(), hole.small_int::<usize>());
                let moved = self.entities[source.small_int::<usize>()];
                self.entities[hole.small_int::<usize>()] = moved;
                self.indices.assign(moved, hole);
            }
            source = source.wrapping_sub(1);
        }
        let new_len = source.wrapping_add(1).small_int::<usize>();
        self.entities.truncate(new_len);
        self.components.truncate(new_len);
    }

    fn extract(&mut self, entity: Entity) -> C {
        let index = self.indices.extract(entity).small_int::<usize>();
        self.entities.swap_remove(index);
        let component = self.components.swap_remove(index);
        if index < self.entities.len() {
            self.indices
                .assign(self.entities[index], index.small_int::<EntityIndex>());
        }
        component
    }

    fn get(&self, entity: Entity) -> &C { &self.components[self.position(entity)] }

    fn get_mut(&mut self, entity: Entity) -> &mut C {
        let position = self.position(entity);
        &mut self.components[position]
    }

    fn get_unstable(&self, entity: Entity) -> EntityIndex { self.indices.get(entity) }

    fn at_index(&self, index: EntityIndex) -> &C {
        &self.components[index.small_int::<usize>()]
    }

    fn at_index_mut(&mut self, index: EntityIndex) -> &mut C {
        &mut self.components[index.small_int::<usize>()]
    }

    fn entities(&self) -> &[Entity] { &self.entities }

    type Iter<'t> = slice::Iter<'t, C>
    where
        Self: 't;

    fn iter(&self) -> Self::Iter<'_> { self.components.iter() }

    type IterMut<'t> = slice::IterMut<'t, C>
    where
        Self: 't;

    fn iter_mut(&mut self) -> Self::IterMut<'_> { self.components.iter_mut() }

    fn for_each_entity(&self, mut f: impl FnMut(Entity)) {
        for &entity in &self.entities {
            f(entity);
        }
    }

    fn for_each(&self, mut f: impl FnMut(Entity, &C)) {
        for (&entity, component) in self.entities.iter().zip(&self.components) {
            f(entity, component);
        }
    }

    fn for_each_mut(&mut self, mut f: impl FnMut(Entity, &mut C)) {
        for (&entity, component) in self.entities.iter().zip(&mut self.components) {
            f(entity, component);
        }
    }

    fn traverse(&self, mut f: impl FnMut(Entity, &C) -> ControlFlow<()>) {
        for (&entity, component) in self.entities.iter().zip(&self.components) {
            if f(entity, component).is_break() {
                break;
            }
        }
    }

    fn traverse_mut(&mut self, mut f: impl FnMut(Entity, &mut C) -> ControlFlow<()>) {
        for (&entity, component) in self.entities.iter().zip(&mut self.components) {
            if f(entity, component).is_break() {
                break;
            }
        }
    }

    fn sort(&mut self, cmp: impl FnMut(Entity, Entity) -> bool) {
        self.entities.sort_unstable_by(order_from_less(cmp));
        let Self { indices, entities, components } = self;
        chase_swap_cycles(entities.as_slice(), indices, |a, b| {
            components.swap(a.small_int::<usize>(), b.small_int::<usize>());
        });
    }

    fn sort_by(&mut self, mut cmp: impl FnMut(&C, &C) -> cmp::Ordering) {
        {
            let indices = &self.indices;
            let components = &self.components;
            self.entities.sort_unstable_by(|&a, &b| {
                cmp(
                    &components[indices.get(a).small_int::<usize>()],
                    &components[indices.get(b).small_int::<usize>()],
                )
            });
        }
        let Self { indices, entities, components } = self;
        chase_swap_cycles(entities.as_slice(), indices, |a, b| {
            components.swap(a.small_int::<usize>(), b.small_int::<usize>());
        });
    }

    fn clear(&mut self) {
        self.components.clear();
        self.entities.clear();
        self.indices.clear();
    }

    fn release(&mut self) {
        self.clear();
        self.components.shrink_to_fit();
        self.entities.shrink_to_fit();
        self.indices.release();
    }
}
