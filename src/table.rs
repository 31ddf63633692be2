//! Component tables: the shared surface and the two concrete flavors.

use std::cmp;
use std::ops::ControlFlow;

use xias::Xias;

use crate::entity::{Entity, EntityIndex, EntityRange};
use crate::sparse::SparseIndex;

mod dense;
pub use dense::DenseTable;

mod stable;
pub use stable::{Iter as StableIter, IterMut as StableIterMut, StableTable};


/// The operations shared by [`DenseTable`] and [`StableTable`].
///
/// Systems that do not care about address stability can be written against
/// this trait; each instantiation monomorphizes to the concrete table, so
/// there is no dynamic dispatch on the hot path.
///
/// An entity is *present* once [`add`](Table::add) succeeded and until
/// [`remove`](Table::remove)/[`extract`](Table::extract) ran for it.
/// Operations without a `try_` prefix treat presence preconditions as
/// programmer errors: violations are debug-checked and panic on the sentinel
/// index in release builds.
pub trait Table {
    /// The component type stored in the table.
    type Comp;

    /// Whether component addresses survive unrelated mutations.
    const STABLE: bool;

    /// Number of components currently stored.
    fn count(&self) -> EntityIndex;

    /// Whether the table stores nothing.
    fn is_empty(&self) -> bool { self.count() == 0 }

    /// Whether `entity` is present.
    fn exists(&self, entity: Entity) -> bool;

    /// Attaches `component` to `entity` and returns it.
    ///
    /// `entity` must not be present (debug-checked).
    fn add(&mut self, entity: Entity, component: Self::Comp) -> &mut Self::Comp;

    /// Attaches `component` to `entity`, overwriting (and dropping) the
    /// previous component if `entity` is already present.
    fn try_add(&mut self, entity: Entity, component: Self::Comp) -> &mut Self::Comp;

    /// Updates the component of `entity` in place through `update`,
    /// inserting a default-constructed component first if absent.
    ///
    /// The closure always receives a fully initialized component.
    fn try_add_with(
        &mut self,
        entity: Entity,
        update: impl FnOnce(&mut Self::Comp),
    ) -> &mut Self::Comp
    where
        Self::Comp: Default;

    /// Attaches a clone of `component` to every entity in `range`.
    ///
    /// No entity in the range may be present (debug-checked).
    fn add_range(&mut self, range: EntityRange, component: &Self::Comp)
    where
        Self::Comp: Clone;

    /// Attaches `fill(entity)` to every entity in `range`.
    ///
    /// No entity in the range may be present (debug-checked).
    fn add_range_with(&mut self, range: EntityRange, fill: impl FnMut(Entity) -> Self::Comp);

    /// Detaches and drops the component of `entity`.
    ///
    /// `entity` must be present (debug-checked).
    fn remove(&mut self, entity: Entity);

    /// Detaches the component of `entity` if present; returns whether it was.
    fn try_remove(&mut self, entity: Entity) -> bool;

    /// Detaches the components of every present entity in `range`.
    /// Absent entities in the range are skipped.
    fn remove_range(&mut self, range: EntityRange);

    /// Detaches the component of `entity` and returns it by move.
    ///
    /// `entity` must be present (debug-checked).
    fn extract(&mut self, entity: Entity) -> Self::Comp;

    /// The component of `entity`, which must be present.
    fn get(&self, entity: Entity) -> &Self::Comp;

    /// The component of `entity` mutably, which must be present.
    fn get_mut(&mut self, entity: Entity) -> &mut Self::Comp;

    /// The current index of `entity`, or [`NULL_INDEX`](crate::NULL_INDEX)
    /// if absent. The index is invalidated by whatever invalidates indices in
    /// this table flavor (any mutation for dense, removal/pack for stable).
    fn get_unstable(&self, entity: Entity) -> EntityIndex;

    /// The component at `index`, which must be occupied.
    fn at_index(&self, index: EntityIndex) -> &Self::Comp;

    /// The component at `index` mutably, which must be occupied.
    fn at_index_mut(&mut self, index: EntityIndex) -> &mut Self::Comp;

    /// The entity list backing the table, indexed by component index.
    ///
    /// For a stable table this includes tombstone slots, which read as
    /// [`NULL_ENTITY`](crate::NULL_ENTITY).
    fn entities(&self) -> &[Entity];

    /// Return value of [`iter`](Table::iter).
    type Iter<'t>: Iterator<Item = &'t Self::Comp>
    where
        Self: 't;

    /// Iterates over the stored components in index order.
    fn iter(&self) -> Self::Iter<'_>;

    /// Return value of [`iter_mut`](Table::iter_mut).
    type IterMut<'t>: Iterator<Item = &'t mut Self::Comp>
    where
        Self: 't;

    /// Iterates mutably over the stored components in index order.
    fn iter_mut(&mut self) -> Self::IterMut<'_>;

    /// Calls `f` with every present entity, in index order.
    fn for_each_entity(&self, f: impl FnMut(Entity));

    /// Calls `f` with every present entity and its component.
    fn for_each(&self, f: impl FnMut(Entity, &Self::Comp));

    /// Calls `f` with every present entity and its component, mutably.
    fn for_each_mut(&mut self, f: impl FnMut(Entity, &mut Self::Comp));

    /// Like [`for_each`](Table::for_each), stopping at the first `Break`.
    fn traverse(&self, f: impl FnMut(Entity, &Self::Comp) -> ControlFlow<()>);

    /// Like [`for_each_mut`](Table::for_each_mut), stopping at the first
    /// `Break`.
    fn traverse_mut(&mut self, f: impl FnMut(Entity, &mut Self::Comp) -> ControlFlow<()>);

    /// Reorders the table so that entities are sorted by the strict
    /// "less-than" predicate `cmp`.
    ///
    /// The predicate sees entity ids only; it must not touch the table being
    /// sorted. To order by component value use [`sort_by`](Table::sort_by).
    ///
    /// On a stable table this packs first and therefore invalidates
    /// component addresses.
    fn sort(&mut self, cmp: impl FnMut(Entity, Entity) -> bool);

    /// Reorders the table so that components are sorted under `cmp`.
    fn sort_by(&mut self, cmp: impl FnMut(&Self::Comp, &Self::Comp) -> cmp::Ordering);

    /// Drops every component while keeping allocated buffers.
    fn clear(&mut self);

    /// Drops every component and frees all backing buffers.
    fn release(&mut self);
}

/// Re-aligns component positions and the sparse index after `entities` has
/// been permuted.
///
/// On entry `indices` still maps each entity to the position its component
/// physically occupies (the pre-permutation one). The walk follows each
/// permutation cycle once, swapping components into place and patching the
/// index as it goes, so the whole fix-up is `O(n)` swaps with three scalars
/// of state and no allocation. On exit `indices.get(entities[i]) == i` for
/// every position and `swap` has been driven accordingly.
///
/// `swap(a, b)` must exchange the components at positions `a` and `b` and
/// tolerate `a == b`.
pub(crate) fn chase_swap_cycles<const PAGE_SIZE: usize>(
    entities: &[Entity],
    indices: &mut SparseIndex<PAGE_SIZE>,
    mut swap: impl FnMut(EntityIndex, EntityIndex),
) {
    for position in 0..entities.len() {
        let mut current = position;
        let mut next = indices.get(entities[current]).small_int::<usize>();
        while current != next {
            let following = indices.get(entities[next]).small_int::<usize>();
            swap(next.small_int::<EntityIndex>(), following.small_int::<EntityIndex>());
            indices.assign(entities[current], current.small_int::<EntityIndex>());
            current = next;
            next = following;
        }
    }
}

/// Adapts a strict "less-than" entity predicate into the total ordering the
/// standard sort requires. Equal-under-`cmp` pairs compare `Equal`, so the
/// 1.81+ sort never observes an inconsistent comparator.
pub(crate) fn order_from_less(
    mut less: impl FnMut(Entity, Entity) -> bool,
) -> impl FnMut(&Entity, &Entity) -> cmp::Ordering {
    move |&a, &b| {
        if less(a, b) {
            cmp::Ordering::Less
        } else if less(b, a) {
            cmp::Ordering::Greater
        } else {
            cmp::Ordering::Equal
        }
    }
}
