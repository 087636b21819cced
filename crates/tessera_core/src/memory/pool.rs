//! # Linear Pool
//!
//! Dense, growable storage for items of one type behind stable 1-based
//! identifiers.

use std::fmt;
use std::marker::PhantomData;

use super::handle::{Identifier, OptionalView, PoolId, View};
use crate::config::PoolConfig;
use crate::error::{PoolError, PoolResult};

/// Items that decide when their slot may be reclaimed.
pub trait Disposable {
    /// Releases the item's resources.
    ///
    /// Called by every dispose pass while the item is queued for destruction.
    /// Returning `false` keeps the item queued (and readable) until a later
    /// pass, e.g. while external references are still alive.
    fn destroy(&mut self) -> bool {
        true
    }
}

/// How a pool decides whether a queued item can be reclaimed.
pub trait ReclaimPolicy<T> {
    /// Whether [`ReclaimPolicy::ready`] runs an item hook.
    const CALLS_DESTROY: bool;

    /// Returns true once `item` may be reset and its slot reused.
    fn ready(item: &mut T) -> bool;
}

/// Reclaim policy that asks [`Disposable::destroy`] first.
#[derive(Clone, Copy, Debug, Default)]
pub struct DestroyItems;

/// Reclaim policy that resets queued items unconditionally.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResetItems;

impl<T: Disposable> ReclaimPolicy<T> for DestroyItems {
    const CALLS_DESTROY: bool = true;

    #[inline]
    fn ready(item: &mut T) -> bool {
        item.destroy()
    }
}

impl<T> ReclaimPolicy<T> for ResetItems {
    const CALLS_DESTROY: bool = false;

    #[inline]
    fn ready(_item: &mut T) -> bool {
        true
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SlotState {
    Free,
    Live,
    Pending,
}

#[derive(Clone, Copy, Debug)]
struct Slot {
    generation: u32,
    state: SlotState,
}

/// Item array with a linear memory block.
///
/// Items live in one contiguous `Vec<T>` so iteration over the backing data
/// stays cache-friendly. Every slot is in exactly one state:
///
/// - **live**: created and readable
/// - **pending**: queued by [`destroy`](Self::destroy), still fully readable
/// - **free**: reclaimed by [`dispose`](Self::dispose), reset to `T::default()`
///   and waiting on the free stack
///
/// Free slots are handed out LIFO before the block grows; the block doubles
/// when full. A live item never moves to another index, but a reclaimed
/// index is reused by the next creation, so identifiers carry the slot
/// generation and every access checks it.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. Wrap the owner in a lock for cross-thread use.
///
/// # Example
///
/// ```rust,ignore
/// let mut pool: LinearPool<Particle, ResetItems> = LinearPool::new();
///
/// let id = pool.create(Particle::default())?;
/// pool.get_mut(id).life = 1.0;
///
/// pool.destroy(id)?;   // queued, still readable
/// pool.dispose()?;     // slot reset and reusable
/// ```
pub struct LinearPool<T, P = DestroyItems> {
    /// The backing block.
    items: Vec<T>,
    /// Generation and state of every slot in `items`.
    slots: Vec<Slot>,
    /// 1-based indices of reclaimed slots, reused LIFO.
    free_items: Vec<u32>,
    /// Items queued for destruction.
    garbage_items: Vec<Identifier<T>>,
    /// Logical capacity; doubles on growth.
    capacity: usize,
    initial_capacity: usize,
    /// Bumped on growth, destruction and clear.
    version: u64,
    /// Bumped on clear; views from an older epoch are stale.
    epoch: u32,
    /// Generation given to newly appended slots. Raised past every issued
    /// generation on clear.
    base_generation: u32,
    id: PoolId,
    /// Structural mutation currently running, if any.
    changing: Option<&'static str>,
    _policy: PhantomData<fn() -> P>,
}

impl<T: Default, P: ReclaimPolicy<T>> LinearPool<T, P> {
    /// Creates an empty pool with a single reserved slot.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(PoolConfig::compact())
    }

    /// Creates an empty pool sized by `config`.
    ///
    /// A zero capacity is treated as one.
    #[must_use]
    pub fn with_config(config: PoolConfig) -> Self {
        let capacity = config.initial_capacity.max(1);
        Self {
            items: Vec::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
            free_items: Vec::new(),
            garbage_items: Vec::new(),
            capacity,
            initial_capacity: capacity,
            version: 0,
            epoch: 0,
            base_generation: 0,
            id: PoolId::next(),
            changing: None,
            _policy: PhantomData,
        }
    }

    /// Creates a new item in the pool.
    ///
    /// Reuses the most recently reclaimed slot if there is one, otherwise
    /// appends, doubling the block when it is full.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::MutationInProgress`] if an earlier structural
    /// mutation of this pool never completed.
    pub fn create(&mut self, item: T) -> PoolResult<Identifier<T>> {
        self.create_with(|| item)
    }

    /// Creates a new default-constructed item.
    ///
    /// # Errors
    ///
    /// See [`create`](Self::create).
    pub fn create_default(&mut self) -> PoolResult<Identifier<T>> {
        self.create_with(T::default)
    }

    /// Creates a new item built by `init` inside the mutation guard.
    ///
    /// If `init` panics the pool stays marked as changing and rejects every
    /// later structural mutation.
    ///
    /// # Errors
    ///
    /// See [`create`](Self::create).
    pub fn create_with(&mut self, init: impl FnOnce() -> T) -> PoolResult<Identifier<T>> {
        self.begin("creation")?;

        let id = if let Some(index) = self.free_items.pop() {
            let slot = index as usize - 1;
            self.items[slot] = init();
            let meta = &mut self.slots[slot];
            meta.state = SlotState::Live;
            Identifier::new(index, meta.generation)
        } else {
            assert!(
                self.items.len() < u32::MAX as usize,
                "linear pool exhausted the 32-bit index space"
            );
            if self.items.len() == self.capacity {
                self.grow();
            }
            self.items.push(init());
            self.slots.push(Slot {
                generation: self.base_generation,
                state: SlotState::Live,
            });
            Identifier::new(self.occupancy(), self.base_generation)
        };

        self.end();
        Ok(id)
    }

    /// Queues an item for destruction.
    ///
    /// Memory is untouched: the item stays readable until a dispose pass
    /// reclaims it, so this is safe while other code on the same thread is
    /// walking the pool's data. Destroying the null identifier does nothing.
    ///
    /// # Errors
    ///
    /// - [`PoolError::AlreadyDestroyed`] if the item is already queued
    /// - an identifier error if `id` does not name an allocated item
    /// - [`PoolError::MutationInProgress`] if the pool is poisoned
    pub fn destroy(&mut self, id: Identifier<T>) -> PoolResult<()> {
        if id.is_null() {
            return Ok(());
        }

        self.begin("destruction")?;
        let result = self.queue_garbage(id);
        self.end();
        result
    }

    fn queue_garbage(&mut self, id: Identifier<T>) -> PoolResult<()> {
        let slot = self.locate(id)?;
        let meta = &mut self.slots[slot];
        if meta.state == SlotState::Pending {
            return Err(PoolError::AlreadyDestroyed { index: id.index() });
        }
        meta.state = SlotState::Pending;
        self.garbage_items.push(id);
        self.version += 1;
        Ok(())
    }

    /// Reclaims queued items whose [`ReclaimPolicy`] reports them ready.
    ///
    /// Ready items are reset to `T::default()` and their slots pushed to the
    /// free stack; the rest stay queued for the next pass. Returns the number
    /// of reclaimed items. A pass with nothing queued does no work.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::MutationInProgress`] if the pool is poisoned.
    pub fn dispose(&mut self) -> PoolResult<usize> {
        self.dispose_with(|_, item| P::ready(item))
    }

    /// Like [`dispose`](Self::dispose), with the readiness decision made by `ready`.
    ///
    /// Owners whose items need outside context to tear down (the registry
    /// releasing an entity's components, for instance) use this instead of a
    /// [`Disposable`] impl.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::MutationInProgress`] if the pool is poisoned.
    pub fn dispose_with(
        &mut self,
        mut ready: impl FnMut(Identifier<T>, &mut T) -> bool,
    ) -> PoolResult<usize> {
        if self.garbage_items.is_empty() {
            return Ok(0);
        }

        self.begin("dispose")?;

        let mut reclaimed = 0;
        let mut i = self.garbage_items.len();
        while i > 0 {
            i -= 1;
            let id = self.garbage_items[i];
            let slot = id.slot();
            if !ready(id, &mut self.items[slot]) {
                continue;
            }

            self.items[slot] = T::default();
            let meta = &mut self.slots[slot];
            meta.state = SlotState::Free;
            meta.generation = meta.generation.wrapping_add(1);
            self.free_items.push(id.index());
            self.garbage_items.swap_remove(i);
            reclaimed += 1;
        }

        self.end();
        Ok(reclaimed)
    }

    /// Drops every item and shrinks the block back to its initial size.
    ///
    /// With `destroy` set, the destroy hook of every allocated item runs
    /// first; its result is ignored. All views become stale. Meant for
    /// shutdown.
    ///
    /// # Errors
    ///
    /// - [`PoolError::NoDestroyHook`] if `destroy` is set but the policy has no hook
    /// - [`PoolError::MutationInProgress`] if the pool is poisoned
    pub fn clear(&mut self, destroy: bool) -> PoolResult<()> {
        if destroy && !P::CALLS_DESTROY {
            return Err(PoolError::NoDestroyHook);
        }

        self.begin("clear")?;

        if destroy {
            for (item, meta) in self.items.iter_mut().zip(&self.slots) {
                if meta.state != SlotState::Free {
                    let _ = P::ready(item);
                }
            }
        }

        if let Some(newest) = self.slots.iter().map(|meta| meta.generation).max() {
            self.base_generation = newest.wrapping_add(1);
        }
        self.items = Vec::with_capacity(self.initial_capacity);
        self.slots = Vec::with_capacity(self.initial_capacity);
        self.free_items.clear();
        self.garbage_items.clear();
        self.capacity = self.initial_capacity;
        self.version += 1;
        self.epoch = self.epoch.wrapping_add(1);

        tracing::debug!(pool = ?self.id, epoch = self.epoch, "linear pool cleared");

        self.end();
        Ok(())
    }
}

impl<T, P> LinearPool<T, P> {
    fn begin(&mut self, operation: &'static str) -> PoolResult<()> {
        if let Some(active) = self.changing {
            return Err(PoolError::MutationInProgress { operation, active });
        }
        self.changing = Some(operation);
        Ok(())
    }

    #[inline]
    fn end(&mut self) {
        self.changing = None;
    }

    fn grow(&mut self) {
        let additional = self.capacity;
        self.items.reserve_exact(additional);
        self.slots.reserve_exact(additional);
        self.capacity += additional;
        self.version += 1;
    }

    /// Validates `id` and returns its 0-based slot.
    fn locate(&self, id: Identifier<T>) -> PoolResult<usize> {
        if id.is_null() {
            return Err(PoolError::NullIdentifier);
        }
        let slot = id.slot();
        let Some(meta) = self.slots.get(slot) else {
            return Err(PoolError::OutOfBounds {
                index: id.index(),
                occupancy: self.occupancy(),
            });
        };
        if meta.generation != id.generation() {
            return Err(PoolError::StaleIdentifier {
                index: id.index(),
                expected: id.generation(),
                actual: meta.generation,
            });
        }
        if meta.state == SlotState::Free {
            return Err(PoolError::NotAllocated { index: id.index() });
        }
        Ok(slot)
    }

    /// Checks that `id` names an allocated (live or pending) item.
    ///
    /// # Errors
    ///
    /// Returns the identifier error describing why the access would fail.
    pub fn validate(&self, id: Identifier<T>) -> PoolResult<()> {
        self.locate(id).map(|_| ())
    }

    /// Returns the item.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not name an allocated item of this pool. Use
    /// [`try_get`](Self::try_get) when that is an expected outcome.
    #[inline]
    #[must_use]
    pub fn get(&self, id: Identifier<T>) -> &T {
        match self.locate(id) {
            Ok(slot) => &self.items[slot],
            Err(err) => panic!("invalid linear pool access: {err}"),
        }
    }

    /// Returns the item mutably.
    ///
    /// # Panics
    ///
    /// Same conditions as [`get`](Self::get).
    #[inline]
    pub fn get_mut(&mut self, id: Identifier<T>) -> &mut T {
        match self.locate(id) {
            Ok(slot) => &mut self.items[slot],
            Err(err) => panic!("invalid linear pool access: {err}"),
        }
    }

    /// Returns the item, or `None` if `id` is null, stale or reclaimed.
    #[inline]
    #[must_use]
    pub fn try_get(&self, id: Identifier<T>) -> Option<&T> {
        self.locate(id).ok().map(|slot| &self.items[slot])
    }

    /// Returns the item mutably, or `None` if `id` is null, stale or reclaimed.
    #[inline]
    pub fn try_get_mut(&mut self, id: Identifier<T>) -> Option<&mut T> {
        let slot = self.locate(id).ok()?;
        Some(&mut self.items[slot])
    }

    /// Returns a checked [`View`] of the item.
    ///
    /// # Panics
    ///
    /// Same conditions as [`get`](Self::get).
    #[must_use]
    pub fn view(&self, id: Identifier<T>) -> View<T> {
        if let Err(err) = self.locate(id) {
            panic!("invalid linear pool access: {err}");
        }
        self.make_view(id)
    }

    /// Returns a checked [`View`] of the item, or `None` if `id` is not allocated.
    #[must_use]
    pub fn try_view(&self, id: Identifier<T>) -> OptionalView<T> {
        self.locate(id).ok().map(|_| self.make_view(id))
    }

    fn make_view(&self, id: Identifier<T>) -> View<T> {
        View {
            id,
            pool: self.id,
            epoch: self.epoch,
        }
    }

    fn resolve(&self, view: &View<T>) -> PoolResult<usize> {
        if view.pool != self.id {
            return Err(PoolError::ForeignView);
        }
        let stale = PoolError::StaleView {
            index: view.id.index(),
        };
        if view.epoch != self.epoch || view.id.is_null() {
            return Err(stale);
        }
        match self.slots.get(view.id.slot()) {
            Some(meta)
                if meta.generation == view.id.generation() && meta.state != SlotState::Free =>
            {
                Ok(view.id.slot())
            }
            _ => Err(stale),
        }
    }

    /// Reads the item behind `view`.
    ///
    /// # Errors
    ///
    /// - [`PoolError::StaleView`] if the slot was reclaimed or the pool cleared
    /// - [`PoolError::ForeignView`] if the view came from another pool
    pub fn get_view(&self, view: &View<T>) -> PoolResult<&T> {
        self.resolve(view).map(|slot| &self.items[slot])
    }

    /// Mutable counterpart of [`get_view`](Self::get_view).
    ///
    /// # Errors
    ///
    /// See [`get_view`](Self::get_view).
    pub fn get_view_mut(&mut self, view: &View<T>) -> PoolResult<&mut T> {
        let slot = self.resolve(view)?;
        Ok(&mut self.items[slot])
    }

    /// Returns the identifier of the allocated item at 0-based `slot`.
    #[must_use]
    pub fn identifier_at(&self, slot: usize) -> Option<Identifier<T>> {
        let meta = self.slots.get(slot)?;
        (meta.state != SlotState::Free).then(|| slot_id(slot, meta))
    }

    /// Returns true if `id` names an allocated item (live or pending).
    #[inline]
    #[must_use]
    pub fn contains(&self, id: Identifier<T>) -> bool {
        self.locate(id).is_ok()
    }

    /// Returns true if `id` names a live item that is not queued for destruction.
    #[must_use]
    pub fn is_live(&self, id: Identifier<T>) -> bool {
        self.locate(id)
            .is_ok_and(|slot| self.slots[slot].state == SlotState::Live)
    }

    /// Returns true if `id` names an item queued for destruction.
    #[must_use]
    pub fn is_pending(&self, id: Identifier<T>) -> bool {
        self.locate(id)
            .is_ok_and(|slot| self.slots[slot].state == SlotState::Pending)
    }

    /// Returns the number of allocated items, queued ones included.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len() - self.free_items.len()
    }

    /// Returns true if no item is allocated.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of slots ever handed out, free ones included.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn occupancy(&self) -> u32 {
        self.items.len() as u32
    }

    /// Returns the logical capacity of the block.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the structural version.
    #[inline]
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns the tag views of this pool carry.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> PoolId {
        self.id
    }

    /// Returns the items queued for destruction.
    #[inline]
    #[must_use]
    pub fn garbage(&self) -> &[Identifier<T>] {
        &self.garbage_items
    }

    /// Returns the whole backing block.
    ///
    /// Reclaimed slots hold `T::default()`; pending ones hold their last value.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Iterates over allocated items with their identifiers.
    pub fn iter(&self) -> impl Iterator<Item = (Identifier<T>, &T)> {
        self.items
            .iter()
            .zip(&self.slots)
            .enumerate()
            .filter(|(_, (_, meta))| meta.state != SlotState::Free)
            .map(|(slot, (item, meta))| (slot_id(slot, meta), item))
    }

    /// Iterates mutably over allocated items with their identifiers.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Identifier<T>, &mut T)> {
        self.items
            .iter_mut()
            .zip(&self.slots)
            .enumerate()
            .filter(|(_, (_, meta))| meta.state != SlotState::Free)
            .map(|(slot, (item, meta))| (slot_id(slot, meta), item))
    }
}

#[inline]
#[allow(clippy::cast_possible_truncation)]
fn slot_id<T>(slot: usize, meta: &Slot) -> Identifier<T> {
    Identifier::new(slot as u32 + 1, meta.generation)
}

impl<T> View<T> {
    /// Resolves the view against `pool`. See [`LinearPool::get_view`].
    ///
    /// # Errors
    ///
    /// [`PoolError::ForeignView`] or [`PoolError::StaleView`].
    pub fn get<'a, P>(&self, pool: &'a LinearPool<T, P>) -> PoolResult<&'a T> {
        pool.get_view(self)
    }

    /// Resolves the view mutably against `pool`.
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub fn get_mut<'a, P>(&self, pool: &'a mut LinearPool<T, P>) -> PoolResult<&'a mut T> {
        pool.get_view_mut(self)
    }
}

impl<T: Default, P: ReclaimPolicy<T>> Default for LinearPool<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P> fmt::Debug for LinearPool<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinearPool")
            .field("id", &self.id)
            .field("len", &self.len())
            .field("occupancy", &self.items.len())
            .field("capacity", &self.capacity)
            .field("garbage", &self.garbage_items.len())
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}
