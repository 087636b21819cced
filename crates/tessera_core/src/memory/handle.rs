//! # Pool Handles
//!
//! Ways to name an item in a [`LinearPool`](super::LinearPool) without
//! holding a pointer into its storage:
//!
//! - [`Identifier`]: 1-based slot index plus the slot generation it was issued for
//! - [`View`]: an identifier bound to one pool instance, checked on every access
//! - [`Reference`]: an identifier with a shared usage counter
//!
//! None of them borrow the pool. Resolve to `&T` at the point of use and let
//! the reference go before the next structural mutation.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};
use std::sync::Arc;

/// Item identifier in a linear pool.
///
/// The index is `slot + 1`; index `0` is the null identifier. Equality,
/// ordering and hashing look at the index only, so an identifier compares
/// equal to a newer one for the same slot. The generation is used by the pool
/// to reject accesses through identifiers whose slot has been reclaimed.
///
/// A non-null identifier is not necessarily a valid one.
pub struct Identifier<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Identifier<T> {
    /// The null identifier.
    pub const NULL: Self = Self {
        index: 0,
        generation: 0,
        _marker: PhantomData,
    };

    #[inline]
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// Returns the 1-based index of the item.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Returns the slot generation this identifier was issued for.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// Returns true for the null identifier.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.index == 0
    }

    /// 0-based slot position. Only meaningful for non-null identifiers.
    #[inline]
    pub(crate) const fn slot(self) -> usize {
        self.index as usize - 1
    }

    /// Reinterprets the identifier as one for another item type.
    ///
    /// Nothing is checked: use it to narrow a base handle to the concrete
    /// type that is known out-of-band, and back.
    #[inline]
    #[must_use]
    pub const fn cast<U>(self) -> Identifier<U> {
        Identifier::new(self.index, self.generation)
    }
}

impl<T> Clone for Identifier<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Identifier<T> {}

impl<T> Default for Identifier<T> {
    fn default() -> Self {
        Self::NULL
    }
}

impl<T> PartialEq for Identifier<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Identifier<T> {}

impl<T> PartialOrd for Identifier<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Identifier<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index.cmp(&other.index)
    }
}

impl<T> Hash for Identifier<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> fmt::Debug for Identifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("Identifier(null)")
        } else {
            write!(f, "Identifier({}v{})", self.index, self.generation)
        }
    }
}

/// Process-unique tag of a pool instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PoolId(u32);

impl PoolId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(1);
        Self(NEXT.fetch_add(1, AtomicOrdering::Relaxed))
    }
}

/// Checked accessor for an item in one specific pool.
///
/// A view remembers the pool it came from, the slot generation and the pool
/// epoch. [`View::get`] fails with [`PoolError::StaleView`](crate::PoolError::StaleView)
/// once the slot has been reclaimed or the pool cleared, instead of reading
/// whatever occupies the slot now. Growth does not invalidate views.
pub struct View<T> {
    pub(crate) id: Identifier<T>,
    pub(crate) pool: PoolId,
    pub(crate) epoch: u32,
}

/// A view that may be absent.
pub type OptionalView<T> = Option<View<T>>;

impl<T> View<T> {
    /// Returns the identifier the view was created for.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> Identifier<T> {
        self.id
    }

    /// Returns the pool that issued this view.
    #[inline]
    #[must_use]
    pub const fn pool_id(&self) -> PoolId {
        self.pool
    }

    /// Reinterprets the view as one for another item type. See [`Identifier::cast`].
    #[inline]
    #[must_use]
    pub const fn cast<U>(self) -> View<U> {
        View {
            id: self.id.cast(),
            pool: self.pool,
            epoch: self.epoch,
        }
    }
}

impl<T> Clone for View<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for View<T> {}

impl<T> fmt::Debug for View<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("id", &self.id)
            .field("pool", &self.pool)
            .field("epoch", &self.epoch)
            .finish()
    }
}

/// Item identifier with a shared usage counter.
///
/// Cloning increments the counter, dropping decrements it, and the counter
/// is freed with the last clone. The counter is an [`Arc`], so clones may
/// travel between threads: increments are relaxed, the final decrement
/// synchronizes with every earlier one. The pool itself still needs an
/// external lock for concurrent structural mutation.
///
/// Items that must outlive their users check [`Reference::is_unique`] (or
/// [`Reference::ref_count`]) from their readiness hook, so a dispose pass
/// keeps them queued until every other holder is gone.
pub struct Reference<T> {
    id: Identifier<T>,
    counter: Option<Arc<()>>,
}

impl<T> Reference<T> {
    /// Starts counting usages of `id`. A null identifier yields a null reference.
    #[must_use]
    pub fn new(id: Identifier<T>) -> Self {
        let counter = (!id.is_null()).then(|| Arc::new(()));
        Self { id, counter }
    }

    /// Returns the referenced identifier.
    #[inline]
    #[must_use]
    pub fn id(&self) -> Identifier<T> {
        self.id
    }

    /// Returns true for the null reference.
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.id.is_null()
    }

    /// Returns the number of live clones, 0 for the null reference.
    #[must_use]
    pub fn ref_count(&self) -> usize {
        self.counter.as_ref().map_or(0, Arc::strong_count)
    }

    /// Returns true if this is the only clone left.
    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.ref_count() == 1
    }
}

impl<T> Clone for Reference<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            counter: self.counter.clone(),
        }
    }
}

impl<T> Default for Reference<T> {
    fn default() -> Self {
        Self {
            id: Identifier::NULL,
            counter: None,
        }
    }
}

impl<T> PartialEq for Reference<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Reference<T> {}

impl<T> From<&Reference<T>> for Identifier<T> {
    fn from(reference: &Reference<T>) -> Self {
        reference.id
    }
}

impl<T> fmt::Debug for Reference<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reference")
            .field("id", &self.id)
            .field("count", &self.ref_count())
            .finish()
    }
}
