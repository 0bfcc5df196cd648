use std::any::type_name;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// A reference to an item in a [`Pool`][crate::Pool].
///
/// Handles are small `Copy` values returned by [`Pool::allocate()`][1]. They do not borrow the
/// pool; every access goes through the pool, which checks the handle before touching the slot:
///
/// * the handle must have been issued by that same pool (each pool has a unique identity);
/// * the slot must still be occupied by the allocation the handle was issued for. Each slot
///   carries a generation counter that changes whenever the slot is freed, so a handle to a
///   freed slot is rejected even if the slot has since been reused by another allocation.
///
/// Because a handle addresses its slot by index rather than by address, it remains valid when
/// a growable pool moves its items into a larger buffer.
///
/// A handle does not own its item. Freeing the item is the caller's responsibility, either via
/// [`Pool::free()`][2] or by adopting the handle into an [`Owned`][3] that frees on drop.
///
/// # Example
///
/// ```rust
/// use block_pool::{Error, GrowablePool};
/// use new_zealand::nz;
///
/// let mut pool = GrowablePool::<u64>::with_capacity(nz!(1))?;
///
/// let handle = pool.allocate(42)?;
/// let copy = handle;
/// assert_eq!(*pool.get(copy)?, 42);
///
/// pool.free(handle);
/// assert!(matches!(pool.get(copy), Err(Error::UseAfterFree { .. })));
/// # Ok::<(), Error>(())
/// ```
///
/// [1]: crate::Pool::allocate
/// [2]: crate::Pool::free
/// [3]: crate::Owned
pub struct Handle<T> {
    /// Identity of the pool that issued the handle. Zero means the handle is null.
    pool_id: u64,

    index: u32,

    /// Generation of the slot at the time the allocation was made.
    generation: u64,

    _item: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub(crate) fn new(pool_id: u64, index: u32, generation: u64) -> Self {
        debug_assert!(pool_id != NULL_POOL_ID, "pools never use the null identity");

        Self {
            pool_id,
            index,
            generation,
            _item: PhantomData,
        }
    }

    /// A handle that refers to nothing.
    ///
    /// Freeing a null handle is a no-op and accessing through it fails with
    /// [`Error::NullHandle`][crate::Error::NullHandle].
    ///
    /// # Example
    ///
    /// ```rust
    /// use block_pool::{FixedPool, Handle};
    /// use new_zealand::nz;
    ///
    /// let mut pool = FixedPool::<u32>::with_capacity(nz!(4))?;
    ///
    /// pool.free(Handle::null());
    /// assert_eq!(pool.allocated(), 0);
    /// # Ok::<(), block_pool::Error>(())
    /// ```
    #[must_use]
    pub const fn null() -> Self {
        Self {
            pool_id: NULL_POOL_ID,
            index: 0,
            generation: 0,
            _item: PhantomData,
        }
    }

    /// Whether this is a [null][Self::null] handle.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.pool_id == NULL_POOL_ID
    }

    /// The index of the slot this handle refers to.
    ///
    /// Slots are reused after being freed, so this is not a unique identity of the allocation.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    #[must_use]
    pub(crate) fn pool_id(&self) -> u64 {
        self.pool_id
    }

    #[must_use]
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}

pub(crate) const NULL_POOL_ID: u64 = 0;

// Manual impls because derives would require the same traits from `T`.

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.pool_id == other.pool_id
            && self.index == other.index
            && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pool_id.hash(state);
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> Default for Handle<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("pool_id", &self.pool_id)
            .field("index", &self.index)
            .field("generation", &self.generation)
            .finish()
    }
}
