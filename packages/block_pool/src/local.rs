use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::num::NonZero;
use std::rc::Rc;

use tracing::trace;

use crate::{Doubling, GrowthPolicy, Handle, Pool, Result};

/// A single-threaded, shared wrapper around a [`Pool`] that hands out [`Owned`] handles, which
/// free their item when dropped.
///
/// This type acts as a cloneable reference to one shared pool. Multiple clones can exist
/// simultaneously and the pool stays alive as long as any clone or any [`Owned`] exists.
///
/// Because a growable pool may move its items whenever it allocates, items are never borrowed
/// beyond a single call: access goes through closures passed to [`Owned::with()`] and
/// [`Owned::with_mut()`].
///
/// # Single-threaded design
///
/// This type is neither [`Send`] nor [`Sync`]. Use a plain [`Pool`] if the pool needs to move
/// between threads.
///
/// # Example
///
/// ```rust
/// use block_pool::LocalPool;
/// use new_zealand::nz;
///
/// let pool = LocalPool::<String>::with_capacity(nz!(2))?;
///
/// {
///     let greeting = pool.allocate("hello".to_string())?;
///     greeting.with(|text| assert_eq!(text, "hello"))?;
///     assert_eq!(pool.allocated(), 1);
/// }
///
/// // The item was freed when `greeting` went out of scope.
/// assert_eq!(pool.allocated(), 0);
/// # Ok::<(), block_pool::Error>(())
/// ```
pub struct LocalPool<T, P: GrowthPolicy = Doubling> {
    inner: Rc<RefCell<Pool<T, P>>>,
}

impl<T, P: GrowthPolicy> LocalPool<T, P> {
    /// Creates a pool with room for `capacity` items.
    ///
    /// To configure the pool further, build a [`Pool`] and convert it with [`From`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`][crate::Error::AllocationFailed] if the storage cannot
    /// be reserved.
    pub fn with_capacity(capacity: NonZero<u32>) -> Result<Self> {
        Pool::with_capacity(capacity).map(Self::from)
    }

    /// Stores `value` in the pool and returns an owning handle that frees it on drop.
    ///
    /// # Errors
    ///
    /// Fails like [`Pool::allocate()`].
    ///
    /// # Panics
    ///
    /// Panics if called from inside a closure passed to [`Owned::with()`] or
    /// [`Owned::with_mut()`] of the same pool.
    pub fn allocate(&self, value: T) -> Result<Owned<T, P>> {
        let handle = self.inner.borrow_mut().allocate(value)?;

        Ok(Owned::new(handle, self.clone()))
    }

    /// Takes ownership of an item that was allocated directly through the wrapped pool's handle.
    ///
    /// The handle is not checked here; accesses through the returned [`Owned`] are checked as
    /// usual and dropping it frees the item if the handle is still valid.
    pub fn adopt(&self, handle: Handle<T>) -> Owned<T, P> {
        Owned::new(handle, self.clone())
    }

    /// The number of slots in the pool, occupied or not.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.inner.borrow().size()
    }

    /// The number of live items in the pool.
    #[must_use]
    pub fn allocated(&self) -> u32 {
        self.inner.borrow().allocated()
    }

    /// Whether the pool holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}

impl<T, P: GrowthPolicy> From<Pool<T, P>> for LocalPool<T, P> {
    /// Wraps an existing pool, for example one created with a custom
    /// [builder][Pool::builder] configuration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use block_pool::{DropPolicy, FixedPool, LocalPool};
    /// use new_zealand::nz;
    ///
    /// let pool = LocalPool::from(
    ///     FixedPool::<u8>::builder()
    ///         .capacity(nz!(8))
    ///         .drop_policy(DropPolicy::MustNotDropItems)
    ///         .build()?,
    /// );
    ///
    /// assert_eq!(pool.size(), 8);
    /// # Ok::<(), block_pool::Error>(())
    /// ```
    fn from(pool: Pool<T, P>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(pool)),
        }
    }
}

// Manual impls because derives would require the same traits from `T` and `P`.

impl<T, P: GrowthPolicy> Clone for LocalPool<T, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T, P: GrowthPolicy> fmt::Debug for LocalPool<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(pool) => f.debug_struct("LocalPool").field("pool", &*pool).finish(),
            Err(_) => f
                .debug_struct("LocalPool")
                .field("pool", &format_args!("<borrowed>"))
                .finish(),
        }
    }
}

/// An owning handle to an item in a [`LocalPool`]. The item is freed when this is dropped.
///
/// Ownership can be given up with [`into_handle()`][Self::into_handle], which returns the plain
/// [`Handle`] without freeing, or [`take()`][Self::take], which moves the item out of the pool.
///
/// # Panics
///
/// Dropping an `Owned` from inside a [`with()`][Self::with] or [`with_mut()`][Self::with_mut]
/// closure of the same pool panics, because the pool is already borrowed.
#[must_use]
pub struct Owned<T, P: GrowthPolicy = Doubling> {
    // Null once ownership has been given up.
    handle: Handle<T>,

    pool: LocalPool<T, P>,
}

impl<T, P: GrowthPolicy> Owned<T, P> {
    fn new(handle: Handle<T>, pool: LocalPool<T, P>) -> Self {
        Self { handle, pool }
    }

    /// Calls `f` with a shared reference to the item and returns its result.
    ///
    /// # Errors
    ///
    /// Fails like [`Pool::get()`] if the item is no longer in the pool.
    ///
    /// # Panics
    ///
    /// Panics if the pool is already borrowed exclusively, which happens when this is called
    /// from inside [`with_mut()`][Self::with_mut] of another item in the same pool.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R> {
        let pool = self.pool.inner.borrow();

        pool.get(self.handle).map(f)
    }

    /// Calls `f` with an exclusive reference to the item and returns its result.
    ///
    /// # Example
    ///
    /// ```rust
    /// use block_pool::LocalPool;
    /// use new_zealand::nz;
    ///
    /// let pool = LocalPool::<Vec<u8>>::with_capacity(nz!(1))?;
    /// let mut bytes = pool.allocate(Vec::new())?;
    ///
    /// bytes.with_mut(|bytes| bytes.extend_from_slice(b"abc"))?;
    /// assert_eq!(bytes.with(Vec::len)?, 3);
    /// # Ok::<(), block_pool::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Fails like [`Pool::get_mut()`] if the item is no longer in the pool.
    ///
    /// # Panics
    ///
    /// Panics if the pool is already borrowed, which happens when this is called from inside a
    /// [`with()`][Self::with] or `with_mut()` closure of another item in the same pool.
    pub fn with_mut<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        let mut pool = self.pool.inner.borrow_mut();

        pool.get_mut(self.handle).map(f)
    }

    /// Whether the item is still in the pool.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.pool.inner.borrow().is_valid(self.handle)
    }

    /// A plain copy of the handle. The `Owned` keeps ownership.
    #[must_use]
    pub fn handle(&self) -> Handle<T> {
        self.handle
    }

    /// The pool the item belongs to.
    #[must_use]
    pub fn pool(&self) -> &LocalPool<T, P> {
        &self.pool
    }

    /// Gives up ownership without freeing the item and returns the plain handle.
    ///
    /// The item stays in the pool until freed through the pool or adopted again with
    /// [`LocalPool::adopt()`].
    #[must_use]
    pub fn into_handle(mut self) -> Handle<T> {
        mem::take(&mut self.handle)
    }

    /// Removes the item from the pool and returns it.
    ///
    /// # Errors
    ///
    /// Fails like [`Pool::take()`] if the item is no longer in the pool.
    pub fn take(mut self) -> Result<T> {
        let handle = mem::take(&mut self.handle);
        let mut pool = self.pool.inner.borrow_mut();

        pool.take(handle)
    }
}

impl<T, P: GrowthPolicy> Drop for Owned<T, P> {
    fn drop(&mut self) {
        if self.handle.is_null() {
            return;
        }

        // The item may itself own items in this pool, so it is dropped after the borrow ends.
        let taken = self.pool.inner.borrow_mut().take(self.handle);

        match taken {
            Ok(value) => drop(value),
            Err(error) => {
                trace!(
                    index = self.handle.index(),
                    %error,
                    "owned item was already gone from the pool"
                );
            }
        }
    }
}

impl<T, P: GrowthPolicy> fmt::Debug for Owned<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Owned")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}
