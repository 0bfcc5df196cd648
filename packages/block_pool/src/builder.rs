use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::num::NonZero;

use new_zealand::nz;

use crate::{DropPolicy, GrowthPolicy, Pool, Result};

/// Builder for creating an instance of [`Pool`].
///
/// You only need to use this builder if you want to customize the pool configuration.
/// [`Pool::with_capacity()`][1] covers the common case of only choosing a capacity.
///
/// # Examples
///
/// ```
/// use block_pool::{DropPolicy, GrowablePool};
/// use new_zealand::nz;
///
/// let pool = GrowablePool::<u32>::builder()
///     .capacity(nz!(64))
///     .drop_policy(DropPolicy::MayDropItems)
///     .build()?;
///
/// assert_eq!(pool.size(), 64);
/// # Ok::<(), block_pool::Error>(())
/// ```
///
/// [1]: Pool::with_capacity
#[must_use]
pub struct PoolBuilder<T, P: GrowthPolicy> {
    capacity: NonZero<u32>,
    drop_policy: DropPolicy,

    _item: PhantomData<T>,
    _policy: PhantomData<P>,
}

/// Capacity of a pool built without specifying one.
#[cfg(not(miri))]
pub(crate) const DEFAULT_CAPACITY: NonZero<u32> = nz!(128);

// Under Miri, we use a smaller capacity because Miri test runtime scales by memory usage.
#[cfg(miri)]
pub(crate) const DEFAULT_CAPACITY: NonZero<u32> = nz!(4);

impl<T, P: GrowthPolicy> fmt::Debug for PoolBuilder<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolBuilder")
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("policy", &format_args!("{}", type_name::<P>()))
            .field("capacity", &self.capacity)
            .field("drop_policy", &self.drop_policy)
            .finish()
    }
}

impl<T, P: GrowthPolicy> PoolBuilder<T, P> {
    pub(crate) fn new() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            drop_policy: DropPolicy::default(),
            _item: PhantomData,
            _policy: PhantomData,
        }
    }

    /// Sets the number of slots the pool reserves up front.
    ///
    /// For a [fixed][crate::FixedPool] pool this is also the maximum number of live items.
    pub fn capacity(mut self, capacity: NonZero<u32>) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the [drop policy][DropPolicy] for the pool. This governs how
    /// to treat remaining items in the pool when the pool is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use block_pool::{DropPolicy, GrowablePool};
    ///
    /// let pool = GrowablePool::<u32>::builder()
    ///     .drop_policy(DropPolicy::MustNotDropItems)
    ///     .build()?;
    /// # Ok::<(), block_pool::Error>(())
    /// ```
    pub fn drop_policy(mut self, policy: DropPolicy) -> Self {
        self.drop_policy = policy;
        self
    }

    /// Builds the pool with the specified configuration, reserving its storage.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`][crate::Error::AllocationFailed] if the storage for
    /// the requested capacity cannot be reserved.
    pub fn build(self) -> Result<Pool<T, P>> {
        Pool::new_inner(self.capacity, self.drop_policy)
    }
}
