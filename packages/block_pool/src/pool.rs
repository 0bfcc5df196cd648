use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::num::NonZero;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use tracing::{debug, trace};

use crate::{
    Arena, Doubling, DropPolicy, Error, Fixed, FreeList, GrowthPolicy, Handle, PoolBuilder, Result,
    Slot,
};

/// Global counter for generating unique pool IDs. Zero is reserved for null handles.
static POOL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generates a unique pool ID.
fn generate_pool_id() -> u64 {
    POOL_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// A pool that never grows. Allocating from a full pool fails with [`Error::Exhausted`].
pub type FixedPool<T> = Pool<T, Fixed>;

/// A pool that doubles its capacity when full, moving its items into the larger buffer.
pub type GrowablePool<T> = Pool<T, Doubling>;

/// An object pool of fixed-size slots with O(1) allocation and deallocation.
///
/// All slots live in one contiguous buffer (the arena) reserved when the pool is created. Free
/// slots form a linked list threaded through the slots themselves, so allocating pops the head of
/// that list and freeing pushes the slot back onto it. The most recently freed slot is the first
/// to be reused.
///
/// What happens when every slot is taken is decided by the growth policy `P`:
///
/// * [`FixedPool`] (`Pool<T, Fixed>`) fails the allocation with [`Error::Exhausted`].
/// * [`GrowablePool`] (`Pool<T, Doubling>`) reserves a buffer twice the size, moves every item
///   across and continues. Existing [`Handle`]s stay valid because they address slots by index.
///
/// # Handles
///
/// [`allocate()`][Self::allocate] returns a [`Handle`], a small `Copy` value that does not borrow
/// the pool. Items are accessed through the pool with [`get()`][Self::get] and
/// [`get_mut()`][Self::get_mut], which verify that the handle was issued by this pool and that its
/// allocation has not been freed in the meantime. A stale handle fails with
/// [`Error::UseAfterFree`], even if its slot has been reused by a newer allocation.
///
/// [`free()`][Self::free] is lenient: it ignores null handles, handles from other pools and
/// handles that were already freed, so it is always safe to call. Use [`take()`][Self::take] if
/// you want to know whether anything was freed.
///
/// # Example
///
/// ```rust
/// use block_pool::{Error, FixedPool};
/// use new_zealand::nz;
///
/// let mut pool = FixedPool::<String>::with_capacity(nz!(2))?;
///
/// let alice = pool.allocate("Alice".to_string())?;
/// let bob = pool.allocate("Bob".to_string())?;
///
/// // The pool is full and a fixed pool does not grow.
/// assert_eq!(
///     pool.allocate("Charlie".to_string()),
///     Err(Error::Exhausted { capacity: 2 })
/// );
///
/// pool.get_mut(alice)?.push_str(" Smith");
/// assert_eq!(pool.get(alice)?, "Alice Smith");
///
/// pool.free(bob);
/// assert_eq!(pool.allocated(), 1);
/// # Ok::<(), Error>(())
/// ```
///
/// # Thread safety
///
/// The pool is thread-mobile ([`Send`] if `T` is) but not [`Sync`]. There is no internal
/// synchronization; share a pool between threads only behind external locking.
pub struct Pool<T, P: GrowthPolicy> {
    /// Handles carry this so that they are only ever accepted by the pool that issued them.
    id: u64,

    arena: Arena<T>,

    free_list: FreeList,

    /// How many times the arena has been moved into a larger buffer.
    relocations: u32,

    drop_policy: DropPolicy,

    _policy: PhantomData<P>,
}

impl<T, P: GrowthPolicy> Pool<T, P> {
    pub(crate) fn new_inner(capacity: NonZero<u32>, drop_policy: DropPolicy) -> Result<Self> {
        Ok(Self {
            id: generate_pool_id(),
            arena: Arena::new(capacity)?,
            free_list: FreeList::new(),
            relocations: 0,
            drop_policy,
            _policy: PhantomData,
        })
    }

    /// Creates a pool with room for `capacity` items and the default drop policy.
    ///
    /// # Example
    ///
    /// ```rust
    /// use block_pool::GrowablePool;
    /// use new_zealand::nz;
    ///
    /// let pool = GrowablePool::<u64>::with_capacity(nz!(10))?;
    ///
    /// assert_eq!(pool.size(), 10);
    /// assert_eq!(pool.allocated(), 0);
    /// # Ok::<(), block_pool::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if the storage cannot be reserved.
    pub fn with_capacity(capacity: NonZero<u32>) -> Result<Self> {
        Self::builder().capacity(capacity).build()
    }

    /// Starts building a new pool.
    ///
    /// Use this when you want to customize the pool configuration beyond the capacity.
    pub fn builder() -> PoolBuilder<T, P> {
        PoolBuilder::new()
    }

    /// The number of slots in the pool, occupied or not.
    ///
    /// This only ever changes when a [growable][GrowablePool] pool relocates, and then it
    /// doubles.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.arena.capacity().get()
    }

    /// The number of live items in the pool.
    #[must_use]
    #[cfg_attr(test, mutants::skip)] // Can be mutated to infinitely growing memory use.
    pub fn allocated(&self) -> u32 {
        self.free_list.allocated()
    }

    /// Whether the pool holds no items. An empty pool still holds its capacity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.allocated() == 0
    }

    /// Whether every slot is occupied. The next allocation will either fail or relocate,
    /// depending on the growth policy.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.free_list.is_exhausted(&self.arena)
    }

    /// How many times the pool has moved its items into a larger buffer.
    ///
    /// Always zero for a [`FixedPool`].
    #[must_use]
    pub fn relocations(&self) -> u32 {
        self.relocations
    }

    /// Moves `value` into a free slot and returns a handle to it.
    ///
    /// # Example
    ///
    /// ```rust
    /// use block_pool::GrowablePool;
    /// use new_zealand::nz;
    ///
    /// let mut pool = GrowablePool::<u32>::with_capacity(nz!(1))?;
    ///
    /// let first = pool.allocate(1)?;
    /// // The pool is full, so this moves `first` into a buffer of twice the size.
    /// let second = pool.allocate(2)?;
    ///
    /// assert_eq!(pool.size(), 2);
    /// assert_eq!(*pool.get(first)?, 1);
    /// assert_eq!(*pool.get(second)?, 2);
    /// # Ok::<(), block_pool::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// If the pool is full, a [`FixedPool`] fails with [`Error::Exhausted`] and a
    /// [`GrowablePool`] fails with [`Error::OutOfMemory`] if the larger buffer cannot be
    /// reserved. The pool is unchanged by a failed allocation.
    pub fn allocate(&mut self, value: T) -> Result<Handle<T>> {
        self.allocate_with(|| value)
    }

    /// Like [`allocate()`][Self::allocate] but only constructs the value once a slot is known to
    /// be available, so nothing is constructed if the allocation fails.
    ///
    /// # Errors
    ///
    /// Same as [`allocate()`][Self::allocate].
    pub fn allocate_with(&mut self, f: impl FnOnce() -> T) -> Result<Handle<T>> {
        self.ensure_vacancy()?;

        let Ok(index) = self.free_list.take_next(&mut self.arena, f()) else {
            panic!(
                "pool of {} had no vacant slot right after making room for one",
                type_name::<T>()
            );
        };

        let generation = self
            .arena
            .slot(index)
            .map(Slot::generation)
            .expect("index was just handed out by the free list");

        Ok(Handle::new(self.id, index, generation))
    }

    /// Gets a shared reference to the item the handle refers to.
    ///
    /// # Errors
    ///
    /// * [`Error::NullHandle`] for a null handle.
    /// * [`Error::ForeignHandle`] for a handle issued by another pool.
    /// * [`Error::UseAfterFree`] if the item has been freed.
    pub fn get(&self, handle: Handle<T>) -> Result<&T> {
        self.validate(handle)?;

        Ok(self
            .arena
            .slot(handle.index())
            .and_then(Slot::value)
            .expect("handle was validated above"))
    }

    /// Gets an exclusive reference to the item the handle refers to.
    ///
    /// # Errors
    ///
    /// Same as [`get()`][Self::get].
    pub fn get_mut(&mut self, handle: Handle<T>) -> Result<&mut T> {
        self.validate(handle)?;

        Ok(self
            .arena
            .slot_mut(handle.index())
            .and_then(Slot::value_mut)
            .expect("handle was validated above"))
    }

    /// Whether the handle refers to a live item in this pool.
    #[must_use]
    pub fn is_valid(&self, handle: Handle<T>) -> bool {
        self.validate(handle).is_ok()
    }

    /// Drops the item the handle refers to and makes its slot available for reuse.
    ///
    /// Every copy of the handle becomes invalid. Null handles, handles from other pools and
    /// handles whose item was already freed are ignored: the pool cannot tell a double free
    /// apart from a handle that legitimately belongs elsewhere, so it leaves both alone rather
    /// than risk corrupting its free list.
    ///
    /// # Example
    ///
    /// ```rust
    /// use block_pool::FixedPool;
    /// use new_zealand::nz;
    ///
    /// let mut pool = FixedPool::<u32>::with_capacity(nz!(4))?;
    /// let handle = pool.allocate(42)?;
    ///
    /// pool.free(handle);
    /// assert_eq!(pool.allocated(), 0);
    ///
    /// // Freeing again does nothing.
    /// pool.free(handle);
    /// assert_eq!(pool.allocated(), 0);
    /// # Ok::<(), block_pool::Error>(())
    /// ```
    pub fn free(&mut self, handle: Handle<T>) {
        match self.take(handle) {
            Ok(value) => drop(value),
            Err(error) => {
                trace!(
                    item_type = type_name::<T>(),
                    index = handle.index(),
                    %error,
                    "ignoring free of invalid handle"
                );
            }
        }
    }

    /// Removes the item the handle refers to from the pool and returns it.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidFree`] for a null handle or a handle issued by another pool.
    /// * [`Error::UseAfterFree`] if the item has already been freed.
    pub fn take(&mut self, handle: Handle<T>) -> Result<T> {
        match self.validate(handle) {
            Ok(()) => {}
            Err(Error::NullHandle | Error::ForeignHandle) => return Err(Error::InvalidFree),
            Err(error) => return Err(error),
        }

        Ok(self
            .free_list
            .give_back(&mut self.arena, handle.index())
            .expect("handle was validated above"))
    }

    fn validate(&self, handle: Handle<T>) -> Result<()> {
        if handle.is_null() {
            return Err(Error::NullHandle);
        }

        if handle.pool_id() != self.id {
            return Err(Error::ForeignHandle);
        }

        let slot = self
            .arena
            .slot(handle.index())
            .ok_or(Error::ForeignHandle)?;

        if slot.is_occupied_at(handle.generation()) {
            Ok(())
        } else {
            Err(Error::UseAfterFree {
                index: handle.index(),
            })
        }
    }

    fn ensure_vacancy(&mut self) -> Result<()> {
        if !self.is_full() {
            return Ok(());
        }

        let new_capacity = P::grown_capacity(self.arena.capacity())?;
        self.relocate(new_capacity)
    }

    fn relocate(&mut self, new_capacity: NonZero<u32>) -> Result<()> {
        let old_capacity = self.arena.capacity();

        self.arena.relocate(new_capacity)?;
        self.relocations = self.relocations.saturating_add(1);

        debug!(
            item_type = type_name::<T>(),
            old_capacity = old_capacity.get(),
            new_capacity = new_capacity.get(),
            allocated = self.allocated(),
            "pool relocated into a larger buffer"
        );

        #[cfg(debug_assertions)]
        self.free_list.integrity_check(&self.arena);

        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn integrity_check(&self) {
        self.free_list.integrity_check(&self.arena);
    }
}

impl<T> Pool<T, Doubling> {
    /// Grows the pool, if needed, so that at least `additional` more items fit without another
    /// relocation. The capacity stays a doubling of the original one.
    ///
    /// # Example
    ///
    /// ```rust
    /// use block_pool::GrowablePool;
    /// use new_zealand::nz;
    ///
    /// let mut pool = GrowablePool::<u8>::with_capacity(nz!(4))?;
    /// let handle = pool.allocate(1)?;
    ///
    /// pool.reserve(10)?;
    /// assert_eq!(pool.size(), 16);
    /// assert_eq!(*pool.get(handle)?, 1);
    /// # Ok::<(), block_pool::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the required capacity cannot be reserved or addressed.
    /// The pool is unchanged in that case.
    pub fn reserve(&mut self, additional: u32) -> Result<()> {
        let required = u64::from(self.allocated())
            .checked_add(u64::from(additional))
            .expect("sum of two u32 always fits in u64");

        let mut new_capacity = self.arena.capacity();

        while NonZero::<u64>::from(new_capacity).get() < required {
            let Ok(grown) = Doubling::grown_capacity(new_capacity) else {
                return Err(Error::OutOfMemory {
                    capacity: self.size(),
                    requested: required,
                });
            };

            new_capacity = grown;
        }

        if new_capacity > self.arena.capacity() {
            self.relocate(new_capacity)?;
        }

        Ok(())
    }
}

impl<T, P: GrowthPolicy> fmt::Debug for Pool<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("policy", &format_args!("{}", type_name::<P>()))
            .field("id", &self.id)
            .field("size", &self.size())
            .field("allocated", &self.allocated())
            .field("next_free_index", &self.free_list.next_free_index())
            .field("relocations", &self.relocations)
            .field("drop_policy", &self.drop_policy)
            .finish_non_exhaustive()
    }
}

impl<T, P: GrowthPolicy> Drop for Pool<T, P> {
    fn drop(&mut self) {
        // If we are already panicking, we do not want to panic again because that will
        // simply obscure whatever the original panic was, leading to debug difficulties.
        if self.drop_policy == DropPolicy::MustNotDropItems && !thread::panicking() {
            assert!(
                self.is_empty(),
                "dropped a non-empty pool of {} with a policy that says it must be empty when dropped",
                type_name::<T>()
            );
        }

        // The arena drops any remaining items when it is dropped after us.
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use new_zealand::nz;
    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;

    assert_impl_all!(FixedPool<u32>: Send);
    assert_impl_all!(GrowablePool<String>: Send);
    assert_not_impl_any!(GrowablePool<u32>: Sync);
    assert_not_impl_any!(FixedPool<Rc<u32>>: Send);

    struct Droppable {
        drops: Rc<Cell<u32>>,
    }

    impl Drop for Droppable {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    #[test]
    fn smoke_test() {
        let mut pool = FixedPool::<u32>::with_capacity(nz!(3)).unwrap();

        let a = pool.allocate(42).unwrap();
        let b = pool.allocate(43).unwrap();
        let c = pool.allocate(44).unwrap();

        assert_eq!(*pool.get(a).unwrap(), 42);
        assert_eq!(*pool.get(b).unwrap(), 43);
        assert_eq!(*pool.get(c).unwrap(), 44);
        assert_eq!(pool.allocated(), 3);
        assert!(pool.is_full());

        pool.free(b);
        assert_eq!(pool.allocated(), 2);

        let d = pool.allocate(45).unwrap();
        assert_eq!(d.index(), b.index());
        assert_eq!(*pool.get(a).unwrap(), 42);
        assert_eq!(*pool.get(c).unwrap(), 44);
        assert_eq!(*pool.get(d).unwrap(), 45);

        pool.integrity_check();
    }

    #[test]
    fn fixed_pool_exhaustion_is_repeatable() {
        let mut pool = FixedPool::<u8>::with_capacity(nz!(2)).unwrap();

        _ = pool.allocate(1).unwrap();
        _ = pool.allocate(2).unwrap();

        for _ in 0..3 {
            assert_eq!(pool.allocate(3), Err(Error::Exhausted { capacity: 2 }));
            assert_eq!(pool.allocated(), 2);
            assert_eq!(pool.size(), 2);
        }

        assert_eq!(pool.relocations(), 0);
        pool.integrity_check();
    }

    #[test]
    fn allocate_with_does_not_construct_on_failure() {
        let mut pool = FixedPool::<u8>::with_capacity(nz!(1)).unwrap();
        _ = pool.allocate(1).unwrap();

        let constructed = Cell::new(false);
        let result = pool.allocate_with(|| {
            constructed.set(true);
            2
        });

        assert!(result.is_err());
        assert!(!constructed.get());
    }

    #[test]
    fn lifo_reuse() {
        let mut pool = FixedPool::<u32>::with_capacity(nz!(4)).unwrap();

        let a = pool.allocate(0).unwrap();
        let b = pool.allocate(1).unwrap();

        pool.free(a);
        pool.free(b);

        assert_eq!(pool.allocate(2).unwrap().index(), b.index());
        assert_eq!(pool.allocate(3).unwrap().index(), a.index());
    }

    #[test]
    fn use_after_free_is_detected() {
        let mut pool = FixedPool::<u32>::with_capacity(nz!(1)).unwrap();

        let handle = pool.allocate(0).unwrap();
        *pool.get_mut(handle).unwrap() = 42;
        pool.free(handle);

        assert_eq!(pool.get(handle), Err(Error::UseAfterFree { index: 0 }));
        assert!(!pool.is_valid(handle));
    }

    #[test]
    fn use_after_reuse_is_detected() {
        let mut pool = FixedPool::<u32>::with_capacity(nz!(1)).unwrap();

        let stale = pool.allocate(42).unwrap();
        pool.free(stale);
        let fresh = pool.allocate(7).unwrap();

        assert_eq!(stale.index(), fresh.index());
        assert_eq!(pool.get(stale), Err(Error::UseAfterFree { index: 0 }));
        assert_eq!(pool.get_mut(stale), Err(Error::UseAfterFree { index: 0 }));
        assert_eq!(*pool.get(fresh).unwrap(), 7);

        // A stale free must not release the new allocation.
        pool.free(stale);
        assert_eq!(pool.allocated(), 1);
        assert_eq!(*pool.get(fresh).unwrap(), 7);
    }

    #[test]
    fn null_and_foreign_handles_are_ignored_by_free() {
        let mut pool = FixedPool::<u32>::with_capacity(nz!(2)).unwrap();
        let mut other = FixedPool::<u32>::with_capacity(nz!(2)).unwrap();

        let mine = pool.allocate(1).unwrap();
        let theirs = other.allocate(2).unwrap();

        pool.free(Handle::null());
        pool.free(theirs);

        assert_eq!(pool.allocated(), 1);
        assert_eq!(other.allocated(), 1);
        assert_eq!(pool.get(theirs), Err(Error::ForeignHandle));
        assert_eq!(pool.get(Handle::null()), Err(Error::NullHandle));
        assert_eq!(pool.take(theirs), Err(Error::InvalidFree));
        assert_eq!(pool.take(Handle::null()), Err(Error::InvalidFree));

        // The pool keeps working normally afterwards.
        let second = pool.allocate(3).unwrap();
        assert!(pool.is_full());
        pool.free(mine);
        pool.free(second);
        assert!(pool.is_empty());

        pool.integrity_check();
    }

    #[test]
    fn take_returns_value() {
        let mut pool = GrowablePool::<String>::with_capacity(nz!(2)).unwrap();

        let handle = pool.allocate("hello".to_string()).unwrap();

        assert_eq!(pool.take(handle).unwrap(), "hello");
        assert_eq!(pool.take(handle), Err(Error::UseAfterFree { index: 0 }));
        assert!(pool.is_empty());
    }

    #[test]
    fn growth_preserves_values() {
        let mut pool = GrowablePool::<u32>::with_capacity(nz!(10)).unwrap();

        let handles: Vec<_> = (0..10).map(|i| pool.allocate(i).unwrap()).collect();
        assert!(pool.is_full());
        assert_eq!(pool.relocations(), 0);

        let eleventh = pool.allocate(10).unwrap();

        assert_eq!(pool.size(), 20);
        assert_eq!(pool.allocated(), 11);
        assert_eq!(pool.relocations(), 1);
        assert_eq!(eleventh.index(), 10);

        for (expected, handle) in (0..10).zip(&handles) {
            assert_eq!(*pool.get(*handle).unwrap(), expected);
        }

        pool.integrity_check();
    }

    #[test]
    fn growth_keeps_generations() {
        let mut pool = GrowablePool::<u32>::with_capacity(nz!(1)).unwrap();

        let stale = pool.allocate(1).unwrap();
        pool.free(stale);
        let live = pool.allocate(2).unwrap();

        _ = pool.allocate(3).unwrap();
        assert_eq!(pool.size(), 2);

        assert_eq!(pool.get(stale), Err(Error::UseAfterFree { index: 0 }));
        assert_eq!(*pool.get(live).unwrap(), 2);
    }

    #[test]
    fn growth_does_not_drop_items() {
        let drops = Rc::new(Cell::new(0));
        let mut pool = GrowablePool::with_capacity(nz!(2)).unwrap();

        let handles: Vec<_> = (0..5)
            .map(|_| {
                pool.allocate(Droppable {
                    drops: Rc::clone(&drops),
                })
                .unwrap()
            })
            .collect();

        assert_eq!(pool.size(), 8);
        assert_eq!(pool.relocations(), 2);
        assert_eq!(drops.get(), 0);

        pool.free(handles[0]);
        assert_eq!(drops.get(), 1);

        drop(pool);
        assert_eq!(drops.get(), 5);
    }

    #[test]
    fn reserve_grows_by_doubling() {
        let mut pool = GrowablePool::<u64>::with_capacity(nz!(3)).unwrap();
        let handle = pool.allocate(9).unwrap();

        pool.reserve(2).unwrap();
        assert_eq!(pool.size(), 3);
        assert_eq!(pool.relocations(), 0);

        pool.reserve(20).unwrap();
        assert_eq!(pool.size(), 24);
        assert_eq!(pool.relocations(), 1);
        assert_eq!(*pool.get(handle).unwrap(), 9);

        pool.integrity_check();
    }

    #[test]
    fn reserve_beyond_addressable_fails_without_change() {
        let mut pool = GrowablePool::<u8>::with_capacity(nz!(4)).unwrap();

        assert_eq!(
            pool.reserve(u32::MAX),
            Err(Error::OutOfMemory {
                capacity: 4,
                requested: u64::from(u32::MAX),
            })
        );
        assert_eq!(pool.size(), 4);
    }

    #[test]
    fn drops_remaining_items_with_pool() {
        let drops = Rc::new(Cell::new(0));

        {
            let mut pool = FixedPool::with_capacity(nz!(4)).unwrap();

            for _ in 0..3 {
                _ = pool
                    .allocate(Droppable {
                        drops: Rc::clone(&drops),
                    })
                    .unwrap();
            }
        }

        assert_eq!(drops.get(), 3);
    }

    #[test]
    #[should_panic]
    fn drop_item_with_forbidden_to_drop_policy_panics() {
        let mut pool = FixedPool::<u32>::builder()
            .capacity(nz!(2))
            .drop_policy(DropPolicy::MustNotDropItems)
            .build()
            .unwrap();

        _ = pool.allocate(123).unwrap();
    }

    #[test]
    fn drop_itemless_with_forbidden_to_drop_policy_ok() {
        let mut pool = FixedPool::<u32>::builder()
            .capacity(nz!(2))
            .drop_policy(DropPolicy::MustNotDropItems)
            .build()
            .unwrap();

        let handle = pool.allocate(123).unwrap();
        pool.free(handle);
    }

    #[test]
    fn zero_sized_items() {
        let mut pool = GrowablePool::<()>::with_capacity(nz!(1)).unwrap();

        let a = pool.allocate(()).unwrap();
        let b = pool.allocate(()).unwrap();

        assert_ne!(a, b);
        assert!(pool.get(a).is_ok());
        pool.free(a);
        assert!(!pool.is_valid(a));
        assert!(pool.is_valid(b));
    }

    #[test]
    fn debug_shows_occupancy() {
        let mut pool = FixedPool::<u8>::with_capacity(nz!(2)).unwrap();
        _ = pool.allocate(1).unwrap();

        let text = format!("{pool:?}");
        assert!(text.contains("allocated: 1"));
        assert!(text.contains("size: 2"));
        assert!(text.ends_with(", .. }"));
    }
}
