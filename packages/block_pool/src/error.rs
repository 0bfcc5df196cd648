use std::result;

use thiserror::Error;

/// Errors that can occur when allocating from or accessing a pool.
///
/// Per-operation failures are returned as values and never leave the pool in a modified state.
/// The one intentionally silent case is [`free()`][1] with a handle that does not belong to the
/// pool (or was already freed), which is a no-op so that `free()` is safe to call defensively.
/// The value-returning [`take()`][2] reports the same situation as [`Error::InvalidFree`].
///
/// [1]: crate::Pool::free
/// [2]: crate::Pool::take
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The backing storage for a new pool could not be reserved.
    #[error("failed to reserve backing storage for {capacity} slots")]
    AllocationFailed {
        /// The capacity the pool was being created with.
        capacity: u32,
    },

    /// A fixed-capacity pool has no free slot left.
    #[error("pool with capacity {capacity} has no free slot")]
    Exhausted {
        /// The (unchanging) capacity of the pool.
        capacity: u32,
    },

    /// A growable pool could not reserve storage for its grown capacity. The pool is unmodified.
    #[error("failed to grow pool from {capacity} to {requested} slots")]
    OutOfMemory {
        /// The capacity of the pool before the failed growth.
        capacity: u32,

        /// The capacity that could not be reserved. This may exceed `u32::MAX`, in which case
        /// the pool has reached the largest capacity it can address.
        requested: u64,
    },

    /// The slot the handle refers to is no longer occupied by the allocation the handle was
    /// issued for. Either it was freed or it was freed and then reused by another allocation.
    #[error("slot {index} is no longer occupied by the allocation this handle was issued for")]
    UseAfterFree {
        /// Index of the slot the handle refers to.
        index: u32,
    },

    /// A handle that is null or belongs to another pool was given back to this pool.
    #[error("handle does not refer to an allocation made by this pool")]
    InvalidFree,

    /// A null handle was used to access a pool.
    #[error("null handle cannot be dereferenced")]
    NullHandle,

    /// A handle issued by a different pool was used to access this pool.
    #[error("handle was issued by a different pool")]
    ForeignHandle,

    /// A multi-type slot holds a different variant than the one requested.
    #[error("slot {index} holds variant `{found}` but `{expected}` was requested")]
    InvalidVariant {
        /// Index of the slot the handle refers to.
        index: u32,

        /// Name of the type the caller asked for.
        expected: &'static str,

        /// Name of the variant the slot currently holds.
        found: &'static str,
    },
}

/// A specialized `Result` type for pool operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = result::Result<T, Error>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Error: Send, Sync, Debug, Clone);

    #[test]
    fn messages_name_the_slot() {
        let error = Error::UseAfterFree { index: 7 };
        assert!(error.to_string().contains("slot 7"));

        let error = Error::InvalidVariant {
            index: 3,
            expected: "f64",
            found: "Text",
        };
        let message = error.to_string();
        assert!(message.contains("`Text`"));
        assert!(message.contains("`f64`"));
    }

    #[test]
    fn out_of_memory_reports_both_capacities() {
        let error = Error::OutOfMemory {
            capacity: 10,
            requested: 20,
        };

        assert_eq!(error.to_string(), "failed to grow pool from 10 to 20 slots");
    }
}
