use std::num::NonZero;

use new_zealand::nz;

use crate::{Error, Result, Sealed};

/// Decides what a [`Pool`][crate::Pool] does when it runs out of free slots.
///
/// The policy is a type parameter of the pool, so the choice costs nothing at runtime. This
/// trait is sealed; the available policies are [`Fixed`] and [`Doubling`].
#[expect(private_bounds, reason = "intentional - sealed trait")]
pub trait GrowthPolicy: Sealed {
    /// Returns the capacity an exhausted pool of `capacity` slots should grow to, or the error
    /// the allocation should fail with if the pool does not (or cannot) grow.
    #[doc(hidden)]
    fn grown_capacity(capacity: NonZero<u32>) -> Result<NonZero<u32>>;
}

/// The pool never grows. Allocating from a full pool fails with [`Error::Exhausted`].
///
/// Because the arena never moves, a handle from such a pool always refers to the same slot
/// address for the lifetime of the pool.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct Fixed;

/// The pool doubles its capacity when full, moving every live item into the new buffer.
///
/// Handles stay valid across the move because they address slots by index. The move is linear
/// in the current capacity, so allocations that trigger it are latency outliers.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct Doubling;

impl GrowthPolicy for Fixed {
    fn grown_capacity(capacity: NonZero<u32>) -> Result<NonZero<u32>> {
        Err(Error::Exhausted {
            capacity: capacity.get(),
        })
    }
}

impl GrowthPolicy for Doubling {
    fn grown_capacity(capacity: NonZero<u32>) -> Result<NonZero<u32>> {
        capacity
            .checked_mul(nz!(2))
            .ok_or_else(|| Error::OutOfMemory {
                capacity: capacity.get(),
                requested: NonZero::<u64>::from(capacity)
                    .checked_mul(nz!(2))
                    .expect("double of a u32 always fits in u64")
                    .get(),
            })
    }
}

impl Sealed for Fixed {}
impl Sealed for Doubling {}
