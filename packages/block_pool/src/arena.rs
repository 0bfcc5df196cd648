use std::alloc::{Layout, alloc, dealloc};
use std::any::type_name;
use std::num::NonZero;
use std::ptr::{self, NonNull};

use crate::{Error, Result, Slot};

/// The backing storage of a pool: one contiguous heap allocation of `capacity` slots.
///
/// Every slot in `0..capacity` is always initialized, either occupied or vacant. Slots are
/// addressed by index only, never by address, so the buffer may be replaced by a larger one
/// (see [`relocate()`][Self::relocate]) without invalidating anything the pool has handed out.
///
/// A fresh arena links every slot `i` to `i + 1`, with the last slot linking to `capacity`.
/// That out-of-range link is the "no more free slots" sentinel. Relocation links the new slots
/// the same way, so the old sentinel becomes a link to the first new slot.
#[derive(Debug)]
pub(crate) struct Arena<T> {
    first_slot_ptr: NonNull<Slot<T>>,

    capacity: NonZero<u32>,
}

impl<T> Arena<T> {
    /// Reserves and initializes an arena of `capacity` vacant slots.
    pub(crate) fn new(capacity: NonZero<u32>) -> Result<Self> {
        let first_slot_ptr =
            Self::allocate(capacity).ok_or_else(|| Error::AllocationFailed {
                capacity: capacity.get(),
            })?;

        // SAFETY: The buffer was just allocated with room for `capacity` slots, none of which
        // are initialized yet.
        unsafe {
            Self::link_vacant(first_slot_ptr, 0, capacity);
        }

        Ok(Self {
            first_slot_ptr,
            capacity,
        })
    }

    #[must_use]
    pub(crate) fn capacity(&self) -> NonZero<u32> {
        self.capacity
    }

    #[must_use]
    pub(crate) fn slot(&self, index: u32) -> Option<&Slot<T>> {
        let slot_ptr = self.slot_ptr(index)?;

        // SAFETY: All slots below capacity are initialized and the pointer was bounds-checked.
        Some(unsafe { slot_ptr.as_ref() })
    }

    #[must_use]
    #[expect(clippy::needless_pass_by_ref_mut, reason = "false positive")]
    pub(crate) fn slot_mut(&mut self, index: u32) -> Option<&mut Slot<T>> {
        let mut slot_ptr = self.slot_ptr(index)?;

        // SAFETY: All slots below capacity are initialized and the pointer was bounds-checked.
        // We hold `&mut self`, so no other reference into the buffer can exist.
        Some(unsafe { slot_ptr.as_mut() })
    }

    fn slot_ptr(&self, index: u32) -> Option<NonNull<Slot<T>>> {
        if index >= self.capacity.get() {
            return None;
        }

        // SAFETY: Guarded by the bounds check above, so the offset stays within the allocation.
        Some(unsafe { self.first_slot_ptr.add(to_usize(index)) })
    }

    /// Moves every slot into a new buffer of `new_capacity` slots and releases the old buffer.
    ///
    /// Slot indexes and generations are preserved; slots `capacity..new_capacity` are vacant
    /// and linked in ascending order. If the new buffer cannot be reserved, the arena is left
    /// exactly as it was.
    ///
    /// # Panics
    ///
    /// Panics if `new_capacity` is not larger than the current capacity.
    pub(crate) fn relocate(&mut self, new_capacity: NonZero<u32>) -> Result<()> {
        assert!(
            new_capacity > self.capacity,
            "relocation must grow the arena of {} ({} -> {})",
            type_name::<T>(),
            self.capacity,
            new_capacity
        );

        let new_first_slot_ptr =
            Self::allocate(new_capacity).ok_or_else(|| Error::OutOfMemory {
                capacity: self.capacity.get(),
                requested: NonZero::<u64>::from(new_capacity).get(),
            })?;

        // Nothing below this point can fail, so the arena is either fully relocated or untouched.

        // SAFETY: Both buffers are valid for `capacity` slots and are distinct allocations.
        // This is a move: the old buffer is released below without dropping its contents.
        unsafe {
            ptr::copy_nonoverlapping(
                self.first_slot_ptr.as_ptr(),
                new_first_slot_ptr.as_ptr(),
                slot_count(self.capacity),
            );
        }

        // SAFETY: The new buffer has room for `new_capacity` slots and the tail starting at the
        // old capacity is not yet initialized.
        unsafe {
            Self::link_vacant(new_first_slot_ptr, self.capacity.get(), new_capacity);
        }

        let old_layout = Self::layout(self.capacity)
            .expect("layout was valid when the old buffer was allocated");

        // SAFETY: The layout matches the one the old buffer was allocated with and its contents
        // have all been moved out above, so there is nothing left to drop.
        unsafe {
            dealloc(self.first_slot_ptr.as_ptr().cast(), old_layout);
        }

        self.first_slot_ptr = new_first_slot_ptr;
        self.capacity = new_capacity;

        Ok(())
    }

    fn layout(capacity: NonZero<u32>) -> Option<Layout> {
        Layout::array::<Slot<T>>(slot_count(capacity)).ok()
    }

    fn allocate(capacity: NonZero<u32>) -> Option<NonNull<Slot<T>>> {
        let layout = Self::layout(capacity)?;

        // SAFETY: The layout is never zero-sized: the capacity is non-zero and every slot
        // carries a generation counter even if `T` is zero-sized.
        let ptr = unsafe { alloc(layout) };

        NonNull::new(ptr.cast::<Slot<T>>())
    }

    /// Writes vacant slots `start..end`, each linked to its successor. The last one links to
    /// `end`, which is the list terminator for an arena of that capacity.
    ///
    /// # Safety
    ///
    /// `first_slot_ptr` must be valid for writes of `end` slots and the slots in `start..end`
    /// must not hold anything that needs dropping.
    unsafe fn link_vacant(first_slot_ptr: NonNull<Slot<T>>, start: u32, end: NonZero<u32>) {
        for index in start..end.get() {
            let next_free_index = index
                .checked_add(1)
                .expect("bounded by end, which is itself a u32");

            // SAFETY: The caller guarantees room for `end` slots and `index < end`.
            let slot_ptr = unsafe { first_slot_ptr.add(to_usize(index)) };

            // SAFETY: The pointer is valid for writes and nothing there needs dropping.
            unsafe {
                slot_ptr.write(Slot::vacant(next_free_index));
            }
        }
    }
}

impl<T> Drop for Arena<T> {
    fn drop(&mut self) {
        let slots = ptr::slice_from_raw_parts_mut(
            self.first_slot_ptr.as_ptr(),
            slot_count(self.capacity),
        );

        // SAFETY: All slots below capacity are initialized and are never used again.
        unsafe {
            ptr::drop_in_place(slots);
        }

        let layout =
            Self::layout(self.capacity).expect("layout was valid when the buffer was allocated");

        // SAFETY: The layout matches the one the buffer was allocated with.
        unsafe {
            dealloc(self.first_slot_ptr.as_ptr().cast(), layout);
        }
    }
}

// SAFETY: The raw pointer is an exclusively owned heap allocation, nothing about it is tied to
// a thread. The arena can move between threads as long as `T` can.
unsafe impl<T: Send> Send for Arena<T> {}

/// Slot indexes are `u32` but buffer offsets are `usize`.
#[must_use]
pub(crate) fn to_usize(value: u32) -> usize {
    usize::try_from(value).expect("u32 always fits in usize on the targets we support")
}

#[must_use]
fn slot_count(capacity: NonZero<u32>) -> usize {
    NonZero::<usize>::try_from(capacity)
        .expect("u32 always fits in usize on the targets we support")
        .get()
}
