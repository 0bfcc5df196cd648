use std::any::type_name;

#[cfg(any(test, debug_assertions))]
use crate::to_usize;
use crate::Arena;

/// Tracks which slots of an [`Arena`] are free.
///
/// The list itself lives inside the vacant slots (an intrusive free list); this type only holds
/// the head of the list and the number of occupied slots. Think of it as a stack of the most
/// recently freed slots, so the slot freed last is the one reused first.
///
/// Both operations are O(1) and never scan the arena.
#[derive(Debug)]
pub(crate) struct FreeList {
    /// Index of the first vacant slot. Equal to (or beyond) the arena capacity when there is
    /// no vacant slot left.
    next_free_index: u32,

    /// Number of occupied slots.
    allocated: u32,
}

impl FreeList {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            next_free_index: 0,
            allocated: 0,
        }
    }

    #[must_use]
    #[cfg_attr(test, mutants::skip)] // Can be mutated to infinitely growing memory use.
    pub(crate) fn allocated(&self) -> u32 {
        self.allocated
    }

    #[must_use]
    pub(crate) fn next_free_index(&self) -> u32 {
        self.next_free_index
    }

    #[must_use]
    pub(crate) fn is_exhausted<T>(&self, arena: &Arena<T>) -> bool {
        self.next_free_index >= arena.capacity().get()
    }

    /// Pops the head of the list and stores `value` there.
    ///
    /// Returns the index of the slot, or gives the value back if there is no vacant slot.
    pub(crate) fn take_next<T>(&mut self, arena: &mut Arena<T>, value: T) -> Result<u32, T> {
        let index = self.next_free_index;

        let Some(slot) = arena.slot_mut(index) else {
            return Err(value);
        };

        self.next_free_index = slot.occupy(value);

        self.allocated = self
            .allocated
            .checked_add(1)
            .expect("guarded by allocated <= capacity, which is itself a u32");

        Ok(index)
    }

    /// Pushes an occupied slot back onto the head of the list and moves its value out.
    ///
    /// Returns `None` without changing anything if the index is out of bounds or the slot is
    /// already vacant.
    pub(crate) fn give_back<T>(&mut self, arena: &mut Arena<T>, index: u32) -> Option<T> {
        let value = arena.slot_mut(index)?.vacate(self.next_free_index)?;

        self.next_free_index = index;

        self.allocated = self.allocated.checked_sub(1).unwrap_or_else(|| {
            panic!(
                "slot {index} was occupied but the free list of {} counted no allocations",
                type_name::<T>()
            )
        });

        Some(value)
    }

    /// Walks the whole list and checks it against the arena contents.
    ///
    /// # Panics
    ///
    /// Panics if the list visits an occupied slot, visits a slot twice, misses a vacant slot
    /// or the allocation count does not match the occupied slots.
    #[cfg_attr(test, mutants::skip)] // This is essentially test logic, mutation is meaningless.
    #[cfg(any(test, debug_assertions))]
    pub(crate) fn integrity_check<T>(&self, arena: &Arena<T>) {
        let capacity = arena.capacity().get();

        let mut visited = vec![false; to_usize(capacity)];
        let mut visited_count: u32 = 0;
        let mut index = self.next_free_index;

        while index < capacity {
            let slot = arena.slot(index).expect("guarded by loop condition");

            let next_free_index = slot.next_free_index().unwrap_or_else(|| {
                panic!(
                    "free list of {} reaches occupied slot {index}",
                    type_name::<T>()
                )
            });

            let seen = visited
                .get_mut(to_usize(index))
                .expect("guarded by loop condition");

            assert!(
                !*seen,
                "free list of {} visits slot {index} twice",
                type_name::<T>()
            );

            *seen = true;
            visited_count = visited_count
                .checked_add(1)
                .expect("guarded by the duplicate visit check above");

            index = next_free_index;
        }

        assert!(
            index == capacity,
            "free list of {} ends at {index} instead of the capacity {capacity}",
            type_name::<T>()
        );

        let occupied_count = (0..capacity)
            .filter(|&i| arena.slot(i).is_some_and(crate::Slot::is_occupied))
            .count();

        assert_eq!(
            to_usize(self.allocated),
            occupied_count,
            "allocation count does not match the occupied slots of {}",
            type_name::<T>()
        );

        assert_eq!(
            visited_count
                .checked_add(self.allocated)
                .expect("both are bounded by capacity"),
            capacity,
            "free list of {} does not reach every vacant slot",
            type_name::<T>()
        );
    }
}
