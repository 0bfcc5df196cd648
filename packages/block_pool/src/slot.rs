use std::mem;

/// One cell of an arena.
///
/// A vacant slot reuses the payload storage for its free list link, so a slot costs the size of
/// `T` (or the link, if larger) plus the enum tag and the generation counter.
#[derive(Debug)]
pub(crate) struct Slot<T> {
    /// Incremented every time the slot goes from occupied to vacant. A handle remembers the
    /// generation it was issued at, so a mismatch means its allocation is gone.
    generation: u64,

    state: SlotState<T>,
}

#[derive(Debug)]
enum SlotState<T> {
    Occupied { value: T },

    /// Index of the next vacant slot. Equal to the arena capacity at the end of the list.
    Vacant { next_free_index: u32 },
}

impl<T> Slot<T> {
    #[must_use]
    pub(crate) fn vacant(next_free_index: u32) -> Self {
        Self {
            generation: 0,
            state: SlotState::Vacant { next_free_index },
        }
    }

    #[must_use]
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub(crate) fn is_occupied(&self) -> bool {
        matches!(self.state, SlotState::Occupied { .. })
    }

    /// Whether the slot still holds the allocation that was made at `generation`.
    #[must_use]
    pub(crate) fn is_occupied_at(&self, generation: u64) -> bool {
        self.is_occupied() && self.generation == generation
    }

    /// The free list link of a vacant slot, `None` if occupied.
    #[must_use]
    pub(crate) fn next_free_index(&self) -> Option<u32> {
        match self.state {
            SlotState::Vacant { next_free_index } => Some(next_free_index),
            SlotState::Occupied { .. } => None,
        }
    }

    #[must_use]
    pub(crate) fn value(&self) -> Option<&T> {
        match &self.state {
            SlotState::Occupied { value } => Some(value),
            SlotState::Vacant { .. } => None,
        }
    }

    #[must_use]
    pub(crate) fn value_mut(&mut self) -> Option<&mut T> {
        match &mut self.state {
            SlotState::Occupied { value } => Some(value),
            SlotState::Vacant { .. } => None,
        }
    }

    /// Stores `value` in a vacant slot and returns the link the slot held.
    ///
    /// # Panics
    ///
    /// Panics if the slot is already occupied.
    pub(crate) fn occupy(&mut self, value: T) -> u32 {
        match mem::replace(&mut self.state, SlotState::Occupied { value }) {
            SlotState::Vacant { next_free_index } => next_free_index,
            SlotState::Occupied { .. } => {
                panic!("slot was occupied when an allocation was placed into it")
            }
        }
    }

    /// Moves the value out of an occupied slot, links the slot to `next_free_index` and starts
    /// a new generation. Returns `None` and leaves the slot untouched if it is already vacant.
    pub(crate) fn vacate(&mut self, next_free_index: u32) -> Option<T> {
        if !self.is_occupied() {
            return None;
        }

        let previous = mem::replace(&mut self.state, SlotState::Vacant { next_free_index });

        self.generation = self
            .generation
            .checked_add(1)
            .expect("a slot cannot be freed 2^64 times in the lifetime of a process");

        match previous {
            SlotState::Occupied { value } => Some(value),
            SlotState::Vacant { .. } => unreachable!("checked for occupancy above"),
        }
    }
}
