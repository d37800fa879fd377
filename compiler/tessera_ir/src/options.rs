use crate::slot::{SlotAllocator, NUM_SLOTS};

/// Per-compilation configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct CompileOptions {
    /// Size of the caller-reserved slot id range, `[0, num_slots)`.
    pub num_slots: u32,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            num_slots: NUM_SLOTS,
        }
    }
}

impl CompileOptions {
    #[must_use]
    pub fn with_num_slots(mut self, num_slots: u32) -> Self {
        self.num_slots = num_slots;
        self
    }

    /// A fresh allocator for one compilation under these options.
    pub fn slot_allocator(&self) -> SlotAllocator {
        SlotAllocator::new(self.num_slots)
    }
}
