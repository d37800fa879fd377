//! Scratch slots and their allocator.
//!
//! A [`Slot`] is a virtual-register identity. Ids in `[0, num_slots)` are
//! *reserved*: the caller picked them and the assembler must honor them.
//! Ids from `num_slots` upward are *auto-assigned* by a [`SlotAllocator`]
//! and later mapped onto whatever physical slots remain free.
//!
//! The allocator is an ordinary value owned by one compilation, so two
//! compilations never share a counter.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{CompileError, CompileResult};

/// Default size of the reserved id range (the VM's scratch space).
pub const NUM_SLOTS: u32 = 256;

/// A scratch slot identity.
///
/// Equality and hashing use the id alone. Many load/store nodes may name
/// the same slot; that aliasing is how the front end models variables.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Slot {
    id: u32,
    reserved: bool,
}

impl Slot {
    #[inline]
    pub fn id(self) -> u32 {
        self.id
    }

    /// `true` if the caller requested this exact id.
    #[inline]
    pub fn is_reserved(self) -> bool {
        self.reserved
    }
}

impl PartialEq for Slot {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Slot {}

impl Hash for Slot {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot#{}", self.id)
    }
}

/// Hands out slot identities for one compilation.
///
/// Auto-assigned ids start at `num_slots` and only grow, so they can never
/// collide with a reserved id.
#[derive(Clone, Debug)]
pub struct SlotAllocator {
    num_slots: u32,
    next_id: u32,
    allocated: Vec<Slot>,
}

impl Default for SlotAllocator {
    fn default() -> Self {
        Self::new(NUM_SLOTS)
    }
}

impl SlotAllocator {
    pub fn new(num_slots: u32) -> Self {
        Self {
            num_slots,
            next_id: num_slots,
            allocated: Vec::new(),
        }
    }

    /// Size of the reserved range.
    #[inline]
    pub fn num_slots(&self) -> u32 {
        self.num_slots
    }

    /// Allocate a slot.
    ///
    /// With `requested = None` the next auto id is taken. With
    /// `Some(id)` the id must lie in `[0, num_slots)`; anything else is a
    /// caller error.
    pub fn allocate(&mut self, requested: Option<i64>) -> CompileResult<Slot> {
        let slot = match requested {
            None => {
                let id = self.next_id;
                self.next_id = id
                    .checked_add(1)
                    .ok_or_else(|| CompileError::internal("scratch slot ids exhausted"))?;
                Slot { id, reserved: false }
            }
            Some(requested) => {
                let id = u32::try_from(requested)
                    .ok()
                    .filter(|&id| id < self.num_slots)
                    .ok_or(CompileError::InvalidSlotId {
                        requested,
                        num_slots: self.num_slots,
                    })?;
                Slot { id, reserved: true }
            }
        };

        tracing::debug!(slot = slot.id, reserved = slot.reserved, "allocated scratch slot");
        self.allocated.push(slot);
        Ok(slot)
    }

    /// Allocate the next auto-assigned slot.
    pub fn fresh(&mut self) -> CompileResult<Slot> {
        self.allocate(None)
    }

    /// Every slot handed out so far, in allocation order.
    pub fn allocated(&self) -> &[Slot] {
        &self.allocated
    }

    /// Number of auto-assigned slots handed out so far.
    pub fn auto_count(&self) -> u32 {
        self.next_id - self.num_slots
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
