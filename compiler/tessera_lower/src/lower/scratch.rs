//! Scratch slot lowering: index, load, store and stack-store.
//!
//! Each node maps to exactly one instruction. Direct addressing names the
//! slot as an immediate; indirect addressing evaluates an index expression
//! first and uses the `loads`/`stores` forms.

use tessera_ir::{CompileResult, ExprArena, ExprId, Instr, Op, Operand, Slot, SlotRef};

use crate::context::CompileContext;
use crate::graph::Fragment;

impl CompileContext {
    /// `ScratchIndex`: push the slot's number.
    pub(crate) fn lower_index(
        &mut self,
        arena: &ExprArena,
        id: ExprId,
        slot: Slot,
    ) -> CompileResult<Fragment> {
        self.chain(
            arena,
            Instr::new(Op::Int, id).with_arg(Operand::Slot(slot)),
            &[],
        )
    }

    /// `ScratchLoad`: `load slot`, or `<index> loads`.
    pub(crate) fn lower_load(
        &mut self,
        arena: &ExprArena,
        id: ExprId,
        target: SlotRef,
    ) -> CompileResult<Fragment> {
        match target {
            SlotRef::Static(slot) => self.chain(
                arena,
                Instr::new(Op::Load, id).with_arg(Operand::Slot(slot)),
                &[],
            ),
            SlotRef::Dynamic(index) => self.chain(arena, Instr::new(Op::Loads, id), &[index]),
        }
    }

    /// `ScratchStore`: `<value> store slot`, or `<index> <value> stores`.
    pub(crate) fn lower_store(
        &mut self,
        arena: &ExprArena,
        id: ExprId,
        target: SlotRef,
        value: ExprId,
    ) -> CompileResult<Fragment> {
        match target {
            SlotRef::Static(slot) => self.chain(
                arena,
                Instr::new(Op::Store, id).with_arg(Operand::Slot(slot)),
                &[value],
            ),
            SlotRef::Dynamic(index) => {
                self.chain(arena, Instr::new(Op::Stores, id), &[index, value])
            }
        }
    }

    /// `ScratchStackStore`: a bare `store slot` consuming whatever the
    /// preceding code left on the stack.
    pub(crate) fn lower_stack_store(
        &mut self,
        arena: &ExprArena,
        id: ExprId,
        slot: Slot,
    ) -> CompileResult<Fragment> {
        self.chain(
            arena,
            Instr::new(Op::Store, id).with_arg(Operand::Slot(slot)),
            &[],
        )
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
