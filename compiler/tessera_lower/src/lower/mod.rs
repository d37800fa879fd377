//! Expression → block graph lowering.
//!
//! Every node lowers to a [`Fragment`]: the block control enters at and the
//! block it leaves from, with the node's value (if any) left on the
//! evaluation stack. Parents stitch child fragments together by pointing one
//! fragment's exit at the next one's entry.
//!
//! # Architecture
//!
//! - [`CompileContext::lower`]: dispatch on [`ExprKind`].
//! - [`CompileContext::chain`]: the shared helper for 1:1 nodes: lower the
//!   operands in order, then run one instruction.
//! - `scratch.rs`: slot index, load, store and stack-store nodes.
//! - `control_flow.rs`: `break`, `continue` and `while`.

mod control_flow;
mod scratch;

use tessera_ir::{CompileResult, ExprArena, ExprId, ExprKind, ExprRange, Instr, Op, Operand};

use crate::context::{CompileContext, Lowered};
use crate::graph::{BlockId, Fragment};
use crate::stack::ensure_sufficient_stack;

impl CompileContext {
    /// Lower the node `id` and everything below it.
    pub fn lower(&mut self, arena: &ExprArena, id: ExprId) -> CompileResult<Fragment> {
        ensure_sufficient_stack(|| self.lower_node(arena, id))
    }

    fn lower_node(&mut self, arena: &ExprArena, id: ExprId) -> CompileResult<Fragment> {
        let kind = arena.kind(id);
        tracing::trace!(id = id.raw(), kind = kind.name(), "lower");

        match kind {
            ExprKind::Int(n) => self.chain(
                arena,
                Instr::new(Op::Int, id).with_arg(Operand::Uint(*n)),
                &[],
            ),
            ExprKind::Bytes(bytes) => self.chain(
                arena,
                Instr::new(Op::Byte, id).with_arg(Operand::Bytes(bytes.clone())),
                &[],
            ),
            ExprKind::Seq(items) => self.lower_seq(arena, *items),

            ExprKind::While { cond, body } => self.lower_while(arena, id, *cond, *body),
            ExprKind::Break => self.lower_break(id),
            ExprKind::Continue => self.lower_continue(id),

            ExprKind::ScratchIndex(slot) => self.lower_index(arena, id, *slot),
            ExprKind::ScratchLoad { target, .. } => self.lower_load(arena, id, *target),
            ExprKind::ScratchStore { target, value } => {
                self.lower_store(arena, id, *target, *value)
            }
            ExprKind::ScratchStackStore(slot) => self.lower_stack_store(arena, id, *slot),
        }
    }

    /// Lower `operands` left to right, link them back to back, and finish
    /// with a block holding `instr`.
    ///
    /// The instruction order of the result is every operand's instructions
    /// in turn followed by `instr`, however many blocks each operand used.
    pub fn chain(
        &mut self,
        arena: &ExprArena,
        instr: Instr,
        operands: &[ExprId],
    ) -> CompileResult<Fragment> {
        let mut head: Option<Fragment> = None;
        for &operand in operands {
            let frag = self.lower(arena, operand)?;
            head = Some(self.link(head, frag)?);
        }

        let op_block = self.graph.new_simple(vec![instr]);
        self.link(head, Fragment::single(op_block))
    }

    /// `Seq`: each item runs after the previous one. An empty sequence is
    /// a single empty block.
    fn lower_seq(&mut self, arena: &ExprArena, items: ExprRange) -> CompileResult<Fragment> {
        let mut head: Option<Fragment> = None;
        for &item in arena.list(items) {
            let frag = self.lower(arena, item)?;
            head = Some(self.link(head, frag)?);
        }

        match head {
            Some(frag) => Ok(frag),
            None => Ok(Fragment::single(self.graph.new_empty())),
        }
    }

    /// Append `next` after `prev` (if any) and return the combined fragment.
    fn link(&mut self, prev: Option<Fragment>, next: Fragment) -> CompileResult<Fragment> {
        match prev {
            None => Ok(next),
            Some(prev) => {
                self.graph.set_next(prev.exit, next.entry)?;
                Ok(Fragment {
                    entry: prev.entry,
                    exit: next.exit,
                })
            }
        }
    }

    /// A fresh empty block, for loop exits and similar join points.
    pub(crate) fn empty_block(&mut self) -> BlockId {
        self.graph.new_empty()
    }
}

/// Lower the tree rooted at `root` and finish the context.
///
/// `cx` is normally the same context the front end drew its slots from
/// while building `arena`.
pub fn lower_program(
    mut cx: CompileContext,
    arena: &ExprArena,
    root: ExprId,
) -> CompileResult<Lowered> {
    let fragment = cx.lower(arena, root)?;
    tracing::debug!(
        blocks = cx.graph().len(),
        entry = %fragment.entry,
        exit = %fragment.exit,
        "lowered program"
    );
    cx.finish(fragment)
}

// Tests

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
