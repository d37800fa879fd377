//! Control flow lowering: `while`, `break` and `continue`.
//!
//! `break` and `continue` cannot know their targets when they are lowered,
//! so they emit an empty anchor block registered on the innermost loop
//! frame (see [`crate::context`]). The loop node wires the anchors once its
//! own exit and re-entry blocks exist.

use tessera_ir::{CompileResult, ExprArena, ExprId};

use crate::context::CompileContext;
use crate::graph::Fragment;

impl CompileContext {
    /// `break`: an empty anchor that the enclosing loop later points at its exit.
    pub(crate) fn lower_break(&mut self, id: ExprId) -> CompileResult<Fragment> {
        let anchor = self.register_break(id)?;
        Ok(Fragment::single(anchor))
    }

    /// `continue`: an empty anchor that the enclosing loop later points at
    /// its condition.
    pub(crate) fn lower_continue(&mut self, id: ExprId) -> CompileResult<Fragment> {
        let anchor = self.register_continue(id)?;
        Ok(Fragment::single(anchor))
    }

    /// `while cond { body }`.
    ///
    /// ```text
    ///   cond ──► branch ──true──► body ──► (back to cond)
    ///              │
    ///              └──false──► exit ◄── break anchors
    /// ```
    ///
    /// Continue anchors re-enter at the start of `cond`.
    pub(crate) fn lower_while(
        &mut self,
        arena: &ExprArena,
        id: ExprId,
        cond: ExprId,
        body: ExprId,
    ) -> CompileResult<Fragment> {
        self.enter_loop(id);

        let cond_frag = self.lower(arena, cond)?;
        let body_frag = self.lower(arena, body)?;
        let exit = self.empty_block();

        let branch = self
            .graph
            .new_branch(Vec::new(), body_frag.entry, exit);
        self.graph.set_next(cond_frag.exit, branch)?;
        // If the body ends in a break or continue anchor, exit_loop relinks it.
        self.graph.set_next(body_frag.exit, cond_frag.entry)?;

        self.exit_loop(exit, cond_frag.entry)?;

        Ok(Fragment {
            entry: cond_frag.entry,
            exit,
        })
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
