//! Compilation context threaded through every lowering call.
//!
//! Owns everything mutable about one compilation: the slot allocator, the
//! block graph under construction, and the stack of active loops. Create
//! one per compilation; nothing here is shared between compilations.
//!
//! # Loop exits
//!
//! A `break` is lowered before its loop knows where the loop ends, so it
//! cannot jump anywhere yet. Instead it gets an empty anchor block that is
//! registered on the innermost [`LoopFrame`]. When the loop has finished
//! lowering it calls [`CompileContext::exit_loop`], which pops the frame
//! and points every anchor at the now-known exit. `continue` works the
//! same way with the loop's re-entry block.
//!
//! Each frame owns its own lists, so a nested loop only ever drains the
//! anchors registered while its own body was being lowered.

use tessera_ir::{CompileError, CompileOptions, CompileResult, ExprId, Slot, SlotAllocator};

use crate::graph::{BlockGraph, BlockId, Fragment};

/// One active loop and the anchors waiting for its exit/re-entry block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoopFrame {
    /// The loop node that pushed this frame.
    pub node: ExprId,
    breaks: Vec<BlockId>,
    continues: Vec<BlockId>,
}

impl LoopFrame {
    fn new(node: ExprId) -> Self {
        Self {
            node,
            breaks: Vec::new(),
            continues: Vec::new(),
        }
    }

    /// Break anchors registered so far, in lowering order.
    pub fn breaks(&self) -> &[BlockId] {
        &self.breaks
    }

    /// Continue anchors registered so far, in lowering order.
    pub fn continues(&self) -> &[BlockId] {
        &self.continues
    }
}

/// What [`CompileContext::exit_loop`] wired up.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoopExit {
    pub breaks: Vec<BlockId>,
    pub continues: Vec<BlockId>,
}

/// Shared state for lowering one expression tree.
#[derive(Debug)]
pub struct CompileContext {
    options: CompileOptions,
    slots: SlotAllocator,
    pub(crate) graph: BlockGraph,
    loops: Vec<LoopFrame>,
}

impl Default for CompileContext {
    fn default() -> Self {
        Self::new(CompileOptions::default())
    }
}

impl CompileContext {
    pub fn new(options: CompileOptions) -> Self {
        Self {
            options,
            slots: options.slot_allocator(),
            graph: BlockGraph::new(),
            loops: Vec::new(),
        }
    }

    #[inline]
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    #[inline]
    pub fn slots(&self) -> &SlotAllocator {
        &self.slots
    }

    /// The allocator the front end draws slots from while building the tree.
    #[inline]
    pub fn slots_mut(&mut self) -> &mut SlotAllocator {
        &mut self.slots
    }

    #[inline]
    pub fn graph(&self) -> &BlockGraph {
        &self.graph
    }

    #[inline]
    pub fn graph_mut(&mut self) -> &mut BlockGraph {
        &mut self.graph
    }

    // Loop stack

    /// Number of loops currently being lowered.
    #[inline]
    pub fn loop_depth(&self) -> usize {
        self.loops.len()
    }

    /// The innermost active loop, if any.
    #[inline]
    pub fn current_loop(&self) -> Option<&LoopFrame> {
        self.loops.last()
    }

    /// Push a frame for `node`. Call before lowering the loop body.
    pub fn enter_loop(&mut self, node: ExprId) {
        self.loops.push(LoopFrame::new(node));
        tracing::debug!(node = node.raw(), depth = self.loops.len(), "enter loop");
    }

    /// Create and register a `break` anchor on the innermost loop.
    pub fn register_break(&mut self, node: ExprId) -> CompileResult<BlockId> {
        let Some(frame) = self.loops.last_mut() else {
            return Err(CompileError::BreakOutsideLoop { node });
        };
        let anchor = self.graph.new_empty();
        frame.breaks.push(anchor);
        tracing::trace!(node = node.raw(), %anchor, "register break");
        Ok(anchor)
    }

    /// Create and register a `continue` anchor on the innermost loop.
    pub fn register_continue(&mut self, node: ExprId) -> CompileResult<BlockId> {
        let Some(frame) = self.loops.last_mut() else {
            return Err(CompileError::ContinueOutsideLoop { node });
        };
        let anchor = self.graph.new_empty();
        frame.continues.push(anchor);
        tracing::trace!(node = node.raw(), %anchor, "register continue");
        Ok(anchor)
    }

    /// Pop the innermost loop and wire its anchors.
    ///
    /// Every break anchor registered on the frame now falls through to
    /// `exit`, every continue anchor to `reentry`. Anchors of enclosing
    /// loops are left alone.
    pub fn exit_loop(&mut self, exit: BlockId, reentry: BlockId) -> CompileResult<LoopExit> {
        let frame = self
            .loops
            .pop()
            .ok_or_else(|| CompileError::internal("exit_loop called with no active loop"))?;

        for &anchor in &frame.breaks {
            self.graph.set_next(anchor, exit)?;
        }
        for &anchor in &frame.continues {
            self.graph.set_next(anchor, reentry)?;
        }

        tracing::debug!(
            node = frame.node.raw(),
            breaks = frame.breaks.len(),
            continues = frame.continues.len(),
            %exit,
            "exit loop"
        );

        Ok(LoopExit {
            breaks: frame.breaks,
            continues: frame.continues,
        })
    }

    // Finalization

    /// Consume the context and hand the graph to the linearizer.
    ///
    /// Fails if a loop frame is still open, which means some loop node
    /// forgot to drain.
    pub fn finish(self, root: Fragment) -> CompileResult<Lowered> {
        if let Some(frame) = self.loops.last() {
            return Err(CompileError::internal_at(
                frame.node,
                format!("{} loop frame(s) left open after lowering", self.loops.len()),
            ));
        }
        Ok(Lowered {
            slots: self.slots.allocated().to_vec(),
            graph: self.graph,
            root,
        })
    }
}

/// Result of one compilation: the finished graph and the root fragment.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Lowered {
    pub graph: BlockGraph,
    pub root: Fragment,
    /// Every slot the allocator handed out, in allocation order.
    pub slots: Vec<Slot>,
}

impl Lowered {
    /// Listing of the blocks reachable from the root.
    pub fn dump(&self) -> String {
        self.graph.dump(self.root.entry)
    }
}

#[cfg(feature = "cache")]
impl Lowered {
    /// Serialize for an out-of-process linearizer.
    pub fn encode(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
