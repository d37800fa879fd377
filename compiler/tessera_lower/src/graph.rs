//! Block graph: the basic-block IR that lowering produces.
//!
//! Blocks live in a [`BlockGraph`] and refer to each other by [`BlockId`].
//! A block holds an ordered instruction list and one outgoing [`Edge`]:
//!
//! - [`Edge::None`]: no successor yet. Fragment exits and break/continue
//!   anchors start here and are linked later.
//! - [`Edge::Jump`]: fall through to the next block (a *simple* block).
//! - [`Edge::Branch`]: pop the top of stack, go to `on_true` if non-zero
//!   and `on_false` otherwise.
//!
//! A lowered subtree is described by a [`Fragment`]: the block control
//! enters at and the block it leaves from.

use std::fmt::{self, Write as _};

use rustc_hash::FxHashSet;
use tessera_ir::{CompileError, CompileResult, Instr, Slot};

// ── IDs ─────────────────────────────────────────────────────────────

/// Basic block ID within a [`BlockGraph`]. Allocated sequentially from 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct BlockId(u32);

impl BlockId {
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

// ── Blocks ──────────────────────────────────────────────────────────

/// Outgoing control flow of a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Edge {
    None,
    Jump(BlockId),
    Branch { on_true: BlockId, on_false: BlockId },
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Block {
    pub ops: Vec<Instr>,
    pub edge: Edge,
}

impl Block {
    /// `true` for linear blocks (no branch).
    #[inline]
    pub fn is_simple(&self) -> bool {
        !matches!(self.edge, Edge::Branch { .. })
    }

    /// The fall-through successor of a simple block.
    #[inline]
    pub fn next(&self) -> Option<BlockId> {
        match self.edge {
            Edge::Jump(next) => Some(next),
            Edge::None | Edge::Branch { .. } => None,
        }
    }

    pub fn successors(&self) -> impl Iterator<Item = BlockId> {
        let (a, b) = match self.edge {
            Edge::None => (None, None),
            Edge::Jump(next) => (Some(next), None),
            Edge::Branch { on_true, on_false } => (Some(on_true), Some(on_false)),
        };
        a.into_iter().chain(b)
    }
}

/// Entry and exit block of a lowered subtree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Fragment {
    pub entry: BlockId,
    pub exit: BlockId,
}

impl Fragment {
    /// A fragment consisting of a single block.
    #[inline]
    pub fn single(block: BlockId) -> Self {
        Self {
            entry: block,
            exit: block,
        }
    }
}

// ── Graph ───────────────────────────────────────────────────────────

/// Arena of basic blocks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockGraph {
    blocks: Vec<Block>,
}

impl BlockGraph {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    #[inline]
    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.index()]
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "block indices never exceed u32"
    )]
    fn push(&mut self, block: Block) -> BlockId {
        let id = BlockId::new(self.blocks.len() as u32);
        self.blocks.push(block);
        id
    }

    /// A simple block holding `ops`, with no successor yet.
    pub fn new_simple(&mut self, ops: Vec<Instr>) -> BlockId {
        self.push(Block {
            ops,
            edge: Edge::None,
        })
    }

    /// An empty simple block. Used as a patch anchor for forward references.
    pub fn new_empty(&mut self) -> BlockId {
        self.new_simple(Vec::new())
    }

    /// A branching block that pops the top of stack.
    pub fn new_branch(&mut self, ops: Vec<Instr>, on_true: BlockId, on_false: BlockId) -> BlockId {
        self.push(Block {
            ops,
            edge: Edge::Branch { on_true, on_false },
        })
    }

    /// Make `to` the fall-through successor of `from`.
    ///
    /// Replaces any previous successor. `from` must be a simple block.
    pub fn set_next(&mut self, from: BlockId, to: BlockId) -> CompileResult<()> {
        let block = &mut self.blocks[from.index()];
        if !block.is_simple() {
            return Err(CompileError::internal(format!(
                "cannot set fall-through successor of branching block {from}"
            )));
        }
        block.edge = Edge::Jump(to);
        Ok(())
    }

    pub fn successors(&self, id: BlockId) -> impl Iterator<Item = BlockId> {
        self.block(id).successors()
    }

    // Walks

    /// Instructions of a straight-line fragment, in execution order.
    ///
    /// Follows fall-through edges from `fragment.entry` until
    /// `fragment.exit`. Meeting a branch, a dead end, or a cycle before
    /// the exit is an internal fault.
    pub fn linear_ops(&self, fragment: Fragment) -> CompileResult<Vec<&Instr>> {
        let mut ops = Vec::new();
        let mut seen = FxHashSet::default();
        let mut current = fragment.entry;

        loop {
            if !seen.insert(current) {
                return Err(CompileError::internal(format!(
                    "cycle at {current} while walking straight-line fragment"
                )));
            }
            let block = self.block(current);
            ops.extend(block.ops.iter());
            if current == fragment.exit {
                return Ok(ops);
            }
            match block.edge {
                Edge::Jump(next) => current = next,
                Edge::None => {
                    return Err(CompileError::internal(format!(
                        "{current} ends before reaching fragment exit {}",
                        fragment.exit
                    )))
                }
                Edge::Branch { .. } => {
                    return Err(CompileError::internal(format!(
                        "branch at {current} inside straight-line fragment"
                    )))
                }
            }
        }
    }

    /// Blocks reachable from `entry`, in depth-first preorder.
    pub fn reachable(&self, entry: BlockId) -> Vec<BlockId> {
        let mut order = Vec::new();
        let mut seen = FxHashSet::default();
        let mut stack = vec![entry];

        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            order.push(id);
            let block = self.block(id);
            // Push in reverse so the first successor is visited first.
            let succs: Vec<_> = block.successors().collect();
            stack.extend(succs.into_iter().rev());
        }
        order
    }

    /// Every slot named by an instruction reachable from `entry`.
    pub fn slots_referenced(&self, entry: BlockId) -> FxHashSet<Slot> {
        self.reachable(entry)
            .into_iter()
            .flat_map(|id| self.block(id).ops.iter())
            .filter_map(Instr::slot)
            .collect()
    }

    /// Text listing of the blocks reachable from `entry`.
    pub fn dump(&self, entry: BlockId) -> String {
        let mut out = String::new();
        for id in self.reachable(entry) {
            let block = self.block(id);
            let _ = writeln!(out, "{id}:");
            for op in &block.ops {
                let _ = writeln!(out, "  {op}");
            }
            let _ = match block.edge {
                Edge::None => writeln!(out, "  end"),
                Edge::Jump(next) => writeln!(out, "  jump {next}"),
                Edge::Branch { on_true, on_false } => {
                    writeln!(out, "  branch {on_true}, {on_false}")
                }
            };
        }
        out
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
