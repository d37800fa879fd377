//! Shared test utilities for lowering tests. Only compiled in test builds.

#![allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]

use tessera_ir::{ExprArena, ExprId};

use crate::context::CompileContext;
use crate::graph::{BlockGraph, Fragment};

/// Instructions of a straight-line fragment, rendered as text.
pub(crate) fn ops_text(graph: &BlockGraph, fragment: Fragment) -> Vec<String> {
    graph
        .linear_ops(fragment)
        .unwrap()
        .into_iter()
        .map(ToString::to_string)
        .collect()
}

/// Lower `id` and render its straight-line instructions.
pub(crate) fn lower_text(cx: &mut CompileContext, arena: &ExprArena, id: ExprId) -> Vec<String> {
    let frag = cx.lower(arena, id).unwrap();
    ops_text(cx.graph(), frag)
}

/// Number of branching blocks reachable from `fragment.entry`.
pub(crate) fn branch_count(graph: &BlockGraph, fragment: Fragment) -> usize {
    graph
        .reachable(fragment.entry)
        .into_iter()
        .filter(|&b| !graph.block(b).is_simple())
        .count()
}
