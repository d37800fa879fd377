use pretty_assertions::assert_eq;
use tessera_ir::{ErrorKind, ExprId, Op, Operand, SlotAllocator};

use super::*;

fn int(n: u64) -> Instr {
    Instr::new(Op::Int, ExprId::new(0)).with_arg(Operand::Uint(n))
}

#[test]
fn blocks_are_numbered_sequentially() {
    let mut graph = BlockGraph::new();
    assert_eq!(graph.new_empty(), BlockId::new(0));
    assert_eq!(graph.new_simple(vec![int(1)]), BlockId::new(1));
    assert_eq!(graph.len(), 2);
}

#[test]
fn new_blocks_have_no_successor() {
    let mut graph = BlockGraph::new();
    let b = graph.new_empty();
    assert_eq!(graph.block(b).edge, Edge::None);
    assert!(graph.block(b).is_simple());
    assert_eq!(graph.successors(b).count(), 0);
}

#[test]
fn set_next_links_and_relinks() {
    let mut graph = BlockGraph::new();
    let a = graph.new_empty();
    let b = graph.new_empty();
    let c = graph.new_empty();

    graph.set_next(a, b).unwrap();
    assert_eq!(graph.block(a).next(), Some(b));

    graph.set_next(a, c).unwrap();
    assert_eq!(graph.block(a).next(), Some(c));
}

#[test]
fn set_next_on_branch_is_internal() {
    let mut graph = BlockGraph::new();
    let t = graph.new_empty();
    let f = graph.new_empty();
    let br = graph.new_branch(Vec::new(), t, f);

    let err = graph.set_next(br, t).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert_eq!(graph.successors(br).collect::<Vec<_>>(), vec![t, f]);
}

#[test]
fn linear_ops_crosses_block_boundaries() {
    let mut graph = BlockGraph::new();
    let a = graph.new_simple(vec![int(1), int(2)]);
    let empty = graph.new_empty();
    let b = graph.new_simple(vec![int(3)]);
    graph.set_next(a, empty).unwrap();
    graph.set_next(empty, b).unwrap();

    let ops: Vec<String> = graph
        .linear_ops(Fragment { entry: a, exit: b })
        .unwrap()
        .into_iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(ops, vec!["int 1", "int 2", "int 3"]);
}

#[test]
fn linear_ops_rejects_dead_end_and_branch() {
    let mut graph = BlockGraph::new();
    let a = graph.new_empty();
    let b = graph.new_empty();
    assert!(graph.linear_ops(Fragment { entry: a, exit: b }).is_err());

    let br = graph.new_branch(Vec::new(), a, b);
    assert!(graph.linear_ops(Fragment { entry: br, exit: b }).is_err());
}

#[test]
fn linear_ops_rejects_cycles() {
    let mut graph = BlockGraph::new();
    let a = graph.new_empty();
    let b = graph.new_empty();
    let never = graph.new_empty();
    graph.set_next(a, b).unwrap();
    graph.set_next(b, a).unwrap();

    let err = graph
        .linear_ops(Fragment {
            entry: a,
            exit: never,
        })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
}

#[test]
fn reachable_is_preorder_and_handles_cycles() {
    let mut graph = BlockGraph::new();
    let head = graph.new_empty();
    let body = graph.new_empty();
    let exit = graph.new_empty();
    let unreachable = graph.new_empty();
    let cond = graph.new_branch(Vec::new(), body, exit);
    graph.set_next(head, cond).unwrap();
    graph.set_next(body, head).unwrap();
    graph.set_next(unreachable, head).unwrap();

    assert_eq!(graph.reachable(head), vec![head, cond, body, exit]);
}

#[test]
fn slots_referenced_collects_reachable_slot_operands() {
    let mut slots = SlotAllocator::default();
    let s1 = slots.fresh().unwrap();
    let s2 = slots.fresh().unwrap();
    let s3 = slots.fresh().unwrap();

    let mut graph = BlockGraph::new();
    let load = Instr::new(Op::Load, ExprId::new(0)).with_arg(Operand::Slot(s1));
    let store = Instr::new(Op::Store, ExprId::new(1)).with_arg(Operand::Slot(s2));
    let orphan = Instr::new(Op::Store, ExprId::new(2)).with_arg(Operand::Slot(s3));

    let a = graph.new_simple(vec![load, int(4)]);
    let b = graph.new_simple(vec![store]);
    graph.new_simple(vec![orphan]);
    graph.set_next(a, b).unwrap();

    let found = graph.slots_referenced(a);
    assert_eq!(found.len(), 2);
    assert!(found.contains(&s1));
    assert!(found.contains(&s2));
    assert!(!found.contains(&s3));
}

#[test]
fn dump_lists_blocks_and_edges() {
    let mut graph = BlockGraph::new();
    let a = graph.new_simple(vec![int(1)]);
    let t = graph.new_empty();
    let f = graph.new_empty();
    let br = graph.new_branch(Vec::new(), t, f);
    graph.set_next(a, br).unwrap();

    assert_eq!(
        graph.dump(a),
        "bb0:\n  int 1\n  jump bb3\nbb3:\n  branch bb1, bb2\nbb1:\n  end\nbb2:\n  end\n"
    );
}
