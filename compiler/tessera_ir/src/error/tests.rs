use pretty_assertions::assert_eq;

use super::*;

#[test]
fn kinds_and_codes() {
    let cases = [
        (
            CompileError::InvalidSlotId {
                requested: -1,
                num_slots: 256,
            },
            ErrorKind::Input,
            "E0101",
        ),
        (
            CompileError::TypeMismatch {
                expected: ValueType::Uint64,
                actual: ValueType::Bytes,
            },
            ErrorKind::Input,
            "E0102",
        ),
        (
            CompileError::BreakOutsideLoop {
                node: ExprId::new(4),
            },
            ErrorKind::Compile,
            "E0201",
        ),
        (
            CompileError::ContinueOutsideLoop {
                node: ExprId::new(4),
            },
            ErrorKind::Compile,
            "E0202",
        ),
        (CompileError::internal("boom"), ErrorKind::Internal, "E9001"),
    ];

    for (err, kind, code) in cases {
        assert_eq!(err.kind(), kind, "{err}");
        assert_eq!(err.code(), code, "{err}");
    }
}

#[test]
fn messages() {
    assert_eq!(
        CompileError::InvalidSlotId {
            requested: 256,
            num_slots: 256,
        }
        .to_string(),
        "invalid slot id 256, should be in [0, 256)"
    );
    assert_eq!(
        CompileError::BreakOutsideLoop {
            node: ExprId::new(2),
        }
        .to_string(),
        "break is only allowed in a loop (node ExprId(2))"
    );
    assert_eq!(
        CompileError::internal_at(ExprId::new(9), "bad node").to_string(),
        "internal compiler error: bad node (node ExprId(9))"
    );
    assert_eq!(
        CompileError::internal("bad graph").to_string(),
        "internal compiler error: bad graph"
    );
}

#[test]
fn node_attribution() {
    let id = ExprId::new(11);
    assert_eq!(CompileError::BreakOutsideLoop { node: id }.node(), Some(id));
    assert_eq!(CompileError::internal_at(id, "x").node(), Some(id));
    assert_eq!(CompileError::internal("x").node(), None);
}
