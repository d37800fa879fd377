//! Compilation errors.
//!
//! Lowering aborts on the first error; nothing produced before the failure
//! is usable. Errors fall into three kinds (see [`ErrorKind`]) so tooling
//! can present user mistakes differently from compiler defects.

use crate::expr::ExprId;
use crate::types::ValueType;

/// Result alias used across the compiler crates.
pub type CompileResult<T> = Result<T, CompileError>;

/// Coarse classification of a [`CompileError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad input from the caller (out-of-range slot id, ill-typed operand).
    Input,
    /// Structurally invalid program (e.g. `break` with no enclosing loop).
    Compile,
    /// Violated internal invariant. Indicates a defect upstream of lowering,
    /// never an ordinary user mistake.
    Internal,
}

/// Error produced while building or lowering an expression tree.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// A reserved slot id outside `[0, num_slots)`.
    #[error("invalid slot id {requested}, should be in [0, {num_slots})")]
    InvalidSlotId { requested: i64, num_slots: u32 },

    /// An operand's value type is incompatible with what its parent needs.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: ValueType,
        actual: ValueType,
    },

    /// `break` lowered with an empty loop stack.
    #[error("break is only allowed in a loop (node {node:?})")]
    BreakOutsideLoop { node: ExprId },

    /// `continue` lowered with an empty loop stack.
    #[error("continue is only allowed in a loop (node {node:?})")]
    ContinueOutsideLoop { node: ExprId },

    /// Internal consistency fault.
    #[error("internal compiler error: {message}{}", node_suffix(.node.as_ref()))]
    Internal {
        message: String,
        node: Option<ExprId>,
    },
}

fn node_suffix(node: Option<&ExprId>) -> String {
    match node {
        Some(id) => format!(" (node {id:?})"),
        None => String::new(),
    }
}

impl CompileError {
    /// Internal fault attributed to a specific node.
    pub fn internal_at(node: ExprId, message: impl Into<String>) -> Self {
        CompileError::Internal {
            message: message.into(),
            node: Some(node),
        }
    }

    /// Internal fault with no node to blame.
    pub fn internal(message: impl Into<String>) -> Self {
        CompileError::Internal {
            message: message.into(),
            node: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::InvalidSlotId { .. } | CompileError::TypeMismatch { .. } => {
                ErrorKind::Input
            }
            CompileError::BreakOutsideLoop { .. } | CompileError::ContinueOutsideLoop { .. } => {
                ErrorKind::Compile
            }
            CompileError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Stable, searchable error code.
    ///
    /// - E01xx: input errors
    /// - E02xx: structural compile errors
    /// - E9xxx: internal compiler errors
    pub fn code(&self) -> &'static str {
        match self {
            CompileError::InvalidSlotId { .. } => "E0101",
            CompileError::TypeMismatch { .. } => "E0102",
            CompileError::BreakOutsideLoop { .. } => "E0201",
            CompileError::ContinueOutsideLoop { .. } => "E0202",
            CompileError::Internal { .. } => "E9001",
        }
    }

    /// The node this error points at, if any.
    pub fn node(&self) -> Option<ExprId> {
        match self {
            CompileError::BreakOutsideLoop { node } | CompileError::ContinueOutsideLoop { node } => {
                Some(*node)
            }
            CompileError::Internal { node, .. } => *node,
            CompileError::InvalidSlotId { .. } | CompileError::TypeMismatch { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests;
