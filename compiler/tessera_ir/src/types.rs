//! Value type lattice.
//!
//! Every expression node has exactly one [`ValueType`], computable without
//! lowering it. Composite constructors consult it to reject ill-typed
//! compositions before lowering runs; lowering itself trusts it.

use std::fmt;

use crate::error::{CompileError, CompileResult};

/// The kind of value an expression leaves on the evaluation stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueType {
    /// 64-bit unsigned integer.
    Uint64,
    /// Byte string.
    Bytes,
    /// Statically unknown; resolved at use.
    Any,
    /// Produces no value.
    None,
}

impl ValueType {
    /// Whether a value of type `actual` may be used where `self` is expected.
    ///
    /// `Any` unifies with every type that produces a value. `None` only
    /// matches `None`.
    pub fn accepts(self, actual: ValueType) -> bool {
        match (self, actual) {
            (ValueType::None, other) | (other, ValueType::None) => other == ValueType::None,
            (ValueType::Any, _) | (_, ValueType::Any) => true,
            (expected, actual) => expected == actual,
        }
    }

    /// Fail with [`CompileError::TypeMismatch`] unless `expected` accepts `actual`.
    pub fn require(expected: ValueType, actual: ValueType) -> CompileResult<()> {
        if expected.accepts(actual) {
            Ok(())
        } else {
            Err(CompileError::TypeMismatch { expected, actual })
        }
    }

    /// Whether this type leaves a value on the stack.
    #[inline]
    pub fn produces_value(self) -> bool {
        self != ValueType::None
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Uint64 => "uint64",
            ValueType::Bytes => "bytes",
            ValueType::Any => "any",
            ValueType::None => "none",
        };
        f.write_str(name)
    }
}
