//! Stack-machine instructions.
//!
//! Lowering maps each node onto at most one opcode (1:1), so this module
//! only needs the opcodes the lowered nodes use. Slot operands stay
//! symbolic; the assembler assigns physical slot numbers afterwards.

use std::fmt;

use smallvec::SmallVec;

use crate::expr::ExprId;
use crate::slot::Slot;

/// Opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Op {
    /// Push a `uint64` constant (or a slot's number).
    Int,
    /// Push a byte-string constant.
    Byte,
    /// Push the contents of a fixed slot.
    Load,
    /// Pop a value into a fixed slot.
    Store,
    /// Pop a slot number, push that slot's contents.
    Loads,
    /// Pop a value, then a slot number, and store the value there.
    Stores,
}

impl Op {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Op::Int => "int",
            Op::Byte => "byte",
            Op::Load => "load",
            Op::Store => "store",
            Op::Loads => "loads",
            Op::Stores => "stores",
        }
    }
}

/// Immediate operand of an instruction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Operand {
    Uint(u64),
    Bytes(Vec<u8>),
    Slot(Slot),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Uint(n) => write!(f, "{n}"),
            Operand::Bytes(bytes) => {
                f.write_str("0x")?;
                for b in bytes {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
            Operand::Slot(slot) => write!(f, "{slot}"),
        }
    }
}

/// A single instruction, tagged with the node that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Instr {
    pub op: Op,
    pub args: SmallVec<[Operand; 1]>,
    /// Node this instruction was lowered from (for error reporting).
    pub origin: ExprId,
}

impl Instr {
    pub fn new(op: Op, origin: ExprId) -> Self {
        Self {
            op,
            args: SmallVec::new(),
            origin,
        }
    }

    #[must_use]
    pub fn with_arg(mut self, arg: Operand) -> Self {
        self.args.push(arg);
        self
    }

    /// The slot this instruction names, if any.
    pub fn slot(&self) -> Option<Slot> {
        self.args.iter().find_map(|arg| match arg {
            Operand::Slot(slot) => Some(*slot),
            Operand::Uint(_) | Operand::Bytes(_) => None,
        })
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.op.mnemonic())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
