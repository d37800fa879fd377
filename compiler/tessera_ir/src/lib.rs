//! Front-end facing IR for the Tessera compiler.
//!
//! This crate provides:
//!
//! - **Value types** ([`ValueType`]): the closed lattice used to reject
//!   ill-typed compositions before lowering.
//! - **Scratch slots** ([`Slot`], [`SlotAllocator`]): virtual-register
//!   identities, split into caller-reserved ids below `num_slots` and
//!   compiler-assigned ids above it.
//! - **Expression nodes** ([`ExprArena`], [`ExprKind`], [`SlotRef`]): the
//!   tree the front end builds and the lowering pass consumes.
//! - **Instructions** ([`Instr`], [`Op`], [`Operand`]): what lowering emits
//!   into basic blocks.
//! - **Errors** ([`CompileError`], [`ErrorKind`]).
//!
//! # Crate Dependencies
//!
//! No dependency on the lowering crate. Block graphs and the lowering
//! context live in `tessera_lower`.

mod error;
mod expr;
mod instr;
mod options;
mod slot;
mod types;

pub use error::{CompileError, CompileResult, ErrorKind};
pub use expr::{ExprArena, ExprId, ExprKind, ExprRange, SlotRef};
pub use instr::{Instr, Op, Operand};
pub use options::CompileOptions;
pub use slot::{Slot, SlotAllocator, NUM_SLOTS};
pub use types::ValueType;
