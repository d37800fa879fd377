//! Lowering for the Tessera compiler.
//!
//! This crate turns the expression tree built with `tessera_ir` into a
//! graph of basic blocks ready for linearization:
//!
//! - **Block graph** ([`BlockGraph`], [`Block`], [`Edge`], [`Fragment`]):
//!   blocks of instructions joined by fall-through and two-way branch edges.
//!
//! - **Compile context** ([`CompileContext`]): per-compilation state, holding the
//!   scratch slot allocator, the graph under construction and the stack of
//!   active loops ([`LoopFrame`]).
//!
//! - **Lowering** ([`CompileContext::lower`], [`lower_program`]): one
//!   fragment per node. Scratch nodes map to a single instruction each;
//!   `break`/`continue` leave anchor blocks that the enclosing loop wires
//!   to its exit and condition ([`CompileContext::exit_loop`]).
//!
//! # Crate Dependencies
//!
//! `tessera_lower` depends on `tessera_ir` for expression nodes, slots,
//! instructions and errors. With the `cache` feature, [`Lowered`] can be
//! serialized for a linearizer running in another process.

mod context;
pub mod graph;
mod lower;
mod stack;

#[cfg(test)]
mod test_helpers;

use std::sync::Once;

pub use context::{CompileContext, LoopExit, LoopFrame, Lowered};
pub use graph::{Block, BlockGraph, BlockId, Edge, Fragment};
pub use lower::lower_program;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=tessera_lower=debug` or `RUST_LOG=tessera_lower=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
