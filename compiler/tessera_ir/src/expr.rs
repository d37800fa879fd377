//! Expression nodes and their arena.
//!
//! The front end builds an expression tree by pushing nodes into an
//! [`ExprArena`]; children are referenced by [`ExprId`]. Each node's
//! [`ValueType`] is computed once at construction, so it is available to
//! parents without lowering anything.
//!
//! # Scratch addressing
//!
//! Loads and stores name their target through [`SlotRef`], which is either
//! a compile-time [`Slot`] (direct addressing) or an index expression
//! evaluated at run time (indirect addressing). Being a two-variant enum,
//! a node can never carry both or neither.

use std::fmt;

use crate::error::{CompileError, CompileResult};
use crate::slot::Slot;
use crate::types::ValueType;

// ── IDs ─────────────────────────────────────────────────────────────

/// Index of a node in an [`ExprArena`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct ExprId(u32);

impl ExprId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExprId({})", self.0)
    }
}

/// A contiguous run of child ids stored in the arena's flat list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ExprRange {
    start: u32,
    len: u32,
}

impl ExprRange {
    #[inline]
    pub fn len(self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.len == 0
    }
}

// ── Addressing ──────────────────────────────────────────────────────

/// Target of a scratch load or store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotRef {
    /// Direct: the slot is fixed at compile time.
    Static(Slot),
    /// Indirect: the slot number is computed by a `uint64` expression.
    Dynamic(ExprId),
}

impl SlotRef {
    /// Build a reference from optional parts.
    ///
    /// Exactly one of `slot` and `index` must be given. Anything else is a
    /// construction bug in the caller and reported as an internal fault.
    pub fn from_parts(slot: Option<Slot>, index: Option<ExprId>) -> CompileResult<SlotRef> {
        match (slot, index) {
            (Some(slot), None) => Ok(SlotRef::Static(slot)),
            (None, Some(index)) => Ok(SlotRef::Dynamic(index)),
            (Some(_), Some(_)) | (None, None) => Err(CompileError::internal(
                "exactly one of slot or index expression must be provided",
            )),
        }
    }

    /// The static slot, if this is a direct reference.
    pub fn as_static(self) -> Option<Slot> {
        match self {
            SlotRef::Static(slot) => Some(slot),
            SlotRef::Dynamic(_) => None,
        }
    }
}

impl From<Slot> for SlotRef {
    fn from(slot: Slot) -> Self {
        SlotRef::Static(slot)
    }
}

// ── Nodes ───────────────────────────────────────────────────────────

/// Expression node kinds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExprKind {
    /// `uint64` literal.
    Int(u64),
    /// Byte-string literal.
    Bytes(Vec<u8>),
    /// Evaluate children in order; the value is the last child's.
    Seq(ExprRange),
    /// Repeat `body` while `cond` is non-zero.
    While { cond: ExprId, body: ExprId },
    /// Leave the innermost enclosing loop.
    Break,
    /// Jump back to the innermost enclosing loop's condition.
    Continue,
    /// Numeric address of a slot, for building indirect references.
    ScratchIndex(Slot),
    /// Read a slot.
    ScratchLoad { target: SlotRef, ty: ValueType },
    /// Evaluate `value` and write it to a slot.
    ScratchStore { target: SlotRef, value: ExprId },
    /// Write the value currently on top of the evaluation stack to `slot`.
    ///
    /// This bypasses expression composition entirely: no child produces
    /// the stored value. It is unchecked; if the caller's stack discipline
    /// is wrong the generated program stores garbage or underflows.
    ScratchStackStore(Slot),
}

impl ExprKind {
    /// Short name used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            ExprKind::Int(_) => "Int",
            ExprKind::Bytes(_) => "Bytes",
            ExprKind::Seq(_) => "Seq",
            ExprKind::While { .. } => "While",
            ExprKind::Break => "Break",
            ExprKind::Continue => "Continue",
            ExprKind::ScratchIndex(_) => "ScratchIndex",
            ExprKind::ScratchLoad { .. } => "ScratchLoad",
            ExprKind::ScratchStore { .. } => "ScratchStore",
            ExprKind::ScratchStackStore(_) => "ScratchStackStore",
        }
    }
}

// ── Arena ───────────────────────────────────────────────────────────

/// Arena of expression nodes.
///
/// Parallel `kinds`/`types` arrays indexed by [`ExprId`], plus a flat list
/// for variadic children indexed by [`ExprRange`].
#[derive(Clone, Debug, Default)]
pub struct ExprArena {
    kinds: Vec<ExprKind>,
    types: Vec<ValueType>,
    expr_lists: Vec<ExprId>,
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "arena sizes never exceed u32"
)]
fn to_u32(len: usize) -> u32 {
    debug_assert!(u32::try_from(len).is_ok(), "expression arena overflow");
    len as u32
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: ExprKind, ty: ValueType) -> ExprId {
        let id = ExprId::new(to_u32(self.kinds.len()));
        tracing::trace!(id = id.raw(), kind = kind.name(), %ty, "push expr");
        self.kinds.push(kind);
        self.types.push(ty);
        id
    }

    fn push_list(&mut self, ids: &[ExprId]) -> ExprRange {
        let start = to_u32(self.expr_lists.len());
        self.expr_lists.extend_from_slice(ids);
        ExprRange {
            start,
            len: to_u32(ids.len()),
        }
    }

    /// Number of nodes in the arena.
    #[inline]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    #[inline]
    pub fn kind(&self, id: ExprId) -> &ExprKind {
        &self.kinds[id.index()]
    }

    /// The node's value type. Never requires lowering.
    #[inline]
    pub fn type_of(&self, id: ExprId) -> ValueType {
        self.types[id.index()]
    }

    pub fn list(&self, range: ExprRange) -> &[ExprId] {
        let start = range.start as usize;
        &self.expr_lists[start..start + range.len()]
    }

    // Literals

    pub fn int(&mut self, value: u64) -> ExprId {
        self.push(ExprKind::Int(value), ValueType::Uint64)
    }

    pub fn bytes(&mut self, value: impl Into<Vec<u8>>) -> ExprId {
        self.push(ExprKind::Bytes(value.into()), ValueType::Bytes)
    }

    // Control flow

    /// Sequence of expressions. Every element but the last must produce no value.
    pub fn seq(&mut self, items: &[ExprId]) -> CompileResult<ExprId> {
        if let Some((_, init)) = items.split_last() {
            for &item in init {
                ValueType::require(ValueType::None, self.type_of(item))?;
            }
        }
        let ty = items
            .last()
            .map_or(ValueType::None, |&last| self.type_of(last));
        let range = self.push_list(items);
        Ok(self.push(ExprKind::Seq(range), ty))
    }

    /// `while cond { body }`. `cond` must be `uint64`; `body` must produce no value.
    pub fn while_loop(&mut self, cond: ExprId, body: ExprId) -> CompileResult<ExprId> {
        ValueType::require(ValueType::Uint64, self.type_of(cond))?;
        ValueType::require(ValueType::None, self.type_of(body))?;
        Ok(self.push(ExprKind::While { cond, body }, ValueType::None))
    }

    pub fn break_expr(&mut self) -> ExprId {
        self.push(ExprKind::Break, ValueType::None)
    }

    pub fn continue_expr(&mut self) -> ExprId {
        self.push(ExprKind::Continue, ValueType::None)
    }

    // Scratch space

    /// The numeric address of `slot`.
    pub fn index(&mut self, slot: Slot) -> ExprId {
        self.push(ExprKind::ScratchIndex(slot), ValueType::Uint64)
    }

    /// Load from a fixed slot. `ty` is the type the caller expects to find
    /// there; pass [`ValueType::Any`] when unknown.
    pub fn load(&mut self, slot: Slot, ty: ValueType) -> ExprId {
        self.push(
            ExprKind::ScratchLoad {
                target: SlotRef::Static(slot),
                ty,
            },
            ty,
        )
    }

    /// Load from the slot whose number `index` evaluates to.
    pub fn load_indexed(&mut self, index: ExprId, ty: ValueType) -> CompileResult<ExprId> {
        self.load_ref(SlotRef::Dynamic(index), ty)
    }

    pub fn load_ref(&mut self, target: SlotRef, ty: ValueType) -> CompileResult<ExprId> {
        self.check_target(target)?;
        Ok(self.push(ExprKind::ScratchLoad { target, ty }, ty))
    }

    /// Store `value` into a fixed slot.
    pub fn store(&mut self, slot: Slot, value: ExprId) -> CompileResult<ExprId> {
        self.store_ref(SlotRef::Static(slot), value)
    }

    /// Store `value` into the slot whose number `index` evaluates to.
    pub fn store_indexed(&mut self, index: ExprId, value: ExprId) -> CompileResult<ExprId> {
        self.store_ref(SlotRef::Dynamic(index), value)
    }

    pub fn store_ref(&mut self, target: SlotRef, value: ExprId) -> CompileResult<ExprId> {
        self.check_target(target)?;
        ValueType::require(ValueType::Any, self.type_of(value))?;
        Ok(self.push(ExprKind::ScratchStore { target, value }, ValueType::None))
    }

    /// Store whatever is on top of the evaluation stack into `slot`.
    ///
    /// Unchecked escape hatch, see [`ExprKind::ScratchStackStore`].
    pub fn store_stack(&mut self, slot: Slot) -> ExprId {
        self.push(ExprKind::ScratchStackStore(slot), ValueType::None)
    }

    /// Store `value` if given, otherwise store the top of the stack.
    ///
    /// The stack form only exists for fixed slots; asking for it with an
    /// indirect reference is an internal fault.
    pub fn store_or_stack(
        &mut self,
        target: SlotRef,
        value: Option<ExprId>,
    ) -> CompileResult<ExprId> {
        match (target, value) {
            (target, Some(value)) => self.store_ref(target, value),
            (SlotRef::Static(slot), None) => Ok(self.store_stack(slot)),
            (SlotRef::Dynamic(index), None) => Err(CompileError::internal_at(
                index,
                "stack store is only supported for static slots",
            )),
        }
    }

    fn check_target(&self, target: SlotRef) -> CompileResult<()> {
        match target {
            SlotRef::Static(_) => Ok(()),
            SlotRef::Dynamic(index) => ValueType::require(ValueType::Uint64, self.type_of(index)),
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
