//! An owned, in-memory low-level IR with LLVM-compatible textual rendering.
//!
//! The module is a plain value graph: each function carries its own arena of
//! [`syntax::ValueData`] and its basic blocks of [`syntax::Inst`]s. Values
//! know their type, and — unlike an FFI-backed IR — the type of an existing
//! value can be rewritten in place (see [`module::Function::retype_value`]),
//! which the lifter's width reconciliation depends on. `Display` on
//! [`module::Module`] produces the textual form consumed downstream.

pub mod builder;
pub mod module;
pub mod print;
pub mod syntax;
pub mod ty;

pub use builder::Builder;
pub use module::{Function, GlobalVariable, Module, Param};
pub use syntax::{BinOp, BlockData, BlockId, Inst, IntPredicate, ValueData, ValueId, ValueKind};
pub use ty::Ty;
