//! bang-types: symbol table and bottom-up type validation.
//!
//! The validator consumes the untyped [`bang_ast::ast::Program`] produced by
//! `bang-parser` and hands back the same tree with every type field filled.
//! [`api`] wraps parsing and validation into one call.

pub mod api;
pub mod builtins;
pub mod error;
pub mod symbols;
pub mod unification;
pub mod validator;

pub use api::{analyze, compile, Analysis, CompileError};
pub use error::TypeError;
pub use symbols::{GlobalCounts, ScopeKind, Symbol, SymbolController};
pub use validator::Validator;
