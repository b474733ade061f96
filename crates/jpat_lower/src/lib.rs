//! Lowering of pattern-matching constructs.
//!
//! This pass takes a fully type-attributed tree and removes every high-level
//! pattern construct from it: `instanceof` with a pattern operand, record
//! deconstruction patterns, and pattern switches. The result uses only
//! primitive constructs (assignments, scoped declarations, conditionals,
//! explicit casts and an integer-tag dispatch over an external classification
//! function), ready for code emission.
//!
//! A single [`lower_class`] invocation processes one top-level declaration to
//! completion with its own lowering context; independent declarations lower
//! on independent contexts.

mod bindings;
mod context;
mod error;
mod lower;

pub use error::LowerError;
pub use lower::lower_class;
