// jpat_ast - tree definitions for the jpat pattern-lowering pass
//! Type-attributed tree definitions consumed and produced by the lowering pass.
//!
//! The tree arrives fully attributed: every pattern node carries its principal
//! type and binding symbols, switches carry their `is_pattern_switch` and
//! `has_unconditional` flags, and record patterns resolve to components listed
//! in the [`TypeTable`]. The lowering pass returns the same tree shape with
//! every pattern construct replaced by primitive constructs; the nodes that
//! only appear in lowered output ([`Expr::Let`], [`Expr::Classify`],
//! [`Expr::NullCheck`] and integer-tag case labels) are documented as such.

pub mod expression;
pub mod pattern;
pub mod statement;
pub mod symbols;
pub mod types;

pub use expression::*;
pub use pattern::*;
pub use statement::*;
pub use symbols::*;
pub use types::*;
