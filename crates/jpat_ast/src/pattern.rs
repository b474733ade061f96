use crate::types::{Span, TypeRef};
use serde::{Deserialize, Serialize};

/// Identity of a binding variable, assigned during attribution. Synthetic
/// bindings introduced by the lowering use ids counted down from `u32::MAX`
/// so they never collide with upstream ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BindingId(pub u32);

/// A named, typed slot introduced by a binding pattern.
///
/// `preserved` marks bindings that must survive past the enclosing statement
/// (the upstream flow analysis decides this). `aliases` records the renaming
/// relation between binding variables that denote the same slot across merged
/// case labels; aliasing never transfers ownership, resolution always lands
/// on a single storage variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingVar {
    pub id: BindingId,
    pub name: String,
    pub ty: TypeRef,
    #[serde(default)]
    pub preserved: bool,
    #[serde(default)]
    pub aliases: Vec<BindingId>,
}

impl BindingVar {
    pub fn new(id: u32, name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            id: BindingId(id),
            name: name.into(),
            ty,
            preserved: false,
            aliases: Vec::new(),
        }
    }

    pub fn preserved(mut self) -> Self {
        self.preserved = true;
        self
    }

    /// Identity-or-alias relation used by binding lookup.
    pub fn is_alias_for(&self, other: BindingId) -> bool {
        self.id == other || self.aliases.contains(&other)
    }
}

/// Patterns, produced upstream and only read by the lowering pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Pattern {
    /// `T name` - binds the matched value to a typed variable.
    Binding(BindingVar, Span),
    /// `R(p1, .., pN)` - a record deconstruction with one nested pattern per
    /// component, optionally binding the whole value.
    Record {
        type_name: String,
        binding: Option<BindingVar>,
        nested: Vec<Pattern>,
        span: Span,
    },
    /// `(p)` - no semantic effect.
    Parenthesized(Box<Pattern>, Span),
}

impl Pattern {
    /// Removes any number of parenthesized wrappers.
    pub fn strip_parens(&self) -> &Pattern {
        let mut pattern = self;
        while let Pattern::Parenthesized(inner, _) = pattern {
            pattern = inner;
        }
        pattern
    }

    /// The static type the subject must be an instance of before any nested
    /// decomposition happens.
    pub fn principal_type(&self) -> TypeRef {
        match self.strip_parens() {
            Pattern::Binding(var, _) => var.ty.clone(),
            Pattern::Record { type_name, .. } => TypeRef::Named(type_name.clone()),
            Pattern::Parenthesized(..) => unreachable!("strip_parens removes wrappers"),
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            Pattern::Binding(_, span)
            | Pattern::Record { span, .. }
            | Pattern::Parenthesized(_, span) => span,
        }
    }
}
