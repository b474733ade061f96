use serde::{Deserialize, Serialize};

/// Source location attached to every tree node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl Span {
    pub fn new(start_line: usize, start_column: usize, end_line: usize, end_column: usize) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    pub fn dummy() -> Self {
        Self::default()
    }
}

/// Literal values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Int(i64),
    String(String),
    Boolean(bool),
    Character(char),
    Null,
}

/// Primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimitiveType {
    Int,
    Long,
    Boolean,
    Char,
}

impl PrimitiveType {
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Char => "char",
        }
    }
}

/// Erased nominal type reference. Generics are already erased upstream, so a
/// reference type is identified by its class name alone. `Null` is the bottom
/// type of a `null` literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeRef {
    Primitive(PrimitiveType),
    Named(String),
    Null,
    Void,
}

impl TypeRef {
    pub fn object() -> Self {
        TypeRef::Named("Object".to_string())
    }

    pub fn void() -> Self {
        TypeRef::Void
    }

    pub fn string() -> Self {
        TypeRef::Named("String".to_string())
    }

    pub fn int() -> Self {
        TypeRef::Primitive(PrimitiveType::Int)
    }

    pub fn boolean() -> Self {
        TypeRef::Primitive(PrimitiveType::Boolean)
    }

    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeRef::Primitive(_))
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, TypeRef::Named(_) | TypeRef::Null)
    }

    /// Nullable means a null value can legally inhabit the type.
    pub fn is_nullable(&self) -> bool {
        self.is_reference()
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            TypeRef::Named(name) => Some(name),
            _ => None,
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    // Short-circuiting logic
    And,
    Or,
    // Comparison
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    // Arithmetic
    Add,
    Subtract,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
}
