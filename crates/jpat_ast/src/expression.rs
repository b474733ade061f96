use crate::pattern::{BindingId, Pattern};
use crate::statement::Stmt;
use crate::types::{BinaryOp, Literal, PrimitiveType, Span, TypeRef, UnaryOp};
use serde::{Deserialize, Serialize};

/// The right-hand side of an `instanceof`: either a plain type test or a
/// pattern test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeTest {
    Type(TypeRef),
    Pattern(Pattern),
}

/// Expressions. Nodes marked "lowering output" never appear in upstream input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal(Literal, Span),
    /// `binding` is set when the identifier references a pattern binding
    /// variable; the lowering redirects such references to hoisted storage.
    Ident {
        name: String,
        ty: TypeRef,
        binding: Option<BindingId>,
        span: Span,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    Conditional {
        condition: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
        ty: TypeRef,
        span: Span,
    },
    /// Embedded assignment expression, evaluates to the assigned value.
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
        span: Span,
    },
    Cast {
        ty: TypeRef,
        expr: Box<Expr>,
        span: Span,
    },
    InstanceOf {
        expr: Box<Expr>,
        test: TypeTest,
        /// A null subject passes the test without any type check. Set by the
        /// pattern flattener on component-level checks; always false on
        /// user-written tests.
        allow_null: bool,
        span: Span,
    },
    MethodCall {
        /// `None` for static calls.
        receiver: Option<Box<Expr>>,
        method: String,
        args: Vec<Expr>,
        ty: TypeRef,
        span: Span,
    },
    New {
        class_name: String,
        args: Vec<Expr>,
        span: Span,
    },
    Lambda {
        params: Vec<Param>,
        body: Vec<Stmt>,
        ty: TypeRef,
        span: Span,
    },
    /// Expression-valued switch.
    Switch(Box<Switch>),
    /// Lowering output: scoped variable declarations whose extent is exactly
    /// the evaluation of `body`.
    Let {
        defs: Vec<Stmt>,
        body: Box<Expr>,
        span: Span,
    },
    /// Lowering output: evaluates to the operand, raising a null-pointer
    /// failure when the operand is null.
    NullCheck {
        expr: Box<Expr>,
        span: Span,
    },
    /// Lowering output: call to the external classification function with the
    /// dispatch table baked in. Yields the integer tag of the lowest entry at
    /// or after `restart` matching `subject`, `-1` for a null subject, or the
    /// table length when nothing matches.
    Classify {
        kind: ClassifierKind,
        table: Vec<DispatchEntry>,
        subject: Box<Expr>,
        restart: Box<Expr>,
        span: Span,
    },
}

impl Expr {
    /// Static type of the expression, derived from attribution.
    pub fn ty(&self) -> TypeRef {
        match self {
            Expr::Literal(literal, _) => match literal {
                Literal::Int(_) => TypeRef::Primitive(PrimitiveType::Int),
                Literal::String(_) => TypeRef::string(),
                Literal::Boolean(_) => TypeRef::boolean(),
                Literal::Character(_) => TypeRef::Primitive(PrimitiveType::Char),
                Literal::Null => TypeRef::Null,
            },
            Expr::Ident { ty, .. } => ty.clone(),
            Expr::Unary { .. } => TypeRef::boolean(),
            Expr::Binary { op, left, .. } => match op {
                BinaryOp::Add | BinaryOp::Subtract => left.ty(),
                _ => TypeRef::boolean(),
            },
            Expr::Conditional { ty, .. } => ty.clone(),
            Expr::Assign { target, .. } => target.ty(),
            Expr::Cast { ty, .. } => ty.clone(),
            Expr::InstanceOf { .. } => TypeRef::boolean(),
            Expr::MethodCall { ty, .. } => ty.clone(),
            Expr::New { class_name, .. } => TypeRef::Named(class_name.clone()),
            Expr::Lambda { ty, .. } => ty.clone(),
            Expr::Switch(switch) => switch.ty.clone(),
            Expr::Let { body, .. } => body.ty(),
            Expr::NullCheck { expr, .. } => expr.ty(),
            Expr::Classify { .. } => TypeRef::int(),
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            Expr::Literal(_, span)
            | Expr::Ident { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Conditional { span, .. }
            | Expr::Assign { span, .. }
            | Expr::Cast { span, .. }
            | Expr::InstanceOf { span, .. }
            | Expr::MethodCall { span, .. }
            | Expr::New { span, .. }
            | Expr::Lambda { span, .. }
            | Expr::Let { span, .. }
            | Expr::NullCheck { span, .. }
            | Expr::Classify { span, .. } => span,
            Expr::Switch(switch) => &switch.span,
        }
    }
}

/// Lambda / method parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: TypeRef,
    pub span: Span,
}

/// A multi-way branch, used both as a statement and as an expression.
///
/// `is_pattern_switch` and `has_unconditional` arrive from attribution.
/// `label` is only set on lowered dispatch switches and generated nested
/// switches; `continue` statements target it by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Switch {
    pub selector: Box<Expr>,
    pub cases: Vec<Case>,
    pub is_pattern_switch: bool,
    pub has_unconditional: bool,
    #[serde(default)]
    pub label: Option<String>,
    pub ty: TypeRef,
    pub span: Span,
}

/// Case body termination style: `Statement` cases may fall through,
/// `Rule` (arrow) cases never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseKind {
    Statement,
    Rule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub labels: Vec<CaseLabel>,
    pub kind: CaseKind,
    pub body: Vec<Stmt>,
    /// Whether control can reach the end of the body (upstream flow fact;
    /// meaningful for `Statement` cases).
    pub completes_normally: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CaseLabel {
    /// Constant label: a literal or an enum-constant identifier. A null
    /// literal marks the null label.
    Constant(Expr),
    /// Pattern label with optional guard.
    Pattern {
        pattern: Pattern,
        guard: Option<Expr>,
    },
    Default,
}

impl CaseLabel {
    pub fn is_null(&self) -> bool {
        matches!(self, CaseLabel::Constant(Expr::Literal(Literal::Null, _)))
    }
}

/// Which classification entry point the dispatch call resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassifierKind {
    /// Type and constant classification over an arbitrary selector.
    TypeSwitch,
    /// Enum-identity classification for enum-typed selectors.
    EnumSwitch,
}

/// One static entry of the dispatch table handed to the classifier. Entry
/// order matches output tags 0..N-1; the null label never contributes an
/// entry (it is always tag -1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DispatchEntry {
    Type(TypeRef),
    Int(i64),
    Str(String),
    EnumConstant(String),
}
