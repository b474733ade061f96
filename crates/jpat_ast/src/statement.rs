use crate::expression::{Expr, Param, Switch};
use crate::types::{Span, TypeRef};
use serde::{Deserialize, Serialize};

/// Statements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Block {
        statements: Vec<Stmt>,
        span: Span,
    },
    LocalVar {
        name: String,
        ty: TypeRef,
        init: Option<Expr>,
        span: Span,
    },
    Expression {
        expr: Expr,
        span: Span,
    },
    If {
        condition: Expr,
        then_stmt: Box<Stmt>,
        else_stmt: Option<Box<Stmt>>,
        span: Span,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
        span: Span,
    },
    For {
        init: Vec<Stmt>,
        /// Absent condition loops unconditionally.
        condition: Option<Expr>,
        update: Vec<Expr>,
        body: Box<Stmt>,
        span: Span,
    },
    DoWhile {
        body: Box<Stmt>,
        condition: Expr,
        span: Span,
    },
    Switch(Box<Switch>),
    Break {
        label: Option<String>,
        span: Span,
    },
    Continue {
        label: Option<String>,
        span: Span,
    },
    Return {
        value: Option<Expr>,
        span: Span,
    },
    /// Produces the value of an expression-valued switch case.
    Yield {
        value: Expr,
        span: Span,
    },
    Throw {
        expr: Expr,
        span: Span,
    },
    /// Catch-all try; the generated accessor proxies are its only producer.
    Try {
        body: Vec<Stmt>,
        catch_name: String,
        catch_body: Vec<Stmt>,
        span: Span,
    },
}

impl Stmt {
    pub fn span(&self) -> &Span {
        match self {
            Stmt::Block { span, .. }
            | Stmt::LocalVar { span, .. }
            | Stmt::Expression { span, .. }
            | Stmt::If { span, .. }
            | Stmt::While { span, .. }
            | Stmt::For { span, .. }
            | Stmt::DoWhile { span, .. }
            | Stmt::Break { span, .. }
            | Stmt::Continue { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::Yield { span, .. }
            | Stmt::Throw { span, .. }
            | Stmt::Try { span, .. } => span,
            Stmt::Switch(switch) => &switch.span,
        }
    }
}

/// Method declaration. Synthetic methods (accessor proxies) are appended to
/// the enclosing class by the lowering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_ty: TypeRef,
    pub body: Vec<Stmt>,
    pub is_static: bool,
    #[serde(default)]
    pub is_synthetic: bool,
    pub span: Span,
}

/// One top-level declaration; the unit of a single lowering invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    pub methods: Vec<MethodDecl>,
    pub span: Span,
}
