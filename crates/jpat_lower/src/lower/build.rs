//! Construction helpers for the primitive trees the lowering emits.

use jpat_ast::{BinaryOp, Expr, Literal, Span, Stmt, TypeRef, UnaryOp};

/// A synthesized local the lowering refers back to, most often the hoisted
/// copy of the scrutinee.
#[derive(Debug, Clone)]
pub(crate) struct LocalRef {
    pub name: String,
    pub ty: TypeRef,
}

impl LocalRef {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    pub fn to_expr(&self, span: &Span) -> Expr {
        ident(&self.name, self.ty.clone(), span)
    }
}

pub(crate) fn ident(name: &str, ty: TypeRef, span: &Span) -> Expr {
    Expr::Ident {
        name: name.to_string(),
        ty,
        binding: None,
        span: span.clone(),
    }
}

pub(crate) fn and(left: Expr, right: Expr, span: &Span) -> Expr {
    Expr::Binary {
        op: BinaryOp::And,
        left: Box::new(left),
        right: Box::new(right),
        span: span.clone(),
    }
}

pub(crate) fn not(expr: Expr, span: &Span) -> Expr {
    Expr::Unary {
        op: UnaryOp::Not,
        operand: Box::new(expr),
        span: span.clone(),
    }
}

pub(crate) fn true_lit(span: &Span) -> Expr {
    Expr::Literal(Literal::Boolean(true), span.clone())
}

pub(crate) fn int_lit(value: i64, span: &Span) -> Expr {
    Expr::Literal(Literal::Int(value), span.clone())
}

pub(crate) fn cast(ty: TypeRef, expr: Expr, span: &Span) -> Expr {
    Expr::Cast {
        ty,
        expr: Box::new(expr),
        span: span.clone(),
    }
}

/// `target = value;` as a statement.
pub(crate) fn assign_stmt(target: Expr, value: Expr, span: &Span) -> Stmt {
    Stmt::Expression {
        expr: Expr::Assign {
            target: Box::new(target),
            value: Box::new(value),
            span: span.clone(),
        },
        span: span.clone(),
    }
}

pub(crate) fn local_decl(name: &str, ty: TypeRef, init: Option<Expr>, span: &Span) -> Stmt {
    Stmt::LocalVar {
        name: name.to_string(),
        ty,
        init,
        span: span.clone(),
    }
}
