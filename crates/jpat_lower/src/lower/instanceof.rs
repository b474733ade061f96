//! Lowering of `instanceof` with a pattern operand.
//!
//! `E instanceof T t` becomes
//! `(let T' patt$temp = E; patt$temp instanceof T && (let t = (T) patt$temp; true))`
//! with the storage declaration for `t` hoisted out to the enclosing frame.
//! The subject is evaluated exactly once: the temporary is only introduced
//! when the lowered subject is not already a plain local reference.

use jpat_ast::{BindingVar, Expr, Pattern, Span, TypeRef, TypeTest};

use crate::context::LowerContext;
use crate::error::LowerError;
use crate::lower::build::{self, LocalRef};
use crate::lower::{flatten, lower_expr};

pub(super) fn lower_instanceof(
    subject: &Expr,
    pattern: &Pattern,
    allow_null: bool,
    span: &Span,
    ctx: &mut LowerContext,
) -> Result<Expr, LowerError> {
    let pattern = pattern.strip_parens();
    let (binding, extra_conditions) = match pattern {
        Pattern::Record { .. } => {
            let (holder, guard) = flatten::unroll_record_pattern(pattern, ctx)?;
            (holder, guard)
        }
        Pattern::Binding(var, _) => (var.clone(), None),
        Pattern::Parenthesized(..) => unreachable!("strip_parens removes wrappers"),
    };

    let subject_ty = match subject.ty() {
        TypeRef::Null => TypeRef::object(),
        other => other,
    };

    ctx.bindings.push_basic();
    let lowered = lower_instanceof_inner(
        subject,
        subject_ty,
        &binding,
        extra_conditions,
        allow_null,
        span,
        ctx,
    );
    let result = lowered.map(|expr| ctx.bindings.decorate_expression(expr));
    ctx.bindings.pop();
    result
}

fn lower_instanceof_inner(
    subject: &Expr,
    subject_ty: TypeRef,
    binding: &BindingVar,
    extra_conditions: Option<Expr>,
    allow_null: bool,
    span: &Span,
    ctx: &mut LowerContext,
) -> Result<Expr, LowerError> {
    let translated = lower_expr(subject, ctx)?;
    let (current, temp) = match &translated {
        Expr::Ident {
            name,
            ty,
            binding: None,
            ..
        } => (LocalRef::new(name, ty.clone()), None),
        _ => {
            let temp = LocalRef::new(format!("patt{}$temp", ctx.fresh_seq()), subject_ty);
            (temp.clone(), Some(temp))
        }
    };

    let principal = binding.ty.clone();
    let mut result = lower_binding_pattern(binding, &current, span, ctx);
    if !allow_null || !ctx.types.is_subtype(&current.ty, &principal) {
        result = build::and(
            Expr::InstanceOf {
                expr: Box::new(current.to_expr(span)),
                test: TypeTest::Type(principal),
                allow_null: false,
                span: span.clone(),
            },
            result,
            span,
        );
    }
    if let Some(extra) = extra_conditions {
        let extra = lower_expr(&extra, ctx)?;
        result = build::and(result, extra, span);
    }
    if let Some(temp) = temp {
        result = Expr::Let {
            defs: vec![build::local_decl(
                &temp.name,
                temp.ty,
                Some(translated),
                span,
            )],
            body: Box::new(result),
            span: span.clone(),
        };
    }
    Ok(result)
}

/// The primary type is assumed to already hold for `current`; the binding
/// pattern only stores the cast value. When the binding environment declines
/// the declaration (a fence is directly enclosing), nothing is stored and the
/// test is vacuously true.
pub(super) fn lower_binding_pattern(
    binding: &BindingVar,
    current: &LocalRef,
    span: &Span,
    ctx: &mut LowerContext,
) -> Expr {
    match ctx.bindings.declare(binding) {
        Some(storage) => {
            let store = build::assign_stmt(
                build::ident(&storage.name, storage.ty, span),
                build::cast(binding.ty.clone(), current.to_expr(span), span),
                span,
            );
            Expr::Let {
                defs: vec![store],
                body: Box::new(build::true_lit(span)),
                span: span.clone(),
            }
        }
        None => build::true_lit(span),
    }
}
