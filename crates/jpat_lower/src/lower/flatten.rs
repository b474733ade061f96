//! Record pattern flattening.
//!
//! `R(p1, .., pN) r` is rewritten into the plain binding pattern `R r` plus a
//! synthesized guard that reads each component through a generated accessor
//! proxy and tests it against the nested pattern. Nested record patterns
//! unroll recursively; their own guards are collected behind the current
//! level's checks so every component is type-tested before anything is
//! deconstructed further.

use jpat_ast::{
    BindingVar, Expr, MethodDecl, Param, Pattern, Span, Stmt, TypeRef, TypeTest,
};

use crate::context::LowerContext;
use crate::error::LowerError;
use crate::lower::build;

/// Reduces a record pattern to a binding pattern over the whole record plus
/// the guard expression performing the deconstruction. The guard is an
/// untranslated tree: nested pattern tests inside it are lowered by the
/// caller along with any user guard.
pub(crate) fn unroll_record_pattern(
    pattern: &Pattern,
    ctx: &mut LowerContext,
) -> Result<(BindingVar, Option<Expr>), LowerError> {
    let Pattern::Record {
        type_name,
        binding,
        nested,
        span,
    } = pattern.strip_parens()
    else {
        return Err(LowerError::invariant(
            "record pattern expected",
            pattern.span(),
        ));
    };

    let record_ty = TypeRef::named(type_name.clone());
    let holder = match binding {
        Some(var) => var.clone(),
        None => {
            let id = ctx.synthetic_binding_id();
            BindingVar {
                id,
                name: format!("$b${}", ctx.fresh_seq()),
                ty: record_ty.clone(),
                preserved: false,
                aliases: Vec::new(),
            }
        }
    };

    let components = ctx
        .types
        .components(type_name)
        .ok_or_else(|| LowerError::UnknownRecord {
            name: type_name.clone(),
            span: span.clone(),
        })?
        .to_vec();
    if components.len() != nested.len() {
        return Err(LowerError::ComponentArityMismatch {
            name: type_name.clone(),
            patterns: nested.len(),
            components: components.len(),
            span: span.clone(),
        });
    }

    let mut first_level: Option<Expr> = None;
    let mut second_level: Option<Expr> = None;
    for (component, nested_pattern) in components.iter().zip(nested) {
        let nested_pattern = nested_pattern.strip_parens();
        let (nested_binding, allow_null) = match nested_pattern {
            Pattern::Record { .. } => {
                let (nested_holder, nested_guard) = unroll_record_pattern(nested_pattern, ctx)?;
                if let Some(guard) = nested_guard {
                    second_level = Some(match second_level {
                        Some(prior) => build::and(prior, guard, span),
                        None => guard,
                    });
                }
                (nested_holder, false)
            }
            Pattern::Binding(var, _) => (var.clone(), true),
            Pattern::Parenthesized(..) => unreachable!("strip_parens removes wrappers"),
        };

        let proxy = accessor_proxy(type_name, &component.name, &component.ty, &component.accessor, ctx);
        let accessed = build::cast(
            component.ty.clone(),
            Expr::MethodCall {
                receiver: None,
                method: proxy,
                args: vec![build::cast(
                    record_ty.clone(),
                    Expr::Ident {
                        name: holder.name.clone(),
                        ty: record_ty.clone(),
                        binding: Some(holder.id),
                        span: span.clone(),
                    },
                    span,
                )],
                ty: component.ty.clone(),
                span: span.clone(),
            },
            span,
        );
        let check = Expr::InstanceOf {
            expr: Box::new(accessed),
            test: TypeTest::Pattern(Pattern::Binding(nested_binding, span.clone())),
            allow_null,
            span: span.clone(),
        };
        first_level = Some(match first_level {
            Some(prior) => build::and(prior, check, span),
            None => check,
        });
    }

    let guard = first_level.map(|checks| match second_level {
        Some(nested) => build::and(checks, nested, span),
        None => checks,
    });
    Ok((holder, guard))
}

/// Returns (generating on first use) the static proxy wrapping a component
/// accessor. The proxy converts any failure thrown by the accessor into a
/// match failure, so deconstruction never observes a checked exception.
fn accessor_proxy(
    record: &str,
    component: &str,
    component_ty: &TypeRef,
    accessor: &str,
    ctx: &mut LowerContext,
) -> String {
    if let Some(name) = ctx.proxy_name_for(record, component) {
        return name.clone();
    }
    let span = Span::dummy();
    let record_ty = TypeRef::named(record);
    let catch_name = format!("catch${}", ctx.fresh_seq());
    let receiver = build::ident("r", record_ty.clone(), &span);
    let caught = build::ident(&catch_name, TypeRef::named("Throwable"), &span);
    let body = vec![Stmt::Try {
        body: vec![Stmt::Return {
            value: Some(Expr::MethodCall {
                receiver: Some(Box::new(receiver)),
                method: accessor.to_string(),
                args: Vec::new(),
                ty: component_ty.clone(),
                span: span.clone(),
            }),
            span: span.clone(),
        }],
        catch_name,
        catch_body: vec![Stmt::Throw {
            expr: Expr::New {
                class_name: "MatchException".to_string(),
                args: vec![
                    Expr::MethodCall {
                        receiver: Some(Box::new(caught.clone())),
                        method: "toString".to_string(),
                        args: Vec::new(),
                        ty: TypeRef::string(),
                        span: span.clone(),
                    },
                    caught,
                ],
                span: span.clone(),
            },
            span: span.clone(),
        }],
        span: span.clone(),
    }];
    let method = MethodDecl {
        name: format!("$proxy${record}${component}"),
        params: vec![Param {
            name: "r".to_string(),
            ty: record_ty,
            span: span.clone(),
        }],
        return_ty: component_ty.clone(),
        body,
        is_static: true,
        is_synthetic: true,
        span,
    };
    let name = method.name.clone();
    ctx.register_proxy(record, component, method);
    name
}
