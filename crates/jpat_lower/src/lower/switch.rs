//! Lowering of pattern switches to index dispatch.
//!
//! The selector is stored once in `selector{n}$temp`, a restart index starts
//! at 0, and the switch is rewritten to branch on a classification call over
//! a static dispatch table. Case bodies keep their order; pattern cases test
//! their pattern (and guard) up front and, on failure, bump the restart index
//! and `continue` the labeled dispatch switch so classification resumes at
//! the next entry. A null selector classifies as -1; a `case null` label
//! becomes `case -1`, and absent that, the selector is null-checked when it
//! is stored.

use jpat_ast::{
    Case, CaseKind, CaseLabel, ClassifierKind, DispatchEntry, Expr, Literal, Pattern, Stmt,
    Switch, TypeRef,
};
use tracing::trace;

use crate::context::LowerContext;
use crate::error::LowerError;
use crate::lower::build::{self, LocalRef};
use crate::lower::instanceof::lower_binding_pattern;
use crate::lower::{flatten, lower_expr, lower_stmts, merge};

pub(super) fn lower_switch_stmt(switch: &Switch, ctx: &mut LowerContext) -> Result<Stmt, LowerError> {
    if !switch.is_pattern_switch {
        return Ok(Stmt::Switch(Box::new(lower_plain_switch(switch, ctx)?)));
    }
    let span = switch.span.clone();
    let (mut statements, dispatch) = lower_pattern_switch(switch, ctx)?;
    statements.push(Stmt::Switch(Box::new(dispatch)));
    Ok(Stmt::Block { statements, span })
}

pub(super) fn lower_switch_expr(switch: &Switch, ctx: &mut LowerContext) -> Result<Expr, LowerError> {
    if !switch.is_pattern_switch {
        return Ok(Expr::Switch(Box::new(lower_plain_switch(switch, ctx)?)));
    }
    let span = switch.span.clone();
    let (defs, dispatch) = lower_pattern_switch(switch, ctx)?;
    Ok(Expr::Let {
        defs,
        body: Box::new(Expr::Switch(Box::new(dispatch))),
        span,
    })
}

/// Non-pattern switches only need their children lowered.
fn lower_plain_switch(switch: &Switch, ctx: &mut LowerContext) -> Result<Switch, LowerError> {
    let mut cases = Vec::with_capacity(switch.cases.len());
    for case in &switch.cases {
        let labels = case
            .labels
            .iter()
            .map(|label| match label {
                CaseLabel::Constant(expr) => {
                    Ok(CaseLabel::Constant(lower_expr(expr, ctx)?))
                }
                CaseLabel::Default => Ok(CaseLabel::Default),
                CaseLabel::Pattern { .. } => Err(LowerError::invariant(
                    "pattern label in a non-pattern switch",
                    &case.span,
                )),
            })
            .collect::<Result<Vec<_>, _>>()?;
        cases.push(Case {
            labels,
            kind: case.kind,
            body: lower_stmts(&case.body, ctx)?,
            completes_normally: case.completes_normally,
            span: case.span.clone(),
        });
    }
    Ok(Switch {
        selector: Box::new(lower_expr(&switch.selector, ctx)?),
        cases,
        is_pattern_switch: false,
        has_unconditional: switch.has_unconditional,
        label: switch.label.clone(),
        ty: switch.ty.clone(),
        span: switch.span.clone(),
    })
}

/// The shared rewrite behind statement and expression pattern switches.
/// Returns the selector/index declarations and the dispatch switch.
fn lower_pattern_switch(
    switch: &Switch,
    ctx: &mut LowerContext,
) -> Result<(Vec<Stmt>, Switch), LowerError> {
    let span = &switch.span;
    let seltype = match switch.selector.ty() {
        TypeRef::Null => TypeRef::object(),
        other => other,
    };
    let seq = ctx.fresh_seq();
    let temp = LocalRef::new(format!("selector{seq}$temp"), seltype.clone());
    let index_name = format!("{seq}$index");
    // generated nested switches arrive with their label pre-assigned
    let label = match &switch.label {
        Some(label) => label.clone(),
        None => ctx.fresh_label(),
    };
    trace!(label = %label, cases = switch.cases.len(), "lowering pattern switch");

    // Deconstruction labels collapse to a binding over the whole record plus
    // a synthesized guard; a user guard is conjoined after it. Cases with an
    // empty body donate their labels to the following case.
    let mut prepared: Vec<Case> = Vec::new();
    let mut carried: Vec<CaseLabel> = Vec::new();
    let last = switch.cases.len().saturating_sub(1);
    for (pos, case) in switch.cases.iter().enumerate() {
        let mut labels = std::mem::take(&mut carried);
        for case_label in &case.labels {
            labels.push(unroll_case_label(case_label, ctx)?);
        }
        if case.body.is_empty() && pos != last {
            carried = labels;
        } else {
            prepared.push(Case {
                labels,
                kind: case.kind,
                body: case.body.clone(),
                completes_normally: case.completes_normally,
                span: case.span.clone(),
            });
        }
    }
    let cases = merge::process_cases(prepared, &label, ctx);

    let has_null_case = cases
        .iter()
        .flat_map(|case| case.labels.iter())
        .any(CaseLabel::is_null);
    let translated_selector = lower_expr(&switch.selector, ctx)?;
    let needs_null_check = !has_null_case && !seltype.is_primitive();
    let selector_init = if needs_null_check {
        Expr::NullCheck {
            expr: Box::new(translated_selector),
            span: span.clone(),
        }
    } else {
        translated_selector
    };
    let defs = vec![
        build::local_decl(&temp.name, seltype.clone(), Some(selector_init), span),
        build::local_decl(
            &index_name,
            TypeRef::int(),
            Some(build::int_lit(0, span)),
            span,
        ),
    ];

    let mut table = Vec::new();
    for case in &cases {
        for case_label in &case.labels {
            if let Some(entry) = dispatch_entry(case_label, &seltype, ctx)? {
                table.push(entry);
            }
        }
    }
    let kind = if ctx.types.is_enum(&seltype) {
        ClassifierKind::EnumSwitch
    } else {
        ClassifierKind::TypeSwitch
    };
    let index = LocalRef::new(index_name, TypeRef::int());
    let classify = Expr::Classify {
        kind,
        table,
        subject: Box::new(temp.to_expr(span)),
        restart: Box::new(index.to_expr(span)),
        span: span.clone(),
    };

    let last = cases.len().saturating_sub(1);
    let mut tag: i64 = 0;
    let mut previous_completes_normally = false;
    let mut has_default = false;
    let mut out_cases = Vec::with_capacity(cases.len());
    for (pos, case) in cases.into_iter().enumerate() {
        let has_joined_null = case.labels.len() > 1 && case.labels.iter().any(CaseLabel::is_null);
        let cleared: Vec<&CaseLabel> = if has_joined_null {
            case.labels.iter().filter(|l| !l.is_null()).collect()
        } else {
            case.labels.iter().collect()
        };

        let mut body = match cleared.as_slice() {
            [CaseLabel::Pattern { pattern, guard }] if !previous_completes_normally => {
                ctx.bindings.push_basic();
                let lowered = lower_pattern_case_body(
                    pattern, guard.as_ref(), &case, &temp, &index, &label, tag, ctx,
                );
                ctx.bindings.pop();
                lowered?
            }
            _ => lower_stmts(&case.body, ctx)?,
        };
        fixup_nested_continues(&mut body, &label, &index, tag);

        let mut labels = Vec::with_capacity(case.labels.len());
        for case_label in &case.labels {
            match case_label {
                CaseLabel::Default => {
                    labels.push(CaseLabel::Default);
                    has_default = true;
                }
                CaseLabel::Pattern { .. }
                    if switch.has_unconditional && !has_default && pos == last =>
                {
                    // the unconditional pattern always sits in the last case
                    labels.push(CaseLabel::Default);
                }
                null_label if null_label.is_null() => {
                    labels.push(CaseLabel::Constant(build::int_lit(-1, span)));
                }
                _ => {
                    labels.push(CaseLabel::Constant(build::int_lit(tag, span)));
                    tag += 1;
                }
            }
        }

        match case.kind {
            CaseKind::Statement => previous_completes_normally = case.completes_normally,
            CaseKind::Rule => {
                previous_completes_normally = false;
                body.push(Stmt::Break {
                    label: Some(label.clone()),
                    span: case.span.clone(),
                });
            }
        }
        out_cases.push(Case {
            labels,
            kind: CaseKind::Statement,
            body,
            completes_normally: case.completes_normally,
            span: case.span,
        });
    }

    let dispatch = Switch {
        selector: Box::new(classify),
        cases: out_cases,
        is_pattern_switch: false,
        has_unconditional: switch.has_unconditional,
        label: Some(label),
        ty: switch.ty.clone(),
        span: span.clone(),
    };
    Ok((defs, dispatch))
}

/// Single pattern case: test the pattern (and guard) first, restarting the
/// dispatch at the next entry when it fails, then run the lowered body with
/// the binding declarations in front.
#[allow(clippy::too_many_arguments)]
fn lower_pattern_case_body(
    pattern: &Pattern,
    guard: Option<&Expr>,
    case: &Case,
    temp: &LocalRef,
    index: &LocalRef,
    label: &str,
    tag: i64,
    ctx: &mut LowerContext,
) -> Result<Vec<Stmt>, LowerError> {
    let span = &case.span;
    let Pattern::Binding(binding, _) = pattern.strip_parens() else {
        return Err(LowerError::invariant(
            "deconstruction labels are flattened before dispatch",
            span,
        ));
    };
    let mut test = lower_binding_pattern(binding, temp, span, ctx);
    if let Some(guard) = guard {
        test = build::and(test, lower_expr(guard, ctx)?, span);
    }
    let mut body = lower_stmts(&case.body, ctx)?;
    let restart = Stmt::Block {
        statements: vec![
            build::assign_stmt(index.to_expr(span), build::int_lit(tag + 1, span), span),
            Stmt::Continue {
                label: Some(label.to_string()),
                span: span.clone(),
            },
        ],
        span: span.clone(),
    };
    body.insert(
        0,
        Stmt::If {
            condition: build::not(test, span),
            then_stmt: Box::new(restart),
            else_stmt: None,
            span: span.clone(),
        },
    );
    let mut with_decls = ctx.bindings.binding_vars(span);
    with_decls.extend(body);
    Ok(with_decls)
}

fn unroll_case_label(label: &CaseLabel, ctx: &mut LowerContext) -> Result<CaseLabel, LowerError> {
    let CaseLabel::Pattern { pattern, guard } = label else {
        return Ok(label.clone());
    };
    if !matches!(pattern.strip_parens(), Pattern::Record { .. }) {
        return Ok(label.clone());
    }
    let span = pattern.span().clone();
    let (holder, deconstruction) = flatten::unroll_record_pattern(pattern, ctx)?;
    let guard = match (deconstruction, guard) {
        (Some(deconstruction), Some(user)) => {
            Some(build::and(deconstruction, user.clone(), &span))
        }
        (Some(deconstruction), None) => Some(deconstruction),
        (None, user) => user.clone(),
    };
    Ok(CaseLabel::Pattern {
        pattern: Pattern::Binding(holder, span),
        guard,
    })
}

/// One dispatch-table entry per non-null, non-default label, in label order.
fn dispatch_entry(
    label: &CaseLabel,
    seltype: &TypeRef,
    ctx: &mut LowerContext,
) -> Result<Option<DispatchEntry>, LowerError> {
    match label {
        CaseLabel::Pattern { pattern, .. } => {
            let principal = ctx.types.boxed(&pattern.principal_type());
            if ctx.types.is_subtype(seltype, &principal) {
                Ok(Some(DispatchEntry::Type(seltype.clone())))
            } else {
                Ok(Some(DispatchEntry::Type(principal)))
            }
        }
        CaseLabel::Constant(expr) => match expr {
            Expr::Literal(Literal::Null, _) => Ok(None),
            Expr::Literal(Literal::Int(value), _) => Ok(Some(DispatchEntry::Int(*value))),
            Expr::Literal(Literal::Character(value), _) => {
                Ok(Some(DispatchEntry::Int(*value as i64)))
            }
            Expr::Literal(Literal::String(value), _) => {
                Ok(Some(DispatchEntry::Str(value.clone())))
            }
            Expr::Ident { name, ty, .. } if ctx.types.is_enum(ty) => {
                Ok(Some(DispatchEntry::EnumConstant(name.clone())))
            }
            other => Err(LowerError::UnclassifiableLabel {
                label: match other {
                    Expr::Literal(Literal::Boolean(_), _) => "boolean literal".to_string(),
                    Expr::Ident { name, .. } => name.clone(),
                    _ => "non-constant expression".to_string(),
                },
                span: other.span().clone(),
            }),
        },
        CaseLabel::Default => Ok(None),
    }
}

/// The decision-tree merger leaves `continue <dispatch>` as the sole
/// statement of generated default cases; once the owning case's tag is known,
/// the restart index bump is inserted in front of each of them.
fn fixup_nested_continues(statements: &mut [Stmt], label: &str, index: &LocalRef, tag: i64) {
    for stmt in statements {
        fixup_stmt(stmt, label, index, tag);
    }
}

fn fixup_stmt(stmt: &mut Stmt, label: &str, index: &LocalRef, tag: i64) {
    match stmt {
        Stmt::Block { statements, .. } => fixup_nested_continues(statements, label, index, tag),
        Stmt::If {
            then_stmt,
            else_stmt,
            ..
        } => {
            fixup_stmt(then_stmt, label, index, tag);
            if let Some(else_stmt) = else_stmt {
                fixup_stmt(else_stmt, label, index, tag);
            }
        }
        Stmt::While { body, .. } | Stmt::DoWhile { body, .. } => {
            fixup_stmt(body, label, index, tag);
        }
        Stmt::For { init, body, .. } => {
            fixup_nested_continues(init, label, index, tag);
            fixup_stmt(body, label, index, tag);
        }
        Stmt::Try {
            body, catch_body, ..
        } => {
            fixup_nested_continues(body, label, index, tag);
            fixup_nested_continues(catch_body, label, index, tag);
        }
        Stmt::Switch(switch) => {
            for case in &mut switch.cases {
                let targets_dispatch = matches!(
                    case.body.as_slice(),
                    [Stmt::Continue { label: Some(target), .. }] if target == label
                );
                if targets_dispatch {
                    let span = case.span.clone();
                    case.body.insert(
                        0,
                        build::assign_stmt(
                            index.to_expr(&span),
                            build::int_lit(tag + 1, &span),
                            &span,
                        ),
                    );
                }
                fixup_nested_continues(&mut case.body, label, index, tag);
            }
        }
        _ => {}
    }
}
