//! Decision-tree merging of deconstruction cases.
//!
//! After flattening, consecutive cases over the same record type whose
//! guards deconstruct the same component chain differ only in the nested
//! test. A run of such cases collapses into one case that binds the record
//! and switches over the component, so the component is classified once
//! instead of being re-tested case by case. The generated nested switch gets
//! a default case that continues the enclosing dispatch, which re-enters
//! classification at the next entry.

use jpat_ast::{
    BinaryOp, BindingId, BindingVar, Case, CaseKind, CaseLabel, Expr, Pattern, Stmt, Switch,
    TypeRef, TypeTest,
};
use tracing::trace;

use crate::context::LowerContext;

/// The recognized shape: a single pattern label `R $b$` guarded by
/// `component instanceof T t` or `component instanceof T t && rest`.
struct Candidate {
    outer: BindingVar,
    nested_expr: Expr,
}

fn candidate(case: &Case) -> Option<Candidate> {
    let [CaseLabel::Pattern {
        pattern,
        guard: Some(guard),
    }] = case.labels.as_slice()
    else {
        return None;
    };
    let Pattern::Binding(outer, _) = pattern.strip_parens() else {
        return None;
    };
    let (check, _) = split_guard(guard);
    let Expr::InstanceOf {
        expr: nested_expr,
        test: TypeTest::Pattern(nested),
        ..
    } = check
    else {
        return None;
    };
    let Pattern::Binding(..) = nested.strip_parens() else {
        return None;
    };
    Some(Candidate {
        outer: outer.clone(),
        nested_expr: (**nested_expr).clone(),
    })
}

/// Splits a candidate guard into the leading component test and the rest.
fn split_guard(guard: &Expr) -> (&Expr, Option<&Expr>) {
    match guard {
        Expr::Binary {
            op: BinaryOp::And,
            left,
            right,
            ..
        } => (left, Some(right)),
        other => (other, None),
    }
}

/// Collapses runs of mergeable cases. `dispatch_label` names the enclosing
/// dispatch switch generated default cases continue into.
pub(super) fn process_cases(
    cases: Vec<Case>,
    dispatch_label: &str,
    ctx: &mut LowerContext,
) -> Vec<Case> {
    let mut result = Vec::with_capacity(cases.len());
    let mut run: Vec<Case> = Vec::new();
    let mut common: Option<Candidate> = None;

    for case in cases {
        let current = candidate(&case);
        let joins_run = match (&common, &current) {
            (Some(head), Some(current)) => {
                head.outer.ty == current.outer.ty
                    && tree_equal(
                        &head.nested_expr,
                        &current.nested_expr,
                        (head.outer.id, current.outer.id),
                    )
            }
            _ => false,
        };
        if joins_run {
            run.push(case);
            continue;
        }
        if let Some(head) = common.take() {
            flush(std::mem::take(&mut run), head, dispatch_label, &mut result, ctx);
        }
        match current {
            Some(current) => {
                common = Some(current);
                run.push(case);
            }
            None => result.push(case),
        }
    }
    if let Some(head) = common.take() {
        flush(run, head, dispatch_label, &mut result, ctx);
    }
    result
}

/// Emits one accumulated run: a single case binding the record whose body
/// switches over the shared component chain. Runs of one pass through
/// unchanged.
fn flush(
    run: Vec<Case>,
    common: Candidate,
    dispatch_label: &str,
    result: &mut Vec<Case>,
    ctx: &mut LowerContext,
) {
    if run.len() <= 1 {
        result.extend(run);
        return;
    }
    trace!(cases = run.len(), "merging deconstruction cases");
    let span = run[0].span.clone();
    let nested_label = ctx.fresh_label();

    // all accumulated record bindings denote the same slot; the kept binding
    // aliases the others so references in the moved bodies keep resolving
    let mut outer = common.outer.clone();
    let mut nested_cases = Vec::with_capacity(run.len() + 1);
    for case in run {
        let Some(CaseLabel::Pattern {
            pattern,
            guard: Some(guard),
        }) = case.labels.into_iter().next()
        else {
            unreachable!("run members are candidates");
        };
        if let Pattern::Binding(var, _) = pattern.strip_parens() {
            if var.id != outer.id && !outer.aliases.contains(&var.id) {
                outer.aliases.push(var.id);
            }
        }
        let (check, rest) = split_guard(&guard);
        let Expr::InstanceOf {
            test: TypeTest::Pattern(nested),
            ..
        } = check
        else {
            unreachable!("run members are candidates");
        };
        nested_cases.push(Case {
            labels: vec![CaseLabel::Pattern {
                pattern: nested.clone(),
                guard: rest.cloned(),
            }],
            kind: CaseKind::Statement,
            body: case.body,
            completes_normally: case.completes_normally,
            span: case.span,
        });
    }
    nested_cases.push(Case {
        labels: vec![CaseLabel::Default],
        kind: CaseKind::Statement,
        body: vec![Stmt::Continue {
            label: Some(dispatch_label.to_string()),
            span: span.clone(),
        }],
        completes_normally: false,
        span: span.clone(),
    });
    let nested_cases = process_cases(nested_cases, &nested_label, ctx);

    let nested_switch = Switch {
        selector: Box::new(common.nested_expr),
        cases: nested_cases,
        is_pattern_switch: true,
        has_unconditional: false,
        label: Some(nested_label),
        ty: TypeRef::void(),
        span: span.clone(),
    };
    result.push(Case {
        labels: vec![CaseLabel::Pattern {
            pattern: Pattern::Binding(outer, span.clone()),
            guard: None,
        }],
        kind: CaseKind::Statement,
        body: vec![Stmt::Switch(Box::new(nested_switch))],
        completes_normally: false,
        span,
    });
}

/// Structural equality of the component access chains, spans ignored. The
/// record bindings of the two cases are distinct symbols for the same slot,
/// so references to them compare equal through `pair`.
fn tree_equal(a: &Expr, b: &Expr, pair: (BindingId, BindingId)) -> bool {
    match (a, b) {
        (Expr::Literal(a, _), Expr::Literal(b, _)) => a == b,
        (
            Expr::Ident {
                name: name_a,
                ty: ty_a,
                binding: binding_a,
                ..
            },
            Expr::Ident {
                name: name_b,
                ty: ty_b,
                binding: binding_b,
                ..
            },
        ) => {
            if ty_a != ty_b {
                return false;
            }
            match (binding_a, binding_b) {
                (Some(a), Some(b)) => a == b || (*a, *b) == pair,
                (None, None) => name_a == name_b,
                _ => false,
            }
        }
        (
            Expr::Unary {
                op: op_a,
                operand: operand_a,
                ..
            },
            Expr::Unary {
                op: op_b,
                operand: operand_b,
                ..
            },
        ) => op_a == op_b && tree_equal(operand_a, operand_b, pair),
        (
            Expr::Binary {
                op: op_a,
                left: left_a,
                right: right_a,
                ..
            },
            Expr::Binary {
                op: op_b,
                left: left_b,
                right: right_b,
                ..
            },
        ) => {
            op_a == op_b && tree_equal(left_a, left_b, pair) && tree_equal(right_a, right_b, pair)
        }
        (
            Expr::Cast {
                ty: ty_a,
                expr: expr_a,
                ..
            },
            Expr::Cast {
                ty: ty_b,
                expr: expr_b,
                ..
            },
        ) => ty_a == ty_b && tree_equal(expr_a, expr_b, pair),
        (
            Expr::MethodCall {
                receiver: receiver_a,
                method: method_a,
                args: args_a,
                ..
            },
            Expr::MethodCall {
                receiver: receiver_b,
                method: method_b,
                args: args_b,
                ..
            },
        ) => {
            method_a == method_b
                && args_a.len() == args_b.len()
                && match (receiver_a, receiver_b) {
                    (Some(a), Some(b)) => tree_equal(a, b, pair),
                    (None, None) => true,
                    _ => false,
                }
                && args_a
                    .iter()
                    .zip(args_b)
                    .all(|(a, b)| tree_equal(a, b, pair))
        }
        (
            Expr::InstanceOf {
                expr: expr_a,
                test: TypeTest::Type(ty_a),
                allow_null: allow_a,
                ..
            },
            Expr::InstanceOf {
                expr: expr_b,
                test: TypeTest::Type(ty_b),
                allow_null: allow_b,
                ..
            },
        ) => ty_a == ty_b && allow_a == allow_b && tree_equal(expr_a, expr_b, pair),
        _ => false,
    }
}
