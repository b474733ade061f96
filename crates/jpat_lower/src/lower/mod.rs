//! The lowering walk. Pattern constructs are rewritten bottom-up; every other
//! node is rebuilt with its children lowered. Frames of the binding
//! environment are pushed around each construct that can contain a pattern,
//! so hoisted binding declarations surface at the right scope.

use jpat_ast::{ClassDecl, Expr, MethodDecl, Stmt, TypeTest};
use tracing::debug;

use crate::context::LowerContext;
use crate::error::LowerError;

mod build;
mod flatten;
mod instanceof;
mod merge;
mod switch;

/// Lowers one class: every pattern construct in its method bodies is replaced
/// by primitive trees, and the component accessor proxies synthesized along
/// the way are appended to the class.
pub fn lower_class(
    class: &ClassDecl,
    types: &jpat_ast::TypeTable,
) -> Result<ClassDecl, LowerError> {
    debug!(class = %class.name, "lowering patterns");
    let mut ctx = LowerContext::new(types);
    let mut methods = Vec::with_capacity(class.methods.len());
    for method in &class.methods {
        methods.push(lower_method(method, &mut ctx)?);
    }
    methods.extend(ctx.take_pending_methods());
    Ok(ClassDecl {
        name: class.name.clone(),
        methods,
        span: class.span.clone(),
    })
}

fn lower_method(method: &MethodDecl, ctx: &mut LowerContext) -> Result<MethodDecl, LowerError> {
    Ok(MethodDecl {
        name: method.name.clone(),
        params: method.params.clone(),
        return_ty: method.return_ty.clone(),
        body: lower_block(&method.body, ctx)?,
        is_static: method.is_static,
        is_synthetic: method.is_synthetic,
        span: method.span.clone(),
    })
}

/// Lowers the statements of a block. The block is a declaration fence that
/// accepts prepend requests: a preserved binding hoisted out of one of its
/// statements materializes as a declaration right before that statement.
fn lower_block(statements: &[Stmt], ctx: &mut LowerContext) -> Result<Vec<Stmt>, LowerError> {
    ctx.bindings.push_block_fence();
    let result = lower_block_inner(statements, ctx);
    ctx.bindings.pop();
    result
}

fn lower_block_inner(statements: &[Stmt], ctx: &mut LowerContext) -> Result<Vec<Stmt>, LowerError> {
    let mut out = Vec::with_capacity(statements.len());
    for stmt in statements {
        let lowered = lower_stmt(stmt, ctx)?;
        out.extend(ctx.bindings.take_prepended());
        out.push(lowered);
    }
    Ok(out)
}

/// Lowers a statement list without opening a new scope; used for switch case
/// bodies, which share the scope set up by the switch lowering.
fn lower_stmts(statements: &[Stmt], ctx: &mut LowerContext) -> Result<Vec<Stmt>, LowerError> {
    statements.iter().map(|stmt| lower_stmt(stmt, ctx)).collect()
}

fn lower_stmt(stmt: &Stmt, ctx: &mut LowerContext) -> Result<Stmt, LowerError> {
    match stmt {
        Stmt::Block { statements, span } => Ok(Stmt::Block {
            statements: lower_block(statements, ctx)?,
            span: span.clone(),
        }),
        Stmt::LocalVar {
            name,
            ty,
            init,
            span,
        } => Ok(Stmt::LocalVar {
            name: name.clone(),
            ty: ty.clone(),
            init: init.as_ref().map(|expr| lower_expr(expr, ctx)).transpose()?,
            span: span.clone(),
        }),
        Stmt::Expression { expr, span } => Ok(Stmt::Expression {
            expr: lower_expr(expr, ctx)?,
            span: span.clone(),
        }),
        Stmt::If {
            condition,
            then_stmt,
            else_stmt,
            span,
        } => {
            ctx.bindings.push_basic();
            let lowered = lower_if(condition, then_stmt, else_stmt.as_deref(), span, ctx);
            let result = lowered.map(|stmt| ctx.bindings.decorate_statement(stmt));
            ctx.bindings.pop();
            result
        }
        Stmt::While {
            condition,
            body,
            span,
        } => {
            ctx.bindings.push_basic();
            let lowered = (|| {
                Ok(Stmt::While {
                    condition: lower_expr(condition, ctx)?,
                    body: Box::new(lower_stmt(body, ctx)?),
                    span: span.clone(),
                })
            })();
            let result = lowered.map(|stmt| ctx.bindings.decorate_statement(stmt));
            ctx.bindings.pop();
            result
        }
        Stmt::For {
            init,
            condition,
            update,
            body,
            span,
        } => {
            ctx.bindings.push_basic();
            let lowered = (|| {
                Ok(Stmt::For {
                    init: lower_stmts(init, ctx)?,
                    condition: condition
                        .as_ref()
                        .map(|expr| lower_expr(expr, ctx))
                        .transpose()?,
                    update: update
                        .iter()
                        .map(|expr| lower_expr(expr, ctx))
                        .collect::<Result<_, _>>()?,
                    body: Box::new(lower_stmt(body, ctx)?),
                    span: span.clone(),
                })
            })();
            let result = lowered.map(|stmt| ctx.bindings.decorate_statement(stmt));
            ctx.bindings.pop();
            result
        }
        Stmt::DoWhile {
            body,
            condition,
            span,
        } => {
            ctx.bindings.push_basic();
            let lowered = (|| {
                Ok(Stmt::DoWhile {
                    body: Box::new(lower_stmt(body, ctx)?),
                    condition: lower_expr(condition, ctx)?,
                    span: span.clone(),
                })
            })();
            let result = lowered.map(|stmt| ctx.bindings.decorate_statement(stmt));
            ctx.bindings.pop();
            result
        }
        Stmt::Switch(switch) => switch::lower_switch_stmt(switch, ctx),
        Stmt::Break { .. } | Stmt::Continue { .. } => Ok(stmt.clone()),
        Stmt::Return { value, span } => Ok(Stmt::Return {
            value: value.as_ref().map(|expr| lower_expr(expr, ctx)).transpose()?,
            span: span.clone(),
        }),
        Stmt::Yield { value, span } => Ok(Stmt::Yield {
            value: lower_expr(value, ctx)?,
            span: span.clone(),
        }),
        Stmt::Throw { expr, span } => Ok(Stmt::Throw {
            expr: lower_expr(expr, ctx)?,
            span: span.clone(),
        }),
        Stmt::Try {
            body,
            catch_name,
            catch_body,
            span,
        } => Ok(Stmt::Try {
            body: lower_block(body, ctx)?,
            catch_name: catch_name.clone(),
            catch_body: lower_block(catch_body, ctx)?,
            span: span.clone(),
        }),
    }
}

fn lower_if(
    condition: &Expr,
    then_stmt: &Stmt,
    else_stmt: Option<&Stmt>,
    span: &jpat_ast::Span,
    ctx: &mut LowerContext,
) -> Result<Stmt, LowerError> {
    Ok(Stmt::If {
        condition: lower_expr(condition, ctx)?,
        then_stmt: Box::new(lower_stmt(then_stmt, ctx)?),
        else_stmt: else_stmt
            .map(|stmt| lower_stmt(stmt, ctx).map(Box::new))
            .transpose()?,
        span: span.clone(),
    })
}

fn lower_expr(expr: &Expr, ctx: &mut LowerContext) -> Result<Expr, LowerError> {
    match expr {
        Expr::Literal(..) => Ok(expr.clone()),
        Expr::Ident {
            binding: Some(id),
            span,
            ..
        } => match ctx.bindings.lookup(*id) {
            // redirect the reference to the hoisted storage variable
            Some(storage) => Ok(build::ident(&storage.name, storage.ty, span)),
            None => Ok(expr.clone()),
        },
        Expr::Ident { .. } => Ok(expr.clone()),
        Expr::Unary { op, operand, span } => Ok(Expr::Unary {
            op: *op,
            operand: Box::new(lower_expr(operand, ctx)?),
            span: span.clone(),
        }),
        Expr::Binary {
            op,
            left,
            right,
            span,
        } => {
            ctx.bindings.push_basic();
            let lowered = (|| {
                Ok(Expr::Binary {
                    op: *op,
                    left: Box::new(lower_expr(left, ctx)?),
                    right: Box::new(lower_expr(right, ctx)?),
                    span: span.clone(),
                })
            })();
            let result = lowered.map(|expr| ctx.bindings.decorate_expression(expr));
            ctx.bindings.pop();
            result
        }
        Expr::Conditional {
            condition,
            then_expr,
            else_expr,
            ty,
            span,
        } => {
            ctx.bindings.push_basic();
            let lowered = (|| {
                Ok(Expr::Conditional {
                    condition: Box::new(lower_expr(condition, ctx)?),
                    then_expr: Box::new(lower_expr(then_expr, ctx)?),
                    else_expr: Box::new(lower_expr(else_expr, ctx)?),
                    ty: ty.clone(),
                    span: span.clone(),
                })
            })();
            let result = lowered.map(|expr| ctx.bindings.decorate_expression(expr));
            ctx.bindings.pop();
            result
        }
        Expr::Assign {
            target,
            value,
            span,
        } => Ok(Expr::Assign {
            target: Box::new(lower_expr(target, ctx)?),
            value: Box::new(lower_expr(value, ctx)?),
            span: span.clone(),
        }),
        Expr::Cast { ty, expr, span } => Ok(Expr::Cast {
            ty: ty.clone(),
            expr: Box::new(lower_expr(expr, ctx)?),
            span: span.clone(),
        }),
        Expr::InstanceOf {
            expr: subject,
            test,
            allow_null,
            span,
        } => match test {
            TypeTest::Pattern(pattern) => {
                instanceof::lower_instanceof(subject, pattern, *allow_null, span, ctx)
            }
            TypeTest::Type(ty) => Ok(Expr::InstanceOf {
                expr: Box::new(lower_expr(subject, ctx)?),
                test: TypeTest::Type(ty.clone()),
                allow_null: *allow_null,
                span: span.clone(),
            }),
        },
        Expr::MethodCall {
            receiver,
            method,
            args,
            ty,
            span,
        } => Ok(Expr::MethodCall {
            receiver: receiver
                .as_ref()
                .map(|expr| lower_expr(expr, ctx).map(Box::new))
                .transpose()?,
            method: method.clone(),
            args: args
                .iter()
                .map(|arg| lower_expr(arg, ctx))
                .collect::<Result<_, _>>()?,
            ty: ty.clone(),
            span: span.clone(),
        }),
        Expr::New {
            class_name,
            args,
            span,
        } => Ok(Expr::New {
            class_name: class_name.clone(),
            args: args
                .iter()
                .map(|arg| lower_expr(arg, ctx))
                .collect::<Result<_, _>>()?,
            span: span.clone(),
        }),
        Expr::Lambda {
            params,
            body,
            ty,
            span,
        } => {
            // bindings never hoist out of a closure
            ctx.bindings.push_fence();
            let lowered = lower_block(body, ctx);
            ctx.bindings.pop();
            Ok(Expr::Lambda {
                params: params.clone(),
                body: lowered?,
                ty: ty.clone(),
                span: span.clone(),
            })
        }
        Expr::Switch(switch) => switch::lower_switch_expr(switch, ctx),
        Expr::Let { defs, body, span } => Ok(Expr::Let {
            defs: lower_stmts(defs, ctx)?,
            body: Box::new(lower_expr(body, ctx)?),
            span: span.clone(),
        }),
        Expr::NullCheck { expr, span } => Ok(Expr::NullCheck {
            expr: Box::new(lower_expr(expr, ctx)?),
            span: span.clone(),
        }),
        Expr::Classify {
            kind,
            table,
            subject,
            restart,
            span,
        } => Ok(Expr::Classify {
            kind: *kind,
            table: table.clone(),
            subject: Box::new(lower_expr(subject, ctx)?),
            restart: Box::new(lower_expr(restart, ctx)?),
            span: span.clone(),
        }),
    }
}
