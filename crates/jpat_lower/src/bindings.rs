//! Binding environment: maps pattern binding variables to hoisted storage
//! variables and decides where their declarations are emitted.
//!
//! Environments are a stack of frames. `Basic` frames are pushed around every
//! construct that can contain a pattern (type tests, binary and conditional
//! expressions, `if`/`while`/`do-while` statements, switch cases). `Fence`
//! frames (lambdas) decline hoisting so pattern variables never leak out of a
//! closure. `BlockFence` frames (blocks) also stop hoisting but accept
//! prepend requests for preserved bindings, which realizes the rule that a
//! binding variable stays visible in the statements following a successful
//! match.

use jpat_ast::{BindingId, BindingVar, Span, Stmt, TypeRef};

/// A hoisted storage local. Exactly one exists per binding variable (and per
/// alias group); all references to the binding resolve to it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StorageVar {
    pub name: String,
    pub ty: TypeRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Root,
    Basic,
    Fence,
    BlockFence,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    /// Hoisted variables in declaration order.
    hoisted: Vec<(BindingVar, StorageVar)>,
    /// BlockFence only: declarations accepted via prepend, drained by the
    /// block lowering in front of the statement that produced them.
    prepended: Vec<Stmt>,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            hoisted: Vec::new(),
            prepended: Vec::new(),
        }
    }

    fn find(&self, id: BindingId) -> Option<&StorageVar> {
        self.hoisted
            .iter()
            .find(|(binding, _)| binding.is_alias_for(id))
            .map(|(_, storage)| storage)
    }
}

#[derive(Debug)]
pub(crate) struct BindingStack {
    frames: Vec<Frame>,
}

impl BindingStack {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::new(FrameKind::Root)],
        }
    }

    pub fn push_basic(&mut self) {
        self.frames.push(Frame::new(FrameKind::Basic));
    }

    pub fn push_fence(&mut self) {
        self.frames.push(Frame::new(FrameKind::Fence));
    }

    pub fn push_block_fence(&mut self) {
        self.frames.push(Frame::new(FrameKind::BlockFence));
    }

    pub fn pop(&mut self) {
        debug_assert!(self.frames.len() > 1, "root frame must not be popped");
        self.frames.pop();
    }

    /// Registers a binding variable, creating (or finding, through the alias
    /// relation) its storage variable. Hoisting lands in the outermost
    /// non-fence frame reachable from the top of the stack; returns `None`
    /// when the current frame itself is a fence, in which case the pattern
    /// lowers to a no-op.
    pub fn declare(&mut self, var: &BindingVar) -> Option<StorageVar> {
        let top = self.frames.len() - 1;
        let mut target = top;
        while self.frames[target].kind == FrameKind::Basic && target > 0 {
            target -= 1;
        }
        if self.frames[target].kind != FrameKind::Basic {
            if target == top {
                // the current environment is a declaration fence
                return None;
            }
            target += 1;
        }
        if let Some(existing) = self.frames[target].find(var.id) {
            return Some(existing.clone());
        }
        let storage = StorageVar {
            name: var.name.clone(),
            ty: var.ty.clone(),
        };
        self.frames[target]
            .hoisted
            .push((var.clone(), storage.clone()));
        Some(storage)
    }

    /// Resolves a binding reference to its storage variable, outermost
    /// environment first, by identity or alias relation.
    pub fn lookup(&self, id: BindingId) -> Option<StorageVar> {
        self.frames.iter().find_map(|frame| frame.find(id)).cloned()
    }

    /// Declaration statements for every storage variable hoisted into the
    /// current frame. A preserved binding is offered to the immediate parent
    /// first; a block fence accepts it (prepending the declaration into the
    /// enclosing statement list), everything else declines and the
    /// declaration is emitted locally.
    pub fn binding_vars(&mut self, span: &Span) -> Vec<Stmt> {
        let top = self.frames.len() - 1;
        let hoisted = std::mem::take(&mut self.frames[top].hoisted);
        let mut local = Vec::new();
        for (binding, storage) in hoisted {
            let decl = Stmt::LocalVar {
                name: storage.name.clone(),
                ty: storage.ty.clone(),
                init: None,
                span: span.clone(),
            };
            if binding.preserved && top > 0 && self.frames[top - 1].kind == FrameKind::BlockFence {
                let parent = &mut self.frames[top - 1];
                parent.prepended.push(decl);
                parent.hoisted.push((binding, storage));
            } else {
                local.push(decl);
                // keep the entry resolvable until the frame is popped
                self.frames[top].hoisted.push((binding, storage));
            }
        }
        local
    }

    /// Statement-context decoration: prefix the pending declarations in a
    /// block around the statement.
    pub fn decorate_statement(&mut self, stmt: Stmt) -> Stmt {
        let span = stmt.span().clone();
        let mut decls = self.binding_vars(&span);
        if decls.is_empty() {
            stmt
        } else {
            decls.push(stmt);
            Stmt::Block {
                statements: decls,
                span,
            }
        }
    }

    /// Expression-context decoration: wrap the expression in scoped
    /// declarations whose extent is exactly the expression's evaluation.
    pub fn decorate_expression(&mut self, expr: jpat_ast::Expr) -> jpat_ast::Expr {
        let span = expr.span().clone();
        let top = self.frames.len() - 1;
        let mut result = expr;
        for (_, storage) in &self.frames[top].hoisted {
            result = jpat_ast::Expr::Let {
                defs: vec![Stmt::LocalVar {
                    name: storage.name.clone(),
                    ty: storage.ty.clone(),
                    init: None,
                    span: span.clone(),
                }],
                body: Box::new(result),
                span: span.clone(),
            };
        }
        result
    }

    /// Drains declarations the current block fence accepted via prepending.
    pub fn take_prepended(&mut self) -> Vec<Stmt> {
        let top = self.frames.len() - 1;
        std::mem::take(&mut self.frames[top].prepended)
    }
}
