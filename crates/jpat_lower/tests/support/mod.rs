//! A small evaluator for lowered trees plus fixture builders.
//!
//! The evaluator only understands the primitive constructs the lowering is
//! allowed to emit: scoped declarations, assignments, conditionals, casts,
//! plain type tests, labeled switches over constants, and the classification
//! call. Encountering an unlowered pattern construct is a test failure. The
//! classification call implements the documented contract: lowest matching
//! entry at or after the restart index, -1 for null, table length for no
//! match.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use jpat_ast::{
    CaseLabel, ClassDecl, ClassifierKind, DispatchEntry, Expr, Literal, MethodDecl, Stmt, Switch,
    TypeRef, TypeTest, UnaryOp,
};

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Int(i64),
    Bool(bool),
    Str(String),
    Enum { class: String, constant: String },
    Obj(Rc<Obj>),
}

#[derive(Debug)]
pub struct Obj {
    pub class: String,
    pub fields: HashMap<String, Value>,
}

impl Value {
    pub fn obj(class: &str, fields: Vec<(&str, Value)>) -> Value {
        Value::Obj(Rc::new(Obj {
            class: class.to_string(),
            fields: fields
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }))
    }

    pub fn str(s: &str) -> Value {
        Value::Str(s.to_string())
    }

    pub fn enum_const(class: &str, constant: &str) -> Value {
        Value::Enum {
            class: class.to_string(),
            constant: constant.to_string(),
        }
    }

    fn runtime_type(&self) -> TypeRef {
        match self {
            Value::Null => TypeRef::Null,
            Value::Int(_) => TypeRef::named("Integer"),
            Value::Bool(_) => TypeRef::named("Boolean"),
            Value::Str(_) => TypeRef::named("String"),
            Value::Enum { class, .. } => TypeRef::named(class.clone()),
            Value::Obj(obj) => TypeRef::named(obj.class.clone()),
        }
    }

    fn truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            other => panic!("expected a boolean, got {other:?}"),
        }
    }

    pub fn as_int(&self) -> i64 {
        match self {
            Value::Int(v) => *v,
            other => panic!("expected an int, got {other:?}"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (
                Value::Enum {
                    class: ca,
                    constant: a,
                },
                Value::Enum {
                    class: cb,
                    constant: b,
                },
            ) => ca == cb && a == b,
            (Value::Obj(a), Value::Obj(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// An in-flight exception.
#[derive(Debug)]
pub struct Thrown(pub Value);

impl Thrown {
    pub fn class(&self) -> &str {
        match &self.0 {
            Value::Obj(obj) => &obj.class,
            other => panic!("non-object thrown: {other:?}"),
        }
    }
}

fn exception(class: &str, message: &str) -> Thrown {
    Thrown(Value::obj(class, vec![("message", Value::str(message))]))
}

/// Statement completion.
#[derive(Debug)]
enum Exec {
    Normal,
    Break(Option<String>),
    Continue(Option<String>),
    Return(Option<Value>),
    Yield(Value),
}

pub struct Machine<'a> {
    types: &'a jpat_ast::TypeTable,
    methods: HashMap<String, MethodDecl>,
    stubs: HashMap<String, Value>,
    failing_accessors: HashSet<String>,
    /// Every method invocation, in evaluation order.
    pub calls: Vec<String>,
    scopes: Vec<HashMap<String, Value>>,
}

impl<'a> Machine<'a> {
    pub fn new(types: &'a jpat_ast::TypeTable, class: &ClassDecl) -> Self {
        Machine {
            types,
            methods: class
                .methods
                .iter()
                .map(|m| (m.name.clone(), m.clone()))
                .collect(),
            stubs: HashMap::new(),
            failing_accessors: HashSet::new(),
            calls: Vec::new(),
            scopes: Vec::new(),
        }
    }

    /// Registers a canned return value for an otherwise unknown static method.
    pub fn stub(mut self, name: &str, value: Value) -> Self {
        self.stubs.insert(name.to_string(), value);
        self
    }

    /// Makes the named instance accessor throw when invoked.
    pub fn failing_accessor(mut self, name: &str) -> Self {
        self.failing_accessors.insert(name.to_string());
        self
    }

    pub fn calls_of(&self, name: &str) -> usize {
        self.calls.iter().filter(|c| c.as_str() == name).count()
    }

    pub fn run(&mut self, method: &str, args: Vec<Value>) -> Result<Value, Thrown> {
        let method = self
            .methods
            .get(method)
            .unwrap_or_else(|| panic!("no method {method}"))
            .clone();
        Ok(self.invoke(&method, args)?.unwrap_or(Value::Null))
    }

    fn invoke(
        &mut self,
        method: &MethodDecl,
        args: Vec<Value>,
    ) -> Result<Option<Value>, Thrown> {
        assert_eq!(method.params.len(), args.len(), "arity of {}", method.name);
        let frame: HashMap<String, Value> = method
            .params
            .iter()
            .map(|p| p.name.clone())
            .zip(args)
            .collect();
        let saved = std::mem::take(&mut self.scopes);
        self.scopes.push(frame);
        let flow = self.exec_stmts(&method.body);
        self.scopes = saved;
        match flow? {
            Exec::Return(value) => Ok(value),
            Exec::Normal => Ok(None),
            other => panic!("control escaped {}: {other:?}", method.name),
        }
    }

    fn exec_stmts(&mut self, statements: &[Stmt]) -> Result<Exec, Thrown> {
        for stmt in statements {
            match self.exec_stmt(stmt)? {
                Exec::Normal => {}
                other => return Ok(other),
            }
        }
        Ok(Exec::Normal)
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<Exec, Thrown> {
        match stmt {
            Stmt::Block { statements, .. } => {
                self.scopes.push(HashMap::new());
                let flow = self.exec_stmts(statements);
                self.scopes.pop();
                flow
            }
            Stmt::LocalVar { name, init, .. } => {
                let value = match init {
                    Some(init) => self.eval_expr(init)?,
                    None => Value::Null,
                };
                self.define(name, value);
                Ok(Exec::Normal)
            }
            Stmt::Expression { expr, .. } => {
                self.eval_expr(expr)?;
                Ok(Exec::Normal)
            }
            Stmt::If {
                condition,
                then_stmt,
                else_stmt,
                ..
            } => {
                if self.eval_expr(condition)?.truthy() {
                    self.exec_stmt(then_stmt)
                } else if let Some(else_stmt) = else_stmt {
                    self.exec_stmt(else_stmt)
                } else {
                    Ok(Exec::Normal)
                }
            }
            Stmt::While {
                condition, body, ..
            } => {
                while self.eval_expr(condition)?.truthy() {
                    match self.exec_stmt(body)? {
                        Exec::Normal | Exec::Continue(None) => {}
                        Exec::Break(None) => break,
                        other => return Ok(other),
                    }
                }
                Ok(Exec::Normal)
            }
            Stmt::For {
                init,
                condition,
                update,
                body,
                ..
            } => {
                self.scopes.push(HashMap::new());
                let flow = (|| {
                    for stmt in init {
                        match self.exec_stmt(stmt)? {
                            Exec::Normal => {}
                            other => return Ok(other),
                        }
                    }
                    loop {
                        if let Some(condition) = condition {
                            if !self.eval_expr(condition)?.truthy() {
                                break;
                            }
                        }
                        match self.exec_stmt(body)? {
                            Exec::Normal | Exec::Continue(None) => {}
                            Exec::Break(None) => break,
                            other => return Ok(other),
                        }
                        for expr in update {
                            self.eval_expr(expr)?;
                        }
                    }
                    Ok(Exec::Normal)
                })();
                self.scopes.pop();
                flow
            }
            Stmt::DoWhile {
                body, condition, ..
            } => {
                loop {
                    match self.exec_stmt(body)? {
                        Exec::Normal | Exec::Continue(None) => {}
                        Exec::Break(None) => break,
                        other => return Ok(other),
                    }
                    if !self.eval_expr(condition)?.truthy() {
                        break;
                    }
                }
                Ok(Exec::Normal)
            }
            Stmt::Switch(switch) => self.run_switch(switch),
            Stmt::Break { label, .. } => Ok(Exec::Break(label.clone())),
            Stmt::Continue { label, .. } => Ok(Exec::Continue(label.clone())),
            Stmt::Return { value, .. } => {
                let value = value.as_ref().map(|v| self.eval_expr(v)).transpose()?;
                Ok(Exec::Return(value))
            }
            Stmt::Yield { value, .. } => Ok(Exec::Yield(self.eval_expr(value)?)),
            Stmt::Throw { expr, .. } => Err(Thrown(self.eval_expr(expr)?)),
            Stmt::Try {
                body,
                catch_name,
                catch_body,
                ..
            } => {
                self.scopes.push(HashMap::new());
                let flow = self.exec_stmts(body);
                self.scopes.pop();
                match flow {
                    Err(Thrown(value)) => {
                        self.scopes.push(HashMap::new());
                        self.define(catch_name, value);
                        let flow = self.exec_stmts(catch_body);
                        self.scopes.pop();
                        flow
                    }
                    ok => ok,
                }
            }
        }
    }

    /// Runs a switch to completion. A `continue` naming the switch's own
    /// label restarts it, re-evaluating the selector; this is how the lowered
    /// dispatch resumes classification after a failed pattern test.
    fn run_switch(&mut self, switch: &Switch) -> Result<Exec, Thrown> {
        'restart: loop {
            let selector = self.eval_expr(&switch.selector)?;
            let Some(start) = self.find_case(switch, &selector)? else {
                return Ok(Exec::Normal);
            };
            self.scopes.push(HashMap::new());
            let mut outcome = Exec::Normal;
            for case in &switch.cases[start..] {
                let flow = match self.exec_stmts(&case.body) {
                    Ok(flow) => flow,
                    Err(thrown) => {
                        self.scopes.pop();
                        return Err(thrown);
                    }
                };
                match flow {
                    Exec::Normal => {} // fallthrough
                    Exec::Break(None) => break,
                    Exec::Break(Some(ref label)) if Some(label) == switch.label.as_ref() => break,
                    Exec::Continue(Some(ref label)) if Some(label) == switch.label.as_ref() => {
                        self.scopes.pop();
                        continue 'restart;
                    }
                    other => {
                        outcome = other;
                        break;
                    }
                }
            }
            self.scopes.pop();
            return Ok(outcome);
        }
    }

    fn find_case(&mut self, switch: &Switch, selector: &Value) -> Result<Option<usize>, Thrown> {
        let mut default = None;
        for (index, case) in switch.cases.iter().enumerate() {
            for label in &case.labels {
                match label {
                    CaseLabel::Constant(expr) => {
                        if self.eval_expr(expr)? == *selector {
                            return Ok(Some(index));
                        }
                    }
                    CaseLabel::Default => default = Some(index),
                    CaseLabel::Pattern { .. } => {
                        panic!("pattern label survived lowering")
                    }
                }
            }
        }
        Ok(default)
    }

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value, Thrown> {
        match expr {
            Expr::Literal(literal, _) => Ok(match literal {
                Literal::Int(v) => Value::Int(*v),
                Literal::String(s) => Value::Str(s.clone()),
                Literal::Boolean(b) => Value::Bool(*b),
                Literal::Character(c) => Value::Int(*c as i64),
                Literal::Null => Value::Null,
            }),
            Expr::Ident { name, ty, .. } => {
                if let Some(value) = self.lookup(name) {
                    return Ok(value);
                }
                if let Some(class) = ty.name() {
                    if let Some(def) = self.types.get(class) {
                        if def.constants.iter().any(|c| c == name) {
                            return Ok(Value::enum_const(class, name));
                        }
                    }
                }
                panic!("unbound identifier {name}")
            }
            Expr::Unary {
                op: UnaryOp::Not,
                operand,
                ..
            } => Ok(Value::Bool(!self.eval_expr(operand)?.truthy())),
            Expr::Binary {
                op, left, right, ..
            } => self.eval_binary(*op, left, right),
            Expr::Conditional {
                condition,
                then_expr,
                else_expr,
                ..
            } => {
                if self.eval_expr(condition)?.truthy() {
                    self.eval_expr(then_expr)
                } else {
                    self.eval_expr(else_expr)
                }
            }
            Expr::Assign { target, value, .. } => {
                let value = self.eval_expr(value)?;
                let Expr::Ident { name, .. } = target.as_ref() else {
                    panic!("assignment to a non-variable")
                };
                self.assign(name, value.clone());
                Ok(value)
            }
            Expr::Cast { expr, .. } => self.eval_expr(expr),
            Expr::InstanceOf {
                expr,
                test,
                allow_null,
                ..
            } => {
                let TypeTest::Type(ty) = test else {
                    panic!("pattern type test survived lowering")
                };
                let value = self.eval_expr(expr)?;
                if matches!(value, Value::Null) {
                    return Ok(Value::Bool(*allow_null));
                }
                Ok(Value::Bool(self.types.is_subtype(&value.runtime_type(), ty)))
            }
            Expr::MethodCall {
                receiver,
                method,
                args,
                ..
            } => {
                let receiver = receiver
                    .as_ref()
                    .map(|r| self.eval_expr(r))
                    .transpose()?;
                let args = args
                    .iter()
                    .map(|a| self.eval_expr(a))
                    .collect::<Result<Vec<_>, _>>()?;
                self.calls.push(method.clone());
                match receiver {
                    Some(receiver) => self.call_instance(&receiver, method),
                    None => self.call_static(method, args),
                }
            }
            Expr::New {
                class_name, args, ..
            } => {
                let args = args
                    .iter()
                    .map(|a| self.eval_expr(a))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(self.construct(class_name, args))
            }
            Expr::Lambda { .. } => panic!("lambda evaluation is not supported"),
            Expr::Switch(switch) => match self.run_switch(switch)? {
                Exec::Yield(value) => Ok(value),
                other => panic!("switch expression completed without a value: {other:?}"),
            },
            Expr::Let { defs, body, .. } => {
                self.scopes.push(HashMap::new());
                let result = (|| {
                    for def in defs {
                        match self.exec_stmt(def)? {
                            Exec::Normal => {}
                            other => panic!("control flow in let definitions: {other:?}"),
                        }
                    }
                    self.eval_expr(body)
                })();
                self.scopes.pop();
                result
            }
            Expr::NullCheck { expr, .. } => {
                let value = self.eval_expr(expr)?;
                if matches!(value, Value::Null) {
                    Err(exception("NullPointerException", "pattern switch selector"))
                } else {
                    Ok(value)
                }
            }
            Expr::Classify {
                kind,
                table,
                subject,
                restart,
                ..
            } => {
                let subject = self.eval_expr(subject)?;
                let restart = self.eval_expr(restart)?.as_int();
                Ok(Value::Int(self.classify(*kind, table, &subject, restart)))
            }
        }
    }

    fn eval_binary(
        &mut self,
        op: jpat_ast::BinaryOp,
        left: &Expr,
        right: &Expr,
    ) -> Result<Value, Thrown> {
        use jpat_ast::BinaryOp::*;
        match op {
            And => {
                if !self.eval_expr(left)?.truthy() {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(self.eval_expr(right)?.truthy()))
            }
            Or => {
                if self.eval_expr(left)?.truthy() {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(self.eval_expr(right)?.truthy()))
            }
            _ => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                Ok(match op {
                    Equal => Value::Bool(left == right),
                    NotEqual => Value::Bool(left != right),
                    Less => Value::Bool(left.as_int() < right.as_int()),
                    LessEqual => Value::Bool(left.as_int() <= right.as_int()),
                    Greater => Value::Bool(left.as_int() > right.as_int()),
                    GreaterEqual => Value::Bool(left.as_int() >= right.as_int()),
                    Add => match (&left, &right) {
                        (Value::Str(a), b) => Value::Str(format!("{a}{}", render(b))),
                        _ => Value::Int(left.as_int() + right.as_int()),
                    },
                    Subtract => Value::Int(left.as_int() - right.as_int()),
                    And | Or => unreachable!(),
                })
            }
        }
    }

    fn call_instance(&mut self, receiver: &Value, method: &str) -> Result<Value, Thrown> {
        if self.failing_accessors.contains(method) {
            return Err(exception("IllegalStateException", method));
        }
        match receiver {
            Value::Obj(obj) => {
                if method == "toString" {
                    return Ok(Value::Str(format!("{}@obj", obj.class)));
                }
                match obj.fields.get(method) {
                    Some(value) => Ok(value.clone()),
                    None => panic!("no accessor {method} on {}", obj.class),
                }
            }
            Value::Str(s) => match method {
                "isEmpty" => Ok(Value::Bool(s.is_empty())),
                "length" => Ok(Value::Int(s.len() as i64)),
                "toString" => Ok(Value::Str(s.clone())),
                _ => panic!("no method {method} on String"),
            },
            Value::Enum { constant, .. } => match method {
                "name" | "toString" => Ok(Value::Str(constant.clone())),
                _ => panic!("no method {method} on enum"),
            },
            Value::Int(v) => match method {
                "intValue" | "hashCode" => Ok(Value::Int(*v)),
                _ => panic!("no method {method} on Integer"),
            },
            other => panic!("method call {method} on {other:?}"),
        }
    }

    fn call_static(&mut self, method: &str, args: Vec<Value>) -> Result<Value, Thrown> {
        if let Some(decl) = self.methods.get(method).cloned() {
            return Ok(self.invoke(&decl, args)?.unwrap_or(Value::Null));
        }
        if let Some(value) = self.stubs.get(method) {
            return Ok(value.clone());
        }
        panic!("no static method or stub named {method}")
    }

    fn construct(&self, class_name: &str, args: Vec<Value>) -> Value {
        if let Some(components) = self.types.components(class_name) {
            let fields = components
                .iter()
                .map(|c| c.name.clone())
                .zip(args)
                .collect();
            return Value::Obj(Rc::new(Obj {
                class: class_name.to_string(),
                fields,
            }));
        }
        // exception-style classes keep a message and an optional cause
        let mut fields = HashMap::new();
        let mut args = args.into_iter();
        if let Some(message) = args.next() {
            fields.insert("message".to_string(), message);
        }
        if let Some(cause) = args.next() {
            fields.insert("cause".to_string(), cause);
        }
        Value::Obj(Rc::new(Obj {
            class: class_name.to_string(),
            fields,
        }))
    }

    fn classify(
        &self,
        _kind: ClassifierKind,
        table: &[DispatchEntry],
        subject: &Value,
        restart: i64,
    ) -> i64 {
        if matches!(subject, Value::Null) {
            return -1;
        }
        let start = restart.max(0) as usize;
        for (index, entry) in table.iter().enumerate().skip(start) {
            let hit = match entry {
                DispatchEntry::Type(ty) => self.types.is_subtype(&subject.runtime_type(), ty),
                DispatchEntry::Int(v) => matches!(subject, Value::Int(s) if s == v),
                DispatchEntry::Str(s) => matches!(subject, Value::Str(v) if v == s),
                DispatchEntry::EnumConstant(name) => {
                    matches!(subject, Value::Enum { constant, .. } if constant == name)
                }
            };
            if hit {
                return index as i64;
            }
        }
        table.len() as i64
    }

    fn lookup(&self, name: &str) -> Option<Value> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .cloned()
    }

    fn assign(&mut self, name: &str, value: Value) {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(slot) = scope.get_mut(name) {
                *slot = value;
                return;
            }
        }
        panic!("assignment to undeclared variable {name}")
    }

    fn define(&mut self, name: &str, value: Value) {
        self.scopes
            .last_mut()
            .expect("no active scope")
            .insert(name.to_string(), value);
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Int(v) => v.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Str(s) => s.clone(),
        Value::Enum { constant, .. } => constant.clone(),
        Value::Obj(obj) => format!("{}@obj", obj.class),
    }
}

/// Shorthand constructors for input trees.
pub mod ast {
    use jpat_ast::{
        BindingVar, Case, CaseKind, CaseLabel, ClassDecl, ClassDef, Expr, Literal, MethodDecl,
        Param, Pattern, RecordComponent, Span, Stmt, Switch, TypeRef, TypeTable, TypeTest,
        UnaryOp,
    };

    pub fn sp() -> Span {
        Span::dummy()
    }

    pub fn lit_i(value: i64) -> Expr {
        Expr::Literal(Literal::Int(value), sp())
    }

    pub fn lit_s(value: &str) -> Expr {
        Expr::Literal(Literal::String(value.to_string()), sp())
    }

    pub fn lit_null() -> Expr {
        Expr::Literal(Literal::Null, sp())
    }

    /// Plain identifier reference.
    pub fn var(name: &str, ty: TypeRef) -> Expr {
        Expr::Ident {
            name: name.to_string(),
            ty,
            binding: None,
            span: sp(),
        }
    }

    /// Reference to a pattern binding variable.
    pub fn bind_ref(name: &str, ty: TypeRef, id: u32) -> Expr {
        Expr::Ident {
            name: name.to_string(),
            ty,
            binding: Some(jpat_ast::BindingId(id)),
            span: sp(),
        }
    }

    pub fn not(expr: Expr) -> Expr {
        Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(expr),
            span: sp(),
        }
    }

    pub fn binding(id: u32, name: &str, ty: TypeRef) -> Pattern {
        Pattern::Binding(BindingVar::new(id, name, ty), sp())
    }

    pub fn preserved_binding(id: u32, name: &str, ty: TypeRef) -> Pattern {
        Pattern::Binding(BindingVar::new(id, name, ty).preserved(), sp())
    }

    pub fn record_pat(type_name: &str, nested: Vec<Pattern>) -> Pattern {
        Pattern::Record {
            type_name: type_name.to_string(),
            binding: None,
            nested,
            span: sp(),
        }
    }

    /// Record pattern with an explicit binding for the whole record value.
    pub fn record_pat_bound(type_name: &str, id: u32, name: &str, nested: Vec<Pattern>) -> Pattern {
        Pattern::Record {
            type_name: type_name.to_string(),
            binding: Some(BindingVar::new(id, name, TypeRef::named(type_name))),
            nested,
            span: sp(),
        }
    }

    pub fn instanceof_pat(subject: Expr, pattern: Pattern) -> Expr {
        Expr::InstanceOf {
            expr: Box::new(subject),
            test: TypeTest::Pattern(pattern),
            allow_null: false,
            span: sp(),
        }
    }

    pub fn call_static(method: &str, args: Vec<Expr>, ty: TypeRef) -> Expr {
        Expr::MethodCall {
            receiver: None,
            method: method.to_string(),
            args,
            ty,
            span: sp(),
        }
    }

    pub fn call(receiver: Expr, method: &str, ty: TypeRef) -> Expr {
        Expr::MethodCall {
            receiver: Some(Box::new(receiver)),
            method: method.to_string(),
            args: Vec::new(),
            ty,
            span: sp(),
        }
    }

    pub fn ret(value: Expr) -> Stmt {
        Stmt::Return {
            value: Some(value),
            span: sp(),
        }
    }

    pub fn yield_stmt(value: Expr) -> Stmt {
        Stmt::Yield { value, span: sp() }
    }

    pub fn if_stmt(condition: Expr, then_stmt: Stmt) -> Stmt {
        Stmt::If {
            condition,
            then_stmt: Box::new(then_stmt),
            else_stmt: None,
            span: sp(),
        }
    }

    pub fn block(statements: Vec<Stmt>) -> Stmt {
        Stmt::Block {
            statements,
            span: sp(),
        }
    }

    /// Arrow case with a single pattern label.
    pub fn pattern_case(pattern: Pattern, guard: Option<Expr>, body: Vec<Stmt>) -> Case {
        Case {
            labels: vec![CaseLabel::Pattern { pattern, guard }],
            kind: CaseKind::Rule,
            body,
            completes_normally: false,
            span: sp(),
        }
    }

    pub fn const_case(label: Expr, body: Vec<Stmt>) -> Case {
        Case {
            labels: vec![CaseLabel::Constant(label)],
            kind: CaseKind::Rule,
            body,
            completes_normally: false,
            span: sp(),
        }
    }

    pub fn default_case(body: Vec<Stmt>) -> Case {
        Case {
            labels: vec![CaseLabel::Default],
            kind: CaseKind::Rule,
            body,
            completes_normally: false,
            span: sp(),
        }
    }

    pub fn switch_expr(
        selector: Expr,
        cases: Vec<Case>,
        has_unconditional: bool,
        ty: TypeRef,
    ) -> Expr {
        Expr::Switch(Box::new(Switch {
            selector: Box::new(selector),
            cases,
            is_pattern_switch: true,
            has_unconditional,
            label: None,
            ty,
            span: sp(),
        }))
    }

    pub fn switch_stmt(selector: Expr, cases: Vec<Case>, has_unconditional: bool) -> Stmt {
        Stmt::Switch(Box::new(Switch {
            selector: Box::new(selector),
            cases,
            is_pattern_switch: true,
            has_unconditional,
            label: None,
            ty: TypeRef::void(),
            span: sp(),
        }))
    }

    pub fn method(name: &str, params: Vec<(&str, TypeRef)>, return_ty: TypeRef, body: Vec<Stmt>) -> MethodDecl {
        MethodDecl {
            name: name.to_string(),
            params: params
                .into_iter()
                .map(|(name, ty)| Param {
                    name: name.to_string(),
                    ty,
                    span: sp(),
                })
                .collect(),
            return_ty,
            body,
            is_static: true,
            is_synthetic: false,
            span: sp(),
        }
    }

    pub fn class(name: &str, methods: Vec<MethodDecl>) -> ClassDecl {
        ClassDecl {
            name: name.to_string(),
            methods,
            span: sp(),
        }
    }

    /// The hierarchy shared by the integration tests.
    pub fn test_types() -> TypeTable {
        let mut table = TypeTable::new();
        table
            .define(ClassDef::interface("CharSequence"))
            .define(ClassDef::class("String", None).implementing(&["CharSequence"]))
            .define(ClassDef::class("Super", None))
            .define(ClassDef::class("Sub1", Some("Super")))
            .define(ClassDef::class("Sub2", Some("Super")))
            .define(ClassDef::record(
                "Box",
                vec![RecordComponent::new("o", TypeRef::object())],
            ))
            .define(ClassDef::record(
                "Pair",
                vec![
                    RecordComponent::new("a", TypeRef::object()),
                    RecordComponent::new("b", TypeRef::object()),
                ],
            ))
            .define(ClassDef::record(
                "Holder",
                vec![RecordComponent::new("f", TypeRef::named("Super"))],
            ))
            .define(ClassDef::record(
                "Can",
                vec![RecordComponent::new("v", TypeRef::object())],
            ))
            .define(ClassDef::record(
                "Jar",
                vec![RecordComponent::new("v", TypeRef::object())],
            ))
            .define(ClassDef::enumeration(
                "Color",
                vec!["RED".into(), "GREEN".into(), "BLUE".into()],
            ));
        table
    }
}
