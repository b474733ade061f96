//! Shared state threaded through a lowering run.

use std::collections::HashMap;

use jpat_ast::{BindingId, MethodDecl, TypeTable};

use crate::bindings::BindingStack;

pub(crate) struct LowerContext<'a> {
    pub types: &'a TypeTable,
    pub bindings: BindingStack,
    /// Synthetic component accessor proxies generated for the current class,
    /// appended to it once all methods are lowered.
    pending_methods: Vec<MethodDecl>,
    /// (record name, component name) -> proxy method name.
    component_proxies: HashMap<(String, String), String>,
    seq: u32,
    /// Synthetic binding ids count down from the top so they never collide
    /// with source-assigned ids.
    next_synthetic: u32,
}

impl<'a> LowerContext<'a> {
    pub fn new(types: &'a TypeTable) -> Self {
        Self {
            types,
            bindings: BindingStack::new(),
            pending_methods: Vec::new(),
            component_proxies: HashMap::new(),
            seq: 0,
            next_synthetic: u32::MAX,
        }
    }

    /// Fresh number for synthesized temporaries (`patt{n}$temp`,
    /// `selector{n}$temp`, `{n}$index`, ...).
    pub fn fresh_seq(&mut self) -> u32 {
        let seq = self.seq;
        self.seq += 1;
        seq
    }

    pub fn fresh_label(&mut self) -> String {
        format!("match${}", self.fresh_seq())
    }

    pub fn synthetic_binding_id(&mut self) -> BindingId {
        let id = BindingId(self.next_synthetic);
        self.next_synthetic -= 1;
        id
    }

    pub fn proxy_name_for(&self, record: &str, component: &str) -> Option<&String> {
        self.component_proxies
            .get(&(record.to_string(), component.to_string()))
    }

    pub fn register_proxy(&mut self, record: &str, component: &str, method: MethodDecl) {
        self.component_proxies.insert(
            (record.to_string(), component.to_string()),
            method.name.clone(),
        );
        self.pending_methods.push(method);
    }

    pub fn take_pending_methods(&mut self) -> Vec<MethodDecl> {
        std::mem::take(&mut self.pending_methods)
    }
}
