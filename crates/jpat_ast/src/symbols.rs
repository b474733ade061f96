use crate::types::{PrimitiveType, TypeRef};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kinds of nominal types known to the lowering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassKind {
    Class,
    Interface,
    Record,
    Enum,
}

/// A record component with its resolved accessor method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordComponent {
    pub name: String,
    pub ty: TypeRef,
    pub accessor: String,
}

impl RecordComponent {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        let name = name.into();
        let accessor = name.clone();
        Self { name, ty, accessor }
    }
}

/// Nominal type description as surfaced by upstream attribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    pub kind: ClassKind,
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    pub components: Vec<RecordComponent>,
    pub constants: Vec<String>,
}

impl ClassDef {
    pub fn class(name: impl Into<String>, superclass: Option<&str>) -> Self {
        Self {
            name: name.into(),
            kind: ClassKind::Class,
            superclass: superclass.map(str::to_string),
            interfaces: Vec::new(),
            components: Vec::new(),
            constants: Vec::new(),
        }
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ClassKind::Interface,
            superclass: None,
            interfaces: Vec::new(),
            components: Vec::new(),
            constants: Vec::new(),
        }
    }

    pub fn record(name: impl Into<String>, components: Vec<RecordComponent>) -> Self {
        Self {
            name: name.into(),
            kind: ClassKind::Record,
            superclass: None,
            interfaces: Vec::new(),
            components,
            constants: Vec::new(),
        }
    }

    pub fn enumeration(name: impl Into<String>, constants: Vec<String>) -> Self {
        Self {
            name: name.into(),
            kind: ClassKind::Enum,
            superclass: None,
            interfaces: Vec::new(),
            components: Vec::new(),
            constants,
        }
    }

    pub fn implementing(mut self, interfaces: &[&str]) -> Self {
        self.interfaces = interfaces.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// The slice of the upstream symbol table the lowering needs: the nominal
/// hierarchy, record components, and enum flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeTable {
    classes: HashMap<String, ClassDef>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, def: ClassDef) -> &mut Self {
        self.classes.insert(def.name.clone(), def);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ClassDef> {
        self.classes.get(name)
    }

    pub fn components(&self, name: &str) -> Option<&[RecordComponent]> {
        self.classes
            .get(name)
            .filter(|def| def.kind == ClassKind::Record)
            .map(|def| def.components.as_slice())
    }

    pub fn is_enum(&self, ty: &TypeRef) -> bool {
        ty.name()
            .and_then(|name| self.classes.get(name))
            .map(|def| def.kind == ClassKind::Enum)
            .unwrap_or(false)
    }

    /// Reflexive, transitive subtype test over the erased hierarchy.
    /// `Object` is the top of the reference types; the null type is a subtype
    /// of every reference type; primitives are only subtypes of themselves.
    pub fn is_subtype(&self, sub: &TypeRef, sup: &TypeRef) -> bool {
        match (sub, sup) {
            (TypeRef::Primitive(a), TypeRef::Primitive(b)) => a == b,
            (TypeRef::Null, TypeRef::Named(_)) | (TypeRef::Null, TypeRef::Null) => true,
            (TypeRef::Named(a), TypeRef::Named(b)) => self.is_named_subtype(a, b),
            _ => false,
        }
    }

    fn is_named_subtype(&self, sub: &str, sup: &str) -> bool {
        if sub == sup || sup == "Object" {
            return true;
        }
        let Some(def) = self.classes.get(sub) else {
            return false;
        };
        if let Some(superclass) = &def.superclass {
            if self.is_named_subtype(superclass, sup) {
                return true;
            }
        }
        def.interfaces
            .iter()
            .any(|interface| self.is_named_subtype(interface, sup))
    }

    /// Boxed counterpart of a primitive type, identity on everything else.
    /// Dispatch-table entries for pattern labels always use reference types.
    pub fn boxed(&self, ty: &TypeRef) -> TypeRef {
        match ty {
            TypeRef::Primitive(primitive) => TypeRef::Named(
                match primitive {
                    PrimitiveType::Int => "Integer",
                    PrimitiveType::Long => "Long",
                    PrimitiveType::Boolean => "Boolean",
                    PrimitiveType::Char => "Character",
                }
                .to_string(),
            ),
            other => other.clone(),
        }
    }
}
