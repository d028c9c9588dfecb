//! Mutable namespaces.
//!
//! A namespace is an ordered symbol→value store with an optional parent
//! link. Insertion order is preserved (it is the field declaration order of
//! the block that produced the namespace), lookup walks the parent chain,
//! and the define/redefine split enforces first-assignment versus
//! must-already-exist discipline.

use std::{cell::RefCell, rc::Rc};

use indexmap::IndexMap;

use crate::{intern::SymbolId, value::Value};

/// Shared handle to a namespace. Namespaces are the one mutable value kind;
/// the values they hold still behave immutably.
pub type NamespaceRef = Rc<RefCell<Namespace>>;

#[derive(Debug, Default)]
pub struct Namespace {
    fields: IndexMap<SymbolId, Value, ahash::RandomState>,
    parent: Option<NamespaceRef>,
}

impl Namespace {
    #[must_use]
    pub fn new(parent: Option<NamespaceRef>) -> Self {
        Self { fields: IndexMap::default(), parent }
    }

    #[must_use]
    pub fn into_ref(self) -> NamespaceRef {
        Rc::new(RefCell::new(self))
    }

    /// Looks a field up, walking the parent chain.
    #[must_use]
    pub fn get(&self, name: SymbolId) -> Option<Value> {
        if let Some(v) = self.fields.get(&name) {
            return Some(v.clone());
        }
        let mut parent = self.parent.clone();
        while let Some(ns) = parent {
            let ns = ns.borrow();
            if let Some(v) = ns.fields.get(&name) {
                return Some(v.clone());
            }
            parent = ns.parent.clone();
        }
        None
    }

    /// Looks a field up in this frame only.
    #[must_use]
    pub fn get_local(&self, name: SymbolId) -> Option<Value> {
        self.fields.get(&name).cloned()
    }

    /// First assignment. Returns `false` when the field already exists in
    /// this frame (the caller decides whether that is fatal or thrown).
    pub fn define(&mut self, name: SymbolId, value: Value) -> bool {
        if self.fields.contains_key(&name) {
            return false;
        }
        self.fields.insert(name, value);
        true
    }

    /// Replacement of an existing field in this frame. Returns `false` when
    /// the field does not exist.
    pub fn redefine(&mut self, name: SymbolId, value: Value) -> bool {
        match self.fields.get_mut(&name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Unconditional store, used by match-mode assignment.
    pub fn put(&mut self, name: SymbolId, value: Value) {
        self.fields.insert(name, value);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Value)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }
}
