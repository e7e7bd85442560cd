//! [`BindingStore`] -- the variable name -> binding map for one session.
//!
//! The store performs no validation; callers check a binding before
//! calling [`BindingStore::set`].

use crate::binding::{Binding, BindingMap};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingStore {
    bindings: BindingMap,
}

impl BindingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    /// Replaces whatever `name` was bound to. Returns the previous binding.
    pub fn set(&mut self, name: impl Into<String>, binding: Binding) -> Option<Binding> {
        self.bindings.insert(name.into(), binding)
    }

    /// Replaces the whole map (settings load).
    pub fn set_all(&mut self, bindings: BindingMap) {
        self.bindings = bindings;
    }

    /// Bound variable names, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Binding)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn as_map(&self) -> &BindingMap {
        &self.bindings
    }

    /// An owned copy of the current bindings.
    pub fn snapshot(&self) -> BindingMap {
        self.bindings.clone()
    }
}

impl From<BindingMap> for BindingStore {
    fn from(bindings: BindingMap) -> Self {
        Self { bindings }
    }
}
