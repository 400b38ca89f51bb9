//! Interface registry for name-based lookup.

use crate::decl::InterfaceDecl;
use crate::interface::Interface;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registry of known interfaces, iterated in name order.
#[derive(Debug, Default, Clone)]
pub struct InterfaceRegistry {
    interfaces: BTreeMap<String, Arc<Interface>>,
}

impl InterfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry from declarative interface definitions.
    ///
    /// A later declaration replaces an earlier one with the same name.
    pub fn from_decls(decls: &[InterfaceDecl]) -> Self {
        let mut registry = Self::new();
        for decl in decls {
            registry.register(decl.to_interface());
        }
        registry
    }

    /// Register an interface, replacing any interface with the same name.
    pub fn register(&mut self, iface: Interface) {
        let name = iface.name().to_string();
        if self.interfaces.insert(name.clone(), Arc::new(iface)).is_some() {
            tracing::warn!("Interface '{}' registered twice; keeping the later one", name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Interface>> {
        self.interfaces.get(name)
    }

    pub fn has_interface(&self, name: &str) -> bool {
        self.interfaces.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.interfaces.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }
}
