//! Declarative interfaces loaded from configuration.

use crate::interface::Interface;
use crate::udev::Specification;
use serde::{Deserialize, Serialize};

/// udev contributions for one kind of callback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UdevRulesDecl {
    /// Raw rule snippets, appended verbatim.
    #[serde(default)]
    pub snippets: Vec<String>,
    /// Match clauses whose devices get tagged for the plug/slot's runnables
    /// (e.g. `SUBSYSTEM=="tty", KERNEL=="ttyUSB0"`).
    #[serde(default)]
    pub tags: Vec<String>,
}

impl UdevRulesDecl {
    fn apply(&self, spec: &mut Specification) {
        for snippet in &self.snippets {
            spec.add_snippet(snippet.clone());
        }
        for clause in &self.tags {
            spec.tag_device(clause.clone());
        }
    }
}

/// An interface defined in configuration rather than code.
///
/// Each section that is present becomes a callback; absent sections leave the
/// interface silent for that kind of processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDecl {
    pub name: String,
    #[serde(default)]
    pub connected_plug: Option<UdevRulesDecl>,
    #[serde(default)]
    pub connected_slot: Option<UdevRulesDecl>,
    #[serde(default)]
    pub permanent_plug: Option<UdevRulesDecl>,
    #[serde(default)]
    pub permanent_slot: Option<UdevRulesDecl>,
}

impl InterfaceDecl {
    pub fn to_interface(&self) -> Interface {
        let mut iface = Interface::new(self.name.clone());
        if let Some(rules) = self.connected_plug.clone() {
            iface = iface.on_connected_plug(move |spec, _, _| {
                rules.apply(spec);
                Ok(())
            });
        }
        if let Some(rules) = self.connected_slot.clone() {
            iface = iface.on_connected_slot(move |spec, _, _| {
                rules.apply(spec);
                Ok(())
            });
        }
        if let Some(rules) = self.permanent_plug.clone() {
            iface = iface.on_permanent_plug(move |spec, _| {
                rules.apply(spec);
                Ok(())
            });
        }
        if let Some(rules) = self.permanent_slot.clone() {
            iface = iface.on_permanent_slot(move |spec, _| {
                rules.apply(spec);
                Ok(())
            });
        }
        iface
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        interfaces: Vec<InterfaceDecl>,
    }

    #[test]
    fn parse_and_materialize() {
        let toml_str = r#"
[[interfaces]]
name = "serial-port"

[interfaces.connected_plug]
tags = ['SUBSYSTEM=="tty", KERNEL=="ttyUSB0"']

[interfaces.permanent_slot]
snippets = ['KERNEL=="ttyUSB0", MODE="0660"']
"#;
        let parsed: Wrapper = toml::from_str(toml_str).unwrap();
        let decl = &parsed.interfaces[0];
        assert_eq!(decl.name, "serial-port");
        assert_eq!(decl.connected_plug.as_ref().unwrap().tags.len(), 1);
        assert!(decl.connected_plug.as_ref().unwrap().snippets.is_empty());
        assert!(decl.connected_slot.is_none());

        let iface = decl.to_interface();
        assert!(iface.connected_plug().is_some());
        assert!(iface.connected_slot().is_none());
        assert!(iface.permanent_plug().is_none());
        assert!(iface.permanent_slot().is_some());
    }
}
