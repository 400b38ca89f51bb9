//! Rule generation for whole snaps and rules-file rendering.

use super::spec::{DEFAULT_LIBEXEC_DIR, Specification};
use crate::connection::ResolvedConnection;
use crate::interface::Interface;
use crate::registry::InterfaceRegistry;
use crate::specification::SecuritySpecification;
use snap_udev_types::{InterfaceError, SnapInfo};
use std::collections::BTreeMap;

/// First line of every generated rules file.
pub const RULES_FILE_HEADER: &str = "# This file is automatically generated.\n";

/// Rules file name for a snap instance: `70-snap.NAME.rules`.
pub fn rules_file_name(instance_name: &str) -> String {
    format!("70-snap.{instance_name}.rules")
}

/// Render snippets as rules-file content, one snippet per paragraph.
///
/// Returns `None` when there is nothing to write; such a snap should have no
/// rules file at all.
pub fn render_rules_file(snippets: &[String]) -> Option<String> {
    if snippets.is_empty() {
        return None;
    }
    let mut content = String::from(RULES_FILE_HEADER);
    for snippet in snippets {
        content.push_str(snippet);
        content.push('\n');
    }
    Some(content)
}

/// Walks the plugs, slots and connections of snaps and consults the
/// registered interfaces for each.
#[derive(Debug)]
pub struct UdevBackend<'a> {
    registry: &'a InterfaceRegistry,
    libexec_dir: String,
}

impl<'a> UdevBackend<'a> {
    pub fn new(registry: &'a InterfaceRegistry) -> Self {
        Self {
            registry,
            libexec_dir: DEFAULT_LIBEXEC_DIR.to_string(),
        }
    }

    pub fn with_libexec_dir(mut self, dir: impl Into<String>) -> Self {
        self.libexec_dir = dir.into();
        self
    }

    /// Snippets for one snap.
    ///
    /// Each plug is processed as a unit (its permanent callback, then every
    /// connection it takes part in), then each slot the same way, all in
    /// declared order. The first callback error aborts the snap.
    pub fn snap_snippets(
        &self,
        snap: &SnapInfo,
        connections: &[ResolvedConnection],
    ) -> Result<Vec<String>, InterfaceError> {
        let mut spec = Specification::with_libexec_dir(&self.libexec_dir);
        self.add_snap(&mut spec, snap, connections)?;
        let snippets = spec.into_snippets();
        tracing::debug!(
            "udev: {} snippet(s) for snap '{}'",
            snippets.len(),
            snap.instance_name()
        );
        Ok(snippets)
    }

    /// Snippets for every snap, keyed and ordered by instance name.
    ///
    /// Each snap gets its own specification, so results do not depend on the
    /// order of `snaps`.
    pub fn generate(
        &self,
        snaps: &[SnapInfo],
        connections: &[ResolvedConnection],
    ) -> Result<BTreeMap<String, Vec<String>>, InterfaceError> {
        let mut out = BTreeMap::new();
        for snap in snaps {
            out.insert(snap.instance_name(), self.snap_snippets(snap, connections)?);
        }
        Ok(out)
    }

    fn add_snap<S: SecuritySpecification>(
        &self,
        spec: &mut S,
        snap: &SnapInfo,
        connections: &[ResolvedConnection],
    ) -> Result<(), InterfaceError> {
        let instance = snap.instance_name();

        for plug in &snap.plugs {
            if let Some(iface) = self.interface(&plug.interface) {
                spec.add_permanent_plug(iface, plug)?;
            }
            let plug_conns = connections
                .iter()
                .filter(|c| c.plug.snap() == instance && c.plug.name() == plug.name);
            for conn in plug_conns {
                if let Some(iface) = self.interface(conn.interface()) {
                    spec.add_connected_plug(iface, &conn.plug, &conn.slot)?;
                }
            }
        }

        for slot in &snap.slots {
            if let Some(iface) = self.interface(&slot.interface) {
                spec.add_permanent_slot(iface, slot)?;
            }
            let slot_conns = connections
                .iter()
                .filter(|c| c.slot.snap() == instance && c.slot.name() == slot.name);
            for conn in slot_conns {
                if let Some(iface) = self.interface(conn.interface()) {
                    spec.add_connected_slot(iface, &conn.plug, &conn.slot)?;
                }
            }
        }

        Ok(())
    }

    fn interface(&self, name: &str) -> Option<&Interface> {
        let iface = self.registry.get(name).map(|iface| iface.as_ref());
        if iface.is_none() {
            tracing::warn!("Skipping unknown interface '{name}'");
        }
        iface
    }
}
