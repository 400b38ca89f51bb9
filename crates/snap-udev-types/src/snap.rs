//! Snap model: the parts of an installed snap that rule generation reads.

use std::fmt;
use std::sync::Arc;

/// An installed snap: its instance name plus ordered apps, hooks, plugs and slots.
///
/// Declared order is preserved everywhere. Rule output depends on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapInfo {
    /// Snap name as declared in the manifest.
    pub name: String,
    /// Optional parallel-install key (`name_key`).
    pub instance_key: Option<String>,
    pub apps: Vec<AppInfo>,
    pub hooks: Vec<HookInfo>,
    pub plugs: Vec<Arc<PlugInfo>>,
    pub slots: Vec<Arc<SlotInfo>>,
}

impl SnapInfo {
    /// The instance name used in security tags and rule file names.
    pub fn instance_name(&self) -> String {
        instance_name(&self.name, self.instance_key.as_deref())
    }

    pub fn plug(&self, name: &str) -> Option<&Arc<PlugInfo>> {
        self.plugs.iter().find(|p| p.name == name)
    }

    pub fn slot(&self, name: &str) -> Option<&Arc<SlotInfo>> {
        self.slots.iter().find(|s| s.name == name)
    }

    /// Security tags of every app, in declared order.
    pub fn app_security_tags(&self) -> Vec<SecurityTag> {
        let instance = self.instance_name();
        self.apps
            .iter()
            .map(|app| SecurityTag::new(&instance, Runnable::App(&app.name)))
            .collect()
    }

    /// Security tags of every hook, in declared order.
    pub fn hook_security_tags(&self) -> Vec<SecurityTag> {
        let instance = self.instance_name();
        self.hooks
            .iter()
            .map(|hook| SecurityTag::new(&instance, Runnable::Hook(&hook.name)))
            .collect()
    }
}

/// Join a snap name and an optional instance key.
pub fn instance_name(snap_name: &str, instance_key: Option<&str>) -> String {
    match instance_key {
        Some(key) if !key.is_empty() => format!("{snap_name}_{key}"),
        _ => snap_name.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfo {
    pub name: String,
    pub command: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookInfo {
    pub name: String,
}

/// A plug as declared in a snap manifest.
///
/// Carries the owning snap's instance name and runnable security tags so that
/// consumers never need to walk back to the snap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlugInfo {
    pub snap: String,
    pub name: String,
    pub interface: String,
    /// Apps then hooks of the owning snap, in declared order.
    pub security_tags: Vec<SecurityTag>,
}

impl PlugInfo {
    pub fn security_tags(&self) -> &[SecurityTag] {
        &self.security_tags
    }
}

/// A slot as declared in a snap manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotInfo {
    pub snap: String,
    pub name: String,
    pub interface: String,
    /// Apps of the owning snap, in declared order. Slots never carry hooks.
    pub security_tags: Vec<SecurityTag>,
}

impl SlotInfo {
    pub fn security_tags(&self) -> &[SecurityTag] {
        &self.security_tags
    }
}

/// A plug taking part in a live connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedPlug {
    info: Arc<PlugInfo>,
}

impl ConnectedPlug {
    pub fn new(info: Arc<PlugInfo>) -> Self {
        Self { info }
    }

    pub fn info(&self) -> &PlugInfo {
        &self.info
    }

    pub fn snap(&self) -> &str {
        &self.info.snap
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn interface(&self) -> &str {
        &self.info.interface
    }

    pub fn security_tags(&self) -> &[SecurityTag] {
        self.info.security_tags()
    }
}

/// A slot taking part in a live connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedSlot {
    info: Arc<SlotInfo>,
}

impl ConnectedSlot {
    pub fn new(info: Arc<SlotInfo>) -> Self {
        Self { info }
    }

    pub fn info(&self) -> &SlotInfo {
        &self.info
    }

    pub fn snap(&self) -> &str {
        &self.info.snap
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn interface(&self) -> &str {
        &self.info.interface
    }

    pub fn security_tags(&self) -> &[SecurityTag] {
        self.info.security_tags()
    }
}

/// Something a snap can run under confinement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Runnable<'a> {
    App(&'a str),
    Hook(&'a str),
}

/// Confinement label of one runnable: `snap.NAME.APP` or `snap.NAME.hook.HOOK`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SecurityTag(String);

impl SecurityTag {
    pub fn new(instance_name: &str, runnable: Runnable<'_>) -> Self {
        match runnable {
            Runnable::App(app) => Self(format!("snap.{instance_name}.{app}")),
            Runnable::Hook(hook) => Self(format!("snap.{instance_name}.hook.{hook}")),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The form used as a udev `TAG` value: dots become underscores.
    pub fn udev_tag(&self) -> String {
        self.0.replace('.', "_")
    }
}

impl fmt::Display for SecurityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
