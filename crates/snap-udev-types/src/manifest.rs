//! `snap.yaml` loading.
//!
//! Only the subset needed for rule generation is read: the snap name, apps,
//! hooks, plugs and slots. YAML mappings are walked in document order so the
//! resulting `SnapInfo` keeps the declared order of every list.

use crate::error::SnapError;
use crate::snap::{AppInfo, HookInfo, PlugInfo, SecurityTag, SlotInfo, SnapInfo};
use crate::validate;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct RawManifest {
    name: Option<String>,
    apps: Option<Mapping>,
    hooks: Option<Mapping>,
    plugs: Option<Mapping>,
    slots: Option<Mapping>,
}

impl SnapInfo {
    /// Parse a `snap.yaml` document.
    pub fn from_yaml(text: &str) -> Result<Self, SnapError> {
        Self::from_yaml_instance(text, None)
    }

    /// Parse a `snap.yaml` document for a parallel-installed instance.
    pub fn from_yaml_instance(text: &str, instance_key: Option<&str>) -> Result<Self, SnapError> {
        let raw: RawManifest =
            serde_yaml::from_str(text).map_err(|e| SnapError::Parse(e.to_string()))?;

        let name = raw.name.ok_or_else(|| SnapError::MissingKey { key: "name".into() })?;
        validate::validate_snap_name(&name)?;
        if let Some(key) = instance_key {
            validate::validate_instance_key(key)?;
        }

        let mut snap = SnapInfo {
            name,
            instance_key: instance_key.map(str::to_string),
            apps: Vec::new(),
            hooks: Vec::new(),
            plugs: Vec::new(),
            slots: Vec::new(),
        };

        for (key, value) in raw.apps.iter().flatten() {
            let name = key_str(key, "app")?;
            validate::validate_app_name(name)?;
            snap.apps.push(AppInfo {
                name: name.to_string(),
                command: app_command(name, value)?,
            });
        }

        for (key, _) in raw.hooks.iter().flatten() {
            let name = key_str(key, "hook")?;
            validate::validate_hook_name(name)?;
            snap.hooks.push(HookInfo {
                name: name.to_string(),
            });
        }

        let instance = snap.instance_name();
        let app_tags = snap.app_security_tags();
        let mut plug_tags: Vec<SecurityTag> = app_tags.clone();
        plug_tags.extend(snap.hook_security_tags());

        for (key, value) in raw.plugs.iter().flatten() {
            let name = key_str(key, "plug")?;
            validate::validate_plug_slot_name(name, "plug")?;
            snap.plugs.push(Arc::new(PlugInfo {
                snap: instance.clone(),
                name: name.to_string(),
                interface: interface_name(name, "plug", value)?,
                security_tags: plug_tags.clone(),
            }));
        }

        for (key, value) in raw.slots.iter().flatten() {
            let name = key_str(key, "slot")?;
            validate::validate_plug_slot_name(name, "slot")?;
            if snap.plug(name).is_some() {
                return Err(SnapError::DuplicateEndpoint {
                    snap: snap.name.clone(),
                    name: name.to_string(),
                });
            }
            snap.slots.push(Arc::new(SlotInfo {
                snap: instance.clone(),
                name: name.to_string(),
                interface: interface_name(name, "slot", value)?,
                security_tags: app_tags.clone(),
            }));
        }

        tracing::debug!(
            "Loaded snap '{}': {} apps, {} hooks, {} plugs, {} slots",
            instance,
            snap.apps.len(),
            snap.hooks.len(),
            snap.plugs.len(),
            snap.slots.len()
        );
        Ok(snap)
    }
}

fn key_str<'a>(key: &'a Value, kind: &'static str) -> Result<&'a str, SnapError> {
    key.as_str().ok_or_else(|| SnapError::InvalidDefinition {
        kind,
        name: format!("{key:?}"),
        message: "name must be a string".into(),
    })
}

fn app_command(name: &str, value: &Value) -> Result<Option<String>, SnapError> {
    match value {
        Value::Null => Ok(None),
        Value::Mapping(map) => match map.get("command") {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(cmd)) => Ok(Some(cmd.clone())),
            Some(_) => Err(SnapError::InvalidDefinition {
                kind: "app",
                name: name.to_string(),
                message: "command must be a string".into(),
            }),
        },
        _ => Err(SnapError::InvalidDefinition {
            kind: "app",
            name: name.to_string(),
            message: "definition must be a mapping".into(),
        }),
    }
}

/// Plugs and slots may be declared as `name:`, `name: iface` or
/// `name: {interface: iface, ...}`. Without an explicit interface the name is used.
fn interface_name(name: &str, kind: &'static str, value: &Value) -> Result<String, SnapError> {
    let invalid = |message: &str| SnapError::InvalidDefinition {
        kind,
        name: name.to_string(),
        message: message.to_string(),
    };
    match value {
        Value::Null => Ok(name.to_string()),
        Value::String(iface) => Ok(iface.clone()),
        Value::Mapping(map) => match map.get("interface") {
            None | Some(Value::Null) => Ok(name.to_string()),
            Some(Value::String(iface)) => Ok(iface.clone()),
            Some(_) => Err(invalid("interface must be a string")),
        },
        _ => Err(invalid("definition must be a string or a mapping")),
    }
}
