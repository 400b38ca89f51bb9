//! Plug/slot connections between snaps.

use serde::{Deserialize, Serialize};
use snap_udev_types::{ConfigError, ConnectedPlug, ConnectedSlot, SnapInfo, SnapUdevError};
use std::fmt;
use std::sync::Arc;

/// A `snap:name` reference to a plug or slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRef {
    pub snap: String,
    pub name: String,
}

impl EndpointRef {
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.split_once(':') {
            Some((snap, name)) if !snap.is_empty() && !name.is_empty() => Ok(Self {
                snap: snap.to_string(),
                name: name.to_string(),
            }),
            _ => Err(ConfigError::InvalidValue {
                key: "connections".into(),
                message: format!("'{s}' is not of the form snap:name"),
            }),
        }
    }
}

impl fmt::Display for EndpointRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.snap, self.name)
    }
}

/// A connection as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Plug end, `snap:plug`.
    pub plug: String,
    /// Slot end, `snap:slot`.
    pub slot: String,
}

/// A connection whose ends were found among the loaded snaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConnection {
    pub plug: ConnectedPlug,
    pub slot: ConnectedSlot,
}

impl ResolvedConnection {
    /// The interface mediating this connection.
    pub fn interface(&self) -> &str {
        self.plug.interface()
    }
}

impl Connection {
    /// Look up both ends among `snaps` (matched by instance name).
    pub fn resolve(&self, snaps: &[SnapInfo]) -> Result<ResolvedConnection, SnapUdevError> {
        let plug_ref = EndpointRef::parse(&self.plug)?;
        let slot_ref = EndpointRef::parse(&self.slot)?;

        let plug = find_snap(snaps, &plug_ref.snap)
            .and_then(|snap| snap.plug(&plug_ref.name))
            .ok_or_else(|| SnapUdevError::UnknownEndpoint {
                side: "plug",
                reference: plug_ref.to_string(),
            })?;
        let slot = find_snap(snaps, &slot_ref.snap)
            .and_then(|snap| snap.slot(&slot_ref.name))
            .ok_or_else(|| SnapUdevError::UnknownEndpoint {
                side: "slot",
                reference: slot_ref.to_string(),
            })?;

        if plug.interface != slot.interface {
            return Err(ConfigError::InvalidValue {
                key: "connections".into(),
                message: format!(
                    "cannot connect {plug_ref} ({}) to {slot_ref} ({})",
                    plug.interface, slot.interface
                ),
            }
            .into());
        }

        Ok(ResolvedConnection {
            plug: ConnectedPlug::new(Arc::clone(plug)),
            slot: ConnectedSlot::new(Arc::clone(slot)),
        })
    }
}

fn find_snap<'a>(snaps: &'a [SnapInfo], instance_name: &str) -> Option<&'a SnapInfo> {
    snaps.iter().find(|s| s.instance_name() == instance_name)
}
