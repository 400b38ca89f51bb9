//! Interface entries with optional udev callbacks.

use crate::udev::Specification;
use snap_udev_types::{ConnectedPlug, ConnectedSlot, InterfaceError, PlugInfo, SlotInfo};
use std::fmt;
use std::sync::Arc;

/// Callback run when a plug/slot connection is processed.
pub type ConnectedCallback = Arc<
    dyn Fn(&mut Specification, &ConnectedPlug, &ConnectedSlot) -> Result<(), InterfaceError>
        + Send
        + Sync,
>;

/// Callback run for a plug declaration, independent of any connection.
pub type PermanentPlugCallback =
    Arc<dyn Fn(&mut Specification, &PlugInfo) -> Result<(), InterfaceError> + Send + Sync>;

/// Callback run for a slot declaration, independent of any connection.
pub type PermanentSlotCallback =
    Arc<dyn Fn(&mut Specification, &SlotInfo) -> Result<(), InterfaceError> + Send + Sync>;

/// A named interface and whichever udev callbacks it implements.
///
/// A missing callback means the interface has nothing to say for that kind of
/// processing; the specification treats it as a successful no-op.
#[derive(Clone)]
pub struct Interface {
    name: String,
    connected_plug: Option<ConnectedCallback>,
    connected_slot: Option<ConnectedCallback>,
    permanent_plug: Option<PermanentPlugCallback>,
    permanent_slot: Option<PermanentSlotCallback>,
}

impl Interface {
    /// Create an interface with no callbacks.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            connected_plug: None,
            connected_slot: None,
            permanent_plug: None,
            permanent_slot: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn on_connected_plug<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Specification, &ConnectedPlug, &ConnectedSlot) -> Result<(), InterfaceError>
            + Send
            + Sync
            + 'static,
    {
        self.connected_plug = Some(Arc::new(f));
        self
    }

    pub fn on_connected_slot<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Specification, &ConnectedPlug, &ConnectedSlot) -> Result<(), InterfaceError>
            + Send
            + Sync
            + 'static,
    {
        self.connected_slot = Some(Arc::new(f));
        self
    }

    pub fn on_permanent_plug<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Specification, &PlugInfo) -> Result<(), InterfaceError> + Send + Sync + 'static,
    {
        self.permanent_plug = Some(Arc::new(f));
        self
    }

    pub fn on_permanent_slot<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Specification, &SlotInfo) -> Result<(), InterfaceError> + Send + Sync + 'static,
    {
        self.permanent_slot = Some(Arc::new(f));
        self
    }

    pub fn connected_plug(&self) -> Option<&ConnectedCallback> {
        self.connected_plug.as_ref()
    }

    pub fn connected_slot(&self) -> Option<&ConnectedCallback> {
        self.connected_slot.as_ref()
    }

    pub fn permanent_plug(&self) -> Option<&PermanentPlugCallback> {
        self.permanent_plug.as_ref()
    }

    pub fn permanent_slot(&self) -> Option<&PermanentSlotCallback> {
        self.permanent_slot.as_ref()
    }
}

impl fmt::Debug for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interface")
            .field("name", &self.name)
            .field("connected_plug", &self.connected_plug.is_some())
            .field("connected_slot", &self.connected_slot.is_some())
            .field("permanent_plug", &self.permanent_plug.is_some())
            .field("permanent_slot", &self.permanent_slot.is_some())
            .finish()
    }
}
