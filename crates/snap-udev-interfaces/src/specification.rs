//! Backend-neutral entry points for building security policy.

use crate::interface::Interface;
use snap_udev_types::{ConnectedPlug, ConnectedSlot, InterfaceError, PlugInfo, SlotInfo};

/// The four ways an interface is consulted while policy for a snap is built.
///
/// Each security backend provides its own specification type; callers that
/// walk plugs, slots and connections only need this trait.
pub trait SecuritySpecification {
    fn add_connected_plug(
        &mut self,
        iface: &Interface,
        plug: &ConnectedPlug,
        slot: &ConnectedSlot,
    ) -> Result<(), InterfaceError>;

    fn add_connected_slot(
        &mut self,
        iface: &Interface,
        plug: &ConnectedPlug,
        slot: &ConnectedSlot,
    ) -> Result<(), InterfaceError>;

    fn add_permanent_plug(&mut self, iface: &Interface, plug: &PlugInfo) -> Result<(), InterfaceError>;

    fn add_permanent_slot(&mut self, iface: &Interface, slot: &SlotInfo) -> Result<(), InterfaceError>;
}
