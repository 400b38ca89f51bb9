//! Udev tag values for the runnables a plug or slot confines.

use snap_udev_types::{PlugInfo, Runnable, SecurityTag, SlotInfo};

/// Udev tag for one runnable: `snap_NAME_APP` or `snap_NAME_hook_HOOK`.
///
/// Names are trusted to be valid; the manifest loader checks them.
pub fn udev_target(snap_instance: &str, runnable: Runnable<'_>) -> String {
    SecurityTag::new(snap_instance, runnable).udev_tag()
}

/// Targets of a plug: every app, then every hook, in declared order.
pub fn plug_targets(plug: &PlugInfo) -> Vec<String> {
    plug.security_tags().iter().map(SecurityTag::udev_tag).collect()
}

/// Targets of a slot: every app in declared order.
pub fn slot_targets(slot: &SlotInfo) -> Vec<String> {
    slot.security_tags().iter().map(SecurityTag::udev_tag).collect()
}
