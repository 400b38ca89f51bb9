//! The udev specification: ordered rule snippets plus per-plug/slot tag rounds.

use super::target::{plug_targets, slot_targets};
use crate::interface::Interface;
use crate::specification::SecuritySpecification;
use snap_udev_types::{ConnectedPlug, ConnectedSlot, InterfaceError, PlugInfo, SlotInfo};

/// Where snapd's helper programs live unless configured otherwise.
pub const DEFAULT_LIBEXEC_DIR: &str = "/usr/lib/snapd";

const DEVICE_HELPER: &str = "snap-device-helper";

/// Collects udev rule snippets contributed by interfaces.
///
/// Raw snippets are appended as given. Device tags are buffered per plug or
/// slot (a *round*): every interface consulted for the same plug/slot adds to
/// the same round, and the round renders as one block per target, each
/// holding that target's tag rules followed by a single trigger rule. A round
/// is committed to the output when an entry point for a different plug/slot
/// starts, when a raw snippet is added, or when the specification is consumed.
///
/// The output only ever grows at the end, with one exception: more tags for
/// the open round are merged into its block ahead of each trigger.
#[derive(Debug)]
pub struct Specification {
    snippets: Vec<String>,
    round: Option<Round>,
    /// Interface whose callback is currently running.
    active_interface: Option<String>,
    helper: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Plug,
    Slot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RoundKey {
    side: Side,
    snap: String,
    name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TagRequest {
    interface: String,
    clause: String,
}

#[derive(Debug, Clone)]
struct Round {
    key: RoundKey,
    targets: Vec<String>,
    requests: Vec<TagRequest>,
}

impl Specification {
    pub fn new() -> Self {
        Self::with_libexec_dir(DEFAULT_LIBEXEC_DIR)
    }

    /// Point trigger rules at `{dir}/snap-device-helper`.
    pub fn with_libexec_dir(dir: &str) -> Self {
        Self {
            snippets: Vec::new(),
            round: None,
            active_interface: None,
            helper: format!("{}/{DEVICE_HELPER}", dir.trim_end_matches('/')),
        }
    }

    /// Append a snippet verbatim at the end of the output.
    ///
    /// The open round's block is committed first; tags that follow for the
    /// same plug or slot start a new block with their own triggers.
    pub fn add_snippet(&mut self, snippet: impl Into<String>) {
        self.seal_round();
        self.snippets.push(snippet.into());
    }

    /// Tag devices matching `clause` for every runnable of the plug or slot
    /// being processed.
    ///
    /// Only meaningful from inside an interface callback; elsewhere there is
    /// no plug or slot to scope the tag to and the request is dropped.
    pub fn tag_device(&mut self, clause: impl Into<String>) {
        let clause = clause.into();
        match (&self.active_interface, self.round.as_mut()) {
            (Some(interface), Some(round)) => round.requests.push(TagRequest {
                interface: interface.clone(),
                clause,
            }),
            _ => tracing::warn!("Ignoring udev tag outside of an interface callback: {clause}"),
        }
    }

    /// All snippets so far, in order, including the block of the open round.
    pub fn snippets(&self) -> Vec<String> {
        let mut result = self.snippets.clone();
        if let Some(round) = &self.round {
            result.extend(self.render_round(round));
        }
        result
    }

    /// Commit the open round and return the final snippet sequence.
    pub fn into_snippets(mut self) -> Vec<String> {
        self.commit_round();
        self.snippets
    }

    pub fn add_connected_plug(
        &mut self,
        iface: &Interface,
        plug: &ConnectedPlug,
        slot: &ConnectedSlot,
    ) -> Result<(), InterfaceError> {
        let Some(callback) = iface.connected_plug() else {
            return Ok(());
        };
        let key = RoundKey {
            side: Side::Plug,
            snap: plug.snap().to_string(),
            name: plug.name().to_string(),
        };
        self.run_round(iface.name(), key, || plug_targets(plug.info()), |spec| {
            callback(spec, plug, slot)
        })
    }

    pub fn add_connected_slot(
        &mut self,
        iface: &Interface,
        plug: &ConnectedPlug,
        slot: &ConnectedSlot,
    ) -> Result<(), InterfaceError> {
        let Some(callback) = iface.connected_slot() else {
            return Ok(());
        };
        let key = RoundKey {
            side: Side::Slot,
            snap: slot.snap().to_string(),
            name: slot.name().to_string(),
        };
        self.run_round(iface.name(), key, || slot_targets(slot.info()), |spec| {
            callback(spec, plug, slot)
        })
    }

    pub fn add_permanent_plug(
        &mut self,
        iface: &Interface,
        plug: &PlugInfo,
    ) -> Result<(), InterfaceError> {
        let Some(callback) = iface.permanent_plug() else {
            return Ok(());
        };
        let key = RoundKey {
            side: Side::Plug,
            snap: plug.snap.clone(),
            name: plug.name.clone(),
        };
        self.run_round(iface.name(), key, || plug_targets(plug), |spec| callback(spec, plug))
    }

    pub fn add_permanent_slot(
        &mut self,
        iface: &Interface,
        slot: &SlotInfo,
    ) -> Result<(), InterfaceError> {
        let Some(callback) = iface.permanent_slot() else {
            return Ok(());
        };
        let key = RoundKey {
            side: Side::Slot,
            snap: slot.snap.clone(),
            name: slot.name.clone(),
        };
        self.run_round(iface.name(), key, || slot_targets(slot), |spec| callback(spec, slot))
    }

    /// Run one interface callback inside the round for `key`.
    ///
    /// On failure everything the callback contributed, raw snippets and tag
    /// requests alike, is dropped and the round is restored to what it was
    /// before the call. The error is returned as-is.
    fn run_round(
        &mut self,
        interface: &str,
        key: RoundKey,
        targets: impl FnOnce() -> Vec<String>,
        callback: impl FnOnce(&mut Self) -> Result<(), InterfaceError>,
    ) -> Result<(), InterfaceError> {
        self.open_round(key, targets);

        let committed = self.snippets.len();
        let snapshot = self.round.clone();
        let outer = self.active_interface.replace(interface.to_string());

        let result = callback(self);
        self.active_interface = outer;

        match result {
            Ok(()) => {
                if let Some(round) = &self.round {
                    tracing::debug!(
                        "udev: after '{}' the round for {} holds {} tag(s) ({} target(s))",
                        interface,
                        round.key.name,
                        round.requests.len(),
                        round.targets.len()
                    );
                }
                Ok(())
            }
            Err(err) => {
                self.snippets.truncate(committed);
                self.round = snapshot;
                tracing::debug!("udev: discarding round contribution of '{interface}': {err}");
                Err(err)
            }
        }
    }

    fn open_round(&mut self, key: RoundKey, targets: impl FnOnce() -> Vec<String>) {
        if self.round.as_ref().is_some_and(|r| r.key == key) {
            return;
        }
        self.commit_round();
        self.round = Some(Round {
            key,
            targets: targets(),
            requests: Vec::new(),
        });
    }

    /// Commit the open round's block but keep the round open, empty, for
    /// further tags on the same plug or slot.
    fn seal_round(&mut self) {
        if let Some(round) = self.round.take() {
            let block = self.render_round(&round);
            self.snippets.extend(block);
            self.round = Some(Round {
                requests: Vec::new(),
                ..round
            });
        }
    }

    fn commit_round(&mut self) {
        if let Some(round) = self.round.take() {
            let block = self.render_round(&round);
            self.snippets.extend(block);
        }
    }

    /// Tag rules then one trigger rule, per target in declared order.
    fn render_round(&self, round: &Round) -> Vec<String> {
        if round.requests.is_empty() {
            return Vec::new();
        }
        let mut block = Vec::with_capacity(round.targets.len() * (round.requests.len() + 1));
        for target in &round.targets {
            for req in &round.requests {
                block.push(format!(
                    "# {}\n{}, TAG+=\"{}\"",
                    req.interface, req.clause, target
                ));
            }
            block.push(format!(
                "TAG==\"{target}\", RUN+=\"{} $env{{ACTION}} {target} $devpath $major:$minor\"",
                self.helper
            ));
        }
        block
    }
}

impl Default for Specification {
    fn default() -> Self {
        Self::new()
    }
}

impl SecuritySpecification for Specification {
    fn add_connected_plug(
        &mut self,
        iface: &Interface,
        plug: &ConnectedPlug,
        slot: &ConnectedSlot,
    ) -> Result<(), InterfaceError> {
        Specification::add_connected_plug(self, iface, plug, slot)
    }

    fn add_connected_slot(
        &mut self,
        iface: &Interface,
        plug: &ConnectedPlug,
        slot: &ConnectedSlot,
    ) -> Result<(), InterfaceError> {
        Specification::add_connected_slot(self, iface, plug, slot)
    }

    fn add_permanent_plug(&mut self, iface: &Interface, plug: &PlugInfo) -> Result<(), InterfaceError> {
        Specification::add_permanent_plug(self, iface, plug)
    }

    fn add_permanent_slot(&mut self, iface: &Interface, slot: &SlotInfo) -> Result<(), InterfaceError> {
        Specification::add_permanent_slot(self, iface, slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snap_udev_types::SnapInfo;
    use std::sync::Arc;

    fn connection() -> (ConnectedPlug, ConnectedSlot) {
        let snap1 = SnapInfo::from_yaml(
            "name: snap1\nplugs:\n  name:\n    interface: test\napps:\n  foo:\n    command: bin/foo\nhooks:\n  configure:\n",
        )
        .unwrap();
        let snap2 = SnapInfo::from_yaml("name: snap2\nslots:\n  name:\n    interface: test\n").unwrap();
        (
            ConnectedPlug::new(Arc::clone(snap1.plug("name").unwrap())),
            ConnectedSlot::new(Arc::clone(snap2.slot("name").unwrap())),
        )
    }

    fn trigger(target: &str) -> String {
        format!(
            "TAG==\"{target}\", RUN+=\"/usr/lib/snapd/snap-device-helper $env{{ACTION}} {target} $devpath $major:$minor\""
        )
    }

    #[test]
    fn tag_outside_callback_is_ignored() {
        let mut spec = Specification::new();
        spec.tag_device(r#"kernel="voodoo""#);
        assert!(spec.snippets().is_empty());
    }

    #[test]
    fn single_tag_renders_block_per_target() {
        let (plug, slot) = connection();
        let iface = Interface::new("iface-1").on_connected_plug(|spec, _, _| {
            spec.tag_device(r#"kernel="voodoo""#);
            Ok(())
        });
        let mut spec = Specification::new();
        spec.add_connected_plug(&iface, &plug, &slot).unwrap();
        assert_eq!(
            spec.snippets(),
            [
                "# iface-1\nkernel=\"voodoo\", TAG+=\"snap_snap1_foo\"".to_string(),
                trigger("snap_snap1_foo"),
                "# iface-1\nkernel=\"voodoo\", TAG+=\"snap_snap1_hook_configure\"".to_string(),
                trigger("snap_snap1_hook_configure"),
            ]
        );
    }

    #[test]
    fn repeated_tags_share_one_trigger() {
        let (plug, slot) = connection();
        let iface = Interface::new("iface-1").on_connected_plug(|spec, _, _| {
            spec.tag_device("a");
            spec.tag_device("b");
            Ok(())
        });
        let mut spec = Specification::new();
        spec.add_connected_plug(&iface, &plug, &slot).unwrap();
        spec.add_connected_plug(&iface, &plug, &slot).unwrap();
        let snippets = spec.into_snippets();
        let triggers = snippets.iter().filter(|s| s.starts_with("TAG==")).count();
        assert_eq!(triggers, 2);
        assert_eq!(snippets.len(), 10);
    }

    #[test]
    fn slot_round_targets_apps_only() {
        let (plug, slot) = connection();
        let iface = Interface::new("iface-1").on_connected_slot(|spec, _, _| {
            spec.tag_device("x");
            Ok(())
        });
        let mut spec = Specification::new();
        spec.add_connected_slot(&iface, &plug, &slot).unwrap();
        // snap2 has no apps, so there is nothing to tag.
        assert!(spec.snippets().is_empty());
    }

    #[test]
    fn new_plug_commits_previous_round() {
        let (plug, slot) = connection();
        let iface = Interface::new("iface-1")
            .on_connected_plug(|spec, _, _| {
                spec.tag_device("a");
                Ok(())
            })
            .on_permanent_slot(|spec, _| {
                spec.add_snippet("slot");
                Ok(())
            });
        let mut spec = Specification::new();
        spec.add_connected_plug(&iface, &plug, &slot).unwrap();
        spec.add_permanent_slot(&iface, slot.info()).unwrap();
        let snippets = spec.snippets();
        assert_eq!(snippets.len(), 5);
        assert_eq!(snippets[4], "slot");
        assert_eq!(snippets, spec.into_snippets());
    }

    #[test]
    fn failure_discards_round_contribution() {
        let (plug, slot) = connection();
        let good = Interface::new("good").on_connected_plug(|spec, _, _| {
            spec.tag_device("a");
            Ok(())
        });
        let bad = Interface::new("bad").on_connected_plug(|spec, _, _| {
            spec.add_snippet("partial");
            spec.tag_device("b");
            Err(InterfaceError::failed("bad", "boom"))
        });
        let mut spec = Specification::new();
        spec.add_connected_plug(&good, &plug, &slot).unwrap();
        let before = spec.snippets();

        let err = spec.add_connected_plug(&bad, &plug, &slot).unwrap_err();
        assert_eq!(err, InterfaceError::failed("bad", "boom"));
        assert_eq!(spec.snippets(), before);
        assert!(spec.snippets().iter().all(|s| !s.contains("partial") && !s.contains("# bad")));
    }

    #[test]
    fn custom_libexec_dir() {
        let (plug, _slot) = connection();
        let iface = Interface::new("iface-1").on_permanent_plug(|spec, _| {
            spec.tag_device("a");
            Ok(())
        });
        let mut spec = Specification::with_libexec_dir("/usr/libexec/snapd/");
        spec.add_permanent_plug(&iface, plug.info()).unwrap();
        assert!(spec.snippets()[1].contains("RUN+=\"/usr/libexec/snapd/snap-device-helper $env{ACTION}"));
    }
}
