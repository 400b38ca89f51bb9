//! End-to-end rule generation over loaded snaps, configured interfaces and
//! connections.

use snap_udev_interfaces::udev::{UdevBackend, render_rules_file, rules_file_name};
use snap_udev_interfaces::{Connection, Interface, InterfaceDecl, InterfaceRegistry, UdevRulesDecl};
use snap_udev_types::{InterfaceError, SnapInfo};

fn snaps() -> Vec<SnapInfo> {
    vec![
        SnapInfo::from_yaml(
            "name: snap2\nslots:\n  serial:\n    interface: serial-port\napps:\n  daemon:\n",
        )
        .unwrap(),
        SnapInfo::from_yaml(
            "name: snap1\nplugs:\n  serial:\n    interface: serial-port\n  net: network\napps:\n  foo:\nhooks:\n  configure:\n",
        )
        .unwrap(),
    ]
}

fn registry() -> InterfaceRegistry {
    InterfaceRegistry::from_decls(&[InterfaceDecl {
        name: "serial-port".into(),
        connected_plug: Some(UdevRulesDecl {
            snippets: Vec::new(),
            tags: vec![r#"SUBSYSTEM=="tty", KERNEL=="ttyUSB0""#.into()],
        }),
        connected_slot: None,
        permanent_plug: None,
        permanent_slot: Some(UdevRulesDecl {
            snippets: vec![r#"KERNEL=="ttyUSB0", MODE="0660""#.into()],
            tags: Vec::new(),
        }),
    }])
}

fn connections(snaps: &[SnapInfo]) -> Vec<snap_udev_interfaces::ResolvedConnection> {
    vec![
        Connection {
            plug: "snap1:serial".into(),
            slot: "snap2:serial".into(),
        }
        .resolve(snaps)
        .unwrap(),
    ]
}

#[test]
fn generates_per_snap_rules_in_name_order() {
    let snaps = snaps();
    let registry = registry();
    let conns = connections(&snaps);
    let out = UdevBackend::new(&registry).generate(&snaps, &conns).unwrap();

    let names: Vec<&String> = out.keys().collect();
    assert_eq!(names, ["snap1", "snap2"]);

    assert_eq!(
        out["snap1"],
        [
            "# serial-port\nSUBSYSTEM==\"tty\", KERNEL==\"ttyUSB0\", TAG+=\"snap_snap1_foo\"",
            r#"TAG=="snap_snap1_foo", RUN+="/usr/lib/snapd/snap-device-helper $env{ACTION} snap_snap1_foo $devpath $major:$minor""#,
            "# serial-port\nSUBSYSTEM==\"tty\", KERNEL==\"ttyUSB0\", TAG+=\"snap_snap1_hook_configure\"",
            r#"TAG=="snap_snap1_hook_configure", RUN+="/usr/lib/snapd/snap-device-helper $env{ACTION} snap_snap1_hook_configure $devpath $major:$minor""#,
        ]
    );
    assert_eq!(out["snap2"], [r#"KERNEL=="ttyUSB0", MODE="0660""#]);
}

#[test]
fn snap_without_contributions_renders_no_file() {
    let snaps = vec![SnapInfo::from_yaml("name: lonely\napps:\n  foo:\n").unwrap()];
    let registry = registry();
    let out = UdevBackend::new(&registry).generate(&snaps, &[]).unwrap();
    assert!(out["lonely"].is_empty());
    assert_eq!(render_rules_file(&out["lonely"]), None);
    assert_eq!(rules_file_name("lonely"), "70-snap.lonely.rules");
}

#[test]
fn libexec_dir_is_configurable() {
    let snaps = snaps();
    let registry = registry();
    let conns = connections(&snaps);
    let backend = UdevBackend::new(&registry).with_libexec_dir("/usr/libexec/snapd");
    let snippets = backend.snap_snippets(&snaps[1], &conns).unwrap();
    assert!(snippets[1].contains("/usr/libexec/snapd/snap-device-helper $env{ACTION}"));
}

#[test]
fn callback_error_aborts_generation() {
    let snaps = snaps();
    let mut registry = registry();
    registry.register(Interface::new("serial-port").on_connected_plug(|_, plug, _| {
        Err(InterfaceError::failed("serial-port", format!("no device for {}", plug.name())))
    }));
    let conns = connections(&snaps);
    let err = UdevBackend::new(&registry).generate(&snaps, &conns).unwrap_err();
    assert_eq!(err, InterfaceError::failed("serial-port", "no device for serial"));
}
