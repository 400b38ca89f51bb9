//! udev backend: rule assembly, target derivation and rules-file rendering.

pub mod backend;
pub mod spec;
pub mod target;

pub use backend::{RULES_FILE_HEADER, UdevBackend, render_rules_file, rules_file_name};
pub use spec::{DEFAULT_LIBEXEC_DIR, Specification};
pub use target::{plug_targets, slot_targets, udev_target};
