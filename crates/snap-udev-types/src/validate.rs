//! Name validation for manifest identifiers.
//!
//! Security tags and udev tags are built by plain string formatting, so every
//! name that flows into them is checked once here, at load time.

use crate::error::SnapError;

/// Snap, hook, plug and slot names: lowercase letters, digits and single
/// hyphens, no leading or trailing hyphen, at least one letter.
pub fn validate_snap_name(name: &str) -> Result<(), SnapError> {
    validate_lowercase(name, "snap")
}

pub fn validate_hook_name(name: &str) -> Result<(), SnapError> {
    validate_lowercase(name, "hook")
}

pub fn validate_plug_slot_name(name: &str, kind: &'static str) -> Result<(), SnapError> {
    validate_lowercase(name, kind)
}

/// App names additionally allow uppercase letters.
pub fn validate_app_name(name: &str) -> Result<(), SnapError> {
    if hyphenated(name, |c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(invalid("app", name))
    }
}

/// Instance keys: up to 10 lowercase letters or digits.
pub fn validate_instance_key(key: &str) -> Result<(), SnapError> {
    let ok = !key.is_empty()
        && key.len() <= 10
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    if ok { Ok(()) } else { Err(invalid("instance key", key)) }
}

fn validate_lowercase(name: &str, kind: &'static str) -> Result<(), SnapError> {
    let ok = hyphenated(name, |c| c.is_ascii_lowercase() || c.is_ascii_digit())
        && name.chars().any(|c| c.is_ascii_lowercase());
    if ok { Ok(()) } else { Err(invalid(kind, name)) }
}

fn hyphenated(name: &str, allowed: impl Fn(char) -> bool) -> bool {
    !name.is_empty()
        && !name.starts_with('-')
        && !name.ends_with('-')
        && !name.contains("--")
        && name.chars().all(|c| c == '-' || allowed(c))
}

fn invalid(kind: &'static str, name: &str) -> SnapError {
    SnapError::InvalidName {
        kind,
        name: name.to_string(),
    }
}
