//! Printing and writing generated rules.

use snap_udev_interfaces::udev::{render_rules_file, rules_file_name};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// Every snap's rules file, each preceded by a `==> NAME <==` header.
pub fn render_text(rules: &BTreeMap<String, Vec<String>>) -> String {
    let mut out = String::new();
    for (snap, snippets) in rules {
        let file_name = rules_file_name(snap);
        match render_rules_file(snippets) {
            Some(content) => {
                out.push_str(&format!("==> {file_name} <==\n"));
                out.push_str(&content);
            }
            None => out.push_str(&format!("==> {file_name} (no rules) <==\n")),
        }
    }
    out
}

/// Snap instance name → snippet list, as pretty JSON.
pub fn render_json(rules: &BTreeMap<String, Vec<String>>) -> Result<String, serde_json::Error> {
    let mut json = serde_json::to_string_pretty(rules)?;
    json.push('\n');
    Ok(json)
}

/// Write one rules file per snap into `dir`; snaps without rules lose theirs.
///
/// Files are written under a temporary name and renamed into place so udev
/// never reads a half-written file. Returns the paths written.
pub fn write_rules(dir: &Path, rules: &BTreeMap<String, Vec<String>>) -> io::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    for (snap, snippets) in rules {
        let path = dir.join(rules_file_name(snap));
        match render_rules_file(snippets) {
            Some(content) => {
                write_atomic(&path, &content)?;
                tracing::info!("Wrote {}", path.display());
                written.push(path);
            }
            None => match std::fs::remove_file(&path) {
                Ok(()) => tracing::info!("Removed {}", path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            },
        }
    }
    Ok(written)
}

/// Write `content` to a `.tmp` sibling, then rename it over `path`.
/// The temporary file is removed again if either step fails.
fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    let tmp = path.with_extension("rules.tmp");
    let result = std::fs::write(&tmp, content).and_then(|()| std::fs::rename(&tmp, path));
    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    result
}
