//! snap-udev CLI: generate udev rules for snap device access.

mod output;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use snap_udev_config::{CliOverrides, SnapUdevConfig};
use snap_udev_interfaces::udev::UdevBackend;
use snap_udev_interfaces::{InterfaceRegistry, ResolvedConnection};
use snap_udev_types::SnapInfo;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "snap-udev",
    version,
    about = "Generate udev rules for snap device access"
)]
struct Cli {
    /// snap.yaml manifests of the snaps to generate rules for
    #[arg(required_unless_present = "instances")]
    manifests: Vec<PathBuf>,

    /// Load a manifest as a parallel-installed instance (repeatable)
    #[arg(long = "instance", value_name = "KEY=PATH", value_parser = parse_instance)]
    instances: Vec<ManifestArg>,

    /// Config file (default: ~/.snap-udev/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding snap-device-helper
    #[arg(long)]
    libexec_dir: Option<String>,

    /// Directory rules files are written to with --write
    #[arg(long)]
    rules_dir: Option<PathBuf>,

    /// Write rules files instead of printing them
    #[arg(long)]
    write: bool,

    /// Output format when printing
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Enable verbose/debug logging
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// A manifest to load, optionally under an instance key.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ManifestArg {
    path: PathBuf,
    instance_key: Option<String>,
}

/// Parse `KEY=PATH` for `--instance`.
fn parse_instance(value: &str) -> Result<ManifestArg, String> {
    match value.split_once('=') {
        Some((key, path)) if !key.is_empty() && !path.is_empty() => Ok(ManifestArg {
            path: PathBuf::from(path),
            instance_key: Some(key.to_string()),
        }),
        _ => Err(format!("expected KEY=PATH, got '{value}'")),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let config = SnapUdevConfig::load(CliOverrides {
        config_file: cli.config,
        libexec_dir: cli.libexec_dir,
        rules_dir: cli.rules_dir,
    })
    .context("Failed to load configuration")?;

    let manifests: Vec<ManifestArg> = cli
        .manifests
        .into_iter()
        .map(|path| ManifestArg {
            path,
            instance_key: None,
        })
        .chain(cli.instances)
        .collect();
    let snaps = load_snaps(&manifests)?;
    let connections = resolve_connections(&config, &snaps)?;

    let registry = InterfaceRegistry::from_decls(&config.interfaces);
    tracing::debug!("Registered interfaces: {:?}", registry.names());

    let backend = UdevBackend::new(&registry).with_libexec_dir(config.libexec_dir.clone());
    let rules = backend
        .generate(&snaps, &connections)
        .context("Failed to generate udev rules")?;

    if cli.write {
        let written = output::write_rules(&config.rules_dir, &rules).with_context(|| {
            format!("Failed to write rules to {}", config.rules_dir.display())
        })?;
        for path in written {
            eprintln!("wrote {}", path.display());
        }
        return Ok(());
    }

    let text = match cli.format {
        Format::Text => output::render_text(&rules),
        Format::Json => output::render_json(&rules).context("Failed to encode rules")?,
    };
    let mut stdout = io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// Load every manifest, rejecting two manifests for the same snap instance.
fn load_snaps(manifests: &[ManifestArg]) -> Result<Vec<SnapInfo>> {
    let mut snaps: Vec<SnapInfo> = Vec::with_capacity(manifests.len());
    for manifest in manifests {
        let path = &manifest.path;
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let snap = SnapInfo::from_yaml_instance(&text, manifest.instance_key.as_deref())
            .with_context(|| format!("Failed to load {}", path.display()))?;
        let instance = snap.instance_name();
        if snaps.iter().any(|s| s.instance_name() == instance) {
            bail!("Snap '{instance}' given more than once ({})", path.display());
        }
        snaps.push(snap);
    }
    Ok(snaps)
}

fn resolve_connections(config: &SnapUdevConfig, snaps: &[SnapInfo]) -> Result<Vec<ResolvedConnection>> {
    config
        .connections
        .iter()
        .map(|conn| {
            conn.resolve(snaps)
                .with_context(|| format!("Invalid connection {} -> {}", conn.plug, conn.slot))
        })
        .collect()
}
