//! Diagnostic CLI over store files: parse status, sidecar state, backup
//! listings, and clearing. This surface never mutates a document except to
//! delete it; the typed load/save contract lives on [`DocumentStore`]
//! inside the host application.
//!
//! [`DocumentStore`]: crate::core::store::DocumentStore

use crate::core::time;
use crate::core::version::{StoreKind, VersionTracker};
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[clap(
    name = "molt",
    version = env!("CARGO_PKG_VERSION"),
    about = "Typed JSON settings store diagnostics"
)]
pub struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report parse status and sidecar state for a document file
    Inspect {
        /// Path to the document file
        path: PathBuf,
        /// Output format: 'text' or 'json'
        #[clap(long, default_value = "text")]
        format: String,
    },
    /// List timestamped backup copies next to a document file
    Backups {
        /// Path to the document file
        path: PathBuf,
        /// Output format: 'text' or 'json'
        #[clap(long, default_value = "text")]
        format: String,
    },
    /// Delete a document file and its sidecars
    Clear {
        /// Path to the document file
        path: PathBuf,
        /// Keep the version marker and fingerprint sidecars
        #[clap(long)]
        keep_sidecars: bool,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Inspect { path, format } => inspect(&path, &format),
        Command::Backups { path, format } => backups(&path, &format),
        Command::Clear {
            path,
            keep_sidecars,
        } => clear(&path, keep_sidecars),
    }
}

fn inspect(path: &Path, format: &str) -> Result<()> {
    let tracker = VersionTracker::new(path, StoreKind::Json, env!("CARGO_PKG_VERSION"));

    let (exists, bytes, parses) = match fs::read_to_string(path) {
        Ok(text) => {
            let parses = serde_json::from_str::<Value>(&text).is_ok();
            (true, text.len(), parses)
        }
        Err(_) => (false, 0, false),
    };
    let empty = exists && bytes == 0;

    let recorded_version = fs::read_to_string(tracker.version_path())
        .ok()
        .map(|v| v.trim().to_string());
    let fingerprint = match tracker.read_information() {
        Ok(information) => Some(information.default_content.len()),
        Err(_) => None,
    };
    let backup_names = backup_siblings(path)?;

    if format == "json" {
        let envelope = time::command_envelope(
            "inspect",
            "ok",
            serde_json::json!({
                "path": path.display().to_string(),
                "exists": exists,
                "empty": empty,
                "parses": parses,
                "recorded_version": recorded_version,
                "fingerprint_present": fingerprint.is_some(),
                "backups": backup_names.len(),
            }),
        );
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        return Ok(());
    }

    println!("{} {}", "document:".bold(), path.display());
    let status = if !exists {
        "missing (load would persist a default)".yellow()
    } else if empty {
        "empty (equivalent to missing)".yellow()
    } else if parses {
        "parses as JSON".green()
    } else {
        "corrupt (load would back it up and persist a default)".red()
    };
    println!("  status: {status}");
    match recorded_version {
        Some(version) => println!("  recorded version: {version}"),
        None => println!("  recorded version: {}", "none".yellow()),
    }
    match fingerprint {
        Some(len) => println!("  fingerprint: present ({len} bytes of default content)"),
        None => println!("  fingerprint: {}", "absent or unreadable".yellow()),
    }
    println!("  backups: {}", backup_names.len());
    Ok(())
}

fn backups(path: &Path, format: &str) -> Result<()> {
    let names = backup_siblings(path)?;

    if format == "json" {
        let envelope = time::command_envelope(
            "backups",
            "ok",
            serde_json::json!({
                "path": path.display().to_string(),
                "backups": names,
            }),
        );
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        return Ok(());
    }

    if names.is_empty() {
        println!("no backups next to {}", path.display());
    } else {
        println!("{} backup(s) next to {}:", names.len(), path.display());
        for name in names {
            println!("  {name}");
        }
    }
    Ok(())
}

fn clear(path: &Path, keep_sidecars: bool) -> Result<()> {
    if !path.exists() {
        bail!("no document at {}", path.display());
    }
    fs::remove_file(path).with_context(|| format!("deleting {}", path.display()))?;
    println!("deleted {}", path.display());

    if !keep_sidecars {
        let tracker = VersionTracker::new(path, StoreKind::Json, env!("CARGO_PKG_VERSION"));
        for sidecar in [tracker.information_path(), tracker.version_path()] {
            if sidecar.exists() {
                fs::remove_file(sidecar)
                    .with_context(|| format!("deleting {}", sidecar.display()))?;
                println!("deleted {}", sidecar.display());
            }
        }
    }
    Ok(())
}

/// Backup siblings of `path`, by the `<stem>-<timestamp>.<ext>` naming the
/// backup helper produces. Sidecar files never match: their tag segment
/// contains letters.
fn backup_siblings(path: &Path) -> Result<Vec<String>> {
    let Some(directory) = path.parent().filter(|d| d.is_dir()) else {
        return Ok(Vec::new());
    };
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return Ok(Vec::new());
    };
    let suffix = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    let mut names = Vec::new();
    for entry in fs::read_dir(directory).with_context(|| format!("reading {}", directory.display()))? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if is_backup_name(name, stem, &suffix) {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

fn is_backup_name(name: &str, stem: &str, suffix: &str) -> bool {
    let Some(rest) = name.strip_prefix(stem).and_then(|r| r.strip_prefix('-')) else {
        return false;
    };
    let Some(timestamp) = rest.strip_suffix(suffix) else {
        return false;
    };
    !timestamp.is_empty()
        && timestamp
            .chars()
            .all(|c| c.is_ascii_digit() || c == '-')
}
