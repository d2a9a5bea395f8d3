//! Show command implementation
//!
//! Implements `elide-lock show` to print what the project's lockfile holds.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use crate::cli::output::{format_duration, status};
use crate::core::codec::reduced_hash;
use crate::core::stanza::{Stanza, StanzaState};
use crate::infra::loader::{load_lockfile_safe, InterpretedLockfile};

/// Summary printed by `show --json`
#[derive(Debug, Serialize)]
pub struct ShowOutput {
    /// Project root searched
    pub root: String,
    /// Loaded lockfile, if one was found
    pub lockfile: Option<LockfileSummary>,
}

/// One loaded lockfile
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockfileSummary {
    pub path: String,
    pub format: String,
    pub version: String,
    pub fingerprint: String,
    pub fingerprint_hash: i32,
    pub load_micros: Option<u128>,
    pub stanzas: Vec<StanzaSummary>,
}

/// One stanza
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StanzaSummary {
    pub identifier: String,
    pub contributed_by: Option<String>,
    pub fingerprint: String,
    pub inputs: Vec<String>,
    pub remarks: Option<String>,
    pub state: Option<String>,
}

fn state_label(state: &StanzaState) -> String {
    match state {
        StanzaState::Maven(maven) => format!("maven ({} artifacts)", maven.classpath.len()),
        StanzaState::Npm(npm) => format!("npm ({} packages)", npm.packages.len()),
        StanzaState::Custom(custom) => format!("custom ({})", custom.kind),
    }
}

fn summarize_stanza(stanza: &Stanza) -> StanzaSummary {
    StanzaSummary {
        identifier: stanza.identifier.clone(),
        contributed_by: stanza.contributed_by.clone(),
        fingerprint: stanza.fingerprint.to_hex(),
        inputs: stanza
            .inputs
            .iter()
            .map(|input| input.identifier().to_string())
            .collect(),
        remarks: stanza.remarks.as_ref().map(ToString::to_string),
        state: stanza.state.as_ref().map(state_label),
    }
}

/// Build the summary for a loaded lockfile
pub fn summarize(loaded: &InterpretedLockfile) -> LockfileSummary {
    LockfileSummary {
        path: loaded.path().display().to_string(),
        format: loaded.format().to_string(),
        version: loaded.version().to_string(),
        fingerprint: loaded.fingerprint().to_hex(),
        fingerprint_hash: reduced_hash(loaded.fingerprint(), loaded.version()),
        load_micros: loaded.duration().map(|d| d.as_micros()),
        stanzas: loaded.stanzas().iter().map(summarize_stanza).collect(),
    }
}

fn print_text(summary: &LockfileSummary, loaded: &InterpretedLockfile) {
    println!("{} Lockfile {}", status::SUCCESS, summary.path);
    println!("  Version: {}", summary.version);
    println!("  Format: {}", summary.format);
    println!(
        "  Fingerprint: {} (hash {})",
        summary.fingerprint, summary.fingerprint_hash
    );
    if let Some(duration) = loaded.duration() {
        println!("  Loaded in {}", format_duration(duration));
    }

    println!("\nStanzas:");
    if summary.stanzas.is_empty() {
        println!("  (none)");
    }
    for stanza in &summary.stanzas {
        match &stanza.contributed_by {
            Some(by) => println!("  • {} [{by}]", stanza.identifier),
            None => println!("  • {}", stanza.identifier),
        }
        println!("    fingerprint: {}", stanza.fingerprint);
        if let Some(state) = &stanza.state {
            println!("    state: {state}");
        }
        if let Some(remarks) = &stanza.remarks {
            println!("    remarks: {remarks}");
        }
        for input in &stanza.inputs {
            println!("    input: {input}");
        }
    }
}

/// Execute the show command
pub async fn execute(root: &Path, json: bool) -> Result<()> {
    let loaded = load_lockfile_safe(Some(root), None)
        .await
        .with_context(|| format!("Failed to load lockfile under {}", root.display()))?;

    let summary = loaded.as_ref().map(summarize);
    if json {
        let output = ShowOutput {
            root: root.display().to_string(),
            lockfile: summary,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match (summary, loaded) {
        (Some(summary), Some(loaded)) => print_text(&summary, &loaded),
        _ => println!("{} No lockfile found under {}", status::INFO, root.display()),
    }
    Ok(())
}
