// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use std::path::{Path, PathBuf};

use anyhow::Context;
use toml::{Table, Value};
use tracing::debug;

use crate::Config;

const APP_DIR: &str = "askbox";
const FILE_NAME: &str = "config.toml";

/// A merged configuration together with the files it was built from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    /// Files that contributed, lowest priority first.
    pub sources: Vec<PathBuf>,
}

/// Candidate layer files, lowest priority first: system, user, then the
/// working directory.
fn layer_candidates() -> Vec<PathBuf> {
    let system = Path::new("/etc").join(APP_DIR).join(FILE_NAME);
    let user = [dirs::home_dir().map(|h| h.join(".config")), dirs::config_dir()]
        .into_iter()
        .flatten()
        .map(|dir| dir.join(APP_DIR).join(FILE_NAME));
    let local = [Path::new(".askbox").join(FILE_NAME), PathBuf::from("askbox.toml")];

    let mut candidates: Vec<PathBuf> = std::iter::once(system).chain(user).chain(local).collect();
    // `~/.config` and the platform config dir coincide on Linux.
    candidates.dedup();
    candidates
}

/// Load configuration by overlaying every discovered layer, then `explicit`
/// (the `--config` flag) on top.  A missing explicit file is an error;
/// missing discovered files are skipped.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<Config> {
    load_layers(explicit).map(|loaded| loaded.config)
}

/// Like [`load`] but also reports which files were read.
pub fn load_layers(explicit: Option<&Path>) -> anyhow::Result<LoadedConfig> {
    let discovered = layer_candidates().into_iter().filter(|p| p.is_file());
    let sources: Vec<PathBuf> = discovered.chain(explicit.map(Path::to_path_buf)).collect();

    let mut merged = Table::new();
    for path in &sources {
        debug!(path = %path.display(), "loading config layer");
        overlay(&mut merged, read_layer(path)?);
    }

    let config: Config = Value::Table(merged).try_into().context("invalid configuration")?;
    Ok(LoadedConfig { config, sources })
}

fn read_layer(path: &Path) -> anyhow::Result<Table> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    text.parse::<Table>().with_context(|| format!("parsing {}", path.display()))
}

/// Lay `top` over `base`.  Sections present in both are combined key by
/// key; anything else in `top` replaces what `base` had.
fn overlay(base: &mut Table, top: Table) {
    for (key, value) in top {
        match value {
            Value::Table(section) if matches!(base.get(&key), Some(Value::Table(_))) => {
                if let Some(Value::Table(existing)) = base.get_mut(&key) {
                    overlay(existing, section);
                }
            }
            value => {
                base.insert(key, value);
            }
        }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
