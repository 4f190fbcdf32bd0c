// SPDX-License-Identifier: Apache-2.0

use anyhow::Context;
use clap::ArgMatches;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DffLibMapConfig {
    /// Path to the Liberty library (plain or `.gz`).
    pub liberty: Option<String>,

    /// First id for synthesized object names.
    pub start_id: Option<u64>,
}

pub fn load_config(path: &Path) -> anyhow::Result<DffLibMapConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file `{}'", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing config file `{}'", path.display()))
}

/// The liberty path from the `--liberty` flag, falling back to the config
/// file.
pub fn get_liberty_path(
    matches: &ArgMatches,
    config: &Option<DffLibMapConfig>,
) -> Option<PathBuf> {
    if let Some(liberty) = matches.get_one::<String>("liberty") {
        Some(PathBuf::from(liberty))
    } else {
        config
            .as_ref()
            .and_then(|c| c.liberty.as_ref())
            .map(PathBuf::from)
    }
}

/// An explicit first id, if the flag or the config file gives one. Without
/// one the allocator is seeded from the design itself.
pub fn get_start_id(matches: &ArgMatches, config: &Option<DffLibMapConfig>) -> Option<u64> {
    if let Some(start_id) = matches.get_one::<u64>("start_id") {
        Some(*start_id)
    } else {
        config.as_ref().and_then(|c| c.start_id)
    }
}
