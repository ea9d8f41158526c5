//! Persisted config record and its mapping to [`Config`].
//!
//! The record is the JSON shape written to disk:
//!
//! ```json
//! {
//!   "version": 1,
//!   "cwd": ".",
//!   "cascadeKill": false,
//!   "start": ["cargo run", "pnpm dev"],
//!   "exitOn": 0
//! }
//! ```
//!
//! `null` means "absent" for `cwd` and `exitOn`. Missing fields never fail
//! decoding; defaults are filled in by [`from_record`].

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{Config, CONFIG_VERSION, DEFAULT_WORKING_DIR};
use crate::exit_index::ExitIndex;
use crate::normalize::clean_up_start;

/// Wire form of a launcher config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigRecord {
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub cascade_kill: Option<bool>,
    #[serde(default)]
    pub start: Vec<String>,
    #[serde(default)]
    pub exit_on: Option<usize>,
}

/// Normalizes `config` and maps it to its wire form.
pub fn to_record(config: &Config) -> ConfigRecord {
    let cleaned = clean_up_start(config);
    debug!(
        dropped = config.start.len() - cleaned.start.len(),
        exit_on = ?cleaned.exit_index.target(),
        "normalized start list"
    );
    ConfigRecord {
        version: Some(cleaned.version),
        cwd: Some(cleaned.working_dir),
        cascade_kill: Some(cleaned.cascade_kill),
        exit_on: cleaned.exit_index.target(),
        start: cleaned.start,
    }
}

/// Builds an editable [`Config`] from a record, filling in defaults.
///
/// | field         | when absent              |
/// |---------------|--------------------------|
/// | `version`     | `1`                      |
/// | `cwd`         | `"."`                    |
/// | `cascadeKill` | `false`                  |
/// | `start`       | one blank placeholder    |
/// | `exitOn`      | inactive, display number 1 |
pub fn from_record(record: ConfigRecord) -> Config {
    let start = if record.start.is_empty() {
        vec![String::new()]
    } else {
        record.start
    };

    let exit_index = match record.exit_on {
        Some(exit_on) => {
            if exit_on >= start.len() {
                warn!(
                    exit_on,
                    len = start.len(),
                    "exitOn points past the start list and will be dropped on save"
                );
            }
            ExitIndex::active_at(exit_on)
        }
        None => ExitIndex::default(),
    };

    Config {
        version: record.version.unwrap_or(CONFIG_VERSION),
        working_dir: record
            .cwd
            .unwrap_or_else(|| DEFAULT_WORKING_DIR.to_string()),
        cascade_kill: record.cascade_kill.unwrap_or(false),
        start,
        exit_index,
    }
}
