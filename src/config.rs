//! In-memory launcher configuration.
//!
//! This is the working copy the editor mutates. It may hold blank start
//! entries (rows the user has not filled in yet) and is normalized into a
//! clean copy before it is written anywhere.

use crate::exit_index::ExitIndex;

/// Version of the persisted record this crate reads and writes.
pub const CONFIG_VERSION: u32 = 1;
/// Working directory used when a record does not name one.
pub const DEFAULT_WORKING_DIR: &str = ".";

/// Launcher configuration in its editable form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Version of the record this config was loaded from.
    pub version: u32,
    /// Directory the started commands run in.
    pub working_dir: String,
    /// Whether children of the started commands are killed with them.
    pub cascade_kill: bool,
    /// Commands to start, in order. May contain blank placeholders.
    pub start: Vec<String>,
    /// Which start entry ends the session when it exits.
    pub exit_index: ExitIndex,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            working_dir: DEFAULT_WORKING_DIR.to_string(),
            cascade_kill: false,
            start: vec![String::new()],
            exit_index: ExitIndex::default(),
        }
    }
}

impl Config {
    /// Returns the command designated as the exit trigger, if any.
    pub fn exit_target(&self) -> Option<&str> {
        self.exit_index
            .target()
            .and_then(|index| self.start.get(index))
            .map(String::as_str)
    }
}
