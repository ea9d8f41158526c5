//! Start list normalization.
//!
//! Strips blank start entries and repoints the exit trigger at the command it
//! named before filtering. If the trigger named a blank entry (or nothing at
//! all) it is deactivated instead.

use crate::config::Config;

/// Returns true when `entry` is empty or whitespace only.
pub fn is_blank(entry: &str) -> bool {
    entry.trim().is_empty()
}

/// Returns a copy of `config` with blank start entries removed.
///
/// The exit trigger keeps pointing at the same command. The result may have an
/// empty start list; it is not re-seeded with a placeholder.
pub fn clean_up_start(config: &Config) -> Config {
    let mut cleaned = config.clone();
    let target = config
        .exit_index
        .target()
        .filter(|&index| config.start.get(index).is_some_and(|entry| !is_blank(entry)));

    match target {
        Some(index) => {
            let (left, right) = config.start.split_at(index + 1);
            let mut start = filled(left);
            // The target is non-blank so it is the last survivor of `left`.
            let new_index = start.len() - 1;
            start.extend(filled(right));
            cleaned.start = start;
            cleaned.exit_index.set_by_index(new_index);
        }
        None => {
            cleaned.exit_index.deactivate();
            cleaned.start = filled(&config.start);
        }
    }
    cleaned
}

fn filled(entries: &[String]) -> Vec<String> {
    entries
        .iter()
        .filter(|entry| !is_blank(entry))
        .cloned()
        .collect()
}
