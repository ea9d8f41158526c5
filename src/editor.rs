//! Editing session for a single config file.
//!
//! The `Editor` owns the working copy of a [`Config`] together with the path it
//! belongs to. User actions arrive as [`Edit`] values and are applied in place;
//! the exit trigger is kept pointing at the same command while entries are
//! inserted, removed or reordered. Saving normalizes a copy and leaves the
//! working copy (blank rows included) as the user left it.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::Config;
use crate::record::{from_record, to_record};
use crate::store::{load_config, save_config, SaveMode, StoreError};

/// A single user action on the working copy. Positions are zero-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Append a start entry.
    Push(String),
    /// Insert a start entry before `at`. Positions past the end append.
    Insert { at: usize, command: String },
    /// Replace the text of an entry.
    Set { at: usize, command: String },
    /// Remove an entry.
    Remove { at: usize },
    /// Move an entry from one position to another.
    Move { from: usize, to: usize },
    /// Designate the entry with the given one-based display number.
    DesignateExit { display: usize },
    /// Turn the exit trigger on at its remembered position, or off.
    ToggleExit,
    /// Turn the exit trigger off.
    ClearExit,
    SetCascadeKill(bool),
    SetWorkingDir(String),
}

/// Working copy of a config file.
#[derive(Debug, Clone)]
pub struct Editor {
    config_path: PathBuf,
    config: Config,
}

impl Editor {
    /// Starts a fresh default config for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            config: Config::default(),
        }
    }

    /// Loads the config stored at `path`.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let config_path = path.into();
        let record = load_config(&config_path).await?;
        Ok(Self {
            config: from_record(record),
            config_path,
        })
    }

    /// Normalizes the working copy and writes it to the config path.
    pub async fn save(&self, mode: SaveMode) -> Result<(), StoreError> {
        save_config(&to_record(&self.config), &self.config_path, mode).await
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Applies `edit` to the working copy.
    ///
    /// Returns `false` when the edit names a position that does not exist, in
    /// which case the edit itself was not applied. A trigger pointing past the
    /// end of the list is turned off before any edit.
    pub fn apply(&mut self, edit: Edit) -> bool {
        debug!(?edit, "applying edit");
        let dangling = self.drop_dangling_exit();
        let applied = match edit {
            Edit::Push(command) => {
                self.config.start.push(command);
                true
            }
            Edit::Insert { at, command } => {
                self.insert(at, command);
                true
            }
            Edit::Set { at, command } => match self.config.start.get_mut(at) {
                Some(entry) => {
                    *entry = command;
                    true
                }
                None => false,
            },
            Edit::Remove { at } => self.remove(at),
            Edit::Move { from, to } => self.move_entry(from, to),
            Edit::DesignateExit { display } => {
                self.designate_exit(display);
                true
            }
            Edit::ToggleExit => {
                if dangling {
                    // Already turned off above.
                } else if self.config.exit_index.is_active() {
                    self.config.exit_index.deactivate();
                } else {
                    let last = self.config.start.len().saturating_sub(1);
                    let index = self.config.exit_index.index().min(last);
                    self.config.exit_index.activate(index);
                }
                true
            }
            Edit::ClearExit => {
                self.config.exit_index.deactivate();
                true
            }
            Edit::SetCascadeKill(cascade_kill) => {
                self.config.cascade_kill = cascade_kill;
                true
            }
            Edit::SetWorkingDir(dir) => {
                self.config.working_dir = dir;
                true
            }
        };
        self.settle_exit_memory();
        applied
    }

    /// Turns off an active trigger whose index is outside the list.
    fn drop_dangling_exit(&mut self) -> bool {
        let len = self.config.start.len();
        match self.config.exit_index.target() {
            Some(index) if index >= len => {
                warn!(index, len, "exit trigger points past the start list, turning it off");
                self.config.exit_index.deactivate();
                true
            }
            _ => false,
        }
    }

    fn insert(&mut self, at: usize, command: String) {
        let at = at.min(self.config.start.len());
        self.config.start.insert(at, command);
        if let Some(index) = self.config.exit_index.target() {
            if at <= index {
                self.config.exit_index.set_by_index(index + 1);
            }
        }
    }

    fn remove(&mut self, at: usize) -> bool {
        if at >= self.config.start.len() {
            return false;
        }
        let target = self.config.exit_index.target();
        if target == Some(at) {
            self.config.exit_index.deactivate();
        }
        if self.config.start.len() == 1 {
            // Keep one row to type into.
            self.config.start[0].clear();
            return true;
        }
        self.config.start.remove(at);
        if let Some(index) = target.filter(|&index| index > at) {
            self.config.exit_index.set_by_index(index - 1);
        }
        true
    }

    fn move_entry(&mut self, from: usize, to: usize) -> bool {
        let len = self.config.start.len();
        if from >= len || to >= len {
            return false;
        }
        let entry = self.config.start.remove(from);
        self.config.start.insert(to, entry);
        if let Some(index) = self.config.exit_index.target() {
            let moved = if index == from {
                to
            } else if from < index && index <= to {
                index - 1
            } else if to <= index && index < from {
                index + 1
            } else {
                index
            };
            self.config.exit_index.set_by_index(moved);
        }
        true
    }

    fn designate_exit(&mut self, display: usize) {
        let len = self.config.start.len();
        let exit_index = &mut self.config.exit_index;
        let remembered = exit_index.index();
        exit_index.activate(remembered);
        exit_index.set_by_display(display);
        exit_index.clamp_display(1, len);
        exit_index.recompute_index_from_display();
    }

    /// Pulls a remembered but inactive position back inside the list.
    fn settle_exit_memory(&mut self) {
        let exit_index = &mut self.config.exit_index;
        if !exit_index.is_active() {
            exit_index.clamp_display(1, self.config.start.len());
            exit_index.recompute_index_from_display();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_index::ExitIndex;
    use crate::store::CONFIG_FILE_NAME;

    fn editor(start: &[&str]) -> Editor {
        let mut editor = Editor::new(CONFIG_FILE_NAME);
        editor.config.start = start.iter().map(|s| s.to_string()).collect();
        editor
    }

    fn designate(editor: &mut Editor, display: usize) {
        assert!(editor.apply(Edit::DesignateExit { display }));
    }

    #[test]
    fn designate_exit_clamps_display_into_list() {
        let mut editor = editor(&["a", "b", "c"]);
        designate(&mut editor, 9);
        assert_eq!(editor.config().exit_target(), Some("c"));
        assert_eq!(editor.config().exit_index.display_number(), 3);

        designate(&mut editor, 0);
        assert_eq!(editor.config().exit_target(), Some("a"));
        assert_eq!(editor.config().exit_index.index(), 0);
    }

    #[test]
    fn insert_before_trigger_shifts_it() {
        let mut editor = editor(&["a", "b"]);
        designate(&mut editor, 2);
        editor.apply(Edit::Insert {
            at: 0,
            command: "z".into(),
        });
        assert_eq!(editor.config().start, vec!["z", "a", "b"]);
        assert_eq!(editor.config().exit_target(), Some("b"));
        assert_eq!(editor.config().exit_index.display_number(), 3);
    }

    #[test]
    fn insert_past_end_appends() {
        let mut editor = editor(&["a"]);
        editor.apply(Edit::Insert {
            at: 10,
            command: "b".into(),
        });
        assert_eq!(editor.config().start, vec!["a", "b"]);
    }

    #[test]
    fn remove_before_trigger_shifts_it() {
        let mut editor = editor(&["a", "b", "c"]);
        designate(&mut editor, 3);
        assert!(editor.apply(Edit::Remove { at: 0 }));
        assert_eq!(editor.config().exit_target(), Some("c"));
        assert_eq!(editor.config().exit_index.index(), 1);
    }

    #[test]
    fn removing_trigger_deactivates_it() {
        let mut editor = editor(&["a", "b", "c"]);
        designate(&mut editor, 2);
        assert!(editor.apply(Edit::Remove { at: 1 }));
        assert!(!editor.config().exit_index.is_active());
        assert_eq!(editor.config().start, vec!["a", "c"]);
    }

    #[test]
    fn removing_last_entry_leaves_placeholder() {
        let mut editor = editor(&["a"]);
        designate(&mut editor, 1);
        assert!(editor.apply(Edit::Remove { at: 0 }));
        assert_eq!(editor.config().start, vec![String::new()]);
        assert!(!editor.config().exit_index.is_active());
    }

    #[test]
    fn out_of_range_edits_are_rejected() {
        let mut editor = editor(&["a", "b"]);
        let before = editor.config().clone();
        assert!(!editor.apply(Edit::Remove { at: 2 }));
        assert!(!editor.apply(Edit::Move { from: 0, to: 2 }));
        assert!(!editor.apply(Edit::Set {
            at: 5,
            command: "x".into()
        }));
        assert_eq!(editor.config(), &before);
    }

    #[test]
    fn trigger_follows_moved_entries() {
        let mut editor = editor(&["a", "b", "c", "d"]);
        designate(&mut editor, 2);

        editor.apply(Edit::Move { from: 1, to: 3 });
        assert_eq!(editor.config().start, vec!["a", "c", "d", "b"]);
        assert_eq!(editor.config().exit_target(), Some("b"));

        editor.apply(Edit::Move { from: 0, to: 2 });
        assert_eq!(editor.config().exit_target(), Some("b"));

        editor.apply(Edit::Move { from: 3, to: 0 });
        assert_eq!(editor.config().start[0], "b");
        assert_eq!(editor.config().exit_index.index(), 0);

        editor.apply(Edit::Move { from: 2, to: 1 });
        assert_eq!(editor.config().exit_target(), Some("b"));
    }

    #[test]
    fn toggle_remembers_and_clamps_position() {
        let mut editor = editor(&["a", "b", "c"]);
        designate(&mut editor, 3);
        editor.apply(Edit::ToggleExit);
        assert!(!editor.config().exit_index.is_active());

        editor.apply(Edit::Remove { at: 2 });
        editor.apply(Edit::ToggleExit);
        assert_eq!(editor.config().exit_target(), Some("b"));
    }

    #[test]
    fn inactive_memory_stays_in_sync_after_shrinking() {
        let mut editor = editor(&["a", "b", "c"]);
        designate(&mut editor, 3);
        editor.apply(Edit::ClearExit);
        editor.apply(Edit::Remove { at: 0 });
        editor.apply(Edit::Remove { at: 0 });
        let exit_index = editor.config().exit_index;
        assert_eq!(exit_index.display_number(), 1);
        assert_eq!(exit_index.display_number(), exit_index.index() + 1);
    }

    #[test]
    fn settings_edits_apply() {
        let mut editor = editor(&["a"]);
        editor.apply(Edit::SetCascadeKill(true));
        editor.apply(Edit::SetWorkingDir("/srv".into()));
        editor.apply(Edit::Set {
            at: 0,
            command: "cargo run".into(),
        });
        assert!(editor.config().cascade_kill);
        assert_eq!(editor.config().working_dir, "/srv");
        assert_eq!(editor.config().start, vec!["cargo run"]);
    }

    #[test]
    fn loaded_trigger_past_end_does_not_land_on_new_entry() {
        let mut editor = editor(&[]);
        editor.config = from_record(crate::record::ConfigRecord {
            version: Some(1),
            cwd: None,
            cascade_kill: None,
            start: vec!["a".into(), "b".into(), "c".into()],
            exit_on: Some(3),
        });
        assert!(editor.apply(Edit::Push("d".into())));
        assert!(!editor.config().exit_index.is_active());
        assert_eq!(to_record(editor.config()).exit_on, None);
    }

    #[test]
    fn huge_loaded_trigger_does_not_overflow_on_insert() {
        let mut editor = editor(&["a", "b"]);
        editor.config.exit_index = ExitIndex::active_at(usize::MAX);
        assert!(editor.apply(Edit::Insert {
            at: 0,
            command: "z".into(),
        }));
        let exit_index = editor.config().exit_index;
        assert!(!exit_index.is_active());
        assert_eq!(exit_index.display_number(), exit_index.index() + 1);
        assert!(exit_index.display_number() <= editor.config().start.len());
    }

    #[test]
    fn toggling_a_dangling_trigger_turns_it_off() {
        let mut editor = editor(&["a", "b"]);
        editor.config.exit_index = ExitIndex::active_at(5);
        assert!(editor.apply(Edit::ToggleExit));
        assert!(!editor.config().exit_index.is_active());

        assert!(editor.apply(Edit::ToggleExit));
        assert_eq!(editor.config().exit_target(), Some("b"));
    }

    #[tokio::test]
    async fn save_normalizes_but_keeps_working_copy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let mut editor = Editor::new(&path);
        editor.apply(Edit::Push("api".into()));
        editor.apply(Edit::Push("".into()));
        editor.apply(Edit::Push("web".into()));
        designate(&mut editor, 4);
        editor.save(SaveMode::CreateNew).await.unwrap();

        assert_eq!(editor.config().start, vec!["", "api", "", "web"]);

        let reopened = Editor::open(&path).await.unwrap();
        assert_eq!(reopened.config().start, vec!["api", "web"]);
        assert_eq!(reopened.config().exit_target(), Some("web"));
        assert_eq!(reopened.config_path(), path.as_path());
    }

    #[tokio::test]
    async fn toggle_after_reload_starts_at_first_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let mut editor = editor(&["a", "b", "c"]);
        editor.config_path = path.clone();
        designate(&mut editor, 3);
        editor.apply(Edit::ClearExit);
        editor.save(SaveMode::CreateNew).await.unwrap();

        let mut reopened = Editor::open(&path).await.unwrap();
        assert!(reopened.apply(Edit::ToggleExit));
        assert_eq!(reopened.config().exit_target(), Some("a"));
    }

    #[tokio::test]
    async fn open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Editor::open(dir.path().join("missing.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
