//! Exit trigger designation.
//!
//! An `ExitIndex` names the start entry whose termination ends the session.
//! It pairs the zero-based `index` used internally with the one-based
//! `display_number` shown to the user, and both are only ever written
//! together.

/// Display number used before anything has been designated.
pub const DEFAULT_DISPLAY_NUMBER: usize = 1;

/// Optional designation of one start entry as the exit trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitIndex {
    active: bool,
    index: usize,
    display_number: usize,
}

impl Default for ExitIndex {
    fn default() -> Self {
        Self {
            active: false,
            index: DEFAULT_DISPLAY_NUMBER - 1,
            display_number: DEFAULT_DISPLAY_NUMBER,
        }
    }
}

impl ExitIndex {
    /// Creates an active trigger pointing at `index`.
    pub fn active_at(index: usize) -> Self {
        let mut exit_index = Self::default();
        exit_index.activate(index);
        exit_index
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Zero-based position. Only meaningful while active.
    pub fn index(&self) -> usize {
        self.index
    }

    /// One-based position shown to the user.
    pub fn display_number(&self) -> usize {
        self.display_number
    }

    /// Returns the designated index, or `None` when inactive.
    pub fn target(&self) -> Option<usize> {
        self.active.then_some(self.index)
    }

    /// Points at `index`. Callers clamp first; only `usize::MAX` is pulled
    /// down by one so the display number still fits.
    pub fn set_by_index(&mut self, index: usize) {
        self.index = index.min(usize::MAX - 1);
        self.display_number = self.index + 1;
    }

    /// Points at the one-based `display`. Zero is coerced to one.
    pub fn set_by_display(&mut self, display: usize) {
        self.display_number = display.max(1);
        self.index = self.display_number - 1;
    }

    /// Clamps the display number into `[min, max]` without touching the index.
    ///
    /// The display number may be a tentative value the user is still editing,
    /// so the index is only moved by an explicit
    /// [`recompute_index_from_display`](Self::recompute_index_from_display).
    /// When `min > max`, `min` wins.
    pub fn clamp_display(&mut self, min: usize, max: usize) {
        self.display_number = self.display_number.min(max).max(min);
    }

    /// Commits the current display number to the index.
    pub fn recompute_index_from_display(&mut self) {
        self.set_by_display(self.display_number);
    }

    pub fn activate(&mut self, index: usize) {
        self.active = true;
        self.set_by_index(index);
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }
}
