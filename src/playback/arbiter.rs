// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Edit-override arbiter: hold clock pushes back while a human edits.
//!
//! While the source of the selected segment is being changed in the
//! editor, the clock must not clobber the edit by re-pushing
//! timeline-derived code. Every observed change (re)arms a quiet
//! window; pushes resume once the window elapses with no further
//! changes.
//!
//! Timestamps are plain seconds in the same domain as the audio clock,
//! so the whole state machine runs under a fake clock in tests.

use tracing::debug;

/// Quiet window after the last observed edit, in seconds
pub const DEFAULT_QUIET_SECS: f64 = 2.0;

/// Debounced "human is typing" detector
#[derive(Debug)]
pub struct EditArbiter {
    quiet_secs: f64,
    last_known_code: String,
    deadline: Option<f64>,
}

impl EditArbiter {
    /// Create with the default quiet window
    pub fn new() -> Self {
        Self::with_quiet(DEFAULT_QUIET_SECS)
    }

    /// Create with a custom quiet window
    pub fn with_quiet(quiet_secs: f64) -> Self {
        Self {
            quiet_secs,
            last_known_code: String::new(),
            deadline: None,
        }
    }

    /// Resync to a newly selected segment's code
    ///
    /// Selecting a segment is not an edit: it neither suppresses nor
    /// cancels a window already running for a previous edit.
    pub fn sync_selection(&mut self, code: &str) {
        self.last_known_code = code.to_string();
    }

    /// Observe the editor's current code at time `now`
    ///
    /// Returns true when the code differs from the last known state;
    /// the caller is expected to write it back into the selected
    /// segment. A change (re)starts the quiet window.
    pub fn observe(&mut self, code: &str, now: f64) -> bool {
        if code == self.last_known_code {
            return false;
        }
        self.last_known_code = code.to_string();
        self.deadline = Some(now + self.quiet_secs);
        debug!(until = now + self.quiet_secs, "suppressing clock pushes");
        true
    }

    /// Whether pushes are currently suppressed
    pub fn is_suppressing(&self, now: f64) -> bool {
        matches!(self.deadline, Some(deadline) if now < deadline)
    }

    /// Drop any pending window and forget the editor state
    pub fn reset(&mut self) {
        self.last_known_code.clear();
        self.deadline = None;
    }
}

impl Default for EditArbiter {
    fn default() -> Self {
        Self::new()
    }
}
