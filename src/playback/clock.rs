// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Playback clock: derives the playhead from the audio-hardware clock
//! and pushes composed programs when they change.
//!
//! The clock is an explicit two-state machine (Stopped/Running) whose
//! tick is a plain synchronous function. The host frame loop (or the
//! async driver) calls [`PlaybackClock::tick`] as fast as it likes;
//! everything rate-sensitive is derived from the audio clock value
//! passed in, never from tick count.

use anyhow::Result;
use tracing::debug;

use super::compose::compose;
use super::resolver::active_segments;
use super::ExecutionSink;
use crate::timeline::TimelineSession;

/// Playback clock state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    /// Not ticking; playhead parked at 0
    Stopped,
    /// Ticking; playhead derived from the audio clock
    Running,
}

/// The playhead state machine
#[derive(Debug)]
pub struct PlaybackClock {
    state: ClockState,
    /// Audio-clock value latched on the first tick after start
    epoch: Option<f64>,
    /// Last program pushed to the sink; pushes are change-only
    last_pushed: Option<String>,
}

impl PlaybackClock {
    /// Create a stopped clock
    pub fn new() -> Self {
        Self {
            state: ClockState::Stopped,
            epoch: None,
            last_pushed: None,
        }
    }

    /// Current state
    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Whether the clock is running
    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    /// Transition to Running
    ///
    /// Idempotent while already Running: the epoch and push cache are
    /// untouched, so no duplicate tick chain or position jump occurs.
    pub fn start(&mut self) {
        if self.state == ClockState::Running {
            return;
        }
        self.state = ClockState::Running;
        self.epoch = None;
        debug!("clock started");
    }

    /// Transition to Stopped
    ///
    /// Clears the epoch and the last-pushed cache so nothing leaks
    /// into the next start.
    pub fn stop(&mut self) {
        self.state = ClockState::Stopped;
        self.epoch = None;
        self.last_pushed = None;
        debug!("clock stopped");
    }

    /// One scheduling tick
    ///
    /// Reads `audio_now` (seconds from the audio-hardware clock),
    /// publishes the effective playhead into the session, and pushes
    /// the composed program to the sink when it differs from the last
    /// push. `suppressing` comes from the edit-override arbiter.
    ///
    /// A sink failure is returned to the caller for logging; the cache
    /// is only updated on success, so a failed push is retried on the
    /// next tick.
    pub fn tick(
        &mut self,
        audio_now: f64,
        session: &mut TimelineSession,
        suppressing: bool,
        sink: &mut dyn ExecutionSink,
    ) -> Result<()> {
        if self.state != ClockState::Running {
            return Ok(());
        }

        let epoch = *self.epoch.get_or_insert(audio_now);
        let raw_position = audio_now - epoch;
        let effective = effective_position(session, raw_position);
        session.set_playhead(effective);

        if !session.has_segments() || suppressing {
            return Ok(());
        }

        let program = compose(&active_segments(session.tracks(), effective));
        if self.last_pushed.as_deref() == Some(program.as_str()) {
            return Ok(());
        }

        sink.set_code(&program)?;
        sink.evaluate()?;
        debug!(position = effective, "pushed program");
        self.last_pushed = Some(program);
        Ok(())
    }
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Warp the raw position into the selected segment when it repeats
///
/// `rem_euclid` keeps the relative offset in `[0, duration)` even when
/// the raw position is before the segment start.
fn effective_position(session: &TimelineSession, raw_position: f64) -> f64 {
    match session.selected_segment() {
        Some((_, segment)) if segment.repeat => {
            let relative = (raw_position - segment.start_time).rem_euclid(segment.duration);
            segment.start_time + relative
        }
        _ => raw_position,
    }
}
