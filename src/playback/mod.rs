// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Playback: resolver, compositor, clock, and edit-override arbiter.
//!
//! This module turns model state into executed code:
//! - Resolve the audible segment set at a playhead position
//! - Compose the set into one deterministic program string
//! - Drive the playhead from the audio-hardware clock
//! - Hold pushes back while the selected segment is being edited
//!
//! The seams to the host (audio clock, execution sink, selection sink)
//! are traits so every component is testable with fakes.

pub mod arbiter;
pub mod clock;
pub mod compose;
pub mod driver;
pub mod resolver;

pub use arbiter::EditArbiter;
pub use clock::{ClockState, PlaybackClock};
pub use compose::{compose, wrap_fragment, SILENCE};
pub use driver::ClockDriver;
pub use resolver::{active_segments, ActiveSegment};

use std::time::Instant;

use anyhow::Result;
use tracing::info;

use crate::timeline::{Segment, Track};

/// Monotonic time source in seconds, normally the audio hardware clock
pub trait AudioClock {
    /// Current time in seconds; must never decrease
    fn now(&self) -> f64;
}

/// Monotonic clock based on process time, for hosts without an
/// audio-hardware clock
#[derive(Debug)]
pub struct SystemAudioClock {
    origin: Instant,
}

impl SystemAudioClock {
    /// Create a clock starting at zero
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemAudioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioClock for SystemAudioClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// The external program executor
///
/// The clock pushes a program with `set_code` followed by `evaluate`;
/// `stop` silences everything. All three may fail; failures are caught
/// per tick and never halt the playhead.
pub trait ExecutionSink {
    /// Replace the current program text
    fn set_code(&mut self, code: &str) -> Result<()>;
    /// Execute the current program text
    fn evaluate(&mut self) -> Result<()>;
    /// Stop all sound
    fn stop(&mut self) -> Result<()>;
}

/// Execution sink that logs pushed programs, for the demo binary
#[derive(Debug, Default)]
pub struct LogSink {
    code: String,
}

impl LogSink {
    /// Create a sink with no program loaded
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExecutionSink for LogSink {
    fn set_code(&mut self, code: &str) -> Result<()> {
        self.code = code.to_string();
        Ok(())
    }

    fn evaluate(&mut self) -> Result<()> {
        info!(program = %self.code, "evaluate");
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        info!("stop");
        Ok(())
    }
}

/// The selected segment as reported to the host
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedSegment {
    /// The segment itself
    pub segment: Segment,
    /// Id of the owning track
    pub track_id: String,
    /// Name of the owning track
    pub track_name: String,
}

impl SelectedSegment {
    /// Build from a track/segment pair
    pub fn new(track: &Track, segment: &Segment) -> Self {
        Self {
            segment: segment.clone(),
            track_id: track.id.clone(),
            track_name: track.name.clone(),
        }
    }
}

/// Receives the resolved selection whenever it changes
pub trait SelectionSink {
    /// Called with the new selection, or `None` when cleared
    fn selection_changed(&mut self, selection: Option<&SelectedSegment>);
}
