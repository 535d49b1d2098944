// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Segment entity: a time-bounded code fragment placed on a track.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default segment length in seconds
pub const DEFAULT_SEGMENT_DURATION: f64 = 8.0;

/// Minimum segment length in seconds
///
/// The UI enforces this on resize; the model clamps defensively so a
/// zero-length segment can never enter the timeline.
pub const MIN_SEGMENT_DURATION: f64 = 1.0;

fn default_name() -> String {
    "Untitled".to_string()
}

fn default_duration() -> f64 {
    DEFAULT_SEGMENT_DURATION
}

/// A time-positioned source fragment on a track
///
/// Serialized field names match the persisted blob shape
/// (`startTime`, not `start_time`), so stored sessions stay readable
/// across implementations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    /// Unique segment id
    pub id: String,
    /// Source fragment to execute while the segment is audible
    pub code: String,
    /// Display name
    #[serde(default = "default_name")]
    pub name: String,
    /// Start position in seconds (>= 0)
    #[serde(default)]
    pub start_time: f64,
    /// Length in seconds (>= 1)
    #[serde(default = "default_duration")]
    pub duration: f64,
    /// Loop the playhead within this segment while it is selected
    #[serde(default)]
    pub repeat: bool,
}

impl Segment {
    /// Create a segment with a generated id and clamped timing
    pub fn new(code: impl Into<String>, start_time: f64, duration: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            code: code.into(),
            name: default_name(),
            start_time: clamp_start(start_time),
            duration: clamp_duration(duration),
            repeat: false,
        }
    }

    /// End position in seconds (exclusive)
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Whether the segment is audible at `time` (half-open interval)
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start_time && time < self.end_time()
    }

    /// Builder: set name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder: set repeat mode
    pub fn with_repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }
}

/// Clamp a start position into valid range
pub fn clamp_start(start_time: f64) -> f64 {
    start_time.max(0.0)
}

/// Clamp a duration into valid range
pub fn clamp_duration(duration: f64) -> f64 {
    duration.max(MIN_SEGMENT_DURATION)
}

/// Fields for creating a segment; unspecified fields take defaults
#[derive(Debug, Clone, Default)]
pub struct NewSegment {
    /// Source fragment
    pub code: String,
    /// Display name (default "Untitled")
    pub name: Option<String>,
    /// Start position in seconds (default 0)
    pub start_time: Option<f64>,
    /// Length in seconds (default 8)
    pub duration: Option<f64>,
    /// Repeat mode (default off)
    pub repeat: Option<bool>,
}

impl NewSegment {
    /// Create with just the code fragment
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Default::default()
        }
    }

    /// Builder: set name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder: set start position
    pub fn at(mut self, start_time: f64) -> Self {
        self.start_time = Some(start_time);
        self
    }

    /// Builder: set duration
    pub fn lasting(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Builder: set repeat mode
    pub fn with_repeat(mut self, repeat: bool) -> Self {
        self.repeat = Some(repeat);
        self
    }

    /// Materialize into a segment with a fresh id
    pub fn build(self) -> Segment {
        let mut segment = Segment::new(
            self.code,
            self.start_time.unwrap_or(0.0),
            self.duration.unwrap_or(DEFAULT_SEGMENT_DURATION),
        );
        if let Some(name) = self.name {
            segment.name = name;
        }
        if let Some(repeat) = self.repeat {
            segment.repeat = repeat;
        }
        segment
    }
}

/// Partial update for a segment; only set fields change
#[derive(Debug, Clone, Default)]
pub struct SegmentUpdate {
    /// New source fragment
    pub code: Option<String>,
    /// New display name
    pub name: Option<String>,
    /// New start position in seconds
    pub start_time: Option<f64>,
    /// New length in seconds
    pub duration: Option<f64>,
    /// New repeat mode
    pub repeat: Option<bool>,
}

impl SegmentUpdate {
    /// Empty update
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: update code
    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Builder: update name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder: update start position
    pub fn start_time(mut self, start_time: f64) -> Self {
        self.start_time = Some(start_time);
        self
    }

    /// Builder: update duration
    pub fn duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Builder: update repeat mode
    pub fn repeat(mut self, repeat: bool) -> Self {
        self.repeat = Some(repeat);
        self
    }

    /// Whether the update touches segment timing
    pub fn changes_timing(&self) -> bool {
        self.start_time.is_some() || self.duration.is_some()
    }

    /// Merge into an existing segment, clamping timing fields
    pub(crate) fn apply(self, segment: &mut Segment) {
        if let Some(code) = self.code {
            segment.code = code;
        }
        if let Some(name) = self.name {
            segment.name = name;
        }
        if let Some(start_time) = self.start_time {
            segment.start_time = clamp_start(start_time);
        }
        if let Some(duration) = self.duration {
            segment.duration = clamp_duration(duration);
        }
        if let Some(repeat) = self.repeat {
            segment.repeat = repeat;
        }
    }
}
