// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Track entity: an ordered, mute/solo-able container of segments.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::segment::Segment;

/// Fixed color palette cycled through at track creation
pub const TRACK_PALETTE: [&str; 8] = [
    "#e6194b", "#3cb44b", "#ffe119", "#4363d8", "#f58231", "#911eb4", "#46f0f0", "#f032e6",
];

/// Palette color for the Nth created track
pub fn palette_color(index: usize) -> &'static str {
    TRACK_PALETTE[index % TRACK_PALETTE.len()]
}

/// A timeline track
///
/// Order within a song's track list is insertion order and only
/// affects rendering; it carries no timing meaning. Segments on the
/// same track may overlap (layering).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Unique track id
    pub id: String,
    /// Display name
    pub name: String,
    /// Display color (hex string from the palette)
    pub color: String,
    /// Segments in insertion order
    #[serde(default)]
    pub segments: Vec<Segment>,
    /// Muted tracks never sound
    #[serde(default)]
    pub muted: bool,
    /// Soloed tracks suppress all non-solo tracks
    #[serde(default)]
    pub solo: bool,
}

impl Track {
    /// Create a track with a generated id and a palette color
    ///
    /// `index` is the track count at creation time and picks the
    /// palette color and the default `Track N` name.
    pub fn new(index: usize, name: Option<&str>) -> Self {
        let name = match name {
            Some(name) => name.to_string(),
            None => format!("Track {}", index + 1),
        };
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            color: palette_color(index).to_string(),
            segments: Vec::new(),
            muted: false,
            solo: false,
        }
    }

    /// Find a segment by id
    pub fn segment(&self, segment_id: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == segment_id)
    }

    /// Find a segment by id, mutably
    pub fn segment_mut(&mut self, segment_id: &str) -> Option<&mut Segment> {
        self.segments.iter_mut().find(|s| s.id == segment_id)
    }
}

/// Partial update for a track; only set fields change
#[derive(Debug, Clone, Default)]
pub struct TrackUpdate {
    /// New display name
    pub name: Option<String>,
    /// New display color
    pub color: Option<String>,
    /// New mute state
    pub muted: Option<bool>,
    /// New solo state
    pub solo: Option<bool>,
}

impl TrackUpdate {
    /// Empty update
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: update name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder: update color
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Builder: update mute state
    pub fn muted(mut self, muted: bool) -> Self {
        self.muted = Some(muted);
        self
    }

    /// Builder: update solo state
    pub fn solo(mut self, solo: bool) -> Self {
        self.solo = Some(solo);
        self
    }

    /// Merge into an existing track
    pub(crate) fn apply(self, track: &mut Track) {
        if let Some(name) = self.name {
            track.name = name;
        }
        if let Some(color) = self.color {
            track.color = color;
        }
        if let Some(muted) = self.muted {
            track.muted = muted;
        }
        if let Some(solo) = self.solo {
            track.solo = solo;
        }
    }
}
