// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Timeline model: songs, tracks, segments, and the active session.
//!
//! This module owns the entity graph and its mutation operations:
//! - Entities with the persisted blob shape (camelCase serde fields)
//! - Session state (selection, playhead, duration watermark)
//! - Key-value persistence with a fixed key layout
//!
//! No timing logic lives here; the playback module derives everything
//! time-related from this data.

pub mod segment;
pub mod session;
pub mod song;
pub mod store;
pub mod track;

pub use segment::{NewSegment, Segment, SegmentUpdate, DEFAULT_SEGMENT_DURATION, MIN_SEGMENT_DURATION};
pub use session::{TimelineSession, DURATION_QUANTUM};
pub use song::{Song, SongSummary, DEFAULT_SONG_ID, DEFAULT_SONG_NAME, INITIAL_DURATION};
pub use store::{FileStore, KvStore, MemoryStore, SongStore};
pub use track::{palette_color, Track, TrackUpdate, TRACK_PALETTE};

use thiserror::Error;

/// Model lookup failures
///
/// These are the only failure modes of the in-memory model; playback
/// components operate on already-validated data.
#[derive(Debug, Error)]
pub enum TimelineError {
    /// No track with the given id
    #[error("unknown track: {0}")]
    UnknownTrack(String),
    /// No segment with the given id
    #[error("unknown segment: {0}")]
    UnknownSegment(String),
    /// No song with the given id
    #[error("unknown song: {0}")]
    UnknownSong(String),
    /// An operation needed a selected segment and none was selected
    #[error("no segment is selected")]
    NoSelection,
}
