// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! LIVESET - Timeline scheduler for live-coded pattern playback.
//!
//! Models songs of tracks of time-positioned code segments, derives a
//! playhead from an external audio-hardware clock, resolves the
//! audible segment set (mute/solo, repeat mode, edit overrides), and
//! composes it into a single program pushed to an execution sink.

pub mod engine;
pub mod playback;
pub mod timeline;

pub use engine::TimelineEngine;
pub use playback::{
    active_segments, compose, ActiveSegment, AudioClock, ClockDriver, ClockState, EditArbiter,
    ExecutionSink, PlaybackClock, SelectedSegment, SelectionSink, SILENCE,
};
pub use timeline::{
    FileStore, KvStore, MemoryStore, NewSegment, Segment, SegmentUpdate, Song, SongSummary,
    TimelineError, TimelineSession, Track, TrackUpdate, DEFAULT_SONG_ID,
};
