// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Timeline session: the active song plus selection, playhead, and
//! playback state.
//!
//! All structural mutations go through this type. Each one is a single
//! atomic merge into the owning entity; derived state (the duration
//! watermark, selection validity) is recomputed before the call
//! returns, so readers never observe a half-applied update.

use tracing::debug;

use super::segment::{NewSegment, Segment, SegmentUpdate};
use super::song::Song;
use super::track::{Track, TrackUpdate};
use super::TimelineError;

/// Rounding unit for the duration watermark, in seconds
pub const DURATION_QUANTUM: f64 = 8.0;

/// The active song and its transient playback state
///
/// Selection, playhead, and the playing flag are session-only; the
/// song aggregate (including the duration watermark) is what gets
/// persisted.
#[derive(Debug, Clone)]
pub struct TimelineSession {
    song: Song,
    selected_segment_id: Option<String>,
    playhead: f64,
    playing: bool,
}

impl TimelineSession {
    /// Create a session over a song
    pub fn new(song: Song) -> Self {
        Self {
            song,
            selected_segment_id: None,
            playhead: 0.0,
            playing: false,
        }
    }

    /// The active song
    pub fn song(&self) -> &Song {
        &self.song
    }

    /// Id of the active song
    pub fn song_id(&self) -> &str {
        &self.song.id
    }

    /// Tracks in insertion order
    pub fn tracks(&self) -> &[Track] {
        &self.song.tracks
    }

    /// Replace the active song (song switch)
    ///
    /// Clears the selection and resets the playhead to 0.
    pub fn replace_song(&mut self, song: Song) {
        self.song = song;
        self.selected_segment_id = None;
        self.playhead = 0.0;
    }

    /// Rename the active song
    pub fn rename(&mut self, name: impl Into<String>) {
        self.song.name = name.into();
        self.song.touch();
    }

    // ---- track operations ----

    /// Append a track; returns its id
    ///
    /// Default name is `Track N` where N is the new track count; the
    /// color comes from the palette indexed by the prior count.
    pub fn add_track(&mut self, name: Option<&str>) -> String {
        let track = Track::new(self.song.tracks.len(), name);
        let id = track.id.clone();
        debug!(track = %id, name = %track.name, "track added");
        self.song.tracks.push(track);
        self.song.touch();
        id
    }

    /// Remove a track and all its segments
    ///
    /// Clears the selection if it pointed into the removed track.
    pub fn remove_track(&mut self, track_id: &str) -> Result<(), TimelineError> {
        let index = self
            .song
            .tracks
            .iter()
            .position(|t| t.id == track_id)
            .ok_or_else(|| TimelineError::UnknownTrack(track_id.to_string()))?;

        let removed = self.song.tracks.remove(index);
        if let Some(selected) = &self.selected_segment_id {
            if removed.segments.iter().any(|s| &s.id == selected) {
                self.selected_segment_id = None;
            }
        }
        self.song.touch();
        debug!(track = %track_id, "track removed");
        Ok(())
    }

    /// Merge fields into a track
    pub fn update_track(
        &mut self,
        track_id: &str,
        update: TrackUpdate,
    ) -> Result<(), TimelineError> {
        let track = self.track_mut(track_id)?;
        update.apply(track);
        self.song.touch();
        Ok(())
    }

    /// Find a track by id
    pub fn track(&self, track_id: &str) -> Result<&Track, TimelineError> {
        self.song
            .tracks
            .iter()
            .find(|t| t.id == track_id)
            .ok_or_else(|| TimelineError::UnknownTrack(track_id.to_string()))
    }

    fn track_mut(&mut self, track_id: &str) -> Result<&mut Track, TimelineError> {
        self.song
            .tracks
            .iter_mut()
            .find(|t| t.id == track_id)
            .ok_or_else(|| TimelineError::UnknownTrack(track_id.to_string()))
    }

    // ---- segment operations ----

    /// Insert a segment into a track; returns its id
    ///
    /// Raises the duration watermark if the segment extends past it.
    pub fn add_segment(
        &mut self,
        track_id: &str,
        spec: NewSegment,
    ) -> Result<String, TimelineError> {
        let segment = spec.build();
        let id = segment.id.clone();
        let end = segment.end_time();

        let track = self.track_mut(track_id)?;
        track.segments.push(segment);
        self.raise_watermark(end);
        self.song.touch();
        debug!(track = %track_id, segment = %id, "segment added");
        Ok(id)
    }

    /// Remove a segment; clears the selection if it matched
    pub fn remove_segment(
        &mut self,
        track_id: &str,
        segment_id: &str,
    ) -> Result<(), TimelineError> {
        let track = self.track_mut(track_id)?;
        let index = track
            .segments
            .iter()
            .position(|s| s.id == segment_id)
            .ok_or_else(|| TimelineError::UnknownSegment(segment_id.to_string()))?;
        track.segments.remove(index);

        if self.selected_segment_id.as_deref() == Some(segment_id) {
            self.selected_segment_id = None;
        }
        self.song.touch();
        debug!(track = %track_id, segment = %segment_id, "segment removed");
        Ok(())
    }

    /// Merge fields into a segment
    ///
    /// When timing changes, the new effective end time is computed by
    /// filling any unspecified field from the pre-mutation segment,
    /// and the watermark only ever grows.
    pub fn update_segment(
        &mut self,
        track_id: &str,
        segment_id: &str,
        update: SegmentUpdate,
    ) -> Result<(), TimelineError> {
        let changes_timing = update.changes_timing();
        let track = self.track_mut(track_id)?;
        let segment = track
            .segment_mut(segment_id)
            .ok_or_else(|| TimelineError::UnknownSegment(segment_id.to_string()))?;

        update.apply(segment);
        let end = segment.end_time();

        if changes_timing {
            self.raise_watermark(end);
        }
        self.song.touch();
        Ok(())
    }

    // ---- selection ----

    /// Select a segment by id, or clear the selection
    pub fn select_segment(&mut self, segment_id: Option<&str>) -> Result<(), TimelineError> {
        match segment_id {
            Some(id) => {
                if self.find_segment(id).is_none() {
                    return Err(TimelineError::UnknownSegment(id.to_string()));
                }
                self.selected_segment_id = Some(id.to_string());
            }
            None => self.selected_segment_id = None,
        }
        Ok(())
    }

    /// Id of the selected segment, if any
    pub fn selected_segment_id(&self) -> Option<&str> {
        self.selected_segment_id.as_deref()
    }

    /// The selected segment with its owning track
    pub fn selected_segment(&self) -> Option<(&Track, &Segment)> {
        let id = self.selected_segment_id.as_deref()?;
        self.find_segment(id)
    }

    /// Write new source code into the selected segment
    pub fn set_selected_code(&mut self, code: &str) -> Result<(), TimelineError> {
        let id = self
            .selected_segment_id
            .clone()
            .ok_or(TimelineError::NoSelection)?;
        for track in &mut self.song.tracks {
            if let Some(segment) = track.segment_mut(&id) {
                segment.code = code.to_string();
                self.song.touch();
                return Ok(());
            }
        }
        Err(TimelineError::UnknownSegment(id))
    }

    fn find_segment(&self, segment_id: &str) -> Option<(&Track, &Segment)> {
        for track in &self.song.tracks {
            if let Some(segment) = track.segment(segment_id) {
                return Some((track, segment));
            }
        }
        None
    }

    // ---- playback state ----

    /// Current playhead position in seconds
    pub fn playhead(&self) -> f64 {
        self.playhead
    }

    /// Move the playhead (external scrubbing or clock publication)
    pub fn set_playhead(&mut self, position: f64) {
        self.playhead = position.max(0.0);
    }

    /// Timeline length watermark in seconds
    pub fn duration(&self) -> f64 {
        self.song.duration
    }

    /// Override the timeline length (external scrubbing surface)
    pub fn set_duration(&mut self, duration: f64) {
        self.song.duration = duration.max(0.0);
    }

    /// Whether the clock is running
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Set the playing flag (owned by the clock transitions)
    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    /// Whether any track holds at least one segment
    pub fn has_segments(&self) -> bool {
        self.song.tracks.iter().any(|t| !t.segments.is_empty())
    }

    /// Raise the watermark to the next quantum multiple >= `end`
    ///
    /// Never lowers it.
    fn raise_watermark(&mut self, end: f64) {
        let quantized = (end / DURATION_QUANTUM).ceil() * DURATION_QUANTUM;
        if quantized > self.song.duration {
            self.song.duration = quantized;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::song::INITIAL_DURATION;

    fn session() -> TimelineSession {
        TimelineSession::new(Song::new("Test"))
    }

    #[test]
    fn test_add_track_naming_and_color() {
        let mut s = session();
        let a = s.add_track(None);
        let b = s.add_track(None);
        assert_eq!(s.track(&a).unwrap().name, "Track 1");
        assert_eq!(s.track(&b).unwrap().name, "Track 2");
        assert_ne!(s.track(&a).unwrap().color, s.track(&b).unwrap().color);
    }

    #[test]
    fn test_remove_track_cascades_and_clears_selection() {
        let mut s = session();
        let track = s.add_track(None);
        let seg = s.add_segment(&track, NewSegment::new("code")).unwrap();
        s.select_segment(Some(&seg)).unwrap();

        s.remove_track(&track).unwrap();
        assert!(s.tracks().is_empty());
        assert!(s.selected_segment_id().is_none());
    }

    #[test]
    fn test_remove_other_track_keeps_selection() {
        let mut s = session();
        let a = s.add_track(None);
        let b = s.add_track(None);
        let seg = s.add_segment(&a, NewSegment::new("code")).unwrap();
        s.select_segment(Some(&seg)).unwrap();

        s.remove_track(&b).unwrap();
        assert_eq!(s.selected_segment_id(), Some(seg.as_str()));
    }

    #[test]
    fn test_remove_segment_clears_matching_selection() {
        let mut s = session();
        let track = s.add_track(None);
        let seg = s.add_segment(&track, NewSegment::new("code")).unwrap();
        s.select_segment(Some(&seg)).unwrap();

        s.remove_segment(&track, &seg).unwrap();
        assert!(s.selected_segment_id().is_none());
        assert!(s.track(&track).unwrap().segments.is_empty());
    }

    #[test]
    fn test_watermark_rounds_up_to_quantum() {
        let mut s = session();
        let track = s.add_track(None);
        // Ends at 25 -> next multiple of 8 is 32
        s.add_segment(&track, NewSegment::new("code").at(20.0).lasting(5.0))
            .unwrap();
        assert_eq!(s.duration(), 32.0);
    }

    #[test]
    fn test_watermark_never_shrinks() {
        let mut s = session();
        let track = s.add_track(None);
        let seg = s
            .add_segment(&track, NewSegment::new("code").at(20.0).lasting(5.0))
            .unwrap();
        assert_eq!(s.duration(), 32.0);

        // Shrinking the segment leaves the watermark alone
        s.update_segment(&track, &seg, SegmentUpdate::new().duration(1.0))
            .unwrap();
        assert_eq!(s.duration(), 32.0);

        // A short segment on a fresh session keeps the initial length
        let mut s = session();
        let track = s.add_track(None);
        s.add_segment(&track, NewSegment::new("code").lasting(4.0))
            .unwrap();
        assert_eq!(s.duration(), INITIAL_DURATION);
    }

    #[test]
    fn test_update_segment_fills_from_pre_mutation_state() {
        let mut s = session();
        let track = s.add_track(None);
        let seg = s
            .add_segment(&track, NewSegment::new("code").at(30.0).lasting(8.0))
            .unwrap();
        assert_eq!(s.duration(), 40.0);

        // Only start_time moves; the existing duration (8) fills in,
        // so the new end is 48 + 8 = 56.
        s.update_segment(&track, &seg, SegmentUpdate::new().start_time(48.0))
            .unwrap();
        assert_eq!(s.duration(), 56.0);
    }

    #[test]
    fn test_update_without_timing_keeps_watermark() {
        let mut s = session();
        let track = s.add_track(None);
        let seg = s.add_segment(&track, NewSegment::new("a")).unwrap();
        let before = s.duration();
        s.update_segment(&track, &seg, SegmentUpdate::new().code("b"))
            .unwrap();
        assert_eq!(s.duration(), before);
        let (_, segment) = s.find_segment(&seg).unwrap();
        assert_eq!(segment.code, "b");
    }

    #[test]
    fn test_select_unknown_segment_fails() {
        let mut s = session();
        assert!(matches!(
            s.select_segment(Some("missing")),
            Err(TimelineError::UnknownSegment(_))
        ));
    }

    #[test]
    fn test_set_selected_code() {
        let mut s = session();
        let track = s.add_track(None);
        let seg = s.add_segment(&track, NewSegment::new("old")).unwrap();
        s.select_segment(Some(&seg)).unwrap();
        s.set_selected_code("new").unwrap();
        let (_, segment) = s.selected_segment().unwrap();
        assert_eq!(segment.code, "new");
    }

    #[test]
    fn test_replace_song_resets_transients() {
        let mut s = session();
        let track = s.add_track(None);
        let seg = s.add_segment(&track, NewSegment::new("code")).unwrap();
        s.select_segment(Some(&seg)).unwrap();
        s.set_playhead(12.5);

        s.replace_song(Song::new("Other"));
        assert!(s.selected_segment_id().is_none());
        assert_eq!(s.playhead(), 0.0);
    }

    #[test]
    fn test_unknown_track_errors() {
        let mut s = session();
        assert!(matches!(
            s.add_segment("nope", NewSegment::new("x")),
            Err(TimelineError::UnknownTrack(_))
        ));
        assert!(matches!(
            s.remove_track("nope"),
            Err(TimelineError::UnknownTrack(_))
        ));
    }
}
