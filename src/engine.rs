// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Timeline engine: the owned session context.
//!
//! One engine wires the model, the key-value store, the playback
//! clock, and the edit-override arbiter together and exposes the whole
//! operation surface to the host. There is no ambient global state;
//! everything lives on this struct and is torn down with it.
//!
//! Persistence policy: every structural mutation saves the active song
//! and the current-song pointer. Store failures are logged and
//! swallowed; a broken disk must never stop playback.

use tracing::{info, warn};

use crate::playback::{
    AudioClock, EditArbiter, ExecutionSink, PlaybackClock, SelectedSegment, SelectionSink,
};
use crate::timeline::{
    KvStore, NewSegment, SegmentUpdate, Song, SongStore, SongSummary, TimelineError,
    TimelineSession, Track, TrackUpdate, DEFAULT_SONG_ID,
};

/// The live-coding timeline scheduler
pub struct TimelineEngine {
    session: TimelineSession,
    store: SongStore,
    clock: PlaybackClock,
    arbiter: EditArbiter,
    audio: Box<dyn AudioClock + Send>,
    sink: Box<dyn ExecutionSink + Send>,
    selection_sink: Option<Box<dyn SelectionSink + Send>>,
    /// Selection id last reported to the selection sink
    notified_selection: Option<String>,
}

impl TimelineEngine {
    /// Create an engine over a store and host collaborators
    ///
    /// Loads the current song from the store; a missing or malformed
    /// store falls back to an empty default song rather than failing.
    /// The reserved default song is (re)created if absent.
    pub fn new(
        store: Box<dyn KvStore + Send>,
        audio: Box<dyn AudioClock + Send>,
        sink: Box<dyn ExecutionSink + Send>,
    ) -> Self {
        let mut store = SongStore::new(store);

        if !matches!(store.load_song(DEFAULT_SONG_ID), Ok(Some(_))) {
            if let Err(e) = store.save_song(&Song::default_song()) {
                warn!(error = %e, "failed to seed default song");
            }
        }

        let current_id = match store.current() {
            Ok(Some(id)) => id,
            Ok(None) => DEFAULT_SONG_ID.to_string(),
            Err(e) => {
                warn!(error = %e, "failed to read current song pointer");
                DEFAULT_SONG_ID.to_string()
            }
        };

        let song = match store.load_song(&current_id) {
            Ok(Some(song)) => song,
            Ok(None) => {
                warn!(song = %current_id, "current song missing, falling back to default");
                store
                    .load_song(DEFAULT_SONG_ID)
                    .ok()
                    .flatten()
                    .unwrap_or_else(Song::default_song)
            }
            Err(e) => {
                warn!(song = %current_id, error = %e, "unreadable song, falling back to default");
                Song::default_song()
            }
        };

        info!(song = %song.id, name = %song.name, "session loaded");
        let mut engine = Self {
            session: TimelineSession::new(song),
            store,
            clock: PlaybackClock::new(),
            arbiter: EditArbiter::new(),
            audio,
            sink,
            selection_sink: None,
            notified_selection: None,
        };
        engine.persist();
        engine
    }

    /// Install the selection notification sink
    pub fn set_selection_sink(&mut self, sink: Box<dyn SelectionSink + Send>) {
        self.selection_sink = Some(sink);
    }

    /// Read-only view of the active session
    pub fn session(&self) -> &TimelineSession {
        &self.session
    }

    /// Tracks of the active song in insertion order
    pub fn tracks(&self) -> &[Track] {
        self.session.tracks()
    }

    // ---- track and segment operations ----

    /// Append a track; returns its id
    pub fn add_track(&mut self, name: Option<&str>) -> String {
        let id = self.session.add_track(name);
        self.persist();
        id
    }

    /// Remove a track and all its segments
    pub fn remove_track(&mut self, track_id: &str) -> Result<(), TimelineError> {
        self.session.remove_track(track_id)?;
        self.persist();
        self.sync_selection_observers();
        Ok(())
    }

    /// Merge fields into a track
    pub fn update_track(
        &mut self,
        track_id: &str,
        update: TrackUpdate,
    ) -> Result<(), TimelineError> {
        self.session.update_track(track_id, update)?;
        self.persist();
        Ok(())
    }

    /// Insert a segment into a track; returns its id
    pub fn add_segment(
        &mut self,
        track_id: &str,
        spec: NewSegment,
    ) -> Result<String, TimelineError> {
        let id = self.session.add_segment(track_id, spec)?;
        self.persist();
        Ok(id)
    }

    /// Remove a segment
    pub fn remove_segment(
        &mut self,
        track_id: &str,
        segment_id: &str,
    ) -> Result<(), TimelineError> {
        self.session.remove_segment(track_id, segment_id)?;
        self.persist();
        self.sync_selection_observers();
        Ok(())
    }

    /// Merge fields into a segment
    pub fn update_segment(
        &mut self,
        track_id: &str,
        segment_id: &str,
        update: SegmentUpdate,
    ) -> Result<(), TimelineError> {
        self.session.update_segment(track_id, segment_id, update)?;
        self.persist();
        Ok(())
    }

    // ---- selection ----

    /// Select a segment (or clear with `None`) and notify observers
    pub fn select_segment(&mut self, segment_id: Option<&str>) -> Result<(), TimelineError> {
        self.session.select_segment(segment_id)?;
        self.sync_selection_observers();
        Ok(())
    }

    /// Id of the selected segment, if any
    pub fn selected_segment_id(&self) -> Option<&str> {
        self.session.selected_segment_id()
    }

    /// Feed an observed editor change for the selected segment
    ///
    /// A genuine change suppresses clock pushes for the quiet window
    /// and writes the code back into the segment so model and editor
    /// stay consistent. Without a selection this is a no-op.
    pub fn editor_changed(&mut self, code: &str) {
        if self.session.selected_segment_id().is_none() {
            return;
        }
        let now = self.audio.now();
        if self.arbiter.observe(code, now) {
            if let Err(e) = self.session.set_selected_code(code) {
                warn!(error = %e, "editor write-back failed");
                return;
            }
            self.persist();
        }
    }

    // ---- playback ----

    /// Start the clock; idempotent while already running
    pub fn play(&mut self) {
        self.clock.start();
        self.session.set_playing(true);
        info!(song = %self.session.song_id(), "play");
    }

    /// Stop the clock, silence the sink, and park the playhead at 0
    pub fn stop(&mut self) {
        self.clock.stop();
        self.session.set_playing(false);
        self.session.set_playhead(0.0);
        if let Err(e) = self.sink.stop() {
            warn!(error = %e, "execution sink stop failed");
        }
        info!("stop");
    }

    /// One scheduling tick, driven by the host frame loop
    ///
    /// Tick failures are logged and never escalate; the next tick
    /// proceeds regardless.
    pub fn tick(&mut self) {
        let now = self.audio.now();
        let suppressing = self.arbiter.is_suppressing(now);
        if let Err(e) = self
            .clock
            .tick(now, &mut self.session, suppressing, self.sink.as_mut())
        {
            warn!(error = %e, "clock tick failed, continuing");
        }
    }

    /// Current playhead position in seconds
    pub fn playhead(&self) -> f64 {
        self.session.playhead()
    }

    /// Move the playhead (external scrubbing)
    pub fn set_playhead(&mut self, position: f64) {
        self.session.set_playhead(position);
    }

    /// Timeline length watermark in seconds
    pub fn duration(&self) -> f64 {
        self.session.duration()
    }

    /// Override the timeline length
    pub fn set_duration(&mut self, duration: f64) {
        self.session.set_duration(duration);
    }

    /// Whether the clock is running
    pub fn is_playing(&self) -> bool {
        self.session.is_playing()
    }

    // ---- song operations ----

    /// Create a song, optionally switching to it; returns its id
    pub fn create_song(&mut self, name: impl Into<String>, switch: bool) -> String {
        let song = Song::new(name);
        let id = song.id.clone();
        if let Err(e) = self.store.save_song(&song) {
            warn!(song = %id, error = %e, "failed to save new song");
        }
        if switch {
            self.activate_song(song);
        }
        id
    }

    /// Switch to a stored song
    ///
    /// Loads its tracks and duration, clears the selection, and resets
    /// the playhead to 0. The outgoing song is saved first.
    pub fn switch_song(&mut self, song_id: &str) -> Result<(), TimelineError> {
        if song_id == self.session.song_id() {
            return Ok(());
        }
        let song = match self.store.load_song(song_id) {
            Ok(Some(song)) => song,
            Ok(None) => return Err(TimelineError::UnknownSong(song_id.to_string())),
            Err(e) => {
                warn!(song = %song_id, error = %e, "failed to load song");
                return Err(TimelineError::UnknownSong(song_id.to_string()));
            }
        };
        self.persist();
        self.activate_song(song);
        Ok(())
    }

    /// Rename a song by id
    pub fn rename_song(&mut self, song_id: &str, name: &str) -> Result<(), TimelineError> {
        if song_id == self.session.song_id() {
            self.session.rename(name);
            self.persist();
            return Ok(());
        }
        let mut song = match self.store.load_song(song_id) {
            Ok(Some(song)) => song,
            _ => return Err(TimelineError::UnknownSong(song_id.to_string())),
        };
        song.name = name.to_string();
        song.touch();
        if let Err(e) = self.store.save_song(&song) {
            warn!(song = %song_id, error = %e, "failed to save renamed song");
        }
        Ok(())
    }

    /// Delete a song
    ///
    /// Deleting the reserved default song is a no-op. Deleting the
    /// current song switches to the default song first.
    pub fn delete_song(&mut self, song_id: &str) {
        if song_id == DEFAULT_SONG_ID {
            return;
        }
        let deleting_current = song_id == self.session.song_id();
        if let Err(e) = self.store.delete_song(song_id) {
            warn!(song = %song_id, error = %e, "failed to delete song");
        }
        if deleting_current {
            let default = self
                .store
                .load_song(DEFAULT_SONG_ID)
                .ok()
                .flatten()
                .unwrap_or_else(Song::default_song);
            self.activate_song(default);
        }
    }

    /// Songs ordered most-recently-updated first
    pub fn list_songs(&self) -> Vec<SongSummary> {
        match self.store.list_songs() {
            Ok(songs) => songs,
            Err(e) => {
                warn!(error = %e, "failed to list songs");
                Vec::new()
            }
        }
    }

    // ---- internals ----

    fn activate_song(&mut self, song: Song) {
        info!(song = %song.id, name = %song.name, "switching song");
        self.session.replace_song(song);
        self.persist();
        self.sync_selection_observers();
    }

    /// Save the active song and current pointer, swallowing failures
    fn persist(&mut self) {
        if let Err(e) = self.store.save_song(self.session.song()) {
            warn!(error = %e, "failed to save song");
        }
        if let Err(e) = self.store.set_current(self.session.song_id()) {
            warn!(error = %e, "failed to save current song pointer");
        }
    }

    /// Push the resolved selection to observers when it changed
    ///
    /// Also resyncs the arbiter baseline so a selection change is
    /// never mistaken for an edit.
    fn sync_selection_observers(&mut self) {
        let selected = self.session.selected_segment_id().map(str::to_string);
        if selected == self.notified_selection {
            return;
        }
        self.notified_selection = selected;

        let resolved = self
            .session
            .selected_segment()
            .map(|(track, segment)| SelectedSegment::new(track, segment));
        match &resolved {
            Some(sel) => self.arbiter.sync_selection(&sel.segment.code),
            None => self.arbiter.sync_selection(""),
        }
        if let Some(sink) = &mut self.selection_sink {
            sink.selection_changed(resolved.as_ref());
        }
    }
}
