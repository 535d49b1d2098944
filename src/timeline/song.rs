// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Song entity: the persisted aggregate of tracks and timeline length.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::track::Track;

/// Reserved song id that always exists and cannot be deleted
pub const DEFAULT_SONG_ID: &str = "default";

/// Name given to the reserved default song
pub const DEFAULT_SONG_NAME: &str = "Untitled";

/// Initial timeline length in seconds for a fresh song
pub const INITIAL_DURATION: f64 = 16.0;

/// A persisted song
///
/// The serialized shape (camelCase fields, nested tracks/segments) is
/// the persistence format; see the store module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    /// Unique song id
    pub id: String,
    /// Display name
    pub name: String,
    /// Tracks in insertion order
    #[serde(default)]
    pub tracks: Vec<Track>,
    /// Timeline length watermark in seconds
    pub duration: f64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp; drives most-recently-updated ordering
    pub updated_at: DateTime<Utc>,
}

impl Song {
    /// Create an empty song with a generated id
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            tracks: Vec::new(),
            duration: INITIAL_DURATION,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create the reserved default song
    pub fn default_song() -> Self {
        let mut song = Self::new(DEFAULT_SONG_NAME);
        song.id = DEFAULT_SONG_ID.to_string();
        song
    }

    /// Whether this is the reserved default song
    pub fn is_default(&self) -> bool {
        self.id == DEFAULT_SONG_ID
    }

    /// Stamp a mutation
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Lightweight listing entry for a song
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongSummary {
    /// Song id
    pub id: String,
    /// Display name
    pub name: String,
    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
}

impl From<&Song> for SongSummary {
    fn from(song: &Song) -> Self {
        Self {
            id: song.id.clone(),
            name: song.name.clone(),
            updated_at: song.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_song_creation() {
        let song = Song::new("My Set");
        assert_eq!(song.name, "My Set");
        assert!(song.tracks.is_empty());
        assert_eq!(song.duration, INITIAL_DURATION);
        assert_eq!(song.created_at, song.updated_at);
        assert!(!song.is_default());
    }

    #[test]
    fn test_default_song() {
        let song = Song::default_song();
        assert_eq!(song.id, DEFAULT_SONG_ID);
        assert_eq!(song.name, DEFAULT_SONG_NAME);
        assert!(song.is_default());
    }

    #[test]
    fn test_touch_advances_updated_at() {
        let mut song = Song::new("A");
        let before = song.updated_at;
        song.touch();
        assert!(song.updated_at >= before);
    }

    #[test]
    fn test_serde_shape() {
        let song = Song::new("A");
        let json = serde_json::to_value(&song).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("tracks").is_some());
    }
}
