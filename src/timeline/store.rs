// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Key-value persistence for songs.
//!
//! Songs are stored as plain structural JSON dumps under `song:<id>`
//! keys, with a `songs` index of known ids and a `current-song`
//! pointer. That key layout and blob shape is the whole persistence
//! contract; there is no schema migration.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

use super::song::{Song, SongSummary};

/// Key prefix for individual song blobs
const SONG_KEY_PREFIX: &str = "song:";
/// Key holding the index of known song ids
const SONG_INDEX_KEY: &str = "songs";
/// Key holding the id of the active song
const CURRENT_SONG_KEY: &str = "current-song";

/// The external key-value store seam
///
/// Implementations only need string get/set/remove; all structure
/// lives in the blobs.
pub trait KvStore {
    /// Read a value
    fn get(&self, key: &str) -> Result<Option<String>>;
    /// Write a value
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    /// Delete a value
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory store for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON file holding the key-value map
///
/// Writes are flushed through on every mutation so the latest state is
/// on disk before the process ends.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl FileStore {
    /// Open a store file, creating an empty map if it does not exist
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read store file: {:?}", path))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse store file: {:?}", path))?
        } else {
            HashMap::new()
        };
        Ok(Self { path, entries })
    }

    fn flush(&self) -> Result<()> {
        let contents =
            serde_json::to_string_pretty(&self.entries).context("Failed to serialize store")?;
        fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write store file: {:?}", self.path))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        self.flush()
    }
}

/// Typed song persistence over any [`KvStore`]
pub struct SongStore {
    store: Box<dyn KvStore + Send>,
}

impl SongStore {
    /// Wrap a key-value store
    pub fn new(store: Box<dyn KvStore + Send>) -> Self {
        Self { store }
    }

    fn song_key(id: &str) -> String {
        format!("{}{}", SONG_KEY_PREFIX, id)
    }

    /// Persist a song blob and register it in the index
    pub fn save_song(&mut self, song: &Song) -> Result<()> {
        let blob = serde_json::to_string(song).context("Failed to serialize song")?;
        self.store.set(&Self::song_key(&song.id), &blob)?;

        let mut ids = self.song_ids()?;
        if !ids.iter().any(|id| id == &song.id) {
            ids.push(song.id.clone());
            let index = serde_json::to_string(&ids).context("Failed to serialize song index")?;
            self.store.set(SONG_INDEX_KEY, &index)?;
        }
        Ok(())
    }

    /// Load a song blob
    pub fn load_song(&self, id: &str) -> Result<Option<Song>> {
        match self.store.get(&Self::song_key(id))? {
            Some(blob) => {
                let song = serde_json::from_str(&blob)
                    .with_context(|| format!("Failed to parse song blob: {}", id))?;
                Ok(Some(song))
            }
            None => Ok(None),
        }
    }

    /// Remove a song blob and its index entry
    pub fn delete_song(&mut self, id: &str) -> Result<()> {
        self.store.remove(&Self::song_key(id))?;
        let ids: Vec<String> = self
            .song_ids()?
            .into_iter()
            .filter(|known| known != id)
            .collect();
        let index = serde_json::to_string(&ids).context("Failed to serialize song index")?;
        self.store.set(SONG_INDEX_KEY, &index)
    }

    /// Known song ids, unordered
    pub fn song_ids(&self) -> Result<Vec<String>> {
        match self.store.get(SONG_INDEX_KEY)? {
            Some(index) => {
                serde_json::from_str(&index).context("Failed to parse song index")
            }
            None => Ok(Vec::new()),
        }
    }

    /// Song summaries ordered most-recently-updated first
    ///
    /// Corrupt or missing blobs are skipped with a warning rather than
    /// failing the listing.
    pub fn list_songs(&self) -> Result<Vec<SongSummary>> {
        let mut summaries = Vec::new();
        for id in self.song_ids()? {
            match self.load_song(&id) {
                Ok(Some(song)) => summaries.push(SongSummary::from(&song)),
                Ok(None) => warn!(song = %id, "indexed song blob is missing"),
                Err(e) => warn!(song = %id, error = %e, "skipping unreadable song blob"),
            }
        }
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    /// Persist the active song pointer
    pub fn set_current(&mut self, id: &str) -> Result<()> {
        self.store.set(CURRENT_SONG_KEY, id)
    }

    /// Read the active song pointer
    pub fn current(&self) -> Result<Option<String>> {
        self.store.get(CURRENT_SONG_KEY)
    }
}
