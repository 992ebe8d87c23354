//! Speaker identity records and the in-memory catalog

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Persisted per-speaker profile
///
/// One JSON document per identity on disk. The embedding is the vector
/// captured at first enrollment; it is never replaced by later matches,
/// only `last_seen` advances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// Unique identifier, `User_N`
    pub id: String,
    /// Fixed-dimension voice embedding, compared via cosine similarity
    pub embedding: Vec<f32>,
    /// Last time this identity was matched; drives eviction
    pub last_seen: DateTime<Utc>,
}

/// In-memory catalog entry: a record plus its storage key
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub record: IdentityRecord,
    /// Path of the profile file this entry was loaded from / saved to
    pub path: PathBuf,
}

/// The in-memory mirror of the profile store
///
/// Insertion order is load order followed by creation order; the matcher
/// relies on that order for its earliest-wins tie-break. All mutation
/// flows through the store and matcher; the catalog itself is owned by
/// one orchestrating component, never shared as a global.
#[derive(Debug, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from loaded entries, preserving their order
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Mutable access to one entry (timestamp refresh after a match)
    pub fn entry_mut(&mut self, index: usize) -> &mut CatalogEntry {
        &mut self.entries[index]
    }

    /// Append a newly created identity so it is eligible to match
    /// subsequent calls within the same run
    pub fn push(&mut self, entry: CatalogEntry) {
        self.entries.push(entry);
    }
}

/// Result of one identification event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentifyOutcome {
    /// Matched or newly created identity
    pub id: String,
    /// Best cosine similarity over the catalog; `-1.0` sentinel when the
    /// catalog was empty and no comparison occurred
    pub score: f32,
    /// True when a new profile was created, false for a returning speaker
    pub is_new: bool,
}
