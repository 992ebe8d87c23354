//! Match-or-enroll decision over the in-memory catalog
//!
//! Linear-scan nearest neighbor; acceptable at the catalog sizes this
//! service sees. An ANN index would be a drop-in replacement behind the
//! same `identify` contract if that ever changes.

use thiserror::Error;
use tracing::{debug, info};

use crate::models::{Catalog, IdentifyOutcome};
use crate::services::store::{IdentityStore, StoreError};

/// Id prefix for generated identities
const ID_PREFIX: &str = "User_";

/// Sentinel score reported when the catalog was empty and no
/// comparison occurred
const NO_SCORE: f32 = -1.0;

/// Matcher errors
#[derive(Debug, Error)]
pub enum MatchError {
    /// Probe embedding length differs from an enrolled profile's;
    /// cosine similarity is only defined over equal-length vectors
    #[error("Embedding dimension mismatch: probe has {probe}, profile {id} has {profile}")]
    DimensionMismatch {
        probe: usize,
        id: String,
        profile: usize,
    },

    /// Persistence failure; fatal to this identify call
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Cosine similarity between two equal-length vectors, in [-1, 1]
///
/// Zero-magnitude input yields 0.0 rather than NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        0.0
    } else {
        (dot_product / (magnitude_a * magnitude_b)).clamp(-1.0, 1.0)
    }
}

/// Decides whether a new embedding is a returning identity or a new one
pub struct Matcher {
    threshold: f32,
}

impl Matcher {
    /// Create a matcher with the given similarity threshold
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// Identify an embedding against the catalog and persist the outcome
    ///
    /// Scores every catalog entry in insertion order, keeping the best
    /// on strict improvement only, so earlier-enrolled identities win
    /// ties. A best score strictly above the threshold is a match: the
    /// matched profile is re-persisted with its original embedding and a
    /// refreshed `last_seen` (the on-file template never adapts after
    /// first enrollment). Anything else enrolls a new identity named
    /// `User_{catalog_len + 1}` and appends it to the catalog.
    ///
    /// Exactly one store mutation per call; a write failure propagates
    /// and leaves the catalog unchanged. A probe whose length differs
    /// from an enrolled profile's is rejected before any scoring or
    /// mutation happens.
    pub fn identify(
        &self,
        store: &IdentityStore,
        catalog: &mut Catalog,
        embedding: &[f32],
    ) -> Result<IdentifyOutcome, MatchError> {
        let mut best_score = NO_SCORE;
        let mut best_index: Option<usize> = None;

        for (index, entry) in catalog.entries().iter().enumerate() {
            if entry.record.embedding.len() != embedding.len() {
                return Err(MatchError::DimensionMismatch {
                    probe: embedding.len(),
                    id: entry.record.id.clone(),
                    profile: entry.record.embedding.len(),
                });
            }
            let score = cosine_similarity(embedding, &entry.record.embedding);
            debug!(id = %entry.record.id, score, "Scored candidate");
            if score > best_score {
                best_score = score;
                best_index = Some(index);
            }
        }

        if let Some(index) = best_index {
            if best_score > self.threshold {
                // Returning speaker: refresh freshness, keep the
                // enrollment embedding on file
                let id = catalog.entries()[index].record.id.clone();
                let enrolled = catalog.entries()[index].record.embedding.clone();
                let refreshed = store.upsert(&id, &enrolled)?;
                catalog.entry_mut(index).record.last_seen = refreshed.record.last_seen;

                info!(id = %id, score = best_score, "Identified returning speaker");
                return Ok(IdentifyOutcome {
                    id,
                    score: best_score,
                    is_new: false,
                });
            }
        }

        // New speaker. Ordinal ids can be reused after eviction frees a
        // slot; preserved as-is for catalog compatibility.
        let new_id = format!("{}{}", ID_PREFIX, catalog.len() + 1);
        let entry = store.upsert(&new_id, embedding)?;
        catalog.push(entry);

        info!(id = %new_id, score = best_score, "Enrolled new speaker");
        Ok(IdentifyOutcome {
            id: new_id,
            score: best_score,
            is_new: true,
        })
    }
}
