//! Startup eviction of stale identity profiles
//!
//! Runs exactly once, before the catalog is loaded into memory, so an
//! expired identity is never matched against, even transiently.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::services::store::{IdentityStore, StoreError};

/// Deletes profiles whose last sighting exceeds the expiry window
pub struct Evictor {
    expiry_days: i64,
}

impl Evictor {
    /// Create an evictor with the given expiry window in days
    pub fn new(expiry_days: i64) -> Self {
        Self { expiry_days }
    }

    /// Scan the store and delete every parseable profile at least
    /// `expiry_days` old; returns the number deleted
    ///
    /// The boundary is inclusive: a profile unseen for exactly the
    /// expiry window is removed. Unparseable units are left alone —
    /// corruption and staleness are distinct failure modes, and the
    /// evictor only acts on the latter (corrupt files await manual
    /// cleanup).
    pub fn sweep(&self, store: &IdentityStore) -> Result<usize, StoreError> {
        let now = Utc::now();
        let mut deleted = 0;

        for unit in store.scan()? {
            match unit {
                Ok(entry) => {
                    let age_days = (now - entry.record.last_seen).num_days();
                    if age_days >= self.expiry_days {
                        store.delete(&entry.path)?;
                        info!(
                            id = %entry.record.id,
                            age_days,
                            "Evicted expired profile"
                        );
                        deleted += 1;
                    }
                }
                Err(err) => {
                    warn!(error = %err, "Skipping unreadable profile during sweep");
                }
            }
        }

        if deleted == 0 {
            debug!("No expired profiles to evict");
        } else {
            info!(deleted, "Eviction sweep complete");
        }

        Ok(deleted)
    }
}
