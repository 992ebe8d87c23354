//! voicegate-id - Speaker Identity Service
//!
//! Recognizes recurring speakers from fixed-length voice embeddings and
//! maintains a self-expiring catalog of known identities. Per event, the
//! matcher scores a new embedding against every known profile and either
//! refreshes the matched identity or enrolls a new one; a startup sweep
//! evicts identities unseen for longer than the expiry window.
//!
//! Exposes the library surface for the `voicegate-id` binary and for
//! integration testing.

pub mod config;
pub mod models;
pub mod services;

pub use crate::config::IdConfig;
pub use crate::models::{Catalog, CatalogEntry, IdentifyOutcome, IdentityRecord};
pub use crate::services::{Evictor, IdentityStore, MatchError, Matcher, StoreError};

use tracing::info;

/// One process-lifetime view over the profile catalog
///
/// Owns the in-memory catalog mirror; all mutation flows through the
/// store via `identify`. Opening a session runs the eviction sweep
/// first and only then loads the survivors, so an expired identity is
/// never matched against.
pub struct Session {
    store: IdentityStore,
    matcher: Matcher,
    catalog: Catalog,
    evicted_at_start: usize,
}

impl Session {
    /// Sweep expired profiles, then load the catalog into memory
    ///
    /// The catalog folder must already exist (see
    /// `voicegate_common::config::ensure_catalog_folder`).
    pub fn open(config: &IdConfig) -> Result<Self, StoreError> {
        let store = IdentityStore::new(&config.catalog_folder);

        let evicted_at_start = Evictor::new(config.expiry_days).sweep(&store)?;
        let entries = store.load_all()?;
        info!(
            loaded = entries.len(),
            evicted = evicted_at_start,
            folder = %config.catalog_folder.display(),
            "Catalog ready"
        );

        Ok(Self {
            store,
            matcher: Matcher::new(config.similarity_threshold),
            catalog: Catalog::from_entries(entries),
            evicted_at_start,
        })
    }

    /// Match-or-enroll one embedding; exactly one store mutation
    pub fn identify(&mut self, embedding: &[f32]) -> Result<IdentifyOutcome, MatchError> {
        self.matcher
            .identify(&self.store, &mut self.catalog, embedding)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Profiles deleted by the startup sweep
    pub fn evicted_at_start(&self) -> usize {
        self.evicted_at_start
    }
}
