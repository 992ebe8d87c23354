//! Data models for voicegate-id

pub mod identity;

pub use identity::{Catalog, CatalogEntry, IdentifyOutcome, IdentityRecord};
