//! Services for voicegate-id

pub mod evictor;
pub mod extractor;
pub mod matcher;
pub mod store;

pub use evictor::Evictor;
pub use extractor::{usable_audio, EmbeddingExtractor};
pub use matcher::{cosine_similarity, MatchError, Matcher};
pub use store::{IdentityStore, StoreError};
