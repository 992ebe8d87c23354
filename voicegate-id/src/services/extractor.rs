//! Embedding extractor seam
//!
//! The model that turns audio into a voice embedding is an external
//! collaborator; this service only defines the contract and the silence
//! gate extractors apply before spending model time on an event.

/// Peak amplitude below which input is judged silence or noise
pub const PEAK_AMPLITUDE_FLOOR: f32 = 0.01;

/// Check whether captured audio is worth embedding
///
/// Mirrors the gate extractors are expected to apply: input whose peak
/// amplitude never reaches the floor is unusable and the event is
/// skipped entirely (no identify call, no error).
pub fn usable_audio(samples: &[f32]) -> bool {
    samples
        .iter()
        .fold(0.0_f32, |peak, s| peak.max(s.abs()))
        >= PEAK_AMPLITUDE_FLOOR
}

/// Maps an audio buffer to a fixed-dimension voice embedding
///
/// Implementations return `None` for unusable input (silence, noise,
/// decode failure); callers treat `None` as "ignore this event".
pub trait EmbeddingExtractor {
    /// Dimension of the embeddings this extractor produces
    fn dimension(&self) -> usize;

    /// Extract an embedding, or `None` when the input is unusable
    fn embed(&self, samples: &[f32], sample_rate: u32) -> Option<Vec<f32>>;
}
