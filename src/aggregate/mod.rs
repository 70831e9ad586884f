pub mod summary;

pub use summary::*;

use std::collections::HashMap;

use crate::models::ChunkResult;

/// Composite weight of one chunk: speaker × confidence × entropy terms
pub fn composite_weight(chunk: &ChunkResult, speaker_weight: f64) -> f64 {
    let confidence_weight = chunk.confidence.max(0.5);
    let entropy_weight = (1.0 - chunk.entropy / 2.0).max(0.3);
    speaker_weight * confidence_weight * entropy_weight
}

/// Speaker weight for a chunk: explicit map first, then the weight attached
/// to the chunk, then 1.0. Weights that are negative or not finite count as 0.
fn speaker_weight(chunk: &ChunkResult, speaker_weights: Option<&HashMap<String, f64>>) -> f64 {
    let explicit = speaker_weights
        .zip(chunk.speaker.as_deref())
        .and_then(|(weights, speaker)| weights.get(speaker).copied());

    let weight = explicit.or(chunk.speaker_weight).unwrap_or(1.0);
    if weight.is_finite() { weight.max(0.0) } else { 0.0 }
}

/// Weighted overall sentiment in [-1, 1].
///
/// Errored chunks are skipped. When every remaining weight is zero the
/// unweighted mean of signed sentiments is used; with nothing left the
/// result is 0.0. The same primitive rolls up chunks into a document and,
/// with speaker weights, chunks of every speaker into a transcript.
pub fn aggregate_sentiment(
    chunks: &[ChunkResult],
    speaker_weights: Option<&HashMap<String, f64>>,
) -> f64 {
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    let mut signed_sum = 0.0;
    let mut count = 0usize;

    for chunk in chunks.iter().filter(|c| !c.is_error()) {
        let signed = chunk.signed_sentiment();
        if !signed.is_finite() {
            continue;
        }

        let weight = composite_weight(chunk, speaker_weight(chunk, speaker_weights));
        if weight.is_finite() {
            weighted_sum += signed * weight;
            total_weight += weight;
        }

        signed_sum += signed;
        count += 1;
    }

    let overall = if total_weight > 0.0 {
        weighted_sum / total_weight
    } else if count > 0 {
        signed_sum / count as f64
    } else {
        0.0
    };

    overall.clamp(-1.0, 1.0)
}
