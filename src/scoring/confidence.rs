use crate::models::{EnhancedMetrics, ProbabilityTriple};

/// Entropy of the uniform distribution over three labels, log2(3)
pub const MAX_ENTROPY: f64 = 1.584_962_500_721_156;

/// Lower bound applied to each probability before taking logarithms
const PROBABILITY_FLOOR: f64 = 1e-10;

pub const MIN_CONFIDENCE: f64 = 0.1;
pub const MAX_CONFIDENCE: f64 = 0.95;

/// Shannon entropy in bits of the renormalized triple.
///
/// Each probability is floored at 1e-10 and the result renormalized to
/// sum to 1, so the value always lies in [0, log2(3)].
pub fn shannon_entropy(triple: &ProbabilityTriple) -> f64 {
    let floored = triple.as_array().map(|p| p.max(PROBABILITY_FLOOR));
    let total: f64 = floored.iter().sum();

    let entropy: f64 = floored
        .iter()
        .map(|p| p / total)
        .map(|p| -p * p.log2())
        .sum();

    entropy.clamp(0.0, MAX_ENTROPY)
}

/// Blend of entropy, margin and peak probability into one confidence.
///
/// Returns the confidence clamped to [0.1, 0.95], the entropy, and the
/// partial metrics. Margin and peak use the triple as reported.
pub fn blended_confidence(triple: &ProbabilityTriple) -> (f64, f64, EnhancedMetrics) {
    let entropy = shannon_entropy(triple);
    let normalized_entropy = entropy / MAX_ENTROPY;

    let mut sorted = triple.as_array();
    sorted.sort_by(|a, b| b.total_cmp(a));
    let max_prob = sorted[0];
    let margin = sorted[0] - sorted[1];

    let entropy_confidence = 1.0 - normalized_entropy;
    let margin_confidence = (margin * 2.0).min(1.0);
    let max_prob_confidence = max_prob;

    let confidence = (entropy_confidence * 0.4
        + margin_confidence * 0.3
        + max_prob_confidence * 0.3)
        .clamp(MIN_CONFIDENCE, MAX_CONFIDENCE);

    let metrics = EnhancedMetrics {
        entropy,
        normalized_entropy,
        entropy_confidence,
        margin_confidence,
        max_prob_confidence,
        probability_margin: margin,
        max_probability: max_prob,
    };

    (confidence, entropy, metrics)
}
