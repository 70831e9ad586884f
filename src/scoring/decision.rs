use crate::models::{DecisionInfo, ProbabilityTriple, SentimentLabel};

/// Choose a label with entropy-scaled thresholds.
///
/// Positive or negative must beat neutral by `0.02 + 0.01 * H`. When they
/// don't, a near tie between positive and negative that still beats neutral
/// goes to the larger of the two. Everything else is neutral.
///
/// Returns the label, the probability of that label, and the differences
/// the rule looked at.
pub fn decide_label(triple: &ProbabilityTriple, entropy: f64) -> (SentimentLabel, f64, DecisionInfo) {
    let pos = triple.positive;
    let neg = triple.negative;
    let neu = triple.neutral;

    let pos_vs_neu = pos - neu;
    let neg_vs_neu = neg - neu;
    let pos_vs_neg = (pos - neg).abs();
    let threshold = 0.02 + entropy * 0.01;
    let tie_band = 0.05 + entropy * 0.02;

    let label = if pos_vs_neu > threshold && pos > neg {
        SentimentLabel::Positive
    } else if neg_vs_neu > threshold && neg > pos {
        SentimentLabel::Negative
    } else if pos_vs_neg < tie_band && pos.max(neg) > neu {
        if pos > neg {
            SentimentLabel::Positive
        } else {
            SentimentLabel::Negative
        }
    } else {
        SentimentLabel::Neutral
    };

    let info = DecisionInfo {
        pos_vs_neu_diff: pos_vs_neu,
        neg_vs_neu_diff: neg_vs_neu,
        pos_vs_neg_diff: pos_vs_neg,
        entropy_threshold: threshold,
    };

    (label, triple.get(label), info)
}

/// Map a decision onto [0, 1] around 0.5, shrunk toward neutral by
/// entropy and confidence.
pub fn entropy_adjusted_score(
    label: SentimentLabel,
    decision_score: f64,
    confidence: f64,
    entropy: f64,
) -> f64 {
    let base = match label {
        SentimentLabel::Positive => 0.5 + decision_score * 0.5,
        SentimentLabel::Negative => 0.5 - decision_score * 0.5,
        SentimentLabel::Neutral => 0.5,
    };

    let entropy_factor = (1.0 - entropy / 2.0).clamp(0.3, 1.2);
    let confidence_factor = 0.7 + confidence * 0.3;

    let adjusted = if base > 0.5 {
        0.5 + (base - 0.5) * entropy_factor * confidence_factor
    } else if base < 0.5 {
        0.5 - (0.5 - base) * entropy_factor * confidence_factor
    } else {
        0.5
    };

    adjusted.clamp(0.0, 1.0)
}
