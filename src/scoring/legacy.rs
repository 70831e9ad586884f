use crate::models::{ProbabilityTriple, SentimentLabel};

/// Penalty subtracted from neutral before comparing against it
const NEUTRAL_PENALTY: f64 = 0.05;
/// Margin a polarity must hold over the other labels
const MIN_THRESHOLD: f64 = 0.05;

/// Output of the fixed-threshold neutral-penalty rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegacyScore {
    pub score: f64,
    pub confidence: f64,
    pub label: SentimentLabel,
}

/// Score a triple with the fixed-threshold rule that penalizes neutral.
///
/// Kept alongside the entropy-adjusted score for comparison; it does not
/// feed aggregation.
pub fn legacy_score(triple: &ProbabilityTriple) -> LegacyScore {
    let pos = triple.positive;
    let neg = triple.negative;
    let neu = triple.neutral;

    let mut sorted = triple.as_array();
    sorted.sort_by(|a, b| b.total_cmp(a));
    let margin = sorted[0] - sorted[1];

    let adjusted_neu = neu - NEUTRAL_PENALTY;

    let strong = |confidence_margin: f64| {
        let confidence = (confidence_margin * 1.5 + 0.4).clamp(0.4, 0.95);
        (confidence, 0.65 + (confidence - 0.4) * 0.55)
    };
    let lean = |probability: f64| {
        let confidence = (probability * 1.2).clamp(0.3, 0.8);
        (confidence, 0.60 + (confidence - 0.3) * 0.6)
    };

    let (label, (confidence, score)) = if pos > neg.max(adjusted_neu) + MIN_THRESHOLD {
        (SentimentLabel::Positive, strong(margin))
    } else if neg > pos.max(adjusted_neu) + MIN_THRESHOLD {
        (SentimentLabel::Negative, strong(margin))
    } else if pos > 0.4 && pos > neg {
        (SentimentLabel::Positive, lean(pos))
    } else if neg > 0.4 && neg > pos {
        (SentimentLabel::Negative, lean(neg))
    } else {
        let confidence = (0.7 - margin).clamp(0.2, 0.7);
        (SentimentLabel::Neutral, (confidence, 0.30 + confidence * 0.5))
    };

    LegacyScore {
        score,
        confidence,
        label,
    }
}
