pub mod confidence;
pub mod decision;
pub mod legacy;

pub use confidence::*;
pub use decision::*;
pub use legacy::*;

use crate::error::ScoringError;
use crate::models::{
    ChunkResult, DecisionInfo, EnhancedMetrics, ProbabilityTriple, SentimentLabel,
};

/// Everything the decision engine derives from one probability triple
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreDecision {
    pub label: SentimentLabel,
    /// Probability of the chosen label
    pub decision_score: f64,
    pub confidence: f64,
    pub entropy: f64,
    /// Entropy-adjusted score in [0, 1]
    pub score: f64,
    pub legacy: LegacyScore,
    pub distribution: ProbabilityTriple,
    pub decision_info: DecisionInfo,
    pub metrics: EnhancedMetrics,
}

impl ScoreDecision {
    /// Materialize the decision as the result for one chunk
    pub fn into_chunk_result(self, chunk_id: usize, text: impl Into<String>) -> ChunkResult {
        ChunkResult {
            chunk_id,
            text: text.into(),
            label: self.label,
            score: self.score,
            confidence: self.confidence,
            entropy: self.entropy,
            raw_score: self.decision_score,
            legacy_score: self.legacy.score,
            legacy_label: self.legacy.label,
            score_distribution: Some(self.distribution),
            decision_info: Some(self.decision_info),
            enhanced_metrics: Some(self.metrics),
            speaker: None,
            speaker_role: None,
            speaker_weight: None,
            error: None,
        }
    }
}

/// Run the full decision engine over one triple.
///
/// 1. Entropy of the renormalized distribution
/// 2. Confidence blended from entropy, margin and peak probability
/// 3. Decision label with entropy-scaled thresholds
/// 4. Entropy-adjusted score around 0.5
pub fn score_triple(triple: &ProbabilityTriple) -> Result<ScoreDecision, ScoringError> {
    validate_triple(triple)?;

    let (confidence, entropy, metrics) = blended_confidence(triple);
    let (label, decision_score, decision_info) = decide_label(triple, entropy);
    let score = entropy_adjusted_score(label, decision_score, confidence, entropy);

    Ok(ScoreDecision {
        label,
        decision_score,
        confidence,
        entropy,
        score,
        legacy: legacy_score(triple),
        distribution: *triple,
        decision_info,
        metrics,
    })
}

/// Score a triple for a chunk, substituting a neutral failure result when
/// the triple is malformed.
pub fn score_chunk(chunk_id: usize, text: &str, triple: &ProbabilityTriple) -> ChunkResult {
    match score_triple(triple) {
        Ok(decision) => decision.into_chunk_result(chunk_id, text),
        Err(e) => {
            tracing::warn!("Chunk {} could not be scored: {}", chunk_id, e);
            ChunkResult::failed(chunk_id, text, e.to_string())
        }
    }
}

fn validate_triple(triple: &ProbabilityTriple) -> Result<(), ScoringError> {
    let entries = [
        ("positive", triple.positive),
        ("negative", triple.negative),
        ("neutral", triple.neutral),
    ];

    for (label, value) in entries {
        if !value.is_finite() {
            return Err(ScoringError::NonFinite { label, value });
        }
        if value < 0.0 {
            return Err(ScoringError::Negative { label, value });
        }
        if value > 1.0 {
            return Err(ScoringError::OutOfRange { label, value });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_positive_triple() {
        let triple = ProbabilityTriple::new(0.70, 0.10, 0.20);
        let decision = score_triple(&triple).unwrap();

        assert_eq!(decision.label, SentimentLabel::Positive);
        assert_eq!(decision.decision_score, 0.70);
        assert!((decision.entropy - 1.157).abs() < 1e-3);
        assert!((MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&decision.confidence));
        assert!(decision.score > 0.5 && decision.score <= 1.0);
    }

    #[test]
    fn test_uniform_triple_is_neutral_half() {
        let decision = score_triple(&ProbabilityTriple::new(0.4, 0.4, 0.4)).unwrap();
        assert_eq!(decision.label, SentimentLabel::Neutral);
        assert_eq!(decision.score, 0.5);
    }

    #[test]
    fn test_nan_is_rejected() {
        let err = score_triple(&ProbabilityTriple::new(f64::NAN, 0.1, 0.2)).unwrap_err();
        assert!(matches!(err, ScoringError::NonFinite { label: "positive", .. }));
    }

    #[test]
    fn test_negative_probability_is_rejected() {
        let err = score_triple(&ProbabilityTriple::new(0.5, -0.1, 0.2)).unwrap_err();
        assert!(matches!(err, ScoringError::Negative { label: "negative", .. }));
    }

    #[test]
    fn test_probability_above_one_is_rejected() {
        let err = score_triple(&ProbabilityTriple::new(0.2, 0.3, 1.5)).unwrap_err();
        assert!(matches!(err, ScoringError::OutOfRange { label: "neutral", .. }));
    }

    #[test]
    fn test_huge_probabilities_never_leak_nan() {
        let result = score_chunk(1, "x", &ProbabilityTriple::new(1e308, 1e308, 1e308));
        assert!(result.is_error());
        assert!(result.confidence.is_finite());
        assert!(result.entropy.is_finite());
        assert!(result.score.is_finite());
    }

    #[test]
    fn test_malformed_triple_becomes_failed_chunk() {
        let result = score_chunk(4, "broken", &ProbabilityTriple::new(0.2, f64::INFINITY, 0.1));
        assert!(result.is_error());
        assert_eq!(result.chunk_id, 4);
        assert_eq!(result.label, SentimentLabel::Neutral);
        assert_eq!(result.entropy, 1.0);
        assert!((0.3..=0.5).contains(&result.confidence));
    }

    #[test]
    fn test_chunk_result_carries_diagnostics() {
        let result = score_chunk(1, "Revenue grew.", &ProbabilityTriple::new(0.1, 0.7, 0.2));
        assert!(!result.is_error());
        assert_eq!(result.label, SentimentLabel::Negative);
        assert_eq!(result.raw_score, 0.7);
        assert!(result.score < 0.5);
        assert!(result.decision_info.is_some());
        assert_eq!(result.score_distribution, Some(ProbabilityTriple::new(0.1, 0.7, 0.2)));
    }
}
