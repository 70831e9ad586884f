use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use super::SpeakerRole;

/// The fixed label set produced by the external classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Map a provider label onto the fixed set.
    ///
    /// Providers spell labels differently ("POSITIVE", "pos", "Negative");
    /// anything that is neither positive nor negative counts as neutral.
    pub fn from_provider(label: &str) -> Self {
        let lower = label.to_lowercase();
        if lower.contains("pos") {
            SentimentLabel::Positive
        } else if lower.contains("neg") {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single (label, probability) pair as reported by a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

impl LabelScore {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Probability assigned to each label for one chunk.
///
/// Values need not sum to exactly 1; the scoring engine renormalizes
/// where it matters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProbabilityTriple {
    #[serde(serialize_with = "round3")]
    pub positive: f64,
    #[serde(serialize_with = "round3")]
    pub negative: f64,
    #[serde(serialize_with = "round3")]
    pub neutral: f64,
}

impl ProbabilityTriple {
    pub fn new(positive: f64, negative: f64, neutral: f64) -> Self {
        Self {
            positive,
            negative,
            neutral,
        }
    }

    /// Build a triple from a full provider distribution.
    ///
    /// The first score reported for a label wins; missing labels are 0.
    pub fn from_scores(scores: &[LabelScore]) -> Self {
        let mut seen = [false; 3];
        let mut triple = Self::default();

        for entry in scores {
            let label = SentimentLabel::from_provider(&entry.label);
            let slot = label_slot(label);
            if !seen[slot] {
                seen[slot] = true;
                triple.set(label, entry.score);
            }
        }

        triple
    }

    /// Synthesize a triple from a provider that only reports its top label.
    ///
    /// The reported probability goes under its label and 0.33 everywhere else.
    pub fn pseudo(top: &LabelScore) -> Self {
        let mut triple = Self::new(0.33, 0.33, 0.33);
        triple.set(SentimentLabel::from_provider(&top.label), top.score);
        triple
    }

    pub fn get(&self, label: SentimentLabel) -> f64 {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
        }
    }

    fn set(&mut self, label: SentimentLabel, value: f64) {
        match label {
            SentimentLabel::Positive => self.positive = value,
            SentimentLabel::Negative => self.negative = value,
            SentimentLabel::Neutral => self.neutral = value,
        }
    }

    /// Probabilities in positive, negative, neutral order
    pub fn as_array(&self) -> [f64; 3] {
        [self.positive, self.negative, self.neutral]
    }
}

fn label_slot(label: SentimentLabel) -> usize {
    match label {
        SentimentLabel::Positive => 0,
        SentimentLabel::Negative => 1,
        SentimentLabel::Neutral => 2,
    }
}

/// Differences that drove the decision rule for a chunk
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DecisionInfo {
    #[serde(serialize_with = "round3")]
    pub pos_vs_neu_diff: f64,
    #[serde(serialize_with = "round3")]
    pub neg_vs_neu_diff: f64,
    #[serde(serialize_with = "round3")]
    pub pos_vs_neg_diff: f64,
    #[serde(serialize_with = "round3")]
    pub entropy_threshold: f64,
}

/// Partial confidences and distribution shape behind the blended confidence
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct EnhancedMetrics {
    #[serde(serialize_with = "round3")]
    pub entropy: f64,
    #[serde(serialize_with = "round3")]
    pub normalized_entropy: f64,
    #[serde(serialize_with = "round3")]
    pub entropy_confidence: f64,
    #[serde(serialize_with = "round3")]
    pub margin_confidence: f64,
    #[serde(serialize_with = "round3")]
    pub max_prob_confidence: f64,
    #[serde(serialize_with = "round3")]
    pub probability_margin: f64,
    #[serde(serialize_with = "round3")]
    pub max_probability: f64,
}

/// Scored sentiment for one chunk of text
#[derive(Debug, Clone, Serialize)]
pub struct ChunkResult {
    /// 1-based ordinal of the chunk within the analysis
    pub chunk_id: usize,
    pub text: String,
    /// Decision label chosen by the entropy-scaled threshold rule
    pub label: SentimentLabel,
    /// Entropy-adjusted score in [0, 1], 0.5 is neutral
    #[serde(serialize_with = "round3")]
    pub score: f64,
    /// Blended confidence in [0.1, 0.95]
    #[serde(serialize_with = "round3")]
    pub confidence: f64,
    /// Shannon entropy of the label distribution in bits
    #[serde(serialize_with = "round3")]
    pub entropy: f64,
    /// Probability of the decision label
    #[serde(serialize_with = "round3")]
    pub raw_score: f64,
    /// Score from the fixed-threshold neutral-penalty rule
    #[serde(serialize_with = "round3")]
    pub legacy_score: f64,
    pub legacy_label: SentimentLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_distribution: Option<ProbabilityTriple>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision_info: Option<DecisionInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enhanced_metrics: Option<EnhancedMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker_role: Option<SpeakerRole>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "round3_opt"
    )]
    pub speaker_weight: Option<f64>,
    /// Set when the chunk could not be scored; such chunks are ignored by
    /// aggregation and summaries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChunkResult {
    /// Neutral, low-confidence, high-entropy stand-in for a chunk that failed
    pub fn failed(chunk_id: usize, text: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            chunk_id,
            text: text.into(),
            label: SentimentLabel::Neutral,
            score: 0.5,
            confidence: 0.3,
            entropy: 1.0,
            raw_score: 0.5,
            legacy_score: 0.5,
            legacy_label: SentimentLabel::Neutral,
            score_distribution: None,
            decision_info: None,
            enhanced_metrics: None,
            speaker: None,
            speaker_role: None,
            speaker_weight: None,
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Score mapped from [0, 1] onto [-1, 1]
    pub fn signed_sentiment(&self) -> f64 {
        (self.score - 0.5) * 2.0
    }

    /// Attach speaker metadata after scoring
    pub fn with_speaker(mut self, speaker: &str, role: SpeakerRole, weight: f64) -> Self {
        self.speaker = Some(speaker.to_string());
        self.speaker_role = Some(role);
        self.speaker_weight = Some(weight);
        self
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Serialize a float rounded to three decimals
pub(crate) fn round3<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_to(*value, 3))
}

pub(crate) fn round2<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_to(*value, 2))
}

pub(crate) fn round3_opt<S: Serializer>(
    value: &Option<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_some(&round_to(*v, 3)),
        None => serializer.serialize_none(),
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_from_provider() {
        assert_eq!(SentimentLabel::from_provider("POSITIVE"), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_provider("neg"), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::from_provider("Neutral"), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_provider("LABEL_2"), SentimentLabel::Neutral);
    }

    #[test]
    fn test_triple_from_scores() {
        let scores = vec![
            LabelScore::new("positive", 0.7),
            LabelScore::new("negative", 0.1),
            LabelScore::new("neutral", 0.2),
        ];
        let triple = ProbabilityTriple::from_scores(&scores);
        assert_eq!(triple, ProbabilityTriple::new(0.7, 0.1, 0.2));
    }

    #[test]
    fn test_triple_from_partial_scores() {
        let scores = vec![LabelScore::new("Negative", 0.9)];
        let triple = ProbabilityTriple::from_scores(&scores);
        assert_eq!(triple, ProbabilityTriple::new(0.0, 0.9, 0.0));
    }

    #[test]
    fn test_pseudo_triple() {
        let triple = ProbabilityTriple::pseudo(&LabelScore::new("POSITIVE", 0.88));
        assert_eq!(triple.positive, 0.88);
        assert_eq!(triple.negative, 0.33);
        assert_eq!(triple.neutral, 0.33);
    }

    #[test]
    fn test_failed_chunk() {
        let result = ChunkResult::failed(3, "text", "timeout");
        assert!(result.is_error());
        assert_eq!(result.label, SentimentLabel::Neutral);
        assert_eq!(result.signed_sentiment(), 0.0);
        assert_eq!(result.entropy, 1.0);
    }

    #[test]
    fn test_serialized_floats_are_rounded() {
        let result = ChunkResult {
            score: 0.123456,
            ..ChunkResult::failed(1, "text", "x")
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["score"], serde_json::json!(0.123));
        assert_eq!(json["label"], "neutral");
        assert!(json.get("speaker").is_none());
    }
}
