use serde::Serialize;

use super::ChunkResult;
use super::sentiment::round3;

/// Label counts over the non-errored chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SentimentDistribution {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub total: usize,
}

/// Label shares over the non-errored chunks
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SentimentRatios {
    #[serde(serialize_with = "round3")]
    pub positive_ratio: f64,
    #[serde(serialize_with = "round3")]
    pub negative_ratio: f64,
    #[serde(serialize_with = "round3")]
    pub neutral_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ConfidenceMetrics {
    #[serde(serialize_with = "round3")]
    pub avg_confidence: f64,
    #[serde(serialize_with = "round3")]
    pub min_confidence: f64,
    #[serde(serialize_with = "round3")]
    pub max_confidence: f64,
    pub high_confidence_chunks: usize,
}

/// A representative chunk excerpt with its score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Excerpt {
    pub text: String,
    #[serde(serialize_with = "round3")]
    pub score: f64,
    #[serde(serialize_with = "round3")]
    pub confidence: f64,
}

/// Summary statistics derived from a sequence of chunk results
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SummaryStats {
    pub key_points: Vec<String>,
    pub most_positive: Vec<Excerpt>,
    pub most_negative: Vec<Excerpt>,
    pub sentiment_distribution: SentimentDistribution,
    pub sentiment_ratios: SentimentRatios,
    pub confidence_metrics: ConfidenceMetrics,
}

/// Overall sentiment for a document or transcript with its chunk results
#[derive(Debug, Clone, Serialize)]
pub struct AggregateResult {
    /// Weighted sentiment in [-1, 1]
    #[serde(serialize_with = "round3")]
    pub overall_sentiment: f64,
    #[serde(rename = "sentiments")]
    pub chunk_results: Vec<ChunkResult>,
    pub summary: SummaryStats,
}

impl AggregateResult {
    pub fn failed_chunks(&self) -> usize {
        self.chunk_results.iter().filter(|c| c.is_error()).count()
    }

    /// Mean confidence over all chunks, errored ones included
    pub fn avg_confidence(&self) -> f64 {
        mean(self.chunk_results.iter().map(|c| c.confidence))
    }

    /// Mean entropy over all chunks, errored ones included
    pub fn avg_entropy(&self) -> f64 {
        mean(self.chunk_results.iter().map(|c| c.entropy))
    }
}

pub(crate) fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}
