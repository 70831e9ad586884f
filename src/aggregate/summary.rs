use crate::models::aggregate::mean;
use crate::models::{
    ChunkResult, ConfidenceMetrics, Excerpt, SentimentDistribution, SentimentLabel,
    SentimentRatios, SummaryStats,
};

/// Configuration for summary generation
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    pub max_key_points: usize,
    /// A chunk must have more than this many words to be a key point
    pub key_point_min_words: usize,
    pub key_point_chars: usize,
    /// Excerpts kept per polarity
    pub max_extremes: usize,
    pub extreme_chars: usize,
    /// Confidence above which a chunk counts as high confidence
    pub high_confidence: f64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_key_points: 5,
            key_point_min_words: 10,
            key_point_chars: 200,
            max_extremes: 3,
            extreme_chars: 150,
            high_confidence: 0.8,
        }
    }
}

/// Cut `text` to `max_chars` characters, marking the cut with "..."
pub fn truncate_excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Compute summary statistics over the non-errored chunks.
///
/// Empty input (or input with only errored chunks) yields zeroed
/// statistics and empty excerpt lists.
pub fn generate_summary(chunks: &[ChunkResult], config: &SummaryConfig) -> SummaryStats {
    let valid: Vec<&ChunkResult> = chunks.iter().filter(|c| !c.is_error()).collect();
    if valid.is_empty() {
        return SummaryStats::default();
    }

    let positive = with_label(&valid, SentimentLabel::Positive);
    let negative = with_label(&valid, SentimentLabel::Negative);
    let neutral = with_label(&valid, SentimentLabel::Neutral);

    let total = valid.len();
    let distribution = SentimentDistribution {
        positive: positive.len(),
        negative: negative.len(),
        neutral: neutral.len(),
        total,
    };
    let ratios = SentimentRatios {
        positive_ratio: positive.len() as f64 / total as f64,
        negative_ratio: negative.len() as f64 / total as f64,
        neutral_ratio: neutral.len() as f64 / total as f64,
    };

    let confidences = valid.iter().map(|c| c.confidence);
    let confidence_metrics = ConfidenceMetrics {
        avg_confidence: mean(confidences.clone()),
        min_confidence: confidences.clone().fold(f64::INFINITY, f64::min),
        max_confidence: confidences.fold(f64::NEG_INFINITY, f64::max),
        high_confidence_chunks: valid
            .iter()
            .filter(|c| c.confidence > config.high_confidence)
            .count(),
    };

    let key_points = valid
        .iter()
        .filter(|c| c.word_count() > config.key_point_min_words)
        .take(config.max_key_points)
        .map(|c| truncate_excerpt(&c.text, config.key_point_chars))
        .collect();

    SummaryStats {
        key_points,
        most_positive: top_excerpts(positive, config),
        most_negative: top_excerpts(negative, config),
        sentiment_distribution: distribution,
        sentiment_ratios: ratios,
        confidence_metrics,
    }
}

fn with_label<'a>(chunks: &[&'a ChunkResult], label: SentimentLabel) -> Vec<&'a ChunkResult> {
    chunks.iter().copied().filter(|c| c.label == label).collect()
}

/// Highest-scoring chunks of one polarity, score descending.
///
/// Negative chunks are ranked the same way, so the first negative excerpt
/// is the mildest one.
fn top_excerpts(mut chunks: Vec<&ChunkResult>, config: &SummaryConfig) -> Vec<Excerpt> {
    chunks.sort_by(|a, b| b.score.total_cmp(&a.score));
    chunks
        .into_iter()
        .take(config.max_extremes)
        .map(|c| Excerpt {
            text: truncate_excerpt(&c.text, config.extreme_chars),
            score: c.score,
            confidence: c.confidence,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: usize, text: &str, label: SentimentLabel, score: f64, confidence: f64) -> ChunkResult {
        ChunkResult {
            label,
            score,
            confidence,
            error: None,
            ..ChunkResult::failed(id, text, "")
        }
    }

    #[test]
    fn test_empty_input() {
        let summary = generate_summary(&[], &SummaryConfig::default());
        assert_eq!(summary, SummaryStats::default());
        assert_eq!(summary.confidence_metrics.min_confidence, 0.0);
    }

    #[test]
    fn test_only_errored_chunks() {
        let chunks = vec![ChunkResult::failed(1, "a", "boom")];
        let summary = generate_summary(&chunks, &SummaryConfig::default());
        assert_eq!(summary.sentiment_distribution.total, 0);
    }

    #[test]
    fn test_distribution_and_confidence() {
        let chunks = vec![
            chunk(1, "good", SentimentLabel::Positive, 0.8, 0.9),
            chunk(2, "bad", SentimentLabel::Negative, 0.2, 0.5),
            chunk(3, "meh", SentimentLabel::Neutral, 0.5, 0.4),
            chunk(4, "fine", SentimentLabel::Positive, 0.7, 0.85),
            ChunkResult::failed(5, "lost", "timeout"),
        ];
        let summary = generate_summary(&chunks, &SummaryConfig::default());

        assert_eq!(
            summary.sentiment_distribution,
            SentimentDistribution {
                positive: 2,
                negative: 1,
                neutral: 1,
                total: 4
            }
        );
        assert_eq!(summary.sentiment_ratios.positive_ratio, 0.5);
        assert_eq!(summary.confidence_metrics.min_confidence, 0.4);
        assert_eq!(summary.confidence_metrics.max_confidence, 0.9);
        assert_eq!(summary.confidence_metrics.high_confidence_chunks, 2);
        assert!((summary.confidence_metrics.avg_confidence - 0.6625).abs() < 1e-12);
    }

    #[test]
    fn test_key_points_need_more_than_ten_words() {
        let long = "one two three four five six seven eight nine ten eleven";
        let ten = "one two three four five six seven eight nine ten";
        let chunks = vec![
            chunk(1, ten, SentimentLabel::Neutral, 0.5, 0.5),
            chunk(2, long, SentimentLabel::Neutral, 0.5, 0.5),
        ];
        let summary = generate_summary(&chunks, &SummaryConfig::default());
        assert_eq!(summary.key_points, vec![long.to_string()]);
    }

    #[test]
    fn test_key_points_are_capped_and_truncated() {
        let text = "word ".repeat(60);
        let chunks: Vec<ChunkResult> = (1..=7)
            .map(|i| chunk(i, &text, SentimentLabel::Neutral, 0.5, 0.5))
            .collect();
        let summary = generate_summary(&chunks, &SummaryConfig::default());
        assert_eq!(summary.key_points.len(), 5);
        assert_eq!(summary.key_points[0].chars().count(), 203);
        assert!(summary.key_points[0].ends_with("..."));
    }

    #[test]
    fn test_extremes_sorted_by_score_descending() {
        let chunks = vec![
            chunk(1, "p1", SentimentLabel::Positive, 0.6, 0.5),
            chunk(2, "p2", SentimentLabel::Positive, 0.9, 0.5),
            chunk(3, "p3", SentimentLabel::Positive, 0.7, 0.5),
            chunk(4, "p4", SentimentLabel::Positive, 0.8, 0.5),
            chunk(5, "n1", SentimentLabel::Negative, 0.1, 0.5),
            chunk(6, "n2", SentimentLabel::Negative, 0.3, 0.5),
        ];
        let summary = generate_summary(&chunks, &SummaryConfig::default());

        let positive: Vec<&str> = summary.most_positive.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(positive, vec!["p2", "p4", "p3"]);
        let negative: Vec<&str> = summary.most_negative.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(negative, vec!["n2", "n1"]);
    }

    #[test]
    fn test_truncate_excerpt_is_char_safe() {
        assert_eq!(truncate_excerpt("short", 10), "short");
        assert_eq!(truncate_excerpt("äöüäöü", 3), "äöü...");
    }
}
