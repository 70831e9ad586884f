use std::collections::BTreeMap;
use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::chunking::ChunkStrategy;
use crate::error::AnalysisError;
use crate::models::sentiment::{round2, round3};
use crate::models::{
    ChunkResult, SentimentDistribution, SpeakerRole, SpeakerSegment, SummaryStats,
};

/// Top-level JSON payload written to stdout
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Report {
    Document(DocumentReport),
    Speakers(SpeakerReport),
    AudioTranscript(AudioTranscriptReport),
    Historical(HistoricalReport),
    Error(ErrorPayload),
}

impl Report {
    pub fn is_error(&self) -> bool {
        matches!(self, Report::Error(_))
    }

    /// Write as a single line of JSON followed by a newline
    pub fn write_json<W: Write>(&self, mut writer: W) -> Result<()> {
        serde_json::to_writer(&mut writer, self).context("Failed to serialize report")?;
        writeln!(writer).context("Failed to write report")?;
        Ok(())
    }
}

/// Classification of a top-level failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InputError,
    InvalidRequest,
    TextAnalysisError,
    SpeakerAnalysisError,
    AudioProcessingError,
    HistoricalProcessingError,
    StartupError,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub error: String,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
}

impl ErrorPayload {
    pub fn new(error: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            error: error.into(),
            kind,
        }
    }

    /// Classify an analysis failure; request problems keep their own kind,
    /// everything else is attributed to the action that failed
    pub fn from_analysis(err: &AnalysisError, action_kind: ErrorKind) -> Self {
        let kind = match err {
            AnalysisError::EmptyInput => ErrorKind::InputError,
            AnalysisError::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            _ => action_kind,
        };
        Self::new(err.to_string(), kind)
    }
}

/// Run-level facts about a document analysis
#[derive(Debug, Clone, Serialize)]
pub struct DocumentMetadata {
    pub analysis_id: String,
    pub total_chunks: usize,
    pub failed_chunks: usize,
    pub text_length: usize,
    pub processed_text_length: usize,
    pub text_modified: bool,
    pub avg_chunk_size: usize,
    pub model_used: String,
    #[serde(serialize_with = "round3")]
    pub avg_confidence: f64,
    #[serde(serialize_with = "round3")]
    pub avg_entropy: f64,
    pub chunking_strategy: ChunkStrategy,
}

/// Result of the document-level `analyze` action
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    #[serde(serialize_with = "round3")]
    pub overall_sentiment: f64,
    pub sentiments: Vec<ChunkResult>,
    pub summary: SummaryStats,
    pub metadata: DocumentMetadata,
}

/// Sentiment of one speaker segment
#[derive(Debug, Clone, Serialize)]
pub struct SegmentSentiment {
    #[serde(serialize_with = "round3")]
    pub overall_sentiment: f64,
    /// Segment sentiment scaled by the speaker's role weight
    #[serde(serialize_with = "round3")]
    pub weighted_sentiment: f64,
    pub sentiment_distribution: SentimentDistribution,
    #[serde(serialize_with = "round3")]
    pub confidence: f64,
    #[serde(serialize_with = "round3")]
    pub entropy: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpeakerAnalysis {
    pub speaker: String,
    pub speaker_role: SpeakerRole,
    #[serde(serialize_with = "round3")]
    pub speaker_weight: f64,
    pub text_preview: String,
    pub sentiment_analysis: SegmentSentiment,
    pub word_count: usize,
    pub chunk_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleStatistics {
    pub count: usize,
    #[serde(serialize_with = "round2")]
    pub avg_weight: f64,
    pub speakers: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpeakerMetadata {
    pub analysis_id: String,
    pub analysis_type: &'static str,
    pub total_speakers: usize,
    pub total_chunks: usize,
    pub failed_chunks: usize,
    pub model_used: String,
    pub chunking_strategy: ChunkStrategy,
    pub ceo_cfo_detected: bool,
    pub analyst_detected: bool,
    #[serde(serialize_with = "round3")]
    pub avg_confidence: f64,
    #[serde(serialize_with = "round3")]
    pub avg_entropy: f64,
}

/// Result of the per-speaker `analyze` action
#[derive(Debug, Clone, Serialize)]
pub struct SpeakerReport {
    pub speaker_analysis: Vec<SpeakerAnalysis>,
    #[serde(serialize_with = "round3")]
    pub overall_sentiment: f64,
    pub sentiments: Vec<ChunkResult>,
    pub summary: SummaryStats,
    pub speaker_weights: BTreeMap<String, f64>,
    pub speaker_roles: BTreeMap<String, SpeakerRole>,
    pub role_statistics: BTreeMap<SpeakerRole, RoleStatistics>,
    pub metadata: SpeakerMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct AudioMetadata {
    #[serde(flatten)]
    pub document: DocumentMetadata,
    pub analysis_type: &'static str,
    pub transcript_length: usize,
    /// RFC 3339, UTC
    pub timestamp: String,
}

/// Result of the `audio_transcript` action
#[derive(Debug, Clone, Serialize)]
pub struct AudioTranscriptReport {
    pub company: String,
    pub ticker: String,
    pub transcript_preview: String,
    #[serde(serialize_with = "round3")]
    pub overall_sentiment: f64,
    pub summary: SummaryStats,
    pub metadata: AudioMetadata,
}

/// Summary with the label ratios repeated at the top level
#[derive(Debug, Clone, Serialize)]
pub struct HistoricalSummary {
    #[serde(flatten)]
    pub summary: SummaryStats,
    #[serde(serialize_with = "round3")]
    pub positive_ratio: f64,
    #[serde(serialize_with = "round3")]
    pub negative_ratio: f64,
    #[serde(serialize_with = "round3")]
    pub neutral_ratio: f64,
}

impl From<SummaryStats> for HistoricalSummary {
    fn from(summary: SummaryStats) -> Self {
        let ratios = summary.sentiment_ratios;
        Self {
            summary,
            positive_ratio: ratios.positive_ratio,
            negative_ratio: ratios.negative_ratio,
            neutral_ratio: ratios.neutral_ratio,
        }
    }
}

/// Result of the `historical` action
#[derive(Debug, Clone, Serialize)]
pub struct HistoricalReport {
    pub ticker: String,
    pub year: i32,
    pub quarter: u32,
    pub transcript: String,
    #[serde(serialize_with = "round3")]
    pub overall_sentiment: f64,
    pub summary: HistoricalSummary,
    pub sentiments: Vec<ChunkResult>,
    pub metadata: DocumentMetadata,
}

/// Offline view of how a transcript would be segmented and chunked
pub struct InspectReport {
    pub segments: Vec<InspectSegment>,
    pub strategy: ChunkStrategy,
    /// Chunks for the whole text when no speakers were found
    pub document_chunks: usize,
}

pub struct InspectSegment {
    pub segment: SpeakerSegment,
    pub role: SpeakerRole,
    pub weight: f64,
    pub chunks: usize,
}

impl InspectReport {
    /// Format as human-readable text
    pub fn format(&self) -> String {
        let mut output = String::new();

        if self.segments.is_empty() {
            output.push_str("No speakers detected; analyzed as a single document.\n");
            output.push_str(&format!(
                "{} chunks ({:?})\n",
                self.document_chunks, self.strategy
            ));
            return output;
        }

        for (index, s) in self.segments.iter().enumerate() {
            output.push_str(&format!(
                "[{}] {} ({}, weight {:.1}) - {} words, {} chunks\n",
                index + 1,
                s.segment.speaker,
                s.role,
                s.weight,
                s.segment.word_count(),
                s.chunks
            ));
            output.push_str(&wrap_text(&s.segment.text, 80));
            output.push_str("\n\n");
        }

        let total: usize = self.segments.iter().map(|s| s.chunks).sum();
        output.push_str(&format!(
            "{} segments, {} chunks ({:?})\n",
            self.segments.len(),
            total,
            self.strategy
        ));
        output
    }
}

/// Wrap text at approximately the given width
fn wrap_text(text: &str, width: usize) -> String {
    let mut result = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if line_len + word_len + 1 > width && line_len > 0 {
            result.push('\n');
            line_len = 0;
        }
        if line_len > 0 {
            result.push(' ');
            line_len += 1;
        }
        result.push_str(word);
        line_len += word_len;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SentimentRatios;

    #[test]
    fn test_error_payload_shape() {
        let payload = ErrorPayload::from_analysis(&AnalysisError::EmptyInput, ErrorKind::TextAnalysisError);
        let json = serde_json::to_value(Report::Error(payload)).unwrap();
        assert_eq!(json["error"], "Empty text provided");
        assert_eq!(json["type"], "input_error");
    }

    #[test]
    fn test_whole_analysis_errors_take_action_kind() {
        let payload = ErrorPayload::from_analysis(
            &AnalysisError::AllChunksFailed { failed: 3 },
            ErrorKind::HistoricalProcessingError,
        );
        assert_eq!(payload.kind, ErrorKind::HistoricalProcessingError);
    }

    #[test]
    fn test_historical_summary_flattens_ratios() {
        let summary = SummaryStats {
            sentiment_ratios: SentimentRatios {
                positive_ratio: 0.5,
                negative_ratio: 0.25,
                neutral_ratio: 0.25,
            },
            ..Default::default()
        };
        let json = serde_json::to_value(HistoricalSummary::from(summary)).unwrap();
        assert_eq!(json["positive_ratio"], 0.5);
        assert_eq!(json["sentiment_ratios"]["negative_ratio"], 0.25);
        assert!(json["key_points"].is_array());
    }

    #[test]
    fn test_write_json_is_one_line() {
        let mut buffer = Vec::new();
        Report::Error(ErrorPayload::new("boom", ErrorKind::StartupError))
            .write_json(&mut buffer)
            .unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "{\"error\":\"boom\",\"type\":\"startup_error\"}\n");
    }

    #[test]
    fn test_role_statistics_keys() {
        let mut stats = BTreeMap::new();
        stats.insert(
            SpeakerRole::Ceo,
            RoleStatistics {
                count: 1,
                avg_weight: 1.5,
                speakers: vec!["John Smith - CEO".to_string()],
            },
        );
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["CEO"]["count"], 1);
    }

    #[test]
    fn test_role_average_weight_uses_two_decimals() {
        let stats = RoleStatistics {
            count: 3,
            avg_weight: (1.5 + 0.8 + 0.8) / 3.0,
            speakers: vec!["A".to_string(), "B".to_string(), "C".to_string()],
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["avg_weight"], 1.03);
    }

    #[test]
    fn test_wrap_text() {
        let text = "This is a test of the text wrapping function that should wrap at 20 chars";
        let wrapped = wrap_text(text, 20);
        for line in wrapped.lines() {
            assert!(line.len() <= 25);
        }
    }

    #[test]
    fn test_inspect_format_without_speakers() {
        let report = InspectReport {
            segments: vec![],
            strategy: ChunkStrategy::Sentences,
            document_chunks: 3,
        };
        assert!(report.format().contains("3 chunks"));
    }
}
