use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::aggregate::{aggregate_sentiment, generate_summary, truncate_excerpt, SummaryConfig};
use crate::chunking::ChunkStrategy;
use crate::io::{
    AudioMetadata, AudioTranscriptReport, DocumentMetadata, DocumentReport, HistoricalReport,
    RoleStatistics, SegmentSentiment, SpeakerAnalysis, SpeakerMetadata, SpeakerReport,
};
use crate::models::aggregate::mean;
use crate::models::{AggregateResult, ChunkResult, RoleAssignment, SpeakerRole, SpeakerSegment};
use crate::speakers::RoleRegistry;
use crate::stages::PreparedText;

const SPEAKER_PREVIEW_CHARS: usize = 200;
const TRANSCRIPT_PREVIEW_CHARS: usize = 500;

/// Identity of one analysis run
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub analysis_id: String,
    pub model_used: String,
}

impl RenderContext {
    pub fn new(model_used: impl Into<String>) -> Self {
        Self {
            analysis_id: Uuid::new_v4().to_string(),
            model_used: model_used.into(),
        }
    }
}

/// A finished document-level analysis
#[derive(Debug, Clone)]
pub struct DocumentAnalysis {
    pub aggregate: AggregateResult,
    pub prepared: PreparedText,
    pub strategy: ChunkStrategy,
}

/// One speaker segment with its scored chunks
#[derive(Debug, Clone)]
pub struct SegmentAnalysis {
    pub segment: SpeakerSegment,
    pub assignment: RoleAssignment,
    pub results: Vec<ChunkResult>,
}

/// A finished per-speaker analysis
#[derive(Debug, Clone)]
pub struct TranscriptAnalysis {
    pub segments: Vec<SegmentAnalysis>,
    /// Aggregate over every chunk of every speaker, role-weighted
    pub aggregate: AggregateResult,
    pub roles: RoleRegistry,
    pub strategy: ChunkStrategy,
}

fn document_metadata(analysis: &DocumentAnalysis, ctx: &RenderContext) -> DocumentMetadata {
    let aggregate = &analysis.aggregate;
    let total_chunks = aggregate.chunk_results.len();
    let text_length = analysis.prepared.original_length;

    DocumentMetadata {
        analysis_id: ctx.analysis_id.clone(),
        total_chunks,
        failed_chunks: aggregate.failed_chunks(),
        text_length,
        processed_text_length: analysis.prepared.processed_length(),
        text_modified: analysis.prepared.text_modified,
        avg_chunk_size: if total_chunks == 0 {
            0
        } else {
            (text_length as f64 / total_chunks as f64).round() as usize
        },
        model_used: ctx.model_used.clone(),
        avg_confidence: aggregate.avg_confidence(),
        avg_entropy: aggregate.avg_entropy(),
        chunking_strategy: analysis.strategy,
    }
}

/// Render the document-level `analyze` result
pub fn render_document(analysis: DocumentAnalysis, ctx: &RenderContext) -> DocumentReport {
    let metadata = document_metadata(&analysis, ctx);
    let aggregate = analysis.aggregate;

    DocumentReport {
        overall_sentiment: aggregate.overall_sentiment,
        sentiments: aggregate.chunk_results,
        summary: aggregate.summary,
        metadata,
    }
}

/// Render the per-speaker `analyze` result
pub fn render_speakers(
    analysis: TranscriptAnalysis,
    summary_config: &SummaryConfig,
    ctx: &RenderContext,
) -> SpeakerReport {
    let speaker_analysis = analysis
        .segments
        .iter()
        .map(|s| render_segment(s, summary_config))
        .collect();

    let mut speaker_weights = BTreeMap::new();
    let mut speaker_roles = BTreeMap::new();
    let mut role_statistics: BTreeMap<SpeakerRole, RoleStatistics> = BTreeMap::new();

    for (speaker, assignment) in analysis.roles.iter() {
        speaker_weights.insert(speaker.to_string(), assignment.weight);
        speaker_roles.insert(speaker.to_string(), assignment.role);

        let stats = role_statistics
            .entry(assignment.role)
            .or_insert_with(|| RoleStatistics {
                count: 0,
                avg_weight: 0.0,
                speakers: Vec::new(),
            });
        stats.count += 1;
        // Running sum, divided below
        stats.avg_weight += assignment.weight;
        stats.speakers.push(speaker.to_string());
    }
    for stats in role_statistics.values_mut() {
        stats.avg_weight /= stats.count as f64;
    }

    let aggregate = analysis.aggregate;
    let metadata = SpeakerMetadata {
        analysis_id: ctx.analysis_id.clone(),
        analysis_type: "per_speaker_weighted",
        total_speakers: analysis.segments.len(),
        total_chunks: aggregate.chunk_results.len(),
        failed_chunks: aggregate.failed_chunks(),
        model_used: ctx.model_used.clone(),
        chunking_strategy: analysis.strategy,
        ceo_cfo_detected: analysis.roles.has_role(SpeakerRole::Ceo)
            || analysis.roles.has_role(SpeakerRole::Cfo),
        analyst_detected: analysis.roles.has_role(SpeakerRole::Analyst),
        avg_confidence: aggregate.avg_confidence(),
        avg_entropy: aggregate.avg_entropy(),
    };

    SpeakerReport {
        speaker_analysis,
        overall_sentiment: aggregate.overall_sentiment,
        sentiments: aggregate.chunk_results,
        summary: aggregate.summary,
        speaker_weights,
        speaker_roles,
        role_statistics,
        metadata,
    }
}

fn render_segment(segment: &SegmentAnalysis, summary_config: &SummaryConfig) -> SpeakerAnalysis {
    let overall = aggregate_sentiment(&segment.results, None);
    let summary = generate_summary(&segment.results, summary_config);

    SpeakerAnalysis {
        speaker: segment.segment.speaker.clone(),
        speaker_role: segment.assignment.role,
        speaker_weight: segment.assignment.weight,
        text_preview: truncate_excerpt(&segment.segment.text, SPEAKER_PREVIEW_CHARS),
        sentiment_analysis: SegmentSentiment {
            overall_sentiment: overall,
            weighted_sentiment: overall * segment.assignment.weight,
            sentiment_distribution: summary.sentiment_distribution,
            confidence: summary.confidence_metrics.avg_confidence,
            entropy: mean(segment.results.iter().map(|r| r.entropy)),
        },
        word_count: segment.segment.word_count(),
        chunk_count: segment.results.len(),
    }
}

/// Render the `audio_transcript` result
pub fn render_audio_transcript(
    analysis: DocumentAnalysis,
    transcript: &str,
    company: &str,
    ticker: &str,
    timestamp: DateTime<Utc>,
    ctx: &RenderContext,
) -> AudioTranscriptReport {
    let metadata = AudioMetadata {
        document: document_metadata(&analysis, ctx),
        analysis_type: "audio_transcript",
        transcript_length: transcript.chars().count(),
        timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
    };
    let aggregate = analysis.aggregate;

    AudioTranscriptReport {
        company: company.to_string(),
        ticker: ticker.to_string(),
        transcript_preview: truncate_excerpt(transcript, TRANSCRIPT_PREVIEW_CHARS),
        overall_sentiment: aggregate.overall_sentiment,
        summary: aggregate.summary,
        metadata,
    }
}

/// Render the `historical` result
pub fn render_historical(
    analysis: DocumentAnalysis,
    transcript: &str,
    ticker: &str,
    year: i32,
    quarter: u32,
    ctx: &RenderContext,
) -> HistoricalReport {
    let metadata = document_metadata(&analysis, ctx);
    let aggregate = analysis.aggregate;

    HistoricalReport {
        ticker: ticker.to_string(),
        year,
        quarter,
        transcript: transcript.to_string(),
        overall_sentiment: aggregate.overall_sentiment,
        summary: aggregate.summary.into(),
        sentiments: aggregate.chunk_results,
        metadata,
    }
}
