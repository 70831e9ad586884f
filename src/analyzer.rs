use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use crate::aggregate::SummaryConfig;
use crate::chunking::{ChunkStrategy, Chunker, ChunkerConfig, TokenCodec};
use crate::classifier::SentimentClassifier;
use crate::error::{AnalysisError, AnalysisResult};
use crate::io::{
    Action, AnalysisRequest, ErrorKind, ErrorPayload, InspectReport, InspectSegment, Report,
};
use crate::models::ChunkResult;
use crate::speakers::{segment_transcript, RoleRegistry};
use crate::stages::{
    execute_stage0, execute_stage1, execute_stage2, prepare_text, render_audio_transcript,
    render_document, render_historical, render_speakers, DocumentAnalysis, RenderContext,
    SegmentAnalysis, Stage1Config, TranscriptAnalysis,
};

/// Configuration for a sentiment analyzer
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub chunker: ChunkerConfig,
    /// Intensify financial vocabulary before classification
    pub preprocess: bool,
    /// Upper bound on a single classifier call
    pub chunk_timeout: Duration,
    pub summary: SummaryConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            chunker: ChunkerConfig::default(),
            preprocess: true,
            chunk_timeout: Duration::from_secs(30),
            summary: SummaryConfig::default(),
        }
    }
}

/// Runs analysis requests against an injected classifier
pub struct SentimentAnalyzer {
    classifier: Arc<dyn SentimentClassifier>,
    chunker: Chunker,
    config: AnalyzerConfig,
}

impl SentimentAnalyzer {
    /// Analyzer that packs sentences into character-budgeted chunks
    pub fn new(classifier: Arc<dyn SentimentClassifier>, config: AnalyzerConfig) -> Self {
        Self {
            classifier,
            chunker: Chunker::new(config.chunker.clone()),
            config,
        }
    }

    /// Analyzer that cuts token windows with the given tokenizer
    pub fn with_tokenizer(
        classifier: Arc<dyn SentimentClassifier>,
        tokenizer: Arc<dyn TokenCodec>,
        config: AnalyzerConfig,
    ) -> Self {
        Self {
            classifier,
            chunker: Chunker::with_tokenizer(config.chunker.clone(), tokenizer),
            config,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    fn stage1_config(&self) -> Stage1Config {
        Stage1Config {
            chunk_timeout: self.config.chunk_timeout,
        }
    }

    /// Classify `text` as one document
    pub async fn analyze_document(&self, text: &str) -> AnalysisResult<DocumentAnalysis> {
        let prepared = prepare_text(text, self.config.preprocess)?;
        let chunks = execute_stage0(&self.chunker, &prepared);
        if chunks.chunks.is_empty() {
            return Err(AnalysisError::NoChunks);
        }

        info!("Analyzing document: {} chunks", chunks.chunks.len());

        let stage1 = execute_stage1(
            self.classifier.as_ref(),
            &chunks.chunks,
            1,
            &self.stage1_config(),
        )
        .await;
        let aggregate = execute_stage2(stage1.results, None, &self.config.summary)?;

        Ok(DocumentAnalysis {
            aggregate,
            prepared,
            strategy: chunks.strategy,
        })
    }

    /// Classify `text` speaker by speaker, weighting each speaker by role.
    ///
    /// Returns `None` when no speaker announcement is found.
    pub async fn analyze_transcript(&self, text: &str) -> AnalysisResult<Option<TranscriptAnalysis>> {
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let segments = segment_transcript(text);
        if segments.is_empty() {
            return Ok(None);
        }

        info!("Analyzing transcript: {} speaker segments", segments.len());

        let stage1_config = self.stage1_config();
        let mut roles = RoleRegistry::new();
        let mut strategy = self.chunker.preferred_strategy();
        let mut next_chunk_id = 1;
        let mut all_results: Vec<ChunkResult> = Vec::new();
        let mut analyses = Vec::with_capacity(segments.len());

        for segment in segments {
            let assignment = roles.assign(&segment.speaker, &segment.text);

            let prepared = match prepare_text(&segment.text, self.config.preprocess) {
                Ok(prepared) => prepared,
                Err(_) => continue,
            };
            let chunks = execute_stage0(&self.chunker, &prepared);
            if chunks.chunks.is_empty() {
                continue;
            }
            if chunks.strategy == ChunkStrategy::Sentences {
                strategy = ChunkStrategy::Sentences;
            }

            let stage1 = execute_stage1(
                self.classifier.as_ref(),
                &chunks.chunks,
                next_chunk_id,
                &stage1_config,
            )
            .await;
            next_chunk_id += stage1.results.len();

            let results: Vec<ChunkResult> = stage1
                .results
                .into_iter()
                .map(|r| r.with_speaker(&segment.speaker, assignment.role, assignment.weight))
                .collect();
            all_results.extend(results.iter().cloned());

            analyses.push(SegmentAnalysis {
                segment,
                assignment,
                results,
            });
        }

        let weights = roles.weights();
        let aggregate = execute_stage2(all_results, Some(&weights), &self.config.summary)?;

        Ok(Some(TranscriptAnalysis {
            segments: analyses,
            aggregate,
            roles,
            strategy,
        }))
    }

    /// Execute one request and render its JSON payload.
    ///
    /// Failures are rendered as error payloads rather than returned.
    pub async fn run(&self, request: &AnalysisRequest) -> Report {
        let ctx = RenderContext::new(self.classifier.model_name());

        match &request.action {
            Action::Analyze if request.options.per_speaker => {
                match self.analyze_transcript(&request.text).await {
                    Ok(Some(analysis)) => {
                        Report::Speakers(render_speakers(analysis, &self.config.summary, &ctx))
                    }
                    Ok(None) => {
                        info!("No speakers detected, analyzing as a document");
                        self.run_document(&request.text, &ctx).await
                    }
                    Err(e) => failure(&e, ErrorKind::SpeakerAnalysisError),
                }
            }
            Action::Analyze => self.run_document(&request.text, &ctx).await,
            Action::AudioTranscript => match self.analyze_document(&request.transcript).await {
                Ok(analysis) => Report::AudioTranscript(render_audio_transcript(
                    analysis,
                    &request.transcript,
                    &request.company,
                    &request.ticker,
                    Utc::now(),
                    &ctx,
                )),
                Err(e) => failure(&e, ErrorKind::AudioProcessingError),
            },
            Action::Historical => match self.analyze_document(&request.transcript).await {
                Ok(analysis) => Report::Historical(render_historical(
                    analysis,
                    &request.transcript,
                    &request.ticker,
                    request.year,
                    request.quarter,
                    &ctx,
                )),
                Err(e) => failure(&e, ErrorKind::HistoricalProcessingError),
            },
            Action::Unknown(action) => failure(
                &AnalysisError::invalid_request(format!("Unknown action: {}", action)),
                ErrorKind::InvalidRequest,
            ),
        }
    }

    async fn run_document(&self, text: &str, ctx: &RenderContext) -> Report {
        match self.analyze_document(text).await {
            Ok(analysis) => Report::Document(render_document(analysis, ctx)),
            Err(e) => failure(&e, ErrorKind::TextAnalysisError),
        }
    }

    /// Segment, assign roles and chunk without calling the classifier
    pub fn inspect(&self, text: &str) -> InspectReport {
        let segments = segment_transcript(text);
        let mut roles = RoleRegistry::new();
        let mut strategy = self.chunker.preferred_strategy();

        let mut chunk_count = |text: &str| -> usize {
            match prepare_text(text, self.config.preprocess) {
                Ok(prepared) => {
                    let chunks = execute_stage0(&self.chunker, &prepared);
                    if chunks.strategy == ChunkStrategy::Sentences {
                        strategy = ChunkStrategy::Sentences;
                    }
                    chunks.chunks.len()
                }
                Err(_) => 0,
            }
        };

        let document_chunks = if segments.is_empty() {
            chunk_count(text)
        } else {
            0
        };

        let segments: Vec<InspectSegment> = segments
            .into_iter()
            .map(|segment| {
                let assignment = roles.assign(&segment.speaker, &segment.text);
                let chunks = chunk_count(&segment.text);
                InspectSegment {
                    segment,
                    role: assignment.role,
                    weight: assignment.weight,
                    chunks,
                }
            })
            .collect();

        InspectReport {
            segments,
            strategy,
            document_chunks,
        }
    }
}

fn failure(err: &AnalysisError, action_kind: ErrorKind) -> Report {
    warn!("Analysis failed: {}", err);
    Report::Error(ErrorPayload::from_analysis(err, action_kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::tokens::tests::WordCodec;
    use crate::classifier::tests::{FixedClassifier, ScriptedClassifier};
    use crate::io::parse_request;
    use crate::models::{SentimentLabel, SpeakerRole};

    const TRANSCRIPT: &str = "Operator preamble nobody announced.\n\
        John Smith - CEO:\n\
        We exceeded our guidance with strong momentum.\n\
        Analyst:\n\
        Could you comment on the decline in margins?\n";

    fn analyzer(classifier: impl SentimentClassifier + 'static) -> SentimentAnalyzer {
        SentimentAnalyzer::new(Arc::new(classifier), AnalyzerConfig::default())
    }

    #[tokio::test]
    async fn test_analyze_document() {
        let analyzer = analyzer(FixedClassifier::new(0.70, 0.10, 0.20));
        let analysis = analyzer
            .analyze_document("Revenue grew. Margins held.")
            .await
            .unwrap();

        assert_eq!(analysis.aggregate.chunk_results.len(), 1);
        assert_eq!(analysis.aggregate.chunk_results[0].label, SentimentLabel::Positive);
        assert!(analysis.aggregate.overall_sentiment > 0.0);
        assert_eq!(analysis.strategy, ChunkStrategy::Sentences);
    }

    #[tokio::test]
    async fn test_empty_document_is_an_input_error() {
        let analyzer = analyzer(FixedClassifier::new(0.70, 0.10, 0.20));
        let err = analyzer.analyze_document("   ").await.unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyInput));
    }

    #[tokio::test]
    async fn test_transcript_weights_speakers_by_role() {
        let analyzer = analyzer(ScriptedClassifier);
        let analysis = analyzer.analyze_transcript(TRANSCRIPT).await.unwrap().unwrap();

        assert_eq!(analysis.segments.len(), 2);
        assert_eq!(analysis.segments[0].assignment.role, SpeakerRole::Ceo);
        assert_eq!(analysis.segments[1].assignment.weight, 0.8);

        let results = &analysis.aggregate.chunk_results;
        let ids: Vec<usize> = results.iter().map(|r| r.chunk_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(results[0].speaker.as_deref(), Some("John Smith - CEO"));
        assert_eq!(results[0].speaker_weight, Some(1.5));
        assert_eq!(results[1].label, SentimentLabel::Negative);

        // Positive CEO outweighs the negative analyst
        assert!(analysis.aggregate.overall_sentiment > 0.0);
    }

    #[tokio::test]
    async fn test_transcript_without_speakers() {
        let analyzer = analyzer(ScriptedClassifier);
        let analysis = analyzer
            .analyze_transcript("Just one paragraph of prose.")
            .await
            .unwrap();
        assert!(analysis.is_none());
    }

    #[tokio::test]
    async fn test_run_per_speaker_request() {
        let analyzer = analyzer(ScriptedClassifier);
        let request = AnalysisRequest {
            text: TRANSCRIPT.to_string(),
            options: crate::io::AnalysisOptions { per_speaker: true },
            ..Default::default()
        };

        let json = serde_json::to_value(analyzer.run(&request).await).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["speaker_analysis"].as_array().unwrap().len(), 2);
        assert_eq!(json["speaker_weights"]["John Smith - CEO"], 1.5);
        assert_eq!(json["metadata"]["analyst_detected"], true);
    }

    #[tokio::test]
    async fn test_run_per_speaker_falls_back_to_document() {
        let analyzer = analyzer(ScriptedClassifier);
        let request =
            parse_request(r#"{"text": "Flat quarter overall.", "options": {"per_speaker": true}}"#)
                .unwrap();

        let report = analyzer.run(&request).await;
        assert!(matches!(report, Report::Document(_)));
    }

    #[tokio::test]
    async fn test_run_reports_error_types() {
        let analyzer = analyzer(ScriptedClassifier);

        let empty = parse_request(r#"{"action": "analyze", "text": ""}"#).unwrap();
        let json = serde_json::to_value(analyzer.run(&empty).await).unwrap();
        assert_eq!(json["type"], "input_error");

        let unknown = parse_request(r#"{"action": "forecast"}"#).unwrap();
        let json = serde_json::to_value(analyzer.run(&unknown).await).unwrap();
        assert_eq!(json["type"], "invalid_request");
        assert_eq!(json["error"], "Unknown action: forecast");

        let failing = parse_request(r#"{"action": "historical", "transcript": "FAIL"}"#).unwrap();
        let json = serde_json::to_value(analyzer.run(&failing).await).unwrap();
        assert_eq!(json["type"], "historical_processing_error");
        assert_eq!(json["error"], "No valid sentiment analysis results");
    }

    #[tokio::test]
    async fn test_run_audio_transcript() {
        let analyzer = analyzer(ScriptedClassifier);
        let request = parse_request(
            r#"{"action": "audio_transcript", "transcript": "Revenue exceeded plan.", "company": "Acme", "ticker": "ACME"}"#,
        )
        .unwrap();

        let json = serde_json::to_value(analyzer.run(&request).await).unwrap();
        assert_eq!(json["company"], "Acme");
        assert_eq!(json["metadata"]["analysis_type"], "audio_transcript");
        assert_eq!(json["metadata"]["model_used"], "scripted");
        assert!(json["overall_sentiment"].as_f64().unwrap() > 0.0);
    }

    #[tokio::test]
    async fn test_token_chunking_is_reported() {
        let classifier: Arc<dyn SentimentClassifier> = Arc::new(FixedClassifier::new(0.1, 0.1, 0.8));
        let analyzer = SentimentAnalyzer::with_tokenizer(
            classifier,
            Arc::new(WordCodec),
            AnalyzerConfig::default(),
        );
        let analysis = analyzer.analyze_document("w1 w2 w3").await.unwrap();
        assert_eq!(analysis.strategy, ChunkStrategy::Tokens);
    }

    #[test]
    fn test_inspect() {
        let analyzer = analyzer(ScriptedClassifier);
        let report = analyzer.inspect(TRANSCRIPT);
        assert_eq!(report.segments.len(), 2);
        assert_eq!(report.segments[0].role, SpeakerRole::Ceo);
        assert_eq!(report.segments[1].chunks, 1);
        assert!(report.format().contains("John Smith - CEO (CEO, weight 1.5)"));
    }
}
