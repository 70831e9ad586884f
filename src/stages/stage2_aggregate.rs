use std::collections::HashMap;

use tracing::info;

use crate::aggregate::{aggregate_sentiment, generate_summary, SummaryConfig};
use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{AggregateResult, ChunkResult};

/// Execute Stage 2: roll chunk results up into an overall judgment
///
/// Fails when there is nothing to aggregate: no chunks at all, or only
/// chunks that could not be scored.
pub fn execute_stage2(
    results: Vec<ChunkResult>,
    speaker_weights: Option<&HashMap<String, f64>>,
    config: &SummaryConfig,
) -> AnalysisResult<AggregateResult> {
    if results.is_empty() {
        return Err(AnalysisError::NoChunks);
    }

    let failed = results.iter().filter(|r| r.is_error()).count();
    if failed == results.len() {
        return Err(AnalysisError::AllChunksFailed { failed });
    }

    let overall_sentiment = aggregate_sentiment(&results, speaker_weights);
    let summary = generate_summary(&results, config);

    info!(
        "Stage 2: overall sentiment {:.3} over {} chunks ({} failed)",
        overall_sentiment,
        results.len(),
        failed
    );

    Ok(AggregateResult {
        overall_sentiment,
        chunk_results: results,
        summary,
    })
}
