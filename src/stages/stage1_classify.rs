use std::time::Duration;

use anyhow::{anyhow, Result};
use tracing::{info, warn};

use crate::classifier::SentimentClassifier;
use crate::models::{ChunkResult, ProbabilityTriple};
use crate::scoring::score_chunk;

/// Configuration for Stage 1
#[derive(Debug, Clone)]
pub struct Stage1Config {
    /// Upper bound on a single classifier call
    pub chunk_timeout: Duration,
}

impl Default for Stage1Config {
    fn default() -> Self {
        Self {
            chunk_timeout: Duration::from_secs(30),
        }
    }
}

/// Result of Stage 1 processing
#[derive(Debug)]
pub struct Stage1Result {
    /// One result per chunk, in chunk order
    pub results: Vec<ChunkResult>,
    /// Number of chunks that fell back to a neutral failure result
    pub failed: usize,
}

/// Execute Stage 1: classify and score each chunk
///
/// Chunks are processed strictly in order. A classifier error, timeout or
/// unusable distribution only fails that chunk. Chunk ids start at
/// `first_chunk_id` and increase by one.
pub async fn execute_stage1(
    classifier: &dyn SentimentClassifier,
    chunks: &[String],
    first_chunk_id: usize,
    config: &Stage1Config,
) -> Stage1Result {
    let mut results = Vec::with_capacity(chunks.len());
    let mut failed = 0;

    for (offset, chunk) in chunks.iter().enumerate() {
        let chunk_id = first_chunk_id + offset;

        let result = match classify_chunk(classifier, chunk, config).await {
            Ok(triple) => score_chunk(chunk_id, chunk, &triple),
            Err(e) => {
                warn!("Chunk {} failed: {}", chunk_id, e);
                ChunkResult::failed(chunk_id, chunk.as_str(), e.to_string())
            }
        };

        if result.is_error() {
            failed += 1;
        }
        results.push(result);
    }

    info!(
        "Stage 1: Classified {} chunks ({} failed)",
        results.len(),
        failed
    );

    Stage1Result { results, failed }
}

/// Classify a single chunk within the timeout
async fn classify_chunk(
    classifier: &dyn SentimentClassifier,
    chunk: &str,
    config: &Stage1Config,
) -> Result<ProbabilityTriple> {
    let output = tokio::time::timeout(config.chunk_timeout, classifier.classify(chunk))
        .await
        .map_err(|_| {
            anyhow!(
                "Classifier call timed out after {:?}",
                config.chunk_timeout
            )
        })??;

    output.into_triple()
}
