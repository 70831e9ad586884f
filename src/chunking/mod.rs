pub mod sentences;
pub mod tokens;

pub use sentences::*;
pub use tokens::*;

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use serde::Serialize;
use tracing::{debug, warn};

/// How text is cut into classifier-sized pieces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkStrategy {
    /// Token windows sized to the classifier's input limit
    Tokens,
    /// Whole sentences packed into a character budget
    Sentences,
}

/// Configuration for chunking
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    /// Token ids per window, leaving room for two boundary markers
    pub max_tokens: usize,
    /// Hard input limit of the classifier including boundary markers
    pub hard_token_limit: usize,
    /// Ids shared between consecutive windows
    pub overlap_tokens: usize,
    /// Ids dropped from a window that still exceeds the hard limit
    pub truncate_step: usize,
    /// Character budget for sentence packing
    pub max_chars: usize,
    /// Character budget used when token chunking fails
    pub fallback_max_chars: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_tokens: 510,
            hard_token_limit: 512,
            overlap_tokens: 50,
            truncate_step: 20,
            max_chars: 1000,
            fallback_max_chars: 1500,
        }
    }
}

/// Splits text into chunks, token-aware when a tokenizer is available
#[derive(Clone)]
pub struct Chunker {
    config: ChunkerConfig,
    tokenizer: Option<Arc<dyn TokenCodec>>,
}

/// Load a Hugging Face `tokenizer.json` file
pub fn load_tokenizer(path: &Path) -> Result<Arc<dyn TokenCodec>> {
    let tokenizer = tokenizers::Tokenizer::from_file(path)
        .map_err(|e| anyhow!("Failed to load tokenizer from {:?}: {}", path, e))?;
    Ok(Arc::new(tokenizer))
}

impl Chunker {
    /// Sentence-packing chunker
    pub fn new(config: ChunkerConfig) -> Self {
        Self {
            config,
            tokenizer: None,
        }
    }

    /// Token-aware chunker using the given tokenizer
    pub fn with_tokenizer(config: ChunkerConfig, tokenizer: Arc<dyn TokenCodec>) -> Self {
        Self {
            config,
            tokenizer: Some(tokenizer),
        }
    }

    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Strategy used when tokenization succeeds
    pub fn preferred_strategy(&self) -> ChunkStrategy {
        if self.tokenizer.is_some() {
            ChunkStrategy::Tokens
        } else {
            ChunkStrategy::Sentences
        }
    }

    /// Lazily chunk `text`.
    ///
    /// Falls back to sentence packing with the fallback budget when the
    /// tokenizer cannot encode the text.
    pub fn chunks<'a>(&'a self, text: &'a str) -> Chunks<'a> {
        let Some(tokenizer) = self.tokenizer.as_deref() else {
            return Chunks::Sentences(SentenceChunks::new(text, self.config.max_chars));
        };

        match TokenChunks::new(text, tokenizer, &self.config) {
            Ok(chunks) => {
                debug!("Token chunking {} ids", chunks.token_count());
                Chunks::Tokens(chunks)
            }
            Err(e) => {
                warn!("Token chunking failed, falling back to sentences: {}", e);
                Chunks::Sentences(SentenceChunks::new(text, self.config.fallback_max_chars))
            }
        }
    }
}

/// A lazy, restartable sequence of chunks
#[derive(Clone)]
pub enum Chunks<'a> {
    Tokens(TokenChunks<'a>),
    Sentences(SentenceChunks<'a>),
}

impl Chunks<'_> {
    pub fn strategy(&self) -> ChunkStrategy {
        match self {
            Chunks::Tokens(_) => ChunkStrategy::Tokens,
            Chunks::Sentences(_) => ChunkStrategy::Sentences,
        }
    }
}

impl Iterator for Chunks<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        match self {
            Chunks::Tokens(chunks) => chunks.next(),
            Chunks::Sentences(chunks) => chunks.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::tokens::tests::WordCodec;

    struct BrokenCodec;

    impl TokenCodec for BrokenCodec {
        fn encode(&self, _text: &str, _add_special_tokens: bool) -> Result<Vec<u32>> {
            Err(anyhow!("tokenizer unavailable"))
        }

        fn decode(&self, _ids: &[u32]) -> Result<String> {
            Err(anyhow!("tokenizer unavailable"))
        }
    }

    #[test]
    fn test_default_config() {
        let config = ChunkerConfig::default();
        assert_eq!(config.max_tokens, 510);
        assert_eq!(config.hard_token_limit, 512);
        assert_eq!(config.truncate_step, 20);
    }

    #[test]
    fn test_sentence_chunker_without_tokenizer() {
        let chunker = Chunker::new(ChunkerConfig::default());
        let chunks = chunker.chunks("Revenue grew. Margins held.");
        assert_eq!(chunks.strategy(), ChunkStrategy::Sentences);
        assert_eq!(chunks.count(), 1);
    }

    #[test]
    fn test_token_chunker_with_tokenizer() {
        let config = ChunkerConfig {
            max_tokens: 3,
            hard_token_limit: 5,
            overlap_tokens: 0,
            ..Default::default()
        };
        let chunker = Chunker::with_tokenizer(config, Arc::new(WordCodec));
        let chunks = chunker.chunks("w1 w2 w3 w4");
        assert_eq!(chunks.strategy(), ChunkStrategy::Tokens);
        assert_eq!(chunks.collect::<Vec<_>>(), vec!["w1 w2 w3", "w4"]);
    }

    #[test]
    fn test_tokenizer_failure_falls_back_to_sentences() {
        let config = ChunkerConfig {
            fallback_max_chars: 10,
            ..Default::default()
        };
        let chunker = Chunker::with_tokenizer(config, Arc::new(BrokenCodec));
        let chunks = chunker.chunks("First one. Second one.");
        assert_eq!(chunks.strategy(), ChunkStrategy::Sentences);
        assert_eq!(chunks.collect::<Vec<_>>(), vec!["First one.", "Second one."]);
    }

    #[test]
    fn test_chunks_can_be_restarted() {
        let chunker = Chunker::new(ChunkerConfig {
            max_chars: 9,
            ..Default::default()
        });
        let first: Vec<String> = chunker.chunks("A b. C d. E f.").collect();
        let second: Vec<String> = chunker.chunks("A b. C d. E f.").collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }
}
