use anyhow::{anyhow, Result};
use tracing::warn;

use super::ChunkerConfig;

/// Minimal tokenizer surface needed for token-budgeted chunking
pub trait TokenCodec: Send + Sync {
    /// Encode text into token ids, optionally with the model's boundary markers
    fn encode(&self, text: &str, add_special_tokens: bool) -> Result<Vec<u32>>;

    /// Decode token ids back into text, dropping boundary markers
    fn decode(&self, ids: &[u32]) -> Result<String>;
}

impl TokenCodec for tokenizers::Tokenizer {
    fn encode(&self, text: &str, add_special_tokens: bool) -> Result<Vec<u32>> {
        // Deref to the tokenizer implementation so the inherent method is used
        let encoding = (**self)
            .encode(text, add_special_tokens)
            .map_err(|e| anyhow!("Tokenizer encode failed: {e}"))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        (**self)
            .decode(ids, true)
            .map_err(|e| anyhow!("Tokenizer decode failed: {e}"))
    }
}

/// Lazy token-window chunker.
///
/// Windows hold at most `max_tokens` ids and consecutive windows share
/// `overlap_tokens` ids. A decoded window that re-encodes (with boundary
/// markers) past `hard_token_limit` is cut back by `truncate_step` ids.
#[derive(Clone)]
pub struct TokenChunks<'a> {
    codec: &'a dyn TokenCodec,
    ids: Vec<u32>,
    pos: usize,
    done: bool,
    max_tokens: usize,
    step: usize,
    hard_limit: usize,
    truncate_step: usize,
    whole_text: Option<String>,
}

impl<'a> TokenChunks<'a> {
    /// Tokenize `text` up front; fails when the tokenizer does.
    pub fn new(text: &str, codec: &'a dyn TokenCodec, config: &ChunkerConfig) -> Result<Self> {
        let trimmed = text.trim();
        let ids = if trimmed.is_empty() {
            Vec::new()
        } else {
            codec.encode(trimmed, false)?
        };

        let max_tokens = config.max_tokens.max(1);
        let overlap = config.overlap_tokens.min(max_tokens - 1);
        let whole_text = (!ids.is_empty() && ids.len() <= max_tokens).then(|| trimmed.to_string());

        Ok(Self {
            codec,
            done: ids.is_empty(),
            ids,
            pos: 0,
            max_tokens,
            step: max_tokens - overlap,
            hard_limit: config.hard_token_limit,
            truncate_step: config.truncate_step,
            whole_text,
        })
    }

    pub fn token_count(&self) -> usize {
        self.ids.len()
    }

    fn decode_window(&self, window: &[u32]) -> Option<String> {
        let text = match self.codec.decode(window) {
            Ok(text) => text,
            Err(e) => {
                warn!("Skipping token window at {}: {}", self.pos, e);
                return None;
            }
        };

        let verified = match self.codec.encode(&text, true) {
            Ok(ids) if ids.len() > self.hard_limit => {
                let keep = window.len().saturating_sub(self.truncate_step).max(1);
                self.codec.decode(&window[..keep]).unwrap_or(text)
            }
            _ => text,
        };

        let verified = verified.trim().to_string();
        (!verified.is_empty()).then_some(verified)
    }
}

impl<'a> Iterator for TokenChunks<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if let Some(text) = self.whole_text.take() {
            self.done = true;
            return Some(text);
        }

        while !self.done {
            let end = (self.pos + self.max_tokens).min(self.ids.len());
            let chunk = self.decode_window(&self.ids[self.pos..end]);

            if end >= self.ids.len() {
                self.done = true;
            } else {
                self.pos += self.step;
            }

            if chunk.is_some() {
                return chunk;
            }
        }

        None
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// One token per whitespace-separated word; boundary markers add two ids
    pub(crate) struct WordCodec;

    impl TokenCodec for WordCodec {
        fn encode(&self, text: &str, add_special_tokens: bool) -> Result<Vec<u32>> {
            let mut ids: Vec<u32> = text
                .split_whitespace()
                .map(|w| w.trim_start_matches('w').parse::<u32>().unwrap_or(0))
                .collect();
            if add_special_tokens {
                ids.insert(0, u32::MAX);
                ids.push(u32::MAX);
            }
            Ok(ids)
        }

        fn decode(&self, ids: &[u32]) -> Result<String> {
            Ok(ids
                .iter()
                .filter(|&&id| id != u32::MAX)
                .map(|id| format!("w{id}"))
                .collect::<Vec<_>>()
                .join(" "))
        }
    }

    struct FailingCodec;

    impl TokenCodec for FailingCodec {
        fn encode(&self, _text: &str, _add_special_tokens: bool) -> Result<Vec<u32>> {
            Err(anyhow!("no vocabulary"))
        }

        fn decode(&self, _ids: &[u32]) -> Result<String> {
            Err(anyhow!("no vocabulary"))
        }
    }

    fn words(range: std::ops::Range<u32>) -> String {
        range.map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    fn config(max_tokens: usize, overlap_tokens: usize, hard_token_limit: usize) -> ChunkerConfig {
        ChunkerConfig {
            max_tokens,
            overlap_tokens,
            hard_token_limit,
            truncate_step: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_short_text_is_returned_verbatim() {
        let codec = WordCodec;
        let chunks: Vec<String> = TokenChunks::new("  w1 w2 w3 ", &codec, &config(10, 2, 12))
            .unwrap()
            .collect();
        assert_eq!(chunks, vec!["w1 w2 w3"]);
    }

    #[test]
    fn test_windows_overlap() {
        let codec = WordCodec;
        let text = words(0..10);
        let chunks: Vec<String> = TokenChunks::new(&text, &codec, &config(4, 1, 6))
            .unwrap()
            .collect();
        assert_eq!(
            chunks,
            vec!["w0 w1 w2 w3", "w3 w4 w5 w6", "w6 w7 w8 w9"]
        );
    }

    #[test]
    fn test_windows_stop_at_end_of_stream() {
        let codec = WordCodec;
        let text = words(0..9);
        let chunks: Vec<String> = TokenChunks::new(&text, &codec, &config(4, 0, 6))
            .unwrap()
            .collect();
        assert_eq!(chunks, vec!["w0 w1 w2 w3", "w4 w5 w6 w7", "w8"]);
    }

    #[test]
    fn test_window_over_hard_limit_is_truncated() {
        let codec = WordCodec;
        let text = words(0..8);
        // Four ids plus two markers exceeds a hard limit of 5
        let chunks: Vec<String> = TokenChunks::new(&text, &codec, &config(4, 0, 5))
            .unwrap()
            .collect();
        assert_eq!(chunks, vec!["w0 w1", "w4 w5"]);
    }

    #[test]
    fn test_round_trip_without_overlap() {
        let codec = WordCodec;
        let text = words(0..12);
        let chunks: Vec<String> = TokenChunks::new(&text, &codec, &config(8, 0, 10))
            .unwrap()
            .collect();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks.join(" "), text);
    }

    #[test]
    fn test_empty_text() {
        let codec = WordCodec;
        assert_eq!(TokenChunks::new("   ", &codec, &config(4, 1, 6)).unwrap().count(), 0);
    }

    #[test]
    fn test_encode_failure_is_reported() {
        let codec = FailingCodec;
        assert!(TokenChunks::new("w1 w2", &codec, &config(4, 1, 6)).is_err());
    }
}
