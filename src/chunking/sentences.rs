/// Lazy sentence-packing chunker.
///
/// Splits on ". " boundaries and greedily packs whole sentences into chunks
/// of at most `max_chars` characters. A sentence is never split, so a single
/// sentence longer than the budget becomes its own oversized chunk. Chunks
/// are trimmed slices of the input, in order and without overlap.
#[derive(Debug, Clone)]
pub struct SentenceChunks<'a> {
    text: &'a str,
    pos: usize,
    max_chars: usize,
}

impl<'a> SentenceChunks<'a> {
    pub fn new(text: &'a str, max_chars: usize) -> Self {
        Self {
            text,
            pos: 0,
            max_chars: max_chars.max(1),
        }
    }

    /// End of the sentence starting at `from` and where the next one begins
    fn next_sentence(&self, from: usize) -> (usize, usize) {
        match self.text[from..].find(". ") {
            Some(idx) => (from + idx + 1, from + idx + 2),
            None => (self.text.len(), self.text.len()),
        }
    }
}

impl<'a> Iterator for SentenceChunks<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        // Skip whitespace left between chunks
        let rest = &self.text[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();

        if self.pos >= self.text.len() {
            return None;
        }

        let chunk_start = self.pos;
        let mut chunk_end = chunk_start;
        let mut cursor = chunk_start;

        while cursor < self.text.len() {
            let (sentence_end, next_start) = self.next_sentence(cursor);
            let first = chunk_end == chunk_start;
            let candidate_len = self.text[chunk_start..sentence_end].chars().count();

            if !first && candidate_len > self.max_chars {
                break;
            }

            chunk_end = sentence_end;
            cursor = next_start;
        }

        self.pos = cursor;
        let chunk = self.text[chunk_start..chunk_end].trim();

        if chunk.is_empty() {
            self.next()
        } else {
            Some(chunk.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_whitespace_input() {
        assert_eq!(SentenceChunks::new("", 100).count(), 0);
        assert_eq!(SentenceChunks::new("   \n\t ", 100).count(), 0);
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunks: Vec<String> = SentenceChunks::new("  Revenue grew. Margins held.  ", 100).collect();
        assert_eq!(chunks, vec!["Revenue grew. Margins held."]);
    }

    #[test]
    fn test_packs_sentences_greedily() {
        let text = "One two. Three four. Five six. Seven.";
        let chunks: Vec<String> = SentenceChunks::new(text, 20).collect();
        assert_eq!(chunks, vec!["One two. Three four.", "Five six. Seven."]);
    }

    #[test]
    fn test_long_sentence_is_not_split() {
        let text = "Short one. This sentence is much longer than the budget allows. End.";
        let chunks: Vec<String> = SentenceChunks::new(text, 12).collect();
        assert_eq!(
            chunks,
            vec![
                "Short one.",
                "This sentence is much longer than the budget allows.",
                "End."
            ]
        );
    }

    #[test]
    fn test_round_trip_reconstructs_text() {
        let text = "Our revenue grew twelve percent. Operating margin expanded. \
                    Guidance is raised for the full year. Cash flow remained strong.";
        let chunks: Vec<String> = SentenceChunks::new(text, 60).collect();
        assert!(chunks.len() > 1);
        assert_eq!(chunks.join(" "), text);
    }

    #[test]
    fn test_restartable() {
        let chunks = SentenceChunks::new("A b. C d. E f.", 5);
        let first: Vec<String> = chunks.clone().collect();
        let second: Vec<String> = chunks.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_multibyte_text_counts_chars() {
        let text = "Umsatz stieg über Plan. Marge wächst.";
        let chunks: Vec<String> = SentenceChunks::new(text, 23).collect();
        assert_eq!(chunks, vec!["Umsatz stieg über Plan.", "Marge wächst."]);
    }
}
