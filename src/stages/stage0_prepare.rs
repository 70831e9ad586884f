use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::chunking::{ChunkStrategy, Chunker};
use crate::error::{AnalysisError, AnalysisResult};

/// Financial terms intensified when the text carries a positive cue
const POSITIVE_TERMS: &[(&str, &str)] = &[
    ("growth", "strong growth"),
    ("increase", "significant increase"),
    ("revenue", "solid revenue"),
    ("profit", "strong profit"),
    ("margin", "healthy margin"),
    ("beat", "exceeded"),
    ("outperform", "significantly outperform"),
    ("expansion", "successful expansion"),
    ("opportunity", "great opportunity"),
];

/// Financial terms intensified when the text carries a negative cue
const NEGATIVE_TERMS: &[(&str, &str)] = &[
    ("decline", "significant decline"),
    ("decrease", "notable decrease"),
    ("loss", "concerning loss"),
    ("miss", "missed expectations"),
    ("underperform", "underperformed significantly"),
    ("challenge", "serious challenge"),
    ("risk", "significant risk"),
    ("pressure", "intense pressure"),
];

const POSITIVE_CUES: &[&str] = &["good", "better", "improved", "strong", "solid"];
const NEGATIVE_CUES: &[&str] = &["concern", "worry", "problem", "weak", "poor"];

struct TermRule {
    pattern: Regex,
    replacement: &'static str,
}

static POSITIVE_RULES: OnceLock<Vec<TermRule>> = OnceLock::new();
static NEGATIVE_RULES: OnceLock<Vec<TermRule>> = OnceLock::new();

fn compile_rules(terms: &[(&str, &'static str)]) -> Vec<TermRule> {
    terms
        .iter()
        .map(|&(term, replacement)| TermRule {
            pattern: Regex::new(&format!(r"\b{}\b", regex::escape(term)))
                .expect("term regex must compile"),
            replacement,
        })
        .collect()
}

fn apply_rules(text: String, rules: &[TermRule]) -> String {
    rules.iter().fold(text, |acc, rule| {
        rule.pattern.replace_all(&acc, rule.replacement).into_owned()
    })
}

/// Intensify financial vocabulary so the classifier leans off neutral.
///
/// Positive terms are rewritten only when a positive cue appears anywhere in
/// the text, negative terms only with a negative cue. Only whole, lowercase
/// words are replaced.
pub fn preprocess_financial_text(text: &str) -> String {
    let lower = text.to_lowercase();
    let mut processed = text.to_string();

    if POSITIVE_CUES.iter().any(|cue| lower.contains(cue)) {
        let rules = POSITIVE_RULES.get_or_init(|| compile_rules(POSITIVE_TERMS));
        processed = apply_rules(processed, rules);
    }
    if NEGATIVE_CUES.iter().any(|cue| lower.contains(cue)) {
        let rules = NEGATIVE_RULES.get_or_init(|| compile_rules(NEGATIVE_TERMS));
        processed = apply_rules(processed, rules);
    }

    processed
}

/// Text ready for chunking
#[derive(Debug, Clone)]
pub struct PreparedText {
    /// Text sent to the classifier
    pub text: String,
    /// Character count of the input before preprocessing
    pub original_length: usize,
    /// Whether preprocessing changed anything
    pub text_modified: bool,
}

impl PreparedText {
    pub fn processed_length(&self) -> usize {
        self.text.chars().count()
    }
}

/// Validate and optionally preprocess input text
pub fn prepare_text(text: &str, preprocess: bool) -> AnalysisResult<PreparedText> {
    if text.trim().is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    let processed = if preprocess {
        preprocess_financial_text(text)
    } else {
        text.to_string()
    };
    let text_modified = processed != text;
    if text_modified {
        debug!("Preprocessing rewrote financial terms");
    }

    Ok(PreparedText {
        text: processed,
        original_length: text.chars().count(),
        text_modified,
    })
}

/// Chunks of one text, in order
#[derive(Debug, Clone)]
pub struct PreparedChunks {
    pub chunks: Vec<String>,
    pub strategy: ChunkStrategy,
}

/// Execute Stage 0: cut prepared text into classifier-sized chunks
pub fn execute_stage0(chunker: &Chunker, prepared: &PreparedText) -> PreparedChunks {
    let chunks = chunker.chunks(&prepared.text);
    let strategy = chunks.strategy();
    let chunks: Vec<String> = chunks.collect();

    debug!("Stage 0: {} chunks via {:?}", chunks.len(), strategy);

    PreparedChunks { chunks, strategy }
}
