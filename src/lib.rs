pub mod aggregate;
pub mod analyzer;
pub mod chunking;
pub mod classifier;
pub mod error;
pub mod io;
pub mod models;
pub mod scoring;
pub mod speakers;
pub mod stages;

pub use aggregate::{aggregate_sentiment, generate_summary, SummaryConfig};
pub use analyzer::{AnalyzerConfig, SentimentAnalyzer};
pub use chunking::{load_tokenizer, ChunkStrategy, Chunker, ChunkerConfig, TokenCodec};
pub use classifier::{ClassifierConfig, ClassifierOutput, HttpClassifier, SentimentClassifier};
pub use error::{AnalysisError, AnalysisResult};
pub use io::{load_request, parse_request, AnalysisRequest, ErrorKind, ErrorPayload, Report};
pub use models::{AggregateResult, ChunkResult, SentimentLabel, SpeakerRole};
pub use scoring::score_chunk;
pub use speakers::{classify_speaker_role, segment_transcript, RoleRegistry};
pub use stages::preprocess_financial_text;
