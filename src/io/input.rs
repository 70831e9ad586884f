use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Action requested by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    #[default]
    Analyze,
    AudioTranscript,
    Historical,
    #[serde(untagged)]
    Unknown(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisOptions {
    /// Segment by speaker and weight by role
    #[serde(default)]
    pub per_speaker: bool,
}

/// A JSON analysis request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub action: Action,
    /// Input for `analyze`
    #[serde(default)]
    pub text: String,
    /// Input for `audio_transcript` and `historical`
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub options: AnalysisOptions,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub quarter: u32,
}

/// Parse a request from a JSON string
pub fn parse_request(json: &str) -> Result<AnalysisRequest> {
    serde_json::from_str(json).context("Invalid JSON request")
}

/// Load a request from a file path, an inline JSON string, or stdin.
///
/// An argument naming an existing file is read as a file; any other
/// argument is parsed as JSON. Without an argument stdin is read.
pub fn load_request(arg: Option<&str>) -> Result<AnalysisRequest> {
    match arg {
        Some(arg) if Path::new(arg).is_file() => {
            let content = std::fs::read_to_string(arg)
                .with_context(|| format!("Failed to read request file: {}", arg))?;
            parse_request(&content)
        }
        Some(json) => parse_request(json),
        None => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read request from stdin")?;
            parse_request(&content)
        }
    }
}
