use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use super::{ClassifierOutput, SentimentClassifier};
use crate::models::LabelScore;

pub const DEFAULT_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/ProsusAI/finbert";
pub const DEFAULT_MODEL: &str = "ProsusAI/finbert";

/// Configuration for the hosted classifier
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Inference endpoint (from FINSENT_CLASSIFIER_URL env var)
    pub endpoint: String,
    /// Bearer token (from HUGGINGFACE_TOKEN env var), optional
    pub api_token: Option<String>,
    /// Model identifier reported in metadata (from FINSENT_MODEL env var)
    pub model_name: String,
    /// Timeout for a single HTTP request
    pub timeout: Duration,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_token: None,
            model_name: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ClassifierConfig {
    /// Create config from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            endpoint: non_empty_var("FINSENT_CLASSIFIER_URL").unwrap_or(defaults.endpoint),
            api_token: non_empty_var("HUGGINGFACE_TOKEN"),
            model_name: non_empty_var("FINSENT_MODEL").unwrap_or(defaults.model_name),
            timeout: defaults.timeout,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Classifier served over HTTP in the Hugging Face inference format
pub struct HttpClassifier {
    client: Client,
    endpoint: Url,
    config: ClassifierConfig,
}

impl HttpClassifier {
    /// Build the client; fails when the endpoint is not a valid URL
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .with_context(|| format!("Invalid classifier endpoint: {}", config.endpoint))?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint,
            config,
        })
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }
}

#[async_trait]
impl SentimentClassifier for HttpClassifier {
    async fn classify(&self, text: &str) -> Result<ClassifierOutput> {
        let request = InferenceRequest { inputs: text };

        let mut builder = self
            .client
            .post(self.endpoint.clone())
            .header("content-type", "application/json")
            .json(&request);
        if let Some(token) = &self.config.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .context("Failed to send request to classifier")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Classifier error: {} - {}", status, body);
        }

        let response: InferenceResponse = response
            .json()
            .await
            .context("Failed to parse classifier response")?;

        response.into_output()
    }

    fn model_name(&self) -> &str {
        &self.config.model_name
    }
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

/// Response shapes returned by text-classification endpoints
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    /// One distribution per input: `[[{label, score}, ...]]`
    Nested(Vec<Vec<LabelScore>>),
    /// `[{label, score}, ...]`
    Flat(Vec<LabelScore>),
    /// `{label, score}`
    Single(LabelScore),
}

impl InferenceResponse {
    fn into_output(self) -> Result<ClassifierOutput> {
        match self {
            InferenceResponse::Nested(batches) => match batches.into_iter().next() {
                Some(scores) => Ok(flat_output(scores)),
                None => bail!("Classifier returned no results"),
            },
            InferenceResponse::Flat(scores) if scores.is_empty() => {
                bail!("Classifier returned no results")
            }
            InferenceResponse::Flat(scores) => Ok(flat_output(scores)),
            InferenceResponse::Single(top) => Ok(ClassifierOutput::TopLabel(top)),
        }
    }
}

/// A lone entry is a top label; several entries are a distribution
fn flat_output(mut scores: Vec<LabelScore>) -> ClassifierOutput {
    if scores.len() == 1 {
        ClassifierOutput::TopLabel(scores.remove(0))
    } else {
        ClassifierOutput::Distribution(scores)
    }
}
