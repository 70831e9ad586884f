pub mod client;

pub use client::*;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::models::{LabelScore, ProbabilityTriple};

/// What a classifier reports for one piece of text
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifierOutput {
    /// Probabilities for every label
    Distribution(Vec<LabelScore>),
    /// Only the most likely label
    TopLabel(LabelScore),
}

impl ClassifierOutput {
    /// Convert to a probability triple, synthesizing one for top-label output
    pub fn into_triple(self) -> Result<ProbabilityTriple> {
        match self {
            ClassifierOutput::Distribution(scores) if scores.is_empty() => {
                bail!("Classifier returned an empty distribution")
            }
            ClassifierOutput::Distribution(scores) => Ok(ProbabilityTriple::from_scores(&scores)),
            ClassifierOutput::TopLabel(top) => Ok(ProbabilityTriple::pseudo(&top)),
        }
    }
}

/// External financial-sentiment model
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Classify one chunk; the text fits the model's input limit
    async fn classify(&self, text: &str) -> Result<ClassifierOutput>;

    /// Model identifier reported in result metadata
    fn model_name(&self) -> &str;
}
