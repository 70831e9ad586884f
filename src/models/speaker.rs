use std::fmt;

use serde::{Deserialize, Serialize};

/// Organizational role of a transcript speaker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpeakerRole {
    #[serde(rename = "CEO")]
    Ceo,
    #[serde(rename = "CFO")]
    Cfo,
    #[serde(rename = "Senior_Management")]
    SeniorManagement,
    Analyst,
    Management,
    Unknown,
}

impl SpeakerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeakerRole::Ceo => "CEO",
            SpeakerRole::Cfo => "CFO",
            SpeakerRole::SeniorManagement => "Senior_Management",
            SpeakerRole::Analyst => "Analyst",
            SpeakerRole::Management => "Management",
            SpeakerRole::Unknown => "Unknown",
        }
    }

    /// Fixed importance multiplier for the role
    pub fn weight(&self) -> f64 {
        match self {
            SpeakerRole::Ceo => 1.5,
            SpeakerRole::Cfo => 1.4,
            SpeakerRole::SeniorManagement => 1.2,
            SpeakerRole::Management => 1.1,
            SpeakerRole::Unknown => 1.0,
            SpeakerRole::Analyst => 0.8,
        }
    }
}

impl fmt::Display for SpeakerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role and weight assigned to one speaker for an analysis run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub role: SpeakerRole,
    pub weight: f64,
}

impl RoleAssignment {
    pub fn for_role(role: SpeakerRole) -> Self {
        Self {
            role,
            weight: role.weight(),
        }
    }
}

/// A contiguous run of transcript text attributed to one speaker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerSegment {
    /// Announced speaker label, trimmed but otherwise as written
    pub speaker: String,
    pub text: String,
}

impl SpeakerSegment {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
        }
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_with_display_names() {
        let json = serde_json::to_string(&SpeakerRole::SeniorManagement).unwrap();
        assert_eq!(json, "\"Senior_Management\"");
        let json = serde_json::to_string(&SpeakerRole::Ceo).unwrap();
        assert_eq!(json, "\"CEO\"");
    }

    #[test]
    fn test_role_weights_are_ordered_by_seniority() {
        assert!(SpeakerRole::Ceo.weight() > SpeakerRole::Cfo.weight());
        assert!(SpeakerRole::Cfo.weight() > SpeakerRole::SeniorManagement.weight());
        assert!(SpeakerRole::Unknown.weight() > SpeakerRole::Analyst.weight());
    }
}
