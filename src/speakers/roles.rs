use std::collections::HashMap;

use tracing::info;

use crate::models::{RoleAssignment, SpeakerRole};

/// Name patterns by role, highest priority first
const NAME_RULES: &[(&[&str], SpeakerRole)] = &[
    (
        &[
            "ceo",
            "chief executive officer",
            "chief exec",
            "president",
            "chairman",
            "chairwoman",
            "founder",
            "co-founder",
            "managing director",
        ],
        SpeakerRole::Ceo,
    ),
    (
        &[
            "cfo",
            "chief financial officer",
            "chief finance officer",
            "treasurer",
            "financial director",
            "finance director",
            "chief accounting officer",
        ],
        SpeakerRole::Cfo,
    ),
    (
        &[
            "coo",
            "chief operating officer",
            "cto",
            "chief technology officer",
            "cmo",
            "chief marketing officer",
            "chro",
            "chief human resources officer",
            "general counsel",
            "head of",
            "vp",
            "vice president",
            "senior vp",
            "executive vp",
            "division president",
            "business unit",
        ],
        SpeakerRole::SeniorManagement,
    ),
    (
        &[
            "analyst",
            "research analyst",
            "equity analyst",
            "senior analyst",
            "managing director analyst",
            "vice president analyst",
        ],
        SpeakerRole::Analyst,
    ),
];

/// Openers and phrases typical of a sell-side question
const ANALYST_PHRASES: &[&str] = &[
    "could you",
    "can you",
    "what is",
    "how do you",
    "when will",
    "thank you for taking",
    "thanks for taking",
    "question on",
    "follow up question",
    "clarification on",
];

/// Phrases typical of a management answer
const MANAGEMENT_PHRASES: &[&str] = &[
    "thank you for the question",
    "thanks for the question",
    "let me",
    "as i mentioned",
    "as we discussed",
    "going forward",
    "our strategy",
];

/// Map a speaker label, and optionally what they said, to a role.
///
/// Name rules are evaluated top to bottom and the first matching pattern
/// wins. Text heuristics only apply when no name rule matched.
pub fn classify_speaker_role(speaker: &str, text: &str) -> RoleAssignment {
    let name = speaker.to_lowercase();

    for (patterns, role) in NAME_RULES {
        if patterns.iter().any(|p| name.contains(p)) {
            return RoleAssignment::for_role(*role);
        }
    }

    if !text.is_empty() {
        let text = text.to_lowercase();
        if ANALYST_PHRASES.iter().any(|p| text.contains(p)) {
            return RoleAssignment::for_role(SpeakerRole::Analyst);
        }
        if MANAGEMENT_PHRASES.iter().any(|p| text.contains(p)) {
            return RoleAssignment::for_role(SpeakerRole::Management);
        }
    }

    RoleAssignment::for_role(SpeakerRole::Unknown)
}

/// Role assignments for one analysis run.
///
/// A speaker is classified once, from the first segment they appear in,
/// and keeps that role for the rest of the run.
#[derive(Debug, Clone, Default)]
pub struct RoleRegistry {
    assignments: HashMap<String, RoleAssignment>,
    /// Speakers in first-appearance order
    order: Vec<String>,
}

impl RoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Role for `speaker`, classifying from `text` on first sight
    pub fn assign(&mut self, speaker: &str, text: &str) -> RoleAssignment {
        if let Some(existing) = self.assignments.get(speaker) {
            return *existing;
        }

        let assignment = classify_speaker_role(speaker, text);
        info!(
            "speaker={} role={} weight={}",
            speaker, assignment.role, assignment.weight
        );
        self.assignments.insert(speaker.to_string(), assignment);
        self.order.push(speaker.to_string());
        assignment
    }

    pub fn get(&self, speaker: &str) -> Option<RoleAssignment> {
        self.assignments.get(speaker).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Assignments in first-appearance order
    pub fn iter(&self) -> impl Iterator<Item = (&str, RoleAssignment)> + '_ {
        self.order
            .iter()
            .filter_map(|name| self.assignments.get(name).map(|a| (name.as_str(), *a)))
    }

    /// Explicit speaker weight map for the aggregator
    pub fn weights(&self) -> HashMap<String, f64> {
        self.assignments
            .iter()
            .map(|(name, a)| (name.clone(), a.weight))
            .collect()
    }

    pub fn has_role(&self, role: SpeakerRole) -> bool {
        self.assignments.values().any(|a| a.role == role)
    }
}
