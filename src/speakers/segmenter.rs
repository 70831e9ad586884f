use std::sync::OnceLock;

use regex::Regex;

use crate::models::SpeakerSegment;

/// Announced names must be shorter than this many characters
const MAX_NAME_CHARS: usize = 50;

/// Speaker-announcement patterns, compiled once
struct AnnouncementPatterns {
    /// `John Smith:` alone on the line
    name_colon: Regex,
    /// `John Smith - Chief Executive Officer`, optionally `: text`
    name_dash: Regex,
    /// `[John Smith]`, optionally followed by text
    bracketed: Regex,
    /// `OPERATOR:` alone on the line
    all_caps: Regex,
}

static PATTERNS: OnceLock<AnnouncementPatterns> = OnceLock::new();

impl AnnouncementPatterns {
    fn new() -> Self {
        Self {
            name_colon: Regex::new(r"^([A-Z][a-zA-Z\s.']+):\s*$")
                .expect("name_colon regex must compile"),
            name_dash: Regex::new(r"^([A-Z][a-zA-Z\s.']+?)\s*-\s*(.*)$")
                .expect("name_dash regex must compile"),
            bracketed: Regex::new(r"^\[([A-Z][a-zA-Z\s.']+)\]\s*(.*)$")
                .expect("bracketed regex must compile"),
            all_caps: Regex::new(r"^([A-Z]+):\s*$").expect("all_caps regex must compile"),
        }
    }
}

fn patterns() -> &'static AnnouncementPatterns {
    PATTERNS.get_or_init(AnnouncementPatterns::new)
}

/// A line that opens a new speaker segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub speaker: String,
    /// Text on the announcement line after the label, if any
    pub remainder: Option<String>,
}

/// Recognize a speaker-announcement line.
///
/// Patterns are tried in order: `Name:`, `Name - Title`, `[Name]`,
/// `ALLCAPS:`. A `Name - Title` line keeps the title in the label so role
/// lookup can see it; anything after a colon on that line, or after a
/// bracketed name, is speech rather than label.
pub fn parse_announcement(line: &str) -> Option<Announcement> {
    let line = line.trim();
    let patterns = patterns();

    if let Some(caps) = patterns.name_colon.captures(line) {
        return announcement(&caps[1], None);
    }

    if let Some(caps) = patterns.name_dash.captures(line) {
        let name = caps[1].trim();
        let rest = caps[2].trim();
        let (title, remainder) = match rest.split_once(':') {
            Some((title, speech)) => (title.trim(), Some(speech)),
            None => (rest, None),
        };

        // A title is a capitalized label, not the rest of a sentence
        let title_ok = title.is_empty() || title.starts_with(|c: char| c.is_uppercase());
        if title_ok && is_name(name) {
            // Only the name is length-limited; titles may be long
            let label = if title.is_empty() {
                name.to_string()
            } else {
                format!("{} - {}", name, title)
            };
            return Some(labelled(&label, remainder));
        }
    }

    if let Some(caps) = patterns.bracketed.captures(line) {
        return announcement(&caps[1], Some(&caps[2]));
    }

    if let Some(caps) = patterns.all_caps.captures(line) {
        return announcement(&caps[1], None);
    }

    None
}

fn is_name(name: &str) -> bool {
    !name.is_empty() && name.chars().count() < MAX_NAME_CHARS
}

fn announcement(name: &str, remainder: Option<&str>) -> Option<Announcement> {
    let name = name.trim();
    is_name(name).then(|| labelled(name, remainder))
}

fn labelled(speaker: &str, remainder: Option<&str>) -> Announcement {
    Announcement {
        speaker: speaker.to_string(),
        remainder: remainder
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string),
    }
}

/// Split a transcript into ordered speaker segments.
///
/// Lines before the first announcement are dropped. Each segment's lines
/// are joined with single spaces; segments with no text are not emitted.
/// An empty result means no speaker was ever announced.
pub fn segment_transcript(text: &str) -> Vec<SpeakerSegment> {
    let mut segments = Vec::new();
    let mut current_speaker: Option<String> = None;
    let mut current_lines: Vec<String> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(found) = parse_announcement(line) {
            // Close the current segment
            if let Some(speaker) = current_speaker.take() {
                if !current_lines.is_empty() {
                    segments.push(SpeakerSegment::new(speaker, current_lines.join(" ")));
                }
            }
            current_lines.clear();
            current_speaker = Some(found.speaker);
            current_lines.extend(found.remainder);
        } else if current_speaker.is_some() {
            current_lines.push(line.to_string());
        }
    }

    // Flush the final segment
    if let Some(speaker) = current_speaker {
        if !current_lines.is_empty() {
            segments.push(SpeakerSegment::new(speaker, current_lines.join(" ")));
        }
    }

    segments
}
