//! Vote response parsing for Quorum Consensus.
//!
//! Turns a model's free-form response into a [`ModelVerdict`]. This is pure
//! text pattern matching and it is lossy: the contract is best-effort
//! extraction with a safe default, not exact classification.
//!
//! # Extraction order
//!
//! | Field | Source |
//! |-------|--------|
//! | verdict | `VERDICT:` marker, then reject keywords, then approve keywords, then the mode placeholder |
//! | concerns | bullets under an issues/concerns header, or `concern:` / `issue:` lines |
//! | suggestions | lines mentioning suggest / recommend / consider, or bullets under a suggestions header |
//! | summary | first substantial paragraph |

use super::consensus::ConsensusMode;
use super::vote::{ModelVerdict, Verdict};
use crate::core::text::{paragraphs, truncate};

/// Maximum concerns / suggestions kept per vote
pub const MAX_EXTRACTED_ITEMS: usize = 5;

/// Paragraphs shorter than this are skipped when picking the summary
const MIN_SUMMARY_LEN: usize = 20;
const MAX_SUMMARY_LEN: usize = 500;

const REJECT_KEYWORDS: &[&str] = &[
    "DISAPPROVE",
    "NOT APPROVE",
    "CANNOT APPROVE",
    "CAN'T APPROVE",
    "DON'T APPROVE",
    "DO NOT PROCEED",
    "REJECT",
];

const APPROVE_KEYWORDS: &[&str] = &["APPROVE", "LGTM"];

const CONCERN_HEADERS: &[&str] = &["issue", "concern", "problem", "risk"];
const SUGGESTION_HEADERS: &[&str] = &["suggestion", "recommendation", "improvement"];
const SUGGESTION_KEYWORDS: &[&str] = &["suggest", "recommend", "consider"];

/// Parse a model's response into a vote.
///
/// # Examples
///
/// ```
/// use autopilot_domain::quorum::{ConsensusMode, Verdict};
/// use autopilot_domain::quorum::parsing::parse_verdict;
///
/// let text = "The plan covers the migration well.\n\nVERDICT: APPROVE";
/// let vote = parse_verdict("claude", text, ConsensusMode::Plan, 1200);
/// assert_eq!(vote.verdict, Verdict::Approve);
/// assert_eq!(vote.summary, "The plan covers the migration well.");
/// ```
pub fn parse_verdict(
    model: &str,
    response: &str,
    mode: ConsensusMode,
    response_time_ms: u64,
) -> ModelVerdict {
    ModelVerdict {
        model: model.to_string(),
        verdict: detect_verdict(response, mode),
        summary: extract_summary(response),
        feedback: response.trim().to_string(),
        concerns: extract_concerns(response),
        suggestions: extract_suggestions(response),
        response_time_ms,
        error: None,
    }
}

/// Classify the response.
///
/// An explicit `VERDICT:` marker wins. Otherwise reject-signaling keywords
/// outrank approve-signaling ones, and the mode placeholder is the fallback.
pub fn detect_verdict(response: &str, mode: ConsensusMode) -> Verdict {
    if let Some(verdict) = explicit_marker(response, mode) {
        return verdict;
    }

    let upper = response.to_uppercase();
    if REJECT_KEYWORDS.iter().any(|k| upper.contains(k)) {
        return Verdict::Reject;
    }
    if APPROVE_KEYWORDS.iter().any(|k| upper.contains(k)) {
        return Verdict::Approve;
    }
    Verdict::placeholder(mode)
}

/// Look for a `VERDICT: <value>` line (markdown emphasis tolerated)
fn explicit_marker(response: &str, mode: ConsensusMode) -> Option<Verdict> {
    for line in response.lines() {
        let cleaned = line.trim().trim_matches(|c: char| c == '*' || c == '#' || c == '_');
        let upper = cleaned.trim().to_uppercase();
        let Some(rest) = upper.strip_prefix("VERDICT") else {
            continue;
        };
        let value = rest
            .trim_start_matches(|c: char| c == '*' || c == ':' || c.is_whitespace())
            .trim_matches(|c: char| c == '*' || c == '`' || c == '.' || c.is_whitespace())
            .replace(' ', "_");

        let verdict = match value.as_str() {
            v if v.starts_with("REJECT") => Verdict::Reject,
            v if v.starts_with("APPROVE") => Verdict::Approve,
            v if v.starts_with("ABSTAIN") => Verdict::Abstain,
            v if v.starts_with("SUGGEST_CHANGES") || v.starts_with("NEEDS_CHANGES") => {
                Verdict::placeholder(mode)
            }
            _ => continue,
        };
        return Some(verdict);
    }
    None
}

/// First paragraph with enough substance to stand alone
pub fn extract_summary(response: &str) -> String {
    paragraphs(response)
        .into_iter()
        .map(|p| p.trim().to_string())
        .find(|p| {
            !p.starts_with('#')
                && !p.to_uppercase().starts_with("VERDICT")
                && p.chars().count() >= MIN_SUMMARY_LEN
        })
        .map(|p| truncate(&p, MAX_SUMMARY_LEN))
        .unwrap_or_else(|| truncate(response.trim(), MAX_SUMMARY_LEN))
}

pub fn extract_concerns(response: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut in_section = false;

    for line in response.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if is_header(trimmed) {
            in_section = header_matches(trimmed, CONCERN_HEADERS);
            continue;
        }

        let body = strip_bullet(trimmed);
        if let Some(labeled) = strip_label(body, &["concern", "issue"]) {
            push_unique(&mut items, labeled);
        } else if in_section && is_bullet(trimmed) {
            push_unique(&mut items, body);
        }

        if items.len() >= MAX_EXTRACTED_ITEMS {
            break;
        }
    }
    items
}

pub fn extract_suggestions(response: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut in_section = false;

    for line in response.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if is_header(trimmed) {
            in_section = header_matches(trimmed, SUGGESTION_HEADERS);
            continue;
        }

        let body = strip_bullet(trimmed);
        let lower = body.to_lowercase();
        if (in_section && is_bullet(trimmed))
            || SUGGESTION_KEYWORDS.iter().any(|k| lower.contains(k))
        {
            push_unique(&mut items, body);
        }

        if items.len() >= MAX_EXTRACTED_ITEMS {
            break;
        }
    }
    items
}

fn is_header(line: &str) -> bool {
    if line.starts_with('#') {
        return true;
    }
    // "**Concerns:**" or "Issues:" on a line of their own
    let bare = line.trim_matches('*').trim();
    (line.starts_with("**") && line.ends_with("**")) || (bare.ends_with(':') && bare.len() < 40)
}

fn header_matches(line: &str, words: &[&str]) -> bool {
    let lower = line.to_lowercase();
    words.iter().any(|w| lower.contains(w))
}

fn is_bullet(line: &str) -> bool {
    line.starts_with("- ")
        || line.starts_with("* ")
        || line.starts_with("• ")
        || numbered_prefix_len(line).is_some()
}

fn numbered_prefix_len(line: &str) -> Option<usize> {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let rest = &line[digits..];
    (rest.starts_with(". ") || rest.starts_with(") ")).then_some(digits + 2)
}

fn strip_bullet(line: &str) -> &str {
    for prefix in ["- ", "* ", "• "] {
        if let Some(rest) = line.strip_prefix(prefix) {
            return rest.trim();
        }
    }
    match numbered_prefix_len(line) {
        Some(n) => line[n..].trim(),
        None => line,
    }
}

/// `Concern: foo` / `**Issue**: foo` -> `foo`
fn strip_label<'a>(line: &'a str, labels: &[&str]) -> Option<&'a str> {
    let unbolded = line.trim_start_matches('*');
    let lower = unbolded.to_lowercase();
    for label in labels {
        if lower.starts_with(label) {
            let rest = unbolded[label.len()..]
                .trim_start_matches(['s', '*'])
                .trim_start();
            if let Some(value) = rest.strip_prefix(':') {
                let value = value.trim_start_matches('*').trim();
                if !value.is_empty() {
                    return Some(value);
                }
            }
        }
    }
    None
}

fn push_unique(items: &mut Vec<String>, item: &str) {
    let item = item.trim();
    if item.is_empty() || items.len() >= MAX_EXTRACTED_ITEMS {
        return;
    }
    if !items.iter().any(|existing| existing == item) {
        items.push(item.to_string());
    }
}
