//! Response parser. Turns free-form model text into an `EvaluationResult`.
//!
//! Candidate payloads, tried in order:
//! 1. the body of the first Markdown code fence, if any;
//! 2. the whole text when it is wrapped in one outer brace pair,
//!    otherwise the first greedy `{ ... }` match;
//! 3. balanced `{ ... }` spans, in order of their opening brace.
//!
//! The first candidate that decodes into a complete evaluation wins. Validation is eager:
//! a payload missing any required field, or with a score outside 0–100, is rejected here.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::{Deserializer, Error as _};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::evaluation::models::EvaluationResult;

/// Upper bound on balanced spans tried after the primary candidate.
const MAX_FALLBACK_SPANS: usize = 32;

static GREEDY_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("static pattern compiles"));

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("no valid structured payload found")]
    NoPayload,

    #[error("structured payload is incomplete: {0}")]
    InvalidPayload(String),

    #[error("{field} must be between 0 and 100, got {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Wire shape the model is asked to return.
#[derive(Debug, Deserialize)]
struct RawEvaluation {
    #[serde(rename = "JD Match", deserialize_with = "percentage")]
    jd_match: f64,
    #[serde(rename = "MissingKeywords", alias = "Missing Keywords")]
    missing_keywords: Vec<String>,
    #[serde(rename = "Profile Summary", alias = "ProfileSummary")]
    profile_summary: String,
    #[serde(rename = "TechnicalSkills", deserialize_with = "percentage")]
    technical_skills: f64,
    #[serde(rename = "SoftSkills", deserialize_with = "percentage")]
    soft_skills: f64,
    #[serde(rename = "Experience", deserialize_with = "percentage")]
    experience: f64,
    #[serde(rename = "Education", deserialize_with = "percentage")]
    education: f64,
    #[serde(rename = "Projects", deserialize_with = "percentage")]
    projects: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawScore {
    Number(f64),
    Text(String),
}

fn percentage<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match RawScore::deserialize(deserializer)? {
        RawScore::Number(n) => Ok(n),
        RawScore::Text(s) => normalize_percentage(&s)
            .ok_or_else(|| D::Error::custom(format!("'{s}' is not a percentage"))),
    }
}

/// `"83%"` → 83.0, `" 83 "` → 83.0. Anything else that is not a number → `None`.
pub fn normalize_percentage(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    number.parse::<f64>().ok()
}

/// Parses raw model output into an `EvaluationResult`.
pub fn parse_evaluation(response: &str) -> Result<EvaluationResult, ParseError> {
    let mut first_rejection: Option<ParseError> = None;

    for candidate in candidates(response.trim()) {
        let value: Value = match serde_json::from_str(candidate) {
            Ok(v) => v,
            Err(e) => {
                debug!("Candidate payload is not JSON: {e}");
                continue;
            }
        };

        match decode(value) {
            Ok(result) => return Ok(result),
            Err(e) => {
                debug!("Candidate payload rejected: {e}");
                first_rejection.get_or_insert(e);
            }
        }
    }

    Err(first_rejection.unwrap_or(ParseError::NoPayload))
}

fn decode(value: Value) -> Result<EvaluationResult, ParseError> {
    let raw: RawEvaluation =
        serde_json::from_value(value).map_err(|e| ParseError::InvalidPayload(e.to_string()))?;

    Ok(EvaluationResult {
        match_percentage: check_score("JD Match", raw.jd_match)?,
        missing_keywords: raw
            .missing_keywords
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect(),
        profile_summary: raw.profile_summary.trim().to_string(),
        technical_skills: check_score("TechnicalSkills", raw.technical_skills)?,
        soft_skills: check_score("SoftSkills", raw.soft_skills)?,
        experience: check_score("Experience", raw.experience)?,
        education: check_score("Education", raw.education)?,
        projects: check_score("Projects", raw.projects)?,
    })
}

fn check_score(field: &'static str, value: f64) -> Result<f64, ParseError> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(ParseError::OutOfRange { field, value })
    }
}

/// Candidate payload slices, in the order they should be tried. No duplicates.
fn candidates(text: &str) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::new();

    let fenced = fenced_block(text).and_then(primary_span);
    for span in fenced.into_iter().chain(primary_span(text)).chain(balanced_spans(text)) {
        if !out.contains(&span) {
            out.push(span);
        }
    }
    out
}

/// The whole text when it is one outer brace pair, otherwise the greedy `{ ... }` match.
fn primary_span(text: &str) -> Option<&str> {
    if text.starts_with('{') && text.ends_with('}') {
        Some(text)
    } else {
        GREEDY_SPAN.find(text).map(|m| m.as_str())
    }
}

/// Up to `MAX_FALLBACK_SPANS` balanced `{ ... }` spans, ordered by opening brace.
///
/// Single pass with a stack of open braces. Quotes are only treated as JSON strings
/// inside an open brace, so apostrophes and quotes in surrounding prose are ignored.
fn balanced_spans(text: &str) -> Vec<&str> {
    let mut open: Vec<usize> = Vec::new();
    let mut spans: Vec<(usize, usize)> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' if !open.is_empty() => in_string = true,
            '{' => open.push(i),
            '}' => {
                if let Some(start) = open.pop() {
                    spans.push((start, i));
                }
            }
            _ => {}
        }
    }

    spans.sort_unstable_by_key(|&(start, _)| start);
    spans
        .into_iter()
        .take(MAX_FALLBACK_SPANS)
        .map(|(start, end)| &text[start..=end])
        .collect()
}

/// Body of the first Markdown code fence, with any language tag (`json`, `JSON`) dropped.
/// An unterminated fence runs to the end of the text.
fn fenced_block(text: &str) -> Option<&str> {
    let opener = text.find("```")?;
    let after = &text[opener + 3..];
    let body = match after.find('\n') {
        Some(nl) if !after[..nl].contains('{') => &after[nl + 1..],
        _ => after,
    };
    let body = match body.find("```") {
        Some(close) => &body[..close],
        None => body,
    };
    Some(body.trim())
}
