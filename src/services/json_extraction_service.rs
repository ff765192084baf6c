//! Best-effort recovery of a JSON object from model output.
//!
//! Models are told to answer with bare JSON but routinely wrap it in code
//! fences, add a sentence before or after it, use typographic quotes or leave
//! trailing commas. [`extract_json`] runs a fixed pipeline of small steps and
//! returns the first successful parse:
//!
//! 1. [`strip_code_fences`]
//! 2. [`normalize_quotes`]
//! 3. [`remove_trailing_commas`]
//! 4. strict parse
//! 5. [`brace_slice`] of the original text, steps 2-3 again, strict parse
//!
//! The brace slice runs from the first `{` to the last `}`, so commentary that
//! itself contains braces can widen the span into something unparsable. That
//! case fails cleanly with [`ExtractionError::Malformed`].

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExtractionError {
    #[error("no JSON object found in model output")]
    NoJsonObject,
    #[error("model output is not valid JSON: {0}")]
    Malformed(String),
}

fn leading_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^```[A-Za-z0-9_-]*[ \t]*\r?\n?").expect("valid regex"))
}

fn trailing_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\r?\n?```\s*$").expect("valid regex"))
}

fn trailing_comma() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",\s*([}\]])").expect("valid regex"))
}

/// Removes a leading ```` ``` ```` / ```` ```json ```` marker and a trailing fence.
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    let without_lead = leading_fence().replace(trimmed, "");
    trailing_fence().replace(&without_lead, "").trim().to_string()
}

/// Replaces typographic quotes with their ASCII forms.
pub fn normalize_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' => '"',
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' => '\'',
            other => other,
        })
        .collect()
}

/// Drops commas that directly precede a closing `}` or `]`.
pub fn remove_trailing_commas(text: &str) -> String {
    trailing_comma().replace_all(text, "$1").into_owned()
}

/// Substring from the first `{` to the last `}` inclusive.
pub fn brace_slice(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn repair(text: &str) -> String {
    remove_trailing_commas(&normalize_quotes(text))
}

fn parse_strict(text: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(text)
}

pub fn extract_json(text: &str) -> Result<Value, ExtractionError> {
    let direct = repair(&strip_code_fences(text));
    let first_error = match parse_strict(&direct) {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };

    let Some(slice) = brace_slice(text) else {
        return Err(ExtractionError::NoJsonObject);
    };

    parse_strict(&repair(slice)).map_err(|err| {
        log::debug!("direct parse failed ({first_error}); brace slice failed ({err})");
        ExtractionError::Malformed(err.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fenced_object_with_trailing_comma() {
        let text = "```json\n{\"a\":1,}\n```";
        assert_eq!(extract_json(text).unwrap(), json!({ "a": 1 }));
    }

    #[test]
    fn bare_fence_without_language() {
        let text = "```\n{\"days\": [1, 2, 3,]}\n```";
        assert_eq!(extract_json(text).unwrap(), json!({ "days": [1, 2, 3] }));
    }

    #[test]
    fn commentary_around_object_is_sliced_away() {
        let text = "Sure! Here is your plan: {\"roadmap\":[],\"accommodations\":[],\"attractions\":[]} Hope that helps!";
        assert_eq!(
            extract_json(text).unwrap(),
            json!({ "roadmap": [], "accommodations": [], "attractions": [] })
        );
    }

    #[test]
    fn smart_quotes_are_normalized() {
        let text = "{\u{201C}city\u{201D}: \u{201C}Goa\u{201D}}";
        assert_eq!(extract_json(text).unwrap(), json!({ "city": "Goa" }));
    }

    #[test]
    fn no_braces_is_a_failure_value() {
        assert_eq!(
            extract_json("I could not build a plan today."),
            Err(ExtractionError::NoJsonObject)
        );
        assert_eq!(extract_json("} backwards {"), Err(ExtractionError::NoJsonObject));
    }

    #[test]
    fn braces_in_commentary_fail_cleanly() {
        let text = "Note {see below}: {\"a\": 1}";
        assert!(matches!(
            extract_json(text),
            Err(ExtractionError::Malformed(_))
        ));
    }

    #[test]
    fn top_level_array_parses_directly() {
        assert_eq!(extract_json("[1, 2,]").unwrap(), json!([1, 2]));
    }

    #[test]
    fn individual_steps() {
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {}  "), "{}");
        assert_eq!(remove_trailing_commas("{\"a\": [1 ,\n ],\n}"), "{\"a\": [1 ]}");
        assert_eq!(normalize_quotes("\u{2018}x\u{2019}"), "'x'");
        assert_eq!(brace_slice("xx {a} yy {b} zz"), Some("{a} yy {b}"));
        assert_eq!(brace_slice("no braces"), None);
    }
}
