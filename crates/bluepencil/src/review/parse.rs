//! Normalize-then-parse pipeline for the model's free-text reply.
//!
//! Models asked for bare JSON still wrap it in a fenced code block often
//! enough that the fence markers are stripped before parsing. Anything that
//! fails to parse after normalization is a hard failure for the whole
//! request; no partial critique is recovered.

use tracing::warn;

use crate::review::{AnalysisError, ReviewResult};

/// Strip surrounding whitespace and, when present, one leading fence opener
/// (with any language tag on that line) and one trailing fence closer.
/// Unfenced input passes through unchanged, so the normalization is
/// idempotent.
pub fn normalize_reply(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        text = match rest.split_once('\n') {
            Some((_fence_line, body)) => body,
            None => rest,
        };
    }

    let trimmed = text.trim_end();
    if let Some(rest) = trimmed.strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

/// Deserialize the normalized reply into a [`ReviewResult`]. A mismatch of
/// any kind (invalid JSON, missing field, wrong type) fails with the parse
/// error and the offending normalized text.
pub fn parse_reply(raw: &str) -> Result<ReviewResult, AnalysisError> {
    let normalized = normalize_reply(raw);

    serde_json::from_str(normalized).map_err(|source| {
        warn!(error = %source, reply = %normalized, "model reply failed to parse");
        AnalysisError::ResponseParse {
            source,
            raw: normalized.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PLAIN: &str = r#"{
        "title": {"good": "g", "improvement": "i", "suggestion": "s"},
        "lead": {"good": "g", "improvement": "i", "suggestion": "s"},
        "body": {"good": "g", "improvement": "i", "suggestion": "s"}
    }"#;

    #[test]
    fn fenced_and_unfenced_replies_parse_identically() {
        let fenced = format!("```json\n{PLAIN}\n```");
        let bare_fence = format!("```\n{PLAIN}\n```");

        let from_plain = parse_reply(PLAIN).unwrap();
        assert_eq!(parse_reply(&fenced).unwrap(), from_plain);
        assert_eq!(parse_reply(&bare_fence).unwrap(), from_plain);
    }

    #[test]
    fn normalization_is_idempotent() {
        let fenced = format!("  ```json\n{PLAIN}\n```  ");
        let once = normalize_reply(&fenced).to_string();
        assert_eq!(normalize_reply(&once), once);
    }

    #[test]
    fn invalid_json_fails_with_the_raw_text() {
        let err = parse_reply("I'd be happy to review this!").unwrap_err();
        match err {
            AnalysisError::ResponseParse { raw, .. } => {
                assert_eq!(raw, "I'd be happy to review this!");
            }
            other => panic!("expected ResponseParse, got {other:?}"),
        }
    }

    #[test]
    fn missing_field_is_a_hard_failure() {
        // "suggestion" missing from title
        let reply = r#"{
            "title": {"good": "g", "improvement": "i"},
            "lead": {"good": "g", "improvement": "i", "suggestion": "s"},
            "body": {"good": "g", "improvement": "i", "suggestion": "s"}
        }"#;

        assert!(matches!(
            parse_reply(reply),
            Err(AnalysisError::ResponseParse { .. })
        ));
    }

    #[test]
    fn image_object_round_trips() {
        let reply = r#"{
            "title": {"good": "g", "improvement": "i", "suggestion": "s"},
            "lead": {"good": "g", "improvement": "i", "suggestion": "s"},
            "body": {"good": "g", "improvement": "i", "suggestion": "s"},
            "image": {"good": "g", "improvement": "i", "suggestion": "s",
                      "url": "https://bucket.s3.region.example/k.png"}
        }"#;

        let result = parse_reply(reply).unwrap();
        assert_eq!(
            result.image.unwrap().url,
            "https://bucket.s3.region.example/k.png"
        );
    }
}
