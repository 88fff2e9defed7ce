//! Best-effort JSON extraction from free-form model output.
//!
//! Models wrap JSON in prose or code fences. These helpers find the first
//! balanced `{...}` or `[...]` span, skipping brackets inside string
//! literals, and deserialize it.

use serde::de::DeserializeOwned;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonShape {
    Object,
    Array,
}

/// First balanced `{...}` substring.
pub fn extract_json_object(text: &str) -> Option<&str> {
    extract_balanced(text, '{', '}')
}

/// First balanced `[...]` substring.
pub fn extract_json_array(text: &str) -> Option<&str> {
    extract_balanced(text, '[', ']')
}

/// Extract and deserialize, or `None` if there is no span or it does not fit `T`.
pub fn parse_json<T: DeserializeOwned>(text: &str, shape: JsonShape) -> Option<T> {
    let span = match shape {
        JsonShape::Object => extract_json_object(text),
        JsonShape::Array => extract_json_array(text),
    }?;
    serde_json::from_str(span).ok()
}

/// Extract and deserialize, falling back to `fallback()` on any failure.
pub fn parse_or_fallback<T, F>(text: &str, shape: JsonShape, fallback: F) -> T
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    match parse_json(text, shape) {
        Some(value) => value,
        None => {
            tracing::warn!(?shape, "could not parse JSON from AI response, using fallback");
            fallback()
        }
    }
}

fn extract_balanced(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        if c == '"' {
            in_string = true;
        } else if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                let end = start + offset + c.len_utf8();
                return Some(&text[start..end]);
            }
        }
    }
    None
}
