//! Fallback parser for text-based tool calls.
//!
//! Some models ignore the native tool API and emit the call as JSON inside
//! their text reply. This parser is deliberately narrow: it only accepts a
//! JSON array of `{"name": ..., "arguments": {...}}` objects (or a single
//! such object) embedded in the text. Anything else yields no calls.

use serde::Deserialize;
use serde_json::Value;

/// One tool call extracted from free text.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RawToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// Extract tool calls from a model's text reply.
///
/// Scans for balanced JSON arrays/objects and returns the first candidate
/// that deserializes into tool calls. Returns an empty vec when the text
/// contains none.
pub fn extract_tool_calls(text: &str) -> Vec<RawToolCall> {
    for (start, open) in text.char_indices().filter(|(_, c)| *c == '[' || *c == '{') {
        let Some(candidate) = balanced_json_slice(&text[start..], open) else {
            continue;
        };

        if open == '[' {
            if let Ok(calls) = serde_json::from_str::<Vec<RawToolCall>>(candidate) {
                if !calls.is_empty() && calls.iter().all(|c| !c.name.is_empty()) {
                    return calls;
                }
            }
        } else if let Ok(call) = serde_json::from_str::<RawToolCall>(candidate) {
            if !call.name.is_empty() {
                return vec![call];
            }
        }
    }

    Vec::new()
}

/// Slice out one balanced JSON value starting at the given opening bracket,
/// respecting string literals and escapes.
fn balanced_json_slice(text: &str, open: char) -> Option<&str> {
    let close = if open == '[' { ']' } else { '}' };
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
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
        match c {
            '"' => in_string = true,
            c if c == open => depth += 1,
            c if c == close => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[..i + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}
