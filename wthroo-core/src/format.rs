//! Rendering of raw response bodies for display.

use serde::de::IgnoredAny;

use crate::{error::FormatError, model::OutputFormat};

const INDENT: &[u8] = b"  ";

/// Re-indent a JSON document with two spaces.
///
/// Only whitespace between tokens changes. Strings, numbers, key order and
/// duplicate keys are copied byte for byte, and nesting depth is unbounded.
pub fn indent_json(raw: &[u8]) -> Result<Vec<u8>, FormatError> {
    // Validation only; the skip path is iterative and does not decode strings.
    serde_json::from_slice::<IgnoredAny>(raw)?;

    let mut out = Vec::with_capacity(raw.len() + raw.len() / 2);
    let mut depth = 0usize;
    let mut pending_open = false;
    let mut in_string = false;
    let mut escaped = false;

    for &b in raw {
        if in_string {
            out.push(b);
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        if matches!(b, b' ' | b'\t' | b'\n' | b'\r') {
            continue;
        }

        // Empty containers stay on one line.
        if pending_open && b != b']' && b != b'}' {
            pending_open = false;
            depth += 1;
            newline(&mut out, depth);
        }

        match b {
            b'"' => {
                in_string = true;
                out.push(b);
            }
            b'{' | b'[' => {
                out.push(b);
                pending_open = true;
            }
            b'}' | b']' => {
                if pending_open {
                    pending_open = false;
                } else {
                    depth = depth.saturating_sub(1);
                    newline(&mut out, depth);
                }
                out.push(b);
            }
            b',' => {
                out.push(b);
                newline(&mut out, depth);
            }
            b':' => out.extend_from_slice(b": "),
            _ => out.push(b),
        }
    }

    Ok(out)
}

fn newline(out: &mut Vec<u8>, depth: usize) {
    out.push(b'\n');
    for _ in 0..depth {
        out.extend_from_slice(INDENT);
    }
}

/// Render a body according to the requested output format.
///
/// XML bodies are passed through untouched.
pub fn render(output: OutputFormat, raw: &[u8]) -> Result<Vec<u8>, FormatError> {
    match output {
        OutputFormat::Json => indent_json(raw),
        OutputFormat::Xml => Ok(raw.to_vec()),
    }
}
