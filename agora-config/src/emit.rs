//! Low-level YAML emission helpers for the canonical document writer.

use agora_core::ParamValue;

/// Double-quote a string with JSON-style escapes (valid YAML).
pub(crate) fn quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// A mapping key token: bare when it is a plain identifier, quoted otherwise
/// so numeric-looking keys stay strings.
pub(crate) fn key_token(s: &str) -> String {
    let plain = !s.is_empty()
        && !s.starts_with(|c: char| c.is_ascii_digit())
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        s.to_string()
    } else {
        quoted(s)
    }
}

/// A float token that always reads back as a float (`1.0`, never `1`).
pub(crate) fn float_token(v: f64) -> String {
    if v.is_finite() && v == v.trunc() {
        format!("{:.1}", v)
    } else {
        v.to_string()
    }
}

/// A scalar document value.
pub(crate) fn param_scalar(value: &ParamValue) -> String {
    match value {
        ParamValue::Int(i) => i.to_string(),
        ParamValue::Float(f) => float_token(*f),
        ParamValue::Bool(b) => b.to_string(),
        ParamValue::Str(s) => quoted(s),
        // Single-line JSON is valid YAML flow syntax; never bare unescaped text.
        ParamValue::Json(v) => serde_json::to_string(v).unwrap_or_else(|_| "null".to_string()),
    }
}

/// An inline list of integers: `[1, 2, 3]`.
pub(crate) fn int_list(items: &[u32]) -> String {
    let body = items
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{}]", body)
}

/// Append `<prefix>: |-` (or `|`/`|+`) and the indented block body.
///
/// Text fields are always written as block literals, even single-line or
/// empty ones, with the chomping indicator chosen to preserve the trailing
/// newline count. Content a literal block cannot represent unambiguously
/// (carriage returns, a leading-whitespace first line, newline-only text)
/// falls back to a quoted scalar.
pub(crate) fn push_block_scalar(out: &mut String, prefix: &str, text: &str, content_indent: usize) {
    let body = text.trim_end_matches('\n');
    let trailing = text.len() - body.len();

    let needs_fallback = text.contains('\r')
        || (body.is_empty() && trailing > 0)
        || body.starts_with(' ')
        || body.starts_with('\t');
    if needs_fallback {
        out.push_str(prefix);
        out.push_str(": ");
        out.push_str(&quoted(text));
        out.push('\n');
        return;
    }

    if body.is_empty() {
        // Explicit empty block marker.
        out.push_str(prefix);
        out.push_str(": |-\n");
        return;
    }

    let header = match trailing {
        0 => "|-",
        1 => "|",
        _ => "|+",
    };
    out.push_str(prefix);
    out.push_str(": ");
    out.push_str(header);
    out.push('\n');
    for line in body.split('\n') {
        if line.is_empty() {
            out.push('\n');
        } else {
            for _ in 0..content_indent {
                out.push(' ');
            }
            out.push_str(line);
            out.push('\n');
        }
    }
    // `|+` keeps every trailing line break; one is the line break after the
    // last body line, the rest are blank lines.
    for _ in 1..trailing {
        out.push('\n');
    }
}

// =============================================================================
// TESTS
// =============================================================================
