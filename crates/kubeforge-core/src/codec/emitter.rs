//! Block-style YAML emitter
//!
//! Writes a `serde_yaml::Value` tree in canonical form: mapping keys in
//! insertion order, two spaces per nesting level, sequence items prefixed
//! with `- `, `[]`/`{}` for empty collections and literal block scalars for
//! multi-line strings. Only what a manifest needs is supported, there are no
//! anchors, tags or flow collections beyond the empty ones.

use serde_yaml::{Mapping, Value};

const INDENT: usize = 2;

/// Characters a YAML reader takes as line breaks besides `\n` and `\r`,
/// with their double-quoted escapes
const UNICODE_BREAKS: &[(char, &str)] = &[
    ('\u{85}', "\\N"),
    ('\u{2028}', "\\L"),
    ('\u{2029}', "\\P"),
];

/// Plain scalars a YAML 1.1 or 1.2 reader would not read back as strings
const RESERVED_WORDS: &[&str] = &[
    "null", "~", "true", "false", "yes", "no", "on", "off", "y", "n", ".inf", "-.inf", "+.inf",
    ".nan",
];

/// Emit a document body. The result always ends with a newline.
pub fn emit(value: &Value) -> String {
    let mut out = String::new();
    match value {
        Value::Mapping(map) if !map.is_empty() => write_mapping(&mut out, map, 0, false),
        Value::Sequence(seq) if !seq.is_empty() => write_sequence(&mut out, seq, 0),
        Value::Tagged(tagged) => return emit(&tagged.value),
        other => {
            out.push_str(&inline(other));
            out.push('\n');
        }
    }
    out
}

fn push_indent(out: &mut String, indent: usize) {
    out.extend(std::iter::repeat_n(' ', indent));
}

/// Writes `key: value` lines. With `hanging` the first key continues a
/// `- ` already written by the caller.
fn write_mapping(out: &mut String, map: &Mapping, indent: usize, hanging: bool) {
    for (i, (key, value)) in map.iter().enumerate() {
        if !(hanging && i == 0) {
            push_indent(out, indent);
        }
        out.push_str(&key_text(key));
        out.push(':');
        write_nested(out, value, indent);
    }
}

fn write_sequence(out: &mut String, seq: &[Value], indent: usize) {
    for item in seq {
        push_indent(out, indent);
        out.push('-');
        match unwrap_tagged(item) {
            Value::Mapping(map) if !map.is_empty() => {
                out.push(' ');
                write_mapping(out, map, indent + INDENT, true);
            }
            Value::Sequence(inner) if !inner.is_empty() => {
                out.push('\n');
                write_sequence(out, inner, indent + INDENT);
            }
            other => write_nested(out, other, indent),
        }
    }
}

/// Writes whatever follows `key:` or `-`, including the line break
fn write_nested(out: &mut String, value: &Value, indent: usize) {
    match unwrap_tagged(value) {
        Value::Mapping(map) if !map.is_empty() => {
            out.push('\n');
            write_mapping(out, map, indent + INDENT, false);
        }
        Value::Sequence(seq) if !seq.is_empty() => {
            out.push('\n');
            write_sequence(out, seq, indent + INDENT);
        }
        Value::String(s) if s.contains('\n') => match block_chomping(s) {
            Some(header) => {
                out.push(' ');
                out.push_str(header);
                out.push('\n');
                let body = s.strip_suffix('\n').unwrap_or(s);
                for line in body.split('\n') {
                    if !line.is_empty() {
                        push_indent(out, indent + INDENT);
                        out.push_str(line);
                    }
                    out.push('\n');
                }
            }
            None => {
                out.push(' ');
                out.push_str(&quoted(s));
                out.push('\n');
            }
        },
        other => {
            out.push(' ');
            out.push_str(&inline(other));
            out.push('\n');
        }
    }
}

fn unwrap_tagged(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => unwrap_tagged(&tagged.value),
        other => other,
    }
}

/// Block header for a multi-line string, or `None` when only the quoted
/// form preserves it exactly.
fn block_chomping(s: &str) -> Option<&'static str> {
    if s.contains('\r') || s.ends_with("\n\n") || s.starts_with(' ') || s.starts_with('\n') {
        return None;
    }
    let body = s.strip_suffix('\n').unwrap_or(s);
    if body
        .split('\n')
        .any(|line| !line.is_empty() && line.trim().is_empty())
    {
        return None;
    }
    if body
        .chars()
        .any(|c| (c.is_control() && c != '\n' && c != '\t') || is_unicode_break(c))
    {
        return None;
    }
    Some(if s.ends_with('\n') { "|" } else { "|-" })
}

/// Single-line rendering of a scalar or empty collection
fn inline(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => scalar_text(s),
        Value::Sequence(_) => "[]".to_string(),
        Value::Mapping(_) => "{}".to_string(),
        Value::Tagged(tagged) => inline(&tagged.value),
    }
}

fn key_text(key: &Value) -> String {
    match key {
        Value::String(s) => scalar_text(s),
        other => inline(other),
    }
}

fn scalar_text(s: &str) -> String {
    if needs_quotes(s) {
        quoted(s)
    } else {
        s.to_string()
    }
}

fn is_unicode_break(c: char) -> bool {
    UNICODE_BREAKS.iter().any(|(b, _)| *b == c)
}

/// Double-quoted form. JSON string escapes are a subset of YAML's; the
/// Unicode line breaks JSON leaves raw get YAML's own escapes.
fn quoted(s: &str) -> String {
    let json =
        serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s.replace('"', "\\\"")));
    if !json.contains(is_unicode_break) {
        return json;
    }
    let mut out = String::with_capacity(json.len() + 4);
    for c in json.chars() {
        match UNICODE_BREAKS.iter().find(|(b, _)| *b == c) {
            Some((_, escape)) => out.push_str(escape),
            None => out.push(c),
        }
    }
    out
}

/// Whether a string must be quoted to read back as the same string
pub fn needs_quotes(s: &str) -> bool {
    let Some(first) = s.chars().next() else {
        return true;
    };

    if s.trim() != s {
        return true;
    }

    // `-`, `?` and `:` only start an indicator when followed by a space
    if matches!(first, '-' | '?' | ':') && s[1..].chars().next().is_none_or(|c| c == ' ') {
        return true;
    }

    if matches!(
        first,
        ',' | '[' | ']' | '{' | '}' | '#' | '&' | '*' | '!' | '|' | '>' | '\'' | '"' | '%' | '@'
            | '`'
    ) {
        return true;
    }

    if s.starts_with("---") || s.starts_with("...") {
        return true;
    }

    if s.contains(": ") || s.contains(" #") || s.ends_with(':') {
        return true;
    }

    if s.chars().any(|c| c.is_control() || is_unicode_break(c)) {
        return true;
    }

    let lower = s.to_ascii_lowercase();
    if RESERVED_WORDS.contains(&lower.as_str()) {
        return true;
    }

    looks_numeric(&lower)
}

fn looks_numeric(lower: &str) -> bool {
    let unsigned = lower.trim_start_matches(['+', '-']);
    if unsigned.starts_with("0x") || unsigned.starts_with("0o") || unsigned.starts_with("0b") {
        return true;
    }
    if lower.parse::<f64>().is_ok() {
        return true;
    }
    // YAML 1.1 also reads `1_000` as an integer
    let without_underscores = lower.replace('_', "");
    without_underscores != lower && without_underscores.parse::<f64>().is_ok()
}
