//! Serializer.
//!
//! Renders built values back to text: block style with a two-space indent,
//! `-` item markers, and `---` separators between multiple documents. Values
//! carrying the [`Value::Compact`] wrapper re-render on a single line.

use crate::build::Document;
use crate::scalar;
use crate::value::Value;

/// Render one value as a standalone document.
pub fn dump(value: &Value) -> String {
    let mut out = String::new();
    write_block(&mut out, value, 0);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Render a document list, separated by `---` markers when there is more
/// than one. Directives re-emit ahead of their document.
pub fn dump_documents(documents: &[Document]) -> String {
    if documents.len() == 1 {
        let doc = &documents[0];
        let mut out = String::new();
        for (_, directive) in &doc.directives {
            out.push('%');
            out.push_str(directive);
            out.push('\n');
        }
        out.push_str(&dump(&doc.value));
        return out;
    }
    let mut out = String::new();
    for doc in documents {
        for (_, directive) in &doc.directives {
            out.push('%');
            out.push_str(directive);
            out.push('\n');
        }
        out.push_str("---\n");
        out.push_str(&dump(&doc.value));
    }
    out
}

// ============================================================================
// Block style
// ============================================================================

fn write_block(out: &mut String, value: &Value, indent: usize) {
    match value {
        Value::Mapping(map) => {
            for (key, child) in map {
                pad(out, indent);
                out.push_str(key);
                out.push(':');
                write_entry_value(out, child, indent);
            }
        }
        Value::Set(set) => {
            for (key, child) in set {
                pad(out, indent);
                out.push_str("? ");
                out.push_str(key);
                out.push('\n');
                pad(out, indent);
                out.push(':');
                write_entry_value(out, child, indent);
            }
        }
        Value::Sequence(seq) => {
            for child in seq {
                pad(out, indent);
                out.push('-');
                write_entry_value(out, child, indent);
            }
        }
        Value::Tagged(tag, inner) => {
            pad(out, indent);
            out.push('!');
            out.push_str(tag);
            if is_block(inner) {
                out.push('\n');
                write_block(out, inner, indent + 2);
            } else {
                out.push(' ');
                write_leaf(out, inner, indent);
                out.push('\n');
            }
        }
        other => {
            pad(out, indent);
            write_leaf(out, other, indent);
            out.push('\n');
        }
    }
}

/// The text after a `key:` or `-` marker: a leaf stays on the same line, a
/// nested container opens an indented block.
fn write_entry_value(out: &mut String, value: &Value, indent: usize) {
    if is_block(value) {
        out.push('\n');
        write_block(out, value, indent + 2);
    } else {
        out.push(' ');
        write_leaf(out, value, indent);
        out.push('\n');
    }
}

/// Whether a value needs its own indented block.
fn is_block(value: &Value) -> bool {
    match value {
        Value::Mapping(map) => !map.is_empty(),
        Value::Set(set) => !set.is_empty(),
        Value::Sequence(seq) => !seq.is_empty(),
        Value::Tagged(_, inner) => is_block(inner),
        Value::String(s) => s.contains('\n'),
        Value::Compact(_) => false,
        _ => false,
    }
}

fn write_leaf(out: &mut String, value: &Value, indent: usize) {
    match value {
        Value::Compact(inner) => write_inline(out, inner),
        Value::Mapping(_) | Value::Set(_) => out.push_str("{}"),
        Value::Sequence(_) => out.push_str("[]"),
        Value::Tagged(tag, inner) => {
            out.push('!');
            out.push_str(tag);
            out.push(' ');
            write_leaf(out, inner, indent);
        }
        Value::String(s) if s.contains('\n') => {
            // multi-line strings re-render as literal blocks
            out.push('|');
            for line in s.split('\n') {
                out.push('\n');
                pad(out, indent + 2);
                out.push_str(line);
            }
        }
        Value::String(s) => out.push_str(&string_scalar(s)),
        other => out.push_str(&plain_scalar(other)),
    }
}

// ============================================================================
// Inline style
// ============================================================================

fn write_inline(out: &mut String, value: &Value) {
    match value {
        Value::Mapping(map) | Value::Set(map) => {
            out.push('{');
            for (i, (key, child)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(key);
                out.push_str(": ");
                write_inline(out, child);
            }
            out.push('}');
        }
        Value::Sequence(seq) => {
            out.push('[');
            for (i, child) in seq.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_inline(out, child);
            }
            out.push(']');
        }
        Value::Compact(inner) => write_inline(out, inner),
        Value::Tagged(tag, inner) => {
            out.push('!');
            out.push_str(tag);
            out.push(' ');
            write_inline(out, inner);
        }
        Value::String(s) => out.push_str(&string_scalar(s)),
        other => out.push_str(&plain_scalar(other)),
    }
}

// ============================================================================
// Scalars
// ============================================================================

fn plain_scalar(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Integer(n) => n.to_string(),
        Value::Float(f) => {
            if f.is_nan() {
                ".nan".to_string()
            } else if f.is_infinite() {
                if *f > 0.0 { ".inf" } else { "-.inf" }.to_string()
            } else if *f == f.trunc() {
                format!("{:.1}", f)
            } else {
                f.to_string()
            }
        }
        Value::Date(d) => format!("{:04}-{:02}-{:02}", d.year, d.month, d.day),
        other => format!("{:?}", other),
    }
}

/// A string scalar, quoted whenever bare text would read back as something
/// else or collide with markup.
fn string_scalar(s: &str) -> String {
    if needs_quotes(s) {
        let mut out = String::with_capacity(s.len() + 2);
        out.push('"');
        for c in s.chars() {
            match c {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                _ => out.push(c),
            }
        }
        out.push('"');
        out
    } else {
        s.to_string()
    }
}

fn needs_quotes(s: &str) -> bool {
    if s.is_empty() || s.starts_with(' ') || s.ends_with(' ') {
        return true;
    }
    if let Some(first) = s.chars().next() {
        if "-?:#&*!|>{}[]%@'\"".contains(first) {
            return true;
        }
    }
    if s.contains(": ") || s.contains(" #") || s.contains(',') || s.ends_with(':') {
        return true;
    }
    // bare text that would coerce into another type must stay a string
    !matches!(scalar::coerce(s, true), Value::String(_))
}

fn pad(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push(' ');
    }
}
