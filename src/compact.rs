//! Inline compact forms.
//!
//! Single-line `{...}` and `[...]` values decode in two passes: a strict
//! JSON-equivalent decoder first, then a permissive shape match that accepts
//! bare keys and plain scalars. Text that matches neither shape is left to
//! the caller, which degrades it to a raw scalar.

use crate::scalar;
use crate::value::Value;
use indexmap::IndexMap;

/// Whether an inline form opens and closes its brackets on this line, with
/// no content outside them.
pub fn is_balanced(s: &str) -> bool {
    let mut stack: Vec<char> = Vec::new();
    let mut in_double = false;
    let mut in_single = false;
    let mut escape = false;
    let last = s.chars().count().saturating_sub(1);

    for (pos, c) in s.chars().enumerate() {
        if escape {
            escape = false;
            continue;
        }
        match c {
            '\\' if in_double => escape = true,
            '"' if !in_single => in_double = !in_double,
            '\'' if !in_double => in_single = !in_single,
            '{' | '[' if !in_double && !in_single => stack.push(c),
            '}' | ']' if !in_double && !in_single => {
                let open = if c == '}' { '{' } else { '[' };
                if stack.pop() != Some(open) {
                    return false;
                }
                // closing the outermost bracket anywhere but the line's end
                // means trailing content
                if stack.is_empty() && pos != last {
                    return false;
                }
            }
            _ => {}
        }
    }
    stack.is_empty() && !in_double && !in_single && !s.is_empty()
}

// ============================================================================
// Strict decoding
// ============================================================================

/// Decode strict JSON-equivalent inline text.
pub fn parse_strict(s: &str) -> Option<Value> {
    let chars: Vec<char> = s.chars().collect();
    let mut cursor = Cursor { chars, i: 0 };
    cursor.skip_ws();
    let value = cursor.parse_value()?;
    cursor.skip_ws();
    if cursor.i != cursor.chars.len() {
        return None;
    }
    Some(value)
}

struct Cursor {
    chars: Vec<char>,
    i: usize,
}

impl Cursor {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.i).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\n')) {
            self.i += 1;
        }
    }

    fn eat(&mut self, expected: char) -> Option<()> {
        if self.peek() == Some(expected) {
            self.i += 1;
            Some(())
        } else {
            None
        }
    }

    fn eat_literal(&mut self, literal: &str) -> Option<()> {
        for c in literal.chars() {
            self.eat(c)?;
        }
        Some(())
    }

    fn parse_value(&mut self) -> Option<Value> {
        match self.peek()? {
            '{' => self.parse_object(),
            '[' => self.parse_array(),
            '"' => Some(Value::String(self.parse_string()?)),
            't' => {
                self.eat_literal("true")?;
                Some(Value::Bool(true))
            }
            'f' => {
                self.eat_literal("false")?;
                Some(Value::Bool(false))
            }
            'n' => {
                self.eat_literal("null")?;
                Some(Value::Null)
            }
            '-' | '0'..='9' => self.parse_number(),
            _ => None,
        }
    }

    fn parse_object(&mut self) -> Option<Value> {
        self.eat('{')?;
        let mut map = IndexMap::new();
        self.skip_ws();
        if self.peek() == Some('}') {
            self.i += 1;
            return Some(Value::Mapping(map));
        }
        loop {
            self.skip_ws();
            let key = self.parse_string()?;
            self.skip_ws();
            self.eat(':')?;
            self.skip_ws();
            let value = self.parse_value()?;
            map.insert(key, value);
            self.skip_ws();
            match self.peek()? {
                ',' => self.i += 1,
                '}' => {
                    self.i += 1;
                    return Some(Value::Mapping(map));
                }
                _ => return None,
            }
        }
    }

    fn parse_array(&mut self) -> Option<Value> {
        self.eat('[')?;
        let mut seq = Vec::new();
        self.skip_ws();
        if self.peek() == Some(']') {
            self.i += 1;
            return Some(Value::Sequence(seq));
        }
        loop {
            self.skip_ws();
            seq.push(self.parse_value()?);
            self.skip_ws();
            match self.peek()? {
                ',' => self.i += 1,
                ']' => {
                    self.i += 1;
                    return Some(Value::Sequence(seq));
                }
                _ => return None,
            }
        }
    }

    fn parse_string(&mut self) -> Option<String> {
        self.eat('"')?;
        let mut out = String::new();
        loop {
            let c = self.peek()?;
            self.i += 1;
            match c {
                '"' => return Some(out),
                '\\' => {
                    let esc = self.peek()?;
                    self.i += 1;
                    match esc {
                        '"' => out.push('"'),
                        '\\' => out.push('\\'),
                        '/' => out.push('/'),
                        'b' => out.push('\x08'),
                        'f' => out.push('\x0C'),
                        'n' => out.push('\n'),
                        'r' => out.push('\r'),
                        't' => out.push('\t'),
                        'u' => {
                            let mut code = 0u32;
                            for _ in 0..4 {
                                let d = self.peek()?.to_digit(16)?;
                                self.i += 1;
                                code = code * 16 + d;
                            }
                            out.push(char::from_u32(code)?);
                        }
                        _ => return None,
                    }
                }
                _ => out.push(c),
            }
        }
    }

    fn parse_number(&mut self) -> Option<Value> {
        let start = self.i;
        if self.peek() == Some('-') {
            self.i += 1;
        }
        let mut is_float = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' => self.i += 1,
                '.' | 'e' | 'E' | '+' | '-' => {
                    is_float = true;
                    self.i += 1;
                }
                _ => break,
            }
        }
        let text: String = self.chars[start..self.i].iter().collect();
        if is_float {
            text.parse::<f64>().ok().map(Value::Float)
        } else {
            text.parse::<num_bigint::BigInt>().ok().map(Value::Integer)
        }
    }
}

// ============================================================================
// Permissive decoding
// ============================================================================

/// Decode a permissive compact mapping or sequence: bare keys, unquoted
/// scalar values, nested inline forms.
pub fn parse_permissive(s: &str, interpret_dates: bool) -> Option<Value> {
    let s = s.trim();
    if !is_balanced(s) {
        return None;
    }
    let inner = &s[1..s.len() - 1];
    if s.starts_with('{') {
        let mut map = IndexMap::new();
        for entry in split_top_level(inner) {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let colon = find_top_level_colon(entry)?;
            let key = entry[..colon]
                .trim()
                .trim_matches(|c| c == '"' || c == '\'')
                .to_string();
            let value = permissive_value(entry[colon + 1..].trim(), interpret_dates)?;
            map.insert(key, value);
        }
        Some(Value::Mapping(map))
    } else {
        let mut seq = Vec::new();
        for entry in split_top_level(inner) {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            seq.push(permissive_value(entry, interpret_dates)?);
        }
        Some(Value::Sequence(seq))
    }
}

fn permissive_value(s: &str, interpret_dates: bool) -> Option<Value> {
    if s.starts_with('{') || s.starts_with('[') {
        return parse_permissive(s, interpret_dates);
    }
    if crate::classify::is_properly_quoted(s) {
        return Some(Value::String(s[1..s.len() - 1].to_string()));
    }
    Some(scalar::coerce(s, interpret_dates))
}

/// Split on commas at bracket depth zero, outside quotes.
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_double = false;
    let mut in_single = false;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '"' if !in_single => in_double = !in_double,
            '\'' if !in_double => in_single = !in_single,
            '{' | '[' if !in_double && !in_single => depth += 1,
            '}' | ']' if !in_double && !in_single => depth = depth.saturating_sub(1),
            ',' if depth == 0 && !in_double && !in_single => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Position of the first `:` at bracket depth zero, outside quotes.
fn find_top_level_colon(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_double = false;
    let mut in_single = false;
    for (i, c) in s.char_indices() {
        match c {
            '"' if !in_single => in_double = !in_double,
            '\'' if !in_double => in_single = !in_single,
            '{' | '[' if !in_double && !in_single => depth += 1,
            '}' | ']' if !in_double && !in_single => depth = depth.saturating_sub(1),
            ':' if depth == 0 && !in_double && !in_single => return Some(i),
            _ => {}
        }
    }
    None
}
