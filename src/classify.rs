//! Phase 1: Line Classifier
//!
//! The classifier turns one raw source line into a typed [`Node`] describing
//! what that line appears to be, independent of any surrounding context. It
//! never fails: ambiguous or ill-formed input degrades to `Partial` or
//! `Scalar` and error detection is deferred to assembly and building.

use crate::compact;

/// What a classified line (or a promoted node) is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Sentinel root of the whole hierarchy.
    Root,
    /// Empty line.
    Blank,
    /// Plain unquoted text.
    Scalar,
    /// Raw string content: a literal-block body line, or plain scalar lines
    /// folded together during assembly.
    Str,
    /// Quoted scalar, balanced on a single line.
    Quoted,
    /// Unterminated quoted string or inline form awaiting continuation lines.
    Partial,
    /// `name: value` mapping entry.
    Key,
    /// `- value` sequence entry.
    Item,
    /// `? key` explicit-key entry.
    SetKey,
    /// `: value` explicit-value entry.
    SetValue,
    /// `!name` tag annotation.
    Tag,
    /// `&name` anchor definition.
    RefDef,
    /// `*name` alias call.
    RefCall,
    /// `# ...` comment line (or inline remainder).
    Comment,
    /// `% ...` directive line.
    Directive,
    /// `|` block scalar header; content arrives on subsequent lines.
    Literal,
    /// `>` folded block scalar header.
    LiteralFolded,
    /// `---` document boundary.
    DocStart,
    /// `...` document terminator.
    DocEnd,
    /// Inline text that decodes as strict JSON.
    Json,
    /// Permissive `{...}` inline mapping.
    CompactMapping,
    /// Permissive `[...]` inline sequence.
    CompactSequence,
}

/// A classified node. Children only arise from recursive classification of a
/// line's value remainder; the assembler interns these small trees into its
/// arena.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    /// Leading space columns, tabs normalized to one space each.
    pub indent: usize,
    /// 1-based source line number.
    pub line: usize,
    /// Key name, anchor/alias/tag name, or literal chomp indicator.
    pub identifier: Option<String>,
    /// Raw scalar payload.
    pub text: Option<String>,
    /// Marks a comment split off a key's value remainder, as opposed to a
    /// full-line comment.
    pub inline: bool,
    pub children: Vec<Node>,
}

impl Node {
    fn new(kind: NodeKind, indent: usize, line: usize) -> Self {
        Self {
            kind,
            indent,
            line,
            identifier: None,
            text: None,
            inline: false,
            children: Vec::new(),
        }
    }

    /// The sentinel root node.
    pub fn root() -> Self {
        Self::new(NodeKind::Root, 0, 0)
    }
}

/// Classify a single raw line.
pub fn classify(raw: &str, line: usize) -> Node {
    let normalized = normalize_leading_tabs(raw);
    let indent = count_indent(&normalized);
    let trimmed = normalized.trim();

    if trimmed.is_empty() {
        return Node::new(NodeKind::Blank, indent, line);
    }
    if trimmed.starts_with("...") {
        return Node::new(NodeKind::DocEnd, indent, line);
    }
    if let Some((identifier, rest)) = match_key(trimmed) {
        return on_key(identifier, rest, indent, line);
    }
    identify(trimmed, indent, line)
}

/// Replace each leading tab with a single space. Permissive and lossy: a tab
/// counts for one indent column.
fn normalize_leading_tabs(raw: &str) -> String {
    let run = raw.chars().take_while(|&c| c == ' ' || c == '\t').count();
    let prefix: String = raw
        .chars()
        .take(run)
        .map(|c| if c == '\t' { ' ' } else { c })
        .collect();
    let body: String = raw.chars().skip(run).collect();
    prefix + &body
}

/// Count the number of leading spaces in a line.
fn count_indent(line: &str) -> usize {
    line.bytes().take_while(|&b| b == b' ').count()
}

/// Dispatch on the first non-space character (spec priority order).
fn identify(trimmed: &str, indent: usize, line: usize) -> Node {
    let first = trimmed.chars().next().unwrap();
    let rest = &trimmed[first.len_utf8()..];
    match first {
        '"' | '\'' => {
            let kind = if is_properly_quoted(trimmed) {
                NodeKind::Quoted
            } else {
                NodeKind::Partial
            };
            let mut n = Node::new(kind, indent, line);
            n.text = Some(trimmed.to_string());
            n
        }
        '{' | '[' => on_inline(trimmed, indent, line),
        '!' | '&' | '*' => on_reference(first, rest, indent, line),
        '?' | ':' => on_set_entry(first, rest, indent, line),
        '-' => on_hyphen(trimmed, indent, line),
        '#' => {
            let mut n = Node::new(NodeKind::Comment, indent, line);
            n.text = Some(rest.trim_start().to_string());
            n
        }
        '%' => {
            let mut n = Node::new(NodeKind::Directive, indent, line);
            n.text = Some(rest.trim_start().to_string());
            n
        }
        '>' => on_literal(NodeKind::LiteralFolded, rest, indent, line),
        '|' => on_literal(NodeKind::Literal, rest, indent, line),
        _ => {
            let mut n = Node::new(NodeKind::Scalar, indent, line);
            n.text = Some(trimmed.to_string());
            n
        }
    }
}

/// Build a KEY node: classify the value remainder as a child positioned at
/// `indent + identifier length`, splitting off a trailing inline comment.
fn on_key(identifier: String, rest: &str, indent: usize, line: usize) -> Node {
    let mut n = Node::new(NodeKind::Key, indent, line);
    let child_indent = indent + identifier.len();
    n.identifier = Some(identifier);

    let value = rest.trim();
    if !value.is_empty() {
        let (value, comment) = split_inline_comment(value);
        if !value.is_empty() {
            let mut child = classify(value, line);
            child.indent = child_indent;
            n.children.push(child);
        }
        if let Some(text) = comment {
            let mut c = Node::new(NodeKind::Comment, child_indent, line);
            c.text = Some(text.to_string());
            c.inline = true;
            n.children.push(c);
        }
    }
    n
}

/// `!`/`&`/`*`: tag, anchor definition, alias call. The identifier runs to
/// the next space; any remainder classifies as a child, unquoted first if it
/// is a fully-quoted scalar.
fn on_reference(first: char, rest: &str, indent: usize, line: usize) -> Node {
    let kind = match first {
        '!' => NodeKind::Tag,
        '&' => NodeKind::RefDef,
        _ => NodeKind::RefCall,
    };
    let mut n = Node::new(kind, indent, line);
    match rest.find(' ') {
        Some(pos) => {
            n.identifier = Some(rest[..pos].to_string());
            let mut value = rest[pos + 1..].trim();
            if is_properly_quoted(value) {
                value = &value[1..value.len() - 1];
            }
            if !value.is_empty() {
                let mut child = classify(value, line);
                child.indent = indent + pos;
                n.children.push(child);
            }
        }
        None => {
            n.identifier = Some(rest.to_string());
        }
    }
    n
}

/// `?`/`:`: explicit-key mapping entries.
fn on_set_entry(first: char, rest: &str, indent: usize, line: usize) -> Node {
    let kind = if first == '?' {
        NodeKind::SetKey
    } else {
        NodeKind::SetValue
    };
    let mut n = Node::new(kind, indent, line);
    let value = rest.trim();
    if !value.is_empty() {
        let mut child = classify(value, line);
        child.indent = indent + 2;
        n.children.push(child);
    }
    n
}

/// `-`: document boundary, sequence item, or a plain scalar with a literal
/// leading hyphen.
fn on_hyphen(trimmed: &str, indent: usize, line: usize) -> Node {
    if let Some(rest) = trimmed.strip_prefix("---") {
        let mut n = Node::new(NodeKind::DocStart, indent, line);
        let value = rest.trim();
        if !value.is_empty() {
            let mut child = classify(value, line);
            child.indent = indent + 4;
            n.children.push(child);
        }
        return n;
    }
    if trimmed == "-" {
        return Node::new(NodeKind::Item, indent, line);
    }
    if let Some(rest) = trimmed.strip_prefix("- ") {
        let mut n = Node::new(NodeKind::Item, indent, line);
        let value = rest.trim();
        if !value.is_empty() {
            let mut child = classify(value, line);
            child.indent = indent + 2;
            n.children.push(child);
        }
        return n;
    }
    let mut n = Node::new(NodeKind::Scalar, indent, line);
    n.text = Some(trimmed.to_string());
    n
}

/// `|`/`>` block scalar headers. A `+` or `-` remainder is the chomp
/// indicator; content arrives on subsequent lines.
fn on_literal(kind: NodeKind, rest: &str, indent: usize, line: usize) -> Node {
    let mut n = Node::new(kind, indent, line);
    let indicator = rest.trim();
    if !indicator.is_empty() {
        n.identifier = Some(indicator.to_string());
    }
    n
}

/// `{`/`[`: strict inline decoding first, then the permissive compact shape
/// match, else an open continuation.
fn on_inline(trimmed: &str, indent: usize, line: usize) -> Node {
    let kind = if compact::parse_strict(trimmed).is_some() {
        NodeKind::Json
    } else if compact::is_balanced(trimmed) {
        if trimmed.starts_with('{') {
            NodeKind::CompactMapping
        } else {
            NodeKind::CompactSequence
        }
    } else {
        NodeKind::Partial
    };
    let mut n = Node::new(kind, indent, line);
    n.text = Some(trimmed.to_string());
    n
}

/// Whether a scalar opens and closes with the same quote on this line, with
/// the closing quote not escaped.
pub fn is_properly_quoted(s: &str) -> bool {
    let mut chars = s.chars();
    let open = match chars.next() {
        Some(c @ ('"' | '\'')) => c,
        _ => return false,
    };
    if s.len() < 2 || !s.ends_with(open) {
        return false;
    }
    let body: Vec<char> = s.chars().collect();
    body[body.len() - 2] != '\\'
}

/// Match an `identifier: value` shape. The identifier is either quoted or
/// starts with a word character and runs over word characters, quotes,
/// spaces, `-`, `.` and `/`; the colon must be followed by a space or end the
/// line.
fn match_key(s: &str) -> Option<(String, &str)> {
    let mut chars = s.char_indices().peekable();
    let (_, first) = *chars.peek()?;

    let colon = if first == '"' || first == '\'' {
        chars.next();
        let mut close = None;
        for (i, c) in chars.by_ref() {
            if c == first {
                close = Some(i);
                break;
            }
        }
        let close = close?;
        let after = s[close + 1..].find(|c: char| c != ' ')? + close + 1;
        if s.as_bytes()[after] != b':' {
            return None;
        }
        after
    } else {
        if !first.is_alphanumeric() && first != '_' {
            return None;
        }
        let mut colon = None;
        for (i, c) in chars {
            if c == ':' {
                colon = Some(i);
                break;
            }
            let allowed = c.is_alphanumeric()
                || matches!(c, '_' | '"' | '\'' | ' ' | '-' | '.' | '/');
            if !allowed {
                return None;
            }
        }
        colon?
    };

    let rest = &s[colon + 1..];
    if !rest.is_empty() && !rest.starts_with(' ') && !rest.starts_with('\t') {
        return None;
    }
    let identifier = s[..colon]
        .trim_matches(|c| c == '"' || c == '\'' || c == ' ')
        .to_string();
    Some((identifier, rest))
}

/// Split a trailing inline comment at the first ` #` outside quotes.
fn split_inline_comment(s: &str) -> (&str, Option<&str>) {
    let mut in_double = false;
    let mut in_single = false;
    let mut prev_space = false;
    for (i, c) in s.char_indices() {
        match c {
            '"' if !in_single => in_double = !in_double,
            '\'' if !in_double => in_single = !in_single,
            '#' if prev_space && !in_double && !in_single => {
                return (s[..i].trim_end(), Some(s[i + 1..].trim_start()));
            }
            _ => {}
        }
        prev_space = c == ' ';
    }
    (s, None)
}
