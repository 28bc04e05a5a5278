//! Phase 3: Document Builder
//!
//! Walks the assembled hierarchy and produces native [`Value`] documents.
//! The root's children split into documents at `---` boundaries; within a
//! document the builder infers the overall shape, folds literal blocks,
//! resolves anchors and aliases, and records comments and directives.
//!
//! Anchors are scoped to their document: each document starts with an empty
//! anchor table, and aliases resolve by cloning the anchored value.

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;

use crate::assemble::{NodeId, Tree};
use crate::classify::NodeKind;
use crate::error::{ErrorSink, LoadError, Result};
use crate::scalar;
use crate::value::Value;
use crate::{compact, Options};

/// Largest gap an explicit numeric item index may open in a sequence. The
/// index is input-controlled; anything further out appends as a plain entry
/// instead of materializing the padding.
const MAX_INDEX_GAP: usize = 256;

/// One built document with its ancillary records.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub value: Value,
    /// Comment text keyed by 1-based source line number.
    pub comments: BTreeMap<usize, String>,
    /// Directive lines in source order.
    pub directives: Vec<(usize, String)>,
}

/// Build every document under `root`.
pub fn build_documents(
    tree: &Tree,
    root: NodeId,
    options: &Options,
    sink: &mut ErrorSink,
) -> Result<Vec<Document>> {
    let mut groups: Vec<Vec<NodeId>> = vec![Vec::new()];
    let mut starts = 0usize;
    for &child in &tree.node(root).children {
        if tree.node(child).kind == NodeKind::DocStart {
            starts += 1;
            // the first marker still belongs to document zero
            if starts > 1 {
                groups.push(Vec::new());
            }
        }
        groups.last_mut().unwrap().push(child);
    }

    let mut documents = Vec::new();
    for (index, group) in groups.iter().enumerate() {
        let mut builder = DocBuilder::new(options);
        let value = builder.build_document(tree, group, index, sink)?;
        documents.push(Document {
            value,
            comments: builder.comments,
            directives: builder.directives,
        });
    }
    Ok(documents)
}

/// Per-document build state.
struct DocBuilder<'o> {
    options: &'o Options,
    anchors: HashMap<String, Value>,
    comments: BTreeMap<usize, String>,
    directives: Vec<(usize, String)>,
}

impl<'o> DocBuilder<'o> {
    fn new(options: &'o Options) -> Self {
        Self {
            options,
            anchors: HashMap::new(),
            comments: BTreeMap::new(),
            directives: Vec::new(),
        }
    }

    fn build_document(
        &mut self,
        tree: &Tree,
        group: &[NodeId],
        index: usize,
        sink: &mut ErrorSink,
    ) -> Result<Value> {
        // a `---` marker's own children are document content
        let mut content: Vec<NodeId> = Vec::new();
        for &id in group {
            match tree.node(id).kind {
                NodeKind::DocStart => content.extend(tree.node(id).children.iter().copied()),
                NodeKind::DocEnd => {}
                _ => content.push(id),
            }
        }

        let mut structural: Vec<NodeId> = Vec::new();
        for &id in &content {
            match tree.node(id).kind {
                NodeKind::Comment => self.record_comment(tree, id),
                NodeKind::Directive => self.record_directive(tree, id),
                NodeKind::Blank => {}
                _ => structural.push(id),
            }
        }

        let has_key = structural
            .iter()
            .any(|&id| matches!(tree.node(id).kind, NodeKind::Key | NodeKind::SetValue));
        let has_item = structural
            .iter()
            .any(|&id| tree.node(id).kind == NodeKind::Item);
        let has_set = structural
            .iter()
            .any(|&id| tree.node(id).kind == NodeKind::SetKey);

        if has_key && has_item {
            sink.report(LoadError::ContradictoryDocumentShape(index))?;
            // best effort: prefer the mapping reading
            return self.build_mapping(tree, &structural, sink);
        }
        if has_key {
            return self.build_mapping(tree, &structural, sink);
        }
        if has_item {
            return self.build_sequence(tree, &structural, sink);
        }
        if has_set {
            return self.build_set(tree, &structural, sink);
        }
        self.build_scalar_content(tree, &structural, sink)
    }

    // ========================================================================
    // Containers
    // ========================================================================

    fn build_mapping(
        &mut self,
        tree: &Tree,
        children: &[NodeId],
        sink: &mut ErrorSink,
    ) -> Result<Value> {
        let mut map: IndexMap<String, Value> = IndexMap::new();
        for &id in children {
            let node = tree.node(id);
            match node.kind {
                NodeKind::Key => {
                    let name = node.identifier.as_deref().unwrap_or("");
                    if name.is_empty() {
                        sink.report(LoadError::EmptyKeyName(node.line))?;
                        continue;
                    }
                    let value = self.build_value_of(tree, id, sink)?;
                    // overwriting keeps the key's original position
                    map.insert(name.to_string(), value);
                }
                NodeKind::SetValue => {
                    sink.report(LoadError::EmptyKeyName(node.line))?;
                }
                NodeKind::Comment => self.record_comment(tree, id),
                NodeKind::Directive => self.record_directive(tree, id),
                NodeKind::RefDef => {
                    // anchor definition at container level: register, no entry
                    self.build_node(tree, id, sink)?;
                }
                _ => {}
            }
        }
        Ok(Value::Mapping(map))
    }

    fn build_sequence(
        &mut self,
        tree: &Tree,
        children: &[NodeId],
        sink: &mut ErrorSink,
    ) -> Result<Value> {
        let mut seq: Vec<Value> = Vec::new();
        for &id in children {
            let node = tree.node(id);
            match node.kind {
                NodeKind::Item => match self.explicit_index(tree, id) {
                    Some((index, key)) if index <= seq.len() + MAX_INDEX_GAP => {
                        let value = self.build_value_of(tree, key, sink)?;
                        while seq.len() <= index {
                            seq.push(Value::Null);
                        }
                        seq[index] = value;
                    }
                    _ => seq.push(self.build_value_of(tree, id, sink)?),
                },
                NodeKind::Comment => self.record_comment(tree, id),
                NodeKind::Directive => self.record_directive(tree, id),
                NodeKind::RefDef => {
                    self.build_node(tree, id, sink)?;
                }
                _ => {}
            }
        }
        Ok(Value::Sequence(seq))
    }

    /// An item holding a single key with an all-digit name binds at that
    /// index instead of appending.
    fn explicit_index(&self, tree: &Tree, item: NodeId) -> Option<(usize, NodeId)> {
        let structural: Vec<NodeId> = tree
            .node(item)
            .children
            .iter()
            .copied()
            .filter(|&c| {
                !matches!(
                    tree.node(c).kind,
                    NodeKind::Comment | NodeKind::Blank | NodeKind::Directive
                )
            })
            .collect();
        match structural.as_slice() {
            [sole] if tree.node(*sole).kind == NodeKind::Key => {
                let name = tree.node(*sole).identifier.as_deref()?;
                let index = name.parse::<usize>().ok()?;
                Some((index, *sole))
            }
            _ => None,
        }
    }

    fn build_set(
        &mut self,
        tree: &Tree,
        children: &[NodeId],
        sink: &mut ErrorSink,
    ) -> Result<Value> {
        let mut set: IndexMap<String, Value> = IndexMap::new();
        for &id in children {
            let node = tree.node(id);
            match node.kind {
                NodeKind::SetKey => {
                    let mut key: Option<Value> = None;
                    let mut value = Value::Null;
                    for &c in &node.children {
                        match tree.node(c).kind {
                            NodeKind::SetValue => {
                                value = self.build_value_of(tree, c, sink)?;
                            }
                            NodeKind::Comment => self.record_comment(tree, c),
                            NodeKind::Blank => {}
                            _ if key.is_none() => {
                                key = Some(self.build_node(tree, c, sink)?);
                            }
                            _ => {}
                        }
                    }
                    let key = key.unwrap_or(Value::Null);
                    set.insert(key_string(&key), value);
                }
                NodeKind::Comment => self.record_comment(tree, id),
                NodeKind::Directive => self.record_directive(tree, id),
                _ => {}
            }
        }
        Ok(Value::Set(set))
    }

    /// Content with no mapping or sequence evidence: zero nodes is null, one
    /// builds directly, several plain lines join as one string.
    fn build_scalar_content(
        &mut self,
        tree: &Tree,
        children: &[NodeId],
        sink: &mut ErrorSink,
    ) -> Result<Value> {
        match children {
            [] => Ok(Value::Null),
            [sole] => self.build_node(tree, *sole, sink),
            many => {
                let mut parts = Vec::new();
                for &id in many {
                    parts.push(key_string(&self.build_node(tree, id, sink)?));
                }
                Ok(Value::String(parts.join("\n")))
            }
        }
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    /// Build the value a node's children represent.
    fn build_value_of(&mut self, tree: &Tree, id: NodeId, sink: &mut ErrorSink) -> Result<Value> {
        let mut structural: Vec<NodeId> = Vec::new();
        for &c in &tree.node(id).children {
            match tree.node(c).kind {
                NodeKind::Comment => self.record_comment(tree, c),
                NodeKind::Directive => self.record_directive(tree, c),
                NodeKind::Blank => {}
                // a `: value` line can only pair with an explicit `? key`
                NodeKind::SetValue if tree.node(id).kind != NodeKind::SetValue => {
                    sink.report(LoadError::EmptyKeyName(tree.node(c).line))?;
                }
                _ => structural.push(c),
            }
        }

        let has_key = structural
            .iter()
            .any(|&c| tree.node(c).kind == NodeKind::Key);
        let has_item = structural
            .iter()
            .any(|&c| tree.node(c).kind == NodeKind::Item);
        let has_set = structural
            .iter()
            .any(|&c| tree.node(c).kind == NodeKind::SetKey);

        if has_key {
            self.build_mapping(tree, &structural, sink)
        } else if has_item {
            self.build_sequence(tree, &structural, sink)
        } else if has_set {
            self.build_set(tree, &structural, sink)
        } else {
            match structural.as_slice() {
                [] => Ok(Value::Null),
                [sole] => self.build_node(tree, *sole, sink),
                many => {
                    let mut parts = Vec::new();
                    for &c in many {
                        parts.push(key_string(&self.build_node(tree, c, sink)?));
                    }
                    Ok(Value::String(parts.join("\n")))
                }
            }
        }
    }

    /// Build one node into a value.
    fn build_node(&mut self, tree: &Tree, id: NodeId, sink: &mut ErrorSink) -> Result<Value> {
        let node = tree.node(id);
        match node.kind {
            NodeKind::Scalar | NodeKind::Partial => Ok(scalar::coerce(
                node.text.as_deref().unwrap_or(""),
                self.options.interpret_dates,
            )),
            NodeKind::Str => Ok(Value::String(node.text.clone().unwrap_or_default())),
            NodeKind::Quoted => {
                let text = node.text.as_deref().unwrap_or("").trim();
                Ok(Value::String(text[1..text.len() - 1].to_string()))
            }
            NodeKind::Blank => Ok(Value::Null),
            NodeKind::Key | NodeKind::Item | NodeKind::SetValue => {
                self.build_value_of(tree, id, sink)
            }
            NodeKind::Literal => self.fold_literal(tree, id, false),
            NodeKind::LiteralFolded => self.fold_literal(tree, id, true),
            NodeKind::RefDef => {
                let value = self.build_value_of(tree, id, sink)?;
                if let Some(name) = &node.identifier {
                    self.anchors.insert(name.clone(), value.clone());
                }
                Ok(value)
            }
            NodeKind::RefCall => {
                let name = node.identifier.clone().unwrap_or_default();
                match self.anchors.get(&name) {
                    Some(value) => Ok(value.clone()),
                    None => {
                        sink.report(LoadError::UndefinedReference {
                            name,
                            line: node.line,
                        })?;
                        Ok(Value::Null)
                    }
                }
            }
            NodeKind::Tag => {
                let name = node.identifier.clone().unwrap_or_default();
                let inner = self.build_value_of(tree, id, sink)?;
                Ok(Value::Tagged(name, Box::new(inner)))
            }
            NodeKind::Json => {
                let text = node.text.as_deref().unwrap_or("");
                match compact::parse_strict(text) {
                    Some(value) => Ok(Value::Compact(Box::new(value))),
                    None => {
                        sink.report(LoadError::MalformedCompactForm(node.line))?;
                        Ok(Value::String(text.to_string()))
                    }
                }
            }
            NodeKind::CompactMapping | NodeKind::CompactSequence => {
                let text = node.text.as_deref().unwrap_or("");
                match compact::parse_permissive(text, self.options.interpret_dates) {
                    Some(value) => Ok(Value::Compact(Box::new(value))),
                    None => {
                        sink.report(LoadError::MalformedCompactForm(node.line))?;
                        Ok(Value::String(text.to_string()))
                    }
                }
            }
            NodeKind::Comment => {
                self.record_comment(tree, id);
                Ok(Value::Null)
            }
            NodeKind::Directive => {
                self.record_directive(tree, id);
                Ok(Value::Null)
            }
            NodeKind::Root | NodeKind::DocStart | NodeKind::DocEnd | NodeKind::SetKey => {
                Ok(Value::Null)
            }
        }
    }

    // ========================================================================
    // Block scalars
    // ========================================================================

    /// Join a block scalar's body. Literal keeps line breaks; folded joins
    /// with spaces, breaking on blank lines and on deeper-indented content.
    /// A `+` chomp indicator keeps boundary blank lines.
    fn fold_literal(&mut self, tree: &Tree, id: NodeId, folded: bool) -> Result<Value> {
        let node = tree.node(id);
        let keep = node.identifier.as_deref() == Some("+");

        let mut lines: Vec<(usize, bool, String)> = node
            .children
            .iter()
            .map(|&c| {
                let child = tree.node(c);
                (
                    child.indent,
                    child.kind == NodeKind::Blank,
                    child.text.clone().unwrap_or_default(),
                )
            })
            .collect();

        if !keep {
            while matches!(lines.first(), Some((_, true, _))) {
                lines.remove(0);
            }
            while matches!(lines.last(), Some((_, true, _))) {
                lines.pop();
            }
        }

        if !folded {
            let texts: Vec<&str> = lines.iter().map(|(_, _, t)| t.as_str()).collect();
            return Ok(Value::String(texts.join("\n")));
        }

        let reference = lines
            .iter()
            .find(|(_, blank, _)| !blank)
            .map(|(indent, _, _)| *indent)
            .unwrap_or(0);
        let mut out = String::new();
        for (indent, blank, text) in &lines {
            if *blank {
                out.push('\n');
                continue;
            }
            if out.is_empty() {
                out.push_str(text);
            } else if *indent > reference {
                out.push('\n');
                out.push_str(text);
            } else if out.ends_with('\n') {
                out.push_str(text);
            } else {
                out.push(' ');
                out.push_str(text);
            }
        }
        Ok(Value::String(out))
    }

    // ========================================================================
    // Records
    // ========================================================================

    fn record_comment(&mut self, tree: &Tree, id: NodeId) {
        if self.options.include_comments {
            let node = tree.node(id);
            self.comments
                .insert(node.line, node.text.clone().unwrap_or_default());
        }
    }

    fn record_directive(&mut self, tree: &Tree, id: NodeId) {
        if self.options.include_directives {
            let node = tree.node(id);
            self.directives
                .push((node.line, node.text.clone().unwrap_or_default()));
        }
    }
}

/// String form of a value used as a set or join key. Wrappers unwrap down
/// to their string content before the debug rendering kicks in.
fn key_string(value: &Value) -> String {
    match value.flatten() {
        Value::String(s) => s.clone(),
        Value::Tagged(_, inner) => key_string(inner),
        other => format!("{:?}", other),
    }
}
