//! Phase 2: Tree Assembler
//!
//! The assembler consumes classified nodes one at a time, in line order, and
//! threads them into a single hierarchy. Attachment is driven by indentation
//! plus a small set of stateful rules: open continuations (`Partial`),
//! deferred blank lines, literal-block bodies, and plain-scalar folding.
//!
//! Nodes live in an arena addressed by [`NodeId`]; the tree is encoded as
//! explicit child lists, with a `parent` index used only for upward walks.

use crate::classify::{classify, Node, NodeKind};
use crate::error::{ErrorSink, LoadError, Result};

/// Arena index of a node.
pub type NodeId = usize;

/// Aggregate kind of a node's child list. Mutable while evidence accumulates
/// during assembly, frozen once building begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// No structural evidence yet.
    Open,
    /// Holds keyed children.
    Mapping,
    /// Holds indexed items.
    Sequence,
    /// Holds explicit-key entries.
    Set,
    /// Holds literal block content lines.
    Literal,
    /// Holds folded block content lines.
    LiteralFolded,
}

/// A node in the arena.
#[derive(Debug)]
pub struct NodeData {
    pub kind: NodeKind,
    pub indent: usize,
    pub line: usize,
    pub identifier: Option<String>,
    pub text: Option<String>,
    pub inline: bool,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub list_kind: ListKind,
}

/// The assembled hierarchy.
#[derive(Debug)]
pub struct Tree {
    nodes: Vec<NodeData>,
}

impl Tree {
    fn new() -> Self {
        let mut tree = Tree { nodes: Vec::new() };
        tree.push_data(Node::root());
        tree
    }

    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id]
    }

    fn push_data(&mut self, node: Node) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(NodeData {
            kind: node.kind,
            indent: node.indent,
            line: node.line,
            identifier: node.identifier,
            text: node.text,
            inline: node.inline,
            parent: None,
            children: Vec::new(),
            list_kind: ListKind::Open,
        });
        id
    }

    /// Flatten an owned classified node into the arena.
    fn intern(&mut self, mut node: Node) -> NodeId {
        let children = std::mem::take(&mut node.children);
        let id = self.push_data(node);
        for child in children {
            let child_id = self.intern(child);
            self.add(id, child_id);
        }
        id
    }

    /// Attach `child` under `parent`, delegating past scalar leaves (a plain
    /// or quoted scalar cannot hold structure) and updating the aggregate
    /// list kind.
    fn add(&mut self, parent: NodeId, child: NodeId) {
        let mut p = parent;
        while matches!(self.nodes[p].kind, NodeKind::Scalar | NodeKind::Quoted) {
            match self.nodes[p].parent {
                Some(up) => p = up,
                None => break,
            }
        }
        self.nodes[child].parent = Some(p);
        self.nodes[p].children.push(child);
        self.refresh_list_kind(p);
    }

    fn refresh_list_kind(&mut self, id: NodeId) {
        let forced = match self.nodes[id].kind {
            NodeKind::Literal => Some(ListKind::Literal),
            NodeKind::LiteralFolded => Some(ListKind::LiteralFolded),
            _ => None,
        };
        if let Some(kind) = forced {
            self.nodes[id].list_kind = kind;
            return;
        }
        if self.nodes[id].list_kind != ListKind::Open {
            return;
        }
        let inferred = self.nodes[id]
            .children
            .iter()
            .find_map(|&c| infer_list_kind(self.nodes[c].kind));
        if let Some(kind) = inferred {
            self.nodes[id].list_kind = kind;
        }
    }

    /// The deepest single-child descendant: follow sole children down until
    /// a leaf or a multi-child node.
    pub fn deepest(&self, mut id: NodeId) -> NodeId {
        while self.nodes[id].children.len() == 1 {
            id = self.nodes[id].children[0];
        }
        id
    }

    /// Nearest ancestor suitable as a parent for a node at `indent`: an
    /// ancestor at exactly that indent yields its own parent, but only if it
    /// agrees with the incoming node on item-ness; a mismatch escalates the
    /// walk one level further up.
    fn ancestor_for_indent(&self, from: NodeId, indent: usize, incoming: NodeKind) -> NodeId {
        let mut cursor = from;
        loop {
            let node = &self.nodes[cursor];
            if node.kind == NodeKind::Root || node.indent < indent {
                return cursor;
            }
            if node.indent == indent
                && (node.kind == NodeKind::Item) == (incoming == NodeKind::Item)
            {
                return node.parent.unwrap_or(cursor);
            }
            match node.parent {
                Some(up) => cursor = up,
                None => return cursor,
            }
        }
    }

    /// Re-run classification over an open continuation, replacing the node's
    /// content in place. The original indent and line number are kept.
    fn reclassify(&mut self, id: NodeId, combined: &str) {
        let node = classify(combined, self.nodes[id].line);
        self.nodes[id].kind = node.kind;
        self.nodes[id].identifier = node.identifier.clone();
        self.nodes[id].text = node.text.clone();
        for child in node.children {
            let child_id = self.intern(child);
            self.add(id, child_id);
        }
    }
}

fn infer_list_kind(kind: NodeKind) -> Option<ListKind> {
    match kind {
        NodeKind::Key => Some(ListKind::Mapping),
        NodeKind::Item => Some(ListKind::Sequence),
        NodeKind::SetKey => Some(ListKind::Set),
        NodeKind::Literal => Some(ListKind::Literal),
        NodeKind::LiteralFolded => Some(ListKind::LiteralFolded),
        _ => None,
    }
}

fn is_literal_header(kind: NodeKind) -> bool {
    matches!(kind, NodeKind::Literal | NodeKind::LiteralFolded)
}

/// Stateful assembler: feed raw lines in order, then `finish`.
pub struct Assembler {
    tree: Tree,
    root: NodeId,
    previous: NodeId,
    /// Blank lines held back with their recorded target until the next
    /// non-special line resolves whether they belong to a literal block.
    pending_blanks: Vec<(NodeId, NodeId)>,
}

impl Assembler {
    pub fn new() -> Self {
        let tree = Tree::new();
        Assembler {
            tree,
            root: 0,
            previous: 0,
            pending_blanks: Vec::new(),
        }
    }

    /// Consume one raw source line.
    pub fn push_line(&mut self, raw: &str, line_no: usize) {
        let deepest = self.tree.deepest(self.previous);

        // Open continuation: concatenate and reclassify in place instead of
        // treating this as a new node.
        if self.tree.node(deepest).kind == NodeKind::Partial {
            let mut combined = self.tree.node(deepest).text.clone().unwrap_or_default();
            combined.push_str(raw);
            self.tree.reclassify(deepest, &combined);
            return;
        }

        let n = classify(raw, line_no);
        match n.kind {
            // These bind to the immediately preceding structural node, not
            // to the indent-derived parent.
            NodeKind::RefDef | NodeKind::SetValue | NodeKind::Tag => {
                let id = self.tree.intern(n);
                self.tree.add(deepest, id);
                self.previous = id;
                return;
            }
            NodeKind::Blank => {
                let target = if self.tree.node(self.previous).kind == NodeKind::Str {
                    self.tree.node(self.previous).parent.unwrap_or(self.root)
                } else {
                    deepest
                };
                let id = self.tree.intern(n);
                self.pending_blanks.push((target, id));
                return;
            }
            _ => {}
        }

        self.flush_blanks();
        self.attach(n, deepest, raw);
    }

    fn flush_blanks(&mut self) {
        for (target, blank) in std::mem::take(&mut self.pending_blanks) {
            self.tree.add(target, blank);
        }
    }

    /// Indent-driven attachment of a non-special node.
    fn attach(&mut self, mut n: Node, deepest: NodeId, raw: &str) {
        let prev_indent = self.tree.node(self.previous).indent;
        let parent;

        if n.indent == 0 {
            parent = self.root;
        } else if n.indent < prev_indent {
            parent = self.tree.ancestor_for_indent(self.previous, n.indent, n.kind);
        } else if n.indent == prev_indent {
            parent = self.tree.node(self.previous).parent.unwrap_or(self.root);
        } else {
            let deep_kind = self.tree.node(deepest).kind;
            if is_literal_header(deep_kind) {
                parent = deepest;
            } else if matches!(deep_kind, NodeKind::Blank | NodeKind::Str | NodeKind::Scalar) {
                let deep_parent = self.tree.node(deepest).parent;
                let under_literal = deep_parent
                    .map(|p| is_literal_header(self.tree.node(p).kind))
                    .unwrap_or(false);
                if matches!(n.kind, NodeKind::Scalar | NodeKind::Str)
                    && n.children.is_empty()
                    && !under_literal
                {
                    // plain multi-line scalar folding: merge instead of
                    // attaching a new node
                    self.merge_into(deepest, n.text.as_deref().unwrap_or(""));
                    return;
                }
                if self.tree.node(self.previous).kind == NodeKind::Item {
                    parent = self.previous;
                } else {
                    parent = deep_parent.unwrap_or(self.root);
                }
            } else {
                parent = self.previous;
            }
        }

        // any line landing under a block scalar header is body text, kept
        // raw no matter how it classified on its own
        if is_literal_header(self.tree.node(parent).kind) && n.kind != NodeKind::Str {
            n.kind = NodeKind::Str;
            n.identifier = None;
            n.text = Some(raw.trim().to_string());
            n.children.clear();
        }

        let id = self.tree.intern(n);
        self.tree.add(parent, id);
        self.previous = id;
    }

    fn merge_into(&mut self, id: NodeId, text: &str) {
        let node = &mut self.tree.nodes[id];
        node.kind = NodeKind::Str;
        let mut merged = node.text.take().unwrap_or_default();
        merged.push('\n');
        merged.push_str(text);
        node.text = Some(merged);
        // previous is deliberately left unchanged
    }

    /// Flush deferred state and hand over the finished hierarchy. An input
    /// that ends inside an open continuation is reported and the dangling
    /// node degrades to a raw scalar.
    pub fn finish(mut self, sink: &mut ErrorSink) -> Result<(Tree, NodeId)> {
        self.flush_blanks();
        let deepest = self.tree.deepest(self.previous);
        if self.tree.node(deepest).kind == NodeKind::Partial {
            sink.report(LoadError::UnterminatedContinuation(
                self.tree.node(deepest).line,
            ))?;
            self.tree.nodes[deepest].kind = NodeKind::Scalar;
        }
        Ok((self.tree, self.root))
    }
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorMode;

    fn assemble(lines: &[&str]) -> (Tree, NodeId) {
        let mut asm = Assembler::new();
        for (i, line) in lines.iter().enumerate() {
            asm.push_line(line, i + 1);
        }
        let mut sink = ErrorSink::new(ErrorMode::Accumulate);
        asm.finish(&mut sink).unwrap()
    }

    #[test]
    fn siblings_share_a_parent() {
        let (tree, root) = assemble(&["a: 1", "b: 2"]);
        let children = &tree.node(root).children;
        assert_eq!(children.len(), 2);
        assert_eq!(tree.node(root).list_kind, ListKind::Mapping);
    }

    #[test]
    fn indent_nests_under_previous() {
        let (tree, root) = assemble(&["outer:", "  inner: 1"]);
        let outer = tree.node(root).children[0];
        assert_eq!(tree.node(outer).kind, NodeKind::Key);
        let inner = tree.node(outer).children[0];
        assert_eq!(tree.node(inner).identifier.as_deref(), Some("inner"));
        assert_eq!(tree.node(inner).parent, Some(outer));
    }

    #[test]
    fn dedent_walks_back_to_matching_ancestor() {
        let (tree, root) = assemble(&["a:", "  b:", "    c: 1", "  d: 2"]);
        let a = tree.node(root).children[0];
        assert_eq!(tree.node(a).children.len(), 2);
        let d = tree.node(a).children[1];
        assert_eq!(tree.node(d).identifier.as_deref(), Some("d"));
    }

    #[test]
    fn item_keeps_nested_keys_together() {
        let (tree, root) = assemble(&["list:", "  - name: apple", "    color: red"]);
        let list = tree.node(root).children[0];
        let item = tree.node(list).children[0];
        assert_eq!(tree.node(item).kind, NodeKind::Item);
        assert_eq!(tree.node(item).children.len(), 2);
        assert_eq!(tree.node(item).list_kind, ListKind::Mapping);
    }

    #[test]
    fn literal_body_lines_attach_to_header() {
        let (tree, root) = assemble(&["text: |", "  first", "  second"]);
        let key = tree.node(root).children[0];
        let header = tree.node(key).children[0];
        assert_eq!(tree.node(header).kind, NodeKind::Literal);
        assert_eq!(tree.node(header).children.len(), 2);
        assert_eq!(tree.node(header).list_kind, ListKind::Literal);
        let first = tree.node(header).children[0];
        assert_eq!(tree.node(first).kind, NodeKind::Str);
        assert_eq!(tree.node(first).text.as_deref(), Some("first"));
    }

    #[test]
    fn structured_looking_body_lines_stay_raw() {
        let (tree, root) = assemble(&["text: |", "  a: b", "  c: d"]);
        let key = tree.node(root).children[0];
        let header = tree.node(key).children[0];
        let body = &tree.node(header).children;
        assert_eq!(body.len(), 2);
        assert!(body.iter().all(|&c| tree.node(c).kind == NodeKind::Str));
        assert_eq!(tree.node(body[0]).text.as_deref(), Some("a: b"));
        assert_eq!(tree.node(body[1]).text.as_deref(), Some("c: d"));
    }

    #[test]
    fn blank_inside_literal_is_deferred_then_kept() {
        let (tree, root) = assemble(&["text: |", "  a", "", "  b"]);
        let key = tree.node(root).children[0];
        let header = tree.node(key).children[0];
        let kinds: Vec<NodeKind> = tree
            .node(header)
            .children
            .iter()
            .map(|&c| tree.node(c).kind)
            .collect();
        assert_eq!(kinds, vec![NodeKind::Str, NodeKind::Blank, NodeKind::Str]);
    }

    #[test]
    fn plain_scalar_lines_fold_into_one_node() {
        let (tree, root) = assemble(&["text: one", "  two"]);
        let key = tree.node(root).children[0];
        assert_eq!(tree.node(key).children.len(), 1);
        let folded = tree.node(key).children[0];
        assert_eq!(tree.node(folded).kind, NodeKind::Str);
        assert_eq!(tree.node(folded).text.as_deref(), Some("one\ntwo"));
    }

    #[test]
    fn partial_quote_continues_across_lines() {
        let (tree, root) = assemble(&["text: \"first", "second\""]);
        let key = tree.node(root).children[0];
        let value = tree.node(key).children[0];
        assert_eq!(tree.node(value).kind, NodeKind::Quoted);
        assert_eq!(tree.node(value).text.as_deref(), Some("\"firstsecond\""));
    }

    #[test]
    fn partial_inline_form_continues_across_lines() {
        let (tree, root) = assemble(&["compact: {a: 1,", "b: 2}"]);
        let key = tree.node(root).children[0];
        let value = tree.node(key).children[0];
        assert_eq!(tree.node(value).kind, NodeKind::CompactMapping);
    }

    #[test]
    fn unterminated_continuation_is_reported() {
        let mut asm = Assembler::new();
        asm.push_line("text: \"never closed", 1);
        let mut sink = ErrorSink::new(ErrorMode::Accumulate);
        asm.finish(&mut sink).unwrap();
        assert_eq!(
            sink.into_errors(),
            vec![LoadError::UnterminatedContinuation(1)]
        );
    }

    #[test]
    fn anchor_binds_to_preceding_node() {
        let (tree, root) = assemble(&["key:", "  &anchor 5"]);
        let key = tree.node(root).children[0];
        let anchor = tree.node(key).children[0];
        assert_eq!(tree.node(anchor).kind, NodeKind::RefDef);
        assert_eq!(tree.node(anchor).identifier.as_deref(), Some("anchor"));
    }
}
