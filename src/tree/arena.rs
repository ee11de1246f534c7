//! Arena storage for one statement's token tree, with the cursor and mutation
//! primitives the grouping passes and formatting filters are built from.
//!
//! Design notes:
//! - Nodes live in a `Vec` and are addressed by [`NodeId`]; a node stores the id
//!   of its parent, a group stores the ids of its children. Parent links are
//!   plain indices and never keep anything alive.
//! - Nodes are never freed. Grouping moves ids between child lists; removing a
//!   child detaches it (parent `None`) and leaves it in the arena.
//! - Child positions (`idx`) are indices into the parent's current child list
//!   and are invalidated by any mutation of that list.
//!
//! Guarantees:
//! - Mutations keep child order and never place a node in two child lists.
//! - Grouping never changes the flattened text; only `insert_*`, `remove` and
//!   `set_value` do, and those are reserved for formatting.
//!
//! Panics:
//! - Methods panic when handed an id from another tree, a token where a group
//!   is required, or an out-of-bounds span, the same way slice indexing does.
use crate::tree::node::{Node, NodeData};
use crate::*;
use std::borrow::Cow;
use std::fmt::Write as _;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes ever allocated, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node { parent: None, data });
        id
    }

    /// Allocate a detached token node.
    pub fn add_token(&mut self, token: Token) -> NodeId {
        self.push(NodeData::Token(token))
    }

    /// Allocate a detached group owning `children`.
    pub fn add_group(&mut self, kind: GroupKind, children: Vec<NodeId>) -> NodeId {
        let id = self.push(NodeData::Group {
            kind,
            children: Vec::new(),
        });
        for &child in &children {
            self.nodes[child.0].parent = Some(id);
        }
        *self.children_mut(id) = children;
        id
    }

    fn children_mut(&mut self, id: NodeId) -> &mut Vec<NodeId> {
        match &mut self.nodes[id.0].data {
            NodeData::Group { children, .. } => children,
            NodeData::Token(_) => panic!("{id} is a token, not a group"),
        }
    }

    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef::new(self, id)
    }

    pub fn token(&self, id: NodeId) -> Option<&Token> {
        match &self.nodes[id.0].data {
            NodeData::Token(token) => Some(token),
            NodeData::Group { .. } => None,
        }
    }

    pub fn token_mut(&mut self, id: NodeId) -> Option<&mut Token> {
        match &mut self.nodes[id.0].data {
            NodeData::Token(token) => Some(token),
            NodeData::Group { .. } => None,
        }
    }

    pub fn kind(&self, id: NodeId) -> Option<GroupKind> {
        match &self.nodes[id.0].data {
            NodeData::Group { kind, .. } => Some(*kind),
            NodeData::Token(_) => None,
        }
    }

    pub fn is_group(&self, id: NodeId) -> bool {
        self.kind(id).is_some()
    }

    pub fn is_kind(&self, id: NodeId, kind: GroupKind) -> bool {
        self.kind(id) == Some(kind)
    }

    pub fn is_any_kind(&self, id: NodeId, kinds: &[GroupKind]) -> bool {
        self.kind(id).is_some_and(|k| kinds.contains(&k))
    }

    /// Children of a group; empty for tokens.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.nodes[id.0].data {
            NodeData::Group { children, .. } => children,
            NodeData::Token(_) => &[],
        }
    }

    pub fn child(&self, id: NodeId, idx: usize) -> Option<NodeId> {
        self.children(id).get(idx).copied()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn category(&self, id: NodeId) -> Option<Category> {
        self.token(id).map(|t| t.category)
    }

    /// Hierarchical category test; always false for groups.
    pub fn is_a(&self, id: NodeId, category: Category) -> bool {
        self.category(id).is_some_and(|c| c.is_a(category))
    }

    /// Exact category (and optional value) test; always false for groups.
    pub fn matches(&self, id: NodeId, category: Category, values: &[&str]) -> bool {
        self.token(id).is_some_and(|t| t.matches(category, values))
    }

    pub fn matches_pattern(&self, id: NodeId, pattern: Pattern) -> bool {
        self.token(id).is_some_and(|t| pattern.matches(t))
    }

    pub fn is_whitespace(&self, id: NodeId) -> bool {
        self.token(id).is_some_and(Token::is_whitespace)
    }

    pub fn is_keyword(&self, id: NodeId) -> bool {
        self.token(id).is_some_and(Token::is_keyword)
    }

    /// Comment token or Comment group.
    pub fn is_comment(&self, id: NodeId) -> bool {
        self.is_kind(id, GroupKind::Comment) || self.token(id).is_some_and(Token::is_comment)
    }

    /// Upper-cased text for keywords, the plain value otherwise.
    pub fn normalized(&self, id: NodeId) -> Cow<'_, str> {
        match self.token(id) {
            Some(token) => Cow::Borrowed(&token.normalized),
            None => Cow::Owned(self.value(id)),
        }
    }

    /// Concatenated text of all leaves below `id`.
    pub fn value(&self, id: NodeId) -> String {
        match self.token(id) {
            Some(token) => token.value.clone(),
            None => self.flatten(id).map(|t| t.value.as_str()).collect(),
        }
    }

    /// Leaf ids below `id` in document order (`id` itself for a token).
    pub fn leaves(&self, id: NodeId) -> Leaves<'_> {
        Leaves {
            tree: self,
            start: Some(id),
            stack: Vec::new(),
        }
    }

    /// Leaf tokens below `id` in document order.
    pub fn flatten(&self, id: NodeId) -> impl Iterator<Item = &Token> + '_ {
        self.leaves(id).filter_map(|leaf| self.token(leaf))
    }

    /// All nodes below `id` (excluding `id`) in pre-order.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(self.children(next).iter().rev());
            Some(next)
        })
    }

    /// First group of `kind` below `id` in pre-order.
    pub fn find_kind(&self, id: NodeId, kind: GroupKind) -> Option<NodeId> {
        self.descendants(id).find(|&d| self.is_kind(d, kind))
    }

    /// Source offset of the first positioned leaf.
    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.flatten(id).find_map(|t| t.position)
    }

    pub fn token_index(&self, list: NodeId, child: NodeId) -> Option<usize> {
        self.children(list).iter().position(|&c| c == child)
    }

    fn is_skipped(&self, id: NodeId, skip_ws: bool, skip_cm: bool) -> bool {
        (skip_ws && self.is_whitespace(id)) || (skip_cm && self.is_comment(id))
    }

    /// First child, optionally skipping whitespace and comments.
    pub fn token_first(&self, list: NodeId, skip_ws: bool, skip_cm: bool) -> Option<(usize, NodeId)> {
        self.token_next_by(list, 0, |tree, id| !tree.is_skipped(id, skip_ws, skip_cm))
    }

    /// First child after position `idx`, optionally skipping whitespace.
    pub fn token_next(&self, list: NodeId, idx: usize, skip_ws: bool) -> Option<(usize, NodeId)> {
        self.token_next_skipping(list, idx, skip_ws, false)
    }

    pub fn token_next_skipping(
        &self,
        list: NodeId,
        idx: usize,
        skip_ws: bool,
        skip_cm: bool,
    ) -> Option<(usize, NodeId)> {
        self.token_next_by(list, idx + 1, |tree, id| !tree.is_skipped(id, skip_ws, skip_cm))
    }

    /// Last child before position `idx`, optionally skipping whitespace.
    pub fn token_prev(&self, list: NodeId, idx: usize, skip_ws: bool) -> Option<(usize, NodeId)> {
        self.token_prev_skipping(list, idx, skip_ws, false)
    }

    pub fn token_prev_skipping(
        &self,
        list: NodeId,
        idx: usize,
        skip_ws: bool,
        skip_cm: bool,
    ) -> Option<(usize, NodeId)> {
        let children = self.children(list);
        children[..idx.min(children.len())]
            .iter()
            .enumerate()
            .rev()
            .find(|&(_, &id)| !self.is_skipped(id, skip_ws, skip_cm))
            .map(|(i, &id)| (i, id))
    }

    /// First child at or after position `start` accepted by `predicate`.
    pub fn token_next_by<P>(&self, list: NodeId, start: usize, predicate: P) -> Option<(usize, NodeId)>
    where
        P: Fn(&Tree, NodeId) -> bool,
    {
        self.children(list)
            .iter()
            .enumerate()
            .skip(start)
            .find(|&(_, &id)| predicate(self, id))
            .map(|(i, &id)| (i, id))
    }

    /// First child at or after position `start` rejected by `predicate`.
    pub fn token_not_matching<P>(&self, list: NodeId, start: usize, predicate: P) -> Option<(usize, NodeId)>
    where
        P: Fn(&Tree, NodeId) -> bool,
    {
        self.token_next_by(list, start, |tree, id| !predicate(tree, id))
    }

    /// Position of the `close` token pairing with the `open` token at `open_idx`,
    /// counting nested opens and closes on the way.
    pub fn find_matching(&self, list: NodeId, open_idx: usize, open: Pattern, close: Pattern) -> Option<usize> {
        let mut depth = 0usize;
        for (idx, &id) in self.children(list).iter().enumerate().skip(open_idx) {
            if self.matches_pattern(id, open) {
                depth += 1;
            } else if self.matches_pattern(id, close) {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(idx);
                }
            }
        }
        None
    }

    /// Children from `start` to `end`, `end` included when `include_end`.
    pub fn tokens_between(&self, list: NodeId, start: usize, end: usize, include_end: bool) -> &[NodeId] {
        let children = self.children(list);
        let end = if include_end { end + 1 } else { end }.min(children.len());
        children.get(start..end).unwrap_or(&[])
    }

    /// Direct children that are groups.
    pub fn get_sublists(&self, list: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(list).iter().copied().filter(|&id| self.is_group(id))
    }

    /// True if some proper ancestor of `id` is a group of `kind`.
    pub fn within(&self, id: NodeId, kind: GroupKind) -> bool {
        self.ancestors(id).any(|a| self.is_kind(a, kind))
    }

    pub fn has_ancestor(&self, id: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }

    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), |&a| self.parent(a))
    }

    /// Leaf covering byte `offset` of `id`'s text.
    pub fn token_at_offset(&self, id: NodeId, offset: usize) -> Option<NodeId> {
        let mut start = 0;
        for leaf in self.leaves(id) {
            let len = self.token(leaf).map_or(0, Token::len);
            if offset < start + len {
                return Some(leaf);
            }
            start += len;
        }
        None
    }

    /// Indented dump of the subtree, one node per line.
    pub fn pretty(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![(id, 0usize, 0usize)];
        while let Some((node, idx, depth)) = stack.pop() {
            let label = match (self.kind(node), self.category(node)) {
                (Some(kind), _) => kind.to_string(),
                (None, Some(category)) => category.to_string(),
                (None, None) => String::new(),
            };
            let _ = writeln!(out, "{:indent$}{idx} {label} {:?}", "", self.value(node), indent = depth * 2);
            for (i, &child) in self.children(node).iter().enumerate().rev() {
                stack.push((child, i, depth + 1));
            }
        }
        out
    }

    /// Replace `list`'s children `start..=end` with a single group of `kind`.
    ///
    /// With `extend`, a child at `start` that already is a `kind` group absorbs
    /// the rest of the span instead of being wrapped. Returns the group.
    pub fn group_tokens(&mut self, list: NodeId, kind: GroupKind, start: usize, end: usize, extend: bool) -> NodeId {
        let first = self.children(list)[start];
        let (group, moved) = if extend && self.is_kind(first, kind) {
            let moved: Vec<NodeId> = self.children_mut(list).drain(start + 1..=end).collect();
            self.children_mut(first).extend_from_slice(&moved);
            (first, moved)
        } else {
            let moved: Vec<NodeId> = self.children_mut(list).drain(start..=end).collect();
            let group = self.push(NodeData::Group {
                kind,
                children: moved.clone(),
            });
            self.nodes[group.0].parent = Some(list);
            self.children_mut(list).insert(start, group);
            (group, moved)
        };
        for id in moved {
            self.nodes[id.0].parent = Some(group);
        }
        group
    }

    /// Insert `token` at position `idx` of `list` (`idx == len` appends).
    pub fn insert_before(&mut self, list: NodeId, idx: usize, token: Token) -> NodeId {
        let id = self.add_token(token);
        self.nodes[id.0].parent = Some(list);
        let children = self.children_mut(list);
        let idx = idx.min(children.len());
        children.insert(idx, id);
        id
    }

    /// Insert `token` in front of the first child after `idx` (skipping
    /// whitespace when asked), or at the end of `list`.
    pub fn insert_after(&mut self, list: NodeId, idx: usize, token: Token, skip_ws: bool) -> NodeId {
        let at = match self.token_next(list, idx, skip_ws) {
            Some((next, _)) => next,
            None => self.children(list).len(),
        };
        self.insert_before(list, at, token)
    }

    /// Detach the child at `idx`.
    pub fn remove(&mut self, list: NodeId, idx: usize) -> NodeId {
        let id = self.children_mut(list).remove(idx);
        self.nodes[id.0].parent = None;
        id
    }

    /// Rewrite a token's text; no-op for groups.
    pub fn set_value(&mut self, id: NodeId, value: impl Into<String>) {
        if let Some(token) = self.token_mut(id) {
            token.set_value(value);
        }
    }
}

/// Depth-first leaf iterator with an explicit stack, see [`Tree::leaves`].
#[derive(Debug, Clone)]
pub struct Leaves<'t> {
    tree: &'t Tree,
    start: Option<NodeId>,
    stack: Vec<std::slice::Iter<'t, NodeId>>,
}

impl Iterator for Leaves<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if let Some(start) = self.start.take() {
            if !self.tree.is_group(start) {
                return Some(start);
            }
            self.stack.push(self.tree.children(start).iter());
        }
        while let Some(top) = self.stack.last_mut() {
            match top.next() {
                Some(&id) if self.tree.is_group(id) => self.stack.push(self.tree.children(id).iter()),
                Some(&id) => return Some(id),
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn flat(sql: &str) -> Statement {
        let tokens = tokenize(sql, &LexerOptions::default()).unwrap().with_positions();
        Statement::from_tokens(tokens)
    }

    #[test]
    fn flatten_reproduces_value() {
        let mut stmt = flat("select (a, b) from t");
        let root = stmt.root();
        let tree = stmt.tree_mut();
        let grp = tree.group_tokens(root, GroupKind::Parenthesis, 2, 7, false);
        assert_eq!(tree.value(grp), "(a, b)");
        assert_eq!(tree.value(root), "select (a, b) from t");
        assert_eq!(tree.parent(grp), Some(root));
        assert!(tree.children(grp).iter().all(|&c| tree.parent(c) == Some(grp)));
        assert_eq!(tree.children(root).len(), 7);
    }

    #[test]
    fn group_tokens_extends_existing_group() {
        let mut stmt = flat("a b c");
        let root = stmt.root();
        let tree = stmt.tree_mut();
        let first = tree.group_tokens(root, GroupKind::Identifier, 0, 0, false);
        let extended = tree.group_tokens(root, GroupKind::Identifier, 0, 2, true);
        assert_eq!(first, extended);
        assert_eq!(tree.value(first), "a b");
        assert_eq!(tree.children(first).len(), 3);
        // a different kind wraps instead of extending
        let wrapped = tree.group_tokens(root, GroupKind::IdentifierList, 0, 2, true);
        assert_ne!(wrapped, first);
        assert_eq!(tree.children(wrapped)[0], first);
        assert_eq!(tree.parent(first), Some(wrapped));
    }

    #[rstest]
    #[case(0, true, Some(2))]
    #[case(0, false, Some(1))]
    #[case(4, true, None)]
    fn token_next(#[case] idx: usize, #[case] skip_ws: bool, #[case] expected: Option<usize>) {
        let stmt = flat("a  b  c");
        assert_eq!(
            stmt.tree().token_next(stmt.root(), idx, skip_ws).map(|(i, _)| i),
            expected
        );
    }

    #[test]
    fn token_prev_and_first() {
        let stmt = flat(" /* c */ a b");
        let (tree, root) = (stmt.tree(), stmt.root());
        assert_eq!(tree.token_first(root, true, false).map(|(i, _)| i), Some(1));
        assert_eq!(tree.token_first(root, true, true).map(|(i, _)| i), Some(3));
        assert_eq!(tree.token_prev(root, 5, true).map(|(i, _)| i), Some(3));
        assert_eq!(tree.token_prev(root, 0, true), None);
    }

    #[test]
    fn find_matching_counts_depth() {
        let stmt = flat("( ( ) ) )");
        let (tree, root) = (stmt.tree(), stmt.root());
        let open = Pattern::new(Category::Punctuation, &["("]);
        let close = Pattern::new(Category::Punctuation, &[")"]);
        assert_eq!(tree.find_matching(root, 0, open, close), Some(6));
        assert_eq!(tree.find_matching(root, 2, open, close), Some(4));
    }

    #[test]
    fn tokens_between_bounds() {
        let stmt = flat("a b c");
        let (tree, root) = (stmt.tree(), stmt.root());
        assert_eq!(tree.tokens_between(root, 0, 2, true).len(), 3);
        assert_eq!(tree.tokens_between(root, 0, 2, false).len(), 2);
        assert_eq!(tree.tokens_between(root, 3, 99, true).len(), 2);
    }

    #[test]
    fn insert_and_remove() {
        let mut stmt = flat("a,b");
        let root = stmt.root();
        let tree = stmt.tree_mut();
        tree.insert_after(root, 1, Token::new(Category::Whitespace, " "), false);
        assert_eq!(tree.value(root), "a, b");
        tree.insert_before(root, 0, Token::new(Category::Whitespace, "\n"));
        assert_eq!(tree.value(root), "\na, b");
        let removed = tree.remove(root, 0);
        assert_eq!(tree.parent(removed), None);
        assert_eq!(tree.value(root), "a, b");
    }

    #[test]
    fn ancestry() {
        let mut stmt = flat("x y z");
        let root = stmt.root();
        let tree = stmt.tree_mut();
        let inner = tree.group_tokens(root, GroupKind::Identifier, 0, 2, false);
        let outer = tree.group_tokens(root, GroupKind::Parenthesis, 0, 0, false);
        let leaf = tree.children(inner)[0];
        assert!(tree.within(leaf, GroupKind::Parenthesis));
        assert!(!tree.within(leaf, GroupKind::Where));
        assert!(tree.has_ancestor(leaf, outer));
        assert!(tree.has_ancestor(leaf, root));
        assert!(!tree.has_ancestor(outer, inner));
    }

    #[test]
    fn offsets_and_positions() {
        let stmt = flat("select foo");
        let (tree, root) = (stmt.tree(), stmt.root());
        let leaf = tree.token_at_offset(root, 8).unwrap();
        assert_eq!(tree.value(leaf), "foo");
        assert_eq!(tree.position(leaf), Some(7));
        assert_eq!(tree.token_at_offset(root, 10), None);
    }

    #[test]
    fn pretty_lists_every_node() {
        let mut stmt = flat("a b");
        let root = stmt.root();
        stmt.tree_mut().group_tokens(root, GroupKind::Identifier, 0, 2, false);
        let dump = stmt.tree().pretty(root);
        assert_eq!(dump.lines().count(), 5);
        assert!(dump.contains("0 Identifier \"a b\""));
        assert!(dump.contains("  2 Name \"b\""));
    }
}
