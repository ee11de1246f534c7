use crate::*;

/// Index of a node inside its statement's [`Tree`].
///
/// Ids are only meaningful for the tree that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
#[display("#{_0}")]
pub struct NodeId(pub(crate) usize);

/// Syntactic role of a group node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum GroupKind {
    Statement,
    Parenthesis,
    SquareBrackets,
    Identifier,
    IdentifierList,
    TypedLiteral,
    Function,
    Operation,
    Comparison,
    Where,
    Case,
    Begin,
    For,
    If,
    Comment,
    Assignment,
}

impl GroupKind {
    /// Token opening a group of this kind, for kinds grouped by matching pairs.
    pub const fn open(self) -> Option<Pattern> {
        use Category::{Keyword, Punctuation};
        match self {
            GroupKind::Parenthesis => Some(Pattern::new(Punctuation, &["("])),
            GroupKind::SquareBrackets => Some(Pattern::new(Punctuation, &["["])),
            GroupKind::Case => Some(Pattern::new(Keyword, &["CASE"])),
            GroupKind::Begin => Some(Pattern::new(Keyword, &["BEGIN"])),
            GroupKind::If => Some(Pattern::new(Keyword, &["IF"])),
            GroupKind::For => Some(Pattern::new(Keyword, &["FOR", "FOREACH"])),
            GroupKind::Where => Some(Pattern::new(Keyword, &["WHERE"])),
            _ => None,
        }
    }

    /// Token closing a group of this kind.
    pub const fn close(self) -> Option<Pattern> {
        use Category::{Keyword, Punctuation};
        match self {
            GroupKind::Parenthesis => Some(Pattern::new(Punctuation, &[")"])),
            GroupKind::SquareBrackets => Some(Pattern::new(Punctuation, &["]"])),
            GroupKind::Case | GroupKind::Begin => Some(Pattern::new(Keyword, &["END"])),
            GroupKind::If => Some(Pattern::new(Keyword, &["END IF"])),
            GroupKind::For => Some(Pattern::new(Keyword, &["END LOOP"])),
            GroupKind::Where => Some(Pattern::new(
                Keyword,
                &[
                    "ORDER", "ORDER BY", "GROUP", "GROUP BY", "LIMIT", "UNION", "UNION ALL",
                    "EXCEPT", "HAVING", "RETURNING", "INTO",
                ],
            )),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NodeData {
    Token(Token),
    Group { kind: GroupKind, children: Vec<NodeId> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) data: NodeData,
}
