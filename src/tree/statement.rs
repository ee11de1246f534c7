use crate::*;

/// One SQL statement: a tree plus the id of its root `Statement` group.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("{}", tree.value(*root))]
pub struct Statement {
    tree: Tree,
    root: NodeId,
}

impl Statement {
    /// Flat statement over lexed `(category, text, offset)` triples.
    pub fn from_tokens<'s, I>(tokens: I) -> Self
    where
        I: IntoIterator<Item = (Category, &'s str, usize)>,
    {
        Self::new(
            tokens
                .into_iter()
                .map(|(category, value, position)| Token::at(category, value, position)),
        )
    }

    /// Flat statement over already built tokens.
    pub fn new(tokens: impl IntoIterator<Item = Token>) -> Self {
        let mut tree = Tree::new();
        let children = tokens.into_iter().map(|token| tree.add_token(token)).collect();
        let root = tree.add_group(GroupKind::Statement, children);
        Self { tree, root }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self) -> NodeRef<'_> {
        self.tree.node(self.root)
    }

    /// Leaf tokens in document order.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> + '_ {
        self.tree.flatten(self.root)
    }

    pub fn is_blank(&self) -> bool {
        self.tokens().all(Token::is_whitespace)
    }

    /// See [`NodeRef::get_type`].
    pub fn get_type(&self) -> String {
        self.node().get_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_offsets() {
        let stmt = Statement::from_tokens([
            (Category::KeywordDml, "select", 4),
            (Category::Whitespace, " ", 10),
            (Category::NumberInteger, "1", 11),
        ]);
        assert_eq!(stmt.to_string(), "select 1");
        assert_eq!(stmt.tokens().filter_map(|t| t.position).collect::<Vec<_>>(), [4, 10, 11]);
        assert_eq!(stmt.tree().parent(stmt.root()), None);
        assert_eq!(stmt.get_type(), "SELECT");
        assert!(!stmt.is_blank());
        assert!(Statement::from_tokens([(Category::Whitespace, "\n", 0)]).is_blank());
    }
}
