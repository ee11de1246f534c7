//! Structural cleanup filters over grouped statements.
use crate::*;

/// Removes comments, leaving a single space where words would otherwise join.
#[derive(Debug, Default)]
pub struct StripComments;

impl StatementFilter for StripComments {
    fn process(&mut self, statement: &mut Statement) {
        let root = statement.root();
        strip_comments(statement.tree_mut(), root);
    }
}

fn strip_comments(tree: &mut Tree, list: NodeId) {
    let sublists: Vec<NodeId> = tree
        .get_sublists(list)
        .filter(|&id| !tree.is_kind(id, GroupKind::Comment))
        .collect();
    for sublist in sublists {
        strip_comments(tree, sublist);
    }
    let mut idx = 0;
    while let Some((at, _)) = tree.token_next_by(list, idx, Tree::is_comment) {
        let prev = at.checked_sub(1).and_then(|p| tree.child(list, p));
        let next = tree.child(list, at + 1);
        let open = |tree: &Tree, id: NodeId| tree.is_whitespace(id) || tree.matches(id, Category::Punctuation, &["("]);
        let close = |tree: &Tree, id: NodeId| tree.is_whitespace(id) || tree.matches(id, Category::Punctuation, &[")"]);
        let removable = prev.is_none_or(|p| open(tree, p)) || next.is_none_or(|n| close(tree, n));
        tree.remove(list, at);
        if removable {
            idx = at;
        } else {
            tree.insert_before(list, at, Token::new(Category::Whitespace, " "));
            idx = at + 1;
        }
    }
}

/// Collapses whitespace runs to single spaces.
///
/// Leading whitespace of a group goes away, so do spaces just inside
/// parentheses, line breaks before list commas and the statement's trailing
/// whitespace.
#[derive(Debug, Default)]
pub struct StripWhitespace;

impl StatementFilter for StripWhitespace {
    fn process(&mut self, statement: &mut Statement) {
        let root = statement.root();
        strip_whitespace(statement.tree_mut(), root, 0);
    }
}

fn strip_whitespace(tree: &mut Tree, list: NodeId, depth: usize) {
    let sublists: Vec<NodeId> = tree.get_sublists(list).collect();
    for sublist in sublists {
        strip_whitespace(tree, sublist, depth + 1);
    }
    match tree.kind(list) {
        Some(GroupKind::IdentifierList) => {
            let before_commas: Vec<usize> = tree
                .children(list)
                .windows(2)
                .enumerate()
                .filter(|(_, pair)| {
                    tree.is_whitespace(pair[0]) && tree.matches(pair[1], Category::Punctuation, &[","])
                })
                .map(|(idx, _)| idx)
                .collect();
            for idx in before_commas.into_iter().rev() {
                tree.remove(list, idx);
            }
        }
        Some(GroupKind::Parenthesis) => {
            if tree.child(list, 1).is_some_and(|id| tree.is_whitespace(id)) {
                tree.remove(list, 1);
            }
            let len = tree.children(list).len();
            let inner_last = len.checked_sub(2).filter(|&idx| idx > 0);
            if let Some(idx) = inner_last.filter(|&idx| tree.child(list, idx).is_some_and(|id| tree.is_whitespace(id))) {
                tree.remove(list, idx);
            }
        }
        _ => {}
    }

    let mut last_was_whitespace = false;
    for (idx, id) in tree.children(list).to_vec().into_iter().enumerate() {
        let is_whitespace = tree.is_whitespace(id);
        if is_whitespace {
            let collapsed = if last_was_whitespace || idx == 0 { "" } else { " " };
            tree.set_value(id, collapsed);
        }
        last_was_whitespace = is_whitespace;
    }

    if depth == 0 {
        let last = tree.children(list).len().checked_sub(1);
        if let Some(idx) = last.filter(|&idx| tree.child(list, idx).is_some_and(|id| tree.is_whitespace(id))) {
            tree.remove(list, idx);
        }
    }
}

/// Puts one space on each side of operators and comparisons.
#[derive(Debug, Default)]
pub struct SpacesAroundOperators;

impl StatementFilter for SpacesAroundOperators {
    fn process(&mut self, statement: &mut Statement) {
        let root = statement.root();
        spaces_around_operators(statement.tree_mut(), root);
    }
}

fn spaces_around_operators(tree: &mut Tree, list: NodeId) {
    let sublists: Vec<NodeId> = tree.get_sublists(list).collect();
    for sublist in sublists {
        spaces_around_operators(tree, sublist);
    }
    let mut idx = 0;
    while let Some((mut at, _)) = tree.token_next_by(list, idx, |t, id| t.is_a(id, Category::Operator)) {
        if tree.child(list, at + 1).is_some_and(|next| !tree.is_whitespace(next)) {
            tree.insert_before(list, at + 1, Token::new(Category::Whitespace, " "));
        }
        if at > 0 && tree.child(list, at - 1).is_some_and(|prev| !tree.is_whitespace(prev)) {
            tree.insert_before(list, at, Token::new(Category::Whitespace, " "));
            at += 1;
        }
        idx = at + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn filtered(filter: &mut dyn StatementFilter, sql: &str) -> String {
        parsed(sql)
            .into_iter()
            .map(|mut statement| {
                filter.process(&mut statement);
                statement.to_string()
            })
            .collect()
    }

    #[rstest]
    #[case("select *-- statement starts here\nfrom foo", "select * from foo")]
    #[case("select * -- statement starts here\nfrom foo", "select * from foo")]
    #[case("select-- foo\nfrom -- bar\nwhere", "select from where")]
    #[case("/* sql starts here */\nselect", "select")]
    #[case("/* sql starts here */ select", "select")]
    #[case("select (/* sql starts here */ select 2)", "select (select 2)")]
    #[case("select a, -- one\n b from t", "select a, b from t")]
    fn strip_comments(#[case] sql: &str, #[case] expected: &str) {
        assert_eq!(filtered(&mut StripComments, sql), expected);
    }

    #[rstest]
    #[case("select\n* from      foo\n\twhere  ( 1 = 2 )\n", "select * from foo where (1 = 2) ")]
    #[case("select -- foo\nfrom    bar\n", "select -- foo\nfrom bar")]
    #[case("select\n* /* foo */  from bar ", "select * /* foo */ from bar")]
    #[case("select a\n, b ,c from t", "select a, b,c from t")]
    #[case("select f( x )", "select f(x)")]
    #[case("select ( )", "select ()")]
    fn strip_whitespace(#[case] sql: &str, #[case] expected: &str) {
        assert_eq!(filtered(&mut StripWhitespace, sql), expected);
    }

    #[rstest]
    #[case("select a+b as c from t where (d-e)*2 > 1", "select a + b as c from t where (d - e) * 2 > 1")]
    #[case("select a = b", "select a = b")]
    #[case("select x||y", "select x || y")]
    #[case("select * from t", "select * from t")]
    fn spaces_around_operators(#[case] sql: &str, #[case] expected: &str) {
        assert_eq!(filtered(&mut SpacesAroundOperators, sql), expected);
    }
}
