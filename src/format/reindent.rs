//! Reindentation: line breaks before clauses, aligned lists, indented blocks.
//!
//! Design notes:
//! - Two counters drive every inserted line break: `indent` (block levels,
//!   `width` characters each) and `offset` (extra columns, used to align list
//!   items and CASE arms under the first one).
//! - Column offsets are measured on the statement text produced so far, so
//!   breaks inserted earlier in document order shift everything after them.
//! - Dispatch is by group kind: Where, Parenthesis, IdentifierList and Case
//!   have dedicated handlers, everything else takes the default path.
//!
//! Expects whitespace to be stripped first; the pipeline guarantees that.
use crate::*;

/// Stateful across statements: the blank line between statements depends on
/// how the previous one ended.
#[derive(Debug)]
pub struct Reindent {
    width: usize,
    indent_char: char,
    wrap_after: usize,
    indent: usize,
    offset: isize,
    last_ended_with_newline: Option<bool>,
}

impl Reindent {
    pub fn new(width: usize, indent_char: char, wrap_after: usize) -> Self {
        Self {
            width,
            indent_char,
            wrap_after,
            indent: 0,
            offset: 0,
            last_ended_with_newline: None,
        }
    }

    pub fn from_options(options: &FormatOptions) -> Self {
        Self::new(options.indent_width, options.indent_char(), options.wrap_after)
    }

    fn newline(&self) -> Token {
        let columns = (self.indent * self.width) as isize + self.offset;
        let pad = self.indent_char.to_string().repeat(columns.max(0) as usize);
        Token::new(Category::Whitespace, format!("\n{pad}"))
    }

    /// Column of the end of `leaf` on its line, relative to the current indentation.
    fn offset_of(&self, tree: &Tree, root: NodeId, leaf: NodeId) -> isize {
        let mut column = 0usize;
        for id in tree.leaves(root) {
            let value = tree.token(id).map_or("", |t| t.value.as_str());
            column = match value.rfind(['\n', '\r']) {
                Some(at) => value[at + 1..].chars().count(),
                None => column + value.chars().count(),
            };
            if id == leaf {
                break;
            }
        }
        column as isize - (self.indent * self.width) as isize - self.offset
    }

    fn first_leaf_offset(&self, tree: &Tree, root: NodeId, id: NodeId) -> Option<isize> {
        let leaf = tree.leaves(id).next()?;
        let len = tree.token(leaf).map_or(0, |t| t.value.chars().count());
        Some(self.offset_of(tree, root, leaf) - len as isize)
    }

    fn process_list(&mut self, tree: &mut Tree, root: NodeId, list: NodeId) {
        match tree.kind(list) {
            Some(GroupKind::Where) => self.process_where(tree, root, list),
            Some(GroupKind::Parenthesis) => self.process_parenthesis(tree, root, list),
            Some(GroupKind::IdentifierList) => self.process_identifier_list(tree, root, list),
            Some(GroupKind::Case) => self.process_case(tree, root, list),
            _ => self.process_default(tree, root, list, true),
        }
    }

    fn process_default(&mut self, tree: &mut Tree, root: NodeId, list: NodeId, split_statements: bool) {
        if split_statements {
            self.split_statements(tree, list);
        }
        self.split_keywords(tree, list);
        let sublists: Vec<NodeId> = tree.get_sublists(list).collect();
        for sublist in sublists {
            self.process_list(tree, root, sublist);
        }
    }

    /// Break before every DML/DDL keyword that is not the first token.
    fn split_statements(&self, tree: &mut Tree, list: NodeId) {
        let is_statement_keyword =
            |t: &Tree, id: NodeId| matches!(t.category(id), Some(Category::KeywordDml | Category::KeywordDdl));
        let mut idx = 0;
        while let Some((mut at, _)) = tree.token_next_by(list, idx, is_statement_keyword) {
            if at > 0 {
                if tree.child(list, at - 1).is_some_and(|prev| tree.is_whitespace(prev)) {
                    tree.remove(list, at - 1);
                    at -= 1;
                }
                tree.insert_before(list, at, self.newline());
                at += 1;
            }
            idx = at + 1;
        }
    }

    /// Break before clause keywords (FROM, JOIN, AND, ...), unless the text
    /// before already ends a line.
    fn split_keywords(&self, tree: &mut Tree, list: NodeId) {
        let mut idx = 0;
        while let Some(mut at) = next_split_keyword(tree, list, idx, is_split_keyword) {
            let prev = at.checked_sub(1).and_then(|p| tree.child(list, p));
            let ends_line = prev.is_some_and(|p| {
                let value = tree.value(p);
                value.ends_with('\n') || value.ends_with('\r')
            });
            if prev.is_some_and(|p| tree.is_whitespace(p)) {
                tree.remove(list, at - 1);
                at -= 1;
            }
            if !ends_line {
                tree.insert_before(list, at, self.newline());
                at += 1;
            }
            idx = at + 1;
        }
    }

    fn process_where(&mut self, tree: &mut Tree, root: NodeId, list: NodeId) {
        if let Some((at, _)) = tree.token_next_by(list, 0, |t, id| t.matches(id, Category::Keyword, &["WHERE"])) {
            tree.insert_before(list, at, self.newline());
        }
        self.indent += 1;
        self.process_default(tree, root, list, true);
        self.indent -= 1;
    }

    /// A subquery moves to its own indented line; anything else aligns after `(`.
    fn process_parenthesis(&mut self, tree: &mut Tree, root: NodeId, list: NodeId) {
        let subquery = tree
            .token_next(list, 0, true)
            .is_some_and(|(_, first)| matches!(tree.category(first), Some(Category::KeywordDml | Category::KeywordDdl)));
        if subquery {
            self.indent += 1;
            tree.insert_before(list, 0, self.newline());
        }
        let open = tree.token_next_by(list, 0, |t, id| t.matches(id, Category::Punctuation, &["("]));
        let shift = open.map_or(0, |(_, id)| self.offset_of(tree, root, id));
        self.offset += shift;
        self.process_default(tree, root, list, !subquery);
        if subquery {
            self.indent -= 1;
        }
        self.offset -= shift;
    }

    /// One item per line (or per `wrap_after` columns), aligned under the first.
    fn process_identifier_list(&mut self, tree: &mut Tree, root: NodeId, list: NodeId) {
        let items: Vec<NodeId> = tree.node(list).get_identifiers().iter().map(NodeRef::id).collect();
        if items.len() > 1 && !tree.within(list, GroupKind::Function) {
            let shift = if self.indent_char == '\t' {
                1
            } else {
                self.first_leaf_offset(tree, root, items[0]).unwrap_or(0)
            };
            self.offset += shift;
            let mut position = self.offset;
            for &item in &items[1..] {
                position += tree.value(item).chars().count() as isize + 1;
                if position > self.wrap_after as isize {
                    if let Some(at) = tree.token_index(list, item) {
                        tree.insert_before(list, at, self.newline());
                    }
                    position = self.offset;
                }
            }
            self.offset -= shift;
        }
        self.process_default(tree, root, list, true);
    }

    /// WHEN and ELSE arms on their own lines, aligned under the first arm; END
    /// back under CASE.
    fn process_case(&mut self, tree: &mut Tree, root: NodeId, list: NodeId) {
        let arms = tree.node(list).get_cases(false);
        let outer = tree
            .child(list, 0)
            .and_then(|case| self.first_leaf_offset(tree, root, case))
            .unwrap_or(0);
        self.offset += outer;

        let mut inner = None;
        for (i, arm) in arms.iter().enumerate() {
            let anchor = match &arm.condition {
                Some(condition) => condition.first(),
                None => arm.value.first(),
            };
            let Some(&anchor) = anchor else {
                continue;
            };
            if i == 0 {
                let shift = self.first_leaf_offset(tree, root, anchor).unwrap_or(0);
                self.offset += shift;
                inner = Some(shift);
            } else if let Some(at) = tree.token_index(list, anchor) {
                tree.insert_before(list, at, self.newline());
            }
        }

        // Nested groups continue after "when ", "then " or "else ".
        self.offset += 5;
        self.process_default(tree, root, list, true);
        self.offset -= 5;

        if let Some(shift) = inner {
            self.offset -= shift;
        }
        if let Some((end, _)) = tree.token_next_by(list, 0, |t, id| t.matches(id, Category::Keyword, &["END"])) {
            tree.insert_before(list, end, self.newline());
        }
        self.offset -= outer;
    }
}

impl StatementFilter for Reindent {
    fn process(&mut self, statement: &mut Statement) {
        let root = statement.root();
        self.indent = 0;
        self.offset = 0;
        self.process_list(statement.tree_mut(), root, root);

        if let Some(ended_with_newline) = self.last_ended_with_newline {
            let separator = if ended_with_newline { "\n" } else { "\n\n" };
            statement
                .tree_mut()
                .insert_before(root, 0, Token::new(Category::Whitespace, separator));
        }
        self.last_ended_with_newline = Some(statement.to_string().ends_with('\n'));
    }
}

/// Keywords that start a new line inside a statement.
pub(super) fn is_split_keyword(word: &str) -> bool {
    matches!(
        word,
        "FROM" | "AND" | "OR" | "VALUES" | "SET" | "BETWEEN" | "EXCEPT" | "HAVING" | "LIMIT"
    ) || word.ends_with("JOIN")
        || ["GROUP", "ORDER", "UNION"].iter().any(|prefix| word.starts_with(prefix))
}

/// Next split keyword at or after `start`; the AND of `BETWEEN x AND y` is not one.
pub(super) fn next_split_keyword(tree: &Tree, list: NodeId, start: usize, splits: fn(&str) -> bool) -> Option<usize> {
    let find = |from: usize| {
        tree.token_next_by(list, from, |t, id| t.category(id) == Some(Category::Keyword) && splits(&t.normalized(id)))
    };
    let (at, id) = find(start)?;
    if tree.normalized(id) != "BETWEEN" {
        return Some(at);
    }
    let (after, next) = find(at + 1)?;
    if tree.normalized(next) != "AND" {
        return Some(after);
    }
    find(after + 1).map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn reindent(sql: &str) -> String {
        let mut strip = StripWhitespace;
        let mut filter = Reindent::new(2, ' ', 0);
        let text: String = parsed(sql)
            .into_iter()
            .map(|mut statement| {
                strip.process(&mut statement);
                filter.process(&mut statement);
                statement.to_string()
            })
            .collect();
        serialize(&text).unwrap()
    }

    #[rstest]
    #[case("select foo; select bar", "select foo;\n\nselect bar")]
    #[case("select foo", "select foo")]
    #[case("select foo; -- test\n select bar", "select foo; -- test\n\nselect bar")]
    fn statements(#[case] sql: &str, #[case] expected: &str) {
        assert_eq!(reindent(sql), expected);
    }

    #[test]
    fn clause_keywords() {
        assert_eq!(
            reindent("select * from foo union select * from bar;"),
            "select *\nfrom foo\nunion\nselect *\nfrom bar;"
        );
        assert_eq!(
            reindent("and foo between 1 and 2 and bar = 3"),
            "\nand foo between 1 and 2\nand bar = 3"
        );
    }

    #[rstest]
    #[case("select * from foo join bar on 1 = 2", "select *\nfrom foo\njoin bar on 1 = 2")]
    #[case("select * from foo inner join bar on 1 = 2", "select *\nfrom foo\ninner join bar on 1 = 2")]
    #[case(
        "select * from foo left outer join bar on 1 = 2",
        "select *\nfrom foo\nleft outer join bar on 1 = 2"
    )]
    fn joins(#[case] sql: &str, #[case] expected: &str) {
        assert_eq!(reindent(sql), expected);
    }

    #[test]
    fn subquery_parenthesis() {
        assert_eq!(
            reindent("select count(*) from (select * from foo);"),
            "select count(*)\nfrom\n  (select *\n   from foo);"
        );
    }

    #[test]
    fn where_clauses() {
        assert_eq!(
            reindent("select * from foo where bar = 1 and baz = 2 or bzz = 3;"),
            "select *\nfrom foo\nwhere bar = 1\n  and baz = 2\n  or bzz = 3;"
        );
        assert_eq!(
            reindent("select * from foo where bar = 1 and (baz = 2 or bzz = 3);"),
            "select *\nfrom foo\nwhere bar = 1\n  and (baz = 2\n       or bzz = 3);"
        );
    }

    #[test]
    fn identifier_lists() {
        assert_eq!(
            reindent("select foo, bar, baz from table1, table2 where 1 = 2"),
            "select foo,\n       bar,\n       baz\nfrom table1,\n     table2\nwhere 1 = 2"
        );
        assert_eq!(reindent("select a.*, b.id from a, b"), "select a.*,\n       b.id\nfrom a,\n     b");
        assert_eq!(
            reindent("(foo as bar, bar1, bar2 as bar3, b4 as b5)"),
            "(foo as bar,\n bar1,\n bar2 as bar3,\n b4 as b5)"
        );
        assert_eq!(reindent("select max(a) b, foo, bar"), "select max(a) b,\n       foo,\n       bar");
        assert_eq!(
            reindent("select foo.bar, nvl(1) from dual"),
            "select foo.bar,\n       nvl(1)\nfrom dual"
        );
        assert_eq!(
            reindent("select * from foo order by c1 desc, c2, c3;"),
            "select *\nfrom foo\norder by c1 desc,\n         c2,\n         c3;"
        );
    }

    #[test]
    fn function_arguments_stay_on_one_line() {
        assert_eq!(reindent("select f(a, b, c) from t"), "select f(a, b, c)\nfrom t");
    }

    #[test]
    fn wrap_after_packs_items() {
        let mut strip = StripWhitespace;
        let mut filter = Reindent::new(2, ' ', 20);
        let mut statement = parsed("select a, b, c, d, e, f, g, h, i from t").remove(0);
        strip.process(&mut statement);
        filter.process(&mut statement);
        let text = serialize(&statement.to_string()).unwrap();
        assert_eq!(text, "select a, b, c, d, e, f, g,\n       h, i\nfrom t");
    }

    #[rstest]
    #[case(
        "case when foo = 1 then 2 when foo = 3 then 4 else 5 end",
        "case\n    when foo = 1 then 2\n    when foo = 3 then 4\n    else 5\nend"
    )]
    #[case("case(foo) when bar = 1 then 2 else 3 end", "case(foo)\n    when bar = 1 then 2\n    else 3\nend")]
    fn case_arms(#[case] sql: &str, #[case] expected: &str) {
        assert_eq!(reindent(sql), expected);
    }

    #[test]
    fn line_comments_keep_their_break() {
        assert_eq!(reindent("select c1 -- column1\nfrom foo"), "select c1 -- column1\nfrom foo");
        assert_eq!(reindent("select c1\nfrom foo\norder by c1"), "select c1\nfrom foo\norder by c1");
        assert_eq!(
            reindent("select c1 from t1 where (c1 = 1) order by c1"),
            "select c1\nfrom t1\nwhere (c1 = 1)\norder by c1"
        );
    }

    #[test]
    fn tabs_indent_lists_by_one() {
        let mut strip = StripWhitespace;
        let mut filter = Reindent::new(1, '\t', 0);
        let mut statement = parsed("select a, b from t where x = 1 and y = 2").remove(0);
        strip.process(&mut statement);
        filter.process(&mut statement);
        assert_eq!(
            serialize(&statement.to_string()).unwrap(),
            "select a,\n\tb\nfrom t\nwhere x = 1\n\tand y = 2"
        );
    }
}
