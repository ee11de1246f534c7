//! Aligned reindentation: clause keywords right-aligned on a river after
//! `SELECT`, list items and CASE arms aligned under their first entry.
//!
//! ```text
//! select a,
//!        b
//!   from t
//!   join u
//!     on t.id = u.id
//!  where x = 1
//!    and y = 2
//! ```
//!
//! Every break is placed from a base column that grows by a fixed amount per
//! nested subquery, so columns never depend on the text already produced.
//! Expects whitespace to be stripped first; the pipeline guarantees that.
use crate::*;
use itertools::Itertools;

/// Width of `SELECT`, the keyword every clause keyword is right-aligned to.
const KEYWORD_WIDTH: usize = 6;

#[derive(Debug)]
pub struct AlignedIndent {
    indent_char: char,
    last_ended_with_newline: Option<bool>,
}

impl AlignedIndent {
    pub fn new(indent_char: char) -> Self {
        Self {
            indent_char,
            last_ended_with_newline: None,
        }
    }

    pub fn from_options(options: &FormatOptions) -> Self {
        Self::new(options.indent_char())
    }

    fn pad(&self, columns: usize) -> String {
        self.indent_char.to_string().repeat(columns)
    }

    fn newline(&self, columns: usize) -> Token {
        Token::new(Category::Whitespace, format!("\n{}", self.pad(columns)))
    }

    fn process_list(&self, tree: &mut Tree, list: NodeId, base: usize) {
        match tree.kind(list) {
            Some(GroupKind::Parenthesis) => self.process_parenthesis(tree, list, base),
            Some(GroupKind::IdentifierList) => self.process_identifier_list(tree, list, base),
            Some(GroupKind::Case) => self.process_case(tree, list, base),
            _ => self.process_default(tree, list, base),
        }
    }

    fn process_default(&self, tree: &mut Tree, list: NodeId, base: usize) {
        self.split_keywords(tree, list, base);
        let sublists: Vec<NodeId> = tree.get_sublists(list).collect();
        for sublist in sublists {
            // Lists after GROUP BY / ORDER BY start three columns further right.
            let after_by = tree
                .token_index(list, sublist)
                .and_then(|idx| tree.token_prev(list, idx, true))
                .is_some_and(|(_, prev)| is_by_keyword(&tree.normalized(prev)));
            self.process_list(tree, sublist, if after_by { base + 3 } else { base });
        }
    }

    fn split_keywords(&self, tree: &mut Tree, list: NodeId, base: usize) {
        let mut idx = 0;
        while let Some(mut at) = super::reindent::next_split_keyword(tree, list, idx, is_aligned_keyword) {
            let Some(keyword) = tree.child(list, at) else {
                break;
            };
            let word = tree.value(keyword);
            let normalized = tree.normalized(keyword);
            let aligner = if normalized.ends_with("JOIN") || is_by_keyword(&normalized) {
                word.split_whitespace().next().unwrap_or_default().chars().count()
            } else {
                word.chars().count()
            };
            if at > 0 && tree.child(list, at - 1).is_some_and(|prev| tree.is_whitespace(prev)) {
                tree.remove(list, at - 1);
                at -= 1;
            }
            tree.insert_before(list, at, self.newline((KEYWORD_WIDTH + base).saturating_sub(aligner)));
            idx = at + 2;
        }
    }

    /// Subqueries open on a new line two columns past the river; other
    /// parentheses are left as they are.
    fn process_parenthesis(&self, tree: &mut Tree, list: NodeId, base: usize) {
        let subquery = tree
            .token_next_by(list, 0, |t, id| t.matches(id, Category::KeywordDml, &["SELECT"]))
            .is_some();
        let closed = tree
            .children(list)
            .last()
            .is_some_and(|&last| tree.matches(last, Category::Punctuation, &[")"]));
        if !subquery || !closed {
            return;
        }
        let inner = base + KEYWORD_WIDTH + 2;
        tree.insert_before(list, 1, self.newline(inner));
        let close = tree.children(list).len() - 1;
        tree.insert_before(list, close, self.newline(inner - 1));
        self.process_default(tree, list, inner);
    }

    /// One item per line, aligned after the river.
    fn process_identifier_list(&self, tree: &mut Tree, list: NodeId, base: usize) {
        let column = KEYWORD_WIDTH + base + 1;
        let mut idx = 0;
        while let Some((comma, _)) = tree.token_next_by(list, idx, |t, id| t.matches(id, Category::Punctuation, &[","])) {
            let next = comma + 1;
            if tree.child(list, next).is_none() {
                break;
            }
            if tree.child(list, next).is_some_and(|id| tree.is_whitespace(id)) {
                tree.remove(list, next);
            }
            tree.insert_before(list, next, self.newline(column));
            idx = next + 1;
        }
        let sublists: Vec<NodeId> = tree.get_sublists(list).collect();
        for sublist in sublists {
            self.process_list(tree, sublist, base);
        }
    }

    /// WHEN and ELSE under the first WHEN, END right-aligned with them, THEN
    /// values in one column.
    fn process_case(&self, tree: &mut Tree, list: NodeId, base: usize) {
        let arm_end = base + KEYWORD_WIDTH + "case ".len() + "when ".len();
        let arms = tree.node(list).get_cases(true);
        let end = tree
            .token_next_by(list, 0, |t, id| t.matches(id, Category::Keyword, &["END"]))
            .map(|(_, id)| id);

        let condition_text = |tree: &Tree, condition: &[NodeId]| {
            condition.iter().map(|&id| tree.value(id)).join(" ").chars().count()
        };
        let width = arms
            .iter()
            .filter_map(|arm| arm.condition.as_deref())
            .map(|condition| condition_text(tree, condition))
            .max()
            .unwrap_or(0);

        for condition in arms.iter().filter_map(|arm| arm.condition.as_deref()) {
            let padding = width - condition_text(tree, condition);
            let Some(at) = condition.last().and_then(|&last| tree.token_index(list, last)) else {
                continue;
            };
            if padding > 0 {
                tree.insert_before(list, at + 1, Token::new(Category::Whitespace, self.pad(padding)));
            }
        }

        let leaders = arms
            .iter()
            .skip(1)
            .filter_map(|arm| arm.condition.as_ref().unwrap_or(&arm.value).first().copied())
            .chain(end);
        for leader in leaders.collect::<Vec<_>>() {
            let Some(mut at) = tree.token_index(list, leader) else {
                continue;
            };
            if at > 0 && tree.child(list, at - 1).is_some_and(|prev| tree.is_whitespace(prev)) {
                tree.remove(list, at - 1);
                at -= 1;
            }
            let word = tree.value(leader).chars().count();
            tree.insert_before(list, at, self.newline(arm_end.saturating_sub(word)));
        }
    }
}

impl StatementFilter for AlignedIndent {
    fn process(&mut self, statement: &mut Statement) {
        let root = statement.root();
        let tree = statement.tree_mut();
        if tree.child(root, 0).is_some_and(|first| tree.is_whitespace(first)) {
            tree.remove(root, 0);
        }
        self.process_list(tree, root, 0);

        if let Some(ended_with_newline) = self.last_ended_with_newline {
            let separator = if ended_with_newline { "\n" } else { "\n\n" };
            statement
                .tree_mut()
                .insert_before(root, 0, Token::new(Category::Whitespace, separator));
        }
        self.last_ended_with_newline = Some(statement.to_string().ends_with('\n'));
    }
}

fn is_by_keyword(word: &str) -> bool {
    (word.starts_with("GROUP") || word.starts_with("ORDER")) && word.ends_with("BY")
}

fn is_aligned_keyword(word: &str) -> bool {
    super::reindent::is_split_keyword(word) || matches!(word, "ON" | "WHERE")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn aligned(sql: &str) -> String {
        let mut strip = StripWhitespace;
        let mut filter = AlignedIndent::new(' ');
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

    #[test]
    fn clauses_join_the_river() {
        let sql = "select a, b as bb,c from table \
                   join (select a * 2 as a from new_table) other \
                   on table.a = other.a \
                   where c is true \
                   and b between 3 and 4 \
                   or d is 'blue' \
                   limit 10";
        let expected = [
            "select a,",
            "       b as bb,",
            "       c",
            "  from table",
            "  join (",
            "        select a * 2 as a",
            "          from new_table",
            "       ) other",
            "    on table.a = other.a",
            " where c is true",
            "   and b between 3 and 4",
            "    or d is 'blue'",
            " limit 10",
        ]
        .join("\n");
        assert_eq!(aligned(sql), expected);
    }

    #[rstest]
    #[case("select * from a left outer join b on a.id = b.id", "select *\n  from a\n  left outer join b\n    on a.id = b.id")]
    #[case("select * from a cross join b", "select *\n  from a\n cross join b")]
    fn joins_align_on_their_first_word(#[case] sql: &str, #[case] expected: &str) {
        assert_eq!(aligned(sql), expected);
    }

    #[test]
    fn group_and_order_lists() {
        let sql = "select a, sum(x) as s from t group by a, b having sum(x) > 1 and count(y) > 5 order by 3, 2";
        let expected = [
            "select a,",
            "       sum(x) as s",
            "  from t",
            " group by a,",
            "          b",
            "having sum(x) > 1",
            "   and count(y) > 5",
            " order by 3,",
            "          2",
        ]
        .join("\n");
        assert_eq!(aligned(sql), expected);
    }

    #[test]
    fn case_arms_line_up() {
        let sql = "select a, case when a = 0 then 1 when bb = 1 then 1 else 0 end as d, extra from t";
        let expected = [
            "select a,",
            "       case when a = 0  then 1",
            "            when bb = 1 then 1",
            "            else 0",
            "             end as d,",
            "       extra",
            "  from t",
        ]
        .join("\n");
        assert_eq!(aligned(sql), expected);
    }

    #[test]
    fn plain_parentheses_are_untouched() {
        assert_eq!(
            aligned("select f(a, b) from t where (x = 1 or y = 2)"),
            "select f(a, b)\n  from t\n where (x = 1 or y = 2)"
        );
    }

    #[test]
    fn statements_are_separated() {
        assert_eq!(aligned("select a from t; select b from u"), "select a\n  from t;\n\nselect b\n  from u");
    }
}
