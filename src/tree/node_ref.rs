//! Borrowed views over tree nodes and the per-variant accessors.
//!
//! The accessors are heuristics over the grouped shape, not a parser: they
//! look for the first name-like token in the right place and return `None`
//! when the shape does not fit.
use crate::*;

/// A `(tree, id)` pair carrying the read API of one node.
#[derive(Clone, Copy, derive_more::Display)]
#[display("{}", tree.value(*id))]
pub struct NodeRef<'t> {
    tree: &'t Tree,
    id: NodeId,
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.kind(), self.category()) {
            (Some(kind), _) => write!(f, "{kind}{} {:?}", self.id, self.value()),
            (None, Some(category)) => write!(f, "{category}{} {:?}", self.id, self.value()),
            (None, None) => write!(f, "{}", self.id),
        }
    }
}

/// One arm of a CASE expression; `condition` is `None` for ELSE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseArm {
    pub condition: Option<Vec<NodeId>>,
    pub value: Vec<NodeId>,
}

/// Strip one level of `"`, `'` or `` ` `` quoting.
pub fn remove_quotes(value: &str) -> &str {
    let mut chars = value.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) if first == last && matches!(first, '"' | '\'' | '`') => {
            &value[1..value.len() - 1]
        }
        _ => value,
    }
}

const NAME_LIKE: [Category; 3] = [Category::Name, Category::Wildcard, Category::StringSymbol];

impl<'t> NodeRef<'t> {
    pub fn new(tree: &'t Tree, id: NodeId) -> Self {
        Self { tree, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'t Tree {
        self.tree
    }

    fn at(&self, id: NodeId) -> NodeRef<'t> {
        NodeRef::new(self.tree, id)
    }

    pub fn kind(&self) -> Option<GroupKind> {
        self.tree.kind(self.id)
    }

    pub fn is_kind(&self, kind: GroupKind) -> bool {
        self.tree.is_kind(self.id, kind)
    }

    pub fn is_group(&self) -> bool {
        self.tree.is_group(self.id)
    }

    pub fn token(&self) -> Option<&'t Token> {
        self.tree.token(self.id)
    }

    pub fn category(&self) -> Option<Category> {
        self.tree.category(self.id)
    }

    pub fn is_whitespace(&self) -> bool {
        self.tree.is_whitespace(self.id)
    }

    pub fn is_keyword(&self) -> bool {
        self.tree.is_keyword(self.id)
    }

    pub fn matches(&self, category: Category, values: &[&str]) -> bool {
        self.tree.matches(self.id, category, values)
    }

    pub fn value(&self) -> String {
        self.tree.value(self.id)
    }

    pub fn normalized(&self) -> std::borrow::Cow<'t, str> {
        self.tree.normalized(self.id)
    }

    pub fn children(&self) -> impl DoubleEndedIterator<Item = NodeRef<'t>> + 't {
        let tree = self.tree;
        tree.children(self.id).iter().map(move |&id| NodeRef::new(tree, id))
    }

    pub fn child(&self, idx: usize) -> Option<NodeRef<'t>> {
        self.tree.child(self.id, idx).map(|id| self.at(id))
    }

    pub fn parent(&self) -> Option<NodeRef<'t>> {
        self.tree.parent(self.id).map(|id| self.at(id))
    }

    pub fn flatten(&self) -> impl Iterator<Item = &'t Token> + 't {
        self.tree.flatten(self.id)
    }

    pub fn find_kind(&self, kind: GroupKind) -> Option<NodeRef<'t>> {
        self.tree.find_kind(self.id, kind).map(|id| self.at(id))
    }

    fn first_by_category(&self, category: Category) -> Option<(usize, NodeRef<'t>)> {
        self.tree
            .token_next_by(self.id, 0, |tree, id| tree.is_a(id, category))
            .map(|(idx, id)| (idx, self.at(id)))
    }

    fn first_matching(&self, category: Category, value: &str) -> Option<usize> {
        self.tree
            .token_next_by(self.id, 0, |tree, id| tree.matches(id, category, &[value]))
            .map(|(idx, _)| idx)
    }

    /// Alias given with `AS`, or the trailing name of `expr alias`.
    pub fn get_alias(&self) -> Option<String> {
        if let Some(as_idx) = self.first_matching(Category::Keyword, "AS") {
            return self.first_name(as_idx + 1, false, true, false);
        }
        let has_ws = self.first_by_category(Category::Whitespace).is_some();
        if self.tree.children(self.id).len() > 2 && has_ws {
            return self.first_name(0, true, false, false);
        }
        None
    }

    /// Alias if present, else the real name.
    pub fn get_name(&self) -> Option<String> {
        self.get_alias().or_else(|| self.get_real_name())
    }

    /// Name after the last qualifier (`b` for `a.b`).
    pub fn get_real_name(&self) -> Option<String> {
        let dot = self.first_matching(Category::Punctuation, ".").unwrap_or(0);
        self.first_name(dot, false, false, true)
    }

    /// Qualifier in front of the first dot (`a` for `a.b`).
    pub fn get_parent_name(&self) -> Option<String> {
        let dot = self.first_matching(Category::Punctuation, ".")?;
        let (_, prev) = self.tree.token_prev(self.id, dot, true)?;
        Some(remove_quotes(&self.tree.value(prev)).to_string())
    }

    fn first_name(&self, start: usize, reverse: bool, keywords: bool, real_name: bool) -> Option<String> {
        let children = self.tree.children(self.id);
        let candidates = children.get(start..).unwrap_or(&[]);
        let mut iter: Box<dyn Iterator<Item = &NodeId>> = if reverse {
            Box::new(candidates.iter().rev())
        } else {
            Box::new(candidates.iter())
        };
        iter.find_map(|&id| {
            let node = self.at(id);
            match node.category() {
                Some(c) if NAME_LIKE.contains(&c) || (keywords && c == Category::Keyword) => {
                    Some(Some(remove_quotes(&node.value()).to_string()))
                }
                Some(_) => None,
                None if node.is_kind(GroupKind::Identifier) || node.is_kind(GroupKind::Function) => {
                    Some(if real_name { node.get_real_name() } else { node.get_name() })
                }
                None => None,
            }
        })
        .flatten()
    }

    /// Type name after `::`.
    pub fn get_typecast(&self) -> Option<String> {
        let marker = self.first_matching(Category::Punctuation, "::")?;
        let (_, next) = self.tree.token_next(self.id, marker, false)?;
        Some(self.tree.value(next))
    }

    /// `ASC` or `DESC` when the identifier carries an ordering keyword.
    pub fn get_ordering(&self) -> Option<String> {
        let (_, ordering) = self.first_by_category(Category::KeywordOrder)?;
        Some(ordering.normalized().into_owned())
    }

    pub fn is_wildcard(&self) -> bool {
        self.first_by_category(Category::Wildcard).is_some()
    }

    /// Contents of each `[...]` subscript, brackets excluded.
    pub fn get_array_indices(&self) -> Vec<Vec<NodeRef<'t>>> {
        self.children()
            .filter(|child| child.is_kind(GroupKind::SquareBrackets))
            .map(|brackets| {
                let inner: Vec<_> = brackets.children().collect();
                inner.get(1..inner.len().saturating_sub(1)).unwrap_or(&[]).to_vec()
            })
            .collect()
    }

    /// List items with whitespace and commas removed.
    pub fn get_identifiers(&self) -> Vec<NodeRef<'t>> {
        self.children()
            .filter(|child| !(child.is_whitespace() || child.matches(Category::Punctuation, &[","])))
            .collect()
    }

    /// WHEN/THEN/ELSE arms of a CASE group, in order.
    ///
    /// Keywords stay with the part they introduce. A condition-less CASE body
    /// before the first WHEN (`CASE x WHEN ...`) forms its own arm.
    pub fn get_cases(&self, skip_ws: bool) -> Vec<CaseArm> {
        #[derive(PartialEq)]
        enum Mode {
            Condition,
            Value,
            Done,
        }
        let mut arms: Vec<CaseArm> = Vec::new();
        let mut mode = Mode::Condition;
        for child in self.children() {
            if child.matches(Category::Keyword, &["CASE"]) || (skip_ws && child.is_whitespace()) {
                continue;
            }
            if child.matches(Category::Keyword, &["WHEN"]) {
                arms.push(CaseArm {
                    condition: Some(Vec::new()),
                    value: Vec::new(),
                });
                mode = Mode::Condition;
            } else if child.matches(Category::Keyword, &["THEN"]) {
                mode = Mode::Value;
            } else if child.matches(Category::Keyword, &["ELSE"]) {
                arms.push(CaseArm {
                    condition: None,
                    value: Vec::new(),
                });
                mode = Mode::Value;
            } else if child.matches(Category::Keyword, &["END"]) {
                mode = Mode::Done;
            }
            if mode != Mode::Done && arms.is_empty() {
                arms.push(CaseArm {
                    condition: Some(Vec::new()),
                    value: Vec::new(),
                });
            }
            let Some(arm) = arms.last_mut() else { continue };
            match mode {
                Mode::Condition => arm.condition.get_or_insert_with(Vec::new).push(child.id),
                Mode::Value => arm.value.push(child.id),
                Mode::Done => {}
            }
        }
        arms
    }

    /// Arguments of a function call.
    pub fn get_parameters(&self) -> Vec<NodeRef<'t>> {
        let Some(parens) = self.children().rev().find(|c| c.is_kind(GroupKind::Parenthesis)) else {
            return Vec::new();
        };
        for child in parens.children() {
            if child.is_kind(GroupKind::IdentifierList) {
                return child.get_identifiers();
            }
            let literal = child.category().is_some_and(|c| c.is_a(Category::Literal));
            if literal || child.is_kind(GroupKind::Function) || child.is_kind(GroupKind::Identifier) {
                return vec![child];
            }
        }
        Vec::new()
    }

    /// Left operand of a comparison.
    pub fn left(&self) -> Option<NodeRef<'t>> {
        self.child(0)
    }

    /// Right operand of a comparison.
    pub fn right(&self) -> Option<NodeRef<'t>> {
        self.children().next_back()
    }

    /// Statement type: the leading DML/DDL keyword, looking through a `WITH`
    /// clause, or `UNKNOWN`.
    pub fn get_type(&self) -> String {
        const UNKNOWN: &str = "UNKNOWN";
        let tree = self.tree;
        let Some((first_idx, first)) = tree.token_first(self.id, true, true) else {
            return UNKNOWN.into();
        };
        match tree.category(first) {
            Some(Category::KeywordDml | Category::KeywordDdl) => tree.normalized(first).into_owned(),
            Some(Category::KeywordCte) => {
                let dml = tree
                    .token_next(self.id, first_idx, true)
                    .filter(|&(_, id)| tree.is_any_kind(id, &[GroupKind::Identifier, GroupKind::IdentifierList]))
                    .and_then(|(idx, _)| tree.token_next(self.id, idx, true))
                    .filter(|&(_, id)| tree.category(id) == Some(Category::KeywordDml));
                match dml {
                    Some((_, id)) => tree.normalized(id).into_owned(),
                    None => UNKNOWN.into(),
                }
            }
            _ => UNKNOWN.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn first(sql: &str, kind: GroupKind) -> (Statement, NodeId) {
        let stmt = parse(sql, &LexerOptions::default()).unwrap().remove(0);
        let id = stmt.tree().find_kind(stmt.root(), kind).unwrap();
        (stmt, id)
    }

    #[rstest]
    #[case("select foo as bar", Some("bar"), Some("bar"), Some("foo"), None)]
    #[case("select foo bar", Some("bar"), Some("bar"), Some("foo"), None)]
    #[case("select foo", None, Some("foo"), Some("foo"), None)]
    #[case("select foo.bar", None, Some("bar"), Some("bar"), Some("foo"))]
    #[case(r#"select "foo"."bar" baz"#, Some("baz"), Some("baz"), Some("bar"), Some("foo"))]
    #[case("select (x + 1) as y", Some("y"), Some("y"), Some("y"), None)]
    fn identifier_names(
        #[case] sql: &str,
        #[case] alias: Option<&str>,
        #[case] name: Option<&str>,
        #[case] real_name: Option<&str>,
        #[case] parent: Option<&str>,
    ) {
        let (stmt, id) = first(sql, GroupKind::Identifier);
        let node = stmt.tree().node(id);
        assert_eq!(node.get_alias().as_deref(), alias);
        assert_eq!(node.get_name().as_deref(), name);
        assert_eq!(node.get_real_name().as_deref(), real_name);
        assert_eq!(node.get_parent_name().as_deref(), parent);
    }

    #[rstest]
    #[case(r#""x""#, "x")]
    #[case("'x'", "x")]
    #[case("`x`", "x")]
    #[case(r#""x'"#, r#""x'"#)]
    #[case("x", "x")]
    fn strips_matching_quotes(#[case] value: &str, #[case] expected: &str) {
        assert_eq!(remove_quotes(value), expected);
    }

    #[test]
    fn typecast_ordering_and_wildcard() {
        let (stmt, id) = first("select x::int from t", GroupKind::Identifier);
        assert_eq!(stmt.tree().node(id).get_typecast().as_deref(), Some("int"));

        let (stmt, id) = first("select t.* from t order by foo desc", GroupKind::Identifier);
        assert!(stmt.tree().node(id).is_wildcard());
        let ordered = stmt
            .tree()
            .descendants(stmt.root())
            .map(|d| stmt.tree().node(d))
            .find(|n| n.get_ordering().is_some() && n.is_kind(GroupKind::Identifier))
            .unwrap();
        assert_eq!(ordered.value(), "foo desc");
        assert_eq!(ordered.get_ordering().as_deref(), Some("DESC"));
    }

    #[test]
    fn array_indices() {
        let (stmt, id) = first("select col[1][x] from t", GroupKind::Identifier);
        let node = stmt.tree().node(id);
        let indices: Vec<Vec<String>> = node
            .get_array_indices()
            .iter()
            .map(|idx| idx.iter().map(NodeRef::value).collect())
            .collect();
        assert_eq!(indices, vec![vec!["1".to_string()], vec!["x".to_string()]]);
    }

    #[test]
    fn identifier_list_items() {
        let (stmt, id) = first("select a, b, 1 from t", GroupKind::IdentifierList);
        let items: Vec<String> = stmt.tree().node(id).get_identifiers().iter().map(NodeRef::value).collect();
        assert_eq!(items, ["a", "b", "1"]);
    }

    #[test]
    fn case_arms() {
        let (stmt, id) = first("select case when a = 1 then 'x' else 'y' end", GroupKind::Case);
        let tree = stmt.tree();
        let text = |ids: &[NodeId]| ids.iter().map(|&i| tree.value(i)).collect::<String>();
        let arms = tree.node(id).get_cases(true);
        assert_eq!(arms.len(), 2);
        assert_eq!(arms[0].condition.as_deref().map(text).as_deref(), Some("whena = 1"));
        assert_eq!(text(&arms[0].value), "then'x'");
        assert_eq!(arms[1].condition, None);
        assert_eq!(text(&arms[1].value), "else'y'");
        // whitespace before the first WHEN opens an arm of its own
        assert_eq!(tree.node(id).get_cases(false).len(), 3);
    }

    #[test]
    fn case_with_operand() {
        let (stmt, id) = first("select case x when 1 then 2 end", GroupKind::Case);
        let tree = stmt.tree();
        let arms = tree.node(id).get_cases(true);
        assert_eq!(arms.len(), 2);
        let operand: Vec<String> = arms[0].condition.iter().flatten().map(|&i| tree.value(i)).collect();
        assert_eq!(operand, ["x"]);
    }

    #[rstest]
    #[case("select foo(1, 2)", 2)]
    #[case("select foo(x)", 1)]
    #[case("select foo()", 0)]
    fn function_parameters(#[case] sql: &str, #[case] expected: usize) {
        let (stmt, id) = first(sql, GroupKind::Function);
        assert_eq!(stmt.tree().node(id).get_parameters().len(), expected);
    }

    #[test]
    fn comparison_sides() {
        let (stmt, id) = first("select * from t where a >= 10", GroupKind::Comparison);
        let node = stmt.tree().node(id);
        assert_eq!(node.left().map(|n| n.value()).as_deref(), Some("a"));
        assert_eq!(node.right().map(|n| n.value()).as_deref(), Some("10"));
    }

    #[rstest]
    #[case("select 1", "SELECT")]
    #[case("  insert into t values (1)", "INSERT")]
    #[case("-- hi\nupdate t set a = 1", "UPDATE")]
    #[case("create table t (a int)", "CREATE")]
    #[case("with x as (select 1) select * from x", "SELECT")]
    #[case("with x as (select 1), y as (select 2) delete from x", "DELETE")]
    #[case("foo bar", "UNKNOWN")]
    #[case("", "UNKNOWN")]
    fn statement_type(#[case] sql: &str, #[case] expected: &str) {
        let statements = parse(sql, &LexerOptions::default()).unwrap();
        let actual = statements.first().map_or("UNKNOWN".to_string(), Statement::get_type);
        assert_eq!(actual, expected);
    }
}
