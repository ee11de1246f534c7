//! Grouping passes: rewrite a flat statement into a nested token tree.
//!
//! Each pass recognises one construct and replaces the matching run of
//! siblings with a group node, descending into existing groups first. The
//! passes run in a fixed order; later passes see the structure earlier ones
//! built (functions see parentheses, comparisons see identifiers, and so on).
//!
//! Design notes:
//! - Three pass shapes cover almost everything: matching pairs (an explicit
//!   stack of open positions), binary constructs around an operator token
//!   (`Binary` rules with prev/next predicates and a span function), and small
//!   hand-written scans for the rest.
//! - All heuristics are best effort. Unbalanced or unexpected input leaves
//!   tokens ungrouped; it never fails.
//!
//! Guarantees:
//! - Grouping never changes the flattened text.
//! - Running the full pass list twice gives the same tree as running it once.
//! - Recursion is bounded by `max_depth`; deeper input fails with
//!   `Error::NestingTooDeep` instead of exhausting the stack.
use crate::*;

/// Nesting limit used when nothing else is configured.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Runs the grouping passes over statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grouper {
    max_depth: usize,
}

impl Default for Grouper {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl From<&Config> for Grouper {
    fn from(config: &Config) -> Self {
        Self::new(config.max_depth)
    }
}

type PassFn = fn(&Pass, &mut Tree, NodeId, usize) -> Result;

const PASSES: &[(&str, PassFn)] = &[
    ("comments", Pass::comments),
    ("brackets", Pass::brackets),
    ("parenthesis", Pass::parenthesis),
    ("functions", Pass::functions),
    ("where", Pass::where_clauses),
    ("case", Pass::case),
    ("period", Pass::period),
    ("arrays", Pass::arrays),
    ("identifier", Pass::identifiers),
    ("typed_literal", Pass::typed_literals),
    ("operator", Pass::operators),
    ("order", Pass::order),
    ("typecasts", Pass::typecasts),
    ("as", Pass::aliases_with_as),
    ("aliased", Pass::aliased),
    ("assignment", Pass::assignment),
    ("comparison", Pass::comparison),
    ("align_comments", Pass::align_comments),
    ("identifier_list", Pass::identifier_list),
    ("if", Pass::if_blocks),
    ("for", Pass::for_blocks),
    ("begin", Pass::begin_blocks),
];

impl Grouper {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Apply every pass, in order, to `statement` in place.
    pub fn group(&self, statement: &mut Statement) -> Result {
        let root = statement.root();
        let pass = Pass {
            max_depth: self.max_depth,
        };
        let tree = statement.tree_mut();
        for (name, run) in PASSES {
            run(&pass, tree, root, 0)?;
            trace!(pass = name, nodes = tree.node_count(), "grouping pass done");
        }
        debug!(
            nodes = statement.tree().node_count(),
            top_level = statement.tree().children(root).len(),
            "grouped statement"
        );
        Ok(())
    }
}

/// Group `statement` with the default nesting limit.
pub fn group(statement: &mut Statement) -> Result {
    Grouper::default().group(statement)
}

/// Positions handed to a [`Binary`] span function.
#[derive(Debug, Clone, Copy)]
struct Span {
    prev: usize,
    op: usize,
    next: Option<usize>,
}

/// A construct grouped around an operator token: `prev op next`.
struct Binary {
    kind: GroupKind,
    extend: bool,
    is_op: fn(&Tree, NodeId) -> bool,
    valid_prev: fn(&Tree, NodeId) -> bool,
    valid_next: fn(&Tree, Option<NodeId>) -> bool,
    /// Inclusive child range to group.
    span: fn(&Tree, NodeId, Span) -> (usize, usize),
    /// New category for the operator token once grouped.
    retag: Option<Category>,
}

fn prev_to_next(_: &Tree, _: NodeId, span: Span) -> (usize, usize) {
    (span.prev, span.next.unwrap_or(span.op))
}

fn any_next(_: &Tree, _: Option<NodeId>) -> bool {
    true
}

fn some_next(_: &Tree, next: Option<NodeId>) -> bool {
    next.is_some()
}

fn token_in(tree: &Tree, id: NodeId, categories: &[Category]) -> bool {
    tree.category(id)
        .is_some_and(|c| categories.iter().any(|&ancestor| c.is_a(ancestor)))
}

const OPERANDS: &[Category] = &[Category::Number, Category::String, Category::Name];

const PERIOD: Binary = Binary {
    kind: GroupKind::Identifier,
    extend: true,
    is_op: |tree, id| tree.matches(id, Category::Punctuation, &["."]),
    valid_prev: |tree, id| {
        tree.is_any_kind(id, &[GroupKind::SquareBrackets, GroupKind::Identifier])
            || token_in(tree, id, &[Category::Name, Category::StringSymbol])
    },
    valid_next: any_next,
    span: |tree, list, span| {
        let qualified = span.next.and_then(|n| tree.child(list, n)).is_some_and(|next| {
            tree.is_any_kind(next, &[GroupKind::SquareBrackets, GroupKind::Function])
                || token_in(
                    tree,
                    next,
                    &[Category::Name, Category::StringSymbol, Category::Wildcard, Category::StringSingle],
                )
        });
        match span.next {
            Some(next) if qualified => (span.prev, next),
            _ => (span.prev, span.op),
        }
    },
    retag: None,
};

const ARRAYS: Binary = Binary {
    kind: GroupKind::Identifier,
    extend: true,
    is_op: |tree, id| tree.is_kind(id, GroupKind::SquareBrackets),
    valid_prev: |tree, id| {
        tree.is_any_kind(
            id,
            &[GroupKind::SquareBrackets, GroupKind::Identifier, GroupKind::Function],
        ) || token_in(tree, id, &[Category::Name, Category::StringSymbol])
    },
    valid_next: any_next,
    span: |_, _, span| (span.prev, span.op),
    retag: None,
};

const OPERATOR: Binary = Binary {
    kind: GroupKind::Operation,
    extend: false,
    is_op: |tree, id| matches!(tree.category(id), Some(Category::Operator | Category::Wildcard)),
    valid_prev: operator_operand,
    valid_next: |tree, next| next.is_some_and(|id| operator_operand(tree, id)),
    span: prev_to_next,
    retag: Some(Category::Operator),
};

fn operator_operand(tree: &Tree, id: NodeId) -> bool {
    token_in(tree, id, OPERANDS)
        || tree.is_any_kind(
            id,
            &[
                GroupKind::SquareBrackets,
                GroupKind::Parenthesis,
                GroupKind::Function,
                GroupKind::Identifier,
                GroupKind::Operation,
                GroupKind::TypedLiteral,
            ],
        )
        || tree.matches(id, Category::Keyword, &["CURRENT_DATE", "CURRENT_TIME", "CURRENT_TIMESTAMP"])
}

/// Groups built after the binary passes; they never take part in an expression.
const BLOCKS: &[GroupKind] = &[GroupKind::If, GroupKind::For, GroupKind::Begin];

fn expression_start(tree: &Tree, id: NodeId) -> bool {
    (!tree.is_keyword(id) || tree.normalized(id) == "NULL") && !tree.is_any_kind(id, BLOCKS)
}

/// `x::int desc` takes the ordering keyword along with the cast type.
const TYPECASTS: Binary = Binary {
    kind: GroupKind::Identifier,
    extend: true,
    is_op: |tree, id| tree.matches(id, Category::Punctuation, &["::"]),
    valid_prev: expression_start,
    valid_next: some_next,
    span: |tree, list, span| {
        let Some(next) = span.next else {
            return (span.prev, span.op);
        };
        let ordering = tree
            .token_next(list, next, true)
            .filter(|&(_, id)| tree.category(id) == Some(Category::KeywordOrder));
        (span.prev, ordering.map_or(next, |(idx, _)| idx))
    },
    retag: None,
};

const AS: Binary = Binary {
    kind: GroupKind::Identifier,
    extend: true,
    is_op: |tree, id| tree.is_keyword(id) && tree.normalized(id) == "AS",
    valid_prev: expression_start,
    valid_next: |tree, next| {
        next.is_some_and(|id| {
            !matches!(
                tree.category(id),
                Some(Category::KeywordDml | Category::KeywordDdl | Category::KeywordCte)
            )
        })
    },
    span: prev_to_next,
    retag: None,
};

const ASSIGNMENT: Binary = Binary {
    kind: GroupKind::Assignment,
    extend: true,
    is_op: |tree, id| tree.matches(id, Category::Assignment, &[":="]),
    valid_prev: |tree, id| !tree.is_keyword(id),
    valid_next: |tree, next| next.is_some_and(|id| !tree.is_keyword(id)),
    span: |tree, list, span| {
        let next = span.next.unwrap_or(span.op);
        let end = tree
            .token_next_by(list, next + 1, |tree, id| tree.matches(id, Category::Punctuation, &[";"]))
            .map_or(next, |(idx, _)| idx);
        (span.prev, end)
    },
    retag: None,
};

const COMPARISON: Binary = Binary {
    kind: GroupKind::Comparison,
    extend: false,
    is_op: |tree, id| tree.category(id) == Some(Category::Comparison),
    valid_prev: comparison_operand,
    valid_next: |tree, next| next.is_some_and(|id| comparison_operand(tree, id)),
    span: prev_to_next,
    retag: None,
};

fn comparison_operand(tree: &Tree, id: NodeId) -> bool {
    token_in(tree, id, OPERANDS)
        || tree.is_any_kind(
            id,
            &[
                GroupKind::Parenthesis,
                GroupKind::Function,
                GroupKind::Identifier,
                GroupKind::Operation,
                GroupKind::TypedLiteral,
            ],
        )
        || tree.matches(id, Category::Keyword, &["NULL"])
}

const IDENTIFIER_LIST: Binary = Binary {
    kind: GroupKind::IdentifierList,
    extend: true,
    is_op: |tree, id| tree.matches(id, Category::Punctuation, &[","]),
    valid_prev: list_item,
    valid_next: |tree, next| next.is_some_and(|id| list_item(tree, id)),
    span: prev_to_next,
    retag: None,
};

fn list_item(tree: &Tree, id: NodeId) -> bool {
    tree.is_any_kind(
        id,
        &[
            GroupKind::Function,
            GroupKind::Case,
            GroupKind::Identifier,
            GroupKind::Comparison,
            GroupKind::IdentifierList,
            GroupKind::Operation,
            GroupKind::Comment,
        ],
    ) || tree.category(id).is_some_and(|c| {
        c == Category::Keyword
            || [Category::Number, Category::String, Category::Name, Category::Comment, Category::Wildcard]
                .iter()
                .any(|&ancestor| c.is_a(ancestor))
    })
}

const TYPED_LITERAL_TYPES: &[&str] = &["DATE", "TIME", "TIMESTAMP", "INTERVAL"];
const INTERVAL_UNITS: &[&str] = &["DAY", "HOUR", "MINUTE", "MONTH", "SECOND", "YEAR"];

/// Settings shared by the passes of one grouping run.
#[derive(Debug, Clone, Copy)]
struct Pass {
    max_depth: usize,
}

impl Pass {
    /// Depth guard for every descent into a sublist.
    fn enter(&self, depth: usize) -> Result<usize> {
        if depth >= self.max_depth {
            warn!(max_depth = self.max_depth, "statement nesting exceeds the grouping limit");
            return Err(Error::NestingTooDeep(self.max_depth));
        }
        Ok(depth + 1)
    }

    /// Run `pass` on every direct sublist of `list` that is not one of `skip`.
    fn recurse(&self, tree: &mut Tree, list: NodeId, depth: usize, skip: &[GroupKind], pass: PassFn) -> Result {
        let sublists: Vec<NodeId> = tree
            .get_sublists(list)
            .filter(|&id| !tree.is_any_kind(id, skip))
            .collect();
        for sublist in sublists {
            pass(self, tree, sublist, depth)?;
        }
        Ok(())
    }

    /// Stack-based pairing of `kind`'s open and close tokens.
    ///
    /// Inner pairs are grouped before the outer ones that contain them, and
    /// closes without an open are skipped.
    fn matching(&self, tree: &mut Tree, list: NodeId, depth: usize, kind: GroupKind) -> Result {
        let depth = self.enter(depth)?;
        let (Some(open), Some(close)) = (kind.open(), kind.close()) else {
            return Ok(());
        };
        let mut opens: Vec<usize> = Vec::new();
        let mut idx = 0;
        while let Some(id) = tree.child(list, idx) {
            if tree.is_whitespace(id) {
                idx += 1;
                continue;
            }
            if tree.is_group(id) {
                if !tree.is_kind(id, kind) {
                    self.matching(tree, id, depth, kind)?;
                }
            } else if tree.matches_pattern(id, open) {
                opens.push(idx);
            } else if tree.matches_pattern(id, close) {
                if let Some(start) = opens.pop() {
                    tree.group_tokens(list, kind, start, idx, false);
                    idx = start;
                }
            }
            idx += 1;
        }
        Ok(())
    }

    /// Group every `prev op next` occurrence described by `rule`.
    fn binary(&self, tree: &mut Tree, list: NodeId, depth: usize, rule: &Binary) -> Result {
        let depth = self.enter(depth)?;
        let sublists: Vec<NodeId> = tree
            .get_sublists(list)
            .filter(|&id| !tree.is_kind(id, rule.kind))
            .collect();
        for sublist in sublists {
            self.binary(tree, sublist, depth, rule)?;
        }

        let mut prev: Option<usize> = None;
        let mut idx = 0;
        while let Some(id) = tree.child(list, idx) {
            if tree.is_whitespace(id) {
                idx += 1;
                continue;
            }
            if (rule.is_op)(tree, id) {
                let next = tree.token_next(list, idx, true);
                let prev_ok = prev
                    .and_then(|p| tree.child(list, p))
                    .is_some_and(|p| (rule.valid_prev)(tree, p));
                if prev_ok && (rule.valid_next)(tree, next.map(|(_, n)| n)) {
                    let span = Span {
                        prev: prev.unwrap_or(idx),
                        op: idx,
                        next: next.map(|(n, _)| n),
                    };
                    let (from, to) = (rule.span)(tree, list, span);
                    if let (Some(category), Some(token)) = (rule.retag, tree.token_mut(id)) {
                        token.category = category;
                    }
                    tree.group_tokens(list, rule.kind, from, to, rule.extend);
                    prev = Some(from);
                    idx = from + 1;
                    continue;
                }
            }
            prev = Some(idx);
            idx += 1;
        }
        Ok(())
    }

    fn comments(&self, tree: &mut Tree, list: NodeId, depth: usize) -> Result {
        let depth = self.enter(depth)?;
        self.recurse(tree, list, depth, &[GroupKind::Comment], Self::comments)?;
        let mut idx = 0;
        while let Some((start, _)) = tree.token_next_by(list, idx, |t, id| t.is_a(id, Category::Comment)) {
            let mut last_comment = start;
            let mut stop = None;
            for (i, &id) in tree.children(list).iter().enumerate().skip(start + 1) {
                if tree.is_a(id, Category::Comment) {
                    last_comment = i;
                } else if !tree.is_whitespace(id) {
                    stop = Some(i);
                    break;
                }
            }
            // Whitespace up to the next token belongs to the run, except at the end of the list.
            let end = stop.map_or(last_comment, |stop| stop - 1);
            tree.group_tokens(list, GroupKind::Comment, start, end, false);
            idx = start + 1;
        }
        Ok(())
    }

    fn brackets(&self, tree: &mut Tree, list: NodeId, depth: usize) -> Result {
        self.matching(tree, list, depth, GroupKind::SquareBrackets)
    }

    fn parenthesis(&self, tree: &mut Tree, list: NodeId, depth: usize) -> Result {
        self.matching(tree, list, depth, GroupKind::Parenthesis)
    }

    /// `name(...)` becomes a Function, except for the column list of a
    /// `CREATE TABLE` without `AS`.
    fn functions(&self, tree: &mut Tree, list: NodeId, depth: usize) -> Result {
        let depth = self.enter(depth)?;
        self.recurse(tree, list, depth, &[GroupKind::Function], Self::functions)?;
        let has = |accept: fn(&str) -> bool| {
            tree.children(list)
                .iter()
                .any(|&id| tree.is_keyword(id) && accept(&tree.normalized(id)))
        };
        if has(|w| w.starts_with("CREATE")) && has(|w| w == "TABLE") && !has(|w| w == "AS") {
            return Ok(());
        }
        let mut idx = 0;
        while let Some((name, _)) = tree.token_next_by(list, idx, |t, id| t.is_a(id, Category::Name)) {
            let call = tree
                .token_next(list, name, true)
                .filter(|&(_, next)| tree.is_kind(next, GroupKind::Parenthesis));
            if let Some((parens, _)) = call {
                tree.group_tokens(list, GroupKind::Function, name, parens, false);
            }
            idx = name + 1;
        }
        Ok(())
    }

    /// WHERE up to the next clause keyword, `;` or unmatched END, else up to
    /// the last groupable token.
    fn where_clauses(&self, tree: &mut Tree, list: NodeId, depth: usize) -> Result {
        let depth = self.enter(depth)?;
        self.recurse(tree, list, depth, &[GroupKind::Where], Self::where_clauses)?;
        let (Some(open), Some(close)) = (GroupKind::Where.open(), GroupKind::Where.close()) else {
            return Ok(());
        };
        let mut idx = 0;
        while let Some((start, _)) = tree.token_next_by(list, idx, |t, id| t.matches_pattern(id, open)) {
            let children = tree.children(list);
            let mut last = children.len() - 1;
            let bracketed = tree.is_any_kind(list, &[GroupKind::Parenthesis, GroupKind::SquareBrackets]);
            if bracketed && last > start && tree.is_a(children[last], Category::Punctuation) {
                last -= 1;
            }
            let mut cases = 0usize;
            let mut end = last;
            for (i, &id) in children.iter().enumerate().take(last + 1).skip(start + 1) {
                let stops = if tree.matches(id, Category::Keyword, &["CASE"]) {
                    cases += 1;
                    false
                } else if tree.matches(id, Category::Keyword, &["END"]) {
                    match cases.checked_sub(1) {
                        Some(open_cases) => {
                            cases = open_cases;
                            false
                        }
                        None => true,
                    }
                } else {
                    tree.matches_pattern(id, close) || tree.matches(id, Category::Punctuation, &[";"])
                };
                if stops {
                    end = i - 1;
                    break;
                }
            }
            tree.group_tokens(list, GroupKind::Where, start, end, false);
            idx = start + 1;
        }
        Ok(())
    }

    fn case(&self, tree: &mut Tree, list: NodeId, depth: usize) -> Result {
        self.matching(tree, list, depth, GroupKind::Case)
    }

    fn period(&self, tree: &mut Tree, list: NodeId, depth: usize) -> Result {
        self.binary(tree, list, depth, &PERIOD)
    }

    fn arrays(&self, tree: &mut Tree, list: NodeId, depth: usize) -> Result {
        self.binary(tree, list, depth, &ARRAYS)
    }

    /// Bare names become single-token Identifiers.
    fn identifiers(&self, tree: &mut Tree, list: NodeId, depth: usize) -> Result {
        let depth = self.enter(depth)?;
        self.recurse(tree, list, depth, &[GroupKind::Identifier], Self::identifiers)?;
        for idx in 0..tree.children(list).len() {
            let id = tree.children(list)[idx];
            if matches!(tree.category(id), Some(Category::Name | Category::StringSymbol)) {
                tree.group_tokens(list, GroupKind::Identifier, idx, idx, false);
            }
        }
        Ok(())
    }

    /// `DATE '...'`, `INTERVAL '...' DAY` and friends.
    fn typed_literals(&self, tree: &mut Tree, list: NodeId, depth: usize) -> Result {
        let depth = self.enter(depth)?;
        self.recurse(tree, list, depth, &[GroupKind::TypedLiteral], Self::typed_literals)?;
        let mut idx = 0;
        while let Some(id) = tree.child(list, idx) {
            let typed = tree
                .token(id)
                .filter(|t| t.is_keyword() || t.category == Category::NameBuiltin)
                .and_then(|t| {
                    TYPED_LITERAL_TYPES
                        .iter()
                        .find(|ty| t.value.eq_ignore_ascii_case(ty))
                });
            let literal = typed.and_then(|_| tree.token_next(list, idx, true)).filter(|&(_, s)| {
                tree.category(s) == Some(Category::StringSingle)
            });
            if let (Some(&ty), Some((mut end, _))) = (typed, literal) {
                if ty == "INTERVAL" {
                    let unit = tree
                        .token_next(list, end, true)
                        .filter(|&(_, u)| tree.is_keyword(u) && INTERVAL_UNITS.contains(&&*tree.normalized(u)));
                    if let Some((unit, _)) = unit {
                        end = unit;
                    }
                }
                tree.group_tokens(list, GroupKind::TypedLiteral, idx, end, false);
            }
            idx += 1;
        }
        Ok(())
    }

    fn operators(&self, tree: &mut Tree, list: NodeId, depth: usize) -> Result {
        self.binary(tree, list, depth, &OPERATOR)
    }

    /// `expr ASC|DESC` folds the ordering keyword into the Identifier.
    fn order(&self, tree: &mut Tree, list: NodeId, depth: usize) -> Result {
        let depth = self.enter(depth)?;
        self.recurse(tree, list, depth, &[GroupKind::Identifier], Self::order)?;
        let mut idx = 0;
        while let Some((ordering, _)) =
            tree.token_next_by(list, idx, |t, id| t.category(id) == Some(Category::KeywordOrder))
        {
            let target = tree.token_prev(list, ordering, true).filter(|&(_, prev)| {
                tree.is_kind(prev, GroupKind::Identifier) || tree.is_a(prev, Category::Number)
            });
            idx = match target {
                Some((prev, _)) => {
                    tree.group_tokens(list, GroupKind::Identifier, prev, ordering, true);
                    prev + 1
                }
                None => ordering + 1,
            };
        }
        Ok(())
    }

    fn typecasts(&self, tree: &mut Tree, list: NodeId, depth: usize) -> Result {
        self.binary(tree, list, depth, &TYPECASTS)
    }

    fn aliases_with_as(&self, tree: &mut Tree, list: NodeId, depth: usize) -> Result {
        self.binary(tree, list, depth, &AS)
    }

    /// `expr alias` without AS: the alias Identifier joins the expression.
    ///
    /// Merging stays on the same expression, so `a b c` ends up as one
    /// Identifier and a second run finds nothing left to merge.
    fn aliased(&self, tree: &mut Tree, list: NodeId, depth: usize) -> Result {
        let depth = self.enter(depth)?;
        self.recurse(tree, list, depth, &[GroupKind::Identifier], Self::aliased)?;
        let aliasable = |tree: &Tree, id: NodeId| {
            tree.is_any_kind(
                id,
                &[
                    GroupKind::Parenthesis,
                    GroupKind::Function,
                    GroupKind::Case,
                    GroupKind::Identifier,
                    GroupKind::Operation,
                ],
            ) || tree.is_a(id, Category::Number)
        };
        let mut idx = 0;
        while let Some((expr, _)) = tree.token_next_by(list, idx, aliasable) {
            let alias = tree
                .token_next_skipping(list, expr, true, true)
                .filter(|&(_, next)| tree.is_kind(next, GroupKind::Identifier));
            idx = match alias {
                Some((alias, _)) => {
                    tree.group_tokens(list, GroupKind::Identifier, expr, alias, true);
                    expr
                }
                None => expr + 1,
            };
        }
        Ok(())
    }

    fn assignment(&self, tree: &mut Tree, list: NodeId, depth: usize) -> Result {
        self.binary(tree, list, depth, &ASSIGNMENT)
    }

    fn comparison(&self, tree: &mut Tree, list: NodeId, depth: usize) -> Result {
        self.binary(tree, list, depth, &COMPARISON)
    }

    /// A comment following a group is folded into that group.
    ///
    /// Brackets and the groups built by later passes (lists, blocks) are not
    /// targets, so a second run finds the same candidates as the first.
    fn align_comments(&self, tree: &mut Tree, list: NodeId, depth: usize) -> Result {
        let depth = self.enter(depth)?;
        self.recurse(tree, list, depth, &[], Self::align_comments)?;
        let nested = !tree.is_kind(list, GroupKind::Statement);
        let mut idx = 0;
        while let Some((comment, _)) =
            tree.token_next_by(list, idx, |t, id| t.is_kind(id, GroupKind::Comment))
        {
            let trailing = nested && comment + 1 == tree.children(list).len();
            let target = tree.token_prev(list, comment, true).filter(|&(_, prev)| {
                tree.is_group(prev)
                    && !tree.is_any_kind(
                        prev,
                        &[
                            GroupKind::Parenthesis,
                            GroupKind::SquareBrackets,
                            GroupKind::IdentifierList,
                            GroupKind::If,
                            GroupKind::For,
                            GroupKind::Begin,
                        ],
                    )
            });
            idx = match target {
                Some((prev, prev_id)) if !trailing => {
                    let kind = tree.kind(prev_id).unwrap_or(GroupKind::Comment);
                    tree.group_tokens(list, kind, prev, comment, true);
                    prev + 1
                }
                _ => comment + 1,
            };
        }
        Ok(())
    }

    fn identifier_list(&self, tree: &mut Tree, list: NodeId, depth: usize) -> Result {
        self.binary(tree, list, depth, &IDENTIFIER_LIST)
    }

    fn if_blocks(&self, tree: &mut Tree, list: NodeId, depth: usize) -> Result {
        self.matching(tree, list, depth, GroupKind::If)
    }

    fn for_blocks(&self, tree: &mut Tree, list: NodeId, depth: usize) -> Result {
        self.matching(tree, list, depth, GroupKind::For)
    }

    fn begin_blocks(&self, tree: &mut Tree, list: NodeId, depth: usize) -> Result {
        self.matching(tree, list, depth, GroupKind::Begin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grouped(sql: &str) -> Statement {
        common_init();
        let tokens = tokenize(sql, &LexerOptions::default()).unwrap().with_positions();
        let mut stmt = split_statements(tokens).next().unwrap();
        group(&mut stmt).unwrap();
        assert_eq!(stmt.to_string(), sql);
        stmt
    }

    /// `(kind, value)` of the top-level children, whitespace dropped.
    fn top(stmt: &Statement) -> Vec<(String, String)> {
        let tree = stmt.tree();
        stmt.node()
            .children()
            .filter(|c| !c.is_whitespace())
            .map(|c| {
                let label = match (tree.kind(c.id()), c.category()) {
                    (Some(kind), _) => kind.to_string(),
                    (None, Some(category)) => category.to_string(),
                    (None, None) => String::new(),
                };
                (label, c.value())
            })
            .collect()
    }

    fn kinds(stmt: &Statement) -> Vec<String> {
        top(stmt).into_iter().map(|(kind, _)| kind).collect()
    }

    fn count(stmt: &Statement, kind: GroupKind) -> usize {
        let tree = stmt.tree();
        tree.descendants(stmt.root()).filter(|&id| tree.is_kind(id, kind)).count()
    }

    #[test]
    fn nested_parenthesis() {
        let stmt = grouped("select (select (x3) x2) and (y2) bar");
        let tree = stmt.tree();
        let outer = tree.find_kind(stmt.root(), GroupKind::Parenthesis).unwrap();
        assert_eq!(tree.value(outer), "(select (x3) x2)");
        let inner = tree.find_kind(outer, GroupKind::Parenthesis).unwrap();
        assert_eq!(tree.value(inner), "(x3)");
        assert_eq!(count(&stmt, GroupKind::Parenthesis), 3);
    }

    #[test]
    fn where_stops_at_clause_keywords() {
        let stmt = grouped("select * from foo where bar = 1 order by id");
        let tree = stmt.tree();
        let where_ = tree.find_kind(stmt.root(), GroupKind::Where).unwrap();
        assert_eq!(tree.value(where_), "where bar = 1 ");
        assert_eq!(tree.parent(where_), Some(stmt.root()));
        assert_eq!(
            top(&stmt)[4..],
            [
                ("Where".to_string(), "where bar = 1 ".to_string()),
                ("Keyword".to_string(), "order by".to_string()),
                ("Identifier".to_string(), "id".to_string()),
            ]
        );
    }

    #[rstest]
    #[case("select x from t where a = 1;", "where a = 1")]
    #[case("select x from (select y from t where z > 2) s", "where z > 2")]
    #[case("select x from t where a = 1 union select 2", "where a = 1 ")]
    #[case("delete from t where a = case when b then 1 end returning *", "where a = case when b then 1 end ")]
    #[case("begin delete from t where a = 1 end", "where a = 1 ")]
    fn where_boundaries(#[case] sql: &str, #[case] expected: &str) {
        let stmt = grouped(sql);
        let where_ = stmt.tree().find_kind(stmt.root(), GroupKind::Where).unwrap();
        assert_eq!(stmt.tree().value(where_), expected);
    }

    #[test]
    fn identifier_list_extends() {
        let stmt = grouped("a, b, c");
        assert_eq!(kinds(&stmt), ["IdentifierList"]);
        let list = stmt.node().child(0).unwrap();
        let items: Vec<_> = list.children().filter(|c| !c.is_whitespace()).collect();
        assert_eq!(items.len(), 5);
        assert_eq!(items.iter().filter(|c| c.is_kind(GroupKind::Identifier)).count(), 3);
        assert_eq!(items.iter().filter(|c| c.value() == ",").count(), 2);
    }

    #[rstest]
    #[case("foo(x)", &["Function"])]
    #[case("create table t (a int)", &["Keyword.DDL", "Keyword", "Identifier", "Parenthesis"])]
    #[case("create table t as select f(1)", &["Keyword.DDL", "Keyword", "Identifier", "Keyword", "Keyword.DML", "Function"])]
    #[case("select a.b, c.* from d", &["Keyword.DML", "IdentifierList", "Keyword", "Identifier"])]
    #[case("select x::int", &["Keyword.DML", "Identifier"])]
    #[case("select a + b * 2", &["Keyword.DML", "Operation"])]
    #[case("select a = b", &["Keyword.DML", "Comparison"])]
    #[case("select a like 'x%'", &["Keyword.DML", "Comparison"])]
    #[case("x := 1 + 2;", &["Assignment"])]
    #[case("select date '2020-01-01'", &["Keyword.DML", "TypedLiteral"])]
    #[case("select col[1][2]", &["Keyword.DML", "Identifier"])]
    #[case("select 1 as a", &["Keyword.DML", "Identifier"])]
    #[case("select (1) a", &["Keyword.DML", "Identifier"])]
    #[case("select a b c", &["Keyword.DML", "Identifier"])]
    #[case("select * from", &["Keyword.DML", "Wildcard", "Keyword"])]
    #[case("case when a then b end", &["Case"])]
    #[case("if x then y end if", &["If"])]
    #[case("for r in q loop x end loop", &["For"])]
    #[case("begin select 1 end", &["Begin"])]
    fn top_level_shape(#[case] sql: &str, #[case] expected: &[&str]) {
        assert_eq!(kinds(&grouped(sql)), expected);
    }

    #[test]
    fn interval_takes_its_unit() {
        let stmt = grouped("select now() - interval '1' day");
        let literal = stmt.tree().find_kind(stmt.root(), GroupKind::TypedLiteral).unwrap();
        assert_eq!(stmt.tree().value(literal), "interval '1' day");
        let op = stmt.tree().find_kind(stmt.root(), GroupKind::Operation).unwrap();
        assert_eq!(stmt.tree().value(op), "now() - interval '1' day");
    }

    #[test]
    fn wildcard_operator_is_retagged() {
        let stmt = grouped("select a * 2");
        let op = stmt.tree().find_kind(stmt.root(), GroupKind::Operation).unwrap();
        let star = stmt.tree().node(op).children().find(|c| c.value() == "*").unwrap();
        assert_eq!(star.category(), Some(Category::Operator));
    }

    #[test]
    fn ordering_joins_identifier() {
        let stmt = grouped("select a from t order by a desc, 2 asc");
        let list = stmt.tree().find_kind(stmt.root(), GroupKind::IdentifierList).unwrap();
        let items: Vec<String> = stmt.tree().node(list).get_identifiers().iter().map(NodeRef::value).collect();
        assert_eq!(items, ["a desc", "2 asc"]);
    }

    #[test]
    fn comments_group_and_align() {
        let stmt = grouped("select a -- first\n-- second\n, b /* c */ from t");
        let tree = stmt.tree();
        let comment = tree.find_kind(stmt.root(), GroupKind::Comment).unwrap();
        assert_eq!(tree.value(comment), "-- first\n-- second\n");
        let owner = tree.parent(comment).unwrap();
        assert!(tree.is_kind(owner, GroupKind::Identifier));
        assert_eq!(tree.value(owner), "a -- first\n-- second\n");
        assert_eq!(count(&stmt, GroupKind::Comment), 2);
    }

    #[test]
    fn cast_keeps_its_ordering() {
        let stmt = grouped("select x::int desc");
        assert_eq!(top(&stmt)[1], ("Identifier".to_string(), "x::int desc".to_string()));
        let node = stmt.node().find_kind(GroupKind::Identifier).unwrap();
        assert_eq!(node.get_ordering().as_deref(), Some("DESC"));
    }

    #[rstest]
    #[case("select :: from", &["Keyword.DML", "Punctuation", "Keyword"])]
    #[case("begin select 1 end as x", &["Begin", "Keyword", "Identifier"])]
    #[case("select null::int", &["Keyword.DML", "Identifier"])]
    fn keywords_and_blocks_are_not_operands(#[case] sql: &str, #[case] expected: &[&str]) {
        let mut stmt = grouped(sql);
        assert_eq!(kinds(&stmt), expected);
        let once = stmt.clone();
        group(&mut stmt).unwrap();
        assert_eq!(stmt, once);
    }

    #[test]
    fn case_inside_begin_block() {
        let stmt = grouped("begin select case when x then 1 end end");
        assert_eq!(kinds(&stmt), ["Begin"]);
        assert_eq!(count(&stmt, GroupKind::Case), 1);
    }

    #[test]
    fn unbalanced_input_is_tolerated() {
        let stmt = grouped("select ((a) from t where end end )) case");
        assert!(count(&stmt, GroupKind::Parenthesis) >= 1);
    }

    #[rstest]
    #[case("select a, b as c, f(x) y from t1 join t2 on t1.id = t2.id where x > 1 and y = 'z' order by a desc")]
    #[case("select a /* c */ b, -- d\n c from t -- e\n")]
    #[case("insert into t (a, b) values (1, 2), (3, 4)")]
    #[case("update t set a = 1, b = now() - interval '1' day where c is null")]
    #[case("select case x when 1 then 'a' else 'b' end as v, col[1][2] from t where d in (select 1)")]
    #[case("create function f() returns int as $$ begin if a then return 1; end if; end $$ language plpgsql")]
    #[case("with q as (select 1) select * from q")]
    #[case("select x::int desc")]
    #[case("select a from t order by x::int desc, y::text")]
    #[case("begin select 1 end /* done */ ")]
    #[case("if x then y end if -- tail\n")]
    #[case("select 1, 2 /* c */")]
    fn grouping_is_idempotent(#[case] sql: &str) {
        let once = grouped(sql);
        let mut twice = once.clone();
        group(&mut twice).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn nesting_limit() {
        let depth = 300;
        let sql = format!("select {}1{}", "(".repeat(depth), ")".repeat(depth));
        let tokens = tokenize(&sql, &LexerOptions::default()).unwrap().with_positions();
        let mut stmt = split_statements(tokens).next().unwrap();

        let mut deep = stmt.clone();
        assert!(matches!(group(&mut deep), Err(Error::NestingTooDeep(DEFAULT_MAX_DEPTH))));

        Grouper::new(depth + 8).group(&mut stmt).unwrap();
        assert_eq!(stmt.to_string(), sql);
        assert_eq!(count(&stmt, GroupKind::Parenthesis), depth);
    }
}
