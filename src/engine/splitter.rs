//! Statement splitting over a positioned token stream.
//!
//! A `;` ends a statement only at split level zero. The level rises inside
//! procedural bodies (`CREATE ... BEGIN ... END`, `DECLARE` sections,
//! `IF`/`FOR`/`WHILE` blocks of a created routine) and inside dollar-quoted
//! bodies, so semicolons there stay part of the statement.
//!
//! Guarantees:
//! - Every input token lands in exactly one statement, in order.
//! - Unbalanced input never fails: the BEGIN depth is floored at zero and the
//!   level only decides where `;` splits.
use crate::*;
use std::iter::Peekable;

/// Block-tracking state, reset for every statement.
#[derive(Debug, Default)]
struct SplitState {
    in_declare: bool,
    dollar_tag: Option<String>,
    is_create: bool,
    begin_depth: usize,
}

impl SplitState {
    /// Split-level contribution of `token`, updating the block state.
    fn level_change(&mut self, token: &Token) -> isize {
        if token.category == Category::NameBuiltin && is_dollar_marker(&token.value) {
            return match &self.dollar_tag {
                None => {
                    self.dollar_tag = Some(token.value.clone());
                    1
                }
                Some(tag) if *tag == token.value => {
                    self.dollar_tag = None;
                    -1
                }
                Some(_) => 0,
            };
        }
        if self.dollar_tag.is_some() || !token.is_keyword() {
            return 0;
        }
        match token.normalized.as_str() {
            "DECLARE" if self.is_create && self.begin_depth == 0 => {
                self.in_declare = true;
                1
            }
            "BEGIN" => {
                self.begin_depth += 1;
                isize::from(self.in_declare || self.is_create)
            }
            "END IF" | "END FOR" | "END WHILE" => -1,
            "END" => {
                self.begin_depth = self.begin_depth.saturating_sub(1);
                -1
            }
            word if token.category == Category::KeywordDdl && word.starts_with("CREATE") => {
                self.is_create = true;
                0
            }
            "IF" | "FOR" | "WHILE" if self.is_create && self.begin_depth > 0 => 1,
            _ => 0,
        }
    }
}

fn is_dollar_marker(value: &str) -> bool {
    value.len() >= 2 && value.starts_with('$') && value.ends_with('$')
}

/// Iterator of flat statements, see [`split_statements`].
pub struct StatementSplitter<I: Iterator> {
    tokens: Peekable<I>,
    yielded: usize,
}

impl<I: Iterator> std::fmt::Debug for StatementSplitter<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatementSplitter")
            .field("yielded", &self.yielded)
            .finish_non_exhaustive()
    }
}

/// Partition a positioned token stream into flat statements.
///
/// A statement keeps the whitespace and single-line comments following its
/// terminating `;`, so `-- note` after a statement belongs to it.
pub fn split_statements<'s, I>(tokens: I) -> StatementSplitter<I::IntoIter>
where
    I: IntoIterator<Item = (Category, &'s str, usize)>,
{
    StatementSplitter {
        tokens: tokens.into_iter().peekable(),
        yielded: 0,
    }
}

impl<'s, I> Iterator for StatementSplitter<I>
where
    I: Iterator<Item = (Category, &'s str, usize)>,
{
    type Item = Statement;

    fn next(&mut self) -> Option<Statement> {
        let mut state = SplitState::default();
        let mut level = 0isize;
        let mut tokens = Vec::new();

        while let Some((category, value, position)) = self.tokens.next() {
            let token = Token::at(category, value, position);
            level += state.level_change(&token);
            let terminated = level <= 0 && token.matches(Category::Punctuation, &[";"]);
            tokens.push(token);
            if terminated {
                while let Some((category, value, position)) = self
                    .tokens
                    .next_if(|(c, _, _)| matches!(c, Category::Whitespace | Category::CommentSingle))
                {
                    tokens.push(Token::at(category, value, position));
                }
                break;
            }
        }

        if tokens.is_empty() {
            return None;
        }
        self.yielded += 1;
        debug!(
            index = self.yielded - 1,
            tokens = tokens.len(),
            unterminated = level > 0,
            "split statement"
        );
        Some(Statement::new(tokens))
    }
}
