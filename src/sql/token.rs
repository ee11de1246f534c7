//! Token model: a categorised, verbatim slice of the source text.
//!
//! Tokens are created by the lexer and stored as leaves of a statement tree.
//! `value` is always the exact source text, so concatenating the values of all
//! leaves reproduces the input. Formatting filters are the only code that
//! rewrites a value after lexing (see [`Token::set_value`]).
use crate::sql::category::Category;
use itertools::Itertools;

/// A lexical token.
///
/// Invariants:
/// - `normalized` is derived from `category` and `value`; it is recomputed by
///   every constructor and by `set_value`.
/// - `position` is the byte offset in the original input, `None` for tokens
///   synthesised after lexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub category: Category,
    pub value: String,
    pub normalized: String,
    pub position: Option<usize>,
}

impl Token {
    pub fn new(category: Category, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            normalized: normalize(category, &value),
            category,
            value,
            position: None,
        }
    }

    /// Construct a token lexed at byte offset `position`.
    pub fn at(category: Category, value: impl Into<String>, position: usize) -> Self {
        Self {
            position: Some(position),
            ..Self::new(category, value)
        }
    }

    pub fn is_keyword(&self) -> bool {
        self.category.is_keyword()
    }

    pub fn is_whitespace(&self) -> bool {
        self.category.is_whitespace()
    }

    pub fn is_comment(&self) -> bool {
        self.category.is_comment()
    }

    /// Exact-category match, optionally restricted to `values`.
    ///
    /// Keyword values are compared against `normalized` ignoring case, so
    /// `matches(Keyword, &["order by"])` accepts `Order\n  By`. Other values are
    /// compared verbatim. An empty `values` slice accepts any value.
    pub fn matches(&self, category: Category, values: &[&str]) -> bool {
        if self.category != category {
            return false;
        }
        if values.is_empty() {
            return true;
        }
        if self.is_keyword() {
            values.iter().any(|v| self.normalized.eq_ignore_ascii_case(v))
        } else {
            values.iter().any(|v| self.value == *v)
        }
    }

    /// Replace the text of this token. Used by formatting filters only.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.normalized = normalize(self.category, &self.value);
    }

    /// Byte length of the value.
    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// True if `offset` (a byte offset in the original input) lies within this token.
    ///
    /// NOTE: the end is exclusive, and synthesised tokens never contain anything.
    pub fn contains(&self, offset: usize) -> bool {
        self.position
            .is_some_and(|start| offset >= start && offset < start + self.len())
    }
}

fn normalize(category: Category, value: &str) -> String {
    if category.is_keyword() {
        value.split_whitespace().join(" ").to_uppercase()
    } else {
        value.to_string()
    }
}

/// A `(category, values)` pair matched with [`Token::matches`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern {
    pub category: Category,
    pub values: &'static [&'static str],
}

impl Pattern {
    pub const fn new(category: Category, values: &'static [&'static str]) -> Self {
        Self { category, values }
    }

    pub fn matches(&self, token: &Token) -> bool {
        token.matches(self.category, self.values)
    }
}
