//! Token-level filters: rewrite single leaf values, independent of structure.
use crate::*;

/// A rewrite of one token's text.
pub trait TokenFilter {
    fn process(&self, token: &mut Token);
}

/// Case conversion of every `Keyword*` token.
#[derive(Debug, Clone, Copy)]
pub struct KeywordCase(pub Case);

impl TokenFilter for KeywordCase {
    fn process(&self, token: &mut Token) {
        if token.is_keyword() {
            let value = self.0.apply(&token.value);
            token.set_value(value);
        }
    }
}

/// Case conversion of names; double-quoted identifiers keep their spelling.
#[derive(Debug, Clone, Copy)]
pub struct IdentifierCase(pub Case);

impl TokenFilter for IdentifierCase {
    fn process(&self, token: &mut Token) {
        let is_name = matches!(token.category, Category::Name | Category::StringSymbol);
        if is_name && !token.value.trim_start().starts_with('"') {
            let value = self.0.apply(&token.value);
            token.set_value(value);
        }
    }
}

/// Shortens the inner text of single-quoted strings to `width` characters.
#[derive(Debug, Clone)]
pub struct TruncateStrings {
    pub width: usize,
    pub marker: String,
}

impl TokenFilter for TruncateStrings {
    fn process(&self, token: &mut Token) {
        if token.category != Category::StringSingle {
            return;
        }
        let value = &token.value;
        let quote = if value.starts_with("''") && value.len() >= 4 { "''" } else { "'" };
        let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        else {
            return;
        };
        if inner.chars().count() > self.width {
            let kept: String = inner.chars().take(self.width).collect();
            let truncated = format!("{quote}{kept}{}{quote}", self.marker);
            token.set_value(truncated);
        }
    }
}

/// The token filters `options` ask for, in application order.
pub(crate) fn token_filters(options: &FormatOptions) -> Vec<Box<dyn TokenFilter>> {
    let mut filters: Vec<Box<dyn TokenFilter>> = Vec::new();
    if let Some(case) = options.keyword_case {
        filters.push(Box::new(KeywordCase(case)));
    }
    if let Some(case) = options.identifier_case {
        filters.push(Box::new(IdentifierCase(case)));
    }
    if let Some(width) = options.truncate_strings {
        filters.push(Box::new(TruncateStrings {
            width,
            marker: options.truncate_char.clone(),
        }));
    }
    filters
}
