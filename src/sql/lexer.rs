//! Pattern-table lexer producing a lossless `(Category, &str)` stream.
//!
//! Scope / Intent:
//! - Dialect-agnostic and tolerant: unknown constructs degrade to `Error`
//!   tokens, the lexer itself never fails once configured.
//! - Lossless: the emitted slices cover the input with no gaps or overlaps, so
//!   concatenating them reproduces the input byte for byte.
//!
//! Behavior:
//! - At each position the rules of the dialect table are tried in order; the
//!   first match whose guard accepts the surrounding text wins.
//! - Word matches are classified through the keyword table, falling back to `Name`.
//! - A character matched by no rule becomes a one-character `Error` token.
//! - After a dollar-quote marker (`$$`, `$tag$`) no rule runs until the same
//!   marker appears again: the text in between is one `Literal.String` token.
//!
//! Guarantees:
//! - Every emitted slice is non-empty, so the scan always advances.
//! - Configuration problems (unknown dialect, malformed keywords, unknown
//!   encoding) are reported before the first token is produced.
//!
//! Complexity:
//! - O(n · r) where `r` is the number of rules; all patterns are anchored.
use crate::sql::dialect::Dialect;
use crate::sql::keyword::KeywordTable;
use crate::*;
use regex::Regex;
use std::borrow::Cow;

/// What a matching rule emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Emit(Category),
    /// Look the matched word up in the keyword table.
    Keyword,
}

/// Text surrounding a candidate match, handed to rule guards.
#[derive(Debug, Clone, Copy)]
pub struct Context<'s> {
    pub before: &'s str,
    pub matched: &'s str,
    pub after: &'s str,
}

/// Stands in for look-behind / look-ahead: the rule only applies when the guard accepts.
pub type Guard = fn(&Context<'_>) -> bool;

/// One compiled entry of a pattern table.
#[derive(Debug)]
pub struct Rule {
    regex: Regex,
    action: Action,
    guard: Option<Guard>,
}

impl Rule {
    pub fn compile(pattern: &str, action: Action, guard: Option<Guard>) -> Result<Self> {
        let regex = Regex::new(&format!("(?i)^(?:{pattern})"))?;
        Ok(Self {
            regex,
            action,
            guard,
        })
    }

    /// Length of the match at the start of `rest`, if this rule applies there.
    fn match_len(&self, before: &str, rest: &str) -> Option<usize> {
        let matched = self.regex.find(rest)?.as_str();
        if matched.is_empty() {
            return None;
        }
        let ctx = Context {
            before,
            matched,
            after: &rest[matched.len()..],
        };
        match self.guard {
            Some(guard) if !guard(&ctx) => None,
            _ => Some(matched.len()),
        }
    }
}

/// Caller-facing lexer options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LexerOptions {
    /// Dialect name, see [`Dialect`]'s `FromStr`; `None` selects the generic table.
    pub sql_dialect: Option<String>,
    /// Words to classify as `Keyword` on top of the dialect's dictionaries.
    pub additional_keywords: Option<Vec<String>>,
}

impl From<&Config> for LexerOptions {
    fn from(config: &Config) -> Self {
        Self {
            sql_dialect: config.dialect.clone(),
            additional_keywords: config.additional_keywords.clone(),
        }
    }
}

/// Validated lexer configuration: a compiled rule table and keyword table.
///
/// Cheap to clone unless additional keywords forced an owned keyword table.
#[derive(Debug, Clone)]
pub struct LexerConfig {
    dialect: Dialect,
    rules: &'static [Rule],
    keywords: Cow<'static, KeywordTable>,
}

impl LexerConfig {
    pub fn new(options: &LexerOptions) -> Result<Self> {
        let dialect = match &options.sql_dialect {
            Some(name) => name.parse()?,
            None => Dialect::default(),
        };
        let keywords = match &options.additional_keywords {
            Some(words) => Cow::Owned(dialect.keywords().with_additional(words)?),
            None => Cow::Borrowed(dialect.keywords()),
        };
        Ok(Self {
            dialect,
            rules: dialect.rules()?,
            keywords,
        })
    }

    /// Configuration with a caller-supplied keyword table.
    pub fn with_keywords(dialect: Dialect, keywords: KeywordTable) -> Result<Self> {
        Ok(Self {
            dialect,
            rules: dialect.rules()?,
            keywords: Cow::Owned(keywords),
        })
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn keywords(&self) -> &KeywordTable {
        &self.keywords
    }
}

/// Lazy token stream over a borrowed input.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    text: &'a str,
    pos: usize,
    config: LexerConfig,
    /// Open dollar-quote marker, waiting for its closing twin.
    dollar_tag: Option<&'a str>,
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str, config: LexerConfig) -> Self {
        Self {
            text,
            pos: 0,
            config,
            dollar_tag: None,
        }
    }

    /// Yield `(category, text, byte_offset)` triples instead of pairs.
    pub fn with_positions(self) -> Positioned<'a> {
        Positioned(self)
    }

    fn next_token(&mut self) -> Option<(Category, &'a str, usize)> {
        let start = self.pos;
        let rest = self.text.get(start..).filter(|r| !r.is_empty())?;
        let before = &self.text[..start];

        if let Some(tag) = self.dollar_tag {
            let body = rest.find(tag).unwrap_or(rest.len());
            let (category, len) = if body == 0 {
                self.dollar_tag = None;
                (Category::NameBuiltin, tag.len())
            } else {
                (Category::String, body)
            };
            self.pos = start + len;
            return Some((category, &rest[..len], start));
        }

        let hit = self.config.rules.iter().find_map(|rule| {
            rule.match_len(before, rest).map(|len| (rule.action, len))
        });
        let (category, len) = match hit {
            Some((Action::Emit(category), len)) => (category, len),
            Some((Action::Keyword, len)) => (self.config.keywords.classify(&rest[..len]), len),
            None => {
                let len = rest.chars().next().map_or(1, char::len_utf8);
                trace!(position = start, text = &rest[..len], "unrecognised character");
                (Category::Error, len)
            }
        };

        let text = &rest[..len];
        if category == Category::NameBuiltin && is_dollar_marker(text) {
            self.dollar_tag = Some(text);
        }
        self.pos = start + len;
        Some((category, text, start))
    }
}

fn is_dollar_marker(value: &str) -> bool {
    value.len() >= 2 && value.starts_with('$') && value.ends_with('$')
}

impl<'a> Iterator for Lexer<'a> {
    type Item = (Category, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().map(|(category, text, _)| (category, text))
    }
}

/// See [`Lexer::with_positions`].
#[derive(Debug, Clone)]
pub struct Positioned<'a>(Lexer<'a>);

impl<'a> Iterator for Positioned<'a> {
    type Item = (Category, &'a str, usize);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next_token()
    }
}

/// Tokenize `text`; fails only if `options` are invalid.
pub fn tokenize<'a>(text: &'a str, options: &LexerOptions) -> Result<Lexer<'a>> {
    Ok(Lexer::new(text, LexerConfig::new(options)?))
}

/// Decode raw input bytes before tokenizing.
///
/// `None` and `utf-8` decode UTF-8, falling back to Latin-1 when the bytes are
/// not valid UTF-8 so that arbitrary input still tokenizes; `latin-1` decodes
/// one char per byte.
pub fn decode<'b>(bytes: &'b [u8], encoding: Option<&str>) -> Result<Cow<'b, str>> {
    let name = encoding.map(|e| e.trim().to_ascii_lowercase());
    match name.as_deref() {
        None | Some("utf-8" | "utf8") => Ok(match std::str::from_utf8(bytes) {
            Ok(text) => Cow::Borrowed(text),
            Err(_) => {
                debug!("input is not valid UTF-8, decoding as Latin-1");
                Cow::Owned(latin1(bytes))
            }
        }),
        Some("latin-1" | "latin1" | "iso-8859-1") => Ok(Cow::Owned(latin1(bytes))),
        Some(_) => Err(Error::UnknownEncoding(encoding.unwrap_or_default().to_string())),
    }
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}
