//! Ordered token-pattern tables, one per SQL dialect.
//!
//! Each table is a list of `(pattern, action, guard)` entries tried in order
//! at the current scan position; the first entry that matches (and whose guard
//! accepts the surrounding text) wins. Ordering encodes precedence: hint
//! comments before comments, multi-word keywords before the single-word rule,
//! context-dependent names before plain words.
//!
//! Patterns are compiled case-insensitively and anchored at the scan position.
//! The `regex` crate has no look-around, so every look-behind or look-ahead
//! condition lives in a guard function instead.
use crate::sql::keyword::{KeywordTable, is_word_char};
use crate::sql::lexer::{Action, Context, Guard, Rule};
use crate::*;
use std::str::FromStr;
use std::sync::OnceLock;

use Category::{
    Assignment, Command, CommentMultiline, CommentMultilineHint, CommentSingle, CommentSingleHint,
    Comparison, Keyword, KeywordDdl, KeywordTzCast, Name, NameBuiltin, NamePlaceholder,
    NumberFloat, NumberHexadecimal, NumberInteger, Operator, Punctuation, StringSingle,
    StringSymbol, Whitespace, Wildcard,
};

/// SQL dialect selecting the pattern table and the keyword dictionaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, derive_more::Display)]
pub enum Dialect {
    #[default]
    #[display("generic")]
    Generic,
    #[display("postgresql")]
    PostgreSql,
    #[display("mysql")]
    MySql,
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "generic" | "ansi" | "" => Ok(Dialect::Generic),
            "postgresql" | "postgres" => Ok(Dialect::PostgreSql),
            "mysql" => Ok(Dialect::MySql),
            _ => Err(Error::UnknownDialect(name.to_string())),
        }
    }
}

impl Dialect {
    pub fn keywords(self) -> &'static KeywordTable {
        match self {
            Dialect::Generic => KeywordTable::generic(),
            Dialect::PostgreSql => KeywordTable::postgres(),
            Dialect::MySql => KeywordTable::mysql(),
        }
    }

    /// Compiled rule table, built on first use and shared afterwards.
    pub fn rules(self) -> Result<&'static [Rule]> {
        static GENERIC: OnceLock<Vec<Rule>> = OnceLock::new();
        static POSTGRES: OnceLock<Vec<Rule>> = OnceLock::new();
        static MYSQL: OnceLock<Vec<Rule>> = OnceLock::new();
        let cell = match self {
            Dialect::Generic => &GENERIC,
            Dialect::PostgreSql => &POSTGRES,
            Dialect::MySql => &MYSQL,
        };
        if let Some(rules) = cell.get() {
            return Ok(rules);
        }
        let rules = self
            .rule_defs()
            .into_iter()
            .map(|def| Rule::compile(def.pattern, def.action, def.guard))
            .collect::<Result<Vec<_>>>()?;
        debug!(dialect = %self, rules = rules.len(), "compiled token patterns");
        Ok(cell.get_or_init(|| rules))
    }

    fn rule_defs(self) -> Vec<RuleDef> {
        let segments: &[&[RuleDef]] = match self {
            Dialect::Generic => &[
                GENERIC_COMMENTS,
                BASIC,
                QUOTED_NAMES,
                DOLLAR_QUOTE,
                PLACEHOLDERS,
                SPECIAL_NAMES,
                WORDS,
            ],
            Dialect::PostgreSql => &[POSTGRES_COMMENTS, BASIC, DOLLAR_QUOTE, PLACEHOLDERS, WORDS],
            Dialect::MySql => &[
                MYSQL_COMMENTS,
                BASIC,
                QUOTED_NAMES,
                PLACEHOLDERS,
                SPECIAL_NAMES,
                WORDS,
            ],
        };
        segments.iter().flat_map(|s| s.iter().copied()).collect()
    }
}

#[derive(Debug, Clone, Copy)]
struct RuleDef {
    pattern: &'static str,
    action: Action,
    guard: Option<Guard>,
}

const fn emit(pattern: &'static str, category: Category) -> RuleDef {
    RuleDef {
        pattern,
        action: Action::Emit(category),
        guard: None,
    }
}

const fn guarded(pattern: &'static str, category: Category, guard: Guard) -> RuleDef {
    RuleDef {
        pattern,
        action: Action::Emit(category),
        guard: Some(guard),
    }
}

const GENERIC_COMMENTS: &[RuleDef] = &[
    emit(r"(?:--|# )\+.*?(?:\r\n|\r|\n|$)", CommentSingleHint),
    emit(r"/\*\+[\s\S]*?\*/", CommentMultilineHint),
    emit(r"(?:--|# ).*?(?:\r\n|\r|\n|$)", CommentSingle),
    emit(r"/\*[\s\S]*?\*/", CommentMultiline),
];

const POSTGRES_COMMENTS: &[RuleDef] = &[
    emit(r"--\+.*?(?:\r\n|\r|\n|$)", CommentSingleHint),
    emit(r"/\*\+[\s\S]*?\*/", CommentMultilineHint),
    emit(r"--.*?(?:\r\n|\r|\n|$)", CommentSingle),
    emit(r"/\*[\s\S]*?\*/", CommentMultiline),
];

const MYSQL_COMMENTS: &[RuleDef] = &[
    emit(r"(?:--|#)\+.*?(?:\r\n|\r|\n|$)", CommentSingleHint),
    emit(r"/\*\+[\s\S]*?\*/", CommentMultilineHint),
    emit(r"(?:--|#).*?(?:\r\n|\r|\n|$)", CommentSingle),
    emit(r"/\*[\s\S]*?\*/", CommentMultiline),
];

const BASIC: &[RuleDef] = &[
    emit(r"\s+", Whitespace),
    emit(r":=", Assignment),
    emit(r"::", Punctuation),
    emit(r"\*", Wildcard),
];

const QUOTED_NAMES: &[RuleDef] = &[emit(r"`(?:``|[^`])*`", Name), emit(r"´(?:´´|[^´])*´", Name)];

const DOLLAR_QUOTE: &[RuleDef] = &[guarded(r"\$(?:[_A-ZÀ-Ü]\w*)?\$", NameBuiltin, not_after_word)];

const PLACEHOLDERS: &[RuleDef] = &[
    emit(r"\?", NamePlaceholder),
    emit(r"%(?:\(\w+\))?s", NamePlaceholder),
    guarded(r"[$:?]\w+", NamePlaceholder, not_after_word),
    emit(r"\\\w+", Command),
    // may be followed by a parenthesis but are never function names
    emit(r"(?:CASE|IN|VALUES|USING|FROM|AS)\b", Keyword),
];

const SPECIAL_NAMES: &[RuleDef] = &[emit(r"(?:@|##|#)[A-ZÀ-Ü]\w+", Name)];

const WORDS: &[RuleDef] = &[
    guarded(r"[A-ZÀ-Ü]\w*", Name, followed_by_period),
    guarded(r"[A-ZÀ-Ü]\w*", Name, after_period),
    guarded(r"[A-ZÀ-Ü]\w*", Name, followed_by_paren),
    guarded(r"-?0x[\dA-F]+", NumberHexadecimal, number_boundary),
    guarded(r"-?\d+(?:\.\d+)?E-?\d+", NumberFloat, number_boundary),
    guarded(r"-?(?:\d+\.\d*|\.\d+)", NumberFloat, number_boundary),
    guarded(r"-?\d+", NumberInteger, number_boundary),
    emit(r"'(?:''|\\\\|\\'|[^'])*'", StringSingle),
    emit(r#""(?:""|\\\\|\\"|[^"])*""#, StringSymbol),
    guarded(r"\[[^\]\[]+\]", Name, bracket_name),
    emit(
        r"(?:(?:LEFT\s+|RIGHT\s+|FULL\s+)?(?:INNER\s+|OUTER\s+|STRAIGHT\s+)?|(?:CROSS\s+|NATURAL\s+)?)?JOIN\b",
        Keyword,
    ),
    emit(r"END(?:\s+IF|\s+LOOP|\s+WHILE|\s+FOR)?\b", Keyword),
    emit(r"NOT\s+NULL\b", Keyword),
    emit(r"NULLS\s+(?:FIRST|LAST)\b", Keyword),
    emit(r"UNION\s+ALL\b", Keyword),
    emit(r"CREATE(?:\s+OR\s+REPLACE)?\b", KeywordDdl),
    emit(r"DOUBLE\s+PRECISION\b", NameBuiltin),
    emit(r"GROUP\s+BY\b", Keyword),
    emit(r"ORDER\s+BY\b", Keyword),
    emit(r"HANDLER\s+FOR\b", Keyword),
    emit(
        r"LATERAL\s+VIEW\s+(?:EXPLODE|INLINE|PARSE_URL_TUPLE|POSEXPLODE|STACK)\b",
        Keyword,
    ),
    emit(r"AT\s+TIME\s+ZONE\s+'[^']+'", KeywordTzCast),
    emit(r"(?:NOT\s+)?(?:LIKE|ILIKE|RLIKE|REGEXP)\b", Comparison),
    RuleDef {
        pattern: r"\w[$#\w]*",
        action: Action::Keyword,
        guard: None,
    },
    emit(r"[;:()\[\],.]", Punctuation),
    emit(r"[<>=~!]+", Comparison),
    emit(r"[+/@#%^&|-]+", Operator),
];

fn previous_char(ctx: &Context<'_>) -> Option<char> {
    ctx.before.chars().next_back()
}

fn not_after_word(ctx: &Context<'_>) -> bool {
    !previous_char(ctx).is_some_and(is_word_char)
}

fn followed_by_period(ctx: &Context<'_>) -> bool {
    ctx.after.trim_start().starts_with('.')
}

fn after_period(ctx: &Context<'_>) -> bool {
    previous_char(ctx) == Some('.')
}

fn followed_by_paren(ctx: &Context<'_>) -> bool {
    ctx.after.starts_with('(')
}

/// Numbers may not run into a word, and a leading `-` is only a sign where no
/// operand precedes it (`a-1` is a subtraction, `(-1` a negative literal).
fn number_boundary(ctx: &Context<'_>) -> bool {
    let runs_into_word = ctx
        .after
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_');
    let binary_minus = ctx.matched.starts_with('-')
        && previous_char(ctx).is_some_and(|c| is_word_char(c) || c == ')' || c == ']');
    !runs_into_word && !binary_minus
}

/// `[name]` quoting, unless the bracket indexes something (`a[1]`, `f()[1]`).
fn bracket_name(ctx: &Context<'_>) -> bool {
    !previous_char(ctx).is_some_and(|c| is_word_char(c) || c == ']' || c == ')')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("generic", Dialect::Generic)]
    #[case("ANSI", Dialect::Generic)]
    #[case("postgres", Dialect::PostgreSql)]
    #[case("PostgreSQL", Dialect::PostgreSql)]
    #[case("mysql", Dialect::MySql)]
    fn dialect_names(#[case] name: &str, #[case] expected: Dialect) -> Result {
        assert_eq!(name.parse::<Dialect>()?, expected);
        Ok(())
    }

    #[test]
    fn unknown_dialect() {
        let err = "oracle9".parse::<Dialect>().unwrap_err();
        assert!(matches!(err, Error::UnknownDialect(ref n) if n == "oracle9"));
        assert!(err.is_configuration());
    }

    #[rstest]
    #[case(Dialect::Generic)]
    #[case(Dialect::PostgreSql)]
    #[case(Dialect::MySql)]
    fn every_table_compiles(#[case] dialect: Dialect) -> Result {
        let rules = dialect.rules()?;
        assert!(!rules.is_empty());
        // cached
        assert!(std::ptr::eq(rules, dialect.rules()?));
        Ok(())
    }
}
