//! Statement engine: split a token stream into statements and group them.
//!
//! Modules:
//! - `splitter` : `StatementSplitter`, a lazy iterator of flat statements.
//! - `grouping` : `Grouper`, the ordered list of tree-building passes.
//!
//! The free functions here wire the lexer, splitter and grouper together for
//! the common case of a whole SQL string in memory.
//!
//! Example:
//! ```rust
//! use sqltree::*;
//!
//! let parts = split("select 1; select 2;\n\n", &LexerOptions::default())?;
//! assert_eq!(parts, ["select 1;", "select 2;"]);
//! # Ok::<(), sqltree::Error>(())
//! ```
use crate::*;

mod grouping;
mod splitter;

pub use grouping::{DEFAULT_MAX_DEPTH, Grouper, group};
pub use splitter::{StatementSplitter, split_statements};

/// Tokenize, split and group `sql`.
pub fn parse(sql: &str, options: &LexerOptions) -> Result<Vec<Statement>> {
    parse_with(sql, options, &Grouper::default())
}

/// [`parse`] with an explicit grouper, e.g. one built from [`Config`].
pub fn parse_with(sql: &str, options: &LexerOptions, grouper: &Grouper) -> Result<Vec<Statement>> {
    let statements = split_statements(tokenize(sql, options)?.with_positions())
        .map(|mut statement| grouper.group(&mut statement).map(|()| statement))
        .collect::<Result<Vec<_>>>()?;
    debug!(statements = statements.len(), bytes = sql.len(), "parsed input");
    Ok(statements)
}

/// Lazy [`parse`]: statements are grouped as they are pulled.
///
/// Option errors surface up front; grouping errors surface per statement.
pub fn parse_stream<'s>(
    sql: &'s str,
    options: &LexerOptions,
) -> Result<impl Iterator<Item = Result<Statement>> + use<'s>> {
    let grouper = Grouper::default();
    Ok(split_statements(tokenize(sql, options)?.with_positions())
        .map(move |mut statement| grouper.group(&mut statement).map(|()| statement)))
}

/// Statement texts of `sql`, trimmed, with blank statements dropped.
///
/// Splitting does not need the grouping passes, so this never fails on input.
pub fn split(sql: &str, options: &LexerOptions) -> Result<Vec<String>> {
    Ok(split_statements(tokenize(sql, options)?.with_positions())
        .map(|statement| statement.to_string().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn split_simple() -> Result {
        common_init();
        let parts = split("select * from foo; select * from bar;", &LexerOptions::default())?;
        assert_eq!(parts, ["select * from foo;", "select * from bar;"]);
        Ok(())
    }

    #[rstest]
    #[case("", &[])]
    #[case("  \n ", &[])]
    #[case("select 1", &["select 1"])]
    #[case(";;", &[";", ";"])]
    #[case("select 1; -- trailing\n", &["select 1; -- trailing"])]
    #[case(
        "create function f() returns int as $$ select 1; $$ language sql; select 2",
        &["create function f() returns int as $$ select 1; $$ language sql;", "select 2"]
    )]
    fn split_texts(#[case] sql: &str, #[case] expected: &[&str]) -> Result {
        common_init();
        assert_eq!(split(sql, &LexerOptions::default())?, expected);
        Ok(())
    }

    #[test]
    fn parse_groups_every_statement() {
        let statements = parsed("select a from t where a = 1; update t set a = 2");
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].get_type(), "SELECT");
        assert_eq!(statements[1].get_type(), "UPDATE");
        let where_ = statements[0].tree().find_kind(statements[0].root(), GroupKind::Where);
        assert!(where_.is_some());
    }

    #[test]
    fn parse_stream_is_lazy_and_equivalent() -> Result {
        common_init();
        let sql = "select 1; select (2); select 3";
        let streamed: Vec<Statement> = parse_stream(sql, &LexerOptions::default())?.collect::<Result<_>>()?;
        assert_eq!(streamed, parse(sql, &LexerOptions::default())?);

        let mut stream = parse_stream(sql, &LexerOptions::default())?;
        assert_eq!(stream.next().transpose()?.map(|s| s.to_string()), Some("select 1; ".to_string()));
        Ok(())
    }

    #[test]
    fn bad_options_fail_before_input() {
        let options = LexerOptions {
            sql_dialect: Some("cobol".into()),
            additional_keywords: None,
        };
        assert!(matches!(parse("select 1", &options), Err(Error::UnknownDialect(_))));
        assert!(matches!(split("select 1", &options), Err(Error::UnknownDialect(_))));
        assert!(parse_stream("select 1", &options).is_err());
    }

    #[test]
    fn parse_with_respects_depth() {
        let sql = format!("select {}1{}", "(".repeat(40), ")".repeat(40));
        let shallow = Grouper::new(16);
        assert!(matches!(
            parse_with(&sql, &LexerOptions::default(), &shallow),
            Err(Error::NestingTooDeep(16))
        ));
        assert!(parse_with(&sql, &LexerOptions::default(), &Grouper::default()).is_ok());
    }

    proptest! {
        #[test]
        fn parse_round_trip(
            parts in proptest::collection::vec(
                prop_oneof![
                    Just("select "), Just("a"), Just(", "), Just("b.c"), Just(" as x"), Just("("),
                    Just(")"), Just("["), Just("]"), Just(" where "), Just(" = "), Just("1"),
                    Just("'s'"), Just(";"), Just(" case when "), Just(" then "), Just(" end"),
                    Just(" begin "), Just("--c\n"), Just("/* d */"), Just("$$"), Just("::int"),
                    Just(" order by "), Just(" desc"), Just(" + "), Just("*"),
                ],
                0..40,
            ),
        ) {
            let sql = parts.concat();
            let statements = parse(&sql, &LexerOptions::default()).unwrap();
            let joined: String = statements.iter().map(ToString::to_string).collect();
            prop_assert_eq!(joined, sql);
        }
    }
}
