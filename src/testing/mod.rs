#![cfg(test)]
pub use rstest::*;

/// Install the test subscriber; `RUST_LOG=sqltree=trace` shows lexer and grouping traces.
pub(crate) fn common_init() {
    use std::sync::Once;
    use tracing_subscriber::EnvFilter;
    static SUBSCRIBER: Once = Once::new();
    SUBSCRIBER.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}

/// Lex, split and group `sql` with default options, asserting the text survives.
pub(crate) fn parsed(sql: &str) -> Vec<crate::Statement> {
    common_init();
    let statements = crate::parse(sql, &crate::LexerOptions::default()).unwrap();
    let joined: String = statements.iter().map(ToString::to_string).collect();
    assert_eq!(joined, sql);
    statements
}
