//! Non-validating SQL lexer, statement splitter and token-tree grouping engine.
//!
//! The pipeline is `tokenize` → `split_statements` → `group`, with `parse`
//! wiring the three together and `format` re-serialising grouped statements
//! through the formatting filters.
//!
//! ```rust
//! use sqltree::*;
//!
//! let statements = parse("select a, b from t where a = 1; select 2;", &LexerOptions::default())?;
//! assert_eq!(statements.len(), 2);
//! assert_eq!(statements[0].get_type(), "SELECT");
//! assert_eq!(statements[0].to_string(), "select a, b from t where a = 1; ");
//! # Ok::<(), sqltree::Error>(())
//! ```
reexport!(testing, test);
reexport!(config);
reexport!(engine);
reexport!(error);
reexport!(format);
reexport!(sql);
reexport!(tree);
#[allow(unused_imports)]
pub(crate) use tracing::{debug, error, info, span, trace, warn};

#[macro_export]
macro_rules! reexport {
    ($module:ident) => {
        $crate::reexport!($module, false);
    };
    ($module:ident, test) => {
        $crate::reexport!($module, true);
    };
    ($module:ident, $is_test:literal) => {
        #[cfg_attr($is_test, cfg(test))]
        mod $module;
        #[cfg_attr($is_test, cfg(test))]
        #[allow(unused_imports)]
        #[allow(ambiguous_glob_reexports)]
        pub use $module::*;
    };
}
