//! Lexical layer: categories, tokens, keyword dictionaries and the lexer.
//!
//! Modules:
//! - `category` : Hierarchical token classification (`Keyword.DML` is a `Keyword`).
//! - `token`    : `Token` pairing a category with its verbatim text and position.
//! - `keyword`  : Ordered keyword dictionaries used to classify lexed words.
//! - `dialect`  : Per-dialect ordered pattern tables.
//! - `lexer`    : Lazy, lossless lexer driven by a dialect's pattern table.
//!
//! Design Principles:
//! 1. Never fail on input: unknown characters become `Error` tokens.
//! 2. Never lose input: token texts concatenate back to the source.
//! 3. Fail fast on configuration: bad dialects or keyword lists are rejected
//!    before the first token is produced.
//!
//! Example:
//! ```rust
//! use sqltree::prelude::*;
//!
//! let tokens: Vec<_> = tokenize("SELECT a FROM t", &LexerOptions::default())?.collect();
//! assert_eq!(tokens[0], (Category::KeywordDml, "SELECT"));
//! assert!(tokens.iter().any(|(c, t)| *c == Category::Name && *t == "t"));
//! # Ok::<(), sqltree::Error>(())
//! ```

pub mod category;
pub mod dialect;
pub mod keyword;
pub mod lexer;
pub mod token;

pub use category::Category;
pub use dialect::Dialect;
pub use keyword::KeywordTable;
pub use lexer::{Lexer, LexerConfig, LexerOptions, Positioned, decode, tokenize};
pub use token::{Pattern, Token};

/// Convenience prelude re‑exporting the most commonly used items.
///
/// Import with:
/// `use sqltree::prelude::*;`
pub mod prelude {
    pub use super::{Category, Dialect, LexerOptions, Token, tokenize};
}
