//! Token tree: the mutable, parent-linked structure the grouping passes build.
//!
//! A [`Statement`] owns one [`Tree`]. Leaves are lexer [`Token`]s and inner
//! nodes are groups tagged with a [`GroupKind`]. Flattening any node yields
//! its leaves in source order, so `statement.to_string()` reproduces the
//! statement's text until a formatting filter rewrites it.
//!
//! ```rust
//! use sqltree::*;
//!
//! let stmt = parse("select f(x) as y", &LexerOptions::default())?.remove(0);
//! let ident = stmt.tree().find_kind(stmt.root(), GroupKind::Identifier).unwrap();
//! assert_eq!(stmt.tree().node(ident).get_alias().as_deref(), Some("y"));
//! # Ok::<(), sqltree::Error>(())
//! ```
mod arena;
mod node;
mod node_ref;
mod statement;

pub use arena::{Leaves, Tree};
pub use node::{GroupKind, NodeId};
pub use node_ref::{CaseArm, NodeRef, remove_quotes};
pub use statement::Statement;
