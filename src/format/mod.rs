//! Formatting: re-serialise statements through a configurable filter stack.
//!
//! Modules:
//! - `options`  : `FormatOptions` and its validation.
//! - `tokens`   : token filters (keyword/identifier case, string truncation).
//! - `cleanup`  : statement filters that strip comments and whitespace.
//! - `reindent` : the reindent statement filter.
//! - `aligned`  : reindentation with clause keywords aligned on one column.
//! - `margin`   : line breaks past a right margin.
//! - `output`   : Python/PHP wrapping and the final serializer.
//!
//! Stages run in a fixed order: token filters on each split statement, then
//! grouping (only when a statement filter needs the tree), then statement
//! filters, then output wrapping, then serialization of the joined text.
//!
//! Example:
//! ```rust
//! use sqltree::*;
//!
//! let options = FormatOptions {
//!     keyword_case: Some(Case::Upper),
//!     reindent: true,
//!     ..FormatOptions::default()
//! };
//! assert_eq!(format("select a, b from t where x = 1", &options)?, "SELECT a,\n       b\nFROM t\nWHERE x = 1");
//! # Ok::<(), sqltree::Error>(())
//! ```
use crate::*;

mod aligned;
mod cleanup;
mod margin;
mod options;
mod output;
mod reindent;
mod tokens;

pub use aligned::AlignedIndent;
pub use cleanup::{SpacesAroundOperators, StripComments, StripWhitespace};
pub use margin::RightMargin;
pub use options::{Case, FormatOptions, MIN_RIGHT_MARGIN, OutputFormat};
pub use output::{OutputWrapper, serialize, split_unquoted_newlines};
pub use reindent::Reindent;
pub use tokens::{IdentifierCase, KeywordCase, TokenFilter, TruncateStrings};

/// A pass over one grouped statement; may keep state across statements.
pub trait StatementFilter {
    fn process(&mut self, statement: &mut Statement);
}

/// Validated options plus the filters they select.
///
/// Token filters are shared across runs; statement filters are stateful and
/// built fresh by every [`Formatter::format`] call.
pub struct Formatter {
    options: FormatOptions,
    token_filters: Vec<Box<dyn TokenFilter>>,
    grouper: Option<Grouper>,
}

impl std::fmt::Debug for Formatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Formatter")
            .field("options", &self.options)
            .field("token_filters", &self.token_filters.len())
            .field("grouper", &self.grouper)
            .finish()
    }
}

impl Formatter {
    pub fn new(options: FormatOptions) -> Result<Self> {
        let options = options.validate()?;
        let token_filters = tokens::token_filters(&options);
        let grouper = options.needs_grouping().then(|| Grouper::new(options.max_depth));
        debug!(
            token_filters = token_filters.len(),
            grouping = grouper.is_some(),
            output = %options.output_format,
            "built formatter"
        );
        Ok(Self {
            options,
            token_filters,
            grouper,
        })
    }

    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    fn statement_filters(&self) -> Vec<Box<dyn StatementFilter>> {
        let mut filters: Vec<Box<dyn StatementFilter>> = Vec::new();
        if self.options.use_space_around_operators {
            filters.push(Box::new(SpacesAroundOperators));
        }
        if self.options.strip_comments {
            filters.push(Box::new(StripComments));
        }
        if self.options.strip_whitespace {
            filters.push(Box::new(StripWhitespace));
        }
        if self.options.reindent {
            filters.push(Box::new(Reindent::from_options(&self.options)));
        }
        if self.options.reindent_aligned {
            filters.push(Box::new(AlignedIndent::from_options(&self.options)));
        }
        if let Some(width) = self.options.right_margin {
            filters.push(Box::new(RightMargin::new(width)));
        }
        filters
    }

    fn apply_token_filters(&self, statement: &mut Statement) {
        if self.token_filters.is_empty() {
            return;
        }
        let leaves: Vec<NodeId> = statement.tree().leaves(statement.root()).collect();
        let tree = statement.tree_mut();
        for leaf in leaves {
            let Some(token) = tree.token_mut(leaf) else { continue };
            for filter in &self.token_filters {
                filter.process(token);
            }
        }
    }

    /// Format `sql`; fails only on input nested deeper than `max_depth`.
    pub fn format(&self, sql: &str) -> Result<String> {
        let mut statement_filters = self.statement_filters();
        let mut wrapper = OutputWrapper::new(self.options.output_format);
        let mut out = String::with_capacity(sql.len());
        let mut count = 0usize;

        for mut statement in split_statements(tokenize(sql, &self.options.lexer)?.with_positions()) {
            count += 1;
            self.apply_token_filters(&mut statement);
            if let Some(grouper) = &self.grouper {
                grouper.group(&mut statement)?;
            }
            for filter in &mut statement_filters {
                filter.process(&mut statement);
            }
            match &mut wrapper {
                Some(wrapper) => out.push_str(&wrapper.wrap(&statement)),
                None => out.push_str(&statement.to_string()),
            }
        }

        let formatted = serialize(&out)?;
        debug!(statements = count, bytes_in = sql.len(), bytes_out = formatted.len(), "formatted input");
        Ok(formatted)
    }
}

/// Format `sql` with `options`; see [`Formatter`].
pub fn format(sql: &str, options: &FormatOptions) -> Result<String> {
    Formatter::new(options.clone())?.format(sql)
}
