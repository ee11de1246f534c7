use crate::*;
use confique::Config as _;
use std::sync::OnceLock;

/// Process configuration read from `SQLTREE_*` environment variables.
#[derive(confique::Config, Debug)]
pub struct Config {
    /// Lexer pattern table, see [`Dialect`].
    #[config(env = "SQLTREE_DIALECT")]
    pub dialect: Option<String>,
    /// Extra words classified as keywords, comma separated.
    #[config(env = "SQLTREE_KEYWORDS", parse_env = confique::env::parse::list_by_comma)]
    pub additional_keywords: Option<Vec<String>>,
    /// Recursion cap for the grouping passes.
    #[config(env = "SQLTREE_MAX_DEPTH", default = 256)]
    pub max_depth: usize,
    #[config(env = "SQLTREE_KEYWORD_CASE")]
    pub keyword_case: Option<String>,
    #[config(env = "SQLTREE_IDENTIFIER_CASE")]
    pub identifier_case: Option<String>,
    #[config(env = "SQLTREE_REINDENT", default = false)]
    pub reindent: bool,
    #[config(env = "SQLTREE_REINDENT_ALIGNED", default = false)]
    pub reindent_aligned: bool,
    /// Column past which lines are broken; unset leaves lines alone.
    #[config(env = "SQLTREE_RIGHT_MARGIN")]
    pub right_margin: Option<usize>,
    #[config(env = "SQLTREE_STRIP_COMMENTS", default = false)]
    pub strip_comments: bool,
    #[config(env = "SQLTREE_INDENT_WIDTH", default = 2)]
    pub indent_width: usize,
    #[config(env = "SQLTREE_OUTPUT_FORMAT")]
    pub output_format: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Config::builder()
            .env()
            .load()
            .map_err(|e| Error::Config(e.to_string()))
    }
}

pub fn config() -> Result<&'static Config> {
    static CONFIG: OnceLock<Config> = OnceLock::new();
    if let Some(config) = CONFIG.get() {
        return Ok(config);
    }
    let loaded = Config::from_env()?;
    Ok(CONFIG.get_or_init(|| loaded))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_once() -> Result {
        let config = config()?;
        assert!(std::ptr::eq(config, super::config()?));
        Ok(())
    }

    #[test]
    fn lexer_options_follow_config() {
        let config = Config {
            dialect: Some("mysql".into()),
            additional_keywords: Some(vec!["FOOBAR".into()]),
            max_depth: 16,
            keyword_case: None,
            identifier_case: None,
            reindent: false,
            reindent_aligned: false,
            right_margin: None,
            strip_comments: false,
            indent_width: 2,
            output_format: None,
        };
        let options = LexerOptions::from(&config);
        assert_eq!(options.sql_dialect.as_deref(), Some("mysql"));
        assert_eq!(options.additional_keywords, Some(vec!["FOOBAR".to_string()]));
    }
}
