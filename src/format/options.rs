use crate::*;
use derive_more::Display;
use std::str::FromStr;

/// Narrowest accepted `right_margin`.
pub const MIN_RIGHT_MARGIN: usize = 10;

/// Case conversion applied by the keyword and identifier filters.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    #[display("upper")]
    Upper,
    #[display("lower")]
    Lower,
    /// First character upper-cased, the rest lower-cased.
    #[display("capitalize")]
    Capitalize,
}

impl Case {
    pub fn apply(self, value: &str) -> String {
        match self {
            Case::Upper => value.to_uppercase(),
            Case::Lower => value.to_lowercase(),
            Case::Capitalize => {
                let mut chars = value.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                    None => String::new(),
                }
            }
        }
    }
}

impl FromStr for Case {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upper" => Ok(Case::Upper),
            "lower" => Ok(Case::Lower),
            "capitalize" => Ok(Case::Capitalize),
            _ => Err(Error::Config(format!(
                "invalid case {s:?}, expected upper, lower or capitalize"
            ))),
        }
    }
}

/// Language the formatted SQL is emitted in.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    #[display("sql")]
    Sql,
    /// `sql = '...'` assignments.
    #[display("python")]
    Python,
    /// `$sql = "...";` assignments.
    #[display("php")]
    Php,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sql" => Ok(OutputFormat::Sql),
            "python" => Ok(OutputFormat::Python),
            "php" => Ok(OutputFormat::Php),
            _ => Err(Error::Config(format!("unknown output format {s:?}"))),
        }
    }
}

/// Everything [`format`] can be asked to do.
///
/// Build one with struct update syntax over `FormatOptions::default()`, or
/// from the process [`Config`] with `FormatOptions::try_from`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    pub lexer: LexerOptions,
    pub keyword_case: Option<Case>,
    pub identifier_case: Option<Case>,
    pub strip_comments: bool,
    /// Implied by `reindent`.
    pub strip_whitespace: bool,
    pub reindent: bool,
    /// Reindent with clause keywords right-aligned to `SELECT`; excludes `reindent`.
    pub reindent_aligned: bool,
    pub indent_tabs: bool,
    pub indent_width: usize,
    /// Identifier lists break once a line passes this column; 0 puts every item on its own line.
    pub wrap_after: usize,
    pub use_space_around_operators: bool,
    /// Longest kept inner text of a single-quoted string.
    pub truncate_strings: Option<usize>,
    pub truncate_char: String,
    /// Break lines that would pass this column; at least 10.
    pub right_margin: Option<usize>,
    pub output_format: OutputFormat,
    /// Recursion cap for grouping.
    pub max_depth: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            lexer: LexerOptions::default(),
            keyword_case: None,
            identifier_case: None,
            strip_comments: false,
            strip_whitespace: false,
            reindent: false,
            reindent_aligned: false,
            indent_tabs: false,
            indent_width: 2,
            wrap_after: 0,
            use_space_around_operators: false,
            truncate_strings: None,
            truncate_char: "[...]".to_string(),
            right_margin: None,
            output_format: OutputFormat::Sql,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl FormatOptions {
    /// Check value ranges and resolve implied options.
    pub fn validate(mut self) -> Result<Self> {
        if self.indent_width < 1 {
            return Err(Error::Config("indent_width requires a positive integer".into()));
        }
        if self.truncate_strings == Some(0) {
            return Err(Error::Config("truncate_strings requires a positive integer".into()));
        }
        if self.right_margin.is_some_and(|width| width < MIN_RIGHT_MARGIN) {
            return Err(Error::Config(format!(
                "right_margin requires an integer of at least {MIN_RIGHT_MARGIN}"
            )));
        }
        if self.reindent && self.reindent_aligned {
            return Err(Error::Config("reindent and reindent_aligned are mutually exclusive".into()));
        }
        if self.max_depth < 1 {
            return Err(Error::Config("max_depth requires a positive integer".into()));
        }
        // Fail on a bad dialect or keyword list before any input is read.
        LexerConfig::new(&self.lexer)?;
        if self.reindent || self.reindent_aligned {
            self.strip_whitespace = true;
        }
        Ok(self)
    }

    /// Character used for one indentation step.
    pub fn indent_char(&self) -> char {
        if self.indent_tabs { '\t' } else { ' ' }
    }

    /// True if any filter needs the grouped tree.
    pub fn needs_grouping(&self) -> bool {
        self.strip_comments
            || self.strip_whitespace
            || self.reindent
            || self.reindent_aligned
            || self.use_space_around_operators
            || self.right_margin.is_some()
    }
}

impl TryFrom<&Config> for FormatOptions {
    type Error = Error;

    fn try_from(config: &Config) -> Result<Self> {
        let parse_case = |value: &Option<String>| value.as_deref().map(str::parse::<Case>).transpose();
        Self {
            lexer: LexerOptions::from(config),
            keyword_case: parse_case(&config.keyword_case)?,
            identifier_case: parse_case(&config.identifier_case)?,
            strip_comments: config.strip_comments,
            reindent: config.reindent,
            reindent_aligned: config.reindent_aligned,
            right_margin: config.right_margin,
            indent_width: config.indent_width,
            output_format: config
                .output_format
                .as_deref()
                .map(str::parse::<OutputFormat>)
                .transpose()?
                .unwrap_or_default(),
            max_depth: config.max_depth,
            ..Self::default()
        }
        .validate()
    }
}
