#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown SQL dialect: {0}")]
    UnknownDialect(String),

    #[error("Invalid keyword {0:?}: keywords must be a single word")]
    InvalidKeyword(String),

    #[error("Unsupported encoding: {0}")]
    UnknownEncoding(String),

    #[error("Invalid token pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Token tree nested deeper than {0} levels")]
    NestingTooDeep(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for every error raised while validating options, before any input is processed.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::Config(_)
                | Error::UnknownDialect(_)
                | Error::InvalidKeyword(_)
                | Error::UnknownEncoding(_)
        )
    }
}

pub type Result<T = ()> = std::result::Result<T, Error>;
