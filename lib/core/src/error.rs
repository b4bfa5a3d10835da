use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Vector dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("Unknown key: {0}")]
    UnknownKey(String),

    #[error("Similarity is undefined for a zero-norm vector")]
    UndefinedSimilarity,

    #[error("Invalid weighted set entry: {0}")]
    InvalidEntry(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
