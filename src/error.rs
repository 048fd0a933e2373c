use thiserror::Error;

/// Errors from reading a bingo record through to producing its live data.
#[derive(Debug, Error)]
pub enum BingoError {
    #[error("invalid bingo config: {0}")]
    InvalidConfig(String),

    /// The value pool cannot fill a card without repeating values.
    #[error("value pool too small: need {needed} values, have {available}")]
    InsufficientValuePool { needed: usize, available: usize },

    /// The play-data payload is malformed.
    #[error("invalid play data: {0}")]
    InvalidPlayData(String),

    /// No active bingo record matches the slug or id.
    #[error("no active bingo found for '{0}'")]
    NotFound(String),

    /// A record file is not a valid bingo record.
    #[error("invalid bingo record: {0}")]
    InvalidRecord(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("render error: {0}")]
    Render(String),
}

pub type BingoResult<T> = Result<T, BingoError>;
