use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Decode error for key '{0}': {1}")]
    DecodeError(String, String),

    #[error("Storage quota exceeded for key '{0}'")]
    QuotaExceeded(String),

    #[error("{0} '{1}' not found")]
    NotFound(&'static str, String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid winner '{0}': not a participant of battle '{1}'")]
    InvalidWinner(String, String),

    #[error("Invalid stake: {0} (stake must be positive)")]
    InvalidStake(u32),

    #[error("I/O error: {0}")]
    IoError(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}
