//! Crate error type

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Caller supplied geometry or counts outside the accepted domain
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Settings failed validation or could not be parsed
    #[error("settings error: {0}")]
    Settings(String),
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }
}
