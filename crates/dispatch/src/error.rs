use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Session(#[from] quandary_sessions::Error),

    #[error(transparent)]
    Nlu(#[from] quandary_nlu::Error),

    #[error("invalid rule pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
