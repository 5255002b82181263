use std::error::Error as StdError;

/// Crate-wide result type for channel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed channel errors shared by every outbound implementation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input payload or parameter is invalid.
    #[error("invalid channel input: {message}")]
    InvalidInput { message: String },

    /// Operation is currently unavailable (not configured/ready).
    #[error("channel operation unavailable: {message}")]
    Unavailable { message: String },

    /// The platform answered with a non-success status.
    #[error("channel rejected request with {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Wrapped source error from an external dependency.
    #[error("channel operation failed: {context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn invalid_input(message: impl std::fmt::Display) -> Self {
        Self::InvalidInput {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn unavailable(message: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn rejected(status: u16, body: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn external(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_keeps_context_and_source() {
        let source = std::io::Error::other("broken pipe");
        let err = Error::external("console write", source);
        assert_eq!(
            err.to_string(),
            "channel operation failed: console write: broken pipe"
        );
        assert!(err.source().is_some());
    }
}
