/// Crate-wide result type for NLU operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The service could not be reached.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("NLU service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("malformed NLU response: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl Error {
    #[must_use]
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display_includes_body() {
        let err = Error::status(401, "bad token");
        assert_eq!(err.to_string(), "NLU service returned 401: bad token");
    }

    #[test]
    fn malformed_from_serde() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = source.into();
        assert!(err.to_string().starts_with("malformed NLU response"));
    }
}
