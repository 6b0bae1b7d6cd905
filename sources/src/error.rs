use thiserror::Error;

/// Custom error type for tokens, allow us to differentiate between errors.
///
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No token in environment variable {0}")]
    NoToken(String),
    #[error("Invalid token in {0}")]
    Invalid(String),
}

/// Everything that can go wrong while getting a sample.
///
/// Only authorization failures end the session, everything else means "no new sample this time".
///
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("client not authorized")]
    Unauthorized,
    #[error("HTTP error {0}")]
    Status(u16),
    #[error("HTTP transport: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Decoding payload: {0}")]
    Decoding(#[from] serde_json::Error),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl FetchError {
    /// Does this error end the session?
    ///
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, FetchError::Unauthorized | FetchError::Auth(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_fatal() {
        assert!(FetchError::Unauthorized.is_fatal());
        assert!(FetchError::Auth(AuthError::NoToken("X".to_string())).is_fatal());
        assert!(!FetchError::Status(502).is_fatal());
    }

    #[test]
    fn test_fetch_error_decoding_not_fatal() {
        let err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = FetchError::from(err);

        assert!(!err.is_fatal());
        assert!(err.to_string().starts_with("Decoding payload"));
    }
}
