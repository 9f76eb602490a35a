//! Typed error taxonomy for marketplace API calls

use std::collections::HashMap;

use thiserror::Error;

/// Error raised by any call against the marketplace API
#[derive(Error, Debug)]
pub enum ApiError {
    /// Field-level validation failure (HTTP 422-style, `errors` populated)
    ///
    /// Every field's messages stay individually inspectable; they are never
    /// collapsed into one string.
    #[error("{message}")]
    Validation {
        message: String,
        errors: HashMap<String, Vec<String>>,
    },

    /// Authorization failure (HTTP 401)
    ///
    /// When the failing request carried a bearer token, the session has
    /// already been torn down by the time this is raised.
    #[error("{0}")]
    Unauthorized(String),

    /// The caller's account has not been approved yet
    #[error("{0}")]
    AccountNotActivated(String),

    /// Any other server-reported failure (not-found, business rules)
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The request never produced a response; retryable by the caller
    #[error("connection error: {0}")]
    Connection(#[source] reqwest::Error),

    /// The response body did not match the envelope contract
    #[error("unexpected response shape: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether this is a network-level failure rather than a server verdict.
    pub fn is_connection(&self) -> bool {
        matches!(self, ApiError::Connection(_))
    }

    /// Field-level validation messages, when present.
    pub fn field_errors(&self) -> Option<&HashMap<String, Vec<String>>> {
        match self {
            ApiError::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }

    /// HTTP status associated with a server-reported error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Validation { .. } => Some(422),
            ApiError::Unauthorized(_) => Some(401),
            ApiError::AccountNotActivated(_) => Some(403),
            ApiError::Api { status, .. } => Some(*status),
            ApiError::Connection(_) | ApiError::Decode(_) => None,
        }
    }
}

/// Type alias for API call results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_stay_per_field() {
        let mut errors = HashMap::new();
        errors.insert("email".to_string(), vec!["taken".to_string()]);
        errors.insert(
            "password".to_string(),
            vec!["too short".to_string(), "no digits".to_string()],
        );

        let err = ApiError::Validation {
            message: "The given data was invalid.".to_string(),
            errors,
        };

        let fields = err.field_errors().unwrap();
        assert_eq!(fields["email"].len(), 1);
        assert_eq!(fields["password"].len(), 2);
        assert_eq!(err.status(), Some(422));
    }

    #[test]
    fn connection_errors_are_distinguishable() {
        let err = ApiError::Decode("missing data".to_string());
        assert!(!err.is_connection());
        assert_eq!(err.status(), None);
    }
}
