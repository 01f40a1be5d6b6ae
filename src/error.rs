use hyper::StatusCode;
use thiserror::Error;

/// Failure of the address analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyzeError {
    #[error("Invalid IP address")]
    InvalidAddress(String),

    /// Prefix wider than the address family. Class-derived prefixes never are.
    #[error("Invalid prefix length /{0}")]
    InvalidPrefix(u8),
}

/// Errors surfaced by the HTTP layer. `Display` is the plain-text body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("IP address is required")]
    MissingAddress,

    #[error(transparent)]
    InvalidAddress(#[from] AnalyzeError),

    #[error("Method not allowed")]
    UnsupportedMethod(String),

    #[error("Not Found")]
    NotFound(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingAddress | ApiError::InvalidAddress(_) => StatusCode::BAD_REQUEST,
            ApiError::UnsupportedMethod(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Short label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::MissingAddress => "missing_address",
            ApiError::InvalidAddress(_) => "invalid_address",
            ApiError::UnsupportedMethod(_) => "unsupported_method",
            ApiError::NotFound(_) => "not_found",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::MissingAddress.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(AnalyzeError::InvalidAddress("x".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::UnsupportedMethod("POST".into()).status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(ApiError::NotFound("/".into()).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_bodies_match_wire_messages() {
        assert_eq!(ApiError::MissingAddress.to_string(), "IP address is required");
        assert_eq!(
            ApiError::from(AnalyzeError::InvalidAddress("300.1.1.1".into())).to_string(),
            "Invalid IP address"
        );
        assert_eq!(
            ApiError::UnsupportedMethod("PUT".into()).to_string(),
            "Method not allowed"
        );
    }

    #[test]
    fn test_invalid_prefix_message() {
        let err = AnalyzeError::InvalidPrefix(64);
        assert_eq!(err.to_string(), "Invalid prefix length /64");
        assert_eq!(ApiError::from(err).status(), StatusCode::BAD_REQUEST);
    }
}
