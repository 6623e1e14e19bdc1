use reqwest::StatusCode;

use crate::model::SourceKind;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, SourceError>;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("no API key is stored for the primary source")]
    CredentialMissing,

    #[error("stored API key does not look like a valid primary-source key")]
    CredentialInvalid,

    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("request to {url} failed with HTTP {status}{}", detail_suffix(.message))]
    HttpStatus {
        status: StatusCode,
        url: String,
        message: Option<String>,
    },

    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String },

    #[error("{origin} record is missing its video id")]
    MissingVideoId { origin: SourceKind },

    #[error("search query is required")]
    EmptyQuery,

    #[error("`{0}` is not a known mirror instance")]
    UnknownInstance(String),

    #[error("the {origin} source does not support {operation}")]
    Unsupported {
        origin: SourceKind,
        operation: &'static str,
    },

    #[error("all {attempts} mirror attempts failed, last error: {last}")]
    ExhaustedMirrors {
        attempts: usize,
        last: Box<SourceError>,
    },

    #[error("{first}")]
    ExhaustedSources {
        first: Box<SourceError>,
        fallback: Option<Box<SourceError>>,
    },
}

impl SourceError {
    pub fn transport(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Transport {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn http_status(status: StatusCode, url: impl Into<String>, message: Option<String>) -> Self {
        Self::HttpStatus {
            status,
            url: url.into(),
            message,
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }

    pub fn exhausted_sources(first: SourceError, fallback: Option<SourceError>) -> Self {
        Self::ExhaustedSources {
            first: Box::new(first),
            fallback: fallback.map(Box::new),
        }
    }

    /// Network failure or non-2xx answer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::HttpStatus { .. })
    }

    pub fn is_credential(&self) -> bool {
        matches!(self, Self::CredentialMissing | Self::CredentialInvalid)
    }

    /// Whether another mirror instance could plausibly answer the same request.
    ///
    /// Mirrors are interchangeable by contract, so anything the instance
    /// itself got wrong (transport, status, an HTML error page instead of
    /// JSON) is worth retrying elsewhere.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::HttpStatus { .. } | Self::MalformedResponse { .. } => {
                true
            }
            Self::CredentialMissing
            | Self::CredentialInvalid
            | Self::MissingVideoId { .. }
            | Self::EmptyQuery
            | Self::UnknownInstance(_)
            | Self::Unsupported { .. }
            | Self::ExhaustedMirrors { .. }
            | Self::ExhaustedSources { .. } => false,
        }
    }
}

fn detail_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_sources_reports_first_error() {
        let err = SourceError::exhausted_sources(
            SourceError::transport("https://primary", "connection reset"),
            Some(SourceError::malformed("expected array")),
        );
        assert_eq!(
            err.to_string(),
            "request to https://primary failed: connection reset"
        );
    }

    #[test]
    fn http_status_message_is_optional() {
        let plain = SourceError::http_status(StatusCode::BAD_GATEWAY, "https://m", None);
        assert_eq!(
            plain.to_string(),
            "request to https://m failed with HTTP 502 Bad Gateway"
        );

        let detailed = SourceError::http_status(
            StatusCode::FORBIDDEN,
            "https://p",
            Some("quotaExceeded".to_string()),
        );
        assert!(detailed.to_string().ends_with(": quotaExceeded"));
    }

    #[test]
    fn classification() {
        assert!(SourceError::transport("u", "x").is_retryable());
        assert!(SourceError::malformed("x").is_retryable());
        assert!(!SourceError::CredentialInvalid.is_retryable());
        assert!(SourceError::CredentialMissing.is_credential());
        assert!(!SourceError::malformed("x").is_transport());
    }
}
