use std::path::PathBuf;

use serde::Serialize;

/// The ways a single upstream round trip can fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UpstreamFailureKind {
    /// Any response other than HTTP 200.
    Status { status: u16 },
    /// A 200 response that lacks the expected field, or carries it empty.
    MissingField { field: &'static str },
    /// The request never produced a response.
    Transport { message: String },
    /// The body of a 200 response was not the expected JSON.
    Decode { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{endpoint}: {}", describe(.kind))]
pub struct UpstreamFailure {
    pub endpoint: &'static str,
    pub kind: UpstreamFailureKind,
}

fn describe(kind: &UpstreamFailureKind) -> String {
    match kind {
        UpstreamFailureKind::Status { status } => format!("unexpected status {}", status),
        UpstreamFailureKind::MissingField { field } => format!("no '{}' in response", field),
        UpstreamFailureKind::Transport { message } => format!("request failed: {}", message),
        UpstreamFailureKind::Decode { message } => format!("invalid response body: {}", message),
    }
}

impl UpstreamFailure {
    pub fn status(endpoint: &'static str, status: u16) -> Self {
        Self {
            endpoint,
            kind: UpstreamFailureKind::Status { status },
        }
    }

    pub fn missing_field(endpoint: &'static str, field: &'static str) -> Self {
        Self {
            endpoint,
            kind: UpstreamFailureKind::MissingField { field },
        }
    }

    pub fn transport(endpoint: &'static str, err: &reqwest::Error) -> Self {
        Self {
            endpoint,
            kind: UpstreamFailureKind::Transport {
                message: err.to_string(),
            },
        }
    }

    pub fn decode(endpoint: &'static str, message: impl Into<String>) -> Self {
        Self {
            endpoint,
            kind: UpstreamFailureKind::Decode {
                message: message.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum ServiceError {
    #[error("Missing credential {}: {reason}", .path.display())]
    MissingCredential { path: PathBuf, reason: String },

    #[error("Upstream failure: {0}")]
    Upstream(#[from] UpstreamFailure),
}

impl ServiceError {
    pub fn missing_credential(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ServiceError::MissingCredential {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// HTTP status reported by the upstream, when the failure was a non-200 response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Upstream(UpstreamFailure {
                kind: UpstreamFailureKind::Status { status },
                ..
            }) => Some(*status),
            _ => None,
        }
    }

    /// Endpoint that failed, if the failure came from the remote API.
    pub fn endpoint(&self) -> Option<&'static str> {
        match self {
            Self::Upstream(failure) => Some(failure.endpoint),
            Self::MissingCredential { .. } => None,
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
