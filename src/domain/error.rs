use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Target user not found: {slug}")]
    TargetNotFound { slug: String },

    #[error("Policy denied {action} on user {target}: {reason}")]
    PolicyDenied {
        action: String,
        target: i64,
        reason: String,
    },

    #[error("API key does not exist")]
    CredentialNotFound,

    #[error("Entropy unavailable: {message}")]
    EntropyUnavailable { message: String },

    #[error("Storage error during {operation}: {message}")]
    Storage { operation: String, message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Operation cancelled: {operation}")]
    Cancelled { operation: String },
}

impl DomainError {
    pub fn target_not_found(slug: impl Into<String>) -> Self {
        Self::TargetNotFound { slug: slug.into() }
    }

    pub fn policy_denied(action: impl Into<String>, target: i64, reason: impl Into<String>) -> Self {
        Self::PolicyDenied {
            action: action.into(),
            target,
            reason: reason.into(),
        }
    }

    pub fn entropy_unavailable(message: impl Into<String>) -> Self {
        Self::EntropyUnavailable {
            message: message.into(),
        }
    }

    pub fn storage(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Storage {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn cancelled(operation: impl Into<String>) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }

    /// True for failures that must look identical to an unauthorized caller
    pub fn is_authorization_failure(&self) -> bool {
        matches!(self, Self::TargetNotFound { .. } | Self::PolicyDenied { .. })
    }

    /// Client-facing rendering of this error.
    ///
    /// `TargetNotFound` and `PolicyDenied` collapse into the same kind and
    /// message so cross-tenant probing cannot tell them apart.
    pub fn client_error(&self) -> ClientError {
        match self {
            Self::TargetNotFound { .. } | Self::PolicyDenied { .. } => {
                ClientError::new(ClientErrorKind::Unauthorized, "Unauthorized")
            }
            Self::CredentialNotFound => {
                ClientError::new(ClientErrorKind::NotFound, "API key does not exist")
            }
            Self::Validation { message } => {
                ClientError::new(ClientErrorKind::InvalidRequest, message.clone())
            }
            Self::Conflict { message } => ClientError::new(ClientErrorKind::Conflict, message.clone()),
            Self::Cancelled { .. } => {
                ClientError::new(ClientErrorKind::Unavailable, "Operation was cancelled")
            }
            Self::EntropyUnavailable { .. } | Self::Storage { .. } => {
                ClientError::new(ClientErrorKind::Internal, "An internal error occurred")
            }
        }
    }
}

/// Kind of failure as reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientErrorKind {
    Unauthorized,
    NotFound,
    InvalidRequest,
    Conflict,
    Unavailable,
    Internal,
}

impl std::fmt::Display for ClientErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::NotFound => write!(f, "not_found"),
            Self::InvalidRequest => write!(f, "invalid_request"),
            Self::Conflict => write!(f, "conflict"),
            Self::Unavailable => write!(f, "unavailable"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

/// Error detail safe to hand back to a caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientError {
    pub kind: ClientErrorKind,
    pub message: String,
}

impl ClientError {
    pub fn new(kind: ClientErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ClientError {}
