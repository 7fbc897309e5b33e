// ── Core error types ──
//
// User-facing errors from nearfield-core. Consumers never see the
// transport's error shapes directly: the `From<nearfield_api::Error>`
// impl translates them into the kinds below at the call site boundary.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // ── Caller errors ────────────────────────────────────────────────
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    #[error("Out of memory while copying {what}")]
    NoMemory { what: &'static str },

    // ── Lookup errors ────────────────────────────────────────────────
    #[error("Adapter not found: {path}")]
    NoAdapter { path: String },

    #[error("Tag not found: {path}")]
    NoTag { path: String },

    #[error("Device not found: {path}")]
    NoDevice { path: String },

    #[error("Record not found: {path}")]
    NoRecord { path: String },

    #[error("Entity already registered: {path}")]
    AlreadyExists { path: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Invalid record for {path}: {message}")]
    InvalidRecord { path: String, message: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Polling already active on {path}")]
    PollingAlreadyActive { path: String },

    // ── Directory errors (wrapped, not exposed raw) ──────────────────
    #[error("Directory transport error: {message}")]
    Transport { message: String },

    #[error("Cannot create proxy for {path}: {message}")]
    ProxyCreationFailed { path: String, message: String },

    #[error("Method {method} failed: {message}")]
    MethodInvocationFailed { method: String, message: String },
}

impl CoreError {
    /// Returns `true` for the kind-specific "not found" lookups.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NoAdapter { .. } | Self::NoTag { .. } | Self::NoDevice { .. } | Self::NoRecord { .. }
        )
    }

    /// Returns `true` if the error came from talking to the daemon.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. }
                | Self::ProxyCreationFailed { .. }
                | Self::MethodInvocationFailed { .. }
        )
    }

    pub(crate) fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<nearfield_api::Error> for CoreError {
    fn from(err: nearfield_api::Error) -> Self {
        match err {
            nearfield_api::Error::Disconnected { reason } => CoreError::Transport { message: reason },
            nearfield_api::Error::ProxyCreation {
                path,
                interface,
                reason,
            } => CoreError::ProxyCreationFailed {
                path,
                message: format!("{interface}: {reason}"),
            },
            nearfield_api::Error::MethodCall {
                method,
                name,
                message,
            } => CoreError::MethodInvocationFailed {
                method,
                message: format!("{name}: {message}"),
            },
            nearfield_api::Error::Timeout { method, timeout_ms } => CoreError::Transport {
                message: format!("{method} timed out after {timeout_ms}ms"),
            },
            nearfield_api::Error::NoSuchObject { path } => CoreError::Transport {
                message: format!("daemon has no object at {path}"),
            },
            nearfield_api::Error::TypeMismatch {
                name,
                expected,
                found,
            } => CoreError::InvalidParameter {
                message: format!("property {name} is {found}, expected {expected}"),
            },
        }
    }
}
