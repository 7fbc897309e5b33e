use thiserror::Error;

/// Top-level error type for the `nearfield-api` crate.
///
/// Covers every failure mode of the directory surface: an unreachable
/// daemon, proxy setup, failed or timed-out method calls, and property
/// values of the wrong shape. `nearfield-core` maps these into
/// user-facing error kinds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    // ── Connection ──────────────────────────────────────────────────
    /// The daemon is not reachable (bus gone, name not owned, etc.)
    #[error("Directory service unreachable: {reason}")]
    Disconnected { reason: String },

    /// A proxy for a remote object or the signal subscription could not be set up.
    #[error("Cannot create proxy for {path} ({interface}): {reason}")]
    ProxyCreation {
        path: String,
        interface: String,
        reason: String,
    },

    // ── Calls ───────────────────────────────────────────────────────
    /// The daemon replied with an error to a method call.
    ///
    /// `name` carries the daemon's error name, e.g. `org.neard.Error.AlreadyEnabled`.
    #[error("Method {method} failed ({name}): {message}")]
    MethodCall {
        method: String,
        name: String,
        message: String,
    },

    /// A call with an explicit timeout did not complete in time.
    #[error("Method {method} timed out after {timeout_ms}ms")]
    Timeout { method: String, timeout_ms: u64 },

    /// The addressed object does not exist on the daemon side.
    #[error("No such object: {path}")]
    NoSuchObject { path: String },

    // ── Data ────────────────────────────────────────────────────────
    /// A property value did not have the expected type.
    #[error("Property {name} is {found}, expected {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl Error {
    /// Returns `true` when the daemon reported the given error name.
    pub fn is_daemon_error(&self, error_name: &str) -> bool {
        matches!(self, Self::MethodCall { name, .. } if name == error_name)
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NoSuchObject { .. })
    }

    /// Returns `true` if the failure says nothing about the request itself
    /// and the same call might succeed later.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Disconnected { .. } | Self::Timeout { .. })
    }
}
