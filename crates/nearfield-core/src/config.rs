// ── Runtime context configuration ──
//
// Describes how a `Context` talks to the daemon. Never touches disk:
// callers build a `ContextConfig` (directly or via `nearfield-config`)
// and hand it in.

use std::time::Duration;

use nearfield_api::ObjectPath;

/// Bus name of the neard daemon.
pub const DEFAULT_SERVICE: &str = "org.neard";

/// Timeout applied to record write and push calls.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for one context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextConfig {
    /// Well-known bus name the directory belongs to. Informational for
    /// the cache; transports use it to address the daemon.
    pub service: String,
    /// Only objects at or below this path are cached.
    pub root: ObjectPath,
    /// Timeout for write and push calls.
    pub write_timeout: Duration,
    /// Enumerate existing objects when connecting. When off, the cache
    /// only learns about objects announced after `connect`.
    pub enumerate_on_connect: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            service: DEFAULT_SERVICE.into(),
            root: ObjectPath::from("/"),
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            enumerate_on_connect: true,
        }
    }
}
