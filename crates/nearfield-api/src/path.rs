// ── Hierarchical object paths ──
//
// Every object the daemon exposes lives under a `/`-separated path, and
// ownership follows path containment: `/org/neard/nfc0/tag0/record0`
// belongs to the tag `/org/neard/nfc0/tag0`, which belongs to the adapter
// `/org/neard/nfc0`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hierarchy delimiter.
pub const DELIMITER: char = '/';

/// `true` iff `candidate` equals `ancestor` or lies below it.
///
/// Containment is segment-aware: `/a/bx` is not below `/a/b`.
pub fn is_descendant(candidate: &str, ancestor: &str) -> bool {
    match candidate.strip_prefix(ancestor) {
        Some("") => true,
        Some(rest) => rest.starts_with(DELIMITER) || ancestor.ends_with(DELIMITER),
        None => false,
    }
}

/// Substring before the last delimiter.
///
/// `/org` has the root `/` as parent; the root and delimiter-free strings
/// have none.
pub fn parent_of(path: &str) -> Option<&str> {
    match path.rfind(DELIMITER)? {
        0 if path.len() == 1 => None,
        0 => Some("/"),
        idx => path.get(..idx),
    }
}

// ── ObjectPath ──────────────────────────────────────────────────────

/// Identifier of a remote object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectPath(String);

impl ObjectPath {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// See [`is_descendant`].
    pub fn is_descendant_of(&self, ancestor: &ObjectPath) -> bool {
        is_descendant(&self.0, &ancestor.0)
    }

    /// See [`parent_of`].
    pub fn parent(&self) -> Option<ObjectPath> {
        parent_of(&self.0).map(ObjectPath::from)
    }

    /// Last path segment (`tag0` for `/org/neard/nfc0/tag0`).
    pub fn basename(&self) -> &str {
        self.0.rsplit(DELIMITER).next().unwrap_or(&self.0)
    }

    /// Append one segment.
    pub fn join(&self, segment: &str) -> ObjectPath {
        if self.0.ends_with(DELIMITER) {
            Self(format!("{}{segment}", self.0))
        } else {
            Self(format!("{}{DELIMITER}{segment}", self.0))
        }
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ObjectPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<String> for ObjectPath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ObjectPath {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl AsRef<str> for ObjectPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
