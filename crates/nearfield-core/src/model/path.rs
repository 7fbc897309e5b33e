// ── Kind-typed identifiers ──
//
// Every entity is identified by the daemon's object path. Wrapping the
// path per kind keeps a tag path from being handed to an adapter lookup
// and lets callbacks say exactly what they report.

use serde::{Deserialize, Serialize};
use std::fmt;

use nearfield_api::ObjectPath;

macro_rules! typed_path {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(ObjectPath);

        impl $name {
            pub fn new(raw: impl Into<ObjectPath>) -> Self {
                Self(raw.into())
            }

            pub fn as_path(&self) -> &ObjectPath {
                &self.0
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<ObjectPath> for $name {
            fn from(path: ObjectPath) -> Self {
                Self(path)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(ObjectPath::from(s))
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(ObjectPath::from(s))
            }
        }

        impl From<$name> for ObjectPath {
            fn from(path: $name) -> Self {
                path.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0.as_str() == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0.as_str() == *other
            }
        }
    };
}

typed_path! {
    /// Path of an adapter (`/org/neard/nfc0`).
    AdapterPath
}

typed_path! {
    /// Path of a tag (`/org/neard/nfc0/tag0`).
    TagPath
}

typed_path! {
    /// Path of a peer device (`/org/neard/nfc0/device0`).
    DevicePath
}

typed_path! {
    /// Path of a record (`/org/neard/nfc0/tag0/record0`).
    RecordPath
}

/// The entity a record belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum RecordOwner {
    Tag(TagPath),
    Device(DevicePath),
}

impl RecordOwner {
    pub fn as_path(&self) -> &ObjectPath {
        match self {
            Self::Tag(tag) => tag.as_path(),
            Self::Device(device) => device.as_path(),
        }
    }
}

impl fmt::Display for RecordOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_path(), f)
    }
}
