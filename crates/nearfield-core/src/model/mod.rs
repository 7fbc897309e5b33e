// ── Cached domain model ──
//
// The entities mirrored from the daemon's object graph. Each entity keeps
// an explicit reference to its owner, set once at creation from the path
// hierarchy, and the list of its children in creation order.

pub mod adapter;
pub mod device;
pub mod path;
pub mod record;
pub mod tag;

use nearfield_api::Interface;
use serde::Serialize;
use strum::{Display, EnumString};

// ── Re-exports ──────────────────────────────────────────────────────

pub use adapter::{Adapter, AdapterMode, AdapterProperty, PollMode};
pub use device::Device;
pub use path::{AdapterPath, DevicePath, RecordOwner, RecordPath, TagPath};
pub use record::{Record, RecordFields, RecordType};
pub use tag::Tag;

/// The four kinds of cached entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
    Adapter,
    Tag,
    Device,
    Record,
}

impl EntityKind {
    pub fn from_interface(interface: &Interface) -> Option<Self> {
        match interface {
            Interface::Adapter => Some(Self::Adapter),
            Interface::Tag => Some(Self::Tag),
            Interface::Device => Some(Self::Device),
            Interface::Record => Some(Self::Record),
            _ => None,
        }
    }

    /// Depth in the ownership hierarchy. Owners rank lower than the
    /// entities they own.
    pub(crate) fn rank(self) -> u8 {
        match self {
            Self::Adapter => 0,
            Self::Tag | Self::Device => 1,
            Self::Record => 2,
        }
    }
}

/// Found-side notification state.
///
/// Starts cleared and can only ever be set; there is no way to reset it
/// while the owning entity lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Notified(bool);

impl Notified {
    pub(crate) fn get(self) -> bool {
        self.0
    }

    pub(crate) fn set(&mut self) {
        self.0 = true;
    }
}
