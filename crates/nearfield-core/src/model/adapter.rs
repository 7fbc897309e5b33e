// ── Adapter domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use nearfield_api::PropertyValue;

use super::path::{AdapterPath, DevicePath, TagPath};

/// Operating mode the daemon reports for an adapter.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
pub enum AdapterMode {
    #[default]
    Idle,
    Initiator,
    Target,
    Dual,
}

/// Mode selector for the discovery loop.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
pub enum PollMode {
    Initiator,
    Target,
    Dual,
}

/// A decoded adapter property change, as handed to the
/// property-changed callback.
///
/// Names the cache knows are decoded; anything else is forwarded raw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "property", content = "value")]
pub enum AdapterProperty {
    Mode(AdapterMode),
    Polling(bool),
    Powered(bool),
    Protocols(Vec<String>),
    Other(PropertyValue),
}

/// Child of an adapter, in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum AdapterChild {
    Tag(TagPath),
    Device(DevicePath),
}

/// A local NFC radio managed by the daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adapter {
    pub(crate) path: AdapterPath,
    pub(crate) mode: AdapterMode,
    pub(crate) polling: bool,
    pub(crate) powered: bool,
    pub(crate) protocols: Vec<String>,
    pub(crate) children: Vec<AdapterChild>,
}

impl Adapter {
    pub(crate) fn new(path: AdapterPath) -> Self {
        Self {
            path,
            mode: AdapterMode::default(),
            polling: false,
            powered: false,
            protocols: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn path(&self) -> &AdapterPath {
        &self.path
    }

    pub fn mode(&self) -> AdapterMode {
        self.mode
    }

    pub fn is_polling(&self) -> bool {
        self.polling
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    pub fn protocols(&self) -> &[String] {
        &self.protocols
    }

    /// Tags under this adapter, oldest first.
    pub fn tags(&self) -> impl Iterator<Item = &TagPath> {
        self.children.iter().filter_map(|child| match child {
            AdapterChild::Tag(tag) => Some(tag),
            AdapterChild::Device(_) => None,
        })
    }

    /// Devices under this adapter, oldest first.
    pub fn devices(&self) -> impl Iterator<Item = &DevicePath> {
        self.children.iter().filter_map(|child| match child {
            AdapterChild::Device(device) => Some(device),
            AdapterChild::Tag(_) => None,
        })
    }

    pub(crate) fn attach(&mut self, child: AdapterChild) {
        self.children.push(child);
    }

    pub(crate) fn detach(&mut self, child: &AdapterChild) {
        self.children.retain(|c| c != child);
    }
}
