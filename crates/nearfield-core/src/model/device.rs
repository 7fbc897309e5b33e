// ── Device domain types ──

use super::Notified;
use super::path::{AdapterPath, DevicePath, RecordPath};

/// An active NFC peer seen by an adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub(crate) path: DevicePath,
    pub(crate) adapter: AdapterPath,
    pub(crate) records: Vec<RecordPath>,
    pub(crate) notified: Notified,
}

impl Device {
    pub(crate) fn new(path: DevicePath, adapter: AdapterPath) -> Self {
        Self {
            path,
            adapter,
            records: Vec::new(),
            notified: Notified::default(),
        }
    }

    pub fn path(&self) -> &DevicePath {
        &self.path
    }

    pub fn adapter(&self) -> &AdapterPath {
        &self.adapter
    }

    pub fn records(&self) -> &[RecordPath] {
        &self.records
    }

    pub fn is_notified(&self) -> bool {
        self.notified.get()
    }
}
