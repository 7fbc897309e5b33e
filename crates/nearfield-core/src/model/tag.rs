// ── Tag domain types ──

use super::Notified;
use super::path::{AdapterPath, RecordPath, TagPath};

/// A passive NFC object seen by an adapter.
///
/// The byte blobs are technology specific and only present when the
/// daemon reports them: ISO 14443-A anti-collision data for type 1/2/4
/// tags, FeliCa identifiers for type 3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub(crate) path: TagPath,
    pub(crate) adapter: AdapterPath,
    pub(crate) tag_type: Option<String>,
    pub(crate) protocol: Option<String>,
    pub(crate) read_only: bool,
    pub(crate) iso14443a_atqa: Option<Vec<u8>>,
    pub(crate) iso14443a_sak: Option<Vec<u8>>,
    pub(crate) iso14443a_uid: Option<Vec<u8>>,
    pub(crate) felica_manufacturer: Option<Vec<u8>>,
    pub(crate) felica_ci_code: Option<Vec<u8>>,
    pub(crate) felica_ic: Option<Vec<u8>>,
    pub(crate) felica_max_resp_times: Option<Vec<u8>>,
    pub(crate) records: Vec<RecordPath>,
    pub(crate) notified: Notified,
}

impl Tag {
    pub(crate) fn new(path: TagPath, adapter: AdapterPath) -> Self {
        Self {
            path,
            adapter,
            tag_type: None,
            protocol: None,
            read_only: false,
            iso14443a_atqa: None,
            iso14443a_sak: None,
            iso14443a_uid: None,
            felica_manufacturer: None,
            felica_ci_code: None,
            felica_ic: None,
            felica_max_resp_times: None,
            records: Vec::new(),
            notified: Notified::default(),
        }
    }

    pub fn path(&self) -> &TagPath {
        &self.path
    }

    pub fn adapter(&self) -> &AdapterPath {
        &self.adapter
    }

    /// NFC Forum tag type, e.g. `"Type 2"`.
    pub fn tag_type(&self) -> Option<&str> {
        self.tag_type.as_deref()
    }

    pub fn protocol(&self) -> Option<&str> {
        self.protocol.as_deref()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn iso14443a_uid(&self) -> Option<&[u8]> {
        self.iso14443a_uid.as_deref()
    }

    pub fn records(&self) -> &[RecordPath] {
        &self.records
    }

    /// Whether the tag-found callback has reported this tag.
    pub fn is_notified(&self) -> bool {
        self.notified.get()
    }
}
