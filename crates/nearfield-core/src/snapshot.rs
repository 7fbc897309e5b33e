// ── Detached property snapshots ──
//
// Queries hand out owned deep copies so the caller may keep them after
// the entity, or the whole context, is gone. Copies are built with
// fallible reservations: if any allocation fails the partial snapshot is
// dropped as it unwinds and the caller gets `NoMemory`, never a half-built
// value.

use std::collections::TryReserveError;

use serde::Serialize;

use nearfield_api::ObjectPath;

use crate::error::CoreError;
use crate::model::{
    Adapter, AdapterMode, AdapterPath, Device, DevicePath, Record, RecordFields, RecordOwner,
    RecordPath, Tag, TagPath,
};

// ── Snapshot types ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdapterProperties {
    pub path: AdapterPath,
    pub mode: AdapterMode,
    pub polling: bool,
    pub powered: bool,
    pub protocols: Vec<String>,
    pub tags: Vec<TagPath>,
    pub devices: Vec<DevicePath>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagProperties {
    pub path: TagPath,
    pub adapter: AdapterPath,
    pub tag_type: Option<String>,
    pub protocol: Option<String>,
    pub read_only: bool,
    pub iso14443a_atqa: Option<Vec<u8>>,
    pub iso14443a_sak: Option<Vec<u8>>,
    pub iso14443a_uid: Option<Vec<u8>>,
    pub felica_manufacturer: Option<Vec<u8>>,
    pub felica_ci_code: Option<Vec<u8>>,
    pub felica_ic: Option<Vec<u8>>,
    pub felica_max_resp_times: Option<Vec<u8>>,
    pub records: Vec<RecordPath>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceProperties {
    pub path: DevicePath,
    pub adapter: AdapterPath,
    pub records: Vec<RecordPath>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordProperties {
    pub path: RecordPath,
    pub owner: RecordOwner,
    #[serde(flatten)]
    pub fields: RecordFields,
}

/// Drop whatever snapshot `slot` holds.
///
/// Returns `false` when the slot was already empty, so releasing twice is
/// harmless. The live cache is never touched.
pub fn release<T>(slot: &mut Option<T>) -> bool {
    slot.take().is_some()
}

// ── Fallible deep copy ───────────────────────────────────────────────

pub(crate) trait TryCopy: Sized {
    fn try_copy(&self) -> Result<Self, TryReserveError>;
}

impl TryCopy for u8 {
    fn try_copy(&self) -> Result<Self, TryReserveError> {
        Ok(*self)
    }
}

impl TryCopy for String {
    fn try_copy(&self) -> Result<Self, TryReserveError> {
        copy_str(self)
    }
}

impl TryCopy for ObjectPath {
    fn try_copy(&self) -> Result<Self, TryReserveError> {
        copy_str(self.as_str()).map(ObjectPath::from)
    }
}

impl<T: TryCopy> TryCopy for Vec<T> {
    fn try_copy(&self) -> Result<Self, TryReserveError> {
        let mut out = Vec::new();
        out.try_reserve_exact(self.len())?;
        for item in self {
            out.push(item.try_copy()?);
        }
        Ok(out)
    }
}

impl<T: TryCopy> TryCopy for Option<T> {
    fn try_copy(&self) -> Result<Self, TryReserveError> {
        self.as_ref().map(T::try_copy).transpose()
    }
}

macro_rules! try_copy_path {
    ($($name:ty),+) => {
        $(impl TryCopy for $name {
            fn try_copy(&self) -> Result<Self, TryReserveError> {
                self.as_path().try_copy().map(<$name>::from)
            }
        })+
    };
}

try_copy_path!(AdapterPath, TagPath, DevicePath, RecordPath);

impl TryCopy for RecordOwner {
    fn try_copy(&self) -> Result<Self, TryReserveError> {
        Ok(match self {
            Self::Tag(tag) => Self::Tag(tag.try_copy()?),
            Self::Device(device) => Self::Device(device.try_copy()?),
        })
    }
}

impl TryCopy for RecordFields {
    fn try_copy(&self) -> Result<Self, TryReserveError> {
        Ok(Self {
            record_type: self.record_type.try_copy()?,
            encoding: self.encoding.try_copy()?,
            language: self.language.try_copy()?,
            representation: self.representation.try_copy()?,
            uri: self.uri.try_copy()?,
            uri_object_size: self.uri_object_size,
            mime_type: self.mime_type.try_copy()?,
            action: self.action.try_copy()?,
            carrier: self.carrier.try_copy()?,
            ssid: self.ssid.try_copy()?,
            passphrase: self.passphrase.try_copy()?,
            encryption: self.encryption.try_copy()?,
            authentication: self.authentication.try_copy()?,
        })
    }
}

fn copy_str(s: &str) -> Result<String, TryReserveError> {
    let mut out = String::new();
    out.try_reserve_exact(s.len())?;
    out.push_str(s);
    Ok(out)
}

fn copy_all<'a, T: TryCopy + 'a>(
    items: impl ExactSizeIterator<Item = &'a T>,
) -> Result<Vec<T>, TryReserveError> {
    let mut out = Vec::new();
    out.try_reserve_exact(items.len())?;
    for item in items {
        out.push(item.try_copy()?);
    }
    Ok(out)
}

fn no_memory(what: &'static str) -> impl FnOnce(TryReserveError) -> CoreError {
    move |_| CoreError::NoMemory { what }
}

// ── Snapshot builders ────────────────────────────────────────────────

impl Adapter {
    pub(crate) fn snapshot(&self) -> Result<AdapterProperties, CoreError> {
        let build = || -> Result<AdapterProperties, TryReserveError> {
            let tags: Vec<&TagPath> = self.tags().collect();
            let devices: Vec<&DevicePath> = self.devices().collect();
            Ok(AdapterProperties {
                path: self.path.try_copy()?,
                mode: self.mode,
                polling: self.polling,
                powered: self.powered,
                protocols: self.protocols.try_copy()?,
                tags: copy_all(tags.into_iter())?,
                devices: copy_all(devices.into_iter())?,
            })
        };
        build().map_err(no_memory("adapter properties"))
    }
}

impl Tag {
    pub(crate) fn snapshot(&self) -> Result<TagProperties, CoreError> {
        let build = || -> Result<TagProperties, TryReserveError> {
            Ok(TagProperties {
                path: self.path.try_copy()?,
                adapter: self.adapter.try_copy()?,
                tag_type: self.tag_type.try_copy()?,
                protocol: self.protocol.try_copy()?,
                read_only: self.read_only,
                iso14443a_atqa: self.iso14443a_atqa.try_copy()?,
                iso14443a_sak: self.iso14443a_sak.try_copy()?,
                iso14443a_uid: self.iso14443a_uid.try_copy()?,
                felica_manufacturer: self.felica_manufacturer.try_copy()?,
                felica_ci_code: self.felica_ci_code.try_copy()?,
                felica_ic: self.felica_ic.try_copy()?,
                felica_max_resp_times: self.felica_max_resp_times.try_copy()?,
                records: self.records.try_copy()?,
            })
        };
        build().map_err(no_memory("tag properties"))
    }
}

impl Device {
    pub(crate) fn snapshot(&self) -> Result<DeviceProperties, CoreError> {
        let build = || -> Result<DeviceProperties, TryReserveError> {
            Ok(DeviceProperties {
                path: self.path.try_copy()?,
                adapter: self.adapter.try_copy()?,
                records: self.records.try_copy()?,
            })
        };
        build().map_err(no_memory("device properties"))
    }
}

impl Record {
    pub(crate) fn snapshot(&self) -> Result<RecordProperties, CoreError> {
        let build = || -> Result<RecordProperties, TryReserveError> {
            Ok(RecordProperties {
                path: self.path.try_copy()?,
                owner: self.owner.try_copy()?,
                fields: self.fields.try_copy()?,
            })
        };
        build().map_err(no_memory("record properties"))
    }
}

/// Copy a list of identifiers for a listing query.
pub(crate) fn copy_ids<'a, T: TryCopy + 'a>(
    ids: impl ExactSizeIterator<Item = &'a T>,
    what: &'static str,
) -> Result<Vec<T>, CoreError> {
    copy_all(ids).map_err(no_memory(what))
}
