// ── Read-side queries ──
//
// Listings and property snapshots over the entity store. Nothing here
// mutates the cache. An empty listing is reported as the kind-specific
// not-found error rather than an empty success.

use super::entity_store::EntityStore;
use crate::error::CoreError;
use crate::model::{AdapterPath, DevicePath, RecordPath, TagPath};
use crate::snapshot::{
    AdapterProperties, DeviceProperties, RecordProperties, TagProperties, copy_ids,
};

/// Scope reported by `NoAdapter` when no adapter exists at all.
const ANY_ADAPTER: &str = "/";

fn checked(path: &str) -> Result<&str, CoreError> {
    if path.is_empty() {
        Err(CoreError::invalid_parameter("empty object path"))
    } else {
        Ok(path)
    }
}

impl EntityStore {
    // ── Adapters ─────────────────────────────────────────────────────

    /// Paths of all adapters, oldest first.
    pub fn list_adapters(&self) -> Result<Vec<AdapterPath>, CoreError> {
        if self.adapters.is_empty() {
            return Err(CoreError::NoAdapter {
                path: ANY_ADAPTER.into(),
            });
        }
        copy_ids(self.adapters.keys(), "adapter list")
    }

    pub fn adapter_properties(&self, adapter: impl AsRef<str>) -> Result<AdapterProperties, CoreError> {
        let path = checked(adapter.as_ref())?;
        self.adapters
            .get(&AdapterPath::from(path))
            .ok_or_else(|| CoreError::NoAdapter { path: path.into() })?
            .snapshot()
    }

    // ── Tags ─────────────────────────────────────────────────────────

    /// Tags currently seen by `adapter`, oldest first.
    pub fn list_tags(&self, adapter: impl AsRef<str>) -> Result<Vec<TagPath>, CoreError> {
        let path = checked(adapter.as_ref())?;
        let adapter = self
            .adapters
            .get(&AdapterPath::from(path))
            .ok_or_else(|| CoreError::NoAdapter { path: path.into() })?;
        let tags: Vec<&TagPath> = adapter.tags().collect();
        if tags.is_empty() {
            return Err(CoreError::NoTag { path: path.into() });
        }
        copy_ids(tags.into_iter(), "tag list")
    }

    pub fn tag_properties(&self, tag: impl AsRef<str>) -> Result<TagProperties, CoreError> {
        let path = checked(tag.as_ref())?;
        self.tags
            .get(&TagPath::from(path))
            .ok_or_else(|| CoreError::NoTag { path: path.into() })?
            .snapshot()
    }

    // ── Devices ──────────────────────────────────────────────────────

    pub fn list_devices(&self, adapter: impl AsRef<str>) -> Result<Vec<DevicePath>, CoreError> {
        let path = checked(adapter.as_ref())?;
        let adapter = self
            .adapters
            .get(&AdapterPath::from(path))
            .ok_or_else(|| CoreError::NoAdapter { path: path.into() })?;
        let devices: Vec<&DevicePath> = adapter.devices().collect();
        if devices.is_empty() {
            return Err(CoreError::NoDevice { path: path.into() });
        }
        copy_ids(devices.into_iter(), "device list")
    }

    pub fn device_properties(&self, device: impl AsRef<str>) -> Result<DeviceProperties, CoreError> {
        let path = checked(device.as_ref())?;
        self.devices
            .get(&DevicePath::from(path))
            .ok_or_else(|| CoreError::NoDevice { path: path.into() })?
            .snapshot()
    }

    // ── Records ──────────────────────────────────────────────────────

    /// Records carried by a tag or a device, oldest first.
    ///
    /// A path that is neither a known tag nor a known device fails with
    /// `NoTag`.
    pub fn list_records(&self, owner: impl AsRef<str>) -> Result<Vec<RecordPath>, CoreError> {
        let path = checked(owner.as_ref())?;
        let records = if let Some(tag) = self.tags.get(&TagPath::from(path)) {
            tag.records.as_slice()
        } else if let Some(device) = self.devices.get(&DevicePath::from(path)) {
            device.records.as_slice()
        } else {
            return Err(CoreError::NoTag { path: path.into() });
        };
        if records.is_empty() {
            return Err(CoreError::NoRecord { path: path.into() });
        }
        copy_ids(records.iter(), "record list")
    }

    pub fn list_tag_records(&self, tag: impl AsRef<str>) -> Result<Vec<RecordPath>, CoreError> {
        let path = checked(tag.as_ref())?;
        if !self.tags.contains(&TagPath::from(path)) {
            return Err(CoreError::NoTag { path: path.into() });
        }
        self.list_records(path)
    }

    pub fn list_device_records(&self, device: impl AsRef<str>) -> Result<Vec<RecordPath>, CoreError> {
        let path = checked(device.as_ref())?;
        if !self.devices.contains(&DevicePath::from(path)) {
            return Err(CoreError::NoDevice { path: path.into() });
        }
        self.list_records(path)
    }

    pub fn record_properties(&self, record: impl AsRef<str>) -> Result<RecordProperties, CoreError> {
        let path = checked(record.as_ref())?;
        self.records
            .get(&RecordPath::from(path))
            .ok_or_else(|| CoreError::NoRecord { path: path.into() })?
            .snapshot()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Adapter, Device, Record, RecordOwner, Tag};
    use pretty_assertions::assert_eq;

    const ADAPTER: &str = "/org/neard/nfc0";
    const TAG: &str = "/org/neard/nfc0/tag0";
    const DEVICE: &str = "/org/neard/nfc0/device0";

    #[test]
    fn empty_store_lists_are_not_found() {
        let store = EntityStore::new();
        assert_eq!(
            store.list_adapters().unwrap_err(),
            CoreError::NoAdapter { path: "/".into() }
        );
        assert_eq!(
            store.list_tags(ADAPTER).unwrap_err(),
            CoreError::NoAdapter { path: ADAPTER.into() }
        );
        assert_eq!(
            store.list_records(TAG).unwrap_err(),
            CoreError::NoTag { path: TAG.into() }
        );
    }

    #[test]
    fn empty_scoped_lists_use_kind_errors() {
        let mut store = EntityStore::new();
        store.insert_adapter(Adapter::new(ADAPTER.into())).unwrap();
        store.insert_tag(Tag::new(TAG.into(), ADAPTER.into())).unwrap();

        assert_eq!(
            store.list_devices(ADAPTER).unwrap_err(),
            CoreError::NoDevice { path: ADAPTER.into() }
        );
        assert_eq!(
            store.list_records(TAG).unwrap_err(),
            CoreError::NoRecord { path: TAG.into() }
        );
        assert_eq!(
            store.list_device_records(TAG).unwrap_err(),
            CoreError::NoDevice { path: TAG.into() }
        );
        assert_eq!(store.list_tags(ADAPTER).unwrap(), [TAG]);
    }

    #[test]
    fn records_listed_for_devices_too() {
        let mut store = EntityStore::new();
        store.insert_adapter(Adapter::new(ADAPTER.into())).unwrap();
        store
            .insert_device(Device::new(DEVICE.into(), ADAPTER.into()))
            .unwrap();
        store
            .insert_record(Record::new(
                "/org/neard/nfc0/device0/record0".into(),
                RecordOwner::Device(DEVICE.into()),
            ))
            .unwrap();

        assert_eq!(
            store.list_records(DEVICE).unwrap(),
            ["/org/neard/nfc0/device0/record0"]
        );
        assert_eq!(store.list_device_records(DEVICE).unwrap().len(), 1);
    }

    #[test]
    fn empty_path_is_invalid() {
        let store = EntityStore::new();
        assert!(matches!(
            store.tag_properties("").unwrap_err(),
            CoreError::InvalidParameter { .. }
        ));
        assert!(matches!(
            store.list_records(String::new()).unwrap_err(),
            CoreError::InvalidParameter { .. }
        ));
    }

    #[test]
    fn properties_of_missing_entity_are_not_found() {
        let store = EntityStore::new();
        assert_eq!(
            store.record_properties("/org/neard/nfc0/tag0/record9").unwrap_err(),
            CoreError::NoRecord {
                path: "/org/neard/nfc0/tag0/record9".into()
            }
        );
        assert!(store.device_properties(DEVICE).unwrap_err().is_not_found());
        assert!(store.adapter_properties(ADAPTER).unwrap_err().is_not_found());
    }
}
