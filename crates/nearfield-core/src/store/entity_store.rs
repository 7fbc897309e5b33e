// ── Central entity store ──
//
// Owns every cached entity. Each registry is flat and keyed by path;
// the hierarchy lives in the explicit owner reference each entity carries
// and in the child lists of its owner, both maintained here so they can
// never disagree.

use nearfield_api::ObjectPath;

use super::collection::EntityCollection;
use crate::error::CoreError;
use crate::model::adapter::AdapterChild;
use crate::model::{
    Adapter, AdapterPath, Device, DevicePath, EntityKind, Record, RecordOwner, RecordPath, Tag,
    TagPath,
};

/// All cached adapters, tags, devices and records.
#[derive(Default)]
pub struct EntityStore {
    pub(crate) adapters: EntityCollection<AdapterPath, Adapter>,
    pub(crate) tags: EntityCollection<TagPath, Tag>,
    pub(crate) devices: EntityCollection<DevicePath, Device>,
    pub(crate) records: EntityCollection<RecordPath, Record>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Borrowed lookups ─────────────────────────────────────────────

    pub fn adapter(&self, path: &AdapterPath) -> Option<&Adapter> {
        self.adapters.get(path)
    }

    pub fn tag(&self, path: &TagPath) -> Option<&Tag> {
        self.tags.get(path)
    }

    pub fn device(&self, path: &DevicePath) -> Option<&Device> {
        self.devices.get(path)
    }

    pub fn record(&self, path: &RecordPath) -> Option<&Record> {
        self.records.get(path)
    }

    pub fn adapter_count(&self) -> usize {
        self.adapters.len()
    }

    /// `true` when nothing at all is cached.
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
            && self.tags.is_empty()
            && self.devices.is_empty()
            && self.records.is_empty()
    }

    /// Which registry, if any, holds `path`.
    pub fn kind_of(&self, path: &ObjectPath) -> Option<EntityKind> {
        if self.adapters.contains(&AdapterPath::from(path.clone())) {
            Some(EntityKind::Adapter)
        } else if self.tags.contains(&TagPath::from(path.clone())) {
            Some(EntityKind::Tag)
        } else if self.devices.contains(&DevicePath::from(path.clone())) {
            Some(EntityKind::Device)
        } else if self.records.contains(&RecordPath::from(path.clone())) {
            Some(EntityKind::Record)
        } else {
            None
        }
    }

    // ── Owner resolution ─────────────────────────────────────────────

    /// The adapter owning a tag or device path: the direct parent when it
    /// is a known adapter, otherwise the deepest known adapter above it.
    pub(crate) fn resolve_adapter(&self, path: &ObjectPath) -> Option<AdapterPath> {
        path.parent()
            .map(AdapterPath::from)
            .filter(|parent| self.adapters.contains(parent))
            .or_else(|| nearest_ancestor(path, self.adapters.keys(), AdapterPath::as_path))
    }

    /// The tag or device owning a record path, resolved the same way as
    /// [`resolve_adapter`](Self::resolve_adapter).
    pub(crate) fn resolve_record_owner(&self, path: &ObjectPath) -> Option<RecordOwner> {
        if let Some(parent) = path.parent() {
            let tag = TagPath::from(parent.clone());
            if self.tags.contains(&tag) {
                return Some(RecordOwner::Tag(tag));
            }
            let device = DevicePath::from(parent);
            if self.devices.contains(&device) {
                return Some(RecordOwner::Device(device));
            }
        }

        let tag = nearest_ancestor(path, self.tags.keys(), TagPath::as_path).map(RecordOwner::Tag);
        let device =
            nearest_ancestor(path, self.devices.keys(), DevicePath::as_path).map(RecordOwner::Device);
        match (tag, device) {
            (Some(t), Some(d)) if d.as_path().as_str().len() > t.as_path().as_str().len() => Some(d),
            (Some(t), _) => Some(t),
            (None, d) => d,
        }
    }

    // ── Insertion ────────────────────────────────────────────────────

    pub(crate) fn insert_adapter(&mut self, adapter: Adapter) -> Result<(), CoreError> {
        self.adapters.insert(adapter.path.clone(), adapter)
    }

    /// Register a tag under the adapter it names.
    pub(crate) fn insert_tag(&mut self, tag: Tag) -> Result<(), CoreError> {
        let path = tag.path.clone();
        let adapter = self
            .adapters
            .get_mut(&tag.adapter)
            .ok_or_else(|| CoreError::NoAdapter {
                path: tag.adapter.to_string(),
            })?;
        self.tags.insert(path.clone(), tag)?;
        adapter.attach(AdapterChild::Tag(path));
        Ok(())
    }

    pub(crate) fn insert_device(&mut self, device: Device) -> Result<(), CoreError> {
        let path = device.path.clone();
        let adapter = self
            .adapters
            .get_mut(&device.adapter)
            .ok_or_else(|| CoreError::NoAdapter {
                path: device.adapter.to_string(),
            })?;
        self.devices.insert(path.clone(), device)?;
        adapter.attach(AdapterChild::Device(path));
        Ok(())
    }

    /// Register a record and append it to its owner's record list.
    pub(crate) fn insert_record(&mut self, record: Record) -> Result<(), CoreError> {
        let path = record.path.clone();
        let owner_records = match &record.owner {
            RecordOwner::Tag(tag) => {
                &mut self
                    .tags
                    .get_mut(tag)
                    .ok_or_else(|| CoreError::NoTag {
                        path: tag.to_string(),
                    })?
                    .records
            }
            RecordOwner::Device(device) => {
                &mut self
                    .devices
                    .get_mut(device)
                    .ok_or_else(|| CoreError::NoDevice {
                        path: device.to_string(),
                    })?
                    .records
            }
        };
        self.records.insert(path.clone(), record)?;
        owner_records.push(path);
        Ok(())
    }

    // ── Eviction ─────────────────────────────────────────────────────
    //
    // Eviction only unlinks and drops. Callers that must report losses
    // walk the children themselves first; anything still attached at this
    // point is dropped silently along with its owner.

    pub(crate) fn evict_record(&mut self, path: &RecordPath) -> Option<Record> {
        let record = self.records.remove(path)?;
        let owner_records = match &record.owner {
            RecordOwner::Tag(tag) => self.tags.get_mut(tag).map(|t| &mut t.records),
            RecordOwner::Device(device) => self.devices.get_mut(device).map(|d| &mut d.records),
        };
        if let Some(records) = owner_records {
            records.retain(|r| r != path);
        }
        Some(record)
    }

    pub(crate) fn evict_tag(&mut self, path: &TagPath) -> Option<Tag> {
        let tag = self.tags.remove(path)?;
        for record in &tag.records {
            self.records.remove(record);
        }
        if let Some(adapter) = self.adapters.get_mut(&tag.adapter) {
            adapter.detach(&AdapterChild::Tag(path.clone()));
        }
        Some(tag)
    }

    pub(crate) fn evict_device(&mut self, path: &DevicePath) -> Option<Device> {
        let device = self.devices.remove(path)?;
        for record in &device.records {
            self.records.remove(record);
        }
        if let Some(adapter) = self.adapters.get_mut(&device.adapter) {
            adapter.detach(&AdapterChild::Device(path.clone()));
        }
        Some(device)
    }

    pub(crate) fn evict_adapter(&mut self, path: &AdapterPath) -> Option<Adapter> {
        let mut adapter = self.adapters.remove(path)?;
        for child in std::mem::take(&mut adapter.children) {
            match child {
                AdapterChild::Tag(tag) => {
                    self.evict_tag(&tag);
                }
                AdapterChild::Device(device) => {
                    self.evict_device(&device);
                }
            }
        }
        Some(adapter)
    }
}

/// Deepest candidate strictly above `path`.
fn nearest_ancestor<'a, K: Clone + 'a>(
    path: &ObjectPath,
    candidates: impl Iterator<Item = &'a K>,
    as_path: fn(&K) -> &ObjectPath,
) -> Option<K> {
    candidates
        .filter(|candidate| {
            let ancestor = as_path(candidate);
            ancestor != path && path.is_descendant_of(ancestor)
        })
        .max_by_key(|candidate| as_path(candidate).as_str().len())
        .cloned()
}
