// ── Found/lost notification fan-out ──
//
// Holds the client's callbacks and decides when each one fires. A found
// callback fires at most once per entity, and only after its owner has
// been reported; lost callbacks fire unconditionally for every entity
// that leaves the cache, before it is evicted.

use tracing::debug;

use crate::model::adapter::AdapterChild;
use crate::model::{AdapterPath, AdapterProperty, DevicePath, RecordPath, TagPath};
use crate::store::EntityStore;

/// Callback receiving the path of the entity it reports.
pub type PathCallback<P> = Box<dyn FnMut(&P)>;

/// Callback receiving an adapter, the property name and its new value.
pub type AdapterPropertyCallback = Box<dyn FnMut(&AdapterPath, &str, &AdapterProperty)>;

/// The client's callback table. Every slot is optional.
#[derive(Default)]
pub(crate) struct Dispatcher {
    pub(crate) on_adapter_added: Option<PathCallback<AdapterPath>>,
    pub(crate) on_adapter_removed: Option<PathCallback<AdapterPath>>,
    pub(crate) on_adapter_property_changed: Option<AdapterPropertyCallback>,
    pub(crate) on_tag_found: Option<PathCallback<TagPath>>,
    pub(crate) on_tag_lost: Option<PathCallback<TagPath>>,
    pub(crate) on_device_found: Option<PathCallback<DevicePath>>,
    pub(crate) on_device_lost: Option<PathCallback<DevicePath>>,
    pub(crate) on_record_found: Option<PathCallback<RecordPath>>,
}

impl Dispatcher {
    // ── Found side ───────────────────────────────────────────────────

    /// Report a new adapter, then any of its children not yet reported.
    pub(crate) fn adapter_added(&mut self, store: &mut EntityStore, path: &AdapterPath) {
        let Some(adapter) = store.adapters.get(path) else {
            return;
        };
        let children = adapter.children.clone();

        if let Some(cb) = self.on_adapter_added.as_mut() {
            debug!(adapter = %path, "adapter added");
            cb(path);
        }

        for child in &children {
            match child {
                AdapterChild::Tag(tag) => self.tag_present(store, tag),
                AdapterChild::Device(device) => self.device_present(store, device),
            }
        }
    }

    /// Report a tag if it has not been reported, then its records.
    pub(crate) fn tag_present(&mut self, store: &mut EntityStore, path: &TagPath) {
        let Some(tag) = store.tags.get_mut(path) else {
            return;
        };
        if !tag.notified.get() {
            if let Some(cb) = self.on_tag_found.as_mut() {
                debug!(tag = %path, "tag found");
                cb(path);
                tag.notified.set();
            }
        }
        let records = tag.records.clone();
        for record in &records {
            self.record_present(store, record);
        }
    }

    pub(crate) fn device_present(&mut self, store: &mut EntityStore, path: &DevicePath) {
        let Some(device) = store.devices.get_mut(path) else {
            return;
        };
        if !device.notified.get() {
            if let Some(cb) = self.on_device_found.as_mut() {
                debug!(device = %path, "device found");
                cb(path);
                device.notified.set();
            }
        }
        let records = device.records.clone();
        for record in &records {
            self.record_present(store, record);
        }
    }

    pub(crate) fn record_present(&mut self, store: &mut EntityStore, path: &RecordPath) {
        let Some(record) = store.records.get_mut(path) else {
            return;
        };
        if record.notified.get() {
            return;
        }
        if let Some(cb) = self.on_record_found.as_mut() {
            debug!(record = %path, "record found");
            cb(path);
            record.notified.set();
        }
    }

    // ── Lost side ────────────────────────────────────────────────────

    pub(crate) fn adapter_removed(&mut self, path: &AdapterPath) {
        if let Some(cb) = self.on_adapter_removed.as_mut() {
            debug!(adapter = %path, "adapter removed");
            cb(path);
        }
    }

    pub(crate) fn tag_lost(&mut self, path: &TagPath) {
        if let Some(cb) = self.on_tag_lost.as_mut() {
            debug!(tag = %path, "tag lost");
            cb(path);
        }
    }

    pub(crate) fn device_lost(&mut self, path: &DevicePath) {
        if let Some(cb) = self.on_device_lost.as_mut() {
            debug!(device = %path, "device lost");
            cb(path);
        }
    }

    // ── Property changes ─────────────────────────────────────────────

    pub(crate) fn adapter_property_changed(
        &mut self,
        path: &AdapterPath,
        name: &str,
        value: &AdapterProperty,
    ) {
        if let Some(cb) = self.on_adapter_property_changed.as_mut() {
            debug!(adapter = %path, property = name, "adapter property changed");
            cb(path, name, value);
        }
    }
}
