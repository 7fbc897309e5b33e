// ── Directory synchronization ──
//
// Applies enumeration results and directory events to the entity store.
// Creation resolves the owner first, reads properties from the directory
// only when the announcement carried none, and reports the entity once it
// is in the store. Removal walks children newest-first so every lost
// callback fires while its entity is still queryable.

use tracing::{debug, trace, warn};

use nearfield_api::{
    Directory, DirectoryEvent, Interface, ManagedObject, ObjectPath, PropertyBag, PropertyValue,
};

use crate::dispatch::Dispatcher;
use crate::error::CoreError;
use crate::model::adapter::AdapterChild;
use crate::model::{
    Adapter, AdapterPath, Device, DevicePath, EntityKind, Record, RecordOwner, RecordPath, Tag,
    TagPath,
};
use crate::store::EntityStore;

/// Split borrow of the context state a sync step needs.
pub(crate) struct SyncEngine<'a, D: Directory> {
    pub(crate) directory: &'a mut D,
    pub(crate) store: &'a mut EntityStore,
    pub(crate) dispatcher: &'a mut Dispatcher,
    pub(crate) root: &'a ObjectPath,
}

impl<D: Directory> SyncEngine<'_, D> {
    // ── Entry points ─────────────────────────────────────────────────

    /// Apply a full enumeration. Owners are created before the entities
    /// they own whatever order the directory listed them in.
    pub(crate) fn apply_enumeration(&mut self, mut objects: Vec<ManagedObject>) {
        objects.sort_by_key(|object| {
            EntityKind::from_interface(&object.interface).map_or(u8::MAX, EntityKind::rank)
        });
        debug!(objects = objects.len(), "applying enumeration");
        for object in objects {
            self.object_added(object);
        }
    }

    pub(crate) fn apply_event(&mut self, event: DirectoryEvent) {
        match event {
            DirectoryEvent::Added(object) => self.object_added(object),
            DirectoryEvent::Removed { path, interfaces } => self.object_removed(&path, &interfaces),
            DirectoryEvent::PropertyChanged {
                path,
                interface,
                name,
                value,
            } => self.property_changed(&path, &interface, &name, &value),
        }
    }

    /// Remove every adapter, newest first, with full lost reporting.
    pub(crate) fn teardown(&mut self) {
        let adapters = self.store.adapters.list();
        for adapter in adapters.iter().rev() {
            self.remove_adapter(adapter);
        }
    }

    // ── Creation ─────────────────────────────────────────────────────

    fn object_added(&mut self, object: ManagedObject) {
        if !object.path.is_descendant_of(self.root) {
            trace!(path = %object.path, root = %self.root, "object outside root ignored");
            return;
        }
        let Some(kind) = EntityKind::from_interface(&object.interface) else {
            trace!(path = %object.path, interface = %object.interface, "uncached interface");
            return;
        };

        let path = object.path.clone();
        let result = match kind {
            EntityKind::Adapter => self.create_adapter(object),
            EntityKind::Tag => self.create_tag(object),
            EntityKind::Device => self.create_device(object),
            EntityKind::Record => self.create_record(object),
        };

        match result {
            Ok(()) => {}
            Err(CoreError::AlreadyExists { .. }) => {
                debug!(path = %path, %kind, "already cached, announcement ignored");
            }
            Err(e) => warn!(path = %path, %kind, error = %e, "object not cached"),
        }
    }

    /// Properties from the announcement, or a blocking read when it
    /// carried none.
    fn properties(&mut self, object: ManagedObject) -> Result<PropertyBag, CoreError> {
        if !object.properties.is_empty() {
            return Ok(object.properties);
        }
        debug!(path = %object.path, interface = %object.interface, "reading properties");
        self.directory
            .read_properties(&object.path, &object.interface)
            .map_err(CoreError::from)
    }

    fn create_adapter(&mut self, object: ManagedObject) -> Result<(), CoreError> {
        let path = AdapterPath::from(object.path.clone());
        if self.store.adapters.contains(&path) {
            return Err(CoreError::AlreadyExists {
                path: path.to_string(),
            });
        }
        let bag = self.properties(object)?;
        self.store
            .insert_adapter(Adapter::from_properties(path.clone(), &bag)?)?;
        self.dispatcher.adapter_added(self.store, &path);
        Ok(())
    }

    fn create_tag(&mut self, object: ManagedObject) -> Result<(), CoreError> {
        let path = TagPath::from(object.path.clone());
        if self.store.tags.contains(&path) {
            return Err(CoreError::AlreadyExists {
                path: path.to_string(),
            });
        }
        let adapter = self.owning_adapter(&object.path)?;
        let bag = self.properties(object)?;
        self.store
            .insert_tag(Tag::from_properties(path.clone(), adapter, &bag)?)?;
        self.dispatcher.tag_present(self.store, &path);
        Ok(())
    }

    fn create_device(&mut self, object: ManagedObject) -> Result<(), CoreError> {
        let path = DevicePath::from(object.path.clone());
        if self.store.devices.contains(&path) {
            return Err(CoreError::AlreadyExists {
                path: path.to_string(),
            });
        }
        let adapter = self.owning_adapter(&object.path)?;
        let bag = self.properties(object)?;
        self.store
            .insert_device(Device::from_properties(path.clone(), adapter, &bag))?;
        self.dispatcher.device_present(self.store, &path);
        Ok(())
    }

    fn create_record(&mut self, object: ManagedObject) -> Result<(), CoreError> {
        let path = RecordPath::from(object.path.clone());
        if self.store.records.contains(&path) {
            return Err(CoreError::AlreadyExists {
                path: path.to_string(),
            });
        }
        let owner = self
            .store
            .resolve_record_owner(&object.path)
            .ok_or_else(|| CoreError::NoTag {
                path: parent_or_self(&object.path),
            })?;
        let bag = self.properties(object)?;
        self.store
            .insert_record(Record::from_properties(path, owner.clone(), &bag)?)?;
        // Through the owner, so an unreported tag or device goes first.
        match owner {
            RecordOwner::Tag(tag) => self.dispatcher.tag_present(self.store, &tag),
            RecordOwner::Device(device) => self.dispatcher.device_present(self.store, &device),
        }
        Ok(())
    }

    fn owning_adapter(&self, path: &ObjectPath) -> Result<AdapterPath, CoreError> {
        self.store
            .resolve_adapter(path)
            .ok_or_else(|| CoreError::NoAdapter {
                path: parent_or_self(path),
            })
    }

    // ── Removal ──────────────────────────────────────────────────────

    fn object_removed(&mut self, path: &ObjectPath, interfaces: &[Interface]) {
        let kinds: Vec<EntityKind> = if interfaces.is_empty() {
            self.store.kind_of(path).into_iter().collect()
        } else {
            interfaces.iter().filter_map(EntityKind::from_interface).collect()
        };

        let mut removed = false;
        for kind in kinds {
            removed |= match kind {
                EntityKind::Adapter => self.remove_adapter(&AdapterPath::from(path.clone())),
                EntityKind::Tag => self.remove_tag(&TagPath::from(path.clone())),
                EntityKind::Device => self.remove_device(&DevicePath::from(path.clone())),
                EntityKind::Record => self.remove_record(&RecordPath::from(path.clone())),
            };
        }
        if !removed {
            debug!(path = %path, "removal of uncached object ignored");
        }
    }

    fn remove_adapter(&mut self, path: &AdapterPath) -> bool {
        let Some(adapter) = self.store.adapters.get(path) else {
            return false;
        };
        let children = adapter.children.clone();
        for child in children.iter().rev() {
            match child {
                AdapterChild::Tag(tag) => self.remove_tag(tag),
                AdapterChild::Device(device) => self.remove_device(device),
            };
        }
        self.dispatcher.adapter_removed(path);
        self.store.evict_adapter(path);
        true
    }

    fn remove_tag(&mut self, path: &TagPath) -> bool {
        let Some(tag) = self.store.tags.get(path) else {
            return false;
        };
        let records = tag.records.clone();
        for record in records.iter().rev() {
            self.remove_record(record);
        }
        self.dispatcher.tag_lost(path);
        self.store.evict_tag(path);
        true
    }

    fn remove_device(&mut self, path: &DevicePath) -> bool {
        let Some(device) = self.store.devices.get(path) else {
            return false;
        };
        let records = device.records.clone();
        for record in records.iter().rev() {
            self.remove_record(record);
        }
        self.dispatcher.device_lost(path);
        self.store.evict_device(path);
        true
    }

    /// Records have no lost callback; they leave silently.
    fn remove_record(&mut self, path: &RecordPath) -> bool {
        let removed = self.store.evict_record(path).is_some();
        if removed {
            debug!(record = %path, "record removed");
        }
        removed
    }

    // ── Property changes ─────────────────────────────────────────────

    fn property_changed(
        &mut self,
        path: &ObjectPath,
        interface: &Interface,
        name: &str,
        value: &PropertyValue,
    ) {
        let result = match interface {
            Interface::Adapter => {
                let adapter_path = AdapterPath::from(path.clone());
                let Some(adapter) = self.store.adapters.get_mut(&adapter_path) else {
                    debug!(path = %path, property = name, "change for uncached adapter");
                    return;
                };
                adapter.apply_property(name, value).map(|decoded| {
                    self.dispatcher
                        .adapter_property_changed(&adapter_path, name, &decoded);
                })
            }
            Interface::Tag => match self.store.tags.get_mut(&TagPath::from(path.clone())) {
                Some(tag) => tag.apply_property(name, value),
                None => Ok(()),
            },
            Interface::Record => match self.store.records.get_mut(&RecordPath::from(path.clone())) {
                Some(record) => record.apply_property(name, value),
                None => Ok(()),
            },
            _ => {
                trace!(path = %path, interface = %interface, property = name, "uncached change");
                Ok(())
            }
        };

        if let Err(e) = result {
            warn!(path = %path, property = name, error = %e, "property change not applied");
        }
    }
}

fn parent_or_self(path: &ObjectPath) -> String {
    path.parent().unwrap_or_else(|| path.clone()).into_string()
}
