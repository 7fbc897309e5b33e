//! In-process [`Directory`] backed by a plain object table.
//!
//! Stands in for the daemon in tests and offline tooling: seed objects,
//! announce/retract them (emitting the matching events), change
//! properties, inject failures, and inspect every call the client made.
//!
//! ```
//! use nearfield_api::memory::MemoryDirectory;
//! use nearfield_api::{props, Directory, Interface};
//!
//! let mut dir = MemoryDirectory::new().with_object(
//!     "/org/neard/nfc0",
//!     Interface::Adapter,
//!     props! { "Powered" => false },
//! );
//! assert_eq!(dir.enumerate().unwrap().len(), 1);
//! ```

use std::collections::HashMap;

use indexmap::IndexMap;
use tokio::sync::mpsc;
use tracing::trace;

use crate::directory::{Directory, DirectoryEvent, ManagedObject, MethodCall};
use crate::error::Error;
use crate::interface::{Interface, method};
use crate::path::ObjectPath;
use crate::value::{PropertyBag, PropertyValue};

pub struct MemoryDirectory {
    objects: IndexMap<ObjectPath, IndexMap<Interface, PropertyBag>>,
    events_tx: Option<mpsc::UnboundedSender<DirectoryEvent>>,
    events_rx: Option<mpsc::UnboundedReceiver<DirectoryEvent>>,
    calls: Vec<MethodCall>,
    reads: Vec<ObjectPath>,
    read_failures: HashMap<ObjectPath, Error>,
    method_failures: HashMap<&'static str, Error>,
    enumerate_failure: Option<Error>,
    subscribe_failure: Option<Error>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            objects: IndexMap::new(),
            events_tx: Some(tx),
            events_rx: Some(rx),
            calls: Vec::new(),
            reads: Vec::new(),
            read_failures: HashMap::new(),
            method_failures: HashMap::new(),
            enumerate_failure: None,
            subscribe_failure: None,
        }
    }

    // ── Seeding (no events) ──────────────────────────────────────────

    /// Builder form of [`insert_object`](Self::insert_object).
    pub fn with_object(
        mut self,
        path: impl Into<ObjectPath>,
        interface: Interface,
        properties: PropertyBag,
    ) -> Self {
        self.insert_object(path, interface, properties);
        self
    }

    /// Register an object silently; it shows up in the next enumeration.
    pub fn insert_object(
        &mut self,
        path: impl Into<ObjectPath>,
        interface: Interface,
        properties: PropertyBag,
    ) {
        self.objects
            .entry(path.into())
            .or_default()
            .insert(interface, properties);
    }

    // ── Scripted daemon behaviour (emits events) ─────────────────────

    /// Register an object and announce it with its properties attached.
    pub fn announce(
        &mut self,
        path: impl Into<ObjectPath>,
        interface: Interface,
        properties: PropertyBag,
    ) {
        let path = path.into();
        self.insert_object(path.clone(), interface.clone(), properties.clone());
        self.emit(DirectoryEvent::Added(ManagedObject {
            path,
            interface,
            properties,
        }));
    }

    /// Register an object but announce it without properties, so the
    /// client has to read them back.
    pub fn announce_bare(
        &mut self,
        path: impl Into<ObjectPath>,
        interface: Interface,
        properties: PropertyBag,
    ) {
        let path = path.into();
        self.insert_object(path.clone(), interface.clone(), properties);
        self.emit(DirectoryEvent::Added(ManagedObject {
            path,
            interface,
            properties: PropertyBag::new(),
        }));
    }

    /// Drop an object with all its interfaces and announce the removal.
    pub fn retract(&mut self, path: impl Into<ObjectPath>) {
        let path = path.into();
        let interfaces = self
            .objects
            .shift_remove(&path)
            .map(|ifaces| ifaces.into_keys().collect())
            .unwrap_or_default();
        self.emit(DirectoryEvent::Removed { path, interfaces });
    }

    /// Update a stored property and announce the change.
    pub fn change_property(
        &mut self,
        path: impl Into<ObjectPath>,
        interface: Interface,
        name: &str,
        value: impl Into<PropertyValue>,
    ) {
        let path = path.into();
        let value = value.into();
        if let Some(bag) = self
            .objects
            .get_mut(&path)
            .and_then(|ifaces| ifaces.get_mut(&interface))
        {
            bag.insert(name.to_owned(), value.clone());
        }
        self.emit(DirectoryEvent::PropertyChanged {
            path,
            interface,
            name: name.to_owned(),
            value,
        });
    }

    /// Push an arbitrary event, bypassing the object table.
    pub fn emit(&mut self, event: DirectoryEvent) {
        trace!(path = %event.path(), "memory directory event");
        if let Some(tx) = &self.events_tx {
            // Nobody listening is not an error for the daemon either.
            let _ = tx.send(event);
        }
    }

    /// Close the event stream once the queued events are consumed.
    pub fn close_events(&mut self) {
        self.events_tx = None;
    }

    // ── Failure injection ────────────────────────────────────────────

    pub fn fail_reads_for(&mut self, path: impl Into<ObjectPath>, error: Error) {
        self.read_failures.insert(path.into(), error);
    }

    /// Every call to `method` fails with `error` until cleared.
    pub fn fail_method(&mut self, method: &'static str, error: Error) {
        self.method_failures.insert(method, error);
    }

    pub fn fail_enumerate(&mut self, error: Error) {
        self.enumerate_failure = Some(error);
    }

    pub fn fail_subscribe(&mut self, error: Error) {
        self.subscribe_failure = Some(error);
    }

    pub fn clear_failures(&mut self) {
        self.read_failures.clear();
        self.method_failures.clear();
        self.enumerate_failure = None;
        self.subscribe_failure = None;
    }

    // ── Inspection ───────────────────────────────────────────────────

    /// Every method call received so far, in order.
    pub fn calls(&self) -> &[MethodCall] {
        &self.calls
    }

    /// Every path whose properties were read back, in order.
    pub fn reads(&self) -> &[ObjectPath] {
        &self.reads
    }

    pub fn property(&self, path: &str, interface: &Interface, name: &str) -> Option<&PropertyValue> {
        self.objects
            .get(&ObjectPath::from(path))
            .and_then(|ifaces| ifaces.get(interface))
            .and_then(|bag| bag.get(name))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects.contains_key(&ObjectPath::from(path))
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Mirror what the daemon does for the calls that change state.
    fn apply(&mut self, call: &MethodCall) -> Result<(), Error> {
        match (&call.interface, call.method) {
            (Interface::Properties, method::SET) => {
                let [iface, name, value] = call.args.as_slice() else {
                    return Err(invalid_args(call));
                };
                let (Some(iface), Some(name)) = (iface.as_str(), name.as_str()) else {
                    return Err(invalid_args(call));
                };
                let (iface, name) = (Interface::from(iface), name.to_owned());
                self.change_property(call.path.clone(), iface, &name, value.clone());
            }
            (Interface::Adapter, method::START_POLL_LOOP) => {
                self.change_property(call.path.clone(), Interface::Adapter, "Polling", true);
            }
            (Interface::Adapter, method::STOP_POLL_LOOP) => {
                self.change_property(call.path.clone(), Interface::Adapter, "Polling", false);
            }
            _ => {}
        }
        Ok(())
    }
}

impl Default for MemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl Directory for MemoryDirectory {
    fn subscribe(&mut self) -> Result<mpsc::UnboundedReceiver<DirectoryEvent>, Error> {
        if let Some(err) = &self.subscribe_failure {
            return Err(err.clone());
        }
        self.events_rx.take().ok_or_else(|| Error::ProxyCreation {
            path: "/".into(),
            interface: Interface::Manager.to_string(),
            reason: "event stream already taken".into(),
        })
    }

    fn enumerate(&mut self) -> Result<Vec<ManagedObject>, Error> {
        if let Some(err) = &self.enumerate_failure {
            return Err(err.clone());
        }
        Ok(self
            .objects
            .iter()
            .flat_map(|(path, ifaces)| {
                ifaces.iter().map(move |(interface, properties)| ManagedObject {
                    path: path.clone(),
                    interface: interface.clone(),
                    properties: properties.clone(),
                })
            })
            .collect())
    }

    fn read_properties(
        &mut self,
        path: &ObjectPath,
        interface: &Interface,
    ) -> Result<PropertyBag, Error> {
        self.reads.push(path.clone());
        if let Some(err) = self.read_failures.get(path) {
            return Err(err.clone());
        }
        self.objects
            .get(path)
            .and_then(|ifaces| ifaces.get(interface))
            .cloned()
            .ok_or_else(|| Error::NoSuchObject {
                path: path.to_string(),
            })
    }

    fn invoke(&mut self, call: MethodCall) -> Result<(), Error> {
        trace!(path = %call.path, method = call.method, "memory directory call");
        self.calls.push(call.clone());
        if let Some(err) = self.method_failures.get(call.method) {
            return Err(err.clone());
        }
        if !self.objects.contains_key(&call.path) {
            return Err(Error::NoSuchObject {
                path: call.path.to_string(),
            });
        }
        self.apply(&call)
    }
}

fn invalid_args(call: &MethodCall) -> Error {
    Error::MethodCall {
        method: call.method.to_owned(),
        name: "org.freedesktop.DBus.Error.InvalidArgs".into(),
        message: format!("unexpected arguments: {:?}", call.args),
    }
}
