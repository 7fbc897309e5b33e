// ── Directory contract ──
//
// The daemon's object-manager surface, reduced to what a client cache
// needs: a one-shot enumeration, an ordered event stream, blocking
// property reads, and blocking method calls. The wire transport lives
// behind this trait.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::error::Error;
use crate::interface::Interface;
use crate::path::ObjectPath;
use crate::value::{PropertyBag, PropertyValue};

/// One interface of one remote object, with whatever properties the
/// daemon sent alongside it. An empty bag means "ask me".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedObject {
    pub path: ObjectPath,
    pub interface: Interface,
    pub properties: PropertyBag,
}

impl ManagedObject {
    pub fn new(path: impl Into<ObjectPath>, interface: Interface, properties: PropertyBag) -> Self {
        Self {
            path: path.into(),
            interface,
            properties,
        }
    }
}

/// Incremental change announced by the daemon, delivered in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryEvent {
    Added(ManagedObject),
    Removed {
        path: ObjectPath,
        interfaces: Vec<Interface>,
    },
    PropertyChanged {
        path: ObjectPath,
        interface: Interface,
        name: String,
        value: PropertyValue,
    },
}

impl DirectoryEvent {
    pub fn path(&self) -> &ObjectPath {
        match self {
            Self::Added(object) => &object.path,
            Self::Removed { path, .. } | Self::PropertyChanged { path, .. } => path,
        }
    }
}

/// A blocking method call on a remote object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    pub path: ObjectPath,
    pub interface: Interface,
    pub method: &'static str,
    pub args: Vec<PropertyValue>,
    /// `None` waits for as long as the transport's default allows.
    pub timeout: Option<Duration>,
}

impl MethodCall {
    pub fn new(path: ObjectPath, interface: Interface, method: &'static str) -> Self {
        Self {
            path,
            interface,
            method,
            args: Vec::new(),
            timeout: None,
        }
    }

    pub fn arg(mut self, value: impl Into<PropertyValue>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// The remote directory as seen by the client cache.
///
/// Every method blocks the caller until the daemon answers. Calls are
/// never retried by the implementation.
pub trait Directory {
    /// Start signal delivery. Events arrive on the returned receiver in
    /// the order the daemon emitted them.
    fn subscribe(&mut self) -> Result<mpsc::UnboundedReceiver<DirectoryEvent>, Error>;

    /// Full snapshot of every managed object.
    fn enumerate(&mut self) -> Result<Vec<ManagedObject>, Error>;

    /// All properties of one interface of one object.
    fn read_properties(
        &mut self,
        path: &ObjectPath,
        interface: &Interface,
    ) -> Result<PropertyBag, Error>;

    /// Invoke a method and wait for its (empty) reply.
    fn invoke(&mut self, call: MethodCall) -> Result<(), Error>;
}

impl<D: Directory + ?Sized> Directory for Box<D> {
    fn subscribe(&mut self) -> Result<mpsc::UnboundedReceiver<DirectoryEvent>, Error> {
        (**self).subscribe()
    }

    fn enumerate(&mut self) -> Result<Vec<ManagedObject>, Error> {
        (**self).enumerate()
    }

    fn read_properties(
        &mut self,
        path: &ObjectPath,
        interface: &Interface,
    ) -> Result<PropertyBag, Error> {
        (**self).read_properties(path, interface)
    }

    fn invoke(&mut self, call: MethodCall) -> Result<(), Error> {
        (**self).invoke(call)
    }
}
