//! Directory contract for the neard NFC daemon.
//!
//! This crate describes the remote side as the client cache sees it:
//!
//! - **[`ObjectPath`]** and the pure path helpers [`is_descendant`] /
//!   [`parent_of`] that resolve ownership between objects.
//! - **[`PropertyValue`] / [`PropertyBag`]**: the property types the
//!   daemon exposes.
//! - **[`Directory`]**: enumeration, ordered [`DirectoryEvent`]s, and the
//!   blocking property-read and method-call surface. A bus transport
//!   implements it; [`memory::MemoryDirectory`] implements it in-process.
//! - **[`Error`]**: transport-level failures, mapped to user-facing kinds
//!   by `nearfield-core`.

pub mod directory;
pub mod error;
pub mod interface;
pub mod memory;
pub mod path;
pub mod value;

pub use directory::{Directory, DirectoryEvent, ManagedObject, MethodCall};
pub use error::Error;
pub use interface::{Interface, error_name, method};
pub use path::{ObjectPath, is_descendant, parent_of};
pub use value::{PropertyBag, PropertyValue};
