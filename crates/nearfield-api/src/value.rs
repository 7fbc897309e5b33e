// ── Property values ──
//
// The subset of the bus type system the daemon uses for object
// properties and method arguments.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::Error;
use crate::path::ObjectPath;

/// Property name -> value, in the order the daemon sent them.
pub type PropertyBag = IndexMap<String, PropertyValue>;

/// A single property or argument value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Byte(u8),
    U32(u32),
    String(String),
    StringList(Vec<String>),
    Bytes(Vec<u8>),
    ObjectPath(ObjectPath),
    ObjectPathList(Vec<ObjectPath>),
    Dict(PropertyBag),
}

impl PropertyValue {
    /// Short type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Byte(_) => "byte",
            Self::U32(_) => "u32",
            Self::String(_) => "string",
            Self::StringList(_) => "string list",
            Self::Bytes(_) => "byte array",
            Self::ObjectPath(_) => "object path",
            Self::ObjectPathList(_) => "object path list",
            Self::Dict(_) => "dictionary",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::U32(n) => Some(*n),
            Self::Byte(b) => Some(u32::from(*b)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::ObjectPath(p) => Some(p.as_str()),
            _ => None,
        }
    }

    pub fn as_string_list(&self) -> Option<&[String]> {
        match self {
            Self::StringList(list) => Some(list),
            _ => None,
        }
    }

    /// Byte arrays; a lone byte is accepted as a one-element array.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            Self::Byte(b) => Some(std::slice::from_ref(b)),
            _ => None,
        }
    }

    /// Typed extraction helpers that produce a [`Error::TypeMismatch`]
    /// naming the property on failure.
    pub fn expect_bool(&self, name: &str) -> Result<bool, Error> {
        self.as_bool().ok_or_else(|| self.mismatch(name, "bool"))
    }

    pub fn expect_u32(&self, name: &str) -> Result<u32, Error> {
        self.as_u32().ok_or_else(|| self.mismatch(name, "u32"))
    }

    pub fn expect_str(&self, name: &str) -> Result<&str, Error> {
        self.as_str().ok_or_else(|| self.mismatch(name, "string"))
    }

    pub fn expect_string_list(&self, name: &str) -> Result<&[String], Error> {
        self.as_string_list()
            .ok_or_else(|| self.mismatch(name, "string list"))
    }

    pub fn expect_bytes(&self, name: &str) -> Result<&[u8], Error> {
        self.as_bytes().ok_or_else(|| self.mismatch(name, "byte array"))
    }

    fn mismatch(&self, name: &str, expected: &'static str) -> Error {
        Error::TypeMismatch {
            name: name.to_owned(),
            expected,
            found: self.type_name(),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<u32> for PropertyValue {
    fn from(n: u32) -> Self {
        Self::U32(n)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(list: Vec<String>) -> Self {
        Self::StringList(list)
    }
}

impl From<Vec<u8>> for PropertyValue {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<ObjectPath> for PropertyValue {
    fn from(path: ObjectPath) -> Self {
        Self::ObjectPath(path)
    }
}

impl From<PropertyBag> for PropertyValue {
    fn from(dict: PropertyBag) -> Self {
        Self::Dict(dict)
    }
}

/// Build a [`PropertyBag`] from `name => value` pairs.
///
/// ```
/// use nearfield_api::props;
///
/// let bag = props! { "Powered" => false, "Mode" => "Idle" };
/// assert_eq!(bag.len(), 2);
/// ```
#[macro_export]
macro_rules! props {
    () => { $crate::PropertyBag::new() };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut bag = $crate::PropertyBag::new();
        $( bag.insert(::std::string::String::from($name), $crate::PropertyValue::from($value)); )+
        bag
    }};
}
