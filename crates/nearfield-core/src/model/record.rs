// ── Record domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use nearfield_api::{PropertyBag, PropertyValue};

use super::Notified;
use super::path::{RecordOwner, RecordPath};
use crate::convert::record_key;
use crate::error::CoreError;

/// Record kinds the daemon understands, in its own spelling.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
pub enum RecordType {
    Text,
    #[strum(serialize = "URI")]
    #[serde(rename = "URI")]
    Uri,
    SmartPoster,
    #[strum(serialize = "MIME")]
    #[serde(rename = "MIME")]
    MimeType,
    HandoverRequest,
    HandoverSelect,
    HandoverCarrier,
    #[strum(serialize = "AAR")]
    #[serde(rename = "AAR")]
    Aar,
    Unknown,
}

impl RecordType {
    pub fn is_handover(self) -> bool {
        matches!(
            self,
            Self::HandoverRequest | Self::HandoverSelect | Self::HandoverCarrier
        )
    }
}

/// The field set of a record.
///
/// Used both for what the cache learned about a record and as the
/// argument of a write or push. Every field is optional; which ones are
/// meaningful depends on [`RecordType`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordFields {
    pub record_type: Option<String>,
    pub encoding: Option<String>,
    pub language: Option<String>,
    pub representation: Option<String>,
    pub uri: Option<String>,
    /// Size of the object the URI points at, when the daemon knows it.
    pub uri_object_size: Option<u32>,
    pub mime_type: Option<String>,
    pub action: Option<String>,
    pub carrier: Option<String>,
    pub ssid: Option<String>,
    pub passphrase: Option<String>,
    pub encryption: Option<String>,
    pub authentication: Option<String>,
}

impl RecordFields {
    /// A text record.
    pub fn text(
        language: impl Into<String>,
        encoding: impl Into<String>,
        representation: impl Into<String>,
    ) -> Self {
        Self {
            record_type: Some(RecordType::Text.to_string()),
            language: Some(language.into()),
            encoding: Some(encoding.into()),
            representation: Some(representation.into()),
            ..Self::default()
        }
    }

    pub fn uri(uri: impl Into<String>) -> Self {
        Self {
            record_type: Some(RecordType::Uri.to_string()),
            uri: Some(uri.into()),
            ..Self::default()
        }
    }

    pub fn smart_poster(uri: impl Into<String>, representation: impl Into<String>) -> Self {
        Self {
            record_type: Some(RecordType::SmartPoster.to_string()),
            uri: Some(uri.into()),
            representation: Some(representation.into()),
            ..Self::default()
        }
    }

    pub fn mime(mime_type: impl Into<String>) -> Self {
        Self {
            record_type: Some(RecordType::MimeType.to_string()),
            mime_type: Some(mime_type.into()),
            ..Self::default()
        }
    }

    /// A handover record of the given kind for one carrier
    /// (`"bluetooth"`, `"wifi"`).
    pub fn handover(kind: RecordType, carrier: impl Into<String>) -> Self {
        Self {
            record_type: Some(kind.to_string()),
            carrier: Some(carrier.into()),
            ..Self::default()
        }
    }

    /// Parsed record type. `None` when no type is set.
    pub fn kind(&self) -> Option<RecordType> {
        self.record_type
            .as_deref()
            .map(|t| t.parse().unwrap_or(RecordType::Unknown))
    }

    /// Check the fields are enough for the daemon to build a record.
    pub fn validate(&self) -> Result<(), CoreError> {
        let kind = self
            .kind()
            .ok_or_else(|| CoreError::invalid_parameter("record type is required"))?;

        let missing = match kind {
            RecordType::Unknown => {
                return Err(CoreError::invalid_parameter(format!(
                    "unsupported record type {}",
                    self.record_type.as_deref().unwrap_or_default()
                )));
            }
            RecordType::Text if !present(self.representation.as_ref()) => {
                Some(record_key::REPRESENTATION)
            }
            RecordType::Uri | RecordType::SmartPoster if !present(self.uri.as_ref()) => {
                Some(record_key::URI)
            }
            RecordType::MimeType if !present(self.mime_type.as_ref()) => {
                Some(record_key::MIME_TYPE)
            }
            k if k.is_handover() && !present(self.carrier.as_ref()) => Some(record_key::CARRIER),
            _ => None,
        };

        match missing {
            Some(field) => Err(CoreError::invalid_parameter(format!(
                "{kind} record requires {field}"
            ))),
            None => Ok(()),
        }
    }

    /// Dictionary argument for the daemon's write and push calls.
    pub fn to_property_bag(&self) -> PropertyBag {
        let mut bag = PropertyBag::new();
        let strings = [
            (record_key::TYPE, &self.record_type),
            (record_key::ENCODING, &self.encoding),
            (record_key::LANGUAGE, &self.language),
            (record_key::REPRESENTATION, &self.representation),
            (record_key::URI, &self.uri),
            (record_key::MIME_TYPE, &self.mime_type),
            (record_key::ACTION, &self.action),
            (record_key::CARRIER, &self.carrier),
            (record_key::SSID, &self.ssid),
            (record_key::PASSPHRASE, &self.passphrase),
            (record_key::ENCRYPTION, &self.encryption),
            (record_key::AUTHENTICATION, &self.authentication),
        ];
        for (key, value) in strings {
            if let Some(value) = value {
                bag.insert(key.to_owned(), PropertyValue::from(value.as_str()));
            }
        }
        if let Some(size) = self.uri_object_size {
            bag.insert(record_key::SIZE.to_owned(), PropertyValue::U32(size));
        }
        bag
    }
}

fn present(field: Option<&String>) -> bool {
    field.is_some_and(|s| !s.is_empty())
}

/// One unit of NDEF data carried by a tag or device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub(crate) path: RecordPath,
    pub(crate) owner: RecordOwner,
    pub(crate) fields: RecordFields,
    pub(crate) notified: Notified,
}

impl Record {
    pub(crate) fn new(path: RecordPath, owner: RecordOwner) -> Self {
        Self {
            path,
            owner,
            fields: RecordFields::default(),
            notified: Notified::default(),
        }
    }

    pub fn path(&self) -> &RecordPath {
        &self.path
    }

    pub fn owner(&self) -> &RecordOwner {
        &self.owner
    }

    pub fn fields(&self) -> &RecordFields {
        &self.fields
    }

    pub fn is_notified(&self) -> bool {
        self.notified.get()
    }
}
