// ── Property-bag to domain conversions ──
//
// Bridges the daemon's untyped property bags into the cached domain types.
// Population at creation and later property-changed events go through the
// same per-property routines, so a value is decoded the same way whichever
// path delivered it. A value of the wrong type fails with `InvalidRecord`
// naming the entity; names the cache does not know are skipped.

use std::fmt;

use tracing::trace;

use nearfield_api::{PropertyBag, PropertyValue};

use crate::error::CoreError;
use crate::model::{
    Adapter, AdapterMode, AdapterPath, AdapterProperty, Device, DevicePath, Record, RecordFields,
    RecordOwner, RecordPath, Tag, TagPath,
};

// ── Wire property names ─────────────────────────────────────────────

pub(crate) mod adapter_key {
    pub const MODE: &str = "Mode";
    pub const POLLING: &str = "Polling";
    pub const POWERED: &str = "Powered";
    pub const PROTOCOLS: &str = "Protocols";
}

pub(crate) mod tag_key {
    pub const TYPE: &str = "Type";
    pub const PROTOCOL: &str = "Protocol";
    pub const READ_ONLY: &str = "ReadOnly";
    pub const ISO14443A_ATQA: &str = "Iso14443aAtqa";
    pub const ISO14443A_SAK: &str = "Iso14443aSak";
    pub const ISO14443A_UID: &str = "Iso14443aUid";
    pub const FELICA_MANUFACTURER: &str = "FelicaManufacturer";
    pub const FELICA_CI_CODE: &str = "FelicaCiCode";
    pub const FELICA_IC: &str = "FelicaIc";
    pub const FELICA_MAX_RESP_TIMES: &str = "FelicaMaxRespTimes";
}

pub(crate) mod record_key {
    pub const TYPE: &str = "Type";
    pub const ENCODING: &str = "Encoding";
    pub const LANGUAGE: &str = "Language";
    pub const REPRESENTATION: &str = "Representation";
    pub const URI: &str = "URI";
    pub const SIZE: &str = "Size";
    pub const MIME_TYPE: &str = "MIMEType";
    pub const ACTION: &str = "Action";
    pub const CARRIER: &str = "Carrier";
    pub const SSID: &str = "SSID";
    pub const PASSPHRASE: &str = "Passphrase";
    pub const ENCRYPTION: &str = "Encryption";
    pub const AUTHENTICATION: &str = "Authentication";
}

// ── Helpers ────────────────────────────────────────────────────────

fn invalid(path: &impl fmt::Display, err: &nearfield_api::Error) -> CoreError {
    CoreError::InvalidRecord {
        path: path.to_string(),
        message: err.to_string(),
    }
}

fn owned_str(path: &impl fmt::Display, name: &str, value: &PropertyValue) -> Result<String, CoreError> {
    value
        .expect_str(name)
        .map(str::to_owned)
        .map_err(|e| invalid(path, &e))
}

fn owned_bytes(
    path: &impl fmt::Display,
    name: &str,
    value: &PropertyValue,
) -> Result<Vec<u8>, CoreError> {
    value
        .expect_bytes(name)
        .map(<[u8]>::to_vec)
        .map_err(|e| invalid(path, &e))
}

// ── Adapter ────────────────────────────────────────────────────────

impl Adapter {
    pub(crate) fn from_properties(path: AdapterPath, bag: &PropertyBag) -> Result<Self, CoreError> {
        let mut adapter = Adapter::new(path);
        for (name, value) in bag {
            adapter.apply_property(name, value)?;
        }
        Ok(adapter)
    }

    /// Update one cached property and return its decoded form.
    pub(crate) fn apply_property(
        &mut self,
        name: &str,
        value: &PropertyValue,
    ) -> Result<AdapterProperty, CoreError> {
        let decoded = match name {
            adapter_key::MODE => {
                let raw = value.expect_str(name).map_err(|e| invalid(&self.path, &e))?;
                let mode: AdapterMode = raw.parse().map_err(|_| CoreError::InvalidRecord {
                    path: self.path.to_string(),
                    message: format!("unknown adapter mode {raw:?}"),
                })?;
                self.mode = mode;
                AdapterProperty::Mode(mode)
            }
            adapter_key::POLLING => {
                self.polling = value.expect_bool(name).map_err(|e| invalid(&self.path, &e))?;
                AdapterProperty::Polling(self.polling)
            }
            adapter_key::POWERED => {
                self.powered = value.expect_bool(name).map_err(|e| invalid(&self.path, &e))?;
                AdapterProperty::Powered(self.powered)
            }
            adapter_key::PROTOCOLS => {
                let protocols = value
                    .expect_string_list(name)
                    .map_err(|e| invalid(&self.path, &e))?
                    .to_vec();
                self.protocols.clone_from(&protocols);
                AdapterProperty::Protocols(protocols)
            }
            _ => {
                trace!(adapter = %self.path, property = name, "uncached adapter property");
                AdapterProperty::Other(value.clone())
            }
        };
        Ok(decoded)
    }
}

// ── Tag ────────────────────────────────────────────────────────────

impl Tag {
    pub(crate) fn from_properties(
        path: TagPath,
        adapter: AdapterPath,
        bag: &PropertyBag,
    ) -> Result<Self, CoreError> {
        let mut tag = Tag::new(path, adapter);
        for (name, value) in bag {
            tag.apply_property(name, value)?;
        }
        Ok(tag)
    }

    pub(crate) fn apply_property(&mut self, name: &str, value: &PropertyValue) -> Result<(), CoreError> {
        match name {
            tag_key::TYPE => self.tag_type = Some(owned_str(&self.path, name, value)?),
            tag_key::PROTOCOL => self.protocol = Some(owned_str(&self.path, name, value)?),
            tag_key::READ_ONLY => {
                self.read_only = value.expect_bool(name).map_err(|e| invalid(&self.path, &e))?;
            }
            _ => {
                let slot = match name {
                    tag_key::ISO14443A_ATQA => &mut self.iso14443a_atqa,
                    tag_key::ISO14443A_SAK => &mut self.iso14443a_sak,
                    tag_key::ISO14443A_UID => &mut self.iso14443a_uid,
                    tag_key::FELICA_MANUFACTURER => &mut self.felica_manufacturer,
                    tag_key::FELICA_CI_CODE => &mut self.felica_ci_code,
                    tag_key::FELICA_IC => &mut self.felica_ic,
                    tag_key::FELICA_MAX_RESP_TIMES => &mut self.felica_max_resp_times,
                    _ => {
                        trace!(tag = %self.path, property = name, "uncached tag property");
                        return Ok(());
                    }
                };
                *slot = Some(owned_bytes(&self.path, name, value)?);
            }
        }
        Ok(())
    }
}

// ── Device ─────────────────────────────────────────────────────────

impl Device {
    /// Devices carry nothing the cache keeps beyond their position in the
    /// hierarchy.
    pub(crate) fn from_properties(path: DevicePath, adapter: AdapterPath, bag: &PropertyBag) -> Self {
        for name in bag.keys() {
            trace!(device = %path, property = %name, "uncached device property");
        }
        Device::new(path, adapter)
    }
}

// ── Record ─────────────────────────────────────────────────────────

impl Record {
    /// A record bag must at least name the record type.
    pub(crate) fn from_properties(
        path: RecordPath,
        owner: RecordOwner,
        bag: &PropertyBag,
    ) -> Result<Self, CoreError> {
        if !bag.contains_key(record_key::TYPE) {
            return Err(CoreError::InvalidRecord {
                path: path.to_string(),
                message: format!("missing {} property", record_key::TYPE),
            });
        }
        let mut record = Record::new(path, owner);
        for (name, value) in bag {
            record.apply_property(name, value)?;
        }
        Ok(record)
    }

    pub(crate) fn apply_property(&mut self, name: &str, value: &PropertyValue) -> Result<(), CoreError> {
        if name == record_key::SIZE {
            let size = value.expect_u32(name).map_err(|e| invalid(&self.path, &e))?;
            self.fields.uri_object_size = Some(size);
            return Ok(());
        }
        let Some(slot) = string_slot(&mut self.fields, name) else {
            trace!(record = %self.path, property = name, "uncached record property");
            return Ok(());
        };
        *slot = Some(owned_str(&self.path, name, value)?);
        Ok(())
    }
}

fn string_slot<'a>(fields: &'a mut RecordFields, name: &str) -> Option<&'a mut Option<String>> {
    let slot = match name {
        record_key::TYPE => &mut fields.record_type,
        record_key::ENCODING => &mut fields.encoding,
        record_key::LANGUAGE => &mut fields.language,
        record_key::REPRESENTATION => &mut fields.representation,
        record_key::URI => &mut fields.uri,
        record_key::MIME_TYPE => &mut fields.mime_type,
        record_key::ACTION => &mut fields.action,
        record_key::CARRIER => &mut fields.carrier,
        record_key::SSID => &mut fields.ssid,
        record_key::PASSPHRASE => &mut fields.passphrase,
        record_key::ENCRYPTION => &mut fields.encryption,
        record_key::AUTHENTICATION => &mut fields.authentication,
        _ => return None,
    };
    Some(slot)
}
