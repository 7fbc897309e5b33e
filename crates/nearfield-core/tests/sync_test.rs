#![allow(clippy::unwrap_used)]
// Integration tests for how directory enumeration and events reach the
// cache and the found/lost callbacks.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{
    ADAPTER, DEVICE, RECORD, TAG, adapter_props, context, directory_with_adapter,
    record_callbacks, tag_props, take, text_record_props,
};
use nearfield_api::memory::MemoryDirectory;
use nearfield_api::{DirectoryEvent, Error, Interface, ObjectPath, PropertyValue, props};
use nearfield_core::{AdapterMode, AdapterProperty, Context, ContextConfig, CoreError};
use pretty_assertions::assert_eq;

// ── Helpers ─────────────────────────────────────────────────────────

const TAG1: &str = "/org/neard/nfc0/tag1";

fn property_log(ctx: &mut Context<MemoryDirectory>) -> Rc<RefCell<Vec<(String, AdapterProperty)>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    ctx.on_adapter_property_changed(move |_, name, value| {
        sink.borrow_mut().push((name.to_owned(), value.clone()));
    });
    log
}

// ── Enumeration ─────────────────────────────────────────────────────

#[test]
fn test_enumeration_reports_owners_first_whatever_the_listing_order() {
    let dir = MemoryDirectory::new()
        .with_object(RECORD, Interface::Record, text_record_props())
        .with_object(TAG, Interface::Tag, tag_props())
        .with_object(DEVICE, Interface::Device, props! {})
        .with_object(ADAPTER, Interface::Adapter, adapter_props(true, false));
    let mut ctx = context(dir);
    let log = record_callbacks(&mut ctx);

    ctx.connect().unwrap();

    assert_eq!(
        take(&log),
        [
            format!("adapter_added {ADAPTER}"),
            format!("tag_found {TAG}"),
            format!("device_found {DEVICE}"),
            format!("record_found {RECORD}"),
        ]
    );
    assert_eq!(ctx.list_records(TAG).unwrap().len(), 1);
}

#[test]
fn test_enumeration_disabled_learns_only_from_events() {
    let config = ContextConfig {
        enumerate_on_connect: false,
        ..ContextConfig::default()
    };
    let mut ctx = Context::new(directory_with_adapter(), config);
    ctx.connect().unwrap();
    assert!(ctx.store().is_empty());

    ctx.directory_mut()
        .announce("/org/neard/nfc1", Interface::Adapter, adapter_props(false, false));
    ctx.process_pending();

    assert_eq!(ctx.list_adapters().unwrap(), ["/org/neard/nfc1"]);
}

#[test]
fn test_objects_outside_root_are_ignored() {
    let config = ContextConfig {
        root: ObjectPath::from("/org/neard/nfc1"),
        ..ContextConfig::default()
    };
    let dir = directory_with_adapter().with_object(
        "/org/neard/nfc1",
        Interface::Adapter,
        adapter_props(false, false),
    );
    let mut ctx = Context::new(dir, config);
    ctx.connect().unwrap();

    assert_eq!(ctx.list_adapters().unwrap(), ["/org/neard/nfc1"]);
    assert!(ctx.adapter_properties(ADAPTER).is_err());
}

#[test]
fn test_uncached_interfaces_are_skipped() {
    let dir = directory_with_adapter().with_object(
        "/org/neard",
        Interface::Manager,
        props! { "Adapters" => "/org/neard/nfc0" },
    );
    let mut ctx = context(dir);
    ctx.connect().unwrap();

    assert_eq!(ctx.store().adapter_count(), 1);
}

// ── Creation ────────────────────────────────────────────────────────

#[test]
fn test_orphan_tag_is_dropped() {
    let mut ctx = context(MemoryDirectory::new());
    let log = record_callbacks(&mut ctx);
    ctx.connect().unwrap();

    ctx.directory_mut().announce(TAG, Interface::Tag, tag_props());
    ctx.process_pending();

    assert!(take(&log).is_empty());
    assert!(ctx.store().is_empty());
    assert!(matches!(
        ctx.tag_properties(TAG).unwrap_err(),
        CoreError::NoTag { .. }
    ));
}

#[test]
fn test_bare_announcement_reads_properties_back() {
    let mut ctx = context(directory_with_adapter());
    ctx.connect().unwrap();
    assert!(ctx.directory().reads().is_empty());

    ctx.directory_mut().announce_bare(TAG, Interface::Tag, tag_props());
    ctx.process_pending();

    assert_eq!(ctx.directory().reads(), [ObjectPath::from(TAG)]);
    assert_eq!(
        ctx.tag_properties(TAG).unwrap().protocol.as_deref(),
        Some("MIFARE")
    );
}

#[test]
fn test_failed_read_aborts_creation() {
    let mut ctx = context(directory_with_adapter());
    let log = record_callbacks(&mut ctx);
    ctx.connect().unwrap();
    take(&log);

    ctx.directory_mut().fail_reads_for(
        TAG,
        Error::Disconnected {
            reason: "timeout".into(),
        },
    );
    ctx.directory_mut().announce_bare(TAG, Interface::Tag, tag_props());
    ctx.process_pending();

    assert!(take(&log).is_empty());
    assert!(ctx.tag_properties(TAG).is_err());

    // A later removal of the never-cached tag is a no-op.
    ctx.directory_mut().retract(TAG);
    ctx.process_pending();
    assert!(take(&log).is_empty());
    assert_eq!(ctx.store().adapter_count(), 1);
}

#[test]
fn test_malformed_properties_are_not_cached() {
    let mut ctx = context(directory_with_adapter());
    ctx.connect().unwrap();
    ctx.directory_mut().announce(TAG, Interface::Tag, tag_props());
    ctx.process_pending();

    // Record without a type.
    ctx.directory_mut()
        .announce(RECORD, Interface::Record, props! { "Representation" => "hello" });
    // Adapter whose power flag has the wrong type.
    ctx.directory_mut().announce(
        "/org/neard/nfc1",
        Interface::Adapter,
        props! { "Powered" => "yes" },
    );
    ctx.process_pending();

    assert!(matches!(
        ctx.record_properties(RECORD).unwrap_err(),
        CoreError::NoRecord { .. }
    ));
    assert_eq!(ctx.list_adapters().unwrap(), [ADAPTER]);
}

#[test]
fn test_duplicate_announcement_reports_once() {
    let mut ctx = context(directory_with_adapter());
    let log = record_callbacks(&mut ctx);
    ctx.connect().unwrap();
    take(&log);

    ctx.directory_mut().announce(TAG, Interface::Tag, tag_props());
    ctx.directory_mut().announce(TAG, Interface::Tag, tag_props());
    ctx.directory_mut()
        .announce(ADAPTER, Interface::Adapter, adapter_props(true, true));
    ctx.process_pending();

    assert_eq!(take(&log), [format!("tag_found {TAG}")]);
    assert_eq!(ctx.list_tags(ADAPTER).unwrap().len(), 1);
    // The duplicate adapter announcement did not overwrite the cache.
    assert!(!ctx.adapter_properties(ADAPTER).unwrap().powered);
}

#[test]
fn test_new_record_reports_unnotified_tag_first() {
    let dir = directory_with_adapter().with_object(TAG, Interface::Tag, tag_props());
    let mut ctx = context(dir);
    ctx.connect().unwrap();
    let log = record_callbacks(&mut ctx);

    ctx.directory_mut()
        .announce(RECORD, Interface::Record, text_record_props());
    ctx.process_pending();

    assert_eq!(
        take(&log),
        [format!("tag_found {TAG}"), format!("record_found {RECORD}")]
    );
}

#[test]
fn test_new_record_reports_unnotified_device_first() {
    const DEVICE_RECORD: &str = "/org/neard/nfc0/device0/record0";
    let dir = directory_with_adapter().with_object(DEVICE, Interface::Device, props! {});
    let mut ctx = context(dir);
    ctx.connect().unwrap();
    let log = record_callbacks(&mut ctx);

    ctx.directory_mut()
        .announce(DEVICE_RECORD, Interface::Record, text_record_props());
    ctx.process_pending();

    assert_eq!(
        take(&log),
        [
            format!("device_found {DEVICE}"),
            format!("record_found {DEVICE_RECORD}"),
        ]
    );

    // Both are notified now; a further record only reports itself.
    ctx.directory_mut().announce(
        "/org/neard/nfc0/device0/record1",
        Interface::Record,
        text_record_props(),
    );
    ctx.process_pending();
    assert_eq!(
        take(&log),
        ["record_found /org/neard/nfc0/device0/record1".to_owned()]
    );
}

// ── Removal ─────────────────────────────────────────────────────────

#[test]
fn test_adapter_removal_cascades_newest_first() {
    let mut ctx = context(directory_with_adapter());
    let log = record_callbacks(&mut ctx);
    ctx.connect().unwrap();
    ctx.directory_mut().announce(TAG, Interface::Tag, tag_props());
    ctx.directory_mut()
        .announce(DEVICE, Interface::Device, props! {});
    ctx.directory_mut().announce(TAG1, Interface::Tag, tag_props());
    ctx.process_pending();
    take(&log);

    ctx.directory_mut().retract(ADAPTER);
    ctx.process_pending();

    assert_eq!(
        take(&log),
        [
            format!("tag_lost {TAG1}"),
            format!("device_lost {DEVICE}"),
            format!("tag_lost {TAG}"),
            format!("adapter_removed {ADAPTER}"),
        ]
    );
    assert!(ctx.store().is_empty());
}

#[test]
fn test_removal_without_interfaces_uses_cached_kind() {
    let mut ctx = context(directory_with_adapter());
    let log = record_callbacks(&mut ctx);
    ctx.connect().unwrap();
    ctx.directory_mut()
        .announce(DEVICE, Interface::Device, props! {});
    ctx.process_pending();
    take(&log);

    ctx.directory_mut().emit(DirectoryEvent::Removed {
        path: ObjectPath::from(DEVICE),
        interfaces: Vec::new(),
    });
    ctx.process_pending();

    assert_eq!(take(&log), [format!("device_lost {DEVICE}")]);
    assert!(matches!(
        ctx.list_devices(ADAPTER).unwrap_err(),
        CoreError::NoDevice { .. }
    ));
}

#[test]
fn test_record_removal_is_silent() {
    let mut ctx = context(directory_with_adapter());
    let log = record_callbacks(&mut ctx);
    ctx.connect().unwrap();
    ctx.directory_mut().announce(TAG, Interface::Tag, tag_props());
    ctx.directory_mut()
        .announce(RECORD, Interface::Record, text_record_props());
    ctx.process_pending();
    take(&log);

    ctx.directory_mut().retract(RECORD);
    ctx.process_pending();

    assert!(take(&log).is_empty());
    assert!(ctx.tag_properties(TAG).unwrap().records.is_empty());
}

// ── Property changes ────────────────────────────────────────────────

#[test]
fn test_adapter_changes_reach_the_callback() {
    let mut ctx = context(directory_with_adapter());
    let changes = property_log(&mut ctx);
    ctx.connect().unwrap();

    ctx.directory_mut()
        .change_property(ADAPTER, Interface::Adapter, "Polling", true);
    ctx.directory_mut()
        .change_property(ADAPTER, Interface::Adapter, "Mode", "Initiator");
    ctx.directory_mut()
        .change_property(ADAPTER, Interface::Adapter, "Vendor", 7_u32);
    ctx.process_pending();

    assert_eq!(
        *changes.borrow(),
        [
            ("Polling".to_owned(), AdapterProperty::Polling(true)),
            ("Mode".to_owned(), AdapterProperty::Mode(AdapterMode::Initiator)),
            ("Vendor".to_owned(), AdapterProperty::Other(PropertyValue::U32(7))),
        ]
    );
    let adapter = ctx.adapter_properties(ADAPTER).unwrap();
    assert!(adapter.polling);
    assert_eq!(adapter.mode, AdapterMode::Initiator);
}

#[test]
fn test_invalid_adapter_change_is_dropped() {
    let mut ctx = context(directory_with_adapter());
    let changes = property_log(&mut ctx);
    ctx.connect().unwrap();

    ctx.directory_mut()
        .change_property(ADAPTER, Interface::Adapter, "Mode", "Sideways");
    ctx.directory_mut()
        .change_property(ADAPTER, Interface::Adapter, "Powered", "on");
    ctx.process_pending();

    assert!(changes.borrow().is_empty());
    let adapter = ctx.adapter_properties(ADAPTER).unwrap();
    assert_eq!(adapter.mode, AdapterMode::Idle);
    assert!(!adapter.powered);
}

#[test]
fn test_tag_and_record_changes_update_cache() {
    let mut ctx = context(directory_with_adapter());
    ctx.connect().unwrap();
    ctx.directory_mut().announce(TAG, Interface::Tag, tag_props());
    ctx.directory_mut()
        .announce(RECORD, Interface::Record, text_record_props());
    ctx.process_pending();

    ctx.directory_mut()
        .change_property(TAG, Interface::Tag, "ReadOnly", true);
    ctx.directory_mut()
        .change_property(RECORD, Interface::Record, "Representation", "bye");
    ctx.process_pending();

    assert!(ctx.tag_properties(TAG).unwrap().read_only);
    assert_eq!(
        ctx.record_properties(RECORD)
            .unwrap()
            .fields
            .representation
            .as_deref(),
        Some("bye")
    );
}
