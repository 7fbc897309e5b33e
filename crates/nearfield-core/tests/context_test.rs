#![allow(clippy::unwrap_used)]
// Integration tests for the public query surface of `Context`, driven
// through an in-memory directory.

mod common;

use common::{
    ADAPTER, RECORD, TAG, context, directory_with_adapter, record_callbacks, tag_props, take,
    text_record_props,
};
use nearfield_api::{Interface, method};
use nearfield_core::{
    AdapterMode, AdapterPath, CoreError, PollMode, RecordOwner, RecordType, TagPath,
};
use pretty_assertions::assert_eq;

// ── Adapters ────────────────────────────────────────────────────────

#[test]
fn test_enumerated_adapter_is_listed_and_powered_on() {
    let mut ctx = context(directory_with_adapter());
    ctx.connect().unwrap();

    assert_eq!(ctx.list_adapters().unwrap(), vec![AdapterPath::from(ADAPTER)]);
    let before = ctx.adapter_properties(ADAPTER).unwrap();
    assert_eq!(before.mode, AdapterMode::Idle);
    assert!(!before.powered);
    assert_eq!(before.protocols, ["Felica", "MIFARE", "ISO-DEP"]);

    ctx.set_powered(ADAPTER, true).unwrap();

    let call = ctx.directory().calls().last().unwrap().clone();
    assert_eq!(call.method, method::SET);
    assert_eq!(call.interface, Interface::Properties);
    assert_eq!(call.args[0].as_str(), Some("org.neard.Adapter"));
    assert_eq!(call.args[1].as_str(), Some("Powered"));
    assert_eq!(call.args[2].as_bool(), Some(true));
    assert!(ctx.adapter_properties(ADAPTER).unwrap().powered);

    // The daemon's own change notification agrees with the cache.
    ctx.process_pending();
    assert!(ctx.adapter_properties(ADAPTER).unwrap().powered);
}

#[test]
fn test_empty_directory_reports_no_adapter() {
    let mut ctx = context(nearfield_api::memory::MemoryDirectory::new());
    ctx.connect().unwrap();

    let err = ctx.list_adapters().unwrap_err();
    assert!(matches!(err, CoreError::NoAdapter { .. }));
}

#[test]
fn test_snapshot_is_detached_from_cache() {
    let mut ctx = context(directory_with_adapter());
    ctx.connect().unwrap();

    let snapshot = ctx.adapter_properties(ADAPTER).unwrap();
    ctx.set_powered(ADAPTER, true).unwrap();

    assert!(!snapshot.powered);
    assert!(ctx.adapter_properties(ADAPTER).unwrap().powered);
}

// ── Tags ────────────────────────────────────────────────────────────

#[test]
fn test_announced_tag_is_found_once_and_listed() {
    let mut ctx = context(directory_with_adapter());
    let log = record_callbacks(&mut ctx);
    ctx.connect().unwrap();
    assert_eq!(take(&log), [format!("adapter_added {ADAPTER}")]);

    ctx.directory_mut().announce(TAG, Interface::Tag, tag_props());
    ctx.process_pending();

    assert_eq!(take(&log), [format!("tag_found {TAG}")]);
    assert_eq!(ctx.list_tags(ADAPTER).unwrap(), vec![TagPath::from(TAG)]);

    let tag = ctx.tag_properties(TAG).unwrap();
    assert_eq!(tag.adapter, AdapterPath::from(ADAPTER));
    assert_eq!(tag.tag_type.as_deref(), Some("Type 2"));
    assert_eq!(tag.protocol.as_deref(), Some("MIFARE"));
    assert!(!tag.read_only);
    assert_eq!(
        ctx.adapter_properties(ADAPTER).unwrap().tags,
        vec![TagPath::from(TAG)]
    );
}

#[test]
fn test_adapter_without_tags_reports_no_tag() {
    let mut ctx = context(directory_with_adapter());
    ctx.connect().unwrap();

    let err = ctx.list_tags(ADAPTER).unwrap_err();
    assert!(matches!(err, CoreError::NoTag { .. }));
    let err = ctx.list_tags("/org/neard/nfc9").unwrap_err();
    assert!(matches!(err, CoreError::NoAdapter { .. }));
}

// ── Records ─────────────────────────────────────────────────────────

#[test]
fn test_announced_record_is_found_and_queryable() {
    let mut ctx = context(directory_with_adapter());
    let log = record_callbacks(&mut ctx);
    ctx.connect().unwrap();
    ctx.directory_mut().announce(TAG, Interface::Tag, tag_props());
    ctx.directory_mut()
        .announce(RECORD, Interface::Record, text_record_props());
    ctx.process_pending();

    assert_eq!(
        take(&log),
        [
            format!("adapter_added {ADAPTER}"),
            format!("tag_found {TAG}"),
            format!("record_found {RECORD}"),
        ]
    );

    let records = ctx.list_records(TAG).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0], RECORD);

    let record = ctx.record_properties(RECORD).unwrap();
    assert_eq!(record.owner, RecordOwner::Tag(TAG.into()));
    assert_eq!(record.fields.kind(), Some(RecordType::Text));
    assert_eq!(record.fields.language.as_deref(), Some("en"));
    assert_eq!(record.fields.encoding.as_deref(), Some("UTF-8"));
    assert_eq!(record.fields.representation.as_deref(), Some("hello"));
    assert_eq!(record.fields.uri, None);
}

#[test]
fn test_record_listing_for_unknown_owner() {
    let mut ctx = context(directory_with_adapter());
    ctx.connect().unwrap();
    ctx.directory_mut().announce(TAG, Interface::Tag, tag_props());
    ctx.process_pending();

    let err = ctx.list_records(TAG).unwrap_err();
    assert!(matches!(err, CoreError::NoRecord { .. }));
    let err = ctx.list_records("/org/neard/nfc0/tag7").unwrap_err();
    assert!(matches!(err, CoreError::NoTag { .. }));
    let err = ctx.record_properties(RECORD).unwrap_err();
    assert!(matches!(err, CoreError::NoRecord { .. }));
}

// ── Removal ─────────────────────────────────────────────────────────

#[test]
fn test_retracted_tag_is_lost_with_its_records() {
    let mut ctx = context(directory_with_adapter());
    let log = record_callbacks(&mut ctx);
    ctx.connect().unwrap();
    ctx.directory_mut().announce(TAG, Interface::Tag, tag_props());
    ctx.directory_mut()
        .announce(RECORD, Interface::Record, text_record_props());
    ctx.process_pending();
    take(&log);

    ctx.directory_mut().retract(TAG);
    ctx.process_pending();

    assert_eq!(take(&log), [format!("tag_lost {TAG}")]);
    assert!(matches!(
        ctx.tag_properties(TAG).unwrap_err(),
        CoreError::NoTag { .. }
    ));
    assert!(matches!(
        ctx.record_properties(RECORD).unwrap_err(),
        CoreError::NoRecord { .. }
    ));
    assert!(ctx.adapter_properties(ADAPTER).unwrap().tags.is_empty());
}

// ── Polling ─────────────────────────────────────────────────────────

#[test]
fn test_start_poll_rejected_when_polling_or_unknown() {
    let dir = nearfield_api::memory::MemoryDirectory::new().with_object(
        ADAPTER,
        Interface::Adapter,
        common::adapter_props(true, true),
    );
    let mut ctx = context(dir);
    ctx.connect().unwrap();

    let err = ctx.start_poll(ADAPTER, PollMode::Initiator).unwrap_err();
    assert_eq!(
        err,
        CoreError::PollingAlreadyActive {
            path: ADAPTER.into()
        }
    );

    let err = ctx
        .start_poll("/org/neard/nfc9", PollMode::Initiator)
        .unwrap_err();
    assert!(matches!(err, CoreError::NoAdapter { .. }));
    assert!(ctx.directory().calls().is_empty());
}
