#![allow(clippy::unwrap_used)]
// Integration tests for connecting, disconnecting, dropping and running
// the event loop of a `Context`.

mod common;

use common::{
    ADAPTER, DEVICE, TAG, context, directory_with_adapter, record_callbacks, tag_props, take,
};
use nearfield_api::{Error, Interface, props};
use nearfield_core::{ConnectionState, CoreError};
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

// ── Helpers ─────────────────────────────────────────────────────────

fn unreachable() -> Error {
    Error::Disconnected {
        reason: "name org.neard has no owner".into(),
    }
}

// ── Connect / disconnect ────────────────────────────────────────────

#[test]
fn test_connect_is_idempotent() {
    let mut ctx = context(directory_with_adapter());
    let log = record_callbacks(&mut ctx);

    ctx.connect().unwrap();
    ctx.connect().unwrap();

    assert!(ctx.is_connected());
    assert_eq!(take(&log), [format!("adapter_added {ADAPTER}")]);
}

#[test]
fn test_failed_subscription_leaves_context_disconnected() {
    let mut ctx = context(directory_with_adapter());
    ctx.directory_mut().fail_subscribe(unreachable());

    let err = ctx.connect().unwrap_err();
    assert!(matches!(err, CoreError::Transport { .. }));
    assert_eq!(ctx.connection_state(), ConnectionState::Disconnected);
    assert!(ctx.store().is_empty());

    ctx.directory_mut().clear_failures();
    ctx.connect().unwrap();
    assert_eq!(ctx.connection_state(), ConnectionState::Connected);
    assert_eq!(ctx.store().adapter_count(), 1);
}

#[test]
fn test_disconnect_tears_down_and_ignores_later_events() {
    let mut ctx = context(directory_with_adapter());
    let log = record_callbacks(&mut ctx);
    ctx.connect().unwrap();
    ctx.directory_mut().announce(TAG, Interface::Tag, tag_props());
    ctx.process_pending();
    take(&log);

    ctx.disconnect();

    assert_eq!(
        take(&log),
        [
            format!("tag_lost {TAG}"),
            format!("adapter_removed {ADAPTER}"),
        ]
    );
    assert!(!ctx.is_connected());
    assert!(ctx.store().is_empty());

    ctx.directory_mut()
        .announce(DEVICE, Interface::Device, props! {});
    assert_eq!(ctx.process_pending(), 0);
    assert!(take(&log).is_empty());

    // A second disconnect has nothing left to report.
    ctx.disconnect();
    assert!(take(&log).is_empty());
}

#[test]
fn test_drop_reports_everything_lost() {
    let mut ctx = context(directory_with_adapter());
    let log = record_callbacks(&mut ctx);
    ctx.connect().unwrap();
    ctx.directory_mut()
        .announce(DEVICE, Interface::Device, props! {});
    ctx.process_pending();
    take(&log);

    drop(ctx);

    assert_eq!(
        take(&log),
        [
            format!("device_lost {DEVICE}"),
            format!("adapter_removed {ADAPTER}"),
        ]
    );
}

// ── Event loop ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_run_applies_events_until_stream_closes() {
    let mut ctx = context(directory_with_adapter());
    let log = record_callbacks(&mut ctx);
    ctx.connect().unwrap();
    take(&log);

    ctx.directory_mut().announce(TAG, Interface::Tag, tag_props());
    ctx.directory_mut().close_events();

    ctx.run(CancellationToken::new()).await.unwrap();

    assert_eq!(
        take(&log),
        [
            format!("tag_found {TAG}"),
            format!("tag_lost {TAG}"),
            format!("adapter_removed {ADAPTER}"),
        ]
    );
    assert_eq!(ctx.connection_state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_cancelled_run_stays_connected() {
    let mut ctx = context(directory_with_adapter());
    ctx.connect().unwrap();
    ctx.directory_mut().announce(TAG, Interface::Tag, tag_props());

    let cancel = CancellationToken::new();
    cancel.cancel();
    ctx.run(cancel).await.unwrap();

    assert!(ctx.is_connected());
    // The queued event survived the cancelled loop.
    assert_eq!(ctx.process_pending(), 1);
    assert_eq!(ctx.list_tags(ADAPTER).unwrap().len(), 1);
}

#[tokio::test]
async fn test_run_requires_connection() {
    let mut ctx = context(directory_with_adapter());

    let err = ctx.run(CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, CoreError::Transport { .. }));
}
