// Shared fixtures for the nearfield-core integration tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use nearfield_api::memory::MemoryDirectory;
use nearfield_api::{Interface, PropertyBag, props};
use nearfield_core::{Context, ContextConfig};

pub const ADAPTER: &str = "/org/neard/nfc0";
pub const TAG: &str = "/org/neard/nfc0/tag0";
pub const DEVICE: &str = "/org/neard/nfc0/device0";
pub const RECORD: &str = "/org/neard/nfc0/tag0/record0";

pub type Log = Rc<RefCell<Vec<String>>>;

pub fn adapter_props(powered: bool, polling: bool) -> PropertyBag {
    props! {
        "Mode" => "Idle",
        "Powered" => powered,
        "Polling" => polling,
        "Protocols" => vec!["Felica".to_owned(), "MIFARE".to_owned(), "ISO-DEP".to_owned()],
    }
}

pub fn tag_props() -> PropertyBag {
    props! { "Type" => "Type 2", "Protocol" => "MIFARE", "ReadOnly" => false }
}

pub fn text_record_props() -> PropertyBag {
    props! {
        "Type" => "Text",
        "Encoding" => "UTF-8",
        "Language" => "en",
        "Representation" => "hello",
    }
}

/// A directory holding one idle, unpowered adapter.
pub fn directory_with_adapter() -> MemoryDirectory {
    MemoryDirectory::new().with_object(ADAPTER, Interface::Adapter, adapter_props(false, false))
}

pub fn context(directory: MemoryDirectory) -> Context<MemoryDirectory> {
    Context::new(directory, ContextConfig::default())
}

/// Register every callback, appending `"<event> <path>"` to the log.
pub fn record_callbacks(ctx: &mut Context<MemoryDirectory>) -> Log {
    let log: Log = Rc::new(RefCell::new(Vec::new()));

    let l = Rc::clone(&log);
    ctx.on_adapter_added(move |p| l.borrow_mut().push(format!("adapter_added {p}")));
    let l = Rc::clone(&log);
    ctx.on_adapter_removed(move |p| l.borrow_mut().push(format!("adapter_removed {p}")));
    let l = Rc::clone(&log);
    ctx.on_tag_found(move |p| l.borrow_mut().push(format!("tag_found {p}")));
    let l = Rc::clone(&log);
    ctx.on_tag_lost(move |p| l.borrow_mut().push(format!("tag_lost {p}")));
    let l = Rc::clone(&log);
    ctx.on_device_found(move |p| l.borrow_mut().push(format!("device_found {p}")));
    let l = Rc::clone(&log);
    ctx.on_device_lost(move |p| l.borrow_mut().push(format!("device_lost {p}")));
    let l = Rc::clone(&log);
    ctx.on_record_found(move |p| l.borrow_mut().push(format!("record_found {p}")));

    log
}

pub fn take(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.borrow_mut())
}
