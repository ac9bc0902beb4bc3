#![allow(dead_code)]

use std::sync::{Arc, Once};

use ossia::{LocalDevice, NodeHandle, Session};
use serde_json::Value;

pub type Handle = NodeHandle<LocalDevice>;

/// Route `tracing` output to the test harness; filtered by `RUST_LOG`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn empty() -> (Arc<Session<LocalDevice>>, Handle) {
    init_tracing();
    let session = Session::new(LocalDevice::new("test"));
    let root = session.wrap(Some(session.boundary().root()));
    (session, root)
}

pub fn seeded(tree: &Value) -> (Arc<Session<LocalDevice>>, Handle) {
    init_tracing();
    let device = LocalDevice::from_json("test", tree).expect("valid seed");
    let session = Session::new(device);
    let root = session.wrap(Some(session.boundary().root()));
    (session, root)
}

pub fn names(handles: &[Handle]) -> Vec<String> {
    handles.iter().filter_map(|h| h.name()).collect()
}
