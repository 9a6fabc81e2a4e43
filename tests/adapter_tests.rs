//! Adapter Tests
//!
//! Record-oriented operations mapped onto the flat keyspace through the
//! `table:key:field` composite scheme, verified against the in-memory
//! server double.

mod common;

use std::collections::HashMap;

use common::TestServer;
use nimbuskv_client::harness::StoreAdapter;

fn record(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(field, value)| (field.to_string(), value.to_string()))
        .collect()
}

#[test]
fn test_insert_then_read_fields() {
    let server = TestServer::start();
    let mut adapter = StoreAdapter::new(server.client());
    adapter.connect().unwrap();

    let values = record(&[("name", "alice"), ("city", "zurich")]);
    assert!(adapter.insert("usertable", "user1", &values).unwrap());

    let read = adapter
        .read("usertable", "user1", &["name", "city"])
        .unwrap()
        .unwrap();
    assert_eq!(read.get("name").map(String::as_str), Some("alice"));
    assert_eq!(read.get("city").map(String::as_str), Some("zurich"));

    adapter.disconnect().unwrap();
}

#[test]
fn test_fields_land_under_composite_keys() {
    let server = TestServer::start();
    let mut adapter = StoreAdapter::new(server.client());
    adapter.connect().unwrap();

    let values = record(&[("name", "alice")]);
    assert!(adapter.insert("usertable", "user1", &values).unwrap());

    // One flat key per field, colon-joined
    assert_eq!(
        server.value_of(b"usertable:user1:name"),
        Some(b"alice".to_vec())
    );
    assert_eq!(server.len(), 1);
}

#[test]
fn test_read_with_missing_field_is_none() {
    let server = TestServer::start();
    let mut adapter = StoreAdapter::new(server.client());
    adapter.connect().unwrap();

    let values = record(&[("name", "alice")]);
    assert!(adapter.insert("usertable", "user1", &values).unwrap());

    let read = adapter
        .read("usertable", "user1", &["name", "missing"])
        .unwrap();
    assert!(read.is_none());
}

#[test]
fn test_read_absent_record_is_none() {
    let server = TestServer::start();
    let mut adapter = StoreAdapter::new(server.client());
    adapter.connect().unwrap();

    assert!(adapter
        .read("usertable", "nobody", &["name"])
        .unwrap()
        .is_none());
}

#[test]
fn test_update_overwrites_field_prefix() {
    let server = TestServer::start();
    let mut adapter = StoreAdapter::new(server.client());
    adapter.connect().unwrap();

    let values = record(&[("name", "AAAA")]);
    assert!(adapter.insert("usertable", "user1", &values).unwrap());

    // In-place update writes from offset 0 over the stored bytes
    let patch = record(&[("name", "BB")]);
    assert!(adapter.update("usertable", "user1", &patch).unwrap());

    let read = adapter
        .read("usertable", "user1", &["name"])
        .unwrap()
        .unwrap();
    assert_eq!(read.get("name").map(String::as_str), Some("BBAA"));
}

#[test]
fn test_update_absent_record_reports_failure() {
    let server = TestServer::start();
    let mut adapter = StoreAdapter::new(server.client());
    adapter.connect().unwrap();

    let patch = record(&[("name", "BB")]);
    assert!(!adapter.update("usertable", "ghost", &patch).unwrap());
}

#[test]
fn test_delete_targets_record_key_only() {
    let server = TestServer::start();
    let mut adapter = StoreAdapter::new(server.client());
    adapter.connect().unwrap();

    let values = record(&[("name", "alice")]);
    assert!(adapter.insert("usertable", "user1", &values).unwrap());

    // Only the bare table:key composite is deleted, and insert never
    // stored one, so the store reports a miss and fields survive.
    assert!(!adapter.delete("usertable", "user1").unwrap());
    assert!(adapter
        .read("usertable", "user1", &["name"])
        .unwrap()
        .is_some());
}

#[test]
fn test_into_inner_returns_live_client() {
    let server = TestServer::start();
    let mut adapter = StoreAdapter::new(server.client());
    adapter.connect().unwrap();

    let values = record(&[("name", "alice")]);
    assert!(adapter.insert("usertable", "user1", &values).unwrap());

    let mut client = adapter.into_inner();
    assert_eq!(
        client.get(b"usertable:user1:name").unwrap(),
        Some(b"alice".to_vec())
    );
    client.disconnect().unwrap();
}
