//! Workload Tests
//!
//! End-to-end load-harness runs against the in-memory server double. The
//! workers verify their own reads, updates and deletes, so against a
//! well-behaved store every completed operation must also succeed.

mod common;

use common::TestServer;
use nimbuskv_client::harness::workload::{self, WorkloadConfig};
use nimbuskv_client::harness::OpKind;

fn assert_all_ops_succeeded(stats: &nimbuskv_client::harness::OpStats) {
    for op in OpKind::ALL {
        assert_eq!(
            stats.succeeded(op),
            stats.completed(op),
            "{} ops failed verification",
            op.name()
        );
    }
}

#[test]
fn test_mixed_workload_completes_every_op() {
    let server = TestServer::start();
    let workload = WorkloadConfig {
        records: 50,
        threads: 2,
        ops: 200,
        fixed_size: false,
        seed: 7,
    };

    let report = workload::run(&workload, &server.config()).unwrap();

    assert_eq!(report.stats.total_completed(), 200);
    assert_all_ops_succeeded(&report.stats);

    // Live records never exceed the configured target
    assert!(server.len() as u64 <= workload.records);
}

#[test]
fn test_single_worker_runs_all_ops() {
    let server = TestServer::start();
    let workload = WorkloadConfig {
        records: 20,
        threads: 1,
        ops: 120,
        fixed_size: false,
        seed: 3,
    };

    let report = workload::run(&workload, &server.config()).unwrap();

    assert_eq!(report.stats.total_completed(), 120);
    assert_all_ops_succeeded(&report.stats);
}

#[test]
fn test_odd_op_count_split_across_workers() {
    let server = TestServer::start();
    let workload = WorkloadConfig {
        records: 30,
        threads: 3,
        ops: 101,
        fixed_size: false,
        seed: 11,
    };

    let report = workload::run(&workload, &server.config()).unwrap();
    assert_eq!(report.stats.total_completed(), 101);
}

#[test]
fn test_fixed_size_values() {
    let server = TestServer::start();
    let workload = WorkloadConfig {
        records: 16,
        threads: 2,
        ops: 80,
        fixed_size: true,
        seed: 5,
    };

    let report = workload::run(&workload, &server.config()).unwrap();

    assert_eq!(report.stats.total_completed(), 80);
    assert_all_ops_succeeded(&report.stats);
}

#[test]
fn test_zero_thread_count_clamped_to_one() {
    let server = TestServer::start();
    let workload = WorkloadConfig {
        records: 10,
        threads: 0,
        ops: 40,
        fixed_size: false,
        seed: 1,
    };

    let report = workload::run(&workload, &server.config()).unwrap();
    assert_eq!(report.stats.total_completed(), 40);
}

#[test]
fn test_same_seed_reproduces_outcome() {
    let workload = WorkloadConfig {
        records: 40,
        threads: 2,
        ops: 150,
        fixed_size: false,
        seed: 99,
    };

    let first_server = TestServer::start();
    let first = workload::run(&workload, &first_server.config()).unwrap();

    let second_server = TestServer::start();
    let second = workload::run(&workload, &second_server.config()).unwrap();

    for op in OpKind::ALL {
        assert_eq!(first.stats.completed(op), second.stats.completed(op));
        assert_eq!(first.stats.succeeded(op), second.stats.succeeded(op));
    }
}

#[test]
fn test_report_renders_per_op_table() {
    let server = TestServer::start();
    let workload = WorkloadConfig {
        records: 10,
        threads: 1,
        ops: 30,
        fixed_size: false,
        seed: 2,
    };

    let report = workload::run(&workload, &server.config()).unwrap();
    let rendered = report.to_string();

    assert!(rendered.contains("Operation"));
    for op in OpKind::ALL {
        assert!(rendered.contains(op.name()));
    }
    assert!(rendered.contains("Total"));
    assert!(rendered.contains("Elapsed"));
}
