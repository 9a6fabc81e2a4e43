//! Load generator
//!
//! Drives a mixed SET/GET/UPDATE/DELETE workload against a store from
//! multiple worker threads. Every worker owns its own connection, its own
//! seeded RNG and its own expected-state map, so reads and deletes are
//! verified against what the worker itself wrote. Workers tally per-op
//! counters locally and the totals are merged after all workers join; the
//! only shared mutable state is one atomic progress counter.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crossbeam::thread;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::client::Client;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Characters used for generated keys and values
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Smallest generated value
const MIN_VALUE_LEN: usize = 4;

// =============================================================================
// Workload Configuration
// =============================================================================

/// Parameters of a workload run
#[derive(Debug, Clone)]
pub struct WorkloadConfig {
    /// Target number of live records, split evenly across workers
    pub records: u64,

    /// Worker thread count; each worker owns one connection
    pub threads: usize,

    /// Total operation count, split across workers
    pub ops: u64,

    /// Generate fixed-size values instead of random sizes
    pub fixed_size: bool,

    /// RNG seed; worker `i` seeds its generator with `seed + i`
    pub seed: u64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            records: 1_000,
            threads: 4,
            ops: 10_000,
            fixed_size: false,
            seed: 42,
        }
    }
}

// =============================================================================
// Operation Statistics
// =============================================================================

/// The four workload operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Set = 0,
    Get = 1,
    Update = 2,
    Delete = 3,
}

impl OpKind {
    pub const ALL: [OpKind; 4] = [OpKind::Set, OpKind::Get, OpKind::Update, OpKind::Delete];
    pub const COUNT: usize = Self::ALL.len();

    pub fn name(self) -> &'static str {
        match self {
            OpKind::Set => "SET",
            OpKind::Get => "GET",
            OpKind::Update => "UPDATE",
            OpKind::Delete => "DELETE",
        }
    }

    fn from_index(index: usize) -> OpKind {
        match index {
            0 => OpKind::Set,
            1 => OpKind::Get,
            2 => OpKind::Update,
            _ => OpKind::Delete,
        }
    }
}

/// Per-operation completion and success tallies
#[derive(Debug, Clone, Default)]
pub struct OpStats {
    completed: [u64; OpKind::COUNT],
    succeeded: [u64; OpKind::COUNT],
}

impl OpStats {
    fn record(&mut self, op: OpKind, success: bool) {
        self.completed[op as usize] += 1;
        if success {
            self.succeeded[op as usize] += 1;
        }
    }

    fn merge(&mut self, other: &OpStats) {
        for i in 0..OpKind::COUNT {
            self.completed[i] += other.completed[i];
            self.succeeded[i] += other.succeeded[i];
        }
    }

    pub fn completed(&self, op: OpKind) -> u64 {
        self.completed[op as usize]
    }

    pub fn succeeded(&self, op: OpKind) -> u64 {
        self.succeeded[op as usize]
    }

    pub fn total_completed(&self) -> u64 {
        self.completed.iter().sum()
    }

    pub fn total_succeeded(&self) -> u64 {
        self.succeeded.iter().sum()
    }
}

/// Aggregated results of a workload run
#[derive(Debug, Clone)]
pub struct WorkloadReport {
    pub stats: OpStats,
    pub elapsed: Duration,
}

impl fmt::Display for WorkloadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<10} {:>12} {:>12}",
            "Operation", "Succeeded", "Completed"
        )?;
        for op in OpKind::ALL {
            writeln!(
                f,
                "{:<10} {:>12} {:>12}",
                op.name(),
                self.stats.succeeded(op),
                self.stats.completed(op)
            )?;
        }
        writeln!(
            f,
            "{:<10} {:>12} {:>12}",
            "Total",
            self.stats.total_succeeded(),
            self.stats.total_completed()
        )?;
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            write!(
                f,
                "Elapsed: {:.2}s ({:.1} ops/sec)",
                secs,
                self.stats.total_completed() as f64 / secs
            )
        } else {
            write!(f, "Elapsed: {:.2}s", secs)
        }
    }
}

// =============================================================================
// Progress Counter
// =============================================================================

/// Shared completed-op counter; logs a line at every 10% step
struct Progress {
    done: AtomicU64,
    total: u64,
}

impl Progress {
    fn new(total: u64) -> Self {
        Self {
            done: AtomicU64::new(0),
            total,
        }
    }

    fn bump(&self) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        let step = self.total / 10;
        if step > 0 && done % step == 0 {
            tracing::info!(
                "Progress: {}% ({}/{} ops)",
                done * 100 / self.total,
                done,
                self.total
            );
        }
    }
}

// =============================================================================
// Worker
// =============================================================================

/// One workload thread: a connection plus the state to verify it
struct Worker<'a> {
    client: Client,
    rng: StdRng,

    /// Keys currently live on the store, in insertion order
    keys: Vec<Vec<u8>>,

    /// Expected value for every live key
    expected: HashMap<Vec<u8>, Vec<u8>>,

    stats: OpStats,
    key_len: usize,
    fixed_value_len: usize,
    max_value_len: usize,
    fixed_size: bool,

    /// Max live records this worker may hold at once
    quota: u64,

    progress: &'a Progress,
}

impl<'a> Worker<'a> {
    fn new(
        client_config: ClientConfig,
        workload: &WorkloadConfig,
        index: usize,
        progress: &'a Progress,
    ) -> Self {
        let rng = StdRng::seed_from_u64(workload.seed.wrapping_add(index as u64));
        let key_len = (client_config.max_key_size / 8).max(1);
        let fixed_value_len = (client_config.max_value_size / 32).max(MIN_VALUE_LEN);
        let max_value_len = (client_config.max_value_size / 8).max(MIN_VALUE_LEN + 1);
        let quota = (workload.records / workload.threads.max(1) as u64).max(1);

        Self {
            client: Client::new(client_config),
            rng,
            keys: Vec::new(),
            expected: HashMap::new(),
            stats: OpStats::default(),
            key_len,
            fixed_value_len,
            max_value_len,
            fixed_size: workload.fixed_size,
            quota,
            progress,
        }
    }

    fn run_ops(&mut self, ops: u64) -> Result<()> {
        for _ in 0..ops {
            match self.pick_op() {
                OpKind::Set => self.do_set()?,
                OpKind::Get => self.do_get()?,
                OpKind::Update => self.do_update()?,
                OpKind::Delete => self.do_delete()?,
            }
            self.progress.bump();
        }
        Ok(())
    }

    fn pick_op(&mut self) -> OpKind {
        if self.keys.is_empty() {
            // Nothing stored yet, only SET makes progress
            return OpKind::Set;
        }
        loop {
            let op = OpKind::from_index(self.rng.gen_range(0..OpKind::COUNT));
            if op == OpKind::Set && self.keys.len() as u64 >= self.quota {
                continue;
            }
            return op;
        }
    }

    fn do_set(&mut self) -> Result<()> {
        let key = self.random_bytes(self.key_len);
        let len = self.value_len();
        let value = self.random_bytes(len);

        let ok = self.client.set(&key, &value)?;
        self.stats.record(OpKind::Set, ok);
        if ok && self.expected.insert(key.clone(), value).is_none() {
            self.keys.push(key);
        }
        Ok(())
    }

    fn do_get(&mut self) -> Result<()> {
        let idx = self.rng.gen_range(0..self.keys.len());
        let key = self.keys[idx].clone();

        let ok = match self.client.get(&key)? {
            Some(value) => self.expected.get(&key) == Some(&value),
            None => false,
        };
        if !ok {
            tracing::warn!(
                "GET verification failed for key {}",
                String::from_utf8_lossy(&key)
            );
        }
        self.stats.record(OpKind::Get, ok);
        Ok(())
    }

    fn do_update(&mut self) -> Result<()> {
        let idx = self.rng.gen_range(0..self.keys.len());
        let key = self.keys[idx].clone();
        let value_len = match self.expected.get(&key) {
            Some(value) => value.len(),
            None => {
                self.stats.record(OpKind::Update, false);
                return Ok(());
            }
        };

        // Patch a random in-bounds range of the stored value
        let update_len = self.rng.gen_range(1..=value_len);
        let offset = self.rng.gen_range(0..=value_len - update_len) as u32;
        let patch = self.random_bytes(update_len);

        let ok = self.client.update(&key, &patch, offset)?;
        self.stats.record(OpKind::Update, ok);
        if ok {
            if let Some(value) = self.expected.get_mut(&key) {
                let start = offset as usize;
                value[start..start + update_len].copy_from_slice(&patch);
            }
        }
        Ok(())
    }

    fn do_delete(&mut self) -> Result<()> {
        let idx = self.rng.gen_range(0..self.keys.len());
        let key = self.keys[idx].clone();

        let mut ok = self.client.delete(&key)?;
        if ok {
            self.keys.swap_remove(idx);
            self.expected.remove(&key);

            // Deleted keys must read back as absent
            ok = self.client.get(&key)?.is_none();
            if !ok {
                tracing::warn!(
                    "Deleted key {} still readable",
                    String::from_utf8_lossy(&key)
                );
            }
        }
        self.stats.record(OpKind::Delete, ok);
        Ok(())
    }

    fn value_len(&mut self) -> usize {
        if self.fixed_size {
            self.fixed_value_len
        } else {
            self.rng.gen_range(0..self.max_value_len).max(MIN_VALUE_LEN)
        }
    }

    fn random_bytes(&mut self, len: usize) -> Vec<u8> {
        (0..len)
            .map(|_| CHARSET[self.rng.gen_range(0..CHARSET.len())])
            .collect()
    }
}

// =============================================================================
// Runner
// =============================================================================

/// Operation count for worker `index`, splitting the remainder across the
/// first workers
fn worker_ops(total: u64, threads: usize, index: usize) -> u64 {
    let base = total / threads as u64;
    let extra = total % threads as u64;
    base + u64::from((index as u64) < extra)
}

/// Run the workload: spawn one worker per thread, join them all, merge
/// their statistics
pub fn run(workload: &WorkloadConfig, client_config: &ClientConfig) -> Result<WorkloadReport> {
    let threads = workload.threads.max(1);
    let progress = Progress::new(workload.ops);
    let started = Instant::now();

    tracing::info!(
        "Starting workload: {} ops across {} workers against {}:{}",
        workload.ops,
        threads,
        client_config.host,
        client_config.port
    );

    let totals = thread::scope(|s| -> Result<OpStats> {
        let mut handles = Vec::with_capacity(threads);
        for index in 0..threads {
            let progress = &progress;
            handles.push(s.spawn(move |_| -> Result<OpStats> {
                let mut config = client_config.clone();
                // Disjoint id ranges keep concurrent requests apart in
                // gateway logs
                config.start_id = (u32::MAX / threads as u32) * index as u32;

                let mut worker = Worker::new(config, workload, index, progress);
                worker.client.connect()?;
                worker.run_ops(worker_ops(workload.ops, threads, index))?;
                worker.client.disconnect()?;
                Ok(worker.stats)
            }));
        }

        let mut totals = OpStats::default();
        for handle in handles {
            let stats = handle
                .join()
                .map_err(|_| ClientError::Worker("worker thread panicked".to_string()))??;
            totals.merge(&stats);
        }
        Ok(totals)
    })
    .map_err(|_| ClientError::Worker("workload scope panicked".to_string()))??;

    Ok(WorkloadReport {
        stats: totals,
        elapsed: started.elapsed(),
    })
}
