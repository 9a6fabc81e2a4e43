//! NimbusKV Load Generator
//!
//! Drives a multi-threaded random-operation workload against a store and
//! prints per-operation statistics.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use nimbuskv_client::harness::workload::{self, WorkloadConfig};
use nimbuskv_client::ClientConfig;

/// NimbusKV load generator
#[derive(Parser, Debug)]
#[command(name = "nimbuskv-bench")]
#[command(about = "Load generator for the NimbusKV key-value store")]
#[command(version)]
struct Args {
    /// Store hostname or IP address
    #[arg(long, env = "NIMBUS_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Store TCP port
    #[arg(long, env = "NIMBUS_PORT", default_value_t = 9110)]
    port: u16,

    /// Maximum key size in bytes
    #[arg(long, env = "NIMBUS_KEY_SIZE", default_value_t = 255)]
    key_size: usize,

    /// Maximum value size in bytes
    #[arg(long, env = "NIMBUS_CHUNK_SIZE", default_value_t = 4096)]
    chunk_size: usize,

    /// Target number of live records across all workers
    #[arg(short, long, default_value_t = 1000)]
    records: u64,

    /// Worker thread count
    #[arg(short, long, default_value_t = 4)]
    threads: usize,

    /// Total operation count
    #[arg(short, long, default_value_t = 10000)]
    ops: u64,

    /// Generate fixed-size values instead of random sizes
    #[arg(long)]
    fixed_size: bool,

    /// Workload RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,nimbuskv_client=info"));

    fmt().with_env_filter(filter).with_target(false).init();

    let args = Args::parse();

    tracing::info!("NimbusKV bench v{}", nimbuskv_client::VERSION);

    let client_config = ClientConfig::builder()
        .host(&args.host)
        .port(args.port)
        .max_key_size(args.key_size)
        .max_value_size(args.chunk_size)
        .build();

    let workload_config = WorkloadConfig {
        records: args.records,
        threads: args.threads,
        ops: args.ops,
        fixed_size: args.fixed_size,
        seed: args.seed,
    };

    match workload::run(&workload_config, &client_config) {
        Ok(report) => println!("{}", report),
        Err(e) => {
            tracing::error!("Workload failed: {}", e);
            std::process::exit(1);
        }
    }
}
