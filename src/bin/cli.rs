//! NimbusKV CLI Client
//!
//! One-shot command-line client: connect, run a single operation, print
//! the result.

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use nimbuskv_client::{Client, ClientConfig};

/// NimbusKV CLI
#[derive(Parser, Debug)]
#[command(name = "nimbuskv-cli")]
#[command(about = "CLI for the NimbusKV key-value store")]
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

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to look up
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to store
        value: String,
    },

    /// Overwrite part of a stored value
    Update {
        /// The key to update
        key: String,

        /// The replacement bytes
        value: String,

        /// Byte offset where the replacement starts
        #[arg(short, long, default_value_t = 0)]
        offset: u32,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,nimbuskv_client=info"));

    fmt().with_env_filter(filter).with_target(false).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> nimbuskv_client::Result<()> {
    let config = ClientConfig::builder()
        .host(&args.host)
        .port(args.port)
        .max_key_size(args.key_size)
        .max_value_size(args.chunk_size)
        .build();

    let mut client = Client::new(config);
    client.connect()?;

    match &args.command {
        Commands::Get { key } => match client.get(key.as_bytes())? {
            Some(value) => println!("{}", String::from_utf8_lossy(&value)),
            None => println!("(not found)"),
        },
        Commands::Set { key, value } => {
            if client.set(key.as_bytes(), value.as_bytes())? {
                println!("OK");
            } else {
                println!("(rejected)");
            }
        }
        Commands::Update { key, value, offset } => {
            if client.update(key.as_bytes(), value.as_bytes(), *offset)? {
                println!("OK");
            } else {
                println!("(rejected)");
            }
        }
        Commands::Del { key } => {
            if client.delete(key.as_bytes())? {
                println!("OK");
            } else {
                println!("(not found)");
            }
        }
    }

    client.disconnect()?;
    Ok(())
}
