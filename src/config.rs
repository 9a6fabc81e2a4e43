//! Configuration for the NimbusKV client
//!
//! Centralized configuration with sensible defaults.

/// Default store port
pub const DEFAULT_PORT: u16 = 9110;

/// Default maximum key size in bytes
pub const DEFAULT_KEY_SIZE: usize = 255;

/// Default maximum value size in bytes (one chunk)
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Main configuration for a client connection
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Store hostname or IP address
    pub host: String,

    /// Store TCP port
    pub port: u16,

    // -------------------------------------------------------------------------
    // Size Configuration
    // -------------------------------------------------------------------------
    /// Max key size accepted by the store (bytes)
    pub max_key_size: usize,

    /// Max value size accepted by the store (bytes)
    pub max_value_size: usize,

    // -------------------------------------------------------------------------
    // Request Id Configuration
    // -------------------------------------------------------------------------
    /// Seed for the request-id counter; the first issued id is `start_id + 1`.
    /// Workers sharing a store must use disjoint ranges.
    pub start_id: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            max_key_size: DEFAULT_KEY_SIZE,
            max_value_size: DEFAULT_CHUNK_SIZE,
            start_id: 0,
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the store hostname or IP address
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the store TCP port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the maximum key size (in bytes)
    pub fn max_key_size(mut self, size: usize) -> Self {
        self.config.max_key_size = size;
        self
    }

    /// Set the maximum value size (in bytes)
    pub fn max_value_size(mut self, size: usize) -> Self {
        self.config.max_value_size = size;
        self
    }

    /// Set the request-id counter seed
    pub fn start_id(mut self, id: u32) -> Self {
        self.config.start_id = id;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}
