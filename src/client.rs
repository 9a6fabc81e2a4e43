//! Client connection
//!
//! One [`Client`] owns one TCP connection to a NimbusKV gateway and runs
//! the five protocol operations over it: REGISTER (inside [`Client::connect`]),
//! GET, SET, UPDATE and DELETE.
//!
//! At most one request is outstanding at a time; `&mut self` on every
//! operation enforces that. Each operation is a strict sequence: encode,
//! write, read the 10-byte response header, check the request id, read the
//! declared payload, interpret it by the response kind.
//!
//! Reads are blocking with no timeout. A short read is retried until the
//! expected byte count arrives; end of stream before that yields
//! [`ClientError::UnexpectedEof`]. A blocked read returns only when data
//! arrives or the peer closes the socket.

use std::io::{BufReader, BufWriter, Read, Write};
use std::net::{Shutdown, TcpStream};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::protocol::{
    encode_header, encode_key_message, encode_key_value_message,
    encode_key_value_update_message, parse_header, parse_key_payload,
    parse_key_value_payload, parse_key_value_update_payload, Header, Limits, Magic,
    MessageKind, Opcode, Peer, HEADER_SIZE,
};

/// Magic byte of every client request: application addressing the gateway
const REQUEST_MAGIC: Magic = Magic::new(MessageKind::Request, Peer::Application, Peer::Gateway);

// =============================================================================
// Request Id Counter
// =============================================================================

/// Wrapping 32-bit request-id counter
///
/// Yields `seed + 1`, `seed + 2`, ... and wraps to 0 instead of ever
/// producing `u32::MAX`, which is reserved as the invalid-id sentinel.
#[derive(Debug, Clone)]
pub struct RequestCounter {
    current: u32,
}

impl RequestCounter {
    /// Create a counter; the first issued id is `seed + 1`
    pub fn new(seed: u32) -> Self {
        Self { current: seed }
    }

    /// Issue the next request id
    pub fn next_id(&mut self) -> u32 {
        self.current = if self.current >= u32::MAX - 1 {
            0
        } else {
            self.current + 1
        };
        self.current
    }
}

// =============================================================================
// Connection
// =============================================================================

/// Live socket state: buffered reader and writer over one TCP stream
struct Connection {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    peer_addr: String,
}

impl Connection {
    fn open(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;

        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            peer_addr,
        })
    }
}

// =============================================================================
// Client
// =============================================================================

/// Synchronous NimbusKV client over a single persistent connection
pub struct Client {
    config: ClientConfig,
    limits: Limits,
    counter: RequestCounter,

    /// Live connection; `None` before `connect` and after `disconnect`
    conn: Option<Connection>,

    /// Set by `disconnect`; a closed client is not reusable
    closed: bool,

    /// Receive buffer reused across operations. Payload views borrow from
    /// it, so values handed to callers are always owned copies.
    recv_buf: Vec<u8>,
}

impl Client {
    /// Create an unconnected client
    pub fn new(config: ClientConfig) -> Self {
        let limits = Limits::new(config.max_key_size, config.max_value_size);
        let counter = RequestCounter::new(config.start_id);
        Self {
            config,
            limits,
            counter,
            conn: None,
            closed: false,
            recv_buf: Vec::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Dial the gateway and perform the REGISTER handshake
    ///
    /// A no-op when already connected. Fails with
    /// [`ClientError::Disconnected`] after `disconnect`: a closed client is
    /// not reusable, build a fresh one instead.
    pub fn connect(&mut self) -> Result<()> {
        if self.closed {
            return Err(ClientError::Disconnected);
        }
        if self.conn.is_some() {
            return Ok(());
        }

        let addr = format!("{}:{}", self.config.host, self.config.port);
        tracing::debug!("Connecting to {}", addr);
        self.conn = Some(Connection::open(&addr)?);

        if let Err(e) = self.register() {
            // Failed handshake: drop the socket, leave the client reusable
            // for another connect attempt.
            self.conn = None;
            return Err(e);
        }

        tracing::debug!("Registered with gateway at {}", addr);
        Ok(())
    }

    /// Shut the connection down
    ///
    /// Idempotent. Every later operation, including `connect`, fails with
    /// [`ClientError::Disconnected`].
    pub fn disconnect(&mut self) -> Result<()> {
        self.closed = true;
        if let Some(conn) = self.conn.take() {
            tracing::debug!("Disconnecting from {}", conn.peer_addr);
            match conn.writer.get_ref().shutdown(Shutdown::Both) {
                Ok(()) => {}
                // Peer already gone; the socket is closed either way
                Err(e) if e.kind() == std::io::ErrorKind::NotConnected => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Fetch the value stored under `key`
    ///
    /// Returns `Ok(None)` when the store reports the key absent.
    pub fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let id = self.counter.next_id();
        let message = encode_key_message(REQUEST_MAGIC, Opcode::Get, id, key, &self.limits)?;
        self.send(&message)?;

        let header = self.read_response_header(id)?;
        self.read_exact_into(header.length as usize)?;

        if header.is_success() {
            let payload = parse_key_value_payload(&self.recv_buf)?;
            if !payload.matches_key(key) {
                return Err(ClientError::KeyMismatch {
                    expected: key.to_vec(),
                    actual: payload.key.to_vec(),
                });
            }
            Ok(Some(payload.value.to_vec()))
        } else {
            let payload = parse_key_payload(&self.recv_buf)?;
            tracing::debug!("GET miss for key {}", String::from_utf8_lossy(payload.key));
            Ok(None)
        }
    }

    /// Store `value` under `key`
    ///
    /// Returns `Ok(false)` when the store rejects the write.
    pub fn set(&mut self, key: &[u8], value: &[u8]) -> Result<bool> {
        let id = self.counter.next_id();
        let message =
            encode_key_value_message(REQUEST_MAGIC, Opcode::Set, id, key, value, &self.limits)?;
        self.send(&message)?;

        let header = self.read_response_header(id)?;
        self.read_exact_into(header.length as usize)?;

        let payload = parse_key_payload(&self.recv_buf)?;
        if header.is_success() {
            if !payload.matches_key(key) {
                return Err(ClientError::KeyMismatch {
                    expected: key.to_vec(),
                    actual: payload.key.to_vec(),
                });
            }
            Ok(true)
        } else {
            tracing::debug!("SET rejected for key {}", String::from_utf8_lossy(payload.key));
            Ok(false)
        }
    }

    /// Overwrite `update.len()` bytes of the value under `key`, starting at
    /// byte `offset`
    ///
    /// Returns `Ok(false)` when the store rejects the update (key absent or
    /// range out of bounds).
    pub fn update(&mut self, key: &[u8], update: &[u8], offset: u32) -> Result<bool> {
        let id = self.counter.next_id();
        let message = encode_key_value_update_message(
            REQUEST_MAGIC,
            Opcode::Update,
            id,
            key,
            update,
            offset,
            &self.limits,
        )?;
        self.send(&message)?;

        let header = self.read_response_header(id)?;
        self.read_exact_into(header.length as usize)?;

        if header.is_success() {
            let payload = parse_key_value_update_payload(&self.recv_buf)?;
            if !payload.matches_key(key) {
                return Err(ClientError::KeyMismatch {
                    expected: key.to_vec(),
                    actual: payload.key.to_vec(),
                });
            }
            // The ack may omit the update bytes, so the echoed range is the
            // only confirmation of what was patched
            if payload.update_size != update.len() as u32 || payload.update_offset != offset {
                return Err(ClientError::Protocol(format!(
                    "Update acknowledgment range mismatch: expected {} bytes at offset {}, got {} at {}",
                    update.len(),
                    offset,
                    payload.update_size,
                    payload.update_offset
                )));
            }
            Ok(true)
        } else {
            let payload = parse_key_payload(&self.recv_buf)?;
            tracing::debug!(
                "UPDATE rejected for key {}",
                String::from_utf8_lossy(payload.key)
            );
            Ok(false)
        }
    }

    /// Remove the value stored under `key`
    ///
    /// Returns `Ok(false)` when the store rejects the delete (key absent).
    pub fn delete(&mut self, key: &[u8]) -> Result<bool> {
        let id = self.counter.next_id();
        let message = encode_key_message(REQUEST_MAGIC, Opcode::Delete, id, key, &self.limits)?;
        self.send(&message)?;

        let header = self.read_response_header(id)?;
        self.read_exact_into(header.length as usize)?;

        let payload = parse_key_payload(&self.recv_buf)?;
        if header.is_success() {
            if !payload.matches_key(key) {
                return Err(ClientError::KeyMismatch {
                    expected: key.to_vec(),
                    actual: payload.key.to_vec(),
                });
            }
            Ok(true)
        } else {
            tracing::debug!(
                "DELETE rejected for key {}",
                String::from_utf8_lossy(payload.key)
            );
            Ok(false)
        }
    }

    // -------------------------------------------------------------------------
    // Handshake
    // -------------------------------------------------------------------------

    /// REGISTER exchange: header-only request, header-only response
    fn register(&mut self) -> Result<()> {
        let id = self.counter.next_id();
        let message = encode_header(REQUEST_MAGIC, Opcode::Register, id);
        self.send(&message)?;

        let header = self.read_response_header(id)?;
        if header.length != 0 {
            return Err(ClientError::Protocol(format!(
                "Unexpected {}-byte payload in registration response",
                header.length
            )));
        }
        if !header.is_success() {
            return Err(ClientError::HandshakeRejected);
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Wire helpers
    // -------------------------------------------------------------------------

    /// Write a complete message and flush it
    fn send(&mut self, message: &[u8]) -> Result<()> {
        if self.closed {
            return Err(ClientError::Disconnected);
        }
        let conn = self.conn.as_mut().ok_or(ClientError::NotConnected)?;
        conn.writer.write_all(message)?;
        conn.writer.flush()?;
        tracing::trace!("Sent {} bytes to {}", message.len(), conn.peer_addr);
        Ok(())
    }

    /// Read the response header and validate the request id
    ///
    /// A mismatched id or a non-response kind fails the operation, but the
    /// frame's declared payload is still drained first so the stream stays
    /// framed for the next request.
    fn read_response_header(&mut self, expected_id: u32) -> Result<Header> {
        self.read_exact_into(HEADER_SIZE)?;
        let header = parse_header(&self.recv_buf)?;

        if header.id != expected_id {
            tracing::warn!(
                "Response id mismatch: expected {}, got {}",
                expected_id,
                header.id
            );
            self.read_exact_into(header.length as usize)?;
            return Err(ClientError::IdMismatch {
                expected: expected_id,
                actual: header.id,
            });
        }
        if !header.is_response() {
            self.read_exact_into(header.length as usize)?;
            return Err(ClientError::Protocol(format!(
                "Unexpected message kind in response: {:?}",
                header.magic.kind
            )));
        }
        Ok(header)
    }

    /// Read exactly `count` bytes into the receive buffer
    ///
    /// Accumulates plain reads until the target count; a short read is not
    /// an error, end of stream before the target is.
    fn read_exact_into(&mut self, count: usize) -> Result<()> {
        if self.closed {
            return Err(ClientError::Disconnected);
        }
        let conn = self.conn.as_mut().ok_or(ClientError::NotConnected)?;

        self.recv_buf.resize(count, 0);
        let mut received = 0;
        while received < count {
            let n = conn.reader.read(&mut self.recv_buf[received..count])?;
            if n == 0 {
                return Err(ClientError::UnexpectedEof {
                    expected: count,
                    received,
                });
            }
            received += n;
        }
        Ok(())
    }
}
