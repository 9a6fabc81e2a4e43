//! In-memory NimbusKV server double
//!
//! Speaks the full wire protocol over real TCP sockets so tests exercise
//! the production read/write paths end to end. One thread per connection,
//! one shared map as the store. UPDATE acknowledgments are sent without
//! the update body, the way the real gateway replies.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use nimbuskv_client::protocol::{
    encode_header, encode_key_message, encode_key_value_message, parse_header,
    parse_key_payload, parse_key_value_payload, parse_key_value_update_payload, Header,
    Limits, Magic, MessageKind, Opcode, Peer, HEADER_SIZE, KEY_VALUE_UPDATE_BASE_SIZE,
};
use nimbuskv_client::{Client, ClientConfig};

/// Magic for success responses: gateway answering the application
pub const SUCCESS_MAGIC: Magic = Magic::new(
    MessageKind::SuccessResponse,
    Peer::Gateway,
    Peer::Application,
);

/// Magic for failure responses: gateway answering the application
pub const FAILURE_MAGIC: Magic = Magic::new(
    MessageKind::FailureResponse,
    Peer::Gateway,
    Peer::Application,
);

type Store = Arc<Mutex<HashMap<Vec<u8>, Vec<u8>>>>;

/// A listening server double; accepts any number of connections
pub struct TestServer {
    port: u16,
    store: Store,
}

impl TestServer {
    /// Bind to an ephemeral port and start accepting connections
    pub fn start() -> TestServer {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let store: Store = Arc::new(Mutex::new(HashMap::new()));

        let accept_store = Arc::clone(&store);
        thread::spawn(move || {
            for stream in listener.incoming() {
                match stream {
                    Ok(stream) => {
                        let store = Arc::clone(&accept_store);
                        thread::spawn(move || serve_connection(stream, store));
                    }
                    Err(_) => break,
                }
            }
        });

        TestServer { port, store }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Client config pointed at this server
    pub fn config(&self) -> ClientConfig {
        ClientConfig::builder().host("127.0.0.1").port(self.port).build()
    }

    /// Unconnected client pointed at this server
    pub fn client(&self) -> Client {
        Client::new(self.config())
    }

    /// Peek at the stored value for `key`, bypassing the protocol
    pub fn value_of(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.store.lock().unwrap().get(key).cloned()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.store.lock().unwrap().len()
    }
}

fn serve_connection(mut stream: TcpStream, store: Store) {
    let _ = stream.set_nodelay(true);
    let mut header_buf = [0u8; HEADER_SIZE];

    loop {
        if stream.read_exact(&mut header_buf).is_err() {
            return; // client gone
        }
        let header = match parse_header(&header_buf) {
            Ok(h) => h,
            Err(_) => return,
        };

        let mut payload = vec![0u8; header.length as usize];
        if header.length > 0 && stream.read_exact(&mut payload).is_err() {
            return;
        }

        let reply = handle_message(&header, &payload, &store);
        if stream.write_all(&reply).is_err() {
            return;
        }
    }
}

fn handle_message(header: &Header, payload: &[u8], store: &Store) -> Vec<u8> {
    let limits = Limits::default();
    match header.opcode {
        Opcode::Register => encode_header(SUCCESS_MAGIC, Opcode::Register, header.id),

        Opcode::Get => {
            let req = parse_key_payload(payload).unwrap();
            let stored = store.lock().unwrap().get(req.key).cloned();
            match stored {
                Some(value) => encode_key_value_message(
                    SUCCESS_MAGIC,
                    Opcode::Get,
                    header.id,
                    req.key,
                    &value,
                    &limits,
                )
                .unwrap(),
                None => {
                    encode_key_message(FAILURE_MAGIC, Opcode::Get, header.id, req.key, &limits)
                        .unwrap()
                }
            }
        }

        Opcode::Set => {
            let req = parse_key_value_payload(payload).unwrap();
            store
                .lock()
                .unwrap()
                .insert(req.key.to_vec(), req.value.to_vec());
            encode_key_message(SUCCESS_MAGIC, Opcode::Set, header.id, req.key, &limits).unwrap()
        }

        Opcode::Update => {
            let req = parse_key_value_update_payload(payload).unwrap();
            let mut entries = store.lock().unwrap();
            let patched = match (entries.get_mut(req.key), req.update) {
                (Some(value), Some(update)) => {
                    let start = req.update_offset as usize;
                    let end = start + update.len();
                    if end <= value.len() {
                        value[start..end].copy_from_slice(update);
                        true
                    } else {
                        false
                    }
                }
                _ => false,
            };
            if patched {
                update_ack(
                    SUCCESS_MAGIC,
                    header.id,
                    req.key,
                    req.update_size,
                    req.update_offset,
                )
            } else {
                encode_key_message(FAILURE_MAGIC, Opcode::Update, header.id, req.key, &limits)
                    .unwrap()
            }
        }

        Opcode::Delete => {
            let req = parse_key_payload(payload).unwrap();
            let removed = store.lock().unwrap().remove(req.key).is_some();
            let magic = if removed { SUCCESS_MAGIC } else { FAILURE_MAGIC };
            encode_key_message(magic, Opcode::Delete, header.id, req.key, &limits).unwrap()
        }
    }
}

/// Bodyless UPDATE acknowledgment: declares the patched range but omits
/// the update bytes. Hand-assembled so the double does not depend on the
/// client's encoders for this shape.
pub fn update_ack(magic: Magic, id: u32, key: &[u8], size: u32, offset: u32) -> Vec<u8> {
    let payload_len = KEY_VALUE_UPDATE_BASE_SIZE + key.len();
    let mut msg = Vec::with_capacity(HEADER_SIZE + payload_len);
    msg.push(magic.to_byte());
    msg.push(Opcode::Update as u8);
    msg.extend_from_slice(&(payload_len as u32).to_be_bytes());
    msg.extend_from_slice(&id.to_be_bytes());
    msg.push(key.len() as u8);
    msg.extend_from_slice(&size.to_be_bytes()[1..]); // u24, big-endian
    msg.extend_from_slice(&offset.to_be_bytes()[1..]); // u24, big-endian
    msg.extend_from_slice(key);
    msg
}
