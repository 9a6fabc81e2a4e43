//! Protocol Module
//!
//! Defines the NimbusKV wire protocol shared by requests and responses.
//!
//! ## Message Format
//!
//! Every message starts with a fixed 10-byte header; byte order is
//! big-endian throughout.
//!
//! ```text
//! ┌───────────┬───────────┬────────────────────┬────────────────────┐
//! │ Magic (1) │ Opcode(1) │ Payload length (4) │   Request id (4)   │
//! └───────────┴───────────┴────────────────────┴────────────────────┘
//! ```
//!
//! ### Magic Byte
//! ```text
//!   bit  7    6 5    4 3    2 1 0
//!      ┌───┬──────┬──────┬───────┐
//!      │ 0 │  to  │ from │ kind  │
//!      └───┴──────┴──────┴───────┘
//! ```
//! - kind: 0x00 HEARTBEAT, 0x01 REQUEST, 0x02 RESPONSE_SUCCESS,
//!   0x03 RESPONSE_FAILURE (4-7 reserved)
//! - from/to peer codes: 0 application, 1 coordinator, 2 gateway, 3 store
//! - bit 7 reserved, must be zero
//!
//! ### Opcodes
//! - 0x00: REGISTER - header-only handshake
//! - 0x01: GET      - Payload: key
//! - 0x02: SET      - Payload: key + value
//! - 0x03: UPDATE   - Payload: key + update bytes + offset
//! - 0x04: DELETE   - Payload: key
//!
//! ### Payload Shapes
//! ```text
//! Key:              key_len (1) + key
//! Key-value:        key_len (1) + value_len (3) + key + value
//! Key-value-update: key_len (1) + update_len (3) + update_offset (3)
//!                   + key + update bytes
//! ```
//! The 1-byte key length caps keys at 255 bytes; the 3-byte value fields
//! cap values at 16 MiB - 1. Success responses echo the request's payload
//! shape (GET success carries a key-value payload); failure responses
//! always carry a key payload.

mod codec;
mod payload;

pub use codec::{
    encode_header, encode_key_message, encode_key_value_message,
    encode_key_value_update_message, parse_header, parse_key_payload,
    parse_key_value_payload, parse_key_value_update_payload,
};
pub use payload::{KeyPayload, KeyValuePayload, KeyValueUpdatePayload};

use crate::error::{ClientError, Result};

// =============================================================================
// Wire Constants
// =============================================================================

/// Fixed header size: magic (1) + opcode (1) + length (4) + id (4)
pub const HEADER_SIZE: usize = 10;

/// Fixed portion of a key payload: key_len (1)
pub const KEY_BASE_SIZE: usize = 1;

/// Fixed portion of a key-value payload: key_len (1) + value_len (3)
pub const KEY_VALUE_BASE_SIZE: usize = 4;

/// Fixed portion of a key-value-update payload:
/// key_len (1) + update_len (3) + update_offset (3)
pub const KEY_VALUE_UPDATE_BASE_SIZE: usize = 7;

/// Largest key the 1-byte length field can carry
pub const MAX_KEY_SIZE: usize = 255;

/// Largest value the 3-byte length fields can carry
pub const MAX_VALUE_SIZE: usize = 16_777_215;

/// Largest payload any well-formed message can declare
pub const MAX_PAYLOAD_SIZE: u32 =
    (KEY_VALUE_UPDATE_BASE_SIZE + MAX_KEY_SIZE + MAX_VALUE_SIZE) as u32;

// Magic byte bit layout
const KIND_MASK: u8 = 0x07;
const PEER_MASK: u8 = 0x03;
const FROM_SHIFT: u8 = 3;
const TO_SHIFT: u8 = 5;
const RESERVED_BIT: u8 = 0x80;

// =============================================================================
// Message Kind
// =============================================================================

/// Message kind carried in the low bits of the magic byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageKind {
    Heartbeat = 0x00,
    Request = 0x01,
    SuccessResponse = 0x02,
    FailureResponse = 0x03,
}

impl MessageKind {
    fn from_bits(bits: u8) -> Result<Self> {
        match bits {
            0x00 => Ok(MessageKind::Heartbeat),
            0x01 => Ok(MessageKind::Request),
            0x02 => Ok(MessageKind::SuccessResponse),
            0x03 => Ok(MessageKind::FailureResponse),
            other => Err(ClientError::Protocol(format!(
                "Unknown message kind: 0x{:02x}",
                other
            ))),
        }
    }
}

// =============================================================================
// Peer
// =============================================================================

/// Node roles addressable in the magic byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Peer {
    Application = 0x00,
    Coordinator = 0x01,
    Gateway = 0x02,
    Store = 0x03,
}

impl Peer {
    fn from_bits(bits: u8) -> Self {
        match bits & PEER_MASK {
            0x00 => Peer::Application,
            0x01 => Peer::Coordinator,
            0x02 => Peer::Gateway,
            _ => Peer::Store,
        }
    }
}

// =============================================================================
// Magic
// =============================================================================

/// Decoded magic byte: message kind plus sender and receiver roles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Magic {
    pub kind: MessageKind,
    pub from: Peer,
    pub to: Peer,
}

impl Magic {
    pub const fn new(kind: MessageKind, from: Peer, to: Peer) -> Self {
        Self { kind, from, to }
    }

    /// Pack into the wire byte
    pub fn to_byte(self) -> u8 {
        self.kind as u8 | (self.from as u8) << FROM_SHIFT | (self.to as u8) << TO_SHIFT
    }

    /// Unpack from the wire byte
    ///
    /// Fails on a set reserved bit or a reserved kind value.
    pub fn from_byte(byte: u8) -> Result<Self> {
        if byte & RESERVED_BIT != 0 {
            return Err(ClientError::Protocol(format!(
                "Reserved magic bit set: 0x{:02x}",
                byte
            )));
        }
        let kind = MessageKind::from_bits(byte & KIND_MASK)?;
        let from = Peer::from_bits(byte >> FROM_SHIFT);
        let to = Peer::from_bits(byte >> TO_SHIFT);
        Ok(Self { kind, from, to })
    }
}

// =============================================================================
// Opcode
// =============================================================================

/// Operation codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    Register = 0x00,
    Get = 0x01,
    Set = 0x02,
    Update = 0x03,
    Delete = 0x04,
}

impl Opcode {
    pub fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            0x00 => Ok(Opcode::Register),
            0x01 => Ok(Opcode::Get),
            0x02 => Ok(Opcode::Set),
            0x03 => Ok(Opcode::Update),
            0x04 => Ok(Opcode::Delete),
            other => Err(ClientError::Protocol(format!(
                "Unknown opcode: 0x{:02x}",
                other
            ))),
        }
    }
}

// =============================================================================
// Header
// =============================================================================

/// Parsed fixed header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub magic: Magic,
    pub opcode: Opcode,
    /// Payload length in bytes (excludes the header itself)
    pub length: u32,
    /// Request id this message belongs to
    pub id: u32,
}

impl Header {
    pub fn is_success(&self) -> bool {
        self.magic.kind == MessageKind::SuccessResponse
    }

    pub fn is_failure(&self) -> bool {
        self.magic.kind == MessageKind::FailureResponse
    }

    /// True for either response kind
    pub fn is_response(&self) -> bool {
        self.is_success() || self.is_failure()
    }
}

// =============================================================================
// Limits
// =============================================================================

/// Encoder-side size limits, clamped to what the wire format can carry
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub max_key_size: usize,
    pub max_value_size: usize,
}

impl Limits {
    /// Build limits from configured sizes, clamped to the wire caps
    pub fn new(max_key_size: usize, max_value_size: usize) -> Self {
        Self {
            max_key_size: max_key_size.min(MAX_KEY_SIZE),
            max_value_size: max_value_size.min(MAX_VALUE_SIZE),
        }
    }

    pub fn check_key(&self, key: &[u8]) -> Result<()> {
        if key.len() > self.max_key_size {
            return Err(ClientError::KeyTooLarge {
                size: key.len(),
                limit: self.max_key_size,
            });
        }
        Ok(())
    }

    pub fn check_value(&self, value: &[u8]) -> Result<()> {
        if value.len() > self.max_value_size {
            return Err(ClientError::ValueTooLarge {
                size: value.len(),
                limit: self.max_value_size,
            });
        }
        Ok(())
    }

    /// An update must land entirely within the value size limit
    pub fn check_update(&self, update: &[u8], offset: u32) -> Result<()> {
        let end = offset as usize + update.len();
        if end > self.max_value_size {
            return Err(ClientError::ValueTooLarge {
                size: end,
                limit: self.max_value_size,
            });
        }
        Ok(())
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::new(MAX_KEY_SIZE, MAX_VALUE_SIZE)
    }
}
