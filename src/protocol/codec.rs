//! Protocol codec
//!
//! Encoding and parsing functions for the wire protocol. Pure byte
//! transforms: no I/O happens here.
//!
//! ## Message Layout
//!
//! ```text
//! ┌───────────┬───────────┬────────────────────┬────────────────────┐
//! │ Magic (1) │ Opcode(1) │ Payload length (4) │   Request id (4)   │
//! ├───────────┴───────────┴────────────────────┴────────────────────┤
//! │                      Payload (length bytes)                     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Encoders allocate a fresh, exactly sized buffer per message and check
//! key/value sizes against the caller's [`Limits`]. Parsers reject short
//! input, declared lengths that disagree with the actual byte count,
//! reserved magic bits, and unknown kind or opcode values.

use bytes::{Buf, BufMut};

use super::{
    Header, KeyPayload, KeyValuePayload, KeyValueUpdatePayload, Limits, Magic, Opcode,
    HEADER_SIZE, KEY_BASE_SIZE, KEY_VALUE_BASE_SIZE, KEY_VALUE_UPDATE_BASE_SIZE,
    MAX_PAYLOAD_SIZE,
};
use crate::error::{ClientError, Result};

/// Width of the 3-byte value length and offset fields
const U24_SIZE: usize = 3;

// =============================================================================
// Encoding
// =============================================================================

fn put_header(buf: &mut Vec<u8>, magic: Magic, opcode: Opcode, length: u32, id: u32) {
    buf.put_u8(magic.to_byte());
    buf.put_u8(opcode as u8);
    buf.put_u32(length);
    buf.put_u32(id);
}

/// Encode a header-only message (payload length zero)
///
/// REGISTER requests and responses use this shape.
pub fn encode_header(magic: Magic, opcode: Opcode, id: u32) -> Vec<u8> {
    let mut message = Vec::with_capacity(HEADER_SIZE);
    put_header(&mut message, magic, opcode, 0, id);
    message
}

/// Encode a message with a key payload (GET/DELETE requests)
pub fn encode_key_message(
    magic: Magic,
    opcode: Opcode,
    id: u32,
    key: &[u8],
    limits: &Limits,
) -> Result<Vec<u8>> {
    limits.check_key(key)?;

    let payload_len = KEY_BASE_SIZE + key.len();
    let mut message = Vec::with_capacity(HEADER_SIZE + payload_len);
    put_header(&mut message, magic, opcode, payload_len as u32, id);
    message.put_u8(key.len() as u8);
    message.extend_from_slice(key);

    Ok(message)
}

/// Encode a message with a key-value payload (SET requests)
pub fn encode_key_value_message(
    magic: Magic,
    opcode: Opcode,
    id: u32,
    key: &[u8],
    value: &[u8],
    limits: &Limits,
) -> Result<Vec<u8>> {
    limits.check_key(key)?;
    limits.check_value(value)?;

    let payload_len = KEY_VALUE_BASE_SIZE + key.len() + value.len();
    let mut message = Vec::with_capacity(HEADER_SIZE + payload_len);
    put_header(&mut message, magic, opcode, payload_len as u32, id);
    message.put_u8(key.len() as u8);
    message.put_uint(value.len() as u64, U24_SIZE);
    message.extend_from_slice(key);
    message.extend_from_slice(value);

    Ok(message)
}

/// Encode a message with a key-value-update payload (UPDATE requests)
///
/// `offset` is the byte position within the stored value where the update
/// applies; `offset + update.len()` must stay within the value size limit.
pub fn encode_key_value_update_message(
    magic: Magic,
    opcode: Opcode,
    id: u32,
    key: &[u8],
    update: &[u8],
    offset: u32,
    limits: &Limits,
) -> Result<Vec<u8>> {
    limits.check_key(key)?;
    limits.check_update(update, offset)?;

    let payload_len = KEY_VALUE_UPDATE_BASE_SIZE + key.len() + update.len();
    let mut message = Vec::with_capacity(HEADER_SIZE + payload_len);
    put_header(&mut message, magic, opcode, payload_len as u32, id);
    message.put_u8(key.len() as u8);
    message.put_uint(update.len() as u64, U24_SIZE);
    message.put_uint(offset as u64, U24_SIZE);
    message.extend_from_slice(key);
    message.extend_from_slice(update);

    Ok(message)
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse the fixed header from the front of `buf`
pub fn parse_header(buf: &[u8]) -> Result<Header> {
    if buf.len() < HEADER_SIZE {
        return Err(ClientError::Protocol(format!(
            "Incomplete header: expected {} bytes, got {}",
            HEADER_SIZE,
            buf.len()
        )));
    }

    let magic = Magic::from_byte(buf[0])?;
    let opcode = Opcode::from_byte(buf[1])?;
    let length = u32::from_be_bytes([buf[2], buf[3], buf[4], buf[5]]);
    let id = u32::from_be_bytes([buf[6], buf[7], buf[8], buf[9]]);

    if length > MAX_PAYLOAD_SIZE {
        return Err(ClientError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            length, MAX_PAYLOAD_SIZE
        )));
    }

    Ok(Header {
        magic,
        opcode,
        length,
        id,
    })
}

/// Parse a key payload
///
/// `buf` must hold exactly the payload bytes the header declared.
pub fn parse_key_payload(buf: &[u8]) -> Result<KeyPayload<'_>> {
    if buf.len() < KEY_BASE_SIZE {
        return Err(ClientError::Protocol(format!(
            "Key payload too short: {} bytes",
            buf.len()
        )));
    }

    let key_len = buf[0] as usize;
    let expected = KEY_BASE_SIZE + key_len;
    if buf.len() != expected {
        return Err(ClientError::Protocol(format!(
            "Key payload length mismatch: expected {} bytes, got {}",
            expected,
            buf.len()
        )));
    }

    Ok(KeyPayload {
        key: &buf[KEY_BASE_SIZE..],
    })
}

/// Parse a key-value payload
///
/// `buf` must hold exactly the payload bytes the header declared.
pub fn parse_key_value_payload(buf: &[u8]) -> Result<KeyValuePayload<'_>> {
    if buf.len() < KEY_VALUE_BASE_SIZE {
        return Err(ClientError::Protocol(format!(
            "Key-value payload too short: {} bytes",
            buf.len()
        )));
    }

    let key_len = buf[0] as usize;
    let mut sizes = &buf[KEY_BASE_SIZE..KEY_VALUE_BASE_SIZE];
    let value_len = sizes.get_uint(U24_SIZE) as usize;

    let expected = KEY_VALUE_BASE_SIZE + key_len + value_len;
    if buf.len() != expected {
        return Err(ClientError::Protocol(format!(
            "Key-value payload length mismatch: expected {} bytes, got {}",
            expected,
            buf.len()
        )));
    }

    let key = &buf[KEY_VALUE_BASE_SIZE..KEY_VALUE_BASE_SIZE + key_len];
    let value = &buf[KEY_VALUE_BASE_SIZE + key_len..];

    Ok(KeyValuePayload { key, value })
}

/// Parse a key-value-update payload
///
/// `buf` must hold exactly the payload bytes the header declared. The
/// update bytes themselves are optional: responses may declare the update
/// length and offset without echoing the body.
pub fn parse_key_value_update_payload(buf: &[u8]) -> Result<KeyValueUpdatePayload<'_>> {
    if buf.len() < KEY_VALUE_UPDATE_BASE_SIZE {
        return Err(ClientError::Protocol(format!(
            "Key-value-update payload too short: {} bytes",
            buf.len()
        )));
    }

    let key_len = buf[0] as usize;
    let mut sizes = &buf[KEY_BASE_SIZE..KEY_VALUE_UPDATE_BASE_SIZE];
    let update_size = sizes.get_uint(U24_SIZE) as u32;
    let update_offset = sizes.get_uint(U24_SIZE) as u32;

    let without_body = KEY_VALUE_UPDATE_BASE_SIZE + key_len;
    let with_body = without_body + update_size as usize;

    let update = if buf.len() == without_body {
        None
    } else if buf.len() == with_body {
        Some(&buf[without_body..])
    } else {
        return Err(ClientError::Protocol(format!(
            "Key-value-update payload length mismatch: expected {} or {} bytes, got {}",
            without_body,
            with_body,
            buf.len()
        )));
    };

    Ok(KeyValueUpdatePayload {
        key: &buf[KEY_VALUE_UPDATE_BASE_SIZE..without_body],
        update_size,
        update_offset,
        update,
    })
}
