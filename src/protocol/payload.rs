//! Payload views
//!
//! Borrowed views over the payload bytes of a parsed message. Fields are
//! slices into the caller's receive buffer; callers copy out what they need
//! to keep before reusing the buffer.

/// Key payload: GET/DELETE requests, SET/DELETE success responses, and
/// every failure response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPayload<'a> {
    pub key: &'a [u8],
}

impl KeyPayload<'_> {
    /// Byte-exact key comparison
    pub fn matches_key(&self, key: &[u8]) -> bool {
        self.key == key
    }
}

/// Key-value payload: SET requests and GET success responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyValuePayload<'a> {
    pub key: &'a [u8],
    pub value: &'a [u8],
}

impl KeyValuePayload<'_> {
    /// Byte-exact key comparison
    pub fn matches_key(&self, key: &[u8]) -> bool {
        self.key == key
    }
}

/// Key-value-update payload: UPDATE requests and UPDATE success responses
///
/// Responses may omit the update bytes and declare only their length and
/// offset, so the body is optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyValueUpdatePayload<'a> {
    pub key: &'a [u8],
    /// Declared length of the update in bytes
    pub update_size: u32,
    /// Byte offset within the stored value where the update applies
    pub update_offset: u32,
    /// Update bytes, when the message carries them
    pub update: Option<&'a [u8]>,
}

impl KeyValueUpdatePayload<'_> {
    /// Byte-exact key comparison
    pub fn matches_key(&self, key: &[u8]) -> bool {
        self.key == key
    }
}
