//! Benchmark adapter
//!
//! Maps a record-oriented workload (table / key / fields) onto the flat
//! NimbusKV keyspace. Each field value is stored under a composite key of
//! the form `table:key:field`; the adapter fans one record operation out
//! into one client call per field and never touches the wire format.

use std::collections::HashMap;

use crate::client::Client;
use crate::error::Result;

/// Record-oriented view over a [`Client`]
pub struct StoreAdapter {
    client: Client,
}

impl StoreAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Take the underlying client back
    pub fn into_inner(self) -> Client {
        self.client
    }

    /// Connect the underlying client
    pub fn connect(&mut self) -> Result<()> {
        self.client.connect()
    }

    /// Disconnect the underlying client
    pub fn disconnect(&mut self) -> Result<()> {
        self.client.disconnect()
    }

    fn field_key(table: &str, key: &str, field: &str) -> String {
        format!("{}:{}:{}", table, key, field)
    }

    /// Read the named fields of a record
    ///
    /// Returns `Ok(None)` when any requested field is absent.
    pub fn read(
        &mut self,
        table: &str,
        key: &str,
        fields: &[&str],
    ) -> Result<Option<HashMap<String, String>>> {
        let mut record = HashMap::with_capacity(fields.len());
        for field in fields {
            let composite = Self::field_key(table, key, field);
            match self.client.get(composite.as_bytes())? {
                Some(value) => {
                    record.insert(
                        (*field).to_string(),
                        String::from_utf8_lossy(&value).into_owned(),
                    );
                }
                None => return Ok(None),
            }
        }
        Ok(Some(record))
    }

    /// Insert a record, one SET per field
    ///
    /// Returns `Ok(false)` when the store rejects any field; the remaining
    /// fields are still attempted.
    pub fn insert(
        &mut self,
        table: &str,
        key: &str,
        values: &HashMap<String, String>,
    ) -> Result<bool> {
        let mut ok = true;
        for (field, value) in values {
            let composite = Self::field_key(table, key, field);
            ok &= self.client.set(composite.as_bytes(), value.as_bytes())?;
        }
        Ok(ok)
    }

    /// Update record fields in place, one UPDATE per field
    ///
    /// Each field value is overwritten from offset 0, so replacement values
    /// must not be longer than the stored ones.
    pub fn update(
        &mut self,
        table: &str,
        key: &str,
        values: &HashMap<String, String>,
    ) -> Result<bool> {
        let mut ok = true;
        for (field, value) in values {
            let composite = Self::field_key(table, key, field);
            ok &= self.client.update(composite.as_bytes(), value.as_bytes(), 0)?;
        }
        Ok(ok)
    }

    /// Delete a record
    ///
    /// Deletes the field-less `table:key` composite. Field entries written
    /// by `insert` live under their own `table:key:field` keys and are not
    /// swept up by this call.
    pub fn delete(&mut self, table: &str, key: &str) -> Result<bool> {
        let composite = format!("{}:{}", table, key);
        self.client.delete(composite.as_bytes())
    }
}
