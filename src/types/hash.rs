use bytes::Bytes;
use itertools::Itertools;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::Error;

/// A map of fields to binary string values.
#[derive(Debug, Default)]
pub struct Hash {
    fields: Mutex<HashMap<Bytes, Bytes>>,
}

impl Hash {
    pub fn new() -> Hash {
        Hash::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Bytes, Bytes>> {
        self.fields.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets `field` to `value`. Returns 1 when the field is new, 0 when it was overwritten.
    pub fn set(&self, field: Bytes, value: Bytes) -> usize {
        match self.lock().insert(field, value) {
            Some(_) => 0,
            None => 1,
        }
    }

    /// Sets `field` only if it does not exist yet.
    pub fn setx(&self, field: Bytes, value: Bytes) -> bool {
        let mut fields = self.lock();
        if fields.contains_key(&field) {
            return false;
        }
        fields.insert(field, value);
        true
    }

    /// Sets every `field, value` pair of the flattened `pairs`, returning how many fields were
    /// added.
    pub fn set_bulk(&self, pairs: Vec<Bytes>) -> Result<usize, Error> {
        if pairs.is_empty() || pairs.len() % 2 != 0 {
            return Err(Error::OddFieldCount);
        }

        let mut fields = self.lock();
        let mut added = 0;
        for (field, value) in pairs.into_iter().tuples() {
            if fields.insert(field, value).is_none() {
                added += 1;
            }
        }

        Ok(added)
    }

    pub fn get(&self, field: &[u8]) -> Option<Bytes> {
        self.lock().get(field).cloned()
    }

    pub fn get_bulk(&self, fields: &[Bytes]) -> Vec<Option<Bytes>> {
        let map = self.lock();
        fields
            .iter()
            .map(|field| map.get(field).cloned())
            .collect()
    }

    pub fn keys(&self) -> Vec<Bytes> {
        self.lock().keys().cloned().sorted().collect()
    }

    /// Values ordered by their field.
    pub fn vals(&self) -> Vec<Bytes> {
        self.fields()
            .into_iter()
            .map(|(_, value)| value)
            .collect()
    }

    /// Field and value pairs ordered by field.
    pub fn fields(&self) -> Vec<(Bytes, Bytes)> {
        self.lock()
            .iter()
            .map(|(field, value)| (field.clone(), value.clone()))
            .sorted()
            .collect()
    }

    /// Removes `fields`, returning how many existed.
    pub fn delete(&self, fields: &[Bytes]) -> usize {
        let mut map = self.lock();
        fields
            .iter()
            .filter(|field| map.remove(*field).is_some())
            .count()
    }

    pub fn exists(&self, field: &[u8]) -> bool {
        self.lock().contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Byte length of the value at `field`, 0 when missing.
    pub fn field_len(&self, field: &[u8]) -> usize {
        self.lock().get(field).map_or(0, |value| value.len())
    }

    /// Adds `increment` to the integer at `field`, starting from 0 when the field is missing.
    pub fn increment_by(&self, field: Bytes, increment: i64) -> Result<i64, Error> {
        let mut fields = self.lock();
        let current = match fields.get(&field) {
            Some(value) => std::str::from_utf8(value)
                .ok()
                .and_then(|s| s.parse::<i64>().ok())
                .ok_or(Error::InvalidType("integer"))?,
            None => 0,
        };

        let value = current.checked_add(increment).ok_or(Error::Overflow)?;
        fields.insert(field, Bytes::from(value.to_string()));
        Ok(value)
    }

    /// Adds `increment` to the float at `field`, starting from 0 when the field is missing.
    pub fn increment_by_float(&self, field: Bytes, increment: f64) -> Result<f64, Error> {
        let mut fields = self.lock();
        let current = match fields.get(&field) {
            Some(value) => std::str::from_utf8(value)
                .ok()
                .and_then(|s| s.parse::<f64>().ok())
                .ok_or(Error::InvalidType("float"))?,
            None => 0.0,
        };

        let value = current + increment;
        if !value.is_finite() {
            return Err(Error::Overflow);
        }
        fields.insert(field, Bytes::from(value.to_string()));
        Ok(value)
    }
}
