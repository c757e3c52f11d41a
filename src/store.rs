use bytes::Bytes;
use itertools::Itertools;
use num_traits::{CheckedAdd, Zero};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt::Display;
use std::ops::Deref;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error as ThisError;
use tokio::time::{Duration, Instant};

use crate::types::{Hash, List, Set};

/// The Store is responsible for managing key-value pairs, with optional time-to-live settings for
/// each key. Expired keys are never swept in the background: a key past its deadline is removed
/// the next time it is accessed, and until then every operation treats it as missing.
/// The store is designed to be thread-safe, allowing it to be shared and cloned cheaply using
/// reference counting.
#[derive(Clone, Default)]
pub struct Store {
    inner: Arc<InnerStore>,
}

impl Store {
    pub fn new() -> Store {
        Store::default()
    }
}

impl Deref for Store {
    type Target = InnerStore;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Default)]
pub struct InnerStore {
    state: Mutex<State>,
}

impl InnerStore {
    pub fn lock(&self) -> InnerStoreLocked<'_> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        InnerStoreLocked { state }
    }
}

#[derive(Debug, ThisError, PartialEq)]
pub enum Error {
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,
    #[error("ERR value is not an integer or out of range")]
    NotAnInteger,
    #[error("ERR increment or decrement would overflow")]
    Overflow,
    #[error("ERR invalid expire time in 'expire' command")]
    InvalidExpireTime,
}

type Key = String;

#[derive(Default)]
pub struct State {
    keys: HashMap<Key, Value>,
    // Number of successful writes since startup.
    changes: u64,
}

#[derive(Clone, Debug)]
pub struct Value {
    pub data: Data,
    /// `None` means the key never expires.
    pub expires_at: Option<Instant>,
}

impl Value {
    pub fn new(data: Data) -> Value {
        Value {
            data,
            expires_at: None,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

impl From<Bytes> for Value {
    fn from(data: Bytes) -> Self {
        Value::new(Data::String(data))
    }
}

#[derive(Clone, Debug)]
pub enum Data {
    String(Bytes),
    List(Arc<List>),
    Hash(Arc<Hash>),
    Set(Arc<Set>),
}

impl Data {
    pub fn type_name(&self) -> &'static str {
        match self {
            Data::String(_) => "string",
            Data::List(_) => "list",
            Data::Hash(_) => "hash",
            Data::Set(_) => "set",
        }
    }

    fn is_empty_collection(&self) -> bool {
        match self {
            Data::String(_) => false,
            Data::List(list) => list.is_empty(),
            Data::Hash(hash) => hash.is_empty(),
            Data::Set(set) => set.is_empty(),
        }
    }
}

/// A collection type that can be stored under a key.
pub trait Collection: Default {
    fn extract(data: &Data) -> Option<Arc<Self>>;
    fn wrap(collection: Arc<Self>) -> Data;
}

impl Collection for List {
    fn extract(data: &Data) -> Option<Arc<Self>> {
        match data {
            Data::List(list) => Some(list.clone()),
            _ => None,
        }
    }

    fn wrap(collection: Arc<Self>) -> Data {
        Data::List(collection)
    }
}

impl Collection for Hash {
    fn extract(data: &Data) -> Option<Arc<Self>> {
        match data {
            Data::Hash(hash) => Some(hash.clone()),
            _ => None,
        }
    }

    fn wrap(collection: Arc<Self>) -> Data {
        Data::Hash(collection)
    }
}

impl Collection for Set {
    fn extract(data: &Data) -> Option<Arc<Self>> {
        match data {
            Data::Set(set) => Some(set.clone()),
            _ => None,
        }
    }

    fn wrap(collection: Arc<Self>) -> Data {
        Data::Set(collection)
    }
}

pub struct InnerStoreLocked<'a> {
    state: MutexGuard<'a, State>,
}

impl<'a> InnerStoreLocked<'a> {
    fn evict_if_expired(&mut self, key: &str) {
        let now = Instant::now();
        let expired = self
            .state
            .keys
            .get(key)
            .is_some_and(|value| value.is_expired(now));

        if expired {
            self.state.keys.remove(key);
        }
    }

    pub fn get(&mut self, key: &str) -> Option<&Value> {
        self.evict_if_expired(key);
        self.state.keys.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.evict_if_expired(key);
        self.state.keys.get_mut(key)
    }

    /// Stores `value` under `key`, replacing whatever was there, expiration included.
    pub fn set(&mut self, key: Key, value: impl Into<Value>) {
        self.state.keys.insert(key, value.into());
    }

    /// Returns the live value under `key` and `true`, or inserts `default` and returns it with
    /// `false`. Both happen under the same lock, so concurrent callers seed a key only once.
    pub fn get_if_not_set(&mut self, key: &str, default: Value) -> (&mut Value, bool) {
        let now = Instant::now();
        match self.state.keys.entry(key.to_string()) {
            Entry::Occupied(mut entry) => {
                if entry.get().is_expired(now) {
                    entry.insert(default);
                    (entry.into_mut(), false)
                } else {
                    (entry.into_mut(), true)
                }
            }
            Entry::Vacant(entry) => (entry.insert(default), false),
        }
    }

    /// Removes `keys`, returning how many of them were live.
    pub fn del(&mut self, keys: &[Key]) -> usize {
        let now = Instant::now();
        keys.iter()
            .filter_map(|key| self.state.keys.remove(key))
            .filter(|value| !value.is_expired(now))
            .count()
    }

    pub fn exists(&mut self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// All live keys, sorted. Expired keys found on the way are removed.
    pub fn keys(&mut self) -> Vec<Key> {
        let now = Instant::now();
        self.state.keys.retain(|_, value| !value.is_expired(now));
        self.state.keys.keys().cloned().sorted().collect()
    }

    /// Makes `key` expire `seconds` from now, `-1` removes the expiration. Returns whether the
    /// key exists.
    pub fn set_expire(&mut self, key: &str, seconds: i64) -> Result<bool, Error> {
        let expires_at = match seconds {
            -1 => None,
            seconds if seconds < 0 => return Err(Error::InvalidExpireTime),
            seconds => Some(
                Instant::now()
                    .checked_add(Duration::from_secs(seconds as u64))
                    .ok_or(Error::InvalidExpireTime)?,
            ),
        };

        match self.get_mut(key) {
            Some(value) => {
                value.expires_at = expires_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Time left before `key` expires, `None` when it is missing or has no expiration.
    pub fn ttl(&mut self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.get(key)
            .and_then(|value| value.expires_at)
            .map(|expires_at| expires_at.saturating_duration_since(now))
    }

    /// Adds `increment` to the number stored at `key`, which is seeded with zero when missing.
    /// The expiration of an existing key is kept.
    pub fn incr_by<T>(&mut self, key: &str, increment: T) -> Result<T, Error>
    where
        T: FromStr + Display + CheckedAdd + Zero,
    {
        let (value, _) = self.get_if_not_set(key, Bytes::from(T::zero().to_string()).into());

        let Data::String(ref data) = value.data else {
            return Err(Error::WrongType);
        };

        let current = std::str::from_utf8(data)
            .ok()
            .and_then(|s| s.parse::<T>().ok())
            .ok_or(Error::NotAnInteger)?;
        let next = current.checked_add(&increment).ok_or(Error::Overflow)?;

        value.data = Data::String(Bytes::from(next.to_string()));
        Ok(next)
    }

    /// The collection stored at `key`, `None` when the key is missing.
    pub fn collection<T: Collection>(&mut self, key: &str) -> Result<Option<Arc<T>>, Error> {
        match self.get(key) {
            Some(value) => T::extract(&value.data).map(Some).ok_or(Error::WrongType),
            None => Ok(None),
        }
    }

    /// The collection stored at `key`, created empty when the key is missing.
    pub fn collection_or_default<T: Collection>(&mut self, key: &str) -> Result<Arc<T>, Error> {
        if let Some(collection) = self.collection::<T>(key)? {
            return Ok(collection);
        }

        let collection = Arc::new(T::default());
        self.set(key.to_string(), Value::new(T::wrap(collection.clone())));
        Ok(collection)
    }

    /// The collections stored at `keys`, in order. A missing key yields an empty collection that
    /// is not stored.
    pub fn collections<T: Collection>(&mut self, keys: &[Key]) -> Result<Vec<Arc<T>>, Error> {
        keys.iter()
            .map(|key| self.collection::<T>(key).map(Option::unwrap_or_default))
            .collect()
    }

    /// Drops `key` if it holds a collection with no elements left.
    pub fn remove_if_empty(&mut self, key: &str) {
        let empty = self
            .state
            .keys
            .get(key)
            .is_some_and(|value| value.data.is_empty_collection());

        if empty {
            self.state.keys.remove(key);
        }
    }

    pub fn record_change(&mut self) {
        self.state.changes += 1;
    }

    pub fn changes(&self) -> u64 {
        self.state.changes
    }
}
