//! Durable scalar storage for device-owned properties
//!
//! Reads never fail from the caller's point of view: a missing key, undecodable
//! bytes or a backend error all yield the key's default. Writes are synchronous
//! and report failure so callers can log it.

use std::collections::BTreeMap;

/// Raw key-value backend, typically a flash partition on the device
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Must be durable once it returns `Ok`
    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError>;
}

impl<K: KvStore + ?Sized> KvStore for &mut K {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt store: {0}")]
    Corrupt(String),
}

/// Fixed-width encoding of a persisted scalar
pub trait Persist: Copy + std::fmt::Debug {
    fn encode(self) -> Vec<u8>;
    fn decode(bytes: &[u8]) -> Option<Self>;
}

impl Persist for u8 {
    fn encode(self) -> Vec<u8> {
        vec![self]
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [b] => Some(*b),
            _ => None,
        }
    }
}

impl Persist for bool {
    fn encode(self) -> Vec<u8> {
        vec![self as u8]
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0] => Some(false),
            [1] => Some(true),
            _ => None,
        }
    }
}

impl Persist for i32 {
    fn encode(self) -> Vec<u8> {
        self.to_le_bytes().to_vec()
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        Some(i32::from_le_bytes(bytes.try_into().ok()?))
    }
}

impl Persist for u32 {
    fn encode(self) -> Vec<u8> {
        self.to_le_bytes().to_vec()
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        Some(u32::from_le_bytes(bytes.try_into().ok()?))
    }
}

/// Name and default of a persisted property
#[derive(Debug, Clone, Copy)]
pub struct PersistedKey<T> {
    pub name: &'static str,
    pub default: T,
}

pub mod keys {
    use super::PersistedKey;

    pub const VOLUME: PersistedKey<u8> = PersistedKey { name: "VOLUME", default: 50 };

    /// Consecutive short-lived boots
    pub const RESET_COUNT: PersistedKey<u8> = PersistedKey { name: "rst_cnt", default: 0 };
}

pub struct PropertyStore<K> {
    kv: K,
}

impl<K: KvStore> PropertyStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    pub fn get<T: Persist>(&self, key: &PersistedKey<T>) -> T {
        match self.kv.get(key.name) {
            Ok(Some(bytes)) => T::decode(&bytes).unwrap_or_else(|| {
                tracing::warn!(
                    key = key.name,
                    len = bytes.len(),
                    "Persisted value has unexpected encoding, using default"
                );
                key.default
            }),
            Ok(None) => key.default,
            Err(e) => {
                tracing::error!(key = key.name, "Failed to read persisted value: {e}");
                key.default
            }
        }
    }

    pub fn set<T: Persist>(&mut self, key: &PersistedKey<T>, value: T) -> Result<(), StoreError> {
        tracing::debug!(key = key.name, ?value, "Persisting value");
        self.kv.set(key.name, &value.encode())
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    pub fn into_inner(self) -> K {
        self.kv
    }
}

/// Volatile backend, loses everything on restart
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.entries.insert(key.to_owned(), value.to_vec());
        Ok(())
    }
}
