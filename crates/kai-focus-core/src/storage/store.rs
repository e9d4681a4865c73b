//! Persistence port for pattern and history data.
//!
//! Values are JSON strings under logical keys (see [`super::keys`]). The typed
//! helpers treat a missing, unreadable or malformed value as empty, so a
//! corrupt store degrades to defaults instead of failing the caller.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CoreError, StoreError};

/// Callback for [`PatternStore::update`]: receives the current raw value and
/// returns the value to write, or `None` to leave the key untouched.
pub type UpdateFn<'a> = dyn FnMut(Option<String>) -> Option<String> + 'a;

/// Key-value store holding JSON documents.
pub trait PatternStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Read-modify-write of one key.
    ///
    /// Stores shared between processes must run this atomically. The default
    /// is a plain get then set, which is only correct for a single writer.
    fn update(&self, key: &str, f: &mut UpdateFn<'_>) -> Result<(), StoreError> {
        if let Some(next) = f(self.get(key)?) {
            self.set(key, &next)?;
        }
        Ok(())
    }
}

impl<S: PatternStore + ?Sized> PatternStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn update(&self, key: &str, f: &mut UpdateFn<'_>) -> Result<(), StoreError> {
        (**self).update(key, f)
    }
}

impl<S: PatternStore + ?Sized> PatternStore for Rc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn update(&self, key: &str, f: &mut UpdateFn<'_>) -> Result<(), StoreError> {
        (**self).update(key, f)
    }
}

/// In-process store for tests and short-lived callers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl PatternStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Load and decode a value, falling back to `T::default()` on any fault.
pub fn load_json<T, S>(store: &S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: PatternStore + ?Sized,
{
    match store.get(key) {
        Ok(raw) => decode_or_default(key, raw.as_deref()),
        Err(e) => {
            tracing::warn!(key, error = %e, "store read failed, using defaults");
            T::default()
        }
    }
}

fn decode_or_default<T: DeserializeOwned + Default>(key: &str, raw: Option<&str>) -> T {
    let Some(raw) = raw else {
        return T::default();
    };
    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::warn!(key, error = %e, "malformed stored value, using defaults");
        T::default()
    })
}

/// Encode and write a value.
pub fn save_json<T, S>(store: &S, key: &str, value: &T) -> Result<(), CoreError>
where
    T: Serialize + ?Sized,
    S: PatternStore + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)?;
    Ok(())
}

/// Decode the stored value, apply `op` and write it back in one
/// [`PatternStore::update`].
///
/// `op` sees the current stored value (or the default when absent or
/// malformed). It is not called when the store cannot be read.
pub fn update_json<T, S>(store: &S, key: &str, op: impl FnOnce(&mut T)) -> Result<(), CoreError>
where
    T: Serialize + DeserializeOwned + Default,
    S: PatternStore + ?Sized,
{
    let mut op = Some(op);
    let mut encode_error = None;
    store.update(key, &mut |raw| {
        let op = op.take()?;
        let mut value: T = decode_or_default(key, raw.as_deref());
        op(&mut value);
        match serde_json::to_string(&value) {
            Ok(encoded) => Some(encoded),
            Err(e) => {
                encode_error = Some(e);
                None
            }
        }
    })?;
    match encode_error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

/// Append `item`, then evict from the front until `list.len() <= cap`.
pub fn push_capped<T>(list: &mut Vec<T>, item: T, cap: usize) {
    list.push(item);
    trim_front(list, cap);
}

/// Evict the oldest entries so that at most `cap` remain.
pub(crate) fn trim_front<T>(list: &mut Vec<T>, cap: usize) {
    if list.len() > cap {
        let excess = list.len() - cap;
        list.drain(..excess);
    }
}
