//! Whole-blob codec and the generic flat collection built on top of it.
//!
//! Decoding fails closed: a blob that is missing or does not parse reads as
//! the type's default. Encoding and writing errors always propagate.

use crate::core::error::CluckError;
use crate::core::records::RecordStore;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

/// Load and decode the blob under `key`, falling back to `T::default()`.
pub fn load_blob<T>(store: &dyn RecordStore, key: &str) -> Result<T, CluckError>
where
    T: DeserializeOwned + Default,
{
    let Some(bytes) = store.get(key)? else {
        return Ok(T::default());
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "undecodable blob, treating as empty");
            Ok(T::default())
        }
    }
}

pub fn save_blob<T: Serialize + ?Sized>(
    store: &dyn RecordStore,
    key: &str,
    value: &T,
) -> Result<(), CluckError> {
    let bytes = serde_json::to_vec(value)?;
    store.set(key, &bytes)
}

/// A record addressable by a unique string id.
pub trait Record: Serialize + DeserializeOwned + Clone {
    fn id(&self) -> &str;
}

/// Insertion-ordered list of records stored as one blob under `key`.
pub struct FlatCollection<'a, T: Record> {
    store: &'a dyn RecordStore,
    key: &'static str,
    _record: PhantomData<T>,
}

impl<'a, T: Record> FlatCollection<'a, T> {
    pub fn new(store: &'a dyn RecordStore, key: &'static str) -> Self {
        Self {
            store,
            key,
            _record: PhantomData,
        }
    }

    pub fn all(&self) -> Result<Vec<T>, CluckError> {
        load_blob(self.store, self.key)
    }

    pub fn add(&self, record: T) -> Result<(), CluckError> {
        let mut records = self.all()?;
        records.push(record);
        save_blob(self.store, self.key, &records)
    }

    pub fn get(&self, id: &str) -> Result<Option<T>, CluckError> {
        Ok(self.all()?.into_iter().find(|r| r.id() == id))
    }

    /// Replace the record with the same id. Returns `false` (and writes nothing) if absent.
    pub fn update(&self, record: T) -> Result<bool, CluckError> {
        let mut records = self.all()?;
        let Some(slot) = records.iter_mut().find(|r| r.id() == record.id()) else {
            return Ok(false);
        };
        *slot = record;
        save_blob(self.store, self.key, &records)?;
        Ok(true)
    }

    /// Drop the record with `id`. Returns `false` (and writes nothing) if absent.
    pub fn remove(&self, id: &str) -> Result<bool, CluckError> {
        let mut records = self.all()?;
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Ok(false);
        }
        save_blob(self.store, self.key, &records)?;
        Ok(true)
    }
}
