//! Durable storage of the user's selected cities.

use crate::CitySelection;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Debug)]
pub enum StorageError {
    Unavailable,
    Serialize(serde_json::Error),
    Write(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable => write!(f, "Durable storage is not available"),
            StorageError::Serialize(e) => write!(f, "Failed to serialize selected cities: {}", e),
            StorageError::Write(msg) => write!(f, "Failed to write selected cities: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Serialize(e) => Some(e),
            _ => None,
        }
    }
}

/// Persists the ordered city list as a single JSON record.
pub trait SelectionStore {
    /// `None` when nothing has been saved yet (or the record is unreadable).
    fn load(&self) -> Option<Vec<CitySelection>>;

    fn save(&self, cities: &[CitySelection]) -> Result<(), StorageError>;
}

/// Serialize in the format written to durable storage.
pub fn encode_selections(cities: &[CitySelection]) -> Result<String, StorageError> {
    serde_json::to_string(cities).map_err(StorageError::Serialize)
}

/// Parse a stored record; unreadable records count as absent.
pub fn decode_selections(raw: &str) -> Option<Vec<CitySelection>> {
    match serde_json::from_str(raw) {
        Ok(cities) => Some(cities),
        Err(e) => {
            log::warn!("Ignoring unreadable selected cities record: {}", e);
            None
        }
    }
}

/// Keeps the serialized record in memory. Clones share the record, so a
/// second controller built over a clone behaves like an app restart.
#[derive(Clone, Default)]
pub struct MemorySelections {
    record: Rc<RefCell<Option<String>>>,
}

impl MemorySelections {
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw stored JSON, as another reader of the storage would see it.
    pub fn raw(&self) -> Option<String> {
        self.record.borrow().clone()
    }
}

impl SelectionStore for MemorySelections {
    fn load(&self) -> Option<Vec<CitySelection>> {
        self.record.borrow().as_deref().and_then(decode_selections)
    }

    fn save(&self, cities: &[CitySelection]) -> Result<(), StorageError> {
        let encoded = encode_selections(cities)?;
        *self.record.borrow_mut() = Some(encoded);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_loads_none() {
        assert_eq!(MemorySelections::new().load(), None);
    }

    #[test]
    fn saved_order_is_preserved() {
        let store = MemorySelections::new();
        let cities = vec![
            CitySelection::new("1", "Stockholm"),
            CitySelection::new("12", "Skåne"),
            CitySelection::new("1", "Stockholm"),
        ];
        store.save(&cities).unwrap();
        assert_eq!(store.load(), Some(cities));
    }

    #[test]
    fn corrupt_record_is_treated_as_absent() {
        assert_eq!(decode_selections("{not json"), None);
    }
}
