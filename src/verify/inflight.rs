//! Rejects a second mutation of an entity while the first is outstanding

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;

use crate::error::ApiError;

/// Set of entity keys with a mutation in progress.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    keys: Arc<Mutex<HashSet<String>>>,
}

/// Held for the duration of one mutation; releases its key on drop.
#[derive(Debug)]
pub struct InFlightTicket {
    key: String,
    keys: Arc<Mutex<HashSet<String>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.keys
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn acquire(&self, key: impl Into<String>) -> Result<InFlightTicket, ApiError> {
        let key = key.into();
        if !self.lock().insert(key.clone()) {
            debug!("Rejecting concurrent mutation of {}", key);
            return Err(ApiError::InFlight(key));
        }
        Ok(InFlightTicket {
            key,
            keys: self.keys.clone(),
        })
    }

    pub fn is_busy(&self, key: &str) -> bool {
        self.lock().contains(key)
    }
}

impl Drop for InFlightTicket {
    fn drop(&mut self) {
        self.keys
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&self.key);
    }
}
