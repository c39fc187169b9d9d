//! In-process storage area shared between documents.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;

use super::{DocumentId, StampedEvent, Storage, StorageError, StorageEvent, StorageEvents};

const EVENT_CAPACITY: usize = 64;

struct Shared {
    items: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
    events: broadcast::Sender<StampedEvent>,
    next_document: AtomicU64,
}

/// Storage area kept in memory, shared by every document opened on it.
///
/// Cloning a handle yields the *same* document. Use [`MemoryStorage::open_document`]
/// to get a second document (another tab) that sees the same values and
/// receives events for changes made by the first.
///
/// ```
/// use timepiece_storefront::storage::{MemoryStorage, Storage};
///
/// let tab_a = MemoryStorage::new();
/// let tab_b = tab_a.open_document();
/// let mut events = tab_b.subscribe().unwrap();
///
/// tab_a.set_item("cart", "[]").unwrap();
/// assert_eq!(tab_b.get_item("cart").unwrap().as_deref(), Some("[]"));
/// assert_eq!(events.try_next().unwrap().key.as_deref(), Some("cart"));
/// ```
#[derive(Clone)]
pub struct MemoryStorage {
    shared: Arc<Shared>,
    document: DocumentId,
}

impl MemoryStorage {
    /// Create an empty area without a size limit.
    #[must_use]
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create an empty area holding at most `quota` bytes of keys and values.
    #[must_use]
    pub fn with_quota(quota: usize) -> Self {
        Self::build(Some(quota))
    }

    fn build(quota: Option<usize>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                items: Mutex::new(HashMap::new()),
                quota,
                events,
                next_document: AtomicU64::new(1),
            }),
            document: 0,
        }
    }

    /// Open another document on the same area.
    #[must_use]
    pub fn open_document(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            document: self.shared.next_document.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Delete every key, notifying other documents with a cleared event.
    ///
    /// # Errors
    ///
    /// Returns an error if the area's lock is poisoned.
    pub fn clear(&self) -> Result<(), StorageError> {
        let had_items = {
            let mut items = self.lock()?;
            let had_items = !items.is_empty();
            items.clear();
            had_items
        };
        if had_items {
            self.publish(StorageEvent::cleared());
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.shared
            .items
            .lock()
            .map_err(|_| StorageError::Unavailable("storage lock poisoned".to_string()))
    }

    fn publish(&self, event: StorageEvent) {
        // No subscribers is fine; the value is still stored.
        let _ = self.shared.events.send(StampedEvent {
            origin: self.document,
            event,
        });
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStorage")
            .field("document", &self.document)
            .field("quota", &self.shared.quota)
            .finish_non_exhaustive()
    }
}

/// Bytes used by all entries if `key` held `value`.
fn usage_with(items: &HashMap<String, String>, key: &str, value: &str) -> usize {
    let others: usize = items
        .iter()
        .filter(|(k, _)| k.as_str() != key)
        .map(|(k, v)| k.len() + v.len())
        .sum();
    others + key.len() + value.len()
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let old_value = {
            let mut items = self.lock()?;
            if let Some(quota) = self
                .shared
                .quota
                .filter(|&quota| usage_with(&items, key, value) > quota)
            {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_owned(),
                    quota,
                });
            }
            items.insert(key.to_owned(), value.to_owned())
        };

        if old_value.as_deref() != Some(value) {
            self.publish(StorageEvent::changed(key, old_value, Some(value.to_owned())));
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let old_value = self.lock()?.remove(key);
        if old_value.is_some() {
            self.publish(StorageEvent::changed(key, old_value, None));
        }
        Ok(())
    }

    fn subscribe(&self) -> Option<StorageEvents> {
        Some(StorageEvents::new(
            self.shared.events.subscribe(),
            self.document,
        ))
    }
}
