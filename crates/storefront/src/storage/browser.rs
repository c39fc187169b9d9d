//! The browser's `window.localStorage`.
//!
//! Browsers deliver change notifications from other tabs as DOM `storage`
//! events, so this area has no in-process subscription. Convert each
//! `web_sys::StorageEvent` with [`StorageEvent::from`] and hand it to
//! `CartStore::handle_storage_event`.

use wasm_bindgen::JsValue;

use super::{Storage, StorageError, StorageEvent};

/// Storage area backed by `window.localStorage`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    inner: web_sys::Storage,
}

impl LocalStorage {
    /// Open the current window's `localStorage`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] outside a window context or when
    /// the browser denies access (e.g. disabled site data).
    pub fn open() -> Result<Self, StorageError> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("no window".to_string()))?;
        let inner = window
            .local_storage()
            .map_err(js_unavailable)?
            .ok_or_else(|| StorageError::Unavailable("localStorage disabled".to_string()))?;
        Ok(Self { inner })
    }
}

fn js_unavailable(err: JsValue) -> StorageError {
    StorageError::Unavailable(format!("{err:?}"))
}

impl Storage for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get_item(key).map_err(js_unavailable)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // The only failure setItem reports is QuotaExceededError; the quota
        // itself is not exposed, so it is reported as 0.
        self.inner
            .set_item(key, value)
            .map_err(|_| StorageError::QuotaExceeded {
                key: key.to_owned(),
                quota: 0,
            })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove_item(key).map_err(js_unavailable)
    }
}

impl From<&web_sys::StorageEvent> for StorageEvent {
    fn from(event: &web_sys::StorageEvent) -> Self {
        Self {
            key: event.key(),
            old_value: event.old_value(),
            new_value: event.new_value(),
        }
    }
}
