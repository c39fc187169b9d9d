//! Key-value storage areas backing the cart.
//!
//! A storage area maps string keys to string values, like the browser's
//! `window.localStorage`. Several documents (browser tabs) may share one area;
//! when one of them changes a value, every *other* document on the area is
//! told through a [`StorageEvent`] so it can re-read and re-render.
//!
//! # Implementations
//!
//! - [`MemoryStorage`] - shared in-process area with per-document events
//! - [`FileStorage`] - a JSON object file, persisting between processes
//! - [`LocalStorage`] - the browser's `localStorage` (`browser` feature)

use std::path::PathBuf;

use thiserror::Error;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

pub mod file;
pub mod memory;

#[cfg(feature = "browser")]
pub mod browser;

#[cfg(feature = "browser")]
pub use browser::LocalStorage;
pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Errors raised by a storage area itself.
///
/// These are environment failures: the stored data may be fine but the area
/// cannot be read or written.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The storage area cannot be reached.
    #[error("storage is unavailable: {0}")]
    Unavailable(String),

    /// Writing would exceed the area's size limit.
    #[error("storage quota of {quota} bytes exceeded while writing '{key}'")]
    QuotaExceeded {
        /// Key being written.
        key: String,
        /// Size limit of the area in bytes.
        quota: usize,
    },

    /// Reading or writing the backing file failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file does not hold a JSON object of strings.
    #[error("storage file {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Notification that a value in a shared storage area changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// Changed key, or `None` when the whole area was cleared.
    pub key: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl StorageEvent {
    /// Event for a single key.
    #[must_use]
    pub fn changed(key: &str, old_value: Option<String>, new_value: Option<String>) -> Self {
        Self {
            key: Some(key.to_owned()),
            old_value,
            new_value,
        }
    }

    /// Event for the whole area being cleared.
    #[must_use]
    pub const fn cleared() -> Self {
        Self {
            key: None,
            old_value: None,
            new_value: None,
        }
    }

    /// Whether this event may affect `key`.
    #[must_use]
    pub fn concerns(&self, key: &str) -> bool {
        self.key.as_deref().is_none_or(|changed| changed == key)
    }
}

/// A synchronous key-value storage area.
pub trait Storage {
    /// Value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the area cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the area cannot be written or is full.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Absent keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the area cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// Change notifications from other documents on this area.
    ///
    /// Areas without in-process notifications return `None`.
    fn subscribe(&self) -> Option<StorageEvents> {
        None
    }
}

/// Identifies the document that made a change, so it is not told about it.
pub(crate) type DocumentId = u64;

#[derive(Debug, Clone)]
pub(crate) struct StampedEvent {
    pub(crate) origin: DocumentId,
    pub(crate) event: StorageEvent,
}

/// Receiver of [`StorageEvent`]s raised by other documents.
#[derive(Debug)]
pub struct StorageEvents {
    receiver: broadcast::Receiver<StampedEvent>,
    document: DocumentId,
}

impl StorageEvents {
    pub(crate) const fn new(
        receiver: broadcast::Receiver<StampedEvent>,
        document: DocumentId,
    ) -> Self {
        Self { receiver, document }
    }

    /// Next pending event, without blocking.
    ///
    /// If this receiver fell behind and events were dropped, a
    /// [`StorageEvent::cleared`] is returned so the caller refreshes everything.
    pub fn try_next(&mut self) -> Option<StorageEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(stamped) if stamped.origin == self.document => {}
                Ok(stamped) => return Some(stamped.event),
                Err(TryRecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Storage events dropped, forcing full refresh");
                    return Some(StorageEvent::cleared());
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Drain every pending event.
    pub fn drain(&mut self) -> Vec<StorageEvent> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}
