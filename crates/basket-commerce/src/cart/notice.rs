//! User-facing failure notices.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::CommerceError;

/// The fixed messages a storefront shows when a cart operation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notice {
    /// Adding a product failed.
    AddFailed,
    /// Removing a product failed.
    RemoveFailed,
    /// Requested quantity is above the available stock.
    OutOfStock,
    /// Changing a quantity failed for any other reason.
    UpdateFailed,
}

impl Notice {
    /// Message shown to the shopper.
    pub fn message(&self) -> &'static str {
        match self {
            Notice::AddFailed => "failed to add product",
            Notice::RemoveFailed => "failed to remove product",
            Notice::OutOfStock => "requested quantity exceeds stock",
            Notice::UpdateFailed => "failed to update product amount",
        }
    }

    /// Notice for `error` raised by an operation whose generic failure
    /// notice is `fallback`. Stock shortfalls always read as out of stock.
    pub fn for_error(fallback: Notice, error: &CommerceError) -> Notice {
        match error {
            CommerceError::InsufficientStock { .. } => Notice::OutOfStock,
            _ => fallback,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Receives a notice for every failed cart operation.
pub trait Notifier: Send + Sync {
    /// Surface `notice` to the shopper.
    fn notify(&self, notice: Notice);
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn notify(&self, notice: Notice) {
        (**self).notify(notice);
    }
}

impl<T: Notifier + ?Sized> Notifier for Box<T> {
    fn notify(&self, notice: Notice) {
        (**self).notify(notice);
    }
}

/// Writes notices to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        tracing::warn!(notice = %notice, "cart notice");
    }
}

/// Keeps every notice in memory, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices received so far.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Take and clear the notices received so far.
    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}
