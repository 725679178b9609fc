//! Shopping cart module.
//!
//! [`Cart`] is the plain data; [`CartStore`] owns one and is the only way to
//! change it. Snapshots go through a [`CartRepository`] and failures are
//! surfaced to a [`Notifier`].

#[allow(clippy::module_inception)]
mod cart;
mod locks;
mod notice;
mod persistence;
mod store;

pub use cart::{Cart, CartEntry};
pub use locks::{ProductGuard, ProductLocks};
pub use notice::{LogNotifier, Notice, Notifier, RecordingNotifier};
pub use persistence::{CartRepository, KvCartRepository, DEFAULT_CART_KEY};
pub use store::CartStore;
