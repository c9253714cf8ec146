#![warn(clippy::pedantic)]
#![warn(missing_docs)]
//! Typed publish/subscribe registries over [`listener_core`].
//!
//! [`Listeners<L>`] is the typed facade: it binds a closure over `&L` plus
//! whatever it captures into a [`listener_core::Call`], and performs the
//! cast from the opaque subscriber identity the core deals in back to a
//! live `Arc<L>` at invocation time.

mod listeners;
pub use listeners::Listeners;

pub use listener_core::{CallPool, CallQueue, CallQueueRef, ListenersError, Work};

#[cfg(feature = "global-queue")]
mod global_queue;
#[cfg(feature = "global-queue")]
pub use global_queue::global_queue;
