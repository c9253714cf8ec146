#![warn(clippy::pedantic)]
#![warn(missing_docs)]
//! Small ergonomic helpers layered on top of [`listeners::Listeners`]: a
//! scoped subscription guard, a "notify once and auto-remove" adapter, and
//! an async bridge over a single targeted notification.
//!
//! None of these add any capability the core doesn't already have — they
//! are convenience wrappers around `add`/`remove`/`call1`/`queue1`, the same
//! supporting role `flourish-extra` plays over `flourish`'s typed signals.

mod guard;
mod next;
mod once;

pub use guard::Subscription;
pub use next::next_notification;
pub use once::{call1_once, queue1_once};
