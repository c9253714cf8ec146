use std::sync::Arc;

use listener_core::CallQueue;
use listeners::Listeners;

/// An RAII guard that removes its listener from a [`Listeners`] registry
/// when dropped.
///
/// A subscriber's lifetime must strictly contain the interval between its
/// `add` and its `remove`; holding a
/// `Subscription` for exactly that interval and letting it drop satisfies
/// the contract without the caller having to call `remove` by hand on every
/// exit path (early return, panic unwind, etc.), the same role
/// `cdk_common::pub_sub::ActiveSubscription`'s `Drop` impl plays for that
/// crate's mpsc-backed subscriptions.
pub struct Subscription<L>
where
	L: ?Sized + Send + Sync + 'static,
{
	registry: Arc<Listeners<L>>,
	listener: Arc<L>,
}

impl<L> Subscription<L>
where
	L: ?Sized + Send + Sync + 'static,
{
	/// Registers `listener` on `registry` for `call_queue`, returning a
	/// guard that removes it again on drop.
	///
	/// # Panics
	///
	/// Panics (via `registry`'s own contract check) if `listener` is already
	/// registered on `registry`.
	#[must_use = "dropping the Subscription immediately removes the listener"]
	pub fn new(registry: Arc<Listeners<L>>, listener: Arc<L>, call_queue: CallQueue) -> Self {
		registry.add(&listener, call_queue);
		Self { registry, listener }
	}

	/// The guarded listener.
	pub fn listener(&self) -> &Arc<L> {
		&self.listener
	}

	/// The registry the listener is guarded on.
	pub fn registry(&self) -> &Arc<Listeners<L>> {
		&self.registry
	}
}

impl<L> Drop for Subscription<L>
where
	L: ?Sized + Send + Sync + 'static,
{
	fn drop(&mut self) {
		self.registry.remove(&self.listener);
	}
}
