use std::{
	collections::HashMap,
	sync::{Arc, Weak},
};

use listener_core::{CallPool, CallQueue, ListenersError, Publisher, SubscriberId};
use parking_lot::RwLock;

/// A typed publisher registry: a thin shell over
/// [`listener_core::Publisher`] parameterized by a listener interface `L`.
///
/// `L` is usually a trait object type, e.g. `dyn FooListener`, so that a
/// single registry can hold heterogeneous implementors. Subscribers are held
/// by `Weak<L>` in a side table keyed by the same opaque [`SubscriberId`]
/// the untyped core uses: a non-owning back-reference, without any unsafe
/// pointer casting.
pub struct Listeners<L: ?Sized> {
	publisher: Publisher,
	subscribers: Arc<RwLock<HashMap<SubscriberId, Weak<L>>>>,
}

impl<L: ?Sized> Default for Listeners<L>
where
	L: Send + Sync + 'static,
{
	fn default() -> Self {
		Self::new()
	}
}

impl<L: ?Sized> Listeners<L>
where
	L: Send + Sync + 'static,
{
	/// A registry backed by an unbounded [`CallPool`].
	pub fn new() -> Self {
		Self::with_pool(CallPool::unbounded())
	}

	/// A registry backed by a caller-supplied pool.
	pub fn with_pool(pool: Arc<CallPool>) -> Self {
		Self {
			publisher: Publisher::with_pool(pool),
			subscribers: Arc::new(RwLock::new(HashMap::new())),
		}
	}

	fn id_of(listener: &Arc<L>) -> SubscriberId {
		SubscriberId::from_ptr(Arc::as_ptr(listener))
	}

	/// `listener` must not already be registered on this registry;
	/// `call_queue` is the execution context it will be notified on.
	pub fn add(&self, listener: &Arc<L>, call_queue: CallQueue) {
		let id = Self::id_of(listener);
		self.subscribers.write().insert(id, Arc::downgrade(listener));
		self.publisher.add(id, call_queue);
	}

	/// May be called from inside `listener`'s own notification.
	pub fn remove(&self, listener: &Arc<L>) {
		let id = Self::id_of(listener);
		self.subscribers.write().remove(&id);
		self.publisher.remove(id);
	}

	/// Total number of currently registered listeners.
	pub fn listener_count(&self) -> usize {
		self.publisher.listener_count()
	}

	fn make_call<F>(&self, f: F) -> Result<listener_core::Call, ListenersError>
	where
		F: Fn(&L) + Send + Sync + 'static,
	{
		let subscribers = self.subscribers.clone();
		self.publisher.alloc_call(move |id| {
			let listener = subscribers.read().get(&id).and_then(Weak::upgrade);
			if let Some(listener) = listener {
				f(&listener);
			}
		})
	}

	/// Broadcast, draining on the caller's own call queue.
	/// `f` is invoked once per currently-eligible listener, each on its own
	/// call queue.
	pub fn call<F>(&self, f: F) -> Result<(), ListenersError>
	where
		F: Fn(&L) + Send + Sync + 'static,
	{
		let call = self.make_call(f)?;
		self.publisher.call(call);
		Ok(())
	}

	/// Broadcast, never draining.
	pub fn queue<F>(&self, f: F) -> Result<(), ListenersError>
	where
		F: Fn(&L) + Send + Sync + 'static,
	{
		let call = self.make_call(f)?;
		self.publisher.queue(call);
		Ok(())
	}

	/// Targeted, draining. A no-op if `listener` is not currently registered.
	pub fn call1<F>(&self, listener: &Arc<L>, f: F) -> Result<(), ListenersError>
	where
		F: Fn(&L) + Send + Sync + 'static,
	{
		let call = self.make_call(f)?;
		self.publisher.call1(Self::id_of(listener), call);
		Ok(())
	}

	/// Targeted, never draining.
	pub fn queue1<F>(&self, listener: &Arc<L>, f: F) -> Result<(), ListenersError>
	where
		F: Fn(&L) + Send + Sync + 'static,
	{
		let call = self.make_call(f)?;
		self.publisher.queue1(Self::id_of(listener), call);
		Ok(())
	}

	/// Coalesced broadcast. `K` is a marker type identifying the
	/// notification kind; two calls with the same `K` coalesce, collapsing
	/// into whichever is the most recent by the time delivery runs.
	pub fn update<K, F>(&self, f: F) -> Result<(), ListenersError>
	where
		K: 'static,
		F: Fn(&L) + Send + Sync + 'static,
	{
		let call = self.make_call(f)?;
		self.publisher.update::<K>(call);
		Ok(())
	}
}
