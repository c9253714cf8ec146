use std::sync::Arc;

use listener_core::ListenersError;
use listeners::Listeners;

/// Delivers one targeted notification to `listener` and removes it from
/// `registry` immediately afterward.
///
/// `remove` is legal from any thread, including from inside the
/// subscriber's own notification, so the wrapper closure can simply call
/// `f`, then call `remove` from inside the invocation it just ran. Drains
/// inline exactly like the underlying `call1` if the listener's call queue
/// is presently serviced by the calling thread.
pub fn call1_once<L, F>(registry: &Arc<Listeners<L>>, listener: &Arc<L>, f: F) -> Result<(), ListenersError>
where
	L: Send + Sync + 'static,
	F: Fn(&L) + Send + Sync + 'static,
{
	let registry_in_call = registry.clone();
	let target = listener.clone();
	registry.call1(listener, move |l| {
		f(l);
		registry_in_call.remove(&target);
	})
}

/// As [`call1_once`], but never drains (`queue1` semantics): the removal
/// happens whenever the listener's call queue eventually runs the posted
/// work, not before this function returns.
pub fn queue1_once<L, F>(registry: &Arc<Listeners<L>>, listener: &Arc<L>, f: F) -> Result<(), ListenersError>
where
	L: Send + Sync + 'static,
	F: Fn(&L) + Send + Sync + 'static,
{
	let registry_in_call = registry.clone();
	let target = listener.clone();
	registry.queue1(listener, move |l| {
		f(l);
		registry_in_call.remove(&target);
	})
}

#[cfg(test)]
mod tests {
	use std::sync::{
		atomic::{AtomicUsize, Ordering},
		Arc,
	};

	use listener_core::{CallQueueRef, Work};
	use parking_lot::Mutex;

	use super::{call1_once, queue1_once};
	use listeners::Listeners;

	trait Counter: Send + Sync {
		fn bump(&self);
	}

	struct Adder(AtomicUsize);
	impl Counter for Adder {
		fn bump(&self) {
			self.0.fetch_add(1, Ordering::Relaxed);
		}
	}

	#[derive(Default)]
	struct ManualQueue(Mutex<Vec<Work>>);
	impl CallQueueRef for ManualQueue {
		fn post(&self, work: Work) {
			self.0.lock().push(work);
		}
		fn is_on_servicing_thread(&self) -> bool {
			false
		}
		fn synchronize(&self) {
			for work in self.0.lock().drain(..) {
				work.run();
			}
		}
		fn is_closed(&self) -> bool {
			false
		}
	}

	#[test]
	fn queue1_once_removes_after_delivery() {
		let registry: Arc<Listeners<dyn Counter>> = Arc::new(Listeners::new());
		let queue: Arc<ManualQueue> = Arc::default();
		let listener: Arc<dyn Counter> = Arc::new(Adder(AtomicUsize::new(0)));
		registry.add(&listener, queue.clone());

		queue1_once(&registry, &listener, |l| l.bump()).unwrap();
		assert_eq!(registry.listener_count(), 1, "removal is deferred until drain");

		queue.synchronize();
		assert_eq!(registry.listener_count(), 0);
	}

	#[test]
	fn call1_once_drains_and_removes_inline_on_servicing_thread() {
		struct InlineQueue(Mutex<Vec<Work>>);
		impl CallQueueRef for InlineQueue {
			fn post(&self, work: Work) {
				self.0.lock().push(work);
			}
			fn is_on_servicing_thread(&self) -> bool {
				true
			}
			fn synchronize(&self) {
				for work in self.0.lock().drain(..) {
					work.run();
				}
			}
			fn is_closed(&self) -> bool {
				false
			}
		}

		let registry: Arc<Listeners<dyn Counter>> = Arc::new(Listeners::new());
		let queue: Arc<InlineQueue> = Arc::new(InlineQueue(Mutex::new(Vec::new())));
		let listener: Arc<dyn Counter> = Arc::new(Adder(AtomicUsize::new(0)));
		registry.add(&listener, queue);

		call1_once(&registry, &listener, |l| l.bump()).unwrap();
		assert_eq!(registry.listener_count(), 0);
	}
}
