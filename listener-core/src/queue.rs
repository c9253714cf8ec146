use std::{fmt, sync::Arc};

/// A boxed, one-shot unit of work posted to a [`CallQueueRef`].
pub struct Work(Box<dyn FnOnce() + Send>);

impl Work {
	pub fn new<F: FnOnce() + Send + 'static>(f: F) -> Self {
		Self(Box::new(f))
	}

	pub fn run(self) {
		(self.0)();
	}
}

impl fmt::Debug for Work {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Work").finish_non_exhaustive()
	}
}

/// The "call queue" external collaborator: a per-execution-context FIFO
/// serial executor pinned to one servicing thread at a time.
///
/// This core never implements one itself; see `listeners-queue` for a
/// reference implementation, or plug in whatever per-thread work queue the
/// host application already runs.
pub trait CallQueueRef: Send + Sync {
	/// Enqueues `work`. Ordering with respect to other posted work is FIFO.
	fn post(&self, work: Work);

	/// True if the current thread is this queue's servicing thread.
	fn is_on_servicing_thread(&self) -> bool;

	/// Drains pending work now. Only legal when called on the servicing
	/// thread; behavior otherwise is up to the implementation.
	fn synchronize(&self);

	/// True once the queue has been closed. A closed queue's `post` must
	/// discard `work`, dropping whatever it captured, rather than run it.
	fn is_closed(&self) -> bool;
}

/// A shared handle to a call queue, as stored in a [`Group`](crate::Publisher).
pub type CallQueue = Arc<dyn CallQueueRef>;

/// Identity of a call queue for the purposes of "at most one Group per call
/// queue per publisher". Two `Arc`s pointing at the same allocation share a
/// key even though `dyn CallQueueRef` has no `PartialEq`.
pub(crate) fn queue_key(queue: &CallQueue) -> usize {
	Arc::as_ptr(queue).cast::<()>() as usize
}
