use std::{
	collections::VecDeque,
	sync::atomic::{AtomicBool, Ordering},
};

use parking_lot::Mutex;

use crate::queue::{CallQueueRef, Work};

/// A manually-drained, never-auto-servicing test queue: `post` only ever
/// appends, and `is_on_servicing_thread` always reports `false`, so `call`
/// and `queue` behave identically until a test calls `drain` itself. This
/// matches the "one call queue Q (manually drained)" shape the scenarios use.
#[derive(Default)]
pub(crate) struct ManualQueue {
	pending: Mutex<VecDeque<Work>>,
	closed: AtomicBool,
}

impl ManualQueue {
	pub(crate) fn drain(&self) {
		loop {
			let work = self.pending.lock().pop_front();
			match work {
				Some(work) => work.run(),
				None => break,
			}
		}
	}

	pub(crate) fn close(&self) {
		self.closed.store(true, Ordering::Release);
	}
}

impl CallQueueRef for ManualQueue {
	fn post(&self, work: Work) {
		if self.closed.load(Ordering::Acquire) {
			drop(work);
			return;
		}
		self.pending.lock().push_back(work);
	}

	fn is_on_servicing_thread(&self) -> bool {
		false
	}

	fn synchronize(&self) {
		self.drain();
	}

	fn is_closed(&self) -> bool {
		self.closed.load(Ordering::Acquire)
	}
}

/// Always reports itself as the current servicing thread and drains
/// synchronously on `post`, modeling "Q's own servicing thread" for the
/// inline-drain scenario.
#[derive(Default)]
pub(crate) struct InlineQueue {
	pending: Mutex<VecDeque<Work>>,
}

impl CallQueueRef for InlineQueue {
	fn post(&self, work: Work) {
		self.pending.lock().push_back(work);
	}

	fn is_on_servicing_thread(&self) -> bool {
		true
	}

	fn synchronize(&self) {
		loop {
			let work = self.pending.lock().pop_front();
			match work {
				Some(work) => work.run(),
				None => break,
			}
		}
	}

	fn is_closed(&self) -> bool {
		false
	}
}
