#![warn(clippy::pedantic)]
#![warn(missing_docs)]
//! A reference [`CallQueueRef`] implementation: a thread-affine, single-
//! threaded serial queue.
//!
//! This is scaffolding, not part of the listeners core itself — the call
//! queue is an external collaborator the core only depends on through the
//! [`CallQueueRef`] trait. This crate exists so the core has something to
//! post work to in tests and small programs, the same way `isoprenoid`
//! ships a `GlobalSignalRuntime` alongside the `SignalRuntimeRef` trait it
//! implements.

use std::{
	collections::VecDeque,
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc,
	},
	thread::{self, ThreadId},
};

use listener_core::{CallQueue, CallQueueRef, Work};
use parking_lot::Mutex;

/// A FIFO work queue pinned to one servicing thread at a time.
///
/// Bound to its creating thread by default; call [`SerialQueue::rebind_to_current_thread`]
/// to move servicing duty elsewhere. Never legal to rebind while a drain is
/// in progress on another thread — that is a caller contract, like the rest
/// of the call-queue interface.
pub struct SerialQueue {
	pending: Mutex<VecDeque<Work>>,
	servicing_thread: Mutex<ThreadId>,
	closed: AtomicBool,
}

impl SerialQueue {
	/// Creates a queue pinned to the calling thread.
	pub fn new() -> Arc<Self> {
		log::debug!("creating serial call queue on {:?}", thread::current().id());
		Arc::new(Self {
			pending: Mutex::new(VecDeque::new()),
			servicing_thread: Mutex::new(thread::current().id()),
			closed: AtomicBool::new(false),
		})
	}

	/// Moves servicing duty to the calling thread.
	pub fn rebind_to_current_thread(&self) {
		*self.servicing_thread.lock() = thread::current().id();
	}

	/// Closes the queue: subsequent `post`s are discarded, and whatever is
	/// currently pending is dropped without running.
	pub fn close(&self) {
		self.closed.store(true, Ordering::Release);
		let dropped = self.pending.lock().drain(..).count();
		log::debug!("closed serial call queue, discarding {dropped} pending work units");
	}
}

impl CallQueueRef for SerialQueue {
	fn post(&self, work: Work) {
		if self.closed.load(Ordering::Acquire) {
			drop(work);
			return;
		}
		self.pending.lock().push_back(work);
	}

	fn is_on_servicing_thread(&self) -> bool {
		*self.servicing_thread.lock() == thread::current().id()
	}

	fn synchronize(&self) {
		assert!(
			self.is_on_servicing_thread(),
			"SerialQueue::synchronize called off its servicing thread"
		);
		let mut drained = 0;
		while let Some(work) = self.pending.lock().pop_front() {
			work.run();
			drained += 1;
		}
		log::trace!("drained {drained} work units from serial call queue");
	}

	fn is_closed(&self) -> bool {
		self.closed.load(Ordering::Acquire)
	}
}

/// Convenience: a [`SerialQueue`] already upcast to the trait object the
/// listeners crates expect.
pub fn serial_queue() -> CallQueue {
	SerialQueue::new()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fifo_order_and_manual_drain() {
		let queue = SerialQueue::new();
		let order = Arc::new(Mutex::new(Vec::new()));

		for value in [1, 2, 3] {
			let order = order.clone();
			queue.post(Work::new(move || order.lock().push(value)));
		}
		assert!(order.lock().is_empty());

		queue.synchronize();
		assert_eq!(*order.lock(), vec![1, 2, 3]);
	}

	#[test]
	fn closing_discards_pending_work() {
		let queue = SerialQueue::new();
		let ran = Arc::new(Mutex::new(false));
		let ran_in_work = ran.clone();
		queue.post(Work::new(move || *ran_in_work.lock() = true));

		queue.close();
		queue.synchronize();

		assert!(!*ran.lock());
		assert!(queue.is_closed());
	}

	#[test]
	fn post_after_close_is_discarded() {
		let queue = SerialQueue::new();
		queue.close();

		let ran = Arc::new(Mutex::new(false));
		let ran_in_work = ran.clone();
		queue.post(Work::new(move || *ran_in_work.lock() = true));
		queue.synchronize();

		assert!(!*ran.lock());
	}

	#[test]
	fn synchronize_off_thread_panics() {
		let queue = SerialQueue::new();
		queue.rebind_to_current_thread();
		let other = thread::spawn(move || {
			std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| queue.synchronize()))
		});
		assert!(other.join().unwrap().is_err());
	}
}
