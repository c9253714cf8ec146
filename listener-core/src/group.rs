use std::sync::Arc;

use arc_swap::ArcSwapOption;
use crossbeam_utils::CachePadded;
use parking_lot::{Mutex, RwLock};
use scopeguard::guard;

use crate::{
	call::Call,
	entry::Entry,
	id::SubscriberId,
	queue::{CallQueue, Work},
};

/// The publisher's per-call-queue aggregation.
///
/// Holds the Entries for one call queue, marshals each notification onto
/// that queue, and filters delivery by the as-of-add rule.
pub(crate) struct Group {
	queue: CallQueue,
	entries: CachePadded<RwLock<Vec<Entry>>>,
	/// Transient "current listener" slot: which subscriber, if any, is
	/// presently being invoked on this Group's servicing thread. Delivery
	/// itself never holds the entry-list lock while invoking a subscriber
	/// (see `do_call`), so a same-thread reentrant `remove` never needs to
	/// special-case this slot to avoid deadlock; it is cleared by a
	/// `scopeguard` so a panicking subscriber still leaves it empty.
	current_listener: CachePadded<Mutex<Option<SubscriberId>>>,
}

impl Group {
	pub(crate) fn new(queue: CallQueue) -> Arc<Self> {
		Arc::new(Self {
			queue,
			entries: CachePadded::new(RwLock::new(Vec::new())),
			current_listener: CachePadded::new(Mutex::new(None)),
		})
	}

	pub(crate) fn add(&self, subscriber: SubscriberId, tick_at_add: u64) {
		let mut entries = self.entries.write();
		crate::contract_assert!(
			!entries.iter().any(|e| e.subscriber == subscriber),
			"subscriber already registered on this call queue"
		);
		entries.push(Entry {
			subscriber,
			tick_at_add,
		});
	}

	/// Removes `subscriber`'s Entry if present. Returns `None` if this Group
	/// never held an Entry for it, or `Some(now_empty)` otherwise.
	pub(crate) fn remove(&self, subscriber: SubscriberId) -> Option<bool> {
		let mut entries = self.entries.write();
		let before = entries.len();
		entries.retain(|e| e.subscriber != subscriber);
		if entries.len() == before {
			return None;
		}
		Some(entries.is_empty())
	}

	pub(crate) fn contains(&self, subscriber: SubscriberId) -> bool {
		self.entries.read().iter().any(|e| e.subscriber == subscriber)
	}

	pub(crate) fn len(&self) -> usize {
		self.entries.read().len()
	}

	pub(crate) fn call(self: &Arc<Self>, call: Call, tick: u64) {
		self.post_do_call(call, tick);
		if self.queue.is_on_servicing_thread() {
			self.queue.synchronize();
		}
	}

	pub(crate) fn queue_only(self: &Arc<Self>, call: Call, tick: u64) {
		self.post_do_call(call, tick);
	}

	pub(crate) fn call1(self: &Arc<Self>, call: Call, tick: u64, subscriber: SubscriberId) {
		self.post_do_call1(call, tick, subscriber);
		if self.queue.is_on_servicing_thread() {
			self.queue.synchronize();
		}
	}

	pub(crate) fn queue1(self: &Arc<Self>, call: Call, tick: u64, subscriber: SubscriberId) {
		self.post_do_call1(call, tick, subscriber);
	}

	fn post_do_call(self: &Arc<Self>, call: Call, tick: u64) {
		let this = self.clone();
		self.queue.post(Work::new(move || this.do_call(&call, tick)));
	}

	fn post_do_call1(self: &Arc<Self>, call: Call, tick: u64, subscriber: SubscriberId) {
		let this = self.clone();
		self.queue
			.post(Work::new(move || this.do_call1(&call, tick, subscriber)));
	}

	/// Posts a coalesced delivery: the work unit fetches whatever Call is in
	/// `slot` at drain time, swapping it back to empty, rather than closing
	/// over a specific Call the way `post_do_call` does.
	pub(crate) fn post_coalesced(self: &Arc<Self>, slot: Arc<ArcSwapOption<Call>>, tick_at_post: u64) {
		let this = self.clone();
		self.queue.post(Work::new(move || {
			if let Some(call) = slot.swap(None) {
				this.do_call(&call, tick_at_post);
			}
		}));
	}

	/// Executed on the servicing thread. Invokes `call` against every Entry
	/// whose tick-at-add predates `tick` and that is still present at its
	/// turn: a subscriber removed earlier in this same delivery loop (even
	/// by another Entry's own invocation) is skipped rather than invoked.
	fn do_call(&self, call: &Call, tick: u64) {
		let snapshot: Vec<Entry> = self.entries.read().clone();
		for entry in snapshot {
			if entry.tick_at_add >= tick {
				continue;
			}
			if !self.contains(entry.subscriber) {
				// Removed by an earlier step of this same delivery loop.
				continue;
			}
			*self.current_listener.lock() = Some(entry.subscriber);
			let current_listener = &self.current_listener;
			let _clear_on_exit = guard((), |()| *current_listener.lock() = None);
			call.invoke(entry.subscriber);
		}
	}

	fn do_call1(&self, call: &Call, tick: u64, subscriber: SubscriberId) {
		let tick_at_add = {
			let entries = self.entries.read();
			entries
				.iter()
				.find(|e| e.subscriber == subscriber)
				.map(|e| e.tick_at_add)
		};
		let Some(tick_at_add) = tick_at_add else {
			return;
		};
		if tick_at_add >= tick {
			return;
		}
		*self.current_listener.lock() = Some(subscriber);
		let current_listener = &self.current_listener;
		let _clear_on_exit = guard((), |()| *current_listener.lock() = None);
		call.invoke(subscriber);
	}
}
