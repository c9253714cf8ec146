use std::{collections::HashMap, sync::Arc};

use crossbeam_utils::CachePadded;
use parking_lot::RwLock;

use crate::{
	call::Call,
	error::ListenersError,
	group::Group,
	id::{KindKey, SubscriberId, Tick},
	pool::CallPool,
	proxy::Proxy,
	queue::{queue_key, CallQueue},
};

/// The untyped publisher registry.
///
/// Owns every [`Group`] and [`Proxy`] for one publisher, plus the tick
/// counter that is the basis of the as-of-add visibility rule. No typed API
/// lives here: subscribers are opaque [`SubscriberId`]s, and a `Call`'s
/// invocation is already bound to whatever closure the typed facade
/// constructed.
pub struct Publisher {
	tick: Tick,
	groups: CachePadded<RwLock<HashMap<usize, Arc<Group>>>>,
	proxies: CachePadded<RwLock<HashMap<KindKey, Arc<Proxy>>>>,
	pool: Arc<CallPool>,
}

impl Default for Publisher {
	fn default() -> Self {
		Self::new()
	}
}

impl Publisher {
	/// A publisher backed by an unbounded [`CallPool`].
	pub fn new() -> Self {
		Self::with_pool(CallPool::unbounded())
	}

	/// A publisher backed by a caller-supplied pool, e.g. one created with
	/// [`CallPool::with_capacity`] to bound in-flight notifications.
	pub fn with_pool(pool: Arc<CallPool>) -> Self {
		Self {
			tick: Tick::new(),
			groups: CachePadded::new(RwLock::new(HashMap::new())),
			proxies: CachePadded::new(RwLock::new(HashMap::new())),
			pool,
		}
	}

	/// Allocates a `Call` from this publisher's pool. `f` is invoked with the
	/// opaque identity of whichever subscriber the Call ends up delivered to;
	/// the typed facade is what gives `f` a way to resolve that back to a
	/// concrete listener.
	pub fn alloc_call<F>(&self, f: F) -> Result<Call, ListenersError>
	where
		F: Fn(SubscriberId) + Send + Sync + 'static,
	{
		self.pool.alloc(f)
	}

	/// Preconditions: `subscriber` is not already registered on
	/// this publisher.
	pub fn add(&self, subscriber: SubscriberId, call_queue: CallQueue) {
		let key = queue_key(&call_queue);
		let group = {
			let mut groups = self.groups.write();
			crate::contract_assert!(
				groups.values().all(|group| !group.contains(subscriber)),
				"subscriber already registered on this publisher"
			);
			groups
				.entry(key)
				.or_insert_with(|| Group::new(call_queue))
				.clone()
		};
		let tick_at_add = self.tick.peek();
		group.add(subscriber, tick_at_add);

		// Any Proxy that already exists must learn about this Group so that
		// future coalesced updates reach it too.
		for proxy in self.proxies.read().values() {
			proxy.add_group(group.clone());
		}
	}

	/// Preconditions: `subscriber` is registered. May be
	/// called from any thread, including from inside the subscriber's own
	/// notification.
	pub fn remove(&self, subscriber: SubscriberId) {
		let mut groups = self.groups.write();
		let mut found = false;
		let mut emptied_key = None;
		for (&key, group) in groups.iter() {
			match group.remove(subscriber) {
				Some(now_empty) => {
					found = true;
					if now_empty {
						emptied_key = Some(key);
					}
					break;
				}
				None => continue,
			}
		}
		crate::contract_assert!(
			found,
			"removing a subscriber that is not registered on this publisher"
		);
		if let Some(key) = emptied_key {
			groups.remove(&key);
		}
	}

	/// Broadcast, draining variant. Increments the tick, then hands the
	/// Call to every Group's `call` operation, which drains inline on a
	/// Group's own servicing thread.
	pub fn call(&self, call: Call) {
		let groups = self.groups.read();
		let t = self.tick.advance();
		for group in groups.values() {
			group.call(call.clone(), t);
		}
	}

	/// Broadcast, non-draining variant.
	pub fn queue(&self, call: Call) {
		let groups = self.groups.read();
		let t = self.tick.advance();
		for group in groups.values() {
			group.queue_only(call.clone(), t);
		}
	}

	/// Targeted, draining variant. A Call aimed at a subscriber that
	/// is not currently registered is dropped without delivery.
	pub fn call1(&self, subscriber: SubscriberId, call: Call) {
		let groups = self.groups.read();
		let t = self.tick.advance();
		if let Some(group) = groups.values().find(|group| group.contains(subscriber)) {
			group.call1(call, t, subscriber);
		}
	}

	/// Targeted, non-draining variant.
	pub fn queue1(&self, subscriber: SubscriberId, call: Call) {
		let groups = self.groups.read();
		let t = self.tick.advance();
		if let Some(group) = groups.values().find(|group| group.contains(subscriber)) {
			group.queue1(call, t, subscriber);
		}
	}

	/// Finds or creates the Proxy for `kind`, enrolling every
	/// existing Group if the Proxy is newly created, then posts a coalesced
	/// notification. Never drains, even on a Group's own servicing thread.
	pub fn update<K: 'static>(&self, call: Call) {
		let proxy = self.proxy_for(KindKey::of::<K>());
		let groups = self.groups.read();
		let t = self.tick.advance();
		proxy.update(call, t);
		drop(groups);
	}

	fn proxy_for(&self, kind: KindKey) -> Arc<Proxy> {
		if let Some(proxy) = self.proxies.read().get(&kind).cloned() {
			return proxy;
		}
		let mut proxies = self.proxies.write();
		proxies
			.entry(kind)
			.or_insert_with(|| {
				let proxy = Arc::new(Proxy::new());
				for group in self.groups.read().values() {
					proxy.add_group(group.clone());
				}
				proxy
			})
			.clone()
	}

	/// Total number of registered subscribers across every call queue.
	/// Supplemental introspection; does not change any named invariant.
	pub fn listener_count(&self) -> usize {
		self.groups.read().values().map(|group| group.len()).sum()
	}
}

impl Drop for Publisher {
	fn drop(&mut self) {
		crate::contract_assert!(
			self.groups.read().is_empty(),
			"publisher destroyed while subscribers are still registered"
		);
	}
}

#[cfg(test)]
mod tests {
	use std::sync::{Arc, Mutex};

	use crate::test_util::ManualQueue;

	use super::{Publisher, SubscriberId};

	fn recorder() -> (Arc<Mutex<Vec<i32>>>, impl Fn(i32) + Send + Sync + Clone) {
		let log = Arc::new(Mutex::new(Vec::new()));
		let recording = log.clone();
		(log, move |value: i32| recording.lock().unwrap().push(value))
	}

	#[test]
	fn sequential_broadcast() {
		let publisher = Publisher::new();
		let queue: Arc<ManualQueue> = Arc::default();

		let (s1, s2) = (1u8, 2u8);
		let id1 = SubscriberId::from_ptr(&s1);
		let id2 = SubscriberId::from_ptr(&s2);
		let (log1, record1) = recorder();
		let (log2, record2) = recorder();
		publisher.add(id1, queue.clone());
		publisher.add(id2, queue.clone());

		for value in [1, 2, 3] {
			let (record1, record2) = (record1.clone(), record2.clone());
			let call = publisher
				.alloc_call(move |id| {
					if id == id1 {
						record1(value);
					} else if id == id2 {
						record2(value);
					}
				})
				.unwrap();
			publisher.queue(call);
		}
		queue.drain();

		assert_eq!(*log1.lock().unwrap(), vec![1, 2, 3]);
		assert_eq!(*log2.lock().unwrap(), vec![1, 2, 3]);

		publisher.remove(id1);
		publisher.remove(id2);
	}

	#[test]
	fn late_join() {
		let publisher = Publisher::new();
		let queue: Arc<ManualQueue> = Arc::default();

		let (s1, s2) = (1u8, 2u8);
		let id1 = SubscriberId::from_ptr(&s1);
		let id2 = SubscriberId::from_ptr(&s2);
		let (log1, record1) = recorder();
		let (log2, record2) = recorder();

		publisher.add(id1, queue.clone());
		let call = publisher
			.alloc_call({
				let record1 = record1.clone();
				move |id| {
					if id == id1 {
						record1(1);
					}
				}
			})
			.unwrap();
		publisher.queue(call);

		publisher.add(id2, queue.clone());
		let call = publisher
			.alloc_call(move |id| {
				if id == id1 {
					record1(2);
				} else if id == id2 {
					record2(2);
				}
			})
			.unwrap();
		publisher.queue(call);

		queue.drain();

		assert_eq!(*log1.lock().unwrap(), vec![1, 2]);
		assert_eq!(*log2.lock().unwrap(), vec![2]);

		publisher.remove(id1);
		publisher.remove(id2);
	}

	#[test]
	fn coalesced_updates_deliver_only_the_latest() {
		struct Kind;

		let publisher = Publisher::new();
		let queue: Arc<ManualQueue> = Arc::default();
		let s = 1u8;
		let id = SubscriberId::from_ptr(&s);
		let (log, record) = recorder();

		publisher.add(id, queue.clone());
		for value in [1, 2, 3] {
			let record = record.clone();
			let call = publisher.alloc_call(move |_id| record(value)).unwrap();
			publisher.update::<Kind>(call);
		}
		queue.drain();

		assert_eq!(*log.lock().unwrap(), vec![3]);

		publisher.remove(id);
	}

	#[test]
	fn targeted_call_to_removed_subscriber_is_silent() {
		let publisher = Publisher::new();
		let queue: Arc<ManualQueue> = Arc::default();
		let s = 1u8;
		let id = SubscriberId::from_ptr(&s);
		let (log, record) = recorder();

		publisher.add(id, queue.clone());
		publisher.remove(id);

		let call = publisher.alloc_call(move |_id| record(9)).unwrap();
		publisher.call1(id, call);
		queue.drain();

		assert!(log.lock().unwrap().is_empty());
	}

	#[test]
	fn self_remove_during_delivery_stops_the_later_entry() {
		let publisher = Arc::new(Publisher::new());
		let queue: Arc<ManualQueue> = Arc::default();
		let (s1, s2) = (1u8, 2u8);
		let id1 = SubscriberId::from_ptr(&s1);
		let id2 = SubscriberId::from_ptr(&s2);
		let (log, record) = recorder();

		publisher.add(id1, queue.clone());
		publisher.add(id2, queue.clone());

		let publisher_in_call = publisher.clone();
		let call = publisher
			.alloc_call(move |id| {
				if id == id1 {
					record(1);
					publisher_in_call.remove(id1);
					publisher_in_call.remove(id2);
				} else if id == id2 {
					record(2);
				}
			})
			.unwrap();
		publisher.queue(call);
		queue.drain();

		assert_eq!(*log.lock().unwrap(), vec![1]);
	}

	#[test]
	fn inline_drain_completes_before_call_returns() {
		use crate::test_util::InlineQueue;

		let publisher = Publisher::new();
		let queue: Arc<InlineQueue> = Arc::default();
		let s = 1u8;
		let id = SubscriberId::from_ptr(&s);
		let (log, record) = recorder();

		publisher.add(id, queue);
		let call = publisher.alloc_call(move |_id| record(1)).unwrap();
		publisher.call(call);

		assert_eq!(*log.lock().unwrap(), vec![1]);

		publisher.remove(id);
	}

	#[test]
	#[should_panic(expected = "already registered")]
	fn double_add_is_a_contract_violation() {
		let publisher = Publisher::new();
		let queue: Arc<ManualQueue> = Arc::default();
		let s = 1u8;
		let id = SubscriberId::from_ptr(&s);
		publisher.add(id, queue.clone());
		publisher.add(id, queue);
	}

	#[test]
	#[should_panic(expected = "not registered")]
	fn remove_nonexistent_is_a_contract_violation() {
		let publisher = Publisher::new();
		let s = 1u8;
		publisher.remove(SubscriberId::from_ptr(&s));
	}
}
