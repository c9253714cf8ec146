use std::sync::Arc;

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;

use crate::{call::Call, group::Group};

struct SubEntry {
	group: Arc<Group>,
	pending: Arc<ArcSwapOption<Call>>,
}

/// The per-notification-kind coalescing slot.
///
/// Holds one sub-entry per Group that has ever existed while this Proxy has
/// existed. Each sub-entry's pending-Call slot is an atomically-swappable
/// reference; `update` realizes the winner-takes-all coalescing rule.
pub(crate) struct Proxy {
	sub_entries: Mutex<Vec<SubEntry>>,
}

impl Proxy {
	pub(crate) fn new() -> Self {
		Self {
			sub_entries: Mutex::new(Vec::new()),
		}
	}

	/// Enrolls `group` with a null pending slot, unless it is already
	/// enrolled (idempotent, matching the call site in
	/// `Publisher::add`/`Publisher::update`, both of which may observe a
	/// Group the Proxy already knows about).
	pub(crate) fn add_group(&self, group: Arc<Group>) {
		let mut entries = self.sub_entries.lock();
		if entries.iter().any(|e| Arc::ptr_eq(&e.group, &group)) {
			return;
		}
		entries.push(SubEntry {
			group,
			pending: Arc::new(ArcSwapOption::empty()),
		});
	}

	/// For every sub-entry, atomically swap in the new Call. If the slot
	/// was empty, this update wins the race to post a drain work unit; if
	/// it already held a Call, that Call is dropped unexecuted and no new
	/// work unit is posted — the one already in flight will pick up
	/// whichever Call is in the slot when it runs.
	pub(crate) fn update(&self, call: Call, tick: u64) {
		let entries = self.sub_entries.lock();
		for entry in entries.iter() {
			let previous = entry.pending.swap(Some(Arc::new(call.clone())));
			if previous.is_none() {
				entry.group.post_coalesced(entry.pending.clone(), tick);
			}
		}
	}
}
