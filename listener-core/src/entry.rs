use crate::id::SubscriberId;

/// { subscriber pointer, tick-at-add }. Immutable after creation.
#[derive(Clone, Copy)]
pub(crate) struct Entry {
	pub(crate) subscriber: SubscriberId,
	pub(crate) tick_at_add: u64,
}
