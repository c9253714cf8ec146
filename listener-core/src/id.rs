use std::{
	any::TypeId,
	sync::atomic::{AtomicU64, Ordering},
};

/// Opaque identity of a subscriber: a non-owning back-reference.
///
/// The core never dereferences this value. The typed facade derives it from
/// the subscriber's address and resolves it back to a live reference (a
/// [`Weak`](std::sync::Weak), typically) at invocation time.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SubscriberId(usize);

impl SubscriberId {
	/// Derives an identity from a subscriber's address. Two pointers that
	/// compare equal yield the same identity, regardless of type.
	pub fn from_ptr<T: ?Sized>(ptr: *const T) -> Self {
		Self(ptr.cast::<()>() as usize)
	}
}

/// The publisher's monotonically increasing visibility clock.
///
/// `peek` realizes "read without incrementing" (used by `add`); `advance`
/// realizes "atomically increment, obtain `t`" (used by every broadcast).
/// Deliberately 64-bit: a 32-bit counter would wrap around at roughly 4e9
/// broadcasts over a long-lived publisher, which this crate avoids outright.
pub(crate) struct Tick(AtomicU64);

impl Tick {
	pub(crate) fn new() -> Self {
		Self(AtomicU64::new(0))
	}

	pub(crate) fn peek(&self) -> u64 {
		self.0.load(Ordering::Acquire)
	}

	pub(crate) fn advance(&self) -> u64 {
		self.0.fetch_add(1, Ordering::AcqRel) + 1
	}
}

/// Stable, equality-comparable identity for a notification kind.
///
/// A coalescing proxy needs some stable, equality-comparable key per
/// notification kind; a `TypeId` keyed on the listener interface's
/// notification marker type is such a key, and needs no unsafe byte-capture
/// of a function pointer to get one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct KindKey(TypeId);

impl KindKey {
	pub fn of<K: 'static>() -> Self {
		Self(TypeId::of::<K>())
	}
}
