use std::sync::{Arc, Weak};

use crate::{id::SubscriberId, pool::CallPool};

pub(crate) struct CallInner {
	f: Box<dyn Fn(SubscriberId) + Send + Sync>,
	pool: Weak<CallPool>,
}

impl Drop for CallInner {
	fn drop(&mut self) {
		if let Some(pool) = self.pool.upgrade() {
			pool.release();
		}
	}
}

/// A reference-counted, pool-allocated, type-erased notification.
///
/// Immutable after construction. Its only operation is invocation against an
/// opaque subscriber identity; the typed facade is responsible for resolving
/// that identity back to a concrete listener reference.
#[derive(Clone)]
pub struct Call(pub(crate) Arc<CallInner>);

impl Call {
	pub(crate) fn from_parts(f: Box<dyn Fn(SubscriberId) + Send + Sync>, pool: Weak<CallPool>) -> Self {
		Self(Arc::new(CallInner { f, pool }))
	}

	pub(crate) fn invoke(&self, subscriber: SubscriberId) {
		(self.0.f)(subscriber);
	}
}
