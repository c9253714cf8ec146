use std::sync::{
	atomic::{AtomicUsize, Ordering},
	Arc,
};

use crate::{call::Call, error::ListenersError, id::SubscriberId};

/// A FIFO-biased admission gate for [`Call`] allocation.
///
/// `Call`s themselves are ordinary `Arc` allocations; recycling an arbitrary,
/// unsized closure's backing storage across allocations would need a custom
/// allocator, which this crate does not carry. What the pool provides instead
/// is bounded-growth accounting: a capacity-limited pool fails loudly on
/// exhaustion rather than growing without bound, leaving publisher state
/// untouched by the failed call. Unbounded pools never fail.
pub struct CallPool {
	capacity: Option<usize>,
	outstanding: AtomicUsize,
}

impl CallPool {
	/// A pool with no capacity limit; `alloc` never fails.
	pub fn unbounded() -> Arc<Self> {
		Arc::new(Self {
			capacity: None,
			outstanding: AtomicUsize::new(0),
		})
	}

	/// A pool that refuses to hand out more than `capacity` outstanding
	/// `Call`s at once.
	pub fn with_capacity(capacity: usize) -> Arc<Self> {
		Arc::new(Self {
			capacity: Some(capacity),
			outstanding: AtomicUsize::new(0),
		})
	}

	pub(crate) fn alloc<F>(self: &Arc<Self>, f: F) -> Result<Call, ListenersError>
	where
		F: Fn(SubscriberId) + Send + Sync + 'static,
	{
		if let Some(capacity) = self.capacity {
			let admitted = self
				.outstanding
				.fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
					(n < capacity).then_some(n + 1)
				});
			if admitted.is_err() {
				return Err(ListenersError::PoolExhausted);
			}
		} else {
			self.outstanding.fetch_add(1, Ordering::Relaxed);
		}
		Ok(Call::from_parts(Box::new(f), Arc::downgrade(self)))
	}

	pub(crate) fn release(&self) {
		self.outstanding.fetch_sub(1, Ordering::Relaxed);
	}

	/// Number of `Call`s allocated from this pool that have not yet been
	/// released (i.e. dropped by every Group that held a reference).
	pub fn outstanding(&self) -> usize {
		self.outstanding.load(Ordering::Relaxed)
	}
}
