use listener_core::CallQueue;
use once_cell::sync::Lazy;
use listeners_queue::SerialQueue;

static GLOBAL_QUEUE: Lazy<CallQueue> = Lazy::new(|| {
	let queue: CallQueue = SerialQueue::new();
	queue
});

/// A process-wide, lazily-initialized serial call queue.
///
/// Mirrors `isoprenoid`'s `global_signals_runtime` feature: a usable default
/// so a caller who only ever needs one queue doesn't have to construct and
/// thread one through by hand.
pub fn global_queue() -> CallQueue {
	GLOBAL_QUEUE.clone()
}
