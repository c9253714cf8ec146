use std::fmt;

/// Recoverable failure from the publish surface.
///
/// Double-add, remove-nonexistent and destroy-with-subscribers are contract
/// violations and are reported as fatal assertions rather than through this
/// type — there is no reasonable way for a caller to recover from a
/// programmer error. Adding a subscriber after its call queue has closed is
/// likewise a caller contract, but is not separately checked: the closed
/// queue already discards posted work on its own, so the visible symptom is
/// a silently un-notified subscriber rather than a panic.
#[derive(Debug)]
#[non_exhaustive]
pub enum ListenersError {
	/// The [`CallPool`](crate::CallPool) backing this publisher has reached
	/// its configured capacity. The publish operation that produced this
	/// error had no effect on publisher state.
	PoolExhausted,
}

impl fmt::Display for ListenersError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::PoolExhausted => write!(f, "call pool exhausted its configured capacity"),
		}
	}
}

impl std::error::Error for ListenersError {}
