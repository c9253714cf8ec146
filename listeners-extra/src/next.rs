use std::sync::Arc;

use async_lock::OnceCell;
use listener_core::ListenersError;
use listeners::Listeners;

/// Bridges a single targeted notification into a `Future`.
///
/// Issues a `call1` to `listener`, capturing whatever `extract` reads from
/// it into an [`async_lock::OnceCell`], and removes `listener` from
/// `registry` once that notification has run. The returned future resolves
/// once the notification has actually executed on the listener's call
/// queue — for a queue that isn't presently being serviced by the calling
/// thread, `call1` only posts the work, so without this adapter a caller
/// has no way to tell delivery apart from "still queued."
///
/// Built on `async_lock::OnceCell`: `set_blocking` from the synchronous
/// callback, `wait().await` from the async caller.
pub async fn next_notification<L, T, F>(registry: &Arc<Listeners<L>>, listener: &Arc<L>, extract: F) -> Result<T, ListenersError>
where
	L: Send + Sync + 'static,
	T: Clone + Send + Sync + 'static,
	F: Fn(&L) -> T + Send + Sync + 'static,
{
	let once = Arc::new(OnceCell::<T>::new());
	let once_in_call = once.clone();
	let registry_in_call = registry.clone();
	let target = listener.clone();
	registry.call1(listener, move |l| {
		once_in_call.set_blocking(extract(l)).ok();
		registry_in_call.remove(&target);
	})?;
	Ok(once.wait().await.clone())
}
