//! Notification-to-snapshot composition for subscription resolvers
//!
//! A subscription field doesn't ship payloads: each change token triggers a
//! fresh snapshot fetch, and the snapshot is what the client sees. Tokens are
//! processed strictly in receipt order, but a burst arriving while a fetch is
//! in flight sits in the channel and may coalesce into fewer emissions than
//! publishes; subscribers still always end up observing the latest state.

use futures::stream::{self, Stream};
use futures::StreamExt;

use super::bus::EventStream;

/// Turn a token stream plus a snapshot capability into the value stream a
/// subscription field delivers.
///
/// With `emit_initial`, one snapshot is emitted before any token is waited
/// on. A `None` snapshot (entity gone, or a fetch error the caller already
/// logged) skips that emission without ending the stream; the stream ends
/// exactly when `notifications` does.
pub fn watch<T, F, Fut>(
    notifications: EventStream,
    emit_initial: bool,
    snapshot: F,
) -> impl Stream<Item = T> + Send
where
    T: Send + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Option<T>> + Send,
{
    stream::iter(emit_initial.then_some(()))
        .chain(notifications)
        .filter_map(move |()| snapshot())
}
