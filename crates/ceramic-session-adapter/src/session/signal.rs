/*
[INPUT]:  Authentication state transitions from the session service
[OUTPUT]: Latest-value snapshots and replay-of-one boolean streams
[POS]:    Session layer - observable authentication state
[UPDATE]: When changing subscription semantics
*/

use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use tokio::sync::watch;

/// Single-writer, multi-reader "is a verified session bound" flag.
///
/// Starts `false`. Every subscriber first receives the latest value, then
/// later transitions in order; intermediate values may be coalesced.
#[derive(Debug)]
pub struct AuthenticationSignal {
    tx: watch::Sender<bool>,
}

impl AuthenticationSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Snapshot of the latest value
    pub fn current(&self) -> bool {
        *self.tx.borrow()
    }

    /// Stream of values, starting with the latest one.
    ///
    /// Ends once the signal (and the service owning it) is dropped.
    pub fn subscribe(&self) -> BoxStream<'static, bool> {
        let mut rx = self.tx.subscribe();
        rx.mark_changed();

        stream::unfold(rx, |mut rx| async move {
            rx.changed().await.ok()?;
            let value = *rx.borrow_and_update();
            Some((value, rx))
        })
        .boxed()
    }

    /// Raw receiver for callers that prefer `watch` semantics
    pub fn watch(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    pub(crate) fn publish(&self, value: bool) {
        self.tx.send_replace(value);
    }
}

impl Default for AuthenticationSignal {
    fn default() -> Self {
        Self::new()
    }
}
