//! Streaming relay: forwards upstream fragments to the HTTP response.
//!
//! A producer task drains the upstream `FragmentStream` into a bounded channel;
//! the SSE body reads the other end. Each fragment is sent the moment it is
//! decoded. When the client goes away the receiver is dropped, the producer
//! notices and drops the upstream connection.

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::llm_client::{FragmentStream, StreamFragment};

const RELAY_BUFFER: usize = 32;

pub fn spawn_relay(mut fragments: FragmentStream) -> mpsc::Receiver<StreamFragment> {
    let (tx, rx) = mpsc::channel(RELAY_BUFFER);

    tokio::spawn(async move {
        let mut reasoning = 0usize;
        let mut content = 0usize;

        loop {
            let next = tokio::select! {
                _ = tx.closed() => {
                    debug!("Client disconnected; dropping upstream stream");
                    return;
                }
                next = fragments.next() => next,
            };

            match next {
                Some(Ok(fragment)) => {
                    if fragment.is_reasoning() {
                        reasoning += 1;
                    } else {
                        content += 1;
                    }
                    if tx.send(fragment).await.is_err() {
                        debug!("Client disconnected; dropping upstream stream");
                        return;
                    }
                }
                Some(Err(e)) => {
                    warn!("Upstream stream aborted after {} fragments: {e}", reasoning + content);
                    break;
                }
                None => break,
            }
        }

        info!(reasoning, content, "Course stream finished");
    });

    rx
}

#[cfg(test)]
mod tests {
    use std::task::Poll;
    use std::time::Duration;

    use futures_util::stream;
    use tokio::sync::oneshot;

    use super::*;
    use crate::llm_client::LlmError;

    #[tokio::test]
    async fn test_relays_fragments_in_order() {
        let upstream: FragmentStream = Box::pin(stream::iter(vec![
            Ok::<_, LlmError>(StreamFragment::reasoning("think")),
            Ok(StreamFragment::content("ans")),
        ]));

        let mut rx = spawn_relay(upstream);
        assert_eq!(rx.recv().await, Some(StreamFragment::reasoning("think")));
        assert_eq!(rx.recv().await, Some(StreamFragment::content("ans")));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_each_fragment_is_forwarded_before_the_next_arrives() {
        let (release_tx, release_rx) = oneshot::channel::<()>();

        let first = stream::once(async { Ok::<_, LlmError>(StreamFragment::reasoning("think")) });
        let second = stream::once(async move {
            release_rx.await.ok();
            Ok::<_, LlmError>(StreamFragment::content("ans"))
        });
        let upstream: FragmentStream = Box::pin(first.chain(second));

        let mut rx = spawn_relay(upstream);

        // The first fragment must arrive while the upstream is still blocked on the second.
        let first = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("first fragment was held back");
        assert_eq!(first, Some(StreamFragment::reasoning("think")));

        release_tx.send(()).unwrap();
        assert_eq!(rx.recv().await, Some(StreamFragment::content("ans")));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_upstream_error_ends_relay_keeping_prior_fragments() {
        let upstream: FragmentStream = Box::pin(stream::iter(vec![
            Ok(StreamFragment::content("partial")),
            Err(LlmError::Stream("reset".to_string())),
            Ok(StreamFragment::content("unreachable")),
        ]));

        let mut rx = spawn_relay(upstream);
        assert_eq!(rx.recv().await, Some(StreamFragment::content("partial")));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_producer_stops_when_receiver_dropped() {
        let (dropped_tx, dropped_rx) = oneshot::channel::<()>();

        // Never yields; signals when the relay drops it.
        struct Guard(Option<oneshot::Sender<()>>);
        impl Drop for Guard {
            fn drop(&mut self) {
                if let Some(tx) = self.0.take() {
                    let _ = tx.send(());
                }
            }
        }
        let guard = Guard(Some(dropped_tx));
        let upstream: FragmentStream = Box::pin(stream::poll_fn(move |_cx| {
            let _held = &guard;
            Poll::<Option<Result<StreamFragment, LlmError>>>::Pending
        }));

        let rx = spawn_relay(upstream);
        drop(rx);

        tokio::time::timeout(Duration::from_secs(1), dropped_rx)
            .await
            .expect("upstream was not dropped after disconnect")
            .unwrap();
    }
}
