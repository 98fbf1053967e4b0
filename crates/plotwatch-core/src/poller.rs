// ── Background poll loop ──
//
// One sweep over all hosts immediately at startup, then every interval.
// Hosts are polled sequentially: worst-case sweep time is bounded by
// host_count x request timeout, and no host is ever polled twice
// concurrently. The loop only ever enqueues results; it never touches
// the store or tables itself.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use plotwatch_api::{ApiError, HostReport, StatusClient};

/// One poll result, sent to the render loop's queue.
#[derive(Debug)]
pub struct PollUpdate {
    pub host: String,
    pub result: Result<HostReport, ApiError>,
}

/// Spawn the poll loop. Cancel the token to stop it; dropping the
/// receiver stops it too.
pub fn spawn_poller(
    client: StatusClient,
    hosts: Vec<String>,
    interval: Duration,
    tx: mpsc::UnboundedSender<PollUpdate>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // A slow sweep must not be followed by a burst of catch-up sweeps.
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    for host in &hosts {
                        if cancel.is_cancelled() {
                            return;
                        }
                        let result = client.fetch(host).await;
                        if let Err(err) = &result {
                            warn!(%host, error = %err, "status poll failed");
                        }
                        if tx.send(PollUpdate { host: host.clone(), result }).is_err() {
                            return;
                        }
                    }
                    debug!(hosts = hosts.len(), "poll sweep complete");
                }
            }
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_sweep_runs_immediately_and_isolates_failures() {
        let client = StatusClient::with_timeout(Duration::from_millis(200)).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        // Nothing listens on either port; both fetches fail fast and
        // each still produces its own update.
        let handle = spawn_poller(
            client,
            vec!["127.0.0.1:9".into(), "127.0.0.1:1".into()],
            Duration::from_secs(3600),
            tx,
            cancel.clone(),
        );

        let first = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.host, "127.0.0.1:9");
        assert!(first.result.is_err());

        let second = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.host, "127.0.0.1:1");
        assert!(second.result.is_err());

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn dropping_the_receiver_stops_the_loop() {
        let client = StatusClient::with_timeout(Duration::from_millis(200)).unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let handle = spawn_poller(
            client,
            vec!["127.0.0.1:9".into()],
            Duration::from_millis(10),
            tx,
            cancel,
        );

        drop(rx);
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
