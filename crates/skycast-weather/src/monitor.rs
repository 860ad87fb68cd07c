//! Connectivity observation.
//!
//! [`NetworkMonitor`] watches a [`ConnectivitySource`] on its own task and
//! emits a stream of [`NetworkStatus`] transitions, suppressing consecutive
//! duplicates. Starting consumes the monitor; the stream cannot be
//! restarted once stopped.

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Duration};

use crate::types::NetworkStatus;

/// Source of raw reachability readings.
///
/// The seam to whatever facility actually knows whether the device is
/// online. `None` ends the stream.
#[async_trait]
pub trait ConnectivitySource: Send + 'static {
    async fn next_status(&mut self) -> Option<NetworkStatus>;
}

/// Periodic TCP reachability probe.
///
/// The first reading is taken immediately; subsequent readings wait out the
/// probe interval.
pub struct TcpProbeSource {
    addr: String,
    interval: Duration,
    connect_timeout: Duration,
    primed: bool,
}

impl TcpProbeSource {
    pub fn new(addr: impl Into<String>, interval: Duration, connect_timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            interval,
            connect_timeout,
            primed: false,
        }
    }
}

#[async_trait]
impl ConnectivitySource for TcpProbeSource {
    async fn next_status(&mut self) -> Option<NetworkStatus> {
        if self.primed {
            sleep(self.interval).await;
        } else {
            self.primed = true;
        }

        let reachable = matches!(
            timeout(self.connect_timeout, TcpStream::connect(&self.addr)).await,
            Ok(Ok(_))
        );

        Some(if reachable {
            NetworkStatus::Online
        } else {
            NetworkStatus::Offline
        })
    }
}

/// Adapter over an existing reachability signal.
pub struct ChannelSource {
    rx: mpsc::Receiver<NetworkStatus>,
}

impl ChannelSource {
    pub fn new(rx: mpsc::Receiver<NetworkStatus>) -> Self {
        Self { rx }
    }
}

#[async_trait]
impl ConnectivitySource for ChannelSource {
    async fn next_status(&mut self) -> Option<NetworkStatus> {
        self.rx.recv().await
    }
}

/// Watches a connectivity source and emits deduplicated transitions.
pub struct NetworkMonitor<S> {
    source: S,
}

impl<S: ConnectivitySource> NetworkMonitor<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Spawn the observation task and return the live transition stream.
    pub fn start(self) -> NetworkEvents {
        let (tx, rx) = mpsc::channel(16);
        let mut source = self.source;

        let task = tokio::spawn(async move {
            let mut last = None;
            while let Some(status) = source.next_status().await {
                if last == Some(status) {
                    continue;
                }
                last = Some(status);
                if tx.send(status).await.is_err() {
                    break;
                }
            }
            tracing::debug!("Connectivity source ended");
        });

        NetworkEvents { rx, task }
    }
}

/// Live stream of network transitions.
pub struct NetworkEvents {
    rx: mpsc::Receiver<NetworkStatus>,
    task: JoinHandle<()>,
}

impl NetworkEvents {
    /// Next transition, or `None` once the source has ended.
    pub async fn recv(&mut self) -> Option<NetworkStatus> {
        self.rx.recv().await
    }

    /// Stop observing and release the underlying task.
    pub fn stop(self) {
        self.task.abort();
    }

    /// Hand the raw receiver to a consumer. Observation ends once the
    /// receiver is dropped.
    pub fn into_receiver(self) -> mpsc::Receiver<NetworkStatus> {
        self.rx
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    async fn collect(mut events: NetworkEvents) -> Vec<NetworkStatus> {
        let mut seen = Vec::new();
        while let Some(status) = events.recv().await {
            seen.push(status);
        }
        seen
    }

    #[tokio::test]
    async fn test_consecutive_duplicates_are_suppressed() {
        let (tx, rx) = mpsc::channel(16);
        let events = NetworkMonitor::new(ChannelSource::new(rx)).start();

        for status in [
            NetworkStatus::Online,
            NetworkStatus::Online,
            NetworkStatus::Offline,
            NetworkStatus::Offline,
            NetworkStatus::Online,
        ] {
            tx.send(status).await.unwrap();
        }
        drop(tx);

        assert_eq!(
            collect(events).await,
            vec![
                NetworkStatus::Online,
                NetworkStatus::Offline,
                NetworkStatus::Online
            ]
        );
    }

    #[tokio::test]
    async fn test_stream_ends_with_source() {
        let (tx, rx) = mpsc::channel(16);
        let mut events = NetworkMonitor::new(ChannelSource::new(rx)).start();

        tx.send(NetworkStatus::Offline).await.unwrap();
        drop(tx);

        assert_eq!(events.recv().await, Some(NetworkStatus::Offline));
        assert_eq!(events.recv().await, None);
    }

    #[tokio::test]
    async fn test_stop_releases_the_task() {
        let (tx, rx) = mpsc::channel(16);
        let events = NetworkMonitor::new(ChannelSource::new(rx)).start();
        events.stop();
        // The sender stays open; stopping must not hang or panic.
        drop(tx);
    }

    #[tokio::test]
    async fn test_unreachable_probe_reports_offline() {
        // TEST-NET-1 address; connections fail or time out.
        let mut source = TcpProbeSource::new(
            "192.0.2.1:9",
            Duration::from_millis(10),
            Duration::from_millis(100),
        );
        assert_eq!(source.next_status().await, Some(NetworkStatus::Offline));
    }
}
