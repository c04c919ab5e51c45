//! Transport client: one push socket plus one pull scheduler, normalized
//! into a single stream of typed update events.

pub mod http;
pub mod socket;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::SyncError;
use crate::model::{AnalyticsResponse, Post};

/// Update events from both channels, in the order the runtime delivers
/// them. The consumer applies them one at a time; no ordering is assumed
/// between the push and pull sub-channels beyond last-applied-wins.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// The push channel delivered its greeting message.
    Connected,
    /// A single post arrived (or was re-sent with its sentiment attached).
    NewPost(Post),
    /// The server signalled fresh metrics; worth refreshing the full state.
    MetricsUpdate,
    /// The push socket failed.
    SocketError(String),
    /// The push socket closed without a preceding error.
    SocketClosed,
    /// The pull channel fetched the full state.
    Refresh {
        posts: Vec<Post>,
        analytics: AnalyticsResponse,
    },
    /// A scheduled fetch failed; the previous state stays in place and the
    /// next poll retries.
    FetchFailed(String),
}

/// Pull-channel fetch surface, kept behind a trait so the poller can run
/// against a stub in tests.
#[async_trait]
pub trait FetchApi: Send + Sync {
    async fn fetch_posts(&self, limit: usize) -> Result<Vec<Post>, SyncError>;
    async fn fetch_analytics(&self, hours: u32) -> Result<AnalyticsResponse, SyncError>;
}

#[derive(Debug, Clone, Copy)]
struct PollParams {
    interval: Duration,
    limit: usize,
    hours: u32,
}

/// Owns the push socket task and the poll task. Exactly one push connection
/// is live per client; reopening closes the previous one. Dropping the
/// client tears both tasks down.
pub struct TransportClient {
    ws_url: String,
    tx: mpsc::Sender<FeedEvent>,
    refresh: Arc<Notify>,
    socket_task: Option<JoinHandle<()>>,
    poll_task: Option<JoinHandle<()>>,
}

impl TransportClient {
    /// Open the push socket and start the poll scheduler. The returned
    /// receiver yields every event from both channels.
    pub fn connect(
        config: &Config,
        fetcher: Arc<dyn FetchApi>,
    ) -> (Self, mpsc::Receiver<FeedEvent>) {
        let (tx, rx) = mpsc::channel(64);
        let refresh = Arc::new(Notify::new());

        let params = PollParams {
            interval: Duration::from_secs(config.poll_interval_secs.max(1)),
            limit: config.feed_capacity,
            hours: config.analytics_hours,
        };

        let socket_task = tokio::spawn(socket::run_socket(config.ws_url(), tx.clone()));
        let poll_task = tokio::spawn(run_poller(fetcher, params, refresh.clone(), tx.clone()));

        let client = Self {
            ws_url: config.ws_url(),
            tx,
            refresh,
            socket_task: Some(socket_task),
            poll_task: Some(poll_task),
        };
        (client, rx)
    }

    /// Wake the poller for an immediate full-state fetch.
    pub fn request_refresh(&self) {
        self.refresh.notify_one();
    }

    /// Tear down the current push socket (if any) and open a fresh one.
    pub fn reopen_socket(&mut self) {
        if let Some(task) = self.socket_task.take() {
            task.abort();
        }
        debug!(url = %self.ws_url, "reopening push socket");
        self.socket_task = Some(tokio::spawn(socket::run_socket(
            self.ws_url.clone(),
            self.tx.clone(),
        )));
    }

    /// Close the socket and cancel the poll timer. Idempotent.
    pub fn close(&mut self) {
        if let Some(task) = self.socket_task.take() {
            task.abort();
        }
        if let Some(task) = self.poll_task.take() {
            task.abort();
        }
    }
}

impl Drop for TransportClient {
    fn drop(&mut self) {
        self.close();
    }
}

/// Recurring full-state fetch. Fires on the configured interval and
/// whenever `refresh` is notified; each cycle emits either one `Refresh`
/// or one `FetchFailed`. Runs regardless of push-channel health.
async fn run_poller(
    fetcher: Arc<dyn FetchApi>,
    params: PollParams,
    refresh: Arc<Notify>,
    tx: mpsc::Sender<FeedEvent>,
) {
    let mut ticker = tokio::time::interval(params.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = refresh.notified() => {}
        }

        let (posts, analytics) = tokio::join!(
            fetcher.fetch_posts(params.limit),
            fetcher.fetch_analytics(params.hours),
        );

        let event = match (posts, analytics) {
            (Ok(posts), Ok(analytics)) => FeedEvent::Refresh { posts, analytics },
            (Err(err), _) | (_, Err(err)) => {
                warn!(error = %err, "full-state fetch failed");
                FeedEvent::FetchFailed(err.to_string())
            }
        };

        if tx.send(event).await.is_err() {
            // consumer is gone, nothing left to poll for
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WirePercentages;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubApi {
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FetchApi for StubApi {
        async fn fetch_posts(&self, _limit: usize) -> Result<Vec<Post>, SyncError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(SyncError::Validation("boom".to_string()))
            } else {
                Ok(Vec::new())
            }
        }

        async fn fetch_analytics(&self, hours: u32) -> Result<AnalyticsResponse, SyncError> {
            Ok(AnalyticsResponse {
                timeframe_hours: Some(hours),
                total_count: 7,
                positive_count: 7,
                negative_count: 0,
                neutral_count: 0,
                percentages: WirePercentages {
                    positive: 100.0,
                    negative: 0.0,
                    neutral: 0.0,
                },
            })
        }
    }

    fn poll_params() -> PollParams {
        PollParams {
            // long enough that only the immediate first tick fires
            interval: Duration::from_secs(3600),
            limit: 50,
            hours: 24,
        }
    }

    #[tokio::test]
    async fn test_poller_emits_refresh() {
        let (tx, mut rx) = mpsc::channel(8);
        let fetcher = Arc::new(StubApi {
            fail: false,
            calls: AtomicUsize::new(0),
        });
        let task = tokio::spawn(run_poller(
            fetcher,
            poll_params(),
            Arc::new(Notify::new()),
            tx,
        ));

        match rx.recv().await {
            Some(FeedEvent::Refresh { analytics, .. }) => {
                assert_eq!(analytics.total_count, 7);
            }
            other => panic!("expected Refresh, got {other:?}"),
        }
        task.abort();
    }

    #[tokio::test]
    async fn test_poller_reports_fetch_failure_and_keeps_running() {
        let (tx, mut rx) = mpsc::channel(8);
        let refresh = Arc::new(Notify::new());
        let fetcher = Arc::new(StubApi {
            fail: true,
            calls: AtomicUsize::new(0),
        });
        let task = tokio::spawn(run_poller(
            fetcher.clone(),
            poll_params(),
            refresh.clone(),
            tx,
        ));

        assert!(matches!(rx.recv().await, Some(FeedEvent::FetchFailed(_))));

        // a nudge after a failure triggers another attempt
        refresh.notify_one();
        assert!(matches!(rx.recv().await, Some(FeedEvent::FetchFailed(_))));
        assert!(fetcher.calls.load(Ordering::SeqCst) >= 2);
        task.abort();
    }
}
