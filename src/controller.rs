//! Dashboard controller: applies transport events to the feed buffer and
//! aggregation engine, advances the connection state machine, and publishes
//! the combined state as one atomic unit.

use chrono::{DateTime, Local};

use crate::aggregate::AggregateSnapshot;
use crate::client::FeedEvent;
use crate::feed::FeedBuffer;
use crate::model::Post;
use crate::status::{ConnectionStatus, ConnectionTracker};

/// Immutable point-in-time view handed to the presentation layer. Rebuilt
/// wholesale on every applied event, so a feed snapshot is never paired
/// with a stale aggregate.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub feed: Vec<Post>,
    pub aggregate: AggregateSnapshot,
    pub status: ConnectionStatus,
    pub last_update: Option<DateTime<Local>>,
    /// Transient pull-channel failure indicator; cleared by the next
    /// successful refresh.
    pub fetch_error: Option<String>,
}

pub struct DashboardController {
    buffer: FeedBuffer,
    tracker: ConnectionTracker,
    aggregate: AggregateSnapshot,
    last_update: Option<DateTime<Local>>,
    fetch_error: Option<String>,
    published: DashboardState,
}

impl DashboardController {
    pub fn new(capacity: usize) -> Self {
        let buffer = FeedBuffer::new(capacity);
        let published = DashboardState {
            feed: Vec::new(),
            aggregate: AggregateSnapshot::default(),
            status: ConnectionStatus::Connecting,
            last_update: None,
            fetch_error: None,
        };
        Self {
            buffer,
            tracker: ConnectionTracker::new(),
            aggregate: AggregateSnapshot::default(),
            last_update: None,
            fetch_error: None,
            published,
        }
    }

    /// Apply one transport event and republish. Runs to completion before
    /// the next event is processed; no partial updates are ever visible.
    pub fn apply(&mut self, event: FeedEvent) -> &DashboardState {
        match event {
            FeedEvent::Connected => {
                self.tracker.message_received();
            }
            FeedEvent::NewPost(post) => {
                self.tracker.message_received();
                self.buffer.insert(post);
                self.aggregate = AggregateSnapshot::from_posts(&self.buffer.snapshot());
                self.last_update = Some(Local::now());
            }
            FeedEvent::MetricsUpdate => {
                self.tracker.message_received();
                self.last_update = Some(Local::now());
            }
            FeedEvent::SocketError(_) => {
                self.tracker.channel_error();
            }
            FeedEvent::SocketClosed => {
                self.tracker.channel_closed();
            }
            FeedEvent::Refresh { posts, analytics } => {
                self.buffer.bulk_replace(posts);
                // the server's window is authoritative for this cycle
                self.aggregate =
                    AggregateSnapshot::from_analytics(&analytics, &self.buffer.snapshot());
                self.fetch_error = None;
                self.last_update = Some(Local::now());
            }
            FeedEvent::FetchFailed(reason) => {
                // previous snapshot stays in place; next poll retries
                self.fetch_error = Some(reason);
            }
        }

        self.publish();
        &self.published
    }

    /// The push socket is being explicitly reopened.
    pub fn reconnecting(&mut self) -> &DashboardState {
        self.tracker.reopened();
        self.publish();
        &self.published
    }

    pub fn state(&self) -> &DashboardState {
        &self.published
    }

    fn publish(&mut self) {
        self.published = DashboardState {
            feed: self.buffer.snapshot(),
            aggregate: self.aggregate.clone(),
            status: self.tracker.status(),
            last_update: self.last_update,
            fetch_error: self.fetch_error.clone(),
        };
    }
}
