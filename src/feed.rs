//! Bounded, ordered, deduplicated window over the most recent posts.

use std::collections::HashSet;
use std::collections::VecDeque;

use tracing::warn;

use crate::model::Post;

pub const DEFAULT_CAPACITY: usize = 50;

/// The set of posts currently shown, newest first. Two update sources feed
/// it: the push socket inserts posts one at a time, and the poller replaces
/// the whole window from the server's ordering. Insertion is idempotent per
/// id, so the two sources can interleave in any order without corrupting it.
#[derive(Debug, Clone)]
pub struct FeedBuffer {
    posts: VecDeque<Post>,
    capacity: usize,
}

impl FeedBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            posts: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert a post, or refresh it in place if its id is already present.
    /// A re-insert keeps the existing position; this is how a late-arriving
    /// sentiment result attaches to an already-rendered post. The latest
    /// non-null sentiment wins, and a null sentiment never clears an earlier
    /// result.
    pub fn insert(&mut self, post: Post) {
        if post.id.is_empty() {
            warn!("dropping post without an id");
            return;
        }

        if let Some(existing) = self.posts.iter_mut().find(|p| p.id == post.id) {
            existing.content = post.content;
            existing.author = post.author;
            existing.platform = post.platform;
            if post.sentiment.is_some() {
                existing.sentiment = post.sentiment;
            }
            return;
        }

        self.posts.push_front(post);
        self.posts.truncate(self.capacity);
    }

    /// Replace the whole window with a freshly fetched, newest-first list,
    /// truncated to capacity. The server's ordering and values are trusted;
    /// this resolves any drift incremental inserts accumulated. Posts with a
    /// duplicate or missing id are dropped.
    pub fn bulk_replace(&mut self, posts: Vec<Post>) {
        self.posts.clear();
        let mut seen: HashSet<String> = HashSet::new();
        for post in posts {
            if self.posts.len() == self.capacity {
                break;
            }
            if post.id.is_empty() {
                warn!("dropping post without an id from bulk refresh");
                continue;
            }
            if seen.insert(post.id.clone()) {
                self.posts.push_back(post);
            }
        }
    }

    /// An owned, point-in-time copy of the window for presentation. The live
    /// structure is never aliased out.
    pub fn snapshot(&self) -> Vec<Post> {
        self.posts.iter().cloned().collect()
    }
}

impl Default for FeedBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
