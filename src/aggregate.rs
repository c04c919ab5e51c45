//! Derived sentiment statistics for the current feed state.

use std::collections::BTreeMap;

use crate::model::{AnalyticsResponse, Post, SentimentLabel};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelCounts {
    pub positive: u64,
    pub negative: u64,
    pub neutral: u64,
}

impl LabelCounts {
    pub fn get(&self, label: SentimentLabel) -> u64 {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
        }
    }

    fn bump(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LabelShares {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

impl LabelShares {
    pub fn get(&self, label: SentimentLabel) -> f64 {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
        }
    }
}

/// A point-in-time distribution snapshot. Recomputed wholesale on every
/// update, never mutated in place; either derived from the feed buffer or
/// accepted from the server's own analytics window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateSnapshot {
    /// All posts in the window, including still-processing ones.
    pub total_count: u64,
    /// Posts that have a sentiment result attached.
    pub labeled_count: u64,
    pub counts: LabelCounts,
    pub percentages: LabelShares,
    pub emotions: BTreeMap<String, u64>,
    /// Server window in hours when this snapshot came from the analytics
    /// endpoint; `None` for buffer-derived snapshots.
    pub timeframe_hours: Option<u32>,
}

impl AggregateSnapshot {
    /// Recompute from the current buffer contents. Pure: a fixed input
    /// always yields the same snapshot. Posts with no sentiment yet count
    /// toward `total_count` only; percentages are over labeled posts and
    /// stay all-zero when nothing is labeled.
    pub fn from_posts(posts: &[Post]) -> Self {
        let mut counts = LabelCounts::default();
        let mut labeled = 0u64;

        for post in posts {
            if let Some(sentiment) = &post.sentiment {
                labeled += 1;
                counts.bump(sentiment.label);
            }
        }

        let percentages = if labeled == 0 {
            LabelShares::default()
        } else {
            let share = |count: u64| (count as f64 / labeled as f64 * 100.0).round();
            LabelShares {
                positive: share(counts.positive),
                negative: share(counts.negative),
                neutral: share(counts.neutral),
            }
        };

        AggregateSnapshot {
            total_count: posts.len() as u64,
            labeled_count: labeled,
            counts,
            percentages,
            emotions: emotion_counts(posts),
            timeframe_hours: None,
        }
    }

    /// Accept the server-computed analytics snapshot. Authoritative when
    /// available: its window (e.g. last 24 hours) can cover far more posts
    /// than the bounded client buffer. The analytics endpoint carries no
    /// per-emotion data, so emotion counts are taken from the buffer.
    pub fn from_analytics(resp: &AnalyticsResponse, buffer_posts: &[Post]) -> Self {
        AggregateSnapshot {
            total_count: resp.total_count,
            labeled_count: resp.total_count,
            counts: LabelCounts {
                positive: resp.positive_count,
                negative: resp.negative_count,
                neutral: resp.neutral_count,
            },
            percentages: LabelShares {
                positive: resp.percentages.positive,
                negative: resp.percentages.negative,
                neutral: resp.percentages.neutral,
            },
            emotions: emotion_counts(buffer_posts),
            timeframe_hours: resp.timeframe_hours,
        }
    }
}

/// Per-emotion counts over labeled posts.
pub fn emotion_counts(posts: &[Post]) -> BTreeMap<String, u64> {
    let mut emotions: BTreeMap<String, u64> = BTreeMap::new();
    for post in posts {
        if let Some(emotion) = post.sentiment.as_ref().and_then(|s| s.emotion.as_deref()) {
            *emotions.entry(emotion.to_string()).or_insert(0) += 1;
        }
    }
    emotions
}
