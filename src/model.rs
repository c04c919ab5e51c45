//! Typed structs for the sentiment API wire formats and the domain model
//! derived from them.
//!
//! Wire types (`Wire*`, `*Response`) mirror the backend JSON exactly and only
//! derive `Deserialize`; domain types are what the rest of the crate works
//! with. Conversion is the single place where inbound data is validated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sentiment {
    pub label: SentimentLabel,
    pub score: f64,
    pub emotion: Option<String>,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: String,
    pub content: String,
    pub author: String,
    pub platform: String,
    pub sentiment: Option<Sentiment>,
    pub received_at: DateTime<Utc>,
}

// -- Wire formats --

/// Sentiment payload as the backend sends it. The REST join and the socket
/// broadcast disagree on field names (`label` vs `sentiment`, `confidence`
/// vs `confidence_score`), so both spellings are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct WireSentiment {
    #[serde(alias = "sentiment", alias = "sentiment_label")]
    pub label: SentimentLabel,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default, alias = "confidence_score")]
    pub confidence: Option<f64>,
}

impl From<WireSentiment> for Sentiment {
    fn from(wire: WireSentiment) -> Self {
        Sentiment {
            score: wire.score.or(wire.confidence).unwrap_or(0.0),
            label: wire.label,
            emotion: wire.emotion,
            confidence: wire.confidence,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WirePost {
    #[serde(alias = "post_id", deserialize_with = "string_or_number", default)]
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default = "default_platform")]
    pub platform: String,
    #[serde(default)]
    pub sentiment: Option<WireSentiment>,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn default_author() -> String {
    "anonymous".to_string()
}

fn default_platform() -> String {
    "web".to_string()
}

/// Post ids arrive as JSON numbers from the database-backed endpoints and as
/// strings from newer ingesters; normalize both to a string key.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Num(i64),
        Text(String),
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::Num(n) => n.to_string(),
        Repr::Text(s) => s,
    })
}

impl WirePost {
    /// Validate and convert into a domain [`Post`]. `received_at` is the
    /// ingest time used when the payload carries no usable `created_at`.
    pub fn into_post(self, received_at: DateTime<Utc>) -> Result<Post, SyncError> {
        if self.id.is_empty() {
            return Err(SyncError::Validation("post is missing an id".to_string()));
        }

        let received_at = self
            .created_at
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(received_at);

        Ok(Post {
            id: self.id,
            content: self.content,
            author: self.author,
            platform: self.platform,
            sentiment: self.sentiment.map(Sentiment::from),
            received_at,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostsResponse {
    #[serde(default)]
    pub posts: Vec<WirePost>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
pub struct WirePercentages {
    #[serde(default)]
    pub positive: f64,
    #[serde(default)]
    pub negative: f64,
    #[serde(default)]
    pub neutral: f64,
}

/// Server-computed analytics over its own window (e.g. last 24 hours), which
/// can cover far more posts than the client-side feed buffer holds.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsResponse {
    #[serde(default)]
    pub timeframe_hours: Option<u32>,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub positive_count: u64,
    #[serde(default)]
    pub negative_count: u64,
    #[serde(default)]
    pub neutral_count: u64,
    #[serde(default)]
    pub percentages: WirePercentages,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub services: BTreeMap<String, String>,
    #[serde(default)]
    pub stats: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewPostRequest {
    pub content: String,
    pub author: String,
    pub platform: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ingest_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_post_from_rest_shape() {
        let json = r#"{
            "post_id": 17,
            "platform": "mastodon",
            "content": "shipping it",
            "author": "casey",
            "created_at": "2024-04-30T09:15:00Z",
            "sentiment": {"label": "positive", "confidence": 0.91, "emotion": "joy"}
        }"#;
        let wire: WirePost = serde_json::from_str(json).unwrap();
        let post = wire.into_post(ingest_time()).unwrap();

        assert_eq!(post.id, "17");
        assert_eq!(post.author, "casey");
        assert_eq!(post.platform, "mastodon");
        let sentiment = post.sentiment.unwrap();
        assert_eq!(sentiment.label, SentimentLabel::Positive);
        assert_eq!(sentiment.emotion.as_deref(), Some("joy"));
        // score falls back to confidence when the REST join omits it
        assert_eq!(sentiment.score, 0.91);
        assert_eq!(
            post.received_at,
            Utc.with_ymd_and_hms(2024, 4, 30, 9, 15, 0).unwrap()
        );
    }

    #[test]
    fn test_post_with_string_id_and_no_sentiment() {
        let json = r#"{"id": "abc-1", "content": "processing"}"#;
        let wire: WirePost = serde_json::from_str(json).unwrap();
        let post = wire.into_post(ingest_time()).unwrap();

        assert_eq!(post.id, "abc-1");
        assert_eq!(post.author, "anonymous");
        assert_eq!(post.platform, "web");
        assert!(post.sentiment.is_none());
        assert_eq!(post.received_at, ingest_time());
    }

    #[test]
    fn test_post_without_id_is_rejected() {
        let json = r#"{"content": "orphan"}"#;
        let wire: WirePost = serde_json::from_str(json).unwrap();
        assert!(matches!(
            wire.into_post(ingest_time()),
            Err(SyncError::Validation(_))
        ));
    }

    #[test]
    fn test_bad_created_at_falls_back_to_ingest_time() {
        let json = r#"{"id": "x", "content": "hi", "created_at": "not-a-date"}"#;
        let wire: WirePost = serde_json::from_str(json).unwrap();
        let post = wire.into_post(ingest_time()).unwrap();
        assert_eq!(post.received_at, ingest_time());
    }

    #[test]
    fn test_sentiment_alias_fields() {
        let json = r#"{"sentiment": "negative", "confidence_score": 0.4}"#;
        let wire: WireSentiment = serde_json::from_str(json).unwrap();
        let sentiment = Sentiment::from(wire);
        assert_eq!(sentiment.label, SentimentLabel::Negative);
        assert_eq!(sentiment.confidence, Some(0.4));
        assert_eq!(sentiment.score, 0.4);
    }

    #[test]
    fn test_analytics_response() {
        let json = r#"{
            "timeframe_hours": 24,
            "positive_count": 10,
            "negative_count": 5,
            "neutral_count": 5,
            "total_count": 20,
            "percentages": {"positive": 50.0, "negative": 25.0, "neutral": 25.0}
        }"#;
        let resp: AnalyticsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.total_count, 20);
        assert_eq!(resp.percentages.positive, 50.0);
    }
}
