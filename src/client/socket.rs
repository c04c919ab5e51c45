//! Push sub-channel: the long-lived sentiment stream socket.

use chrono::Utc;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

use super::FeedEvent;
use crate::model::WirePost;
use serde::Deserialize;

/// Inbound socket messages, discriminated by their `type` field. Types this
/// client does not know about deserialize into `Unknown` and are ignored.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsMessage {
    Connected,
    NewPost { data: WirePost },
    MetricsUpdate,
    #[serde(other)]
    Unknown,
}

/// Read the socket until it errors or closes, forwarding parsed events.
/// A malformed frame is logged and dropped; it never tears the task down.
pub(crate) async fn run_socket(url: String, tx: mpsc::Sender<FeedEvent>) {
    let mut stream = match connect_async(url.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(err) => {
            warn!(url = %url, error = %err, "push socket failed to connect");
            let _ = tx.send(FeedEvent::SocketError(err.to_string())).await;
            return;
        }
    };
    debug!(url = %url, "push socket open");

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                if let Some(event) = parse_frame(&text) {
                    if tx.send(event).await.is_err() {
                        return;
                    }
                }
            }
            Ok(Message::Close(_)) => {
                let _ = tx.send(FeedEvent::SocketClosed).await;
                return;
            }
            Ok(_) => {}
            Err(err) => {
                warn!(error = %err, "push socket failed");
                let _ = tx.send(FeedEvent::SocketError(err.to_string())).await;
                return;
            }
        }
    }

    // stream ended without a close frame
    let _ = tx.send(FeedEvent::SocketClosed).await;
}

/// Parse one text frame into an event. Returns `None` for frames that are
/// malformed, carry an unknown type, or fail post validation.
fn parse_frame(text: &str) -> Option<FeedEvent> {
    let message: WsMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(err) => {
            warn!(error = %err, "dropping unparseable socket frame");
            return None;
        }
    };

    match message {
        WsMessage::Connected => Some(FeedEvent::Connected),
        WsMessage::MetricsUpdate => Some(FeedEvent::MetricsUpdate),
        WsMessage::NewPost { data } => match data.into_post(Utc::now()) {
            Ok(post) => Some(FeedEvent::NewPost(post)),
            Err(err) => {
                warn!(error = %err, "dropping invalid post from socket");
                None
            }
        },
        WsMessage::Unknown => {
            debug!("ignoring socket frame with unknown type");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SentimentLabel;

    #[test]
    fn test_connected_greeting() {
        let frame = r#"{"type": "connected", "message": "Connected to sentiment stream",
                        "timestamp": "2024-05-01T00:00:00Z"}"#;
        assert!(matches!(parse_frame(frame), Some(FeedEvent::Connected)));
    }

    #[test]
    fn test_new_post_frame() {
        let frame = r#"{"type": "new_post", "data": {
            "post_id": 42, "content": "love this", "author": "sam", "platform": "reddit",
            "sentiment": {"label": "positive", "confidence": 0.88, "emotion": "joy"}
        }}"#;
        match parse_frame(frame) {
            Some(FeedEvent::NewPost(post)) => {
                assert_eq!(post.id, "42");
                assert_eq!(
                    post.sentiment.as_ref().unwrap().label,
                    SentimentLabel::Positive
                );
            }
            other => panic!("expected NewPost, got {other:?}"),
        }
    }

    #[test]
    fn test_metrics_update_payload_ignored() {
        let frame = r#"{"type": "metrics_update", "data": {"last_minute": {"total": 3}},
                        "timestamp": "2024-05-01T00:00:00Z"}"#;
        assert!(matches!(parse_frame(frame), Some(FeedEvent::MetricsUpdate)));
    }

    #[test]
    fn test_unknown_type_ignored() {
        assert!(parse_frame(r#"{"type": "alert_fired", "data": {}}"#).is_none());
    }

    #[test]
    fn test_malformed_json_dropped() {
        assert!(parse_frame("{not json").is_none());
    }

    #[test]
    fn test_new_post_without_id_dropped() {
        let frame = r#"{"type": "new_post", "data": {"content": "orphan"}}"#;
        assert!(parse_frame(frame).is_none());
    }
}
