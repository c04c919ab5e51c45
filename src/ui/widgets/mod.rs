pub mod feed;
pub mod stats;

use ratatui::style::Color;

use crate::model::SentimentLabel;

/// Badge colour for a sentiment label.
pub fn label_color(label: SentimentLabel) -> Color {
    match label {
        SentimentLabel::Positive => Color::Green,
        SentimentLabel::Negative => Color::Red,
        SentimentLabel::Neutral => Color::Gray,
    }
}

/// Tag colour for an emotion. Emotions come from the classifier as free
/// text, so unknown ones get a muted fallback.
pub fn emotion_color(emotion: &str) -> Color {
    match emotion {
        "joy" => Color::Yellow,
        "sadness" => Color::Blue,
        "anger" => Color::Red,
        "fear" => Color::Magenta,
        "surprise" => Color::LightMagenta,
        "disgust" => Color::LightRed,
        "neutral" => Color::Gray,
        _ => Color::DarkGray,
    }
}
