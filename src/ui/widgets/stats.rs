//! Aggregate widgets: the stat card row and the distribution panel.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use super::{emotion_color, label_color};
use crate::aggregate::AggregateSnapshot;
use crate::model::SentimentLabel;

pub struct StatsWidget;

impl StatsWidget {
    pub fn new() -> Self {
        Self
    }

    /// One card per headline number, side by side.
    pub fn render_cards(&self, frame: &mut Frame, area: Rect, aggregate: &AggregateSnapshot) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
            ])
            .split(area);

        let window = match aggregate.timeframe_hours {
            Some(hours) => format!("last {hours} hours"),
            None => "current feed".to_string(),
        };
        render_card(
            frame,
            chunks[0],
            "Total Posts",
            aggregate.total_count.to_string(),
            window,
            Color::Cyan,
        );

        for (chunk, label) in chunks[1..].iter().zip(SentimentLabel::ALL) {
            render_card(
                frame,
                *chunk,
                label.as_str(),
                format!("{}%", aggregate.percentages.get(label)),
                format!("{} posts", aggregate.counts.get(label)),
                label_color(label),
            );
        }
    }

    /// Distribution gauges plus the emotion tallies underneath.
    pub fn render_distribution(
        &self,
        frame: &mut Frame,
        area: Rect,
        aggregate: &AggregateSnapshot,
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Gray))
            .title(" Sentiment Distribution ");

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Min(2)])
            .split(inner);

        let gauge_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
            ])
            .split(chunks[0]);

        for (row, label) in gauge_rows.iter().zip(SentimentLabel::ALL) {
            let percent = aggregate.percentages.get(label).clamp(0.0, 100.0);
            let gauge = Gauge::default()
                .gauge_style(Style::default().fg(label_color(label)))
                .label(format!(
                    "{} {:.0}% ({})",
                    label,
                    percent,
                    aggregate.counts.get(label)
                ))
                .ratio(percent / 100.0);
            frame.render_widget(gauge, *row);
        }

        self.render_emotions(frame, chunks[1], aggregate);
    }

    fn render_emotions(&self, frame: &mut Frame, area: Rect, aggregate: &AggregateSnapshot) {
        let mut lines = vec![Line::from(Span::styled(
            "Emotions",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))];

        if aggregate.emotions.is_empty() {
            lines.push(Line::from(Span::styled(
                "none detected yet",
                Style::default().fg(Color::DarkGray),
            )));
        } else {
            // highest counts first
            let mut entries: Vec<(&String, &u64)> = aggregate.emotions.iter().collect();
            entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
            for (emotion, count) in entries {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("#{emotion:<12}"),
                        Style::default().fg(emotion_color(emotion)),
                    ),
                    Span::styled(format!("{count}"), Style::default().fg(Color::White)),
                ]));
            }
        }

        frame.render_widget(Paragraph::new(lines), area);
    }
}

impl Default for StatsWidget {
    fn default() -> Self {
        Self::new()
    }
}

fn render_card(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    value: String,
    subtitle: String,
    color: Color,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(format!(" {title} "));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let text = vec![
        Line::from(Span::styled(
            value,
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(subtitle, Style::default().fg(Color::DarkGray))),
    ];
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), inner);
}
