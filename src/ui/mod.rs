//! Declarative rendering of the published dashboard state. Everything here
//! is a pure consumer: it reads one immutable snapshot per frame and holds
//! no feed state of its own.

pub mod widgets;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::controller::DashboardState;
use crate::status::ConnectionStatus;
use widgets::feed::LiveFeedWidget;
use widgets::stats::StatsWidget;

pub fn draw(frame: &mut Frame, state: &DashboardState, feed: &LiveFeedWidget, stats: &StatsWidget) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(10),
        ])
        .split(frame.area());

    render_header(frame, chunks[0], state);
    stats.render_cards(frame, chunks[1], &state.aggregate);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[2]);

    feed.render(frame, body[0], &state.feed);
    stats.render_distribution(frame, body[1], &state.aggregate);
}

fn render_header(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(50)])
        .split(inner);

    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            "Sentiment Monitor",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "  live social media sentiment",
            Style::default().fg(Color::DarkGray),
        ),
    ]));
    frame.render_widget(title, columns[0]);

    let mut right = vec![
        Span::styled("● ", Style::default().fg(status_color(state.status))),
        Span::styled(
            state.status.label(),
            Style::default().fg(status_color(state.status)),
        ),
    ];
    if let Some(last_update) = state.last_update {
        right.push(Span::styled(
            format!("  updated {}", last_update.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if state.fetch_error.is_some() {
        right.push(Span::styled(
            "  fetch failed, retrying",
            Style::default().fg(Color::Red),
        ));
    }
    frame.render_widget(
        Paragraph::new(Line::from(right)).alignment(ratatui::layout::Alignment::Right),
        columns[1],
    );
}

fn status_color(status: ConnectionStatus) -> Color {
    match status {
        ConnectionStatus::Connected => Color::Green,
        ConnectionStatus::Connecting => Color::Yellow,
        ConnectionStatus::Error => Color::Red,
        ConnectionStatus::Disconnected => Color::Red,
    }
}
