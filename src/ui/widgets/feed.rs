//! Live feed widget: the scrolling post list plus the compose modal.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::{emotion_color, label_color};
use crate::model::Post;

#[derive(Debug, Clone, PartialEq)]
enum FeedMode {
    Normal,
    Compose,
}

#[derive(Debug, Clone)]
pub struct LiveFeedWidget {
    selected_index: usize,
    list_state: ListState,
    mode: FeedMode,
    compose_text: String,
    status_message: Option<String>,
}

impl LiveFeedWidget {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            selected_index: 0,
            list_state,
            mode: FeedMode::Normal,
            compose_text: String::new(),
            status_message: None,
        }
    }

    pub fn scroll_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
            self.list_state.select(Some(self.selected_index));
        }
    }

    pub fn scroll_down(&mut self, post_count: usize) {
        if post_count > 0 && self.selected_index < post_count - 1 {
            self.selected_index += 1;
            self.list_state.select(Some(self.selected_index));
        }
    }

    pub fn open_compose(&mut self) {
        self.mode = FeedMode::Compose;
        self.compose_text.clear();
        self.status_message = None;
    }

    pub fn close_modal(&mut self) {
        self.mode = FeedMode::Normal;
        self.compose_text.clear();
    }

    pub fn is_composing(&self) -> bool {
        self.mode == FeedMode::Compose
    }

    pub fn add_char(&mut self, c: char) {
        if self.mode == FeedMode::Compose {
            self.compose_text.push(c);
        }
    }

    pub fn delete_char(&mut self) {
        if self.mode == FeedMode::Compose {
            self.compose_text.pop();
        }
    }

    /// Take the compose text for submission, if there is any.
    pub fn take_compose(&mut self) -> Option<String> {
        if self.compose_text.is_empty() {
            return None;
        }
        let text = std::mem::take(&mut self.compose_text);
        self.mode = FeedMode::Normal;
        Some(text)
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, posts: &[Post]) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" Live Stream ({}) ", posts.len()));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        if posts.is_empty() {
            let waiting = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Waiting for incoming posts...",
                    Style::default().fg(Color::DarkGray),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "c: compose | r: reconnect | q: quit",
                    Style::default().fg(Color::DarkGray),
                )),
            ]);
            frame.render_widget(waiting, inner);
        } else {
            let wrap_width = inner.width.saturating_sub(2).max(20) as usize;
            let items: Vec<ListItem> = posts
                .iter()
                .map(|post| post_item(post, wrap_width))
                .collect();

            let list = List::new(items).highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            );

            let mut state = self.list_state.clone();
            frame.render_stateful_widget(list, inner, &mut state);
        }

        if self.mode == FeedMode::Compose {
            self.render_compose_modal(frame, area);
        }

        if let Some(message) = &self.status_message {
            self.render_status(frame, area, message);
        }
    }

    fn render_compose_modal(&self, frame: &mut Frame, area: Rect) {
        let modal_area = center_rect(60, 30, area);
        frame.render_widget(Clear, modal_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Compose Post ");

        let inner = block.inner(modal_area);
        frame.render_widget(block, modal_area);

        let text = vec![
            Line::from(""),
            Line::from(self.compose_text.as_str()),
            Line::from(""),
            Line::from(Span::styled(
                "Enter to post | Esc to cancel",
                Style::default().fg(Color::DarkGray),
            )),
        ];

        let paragraph = Paragraph::new(text).wrap(Wrap { trim: false });
        frame.render_widget(paragraph, inner);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect, message: &str) {
        let status_area = Rect::new(
            area.x + 2,
            area.y + area.height.saturating_sub(3),
            area.width.saturating_sub(4),
            3,
        );

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));

        let paragraph = Paragraph::new(message).block(block);
        frame.render_widget(Clear, status_area);
        frame.render_widget(paragraph, status_area);
    }
}

impl Default for LiveFeedWidget {
    fn default() -> Self {
        Self::new()
    }
}

fn post_item(post: &Post, wrap_width: usize) -> ListItem<'static> {
    let mut lines: Vec<Line> = Vec::new();

    let badge = match &post.sentiment {
        Some(sentiment) => Span::styled(
            format!(
                "[{} {}%]",
                sentiment.label,
                (sentiment.score * 100.0).round() as u32
            ),
            Style::default()
                .fg(label_color(sentiment.label))
                .add_modifier(Modifier::BOLD),
        ),
        None => Span::styled("[processing]", Style::default().fg(Color::DarkGray)),
    };

    let mut wrapped = textwrap::wrap(&post.content, wrap_width).into_iter();
    let first = wrapped.next().unwrap_or_default().to_string();
    lines.push(Line::from(vec![
        badge,
        Span::raw(" "),
        Span::styled(first, Style::default().fg(Color::White)),
    ]));
    for continuation in wrapped {
        lines.push(Line::from(Span::styled(
            format!("  {continuation}"),
            Style::default().fg(Color::White),
        )));
    }

    let mut meta = vec![
        Span::styled(
            format!("  @{}", post.author),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!(" | {}", post.platform),
            Style::default().fg(Color::Yellow),
        ),
    ];
    if let Some(emotion) = post.sentiment.as_ref().and_then(|s| s.emotion.as_deref()) {
        meta.push(Span::styled(
            format!(" | #{emotion}"),
            Style::default().fg(emotion_color(emotion)),
        ));
    }
    meta.push(Span::styled(
        format!(" | {}", post.received_at.format("%H:%M:%S")),
        Style::default().fg(Color::DarkGray),
    ));
    lines.push(Line::from(meta));

    ListItem::new(lines)
}

fn center_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_text_editing() {
        let mut widget = LiveFeedWidget::new();
        widget.open_compose();
        assert!(widget.is_composing());

        for c in "hello".chars() {
            widget.add_char(c);
        }
        widget.delete_char();
        assert_eq!(widget.take_compose().as_deref(), Some("hell"));
        assert!(!widget.is_composing());
    }

    #[test]
    fn test_empty_compose_is_not_submitted() {
        let mut widget = LiveFeedWidget::new();
        widget.open_compose();
        assert!(widget.take_compose().is_none());
        // the modal stays open so the user can keep typing
        assert!(widget.is_composing());
    }

    #[test]
    fn test_scroll_bounds() {
        let mut widget = LiveFeedWidget::new();
        widget.scroll_up();
        assert_eq!(widget.selected_index, 0);

        widget.scroll_down(3);
        widget.scroll_down(3);
        widget.scroll_down(3);
        assert_eq!(widget.selected_index, 2);

        widget.scroll_down(0);
        assert_eq!(widget.selected_index, 2);
    }
}
