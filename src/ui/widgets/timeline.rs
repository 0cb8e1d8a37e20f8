use std::any::Any;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::api::ApiClient;
use crate::config::TimelineConfig;
use crate::feeds::timeline::TimelineFetcher;
use crate::feeds::{FeedData, FeedFetcher};
use crate::message::Message;
use crate::ui::widgets::FeedWidget;

const LIKED_GLYPH: &str = "♥";
const NOT_LIKED_GLYPH: &str = "♡";

/// Width of the like control at the head of each row (glyph plus the
/// separating space). Clicks inside this span count as hits on the
/// control; clicks further right only move the selection.
const LIKE_CONTROL_WIDTH: u16 = 2;

pub struct TimelineWidget {
    config: TimelineConfig,
    api: ApiClient,
    messages: Vec<Message>,
    loading: bool,
    error: Option<String>,
    selected_index: usize,
    list_state: ListState,
    mode: TimelineMode,
    compose_text: String,
    detail_view: Option<Message>,
    status_message: Option<String>,
    selected: bool,
    inner_area: Rect,
}

#[derive(Debug, Clone, PartialEq)]
enum TimelineMode {
    Normal,
    Compose,
}

impl TimelineWidget {
    pub fn new(config: TimelineConfig, api: ApiClient) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            config,
            api,
            messages: Vec::new(),
            loading: true,
            error: None,
            selected_index: 0,
            list_state,
            mode: TimelineMode::Normal,
            compose_text: String::new(),
            detail_view: None,
            status_message: None,
            selected: false,
            inner_area: Rect::default(),
        }
    }

    pub fn open_compose(&mut self) {
        self.mode = TimelineMode::Compose;
        self.compose_text.clear();
    }

    pub fn close_modal(&mut self) {
        self.mode = TimelineMode::Normal;
        self.compose_text.clear();
    }

    pub fn open_detail(&mut self) {
        self.detail_view = self.messages.get(self.selected_index).cloned();
    }

    pub fn close_detail(&mut self) {
        self.detail_view = None;
    }

    pub fn add_char(&mut self, c: char) {
        if self.mode == TimelineMode::Compose {
            self.compose_text.push(c);
        }
    }

    pub fn delete_char(&mut self) {
        if self.mode == TimelineMode::Compose {
            self.compose_text.pop();
        }
    }

    pub fn is_modal_open(&self) -> bool {
        self.mode != TimelineMode::Normal || self.detail_view.is_some()
    }

    pub fn selected_message_id(&self) -> Option<u64> {
        self.messages.get(self.selected_index).map(|m| m.id)
    }

    pub async fn submit_message(&mut self) -> bool {
        if self.compose_text.is_empty() {
            return false;
        }

        match self.api.post_message(&self.compose_text).await {
            Ok(()) => {
                self.status_message = Some("Message posted".to_string());
                self.close_modal();
                true
            }
            Err(e) => {
                self.status_message = Some(format!("Error: {e}"));
                false
            }
        }
    }

    pub async fn delete_selected(&mut self) -> bool {
        let Some(message_id) = self.selected_message_id() else {
            return false;
        };

        match self.api.delete_message(message_id).await {
            Ok(()) => {
                self.status_message = Some("Message deleted".to_string());
                true
            }
            Err(e) => {
                self.status_message = Some(format!("Error: {e}"));
                false
            }
        }
    }

    fn toggle_like(&mut self, message_id: u64) {
        if let Some(message) = self.messages.iter_mut().find(|m| m.id == message_id) {
            message.liked = !message.liked;
        }
    }

    fn render_message_list(&mut self, frame: &mut Frame, inner: Rect) {
        let highlight_style = if self.selected {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };

        self.list_state.select(Some(self.selected_index));

        let items: Vec<ListItem> = self
            .messages
            .iter()
            .map(|message| {
                let (glyph, glyph_style) = if message.liked {
                    (LIKED_GLYPH, Style::default().fg(Color::Red))
                } else {
                    (NOT_LIKED_GLYPH, Style::default().fg(Color::DarkGray))
                };

                ListItem::new(Line::from(vec![
                    Span::styled(glyph, glyph_style),
                    Span::raw(" "),
                    Span::styled(
                        format!("@{}", message.author.username),
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(" "),
                    Span::raw(message.text.replace('\n', " ")),
                    Span::styled(
                        format!("  {}", message.timestamp.format("%b %d %H:%M")),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items).highlight_style(highlight_style);
        frame.render_stateful_widget(list, inner, &mut self.list_state);
    }

    fn render_help(&self, frame: &mut Frame, inner: Rect) {
        let help_text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Warble Timeline",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Keybindings:"),
            Line::from("  click ♡ / l - like message"),
            Line::from("  n - new message"),
            Line::from("  d - delete selected"),
            Line::from("  Enter - read message"),
            Line::from("  r - refresh"),
            Line::from(""),
            Line::from(Span::styled(
                "No messages yet",
                Style::default().fg(Color::Yellow),
            )),
        ];

        let paragraph = Paragraph::new(help_text).alignment(Alignment::Center);
        frame.render_widget(paragraph, inner);
    }

    fn render_compose_modal(&self, frame: &mut Frame, area: Rect) {
        let modal_area = self.center_rect(60, 30, area);
        frame.render_widget(Clear, modal_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title("New Message");

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

    fn render_detail_view(&self, frame: &mut Frame, area: Rect, message: &Message) {
        let modal_area = self.center_rect(70, 60, area);
        frame.render_widget(Clear, modal_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" @{} ", message.author.username));

        let inner = block.inner(modal_area);
        frame.render_widget(block, modal_area);

        let width = inner.width.saturating_sub(2).max(1) as usize;
        let mut lines: Vec<Line> = textwrap::wrap(&message.text, width)
            .into_iter()
            .map(|wrapped| Line::from(wrapped.into_owned()))
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            message.timestamp.format("%d %B %Y %H:%M").to_string(),
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(Span::styled(
            "Esc to close",
            Style::default().fg(Color::DarkGray),
        )));

        frame.render_widget(Paragraph::new(lines), inner);
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

    fn center_rect(&self, percent_x: u16, percent_y: u16, r: Rect) -> Rect {
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
}

impl FeedWidget for TimelineWidget {
    fn id(&self) -> String {
        format!(
            "timeline-{}-{}",
            self.config.position.row, self.config.position.col
        )
    }

    fn title(&self) -> &str {
        &self.config.title
    }

    fn position(&self) -> (usize, usize) {
        (self.config.position.row, self.config.position.col)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, selected: bool) {
        let border_style = if selected {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::White)
        };

        let title = format!(" {} ({}) ", self.config.title, self.messages.len());
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);

        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.inner_area = inner;

        if self.loading && self.messages.is_empty() {
            frame.render_widget(Paragraph::new("Loading..."), inner);
        } else if let Some(ref error) = self.error {
            let error_text = Paragraph::new(format!("Error: {error}"))
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true });
            frame.render_widget(error_text, inner);
        } else if self.messages.is_empty() {
            self.render_help(frame, inner);
        } else {
            self.render_message_list(frame, inner);
        }

        if self.mode == TimelineMode::Compose {
            self.render_compose_modal(frame, area);
        }

        if let Some(detail) = &self.detail_view {
            self.render_detail_view(frame, area, detail);
        }

        if let Some(msg) = &self.status_message {
            self.render_status(frame, area, msg);
        }
    }

    fn update_data(&mut self, data: FeedData) {
        match data {
            FeedData::Timeline(messages) => {
                self.messages = messages;
                self.loading = false;
                self.error = None;
                if self.selected_index >= self.messages.len() {
                    self.selected_index = self.messages.len().saturating_sub(1);
                }
                self.list_state.select(Some(self.selected_index));
            }
            FeedData::LikeSettled(message_id) => self.toggle_like(message_id),
            FeedData::Loading => self.loading = true,
            FeedData::Error(err) => {
                self.loading = false;
                self.error = Some(err);
            }
            _ => {}
        }
    }

    fn create_fetcher(&self) -> Box<dyn FeedFetcher> {
        Box::new(TimelineFetcher::new(
            self.api.clone(),
            self.config.max_messages,
        ))
    }

    fn scroll_up(&mut self) {
        if !self.messages.is_empty() && self.selected_index > 0 {
            self.selected_index -= 1;
            self.list_state.select(Some(self.selected_index));
        }
    }

    fn scroll_down(&mut self) {
        if !self.messages.is_empty() && self.selected_index < self.messages.len() - 1 {
            self.selected_index += 1;
            self.list_state.select(Some(self.selected_index));
        }
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    fn handle_click(&mut self, column: u16, row: u16) -> Option<u64> {
        if self.is_modal_open() {
            return None;
        }

        let inner = self.inner_area;
        if !inner.contains(Position::new(column, row)) {
            return None;
        }

        let index = self.list_state.offset() + (row - inner.y) as usize;
        if index >= self.messages.len() {
            return None;
        }

        self.selected_index = index;
        self.list_state.select(Some(index));

        if column < inner.x + LIKE_CONTROL_WIDTH {
            Some(self.messages[index].id)
        } else {
            None
        }
    }

    fn as_any_mut(&mut self) -> Option<&mut dyn Any> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Author;
    use chrono::TimeZone;
    use ratatui::{backend::TestBackend, Terminal};

    fn message(id: u64, text: &str) -> Message {
        Message {
            id,
            text: text.to_string(),
            timestamp: chrono::Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap(),
            liked: false,
            author: Author {
                id: 1,
                username: "hen".to_string(),
                image_url: None,
            },
        }
    }

    fn render(widget: &mut TimelineWidget) {
        let backend = TestBackend::new(40, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                widget.render(frame, area, true);
            })
            .unwrap();
    }

    fn rendered_widget(messages: Vec<Message>) -> TimelineWidget {
        let mut widget = TimelineWidget::new(
            TimelineConfig::default(),
            ApiClient::new("http://localhost:5000"),
        );
        widget.update_data(FeedData::Timeline(messages));
        render(&mut widget);
        widget
    }

    #[test]
    fn click_on_the_like_glyph_returns_the_row_message_id() {
        let mut widget = rendered_widget(vec![message(42, "first")]);
        assert_eq!(widget.handle_click(1, 1), Some(42));
    }

    #[test]
    fn click_past_the_glyph_selects_without_liking() {
        let mut widget = rendered_widget(vec![message(42, "first"), message(43, "second")]);
        assert_eq!(widget.handle_click(10, 2), None);
        assert_eq!(widget.selected_message_id(), Some(43));
    }

    #[test]
    fn settle_flips_the_glyph_exactly_once_per_click() {
        let mut widget = rendered_widget(vec![message(42, "first")]);
        let target = widget.handle_click(1, 1).unwrap();
        widget.update_data(FeedData::LikeSettled(target));
        assert!(widget.messages[0].liked);
    }

    #[test]
    fn double_click_settles_twice_and_restores_the_original_state() {
        let mut widget = rendered_widget(vec![message(42, "first")]);
        let first = widget.handle_click(1, 1).unwrap();
        let second = widget.handle_click(1, 1).unwrap();
        widget.update_data(FeedData::LikeSettled(first));
        widget.update_data(FeedData::LikeSettled(second));
        assert!(!widget.messages[0].liked);
    }

    #[test]
    fn likes_on_different_rows_stay_independent() {
        let mut widget =
            rendered_widget(vec![message(1, "a"), message(2, "b"), message(3, "c")]);
        let first = widget.handle_click(1, 1).unwrap();
        let third = widget.handle_click(1, 3).unwrap();
        widget.update_data(FeedData::LikeSettled(first));
        widget.update_data(FeedData::LikeSettled(third));
        assert!(widget.messages[0].liked);
        assert!(!widget.messages[1].liked);
        assert!(widget.messages[2].liked);
    }

    #[test]
    fn rows_added_after_the_first_render_still_take_clicks() {
        let mut widget = rendered_widget(vec![message(1, "a")]);
        widget.update_data(FeedData::Timeline(vec![
            message(1, "a"),
            message(9, "late arrival"),
        ]));
        render(&mut widget);
        assert_eq!(widget.handle_click(1, 2), Some(9));
    }

    #[test]
    fn clicks_outside_the_rows_are_ignored() {
        let mut widget = rendered_widget(vec![message(1, "a")]);
        assert_eq!(widget.handle_click(1, 5), None);
        assert_eq!(widget.handle_click(0, 1), None);
    }

    #[test]
    fn settle_for_a_vanished_message_is_a_no_op() {
        let mut widget = rendered_widget(vec![message(1, "a")]);
        widget.update_data(FeedData::LikeSettled(999));
        assert!(!widget.messages[0].liked);
    }

    #[test]
    fn clicks_are_ignored_while_a_modal_is_open() {
        let mut widget = rendered_widget(vec![message(1, "a")]);
        widget.open_compose();
        assert_eq!(widget.handle_click(1, 1), None);
    }

    #[test]
    fn compose_draft_edits_apply_only_in_compose_mode() {
        let mut widget = rendered_widget(vec![message(1, "a")]);
        widget.add_char('x');
        assert!(widget.compose_text.is_empty());

        widget.open_compose();
        widget.add_char('h');
        widget.add_char('i');
        widget.delete_char();
        assert_eq!(widget.compose_text, "h");
    }

    #[test]
    fn fetch_errors_replace_the_list_until_the_next_refresh() {
        let mut widget = rendered_widget(vec![message(1, "a")]);
        widget.update_data(FeedData::Error("connection refused".to_string()));
        assert_eq!(widget.error.as_deref(), Some("connection refused"));

        widget.update_data(FeedData::Timeline(vec![message(1, "a")]));
        assert!(widget.error.is_none());
    }
}
