use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::api::ApiClient;
use crate::config::FollowingConfig;
use crate::feeds::following::FollowingFetcher;
use crate::feeds::{FeedData, FeedFetcher};
use crate::message::FollowedUser;
use crate::ui::widgets::FeedWidget;

pub struct FollowingWidget {
    config: FollowingConfig,
    api: ApiClient,
    user_id: u64,
    users: Vec<FollowedUser>,
    loading: bool,
    error: Option<String>,
    selected_index: usize,
    list_state: ListState,
    selected: bool,
}

impl FollowingWidget {
    pub fn new(config: FollowingConfig, api: ApiClient, user_id: u64) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            config,
            api,
            user_id,
            users: Vec::new(),
            loading: true,
            error: None,
            selected_index: 0,
            list_state,
            selected: false,
        }
    }
}

impl FeedWidget for FollowingWidget {
    fn id(&self) -> String {
        format!(
            "following-{}-{}",
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

        let title = format!(" {} ({}) ", self.config.title, self.users.len());
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);

        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.loading && self.users.is_empty() {
            frame.render_widget(Paragraph::new("Loading..."), inner);
            return;
        }

        if let Some(ref error) = self.error {
            let error_text = Paragraph::new(format!("Error: {error}"))
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true });
            frame.render_widget(error_text, inner);
            return;
        }

        if self.users.is_empty() {
            frame.render_widget(Paragraph::new("Not following anyone yet"), inner);
            return;
        }

        let highlight_style = if self.selected {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };

        self.list_state.select(Some(self.selected_index));

        let items: Vec<ListItem> = self
            .users
            .iter()
            .map(|user| {
                let mut spans = vec![Span::styled(
                    format!("@{}", user.username),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )];
                if let Some(bio) = &user.bio {
                    spans.push(Span::raw("  "));
                    spans.push(Span::styled(
                        bio.replace('\n', " "),
                        Style::default().fg(Color::Gray),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let list = List::new(items).highlight_style(highlight_style);
        frame.render_stateful_widget(list, inner, &mut self.list_state);
    }

    fn update_data(&mut self, data: FeedData) {
        match data {
            FeedData::Following(users) => {
                self.users = users;
                self.loading = false;
                self.error = None;
                if self.selected_index >= self.users.len() {
                    self.selected_index = self.users.len().saturating_sub(1);
                }
                self.list_state.select(Some(self.selected_index));
            }
            FeedData::Loading => self.loading = true,
            FeedData::Error(err) => {
                self.loading = false;
                self.error = Some(err);
            }
            _ => {}
        }
    }

    fn create_fetcher(&self) -> Box<dyn FeedFetcher> {
        Box::new(FollowingFetcher::new(self.api.clone(), self.user_id))
    }

    fn scroll_up(&mut self) {
        if !self.users.is_empty() && self.selected_index > 0 {
            self.selected_index -= 1;
            self.list_state.select(Some(self.selected_index));
        }
    }

    fn scroll_down(&mut self) {
        if !self.users.is_empty() && self.selected_index < self.users.len() - 1 {
            self.selected_index += 1;
            self.list_state.select(Some(self.selected_index));
        }
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: u64, username: &str) -> FollowedUser {
        FollowedUser {
            id,
            username: username.to_string(),
            bio: None,
        }
    }

    fn widget() -> FollowingWidget {
        FollowingWidget::new(
            FollowingConfig::default(),
            ApiClient::new("http://localhost:5000"),
            1,
        )
    }

    #[test]
    fn following_data_replaces_the_list() {
        let mut w = widget();
        assert!(w.loading);

        w.update_data(FeedData::Following(vec![user(2, "ann"), user(3, "bob")]));
        assert!(!w.loading);
        assert_eq!(w.users.len(), 2);
    }

    #[test]
    fn selection_stays_within_bounds_after_shrinking() {
        let mut w = widget();
        w.update_data(FeedData::Following(vec![
            user(2, "ann"),
            user(3, "bob"),
            user(4, "cat"),
        ]));
        w.scroll_down();
        w.scroll_down();
        assert_eq!(w.selected_index, 2);

        w.update_data(FeedData::Following(vec![user(2, "ann")]));
        assert_eq!(w.selected_index, 0);
    }

    #[test]
    fn timeline_payloads_are_ignored() {
        let mut w = widget();
        w.update_data(FeedData::LikeSettled(5));
        assert!(w.users.is_empty());
    }
}
