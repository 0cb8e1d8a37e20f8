use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use futures::StreamExt;
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    Frame, Terminal,
};
use tokio::sync::mpsc;

use crate::api::ApiClient;
use crate::config::Config;
use crate::feeds::{FeedData, FeedMessage};
use crate::ui::widgets::following::FollowingWidget;
use crate::ui::widgets::timeline::TimelineWidget;
use crate::ui::widgets::FeedWidget;

pub struct App {
    api: ApiClient,
    widgets: Vec<Box<dyn FeedWidget>>,
    /// Rendered area of each widget, refreshed on every draw. Mouse
    /// events are routed against this, so rows that appear later need no
    /// registration of their own.
    widget_areas: Vec<Rect>,
    selected: usize,
    refresh_interval: Duration,
    feed_tx: mpsc::Sender<FeedMessage>,
    feed_rx: mpsc::Receiver<FeedMessage>,
    should_quit: bool,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let api = ApiClient::new(&config.server_url);
        let (feed_tx, feed_rx) = mpsc::channel(100);

        let mut widgets: Vec<Box<dyn FeedWidget>> = vec![Box::new(TimelineWidget::new(
            config.timeline.clone(),
            api.clone(),
        ))];
        if let Some(user_id) = config.user_id {
            widgets.push(Box::new(FollowingWidget::new(
                config.following.clone(),
                api.clone(),
                user_id,
            )));
        }
        widgets[0].set_selected(true);

        let widget_areas = vec![Rect::default(); widgets.len()];

        Self {
            api,
            widgets,
            widget_areas,
            selected: 0,
            refresh_interval: Duration::from_secs(config.refresh_secs.max(1)),
            feed_tx,
            feed_rx,
            should_quit: false,
        }
    }

    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.refresh_all();

        let mut events = EventStream::new();
        let mut refresh = tokio::time::interval(self.refresh_interval);
        refresh.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick fires immediately; the initial fetch already ran.
        refresh.tick().await;

        while !self.should_quit {
            terminal.draw(|frame| self.draw(frame))?;

            tokio::select! {
                maybe_event = events.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event).await,
                        Some(Err(err)) => log::warn!("Terminal event error: {err}"),
                        None => break,
                    }
                }
                Some(message) = self.feed_rx.recv() => self.route_feed_message(message),
                _ = refresh.tick() => self.refresh_all(),
            }
        }

        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) {
        let positions: Vec<(usize, usize)> =
            self.widgets.iter().map(|w| w.position()).collect();
        let areas = grid_areas(frame.area(), &positions);
        self.widget_areas.clone_from(&areas);

        for (idx, widget) in self.widgets.iter_mut().enumerate() {
            widget.render(frame, areas[idx], idx == self.selected);
        }
    }

    async fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key).await,
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            _ => {}
        }
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        let modal_open = self
            .timeline_mut()
            .map(|(_, tl)| tl.is_modal_open())
            .unwrap_or(false);

        if modal_open {
            let mut refreshed = None;
            if let Some((idx, tl)) = self.timeline_mut() {
                match key.code {
                    KeyCode::Esc => {
                        tl.close_modal();
                        tl.close_detail();
                    }
                    KeyCode::Enter => {
                        if tl.submit_message().await {
                            refreshed = Some(idx);
                        }
                    }
                    KeyCode::Backspace => tl.delete_char(),
                    KeyCode::Char(c) => tl.add_char(c),
                    _ => {}
                }
            }
            if let Some(idx) = refreshed {
                self.spawn_fetch(idx);
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.select_next_widget(),
            KeyCode::Up | KeyCode::Char('k') => self.widgets[self.selected].scroll_up(),
            KeyCode::Down | KeyCode::Char('j') => self.widgets[self.selected].scroll_down(),
            KeyCode::Char('r') => self.refresh_all(),
            KeyCode::Char('n') => {
                if let Some((_, tl)) = self.timeline_mut() {
                    tl.open_compose();
                }
            }
            KeyCode::Char('l') => {
                let target = self
                    .timeline_mut()
                    .and_then(|(idx, tl)| tl.selected_message_id().map(|id| (idx, id)));
                if let Some((idx, message_id)) = target {
                    let widget_id = self.widgets[idx].id();
                    self.spawn_like(widget_id, message_id);
                }
            }
            KeyCode::Char('d') => {
                let mut refreshed = None;
                if let Some((idx, tl)) = self.timeline_mut() {
                    if tl.delete_selected().await {
                        refreshed = Some(idx);
                    }
                }
                if let Some(idx) = refreshed {
                    self.spawn_fetch(idx);
                }
            }
            KeyCode::Enter => {
                if let Some((_, tl)) = self.timeline_mut() {
                    tl.open_detail();
                }
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }

        let position = Position::new(mouse.column, mouse.row);
        let Some(idx) = self
            .widget_areas
            .iter()
            .position(|area| area.contains(position))
        else {
            return;
        };

        if idx != self.selected {
            self.select_widget(idx);
        }

        if let Some(message_id) = self.widgets[idx].handle_click(mouse.column, mouse.row) {
            let widget_id = self.widgets[idx].id();
            self.spawn_like(widget_id, message_id);
        }
    }

    /// Fire the like request in the background. When it settles, the
    /// `LikeSettled` notification flips the glyph whether or not the
    /// request succeeded; nothing else inspects the outcome.
    fn spawn_like(&self, widget_id: String, message_id: u64) {
        let api = self.api.clone();
        let tx = self.feed_tx.clone();
        tokio::spawn(async move {
            let _ = api.like_message(message_id).await;
            let _ = tx
                .send(FeedMessage {
                    widget_id,
                    data: FeedData::LikeSettled(message_id),
                })
                .await;
        });
    }

    fn spawn_fetch(&mut self, idx: usize) {
        let widget = &mut self.widgets[idx];
        widget.update_data(FeedData::Loading);

        let fetcher = widget.create_fetcher();
        let widget_id = widget.id();
        let tx = self.feed_tx.clone();
        tokio::spawn(async move {
            let data = match fetcher.fetch().await {
                Ok(data) => data,
                Err(err) => FeedData::Error(err.to_string()),
            };
            let _ = tx.send(FeedMessage { widget_id, data }).await;
        });
    }

    fn refresh_all(&mut self) {
        for idx in 0..self.widgets.len() {
            self.spawn_fetch(idx);
        }
    }

    fn route_feed_message(&mut self, message: FeedMessage) {
        if let Some(widget) = self
            .widgets
            .iter_mut()
            .find(|w| w.id() == message.widget_id)
        {
            widget.update_data(message.data);
        }
    }

    fn timeline_mut(&mut self) -> Option<(usize, &mut TimelineWidget)> {
        self.widgets
            .iter_mut()
            .enumerate()
            .find_map(|(idx, widget)| {
                widget
                    .as_any_mut()
                    .and_then(|any| any.downcast_mut::<TimelineWidget>())
                    .map(|tl| (idx, tl))
            })
    }

    fn select_widget(&mut self, idx: usize) {
        self.widgets[self.selected].set_selected(false);
        self.selected = idx;
        self.widgets[self.selected].set_selected(true);
    }

    fn select_next_widget(&mut self) {
        let next = (self.selected + 1) % self.widgets.len();
        self.select_widget(next);
    }
}

/// Split the terminal into the widget grid. Rows share the height evenly;
/// widgets within a row share its width evenly.
fn grid_areas(area: Rect, positions: &[(usize, usize)]) -> Vec<Rect> {
    let row_count = positions.iter().map(|p| p.0).max().map_or(1, |m| m + 1);
    let row_rects = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, row_count as u32); row_count])
        .split(area);

    positions
        .iter()
        .map(|&(row, col)| {
            let col_count = positions
                .iter()
                .filter(|p| p.0 == row)
                .map(|p| p.1)
                .max()
                .map_or(1, |m| m + 1);
            let col_rects = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, col_count as u32); col_count])
                .split(row_rects[row]);
            col_rects[col]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_widget_fills_the_whole_area() {
        let area = Rect::new(0, 0, 80, 24);
        let areas = grid_areas(area, &[(0, 0)]);
        assert_eq!(areas, vec![area]);
    }

    #[test]
    fn side_by_side_widgets_split_the_row() {
        let area = Rect::new(0, 0, 80, 24);
        let areas = grid_areas(area, &[(0, 0), (0, 1)]);
        assert_eq!(areas[0].height, 24);
        assert_eq!(areas[0].width + areas[1].width, 80);
        assert_eq!(areas[1].x, areas[0].width);
    }

    #[test]
    fn stacked_rows_split_vertically() {
        let area = Rect::new(0, 0, 80, 24);
        let areas = grid_areas(area, &[(0, 0), (1, 0)]);
        assert_eq!(areas[0].width, 80);
        assert_eq!(areas[0].height + areas[1].height, 24);
        assert_eq!(areas[1].y, areas[0].height);
    }

    #[test]
    fn widgets_route_by_id() {
        let config = Config::default();
        let mut app = App::new(&config);
        app.route_feed_message(FeedMessage {
            widget_id: "timeline-0-0".to_string(),
            data: FeedData::Timeline(Vec::new()),
        });
        // An id that matches no widget is dropped without effect.
        app.route_feed_message(FeedMessage {
            widget_id: "following-0-1".to_string(),
            data: FeedData::Following(Vec::new()),
        });
    }
}
