pub mod following;
pub mod timeline;

use std::any::Any;

use ratatui::{layout::Rect, Frame};

use crate::feeds::{FeedData, FeedFetcher};

/// A panel in the dashboard grid. Widgets own their data and rendering;
/// fetching runs in background tasks created through `create_fetcher`,
/// and results come back through `update_data`.
pub trait FeedWidget {
    fn id(&self) -> String;
    fn title(&self) -> &str;
    fn position(&self) -> (usize, usize);
    fn render(&mut self, frame: &mut Frame, area: Rect, selected: bool);
    fn update_data(&mut self, data: FeedData);
    fn create_fetcher(&self) -> Box<dyn FeedFetcher>;
    fn scroll_up(&mut self);
    fn scroll_down(&mut self);
    fn set_selected(&mut self, selected: bool);

    /// Route a left click that landed inside this widget's area. Returns
    /// the id of the message whose like control was hit, if any.
    fn handle_click(&mut self, column: u16, row: u16) -> Option<u64> {
        let _ = (column, row);
        None
    }

    fn as_any_mut(&mut self) -> Option<&mut dyn Any> {
        None
    }
}
