pub mod following;
pub mod timeline;

use anyhow::Result;
use async_trait::async_trait;

use crate::message::{FollowedUser, Message};

/// Payload delivered from a background task to the UI loop, addressed to
/// one widget by id.
#[derive(Debug, Clone)]
pub struct FeedMessage {
    pub widget_id: String,
    pub data: FeedData,
}

#[derive(Debug, Clone)]
pub enum FeedData {
    Timeline(Vec<Message>),
    Following(Vec<FollowedUser>),
    /// A like request finished, successfully or not. Carries the message
    /// id only; the outcome is not reported.
    LikeSettled(u64),
    Loading,
    Error(String),
}

#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self) -> Result<FeedData>;
}
