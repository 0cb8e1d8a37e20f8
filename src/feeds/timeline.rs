use anyhow::Result;
use async_trait::async_trait;

use super::{FeedData, FeedFetcher};
use crate::api::ApiClient;

pub struct TimelineFetcher {
    api: ApiClient,
    max_messages: usize,
}

impl TimelineFetcher {
    pub fn new(api: ApiClient, max_messages: usize) -> Self {
        Self { api, max_messages }
    }
}

#[async_trait]
impl FeedFetcher for TimelineFetcher {
    async fn fetch(&self) -> Result<FeedData> {
        let messages = self.api.fetch_timeline(self.max_messages).await?;
        Ok(FeedData::Timeline(messages))
    }
}
