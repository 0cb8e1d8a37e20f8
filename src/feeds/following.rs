use anyhow::Result;
use async_trait::async_trait;

use super::{FeedData, FeedFetcher};
use crate::api::ApiClient;

pub struct FollowingFetcher {
    api: ApiClient,
    user_id: u64,
}

impl FollowingFetcher {
    pub fn new(api: ApiClient, user_id: u64) -> Self {
        Self { api, user_id }
    }
}

#[async_trait]
impl FeedFetcher for FollowingFetcher {
    async fn fetch(&self) -> Result<FeedData> {
        let users = self.api.fetch_following(self.user_id).await?;
        Ok(FeedData::Following(users))
    }
}
