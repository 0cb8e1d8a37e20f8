use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::message::{Author, FollowedUser, Message};

/// HTTP client for a Warble server. Cheap to clone; background tasks take
/// their own copy.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    id: u64,
    text: String,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    liked: bool,
    user: ApiUser,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    id: u64,
    username: String,
    image_url: Option<String>,
    bio: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent(concat!("warbletui/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn like_path(message_id: u64) -> String {
        format!("/messages/{message_id}/like")
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Tell the server a message's like control was activated. The
    /// response status and body are not inspected; callers only learn
    /// that the request settled.
    pub async fn like_message(&self, message_id: u64) -> Result<()> {
        self.client
            .post(self.url(&Self::like_path(message_id)))
            .send()
            .await?;
        Ok(())
    }

    pub async fn fetch_timeline(&self, max_messages: usize) -> Result<Vec<Message>> {
        let response = self.client.get(self.url("/messages")).send().await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Server error: {}", response.status()));
        }

        let messages: Vec<ApiMessage> = response.json().await?;

        Ok(messages
            .into_iter()
            .take(max_messages)
            .map(|m| Message {
                id: m.id,
                text: m.text,
                timestamp: m.timestamp,
                liked: m.liked,
                author: Author {
                    id: m.user.id,
                    username: m.user.username,
                    image_url: m.user.image_url,
                },
            })
            .collect())
    }

    pub async fn fetch_following(&self, user_id: u64) -> Result<Vec<FollowedUser>> {
        let response = self
            .client
            .get(self.url(&format!("/users/{user_id}/following")))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Server error: {}", response.status()));
        }

        let users: Vec<ApiUser> = response.json().await?;

        Ok(users
            .into_iter()
            .map(|u| FollowedUser {
                id: u.id,
                username: u.username,
                bio: u.bio,
            })
            .collect())
    }

    pub async fn post_message(&self, text: &str) -> Result<()> {
        let response = self
            .client
            .post(self.url("/messages/new"))
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Server rejected message: {}",
                response.status()
            ));
        }

        Ok(())
    }

    pub async fn delete_message(&self, message_id: u64) -> Result<()> {
        let response = self
            .client
            .post(self.url(&format!("/messages/{message_id}/delete")))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Delete failed: {}", response.status()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_request_path_embeds_the_message_id() {
        assert_eq!(ApiClient::like_path(42), "/messages/42/like");
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let api = ApiClient::new("http://localhost:5000/");
        assert_eq!(
            api.url(&ApiClient::like_path(7)),
            "http://localhost:5000/messages/7/like"
        );
    }

    #[test]
    fn timeline_wire_format_decodes() {
        let body = r#"[{
            "id": 3,
            "text": "hello from the coop",
            "timestamp": "2026-08-01T09:30:00Z",
            "liked": true,
            "user": {"id": 1, "username": "hen", "image_url": null}
        }]"#;

        let messages: Vec<ApiMessage> = serde_json::from_str(body).unwrap();
        assert_eq!(messages[0].id, 3);
        assert!(messages[0].liked);
        assert_eq!(messages[0].user.username, "hen");
    }

    #[test]
    fn missing_liked_flag_defaults_to_not_liked() {
        let body = r#"{
            "id": 1,
            "text": "x",
            "timestamp": "2026-08-01T09:30:00Z",
            "user": {"id": 2, "username": "y"}
        }"#;

        let message: ApiMessage = serde_json::from_str(body).unwrap();
        assert!(!message.liked);
    }
}
