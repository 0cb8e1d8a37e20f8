use chrono::{DateTime, Utc};

/// A single entry in the home timeline.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: u64,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub liked: bool,
    pub author: Author,
}

#[derive(Debug, Clone)]
pub struct Author {
    #[allow(dead_code)] // Preserved for future use (e.g., profile views)
    pub id: u64,
    pub username: String,
    #[allow(dead_code)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FollowedUser {
    #[allow(dead_code)]
    pub id: u64,
    pub username: String,
    pub bio: Option<String>,
}
