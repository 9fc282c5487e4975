use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Work {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub location: String,
    pub date: DateTime<Utc>,
    pub organizer_id: i32,
    pub category_id: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct Insert {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub location: String,
    pub date: DateTime<Utc>,
    pub organizer_id: i32,
    pub category_id: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct Update {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub location: String,
    pub date: DateTime<Utc>,
    pub category_id: Option<i32>,
}

// List/detail row: organizer resolved to a username, rating aggregated
// over the reviews (0 when there are none).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WorkItem {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub location: String,
    pub date: DateTime<Utc>,
    pub organizer: String,
    pub organizer_id: i32,
    pub category_id: Option<i32>,
    pub average_rating: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Query {
    pub organizer_id: Option<i32>,
    pub participant_id: Option<i32>,
    pub category_id: Option<i32>,
}
