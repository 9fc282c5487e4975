use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "join_request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JoinRequest {
    pub id: i32,
    pub volunteer_work_id: i32,
    pub user_id: i32,
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Insert {
    pub volunteer_work_id: i32,
    pub user_id: i32,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JoinRequestItem {
    pub id: i32,
    pub volunteer_work_id: i32,
    pub volunteer_work_title: String,
    pub user: String,
    pub status: Status,
    pub created_at: DateTime<Utc>,
}
