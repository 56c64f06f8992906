use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// `user_id` follows `author_id`. At most one row exists per ordered pair.
#[derive(Clone, Debug, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Follow {
    pub id: i64,
    pub user_id: Uuid,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
}
