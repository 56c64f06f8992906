use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::users::{NewUser, User, UserSession};

use super::UserRepository;

pub struct PgUserRepository {
    db: Arc<PgPool>,
}

impl PgUserRepository {
    pub fn new(db: Arc<PgPool>) -> Self {
        PgUserRepository { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM blog.users WHERE username = $1")
            .bind(username)
            .fetch_optional(self.db.as_ref())
            .await
    }

    async fn find_user_by_session(&self, token: Uuid) -> Result<Option<User>, sqlx::Error> {
        let query = r#"
        SELECT
            u.*
        FROM
            blog.users u
        INNER JOIN
            blog.user_sessions s ON s.user_id = u.id
        WHERE s.token = $1 AND s.expires_at > NOW()
        "#;
        sqlx::query_as::<_, User>(query)
            .bind(token)
            .fetch_optional(self.db.as_ref())
            .await
    }

    async fn create_user(&self, user: NewUser) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO blog.users (id, username, first_name, last_name, email)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .fetch_one(self.db.as_ref())
        .await
    }

    async fn create_session(
        &self,
        user_id: Uuid,
        ttl: Duration,
    ) -> Result<UserSession, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, UserSession>(
            r#"
            INSERT INTO blog.user_sessions (token, user_id, created_at, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING token, user_id, created_at, expires_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(now)
        .bind(now + ttl)
        .fetch_one(self.db.as_ref())
        .await
    }

    async fn delete_user(&self, username: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM blog.users WHERE username = $1")
            .bind(username)
            .execute(self.db.as_ref())
            .await?;
        Ok(result.rows_affected())
    }
}
