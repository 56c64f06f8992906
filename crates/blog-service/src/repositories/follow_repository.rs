use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use super::FollowRepository;

pub struct PgFollowRepository {
    db: Arc<PgPool>,
}

impl PgFollowRepository {
    pub fn new(db: Arc<PgPool>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FollowRepository for PgFollowRepository {
    async fn create_follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, sqlx::Error> {
        // The unique constraint settles concurrent duplicate requests.
        let result = sqlx::query(
            r#"
            INSERT INTO blog.follows (user_id, author_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, author_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(author_id)
        .execute(self.db.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_follow(&self, user_id: Uuid, author_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM blog.follows WHERE user_id = $1 AND author_id = $2")
            .bind(user_id)
            .bind(author_id)
            .execute(self.db.as_ref())
            .await?;

        Ok(result.rows_affected())
    }

    async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, sqlx::Error> {
        let query = r#"
        SELECT EXISTS (SELECT 1 FROM blog.follows WHERE user_id = $1 AND author_id = $2)
        "#;
        sqlx::query_scalar::<_, bool>(query)
            .bind(user_id)
            .bind(author_id)
            .fetch_one(self.db.as_ref())
            .await
    }

    async fn count_followers(&self, author_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM blog.follows WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(self.db.as_ref())
            .await
    }

    async fn count_following(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM blog.follows WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.db.as_ref())
            .await
    }
}
