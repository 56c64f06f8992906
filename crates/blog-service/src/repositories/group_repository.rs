use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::models::groups::{Group, NewGroup};

use super::GroupRepository;

pub struct PgGroupRepository {
    db: Arc<PgPool>,
}

impl PgGroupRepository {
    pub fn new(db: Arc<PgPool>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GroupRepository for PgGroupRepository {
    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<Group>, sqlx::Error> {
        sqlx::query_as::<_, Group>("SELECT * FROM blog.groups WHERE slug = $1")
            .bind(slug)
            .fetch_optional(self.db.as_ref())
            .await
    }

    async fn list_groups(&self) -> Result<Vec<Group>, sqlx::Error> {
        sqlx::query_as::<_, Group>("SELECT * FROM blog.groups ORDER BY title, id")
            .fetch_all(self.db.as_ref())
            .await
    }

    async fn create_group(&self, group: NewGroup) -> Result<Group, sqlx::Error> {
        sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO blog.groups (title, slug, description)
            VALUES ($1, $2, $3)
            RETURNING id, title, slug, description
            "#,
        )
        .bind(&group.title)
        .bind(&group.slug)
        .bind(&group.description)
        .fetch_one(self.db.as_ref())
        .await
    }

    async fn delete_group(&self, slug: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM blog.groups WHERE slug = $1")
            .bind(slug)
            .execute(self.db.as_ref())
            .await?;
        Ok(result.rows_affected())
    }
}
