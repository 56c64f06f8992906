use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::models::comments::{Comment, NewComment};

use super::CommentRepository;

pub struct PgCommentRepository {
    db: Arc<PgPool>,
}

impl PgCommentRepository {
    pub fn new(db: Arc<PgPool>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, sqlx::Error> {
        let query = r#"
        SELECT
            c.id,
            c.post_id,
            c.author_id,
            u.username AS author_username,
            c.text,
            c.created
        FROM
            blog.comments c
        INNER JOIN
            blog.users u ON u.id = c.author_id
        WHERE c.post_id = $1
        ORDER BY c.id
        "#;
        sqlx::query_as::<_, Comment>(query)
            .bind(post_id)
            .fetch_all(self.db.as_ref())
            .await
    }

    async fn create_comment(&self, comment: NewComment) -> Result<Comment, sqlx::Error> {
        let query = r#"
        WITH inserted AS (
            INSERT INTO blog.comments (post_id, author_id, text)
            VALUES ($1, $2, $3)
            RETURNING id, post_id, author_id, text, created
        )
        SELECT
            i.id,
            i.post_id,
            i.author_id,
            u.username AS author_username,
            i.text,
            i.created
        FROM
            inserted i
        INNER JOIN
            blog.users u ON u.id = i.author_id
        "#;
        sqlx::query_as::<_, Comment>(query)
            .bind(comment.post_id)
            .bind(comment.author_id)
            .bind(&comment.text)
            .fetch_one(self.db.as_ref())
            .await
    }
}
