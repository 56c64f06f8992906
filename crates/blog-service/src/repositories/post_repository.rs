use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::posts::{NewPost, Post, PostChanges, PostFilter};

use super::PostRepository;

const POST_SELECT: &str = r#"
    SELECT
        p.id,
        p.text,
        p.pub_date,
        p.author_id,
        u.username AS author_username,
        p.group_id,
        g.slug AS group_slug,
        g.title AS group_title,
        p.image
    FROM
        blog.posts p
    INNER JOIN
        blog.users u ON u.id = p.author_id
    LEFT JOIN
        blog.groups g ON g.id = p.group_id
"#;

pub struct PgPostRepository {
    db: Arc<PgPool>,
}

impl PgPostRepository {
    pub fn new(db: Arc<PgPool>) -> Self {
        Self { db }
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &PostFilter) {
    match *filter {
        PostFilter::All => {}
        PostFilter::Group(group_id) => {
            builder.push(" WHERE p.group_id = ").push_bind(group_id);
        }
        PostFilter::Author(author_id) => {
            builder.push(" WHERE p.author_id = ").push_bind(author_id);
        }
        PostFilter::FollowedBy(user_id) => {
            builder
                .push(" WHERE p.author_id IN (SELECT f.author_id FROM blog.follows f WHERE f.user_id = ")
                .push_bind(user_id)
                .push(")");
        }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn count_posts(&self, filter: &PostFilter) -> Result<i64, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM blog.posts p");
        push_filter(&mut builder, filter);

        builder
            .build_query_scalar::<i64>()
            .fetch_one(self.db.as_ref())
            .await
    }

    async fn list_posts(
        &self,
        filter: &PostFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(POST_SELECT);
        push_filter(&mut builder, filter);
        builder
            .push(" ORDER BY p.pub_date DESC, p.id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        builder
            .build_query_as::<Post>()
            .fetch_all(self.db.as_ref())
            .await
    }

    async fn find_post(&self, id: i64) -> Result<Option<Post>, sqlx::Error> {
        let query = format!("{} WHERE p.id = $1", POST_SELECT);
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(self.db.as_ref())
            .await
    }

    async fn find_author_post(
        &self,
        author_id: Uuid,
        post_id: i64,
    ) -> Result<Option<Post>, sqlx::Error> {
        let query = format!("{} WHERE p.id = $1 AND p.author_id = $2", POST_SELECT);
        sqlx::query_as::<_, Post>(&query)
            .bind(post_id)
            .bind(author_id)
            .fetch_optional(self.db.as_ref())
            .await
    }

    async fn create_post(&self, post: NewPost) -> Result<Post, sqlx::Error> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO blog.posts (text, author_id, group_id, image)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&post.text)
        .bind(post.author_id)
        .bind(post.group_id)
        .bind(&post.image)
        .fetch_one(self.db.as_ref())
        .await?;

        self.find_post(id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    async fn update_post(&self, id: i64, changes: PostChanges) -> Result<Post, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE blog.posts SET text = $2, group_id = $3, image = $4 WHERE id = $1",
        )
        .bind(id)
        .bind(&changes.text)
        .bind(changes.group_id)
        .bind(&changes.image)
        .execute(self.db.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        self.find_post(id).await?.ok_or(sqlx::Error::RowNotFound)
    }
}
