use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    comments::{Comment, NewComment},
    groups::{Group, NewGroup},
    posts::{NewPost, Post, PostChanges, PostFilter},
    users::{NewUser, User, UserSession},
};

pub mod comment_repository;
pub mod follow_repository;
pub mod group_repository;
pub mod memory;
pub mod post_repository;
pub mod user_repository;

use comment_repository::PgCommentRepository;
use follow_repository::PgFollowRepository;
use group_repository::PgGroupRepository;
use memory::MemoryStore;
use post_repository::PgPostRepository;
use user_repository::PgUserRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error>;

    /// Resolves an unexpired session token to its user.
    async fn find_user_by_session(&self, token: Uuid) -> Result<Option<User>, sqlx::Error>;

    async fn create_user(&self, user: NewUser) -> Result<User, sqlx::Error>;

    async fn create_session(&self, user_id: Uuid, ttl: Duration)
        -> Result<UserSession, sqlx::Error>;

    /// Removes the user together with their sessions, posts, comments and
    /// follow edges. Returns the number of removed users.
    async fn delete_user(&self, username: &str) -> Result<u64, sqlx::Error>;
}

#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<Group>, sqlx::Error>;

    async fn list_groups(&self) -> Result<Vec<Group>, sqlx::Error>;

    async fn create_group(&self, group: NewGroup) -> Result<Group, sqlx::Error>;

    /// Removes the group. Its posts stay, without a group.
    async fn delete_group(&self, slug: &str) -> Result<u64, sqlx::Error>;
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn count_posts(&self, filter: &PostFilter) -> Result<i64, sqlx::Error>;

    /// Newest first, ties broken by id.
    async fn list_posts(
        &self,
        filter: &PostFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>, sqlx::Error>;

    async fn find_post(&self, id: i64) -> Result<Option<Post>, sqlx::Error>;

    /// Looks a post up by id, scoped to the given author.
    async fn find_author_post(
        &self,
        author_id: Uuid,
        post_id: i64,
    ) -> Result<Option<Post>, sqlx::Error>;

    async fn create_post(&self, post: NewPost) -> Result<Post, sqlx::Error>;

    async fn update_post(&self, id: i64, changes: PostChanges) -> Result<Post, sqlx::Error>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Comments of a post in insertion order.
    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, sqlx::Error>;

    async fn create_comment(&self, comment: NewComment) -> Result<Comment, sqlx::Error>;
}

#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Inserts the edge unless it already exists. Returns whether a row was created.
    async fn create_follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, sqlx::Error>;

    /// Returns the number of removed edges.
    async fn delete_follow(&self, user_id: Uuid, author_id: Uuid) -> Result<u64, sqlx::Error>;

    async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, sqlx::Error>;

    async fn count_followers(&self, author_id: Uuid) -> Result<i64, sqlx::Error>;

    async fn count_following(&self, user_id: Uuid) -> Result<i64, sqlx::Error>;
}

/// The storage handles every service is built from.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub follows: Arc<dyn FollowRepository>,
}

impl Repositories {
    pub fn postgres(db: Arc<PgPool>) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(db.clone())),
            groups: Arc::new(PgGroupRepository::new(db.clone())),
            posts: Arc::new(PgPostRepository::new(db.clone())),
            comments: Arc::new(PgCommentRepository::new(db.clone())),
            follows: Arc::new(PgFollowRepository::new(db)),
        }
    }

    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            groups: store.clone(),
            posts: store.clone(),
            comments: store.clone(),
            follows: store,
        }
    }
}
