use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    comments::{Comment, NewComment},
    follows::Follow,
    groups::{Group, NewGroup},
    posts::{NewPost, Post, PostChanges, PostFilter},
    users::{NewUser, User, UserSession},
};

use super::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
};

/// Stored post without its joined author and group columns.
#[derive(Clone, Debug)]
struct PostRow {
    id: i64,
    text: String,
    pub_date: chrono::DateTime<Utc>,
    author_id: Uuid,
    group_id: Option<i64>,
    image: Option<String>,
}

#[derive(Clone, Debug)]
struct CommentRow {
    id: i64,
    post_id: i64,
    author_id: Uuid,
    text: String,
    created: chrono::DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    sessions: Vec<UserSession>,
    groups: Vec<Group>,
    posts: Vec<PostRow>,
    comments: Vec<CommentRow>,
    follows: Vec<Follow>,
    next_group_id: i64,
    next_post_id: i64,
    next_comment_id: i64,
    next_follow_id: i64,
}

impl Tables {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn group(&self, id: i64) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    fn hydrate_post(&self, row: &PostRow) -> Result<Post, sqlx::Error> {
        let author = self.user(row.author_id).ok_or(sqlx::Error::RowNotFound)?;
        let group = row.group_id.and_then(|id| self.group(id));

        Ok(Post {
            id: row.id,
            text: row.text.clone(),
            pub_date: row.pub_date,
            author_id: row.author_id,
            author_username: author.username.clone(),
            group_id: group.map(|g| g.id),
            group_slug: group.map(|g| g.slug.clone()),
            group_title: group.map(|g| g.title.clone()),
            image: row.image.clone(),
        })
    }

    fn hydrate_comment(&self, row: &CommentRow) -> Result<Comment, sqlx::Error> {
        let author = self.user(row.author_id).ok_or(sqlx::Error::RowNotFound)?;

        Ok(Comment {
            id: row.id,
            post_id: row.post_id,
            author_id: row.author_id,
            author_username: author.username.clone(),
            text: row.text.clone(),
            created: row.created,
        })
    }

    fn matches(&self, row: &PostRow, filter: &PostFilter) -> bool {
        match *filter {
            PostFilter::All => true,
            PostFilter::Group(group_id) => row.group_id == Some(group_id),
            PostFilter::Author(author_id) => row.author_id == author_id,
            PostFilter::FollowedBy(user_id) => self
                .follows
                .iter()
                .any(|f| f.user_id == user_id && f.author_id == row.author_id),
        }
    }

    fn filtered_posts(&self, filter: &PostFilter) -> Vec<&PostRow> {
        let mut rows: Vec<&PostRow> = self
            .posts
            .iter()
            .filter(|row| self.matches(row, filter))
            .collect();
        rows.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
        rows
    }
}

/// Process-local storage used when no database is configured, and by the test suite.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_session(&self, token: Uuid) -> Result<Option<User>, sqlx::Error> {
        let tables = self.tables.read().await;
        let now = Utc::now();

        Ok(tables
            .sessions
            .iter()
            .find(|s| s.token == token && s.is_active(now))
            .and_then(|s| tables.user(s.user_id))
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, sqlx::Error> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(sqlx::Error::Protocol(format!(
                "duplicate username: {}",
                user.username
            )));
        }

        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            created_at: Utc::now(),
        };
        tables.users.push(created.clone());

        Ok(created)
    }

    async fn create_session(
        &self,
        user_id: Uuid,
        ttl: Duration,
    ) -> Result<UserSession, sqlx::Error> {
        let mut tables = self.tables.write().await;
        if tables.user(user_id).is_none() {
            return Err(sqlx::Error::RowNotFound);
        }

        let now = Utc::now();
        let session = UserSession {
            token: Uuid::new_v4(),
            user_id,
            created_at: now,
            expires_at: now + ttl,
        };
        tables.sessions.push(session.clone());

        Ok(session)
    }

    async fn delete_user(&self, username: &str) -> Result<u64, sqlx::Error> {
        let mut tables = self.tables.write().await;
        let Some(user_id) = tables
            .users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.id)
        else {
            return Ok(0);
        };

        let post_ids: Vec<i64> = tables
            .posts
            .iter()
            .filter(|p| p.author_id == user_id)
            .map(|p| p.id)
            .collect();
        tables
            .comments
            .retain(|c| c.author_id != user_id && !post_ids.contains(&c.post_id));
        tables.posts.retain(|p| p.author_id != user_id);
        tables
            .follows
            .retain(|f| f.user_id != user_id && f.author_id != user_id);
        tables.sessions.retain(|s| s.user_id != user_id);
        tables.users.retain(|u| u.id != user_id);

        Ok(1)
    }
}

#[async_trait]
impl GroupRepository for MemoryStore {
    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<Group>, sqlx::Error> {
        let tables = self.tables.read().await;
        Ok(tables.groups.iter().find(|g| g.slug == slug).cloned())
    }

    async fn list_groups(&self) -> Result<Vec<Group>, sqlx::Error> {
        let mut groups = self.tables.read().await.groups.clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(groups)
    }

    async fn create_group(&self, group: NewGroup) -> Result<Group, sqlx::Error> {
        let mut tables = self.tables.write().await;
        if tables.groups.iter().any(|g| g.slug == group.slug) {
            return Err(sqlx::Error::Protocol(format!(
                "duplicate group slug: {}",
                group.slug
            )));
        }

        let created = Group {
            id: Tables::next_id(&mut tables.next_group_id),
            title: group.title,
            slug: group.slug,
            description: group.description,
        };
        tables.groups.push(created.clone());

        Ok(created)
    }

    async fn delete_group(&self, slug: &str) -> Result<u64, sqlx::Error> {
        let mut tables = self.tables.write().await;
        let Some(group_id) = tables.groups.iter().find(|g| g.slug == slug).map(|g| g.id) else {
            return Ok(0);
        };

        for post in tables.posts.iter_mut().filter(|p| p.group_id == Some(group_id)) {
            post.group_id = None;
        }
        tables.groups.retain(|g| g.id != group_id);

        Ok(1)
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn count_posts(&self, filter: &PostFilter) -> Result<i64, sqlx::Error> {
        let tables = self.tables.read().await;
        Ok(tables.filtered_posts(filter).len() as i64)
    }

    async fn list_posts(
        &self,
        filter: &PostFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>, sqlx::Error> {
        let tables = self.tables.read().await;

        tables
            .filtered_posts(filter)
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|row| tables.hydrate_post(row))
            .collect()
    }

    async fn find_post(&self, id: i64) -> Result<Option<Post>, sqlx::Error> {
        let tables = self.tables.read().await;
        tables
            .posts
            .iter()
            .find(|row| row.id == id)
            .map(|row| tables.hydrate_post(row))
            .transpose()
    }

    async fn find_author_post(
        &self,
        author_id: Uuid,
        post_id: i64,
    ) -> Result<Option<Post>, sqlx::Error> {
        let tables = self.tables.read().await;
        tables
            .posts
            .iter()
            .find(|row| row.id == post_id && row.author_id == author_id)
            .map(|row| tables.hydrate_post(row))
            .transpose()
    }

    async fn create_post(&self, post: NewPost) -> Result<Post, sqlx::Error> {
        let mut tables = self.tables.write().await;
        if tables.user(post.author_id).is_none() {
            return Err(sqlx::Error::RowNotFound);
        }
        if let Some(group_id) = post.group_id {
            if tables.group(group_id).is_none() {
                return Err(sqlx::Error::RowNotFound);
            }
        }

        let row = PostRow {
            id: Tables::next_id(&mut tables.next_post_id),
            text: post.text,
            pub_date: Utc::now(),
            author_id: post.author_id,
            group_id: post.group_id,
            image: post.image,
        };
        tables.posts.push(row.clone());

        tables.hydrate_post(&row)
    }

    async fn update_post(&self, id: i64, changes: PostChanges) -> Result<Post, sqlx::Error> {
        let mut tables = self.tables.write().await;
        if let Some(group_id) = changes.group_id {
            if tables.group(group_id).is_none() {
                return Err(sqlx::Error::RowNotFound);
            }
        }

        let row = tables
            .posts
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(sqlx::Error::RowNotFound)?;
        row.text = changes.text;
        row.group_id = changes.group_id;
        row.image = changes.image;
        let row = row.clone();

        tables.hydrate_post(&row)
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, sqlx::Error> {
        let tables = self.tables.read().await;
        tables
            .comments
            .iter()
            .filter(|row| row.post_id == post_id)
            .map(|row| tables.hydrate_comment(row))
            .collect()
    }

    async fn create_comment(&self, comment: NewComment) -> Result<Comment, sqlx::Error> {
        let mut tables = self.tables.write().await;
        if !tables.posts.iter().any(|p| p.id == comment.post_id)
            || tables.user(comment.author_id).is_none()
        {
            return Err(sqlx::Error::RowNotFound);
        }

        let row = CommentRow {
            id: Tables::next_id(&mut tables.next_comment_id),
            post_id: comment.post_id,
            author_id: comment.author_id,
            text: comment.text,
            created: Utc::now(),
        };
        tables.comments.push(row.clone());

        tables.hydrate_comment(&row)
    }
}

#[async_trait]
impl FollowRepository for MemoryStore {
    async fn create_follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tables = self.tables.write().await;
        if tables.user(user_id).is_none() || tables.user(author_id).is_none() {
            return Err(sqlx::Error::RowNotFound);
        }
        if tables
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id)
        {
            return Ok(false);
        }

        let follow = Follow {
            id: Tables::next_id(&mut tables.next_follow_id),
            user_id,
            author_id,
            created_at: Utc::now(),
        };
        tables.follows.push(follow);

        Ok(true)
    }

    async fn delete_follow(&self, user_id: Uuid, author_id: Uuid) -> Result<u64, sqlx::Error> {
        let mut tables = self.tables.write().await;
        let before = tables.follows.len();
        tables
            .follows
            .retain(|f| !(f.user_id == user_id && f.author_id == author_id));

        Ok((before - tables.follows.len()) as u64)
    }

    async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, sqlx::Error> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id))
    }

    async fn count_followers(&self, author_id: Uuid) -> Result<i64, sqlx::Error> {
        let tables = self.tables.read().await;
        Ok(tables.follows.iter().filter(|f| f.author_id == author_id).count() as i64)
    }

    async fn count_following(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let tables = self.tables.read().await;
        Ok(tables.follows.iter().filter(|f| f.user_id == user_id).count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with_users() -> (MemoryStore, User, User) {
        let store = MemoryStore::new();
        let reader = store
            .create_user(NewUser::with_username("reader"))
            .await
            .unwrap();
        let author = store
            .create_user(NewUser::with_username("author"))
            .await
            .unwrap();
        (store, reader, author)
    }

    fn new_post(author_id: Uuid, text: &str, group_id: Option<i64>) -> NewPost {
        NewPost {
            text: text.to_string(),
            author_id,
            group_id,
            image: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let (store, _, _) = store_with_users().await;
        let result = store.create_user(NewUser::with_username("author")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_posts_are_listed_newest_first() {
        let (store, _, author) = store_with_users().await;
        for i in 0..3 {
            store
                .create_post(new_post(author.id, &format!("post {}", i), None))
                .await
                .unwrap();
        }

        let posts = store.list_posts(&PostFilter::All, 10, 0).await.unwrap();
        let texts: Vec<_> = posts.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["post 2", "post 1", "post 0"]);

        let page = store.list_posts(&PostFilter::All, 2, 2).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].text, "post 0");
    }

    #[tokio::test]
    async fn test_group_filter_and_hydration() {
        let (store, _, author) = store_with_users().await;
        let group = store
            .create_group(NewGroup {
                title: "Cats".to_string(),
                slug: "cats".to_string(),
                description: String::new(),
            })
            .await
            .unwrap();
        store
            .create_post(new_post(author.id, "in group", Some(group.id)))
            .await
            .unwrap();
        store
            .create_post(new_post(author.id, "no group", None))
            .await
            .unwrap();

        let filter = PostFilter::Group(group.id);
        assert_eq!(store.count_posts(&filter).await.unwrap(), 1);
        let posts = store.list_posts(&filter, 10, 0).await.unwrap();
        assert_eq!(posts[0].group_slug.as_deref(), Some("cats"));
        assert_eq!(posts[0].author_username, "author");
    }

    #[tokio::test]
    async fn test_create_post_with_unknown_group_fails() {
        let (store, _, author) = store_with_users().await;
        let result = store.create_post(new_post(author.id, "text", Some(42))).await;
        assert!(matches!(result, Err(sqlx::Error::RowNotFound)));
    }

    #[tokio::test]
    async fn test_follow_is_idempotent_and_feeds_followed_posts() {
        let (store, reader, author) = store_with_users().await;
        store
            .create_post(new_post(author.id, "followed", None))
            .await
            .unwrap();

        assert!(store.create_follow(reader.id, author.id).await.unwrap());
        assert!(!store.create_follow(reader.id, author.id).await.unwrap());
        assert_eq!(store.count_followers(author.id).await.unwrap(), 1);

        let feed = PostFilter::FollowedBy(reader.id);
        assert_eq!(store.count_posts(&feed).await.unwrap(), 1);
        assert_eq!(
            store.count_posts(&PostFilter::FollowedBy(author.id)).await.unwrap(),
            0
        );

        assert_eq!(store.delete_follow(reader.id, author.id).await.unwrap(), 1);
        assert_eq!(store.delete_follow(reader.id, author.id).await.unwrap(), 0);
        assert_eq!(store.count_posts(&feed).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_expired_session_does_not_resolve() {
        let (store, reader, _) = store_with_users().await;
        let active = store
            .create_session(reader.id, Duration::hours(1))
            .await
            .unwrap();
        let expired = store
            .create_session(reader.id, Duration::hours(-1))
            .await
            .unwrap();

        let found = store.find_user_by_session(active.token).await.unwrap();
        assert_eq!(found.map(|u| u.username), Some("reader".to_string()));
        assert!(store
            .find_user_by_session(expired.token)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_deleting_user_cascades() {
        let (store, reader, author) = store_with_users().await;
        let session = store
            .create_session(author.id, Duration::hours(1))
            .await
            .unwrap();
        let authored = store
            .create_post(new_post(author.id, "by author", None))
            .await
            .unwrap();
        let kept = store
            .create_post(new_post(reader.id, "by reader", None))
            .await
            .unwrap();
        let comments = [
            (authored.id, reader.id),
            (kept.id, author.id),
            (kept.id, reader.id),
        ];
        for (post_id, author_id) in comments {
            store
                .create_comment(NewComment {
                    post_id,
                    author_id,
                    text: "comment".to_string(),
                })
                .await
                .unwrap();
        }
        store.create_follow(reader.id, author.id).await.unwrap();
        store.create_follow(author.id, reader.id).await.unwrap();

        assert_eq!(store.delete_user("author").await.unwrap(), 1);

        assert!(store.find_user_by_username("author").await.unwrap().is_none());
        assert!(store.find_user_by_session(session.token).await.unwrap().is_none());
        assert!(store.find_post(authored.id).await.unwrap().is_none());
        assert!(store.list_comments(authored.id).await.unwrap().is_empty());

        let remaining = store.list_comments(kept.id).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].author_username, "reader");
        assert_eq!(store.count_posts(&PostFilter::All).await.unwrap(), 1);
        assert_eq!(store.count_followers(reader.id).await.unwrap(), 0);
        assert_eq!(store.count_following(reader.id).await.unwrap(), 0);

        assert_eq!(store.delete_user("author").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_deleting_group_keeps_its_posts() {
        let (store, _, author) = store_with_users().await;
        let group = store
            .create_group(NewGroup {
                title: "Cats".to_string(),
                slug: "cats".to_string(),
                description: String::new(),
            })
            .await
            .unwrap();
        let post = store
            .create_post(new_post(author.id, "in group", Some(group.id)))
            .await
            .unwrap();

        assert_eq!(store.delete_group("cats").await.unwrap(), 1);

        let post = store.find_post(post.id).await.unwrap().unwrap();
        assert!(post.group_id.is_none());
        assert!(post.group_slug.is_none());
        assert!(store.find_group_by_slug("cats").await.unwrap().is_none());
        assert_eq!(store.count_posts(&PostFilter::Group(group.id)).await.unwrap(), 0);
        assert_eq!(store.delete_group("cats").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_find_author_post_is_scoped_to_author() {
        let (store, reader, author) = store_with_users().await;
        let post = store
            .create_post(new_post(author.id, "mine", None))
            .await
            .unwrap();

        assert!(store
            .find_author_post(author.id, post.id)
            .await
            .unwrap()
            .is_some());
        assert!(store
            .find_author_post(reader.id, post.id)
            .await
            .unwrap()
            .is_none());
    }
}
