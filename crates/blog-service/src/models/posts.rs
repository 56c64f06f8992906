use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Number of characters of the text used when a post is displayed by name.
pub const POST_TITLE_LENGTH: usize = 15;

/// A post row joined with its author's username and its group, if any.
#[derive(Clone, Debug, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: Uuid,
    pub author_username: String,
    pub group_id: Option<i64>,
    pub group_slug: Option<String>,
    pub group_title: Option<String>,
    pub image: Option<String>,
}

impl Display for Post {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let title: String = self.text.chars().take(POST_TITLE_LENGTH).collect();
        write!(f, "{}", title)
    }
}

#[derive(Clone, Debug)]
pub struct NewPost {
    pub text: String,
    pub author_id: Uuid,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

/// Fields an edit may change. `pub_date` and the author are fixed at creation.
#[derive(Clone, Debug)]
pub struct PostChanges {
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

/// Which posts a feed shows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PostFilter {
    All,
    Group(i64),
    Author(Uuid),
    /// Posts by every author the given user follows.
    FollowedBy(Uuid),
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PostGroupRef {
    pub id: i64,
    pub slug: String,
    pub title: String,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author: String,
    pub group: Option<PostGroupRef>,
    pub image: Option<String>,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        let group = match (post.group_id, post.group_slug, post.group_title) {
            (Some(id), Some(slug), Some(title)) => Some(PostGroupRef { id, slug, title }),
            _ => None,
        };

        PostResponse {
            id: post.id,
            text: post.text,
            pub_date: post.pub_date,
            author: post.author_username,
            group,
            image: post.image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_with_text(text: &str) -> Post {
        Post {
            id: 1,
            text: text.to_string(),
            pub_date: Utc::now(),
            author_id: Uuid::new_v4(),
            author_username: "test_user".to_string(),
            group_id: None,
            group_slug: None,
            group_title: None,
            image: None,
        }
    }

    #[test]
    fn test_post_display_is_first_fifteen_chars() {
        let post = post_with_text(&"Строка состоит из 30 символов ".repeat(3));
        assert_eq!(post.to_string(), "Строка состоит ");
        assert_eq!(post.to_string().chars().count(), POST_TITLE_LENGTH);
    }

    #[test]
    fn test_post_display_short_text() {
        let post = post_with_text("Короткий");
        assert_eq!(post.to_string(), "Короткий");
    }

    #[test]
    fn test_response_drops_partial_group() {
        let mut post = post_with_text("text");
        post.group_id = Some(3);
        let response = PostResponse::from(post);
        assert!(response.group.is_none());
        assert_eq!(response.author, "test_user");
    }
}
