use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    apis::api_models::request::{CommentForm, FormErrors, PostForm},
    models::{
        comments::{Comment, CommentResponse, NewComment},
        posts::{NewPost, Post, PostChanges, PostFilter, PostResponse},
        users::User,
    },
    repositories::{CommentRepository, GroupRepository, PostRepository},
    utils::{
        errors::app_error::AppError,
        paginator::{Page, Paginator},
    },
};

use super::media_service::MediaService;

/// Outcome of a bound form: either the saved record or the field errors to
/// re-render the form with.
#[derive(Debug)]
pub enum Submission<T> {
    Accepted(T),
    Rejected(FormErrors),
}

pub struct PostService {
    post_repository: Arc<dyn PostRepository>,
    comment_repository: Arc<dyn CommentRepository>,
    group_repository: Arc<dyn GroupRepository>,
    media_service: Arc<MediaService>,
    paginator: Paginator,
}

impl PostService {
    pub fn new(
        post_repository: Arc<dyn PostRepository>,
        comment_repository: Arc<dyn CommentRepository>,
        group_repository: Arc<dyn GroupRepository>,
        media_service: Arc<MediaService>,
        paginator: Paginator,
    ) -> Self {
        PostService {
            post_repository,
            comment_repository,
            group_repository,
            media_service,
            paginator,
        }
    }

    pub async fn list_posts(
        &self,
        filter: PostFilter,
        raw_page: Option<&str>,
    ) -> Result<Page<PostResponse>, AppError> {
        let count = self.post_repository.count_posts(&filter).await?;
        let number = self.paginator.page_number(raw_page, count);
        let (limit, offset) = self.paginator.bounds(number);
        debug!(
            "Listing posts {:?}: page {} (limit {}, offset {})",
            filter, number, limit, offset
        );

        let posts = self
            .post_repository
            .list_posts(&filter, limit, offset)
            .await?;

        Ok(self
            .paginator
            .page(posts, number, count)
            .map(PostResponse::from))
    }

    pub async fn count_posts(&self, filter: PostFilter) -> Result<i64, AppError> {
        Ok(self.post_repository.count_posts(&filter).await?)
    }

    /// Fetches a post by its author and the raw id path segment. A
    /// non-numeric id is as absent as an unknown one.
    pub async fn get_author_post(&self, author: &User, post_id: &str) -> Result<Post, AppError> {
        let not_found = || {
            AppError::NotFound(format!(
                "Post {} by {} not found",
                post_id, author.username
            ))
        };
        let id = post_id.parse::<i64>().map_err(|_| not_found())?;

        self.post_repository
            .find_author_post(author.id, id)
            .await?
            .ok_or_else(not_found)
    }

    pub async fn list_comments(&self, post: &Post) -> Result<Vec<CommentResponse>, AppError> {
        let comments = self.comment_repository.list_comments(post.id).await?;
        Ok(comments.into_iter().map(CommentResponse::from).collect())
    }

    pub async fn create_post(
        &self,
        author: &User,
        form: PostForm,
    ) -> Result<Submission<Post>, AppError> {
        let groups = self.group_repository.list_groups().await?;
        let cleaned = match form.clean(&groups) {
            Ok(cleaned) => cleaned,
            Err(errors) => return Ok(Submission::Rejected(errors)),
        };

        let image = match &cleaned.image {
            Some(upload) => Some(self.media_service.save_post_image(upload).await?),
            None => None,
        };

        let post = self
            .post_repository
            .create_post(NewPost {
                text: cleaned.text,
                author_id: author.id,
                group_id: cleaned.group_id,
                image,
            })
            .await?;
        info!("User {} created post {}", author.username, post.id);

        Ok(Submission::Accepted(post))
    }

    /// Saves an edit in place. The stored image survives unless a new file
    /// is uploaded or the clear flag is set.
    pub async fn update_post(
        &self,
        post: &Post,
        form: PostForm,
    ) -> Result<Submission<Post>, AppError> {
        let groups = self.group_repository.list_groups().await?;
        let cleaned = match form.clean(&groups) {
            Ok(cleaned) => cleaned,
            Err(errors) => return Ok(Submission::Rejected(errors)),
        };

        let image = match (&cleaned.image, cleaned.image_clear) {
            (Some(upload), _) => Some(self.media_service.save_post_image(upload).await?),
            (None, true) => None,
            (None, false) => post.image.clone(),
        };

        let updated = self
            .post_repository
            .update_post(
                post.id,
                PostChanges {
                    text: cleaned.text,
                    group_id: cleaned.group_id,
                    image,
                },
            )
            .await?;
        info!("Post {} edited by {}", updated.id, updated.author_username);

        Ok(Submission::Accepted(updated))
    }

    /// Returns `None` when the comment was blank and nothing was stored.
    pub async fn add_comment(
        &self,
        author: &User,
        post: &Post,
        form: CommentForm,
    ) -> Result<Option<Comment>, AppError> {
        let text = match form.clean() {
            Ok(text) => text,
            Err(errors) => {
                debug!("Rejected comment on post {}: {:?}", post.id, errors);
                return Ok(None);
            }
        };

        let comment = self
            .comment_repository
            .create_comment(NewComment {
                post_id: post.id,
                author_id: author.id,
                text,
            })
            .await?;

        Ok(Some(comment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{groups::NewGroup, users::NewUser};
    use crate::repositories::{memory::MemoryStore, UserRepository};

    async fn setup() -> (PostService, Arc<MemoryStore>, User) {
        let store = Arc::new(MemoryStore::new());
        let media = Arc::new(MediaService::new(
            std::env::temp_dir().join(format!("blog-media-{}", uuid::Uuid::new_v4())),
        ));
        let service = PostService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            media,
            Paginator::new(10),
        );
        let author = store
            .create_user(NewUser::with_username("author"))
            .await
            .unwrap();
        (service, store, author)
    }

    fn form(text: &str) -> PostForm {
        PostForm {
            text: text.to_string(),
            ..Default::default()
        }
    }

    fn accepted(submission: Submission<Post>) -> Post {
        match submission {
            Submission::Accepted(post) => post,
            Submission::Rejected(errors) => panic!("form rejected: {:?}", errors),
        }
    }

    #[tokio::test]
    async fn test_edit_keeps_image_unless_cleared() {
        let (service, store, author) = setup().await;
        let mut post = accepted(service.create_post(&author, form("first")).await.unwrap());
        post = store
            .update_post(
                post.id,
                PostChanges {
                    text: post.text.clone(),
                    group_id: None,
                    image: Some("posts/small.png".to_string()),
                },
            )
            .await
            .unwrap();

        let edited = accepted(service.update_post(&post, form("second")).await.unwrap());
        assert_eq!(edited.text, "second");
        assert_eq!(edited.image.as_deref(), Some("posts/small.png"));
        assert_eq!(edited.pub_date, post.pub_date);

        let mut clear = form("third");
        clear.image_clear = true;
        let cleared = accepted(service.update_post(&edited, clear).await.unwrap());
        assert!(cleared.image.is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_group() {
        let (service, store, author) = setup().await;
        store
            .create_group(NewGroup {
                title: "Cats".to_string(),
                slug: "cats".to_string(),
                description: String::new(),
            })
            .await
            .unwrap();

        let mut post = form("text");
        post.group = Some("999".to_string());
        let submission = service.create_post(&author, post).await.unwrap();

        assert!(matches!(submission, Submission::Rejected(_)));
        assert_eq!(service.count_posts(PostFilter::All).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_blank_comment_is_not_stored() {
        let (service, _, author) = setup().await;
        let post = accepted(service.create_post(&author, form("text")).await.unwrap());

        let comment = service
            .add_comment(&author, &post, CommentForm::default())
            .await
            .unwrap();
        assert!(comment.is_none());
        assert!(service.list_comments(&post).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_numeric_post_id_is_not_found() {
        let (service, _, author) = setup().await;
        let result = service.get_author_post(&author, "abc").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
