use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form, Json,
};

use crate::{
    models::{
        groups::GroupResponse,
        posts::{PostFilter, PostResponse},
        users::UserResponse,
    },
    services::post_service::Submission,
    utils::errors::{app_error::AppError, error_payload::ErrorPayload},
    AppState,
};

use super::{
    api_models::{
        request::{CommentForm, PostForm, PostUpload},
        response::{
            post_path, CommentFormView, Found, PostFormValues, PostFormView, PostView,
            POST_TEMPLATE,
        },
    },
    middlewares::auth::CurrentUser,
};

pub const TAG: &str = "posts";

async fn group_choices(app_state: &AppState) -> Result<Vec<GroupResponse>, AppError> {
    let groups = app_state.group_service.list_groups().await?;
    Ok(groups.into_iter().map(GroupResponse::from).collect())
}

fn submitted_values(form: &PostForm, image: Option<String>) -> PostFormValues {
    PostFormValues {
        text: form.text.clone(),
        group: form
            .group
            .as_deref()
            .and_then(|g| g.trim().parse::<i64>().ok()),
        image,
    }
}

/// Get a post with its comments
#[utoipa::path(
    get,
    tag = TAG,
    path = "/{username}/{post_id}/",
    operation_id = "getPost",
    responses(
        (status = 200, description = "Post retrieved successfully", body = PostView),
        (status = 404, description = "User or post not found", body = ErrorPayload),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    ),
    params(
        ("username" = String, Path, description = "Author's username"),
        ("post_id" = String, Path, description = "Post ID")
    )
)]
pub(super) async fn post_view(
    State(app_state): State<Arc<AppState>>,
    Path((username, post_id)): Path<(String, String)>,
) -> Result<(StatusCode, Json<PostView>), AppError> {
    let author = app_state.user_service.get_user_by_username(&username).await?;
    let post = app_state
        .post_service
        .get_author_post(&author, &post_id)
        .await?;
    let count = app_state
        .post_service
        .count_posts(PostFilter::Author(author.id))
        .await?;
    let comments = app_state.post_service.list_comments(&post).await?;

    let view = PostView {
        template: POST_TEMPLATE.to_string(),
        post: PostResponse::from(post),
        author: UserResponse::from(author),
        count,
        comments,
        form: CommentFormView::default(),
    };

    Ok((StatusCode::OK, Json(view)))
}

/// Empty post creation form
#[utoipa::path(
    get,
    tag = TAG,
    path = "/new/",
    operation_id = "getNewPostForm",
    responses(
        (status = 200, description = "Empty post form", body = PostFormView),
        (status = 302, description = "Not logged in, redirected to login"),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    ),
    security(("session_token" = []))
)]
pub(super) async fn new_post_form(
    CurrentUser(_user): CurrentUser,
    State(app_state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<PostFormView>), AppError> {
    let groups = group_choices(&app_state).await?;
    Ok((StatusCode::OK, Json(PostFormView::create(groups))))
}

/// Create a post authored by the requester
#[utoipa::path(
    post,
    tag = TAG,
    path = "/new/",
    operation_id = "createPost",
    request_body(content = PostUpload, content_type = "multipart/form-data"),
    responses(
        (status = 302, description = "Post created, redirected to the feed"),
        (status = 200, description = "Invalid submission, form with errors", body = PostFormView),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    ),
    security(("session_token" = []))
)]
pub(super) async fn create_post(
    CurrentUser(user): CurrentUser,
    State(app_state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = PostForm::from_multipart(multipart).await?;
    let values = submitted_values(&form, None);

    match app_state.post_service.create_post(&user, form).await? {
        Submission::Accepted(_) => Ok(Found::to("/").into_response()),
        Submission::Rejected(errors) => {
            let groups = group_choices(&app_state).await?;
            let view = PostFormView::create(groups).with_errors(values, errors);
            Ok((StatusCode::OK, Json(view)).into_response())
        }
    }
}

/// Post edit form, prefilled with the current values
#[utoipa::path(
    get,
    tag = TAG,
    path = "/{username}/{post_id}/edit/",
    operation_id = "getEditPostForm",
    responses(
        (status = 200, description = "Prefilled post form", body = PostFormView),
        (status = 302, description = "Not the author or not logged in"),
        (status = 404, description = "User or post not found", body = ErrorPayload),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    ),
    params(
        ("username" = String, Path, description = "Author's username"),
        ("post_id" = String, Path, description = "Post ID")
    ),
    security(("session_token" = []))
)]
pub(super) async fn edit_post_form(
    CurrentUser(user): CurrentUser,
    State(app_state): State<Arc<AppState>>,
    Path((username, post_id)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let author = app_state.user_service.get_user_by_username(&username).await?;
    let post = app_state
        .post_service
        .get_author_post(&author, &post_id)
        .await?;
    if post.author_id != user.id {
        return Ok(Found::to(post_path(&author.username, post.id)).into_response());
    }

    let groups = group_choices(&app_state).await?;
    let view = PostFormView::edit(&PostResponse::from(post), groups);
    Ok((StatusCode::OK, Json(view)).into_response())
}

/// Save an edit of the requester's own post
#[utoipa::path(
    post,
    tag = TAG,
    path = "/{username}/{post_id}/edit/",
    operation_id = "updatePost",
    request_body(content = PostUpload, content_type = "multipart/form-data"),
    responses(
        (status = 302, description = "Saved, or not the author; redirected to the post"),
        (status = 200, description = "Invalid submission, form with errors", body = PostFormView),
        (status = 404, description = "User or post not found", body = ErrorPayload),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    ),
    params(
        ("username" = String, Path, description = "Author's username"),
        ("post_id" = String, Path, description = "Post ID")
    ),
    security(("session_token" = []))
)]
pub(super) async fn update_post(
    CurrentUser(user): CurrentUser,
    State(app_state): State<Arc<AppState>>,
    Path((username, post_id)): Path<(String, String)>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let author = app_state.user_service.get_user_by_username(&username).await?;
    let post = app_state
        .post_service
        .get_author_post(&author, &post_id)
        .await?;
    let detail = post_path(&author.username, post.id);
    if post.author_id != user.id {
        return Ok(Found::to(detail).into_response());
    }

    let form = PostForm::from_multipart(multipart).await?;
    let values = submitted_values(&form, post.image.clone());

    match app_state.post_service.update_post(&post, form).await? {
        Submission::Accepted(_) => Ok(Found::to(detail).into_response()),
        Submission::Rejected(errors) => {
            let groups = group_choices(&app_state).await?;
            let view =
                PostFormView::edit(&PostResponse::from(post), groups).with_errors(values, errors);
            Ok((StatusCode::OK, Json(view)).into_response())
        }
    }
}

/// Comment on a post
#[utoipa::path(
    post,
    tag = TAG,
    path = "/{username}/{post_id}/comment/",
    operation_id = "addComment",
    request_body(content = CommentForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Redirected to the post"),
        (status = 404, description = "User or post not found", body = ErrorPayload),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    ),
    params(
        ("username" = String, Path, description = "Author's username"),
        ("post_id" = String, Path, description = "Post ID")
    ),
    security(("session_token" = []))
)]
pub(super) async fn add_comment(
    CurrentUser(user): CurrentUser,
    State(app_state): State<Arc<AppState>>,
    Path((username, post_id)): Path<(String, String)>,
    Form(form): Form<CommentForm>,
) -> Result<Found, AppError> {
    let author = app_state.user_service.get_user_by_username(&username).await?;
    let post = app_state
        .post_service
        .get_author_post(&author, &post_id)
        .await?;
    app_state.post_service.add_comment(&user, &post, form).await?;

    Ok(Found::to(post_path(&author.username, post.id)))
}

/// A plain visit to the comment route goes back to the post
#[utoipa::path(
    get,
    tag = TAG,
    path = "/{username}/{post_id}/comment/",
    operation_id = "getComment",
    responses(
        (status = 302, description = "Redirected to the post, or to login when anonymous"),
        (status = 404, description = "User or post not found", body = ErrorPayload)
    ),
    params(
        ("username" = String, Path, description = "Author's username"),
        ("post_id" = String, Path, description = "Post ID")
    ),
    security(("session_token" = []))
)]
pub(super) async fn comment_redirect(
    CurrentUser(_user): CurrentUser,
    State(app_state): State<Arc<AppState>>,
    Path((username, post_id)): Path<(String, String)>,
) -> Result<Found, AppError> {
    let author = app_state.user_service.get_user_by_username(&username).await?;
    let post = app_state
        .post_service
        .get_author_post(&author, &post_id)
        .await?;

    Ok(Found::to(post_path(&author.username, post.id)))
}
