use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    models::{posts::PostFilter, users::UserResponse},
    utils::errors::{app_error::AppError, error_payload::ErrorPayload},
    AppState,
};

use super::{
    api_models::{
        query::PageQuery,
        response::{profile_path, Found, ProfileView, PROFILE_TEMPLATE},
    },
    middlewares::auth::{CurrentUser, MaybeUser},
};

pub const TAG: &str = "profiles";

/// Get a user's profile with a page of their posts
#[utoipa::path(
    get,
    tag = TAG,
    path = "/{username}/",
    operation_id = "getProfile",
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ProfileView),
        (status = 404, description = "User not found", body = ErrorPayload),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    ),
    params(
        ("username" = String, Path, description = "Username"),
        PageQuery
    )
)]
pub(super) async fn profile(
    MaybeUser(viewer): MaybeUser,
    State(app_state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<(StatusCode, Json<ProfileView>), AppError> {
    let author = app_state.user_service.get_user_by_username(&username).await?;
    let page = app_state
        .post_service
        .list_posts(PostFilter::Author(author.id), query.raw())
        .await?;
    let following = app_state
        .profile_service
        .is_following(viewer.as_ref(), &author)
        .await?;
    let stats = app_state.profile_service.follow_stats(&author).await?;

    let view = ProfileView {
        template: PROFILE_TEMPLATE.to_string(),
        count: page.count,
        author: UserResponse::from(author),
        page,
        following,
        followers_count: stats.followers,
        following_count: stats.following,
    };

    Ok((StatusCode::OK, Json(view)))
}

/// Follow a user
#[utoipa::path(
    get,
    tag = TAG,
    path = "/{username}/follow/",
    operation_id = "followUser",
    responses(
        (status = 302, description = "Redirected to the profile, or to login when anonymous"),
        (status = 404, description = "User not found", body = ErrorPayload),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    ),
    params(
        ("username" = String, Path, description = "Username to follow")
    ),
    security(("session_token" = []))
)]
pub(super) async fn profile_follow(
    CurrentUser(user): CurrentUser,
    State(app_state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Found, AppError> {
    let author = app_state.user_service.get_user_by_username(&username).await?;
    app_state.profile_service.follow(&user, &author).await?;

    Ok(Found::to(profile_path(&author.username)))
}

/// Unfollow a user
#[utoipa::path(
    get,
    tag = TAG,
    path = "/{username}/unfollow/",
    operation_id = "unfollowUser",
    responses(
        (status = 302, description = "Redirected to the profile, or to login when anonymous"),
        (status = 404, description = "User not found", body = ErrorPayload),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    ),
    params(
        ("username" = String, Path, description = "Username to unfollow")
    ),
    security(("session_token" = []))
)]
pub(super) async fn profile_unfollow(
    CurrentUser(user): CurrentUser,
    State(app_state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Found, AppError> {
    let author = app_state.user_service.get_user_by_username(&username).await?;
    app_state.profile_service.unfollow(&user, &author).await?;

    Ok(Found::to(profile_path(&author.username)))
}
