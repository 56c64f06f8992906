use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

use crate::{
    models::{groups::GroupResponse, posts::PostFilter},
    utils::errors::{app_error::AppError, error_payload::ErrorPayload},
    AppState,
};

use super::{
    api_models::{
        query::PageQuery,
        response::{FeedView, FOLLOW_TEMPLATE, GROUP_TEMPLATE, INDEX_TEMPLATE},
    },
    middlewares::auth::CurrentUser,
};

pub const TAG: &str = "posts";

fn json_body(body: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}

/// Global feed, newest posts first. Served from the page cache when fresh.
#[utoipa::path(
    get,
    tag = TAG,
    path = "/",
    operation_id = "getIndex",
    responses(
        (status = 200, description = "Page of the global feed", body = FeedView),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    ),
    params(PageQuery)
)]
pub(super) async fn index(
    State(app_state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let key = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    match app_state.page_cache.get_page(&key).await {
        Ok(Some(body)) => return Ok(json_body(body)),
        Ok(None) => {}
        Err(e) => warn!("Page cache read failed for {}: {}", key, e),
    }

    let page = app_state
        .post_service
        .list_posts(PostFilter::All, query.raw())
        .await?;
    let view = FeedView::new(INDEX_TEMPLATE, page);
    let body = serde_json::to_string(&view).map_err(|e| {
        error!("Failed to serialize the feed: {}", e);
        AppError::InternalServerError()
    })?;

    if let Err(e) = app_state
        .page_cache
        .set_page(&key, &body, app_state.settings.page_cache_ttl)
        .await
    {
        warn!("Page cache write failed for {}: {}", key, e);
    }

    Ok(json_body(body))
}

/// Posts of one group
#[utoipa::path(
    get,
    tag = TAG,
    path = "/group/{slug}/",
    operation_id = "getGroupPosts",
    responses(
        (status = 200, description = "Page of the group feed", body = FeedView),
        (status = 404, description = "Group not found", body = ErrorPayload),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    ),
    params(
        ("slug" = String, Path, description = "Group slug"),
        PageQuery
    )
)]
pub(super) async fn group_posts(
    State(app_state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<(StatusCode, Json<FeedView>), AppError> {
    let group = app_state.group_service.get_group_by_slug(&slug).await?;
    let page = app_state
        .post_service
        .list_posts(PostFilter::Group(group.id), query.raw())
        .await?;

    let view = FeedView::new(GROUP_TEMPLATE, page).with_group(GroupResponse::from(group));
    Ok((StatusCode::OK, Json(view)))
}

/// Posts by the authors the requester follows
#[utoipa::path(
    get,
    tag = TAG,
    path = "/follow/",
    operation_id = "getFollowFeed",
    responses(
        (status = 200, description = "Page of the followed-authors feed", body = FeedView),
        (status = 302, description = "Not logged in, redirected to login"),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    ),
    params(PageQuery),
    security(("session_token" = []))
)]
pub(super) async fn follow_index(
    CurrentUser(user): CurrentUser,
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<(StatusCode, Json<FeedView>), AppError> {
    let page = app_state
        .post_service
        .list_posts(PostFilter::FollowedBy(user.id), query.raw())
        .await?;

    Ok((StatusCode::OK, Json(FeedView::new(FOLLOW_TEMPLATE, page))))
}
