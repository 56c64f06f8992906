use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, Router};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_scalar::{Scalar, Servable};

use crate::{settings::Settings, AppState};

pub mod api_models;
pub mod error_handlers;
pub mod feed_handlers;
pub mod middlewares;
pub mod post_handlers;
pub mod profile_handlers;

struct SessionTokenAddon;

impl Modify for SessionTokenAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "session_token",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SessionTokenAddon),
    tags(
        (name = "posts", description = "Feeds, posts and comments"),
        (name = "profiles", description = "Profiles and the follow graph")
    )
)]
pub struct ApiDoc;

pub fn setup_routes(settings: &Settings) -> Router<Arc<AppState>> {
    let api_doc = ApiDoc::openapi();

    let feed_router = OpenApiRouter::new()
        .routes(routes!(feed_handlers::index))
        .routes(routes!(feed_handlers::group_posts))
        .routes(routes!(feed_handlers::follow_index));

    let post_router = OpenApiRouter::new()
        .routes(routes!(post_handlers::new_post_form, post_handlers::create_post))
        .routes(routes!(post_handlers::post_view))
        .routes(routes!(
            post_handlers::edit_post_form,
            post_handlers::update_post
        ))
        .routes(routes!(
            post_handlers::comment_redirect,
            post_handlers::add_comment
        ))
        .layer(DefaultBodyLimit::max(settings.max_upload_bytes));

    let profile_router = OpenApiRouter::new()
        .routes(routes!(profile_handlers::profile))
        .routes(routes!(profile_handlers::profile_follow))
        .routes(routes!(profile_handlers::profile_unfollow));

    let (api_router, api_openapi) = OpenApiRouter::with_openapi(api_doc)
        .merge(feed_router)
        .merge(post_router)
        .merge(profile_router)
        .split_for_parts();

    Router::new()
        .merge(Scalar::with_url("/docs", api_openapi))
        .merge(api_router)
}
