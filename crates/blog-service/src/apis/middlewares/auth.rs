use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, OriginalUri},
    http::{request::Parts, Uri},
    response::{IntoResponse, Response},
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tracing::debug;
use uuid::Uuid;

use crate::{
    apis::api_models::response::Found, models::users::User,
    utils::errors::app_error::AppError, AppState,
};

/// The requesting user, if the request carries a live session token.
pub struct MaybeUser(pub Option<User>);

/// The requesting user. Anonymous requests are redirected to the login route.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let bearer =
            match TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await {
                Ok(TypedHeader(Authorization(bearer))) => bearer,
                Err(_) => return Ok(MaybeUser(None)),
            };

        let token = match Uuid::parse_str(bearer.token()) {
            Ok(token) => token,
            Err(_) => {
                debug!("Ignoring malformed session token");
                return Ok(MaybeUser(None));
            }
        };

        let user = state.user_service.find_user_by_session(token).await?;
        Ok(MaybeUser(user))
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let MaybeUser(user) = MaybeUser::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match user {
            Some(user) => Ok(CurrentUser(user)),
            None => {
                let uri = match parts.extensions.get::<OriginalUri>() {
                    Some(OriginalUri(uri)) => uri.clone(),
                    None => parts.uri.clone(),
                };
                debug!("Anonymous request to {} redirected to login", uri);
                Err(login_redirect(&state.settings.login_url, &uri).into_response())
            }
        }
    }
}

/// `<login_url>?next=<path>`, with slashes in `next` left unescaped.
pub fn login_redirect(login_url: &str, uri: &Uri) -> Found {
    let next = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    let next = urlencoding::encode(next).replace("%2F", "/");

    Found::to(format!("{}?next={}", login_url, next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/new/", "/auth/login/?next=/new/")]
    #[case("/leo/1/edit/", "/auth/login/?next=/leo/1/edit/")]
    #[case("/follow/?page=2", "/auth/login/?next=/follow/%3Fpage%3D2")]
    fn test_login_redirect(#[case] path: &str, #[case] expected: &str) {
        let uri: Uri = path.parse().unwrap();
        let Found(location) = login_redirect("/auth/login/", &uri);
        assert_eq!(location, expected);
    }
}
