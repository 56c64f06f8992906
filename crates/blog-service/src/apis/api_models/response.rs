use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    models::{
        comments::CommentResponse, groups::GroupResponse, posts::PostResponse,
        users::UserResponse,
    },
    utils::paginator::Page,
};

use super::request::FormErrors;

pub const INDEX_TEMPLATE: &str = "index.html";
pub const GROUP_TEMPLATE: &str = "group.html";
pub const FOLLOW_TEMPLATE: &str = "follow.html";
pub const PROFILE_TEMPLATE: &str = "profile.html";
pub const POST_TEMPLATE: &str = "post.html";
pub const POST_FORM_TEMPLATE: &str = "new.html";

/// A paginated post listing: the global, group and followed-authors feeds.
#[derive(Serialize, ToSchema, Debug)]
pub struct FeedView {
    pub template: String,
    pub page: Page<PostResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupResponse>,
}

impl FeedView {
    pub fn new(template: &str, page: Page<PostResponse>) -> Self {
        FeedView {
            template: template.to_string(),
            page,
            group: None,
        }
    }

    pub fn with_group(mut self, group: GroupResponse) -> Self {
        self.group = Some(group);
        self
    }
}

#[derive(Serialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub template: String,
    pub author: UserResponse,
    pub page: Page<PostResponse>,
    pub count: i64,
    pub following: bool,
    pub followers_count: i64,
    pub following_count: i64,
}

/// The empty comment form shown under a post.
#[derive(Serialize, ToSchema, Debug, Default)]
pub struct CommentFormView {
    pub text: String,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct PostView {
    pub template: String,
    pub post: PostResponse,
    pub author: UserResponse,
    pub count: i64,
    pub comments: Vec<CommentResponse>,
    pub form: CommentFormView,
}

/// Current values of the post form fields.
#[derive(Serialize, ToSchema, Debug, Default)]
pub struct PostFormValues {
    pub text: String,
    pub group: Option<i64>,
    pub image: Option<String>,
}

impl From<&PostResponse> for PostFormValues {
    fn from(post: &PostResponse) -> Self {
        PostFormValues {
            text: post.text.clone(),
            group: post.group.as_ref().map(|g| g.id),
            image: post.image.clone(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PostFormView {
    pub template: String,
    pub new_post: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<i64>,
    pub form: PostFormValues,
    pub errors: FormErrors,
    pub groups: Vec<GroupResponse>,
}

impl PostFormView {
    pub fn create(groups: Vec<GroupResponse>) -> Self {
        PostFormView {
            template: POST_FORM_TEMPLATE.to_string(),
            new_post: true,
            post_id: None,
            form: PostFormValues::default(),
            errors: FormErrors::default(),
            groups,
        }
    }

    pub fn edit(post: &PostResponse, groups: Vec<GroupResponse>) -> Self {
        PostFormView {
            template: POST_FORM_TEMPLATE.to_string(),
            new_post: false,
            post_id: Some(post.id),
            form: PostFormValues::from(post),
            errors: FormErrors::default(),
            groups,
        }
    }

    pub fn with_errors(mut self, form: PostFormValues, errors: FormErrors) -> Self {
        self.form = form;
        self.errors = errors;
        self
    }
}

/// `302 Found` to the given location.
#[derive(Debug)]
pub struct Found(pub String);

impl Found {
    pub fn to(location: impl Into<String>) -> Self {
        Found(location.into())
    }
}

impl IntoResponse for Found {
    fn into_response(self) -> Response {
        (StatusCode::FOUND, [(header::LOCATION, self.0)]).into_response()
    }
}

pub fn profile_path(username: &str) -> String {
    format!("/{}/", urlencoding::encode(username))
}

pub fn post_path(username: &str, post_id: i64) -> String {
    format!("/{}/{}/", urlencoding::encode(username), post_id)
}
