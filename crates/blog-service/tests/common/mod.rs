#![allow(dead_code)]

use std::{io::Cursor, path::PathBuf, sync::Arc};

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use blog_service::{
    app,
    models::{
        groups::{Group, NewGroup},
        posts::{NewPost, Post, PostFilter},
        users::{NewUser, User},
    },
    repositories::{
        memory::MemoryStore, CommentRepository, GroupRepository, PostRepository, Repositories,
        UserRepository,
    },
    services::cache_service::{MemoryPageCache, PageCache},
    settings::Settings,
    AppState,
};
use image::{DynamicImage, ImageFormat, RgbImage};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const BOUNDARY: &str = "----blog-service-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub store: Arc<MemoryStore>,
    pub media_root: PathBuf,
}

/// A logged-in user and the bearer token of their session.
pub struct TestUser {
    pub user: User,
    pub token: String,
}

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        data: Vec<u8>,
    },
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_settings(Settings::default()).await
    }

    /// Builds the app on `settings`, with a fresh media root.
    pub async fn with_settings(settings: Settings) -> Self {
        let media_root = std::env::temp_dir().join(format!("blog-test-media-{}", Uuid::new_v4()));
        let settings = Settings {
            media_root: media_root.to_string_lossy().to_string(),
            ..settings
        };
        let store = Arc::new(MemoryStore::new());
        let page_cache: Arc<dyn PageCache> = Arc::new(MemoryPageCache::new());
        let state = Arc::new(AppState::new(
            settings,
            Repositories::memory(store.clone()),
            page_cache,
        ));

        TestApp {
            router: app(state.clone()),
            state,
            store,
            media_root,
        }
    }

    pub async fn create_user(&self, username: &str) -> TestUser {
        let user = self
            .store
            .create_user(NewUser::with_username(username))
            .await
            .unwrap();
        let session = self
            .store
            .create_session(user.id, chrono::Duration::hours(1))
            .await
            .unwrap();

        TestUser {
            user,
            token: session.token.to_string(),
        }
    }

    pub async fn create_group(&self, title: &str, slug: &str) -> Group {
        self.store
            .create_group(NewGroup {
                title: title.to_string(),
                slug: slug.to_string(),
                description: "Тестовое описание".to_string(),
            })
            .await
            .unwrap()
    }

    pub async fn create_post(&self, author: &User, text: &str, group_id: Option<i64>) -> Post {
        self.store
            .create_post(NewPost {
                text: text.to_string(),
                author_id: author.id,
                group_id,
                image: None,
            })
            .await
            .unwrap()
    }

    pub async fn post_count(&self) -> i64 {
        self.store.count_posts(&PostFilter::All).await.unwrap()
    }

    pub async fn find_post(&self, id: i64) -> Post {
        self.store.find_post(id).await.unwrap().unwrap()
    }

    pub async fn comment_count(&self, post_id: i64) -> usize {
        self.store.list_comments(post_id).await.unwrap().len()
    }

    pub async fn clear_cache(&self) {
        self.state.page_cache.clear().await.unwrap();
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, token: Option<&str>, body: &str) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn post_multipart(
        &self,
        uri: &str,
        token: Option<&str>,
        parts: Vec<Part<'_>>,
    ) -> Response {
        let mut builder = Request::builder().method("POST").uri(uri).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(multipart_body(parts))).unwrap())
            .await
    }
}

pub fn multipart_body(parts: Vec<Part<'_>>) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                file_name,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(&data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn small_png() -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::new_rgb8(2, 1)
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

/// A valid PNG of incompressible noise, well over two megabytes.
pub fn large_png() -> Vec<u8> {
    let (width, height) = (1024, 1024);
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let pixels: Vec<u8> = (0..width * height * 3)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 24) as u8
        })
        .collect();

    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::from_raw(width, height, pixels).unwrap())
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location(response: &Response) -> &str {
    assert_eq!(response.status(), StatusCode::FOUND);
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap()
}

pub fn post_texts(view: &Value) -> Vec<String> {
    view["page"]["objectList"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["text"].as_str().unwrap().to_string())
        .collect()
}
