use config::{Config, Environment};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub environment: Option<String>,
    /// Without a database URL the service runs on the in-memory store.
    pub database_url: Option<String>,
    /// Without a Redis URL pages are cached in-process.
    pub redis_url: Option<String>,
    pub port: Option<u16>,
    #[serde(default = "default_media_root")]
    pub media_root: String,
    #[serde(default = "default_login_url")]
    pub login_url: String,
    #[serde(default = "default_page_cache_ttl")]
    pub page_cache_ttl: u64,
    #[serde(default = "default_posts_per_page")]
    pub posts_per_page: i64,
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
    /// Body limit for the post forms, which carry the image upload.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_media_root() -> String {
    "media".to_string()
}

fn default_login_url() -> String {
    "/auth/login/".to_string()
}

fn default_page_cache_ttl() -> u64 {
    20
}

fn default_posts_per_page() -> i64 {
    10
}

fn default_session_ttl_hours() -> i64 {
    24
}

fn default_max_upload_bytes() -> usize {
    16 * 1024 * 1024
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            environment: None,
            database_url: None,
            redis_url: None,
            port: None,
            media_root: default_media_root(),
            login_url: default_login_url(),
            page_cache_ttl: default_page_cache_ttl(),
            posts_per_page: default_posts_per_page(),
            session_ttl_hours: default_session_ttl_hours(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

pub fn load_settings() -> Result<Settings, config::ConfigError> {
    let settings = Config::builder();
    let settings = settings.add_source(Environment::default().try_parsing(true));
    settings.build()?.try_deserialize()
}
