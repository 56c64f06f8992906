use std::{io::ErrorKind, path::PathBuf};

use tokio::{fs::OpenOptions, io::AsyncWriteExt};
use tracing::debug;
use uuid::Uuid;

use crate::apis::api_models::request::ImageUpload;

const POST_IMAGES_PATH: &str = "posts";
// Stored references live in a VARCHAR(100) column.
const MAX_REFERENCE_LENGTH: usize = 100;
const MAX_EXTENSION_LENGTH: usize = 10;
const SUFFIX_LENGTH: usize = 7;

/// Stores uploaded post images on the local file system.
pub struct MediaService {
    media_root: PathBuf,
}

impl MediaService {
    pub fn new(media_root: impl Into<PathBuf>) -> Self {
        Self {
            media_root: media_root.into(),
        }
    }

    /// Writes the upload under `<media_root>/posts/` and returns its
    /// media-relative reference, e.g. `posts/small.png`. A taken name gets a
    /// random suffix; the file is only ever created, never overwritten.
    pub async fn save_post_image(&self, upload: &ImageUpload) -> Result<String, std::io::Error> {
        let dir = self.media_root.join(POST_IMAGES_PATH);
        tokio::fs::create_dir_all(&dir).await?;

        let name = StoredName::parse(&upload.file_name);
        let mut file_name = name.render(None);
        let mut file = loop {
            let created = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(dir.join(&file_name))
                .await;

            match created {
                Ok(file) => break file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    file_name = name.render(Some(&random_suffix()));
                }
                Err(e) => return Err(e),
            }
        };

        file.write_all(&upload.data).await?;
        file.flush().await?;
        debug!("Stored post image {}", file_name);

        Ok(format!("{}/{}", POST_IMAGES_PATH, file_name))
    }
}

/// A sanitized upload name: the base name only, with anything outside
/// `[A-Za-z0-9._-]` replaced.
#[derive(Debug)]
struct StoredName {
    stem: String,
    extension: Option<String>,
}

impl StoredName {
    fn parse(raw: &str) -> Self {
        let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
        let cleaned: String = base
            .chars()
            .map(|c| match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => c,
                _ => '_',
            })
            .collect();
        let cleaned = cleaned.trim_matches('.');

        let (stem, extension) = match cleaned.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
            _ => (cleaned, None),
        };
        let stem = if stem.is_empty() { "image" } else { stem };
        let extension = extension
            .filter(|ext| !ext.is_empty())
            .map(|ext| ext.chars().take(MAX_EXTENSION_LENGTH).collect::<String>())
            .map(|ext| ext.to_lowercase());

        Self {
            stem: stem.to_string(),
            extension,
        }
    }

    /// Renders the file name, shortening the stem so that the whole
    /// `posts/<name>` reference fits its column.
    fn render(&self, suffix: Option<&str>) -> String {
        let tail = match &self.extension {
            Some(ext) => format!(".{}", ext),
            None => String::new(),
        };
        let suffix = match suffix {
            Some(suffix) => format!("_{}", suffix),
            None => String::new(),
        };
        // Sanitized names are ASCII, so byte and char lengths agree.
        let budget = MAX_REFERENCE_LENGTH - POST_IMAGES_PATH.len() - 1;
        let room = budget - tail.len() - suffix.len();
        let stem: String = self.stem.chars().take(room).collect();

        format!("{}{}{}", stem, suffix, tail)
    }
}

fn random_suffix() -> String {
    Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(SUFFIX_LENGTH)
        .collect()
}
