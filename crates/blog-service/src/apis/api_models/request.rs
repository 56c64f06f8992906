use std::collections::BTreeMap;

use axum::extract::Multipart;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{models::groups::Group, utils::errors::app_error::AppError};

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const INVALID_CHOICE_MESSAGE: &str =
    "Select a valid choice. That choice is not one of the available choices.";
pub const INVALID_IMAGE_MESSAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";
pub const CONTRADICTION_MESSAGE: &str =
    "Please either submit a file or check the clear checkbox, not both.";
pub const MAX_FILE_NAME_LENGTH: usize = 100;

fn file_name_too_long_message(length: usize) -> String {
    format!(
        "Ensure this filename has at most {} characters (it has {}).",
        MAX_FILE_NAME_LENGTH, length
    )
}

/// Field name to messages, in field order.
#[derive(Serialize, ToSchema, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

#[derive(Clone, Debug)]
pub struct ImageUpload {
    pub file_name: String,
    pub data: Bytes,
}

/// The post create/edit form. Only `text`, `group`, `image` and `image-clear`
/// are read; everything else in the submission is ignored.
#[derive(Clone, Debug, Default)]
pub struct PostForm {
    pub text: String,
    pub group: Option<String>,
    pub image: Option<ImageUpload>,
    pub image_clear: bool,
}

/// Multipart layout of the post form as published in the API docs.
#[derive(Deserialize, ToSchema, Debug)]
pub struct PostUpload {
    pub text: String,
    pub group: Option<i64>,
    pub image: Option<String>,
    #[serde(rename = "image-clear")]
    pub image_clear: Option<bool>,
}

#[derive(Clone, Debug)]
pub struct CleanedPost {
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<ImageUpload>,
    pub image_clear: bool,
}

impl PostForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = PostForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "text" => form.text = field.text().await?,
                "group" => form.group = Some(field.text().await?),
                "image" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let data = field.bytes().await?;
                    // Browsers send an empty part when no file was picked.
                    if !file_name.is_empty() || !data.is_empty() {
                        form.image = Some(ImageUpload {
                            file_name,
                            data,
                        });
                    }
                }
                "image-clear" => {
                    let value = field.text().await?;
                    form.image_clear = !matches!(value.trim(), "" | "false" | "0");
                }
                _ => {}
            }
        }

        Ok(form)
    }

    /// Validates the submission against the available group choices.
    pub fn clean(self, groups: &[Group]) -> Result<CleanedPost, FormErrors> {
        let mut errors = FormErrors::default();

        let text = self.text.trim().to_string();
        if text.is_empty() {
            errors.add("text", REQUIRED_MESSAGE);
        }

        let group_id = match self.group.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match raw.parse::<i64>() {
                Ok(id) if groups.iter().any(|g| g.id == id) => Some(id),
                _ => {
                    errors.add("group", INVALID_CHOICE_MESSAGE);
                    None
                }
            },
        };

        if let Some(upload) = &self.image {
            let name_length = upload.file_name.chars().count();
            if name_length > MAX_FILE_NAME_LENGTH {
                errors.add("image", &file_name_too_long_message(name_length));
            } else if image::load_from_memory(&upload.data).is_err() {
                errors.add("image", INVALID_IMAGE_MESSAGE);
            } else if self.image_clear {
                errors.add("image", CONTRADICTION_MESSAGE);
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(CleanedPost {
            text,
            group_id,
            image: self.image,
            image_clear: self.image_clear,
        })
    }
}

/// The comment form. Only `text` is read.
#[derive(Deserialize, ToSchema, Clone, Debug, Default)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

impl CommentForm {
    pub fn clean(self) -> Result<String, FormErrors> {
        let text = self.text.trim().to_string();
        if text.is_empty() {
            let mut errors = FormErrors::default();
            errors.add("text", REQUIRED_MESSAGE);
            return Err(errors);
        }
        Ok(text)
    }
}
