use std::sync::Arc;

use crate::{
    models::groups::Group, repositories::GroupRepository,
    utils::errors::app_error::AppError,
};

pub struct GroupService {
    repository: Arc<dyn GroupRepository>,
}

impl GroupService {
    pub fn new(repository: Arc<dyn GroupRepository>) -> Self {
        Self { repository }
    }

    pub async fn get_group_by_slug(&self, slug: &str) -> Result<Group, AppError> {
        self.repository
            .find_group_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group {} not found", slug)))
    }

    /// The choices offered by the post form.
    pub async fn list_groups(&self) -> Result<Vec<Group>, AppError> {
        self.repository
            .list_groups()
            .await
            .map_err(AppError::DatabaseError)
    }
}
