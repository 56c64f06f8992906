use std::sync::Arc;

use tracing::{debug, info};

use crate::{models::users::User, repositories::FollowRepository, utils::errors::app_error::AppError};

/// Follow counters shown next to a profile.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FollowStats {
    pub followers: i64,
    pub following: i64,
}

/// Owns the follow graph.
#[derive(Clone)]
pub struct ProfileService {
    follow_repository: Arc<dyn FollowRepository>,
}

impl ProfileService {
    pub fn new(follow_repository: Arc<dyn FollowRepository>) -> Self {
        ProfileService { follow_repository }
    }

    /// Get-or-create of the `(user, author)` edge. Following oneself does nothing.
    pub async fn follow(&self, user: &User, author: &User) -> Result<bool, AppError> {
        if user.id == author.id {
            debug!("User {} tried to follow themselves", user.username);
            return Ok(false);
        }

        let created = self
            .follow_repository
            .create_follow(user.id, author.id)
            .await?;
        if created {
            info!("User {} now follows {}", user.username, author.username);
        }

        Ok(created)
    }

    pub async fn unfollow(&self, user: &User, author: &User) -> Result<u64, AppError> {
        let removed = self
            .follow_repository
            .delete_follow(user.id, author.id)
            .await?;
        if removed > 0 {
            info!("User {} unfollowed {}", user.username, author.username);
        }

        Ok(removed)
    }

    /// Anonymous viewers never follow anyone.
    pub async fn is_following(
        &self,
        viewer: Option<&User>,
        author: &User,
    ) -> Result<bool, AppError> {
        match viewer {
            Some(viewer) => Ok(self
                .follow_repository
                .is_following(viewer.id, author.id)
                .await?),
            None => Ok(false),
        }
    }

    pub async fn follow_stats(&self, user: &User) -> Result<FollowStats, AppError> {
        let followers = self.follow_repository.count_followers(user.id).await?;
        let following = self.follow_repository.count_following(user.id).await?;

        Ok(FollowStats {
            followers,
            following,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::NewUser;
    use crate::repositories::{memory::MemoryStore, UserRepository};

    #[tokio::test]
    async fn test_self_follow_creates_nothing() {
        let store = Arc::new(MemoryStore::new());
        let service = ProfileService::new(store.clone());
        let user = store
            .create_user(NewUser::with_username("narcissus"))
            .await
            .unwrap();

        assert!(!service.follow(&user, &user).await.unwrap());
        assert_eq!(service.follow_stats(&user).await.unwrap(), FollowStats::default());
        assert!(!service.is_following(Some(&user), &user).await.unwrap());
    }

    #[tokio::test]
    async fn test_anonymous_viewer_is_not_following() {
        let store = Arc::new(MemoryStore::new());
        let service = ProfileService::new(store.clone());
        let author = store
            .create_user(NewUser::with_username("author"))
            .await
            .unwrap();

        assert!(!service.is_following(None, &author).await.unwrap());
    }
}
