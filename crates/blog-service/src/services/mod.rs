pub mod cache_service;
pub mod group_service;
pub mod media_service;
pub mod post_service;
pub mod profile_service;
pub mod redis_service;
pub mod user_service;
