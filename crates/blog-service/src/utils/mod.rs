pub mod cache_keys;
pub mod errors;
pub mod paginator;
