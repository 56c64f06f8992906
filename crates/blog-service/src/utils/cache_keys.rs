pub struct CacheKeys;

impl CacheKeys {
    // Cached rendered pages
    pub const PAGE_PREFIX: &'static str = "page:";
    pub const PAGE_PATTERN: &'static str = "page:*";

    pub fn page_key(uri: &str) -> String {
        format!("{}{}", Self::PAGE_PREFIX, uri)
    }
}
