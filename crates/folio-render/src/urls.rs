//! Gateway URLs for file hashes.

/// Thumbnail width requested for icons.
pub const THUMBNAIL_WIDTH: u32 = 100;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UrlBuilder {
    gateway: String,
}

impl UrlBuilder {
    pub fn new(gateway: impl Into<String>) -> Self {
        let gateway = gateway.into();
        Self { gateway: gateway.trim_end_matches('/').to_owned() }
    }

    pub fn image(&self, hash: &str) -> String {
        format!("{}/image/{hash}", self.gateway)
    }

    pub fn thumbnail(&self, hash: &str) -> String {
        format!("{}/image/{hash}?width={THUMBNAIL_WIDTH}", self.gateway)
    }

    pub fn file(&self, hash: &str) -> String {
        format!("{}/file/{hash}", self.gateway)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_strip_trailing_slash() {
        let urls = UrlBuilder::new("http://gw.local/");
        assert_eq!(urls.image("abc"), "http://gw.local/image/abc");
        assert_eq!(urls.thumbnail("abc"), "http://gw.local/image/abc?width=100");
        assert_eq!(urls.file("abc"), "http://gw.local/file/abc");
    }
}
