//! Social share links

use serde::Serialize;

use super::url::encode_query_value;

/// Links rendered by the share bar under a blog post
#[derive(Debug, Clone, Serialize)]
pub struct ShareLinks {
    /// The URL being shared, for the copy-link button
    pub url: String,
    pub twitter: String,
    pub facebook: String,
}

impl ShareLinks {
    pub fn new(url: &str, title: &str) -> Self {
        let encoded_url = encode_query_value(url);
        Self {
            url: url.to_string(),
            twitter: format!(
                "https://twitter.com/share?url={}&text={}",
                encoded_url,
                encode_query_value(title)
            ),
            facebook: format!(
                "https://www.facebook.com/sharer/sharer.php?u={}&quote={}",
                encoded_url,
                encode_query_value(title)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_links() {
        let links = ShareLinks::new("https://vidlicka.dev/blog/hi", "Hi & bye");
        assert_eq!(links.url, "https://vidlicka.dev/blog/hi");
        assert_eq!(
            links.twitter,
            "https://twitter.com/share?url=https%3A%2F%2Fvidlicka.dev%2Fblog%2Fhi&text=Hi%20%26%20bye"
        );
        assert!(links
            .facebook
            .starts_with("https://www.facebook.com/sharer/sharer.php?u=https%3A%2F%2F"));
    }
}
