//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::SiteConfig;

/// Characters left alone when encoding a query parameter value
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Generate a URL with the path prefix
///
/// # Examples
/// ```ignore
/// url_for(&config, "/css/style.css") // -> "/blog/css/style.css"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    if is_external(path) {
        return path.to_string();
    }

    let prefix = config.prefix().trim_start_matches('/');
    let path = path.trim_start_matches('/');

    match (prefix.is_empty(), path.is_empty()) {
        (true, _) => format!("/{}", path),
        (false, true) => format!("/{}/", prefix),
        (false, false) => format!("/{}/{}", prefix, path),
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/about") // -> "https://example.com/blog/about"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    if is_external(path) {
        return path.to_string();
    }
    format!("{}{}", config.url.trim_end_matches('/'), url_for(config, path))
}

/// Percent-encode a value for use in a query string
pub fn encode_query_value(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

fn is_external(path: &str) -> bool {
    path.starts_with("http://")
        || path.starts_with("https://")
        || path.starts_with("//")
        || path.starts_with("mailto:")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.url = "https://example.com".to_string();
        config.path_prefix = "/blog/".to_string();
        config
    }

    #[test]
    fn test_url_for() {
        let config = test_config();
        assert_eq!(url_for(&config, "/css/style.css"), "/blog/css/style.css");
        assert_eq!(url_for(&config, "about/"), "/blog/about/");
        assert_eq!(url_for(&config, "/"), "/blog/");
        assert_eq!(url_for(&config, "https://x.dev/a"), "https://x.dev/a");
    }

    #[test]
    fn test_url_for_without_prefix() {
        let config = SiteConfig::default();
        assert_eq!(url_for(&config, "blog/post"), "/blog/post");
        assert_eq!(url_for(&config, ""), "/");
    }

    #[test]
    fn test_full_url_for() {
        let config = test_config();
        assert_eq!(
            full_url_for(&config, "/about"),
            "https://example.com/blog/about"
        );
    }

    #[test]
    fn test_encode_query_value() {
        assert_eq!(
            encode_query_value("https://vidlicka.dev/blog/a b"),
            "https%3A%2F%2Fvidlicka.dev%2Fblog%2Fa%20b"
        );
    }
}
