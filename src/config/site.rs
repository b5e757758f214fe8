//! Site configuration (site.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::BuildError;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub title_alt: String,
    pub title_short: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub language: String,
    pub logo: String,

    // URL
    /// Domain of the site, without trailing slash
    pub url: String,
    pub path_prefix: String,

    // Author
    pub author: String,
    pub minibio: String,

    // Open Graph
    pub og_site_name: String,
    pub og_language: String,
    pub google_analytics_id: String,

    // Manifest and progress colours
    pub theme_color: String,
    pub background_color: String,
    /// Theme used when rendering pages (`default` or `dark`)
    pub theme: String,

    #[serde(default)]
    pub social: SocialConfig,
    #[serde(default)]
    pub comments: CommentsConfig,
    #[serde(default)]
    pub newsletter: NewsletterConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub highlight: HighlightConfig,

    /// Whether the `/` -> `/blog` redirect is also performed in the browser
    pub client_side_redirects: bool,

    // Directory
    pub content_dir: String,
    pub public_dir: String,
    pub static_dir: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Vidlička".to_string(),
            title_alt: "Vidlička Tech Blog".to_string(),
            title_short: "Vidlička blog".to_string(),
            description: "This is where they post things!".to_string(),
            keywords: vec![
                "programming".to_string(),
                "developer".to_string(),
                "big data".to_string(),
            ],
            language: "en".to_string(),
            logo: "images/logo.svg".to_string(),

            url: "https://vidlicka.dev".to_string(),
            path_prefix: "/".to_string(),

            author: "Pavol Vidlička".to_string(),
            minibio: String::new(),

            og_site_name: "Pavol Vidlička's blog".to_string(),
            og_language: "en_US".to_string(),
            google_analytics_id: String::new(),

            theme_color: "#CC8B86".to_string(),
            background_color: "#CC8B86".to_string(),
            theme: "default".to_string(),

            social: SocialConfig::default(),
            comments: CommentsConfig::default(),
            newsletter: NewsletterConfig::default(),
            feed: FeedConfig::default(),
            highlight: HighlightConfig::default(),

            client_side_redirects: false,

            content_dir: "content".to_string(),
            public_dir: "public".to_string(),
            static_dir: "static".to_string(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: SiteConfig =
            serde_yaml::from_str(&content).map_err(|source| BuildError::Config {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(config)
    }

    /// Path prefix without trailing slash; empty when the site lives at `/`
    pub fn prefix(&self) -> &str {
        let prefix = self.path_prefix.trim_end_matches('/');
        if prefix.is_empty() {
            ""
        } else {
            prefix
        }
    }

    /// Absolute base URL of the site, including the path prefix
    pub fn site_url(&self) -> String {
        let prefix = self.prefix();
        if prefix.starts_with('/') || prefix.is_empty() {
            format!("{}{}", self.url.trim_end_matches('/'), prefix)
        } else {
            format!("{}/{}", self.url.trim_end_matches('/'), prefix)
        }
    }
}

/// Social links shown in the footer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialConfig {
    pub github: String,
    pub linkedin: String,
    pub twitter: String,
    pub email: String,
    pub fb_app_id: String,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            github: "https://github.com/pvid/".to_string(),
            linkedin: "https://www.linkedin.com/in/pavol-vidlicka".to_string(),
            twitter: String::new(),
            email: "pavol.vidlicka@gmail.com".to_string(),
            fb_app_id: String::new(),
        }
    }
}

/// utterances comment thread settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentsConfig {
    pub repo: String,
    pub branch: String,
    #[serde(rename = "issue-term")]
    pub issue_term: String,
    pub label: String,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            repo: "pvid/vidlicka-blog-comments".to_string(),
            branch: "master".to_string(),
            issue_term: "url".to_string(),
            label: "comments".to_string(),
        }
    }
}

impl CommentsConfig {
    /// Comments are only embedded when a repository is configured
    pub fn enabled(&self) -> bool {
        !self.repo.trim().is_empty()
    }
}

/// Newsletter signup settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsletterConfig {
    pub url: String,
}

/// RSS feed settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Output path, relative to the public directory
    pub path: String,
    pub title: String,
    pub limit: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            path: "/rss.xml".to_string(),
            title: "Vidlička Blog RSS Feed".to_string(),
            limit: 1000,
        }
    }
}

/// Code block highlighting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// syntect theme name
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "InspiredGitHub".to_string(),
            line_number: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "Vidlička");
        assert_eq!(config.comments.branch, "master");
        assert_eq!(config.feed.path, "/rss.xml");
        assert_eq!(config.feed.limit, 1000);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
url: https://example.com/
comments:
  repo: me/comments
  issue-term: pathname
newsletter:
  url: https://tinyletter.com/me
feed:
  title: My Feed
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.comments.repo, "me/comments");
        assert_eq!(config.comments.issue_term, "pathname");
        // Unset nested fields keep their defaults
        assert_eq!(config.comments.label, "comments");
        assert_eq!(config.newsletter.url, "https://tinyletter.com/me");
        assert_eq!(config.feed.title, "My Feed");
        assert!(!config.highlight.line_number);
        assert_eq!(config.feed.path, "/rss.xml");
    }

    #[test]
    fn test_site_url_with_prefix() {
        let mut config = SiteConfig::default();
        config.url = "https://example.com/".to_string();
        assert_eq!(config.site_url(), "https://example.com");

        config.path_prefix = "/blog".to_string();
        assert_eq!(config.site_url(), "https://example.com/blog");

        config.path_prefix = "notes/".to_string();
        assert_eq!(config.site_url(), "https://example.com/notes");
    }

    #[test]
    fn test_load_invalid_config_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.yml");
        fs::write(&path, "title: [unterminated").unwrap();

        let err = SiteConfig::load(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::Config { .. })
        ));
    }
}
