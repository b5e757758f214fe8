//! Content items and the collections they belong to

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The logical grouping of a content item, fixed by its source directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// Standalone site pages (`content/pages`)
    Pages,
    /// Blog posts (`content/blog`)
    Blog,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Pages, Collection::Blog];

    /// Name of the source directory under the content dir
    pub fn dir_name(self) -> &'static str {
        match self {
            Collection::Pages => "pages",
            Collection::Blog => "blog",
        }
    }

    /// Prefix prepended to slugs of this collection
    pub fn url_prefix(self) -> Option<&'static str> {
        match self {
            Collection::Pages => None,
            Collection::Blog => Some("blog"),
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for Collection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "page" | "pages" => Ok(Collection::Pages),
            "blog" | "post" | "posts" => Ok(Collection::Blog),
            _ => anyhow::bail!("Unknown collection: {}. Available: pages, blog", s),
        }
    }
}

/// Site-relative URL of an item: `blog/<slug>` for posts, `<slug>` for pages
pub fn derive_relative_url(collection: Collection, slug: &str) -> String {
    let slug = slug.trim_matches('/');
    match collection.url_prefix() {
        Some(prefix) if slug.is_empty() => prefix.to_string(),
        Some(prefix) => format!("{}/{}", prefix, slug),
        None => slug.to_string(),
    }
}

/// A single markdown document: one page or one blog post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub title: String,

    /// URL-friendly name, without collection prefix
    pub slug: String,

    pub date: DateTime<Local>,

    pub description: Option<String>,

    pub published: bool,

    /// Paths that permanently redirect to this item
    pub redirects: Vec<String>,

    /// Banner image path
    pub banner: Option<String>,

    pub keywords: Vec<String>,

    pub author: Option<String>,

    pub collection: Collection,

    /// Derived from collection and slug
    pub relative_url: String,

    pub is_blog_post: bool,

    /// Rendered HTML body
    pub content: String,

    /// Plain-text summary of the body
    pub excerpt: String,

    /// Source file path (relative to the content dir)
    pub source: String,
}

impl ContentItem {
    /// Create an item with derived fields filled in
    pub fn new(
        title: String,
        slug: String,
        date: DateTime<Local>,
        collection: Collection,
        source: String,
    ) -> Self {
        let relative_url = derive_relative_url(collection, &slug);
        Self {
            title,
            slug,
            date,
            description: None,
            published: true,
            redirects: Vec::new(),
            banner: None,
            keywords: Vec::new(),
            author: None,
            collection,
            relative_url,
            is_blog_post: collection == Collection::Blog,
            content: String::new(),
            excerpt: String::new(),
            source,
        }
    }

    /// Root-relative path, e.g. `/blog/my-post`
    pub fn path(&self) -> String {
        format!("/{}", self.relative_url)
    }

    /// Description when given, excerpt otherwise
    pub fn summary(&self) -> &str {
        self.description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(&self.excerpt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date() -> DateTime<Local> {
        Local.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_blog_items_are_prefixed() {
        let item = ContentItem::new(
            "Hello".into(),
            "hello".into(),
            date(),
            Collection::Blog,
            "blog/hello.md".into(),
        );
        assert_eq!(item.relative_url, "blog/hello");
        assert!(item.is_blog_post);
        assert_eq!(item.path(), "/blog/hello");
    }

    #[test]
    fn test_pages_are_not_prefixed() {
        let item = ContentItem::new(
            "About".into(),
            "about".into(),
            date(),
            Collection::Pages,
            "pages/about.md".into(),
        );
        assert_eq!(item.relative_url, "about");
        assert!(!item.is_blog_post);
    }

    #[test]
    fn test_slug_slashes_are_trimmed() {
        assert_eq!(derive_relative_url(Collection::Blog, "/post/"), "blog/post");
        assert_eq!(derive_relative_url(Collection::Pages, "/uses/"), "uses");
        assert_eq!(derive_relative_url(Collection::Blog, "/"), "blog");
    }

    #[test]
    fn test_collection_from_str() {
        assert_eq!("blog".parse::<Collection>().unwrap(), Collection::Blog);
        assert_eq!("pages".parse::<Collection>().unwrap(), Collection::Pages);
        assert!("drafts".parse::<Collection>().is_err());
    }

    #[test]
    fn test_summary_prefers_description() {
        let mut item = ContentItem::new(
            "Hello".into(),
            "hello".into(),
            date(),
            Collection::Blog,
            "blog/hello.md".into(),
        );
        item.excerpt = "From the body".into();
        assert_eq!(item.summary(), "From the body");
        item.description = Some("Hand written".into());
        assert_eq!(item.summary(), "Hand written");
    }
}
