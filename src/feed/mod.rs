//! RSS 2.0 feed generation

use anyhow::{anyhow, Result};
use rss::{validation::Validate, ChannelBuilder, GuidBuilder, ItemBuilder};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::SiteConfig;
use crate::content::ContentItem;

/// Build the feed XML for the given items.
///
/// Only published items are included, newest first, capped at the
/// configured limit. Each entry's guid is its absolute URL.
pub fn build_rss(items: &[ContentItem], config: &SiteConfig) -> Result<String> {
    let mut published: Vec<&ContentItem> = items.iter().filter(|i| i.published).collect();
    published.sort_by(|a, b| b.date.cmp(&a.date));

    let entries: Vec<rss::Item> = published
        .into_iter()
        .take(config.feed.limit)
        .map(|item| item_to_rss(item, config))
        .collect();

    let channel = ChannelBuilder::default()
        .title(config.feed.title.clone())
        .link(format!("{}/", config.site_url()))
        .description(config.description.clone())
        .language(Some(config.language.clone()))
        .generator(Some("vidlicka".to_string()))
        .items(entries)
        .build();

    channel
        .validate()
        .map_err(|e| anyhow!("RSS validation failed: {e}"))?;
    Ok(channel.to_string())
}

/// Write the feed to its configured path under the public directory
pub fn write_rss(items: &[ContentItem], config: &SiteConfig, public_dir: &Path) -> Result<PathBuf> {
    let xml = build_rss(items, config)?;
    let output_path = public_dir.join(config.feed.path.trim_start_matches('/'));

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output_path, xml)?;

    tracing::info!("Generated {}", config.feed.path.trim_start_matches('/'));
    Ok(output_path)
}

/// Absolute URL of an item: site URL, a slash, then its relative URL
pub fn item_url(item: &ContentItem, config: &SiteConfig) -> String {
    format!("{}/{}", config.site_url(), item.relative_url)
}

fn item_to_rss(item: &ContentItem, config: &SiteConfig) -> rss::Item {
    let url = item_url(item, config);

    ItemBuilder::default()
        .title(Some(item.title.clone()))
        .link(Some(url.clone()))
        .guid(Some(GuidBuilder::default().permalink(true).value(url).build()))
        .description(Some(item.excerpt.clone()))
        .pub_date(Some(item.date.to_rfc2822()))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Collection;
    use chrono::{Local, TimeZone};

    fn item(slug: &str, day: u32, published: bool) -> ContentItem {
        let mut item = ContentItem::new(
            format!("Post {}", slug),
            slug.to_string(),
            Local.with_ymd_and_hms(2021, 3, day, 9, 0, 0).unwrap(),
            Collection::Blog,
            format!("blog/{}.md", slug),
        );
        item.published = published;
        item.excerpt = format!("About {}", slug);
        item
    }

    fn parse(xml: &str) -> rss::Channel {
        rss::Channel::read_from(xml.as_bytes()).unwrap()
    }

    #[test]
    fn test_feed_contains_only_published_items_newest_first() {
        let items = vec![
            item("first", 1, true),
            item("hidden", 15, false),
            item("second", 10, true),
        ];
        let channel = parse(&build_rss(&items, &SiteConfig::default()).unwrap());

        let titles: Vec<_> = channel.items().iter().map(|i| i.title().unwrap()).collect();
        assert_eq!(titles, vec!["Post second", "Post first"]);
        assert_eq!(channel.title(), "Vidlička Blog RSS Feed");
    }

    #[test]
    fn test_guid_equals_url() {
        let items = vec![item("hello", 1, true)];
        let channel = parse(&build_rss(&items, &SiteConfig::default()).unwrap());

        let entry = &channel.items()[0];
        assert_eq!(entry.link(), Some("https://vidlicka.dev/blog/hello"));
        let guid = entry.guid().unwrap();
        assert_eq!(guid.value(), "https://vidlicka.dev/blog/hello");
        assert!(guid.is_permalink());
        assert_eq!(entry.description(), Some("About hello"));
    }

    #[test]
    fn test_feed_limit() {
        let mut config = SiteConfig::default();
        config.feed.limit = 1;
        let items = vec![item("a", 1, true), item("b", 2, true)];
        let channel = parse(&build_rss(&items, &config).unwrap());
        assert_eq!(channel.items().len(), 1);
        assert_eq!(channel.items()[0].title(), Some("Post b"));
    }

    #[test]
    fn test_write_rss_to_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SiteConfig::default();
        config.feed.path = "/feeds/rss.xml".to_string();

        let path = write_rss(&[item("a", 1, true)], &config, dir.path()).unwrap();
        assert_eq!(path, dir.path().join("feeds/rss.xml"));
        assert!(fs::read_to_string(path).unwrap().contains("<rss"));
    }
}
