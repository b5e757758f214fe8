//! Content loader - loads pages and blog posts from the content directory

use anyhow::Result;
use chrono::Local;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use super::{Collection, ContentItem, FrontMatter, MarkdownRenderer};
use crate::error::{BuildError, ContentError};
use crate::Site;

/// Length of the plain-text excerpt, in characters
pub const EXCERPT_LENGTH: usize = 250;

/// Loads content from the content directory
pub struct ContentLoader<'a> {
    site: &'a Site,
    renderer: MarkdownRenderer,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(site: &'a Site) -> Self {
        Self {
            site,
            renderer: MarkdownRenderer::with_options(
                &site.config.highlight.theme,
                site.config.highlight.line_number,
            ),
        }
    }

    /// Load both collections.
    ///
    /// Any file that fails to load aborts the whole load; the error lists
    /// every failing file.
    pub fn load_all(&self) -> Result<Vec<ContentItem>> {
        let mut items = Vec::new();
        let mut errors = Vec::new();

        for collection in Collection::ALL {
            let (loaded, failed) = self.load_collection(collection);
            tracing::debug!(
                "Loaded {} items from {} ({} failed)",
                loaded.len(),
                collection,
                failed.len()
            );
            items.extend(loaded);
            errors.extend(failed);
        }

        if !errors.is_empty() {
            return Err(BuildError::Query(errors).into());
        }

        Ok(items)
    }

    /// Load every markdown file of a single collection
    pub fn load_collection(&self, collection: Collection) -> (Vec<ContentItem>, Vec<ContentError>) {
        let dir = self.site.content_dir.join(collection.dir_name());
        if !dir.exists() {
            tracing::warn!("Collection directory not found: {:?}", dir);
            return (Vec::new(), Vec::new());
        }

        let mut items = Vec::new();
        let mut errors = Vec::new();

        for entry in WalkDir::new(&dir).follow_links(true).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.clone());
                    errors.push(ContentError::new(path, e));
                    continue;
                }
            };

            let path = entry.path();
            if path.is_file() && is_markdown_file(path) {
                match self.load_item(path, collection) {
                    Ok(item) => items.push(item),
                    Err(e) => errors.push(ContentError::new(path, format!("{:#}", e))),
                }
            }
        }

        (items, errors)
    }

    /// Load a single item from a file
    fn load_item(&self, path: &Path, collection: Collection) -> Result<ContentItem> {
        let content = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&content)?;

        let body = if is_mdx_file(path) {
            MarkdownRenderer::strip_mdx_esm(body)
        } else {
            body.to_string()
        };

        let file_modified = fs::metadata(path)?
            .modified()
            .ok()
            .map(chrono::DateTime::<Local>::from);

        let date = match (&fm.date, fm.parse_date()) {
            (_, Some(date)) => date,
            (Some(raw), None) => anyhow::bail!("Unrecognised date: {:?}", raw),
            (None, None) => file_modified.unwrap_or_else(Local::now),
        };

        // An index.md is named after its directory
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| *s != "index")
            .or_else(|| {
                path.parent()
                    .and_then(|p| p.file_name())
                    .and_then(|s| s.to_str())
            })
            .unwrap_or("untitled");

        let title = fm.title.clone().unwrap_or_else(|| stem.to_string());
        // An explicit `slug: /` puts a page at the site root
        let slug = fm
            .slug
            .as_deref()
            .map(|s| s.trim().trim_matches('/').to_string())
            .unwrap_or_else(|| slug::slugify(stem));

        let source = path
            .strip_prefix(&self.site.content_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();

        let mut item = ContentItem::new(title, slug, date, collection, source);
        item.content = self.renderer.render(&body)?;
        item.excerpt = MarkdownRenderer::excerpt(&body, EXCERPT_LENGTH);
        item.description = fm.description;
        item.published = fm.published;
        item.redirects = fm.redirects;
        item.banner = fm.banner;
        item.keywords = fm.keywords;
        item.author = fm.author;

        Ok(item)
    }
}

/// Check if a file is a markdown or MDX file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e, "md" | "mdx" | "markdown"))
        .unwrap_or(false)
}

fn is_mdx_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("mdx")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site_with(files: &[(&str, &str)]) -> (tempfile::TempDir, Site) {
        let dir = tempfile::tempdir().unwrap();
        for (path, content) in files {
            let full = dir.path().join("content").join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        let site = Site::new(dir.path()).unwrap();
        (dir, site)
    }

    #[test]
    fn test_load_both_collections() {
        let (_dir, site) = site_with(&[
            (
                "blog/first/index.md",
                "---\ntitle: First\nslug: first-post\ndate: 2020-01-01\n---\nHello",
            ),
            ("pages/about.mdx", "---\ntitle: About\n---\nimport X from 'x'\n\nMe"),
            ("pages/notes.txt", "ignored"),
        ]);

        let items = ContentLoader::new(&site).load_all().unwrap();
        assert_eq!(items.len(), 2);

        let about = items.iter().find(|i| i.title == "About").unwrap();
        assert_eq!(about.collection, Collection::Pages);
        assert_eq!(about.slug, "about");
        assert_eq!(about.relative_url, "about");
        assert!(!about.content.contains("import"));
        assert!(about.content.contains("<p>Me</p>"));

        let first = items.iter().find(|i| i.title == "First").unwrap();
        assert_eq!(first.relative_url, "blog/first-post");
        assert!(first.is_blog_post);
        assert_eq!(first.excerpt, "Hello");
        assert_eq!(first.source, "blog/first/index.md");
    }

    #[test]
    fn test_index_file_takes_directory_name() {
        let (_dir, site) = site_with(&[("blog/My Trip/index.md", "---\ntitle: Trip\n---\nbody")]);
        let (items, errors) = ContentLoader::new(&site).load_collection(Collection::Blog);
        assert!(errors.is_empty());
        assert_eq!(items[0].slug, "my-trip");
    }

    #[test]
    fn test_broken_file_fails_the_load() {
        let (_dir, site) = site_with(&[
            ("blog/good.md", "---\ntitle: Good\n---\nbody"),
            ("blog/bad.md", "---\ntitle: Bad\ndate: someday\n---\nbody"),
        ]);

        let err = ContentLoader::new(&site).load_all().unwrap_err();
        match err.downcast_ref::<BuildError>() {
            Some(BuildError::Query(errors)) => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].path.ends_with("bad.md"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_line_numbers_follow_highlight_config() {
        let (_dir, mut site) =
            site_with(&[("blog/code.md", "---\ntitle: Code\n---\n```rust\nfn main() {}\n```\n")]);
        site.config.highlight.line_number = true;

        let (items, errors) = ContentLoader::new(&site).load_collection(Collection::Blog);
        assert!(errors.is_empty());
        assert!(items[0].content.contains("line-number"));
    }

    #[test]
    fn test_missing_collection_is_empty() {
        let (_dir, site) = site_with(&[]);
        let (items, errors) = ContentLoader::new(&site).load_collection(Collection::Pages);
        assert!(items.is_empty());
        assert!(errors.is_empty());
    }
}
