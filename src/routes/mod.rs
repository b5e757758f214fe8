//! Page creation - assigns URLs, templates and redirects to content items

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

use crate::config::SiteConfig;
use crate::content::{Collection, ContentItem};
use crate::error::BuildError;

/// Path of the blog listing page
pub const BLOG_PATH: &str = "/blog";

/// Path of the not-found page
pub const NOT_FOUND_PATH: &str = "/404";

/// Template that renders a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    /// A single blog post
    BlogPost,
    /// A standalone page
    Page,
    /// The blog listing
    Blog,
    /// The not-found page
    NotFound,
}

impl Template {
    /// Name of the template file
    pub fn file_name(self) -> &'static str {
        match self {
            Template::BlogPost => "blogpost.html",
            Template::Page => "page.html",
            Template::Blog => "blog.html",
            Template::NotFound => "404.html",
        }
    }
}

/// A page to generate
#[derive(Debug, Clone, Serialize)]
pub struct PageRoute {
    /// Root-relative path, always starting with `/`
    pub path: String,
    pub template: Template,
    /// Index into [`SitePlan::items`]
    pub item: Option<usize>,
}

/// A redirect registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub from: String,
    pub to: String,
    pub permanent: bool,
    pub redirect_in_browser: bool,
}

impl Redirect {
    pub fn status_code(&self) -> u16 {
        if self.permanent {
            301
        } else {
            302
        }
    }
}

/// Everything the generator needs to write the site
#[derive(Debug, Clone)]
pub struct SitePlan {
    /// Published items, newest first
    pub items: Vec<ContentItem>,
    pub routes: Vec<PageRoute>,
    pub redirects: Vec<Redirect>,
}

impl SitePlan {
    /// Content item rendered by a route, if any
    pub fn item(&self, route: &PageRoute) -> Option<&ContentItem> {
        route.item.and_then(|i| self.items.get(i))
    }

    /// Published blog posts, newest first
    pub fn blog_posts(&self) -> impl Iterator<Item = &ContentItem> {
        self.items.iter().filter(|i| i.is_blog_post)
    }

    /// Find the redirect registered for a path
    pub fn redirect_for(&self, path: &str) -> Option<&Redirect> {
        let path = normalize_path(path);
        self.redirects.iter().find(|r| r.from == path)
    }
}

/// Turn loaded content into routes and redirects.
///
/// Unpublished items are dropped, the rest are ordered newest first. An
/// empty result is an error: a site without content is never generated.
pub fn plan(items: Vec<ContentItem>, config: &SiteConfig, content_dir: &Path) -> Result<SitePlan> {
    let mut items: Vec<ContentItem> = items.into_iter().filter(|i| i.published).collect();

    if items.is_empty() {
        return Err(BuildError::NoContent(content_dir.to_path_buf()).into());
    }

    items.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| a.relative_url.cmp(&b.relative_url))
    });

    // Reserved paths count as claimed
    let mut claimed: HashMap<String, String> = HashMap::new();
    claimed.insert(BLOG_PATH.to_string(), "the blog index".to_string());
    claimed.insert(NOT_FOUND_PATH.to_string(), "the 404 page".to_string());

    let mut routes = Vec::with_capacity(items.len() + 2);

    for (index, item) in items.iter().enumerate() {
        let path = item.path();
        claim(&mut claimed, &path, item.source.clone())?;

        let template = match item.collection {
            Collection::Blog => Template::BlogPost,
            Collection::Pages => Template::Page,
        };

        routes.push(PageRoute {
            path,
            template,
            item: Some(index),
        });
    }

    // Redirect sources share the URL space with pages and each other
    let mut redirects = Vec::new();
    for item in &items {
        for from in &item.redirects {
            let from = normalize_path(from);
            claim(
                &mut claimed,
                &from,
                format!("a redirect declared in {}", item.source),
            )?;
            redirects.push(Redirect {
                from,
                to: item.path(),
                permanent: true,
                redirect_in_browser: true,
            });
        }
    }

    if claimed.contains_key("/") {
        tracing::info!("/ is already taken, skipping the / -> {} redirect", BLOG_PATH);
    } else {
        redirects.insert(
            0,
            Redirect {
                from: "/".to_string(),
                to: BLOG_PATH.to_string(),
                permanent: false,
                redirect_in_browser: config.client_side_redirects,
            },
        );
    }

    routes.push(PageRoute {
        path: BLOG_PATH.to_string(),
        template: Template::Blog,
        item: None,
    });
    routes.push(PageRoute {
        path: NOT_FOUND_PATH.to_string(),
        template: Template::NotFound,
        item: None,
    });

    tracing::debug!(
        "Planned {} routes and {} redirects",
        routes.len(),
        redirects.len()
    );

    Ok(SitePlan {
        items,
        routes,
        redirects,
    })
}

/// Register `path` for `owner`, failing if something already holds it
fn claim(claimed: &mut HashMap<String, String>, path: &str, owner: String) -> Result<()> {
    if let Some(first) = claimed.get(path) {
        return Err(BuildError::DuplicateUrl {
            url: path.to_string(),
            first: first.clone(),
            second: owner,
        }
        .into());
    }
    claimed.insert(path.to_string(), owner);
    Ok(())
}

/// `old/post/` -> `/old/post`
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    format!("/{}", trimmed)
}
