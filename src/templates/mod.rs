//! Built-in templates using the Tera template engine
//!
//! Every template and partial is embedded in the binary. The partials are
//! the presentational components of the site: header, theme styles, share
//! bar, subscribe bar and the comments widget.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::ContentItem;
use crate::helpers::{date_xml, format_date, full_url_for, url_for, ShareLinks};
use crate::theme::Theme;

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Bodies are pre-rendered HTML; escaping is done explicitly with `| escape`
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("macros.html", include_str!("theme/macros.html")),
            ("layout.html", include_str!("theme/layout.html")),
            ("blogpost.html", include_str!("theme/blogpost.html")),
            ("page.html", include_str!("theme/page.html")),
            ("blog.html", include_str!("theme/blog.html")),
            ("404.html", include_str!("theme/404.html")),
            ("redirect.html", include_str!("theme/redirect.html")),
            // Partials
            ("partials/head.html", include_str!("theme/partials/head.html")),
            (
                "partials/header.html",
                include_str!("theme/partials/header.html"),
            ),
            (
                "partials/footer.html",
                include_str!("theme/partials/footer.html"),
            ),
            ("partials/share.html", include_str!("theme/partials/share.html")),
            (
                "partials/subscribe.html",
                include_str!("theme/partials/subscribe.html"),
            ),
            (
                "partials/comments.html",
                include_str!("theme/partials/comments.html"),
            ),
        ])?;

        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.register_filter("date_format", date_format_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    Ok(tera::Value::String(result))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "…".to_string(),
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!(
            "{}{}",
            truncated.trim_end(),
            omission
        )))
    }
}

/// Tera filter: reformat an RFC 3339 date with a Moment.js-style format
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "MMMM DD, YYYY".to_string(),
    };

    match chrono::DateTime::parse_from_rfc3339(&s) {
        Ok(date) => Ok(tera::Value::String(format_date(&date, &format))),
        // Not a date we produced, leave it alone
        Err(_) => Ok(tera::Value::String(s)),
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub title_alt: String,
    pub description: String,
    pub keywords: String,
    pub author: String,
    pub minibio: String,
    pub language: String,
    pub url: String,
    pub site_url: String,
    pub logo_url: String,
    pub og_site_name: String,
    pub og_language: String,
    pub fb_app_id: String,
    pub google_analytics_id: String,
    pub theme_color: String,
    pub feed_url: String,
    pub feed_title: String,
    pub manifest_url: String,
    pub blog_url: String,
    pub home_url: String,
    pub newsletter_url: String,
    pub social: Vec<SocialLink>,
}

impl ConfigData {
    pub fn new(config: &SiteConfig) -> Self {
        let social = [
            ("GitHub", config.social.github.clone()),
            ("LinkedIn", config.social.linkedin.clone()),
            ("Twitter", config.social.twitter.clone()),
            (
                "Email",
                if config.social.email.is_empty() {
                    String::new()
                } else {
                    format!("mailto:{}", config.social.email)
                },
            ),
        ]
        .into_iter()
        .filter(|(_, url)| !url.is_empty())
        .map(|(name, url)| SocialLink {
            name: name.to_string(),
            url,
        })
        .collect();

        Self {
            title: config.title.clone(),
            title_alt: config.title_alt.clone(),
            description: config.description.clone(),
            keywords: config.keywords.join(", "),
            author: config.author.clone(),
            minibio: config.minibio.trim().to_string(),
            language: config.language.clone(),
            url: config.url.trim_end_matches('/').to_string(),
            site_url: config.site_url(),
            logo_url: full_url_for(config, &config.logo),
            og_site_name: config.og_site_name.clone(),
            og_language: config.og_language.clone(),
            fb_app_id: config.social.fb_app_id.clone(),
            google_analytics_id: config.google_analytics_id.clone(),
            theme_color: config.theme_color.clone(),
            feed_url: url_for(config, &config.feed.path),
            feed_title: config.feed.title.clone(),
            manifest_url: url_for(config, crate::generator::MANIFEST_FILE),
            blog_url: url_for(config, crate::routes::BLOG_PATH),
            home_url: url_for(config, "/"),
            newsletter_url: config.newsletter.url.clone(),
            social,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SocialLink {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThemeData {
    pub name: String,
    pub css: String,
    pub comments_theme: String,
    /// Palette readers can switch to
    pub alternate: String,
    pub alternate_css: String,
    pub alternate_comments_theme: String,
}

impl ThemeData {
    pub fn new(theme: &Theme) -> Self {
        // The other palette is offered to readers who prefer it
        let alternate = if theme.name == "dark" {
            Theme::light()
        } else {
            Theme::dark()
        };
        Self {
            name: theme.name.to_string(),
            css: theme.css_variables(":root"),
            comments_theme: theme.comments_theme().to_string(),
            alternate: alternate.name.to_string(),
            alternate_css: alternate
                .css_variables(&format!(":root[data-theme=\"{}\"]", alternate.name)),
            alternate_comments_theme: alternate.comments_theme().to_string(),
        }
    }
}

/// utterances widget attributes
#[derive(Debug, Clone, Serialize)]
pub struct CommentsData {
    pub src: String,
    pub repo: String,
    pub branch: String,
    pub label: String,
    pub issue_term: String,
    pub theme: String,
}

impl CommentsData {
    pub const SCRIPT_SRC: &'static str = "https://utteranc.es/client.js";

    pub fn new(config: &SiteConfig, theme: &Theme) -> Option<Self> {
        if !config.comments.enabled() {
            return None;
        }
        Some(Self {
            src: Self::SCRIPT_SRC.to_string(),
            repo: config.comments.repo.clone(),
            branch: config.comments.branch.clone(),
            label: config.comments.label.clone(),
            issue_term: config.comments.issue_term.clone(),
            theme: theme.comments_theme().to_string(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemData {
    pub title: String,
    pub slug: String,
    /// RFC 3339
    pub date: String,
    pub date_xml: String,
    pub description: Option<String>,
    pub summary: String,
    pub banner: Option<String>,
    pub keywords: Vec<String>,
    pub author: Option<String>,
    pub path: String,
    pub url: String,
    pub content: String,
    pub excerpt: String,
    pub is_blog_post: bool,
}

impl ItemData {
    pub fn new(item: &ContentItem, config: &SiteConfig) -> Self {
        Self {
            title: item.title.clone(),
            slug: item.slug.clone(),
            date: item.date.to_rfc3339(),
            date_xml: date_xml(&item.date),
            description: item.description.clone(),
            summary: item.summary().to_string(),
            banner: item.banner.as_deref().map(|b| url_for(config, b)),
            keywords: item.keywords.clone(),
            author: item.author.clone(),
            path: url_for(config, &item.relative_url),
            url: crate::feed::item_url(item, config),
            content: item.content.clone(),
            excerpt: item.excerpt.clone(),
            is_blog_post: item.is_blog_post,
        }
    }

    /// Listing entry without the rendered body
    pub fn summary_only(item: &ContentItem, config: &SiteConfig) -> Self {
        Self {
            content: String::new(),
            ..Self::new(item, config)
        }
    }

    pub fn share_links(&self) -> ShareLinks {
        ShareLinks::new(&self.url, &self.title)
    }
}
