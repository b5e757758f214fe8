//! vidlicka: a static generator for a personal blog
//!
//! Markdown content from `content/pages` and `content/blog` is turned into
//! routed HTML pages, redirect rules and an RSS feed, rendered with the
//! embedded Tera theme.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod feed;
pub mod generator;
pub mod helpers;
pub mod routes;
pub mod server;
pub mod templates;
pub mod theme;

pub use error::BuildError;

use anyhow::Result;
use std::path::{Path, PathBuf};

use content::{Collection, ContentItem, ContentLoader};
use routes::SitePlan;

/// Name of the site configuration file
pub const CONFIG_FILE: &str = "site.yml";

/// A blog site rooted at a directory
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Content directory (holds `pages/` and `blog/`)
    pub content_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Files copied verbatim into the output
    pub static_dir: PathBuf,
}

impl Site {
    /// Open a site directory, falling back to the default configuration
    /// when it has no `site.yml`
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let content_dir = base_dir.join(&config.content_dir);
        let public_dir = base_dir.join(&config.public_dir);
        let static_dir = base_dir.join(&config.static_dir);

        Ok(Self {
            config,
            base_dir,
            content_dir,
            public_dir,
            static_dir,
        })
    }

    /// Load every content item, published or not
    pub fn load_content(&self) -> Result<Vec<ContentItem>> {
        ContentLoader::new(self).load_all()
    }

    /// Load content and assign routes and redirects
    pub fn plan(&self) -> Result<SitePlan> {
        let items = self.load_content()?;
        routes::plan(items, &self.config, &self.content_dir)
    }

    /// Initialize a new site
    pub fn init(&self) -> Result<()> {
        commands::init::run(self)
    }

    /// Generate the static site
    pub fn generate(&self) -> Result<SitePlan> {
        commands::generate::run(self)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Create a new content file
    pub fn new_item(&self, title: &str, collection: Collection) -> Result<PathBuf> {
        commands::new::run(self, title, collection)
    }
}
