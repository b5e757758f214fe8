//! Generator module - writes the planned site to the public directory

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use tera::Context;
use walkdir::WalkDir;

use crate::feed;
use crate::helpers::url_for;
use crate::routes::{PageRoute, SitePlan, Template, NOT_FOUND_PATH};
use crate::templates::{CommentsData, ConfigData, ItemData, TemplateRenderer, ThemeData};
use crate::theme::Theme;
use crate::Site;

/// Web app manifest, relative to the public directory
pub const MANIFEST_FILE: &str = "manifest.webmanifest";

/// Redirect rules for hosts that read a `_redirects` file
pub const REDIRECTS_FILE: &str = "_redirects";

/// Static site generator using Tera templates
pub struct Generator {
    site: Site,
    renderer: TemplateRenderer,
    theme: Theme,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &Site) -> Result<Self> {
        let renderer = TemplateRenderer::new()?;
        let theme = Theme::by_name(&site.config.theme)?;

        Ok(Self {
            site: site.clone(),
            renderer,
            theme,
        })
    }

    /// Generate the entire site
    pub fn generate(&self, plan: &SitePlan) -> Result<()> {
        fs::create_dir_all(&self.site.public_dir)?;

        self.copy_static_assets()?;

        let base = self.create_base_context();

        for route in &plan.routes {
            self.generate_route(plan, route, &base)?;
        }
        tracing::info!("Generated {} pages", plan.routes.len());

        self.generate_redirects(plan)?;

        feed::write_rss(&plan.items, &self.site.config, &self.site.public_dir)?;

        self.generate_manifest()?;

        Ok(())
    }

    /// Context shared by every page
    fn create_base_context(&self) -> Context {
        let config = &self.site.config;
        let mut context = Context::new();
        context.insert("config", &ConfigData::new(config));
        context.insert("theme", &ThemeData::new(&self.theme));
        context.insert("comments", &CommentsData::new(config, &self.theme));
        context
    }

    fn generate_route(&self, plan: &SitePlan, route: &PageRoute, base: &Context) -> Result<()> {
        let config = &self.site.config;
        let mut context = base.clone();
        context.insert("current_path", &route.path);

        match route.template {
            Template::BlogPost | Template::Page => {
                let Some(item) = plan.item(route) else {
                    anyhow::bail!("Route {} has no content item", route.path);
                };
                let page = ItemData::new(item, config);
                if route.template == Template::BlogPost {
                    context.insert("share", &page.share_links());
                }
                context.insert("page", &page);
            }
            Template::Blog => {
                let posts: Vec<ItemData> = plan
                    .blog_posts()
                    .map(|item| ItemData::summary_only(item, config))
                    .collect();
                context.insert("title", "Blog");
                context.insert("posts", &posts);
            }
            Template::NotFound => {
                context.insert("title", "Not found");
            }
        }

        let html = self.renderer.render(route.template.file_name(), &context)?;

        let output_path = if route.path == NOT_FOUND_PATH {
            self.site.public_dir.join("404.html")
        } else {
            page_output_path(&self.site.public_dir, &route.path)
        };
        write_file(&output_path, &html)?;

        tracing::debug!("Generated {}", route.path);
        Ok(())
    }

    /// Write meta-refresh pages and the `_redirects` rules
    fn generate_redirects(&self, plan: &SitePlan) -> Result<()> {
        let config = &self.site.config;
        let mut rules = String::new();
        let mut pages = 0;

        for redirect in &plan.redirects {
            let from = url_for(config, &redirect.from);
            let to = url_for(config, &redirect.to);
            rules.push_str(&format!("{} {} {}\n", from, to, redirect.status_code()));

            if !redirect.redirect_in_browser {
                continue;
            }

            let mut context = Context::new();
            context.insert("target", &to);
            let html = self.renderer.render("redirect.html", &context)?;
            write_file(
                &page_output_path(&self.site.public_dir, &redirect.from),
                &html,
            )?;
            pages += 1;
        }

        write_file(&self.site.public_dir.join(REDIRECTS_FILE), &rules)?;

        tracing::info!(
            "Generated {} redirects ({} redirect pages)",
            plan.redirects.len(),
            pages
        );
        Ok(())
    }

    fn generate_manifest(&self) -> Result<()> {
        let config = &self.site.config;
        let icon_type = match Path::new(&config.logo)
            .extension()
            .and_then(|e| e.to_str())
        {
            Some("svg") => "image/svg+xml",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            _ => "image/png",
        };

        let manifest = serde_json::json!({
            "name": config.title_alt,
            "short_name": config.title_short,
            "description": config.description,
            "start_url": url_for(config, "/"),
            "background_color": config.background_color,
            "theme_color": config.theme_color,
            "display": "standalone",
            "icons": [{
                "src": url_for(config, &config.logo),
                "sizes": "any",
                "type": icon_type,
            }],
        });

        let output_path = self.site.public_dir.join(MANIFEST_FILE);
        write_file(&output_path, &serde_json::to_string_pretty(&manifest)?)?;
        tracing::info!("Generated {}", MANIFEST_FILE);

        Ok(())
    }

    /// Copy the static directory verbatim into the public directory
    fn copy_static_assets(&self) -> Result<()> {
        let static_dir = &self.site.static_dir;
        if !static_dir.exists() {
            return Ok(());
        }

        let mut count = 0;
        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(static_dir)?;
            let dest = self.site.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
            count += 1;
        }

        tracing::debug!("Copied {} static files", count);
        Ok(())
    }
}

/// `/` -> `public/index.html`, `/blog/post` -> `public/blog/post/index.html`
pub fn page_output_path(public_dir: &Path, path: &str) -> PathBuf {
    let relative = path.trim_matches('/');
    if relative.is_empty() {
        public_dir.join("index.html")
    } else {
        public_dir.join(relative).join("index.html")
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}
