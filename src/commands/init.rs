//! Initialize a new blog site

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::config::SiteConfig;
use crate::{Site, CONFIG_FILE};

const LOGO_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 64 64">
  <rect width="64" height="64" rx="12" fill="#CC8B86"/>
  <path d="M20 14v20a12 12 0 0 0 24 0V14M32 14v36" stroke="#231F20" stroke-width="4" fill="none"/>
</svg>
"##;

/// Initialize a new site in the given directory.
///
/// Existing files are left untouched.
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config = SiteConfig::default();

    fs::create_dir_all(target_dir.join(&config.content_dir).join("pages"))?;
    fs::create_dir_all(target_dir.join(&config.content_dir).join("blog"))?;
    fs::create_dir_all(target_dir.join(&config.static_dir).join("images"))?;

    let header = "# Site configuration\n# Unset keys fall back to their defaults.\n\n";
    let config_content = format!("{}{}", header, serde_yaml::to_string(&config)?);
    write_new(&target_dir.join(CONFIG_FILE), &config_content)?;

    write_new(
        &target_dir.join(&config.static_dir).join(&config.logo),
        LOGO_SVG,
    )?;

    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");

    let sample_post = format!(
        r#"---
title: Hello World
date: {now}
description: The first post on this blog.
---

Welcome to your new blog! Posts live in `content/blog`, pages in `content/pages`.

## Quick Start

### Create a new post

```bash
$ vidlicka new "My New Post"
```

### Run the development server

```bash
$ vidlicka server
```

### Generate static files

```bash
$ vidlicka generate
```
"#
    );
    write_new(
        &target_dir
            .join(&config.content_dir)
            .join("blog/hello-world.md"),
        &sample_post,
    )?;

    let about_page = format!(
        r#"---
title: About
date: {now}
---

Tell your readers who you are.
"#
    );
    write_new(
        &target_dir.join(&config.content_dir).join("pages/about.md"),
        &about_page,
    )?;

    Ok(())
}

fn write_new(path: &Path, contents: &str) -> Result<()> {
    if path.exists() {
        tracing::warn!("Skipping existing file {:?}", path);
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    tracing::debug!("Created {:?}", path);
    Ok(())
}

/// Run the init command with an existing site
pub fn run(site: &Site) -> Result<()> {
    init_site(&site.base_dir)
}
