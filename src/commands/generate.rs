//! Generate static files

use anyhow::Result;
use notify::Watcher;
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use crate::generator::Generator;
use crate::routes::SitePlan;
use crate::{Site, CONFIG_FILE};

/// Load content, plan routes and write the whole site
pub fn run(site: &Site) -> Result<SitePlan> {
    let start = Instant::now();

    let items = site.load_content()?;
    let total = items.len();
    let plan = crate::routes::plan(items, &site.config, &site.content_dir)?;

    tracing::info!(
        "Loaded {} items ({} published, {} blog posts)",
        total,
        plan.items.len(),
        plan.blog_posts().count()
    );

    let generator = Generator::new(site)?;
    generator.generate(&plan)?;

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(plan)
}

/// Watch content, static files and the config, regenerating on change
pub fn watch(site: &Site) -> Result<()> {
    let (tx, rx) = channel();

    let mut watcher = notify::recommended_watcher(move |res| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    for dir in [&site.content_dir, &site.static_dir] {
        if dir.exists() {
            watcher.watch(dir, notify::RecursiveMode::Recursive)?;
        }
    }

    let config_path = site.base_dir.join(CONFIG_FILE);
    if config_path.exists() {
        watcher.watch(&config_path, notify::RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    let mut last_rebuild = Instant::now();

    loop {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(_event) => {
                // Debounce: only rebuild if more than 500ms since last rebuild
                if last_rebuild.elapsed() > Duration::from_millis(500) {
                    tracing::info!("File changed, regenerating...");
                    if let Err(e) = rebuild(site) {
                        tracing::error!("Generation failed: {:#}", e);
                    }
                    last_rebuild = Instant::now();
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    Ok(())
}

/// Re-read the configuration before generating, it may have changed
fn rebuild(site: &Site) -> Result<SitePlan> {
    let site = Site::new(&site.base_dir)?;
    run(&site)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;
    use std::fs;

    #[test]
    fn test_run_without_content_fails() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path()).unwrap();

        let err = run(&site).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::NoContent(_))
        ));
        assert!(!site.public_dir.exists());
    }

    #[test]
    fn test_run_returns_plan() {
        let dir = tempfile::tempdir().unwrap();
        let blog = dir.path().join("content/blog");
        fs::create_dir_all(&blog).unwrap();
        fs::write(
            blog.join("first.md"),
            "---\ntitle: First\ndate: 2021-06-01\n---\nHello there",
        )
        .unwrap();

        let site = Site::new(dir.path()).unwrap();
        let plan = run(&site).unwrap();
        assert_eq!(plan.items.len(), 1);
        assert!(site.public_dir.join("blog/first/index.html").exists());
    }
}
