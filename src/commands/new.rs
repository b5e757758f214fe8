//! Create a new blog post or page

use anyhow::{bail, Result};
use std::fs;
use std::path::PathBuf;

use crate::content::Collection;
use crate::Site;

/// Front matter written into new files
fn scaffold(title: &str, slug: &str, date: &str) -> Result<String> {
    // JSON strings are valid double-quoted YAML scalars
    let title = serde_json::to_string(title)?;
    Ok(format!(
        "---\ntitle: {title}\nslug: {slug}\ndate: {date}\ndescription: \"\"\npublished: true\n---\n\n"
    ))
}

/// Create `content/<collection>/<slug>.md` and return its path
pub fn run(site: &Site, title: &str, collection: Collection) -> Result<PathBuf> {
    let slug = slug::slugify(title);
    if slug.is_empty() {
        bail!("Cannot derive a file name from title: {:?}", title);
    }

    let target_dir = site.content_dir.join(collection.dir_name());
    fs::create_dir_all(&target_dir)?;

    let file_path = target_dir.join(format!("{}.md", slug));
    if file_path.exists() {
        bail!("File already exists: {:?}", file_path);
    }

    let now = chrono::Local::now();
    let content = scaffold(title, &slug, &now.format("%Y-%m-%d %H:%M:%S").to_string())?;
    fs::write(&file_path, content)?;

    tracing::info!("Created {} {:?}", collection, file_path);
    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentLoader;

    #[test]
    fn test_new_post_is_loadable() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path()).unwrap();

        let path = run(&site, "Hello: \"World\"", Collection::Blog).unwrap();
        assert_eq!(path, site.content_dir.join("blog/hello-world.md"));

        let (items, errors) = ContentLoader::new(&site).load_collection(Collection::Blog);
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(items[0].title, "Hello: \"World\"");
        assert_eq!(items[0].relative_url, "blog/hello-world");
        assert!(items[0].published);
    }

    #[test]
    fn test_new_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path()).unwrap();

        run(&site, "About", Collection::Pages).unwrap();
        assert!(run(&site, "About", Collection::Pages).is_err());
    }

    #[test]
    fn test_new_rejects_title_without_slug() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path()).unwrap();
        assert!(run(&site, "???", Collection::Pages).is_err());
    }
}
