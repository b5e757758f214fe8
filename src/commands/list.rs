//! List site content

use anyhow::Result;

use crate::Site;

/// List site content by type
pub fn run(site: &Site, content_type: &str) -> Result<()> {
    match content_type {
        "post" | "posts" | "page" | "pages" => {
            let blog = matches!(content_type, "post" | "posts");
            let mut items: Vec<_> = site
                .load_content()?
                .into_iter()
                .filter(|item| item.is_blog_post == blog)
                .collect();
            items.sort_by(|a, b| b.date.cmp(&a.date));

            println!("{} ({}):", if blog { "Posts" } else { "Pages" }, items.len());
            for item in items {
                println!(
                    "  {} - {} /{}{} [{}]",
                    item.date.format("%Y-%m-%d"),
                    item.title,
                    item.relative_url,
                    if item.published { "" } else { " (unpublished)" },
                    item.source
                );
            }
        }
        "redirect" | "redirects" => {
            let plan = site.plan()?;
            println!("Redirects ({}):", plan.redirects.len());
            for redirect in &plan.redirects {
                println!(
                    "  {} -> {} ({})",
                    redirect.from,
                    redirect.to,
                    redirect.status_code()
                );
            }
        }
        "route" | "routes" => {
            let plan = site.plan()?;
            println!("Routes ({}):", plan.routes.len());
            for route in &plan.routes {
                match plan.item(route) {
                    Some(item) => println!(
                        "  {} [{}] {}",
                        route.path,
                        route.template.file_name(),
                        item.source
                    ),
                    None => println!("  {} [{}]", route.path, route.template.file_name()),
                }
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, page, redirect, route",
                content_type
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_type() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path()).unwrap();
        let err = run(&site, "tags").unwrap_err();
        assert!(err.to_string().contains("Unknown type: tags"));
    }
}
