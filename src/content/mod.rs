//! Content module - handles pages, blog posts, and content processing

mod frontmatter;
mod item;
pub mod loader;
mod markdown;

pub use frontmatter::FrontMatter;
pub use item::{derive_relative_url, Collection, ContentItem};
pub use loader::ContentLoader;
pub use markdown::MarkdownRenderer;
