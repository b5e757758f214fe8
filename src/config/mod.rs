//! Configuration module

mod site;

pub use site::CommentsConfig;
pub use site::FeedConfig;
pub use site::HighlightConfig;
pub use site::NewsletterConfig;
pub use site::SiteConfig;
pub use site::SocialConfig;
