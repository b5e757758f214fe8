//! Helper functions shared by the generator and the templates

mod date;
mod share;
mod url;

pub use date::*;
pub use share::ShareLinks;
pub use url::*;
