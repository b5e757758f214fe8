//! Fatal build errors

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Conditions that abort a build
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("There are no posts! Add content under {0:?}")]
    NoContent(PathBuf),

    #[error("Failed to load content:\n{}", ContentErrors(.0))]
    Query(Vec<ContentError>),

    #[error("Duplicate URL {url:?}: {first} and {second}")]
    DuplicateUrl {
        url: String,
        first: String,
        second: String,
    },

    #[error("Invalid configuration in {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// A content file that could not be loaded
#[derive(Error, Debug)]
#[error("{path:?}: {message}")]
pub struct ContentError {
    pub path: PathBuf,
    pub message: String,
}

impl ContentError {
    pub fn new(path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Self {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

struct ContentErrors<'a>(&'a [ContentError]);

impl fmt::Display for ContentErrors<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {}", err)?;
        }
        Ok(())
    }
}
