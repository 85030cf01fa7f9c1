#![forbid(unsafe_code)]

//! Errors surfaced by the demo binary at startup.

use std::fmt;
use std::io;
use std::path::PathBuf;

use guide_core::CatalogError;

#[derive(Debug)]
pub enum DemoError {
    /// The catalog file could not be read.
    Io { path: PathBuf, source: io::Error },
    /// The catalog file was read but is invalid.
    Catalog(CatalogError),
}

impl fmt::Display for DemoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DemoError::Io { path, source } => {
                write!(f, "cannot read {}: {source}", path.display())
            }
            DemoError::Catalog(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for DemoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DemoError::Io { source, .. } => Some(source),
            DemoError::Catalog(e) => Some(e),
        }
    }
}

impl From<CatalogError> for DemoError {
    fn from(e: CatalogError) -> Self {
        DemoError::Catalog(e)
    }
}
