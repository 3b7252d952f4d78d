use std::path::PathBuf;

use crate::FixtureField;

/// Errors encountered while loading a [`ProofFixture`][crate::ProofFixture].
#[derive(thiserror::Error, Debug)]
pub enum FixtureError {
    /// The fixture directory or one of its files does not exist.
    #[error("fixture not found: {path}")]
    NotFound { path: PathBuf },
    /// A value could not be interpreted as the expected hex/fixed-width type.
    #[error("malformed {field}: {reason}")]
    Malformed { field: FixtureField, reason: String },
    /// Any other I/O error while reading or writing fixture files.
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl FixtureError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}
