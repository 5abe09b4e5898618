use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort the whole run
#[derive(Debug, Error)]
pub enum LicenseError {
    #[error("failed to read dependency list {path}: {source}")]
    DependencyListIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed dependency list {path}: {source}")]
    DependencyListFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("the absent-dependency marker must be the only entry, found it among {count} dependencies")]
    AbsentMixedWithDependencies {
        count: usize,
    },

    #[error("failed to read embedded licenses from {path}: {source}")]
    EmbeddedRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed embedded license index in {path}: {source}")]
    EmbeddedIndex {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {what}: {source}")]
    Output {
        what: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize dependency manifest: {0}")]
    Manifest(#[source] serde_json::Error),

    #[error("pack verification failed: {0}")]
    Verification(String),
}

/// Per-dependency descriptor problems; the dependency is skipped
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("failed to read descriptor {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse descriptor {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: quick_xml::DeError,
    },

    #[error("descriptor {path} declares no licenses")]
    NoLicenses {
        path: PathBuf,
    },
}

/// Malformed line in a metadata index
#[derive(Debug, Error)]
#[error("metadata line {line}: {reason}")]
pub struct IndexParseError {
    pub line: usize,
    pub reason: String,
}
