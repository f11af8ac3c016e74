//! Re-keying logic for VoTT labeling projects.
//!
//! VoTT names every asset after the MD5 hash of its absolute `file:` path,
//! so a project copied to another machine no longer recognizes its own
//! labels. This crate rebuilds the id space for a new source directory and
//! rewrites the project's metadata directory to match: the mapping is
//! computed once from the manifest, then applied to file names and file
//! contents in two strictly ordered passes.

mod locate;
mod mapping;
pub mod paths;
mod project;
mod rewrite;

pub use locate::single_file_with_suffix;
pub use mapping::IdMapping;
pub use project::{VottAsset, VottConnection, VottProject};
pub use rewrite::{rename_asset_files, rewrite_contents};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RekeyError {
    #[error("No file found with suffix '{suffix}' in {}", .directory.display())]
    NoFileWithSuffix { suffix: String, directory: PathBuf },

    #[error("Should have no more than one '{suffix}' file in {}", .directory.display())]
    AmbiguousSuffix { suffix: String, directory: PathBuf },

    #[error("'{file}' names asset id {id}, which is not in the project manifest")]
    UnmappedAssetId { id: String, file: String },

    #[error("project has no assets, so the old source directory cannot be derived")]
    EmptyProject,

    #[error("asset '{name}' has path '{path}', outside the shared source directory '{directory}'")]
    MixedSourceDirectories {
        name: String,
        path: String,
        directory: String,
    },

    #[error("asset '{name}' has malformed path '{path}'")]
    MalformedAssetPath { name: String, path: String },

    #[error("invalid project file: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("invalid substitution pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RekeyError>;
