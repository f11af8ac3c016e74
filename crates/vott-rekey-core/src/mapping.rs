use crate::paths;
use crate::project::VottProject;
use crate::{RekeyError, Result};
use log::debug;
use std::collections::BTreeMap;

/// The complete old→new asset id mapping for one run, plus the old source
/// directory every asset path was recorded under. Built once, before any
/// file is touched, and read-only from then on so every rewritten file
/// sees the same mapping.
#[derive(Debug)]
pub struct IdMapping {
    ids: BTreeMap<String, String>,
    old_source_directory: String,
}

impl IdMapping {
    /// Compute the mapping for `project` as if every asset lived in
    /// `new_source_directory` (already absolute and `%20`-encoded).
    ///
    /// All asset paths must share one directory; a manifest that mixes
    /// source directories is rejected rather than silently mis-keyed.
    pub fn build(project: &VottProject, new_source_directory: &str) -> Result<Self> {
        let mut ids = BTreeMap::new();
        let mut old_source_directory: Option<String> = None;

        for asset in project.assets.values() {
            let stripped = asset.path.strip_prefix("file:").ok_or_else(|| {
                RekeyError::MalformedAssetPath {
                    name: asset.name.clone(),
                    path: asset.path.clone(),
                }
            })?;
            let (directory, _) = paths::split_directory(stripped).ok_or_else(|| {
                RekeyError::MalformedAssetPath {
                    name: asset.name.clone(),
                    path: asset.path.clone(),
                }
            })?;
            match &old_source_directory {
                None => old_source_directory = Some(directory.to_string()),
                Some(shared) if shared != directory => {
                    return Err(RekeyError::MixedSourceDirectories {
                        name: asset.name.clone(),
                        path: asset.path.clone(),
                        directory: shared.clone(),
                    });
                }
                Some(_) => {}
            }

            let candidate = paths::source_asset_path(new_source_directory, &asset.name);
            let new_id = paths::asset_id(&candidate);
            debug!("{} -> {} ({})", asset.id, new_id, candidate);
            ids.insert(asset.id.clone(), new_id);
        }

        let old_source_directory = old_source_directory.ok_or(RekeyError::EmptyProject)?;
        Ok(Self {
            ids,
            old_source_directory,
        })
    }

    /// New id for `old_id`, if the manifest knows the asset.
    pub fn new_id(&self, old_id: &str) -> Option<&str> {
        self.ids.get(old_id).map(String::as_str)
    }

    pub fn old_source_directory(&self) -> &str {
        &self.old_source_directory
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.ids.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
