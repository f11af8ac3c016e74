use crate::{RekeyError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Return the single regular file in `directory` (non-recursive) whose
/// name ends with one of `suffixes`. Zero matches and multiple matches
/// are both fatal: the tool never guesses which file is intended.
pub fn single_file_with_suffix(directory: &Path, suffixes: &[&str]) -> Result<PathBuf> {
    let mut candidates = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if suffixes.iter().any(|suffix| name.ends_with(suffix)) {
            candidates.push(entry.path());
        }
    }

    if candidates.len() > 1 {
        return Err(RekeyError::AmbiguousSuffix {
            suffix: suffixes.join(", "),
            directory: directory.to_path_buf(),
        });
    }
    candidates.pop().ok_or_else(|| RekeyError::NoFileWithSuffix {
        suffix: suffixes.join(", "),
        directory: directory.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_match_returns_its_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("project.vott"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        let found = single_file_with_suffix(dir.path(), &[".vott"]).unwrap();
        assert_eq!(found, dir.path().join("project.vott"));
    }

    #[test]
    fn zero_matches_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        assert!(matches!(
            single_file_with_suffix(dir.path(), &[".vott"]),
            Err(RekeyError::NoFileWithSuffix { .. })
        ));
    }

    #[test]
    fn two_matches_are_ambiguous() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.vott"), "{}").unwrap();
        fs::write(dir.path().join("b.vott"), "{}").unwrap();
        assert!(matches!(
            single_file_with_suffix(dir.path(), &[".vott"]),
            Err(RekeyError::AmbiguousSuffix { .. })
        ));
    }

    #[test]
    fn subdirectories_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("backup.vott")).unwrap();
        fs::write(dir.path().join("project.vott"), "{}").unwrap();
        let found = single_file_with_suffix(dir.path(), &[".vott"]).unwrap();
        assert_eq!(found, dir.path().join("project.vott"));
    }
}
