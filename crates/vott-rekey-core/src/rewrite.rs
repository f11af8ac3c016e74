use crate::mapping::IdMapping;
use crate::{RekeyError, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use log::debug;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Extract the leading id from a `<32-hex>-asset.json` file name.
fn asset_file_id(file_name: &str) -> Option<&str> {
    let id = file_name.strip_suffix("-asset.json")?;
    let lowercase_hex = id.len() == 32 && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
    lowercase_hex.then_some(id)
}

/// Pass 1: rename every `<old-id>-asset.json` in `directory` to
/// `<new-id>-asset.json`. A file whose id is missing from the mapping
/// means the directory and the manifest disagree (stale leftovers) and is
/// fatal — detected before any rename happens. Returns the rename count.
pub fn rename_asset_files(directory: &Path, mapping: &IdMapping) -> Result<usize> {
    // Collect first; renaming while the directory iterator is live could
    // surface the new names as fresh entries.
    let mut pending = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some(old_id) = asset_file_id(name) else { continue };
        let new_id = mapping
            .new_id(old_id)
            .ok_or_else(|| RekeyError::UnmappedAssetId {
                id: old_id.to_string(),
                file: name.to_string(),
            })?;
        pending.push((entry.path(), directory.join(format!("{new_id}-asset.json"))));
    }

    for (from, to) in &pending {
        debug!("rename {} -> {}", from.display(), to.display());
        fs::rename(from, to)?;
    }
    Ok(pending.len())
}

/// Pass 2: rewrite the contents of every regular file in `directory`
/// (manifest and freshly renamed asset files included), replacing old
/// asset ids with new ones and the old source directory string with the
/// new one. Each file is rewritten atomically via a temp file plus rename,
/// even when nothing in it matched. Returns the file count.
pub fn rewrite_contents(
    directory: &Path,
    mapping: &IdMapping,
    new_source_directory: &str,
) -> Result<usize> {
    let substitutions = Substitutions::new(mapping, new_source_directory)?;

    let mut files = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }

    for path in &files {
        let contents = fs::read_to_string(path)?;
        let output = substitutions.apply(&contents);
        debug!(
            "rewrite {} ({})",
            path.display(),
            if matches!(&output, Cow::Owned(_)) { "changed" } else { "unchanged" }
        );
        AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
            .write(|f| f.write_all(output.as_bytes()))
            .map_err(flatten_atomic)?;
    }
    Ok(files.len())
}

fn flatten_atomic(err: atomicwrites::Error<std::io::Error>) -> RekeyError {
    match err {
        atomicwrites::Error::Internal(e) | atomicwrites::Error::User(e) => RekeyError::Io(e),
    }
}

/// All textual replacements for one run, compiled into a single
/// alternation so the whole file is transformed in one left-to-right scan
/// and substituted text is never re-scanned against another pair. Matches
/// are exact substrings, with no word-boundary logic, like the tool whose
/// files we rewrite.
struct Substitutions {
    pattern: Regex,
    replacements: HashMap<String, String>,
}

impl Substitutions {
    fn new(mapping: &IdMapping, new_source_directory: &str) -> Result<Self> {
        // Ids first, then the escaped directory: when both could match at
        // the same position, the id replacement wins.
        let mut alternatives: Vec<String> =
            mapping.iter().map(|(old, _)| old.to_string()).collect();
        alternatives.push(regex::escape(mapping.old_source_directory()));
        let pattern = Regex::new(&alternatives.join("|"))?;

        let mut replacements: HashMap<String, String> = mapping
            .iter()
            .map(|(old, new)| (old.to_string(), new.to_string()))
            .collect();
        replacements
            .entry(mapping.old_source_directory().to_string())
            .or_insert_with(|| new_source_directory.to_string());

        Ok(Self {
            pattern,
            replacements,
        })
    }

    fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        self.pattern
            .replace_all(text, |caps: &Captures| self.replacements[&caps[0]].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::VottProject;

    const OLD_A: &str = "11111111111111111111111111111111";
    const OLD_B: &str = "22222222222222222222222222222222";
    const NEW_A: &str = "391ca3a9fff002fce7cbd392be41df43"; // md5("file:/new/imgs/a.jpg")
    const NEW_B: &str = "fe42ce8f2ddf840222871782ff8dd415"; // md5("file:/new/imgs/b.jpg")

    fn mapping() -> IdMapping {
        let text = format!(
            r#"{{
                "securityToken": "T",
                "sourceConnection": {{"name": "S"}},
                "targetConnection": {{"name": "D"}},
                "assets": {{
                    "{OLD_A}": {{"id": "{OLD_A}", "name": "a.jpg", "path": "file:/old/imgs/a.jpg"}},
                    "{OLD_B}": {{"id": "{OLD_B}", "name": "b.jpg", "path": "file:/old/imgs/b.jpg"}}
                }}
            }}"#
        );
        let project: VottProject = serde_json::from_str(&text).unwrap();
        IdMapping::build(&project, "/new/imgs").unwrap()
    }

    #[test]
    fn asset_file_id_requires_32_lowercase_hex() {
        assert_eq!(asset_file_id(&format!("{OLD_A}-asset.json")), Some(OLD_A));
        assert_eq!(asset_file_id("project.vott"), None);
        assert_eq!(asset_file_id("1234-asset.json"), None);
        assert_eq!(
            asset_file_id("AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA-asset.json"),
            None
        );
    }

    #[test]
    fn rename_pass_swaps_ids_in_file_names() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(format!("{OLD_A}-asset.json")), "{}").unwrap();
        fs::write(dir.path().join(format!("{OLD_B}-asset.json")), "{}").unwrap();
        fs::write(dir.path().join("project.vott"), "{}").unwrap();

        let renamed = rename_asset_files(dir.path(), &mapping()).unwrap();
        assert_eq!(renamed, 2);
        assert!(dir.path().join(format!("{NEW_A}-asset.json")).exists());
        assert!(dir.path().join(format!("{NEW_B}-asset.json")).exists());
        assert!(!dir.path().join(format!("{OLD_A}-asset.json")).exists());
        assert!(dir.path().join("project.vott").exists());
    }

    #[test]
    fn stale_asset_file_is_fatal_before_any_rename() {
        let dir = tempfile::tempdir().unwrap();
        let stale = "99999999999999999999999999999999";
        fs::write(dir.path().join(format!("{stale}-asset.json")), "{}").unwrap();
        let err = rename_asset_files(dir.path(), &mapping()).unwrap_err();
        assert!(matches!(err, RekeyError::UnmappedAssetId { .. }));
        assert!(dir.path().join(format!("{stale}-asset.json")).exists());
    }

    #[test]
    fn content_pass_replaces_ids_and_directory_on_the_same_line() {
        let dir = tempfile::tempdir().unwrap();
        let line = format!(r#"{{"id": "{OLD_A}", "parent": "{OLD_B}", "path": "file:/old/imgs/a.jpg"}}"#);
        fs::write(dir.path().join("project.vott"), &line).unwrap();

        let rewritten = rewrite_contents(dir.path(), &mapping(), "/new/imgs").unwrap();
        assert_eq!(rewritten, 1);
        let after = fs::read_to_string(dir.path().join("project.vott")).unwrap();
        assert_eq!(
            after,
            format!(r#"{{"id": "{NEW_A}", "parent": "{NEW_B}", "path": "file:/new/imgs/a.jpg"}}"#)
        );
    }

    #[test]
    fn ids_are_replaced_as_exact_substrings() {
        // An old id embedded inside a longer token is still swapped.
        let subs = Substitutions::new(&mapping(), "/new/imgs").unwrap();
        let text = format!("prefix{OLD_A}suffix");
        assert_eq!(subs.apply(&text), format!("prefix{NEW_A}suffix"));
    }

    #[test]
    fn substituted_text_is_never_rescanned() {
        // One scan: the replacement for OLD_A must not itself be probed
        // for other old ids or the old directory.
        let subs = Substitutions::new(&mapping(), "/new/imgs").unwrap();
        assert_eq!(subs.apply(OLD_A), NEW_A);
        assert_eq!(subs.apply(&format!("{OLD_A}{OLD_B}")), format!("{NEW_A}{NEW_B}"));
    }

    #[test]
    fn untouched_files_are_still_rewritten_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "nothing to see\n").unwrap();
        let rewritten = rewrite_contents(dir.path(), &mapping(), "/new/imgs").unwrap();
        assert_eq!(rewritten, 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("notes.txt")).unwrap(),
            "nothing to see\n"
        );
    }
}
