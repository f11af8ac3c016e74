//! Path string rules shared with VoTT.
//!
//! VoTT stores asset locations as `file:`-prefixed absolute paths with
//! literal spaces encoded as `%20`, joined with forward slashes, and
//! derives asset ids by hashing that exact string. Any deviation here
//! produces ids the tool cannot match.

/// Encode a path string the way VoTT records it: every literal space
/// becomes `%20`. Nothing else is transformed, and nothing is ever
/// decoded, so the transform is idempotent on encoded input.
pub fn encode_spaces(path: &str) -> String {
    path.replace(' ', "%20")
}

/// Build the `file:` path VoTT would record for `name` inside `directory`,
/// with exactly one `/` between them.
pub fn source_asset_path(directory: &str, name: &str) -> String {
    let directory = directory.strip_suffix('/').unwrap_or(directory);
    format!("file:{directory}/{name}")
}

/// Asset id for a `file:` path string: the MD5 digest of its UTF-8 bytes,
/// rendered as 32 lowercase hex characters.
pub fn asset_id(source_asset_path: &str) -> String {
    format!("{:x}", md5::compute(source_asset_path.as_bytes()))
}

/// Split a `file:`-stripped path string into directory and base name at
/// the last separator. Accepts `\` as well so projects created on Windows
/// still split.
pub fn split_directory(path: &str) -> Option<(&str, &str)> {
    let idx = path.rfind(['/', '\\'])?;
    Some((&path[..idx], &path[idx + 1..]))
}
