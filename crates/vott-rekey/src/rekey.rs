use anyhow::{Context, Result, ensure};
use clap::Args;
use log::debug;
use std::path::{Path, PathBuf};
use vott_rekey_core::{IdMapping, VottProject, paths, rename_asset_files, rewrite_contents, single_file_with_suffix};

/// Suffix convention identifying the project manifest.
const PROJECT_SUFFIX: &str = ".vott";

#[derive(Args, Debug)]
pub struct RekeyArgs {
    /// Directory containing the originally tagged images as they exist on
    /// this machine. Must contain ALL assets the project references.
    #[arg(value_name = "NEW_SOURCE_DIRECTORY", value_hint = clap::ValueHint::DirPath)]
    pub new_source_directory: PathBuf,

    /// Directory containing the .vott project file and the *-asset.json
    /// files.
    #[arg(value_name = "TARGET_DIRECTORY", value_hint = clap::ValueHint::DirPath)]
    pub target_directory: PathBuf,
}

pub fn execute(args: RekeyArgs) -> Result<()> {
    let new_source_directory = resolve_directory(&args.new_source_directory)?;
    let target_directory = resolve_directory(&args.target_directory)?;

    // VoTT records source paths with spaces encoded, so ids must be
    // computed over the encoded form as well.
    let encoded_source = paths::encode_spaces(utf8_path(&new_source_directory)?);
    debug!("encoded new source directory: {encoded_source}");

    eprintln!("Step 1: Locating project file");
    let vott_file = single_file_with_suffix(&target_directory, &[PROJECT_SUFFIX])?;
    eprintln!("  Found {}", vott_file.display());

    eprintln!("\nStep 2: Computing new asset ids");
    let project = VottProject::load(&vott_file)?;
    let mapping = IdMapping::build(&project, &encoded_source)?;
    eprintln!(
        "  {} assets, moving from '{}'",
        mapping.len(),
        mapping.old_source_directory()
    );

    eprintln!("\nStep 3: Renaming asset files");
    let renamed = rename_asset_files(&target_directory, &mapping)?;
    eprintln!("  Renamed {renamed} files");

    eprintln!("\nStep 4: Rewriting file contents, this may take a while");
    let rewritten = rewrite_contents(&target_directory, &mapping, &encoded_source)?;
    eprintln!("  Rewrote {rewritten} files");

    eprintln!("\n✓ Re-keying complete");
    print_instructions(&project, &vott_file, &new_source_directory, &target_directory);
    Ok(())
}

fn resolve_directory(path: &Path) -> Result<PathBuf> {
    let path = std::path::absolute(path)
        .with_context(|| format!("Failed to resolve '{}'", path.display()))?;
    ensure!(path.is_dir(), "'{}' is not a directory", path.display());
    Ok(path)
}

fn utf8_path(path: &Path) -> Result<&str> {
    path.to_str()
        .with_context(|| format!("'{}' is not valid UTF-8", path.display()))
}

/// Manual follow-up steps inside VoTT itself; purely informational.
fn print_instructions(
    project: &VottProject,
    vott_file: &Path,
    new_source_directory: &Path,
    target_directory: &Path,
) {
    let vott_file = vott_file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| PROJECT_SUFFIX.to_string());

    println!(
        "
Done! Only a couple remaining steps:

    1. Open VoTT
    2. Click Home, then Open Local Project
    3. Navigate to '{target}'
    4. Open the '{vott_file}' file. If it opens without error, you're done! Otherwise:

        - 'Error loading project file': you need the right security token
            1. Click Settings (the gear icon)
            2. Ensure you have a listing for '{token}' with the right key
               (ask the person that originally labeled these assets)
            3. Try loading '{vott_file}' again

        and/or

        - An unknown error: you need to update your Connections
            1. Click the Plug icon
            2. Point the '{source}' connection to:
               '{new_source}'
            3. Point the '{dest}' connection to:
               '{target}'

               Make sure to hit Save after editing.

            4. Try loading '{vott_file}' again. It should now work!",
        target = target_directory.display(),
        new_source = new_source_directory.display(),
        token = project.security_token,
        source = project.source_connection.name,
        dest = project.target_connection.name,
    );
}
