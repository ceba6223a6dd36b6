//! Asset staging.
//!
//! Two sources feed the staging directory consumed by the toolchain:
//! resource files declared through class metadata (read out of the program's
//! resource store) and whole directory trees from `BuildSettings.assets`.
//! Last write wins; a warning is emitted when two sources claim the same
//! destination path.

use std::fs;
use std::path::{Path, PathBuf};

use javelin_core::error::Result;
use javelin_core::model::{Metadata, ProgramModel};
use javelin_core::settings::BuildSettings;
use rustc_hash::FxHashSet;

/// Stage every declared asset into `staging_dir`.
///
/// A `None` staging directory makes the whole step a no-op; that is not an
/// error. Staging is idempotent: running it twice yields the same directory
/// contents.
pub fn stage(
    model: &ProgramModel,
    settings: &BuildSettings,
    staging_dir: Option<&Path>,
) -> Result<()> {
    let Some(staging_dir) = staging_dir else {
        tracing::debug!("no staging directory configured, skipping asset staging");
        return Ok(());
    };
    fs::create_dir_all(staging_dir)?;

    let mut claimed: FxHashSet<PathBuf> = FxHashSet::default();

    for metadata in model.all_metadata() {
        let Metadata::Assets(paths) = metadata else {
            continue;
        };
        for path in paths {
            let content = model.resources().read(path)?;
            let dest = staging_dir.join(path);
            claim(&mut claimed, &dest);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            tracing::debug!(asset = %path, dest = %dest.display(), "staging resource");
            fs::write(&dest, content)?;
        }
    }

    for root in &settings.assets {
        tracing::debug!(tree = %root.display(), "staging asset tree");
        copy_tree(root, staging_dir, &mut claimed)?;
    }

    Ok(())
}

fn claim(claimed: &mut FxHashSet<PathBuf>, dest: &Path) {
    if !claimed.insert(dest.to_path_buf()) {
        tracing::warn!(dest = %dest.display(), "multiple asset sources write the same path");
    }
}

fn copy_tree(source: &Path, dest: &Path, claimed: &mut FxHashSet<PathBuf>) -> Result<()> {
    fs::create_dir_all(dest)?;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target, claimed)?;
        } else {
            claim(claimed, &target);
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use javelin_core::model::Class;

    fn model_with_assets(paths: &[&str]) -> ProgramModel {
        let mut model = ProgramModel::new();
        model.add_class(Class::new("app.Main").with_metadata(Metadata::Assets(
            paths.iter().map(|p| (*p).to_string()).collect(),
        )));
        for path in paths {
            model
                .resources_mut()
                .insert(*path, format!("content of {path}").into_bytes());
        }
        model
    }

    #[test]
    fn no_staging_dir_is_a_noop() {
        let model = model_with_assets(&["logo.png"]);
        stage(&model, &BuildSettings::default(), None).unwrap();
    }

    #[test]
    fn stages_metadata_resources() {
        let temp = tempfile::TempDir::new().unwrap();
        let model = model_with_assets(&["images/logo.png"]);
        stage(&model, &BuildSettings::default(), Some(temp.path())).unwrap();

        let staged = fs::read_to_string(temp.path().join("images/logo.png")).unwrap();
        assert_eq!(staged, "content of images/logo.png");
    }

    #[test]
    fn missing_resource_fails() {
        let mut model = ProgramModel::new();
        model.add_class(
            Class::new("app.Main").with_metadata(Metadata::Assets(vec!["ghost.png".into()])),
        );
        let temp = tempfile::TempDir::new().unwrap();
        assert!(stage(&model, &BuildSettings::default(), Some(temp.path())).is_err());
    }

    #[test]
    fn copies_settings_asset_trees() {
        let temp = tempfile::TempDir::new().unwrap();
        let tree = temp.path().join("assets");
        fs::create_dir_all(tree.join("sub")).unwrap();
        fs::write(tree.join("a.txt"), "a").unwrap();
        fs::write(tree.join("sub/b.txt"), "b").unwrap();

        let staging = temp.path().join("staging");
        let mut settings = BuildSettings::default();
        settings.assets = vec![tree];

        stage(&ProgramModel::new(), &settings, Some(&staging)).unwrap();
        assert_eq!(fs::read_to_string(staging.join("a.txt")).unwrap(), "a");
        assert_eq!(fs::read_to_string(staging.join("sub/b.txt")).unwrap(), "b");
    }

    #[test]
    fn conflicting_sources_last_write_wins() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut model = model_with_assets(&["logo.png"]);
        model
            .resources_mut()
            .insert("logo.png", b"from metadata".to_vec());

        let tree = temp.path().join("assets");
        fs::create_dir_all(&tree).unwrap();
        fs::write(tree.join("logo.png"), "from tree").unwrap();
        let mut settings = BuildSettings::default();
        settings.assets = vec![tree];

        let staging = temp.path().join("staging");
        stage(&model, &settings, Some(&staging)).unwrap();

        // Trees are copied after metadata resources, so the tree's copy wins.
        assert_eq!(
            fs::read_to_string(staging.join("logo.png")).unwrap(),
            "from tree"
        );
        let entries: Vec<_> = fs::read_dir(&staging).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn staging_twice_is_idempotent() {
        let temp = tempfile::TempDir::new().unwrap();
        let model = model_with_assets(&["logo.png"]);
        let staging = temp.path().join("staging");

        stage(&model, &BuildSettings::default(), Some(&staging)).unwrap();
        stage(&model, &BuildSettings::default(), Some(&staging)).unwrap();

        let entries: Vec<_> = fs::read_dir(&staging).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(
            fs::read_to_string(staging.join("logo.png")).unwrap(),
            "content of logo.png"
        );
    }
}
