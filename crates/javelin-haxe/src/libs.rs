//! Haxelib dependency management.
//!
//! Libraries declared through class metadata are flattened, deduplicated by
//! their canonical `name@version` form and installed one by one before
//! compilation. Installs are flat and idempotent; there is no transitive
//! dependency resolution on this side, haxelib handles its own.

use std::fmt;
use std::path::PathBuf;

use javelin_core::error::{Error, Result};
use javelin_core::model::{Metadata, ProgramModel};
use javelin_core::process;
use javelin_core::settings::BuildSettings;
use rustc_hash::FxHashSet;

/// A third-party library requirement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LibraryRef {
    pub name: String,
    pub version: Option<String>,
}

impl LibraryRef {
    /// Parse a `name@version` spec; `name:version` is accepted as a legacy
    /// spelling, and a bare name means "any installed version".
    pub fn parse(spec: &str) -> Self {
        let (name, version) = spec
            .split_once('@')
            .or_else(|| spec.split_once(':'))
            .map_or((spec, None), |(n, v)| (n, Some(v)));
        Self {
            name: name.trim().to_string(),
            version: version.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()),
        }
    }

    /// Canonical `name@version` form; deduplication key.
    pub fn canonical(&self) -> String {
        match &self.version {
            Some(version) => format!("{}@{}", self.name, version),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for LibraryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Scan all class metadata for library declarations, flattened and
/// deduplicated by canonical form, preserving first-occurrence order.
pub fn scan_libraries(model: &ProgramModel) -> Vec<LibraryRef> {
    let mut seen = FxHashSet::default();
    let mut libraries = Vec::new();
    for metadata in model.all_metadata() {
        let Metadata::Libraries(specs) = metadata else {
            continue;
        };
        for spec in specs {
            let library = LibraryRef::parse(spec);
            if seen.insert(library.canonical()) {
                libraries.push(library);
            }
        }
    }
    libraries
}

/// Per-library flags appended to the default build command.
pub fn library_flags(libraries: &[LibraryRef]) -> Vec<(String, String)> {
    libraries
        .iter()
        .map(|library| ("-lib".to_string(), library.canonical()))
        .collect()
}

/// Defines appended to the default build command.
pub fn build_defines(settings: &BuildSettings) -> Vec<String> {
    vec![if settings.analyzer {
        "analyzer".to_string()
    } else {
        "no-analyzer".to_string()
    }]
}

/// External package source, consumed by the orchestrator.
pub trait PackageSource {
    /// Install the library unless it is already present. Idempotent.
    fn install_if_absent(&mut self, library: &LibraryRef) -> Result<()>;
}

/// Package source backed by the `haxelib` binary.
pub struct Haxelib {
    binary: PathBuf,
    working_dir: PathBuf,
}

impl Haxelib {
    /// Locate `haxelib` on the PATH.
    pub fn detect() -> Result<Self> {
        let binary = which::which("haxelib").map_err(|_| Error::LibraryInstall {
            library: String::new(),
            output: "haxelib not found in PATH".to_string(),
        })?;
        Ok(Self::with_binary(binary))
    }

    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            working_dir: PathBuf::from("."),
        }
    }

    fn run(&self, args: &[String]) -> Result<process::ProcessResult> {
        process::run(&self.working_dir, &self.binary.to_string_lossy(), args, false)
    }
}

impl PackageSource for Haxelib {
    fn install_if_absent(&mut self, library: &LibraryRef) -> Result<()> {
        let probe = self.run(&["path".to_string(), library.name.clone()])?;
        if probe.success {
            tracing::debug!(library = %library, "already installed");
            return Ok(());
        }

        tracing::info!(library = %library, "installing");
        let mut args = vec!["install".to_string(), library.name.clone()];
        if let Some(version) = &library.version {
            args.push(version.clone());
        }
        let install = self.run(&args)?;
        if !install.success {
            return Err(Error::LibraryInstall {
                library: library.canonical(),
                output: install.output,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use javelin_core::model::Class;

    #[test]
    fn parses_versioned_and_bare_specs() {
        let versioned = LibraryRef::parse("lime@7.9.0");
        assert_eq!(versioned.name, "lime");
        assert_eq!(versioned.version.as_deref(), Some("7.9.0"));
        assert_eq!(versioned.canonical(), "lime@7.9.0");

        let legacy = LibraryRef::parse("lime:7.9.0");
        assert_eq!(legacy, versioned);

        let bare = LibraryRef::parse("openfl");
        assert_eq!(bare.version, None);
        assert_eq!(bare.canonical(), "openfl");
    }

    #[test]
    fn scan_flattens_and_deduplicates() {
        let mut model = ProgramModel::new();
        model.add_class(
            Class::new("a.First")
                .with_metadata(Metadata::Libraries(vec![
                    "lime@7.9.0".into(),
                    "openfl".into(),
                ]))
                .with_metadata(Metadata::Libraries(vec!["lime@7.9.0".into()])),
        );
        model.add_class(
            Class::new("a.Second").with_metadata(Metadata::Libraries(vec!["lime@8.0.0".into()])),
        );

        let libraries = scan_libraries(&model);
        let canonical: Vec<_> = libraries.iter().map(LibraryRef::canonical).collect();
        // Same name at a different version is a distinct requirement.
        assert_eq!(canonical, vec!["lime@7.9.0", "openfl", "lime@8.0.0"]);
    }

    #[test]
    fn library_flags_use_canonical_form() {
        let libraries = vec![LibraryRef::parse("lime@7.9.0")];
        assert_eq!(
            library_flags(&libraries),
            vec![("-lib".to_string(), "lime@7.9.0".to_string())]
        );
    }

    #[test]
    fn analyzer_define_follows_settings() {
        let mut settings = BuildSettings::default();
        settings.analyzer = true;
        assert_eq!(build_defines(&settings), vec!["analyzer"]);
        settings.analyzer = false;
        assert_eq!(build_defines(&settings), vec!["no-analyzer"]);
    }
}
