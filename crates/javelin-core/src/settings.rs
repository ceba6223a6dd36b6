//! Build settings supplied by the caller.
//!
//! Constructed once per build invocation and never mutated afterwards. Every
//! recognized option maps to a template parameter and/or a behavioral switch
//! in the orchestrator.

use std::path::PathBuf;

/// Initial display orientation for windowed subtargets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Auto,
    Portrait,
    Landscape,
}

impl Orientation {
    /// Lowercase form used in rendered build scripts.
    pub fn low_name(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Portrait => "portrait",
            Self::Landscape => "landscape",
        }
    }
}

/// Immutable per-build configuration.
#[derive(Debug, Clone)]
pub struct BuildSettings {
    /// Application title shown by windowed subtargets.
    pub title: String,

    /// Application name.
    pub name: String,

    /// Application package identifier.
    pub package: String,

    /// Application version string.
    pub version: String,

    /// Company/vendor name.
    pub company: String,

    /// Initial window width.
    pub initial_width: u32,

    /// Initial window height.
    pub initial_height: u32,

    /// Initial orientation.
    pub orientation: Orientation,

    /// Whether resources are embedded into the artifact.
    pub embed_resources: bool,

    /// Asset directory trees copied wholesale into the staging area.
    pub assets: Vec<PathBuf>,

    /// Icon path, if any.
    pub icon: Option<String>,

    /// Extra libraries exposed to build-script templates.
    pub libraries: Vec<String>,

    /// Minimize generated member names.
    pub minimize_names: bool,

    /// Release build: optimized, no debug flag.
    pub release: bool,

    /// Enable the toolchain's static analyzer passes.
    pub analyzer: bool,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            title: "App".to_string(),
            name: "App".to_string(),
            package: "app".to_string(),
            version: "0.0.0".to_string(),
            company: "Company".to_string(),
            initial_width: 1280,
            initial_height: 720,
            orientation: Orientation::Auto,
            embed_resources: false,
            assets: Vec::new(),
            icon: None,
            libraries: Vec::new(),
            minimize_names: false,
            release: false,
            analyzer: true,
        }
    }
}

impl BuildSettings {
    /// Settings for an optimized release build.
    pub fn release() -> Self {
        Self {
            release: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_debug() {
        let settings = BuildSettings::default();
        assert!(!settings.release);
        assert_eq!(settings.orientation.low_name(), "auto");
    }

    #[test]
    fn release_constructor() {
        assert!(BuildSettings::release().release);
    }
}
