//! Build orchestration for the Haxe target.
//!
//! One [`HaxeBuild`] drives one build invocation: source generation, library
//! installation, asset staging, build-script rendering, toolchain compilation
//! and optionally running the artifact. Phases are strictly sequential;
//! concurrent builds must each use their own orchestrator and distinct
//! output/staging paths.

use std::fs;
use std::path::{Path, PathBuf};

use javelin_core::error::{Error, Result};
use javelin_core::model::{ClassName, Metadata, ProgramModel, SubtargetSpec};
use javelin_core::process::{self, ProcessResult};
use javelin_core::settings::BuildSettings;
use javelin_core::template::{Params, TagSet, Template, Value};

use crate::assets;
use crate::libs::{self, LibraryRef, PackageSource};
use crate::names::HaxeNames;
use crate::refs::ProgramRefTag;
use crate::subtarget;

/// Default build command, one argument per line. Rendered through the
/// template engine and split on line boundaries into the argv.
const DEFAULT_BUILD_COMMAND: &str = "\
haxe
-cp
{{ src_dir }}
-main
{{ entry_point_file }}
{% if debug %}
-debug
{% end %}
{{ subtarget.cmd_switch }}
{{ output_file }}
{% for flag in extra_flags %}
{{ flag.name }}
{{ flag.value }}
{% end %}
{% for define in extra_defines %}
-D
{{ define }}
{% end %}
";

/// Entry-point information produced by source generation.
#[derive(Debug, Clone)]
pub struct ProgramInfo {
    pub entry_point_class: ClassName,
    pub entry_point_file: String,
}

/// External backend generator: emits target source files on disk for the
/// whole program model and reports the entry point.
pub trait SourceGenerator {
    fn generate(
        &mut self,
        model: &ProgramModel,
        settings: &BuildSettings,
        src_dir: &Path,
    ) -> Result<ProgramInfo>;
}

/// Filesystem layout of one build invocation.
#[derive(Debug, Clone)]
pub struct TargetPaths {
    pub target_dir: PathBuf,
    pub output_file: PathBuf,
    staging_dir: Option<PathBuf>,
}

impl TargetPaths {
    pub fn new(target_dir: impl Into<PathBuf>, output_file: impl Into<PathBuf>) -> Self {
        let target_dir = target_dir.into();
        let staging_dir = Some(target_dir.join("merged-assets"));
        Self {
            target_dir,
            output_file: output_file.into(),
            staging_dir,
        }
    }

    /// Disable asset staging: the staging step becomes a no-op.
    pub fn without_staging(mut self) -> Self {
        self.staging_dir = None;
        self
    }

    /// Generated Haxe sources live here.
    pub fn src_dir(&self) -> PathBuf {
        self.target_dir.join("haxe").join("src")
    }

    pub fn staging_dir(&self) -> Option<&Path> {
        self.staging_dir.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Created,
    SourceGenerated,
    Compiled,
}

/// Orchestrator for one Haxe build.
pub struct HaxeBuild<'m> {
    model: &'m ProgramModel,
    settings: &'m BuildSettings,
    paths: TargetPaths,
    subtarget: SubtargetSpec,
    names: HaxeNames,
    params: Params,
    libraries: Vec<LibraryRef>,
    packages: Box<dyn PackageSource + 'm>,
    generator: Box<dyn SourceGenerator + 'm>,
    phase: Phase,
}

impl<'m> HaxeBuild<'m> {
    /// Create an orchestrator, resolving the requested subtarget and
    /// assembling the initial template parameter set.
    ///
    /// Subtarget resolution happens here, before any I/O; an unknown
    /// subtarget aborts the build immediately.
    pub fn new(
        model: &'m ProgramModel,
        settings: &'m BuildSettings,
        paths: TargetPaths,
        subtarget_name: &str,
        generator: Box<dyn SourceGenerator + 'm>,
        packages: Box<dyn PackageSource + 'm>,
    ) -> Result<Self> {
        let subtarget = subtarget::resolve(model, subtarget_name)?;
        let names = HaxeNames::new(model, settings.minimize_names);
        // Scanned once per build; later phases reuse this list.
        let libraries = libs::scan_libraries(model);
        let params = initial_params(settings, &paths, &subtarget, &libraries);

        Ok(Self {
            model,
            settings,
            paths,
            subtarget,
            names,
            params,
            libraries,
            packages,
            generator,
            phase: Phase::Created,
        })
    }

    /// The resolved subtarget for this build.
    pub fn subtarget(&self) -> &SubtargetSpec {
        &self.subtarget
    }

    /// The template parameter set assembled so far.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Render arbitrary template text against the current parameter set,
    /// with the program-reference tag registered.
    pub fn render(&self, template: &str) -> Result<String> {
        let tags = TagSet::new().with(Box::new(ProgramRefTag::new(self.model, &self.names)));
        Template::parse(template, &tags)?.render(&self.params)
    }

    /// Invoke the backend generator and merge the resulting entry-point
    /// information into the parameter set.
    pub fn build_source(&mut self) -> Result<()> {
        if self.phase != Phase::Created {
            return Err(Error::OutOfOrderOperation(
                "build_source() may only run once, before compile()",
            ));
        }

        let src_dir = self.paths.src_dir();
        fs::create_dir_all(&src_dir)?;
        tracing::info!(src_dir = %src_dir.display(), "generating sources");

        let info = self
            .generator
            .generate(self.model, self.settings, &src_dir)?;
        self.params
            .set("entry_point_file", info.entry_point_file.clone());
        self.params.set(
            "entry_point_class",
            self.names.class_fq_name(&info.entry_point_class),
        );
        self.phase = Phase::SourceGenerated;
        Ok(())
    }

    /// Render the build command into its argument vector: one trimmed,
    /// nonblank line per argument. A custom command from metadata takes
    /// precedence over the default template.
    pub fn build_command(&self) -> Result<Vec<String>> {
        let template = self
            .model
            .all_metadata()
            .find_map(|metadata| match metadata {
                Metadata::CustomBuildCommand(lines) => Some(lines.join("\n")),
                _ => None,
            })
            .unwrap_or_else(|| DEFAULT_BUILD_COMMAND.to_string());

        let rendered = self.render(&template)?;
        let command: Vec<String> = rendered
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        if command.is_empty() {
            return Err(Error::TemplateSyntax(
                "build command rendered to nothing".to_string(),
            ));
        }
        Ok(command)
    }

    /// Compile the generated sources with the external toolchain.
    ///
    /// Installs declared libraries, stages assets, renders declared template
    /// files into the source tree, renders the build command and runs it
    /// synchronously from the source directory. A nonzero toolchain exit is
    /// surfaced as [`Error::Toolchain`] with the captured output.
    pub fn compile(&mut self) -> Result<ProcessResult> {
        if self.phase == Phase::Created {
            return Err(Error::OutOfOrderOperation(
                "compile() requires build_source() to have completed",
            ));
        }

        // Stale artifacts must not survive a failed build.
        match fs::remove_file(&self.paths.output_file) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        for library in &self.libraries {
            tracing::info!(library = %library, "ensuring library");
            self.packages.install_if_absent(library)?;
        }

        assets::stage(self.model, self.settings, self.paths.staging_dir())?;

        self.render_template_files()?;

        let command = self.build_command()?;
        tracing::info!(command = %command.join(" "), "compiling");

        let src_dir = self.paths.src_dir();
        let result = process::run(&src_dir, &command[0], &command[1..], false)?;
        if !result.success {
            return Err(Error::Toolchain {
                exit_code: result.exit_code,
                output: result.output,
            });
        }
        self.phase = Phase::Compiled;
        Ok(result)
    }

    /// Run the compiled artifact with the subtarget's interpreter.
    ///
    /// Fails with [`Error::ArtifactMissing`] before spawning anything when
    /// the artifact is not on disk. With `redirect`, the child inherits the
    /// caller's standard streams.
    pub fn run(&self, redirect: bool) -> Result<ProcessResult> {
        if self.phase != Phase::Compiled {
            return Err(Error::OutOfOrderOperation(
                "run() requires a successful compile()",
            ));
        }
        if !self.paths.output_file.exists() {
            return Err(Error::ArtifactMissing(self.paths.output_file.clone()));
        }

        let artifact = format!(
            "{}{}",
            self.paths.output_file.display(),
            self.subtarget.interpreter_suffix
        );
        let working_dir = self
            .paths
            .output_file
            .parent()
            .map_or_else(|| self.paths.target_dir.clone(), Path::to_path_buf);

        tracing::info!(
            interpreter = %self.subtarget.interpreter,
            artifact = %artifact,
            "running artifact"
        );
        process::run(&working_dir, &self.subtarget.interpreter, &[artifact], redirect)
    }

    /// Copy metadata-declared template files through the renderer into the
    /// source tree.
    fn render_template_files(&self) -> Result<()> {
        let src_dir = self.paths.src_dir();
        for metadata in self.model.all_metadata() {
            let Metadata::TemplateFiles(paths) = metadata else {
                continue;
            };
            for path in paths {
                let raw = self.model.resources().read(path)?;
                let text = String::from_utf8_lossy(raw);
                let rendered = self.render(&text)?;
                let dest = src_dir.join(path);
                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent)?;
                }
                tracing::debug!(file = %path, "rendering template file");
                fs::write(dest, rendered)?;
            }
        }
        Ok(())
    }
}

/// Assemble the parameter set every render sees. Entry-point parameters are
/// appended later by `build_source()`.
fn initial_params(
    settings: &BuildSettings,
    paths: &TargetPaths,
    subtarget: &SubtargetSpec,
    libraries: &[LibraryRef],
) -> Params {
    let mut params = Params::new();

    params.set("src_dir", paths.src_dir().display().to_string());
    params.set("output_file", paths.output_file.display().to_string());
    if let Some(staging) = paths.staging_dir() {
        params.set("assets_dir", staging.display().to_string());
    }

    params.set("release", settings.release);
    params.set("debug", !settings.release);

    params.set(
        "subtarget",
        Value::map([
            ("name", Value::from(subtarget.name.as_str())),
            ("cmd_switch", Value::from(subtarget.cmd_switch.as_str())),
            ("interpreter", Value::from(subtarget.interpreter.as_str())),
            (
                "interpreter_suffix",
                Value::from(subtarget.interpreter_suffix.as_str()),
            ),
        ]),
    );

    let flags = libs::library_flags(libraries)
        .into_iter()
        .map(|(name, value)| {
            Value::map([("name", Value::from(name)), ("value", Value::from(value))])
        })
        .collect::<Vec<_>>();
    params.set("extra_flags", flags);
    params.set("extra_defines", libs::build_defines(settings));

    params.set("title", settings.title.as_str());
    params.set("name", settings.name.as_str());
    params.set("package", settings.package.as_str());
    params.set("version", settings.version.as_str());
    params.set("company", settings.company.as_str());
    params.set("initial_width", settings.initial_width);
    params.set("initial_height", settings.initial_height);
    params.set("orientation", settings.orientation.low_name());
    params.set("embed_resources", settings.embed_resources);
    params.set(
        "assets",
        settings
            .assets
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>(),
    );
    params.set(
        "has_icon",
        settings.icon.as_deref().is_some_and(|icon| !icon.is_empty()),
    );
    params.set("icon", settings.icon.clone().unwrap_or_default());
    params.set("libraries", settings.libraries.clone());

    params
}
