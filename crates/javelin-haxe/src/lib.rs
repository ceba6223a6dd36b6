//! Haxe output target for the Javelin AOT build pipeline.
//!
//! This crate provides:
//! - Subtarget catalog and resolution (build variants and their interpreters)
//! - Deterministic Haxe symbol naming for program-model elements
//! - The symbolic-reference resolver and its `:programref:` template tag
//! - Haxelib dependency management
//! - Asset staging into the toolchain's merged-assets directory
//! - The build orchestrator driving generate → compile → run

pub mod assets;
pub mod build;
pub mod libs;
pub mod names;
pub mod refs;
pub mod subtarget;

pub use build::{HaxeBuild, ProgramInfo, SourceGenerator, TargetPaths};
pub use libs::{Haxelib, LibraryRef, PackageSource};
pub use names::HaxeNames;
pub use refs::{ProgramRefTag, RefKind, ReferenceDescriptor, Resolver};
