//! Target-independent core for the Javelin AOT build pipeline.
//!
//! This crate provides:
//! - The read-only program model produced by the upstream front end
//! - Build settings recognized by every output target
//! - The text-template engine with pluggable custom tags
//! - Synchronous subprocess execution
//! - The shared error taxonomy for build orchestration

pub mod error;
pub mod model;
pub mod process;
pub mod settings;
pub mod template;

pub use error::{Error, Result};
pub use model::{
    Class, ClassName, Field, Metadata, Method, ProgramModel, ResourceStore, SubtargetSpec,
};
pub use process::{ProcessResult, run};
pub use settings::{BuildSettings, Orientation};
pub use template::{Params, TagHandler, TagSet, Template, Value};
