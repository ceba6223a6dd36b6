//! Error types for javelin-core.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for javelin operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while orchestrating a build.
#[derive(Debug, Error)]
pub enum Error {
    /// No declared subtarget matches the requested name or alias.
    #[error("unknown subtarget: {0}")]
    UnknownSubtarget(String),

    /// A reference descriptor names a class absent from the program model.
    #[error("unknown class: {0}")]
    UnknownClass(String),

    /// A reference descriptor names a member the owner class does not have.
    #[error("unknown member {member} on class {class}")]
    UnknownMember { class: String, member: String },

    /// A method name has several overloads and the descriptor carries no
    /// signature to pick one.
    #[error("ambiguous member {member} on class {class}: several signatures, supply one explicitly")]
    AmbiguousMember { class: String, member: String },

    /// A reference descriptor does not match the expected shape for its kind.
    #[error("malformed reference descriptor: {0}")]
    MalformedDescriptor(String),

    /// A declared library could not be installed.
    #[error("failed to install library {library}: {output}")]
    LibraryInstall { library: String, output: String },

    /// A build phase was invoked before the phase it depends on.
    #[error("out of order operation: {0}")]
    OutOfOrderOperation(&'static str),

    /// The compiled artifact is missing from disk.
    #[error("artifact missing: {}", .0.display())]
    ArtifactMissing(PathBuf),

    /// The external toolchain exited with a nonzero status.
    #[error("toolchain failed with exit code {exit_code}: {output}")]
    Toolchain { exit_code: i32, output: String },

    /// A template could not be parsed.
    #[error("template syntax error: {0}")]
    TemplateSyntax(String),

    /// A logical resource path is not present in the program's resource store.
    #[error("missing resource: {0}")]
    MissingResource(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
