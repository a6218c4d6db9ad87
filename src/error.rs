//! Error taxonomy for the build stages.
//!
//! Configure, compile, and install failures each carry enough detail for the
//! host to report verbatim; none are retried or recovered locally. The smoke
//! test deliberately has no error type at all, it reports a bare boolean.

use std::path::PathBuf;
use thiserror::Error;

/// A failure in one of the build stages.
#[derive(Debug, Error)]
pub enum StageError {
    /// The configure step exited non-zero. `diagnostics` is the tool's own
    /// output, untouched.
    #[error("configure failed (exit {status}):\n{diagnostics}")]
    Configure { status: i32, diagnostics: String },

    /// The compile step exited non-zero.
    #[error("compile failed (exit {status}):\n{diagnostics}")]
    Compile { status: i32, diagnostics: String },

    /// The build tool could not be launched at all.
    #[error("failed to execute '{program}'")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Compile reported success but left nothing at the expected output path.
    #[error("install failed: no binary at '{path}'")]
    MissingArtifact { path: PathBuf },

    /// Copying the binary into the destination failed.
    #[error("install failed copying '{src}' to '{dest}'")]
    Install {
        src: PathBuf,
        dest: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StageError {
    /// Raw diagnostic text from the external tool, if this stage captured any.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            StageError::Configure { diagnostics, .. }
            | StageError::Compile { diagnostics, .. } => Some(diagnostics),
            _ => None,
        }
    }
}
