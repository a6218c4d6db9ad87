//! Configure and compile stages.
//!
//! Both stages shell out to the build tool and block until it finishes. A
//! non-zero exit aborts the run with the tool's own diagnostics carried
//! verbatim; there is no retry and no partial-success notion.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::error::StageError;
use crate::process::{diagnostics_from, Cmd};
use crate::resolver::BUILD_DIR;

/// Resolved path to the external build tool (cmake).
///
/// Resolution order:
/// 1. `CMAKE_BIN` env var (path to binary)
/// 2. System PATH
#[derive(Debug, Clone)]
pub struct BuildTool {
    pub path: PathBuf,
}

impl BuildTool {
    pub fn find() -> Result<BuildTool> {
        if let Ok(bin_path) = env::var("CMAKE_BIN") {
            let path = PathBuf::from(&bin_path);
            if path.is_file() {
                return Ok(BuildTool { path });
            }
            bail!("CMAKE_BIN points to non-existent path: {}", bin_path);
        }

        if let Ok(path) = which::which("cmake") {
            return Ok(BuildTool { path });
        }

        bail!(
            "Could not find cmake.\n\n\
             Resolution order tried:\n\
             1. CMAKE_BIN env var - not set\n\
             2. System PATH - not found\n\n\
             Solutions:\n\
             - Set CMAKE_BIN=/path/to/cmake\n\
             - Install cmake to PATH"
        )
    }
}

/// Run the configure step in `source_dir` with the resolved argument list.
///
/// Creates or reuses the `build/` output directory. On non-zero exit the
/// error carries the tool's raw stdout/stderr with no reinterpretation.
pub fn configure(tool: &BuildTool, source_dir: &Path, args: &[String]) -> Result<(), StageError> {
    let output = Cmd::new(&tool.path)
        .args(args.iter().cloned())
        .current_dir(source_dir)
        .output()
        .map_err(|source| StageError::Spawn {
            program: tool.path.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(StageError::Configure {
            status: output.status.code().unwrap_or(-1),
            diagnostics: diagnostics_from(&output),
        });
    }

    Ok(())
}

/// Run the compile step against the configured build directory.
///
/// Compiles take a while, so output is streamed to the caller's stdio as it
/// happens while still being captured for the error path. Returns the path
/// where the binary is expected. A failed compile yields no usable path;
/// whether a "successful" compile actually produced the file is checked by
/// the install stage.
pub fn compile(
    tool: &BuildTool,
    source_dir: &Path,
    binary_name: &str,
) -> Result<PathBuf, StageError> {
    let (status, diagnostics) = Cmd::new(&tool.path)
        .args(["--build", BUILD_DIR])
        .current_dir(source_dir)
        .stream()
        .map_err(|source| StageError::Spawn {
            program: tool.path.clone(),
            source,
        })?;

    if !status.success() {
        return Err(StageError::Compile {
            status: status.code().unwrap_or(-1),
            diagnostics,
        });
    }

    Ok(source_dir.join(BUILD_DIR).join(binary_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::write_script;

    #[test]
    fn test_configure_success_runs_in_source_dir() {
        let dir = tempfile::tempdir().unwrap();
        let stub = write_script(dir.path(), "cmake", "mkdir -p build\nexit 0\n");
        let tool = BuildTool { path: stub };

        configure(&tool, dir.path(), &["-B".into(), "build".into()]).unwrap();
        assert!(dir.path().join("build").is_dir());
    }

    #[test]
    fn test_configure_failure_carries_raw_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        let stub = write_script(
            dir.path(),
            "cmake",
            "echo 'CMake Error: Could NOT find OpenSSL' >&2\nexit 1\n",
        );
        let tool = BuildTool { path: stub };

        let err = configure(&tool, dir.path(), &[]).unwrap_err();
        match &err {
            StageError::Configure { status, diagnostics } => {
                assert_eq!(*status, 1);
                assert_eq!(diagnostics.trim(), "CMake Error: Could NOT find OpenSSL");
            }
            other => panic!("expected Configure error, got {:?}", other),
        }
    }

    #[test]
    fn test_compile_failure_surfaces_compiler_output() {
        let dir = tempfile::tempdir().unwrap();
        let stub = write_script(
            dir.path(),
            "cmake",
            "echo 'main.cc:1:1: error: expected declaration' >&2\nexit 1\n",
        );
        let tool = BuildTool { path: stub };

        let err = compile(&tool, dir.path(), "mytool").unwrap_err();
        assert_eq!(
            err.diagnostics().unwrap().trim(),
            "main.cc:1:1: error: expected declaration"
        );
        assert!(matches!(err, StageError::Compile { status: 1, .. }));
    }

    #[test]
    fn test_compile_returns_expected_binary_path() {
        let dir = tempfile::tempdir().unwrap();
        let stub = write_script(dir.path(), "cmake", "exit 0\n");
        let tool = BuildTool { path: stub };

        let path = compile(&tool, dir.path(), "mytool").unwrap();
        assert_eq!(path, dir.path().join("build/mytool"));
    }

    #[test]
    fn test_spawn_failure_is_not_a_configure_error() {
        let tool = BuildTool {
            path: PathBuf::from("/no/such/cmake"),
        };
        let dir = tempfile::tempdir().unwrap();
        let err = configure(&tool, dir.path(), &[]).unwrap_err();
        assert!(matches!(err, StageError::Spawn { .. }));
    }
}
