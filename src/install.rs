//! Install and smoke-test stages.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StageError;
use crate::process::Cmd;

/// Copy the built binary into the destination directory.
///
/// Fails if the binary is missing (compile reported success but produced no
/// artifact at the expected path) or if the destination cannot be written.
/// Returns the installed path.
pub fn install(binary: &Path, dest_dir: &Path) -> Result<PathBuf, StageError> {
    if !binary.is_file() {
        return Err(StageError::MissingArtifact {
            path: binary.to_path_buf(),
        });
    }

    let file_name = binary.file_name().ok_or_else(|| StageError::MissingArtifact {
        path: binary.to_path_buf(),
    })?;
    let dest = dest_dir.join(file_name);

    let copy_err = |source: std::io::Error| StageError::Install {
        src: binary.to_path_buf(),
        dest: dest.clone(),
        source,
    };

    fs::create_dir_all(dest_dir).map_err(copy_err)?;
    // fs::copy preserves the executable bit on unix.
    fs::copy(binary, &dest).map_err(copy_err)?;

    Ok(dest)
}

/// Minimal liveness check of the installed binary.
///
/// Invokes it with `--help` and observes only the exit status. Launch
/// failure, crash, and non-zero exit all collapse to `false`; no timeout, no
/// retry, no output inspection. Proves the binary starts, nothing more.
pub fn smoke_test(installed: &Path) -> bool {
    Cmd::new(installed)
        .arg("--help")
        .status_only()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::write_script;

    #[test]
    fn test_install_missing_artifact_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = install(&dir.path().join("build/mytool"), &dir.path().join("bin")).unwrap_err();
        assert!(matches!(err, StageError::MissingArtifact { .. }));
    }

    #[test]
    fn test_install_copies_binary_and_keeps_exec_bit() {
        let dir = tempfile::tempdir().unwrap();
        let built = write_script(dir.path(), "mytool", "exit 0\n");
        let bin_dir = dir.path().join("bin");

        let installed = install(&built, &bin_dir).unwrap();
        assert_eq!(installed, bin_dir.join("mytool"));
        assert!(installed.is_file());
        assert!(smoke_test(&installed));
    }

    #[test]
    fn test_install_unwritable_destination_fails() {
        let dir = tempfile::tempdir().unwrap();
        let built = write_script(dir.path(), "mytool", "exit 0\n");
        // A regular file where the destination directory should be.
        let blocked = dir.path().join("bin");
        fs::write(&blocked, "").unwrap();

        let err = install(&built, &blocked).unwrap_err();
        assert!(matches!(err, StageError::Install { .. }));
    }

    #[test]
    fn test_smoke_test_nonzero_exit_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        // e.g. a missing runtime library at startup
        let bad = write_script(dir.path(), "mytool", "exit 1\n");
        assert!(!smoke_test(&bad));
    }

    #[test]
    fn test_smoke_test_missing_binary_is_failure() {
        assert!(!smoke_test(Path::new("/no/such/binary")));
    }
}
