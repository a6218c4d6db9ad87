//! Conditional build-configuration resolver.
//!
//! Pure derivation of the configure argument list from platform and feature
//! inputs. Host-supplied standard arguments always come last so they can
//! override anything the resolver derives (later flags win in cmake), while
//! resolver-derived flags still take effect unless explicitly overridden.

use std::path::PathBuf;

use crate::platform::{Feature, FeatureSet, Platform};

/// Relative build-output directory, created by the configure step.
pub const BUILD_DIR: &str = "build";

/// Flag appended when the dbus feature is disabled.
const WITHOUT_DBUS: &str = "-DWITHOUT_DBUS=1";

/// Inputs for one install run. Ephemeral, discarded when the run ends.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub platform: Platform,
    pub features: FeatureSet,
    /// Host-controlled flags, passed through unmodified and last.
    pub standard_args: Vec<String>,
}

/// Result of one install run.
///
/// Created once compile succeeds, updated by install and the smoke test,
/// then handed to the host and discarded. Never persisted.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BuildOutcome {
    pub built_binary: PathBuf,
    pub installed: bool,
    pub smoke_test_passed: bool,
}

/// Derive the configure argument list. Pure; never fails.
pub fn resolve_args(request: &BuildRequest) -> Vec<String> {
    let mut args: Vec<String> = vec!["-B".into(), BUILD_DIR.into()];

    if !request.features.contains(Feature::Dbus) {
        args.push(WITHOUT_DBUS.into());
    }

    args.extend(request.standard_args.iter().cloned());
    args
}
