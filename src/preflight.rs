//! Preflight checks for build validation.
//!
//! Validates that the host has the required build tools before invoking
//! anything. This prevents cryptic errors partway through a build.

use anyhow::{bail, Result};

use crate::formula::Formula;
use crate::platform::{FeatureSet, Platform};

/// Check if a command is discoverable on PATH.
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}

/// Check that specific tools are available.
///
/// # Arguments
///
/// * `tools` - Slice of (command, package) tuples
///
/// # Returns
///
/// * `Ok(())` if all tools are found
/// * `Err` listing every missing tool and the package that provides it
pub fn check_required_tools(tools: &[(&str, &str)]) -> Result<()> {
    let mut missing = Vec::new();

    for (tool, package) in tools {
        if !command_exists(tool) {
            missing.push((*tool, *package));
        }
    }

    if !missing.is_empty() {
        let msg = missing
            .iter()
            .map(|(t, p)| format!("  {} (install: {})", t, p))
            .collect::<Vec<_>>()
            .join("\n");
        bail!("Missing required host tools:\n{}", msg);
    }

    Ok(())
}

/// Preflight one install run: every build tool the formula needs for this
/// platform and feature set must be on PATH.
pub fn check_formula_tools(
    formula: &Formula,
    platform: Platform,
    features: &FeatureSet,
) -> Result<()> {
    let tools = formula.required_tools(platform, features);
    check_required_tools(&tools)
}
