//! Machine-readable outcome report.
//!
//! The host package manager consumes the install result as JSON rather than
//! scraping progress output.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::resolver::BuildOutcome;

/// Write the outcome of one install run as JSON.
pub fn write_outcome(path: &Path, outcome: &BuildOutcome) -> Result<()> {
    let json = serde_json::to_vec_pretty(outcome).context("serializing install outcome")?;
    fs::write(path, json)
        .with_context(|| format!("writing install outcome to '{}'", path.display()))?;
    Ok(())
}
