//! Install pipeline: preflight → resolve → configure → compile → install →
//! smoke test.
//!
//! Strictly sequential and blocking; each stage runs to completion before the
//! next begins. Any configure/compile/install failure aborts immediately and
//! propagates the underlying error. The smoke-test result is carried in the
//! outcome rather than raised, so the host decides how hard to fail on it.

use std::path::Path;

use anyhow::{Context, Result};

use crate::build::{compile, configure, BuildTool};
use crate::formula::Formula;
use crate::install::{install, smoke_test};
use crate::preflight::check_formula_tools;
use crate::resolver::{resolve_args, BuildOutcome, BuildRequest};

/// Run one full install of `formula` from `source_dir` into `dest_dir`.
///
/// # Arguments
/// * `formula` - Package metadata; names the binary the build produces
/// * `tool` - Resolved build tool (cmake)
/// * `request` - Platform, feature set, and host-supplied standard args
/// * `source_dir` - Checked-out source tree (host fetched it already)
/// * `dest_dir` - Directory the binary is installed into
pub fn run_install(
    formula: &Formula,
    tool: &BuildTool,
    request: &BuildRequest,
    source_dir: &Path,
    dest_dir: &Path,
) -> Result<BuildOutcome> {
    let tag = format!("[install:{}]", formula.name);

    check_formula_tools(formula, request.platform, &request.features)
        .with_context(|| format!("preflight failed for '{}'", formula.name))?;

    let args = resolve_args(request);
    println!("{} configuring ({})", tag, args.join(" "));
    configure(tool, source_dir, &args)
        .with_context(|| format!("configuring '{}'", formula.name))?;

    println!("{} compiling", tag);
    let built_binary = compile(tool, source_dir, formula.binary_name())
        .with_context(|| format!("compiling '{}'", formula.name))?;

    let mut outcome = BuildOutcome {
        built_binary: built_binary.clone(),
        installed: false,
        smoke_test_passed: false,
    };

    println!("{} installing to {}", tag, dest_dir.display());
    let installed = install(&built_binary, dest_dir)
        .with_context(|| format!("installing '{}'", formula.name))?;
    outcome.installed = true;

    outcome.smoke_test_passed = smoke_test(&installed);
    println!(
        "{} smoke test {}",
        tag,
        if outcome.smoke_test_passed { "passed" } else { "FAILED" }
    );

    Ok(outcome)
}
