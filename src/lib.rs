//! Build-from-source driver for formula-defined packages.
//!
//! A formula declares a package's metadata and dependencies; this crate is
//! the behavior-bearing half: given the host platform and a set of optional
//! feature flags, it derives the CMake configure arguments, runs the
//! two-phase build, installs the produced binary, and smoke-tests it.
//!
//! - **Resolver** - pure derivation of configure arguments from platform and
//!   features, host-supplied flags always last
//! - **Build stages** - configure, compile, install, smoke test; sequential
//!   and blocking, failures surface the external tool's diagnostics verbatim
//! - **Preflight checks** - required-tool validation before anything runs
//!
//! # Example
//!
//! ```rust,ignore
//! use std::path::Path;
//! use formula_builder::{
//!     build::BuildTool,
//!     formula::Formula,
//!     pipeline::run_install,
//!     platform::Platform,
//!     resolver::BuildRequest,
//! };
//!
//! let formula = Formula::load(Path::new("formulas/signalbackup-tools.toml"))?;
//! let platform = Platform::host()?;
//! let request = BuildRequest {
//!     platform,
//!     features: formula.default_features(platform),
//!     standard_args: vec!["-DCMAKE_BUILD_TYPE=Release".into()],
//! };
//! let outcome = run_install(&formula, &BuildTool::find()?, &request, &source, &dest)?;
//! assert!(outcome.smoke_test_passed);
//! ```

pub mod build;
pub mod error;
pub mod formula;
pub mod install;
pub mod pipeline;
pub mod platform;
pub mod preflight;
pub mod process;
pub mod report;
pub mod resolver;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::StageError;
pub use formula::Formula;
pub use pipeline::run_install;
pub use platform::{Feature, FeatureSet, Platform};
pub use resolver::{resolve_args, BuildOutcome, BuildRequest};
