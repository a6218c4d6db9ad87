//! Formula metadata.
//!
//! A formula is the declarative half of a package recipe: name, provenance,
//! and dependency declarations. The host package manager resolves library
//! dependencies before a build starts; this crate only reads the formula to
//! know which command-line tools must be discoverable and what the built
//! binary is called.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::platform::{Feature, FeatureSet, Platform};

/// One package recipe, loaded from a formula TOML file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Formula {
    pub name: String,
    pub description: String,
    pub homepage: String,
    pub license: String,
    /// Source repository the host fetches before the build runs.
    pub repository: String,
    pub branch: Option<String>,
    #[serde(default, rename = "dependency")]
    pub dependencies: Vec<Dependency>,
}

/// A declared dependency of the formula.
///
/// Libraries are resolved by the host's dependency installer; build tools
/// must be discoverable on PATH when the build runs.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dependency {
    /// Package name, as the host's dependency installer knows it.
    pub name: String,
    #[serde(default)]
    pub kind: DependencyKind,
    /// Command preflight should look for, when it differs from the package
    /// name (e.g. package `pkgconf` providing `pkg-config`).
    pub tool: Option<String>,
    /// Only applies on this platform, if set.
    pub platform: Option<String>,
    /// Only required when this feature is enabled, if set.
    pub feature: Option<String>,
    /// Recommended deps default on for their platform but can be disabled.
    #[serde(default)]
    pub recommended: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    /// Needed only while building (cmake, pkg-config).
    Build,
    /// Linked into the built binary (openssl, sqlite).
    #[default]
    Library,
}

impl Formula {
    /// Load and validate a formula from a TOML file.
    pub fn load(path: &Path) -> Result<Formula> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading formula '{}'", path.display()))?;
        let formula: Formula = toml::from_str(&text)
            .with_context(|| format!("parsing formula '{}'", path.display()))?;

        if formula.name.trim().is_empty() {
            bail!("invalid formula '{}': name must not be empty", path.display());
        }
        for dep in &formula.dependencies {
            if let Some(platform) = &dep.platform {
                platform.parse::<Platform>().with_context(|| {
                    format!(
                        "invalid formula '{}': dependency '{}'",
                        path.display(),
                        dep.name
                    )
                })?;
            }
            if let Some(feature) = &dep.feature {
                if Feature::from_name(feature).is_none() {
                    bail!(
                        "invalid formula '{}': dependency '{}' gated on unknown feature '{}'",
                        path.display(),
                        dep.name,
                        feature
                    );
                }
            }
        }

        Ok(formula)
    }

    /// Name of the binary the build produces. Matches the formula name.
    pub fn binary_name(&self) -> &str {
        &self.name
    }

    /// Build tools that must be on PATH for this platform and feature set,
    /// as (command, package) pairs for the preflight error message.
    pub fn required_tools(&self, platform: Platform, features: &FeatureSet) -> Vec<(&str, &str)> {
        self.dependencies
            .iter()
            .filter(|dep| dep.kind == DependencyKind::Build)
            .filter(|dep| dep.applies(platform, features))
            .map(|dep| (dep.tool_name(), dep.name.as_str()))
            .collect()
    }

    /// Features enabled by default on `platform`: every recommended
    /// dependency whose name is a known feature turns that feature on.
    pub fn default_features(&self, platform: Platform) -> FeatureSet {
        let mut set = FeatureSet::empty();
        for dep in &self.dependencies {
            if !dep.recommended || !dep.applies(platform, &set) {
                continue;
            }
            if let Some(feature) = Feature::from_name(&dep.name) {
                set.enable(feature);
            }
        }
        set
    }
}

impl Dependency {
    /// Command name to look for on PATH. Defaults to the package name.
    pub fn tool_name(&self) -> &str {
        self.tool.as_deref().unwrap_or(&self.name)
    }

    /// Whether this dependency is in play for the given platform and features.
    pub fn applies(&self, platform: Platform, features: &FeatureSet) -> bool {
        if let Some(dep_platform) = &self.platform {
            match dep_platform.parse::<Platform>() {
                Ok(p) if p == platform => {}
                _ => return false,
            }
        }
        if let Some(feature) = &self.feature {
            match Feature::from_name(feature) {
                Some(f) if features.contains(f) => {}
                _ => return false,
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const SIGNALBACKUP: &str = r#"
        name = "signalbackup-tools"
        description = "Tool to work with Signal backup files"
        homepage = "https://github.com/bepaald/signalbackup-tools"
        license = "GPL-3.0-or-later"
        repository = "https://github.com/bepaald/signalbackup-tools.git"
        branch = "master"

        [[dependency]]
        name = "cmake"
        kind = "build"

        [[dependency]]
        name = "openssl@3"

        [[dependency]]
        name = "sqlite"

        [[dependency]]
        name = "dbus"
        platform = "linux"
        recommended = true

        [[dependency]]
        name = "pkg-config"
        kind = "build"
        feature = "dbus"
    "#;

    fn write_formula(dir: &Path, text: &str) -> PathBuf {
        let path = dir.join("formula.toml");
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_load_full_formula() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_formula(dir.path(), SIGNALBACKUP);

        let formula = Formula::load(&path).unwrap();
        assert_eq!(formula.name, "signalbackup-tools");
        assert_eq!(formula.binary_name(), "signalbackup-tools");
        assert_eq!(formula.branch.as_deref(), Some("master"));
        assert_eq!(formula.dependencies.len(), 5);
    }

    #[test]
    fn test_required_tools_follow_features() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_formula(dir.path(), SIGNALBACKUP);
        let formula = Formula::load(&path).unwrap();

        let with_dbus = formula.default_features(Platform::Linux);
        assert_eq!(
            formula.required_tools(Platform::Linux, &with_dbus),
            vec![("cmake", "cmake"), ("pkg-config", "pkg-config")]
        );

        let without = FeatureSet::empty();
        assert_eq!(
            formula.required_tools(Platform::Linux, &without),
            vec![("cmake", "cmake")]
        );
    }

    #[test]
    fn test_default_features_follow_recommended_deps() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_formula(dir.path(), SIGNALBACKUP);
        let formula = Formula::load(&path).unwrap();

        // dbus is recommended on Linux only.
        assert!(formula
            .default_features(Platform::Linux)
            .contains(Feature::Dbus));
        assert!(!formula
            .default_features(Platform::Macos)
            .contains(Feature::Dbus));
    }

    #[test]
    fn test_tool_name_can_differ_from_package() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_formula(
            dir.path(),
            r#"
            name = "x"
            description = ""
            homepage = ""
            license = ""
            repository = ""

            [[dependency]]
            name = "pkgconf"
            kind = "build"
            tool = "pkg-config"
            "#,
        );
        let formula = Formula::load(&path).unwrap();
        assert_eq!(
            formula.required_tools(Platform::Linux, &FeatureSet::empty()),
            vec![("pkg-config", "pkgconf")]
        );
    }

    #[test]
    fn test_platform_gated_dependency() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_formula(dir.path(), SIGNALBACKUP);
        let formula = Formula::load(&path).unwrap();

        let dbus = formula
            .dependencies
            .iter()
            .find(|d| d.name == "dbus")
            .unwrap();
        assert!(dbus.applies(Platform::Linux, &FeatureSet::empty()));
        assert!(!dbus.applies(Platform::Macos, &FeatureSet::empty()));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_formula(
            dir.path(),
            "name = \"x\"\ndescription = \"\"\nhomepage = \"\"\nlicense = \"\"\nrepository = \"\"\nsurprise = 1\n",
        );
        let err = Formula::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("parsing formula"));
    }

    #[test]
    fn test_unknown_feature_gate_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_formula(
            dir.path(),
            r#"
            name = "x"
            description = ""
            homepage = ""
            license = ""
            repository = ""

            [[dependency]]
            name = "pkg-config"
            kind = "build"
            feature = "wayland"
            "#,
        );
        let err = Formula::load(&path).unwrap_err();
        assert!(format!("{}", err).contains("unknown feature 'wayland'"));
    }

    #[test]
    fn test_bundled_formula_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("formulas/signalbackup-tools.toml");
        let formula = Formula::load(&path).unwrap();
        assert_eq!(formula.binary_name(), "signalbackup-tools");
    }
}
