//! Host platform identification and the optional feature set.
//!
//! The feature set is closed: `dbus` is the only flag that changes derived
//! build arguments. Unknown feature names are ignored rather than rejected,
//! so hosts can pass their full option list through without filtering.

use anyhow::{bail, Result};
use std::fmt;
use std::str::FromStr;

/// Supported host platform families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Macos,
}

impl Platform {
    /// Detect the platform this binary was compiled for.
    pub fn host() -> Result<Platform> {
        if cfg!(target_os = "linux") {
            Ok(Platform::Linux)
        } else if cfg!(target_os = "macos") {
            Ok(Platform::Macos)
        } else {
            bail!("unsupported host platform; expected linux or macos")
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Macos => "macos",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Platform> {
        match value.trim().to_ascii_lowercase().as_str() {
            "linux" => Ok(Platform::Linux),
            "macos" | "darwin" => Ok(Platform::Macos),
            other => bail!("unsupported platform '{}'; expected linux or macos", other),
        }
    }
}

/// Optional build features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    /// System bus integration (Linux only in practice).
    Dbus,
}

impl Feature {
    /// Parse a feature name; unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Feature> {
        match name.trim().to_ascii_lowercase().as_str() {
            "dbus" => Some(Feature::Dbus),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Dbus => "dbus",
        }
    }
}

/// Set of enabled optional features for one install run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureSet {
    enabled: Vec<Feature>,
}

impl FeatureSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a set from raw names, silently ignoring unknown ones.
    pub fn from_names<'a, I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut set = Self::empty();
        for name in names {
            if let Some(feature) = Feature::from_name(name) {
                set.enable(feature);
            }
        }
        set
    }

    pub fn enable(&mut self, feature: Feature) {
        if !self.contains(feature) {
            self.enabled.push(feature);
        }
    }

    pub fn disable(&mut self, feature: Feature) {
        self.enabled.retain(|f| *f != feature);
    }

    pub fn contains(&self, feature: Feature) -> bool {
        self.enabled.contains(&feature)
    }
}
