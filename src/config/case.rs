//! Per-case TOML documents (`case.toml`).
//!
//! A case carries three optional tables: `[meta]` (name, solver version),
//! `[flags]` (boolean feature switches) and `[parameters]` (numbers such as
//! inflow velocity or Froude number). Flags and parameters are open maps so a
//! variant written back to disk keeps every key the base case had.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::error::ConfigError;

//─────────────────────────────────────────────────────────────────────────────

/// Solver version used when `[meta].version` is absent.
pub const DEFAULT_SOLVER_VERSION: &str = "of13";

/// Case name used when `[meta].name` is absent.
pub const UNNAMED_CASE: &str = "unnamed";

/// The `[meta]` table of a case document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, toml::Value>,
}

/// A parsed `case.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseConfig {
    pub meta: CaseMeta,
    pub flags: BTreeMap<String, toml::Value>,
    pub parameters: BTreeMap<String, toml::Value>,
}

impl CaseConfig {
    /// Reads and parses a case document from disk.
    ///
    /// # Errors
    /// Returns `ConfigError::Read` if the file cannot be read and
    /// `ConfigError::Parse` if it is not a valid case document. Both are
    /// fatal for the invoking command.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parses a case document from a TOML string.
    #[cfg(test)]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, "<string>")
    }

    fn parse(content: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Serializes the case back into TOML text.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Writes the case document to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_toml()?;
        fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    pub fn name(&self) -> &str {
        self.meta.name.as_deref().unwrap_or(UNNAMED_CASE)
    }

    /// Solver version, which selects the base configuration tree.
    pub fn solver_version(&self) -> &str {
        self.meta.version.as_deref().unwrap_or(DEFAULT_SOLVER_VERSION)
    }

    pub fn set_name(&mut self, name: &str) {
        self.meta.name = Some(name.to_string());
    }

    /// Returns a numeric parameter, accepting both TOML floats and integers.
    pub fn parameter(&self, key: &str) -> Option<f64> {
        match self.parameters.get(key)? {
            toml::Value::Float(v) => Some(*v),
            toml::Value::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn set_parameter(&mut self, key: &str, value: f64) {
        self.parameters
            .insert(key.to_string(), toml::Value::Float(value));
    }

    /// Inflow velocity in m/s.
    pub fn velocity(&self) -> Option<f64> {
        self.parameter("velocity")
    }

    pub fn froude(&self) -> Option<f64> {
        self.parameter("froude")
    }

    /// Reference hull length in metres.
    pub fn length(&self) -> Option<f64> {
        self.parameter("length")
    }
}
