//! Compiler configuration
//!
//! The four recognized keys, in their string-keyed form:
//!
//! | Key                  | Default   |
//! |----------------------|-----------|
//! | `inputFile`          | none      |
//! | `optimize`           | `"false"` |
//! | `registerAllocation` | `"-1"`    |
//! | `debug`              | `"false"` |
//!
//! `optimize` and `registerAllocation` are recorded only; no stage reads
//! them.

use crate::compiler::error::{CompileError, CompileResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const INPUT_FILE: &str = "inputFile";
pub const OPTIMIZE: &str = "optimize";
pub const REGISTER_ALLOCATION: &str = "registerAllocation";
pub const DEBUG: &str = "debug";

/// Compiler settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerConfig {
    /// Source file to compile
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_file: Option<PathBuf>,

    pub optimize: bool,

    /// Register budget, `-1` for none
    pub register_allocation: i32,

    /// Print the AST, symbol table and IR while compiling
    pub debug: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            input_file: None,
            optimize: false,
            register_allocation: -1,
            debug: false,
        }
    }
}

fn parse_bool(key: &str, value: &str) -> CompileResult<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(CompileError::Config {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

impl CompilerConfig {
    /// Build from string keys and values. Unknown keys are ignored.
    pub fn from_map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> CompileResult<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in entries {
            config.set(key.as_ref(), value.as_ref())?;
        }
        Ok(config)
    }

    /// Set one string-keyed value.
    pub fn set(&mut self, key: &str, value: &str) -> CompileResult<()> {
        match key {
            INPUT_FILE => self.input_file = Some(PathBuf::from(value)),
            OPTIMIZE => self.optimize = parse_bool(key, value)?,
            REGISTER_ALLOCATION => {
                self.register_allocation = value.parse().map_err(|_| CompileError::Config {
                    key: key.to_string(),
                    value: value.to_string(),
                })?;
            }
            DEBUG => self.debug = parse_bool(key, value)?,
            other => log::debug!("ignoring unknown configuration key '{}'", other),
        }
        Ok(())
    }

    /// The string-keyed form.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        if let Some(input) = &self.input_file {
            map.insert(INPUT_FILE.to_string(), input.display().to_string());
        }
        map.insert(OPTIMIZE.to_string(), self.optimize.to_string());
        map.insert(
            REGISTER_ALLOCATION.to_string(),
            self.register_allocation.to_string(),
        );
        map.insert(DEBUG.to_string(), self.debug.to_string());
        map
    }

    /// Parse a TOML document using the same keys.
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Load a TOML configuration file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> CompileResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source).map_err(|err| CompileError::ConfigFile {
            path: path.to_path_buf(),
            message: err.message().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = CompilerConfig::default();
        assert_eq!(config.input_file, None);
        assert!(!config.optimize);
        assert_eq!(config.register_allocation, -1);
        assert!(!config.debug);
    }

    #[test]
    fn test_from_map() {
        let config = CompilerConfig::from_map([
            ("inputFile", "Main.jmm"),
            ("optimize", "true"),
            ("registerAllocation", "4"),
            ("debug", "false"),
            ("somethingElse", "x"),
        ])
        .unwrap();
        assert_eq!(config.input_file, Some(PathBuf::from("Main.jmm")));
        assert!(config.optimize);
        assert_eq!(config.register_allocation, 4);
        assert!(!config.debug);
    }

    #[test]
    fn test_from_map_rejects_bad_values() {
        let err = CompilerConfig::from_map([("optimize", "yes")]).unwrap_err();
        assert!(matches!(err, CompileError::Config { ref key, .. } if key == "optimize"));

        let err = CompilerConfig::from_map([("registerAllocation", "many")]).unwrap_err();
        assert!(matches!(err, CompileError::Config { ref value, .. } if value == "many"));
    }

    #[test]
    fn test_to_map_round_trips() {
        let config = CompilerConfig::from_map([("inputFile", "A.jmm"), ("debug", "true")]).unwrap();
        let map = config.to_map();
        assert_eq!(map["debug"], "true");
        assert_eq!(map["registerAllocation"], "-1");
        assert_eq!(CompilerConfig::from_map(&map).unwrap(), config);
    }

    #[test]
    fn test_from_toml() {
        let config = CompilerConfig::from_toml_str("optimize = true\nregisterAllocation = 2\n").unwrap();
        assert!(config.optimize);
        assert_eq!(config.register_allocation, 2);
        assert!(!config.debug);
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "debug = true").unwrap();
        writeln!(file, "inputFile = \"Prog.jmm\"").unwrap();
        let config = CompilerConfig::from_toml_file(file.path()).unwrap();
        assert!(config.debug);
        assert_eq!(config.input_file, Some(PathBuf::from("Prog.jmm")));

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        writeln!(bad, "debug = \"maybe\"").unwrap();
        assert!(matches!(
            CompilerConfig::from_toml_file(bad.path()),
            Err(CompileError::ConfigFile { .. })
        ));
    }
}
