//! Fixture loading and management.

use std::path::Path;

use ecert_membrane::RuntimeMode;
use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

/// One runtime call in a fixture script, tagged by `op`.
///
/// ```json
/// {"op": "get_string", "capacity": 4}
/// {"op": "validate_boolean_op", "left": 1, "op_char": "&", "right": 2, "line": 7}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RuntimeCall {
    GetInteger,
    GetBool,
    GetFloat,
    /// Stage into a caller buffer (`getString` / `getStringBounded`).
    /// Without `capacity` the default 1024-byte buffer is used.
    GetString {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        capacity: Option<usize>,
    },
    GetStagedString,
    PutInteger {
        value: i32,
    },
    PutBool {
        value: i32,
    },
    PutFloat {
        value: f32,
    },
    PutString {
        value: String,
    },
    ValidateBooleanOp {
        left: i32,
        op_char: char,
        right: i32,
        line: i32,
    },
}

impl RuntimeCall {
    /// Exported C symbol this call stands for.
    #[must_use]
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::GetInteger => "getInteger",
            Self::GetBool => "getBool",
            Self::GetFloat => "getFloat",
            Self::GetString { capacity: None } => "getString",
            Self::GetString { capacity: Some(_) } => "getStringBounded",
            Self::GetStagedString => "getStagedString",
            Self::PutInteger { .. } => "putInteger",
            Self::PutBool { .. } => "putBool",
            Self::PutFloat { .. } => "putFloat",
            Self::PutString { .. } => "putString",
            Self::ValidateBooleanOp { .. } => "validateBooleanOp",
        }
    }

    /// Parse a JSON array of calls (the `run` subcommand's `--calls`).
    pub fn parse_list(json: &str) -> Result<Vec<Self>, HarnessError> {
        serde_json::from_str(json).map_err(HarnessError::Calls)
    }
}

/// A single fixture test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureCase {
    /// Case identifier.
    pub name: String,
    /// Section of the runtime contract the case exercises.
    pub section: String,
    /// `strict`, `hardened` or `both`.
    pub mode: String,
    /// Text fed to standard input.
    #[serde(default)]
    pub stdin: String,
    pub calls: Vec<RuntimeCall>,
    /// Exact bytes expected on standard output, diagnostic included.
    pub expected_stdout: String,
    /// Values returned by the `get*` calls, in order. Unchecked when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_returns: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub expected_exit: i32,
    /// `legacy` selects the legacy right-operand diagnostic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl FixtureCase {
    /// Returns true if the case applies under `mode`.
    #[must_use]
    pub fn applies_to(&self, mode: RuntimeMode) -> bool {
        let case = self.mode.to_ascii_lowercase();
        case == "both" || case == mode.as_str()
    }
}

/// A collection of fixture cases for one area of the runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    /// Family name (`input`, `output`, `validate`, ...).
    pub family: String,
    /// Individual test cases.
    pub cases: Vec<FixtureCase>,
}

impl FixtureSet {
    /// Load fixture set from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize fixture set to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load fixture set from a file path.
    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        let content = std::fs::read_to_string(path).map_err(|source| HarnessError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| HarnessError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reject cases whose mode is not `strict`, `hardened` or `both`.
    pub fn validate(&self) -> Result<(), HarnessError> {
        for case in &self.cases {
            let mode = case.mode.to_ascii_lowercase();
            if !matches!(mode.as_str(), "strict" | "hardened" | "both") {
                return Err(HarnessError::Mode(case.mode.clone()));
            }
        }
        Ok(())
    }
}

/// Sorted `*.json` files directly inside `dir`.
pub fn fixture_paths(dir: &Path) -> Result<Vec<std::path::PathBuf>, HarnessError> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .map_err(|source| HarnessError::Read {
            path: dir.to_path_buf(),
            source,
        })?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    paths.sort();
    Ok(paths)
}
