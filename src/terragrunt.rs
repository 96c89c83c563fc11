//! Structures of generated Terragrunt configuration files.
//!
//! These mirror the subset of Terragrunt's own configuration schema that
//! terragen emits: a `terraform` block carrying the module source, followed
//! by `include` blocks and `dependency` blocks.

use std::fmt;
use std::str::FromStr;

use hcl::Value;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::encode::{self, Block, Body};

/// A complete generated Terragrunt configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerragruntConfig {
    pub terraform: TerraformConfig,
    #[serde(default)]
    pub includes: Vec<IncludeConfig>,
    #[serde(default)]
    pub dependencies: Vec<DependencyConfig>,
}

/// The `terraform` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerraformConfig {
    pub source: String,
}

/// An `include` block, also used as the fragment type in definitions files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncludeConfig {
    /// Block label; unique within one generated file.
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expose: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_strategy: Option<MergeStrategy>,
}

/// A `dependency` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyConfig {
    pub name: String,
    pub config_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_outputs: Option<bool>,
    /// Arbitrary value handed to Terragrunt when outputs are unavailable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mock_outputs: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mock_outputs_allowed_terraform_commands: Option<Vec<String>>,
}

/// How Terragrunt merges an included configuration into the including one.
/// Not interpreted by terragen; passed through to the generated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    NoMerge,
    Shallow,
    Deep,
    DeepMapOnly,
}

impl MergeStrategy {
    pub const ALL: [MergeStrategy; 4] = [
        MergeStrategy::NoMerge,
        MergeStrategy::Shallow,
        MergeStrategy::Deep,
        MergeStrategy::DeepMapOnly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MergeStrategy::NoMerge => "no_merge",
            MergeStrategy::Shallow => "shallow",
            MergeStrategy::Deep => "deep",
            MergeStrategy::DeepMapOnly => "deep_map_only",
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known merge strategy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown merge strategy '{0}'")]
pub struct UnknownMergeStrategy(pub String);

impl FromStr for MergeStrategy {
    type Err = UnknownMergeStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MergeStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| UnknownMergeStrategy(s.to_string()))
    }
}

impl TerragruntConfig {
    /// Lower into the encode tree: `terraform`, then includes, then dependencies.
    pub fn to_body(&self) -> Body {
        let mut body = Body::new();
        body.block(self.terraform.to_block());
        for include in &self.includes {
            body.block(include.to_block());
        }
        for dependency in &self.dependencies {
            body.block(dependency.to_block());
        }
        body
    }

    /// The file contents terragen writes for this configuration.
    pub fn to_hcl_string(&self) -> String {
        encode::to_string(&self.to_body())
    }
}

impl TerraformConfig {
    fn to_block(&self) -> Block {
        let mut body = Body::new();
        body.attribute("source", Value::String(self.source.clone()));
        Block::new("terraform").body(body)
    }
}

impl IncludeConfig {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            expose: None,
            merge_strategy: None,
        }
    }

    fn to_block(&self) -> Block {
        let mut body = Body::new();
        body.attribute("path", Value::String(self.path.clone()))
            .optional_attribute("expose", self.expose.map(Value::Bool))
            .optional_attribute(
                "merge_strategy",
                self.merge_strategy
                    .map(|strategy| Value::String(strategy.as_str().to_string())),
            );
        Block::new("include").label(self.name.clone()).body(body)
    }
}

impl DependencyConfig {
    pub fn new(name: impl Into<String>, config_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config_path: config_path.into(),
            enabled: None,
            skip_outputs: None,
            mock_outputs: None,
            mock_outputs_allowed_terraform_commands: None,
        }
    }

    fn to_block(&self) -> Block {
        let mut body = Body::new();
        body.attribute("config_path", Value::String(self.config_path.clone()))
            .optional_attribute("enabled", self.enabled.map(Value::Bool))
            .optional_attribute("skip_outputs", self.skip_outputs.map(Value::Bool))
            .optional_attribute("mock_outputs", self.mock_outputs.clone())
            .optional_attribute(
                "mock_outputs_allowed_terraform_commands",
                self.mock_outputs_allowed_terraform_commands
                    .as_ref()
                    .map(|commands| {
                        Value::Array(commands.iter().cloned().map(Value::String).collect())
                    }),
            );
        Block::new("dependency").label(self.name.clone()).body(body)
    }
}
