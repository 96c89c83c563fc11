//! The definitions file: what to generate and where.
//!
//! ```hcl
//! terragrunt_include_all "all" {
//!   path = "world"
//! }
//!
//! terragrunt_configuration "test" {
//!   source           = "mymodule"
//!   destination_path = "path/to/test/terragrunt.hcl"
//!
//!   include "something" {
//!     path = "hello"
//!   }
//! }
//! ```
//!
//! Top-level blocks:
//!
//! - `terragrunt_include_all "<name>"`: an include added to every generated file.
//! - `terragrunt_dependency_all "<name>"`: a dependency added to every generated file.
//! - `terragrunt_configuration "<name>"` (alias `terragrunt_deployment`): one
//!   generated file, with nested `include` and `dependency` blocks of its own.

use std::str::FromStr;

use hcl::{Block, Body};
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::merge;
use crate::schema::{self, AttributeSchema, BlockSchema, BodySchema};
use crate::terragrunt::{
    DependencyConfig, IncludeConfig, MergeStrategy, TerraformConfig, TerragruntConfig,
};

const INCLUDE_ALL: &str = "terragrunt_include_all";
const DEPENDENCY_ALL: &str = "terragrunt_dependency_all";
const CONFIGURATION: &str = "terragrunt_configuration";
const DEPLOYMENT: &str = "terragrunt_deployment";

const ROOT_SCHEMA: BodySchema = BodySchema {
    attributes: &[],
    blocks: &[
        BlockSchema::labeled(INCLUDE_ALL, &["name"]),
        BlockSchema::labeled(DEPENDENCY_ALL, &["name"]),
        BlockSchema::labeled(CONFIGURATION, &["name"]),
        BlockSchema::labeled(DEPLOYMENT, &["name"]),
    ],
};

const DEPLOYMENT_SCHEMA: BodySchema = BodySchema {
    attributes: &[
        AttributeSchema::required("source"),
        AttributeSchema::required("destination_path"),
    ],
    blocks: &[
        BlockSchema::labeled("include", &["name"]),
        BlockSchema::labeled("dependency", &["name"]),
    ],
};

const INCLUDE_SCHEMA: BodySchema = BodySchema {
    attributes: &[
        AttributeSchema::required("path"),
        AttributeSchema::optional("expose"),
        AttributeSchema::optional("merge_strategy"),
    ],
    blocks: &[],
};

const DEPENDENCY_SCHEMA: BodySchema = BodySchema {
    attributes: &[
        AttributeSchema::required("config_path"),
        AttributeSchema::optional("enabled"),
        AttributeSchema::optional("skip_outputs"),
        AttributeSchema::optional("mock_outputs"),
        AttributeSchema::optional("mock_outputs_allowed_terraform_commands"),
    ],
    blocks: &[],
};

/// A parsed definitions file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefinitionsFile {
    /// One entry per generated file, in file order.
    pub deployments: Vec<Deployment>,
    /// Includes present in every generated file.
    #[serde(default)]
    pub global_includes: Vec<IncludeConfig>,
    /// Dependencies present in every generated file.
    #[serde(default)]
    pub global_dependencies: Vec<DependencyConfig>,
}

/// One generated Terragrunt file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    /// Block label. Not required to be unique.
    pub name: String,
    /// Value of the generated `terraform.source`, passed through verbatim.
    pub source: String,
    pub destination_path: String,
    #[serde(default)]
    pub includes: Vec<IncludeConfig>,
    #[serde(default)]
    pub dependencies: Vec<DependencyConfig>,
}

impl DefinitionsFile {
    /// The document generated for `deployment`: its source plus the global
    /// fragments followed by its own.
    pub fn terragrunt_config_for(&self, deployment: &Deployment) -> TerragruntConfig {
        TerragruntConfig {
            terraform: TerraformConfig {
                source: deployment.source.clone(),
            },
            includes: merge::merge_includes(&self.global_includes, &deployment.includes),
            dependencies: merge::merge_dependencies(
                &self.global_dependencies,
                &deployment.dependencies,
            ),
        }
    }
}

impl FromStr for DefinitionsFile {
    type Err = DecodeError;

    /// Strict decode: unknown attributes and blocks are errors.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_definitions(s, true)
    }
}

/// Decode definitions from HCL text.
pub fn decode_definitions(src: &str, strict: bool) -> Result<DefinitionsFile, DecodeError> {
    let body: Body = hcl::parse(src)?;
    decode_body(&body, strict)
}

/// Decode definitions from an already parsed HCL body.
pub fn decode_body(body: &Body, strict: bool) -> Result<DefinitionsFile, DecodeError> {
    let content = ROOT_SCHEMA.partition(body, "definitions file", strict)?;
    let mut definitions = DefinitionsFile::default();

    for block in content.blocks() {
        match block.identifier.as_str() {
            INCLUDE_ALL => definitions
                .global_includes
                .push(decode_include(block, strict)?),
            DEPENDENCY_ALL => definitions
                .global_dependencies
                .push(decode_dependency(block, strict)?),
            _ => definitions
                .deployments
                .push(decode_deployment(block, strict)?),
        }
    }

    Ok(definitions)
}

fn decode_deployment(block: &Block, strict: bool) -> Result<Deployment, DecodeError> {
    let content = DEPLOYMENT_SCHEMA.partition(&block.body, &schema::block_scope(block), strict)?;
    let mut deployment = Deployment {
        name: schema::label(block, 0),
        source: content.required_string("source")?,
        destination_path: content.required_string("destination_path")?,
        includes: Vec::new(),
        dependencies: Vec::new(),
    };

    for nested in content.blocks() {
        if nested.identifier.as_str() == "include" {
            deployment.includes.push(decode_include(nested, strict)?);
        } else {
            deployment.dependencies.push(decode_dependency(nested, strict)?);
        }
    }

    Ok(deployment)
}

fn decode_include(block: &Block, strict: bool) -> Result<IncludeConfig, DecodeError> {
    let content = INCLUDE_SCHEMA.partition(&block.body, &schema::block_scope(block), strict)?;
    let merge_strategy = content
        .optional_string("merge_strategy")?
        .map(|value| {
            value
                .parse::<MergeStrategy>()
                .map_err(|_| DecodeError::InvalidMergeStrategy {
                    value,
                    scope: content.scope().to_string(),
                })
        })
        .transpose()?;

    Ok(IncludeConfig {
        name: schema::label(block, 0),
        path: content.required_string("path")?,
        expose: content.optional_bool("expose")?,
        merge_strategy,
    })
}

fn decode_dependency(block: &Block, strict: bool) -> Result<DependencyConfig, DecodeError> {
    let content = DEPENDENCY_SCHEMA.partition(&block.body, &schema::block_scope(block), strict)?;
    Ok(DependencyConfig {
        name: schema::label(block, 0),
        config_path: content.required_string("config_path")?,
        enabled: content.optional_bool("enabled")?,
        skip_outputs: content.optional_bool("skip_outputs")?,
        mock_outputs: content.optional_value("mock_outputs")?,
        mock_outputs_allowed_terraform_commands: content
            .optional_string_list("mock_outputs_allowed_terraform_commands")?,
    })
}
