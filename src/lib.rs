//! Generate Terragrunt configuration files from a single definitions file.
//!
//! A definitions file lists the Terragrunt deployments you want, where each
//! generated `terragrunt.hcl` should go, and which `include` (and
//! `dependency`) blocks every file shares. Terragen reads it, merges the
//! shared blocks with each deployment's own, and writes one file per
//! deployment.
//!
//! ```ignore
//! terragen::generate_from_file("terragen.hcl")?;
//! ```
//!
//! # Definitions file
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
//! - **`terragrunt_include_all "<name>"`**: an `include` block added to every
//!   generated file. Attributes: `path` (required), `expose`, `merge_strategy`
//!   (`no_merge`, `shallow`, `deep` or `deep_map_only`).
//! - **`terragrunt_dependency_all "<name>"`**: a `dependency` block added to
//!   every generated file. Attributes: `config_path` (required), `enabled`,
//!   `skip_outputs`, `mock_outputs`, `mock_outputs_allowed_terraform_commands`.
//! - **`terragrunt_configuration "<name>"`** (or `terragrunt_deployment`): one
//!   generated file. Attributes: `source` and `destination_path` (both
//!   required). Nested `include` and `dependency` blocks take the same
//!   attributes as their `_all` counterparts.
//!
//! Attribute values may be any expression that evaluates without variables
//! or functions: literals, string templates over literals, arithmetic.
//!
//! # Generated file
//!
//! The definitions file above writes `path/to/test/terragrunt.hcl`:
//!
//! ```hcl
//!
//! terraform {
//!   source = "mymodule"
//! }
//!
//! include "all" {
//!   path = "world"
//! }
//! include "something" {
//!   path = "hello"
//! }
//! ```
//!
//! Shared blocks always come first, in file order, followed by the
//! deployment's own, in file order. Nothing is deduplicated: if a shared and
//! a local include have the same name, both blocks are written (and a
//! warning is logged through `tracing`). Optional attributes appear only when
//! set, so `expose = false` and an absent `expose` stay distinct.
//!
//! # Failure behaviour
//!
//! Deployments are generated one after another. The first destination that
//! cannot be created or written stops the run: earlier files stay written,
//! later ones are not attempted, and nothing is rolled back. A definitions
//! file that fails to decode writes nothing.
//!
//! All fallible operations return [`TerragenError`]; decode failures carry a
//! [`DecodeError`] and can be told apart from storage failures with
//! [`TerragenError::is_decode`] and [`TerragenError::is_storage`].
//!
//! # Storage
//!
//! The generator reads and writes through a [`Storage`]. The default,
//! [`OsStorage`], uses the local filesystem and creates missing parent
//! directories. [`MemoryStorage`] keeps everything in memory, which is what
//! tests use:
//!
//! ```ignore
//! let storage = MemoryStorage::new();
//! storage.insert("terragen.hcl", definitions_text);
//! Generator::with_storage(storage.clone()).generate_from_file("terragen.hcl")?;
//! let generated = storage.read_to_string("path/to/test/terragrunt.hcl");
//! ```
//!
//! # Strict mode
//!
//! Strict mode is **on by default**: an attribute or block the definitions
//! schema does not know is a decode error naming the offending key and the
//! block it appeared in. Set [`GeneratorOptions::strict`] to `false` to ignore
//! them instead.

mod definitions;
mod encode;
mod error;
mod file;
mod generator;
mod merge;
mod schema;
mod storage;
mod terragrunt;
mod validate;

#[cfg(test)]
mod fixtures;

use std::path::Path;

use serde::de::DeserializeOwned;

pub use definitions::{DefinitionsFile, Deployment, decode_definitions};
pub use error::{DecodeError, TerragenError};
pub use generator::{Generator, GeneratorOptions};
pub use storage::{MemoryStorage, OsStorage, Storage};
pub use terragrunt::{
    DependencyConfig, IncludeConfig, MergeStrategy, TerraformConfig, TerragruntConfig,
    UnknownMergeStrategy,
};

/// Decode the HCL file at `path` into `T` using a default [`Generator`].
pub fn decode_from_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, TerragenError> {
    Generator::new().decode_from_file(path)
}

/// Decode the definitions file at `path` using a default [`Generator`].
pub fn decode_definitions_file(path: impl AsRef<Path>) -> Result<DefinitionsFile, TerragenError> {
    Generator::new().decode_definitions_file(path)
}

/// Generate every deployment in the definitions file at `path` using a
/// default [`Generator`].
pub fn generate_from_file(path: impl AsRef<Path>) -> Result<(), TerragenError> {
    Generator::new().generate_from_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{SIMPLE_TERRAGRUNT_OUTPUT, simple_definitions};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn decode_definitions_file_reads_from_disk() {
        let definitions = decode_definitions_file(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/testdata/simple_terragrunt.hcl"
        ))
        .unwrap();
        assert_eq!(definitions, simple_definitions());
    }

    #[test]
    fn generate_from_file_on_disk() {
        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("path/to/test/terragrunt.hcl");
        let input = dir.path().join("terragen.hcl");
        fs::write(
            &input,
            format!(
                "terragrunt_include_all \"all\" {{\n  path = \"world\"\n}}\n\n\
                 terragrunt_configuration \"test\" {{\n  source = \"mymodule\"\n  destination_path = {:?}\n\n  include \"something\" {{\n    path = \"hello\"\n  }}\n}}\n",
                destination.to_str().unwrap()
            ),
        )
        .unwrap();

        generate_from_file(&input).unwrap();
        assert_eq!(fs::read_to_string(&destination).unwrap(), SIMPLE_TERRAGRUNT_OUTPUT);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = generate_from_file("/definitely/not/here/terragen.hcl").unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("/definitely/not/here/terragen.hcl"));
    }

    #[test]
    fn generic_decode_from_disk() {
        #[derive(serde::Deserialize)]
        struct Settings {
            region: String,
        }
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.hcl");
        fs::write(&path, "region = \"eu-west-1\"\n").unwrap();
        let settings: Settings = decode_from_file(&path).unwrap();
        assert_eq!(settings.region, "eu-west-1");
    }
}
