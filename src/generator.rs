use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::definitions::{self, DefinitionsFile};
use crate::error::TerragenError;
use crate::file;
use crate::merge;
use crate::storage::{OsStorage, Storage};
use crate::validate;

/// Settings for a [`Generator`]. Construct directly or start from
/// `GeneratorOptions::default()` and override fields.
pub struct GeneratorOptions {
    /// Where definitions are read from and generated files written to.
    /// Defaults to the local filesystem.
    pub storage: Box<dyn Storage>,
    /// Reject attributes and blocks the definitions schema does not know
    /// (default: `true`). When off they are ignored.
    pub strict: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            storage: Box::new(OsStorage),
            strict: true,
        }
    }
}

/// Turns definitions files into Terragrunt configuration files.
pub struct Generator {
    storage: Box<dyn Storage>,
    strict: bool,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    /// A strict generator on the local filesystem.
    pub fn new() -> Self {
        Self::with_options(GeneratorOptions::default())
    }

    pub fn with_options(options: GeneratorOptions) -> Self {
        Self {
            storage: options.storage,
            strict: options.strict,
        }
    }

    /// Shorthand for a generator over `storage` with default settings.
    pub fn with_storage(storage: impl Storage + 'static) -> Self {
        Self::with_options(GeneratorOptions {
            storage: Box::new(storage),
            ..GeneratorOptions::default()
        })
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    /// Read and decode a definitions file.
    pub fn decode_definitions_file(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<DefinitionsFile, TerragenError> {
        let path = path.as_ref();
        let content = file::read_to_string(self.storage.as_ref(), path)?;
        debug!(path = %path.display(), strict = self.strict, "decoding definitions file");
        definitions::decode_definitions(&content, self.strict).map_err(|source| {
            TerragenError::Decode {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    /// Read an HCL file and decode it into any deserializable type.
    pub fn decode_from_file<T: DeserializeOwned>(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<T, TerragenError> {
        let path = path.as_ref();
        let content = file::read_to_string(self.storage.as_ref(), path)?;
        validate::decode_value(&content, self.strict).map_err(|source| TerragenError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Decode the definitions file at `path` and generate every deployment in it.
    pub fn generate_from_file(&self, path: impl AsRef<Path>) -> Result<(), TerragenError> {
        let definitions = self.decode_definitions_file(path)?;
        self.generate_from_config(&definitions)
    }

    /// Generate one file per deployment, in order.
    ///
    /// Stops at the first destination that cannot be created or written.
    /// Files already written stay in place; later deployments are skipped.
    /// Writes are not atomic, so the failing destination may be left partial.
    pub fn generate_from_config(&self, definitions: &DefinitionsFile) -> Result<(), TerragenError> {
        for deployment in &definitions.deployments {
            let document = definitions.terragrunt_config_for(deployment);

            let duplicates = merge::duplicate_names(&document.includes);
            if !duplicates.is_empty() {
                warn!(
                    deployment = %deployment.name,
                    names = ?duplicates,
                    "include names repeated; each is emitted as its own block"
                );
            }
            let duplicates = merge::duplicate_names(&document.dependencies);
            if !duplicates.is_empty() {
                warn!(
                    deployment = %deployment.name,
                    names = ?duplicates,
                    "dependency names repeated; each is emitted as its own block"
                );
            }

            let destination = Path::new(&deployment.destination_path);
            self.write(destination, document.to_hcl_string().as_bytes())?;
            info!(
                deployment = %deployment.name,
                destination = %destination.display(),
                includes = document.includes.len(),
                "generated terragrunt configuration"
            );
        }
        Ok(())
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), TerragenError> {
        let mut file = self
            .storage
            .create(path)
            .map_err(|e| TerragenError::Create {
                path: path.to_path_buf(),
                source: e,
            })?;
        file.write_all(bytes)
            .and_then(|()| file.flush())
            .map_err(|e| TerragenError::Write {
                path: path.to_path_buf(),
                source: e,
            })
    }
}
