use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while decoding definitions text. Carries no path: callers
/// that read from storage wrap it in [`TerragenError::Decode`].
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Invalid HCL: {0}")]
    Syntax(#[from] hcl::Error),

    #[error("Unsupported argument '{name}' in {scope}")]
    UnsupportedAttribute { name: String, scope: String },

    #[error("Unsupported block type '{name}' in {scope}")]
    UnsupportedBlock { name: String, scope: String },

    #[error("Missing required argument '{name}' in {scope}")]
    MissingAttribute { name: String, scope: String },

    #[error("Block '{block}' expects {expected} label(s), found {found}")]
    LabelCount {
        block: String,
        expected: usize,
        found: usize,
    },

    #[error("Cannot evaluate '{name}' in {scope}: {message}")]
    Evaluate {
        name: String,
        scope: String,
        message: String,
    },

    #[error("Invalid value for '{name}' in {scope}: expected {expected}")]
    InvalidType {
        name: String,
        scope: String,
        expected: &'static str,
    },

    #[error(
        "Invalid merge_strategy '{value}' in {scope} (expected one of: no_merge, shallow, deep, deep_map_only)"
    )]
    InvalidMergeStrategy { value: String, scope: String },

    #[error("Failed to deserialize: {0}")]
    Deserialize(String),

    #[error("Unknown keys: {}", .0.join(", "))]
    UnknownKeys(Vec<String>),
}

#[derive(Debug, Error)]
pub enum TerragenError {
    #[error("error opening file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("error reading file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to decode {path}: {source}")]
    Decode { path: PathBuf, source: DecodeError },

    #[error("error creating file {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("error writing file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl TerragenError {
    /// The path the failed operation was working on.
    pub fn path(&self) -> &std::path::Path {
        match self {
            TerragenError::Open { path, .. }
            | TerragenError::Read { path, .. }
            | TerragenError::Decode { path, .. }
            | TerragenError::Create { path, .. }
            | TerragenError::Write { path, .. } => path,
        }
    }

    /// True for any failure of the storage layer (open, read, create, write).
    pub fn is_storage(&self) -> bool {
        !self.is_decode()
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, TerragenError::Decode { .. })
    }

    /// True when the input file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TerragenError::Open { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn missing_attribute_formats_correctly() {
        let err = DecodeError::MissingAttribute {
            name: "source".into(),
            scope: "terragrunt_configuration \"test\"".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("source"));
        assert!(msg.contains("terragrunt_configuration \"test\""));
    }

    #[test]
    fn open_error_carries_context_and_path() {
        let err = TerragenError::Open {
            path: "defs/terragen.hcl".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("error opening file"));
        assert!(msg.contains("defs/terragen.hcl"));
        assert!(err.is_not_found());
        assert!(err.is_storage());
        assert!(!err.is_decode());
    }

    #[test]
    fn permission_denied_is_storage_but_not_not_found() {
        let err = TerragenError::Open {
            path: "x.hcl".into(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.is_storage());
        assert!(!err.is_not_found());
    }

    #[test]
    fn decode_error_is_distinguishable() {
        let err = TerragenError::Decode {
            path: "x.hcl".into(),
            source: DecodeError::UnknownKeys(vec!["a.b".into(), "c".into()]),
        };
        assert!(err.is_decode());
        assert!(!err.is_storage());
        assert_eq!(err.path(), std::path::Path::new("x.hcl"));
        assert!(err.to_string().contains("a.b, c"));
    }
}
