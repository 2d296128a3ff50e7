//! Package descriptor parsing (package.json)
//!
//! Only the two dependency buckets are of interest; all other fields
//! are ignored.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during descriptor parsing
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// Failed to read descriptor file
    #[error("Failed to read descriptor file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse JSON
    #[error("Failed to parse descriptor: {0}")]
    Parse(#[from] serde_json::Error),

    /// Descriptor file is empty
    #[error("Descriptor file is empty: {0}")]
    Empty(PathBuf),

    /// Descriptor is not a JSON object
    #[error("Descriptor does not contain an object: {0}")]
    NotAnObject(PathBuf),
}

/// Mapping from package name to version specifier string.
pub type DependencySet = BTreeMap<String, String>;

/// Which dependency buckets an operation covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// Runtime dependencies only
    #[default]
    Dependencies,

    /// Development dependencies only
    DevDependencies,

    /// Both buckets
    Both,
}

impl Scope {
    /// Whether the `dependencies` bucket is selected.
    pub fn wants_dependencies(&self) -> bool {
        matches!(self, Scope::Dependencies | Scope::Both)
    }

    /// Whether the `devDependencies` bucket is selected.
    pub fn wants_dev_dependencies(&self) -> bool {
        matches!(self, Scope::DevDependencies | Scope::Both)
    }
}

/// The dependency-bearing slice of a package descriptor.
///
/// An absent bucket (`None`) and a present-but-empty bucket are
/// distinct states: merging treats an absent local bucket as "install
/// everything, no comparison".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageDescriptor {
    /// Runtime dependencies
    #[serde(default)]
    pub dependencies: Option<DependencySet>,

    /// Development-only dependencies
    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: Option<DependencySet>,
}

impl PackageDescriptor {
    /// Parse a descriptor from a file.
    ///
    /// An empty file or a file whose top-level value is not a JSON
    /// object is a fatal error; absent buckets are not.
    pub fn from_file(path: &Path) -> Result<Self, DescriptorError> {
        let content = std::fs::read_to_string(path)?;

        if content.is_empty() {
            return Err(DescriptorError::Empty(path.to_path_buf()));
        }

        let value: serde_json::Value = serde_json::from_str(&content)?;
        if !value.is_object() {
            return Err(DescriptorError::NotAnObject(path.to_path_buf()));
        }

        Ok(serde_json::from_value(value)?)
    }

    /// The selected bucket, `dev` picking `devDependencies`.
    pub fn bucket(&self, dev: bool) -> Option<&DependencySet> {
        if dev {
            self.dev_dependencies.as_ref()
        } else {
            self.dependencies.as_ref()
        }
    }
}
