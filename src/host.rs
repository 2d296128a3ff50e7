//! Script execution host
//!
//! The cache and resolver never execute anything; turning fetched text
//! into a running module is delegated to this seam.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by a script host
#[derive(Debug, Error)]
pub enum HostError {
    /// Module compilation or execution failed
    #[error("Failed to execute module {path}: {message}")]
    Execution { path: PathBuf, message: String },
}

/// Compiles and executes fetched source text as an isolated module,
/// yielding its exported surface.
///
/// Nothing in this crate sandboxes the source it hands over:
/// implementations run whatever the remote URL served. Embedders that
/// execute untrusted URLs must bring their own isolation story.
pub trait ScriptHost {
    /// The exported surface a loaded module yields.
    type Exports;

    /// Compile and run `source`, identified by the local file it was
    /// read from.
    fn load(&self, source: &str, identity: &Path) -> Result<Self::Exports, HostError>;
}

/// Host that performs no execution and exports the raw source text.
///
/// Stands in where an embedded script engine would plug in; useful for
/// the CLI and for callers that only want the materialized source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceHost;

impl ScriptHost for SourceHost {
    type Exports = String;

    fn load(&self, source: &str, _identity: &Path) -> Result<Self::Exports, HostError> {
        Ok(source.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_host_exports_raw_text() {
        let host = SourceHost;
        let exports = host
            .load("module.exports = 1;", Path::new("/tmp/mod.js"))
            .unwrap();
        assert_eq!(exports, "module.exports = 1;");
    }
}
