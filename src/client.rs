//! Client orchestration
//!
//! Composes the cache, downloader, installer and script host into the
//! two public operations: fetch-or-load a remote module, and reconcile
//! a remote package descriptor's dependencies into the local project.

use crate::cache::{CacheError, ModuleCache};
use crate::config::{Config, ConfigError};
use crate::descriptor::{DescriptorError, PackageDescriptor, Scope};
use crate::fetch::{validate_url, Downloader, FetchError};
use crate::host::{HostError, ScriptHost};
use crate::installer::PackageInstaller;
use crate::report::Reporter;
use crate::resolver::DependencyResolver;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors raised by client operations
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The provided URL is not a well-formed HTTP(S) URL
    #[error("The provided URL is invalid: {0}")]
    InvalidUrl(String),

    /// Fetch error
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Cache error
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Descriptor error
    #[error("Descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),

    /// Script host error
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    /// A fetched or locally read module was empty
    #[error("The module from '{url}' (on disk: '{path}') is empty")]
    EmptyModule { url: String, path: PathBuf },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Loads remote modules through the cache and reconciles remote
/// dependency declarations.
///
/// One logical thread of control per call: every operation is a
/// strictly sequential chain of blocking steps with no cancellation.
pub struct ModuleClient<H: ScriptHost> {
    cache: ModuleCache,
    downloader: Box<dyn Downloader>,
    installer: Box<dyn PackageInstaller>,
    host: H,
    reporter: Reporter,
    package_json: PathBuf,
}

impl<H: ScriptHost> ModuleClient<H> {
    /// Build a client from validated configuration and its external
    /// collaborators.
    pub fn new(
        config: Config,
        downloader: Box<dyn Downloader>,
        installer: Box<dyn PackageInstaller>,
        host: H,
    ) -> Result<Self, ClientError> {
        config.validate()?;

        let cache = ModuleCache::new(
            &config.cache_path,
            Duration::from_secs(config.cache_expiration_secs),
        )?;

        Ok(Self {
            cache,
            downloader,
            installer,
            host,
            reporter: Reporter::new(config.suppress_messages),
            package_json: config.package_json,
        })
    }

    /// Fetch a remote module, using the cache when possible, and hand
    /// it to the script host. Returns the host's exported surface.
    pub fn fetch_module(&mut self, url: &str) -> Result<H::Exports, ClientError> {
        self.check_url(url)?;

        let local_path = self.cache.derive_path(url);

        if self.cache.lookup(url)?.is_none() {
            self.reporter
                .info(&format!("Downloading module from '{url}'..."));
            let result = self.downloader.fetch_to(url, &local_path)?;
            self.reporter.info(&format!(
                "Fetched {} bytes (sha256: {})",
                result.content.len(),
                result.checksum
            ));
            self.cache.register(url, &local_path)?;
        }

        self.load(url, &local_path)
    }

    /// Merge the dependency buckets of a remote package descriptor
    /// into the local project.
    ///
    /// The descriptor is downloaded to a temporary file outside the
    /// cache; the file is removed on every exit path.
    pub fn reconcile_dependencies(&self, url: &str, scope: Scope) -> Result<(), ClientError> {
        self.check_url(url)?;

        let temp = tempfile::Builder::new()
            .prefix("remod-descriptor-")
            .suffix(".json")
            .tempfile()?;

        self.downloader.fetch_to(url, temp.path())?;

        let local = self.load_descriptor(&self.package_json, scope)?;
        let remote = self.load_descriptor(temp.path(), scope)?;

        let resolver = DependencyResolver::new(self.installer.as_ref(), &self.reporter);

        if scope.wants_dependencies() {
            if let Some(remote_deps) = remote.bucket(false) {
                resolver.merge(local.bucket(false), remote_deps, false);
            }
        }

        if scope.wants_dev_dependencies() {
            if let Some(remote_deps) = remote.bucket(true) {
                resolver.merge(local.bucket(true), remote_deps, true);
            }
        }

        Ok(())
    }

    /// Derived local path for a URL, without touching the cache state.
    pub fn local_path_for(&self, url: &str) -> PathBuf {
        self.cache.derive_path(url)
    }

    fn check_url(&self, url: &str) -> Result<(), ClientError> {
        if validate_url(url).is_err() {
            self.reporter.error("The provided URL is invalid");
            return Err(ClientError::InvalidUrl(url.to_string()));
        }
        Ok(())
    }

    /// Read a materialized module and hand it to the script host.
    fn load(&self, url: &str, path: &Path) -> Result<H::Exports, ClientError> {
        let source = fs::read_to_string(path)?;

        if source.is_empty() {
            self.reporter.error(&format!(
                "The module from '{url}' (on disk: '{}') is empty",
                path.display()
            ));
            return Err(ClientError::EmptyModule {
                url: url.to_string(),
                path: path.to_path_buf(),
            });
        }

        Ok(self.host.load(&source, path)?)
    }

    /// Parse a descriptor, warning when a selected bucket is absent or
    /// empty. Only an empty or non-object file is fatal.
    fn load_descriptor(&self, path: &Path, scope: Scope) -> Result<PackageDescriptor, ClientError> {
        let descriptor = PackageDescriptor::from_file(path)?;

        if scope.wants_dependencies()
            && descriptor.bucket(false).map_or(true, |deps| deps.is_empty())
        {
            self.reporter.warn(&format!(
                "'{}' does not declare any dependencies",
                path.display()
            ));
        }

        if scope.wants_dev_dependencies()
            && descriptor.bucket(true).map_or(true, |deps| deps.is_empty())
        {
            self.reporter.warn(&format!(
                "'{}' does not declare any dev dependencies",
                path.display()
            ));
        }

        Ok(descriptor)
    }
}
