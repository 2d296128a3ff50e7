//! Remote module loading with an expiring on-disk cache
//!
//! This crate provides:
//! - Fetching remote scripts over HTTP(S) and memoizing them on disk
//!   under a time-boxed, manifest-backed cache
//! - A pluggable script host seam for executing fetched source
//! - Reconciliation of a remote package descriptor's dependency sets
//!   into the local project, installing non-conflicting dependencies
//!   and flagging version mismatches

pub mod cache;
pub mod client;
pub mod config;
pub mod descriptor;
pub mod fetch;
pub mod host;
pub mod installer;
pub mod report;
pub mod resolver;

pub use cache::{CacheError, CacheRecord, ModuleCache};
pub use client::{ClientError, ModuleClient};
pub use config::{Config, ConfigError};
pub use descriptor::{DependencySet, DescriptorError, PackageDescriptor, Scope};
pub use fetch::{compute_checksum, Downloader, FetchError, FetchResult, UrlFetcher};
pub use host::{HostError, ScriptHost, SourceHost};
pub use installer::{InstallError, InstallOutput, NpmInstaller, PackageInstaller};
pub use report::Reporter;
pub use resolver::DependencyResolver;
