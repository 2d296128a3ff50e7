//! Dependency reconciliation
//!
//! Merges a remote dependency bucket into the local project, one name
//! at a time: install additions, reinstall identical versions, warn
//! and skip on version conflicts.

use crate::descriptor::DependencySet;
use crate::installer::PackageInstaller;
use crate::report::Reporter;

/// Merges remote dependency declarations against local ones.
///
/// Borrows its collaborators for the duration of one reconciliation
/// batch. All outcomes are side effects (installs and warnings); a
/// failure for one name never aborts the remaining names.
pub struct DependencyResolver<'a> {
    installer: &'a dyn PackageInstaller,
    reporter: &'a Reporter,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(installer: &'a dyn PackageInstaller, reporter: &'a Reporter) -> Self {
        Self {
            installer,
            reporter,
        }
    }

    /// Merge one remote bucket into the matching local bucket.
    ///
    /// A `None` local bucket means the bucket does not exist locally at
    /// all: every remote entry is installed unconditionally with no
    /// comparison step. Otherwise, per remote name:
    /// - absent locally: install;
    /// - present at the identical version: install anyway (idempotent
    ///   refresh, preserved behavior);
    /// - present at a different version: warn and skip, the conflict
    ///   must be resolved manually.
    pub fn merge(&self, local: Option<&DependencySet>, remote: &DependencySet, dev: bool) {
        let Some(local) = local else {
            for (name, version) in remote {
                self.install(name, version, dev);
            }
            return;
        };

        for (name, remote_version) in remote {
            match local.get(name) {
                Some(local_version) if local_version != remote_version => {
                    self.reporter.warn(&format!(
                        "Local dependency '{name}' version '{local_version}' clashes with \
                         remote version '{remote_version}', resolve the conflict manually, \
                         skipping installation"
                    ));
                }
                _ => self.install(name, remote_version, dev),
            }
        }
    }

    fn install(&self, name: &str, version: &str, dev: bool) {
        let kind = if dev { "dev dependency" } else { "dependency" };
        self.reporter
            .info(&format!("Installing remote {kind} '{name}', version '{version}'..."));

        match self.installer.install(name, version, dev) {
            Ok(output) => {
                if !output.stdout.is_empty() {
                    self.reporter.info(&format!("Package manager output: {}", output.stdout));
                }
                if !output.stderr.is_empty() {
                    self.reporter.error(&format!("Package manager error: {}", output.stderr));
                }
            }
            Err(err) => {
                self.reporter
                    .error(&format!("Failed to install '{name}': {err}"));
            }
        }
    }
}
