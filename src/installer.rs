//! Package installation via the system package manager
//!
//! Installs one dependency at a time, capturing the package manager's
//! standard output and error streams for the caller to report.

use std::process::Command;
use thiserror::Error;

/// Errors that can occur during installation
#[derive(Debug, Error)]
pub enum InstallError {
    /// Could not spawn the package manager
    #[error("Failed to run package manager: {0}")]
    Io(#[from] std::io::Error),

    /// Package manager exited with a failure status
    #[error("Package manager exited with status {code}: {stderr}")]
    ExitStatus { code: i32, stderr: String },
}

/// Captured output of one install invocation.
#[derive(Debug, Clone, Default)]
pub struct InstallOutput {
    pub stdout: String,
    pub stderr: String,
}

/// External collaborator that installs one dependency.
pub trait PackageInstaller {
    /// Install `name` at `version`, saving it as a dev dependency when
    /// `dev` is set.
    fn install(&self, name: &str, version: &str, dev: bool) -> Result<InstallOutput, InstallError>;
}

/// Installer that shells out to npm.
///
/// Runs `npm install <name>@<version> --save[-dev]` and waits for the
/// subprocess to exit. There is no timeout; a hung install blocks the
/// calling operation.
pub struct NpmInstaller {
    program: String,
}

impl Default for NpmInstaller {
    fn default() -> Self {
        Self::new()
    }
}

impl NpmInstaller {
    /// Create an installer using `npm` from the search path.
    pub fn new() -> Self {
        Self {
            program: "npm".to_string(),
        }
    }

    /// Create an installer using a specific npm binary.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl PackageInstaller for NpmInstaller {
    fn install(&self, name: &str, version: &str, dev: bool) -> Result<InstallOutput, InstallError> {
        let save_flag = if dev { "--save-dev" } else { "--save" };

        let output = Command::new(&self.program)
            .arg("install")
            .arg(format!("{name}@{version}"))
            .arg(save_flag)
            .output()?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(InstallError::ExitStatus {
                code: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        Ok(InstallOutput { stdout, stderr })
    }
}
