use crate::error::SmartctlError;
use crate::models::device::DeviceDescriptor;
use std::process::{Command, ExitStatus};
use tracing::debug;

pub const DEFAULT_SMARTCTL: &str = "/usr/sbin/smartctl";

/// Captured result of one smartctl invocation.
#[derive(Debug)]
pub struct SmartctlOutput {
    pub path:   String,
    pub args:   Vec<String>,
    pub stdout: String,
    pub stderr: String,
    pub status: ExitStatus,
}

impl SmartctlOutput {
    /// Fail on a non-zero exit status.
    ///
    /// smartctl sets status bits for disk warnings while still printing a
    /// full report, so callers that can tolerate that read `stdout` directly.
    pub fn check(&self) -> Result<&str, SmartctlError> {
        if self.status.success() {
            Ok(&self.stdout)
        } else {
            Err(SmartctlError::ExitStatus {
                path:   self.path.clone(),
                args:   self.args.join(" "),
                status: self.status,
            })
        }
    }
}

/// Runs the smartctl binary synchronously.
#[derive(Debug, Clone)]
pub struct Smartctl {
    path: String,
}

impl Smartctl {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// `smartctl --scan`
    pub fn scan(&self) -> Result<SmartctlOutput, SmartctlError> {
        self.run(&["--scan"])
    }

    /// `smartctl -i -H <path> -d <type>`
    pub fn info(&self, dev: &DeviceDescriptor) -> Result<SmartctlOutput, SmartctlError> {
        self.run(&["-i", "-H", &dev.path, "-d", &dev.interface_type])
    }

    /// `smartctl -A <path> -d <type>`
    pub fn attributes(&self, dev: &DeviceDescriptor) -> Result<SmartctlOutput, SmartctlError> {
        self.run(&["-A", &dev.path, "-d", &dev.interface_type])
    }

    pub fn run(&self, args: &[&str]) -> Result<SmartctlOutput, SmartctlError> {
        debug!(smartctl = %self.path, ?args, "running smartctl");

        let out = Command::new(&self.path)
            .args(args)
            .output()
            .map_err(|source| SmartctlError::Spawn { path: self.path.clone(), source })?;

        let stdout = String::from_utf8_lossy(&out.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&out.stderr).into_owned();

        debug!(
            smartctl = %self.path,
            status = %out.status,
            stdout = stdout.trim(),
            stderr = stderr.trim(),
            "smartctl finished"
        );

        Ok(SmartctlOutput {
            path: self.path.clone(),
            args: args.iter().map(|a| a.to_string()).collect(),
            stdout,
            stderr,
            status: out.status,
        })
    }
}
