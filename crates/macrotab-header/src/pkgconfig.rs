//! pkg-config integration
//!
//! Library-scoped headers (e.g. `xkbcommon/xkbcommon-keysyms.h`) may live
//! outside the default search path; their package's `--cflags` supply it.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tracing::debug;

use macrotab_core::{Error, Result};

use crate::process::run_with_timeout;

/// pkg-config wrapper
#[derive(Debug, Clone)]
pub struct PkgConfig {
    path: PathBuf,
    timeout: Duration,
}

impl PkgConfig {
    pub fn new(path: PathBuf, timeout: Duration) -> Self {
        Self { path, timeout }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Compiler flags for `package`, needed to find `header`
    pub fn cflags(&self, package: &str, header: &str) -> Result<Vec<String>> {
        let mut cmd = Command::new(&self.path);
        cmd.arg("--cflags").arg(package);
        let output = run_with_timeout(&mut cmd, self.timeout)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::HeaderNotFound {
                header: header.to_string(),
                detail: format!("pkg-config does not know package '{}': {}", package, stderr.trim()),
            });
        }

        let flags = parse_flags(&String::from_utf8_lossy(&output.stdout));
        debug!("pkg-config flags for {}: {:?}", package, flags);
        Ok(flags)
    }
}

impl Default for PkgConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("pkg-config"), Duration::from_secs(30))
    }
}

/// Split pkg-config output into individual compiler arguments
pub fn parse_flags(stdout: &str) -> Vec<String> {
    stdout.split_whitespace().map(str::to_string).collect()
}
