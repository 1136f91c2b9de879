//! Compiler Integration
//!
//! Wraps the C compiler's dependency-listing mode (`cc -M`), used to learn
//! which file satisfies a system include.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tracing::debug;

use macrotab_core::{Error, Result, ToolchainConfig};

use crate::process::run_with_timeout;

/// Compiler wrapper
#[derive(Debug, Clone)]
pub struct Toolchain {
    /// Path to the compiler executable
    compiler: PathBuf,
    /// Upper bound for each invocation
    timeout: Duration,
}

impl Toolchain {
    /// Create a toolchain from configuration, auto-detecting the compiler
    /// when none is configured
    pub fn new(config: &ToolchainConfig) -> Result<Self> {
        let timeout = config.timeout();
        let compiler = match &config.compiler {
            Some(path) => path.clone(),
            None => Self::find_compiler(timeout)?,
        };
        debug!("Using compiler at: {:?}", compiler);
        Ok(Self { compiler, timeout })
    }

    /// Create a toolchain with a specific compiler path
    pub fn with_path(compiler: PathBuf) -> Self {
        Self {
            compiler,
            timeout: ToolchainConfig::default().timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Find a compiler that answers `--version`
    fn find_compiler(timeout: Duration) -> Result<PathBuf> {
        let candidates = ["cc", "gcc", "clang"];

        for candidate in candidates {
            let mut cmd = Command::new(candidate);
            cmd.arg("--version");
            if let Ok(output) = run_with_timeout(&mut cmd, timeout) {
                if output.status.success() {
                    return Ok(PathBuf::from(candidate));
                }
            }
        }

        Err(Error::ToolchainUnavailable(format!(
            "no C compiler found (tried {})",
            candidates.join(", ")
        )))
    }

    pub fn compiler(&self) -> &Path {
        &self.compiler
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Check if the compiler can be run
    pub fn is_available(&self) -> bool {
        self.version().is_some()
    }

    /// First line of `--version`
    pub fn version(&self) -> Option<String> {
        let mut cmd = Command::new(&self.compiler);
        cmd.arg("--version");
        run_with_timeout(&mut cmd, self.timeout)
            .ok()
            .filter(|o| o.status.success())
            .and_then(|o| {
                String::from_utf8(o.stdout)
                    .ok()
                    .and_then(|s| s.lines().next().map(|l| l.to_string()))
            })
    }

    /// Build the dependency-listing command line
    pub fn dependency_args(&self, source: &Path, rule_file: &Path, flags: &[String]) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-M".into(),
            "-MF".into(),
            rule_file.as_os_str().to_owned(),
            "-xc".into(),
            source.as_os_str().to_owned(),
        ];
        args.extend(flags.iter().map(OsString::from));
        args
    }

    /// Write the dependency rule of `source` to `rule_file`.
    ///
    /// A non-zero exit means the include directive was rejected, which is
    /// reported as [`Error::HeaderNotFound`] for `header`.
    pub fn list_dependencies(
        &self,
        header: &str,
        source: &Path,
        rule_file: &Path,
        flags: &[String],
    ) -> Result<()> {
        let args = self.dependency_args(source, rule_file, flags);
        debug!("Listing dependencies of {:?} with args: {:?}", source, args);

        let mut cmd = Command::new(&self.compiler);
        cmd.args(&args);
        let output = run_with_timeout(&mut cmd, self.timeout)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::HeaderNotFound {
                header: header.to_string(),
                detail: first_error_line(&stderr),
            });
        }

        Ok(())
    }
}

/// The compiler's first `error:` line, or its whole stderr
fn first_error_line(stderr: &str) -> String {
    stderr
        .lines()
        .find(|line| line.contains("error:"))
        .unwrap_or_else(|| stderr.trim())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_args() {
        let toolchain = Toolchain::with_path(PathBuf::from("cc"));
        let flags = vec!["-I/usr/include/xkbcommon".to_string()];
        let args = toolchain.dependency_args(Path::new("/tmp/tu.c"), Path::new("/tmp/tu.d"), &flags);

        assert_eq!(args[0], OsString::from("-M"));
        assert_eq!(args[1], OsString::from("-MF"));
        assert_eq!(args[2], OsString::from("/tmp/tu.d"));
        assert!(args.contains(&OsString::from("-xc")));
        assert!(args.contains(&OsString::from("/tmp/tu.c")));
        assert_eq!(args.last(), Some(&OsString::from("-I/usr/include/xkbcommon")));
    }

    #[test]
    fn test_configured_compiler_is_used() {
        let config = ToolchainConfig {
            compiler: Some(PathBuf::from("/opt/cross/bin/cc")),
            timeout_secs: 7,
            ..ToolchainConfig::default()
        };
        let toolchain = Toolchain::new(&config).unwrap();
        assert_eq!(toolchain.compiler(), Path::new("/opt/cross/bin/cc"));
        assert_eq!(toolchain.timeout(), Duration::from_secs(7));
    }

    #[test]
    fn test_missing_compiler_not_available() {
        let toolchain = Toolchain::with_path(PathBuf::from("/nonexistent/cc"));
        assert!(!toolchain.is_available());
        assert_eq!(toolchain.version(), None);
    }

    #[test]
    fn test_first_error_line() {
        let stderr = "In file included from x.c:1:\nx.c:1:10: fatal error: nope.h: No such file or directory\ncompilation terminated.\n";
        assert_eq!(
            first_error_line(stderr),
            "x.c:1:10: fatal error: nope.h: No such file or directory"
        );
        assert_eq!(first_error_line("  boom \n"), "boom");
    }
}
