//! System Header Resolver
//!
//! Resolves `#include <header>` to the absolute path the active toolchain
//! would read, including headers that need a package's compiler flags.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use macrotab_core::{Error, Result, ToolchainConfig};

use crate::depfile::DependencyRule;
use crate::pkgconfig::PkgConfig;
use crate::toolchain::Toolchain;

/// Header resolver backed by the compiler's dependency listing
#[derive(Debug, Clone)]
pub struct HeaderResolver {
    toolchain: Toolchain,
    pkg_config: PkgConfig,
    /// Extra search paths, passed as `-I`
    include_paths: Vec<PathBuf>,
}

impl HeaderResolver {
    pub fn new(toolchain: Toolchain, pkg_config: PkgConfig) -> Self {
        Self {
            toolchain,
            pkg_config,
            include_paths: Vec::new(),
        }
    }

    /// Create a resolver from toolchain configuration
    pub fn from_config(config: &ToolchainConfig) -> Result<Self> {
        let toolchain = Toolchain::new(config)?;
        let pkg_config = PkgConfig::new(config.pkg_config.clone(), config.timeout());
        let mut resolver = Self::new(toolchain, pkg_config);
        for dir in &config.include_dirs {
            resolver.add_include_path(dir.clone());
        }
        Ok(resolver)
    }

    /// Add an include path, made absolute against the current directory so
    /// the compiler lists headers under it by absolute path
    pub fn add_include_path(&mut self, path: PathBuf) {
        let path = absolute_path(path);
        if !self.include_paths.contains(&path) {
            self.include_paths.push(path);
        }
    }

    /// Get all include paths
    pub fn include_paths(&self) -> &[PathBuf] {
        &self.include_paths
    }

    pub fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    /// Resolve `header` (as written between angle brackets) to an absolute
    /// path, applying `package`'s compiler flags when given.
    ///
    /// Both temporary files live only for the duration of this call.
    pub fn resolve(&self, header: &str, package: Option<&str>) -> Result<PathBuf> {
        if header.is_empty() || header.contains(['<', '>', '\n']) {
            return Err(Error::HeaderNotFound {
                header: header.to_string(),
                detail: "not a valid include name".to_string(),
            });
        }

        let flags = self.search_flags(header, package)?;

        let mut source = tempfile::Builder::new()
            .prefix("macrotab-")
            .suffix(".c")
            .tempfile()?;
        source.write_all(translation_unit(header).as_bytes())?;
        source.flush()?;

        let rule_file = tempfile::Builder::new()
            .prefix("macrotab-")
            .suffix(".d")
            .tempfile()?;

        self.toolchain
            .list_dependencies(header, source.path(), rule_file.path(), &flags)?;

        let text = fs::read_to_string(rule_file.path())?;
        debug!("Dependency rule for <{}>: {}", header, text.trim());

        let rule = DependencyRule::parse(&text);
        if rule.is_empty() {
            return Err(Error::HeaderNotFound {
                header: header.to_string(),
                detail: "compiler produced no dependency rule".to_string(),
            });
        }

        let path = rule.header_path(header)?;
        info!("Resolved <{}> to {}", header, path.display());
        Ok(path)
    }

    /// `-I` flags for the configured include paths followed by the package's flags
    fn search_flags(&self, header: &str, package: Option<&str>) -> Result<Vec<String>> {
        let mut flags: Vec<String> = self
            .include_paths
            .iter()
            .map(|dir| format!("-I{}", dir.display()))
            .collect();

        if let Some(package) = package {
            flags.extend(self.pkg_config.cflags(package, header)?);
        }

        Ok(flags)
    }
}

fn absolute_path(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(e) => {
            warn!("Cannot make {:?} absolute: {}", path, e);
            path
        }
    }
}

/// A translation unit whose only dependency is `header`
pub fn translation_unit(header: &str) -> String {
    format!("#include <{}>\n\nint main (void) {{\n    return 0;\n}}\n", header)
}
