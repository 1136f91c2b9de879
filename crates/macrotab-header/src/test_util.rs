//! Shared fixtures for unit tests

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::Duration;

use crate::pkgconfig::PkgConfig;

/// A `pkg-config` stand-in running `body` as a shell script
pub fn stub_pkg_config(dir: &Path, body: &str) -> PkgConfig {
    let path = dir.join("pkg-config");
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    PkgConfig::new(path, Duration::from_secs(10))
}
