//! macrotab Header Resolution
//!
//! Finds the file the active toolchain would use to satisfy
//! `#include <header>`, by asking the compiler for the dependency rule of a
//! one-line translation unit.
//!
//! ## Modules
//!
//! - `toolchain` - Compiler detection and dependency-listing invocation
//! - `pkgconfig` - Compiler flags for library-scoped headers
//! - `depfile` - Parser for makefile-style dependency rules
//! - `resolver` - The resolve operation tying the above together
//! - `process` - Child process execution with a bounded timeout

pub mod depfile;
pub mod pkgconfig;
pub mod process;
pub mod resolver;
pub mod toolchain;

#[cfg(all(test, unix))]
mod test_util;

pub use depfile::DependencyRule;
pub use pkgconfig::PkgConfig;
pub use resolver::HeaderResolver;
pub use toolchain::Toolchain;
