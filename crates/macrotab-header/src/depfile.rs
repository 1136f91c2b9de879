//! Dependency Rule Parser
//!
//! Parses the makefile-style rule written by `cc -M`:
//!
//! ```text
//! tu.o: /tmp/macrotab-tu.c /usr/include/stdc-predef.h \
//!  /usr/include/linux/input-event-codes.h
//! ```
//!
//! Only absolute paths are kept. The translation unit's own entries occupy
//! the first two of them and the requested header is the third.
//!
//! Every `\` is treated as a line continuation, so a path the compiler
//! escapes as `dir\ name/x.h` is split at the space and loses its leading
//! part. Headers under directories with spaces cannot be resolved.

use std::path::{Path, PathBuf};
use tracing::warn;

use macrotab_core::{Error, Result};

/// Position of the requested header among the absolute paths of the rule
pub const HEADER_TOKEN_INDEX: usize = 2;

/// Absolute paths listed by a dependency rule, in rule order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyRule {
    paths: Vec<PathBuf>,
}

impl DependencyRule {
    /// Parse rule text: split on line continuations, tokenize on whitespace,
    /// keep tokens that begin with `/`.
    pub fn parse(text: &str) -> Self {
        let paths = text
            .split('\\')
            .flat_map(str::split_whitespace)
            .filter(|token| token.starts_with('/'))
            .map(PathBuf::from)
            .collect();

        Self { paths }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// The path satisfying `#include <header>`.
    ///
    /// Takes the token at [`HEADER_TOKEN_INDEX`]. When its trailing
    /// components do not spell `header`, the other dependencies are searched
    /// for one that does.
    pub fn header_path(&self, header: &str) -> Result<PathBuf> {
        let wanted = Path::new(header);
        let fixed = self.paths.get(HEADER_TOKEN_INDEX);

        if let Some(candidate) = fixed {
            if candidate.ends_with(wanted) {
                return Ok(candidate.clone());
            }
        }

        if let Some(found) = self.paths.iter().find(|p| p.ends_with(wanted)) {
            warn!(
                "Dependency rule lists {:?} at the header position, using {:?} for <{}>",
                fixed, found, header
            );
            return Ok(found.clone());
        }

        Err(Error::MalformedDependencyOutput(match fixed {
            Some(candidate) => format!(
                "no dependency matches <{}> (header position holds {:?})",
                header, candidate
            ),
            None => format!(
                "expected at least {} absolute paths, found {}",
                HEADER_TOKEN_INDEX + 1,
                self.paths.len()
            ),
        }))
    }
}
