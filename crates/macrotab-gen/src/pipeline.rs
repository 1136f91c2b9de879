//! Target pipeline: resolve the header, generate the table, write the file

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;

use macrotab_core::{Result, TableTarget};
use macrotab_header::HeaderResolver;

use crate::{generate_from, Generated};

/// Locates the file behind an include name
pub trait HeaderLocator {
    fn locate(&self, header: &str, package: Option<&str>) -> Result<PathBuf>;
}

impl HeaderLocator for HeaderResolver {
    fn locate(&self, header: &str, package: Option<&str>) -> Result<PathBuf> {
        self.resolve(header, package)
    }
}

/// Options for a generation run
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Resolve and render but leave the output file untouched
    pub dry_run: bool,
}

/// What happened to the output file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Written,
    /// Existing file already held the same bytes
    Unchanged,
    /// Dry run
    Skipped,
}

/// Result of running one target
#[derive(Debug, Clone)]
pub struct TargetOutcome {
    pub target: String,
    pub header: PathBuf,
    pub output: PathBuf,
    pub entries: usize,
    pub aliases: usize,
    pub unresolved: usize,
    pub status: WriteStatus,
}

/// Runs targets one after another
pub struct Pipeline<L: HeaderLocator> {
    locator: L,
    options: RunOptions,
}

impl<L: HeaderLocator> Pipeline<L> {
    pub fn new(locator: L, options: RunOptions) -> Self {
        Self { locator, options }
    }

    pub fn options(&self) -> RunOptions {
        self.options
    }

    /// Generate `target` into `output`
    pub fn run(&self, target: &TableTarget, output: &Path) -> Result<TargetOutcome> {
        let header = self
            .locator
            .locate(&target.header, target.package.as_deref())?;

        let file = File::open(&header)?;
        let Generated {
            text,
            entries,
            aliases,
            unresolved,
        } = generate_from(
            BufReader::new(file),
            &header.display().to_string(),
            &target.request(),
        )?;

        let status = write_output(output, &text, self.options.dry_run)?;
        info!(
            "{}: {} entries ({} aliases, {} unresolved) from {} -> {} [{:?}]",
            target.name,
            entries,
            aliases,
            unresolved,
            header.display(),
            output.display(),
            status
        );

        Ok(TargetOutcome {
            target: target.name.clone(),
            header,
            output: output.to_path_buf(),
            entries,
            aliases,
            unresolved,
            status,
        })
    }
}

/// Write `text` to `path` unless it already holds exactly that
pub fn write_output(path: &Path, text: &str, dry_run: bool) -> Result<WriteStatus> {
    if dry_run {
        return Ok(WriteStatus::Skipped);
    }

    if let Ok(existing) = fs::read(path) {
        if existing == text.as_bytes() {
            return Ok(WriteStatus::Unchanged);
        }
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(path, text)?;
    Ok(WriteStatus::Written)
}
