//! macrotab Generator
//!
//! Turns a family of `#define NAME VALUE` macros into a C lookup table.
//!
//! ## Modules
//!
//! - `extract` - Line-oriented macro definition matching and literal parsing
//! - `table` - Alias resolution into an ordered entry table
//! - `render` - Struct-array and flat-array C rendering
//! - `pipeline` - Resolve, generate and write one configured target

pub mod extract;
pub mod pipeline;
pub mod render;
pub mod table;

use std::io::BufRead;
use tracing::debug;

use macrotab_core::{Error, Result, TableRequest};

pub use extract::{extract_definitions, parse_integer, MacroPattern};
pub use pipeline::{HeaderLocator, Pipeline, RunOptions, TargetOutcome, WriteStatus};
pub use table::EntryTable;

/// Rendered table plus what went into it
#[derive(Debug, Clone)]
pub struct Generated {
    pub text: String,
    /// Literal entries in the table
    pub entries: usize,
    /// Aliases attached to entries
    pub aliases: usize,
    /// Alias candidates dropped because their target was not resolved
    pub unresolved: usize,
}

/// Extract, resolve and render the macros of `source` described by `request`
pub fn generate<R: BufRead>(source: R, request: &TableRequest) -> Result<String> {
    generate_from(source, "<input>", request).map(|generated| generated.text)
}

/// Like [`generate`], naming `source` in errors and logs
pub fn generate_from<R: BufRead>(source: R, source_name: &str, request: &TableRequest) -> Result<Generated> {
    let pattern = MacroPattern::new(&request.prefix)?;
    let definitions = extract_definitions(source, &pattern)?;
    let table = EntryTable::build(&definitions, &request.prefix);

    debug!(
        "{}: {} definitions, {} entries, {} aliases, {} unresolved",
        source_name,
        definitions.len(),
        table.len(),
        table.alias_count(),
        table.unresolved().len()
    );

    if table.is_empty() {
        return Err(Error::NoEntriesExtracted {
            prefix: request.prefix.clone(),
            source_name: source_name.to_string(),
        });
    }

    let text = render::render(&table, request)?;

    Ok(Generated {
        text,
        entries: table.len(),
        aliases: table.alias_count(),
        unresolved: table.unresolved().len(),
    })
}
