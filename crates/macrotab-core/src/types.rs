//! Data model shared across the pipeline

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One `#define NAME VALUE` line captured from a header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDefinition {
    /// Macro name with the required prefix already stripped
    pub name: String,
    /// Value token exactly as written in the header
    pub raw_value: String,
}

impl MacroDefinition {
    pub fn new(name: impl Into<String>, raw_value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw_value: raw_value.into(),
        }
    }
}

/// A literal-valued macro together with the aliases that name it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntry {
    pub name: String,
    pub value: i64,
    /// The header's own spelling of the value, e.g. `0xff08`
    pub literal: String,
    /// Alias macro names in header-appearance order
    pub aliases: Vec<String>,
}

impl ResolvedEntry {
    pub fn new(name: impl Into<String>, value: i64, literal: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            literal: literal.into(),
            aliases: Vec::new(),
        }
    }

    /// Name followed by its aliases, separated by `/`
    pub fn display_name(&self) -> String {
        if self.aliases.is_empty() {
            return self.name.clone();
        }
        let mut out = self.name.clone();
        for alias in &self.aliases {
            out.push('/');
            out.push_str(alias);
        }
        out
    }
}

/// Row order of a struct-array table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryOrder {
    /// Header order, every literal entry
    #[default]
    Encounter,
    /// Ascending by value; the last definition of a value wins
    Ascending,
}

/// Declaration shape of a generated artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableShape {
    /// `struct T { const char *name; V value; }` plus a static array of it
    StructArray {
        type_name: String,
        value_type: String,
        array_name: String,
        #[serde(default)]
        order: EntryOrder,
    },
    /// `char *A[N]` indexed by value plus an initializer routine
    FlatArray {
        array_name: String,
        /// Stripped name of the macro holding the largest valid index
        #[serde(default)]
        bound: Option<String>,
    },
}

impl TableShape {
    pub fn array_name(&self) -> &str {
        match self {
            TableShape::StructArray { array_name, .. } => array_name,
            TableShape::FlatArray { array_name, .. } => array_name,
        }
    }
}

/// What to extract from a header and how to render it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRequest {
    /// Required macro-name prefix, stripped from stored names
    pub prefix: String,
    pub shape: TableShape,
    /// Provenance notice, emitted as the first line
    pub comment: String,
}

/// One macro family to generate: header, flags, prefix, shape and output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableTarget {
    /// Target name, used on the command line
    pub name: String,
    /// Include name as written between angle brackets
    pub header: String,
    /// pkg-config package providing extra search paths
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub prefix: String,
    pub shape: TableShape,
    pub output: PathBuf,
    /// Overrides the default provenance comment
    #[serde(default)]
    pub comment: Option<String>,
}

impl TableTarget {
    /// Provenance notice for this target's generated file
    pub fn provenance(&self) -> String {
        match &self.comment {
            Some(comment) => comment.clone(),
            None => format!(
                "// This file was generated by `macrotab run {}` from <{}>. Do not edit.",
                self.name, self.header
            ),
        }
    }

    pub fn request(&self) -> TableRequest {
        TableRequest {
            prefix: self.prefix.clone(),
            shape: self.shape.clone(),
            comment: self.provenance(),
        }
    }
}
