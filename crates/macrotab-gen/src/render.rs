//! C table rendering
//!
//! Two artifact shapes: a struct array (name/value rows) and a flat pointer
//! array indexed by value plus its initializer routine. Columns are padded
//! to the widest cell so regenerated files only differ when the header does.

use std::collections::BTreeMap;
use std::fmt::Write;
use tracing::{debug, warn};

use macrotab_core::{EntryOrder, Error, ResolvedEntry, Result, TableRequest, TableShape};

use crate::table::EntryTable;

/// Largest flat array that will be emitted
pub const FLAT_ARRAY_LIMIT: usize = 1 << 16;

/// Render `table` in the shape `request` asks for
pub fn render(table: &EntryTable, request: &TableRequest) -> Result<String> {
    match &request.shape {
        TableShape::StructArray {
            type_name,
            value_type,
            array_name,
            order,
        } => Ok(render_struct_array(
            table,
            &request.comment,
            type_name,
            value_type,
            array_name,
            *order,
        )),
        TableShape::FlatArray { array_name, bound } => {
            render_flat_array(table, &request.comment, array_name, bound.as_deref())
        }
    }
}

/// Turn free text into a C comment line unless it already is one
pub fn comment_line(comment: &str) -> String {
    let comment = comment.trim_end();
    if comment.starts_with("//") || comment.starts_with("/*") {
        comment.to_string()
    } else {
        format!("// {}", comment)
    }
}

/// ```c
/// struct T {
///     const char *name;
///     V value;
/// };
///
/// static const struct T A[] = {
///     {"BackSpace", 0xff08},
///     ...
/// };
/// ```
pub fn render_struct_array(
    table: &EntryTable,
    comment: &str,
    type_name: &str,
    value_type: &str,
    array_name: &str,
    order: EntryOrder,
) -> String {
    let rows = table.ordered(order);

    let name_cells: Vec<String> = rows
        .iter()
        .map(|entry| format!("\"{}\",", entry.display_name()))
        .collect();
    let name_width = name_cells.iter().map(String::len).max().unwrap_or(0);
    let value_width = rows.iter().map(|e| e.literal.len()).max().unwrap_or(0);

    let body: Vec<String> = rows
        .iter()
        .zip(&name_cells)
        .map(|(entry, cell)| {
            format!(
                "    {{{:<nw$} {:>vw$}}}",
                cell,
                entry.literal,
                nw = name_width,
                vw = value_width
            )
        })
        .collect();

    let mut out = String::new();
    let _ = writeln!(out, "{}", comment_line(comment));
    out.push('\n');
    let _ = writeln!(out, "struct {} {{", type_name);
    out.push_str("    const char *name;\n");
    let _ = writeln!(out, "    {} value;", value_type);
    out.push_str("};\n\n");
    let _ = writeln!(out, "static const struct {} {}[] = {{", type_name, array_name);
    if !body.is_empty() {
        out.push_str(&body.join(",\n"));
        out.push('\n');
    }
    out.push_str("};\n");
    out
}

/// Slots of a flat array: index = value, `None` where nothing is assigned.
///
/// The length is one past the largest index, where the `bound` macro (when
/// present in the table) counts toward the largest index without taking a
/// slot itself.
pub fn flat_slots<'a>(table: &'a EntryTable, bound: Option<&str>) -> Result<Vec<Option<&'a ResolvedEntry>>> {
    let mut assigned: BTreeMap<usize, &ResolvedEntry> = BTreeMap::new();

    for entry in table.entries() {
        if Some(entry.name.as_str()) == bound {
            continue;
        }
        match usize::try_from(entry.value) {
            Ok(index) => {
                if let Some(previous) = assigned.insert(index, entry) {
                    debug!("Slot {} reassigned from {} to {}", index, previous.name, entry.name);
                }
            }
            Err(_) => warn!("Skipping {} = {}: not a valid index", entry.name, entry.value),
        }
    }

    let bound_index = match bound {
        Some(name) => match table.get(name) {
            Some(entry) => usize::try_from(entry.value).ok(),
            None => {
                warn!("Bound macro {} not found, sizing from entries", name);
                None
            }
        },
        None => None,
    };

    let max_index = assigned.keys().next_back().copied().max(bound_index);
    let len = max_index.map_or(0, |m| m + 1);
    if len > FLAT_ARRAY_LIMIT {
        return Err(Error::Config(format!(
            "values up to {} are too sparse for a flat array (limit {})",
            len - 1,
            FLAT_ARRAY_LIMIT
        )));
    }

    let mut slots = vec![None; len];
    for (index, entry) in assigned {
        slots[index] = Some(entry);
    }
    Ok(slots)
}

/// ```c
/// char *A[N] = {0};
///
/// void init_A (void) {
///     A[  1 ] = "ESC";
///     ...
/// }
/// ```
pub fn render_flat_array(
    table: &EntryTable,
    comment: &str,
    array_name: &str,
    bound: Option<&str>,
) -> Result<String> {
    let slots = flat_slots(table, bound)?;
    let index_width = slots.len().saturating_sub(1).to_string().len();

    let mut out = String::new();
    let _ = writeln!(out, "{}", comment_line(comment));
    out.push('\n');
    let _ = writeln!(out, "char *{}[{}] = {{0}};", array_name, slots.len());
    out.push('\n');
    let _ = writeln!(out, "void init_{} (void) {{", array_name);
    for (index, slot) in slots.iter().enumerate() {
        if let Some(entry) = slot {
            let _ = writeln!(
                out,
                "    {}[ {:>w$} ] = \"{}\";",
                array_name,
                index,
                entry.display_name(),
                w = index_width
            );
        }
    }
    out.push_str("}\n");
    Ok(out)
}
