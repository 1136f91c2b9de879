//! Alias resolution and the entry table
//!
//! Literal macros become entries; macros whose value names another macro
//! are attached to that entry as aliases once the whole header is scanned.

use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use macrotab_core::{EntryOrder, MacroDefinition, ResolvedEntry};

use crate::extract::parse_integer;

/// Resolved entries of one header, in header order
#[derive(Debug, Clone, Default)]
pub struct EntryTable {
    entries: Vec<ResolvedEntry>,
    /// Entry name -> position in `entries`
    index: HashMap<String, usize>,
    /// Alias candidates whose target was never resolved
    unresolved: Vec<MacroDefinition>,
}

impl EntryTable {
    /// Classify `definitions` and resolve aliases.
    ///
    /// `prefix` is the required name prefix: an alias's raw value spells the
    /// full macro name, while entries are stored with the prefix stripped.
    pub fn build(definitions: &[MacroDefinition], prefix: &str) -> Self {
        let mut table = Self::default();
        let mut candidates = Vec::new();

        for definition in definitions {
            match parse_integer(&definition.raw_value) {
                Some(value) => table.insert_literal(definition, value),
                None => candidates.push(definition),
            }
        }

        for alias in candidates {
            let target = alias
                .raw_value
                .strip_prefix(prefix)
                .and_then(|name| table.index.get(name).copied());

            match target {
                Some(position) => {
                    let entry = &mut table.entries[position];
                    if entry.name != alias.name && !entry.aliases.contains(&alias.name) {
                        entry.aliases.push(alias.name.clone());
                    }
                }
                None => {
                    debug!(
                        "Dropping {} = {}: target is not a literal macro",
                        alias.name, alias.raw_value
                    );
                    table.unresolved.push(alias.clone());
                }
            }
        }

        table
    }

    fn insert_literal(&mut self, definition: &MacroDefinition, value: i64) {
        if let Some(&position) = self.index.get(&definition.name) {
            debug!("{} redefined as {}", definition.name, definition.raw_value);
            let entry = &mut self.entries[position];
            entry.value = value;
            entry.literal = definition.raw_value.clone();
            return;
        }

        self.index.insert(definition.name.clone(), self.entries.len());
        self.entries.push(ResolvedEntry::new(
            definition.name.clone(),
            value,
            definition.raw_value.clone(),
        ));
    }

    /// Entries in header order
    pub fn entries(&self) -> &[ResolvedEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedEntry> {
        self.index.get(name).map(|&position| &self.entries[position])
    }

    /// Alias candidates that were dropped
    pub fn unresolved(&self) -> &[MacroDefinition] {
        &self.unresolved
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of attached aliases
    pub fn alias_count(&self) -> usize {
        self.entries.iter().map(|e| e.aliases.len()).sum()
    }

    pub fn max_value(&self) -> Option<i64> {
        self.entries.iter().map(|e| e.value).max()
    }

    /// Entries keyed by value, ascending. When several entries share a
    /// value the one defined last wins.
    pub fn by_value(&self) -> BTreeMap<i64, &ResolvedEntry> {
        let mut map = BTreeMap::new();
        for entry in &self.entries {
            if let Some(previous) = map.insert(entry.value, entry) {
                debug!(
                    "{} shares value {} with {}, keeping {}",
                    entry.name, entry.value, previous.name, entry.name
                );
            }
        }
        map
    }

    /// Entries in the requested row order
    pub fn ordered(&self, order: EntryOrder) -> Vec<&ResolvedEntry> {
        match order {
            EntryOrder::Encounter => self.entries.iter().collect(),
            EntryOrder::Ascending => self.by_value().into_values().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defs(pairs: &[(&str, &str)]) -> Vec<MacroDefinition> {
        pairs
            .iter()
            .map(|(name, value)| MacroDefinition::new(*name, *value))
            .collect()
    }

    #[test]
    fn test_alias_attached_to_literal() {
        let table = EntryTable::build(&defs(&[("KEY_A", "30"), ("KEY_A_ALIAS", "KEY_A")]), "");

        let entry = table.by_value()[&30];
        assert_eq!(entry.name, "KEY_A");
        assert_eq!(entry.aliases, vec!["KEY_A_ALIAS".to_string()]);
        assert!(table.unresolved().is_empty());
    }

    #[test]
    fn test_alias_with_prefix_stripped() {
        // #define KEY_MUTE 113 / #define KEY_MIN_INTERESTING KEY_MUTE
        let table = EntryTable::build(&defs(&[("MUTE", "113"), ("MIN_INTERESTING", "KEY_MUTE")]), "KEY_");
        assert_eq!(table.get("MUTE").unwrap().aliases, vec!["MIN_INTERESTING".to_string()]);
    }

    #[test]
    fn test_alias_defined_before_target() {
        let table = EntryTable::build(&defs(&[("B", "A"), ("A", "7")]), "");
        assert_eq!(table.get("A").unwrap().aliases, vec!["B".to_string()]);
    }

    #[test]
    fn test_aliases_keep_header_order() {
        let table = EntryTable::build(
            &defs(&[("X", "1"), ("Z", "X"), ("Y", "X"), ("W", "X")]),
            "",
        );
        assert_eq!(
            table.get("X").unwrap().aliases,
            vec!["Z".to_string(), "Y".to_string(), "W".to_string()]
        );
    }

    #[test]
    fn test_unresolved_alias_dropped() {
        let table = EntryTable::build(
            &defs(&[("A", "1"), ("B", "UNDEFINED"), ("C", "B")]),
            "",
        );
        assert_eq!(table.len(), 1);
        assert!(table.get("A").unwrap().aliases.is_empty());
        // C points at an alias, not a literal
        assert_eq!(table.unresolved().len(), 2);
        assert_eq!(table.alias_count(), 0);
    }

    #[test]
    fn test_alias_without_prefix_dropped() {
        let table = EntryTable::build(&defs(&[("A", "1"), ("B", "A")]), "KEY_");
        assert!(table.get("A").unwrap().aliases.is_empty());
        assert_eq!(table.unresolved().len(), 1);
    }

    #[test]
    fn test_hex_and_decimal_same_value() {
        let table = EntryTable::build(&defs(&[("HEX", "0x1E"), ("DEC", "30")]), "");
        assert_eq!(table.get("HEX").unwrap().value, table.get("DEC").unwrap().value);
        // Last writer wins in the by-value view
        assert_eq!(table.by_value()[&30].name, "DEC");
        assert_eq!(table.by_value().len(), 1);
    }

    #[test]
    fn test_redefinition_keeps_position() {
        let table = EntryTable::build(&defs(&[("A", "1"), ("B", "2"), ("A", "3")]), "");
        assert_eq!(table.len(), 2);
        assert_eq!(table.entries()[0].name, "A");
        assert_eq!(table.entries()[0].value, 3);
        assert_eq!(table.entries()[0].literal, "3");
    }

    #[test]
    fn test_ordering() {
        let table = EntryTable::build(&defs(&[("C", "3"), ("A", "1"), ("B", "2")]), "");
        let encounter: Vec<_> = table.ordered(EntryOrder::Encounter).into_iter().map(|e| e.name.as_str()).collect();
        let ascending: Vec<_> = table.ordered(EntryOrder::Ascending).into_iter().map(|e| e.name.as_str()).collect();
        assert_eq!(encounter, vec!["C", "A", "B"]);
        assert_eq!(ascending, vec!["A", "B", "C"]);
        assert_eq!(table.max_value(), Some(3));
    }
}
