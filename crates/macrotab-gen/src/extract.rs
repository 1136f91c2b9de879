//! Macro definition extraction
//!
//! Line-oriented scan for single-line object-like macros of the shape
//! `#define NAME VALUE`. Anything else (function-like macros, parenthesized
//! values, continuation lines, conditionals) simply does not match.

use regex::Regex;
use std::io::BufRead;

use macrotab_core::{Error, MacroDefinition, Result};

/// Matches `#define <prefix><name> <value>` and captures name and value
#[derive(Debug, Clone)]
pub struct MacroPattern {
    prefix: String,
    regex: Regex,
}

impl MacroPattern {
    /// Build a pattern for macros whose name starts with `prefix`
    pub fn new(prefix: &str) -> Result<Self> {
        let source = format!(
            r"^#define\s+{}([A-Za-z0-9_]+)\s+([^\s(]\S*)",
            regex::escape(prefix)
        );
        let regex = Regex::new(&source).map_err(|e| Error::Pattern(e.to_string()))?;

        Ok(Self {
            prefix: prefix.to_string(),
            regex,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Match one line, stripping surrounding whitespace first
    pub fn match_line(&self, line: &str) -> Option<MacroDefinition> {
        let caps = self.regex.captures(line.trim())?;
        Some(MacroDefinition::new(&caps[1], &caps[2]))
    }
}

/// Collect every matching definition from `reader`, in header order
pub fn extract_definitions<R: BufRead>(reader: R, pattern: &MacroPattern) -> Result<Vec<MacroDefinition>> {
    let mut definitions = Vec::new();

    for line in reader.split(b'\n') {
        let line = line?;
        let text = String::from_utf8_lossy(&line);
        if let Some(definition) = pattern.match_line(&text) {
            definitions.push(definition);
        }
    }

    Ok(definitions)
}

/// Parse a C integer literal: decimal, `0x` hex, `0b` binary or leading-zero
/// octal, with an optional leading `-` and `u`/`l` suffixes.
pub fn parse_integer(token: &str) -> Option<i64> {
    let (negative, unsigned) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };

    let digits = unsigned.trim_end_matches(['u', 'U', 'l', 'L']);
    if digits.is_empty() {
        return None;
    }

    let (radix, body) = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (16, hex)
    } else if let Some(bin) = digits
        .strip_prefix("0b")
        .or_else(|| digits.strip_prefix("0B"))
    {
        (2, bin)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };

    // from_str_radix would also accept a sign here
    if body.is_empty() || !body.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    let value = i64::from_str_radix(body, radix).ok()?;
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_strips_prefix() {
        let pattern = MacroPattern::new("KEY_").unwrap();
        let def = pattern.match_line("#define KEY_ESC\t\t\t1").unwrap();
        assert_eq!(def.name, "ESC");
        assert_eq!(def.raw_value, "1");
    }

    #[test]
    fn test_match_trims_and_stops_at_whitespace() {
        let pattern = MacroPattern::new("XKB_KEY_").unwrap();
        let def = pattern
            .match_line("   #define XKB_KEY_BackSpace 0xff08  /* U+0008 BACKSPACE */  ")
            .unwrap();
        assert_eq!(def.name, "BackSpace");
        assert_eq!(def.raw_value, "0xff08");
    }

    #[test]
    fn test_non_matching_shapes() {
        let pattern = MacroPattern::new("KEY_").unwrap();
        assert!(pattern.match_line("#define BTN_LEFT 0x110").is_none());
        assert!(pattern.match_line("#define KEY_CNT\t\t\t(KEY_MAX+1)").is_none());
        assert!(pattern.match_line("#define KEY_FN(x) ((x) + 1)").is_none());
        assert!(pattern.match_line("#define KEY_EMPTY").is_none());
        assert!(pattern.match_line("// #define KEY_A 30").is_none());
        assert!(pattern.match_line("#ifndef KEY_A").is_none());
    }

    #[test]
    fn test_prefix_is_escaped() {
        let pattern = MacroPattern::new("A.").unwrap();
        assert!(pattern.match_line("#define AXB 1").is_none());
        assert_eq!(pattern.match_line("#define A.B 1").unwrap().name, "B");
    }

    #[test]
    fn test_empty_prefix_matches_everything() {
        let pattern = MacroPattern::new("").unwrap();
        let def = pattern.match_line("#define KEY_A_ALIAS KEY_A").unwrap();
        assert_eq!(def.name, "KEY_A_ALIAS");
        assert_eq!(def.raw_value, "KEY_A");
    }

    #[test]
    fn test_extract_in_header_order() {
        let header = "#ifndef _CODES_H\n#define _CODES_H\n#define KEY_A 30\n\n#define KEY_B 0x30\n#endif\n";
        let pattern = MacroPattern::new("KEY_").unwrap();
        let defs = extract_definitions(header.as_bytes(), &pattern).unwrap();
        assert_eq!(
            defs,
            vec![
                MacroDefinition::new("A", "30"),
                MacroDefinition::new("B", "0x30"),
            ]
        );
    }

    #[test]
    fn test_extract_tolerates_invalid_utf8() {
        let header: &[u8] = b"/* \xff\xfe */\n#define KEY_A 30\n";
        let pattern = MacroPattern::new("KEY_").unwrap();
        let defs = extract_definitions(header, &pattern).unwrap();
        assert_eq!(defs.len(), 1);
    }

    #[test]
    fn test_parse_integer_bases() {
        assert_eq!(parse_integer("30"), Some(30));
        assert_eq!(parse_integer("0x1E"), Some(30));
        assert_eq!(parse_integer("0X1e"), Some(30));
        assert_eq!(parse_integer("036"), Some(30));
        assert_eq!(parse_integer("0b11110"), Some(30));
        assert_eq!(parse_integer("0"), Some(0));
        assert_eq!(parse_integer("-1"), Some(-1));
        assert_eq!(parse_integer("0x1008FF02UL"), Some(0x1008FF02));
    }

    #[test]
    fn test_parse_integer_rejects_names() {
        assert_eq!(parse_integer("KEY_A"), None);
        assert_eq!(parse_integer("0x"), None);
        assert_eq!(parse_integer("09"), None);
        assert_eq!(parse_integer("+5"), None);
        assert_eq!(parse_integer("1e3"), None);
        assert_eq!(parse_integer(""), None);
        assert_eq!(parse_integer("0xFFFFFFFFFFFFFFFF"), None);
    }
}
