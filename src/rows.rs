//! Rows of a rendered diff table, as produced by an upstream diff formatter.
//!
//! The formatter has already computed the diff and laid it out as an ordered
//! sequence of rows. Each row carries its edit operation, the line numbers it
//! occupies on either side, and the plain-text code it displays. This module
//! provides the types to deserialize that JSON into Rust structs that the
//! [`crate::table`] module folds.
//!
//! ## JSON Format
//!
//! A single table is a JSON array of rows. A page holding several tables is
//! accepted in two formats:
//!
//! - **array format**: a JSON array of tables: `[[...], [...]]`
//! - **line format**: newline-separated tables: `[...]\n[...]`
//!
//! The [`parse_page`] function handles both formats transparently.
//!
//! ## Example JSON Structure
//!
//! ```json
//! [
//!   {"op": "match", "x_lineno": 1, "y_lineno": 1, "code": "fn main() {"},
//!   {"op": "delete", "x_lineno": 2, "code": "    old();"},
//!   {"op": "insert", "y_lineno": 2, "code": "    new();"},
//!   {"code": null}
//! ]
//! ```

use crate::error::Result;
use serde::Deserialize;

/// The edit operation a row represents.
///
/// Rows without an `op` tag, or with a tag this crate doesn't know, are
/// structural rows and take no part in hunk partitioning.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    Match,
    Insert,
    Delete,
    #[default]
    #[serde(other)]
    Other,
}

impl Op {
    /// Whether this row is an insertion or a deletion.
    #[inline]
    #[must_use]
    pub fn is_edit(self) -> bool {
        matches!(self, Op::Insert | Op::Delete)
    }
}

/// One row of a diff table.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Row {
    #[serde(default)]
    pub op: Op,

    /// 1-based line number on the original (left) side, if the row shows one.
    #[serde(default)]
    pub x_lineno: Option<u32>,

    /// 1-based line number on the modified (right) side, if the row shows one.
    #[serde(default)]
    pub y_lineno: Option<u32>,

    /// The plain-text code displayed by the row.
    ///
    /// `None` for rows that carry no code cell at all (headers, separators).
    #[serde(default)]
    pub code: Option<String>,

    /// Set by [`crate::blocks::annotate`] on a line that opens a block.
    #[serde(skip)]
    pub block_start: bool,

    /// Set by [`crate::blocks::annotate`] on a line that closes a block.
    #[serde(skip)]
    pub block_end: bool,

    /// Set while the row lies inside a folded hunk.
    #[serde(skip)]
    pub hidden: bool,
}

impl Row {
    /// Original-side line number, treating 0 as absent.
    #[inline]
    #[must_use]
    pub fn x_line(&self) -> Option<u32> {
        self.x_lineno.filter(|&n| n > 0)
    }

    /// Modified-side line number, treating 0 as absent.
    #[inline]
    #[must_use]
    pub fn y_line(&self) -> Option<u32> {
        self.y_lineno.filter(|&n| n > 0)
    }
}

/// Parses the rows of a single diff table.
pub fn parse(json: &str) -> Result<Vec<Row>> {
    Ok(serde_json::from_str(json)?)
}

/// Parses every diff table of a page.
///
/// Handles two formats:
/// - array format: JSON array of tables `[[...], [...]]`
/// - line format: newline-separated tables
pub fn parse_page(json: &str) -> Result<Vec<Vec<Row>>> {
    if let Ok(tables) = serde_json::from_str::<Vec<Vec<Row>>>(json) {
        return Ok(tables);
    }

    json.lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_table() {
        let rows = parse("[]").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn parse_match_row() {
        let json = r#"[{"op": "match", "x_lineno": 4, "y_lineno": 5, "code": "let a = 1;"}]"#;

        let rows = parse(json).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].op, Op::Match);
        assert_eq!(rows[0].x_line(), Some(4));
        assert_eq!(rows[0].y_line(), Some(5));
        assert_eq!(rows[0].code.as_deref(), Some("let a = 1;"));
        assert!(!rows[0].hidden);
        assert!(!rows[0].block_start);
    }

    #[test]
    fn parse_edit_rows_carry_one_side() {
        let json = r#"[
            {"op": "delete", "x_lineno": 2, "code": "old"},
            {"op": "insert", "y_lineno": 2, "code": "new"}
        ]"#;

        let rows = parse(json).unwrap();
        assert!(rows[0].op.is_edit());
        assert_eq!(rows[0].y_line(), None);
        assert!(rows[1].op.is_edit());
        assert_eq!(rows[1].x_line(), None);
    }

    #[test]
    fn missing_or_unknown_op_is_structural() {
        let json = r#"[{"code": null}, {"op": "header"}]"#;

        let rows = parse(json).unwrap();
        assert_eq!(rows[0].op, Op::Other);
        assert_eq!(rows[0].code, None);
        assert_eq!(rows[1].op, Op::Other);
        assert!(!rows[1].op.is_edit());
    }

    #[test]
    fn zero_line_number_is_absent() {
        let json = r#"[{"op": "match", "x_lineno": 0, "y_lineno": 3}]"#;

        let rows = parse(json).unwrap();
        assert_eq!(rows[0].x_line(), None);
        assert_eq!(rows[0].y_line(), Some(3));
    }

    #[test]
    fn parse_rejects_malformed_json() {
        assert!(parse(r#"[{"op": "match""#).is_err());
    }

    #[test]
    fn parse_page_array_format() {
        let json = r#"[
            [{"op": "match", "x_lineno": 1, "y_lineno": 1}],
            [{"op": "delete", "x_lineno": 1}, {"op": "insert", "y_lineno": 1}]
        ]"#;

        let tables = parse_page(json).unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].len(), 1);
        assert_eq!(tables[1].len(), 2);
    }

    #[test]
    fn parse_page_line_format() {
        let json = r#"[{"op":"match","x_lineno":1,"y_lineno":1}]

[{"op":"insert","y_lineno":1},{"op":"insert","y_lineno":2}]"#;

        let tables = parse_page(json).unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[1][1].y_line(), Some(2));
    }
}
