//! Block boundary detection from indentation.
//!
//! Hunk headers show a "leader": the opening line of the block that encloses
//! a folded region, e.g. the signature of the surrounding function. Blocks
//! are found with a cheap indentation heuristic instead of a parser: an
//! unindented line followed by an indented one opens a block, and an
//! unindented line followed by a blank one closes it.

use crate::rows::Row;

/// Scores the leading whitespace of a line.
///
/// A space counts 1 and a tab counts 4. Line terminators are skipped.
/// Returns `None` for a blank line, which behaves as infinitely indented.
#[must_use]
pub fn indent_score(line: &str) -> Option<u32> {
    let mut score = 0u32;
    for c in line.chars() {
        match c {
            ' ' => score += 1,
            '\t' => score += 4,
            '\n' | '\r' => {}
            _ => return Some(score),
        }
    }
    None
}

/// Tags `block_start` and `block_end` on rows in a single pass.
///
/// Rows without code are skipped and don't affect the running indentation.
pub fn annotate(rows: &mut [Row]) {
    let mut prev = Some(0);
    for i in 0..rows.len() {
        let Some(code) = rows[i].code.as_deref() else {
            continue;
        };
        let score = indent_score(code);
        if let Some(before) = i.checked_sub(1) {
            match score {
                None if prev == Some(0) => rows[before].block_end = true,
                Some(s) if prev == Some(0) && s > 0 => rows[before].block_start = true,
                _ => {}
            }
        }
        prev = score;
    }
}
