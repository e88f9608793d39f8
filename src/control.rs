//! Control rows standing in for the hidden rows of a folded hunk.

use mlua::prelude::*;
use smallvec::SmallVec;
use std::fmt;

/// A control row holds one or two buttons; inline storage avoids heap allocation.
pub type Controls = SmallVec<[FoldControl; 2]>;

/// Direction in which hidden rows are revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// From the first hidden row toward the end of the file.
    Down,
    /// From the last hidden row toward the start of the file.
    Up,
}

impl Direction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Down => "down",
            Direction::Up => "up",
        }
    }
}

/// The kind of fold button, named after the icon it shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldButton {
    /// Reveals a small interior hunk; activates downward.
    Unfold,
    UnfoldUp,
    UnfoldDown,
}

impl FoldButton {
    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            FoldButton::Unfold => "unfold",
            FoldButton::UnfoldUp => "unfold-up",
            FoldButton::UnfoldDown => "unfold-down",
        }
    }

    #[must_use]
    pub fn direction(self) -> Direction {
        match self {
            FoldButton::Unfold | FoldButton::UnfoldDown => Direction::Down,
            FoldButton::UnfoldUp => Direction::Up,
        }
    }
}

/// A fold button and the number of button columns it spans (1 or 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldControl {
    pub button: FoldButton,
    pub col_span: u8,
}

impl FoldControl {
    #[inline]
    #[must_use]
    pub(crate) fn new(button: FoldButton, col_span: u8) -> Self {
        Self { button, col_span }
    }
}

/// Header of a folded hunk, describing the visible rows that follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HunkHeader {
    /// First original-side line number after the fold.
    pub x_start: u32,
    /// Count of original-side lines after the fold.
    pub x_lines: u32,
    /// First modified-side line number after the fold.
    pub y_start: u32,
    /// Count of modified-side lines after the fold.
    pub y_lines: u32,
    /// Opening line of the enclosing block, or empty.
    pub leader: String,
}

impl fmt::Display for HunkHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "@@ -{},{} +{},{} @@ {}",
            self.x_start, self.x_lines, self.y_start, self.y_lines, self.leader
        )
    }
}

/// The row shown in place of a folded hunk's hidden rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlRow {
    pub controls: Controls,

    /// `None` when no line numbers were found on both sides, e.g. after the
    /// last edit of a file. The header cell is then left blank.
    pub header: Option<HunkHeader>,
}

impl ControlRow {
    /// The header text as displayed, empty if there is no header.
    #[must_use]
    pub fn header_text(&self) -> String {
        self.header
            .as_ref()
            .map_or_else(String::new, ToString::to_string)
    }
}

impl IntoLua for FoldControl {
    fn into_lua(self, lua: &Lua) -> LuaResult<LuaValue> {
        let table = lua.create_table()?;
        table.set("icon", self.button.icon())?;
        table.set("direction", self.button.direction().as_str())?;
        table.set("col_span", self.col_span)?;
        Ok(LuaValue::Table(table))
    }
}
