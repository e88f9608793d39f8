//! Folding a diff table and unfolding it on demand.
//!
//! A [`DiffTable`] owns the rows of one rendered diff together with the hunks
//! found between its edits. Construction runs the whole pipeline once, and
//! afterwards the table only changes through [`DiffTable::unfold_down`] and
//! [`DiffTable::unfold_up`].
//!
//! ## Construction
//!
//! 1. Rows are annotated with block boundaries (see [`crate::blocks`])
//! 2. Match runs are partitioned into linked hunks (see [`crate::hunks`])
//! 3. Each hunk is dropped or trimmed by the [`FoldPolicy`]
//! 4. Folded hunks hide their rows and get a [`ControlRow`]
//!
//! ## Control rows
//!
//! A control row stands in for the hidden rows of a hunk. It holds one or two
//! fold buttons and a unified-diff style header describing the rows shown
//! between this hunk and the next one:
//!
//! ```text
//! @@ -12,7 +12,8 @@ fn main() {
//! ```
//!
//! Headers of a hunk depend on where the *next* hunk begins, so whenever a
//! hunk shrinks or disappears its predecessor's header is recomputed.

use crate::blocks;
use crate::control::{ControlRow, Controls, Direction, FoldButton, FoldControl, HunkHeader};
use crate::hunks::{Hunk, HunkId, Hunks};
use crate::policy::{Decision, FoldPolicy};
use crate::rows::Row;
use log::{debug, warn};
use mlua::prelude::*;
use smallvec::smallvec;

/// Result of unfolding a hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unfold {
    /// Some rows remain hidden; the hunk has a refreshed control row.
    Partial,
    /// Every row is shown and the hunk no longer exists.
    Dissolved,
}

impl Unfold {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Unfold::Partial => "partial",
            Unfold::Dissolved => "dissolved",
        }
    }
}

/// One entry of the rendered table, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayRow<'a> {
    Control {
        hunk: HunkId,
        control: &'a ControlRow,
    },
    Row {
        index: usize,
        row: &'a Row,
    },
}

/// A diff table with its folded hunks.
#[derive(Debug, Clone)]
pub struct DiffTable {
    rows: Vec<Row>,
    hunks: Hunks,
    policy: FoldPolicy,
}

impl DiffTable {
    /// Annotates, partitions and folds `rows`.
    #[must_use]
    pub fn new(mut rows: Vec<Row>, policy: FoldPolicy) -> Self {
        blocks::annotate(&mut rows);
        let hunks = Hunks::partition(&rows);
        let mut table = Self {
            rows,
            hunks,
            policy,
        };

        for id in table.hunks.ids() {
            let Some(hunk) = table.hunks.get_mut(id) else {
                continue;
            };
            let decision = policy.apply(hunk);
            let (first, last, prev) = (hunk.first, hunk.last, hunk.prev);

            match decision {
                Decision::Drop => {
                    debug!("dropping hunk {id} at rows {first}..={last}");
                    table.hunks.remove(id);
                }
                Decision::Fold => {
                    debug!("folding hunk {id} at rows {first}..={last}");
                    for row in &mut table.rows[first..=last] {
                        row.hidden = true;
                    }
                    table.refresh_control(id);
                }
            }
            table.notify(prev);
        }

        table
    }

    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[inline]
    #[must_use]
    pub fn hunks(&self) -> &Hunks {
        &self.hunks
    }

    #[inline]
    #[must_use]
    pub fn policy(&self) -> FoldPolicy {
        self.policy
    }

    #[inline]
    #[must_use]
    pub fn hunk(&self, id: HunkId) -> Option<&Hunk> {
        self.hunks.get(id)
    }

    /// Rebuilds the control row of a hunk from its current range.
    pub fn refresh_control(&mut self, id: HunkId) {
        let Some(hunk) = self.hunks.get(id) else {
            return;
        };
        let control = ControlRow {
            controls: self.controls_for(hunk),
            header: self.header_for(hunk),
        };
        if let Some(hunk) = self.hunks.get_mut(id) {
            hunk.control = Some(control);
        }
    }

    /// Recomputes only the header of a hunk, after the rows following it changed.
    fn notify(&mut self, id: Option<HunkId>) {
        let Some(hunk) = id.and_then(|id| self.hunks.get(id)) else {
            return;
        };
        let header = self.header_for(hunk);
        if let Some(control) = id
            .and_then(|id| self.hunks.get_mut(id))
            .and_then(|hunk| hunk.control.as_mut())
        {
            control.header = header;
        }
    }

    fn controls_for(&self, hunk: &Hunk) -> Controls {
        match (hunk.is_start, hunk.is_end) {
            (false, false) if hunk.span() <= self.policy.max_unfold_chunk => {
                smallvec![FoldControl::new(FoldButton::Unfold, 2)]
            }
            (true, false) => smallvec![FoldControl::new(FoldButton::UnfoldUp, 2)],
            (false, true) => smallvec![FoldControl::new(FoldButton::UnfoldDown, 2)],
            _ => smallvec![
                FoldControl::new(FoldButton::UnfoldDown, 1),
                FoldControl::new(FoldButton::UnfoldUp, 1),
            ],
        }
    }

    /// Describes the rows between this hunk and the next one (or the table end).
    fn header_for(&self, hunk: &Hunk) -> Option<HunkHeader> {
        let end = hunk
            .next
            .and_then(|next| self.hunks.get(next))
            .map_or(self.rows.len(), |next| next.first);

        let (mut x_start, mut x_lines) = (None, 0);
        let (mut y_start, mut y_lines) = (None, 0);
        for row in &self.rows[hunk.last + 1..end] {
            if let Some(n) = row.x_line() {
                x_start.get_or_insert(n);
                x_lines += 1;
            }
            if let Some(n) = row.y_line() {
                y_start.get_or_insert(n);
                y_lines += 1;
            }
        }

        // A closing line met first means the fold is not inside a block.
        let mut leader = String::new();
        for row in self.rows[..=hunk.last].iter().rev() {
            if row.block_start {
                leader = row.code.clone().unwrap_or_default();
                break;
            } else if row.block_end {
                break;
            }
        }

        Some(HunkHeader {
            x_start: x_start?,
            x_lines,
            y_start: y_start?,
            y_lines,
            leader,
        })
    }

    /// Reveals up to `max_unfold_chunk` rows from the top of a hunk.
    ///
    /// Returns `None` if `id` doesn't name a live hunk.
    pub fn unfold_down(&mut self, id: HunkId) -> Option<Unfold> {
        let Some(hunk) = self.hunks.get(id) else {
            warn!("unfold_down on stale hunk {id}");
            return None;
        };
        let (first, last) = (hunk.first, hunk.last);

        let mut cursor = first;
        for _ in 0..self.policy.max_unfold_chunk {
            self.rows[cursor].hidden = false;
            if cursor == last {
                break;
            }
            cursor += 1;
        }

        Some(self.finish_unfold(id, cursor, last, |hunk, cursor| hunk.first = cursor))
    }

    /// Reveals up to `max_unfold_chunk` rows from the bottom of a hunk.
    ///
    /// Returns `None` if `id` doesn't name a live hunk.
    pub fn unfold_up(&mut self, id: HunkId) -> Option<Unfold> {
        let Some(hunk) = self.hunks.get(id) else {
            warn!("unfold_up on stale hunk {id}");
            return None;
        };
        let (first, last) = (hunk.first, hunk.last);

        let mut cursor = last;
        for _ in 0..self.policy.max_unfold_chunk {
            self.rows[cursor].hidden = false;
            if cursor == first {
                break;
            }
            cursor -= 1;
        }

        Some(self.finish_unfold(id, cursor, first, |hunk, cursor| hunk.last = cursor))
    }

    pub fn unfold(&mut self, id: HunkId, direction: Direction) -> Option<Unfold> {
        match direction {
            Direction::Down => self.unfold_down(id),
            Direction::Up => self.unfold_up(id),
        }
    }

    /// Dissolves the hunk if `cursor` reached the far `edge`, otherwise moves
    /// the near edge to `cursor`. Either way the predecessor's header changes.
    fn finish_unfold(
        &mut self,
        id: HunkId,
        cursor: usize,
        edge: usize,
        shrink: impl FnOnce(&mut Hunk, usize),
    ) -> Unfold {
        let (outcome, prev) = if cursor == edge {
            self.rows[cursor].hidden = false;
            debug!("dissolved hunk {id}");
            (Unfold::Dissolved, self.hunks.remove(id).and_then(|h| h.prev))
        } else {
            let prev = self.hunks.get_mut(id).and_then(|hunk| {
                shrink(hunk, cursor);
                hunk.prev
            });
            self.refresh_control(id);
            (Unfold::Partial, prev)
        };
        self.notify(prev);
        outcome
    }

    /// Every row in order, each folded hunk's control row placed right before
    /// its first hidden row.
    #[must_use]
    pub fn display(&self) -> Vec<DisplayRow<'_>> {
        let mut controls = self
            .hunks
            .iter()
            .filter_map(|(id, hunk)| hunk.control.as_ref().map(|c| (hunk.first, id, c)))
            .peekable();

        let mut out = Vec::with_capacity(self.rows.len() + self.hunks.len());
        for (index, row) in self.rows.iter().enumerate() {
            if let Some((_, hunk, control)) = controls.next_if(|(first, ..)| *first == index) {
                out.push(DisplayRow::Control { hunk, control });
            }
            out.push(DisplayRow::Row { index, row });
        }
        out
    }
}

impl IntoLua for DisplayRow<'_> {
    fn into_lua(self, lua: &Lua) -> LuaResult<LuaValue> {
        let table = lua.create_table()?;
        match self {
            DisplayRow::Control { hunk, control } => {
                table.set("kind", "control")?;
                table.set("hunk", hunk.index())?;
                table.set("header", control.header_text())?;
                let buttons: Vec<LuaValue> = control
                    .controls
                    .iter()
                    .copied()
                    .map(|c| c.into_lua(lua))
                    .collect::<LuaResult<_>>()?;
                table.set("buttons", lua.create_sequence_from(buttons)?)?;
            }
            DisplayRow::Row { index, row } => {
                table.set("kind", "row")?;
                table.set("index", index)?;
                table.set("hidden", row.hidden)?;
            }
        }
        Ok(LuaValue::Table(table))
    }
}
