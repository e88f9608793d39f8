//! Hunks: maximal runs of unchanged rows between edits.
//!
//! Hunks live in an arena indexed by [`HunkId`] and are chained in document
//! order through `prev`/`next` ids. Removing a hunk relinks its neighbours in
//! O(1) and frees its slot, so a removed id never resolves again.

use crate::control::ControlRow;
use crate::rows::{Op, Row};
use std::fmt;

/// Stable handle to a hunk within one [`Hunks`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HunkId(usize);

impl HunkId {
    #[inline]
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for HunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A run of match rows, `first..=last` by row index.
///
/// The range only ever shrinks: context is trimmed off when the hunk is
/// folded, and rows are peeled off as it is unfolded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub first: usize,
    pub last: usize,
    pub prev: Option<HunkId>,
    pub next: Option<HunkId>,

    /// No edit row precedes this hunk.
    pub is_start: bool,

    /// No edit row follows this hunk.
    pub is_end: bool,

    /// The control row shown in place of the hidden rows, if folded.
    pub control: Option<ControlRow>,
}

impl Hunk {
    /// Index distance between the first and last row of the range.
    #[inline]
    #[must_use]
    pub fn span(&self) -> usize {
        self.last - self.first
    }
}

/// Doubly linked list of hunks backed by an arena.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hunks {
    slots: Vec<Option<Hunk>>,
    head: Option<HunkId>,
    len: usize,
}

impl Hunks {
    /// Splits a row sequence into hunks of contiguous match rows.
    ///
    /// A hunk closes at the row right before the next insert or delete, or at
    /// the last row of the table. Consecutive edits produce no hunk, and rows
    /// of any other kind neither open nor close one.
    #[must_use]
    pub fn partition(rows: &[Row]) -> Self {
        let mut hunks = Self::default();
        let mut first = None;
        let mut is_start = true;

        for (i, row) in rows.iter().enumerate() {
            match row.op {
                Op::Match => {
                    first.get_or_insert(i);
                }
                op if op.is_edit() => {
                    // `first` is only set after at least one row, so i > 0.
                    if let Some(start) = first.take() {
                        hunks.push(start, i - 1, is_start, false);
                    }
                    is_start = false;
                }
                _ => {}
            }
        }

        if let Some(start) = first {
            hunks.push(start, rows.len() - 1, is_start, true);
        }

        hunks
    }

    /// Appends a hunk after the last slot. Only valid while nothing was removed.
    fn push(&mut self, first: usize, last: usize, is_start: bool, is_end: bool) -> HunkId {
        let id = HunkId(self.slots.len());
        let prev = self.slots.len().checked_sub(1).map(HunkId);
        if let Some(prev) = prev.and_then(|p| self.get_mut(p)) {
            prev.next = Some(id);
        }
        self.slots.push(Some(Hunk {
            first,
            last,
            prev,
            next: None,
            is_start,
            is_end,
            control: None,
        }));
        self.head.get_or_insert(id);
        self.len += 1;
        id
    }

    #[inline]
    #[must_use]
    pub fn get(&self, id: HunkId) -> Option<&Hunk> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    #[inline]
    pub fn get_mut(&mut self, id: HunkId) -> Option<&mut Hunk> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Unlinks a hunk, joining its neighbours directly to each other.
    ///
    /// Returns the removed hunk, or `None` if `id` was already removed.
    pub fn remove(&mut self, id: HunkId) -> Option<Hunk> {
        let hunk = self.slots.get_mut(id.0)?.take()?;
        match hunk.prev.and_then(|p| self.get_mut(p)) {
            Some(prev) => prev.next = hunk.next,
            None => self.head = hunk.next,
        }
        if let Some(next) = hunk.next.and_then(|n| self.get_mut(n)) {
            next.prev = hunk.prev;
        }
        self.len -= 1;
        Some(hunk)
    }

    /// Number of live hunks.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Ids of live hunks in document order.
    #[must_use]
    pub fn ids(&self) -> Vec<HunkId> {
        let mut ids = Vec::with_capacity(self.len);
        let mut cursor = self.head;
        while let Some(id) = cursor {
            ids.push(id);
            cursor = self.get(id).and_then(|h| h.next);
        }
        ids
    }

    /// Live hunks in document order.
    pub fn iter(&self) -> impl Iterator<Item = (HunkId, &Hunk)> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let id = cursor?;
            let hunk = self.get(id)?;
            cursor = hunk.next;
            Some((id, hunk))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds rows from a pattern: `m` match, `d` delete, `i` insert, `.` structural.
    fn rows(pattern: &str) -> Vec<Row> {
        pattern
            .chars()
            .map(|c| Row {
                op: match c {
                    'm' => Op::Match,
                    'd' => Op::Delete,
                    'i' => Op::Insert,
                    _ => Op::Other,
                },
                ..Row::default()
            })
            .collect()
    }

    fn ranges(hunks: &Hunks) -> Vec<(usize, usize, bool, bool)> {
        hunks
            .iter()
            .map(|(_, h)| (h.first, h.last, h.is_start, h.is_end))
            .collect()
    }

    #[test]
    fn partition_empty_table() {
        let hunks = Hunks::partition(&[]);
        assert!(hunks.is_empty());
        assert!(hunks.ids().is_empty());
    }

    #[test]
    fn partition_all_matches_is_one_hunk() {
        let hunks = Hunks::partition(&rows("mmmm"));
        assert_eq!(ranges(&hunks), vec![(0, 3, true, true)]);
    }

    #[test]
    fn partition_between_edits() {
        let hunks = Hunks::partition(&rows("mmdmmmidmm"));
        assert_eq!(
            ranges(&hunks),
            vec![(0, 1, true, false), (3, 5, false, false), (8, 9, false, true)]
        );
    }

    #[test]
    fn partition_consecutive_edits_produce_no_hunk() {
        let hunks = Hunks::partition(&rows("ddii"));
        assert!(hunks.is_empty());
    }

    #[test]
    fn partition_leading_edit_clears_start_flag() {
        let hunks = Hunks::partition(&rows("dmmm"));
        assert_eq!(ranges(&hunks), vec![(1, 3, false, true)]);
    }

    #[test]
    fn partition_covers_every_row_once() {
        for pattern in ["mmdmmmidmm", "dmmiimmmmd", "mdmdmdm", "iiimmm", "mmmddd"] {
            let rows = rows(pattern);
            let hunks = Hunks::partition(&rows);

            let mut owner = vec![0usize; rows.len()];
            for (_, hunk) in hunks.iter() {
                for i in hunk.first..=hunk.last {
                    assert_eq!(rows[i].op, Op::Match, "{pattern}: row {i}");
                    owner[i] += 1;
                }
            }
            for (i, row) in rows.iter().enumerate() {
                if row.op.is_edit() {
                    owner[i] += 1;
                }
            }
            assert!(owner.iter().all(|&n| n == 1), "{pattern}: {owner:?}");
        }
    }

    #[test]
    fn partition_links_in_document_order() {
        let hunks = Hunks::partition(&rows("mdmdm"));
        let ids = hunks.ids();
        assert_eq!(ids.len(), 3);

        for pair in ids.windows(2) {
            assert_eq!(hunks.get(pair[0]).unwrap().next, Some(pair[1]));
            assert_eq!(hunks.get(pair[1]).unwrap().prev, Some(pair[0]));
        }
        assert_eq!(hunks.get(ids[0]).unwrap().prev, None);
        assert_eq!(hunks.get(ids[2]).unwrap().next, None);
    }

    #[test]
    fn remove_interior_relinks_neighbours() {
        let mut hunks = Hunks::partition(&rows("mdmdm"));
        let ids = hunks.ids();

        let removed = hunks.remove(ids[1]).unwrap();
        assert_eq!(removed.first, 2);
        assert_eq!(hunks.len(), 2);
        assert_eq!(hunks.get(ids[0]).unwrap().next, Some(ids[2]));
        assert_eq!(hunks.get(ids[2]).unwrap().prev, Some(ids[0]));
        assert!(hunks.get(ids[1]).is_none());
    }

    #[test]
    fn remove_head_moves_head() {
        let mut hunks = Hunks::partition(&rows("mdmdm"));
        let ids = hunks.ids();

        hunks.remove(ids[0]);
        assert_eq!(hunks.ids(), vec![ids[1], ids[2]]);
        assert_eq!(hunks.get(ids[1]).unwrap().prev, None);
    }

    #[test]
    fn remove_twice_is_none() {
        let mut hunks = Hunks::partition(&rows("mdm"));
        let ids = hunks.ids();

        assert!(hunks.remove(ids[1]).is_some());
        assert!(hunks.remove(ids[1]).is_none());
        assert_eq!(hunks.len(), 1);
    }
}
