//! Folding parameters and the per-hunk fold decision.

use crate::error::{Error, Result};
use crate::hunks::Hunk;
use mlua::prelude::*;

/// Context rows kept visible next to each edit.
pub const DEFAULT_MAX_CONTEXT: usize = 3;

/// Rows revealed by a single unfold.
pub const DEFAULT_MAX_UNFOLD_CHUNK: usize = 20;

/// What to do with a freshly partitioned hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Too small to be worth a control row; leave it fully visible.
    Drop,
    /// Hide the (trimmed) range behind a control row.
    Fold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldPolicy {
    pub max_context: usize,
    pub max_unfold_chunk: usize,
}

impl Default for FoldPolicy {
    fn default() -> Self {
        Self {
            max_context: DEFAULT_MAX_CONTEXT,
            max_unfold_chunk: DEFAULT_MAX_UNFOLD_CHUNK,
        }
    }
}

impl FoldPolicy {
    /// Creates a policy, rejecting an unfold chunk of zero rows and a context
    /// too large to be kept on both sides of an edit.
    pub fn new(max_context: usize, max_unfold_chunk: usize) -> Result<Self> {
        if max_context > usize::MAX / 2 {
            return Err(Error::InvalidPolicy {
                name: "max_context",
                reason: "too large to keep on both sides of a hunk",
            });
        }
        if max_unfold_chunk == 0 {
            return Err(Error::InvalidPolicy {
                name: "max_unfold_chunk",
                reason: "must reveal at least one row",
            });
        }
        Ok(Self {
            max_context,
            max_unfold_chunk,
        })
    }

    /// Context rows the hunk must keep visible: one window per neighbouring edit.
    ///
    /// Saturates, so an oversized context always leads to a drop.
    #[must_use]
    pub fn required_context(&self, hunk: &Hunk) -> usize {
        let edges = usize::from(!hunk.is_start) + usize::from(!hunk.is_end);
        self.max_context.saturating_mul(edges)
    }

    /// Decides whether to fold `hunk`, trimming its range down to the rows to hide.
    ///
    /// A hunk is dropped when hiding it would save fewer rows than the control
    /// row costs. Otherwise context is peeled off each edge that borders an edit.
    pub fn apply(&self, hunk: &mut Hunk) -> Decision {
        if hunk.span() < self.required_context(hunk).saturating_add(1) {
            return Decision::Drop;
        }
        // From here the span covers the context of every trimmed edge.
        if !hunk.is_start {
            hunk.first += self.max_context;
        }
        if !hunk.is_end {
            hunk.last -= self.max_context;
        }
        Decision::Fold
    }
}

impl FromLua for FoldPolicy {
    fn from_lua(value: LuaValue, _lua: &Lua) -> LuaResult<Self> {
        let table = match value {
            LuaValue::Nil => return Ok(Self::default()),
            LuaValue::Table(table) => table,
            other => {
                return Err(LuaError::RuntimeError(format!(
                    "fold options must be a table, got {}",
                    other.type_name()
                )));
            }
        };

        let max_context = table
            .get::<Option<usize>>("max_context")?
            .unwrap_or(DEFAULT_MAX_CONTEXT);
        let max_unfold_chunk = table
            .get::<Option<usize>>("max_unfold_chunk")?
            .unwrap_or(DEFAULT_MAX_UNFOLD_CHUNK);
        Self::new(max_context, max_unfold_chunk).map_err(LuaError::external)
    }
}
