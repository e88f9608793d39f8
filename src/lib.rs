//! # diff-fold
//!
//! A Neovim plugin core for folding unchanged regions of a rendered diff.
//!
//! Long runs of unchanged lines between edits are collapsed behind a single
//! control row carrying a unified-diff style hunk header and fold buttons.
//! Hidden lines can then be revealed incrementally from either edge of the
//! fold. Computing the diff itself is left to an upstream formatter, which
//! hands over the rendered rows as JSON (see [`rows`]).
//!
//! ## Architecture
//!
//! The crate is organized into these modules:
//!
//! - `rows` - Types and parsing for the rendered diff rows
//! - `blocks` - Indentation scoring and block boundary annotation
//! - `hunks` - Partitioning rows into a linked arena of hunks
//! - `control` - Fold buttons and hunk headers of a control row
//! - `policy` - Deciding which hunks to fold and how much context to keep
//! - `table` - Folding a table, header computation and incremental unfolding
//! - `lib` (this module) - Lua bindings
//!
//! ## Usage from Lua
//!
//! ```lua
//! local fold = require("diff_fold")
//!
//! -- Fold a single table with the default options
//! local tbl = fold.fold(rows_json)
//!
//! -- Fold every table of a page, keeping 5 lines of context
//! local tables = fold.fold_page(page_json, { max_context = 5 })
//!
//! for _, entry in ipairs(tbl:display()) do
//!   if entry.kind == "control" then
//!     print(entry.hunk, entry.header)
//!   end
//! end
//!
//! -- Reveal the next chunk of a fold; returns "partial", "dissolved" or nil
//! tbl:unfold_down(hunk_id)
//!
//! -- Same, using the direction attached to a button of a control entry
//! tbl:unfold(entry.hunk, entry.buttons[1].direction)
//! ```

use mlua::prelude::*;
use rayon::prelude::*;

pub mod blocks;
pub mod control;
pub mod error;
pub mod hunks;
pub mod policy;
pub mod rows;
pub mod table;

use control::Direction;
use hunks::{Hunk, HunkId};
use policy::FoldPolicy;
use rows::Row;
use table::{DiffTable, Unfold};

/// Folds independent tables in parallel, preserving their order.
fn fold_tables(tables: Vec<Vec<Row>>, policy: FoldPolicy) -> Vec<DiffTable> {
    tables
        .into_par_iter()
        .map(|rows| DiffTable::new(rows, policy))
        .collect()
}

/// Converts a live hunk into a Lua table.
fn hunk_into_lua(lua: &Lua, id: HunkId, hunk: &Hunk) -> LuaResult<LuaTable> {
    let table = lua.create_table()?;
    table.set("id", id.index())?;
    table.set("first", hunk.first)?;
    table.set("last", hunk.last)?;
    table.set("is_start", hunk.is_start)?;
    table.set("is_end", hunk.is_end)?;
    Ok(table)
}

impl LuaUserData for DiffTable {
    fn add_methods<M: LuaUserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("display", |lua, this, ()| {
            let entries: Vec<LuaValue> = this
                .display()
                .into_iter()
                .map(|entry| entry.into_lua(lua))
                .collect::<LuaResult<_>>()?;
            lua.create_sequence_from(entries)
        });
        methods.add_method("hunks", |lua, this, ()| {
            let hunks: Vec<LuaTable> = this
                .hunks()
                .iter()
                .map(|(id, hunk)| hunk_into_lua(lua, id, hunk))
                .collect::<LuaResult<_>>()?;
            lua.create_sequence_from(hunks)
        });
        methods.add_method_mut("unfold_down", |_, this, id: usize| {
            Ok(this.unfold_down(HunkId::new(id)).map(Unfold::as_str))
        });
        methods.add_method_mut("unfold_up", |_, this, id: usize| {
            Ok(this.unfold_up(HunkId::new(id)).map(Unfold::as_str))
        });
        methods.add_method_mut("unfold", |_, this, (id, direction): (usize, String)| {
            let direction = match direction.as_str() {
                "down" => Direction::Down,
                "up" => Direction::Up,
                other => {
                    return Err(LuaError::RuntimeError(format!(
                        "unknown unfold direction: {other}"
                    )));
                }
            };
            Ok(this.unfold(HunkId::new(id), direction).map(Unfold::as_str))
        });
    }
}

/// Folds the rows of a single diff table.
fn fold(lua: &Lua, (json, policy): (String, FoldPolicy)) -> LuaResult<LuaAnyUserData> {
    let rows = rows::parse(&json).map_err(LuaError::external)?;
    lua.create_userdata(DiffTable::new(rows, policy))
}

/// Folds every diff table of a page.
fn fold_page(lua: &Lua, (json, policy): (String, FoldPolicy)) -> LuaResult<LuaTable> {
    let tables = rows::parse_page(&json).map_err(LuaError::external)?;

    let result = lua.create_table()?;
    for (i, table) in fold_tables(tables, policy).into_iter().enumerate() {
        result.set(i + 1, lua.create_userdata(table)?)?;
    }
    Ok(result)
}

/// Creates the Lua module exports. Called by mlua when loaded via `require("diff_fold")`.
#[mlua::lua_module]
fn diff_fold(lua: &Lua) -> LuaResult<LuaTable> {
    let exports = lua.create_table()?;
    exports.set(
        "fold",
        lua.create_function(|lua, args: (String, FoldPolicy)| fold(lua, args))?,
    )?;
    exports.set(
        "fold_page",
        lua.create_function(|lua, args: (String, FoldPolicy)| fold_page(lua, args))?,
    )?;
    Ok(exports)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_tables_empty_page() {
        let tables = fold_tables(vec![], FoldPolicy::default());
        assert!(tables.is_empty());
    }

    #[test]
    fn test_fold_tables_preserves_order() {
        let page = r#"[
            [{"op":"match","x_lineno":1,"y_lineno":1},{"op":"delete","x_lineno":2}],
            [{"op":"insert","y_lineno":1}],
            []
        ]"#;
        let tables = fold_tables(rows::parse_page(page).unwrap(), FoldPolicy::default());

        assert_eq!(tables.len(), 3);
        assert_eq!(tables[0].rows().len(), 2);
        assert_eq!(tables[1].rows().len(), 1);
        assert!(tables[2].rows().is_empty());
    }

    #[test]
    fn test_fold_tables_applies_policy() {
        let rows: Vec<Row> = (1..=10)
            .map(|n| Row {
                op: rows::Op::Match,
                x_lineno: Some(n),
                y_lineno: Some(n),
                ..Row::default()
            })
            .chain(std::iter::once(Row {
                op: rows::Op::Delete,
                x_lineno: Some(11),
                ..Row::default()
            }))
            .collect();

        let policy = FoldPolicy::new(5, 20).unwrap();
        let tables = fold_tables(vec![rows], policy);
        let hunk = tables[0].hunks().iter().next().map(|(_, h)| h.clone()).unwrap();

        assert_eq!(tables[0].policy(), policy);
        assert_eq!((hunk.first, hunk.last), (0, 4));
    }
}
