//! Errors raised while decoding input or options.
//!
//! The folding engine itself never fails: hunks without a computable header
//! render blank, small hunks are dropped, and unfolding a hunk that no longer
//! exists is a no-op. Only the boundary where rows and options enter the
//! crate can reject input.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to parse diff rows: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid fold option {name}: {reason}")]
    InvalidPolicy {
        name: &'static str,
        reason: &'static str,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
