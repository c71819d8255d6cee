use thiserror::Error;

use crate::model::{Category, HandMode};

#[derive(Error, Debug)]
pub enum TrixError {
    #[error("{category} total ({total}) exceeds maximum ({max})")]
    CategoryExceedsMax {
        category: Category,
        total: u32,
        max: u32,
    },

    #[error("Invalid round notation: {0}")]
    InvalidNotation(String),

    #[error("Invalid hand mode: {0} (use PLUS or MINUS)")]
    InvalidHandMode(String),

    #[error("{0} hand already played in this kingdom")]
    HandModeUnavailable(HandMode),

    #[error("Both PLUS and MINUS are available - choose a hand mode")]
    HandModeRequired,

    #[error("Game is finished! All 4 kingdoms have been completed")]
    GameFinished,

    #[error("No active match - start a new game first")]
    NoActiveMatch,

    #[error("Match not found: {0}")]
    MatchNotFound(String),

    #[error("Round not found: {0}")]
    RoundNotFound(String),

    #[error("No hand is being entered")]
    NoDraft,

    #[error("Unknown player: {0}")]
    UnknownPlayer(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel error: {0}")]
    Excel(#[from] rust_xlsxwriter::XlsxError),
}

pub type Result<T> = std::result::Result<T, TrixError>;
