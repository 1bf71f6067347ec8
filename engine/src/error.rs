//! Error types for the Cubelog engine.

use crate::{Board, Position, Version};
use thiserror::Error;

/// All possible errors from the Cubelog engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Structural errors
    #[error("position {position} is out of bounds for {board} (length {len})")]
    PositionOutOfBounds {
        board: Board,
        position: Position,
        len: usize,
    },

    #[error("card {card_id} could not be located in {board}")]
    CardNotFound { board: Board, card_id: String },

    // Editing errors
    #[error("position {position} in {board} is already removed")]
    AlreadyRemoved { board: Board, position: Position },

    #[error("position {position} in {board} is marked for removal")]
    PositionRemoved { board: Board, position: Position },

    #[error("change set for {board} touches one position twice")]
    OverlappingPositions { board: Board },

    #[error("no pending {kind} at slot {slot} in {board} ({len} pending)")]
    PendingSlotOutOfRange {
        board: Board,
        kind: &'static str,
        slot: usize,
        len: usize,
    },

    #[error("pending changes are in conflict with version {current}")]
    UnresolvedConflict { current: Version },

    // State errors
    #[error("version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: Version, actual: Version },

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
