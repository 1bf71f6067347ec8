//! Snapshot types for persisting and restoring cubes.
//!
//! A snapshot is one version of a cube: its identifier, its version counter and
//! its cards. Snapshots serialize deterministically so that two copies of the
//! same version compare equal byte for byte.

use crate::replay::replay;
use crate::{error::Result, Board, ChangeSet, Collection, CubeId, Error, Version};
use serde::{Deserialize, Serialize};

/// Version of the snapshot format for future compatibility.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// A cube at a specific version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CubeSnapshot {
    /// Snapshot format version
    pub format_version: u32,
    /// Cube identifier
    pub cube_id: CubeId,
    /// Number of commits applied to the cube
    pub version: Version,
    /// Cards of every board
    pub cards: Collection,
}

impl CubeSnapshot {
    /// Create a snapshot of a new cube at version 0.
    pub fn new(cube_id: impl Into<CubeId>, cards: Collection) -> Self {
        Self::at_version(cube_id, 0, cards)
    }

    /// Create a snapshot at a given version.
    pub fn at_version(cube_id: impl Into<CubeId>, version: Version, mut cards: Collection) -> Self {
        cards.renumber();
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            cube_id: cube_id.into(),
            version,
            cards,
        }
    }

    /// Apply a change set computed against this version.
    ///
    /// Returns the next snapshot, one version later. A change set computed
    /// against another version is rejected and should be reconciled first.
    pub fn commit(&self, changes: &ChangeSet) -> Result<CubeSnapshot> {
        if changes.version != self.version {
            return Err(Error::VersionMismatch {
                expected: self.version,
                actual: changes.version,
            });
        }
        if let Some(board) = Board::ALL
            .into_iter()
            .find(|b| changes.board(*b).has_overlapping_positions())
        {
            return Err(Error::OverlappingPositions { board });
        }

        Ok(CubeSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            cube_id: self.cube_id.clone(),
            version: self.version + 1,
            cards: replay(&self.cards, changes)?,
        })
    }

    /// Change log entry for a change set computed against this version.
    ///
    /// The entry is sanitized and every add carries the position it lands at,
    /// which lets a later removal of that card cancel it when merging.
    pub fn log_entry(&self, changes: &ChangeSet) -> ChangeSet {
        let mut entry = changes.sanitized();
        entry.place_adds(&self.cards);
        entry
    }

    /// Count cards across every board.
    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    /// Serialize to JSON with deterministic ordering.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    /// Serialize to pretty JSON with deterministic ordering.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut snapshot: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidSnapshot(e.to_string()))?;

        // Validate format version
        if snapshot.format_version > SNAPSHOT_FORMAT_VERSION {
            return Err(Error::InvalidSnapshot(format!(
                "unsupported snapshot format version: {} (max supported: {})",
                snapshot.format_version, SNAPSHOT_FORMAT_VERSION
            )));
        }

        snapshot.cards.renumber();
        Ok(snapshot)
    }
}

/// Metadata about a snapshot (without the cards).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    /// Snapshot format version
    pub format_version: u32,
    /// Cube identifier
    pub cube_id: CubeId,
    /// Version counter
    pub version: Version,
    /// Mainboard card count
    pub mainboard_count: usize,
    /// Maybeboard card count
    pub maybeboard_count: usize,
}

impl From<&CubeSnapshot> for SnapshotMetadata {
    fn from(snapshot: &CubeSnapshot) -> Self {
        Self {
            format_version: snapshot.format_version,
            cube_id: snapshot.cube_id.clone(),
            version: snapshot.version,
            mainboard_count: snapshot.cards.board(Board::Mainboard).len(),
            maybeboard_count: snapshot.cards.board(Board::Maybeboard).len(),
        }
    }
}
