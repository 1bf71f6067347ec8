//! Reconciliation of a pending change set against a newer version.
//!
//! A change set is computed against the version the editor loaded. When the
//! authoritative collection has moved on, its positions may no longer point at
//! the cards they were recorded against. This module decides whether the
//! pending change set can be carried forward.
//!
//! # Algorithm
//!
//! 1. Same version: the change set is used as-is
//! 2. Only adds: adds never address a position, so the version is bumped
//! 3. Otherwise every remove, swap and edit is checked against the card the
//!    current collection holds at its position. Operations whose recorded
//!    card no longer matches are dropped; if none were dropped the salvaged
//!    change set is fast-forwarded, else the conflict is surfaced

use crate::{Board, BoardChanges, Card, ChangeSet, Collection, Version};
use serde::{Deserialize, Serialize};

/// A pending change set that could not be carried forward intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionConflict {
    /// The pending change set as it was submitted
    pub original: ChangeSet,
    /// The operations still valid against the current version
    pub salvaged: ChangeSet,
    /// The version the salvaged change set is addressed against
    pub current_version: Version,
}

/// Outcome of reconciling a pending change set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum Reconciliation {
    /// The change set was computed against the current version
    Clean { changes: ChangeSet },
    /// The change set was rewritten to the current version without loss
    FastForwarded { changes: ChangeSet },
    /// Some operations no longer apply
    Conflicted(VersionConflict),
}

impl Reconciliation {
    /// The change set to commit, unless conflicted.
    pub fn changes(&self) -> Option<&ChangeSet> {
        match self {
            Reconciliation::Clean { changes } | Reconciliation::FastForwarded { changes } => {
                Some(changes)
            }
            Reconciliation::Conflicted(_) => None,
        }
    }

    /// The conflict, if any.
    pub fn conflict(&self) -> Option<&VersionConflict> {
        match self {
            Reconciliation::Conflicted(conflict) => Some(conflict),
            _ => None,
        }
    }

    /// Whether a conflict must be resolved before committing.
    pub fn is_conflicted(&self) -> bool {
        matches!(self, Reconciliation::Conflicted(_))
    }
}

/// Checks pending change sets against the current collection.
pub struct Reconciler<'a> {
    current: &'a Collection,
    version: Version,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler for the collection at `version`.
    pub fn new(current: &'a Collection, version: Version) -> Self {
        Self { current, version }
    }

    /// Decide whether `pending` can be committed against the current version.
    pub fn reconcile(&self, pending: &ChangeSet) -> Reconciliation {
        if pending.version == self.version {
            return Reconciliation::Clean {
                changes: pending.clone(),
            };
        }

        if pending.only_adds() {
            return Reconciliation::FastForwarded {
                changes: pending.clone().with_version(self.version),
            };
        }

        let salvaged = self.salvage(pending);
        let intact = Board::ALL
            .iter()
            .all(|b| positional_counts(pending.board(*b)) == positional_counts(salvaged.board(*b)));

        if intact {
            Reconciliation::FastForwarded { changes: salvaged }
        } else {
            Reconciliation::Conflicted(VersionConflict {
                original: pending.clone(),
                salvaged,
                current_version: self.version,
            })
        }
    }

    /// Keep the operations whose recorded card still matches the current
    /// collection, addressed against the current version.
    pub fn salvage(&self, pending: &ChangeSet) -> ChangeSet {
        let mut salvaged = ChangeSet::new(self.version);
        for board in Board::ALL {
            *salvaged.board_mut(board) = self.salvage_board(board, pending.board(board));
        }
        salvaged
    }

    fn salvage_board(&self, board: Board, pending: &BoardChanges) -> BoardChanges {
        let cards = self.current.board(board);
        let matches = |position: usize, prior: &Card| {
            cards
                .get(position)
                .is_some_and(|card| card.is_equivalent(prior))
        };

        BoardChanges {
            adds: pending.adds.clone(),
            removes: pending
                .removes
                .iter()
                .filter(|r| match r.index {
                    Some(position) => matches(position, &r.old_card),
                    None => cards.iter().any(|card| card.is_equivalent(&r.old_card)),
                })
                .cloned()
                .collect(),
            swaps: pending
                .swaps
                .iter()
                .filter(|s| matches(s.index, &s.old_card))
                .cloned()
                .collect(),
            edits: pending
                .edits
                .iter()
                .filter(|e| matches(e.index, &e.old_card))
                .cloned()
                .collect(),
        }
    }
}

fn positional_counts(changes: &BoardChanges) -> (usize, usize, usize) {
    (
        changes.removes.len(),
        changes.swaps.len(),
        changes.edits.len(),
    )
}

/// Reconcile `pending` against `current` at `version`.
pub fn reconcile(current: &Collection, version: Version, pending: &ChangeSet) -> Reconciliation {
    Reconciler::new(current, version).reconcile(pending)
}
