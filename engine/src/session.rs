//! EditSession - the single-writer owner of pending edits.
//!
//! A session holds the snapshot the editor loaded and the change set built on
//! top of it. Prior cards are always taken from that snapshot, so the change
//! set stays addressed against the version it will be committed to.

use crate::error::{Error, Result};
use crate::reconcile::{Reconciler, Reconciliation, VersionConflict};
use crate::replay::replay;
use crate::{
    Board, Card, CardEdit, CardRemoval, CardSwap, ChangeSet, Collection, CubeSnapshot, Operation,
    Position,
};
use serde::{Deserialize, Serialize};

/// A conflict waiting for the editor's decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PendingRebase {
    /// Snapshot the salvaged change set is addressed against
    snapshot: CubeSnapshot,
    conflict: VersionConflict,
}

/// Pending edits to one cube.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSession {
    /// Snapshot the pending changes are addressed against
    base: CubeSnapshot,
    /// Changes not yet committed
    changes: ChangeSet,
    /// Unresolved reconciliation conflict
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rebase: Option<PendingRebase>,
}

impl EditSession {
    /// Start editing a snapshot.
    pub fn new(base: CubeSnapshot) -> Self {
        let changes = ChangeSet::new(base.version);
        Self {
            base,
            changes,
            rebase: None,
        }
    }

    /// The snapshot pending changes are addressed against.
    pub fn base(&self) -> &CubeSnapshot {
        &self.base
    }

    /// The pending changes.
    pub fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    /// Whether anything is pending.
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// The unresolved conflict, if any.
    pub fn conflict(&self) -> Option<&VersionConflict> {
        self.rebase.as_ref().map(|r| &r.conflict)
    }

    fn ensure_editable(&self) -> Result<()> {
        match &self.rebase {
            Some(rebase) => Err(Error::UnresolvedConflict {
                current: rebase.conflict.current_version,
            }),
            None => Ok(()),
        }
    }

    /// Card at a position of the base snapshot, fit for a prior slot.
    fn prior(&self, board: Board, index: Position) -> Result<Card> {
        self.base
            .cards
            .get(board, index)
            .map(Card::sanitized)
            .ok_or_else(|| Error::PositionOutOfBounds {
                board,
                position: index,
                len: self.base.cards.board(board).len(),
            })
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Append a card to a board.
    pub fn add_card(&mut self, board: Board, card: Card) -> Result<()> {
        self.ensure_editable()?;
        self.changes.insert(board, Operation::add(card))
    }

    /// Append several cards to a board.
    pub fn bulk_add(&mut self, board: Board, cards: impl IntoIterator<Item = Card>) -> Result<()> {
        self.ensure_editable()?;
        for card in cards {
            self.changes.insert(board, Operation::add(card))?;
        }
        Ok(())
    }

    /// Remove the card at a position.
    pub fn remove_card(&mut self, board: Board, index: Position) -> Result<()> {
        self.ensure_editable()?;
        let prior = self.prior(board, index)?;
        self.changes
            .insert(board, Operation::Remove(CardRemoval::at(index, prior)))
    }

    /// Swap the card at a position for another card.
    pub fn swap_card(&mut self, board: Board, index: Position, card: Card) -> Result<()> {
        self.ensure_editable()?;
        let prior = self.prior(board, index)?;
        self.changes.insert(
            board,
            Operation::Replace(CardSwap {
                index,
                old_card: prior,
                card: card.at(index),
            }),
        )
    }

    /// Edit the attributes of the card at a position.
    pub fn edit_card(&mut self, board: Board, index: Position, card: Card) -> Result<()> {
        self.ensure_editable()?;
        let prior = self.prior(board, index)?;
        self.changes.insert(
            board,
            Operation::Modify(CardEdit {
                index,
                old_card: prior,
                new_card: card.without_details(),
            }),
        )
    }

    /// Move the card at a position to another board.
    ///
    /// The card is removed from its board and appended to `to_board`.
    pub fn move_card(&mut self, board: Board, index: Position, to_board: Board) -> Result<()> {
        self.ensure_editable()?;
        if board == to_board {
            return Ok(());
        }
        let prior = self.prior(board, index)?;
        self.changes
            .insert(board, Operation::Remove(CardRemoval::at(index, prior.clone())))?;
        self.changes.insert(to_board, Operation::add(prior))
    }

    /// Replace a pending add.
    pub fn edit_added_card(&mut self, board: Board, slot: usize, card: Card) -> Result<()> {
        self.ensure_editable()?;
        self.changes.revert_add(board, slot)?;
        self.changes.board_mut(board).adds.insert(slot, card);
        Ok(())
    }

    /// Move a pending add to another board.
    pub fn move_added_card(&mut self, board: Board, slot: usize, to_board: Board) -> Result<()> {
        self.ensure_editable()?;
        let card = self.changes.revert_add(board, slot)?;
        self.changes.insert(to_board, Operation::add(card))
    }

    /// Drop the pending add at `slot`.
    pub fn revert_add(&mut self, board: Board, slot: usize) -> Result<Card> {
        self.ensure_editable()?;
        self.changes.revert_add(board, slot)
    }

    /// Drop the pending remove at `slot`.
    pub fn revert_remove(&mut self, board: Board, slot: usize) -> Result<CardRemoval> {
        self.ensure_editable()?;
        self.changes.revert_remove(board, slot)
    }

    /// Drop the pending swap at `slot`.
    pub fn revert_swap(&mut self, board: Board, slot: usize) -> Result<CardSwap> {
        self.ensure_editable()?;
        self.changes.revert_swap(board, slot)
    }

    /// Drop the pending edit at `slot`.
    pub fn revert_edit(&mut self, board: Board, slot: usize) -> Result<CardEdit> {
        self.ensure_editable()?;
        self.changes.revert_edit(board, slot)
    }

    /// Drop every pending change.
    pub fn clear(&mut self) {
        self.changes = ChangeSet::new(self.base.version);
    }

    // =========================================================================
    // Versions
    // =========================================================================

    /// The cube as it would look after committing.
    pub fn preview(&self) -> Result<Collection> {
        replay(&self.base.cards, &self.changes)
    }

    /// Check the pending changes against a newer snapshot.
    ///
    /// A clean or fast-forwarded outcome rebases the session onto `current`.
    /// A conflict leaves the pending changes untouched until it is resolved
    /// with [`accept_salvage`](Self::accept_salvage) or
    /// [`discard`](Self::discard).
    pub fn reconcile(&mut self, current: CubeSnapshot) -> Result<Reconciliation> {
        if current.cube_id != self.base.cube_id {
            return Err(Error::InvalidSnapshot(format!(
                "cannot rebase {} onto {}",
                self.base.cube_id, current.cube_id
            )));
        }

        let outcome = Reconciler::new(&current.cards, current.version).reconcile(&self.changes);
        match &outcome {
            Reconciliation::Clean { changes } | Reconciliation::FastForwarded { changes } => {
                self.changes = changes.clone();
                self.base = current;
                self.rebase = None;
            }
            Reconciliation::Conflicted(conflict) => {
                self.rebase = Some(PendingRebase {
                    snapshot: current,
                    conflict: conflict.clone(),
                });
            }
        }
        Ok(outcome)
    }

    /// Resolve a conflict by keeping only the salvaged operations.
    pub fn accept_salvage(&mut self) {
        if let Some(rebase) = self.rebase.take() {
            self.base = rebase.snapshot;
            self.changes = rebase.conflict.salvaged;
        }
    }

    /// Drop every pending change, rebasing onto the conflicting snapshot if
    /// there is one.
    pub fn discard(&mut self) {
        if let Some(rebase) = self.rebase.take() {
            self.base = rebase.snapshot;
        }
        self.clear();
    }

    /// Rebase after a successful commit.
    pub fn committed(&mut self, snapshot: CubeSnapshot) {
        self.base = snapshot;
        self.rebase = None;
        self.clear();
    }
}
