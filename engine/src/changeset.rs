//! Change sets: versioned bags of pending operations.

use crate::error::{Error, Result};
use crate::operation::{CardEdit, CardRemoval, CardSwap, Operation, Rewrite};
use crate::{Board, Card, Collection, Position, Version};
use serde::{Deserialize, Serialize};

/// Pending operations against one board.
///
/// Every position refers to the board as it was when the change set was
/// started. Within one board at most one swap or edit references a given
/// position, and a removed position is never also swapped or edited.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardChanges {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub adds: Vec<Card>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removes: Vec<CardRemoval>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", alias = "replaces")]
    pub swaps: Vec<CardSwap>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", alias = "modifies")]
    pub edits: Vec<CardEdit>,
}

impl BoardChanges {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a bag from raw operations, without the insertion rules.
    pub fn from_operations(ops: impl IntoIterator<Item = Operation>) -> Self {
        let mut changes = Self::new();
        for op in ops {
            changes.push(op);
        }
        changes
    }

    /// Store an operation as-is.
    pub fn push(&mut self, op: Operation) {
        match op {
            Operation::Add(card) => self.adds.push(card),
            Operation::Remove(removal) => self.removes.push(removal),
            Operation::Replace(swap) => self.swaps.push(swap),
            Operation::Modify(edit) => self.edits.push(edit),
        }
    }

    /// All operations, in processing order: removes, swaps, edits, adds.
    pub fn operations(&self) -> Vec<Operation> {
        let mut ops = Vec::with_capacity(self.len());
        ops.extend(self.removes.iter().cloned().map(Operation::Remove));
        ops.extend(self.swaps.iter().cloned().map(Operation::Replace));
        ops.extend(self.edits.iter().cloned().map(Operation::Modify));
        ops.extend(self.adds.iter().cloned().map(Operation::Add));
        ops
    }

    /// Number of pending operations.
    pub fn len(&self) -> usize {
        self.adds.len() + self.removes.len() + self.swaps.len() + self.edits.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether any operation addresses an existing position.
    pub fn has_positional(&self) -> bool {
        !(self.removes.is_empty() && self.swaps.is_empty() && self.edits.is_empty())
    }

    /// Whether the position is removed.
    pub fn is_removed(&self, position: Position) -> bool {
        self.removes.iter().any(|r| r.index == Some(position))
    }

    /// Detach the swap or edit at a position.
    pub fn take_rewrite(&mut self, position: Position) -> Option<Rewrite> {
        if let Some(i) = self.swaps.iter().position(|s| s.index == position) {
            return Some(self.swaps.remove(i).into());
        }
        if let Some(i) = self.edits.iter().position(|e| e.index == position) {
            return Some(self.edits.remove(i).into());
        }
        None
    }

    /// Store a rewrite as a swap or an edit.
    pub fn push_rewrite(&mut self, rewrite: Rewrite) {
        self.push(rewrite.into_operation());
    }

    /// Whether two positional operations claim the same slot.
    pub fn has_overlapping_positions(&self) -> bool {
        let mut rewritten: Vec<Position> = self
            .swaps
            .iter()
            .map(|s| s.index)
            .chain(self.edits.iter().map(|e| e.index))
            .collect();
        rewritten.sort_unstable();
        let mut removed: Vec<Position> = self.removes.iter().filter_map(|r| r.index).collect();
        removed.sort_unstable();
        let duplicated = |positions: &[Position]| positions.windows(2).any(|w| w[0] == w[1]);
        duplicated(&rewritten)
            || duplicated(&removed)
            || rewritten.iter().any(|p| removed.binary_search(p).is_ok())
    }

    /// Stamp every add with the position it lands at on a board of `len`
    /// cards.
    pub fn place_adds(&mut self, len: usize) {
        let kept = len.saturating_sub(self.removes.len());
        for (i, card) in self.adds.iter_mut().enumerate() {
            card.index = Some(kept + i);
        }
    }

    /// Apply an operation with the editing rules.
    fn insert(&mut self, board: Board, op: Operation) -> Result<()> {
        match op {
            Operation::Add(card) => self.adds.push(card),
            Operation::Remove(mut removal) => {
                if let Some(position) = removal.index {
                    if self.is_removed(position) {
                        return Err(Error::AlreadyRemoved { board, position });
                    }
                    if let Some(rewrite) = self.take_rewrite(position) {
                        removal.old_card = rewrite.old_card;
                    }
                }
                self.removes.push(removal);
            }
            Operation::Replace(swap) => self.insert_rewrite(board, swap.into())?,
            Operation::Modify(edit) => self.insert_rewrite(board, edit.into())?,
        }
        Ok(())
    }

    fn insert_rewrite(&mut self, board: Board, rewrite: Rewrite) -> Result<()> {
        let position = rewrite.index;
        if self.is_removed(position) {
            return Err(Error::PositionRemoved { board, position });
        }
        let rewrite = match self.take_rewrite(position) {
            Some(existing) => existing.then(rewrite),
            None => rewrite,
        };
        self.push_rewrite(rewrite);
        Ok(())
    }

    fn strip_details(&mut self) {
        for card in &mut self.adds {
            card.details = None;
        }
        for removal in &mut self.removes {
            removal.old_card = removal.old_card.sanitized();
        }
        for swap in &mut self.swaps {
            swap.old_card = swap.old_card.sanitized();
            swap.card.details = None;
        }
        for edit in &mut self.edits {
            edit.old_card = edit.old_card.sanitized();
            edit.new_card.details = None;
        }
    }
}

/// Pending changes across every board, computed against one version.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSet {
    #[serde(default)]
    pub mainboard: BoardChanges,
    #[serde(default)]
    pub maybeboard: BoardChanges,
    #[serde(default)]
    pub version: Version,
}

impl ChangeSet {
    /// Create an empty change set against a version.
    pub fn new(version: Version) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    /// Builder-style: replace a board's operations.
    pub fn with_board(mut self, board: Board, ops: impl IntoIterator<Item = Operation>) -> Self {
        *self.board_mut(board) = BoardChanges::from_operations(ops);
        self
    }

    /// Builder-style: set the version.
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Operations of a board.
    pub fn board(&self, board: Board) -> &BoardChanges {
        match board {
            Board::Mainboard => &self.mainboard,
            Board::Maybeboard => &self.maybeboard,
        }
    }

    /// Mutable operations of a board.
    pub fn board_mut(&mut self, board: Board) -> &mut BoardChanges {
        match board {
            Board::Mainboard => &mut self.mainboard,
            Board::Maybeboard => &mut self.maybeboard,
        }
    }

    /// Whether no board has pending operations.
    pub fn is_empty(&self) -> bool {
        Board::ALL.iter().all(|b| self.board(*b).is_empty())
    }

    /// Whether every board holds only adds.
    pub fn only_adds(&self) -> bool {
        Board::ALL.iter().all(|b| !self.board(*b).has_positional())
    }

    /// Total number of pending operations.
    pub fn len(&self) -> usize {
        Board::ALL.iter().map(|b| self.board(*b).len()).sum()
    }

    /// Record an operation on a board.
    ///
    /// A remove absorbs any swap or edit at its position, keeping the card
    /// that was there originally. A second swap or edit at a position folds
    /// into the first. Touching a removed position is an error.
    pub fn insert(&mut self, board: Board, op: Operation) -> Result<()> {
        self.board_mut(board).insert(board, op)
    }

    /// Drop the pending add at `slot`.
    pub fn revert_add(&mut self, board: Board, slot: usize) -> Result<Card> {
        let adds = &mut self.board_mut(board).adds;
        check_slot(board, "add", slot, adds.len())?;
        Ok(adds.remove(slot))
    }

    /// Drop the pending remove at `slot`.
    pub fn revert_remove(&mut self, board: Board, slot: usize) -> Result<CardRemoval> {
        let removes = &mut self.board_mut(board).removes;
        check_slot(board, "remove", slot, removes.len())?;
        Ok(removes.remove(slot))
    }

    /// Drop the pending swap at `slot`.
    pub fn revert_swap(&mut self, board: Board, slot: usize) -> Result<CardSwap> {
        let swaps = &mut self.board_mut(board).swaps;
        check_slot(board, "swap", slot, swaps.len())?;
        Ok(swaps.remove(slot))
    }

    /// Drop the pending edit at `slot`.
    pub fn revert_edit(&mut self, board: Board, slot: usize) -> Result<CardEdit> {
        let edits = &mut self.board_mut(board).edits;
        check_slot(board, "edit", slot, edits.len())?;
        Ok(edits.remove(slot))
    }

    /// Stamp adds with their landing positions on `cards`.
    pub fn place_adds(&mut self, cards: &Collection) {
        for board in Board::ALL {
            self.board_mut(board).place_adds(cards.board(board).len());
        }
    }

    /// Copy fit for the change log: display details stripped, prior cards
    /// without position stamps.
    pub fn sanitized(&self) -> ChangeSet {
        let mut clean = self.clone();
        for board in Board::ALL {
            clean.board_mut(board).strip_details();
        }
        clean
    }
}

fn check_slot(board: Board, kind: &'static str, slot: usize, len: usize) -> Result<()> {
    if slot >= len {
        return Err(Error::PendingSlotOutOfRange {
            board,
            kind,
            slot,
            len,
        });
    }
    Ok(())
}
