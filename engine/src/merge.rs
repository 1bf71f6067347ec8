//! Folding an ordered list of change sets into their net effect.
//!
//! # Algorithm
//!
//! Each board is folded independently, oldest change set first. A position in
//! a change set addresses the board as it was when that change set was
//! started, so each one is first resolved to what it pointed at:
//!
//! - a base card, by its position before the first change set
//! - a card added earlier in the fold, by its slot among the surviving adds
//!
//! An intermediate board holds its surviving base cards first, in base order,
//! followed by the surviving added cards in the order they were added. The
//! base length is learnt from the first add stamped with the position it
//! landed at. Until one is seen, an added card is recognised by its content.
//!
//! Resolved operations then fold as follows:
//!
//! 1. A remove of an added card cancels both
//! 2. A remove of a rewritten base card absorbs the rewrite, keeping its prior
//! 3. A rewrite of a rewritten base card folds into it, keeping the first prior
//! 4. A rewrite of an added card folds into the add
//!
//! Adds always append, so an add never cancels an earlier remove.

use crate::error::{Error, Result};
use crate::operation::{CardRemoval, Rewrite};
use crate::{Board, BoardChanges, Card, ChangeSet, Position};
use std::collections::BTreeMap;

/// Merge change sets, oldest first, into one change set.
///
/// The result is addressed against the state before the first change set.
/// Its version is the highest input version, which for a log in commit order
/// is the last one; taking the maximum keeps an empty change set stamped 0
/// from resetting it. Merging nothing yields an empty change set at version 0.
///
/// # Panics
///
/// Panics where [`try_merge_changes`] fails.
pub fn merge_changes<'a, I>(changesets: I) -> ChangeSet
where
    I: IntoIterator<Item = &'a ChangeSet>,
{
    match try_merge_changes(changesets) {
        Ok(merged) => merged,
        Err(e) => panic!("malformed change sets: {e}"),
    }
}

/// Merge change sets, failing on input no edit history produces.
///
/// Fails with `OverlappingPositions` when one change set touches a position
/// twice, and with `PositionOutOfBounds` when a position lies past the end of
/// the board its change set was computed against.
pub fn try_merge_changes<'a, I>(changesets: I) -> Result<ChangeSet>
where
    I: IntoIterator<Item = &'a ChangeSet>,
{
    let mut folds: BTreeMap<Board, BoardFold> = BTreeMap::new();
    let mut version = 0;

    for changes in changesets {
        version = version.max(changes.version);
        for board in Board::ALL {
            let board_changes = changes.board(board);
            if board_changes.is_empty() {
                continue;
            }
            folds.entry(board).or_default().fold(board, board_changes)?;
        }
    }

    let mut merged = ChangeSet::new(version);
    for (board, fold) in folds {
        *merged.board_mut(board) = fold.finish();
    }
    Ok(merged)
}

/// What a position of an intermediate board points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    /// Base card, by base position
    Base(Position),
    /// Added card, by slot among the surviving adds
    Added(usize),
}

/// Working state for one board.
#[derive(Debug, Default)]
struct BoardFold {
    base_len: Option<usize>,
    /// Removed base positions, with the card originally there
    removed: BTreeMap<Position, Card>,
    /// Removals that named no position
    located: Vec<CardRemoval>,
    /// Net rewrites of surviving base cards, by base position
    rewrites: BTreeMap<Position, Rewrite>,
    /// Surviving added cards, oldest first
    added: Vec<Card>,
}

impl BoardFold {
    fn fold(&mut self, board: Board, changes: &BoardChanges) -> Result<()> {
        if changes.has_overlapping_positions() {
            return Err(Error::OverlappingPositions { board });
        }

        // Every position resolves against the board before this change set.
        let mut claimed: Vec<usize> = Vec::new();
        let mut rewrites = Vec::with_capacity(changes.swaps.len() + changes.edits.len());
        let swaps = changes.swaps.iter().cloned().map(Rewrite::from);
        let edits = changes.edits.iter().cloned().map(Rewrite::from);
        for rewrite in swaps.chain(edits) {
            let target = self.resolve(board, rewrite.index, &rewrite.old_card, &claimed)?;
            if let Target::Added(slot) = target {
                claimed.push(slot);
            }
            rewrites.push((target, rewrite));
        }

        let mut cancelled: Vec<usize> = Vec::new();
        let mut removed = Vec::new();
        for removal in &changes.removes {
            let Some(position) = removal.index else {
                continue;
            };
            match self.resolve(board, position, &removal.old_card, &claimed)? {
                Target::Added(slot) => {
                    claimed.push(slot);
                    cancelled.push(slot);
                }
                Target::Base(base) => removed.push((base, removal.old_card.clone())),
            }
        }
        let mut located = Vec::new();
        for removal in changes.removes.iter().filter(|r| r.index.is_none()) {
            match self.locate(&removal.old_card, &claimed) {
                Some(slot) => {
                    claimed.push(slot);
                    cancelled.push(slot);
                }
                None => located.push(removal.clone()),
            }
        }

        for (target, rewrite) in rewrites {
            self.rewrite(target, rewrite);
        }
        for (base, prior) in removed {
            self.remove_base(base, prior);
        }
        self.located.extend(located);
        cancelled.sort_unstable_by(|a, b| b.cmp(a));
        for slot in cancelled {
            self.added.remove(slot);
        }

        for card in &changes.adds {
            if self.base_len.is_none() {
                // Base cards still standing sit before every surviving add
                self.base_len = card
                    .index
                    .and_then(|landed| landed.checked_sub(self.added.len()))
                    .map(|kept| kept + self.removed.len() + self.located.len());
            }
            self.added.push(card.clone());
        }
        Ok(())
    }

    fn resolve(
        &self,
        board: Board,
        position: Position,
        prior: &Card,
        claimed: &[usize],
    ) -> Result<Target> {
        let Some(base_len) = self.base_len else {
            return Ok(match self.locate(prior, claimed) {
                Some(slot) => Target::Added(slot),
                None => Target::Base(self.base_position(position)),
            });
        };

        let kept = base_len.saturating_sub(self.removed.len() + self.located.len());
        if position < kept {
            return Ok(Target::Base(self.base_position(position)));
        }
        let slot = position - kept;
        if slot < self.added.len() {
            Ok(Target::Added(slot))
        } else {
            Err(Error::PositionOutOfBounds {
                board,
                position,
                len: kept + self.added.len(),
            })
        }
    }

    /// Most recent unclaimed added card equivalent to `card`.
    fn locate(&self, card: &Card, claimed: &[usize]) -> Option<usize> {
        self.added
            .iter()
            .enumerate()
            .rev()
            .find(|(slot, added)| !claimed.contains(slot) && added.is_equivalent(card))
            .map(|(slot, _)| slot)
    }

    /// Base position of the `position`-th surviving base card.
    fn base_position(&self, position: Position) -> Position {
        let mut base = position;
        for removed in self.removed.keys() {
            if *removed > base {
                break;
            }
            base += 1;
        }
        base
    }

    fn rewrite(&mut self, target: Target, mut rewrite: Rewrite) {
        match target {
            Target::Added(slot) => {
                let add = &mut self.added[slot];
                let index = add.index;
                *add = Card {
                    index,
                    ..rewrite.new_card
                };
            }
            Target::Base(base) => {
                rewrite.index = base;
                let rewrite = match self.rewrites.remove(&base) {
                    Some(existing) => existing.then(rewrite),
                    None => rewrite,
                };
                self.rewrites.insert(base, rewrite);
            }
        }
    }

    fn remove_base(&mut self, base: Position, prior: Card) {
        let prior = match self.rewrites.remove(&base) {
            Some(rewrite) => rewrite.old_card,
            None => prior,
        };
        self.removed.insert(base, prior);
    }

    fn finish(self) -> BoardChanges {
        let mut changes = BoardChanges::new();
        changes.adds = self.added;
        changes.removes = self
            .removed
            .into_iter()
            .map(|(base, prior)| CardRemoval::at(base, prior))
            .chain(self.located)
            .collect();
        for rewrite in self.rewrites.into_values() {
            changes.push_rewrite(rewrite);
        }
        changes
    }
}
