//! Applying change sets to concrete collections.
//!
//! Per board, replay runs in three phases against the positions the change set
//! was computed from:
//!
//! 1. Swaps and edits overwrite their slot in place
//! 2. Removals splice out their slot, highest position first
//! 3. Adds are appended
//!
//! Every card is then stamped with its final position and board.
//!
//! Undoing runs the phases backwards against the state a replay produced:
//! appended adds are dropped, removed cards are reinserted at their recorded
//! positions and rewritten slots get their prior card back. Unlike replaying a
//! reverted change set, this restores the exact order of the cards.

use crate::error::{Error, Result};
use crate::revert::revert_changes;
use crate::{Board, BoardChanges, Card, ChangeSet, Collection, Position};

/// Apply a change set to a collection, producing the next collection.
///
/// The input collection is never modified.
pub fn replay(collection: &Collection, changes: &ChangeSet) -> Result<Collection> {
    let mut next = collection.clone();
    for board in Board::ALL {
        apply_board(board, next.board_mut(board), changes.board(board))?;
    }
    next.renumber();
    Ok(next)
}

/// Reconstruct the collection as it was before `changesets`, oldest first,
/// given the collection after them.
///
/// Change sets are undone one at a time, newest first. Every card the undo
/// expects to find must be present, otherwise the log does not describe the
/// collection and `CardNotFound` or `PositionOutOfBounds` is returned.
pub fn apply_reversed<'a, I>(collection: &Collection, changesets: I) -> Result<Collection>
where
    I: IntoIterator<Item = &'a ChangeSet>,
{
    let changesets: Vec<&ChangeSet> = changesets.into_iter().collect();
    let mut previous = collection.clone();
    for changes in changesets.into_iter().rev() {
        for board in Board::ALL {
            undo_board(board, previous.board_mut(board), changes.board(board))?;
        }
    }
    previous.renumber();
    Ok(previous)
}

/// Replay the inverse of `changesets` against the collection after them.
///
/// Re-added cards are appended, so the result holds the same cards as the
/// earlier collection but not necessarily in the same order.
pub fn replay_reverted<'a, I>(collection: &Collection, changesets: I) -> Result<Collection>
where
    I: IntoIterator<Item = &'a ChangeSet>,
{
    replay(collection, &revert_changes(changesets))
}

fn apply_board(board: Board, cards: &mut Vec<Card>, changes: &BoardChanges) -> Result<()> {
    for swap in &changes.swaps {
        overwrite(board, cards, swap.index, &swap.card)?;
    }
    for edit in &changes.edits {
        overwrite(board, cards, edit.index, &edit.new_card)?;
    }

    let mut positions: Vec<Position> = changes.removes.iter().filter_map(|r| r.index).collect();
    for removal in changes.removes.iter().filter(|r| r.index.is_none()) {
        let found = (0..cards.len())
            .rev()
            .find(|i| !positions.contains(i) && cards[*i].is_equivalent(&removal.old_card))
            .ok_or_else(|| Error::CardNotFound {
                board,
                card_id: removal.old_card.card_id.clone(),
            })?;
        positions.push(found);
    }

    positions.sort_unstable_by(|a, b| b.cmp(a));
    for position in positions {
        check_bounds(board, position, cards.len())?;
        cards.remove(position);
    }

    cards.extend(changes.adds.iter().cloned());
    Ok(())
}

fn undo_board(board: Board, cards: &mut Vec<Card>, changes: &BoardChanges) -> Result<()> {
    let kept = cards
        .len()
        .checked_sub(changes.adds.len())
        .ok_or(Error::PositionOutOfBounds {
            board,
            position: changes.adds.len(),
            len: cards.len(),
        })?;
    for (card, added) in cards[kept..].iter().zip(&changes.adds) {
        expect_card(board, card, added)?;
    }
    cards.truncate(kept);

    let mut removed: Vec<(Position, &Card)> = changes
        .removes
        .iter()
        .filter_map(|r| r.index.map(|p| (p, &r.old_card)))
        .collect();
    removed.sort_by_key(|(p, _)| *p);
    for (position, card) in removed {
        if position > cards.len() {
            return Err(Error::PositionOutOfBounds {
                board,
                position,
                len: cards.len(),
            });
        }
        cards.insert(position, card.clone());
    }
    for removal in changes.removes.iter().filter(|r| r.index.is_none()) {
        cards.push(removal.old_card.clone());
    }

    for swap in &changes.swaps {
        check_bounds(board, swap.index, cards.len())?;
        expect_card(board, &cards[swap.index], &swap.card)?;
        cards[swap.index] = swap.old_card.clone();
    }
    for edit in &changes.edits {
        check_bounds(board, edit.index, cards.len())?;
        expect_card(board, &cards[edit.index], &edit.new_card)?;
        cards[edit.index] = edit.old_card.clone();
    }
    Ok(())
}

fn expect_card(board: Board, found: &Card, expected: &Card) -> Result<()> {
    if !found.is_equivalent(expected) {
        return Err(Error::CardNotFound {
            board,
            card_id: expected.card_id.clone(),
        });
    }
    Ok(())
}

fn overwrite(board: Board, cards: &mut [Card], position: Position, card: &Card) -> Result<()> {
    check_bounds(board, position, cards.len())?;
    cards[position] = card.clone();
    Ok(())
}

fn check_bounds(board: Board, position: Position, len: usize) -> Result<()> {
    if position >= len {
        return Err(Error::PositionOutOfBounds {
            board,
            position,
            len,
        });
    }
    Ok(())
}
