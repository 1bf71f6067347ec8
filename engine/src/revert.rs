//! Building the change set that undoes a list of change sets.

use crate::merge::merge_changes;
use crate::operation::{CardEdit, CardRemoval};
use crate::{Board, BoardChanges, ChangeSet, Position};

/// Build the change set that, replayed against the state after `changesets`,
/// restores the state before them.
///
/// The inputs are merged first, then every operation of the net change is
/// inverted. Positions in the result address the state after the forward
/// change: a position moves down by one for every removed position before it.
pub fn revert_changes<'a, I>(changesets: I) -> ChangeSet
where
    I: IntoIterator<Item = &'a ChangeSet>,
{
    let merged = merge_changes(changesets);
    let mut reverted = ChangeSet::new(merged.version);
    for board in Board::ALL {
        *reverted.board_mut(board) = invert(merged.board(board));
    }
    reverted
}

fn invert(forward: &BoardChanges) -> BoardChanges {
    let mut removed: Vec<Position> = forward.removes.iter().filter_map(|r| r.index).collect();
    removed.sort_unstable();
    let shifted = |position: Position| {
        match position.checked_sub(removed.partition_point(|p| *p < position)) {
            Some(shifted) => shifted,
            None => panic!("malformed change set: position {position} lies before its removals"),
        }
    };

    let mut inverse = BoardChanges::new();

    for card in &forward.adds {
        inverse
            .removes
            .push(CardRemoval::locate(card.clone().unplaced()));
    }
    for removal in &forward.removes {
        inverse.adds.push(removal.old_card.clone().unplaced());
    }
    for swap in &forward.swaps {
        inverse
            .removes
            .push(CardRemoval::at(shifted(swap.index), swap.card.clone().unplaced()));
        inverse.adds.push(swap.old_card.clone().unplaced());
    }
    for edit in &forward.edits {
        inverse.edits.push(CardEdit {
            index: shifted(edit.index),
            old_card: edit.new_card.clone().unplaced(),
            new_card: edit.old_card.clone().unplaced(),
        });
    }

    inverse
        .removes
        .sort_by_key(|r| (r.index.is_none(), r.index));
    inverse
}
