//! Concrete cube contents.

use crate::{Board, Card, Position};
use serde::{Deserialize, Serialize};

/// The cards of a cube, one ordered sequence per board.
///
/// A card's position is its index in its board's sequence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    #[serde(default)]
    pub mainboard: Vec<Card>,
    #[serde(default)]
    pub maybeboard: Vec<Card>,
}

impl Collection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from board contents, stamping positions and boards.
    pub fn from_boards(mainboard: Vec<Card>, maybeboard: Vec<Card>) -> Self {
        let mut collection = Self {
            mainboard,
            maybeboard,
        };
        collection.renumber();
        collection
    }

    /// Cards of a board.
    pub fn board(&self, board: Board) -> &[Card] {
        match board {
            Board::Mainboard => &self.mainboard,
            Board::Maybeboard => &self.maybeboard,
        }
    }

    /// Mutable cards of a board.
    pub fn board_mut(&mut self, board: Board) -> &mut Vec<Card> {
        match board {
            Board::Mainboard => &mut self.mainboard,
            Board::Maybeboard => &mut self.maybeboard,
        }
    }

    /// Card at a position.
    pub fn get(&self, board: Board, position: Position) -> Option<&Card> {
        self.board(board).get(position)
    }

    /// Total number of cards across boards.
    pub fn len(&self) -> usize {
        Board::ALL.iter().map(|b| self.board(*b).len()).sum()
    }

    /// Whether every board is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stamp every card with its current position and board.
    pub fn renumber(&mut self) {
        for board in Board::ALL {
            for (index, card) in self.board_mut(board).iter_mut().enumerate() {
                card.index = Some(index);
                card.board = Some(board);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_boards_stamps_positions() {
        let collection = Collection::from_boards(
            vec![Card::new("a"), Card::new("b")],
            vec![Card::new("c")],
        );

        assert_eq!(collection.len(), 3);
        assert_eq!(collection.mainboard[1].index, Some(1));
        assert_eq!(collection.mainboard[1].board, Some(Board::Mainboard));
        assert_eq!(collection.maybeboard[0].index, Some(0));
        assert_eq!(collection.maybeboard[0].board, Some(Board::Maybeboard));
    }

    #[test]
    fn get_by_position() {
        let collection = Collection::from_boards(vec![Card::new("a")], vec![]);

        assert_eq!(collection.get(Board::Mainboard, 0).unwrap().card_id, "a");
        assert!(collection.get(Board::Mainboard, 1).is_none());
        assert!(collection.get(Board::Maybeboard, 0).is_none());
        assert!(!collection.is_empty());
        assert!(Collection::new().is_empty());
    }
}
