//! Board (partition) identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named sub-collection of a cube with its own position space.
///
/// Operations never cross boards implicitly: moving a card is a remove in
/// the source board plus an add in the destination board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Board {
    Mainboard,
    Maybeboard,
}

impl Board {
    /// Every board, in wire order.
    pub const ALL: [Board; 2] = [Board::Mainboard, Board::Maybeboard];

    /// Wire name of the board.
    pub fn as_str(&self) -> &'static str {
        match self {
            Board::Mainboard => "mainboard",
            Board::Maybeboard => "maybeboard",
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
