//! Operation types for expressing changes to a board.
//!
//! Changes are expressed as operations, not direct mutations. Every operation
//! except `Add` addresses a position and records the card that occupied it,
//! which is what makes inversion and conflict checks possible.

use crate::{Card, Position};
use serde::{Deserialize, Serialize};

/// Removal of the card at a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRemoval {
    /// Position of the removed card, or `None` to locate `old_card` at replay time
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "position"
    )]
    pub index: Option<Position>,
    /// The card that occupied the position
    #[serde(alias = "priorCard")]
    pub old_card: Card,
}

/// Replacement of the card at a position by another card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSwap {
    /// Position of the swapped card
    #[serde(alias = "position")]
    pub index: Position,
    /// The card that occupied the position
    #[serde(alias = "priorCard")]
    pub old_card: Card,
    /// The card that takes its place
    pub card: Card,
}

/// Edit of the attributes of the card at a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardEdit {
    /// Position of the edited card
    #[serde(alias = "position")]
    pub index: Position,
    /// The card before the edit
    #[serde(alias = "priorCard")]
    pub old_card: Card,
    /// The card after the edit
    pub new_card: Card,
}

/// A single change to one board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Operation {
    Add(Card),
    Remove(CardRemoval),
    Replace(CardSwap),
    Modify(CardEdit),
}

impl Operation {
    /// Append a card.
    pub fn add(card: Card) -> Self {
        Operation::Add(card)
    }

    /// Remove the card at `index`.
    pub fn remove(index: Position, old_card: Card) -> Self {
        Operation::Remove(CardRemoval::at(index, old_card))
    }

    /// Swap the card at `index` for `card`.
    pub fn replace(index: Position, old_card: Card, card: Card) -> Self {
        Operation::Replace(CardSwap {
            index,
            old_card,
            card,
        })
    }

    /// Edit the card at `index`.
    pub fn modify(index: Position, old_card: Card, new_card: Card) -> Self {
        Operation::Modify(CardEdit {
            index,
            old_card,
            new_card,
        })
    }

    /// Position this operation addresses, if any.
    pub fn position(&self) -> Option<Position> {
        match self {
            Operation::Add(_) => None,
            Operation::Remove(removal) => removal.index,
            Operation::Replace(swap) => Some(swap.index),
            Operation::Modify(edit) => Some(edit.index),
        }
    }

    /// Card recorded as occupying the position before this operation.
    pub fn prior(&self) -> Option<&Card> {
        match self {
            Operation::Add(_) => None,
            Operation::Remove(removal) => Some(&removal.old_card),
            Operation::Replace(swap) => Some(&swap.old_card),
            Operation::Modify(edit) => Some(&edit.old_card),
        }
    }

    /// Whether this is an `Add`.
    pub fn is_add(&self) -> bool {
        matches!(self, Operation::Add(_))
    }
}

impl CardRemoval {
    /// Removal of the card at a known position.
    pub fn at(index: Position, old_card: Card) -> Self {
        Self {
            index: Some(index),
            old_card,
        }
    }

    /// Removal of a card whose position is resolved at replay time.
    pub fn locate(old_card: Card) -> Self {
        Self {
            index: None,
            old_card,
        }
    }
}

/// Kind of an in-place rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteKind {
    /// Card identity changes (a swap)
    Replace,
    /// Attributes change (an edit)
    Modify,
}

/// A `Replace` or `Modify` viewed uniformly: a card at a position is rewritten
/// from `old_card` to `new_card`.
#[derive(Debug, Clone, PartialEq)]
pub struct Rewrite {
    pub kind: RewriteKind,
    pub index: Position,
    pub old_card: Card,
    pub new_card: Card,
}

impl Rewrite {
    /// Fold a later rewrite of the same position into this one.
    ///
    /// The result keeps the first prior card so it still reverts to the true
    /// original, takes the later new card, and is a `Replace` if either side
    /// changed the card's identity.
    pub fn then(self, later: Rewrite) -> Rewrite {
        debug_assert_eq!(self.index, later.index);
        let kind = match (self.kind, later.kind) {
            (RewriteKind::Modify, RewriteKind::Modify) => RewriteKind::Modify,
            _ => RewriteKind::Replace,
        };
        Rewrite {
            kind,
            index: self.index,
            old_card: self.old_card,
            new_card: later.new_card,
        }
    }

    /// Back to an operation.
    pub fn into_operation(self) -> Operation {
        match self.kind {
            RewriteKind::Replace => Operation::replace(self.index, self.old_card, self.new_card),
            RewriteKind::Modify => Operation::modify(self.index, self.old_card, self.new_card),
        }
    }
}

impl From<CardSwap> for Rewrite {
    fn from(swap: CardSwap) -> Self {
        Rewrite {
            kind: RewriteKind::Replace,
            index: swap.index,
            old_card: swap.old_card,
            new_card: swap.card,
        }
    }
}

impl From<CardEdit> for Rewrite {
    fn from(edit: CardEdit) -> Self {
        Rewrite {
            kind: RewriteKind::Modify,
            index: edit.index,
            old_card: edit.old_card,
            new_card: edit.new_card,
        }
    }
}
