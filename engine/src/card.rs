//! Card snapshots.
//!
//! A card is an opaque identifier plus the mutable attributes a cube owner
//! can change (status, tags, finish, notes, ...). The engine never interprets
//! these attributes; it copies them and compares them for equivalence.

use crate::{Board, CardId, Position};
use serde::{Deserialize, Serialize};

/// A card as it sits in a cube board or in a change set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Printing identifier
    #[serde(rename = "cardID")]
    pub card_id: CardId,
    /// Ownership status ("Owned", "Not Owned", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Finish ("Foil", "Non-foil", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish: Option<String>,
    /// Owner-defined tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Free-form owner notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Color category override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_category: Option<String>,
    /// Color override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    /// Mana value override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmc: Option<f64>,
    /// Type line override
    #[serde(
        rename = "type_line",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub type_line: Option<String>,
    /// Rarity override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<String>,
    /// Custom front image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img_url: Option<String>,
    /// Custom back image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img_back_url: Option<String>,
    /// Position stamp, maintained by replay
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<Position>,
    /// Board stamp, maintained by replay
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board: Option<Board>,
    /// Hydrated card data for display (never compared, never persisted in change logs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl Card {
    /// Create a card with no attributes set.
    pub fn new(card_id: impl Into<CardId>) -> Self {
        Self {
            card_id: card_id.into(),
            ..Self::default()
        }
    }

    /// Set the ownership status.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Set the finish.
    pub fn with_finish(mut self, finish: impl Into<String>) -> Self {
        self.finish = Some(finish.into());
        self
    }

    /// Set the tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Set the hydrated display details.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Stamp the position this card occupies.
    pub fn at(mut self, index: Position) -> Self {
        self.index = Some(index);
        self
    }

    /// Whether two cards carry the same semantic attributes.
    ///
    /// Position, board and display details are ignored: two snapshots of the
    /// same card taken at different positions are equivalent.
    pub fn is_equivalent(&self, other: &Card) -> bool {
        self.card_id == other.card_id
            && self.type_line == other.type_line
            && self.status == other.status
            && self.cmc == other.cmc
            && self.colors == other.colors
            && self.tags == other.tags
            && self.finish == other.finish
            && self.img_url == other.img_url
            && self.img_back_url == other.img_back_url
            && self.notes == other.notes
            && self.color_category == other.color_category
            && self.rarity == other.rarity
    }

    /// Copy suitable for a prior-card slot: no display details, no stamps.
    pub fn sanitized(&self) -> Card {
        Card {
            index: None,
            board: None,
            details: None,
            ..self.clone()
        }
    }

    /// Copy without position and board stamps, as a card about to be appended.
    pub fn unplaced(mut self) -> Card {
        self.index = None;
        self.board = None;
        self
    }

    /// Copy without display details, keeping stamps.
    pub fn without_details(&self) -> Card {
        Card {
            details: None,
            ..self.clone()
        }
    }
}
