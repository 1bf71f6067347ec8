//! # Cubelog Engine
//!
//! A deterministic change log engine for ordered card collections ("cubes").
//!
//! Edits to a cube are buffered locally as a [`ChangeSet`] and committed against
//! a server-authoritative version. This crate holds the logic for folding,
//! inverting and replaying change sets, and for reconciling a stale pending
//! change set against a newer version of the cube.
//!
//! ## Design Principles
//!
//! - **No IO**: Engine has no knowledge of files, network, or storage
//! - **Deterministic**: Same inputs always produce same outputs
//! - **Pure**: Every operation builds a new value, inputs are never mutated
//! - **Typed**: Operations are an exhaustive enum, not a bag of optional keys
//!
//! ## Core Concepts
//!
//! ### Cards and boards
//!
//! A cube is split into [`Board`]s (mainboard, maybeboard). Each board is an
//! ordered sequence of [`Card`]s and a card's position is its index in that
//! sequence. Positions are not stable: removing position `k` shifts every
//! later card down by one.
//!
//! ### Operations
//!
//! - [`Operation::Add`] - append a card
//! - [`Operation::Remove`] - remove the card at a position
//! - [`Operation::Replace`] - swap the card at a position for another card
//! - [`Operation::Modify`] - edit the attributes of the card at a position
//!
//! ### Engines
//!
//! - [`merge_changes`] folds an ordered list of change sets into their net effect
//! - [`revert_changes`] builds the change set that undoes a list of change sets
//! - [`replay`] applies a change set to a concrete [`Collection`]
//! - [`Reconciler`] checks a pending change set against the current version
//!
//! ## Quick Start
//!
//! ```rust
//! use cubelog_engine::{Board, Card, CubeSnapshot, Collection, EditSession};
//!
//! let cards = Collection::from_boards(
//!     vec![Card::new("a"), Card::new("b"), Card::new("c")],
//!     vec![],
//! );
//! let snapshot = CubeSnapshot::new("cube-1", cards);
//!
//! let mut session = EditSession::new(snapshot.clone());
//! session.remove_card(Board::Mainboard, 0).unwrap();
//! session.add_card(Board::Maybeboard, Card::new("d")).unwrap();
//!
//! let preview = session.preview().unwrap();
//! assert_eq!(preview.board(Board::Mainboard).len(), 2);
//!
//! let next = snapshot.commit(session.changes()).unwrap();
//! assert_eq!(next.version, 1);
//! ```

pub mod board;
pub mod card;
pub mod changeset;
pub mod collection;
pub mod error;
pub mod merge;
pub mod operation;
pub mod reconcile;
pub mod replay;
pub mod revert;
pub mod session;
pub mod snapshot;

// Re-export main types at crate root
pub use board::Board;
pub use card::Card;
pub use changeset::{BoardChanges, ChangeSet};
pub use collection::Collection;
pub use error::Error;
pub use merge::{merge_changes, try_merge_changes};
pub use operation::{CardEdit, CardRemoval, CardSwap, Operation, Rewrite, RewriteKind};
pub use reconcile::{reconcile, Reconciler, Reconciliation, VersionConflict};
pub use replay::{apply_reversed, replay, replay_reverted};
pub use revert::revert_changes;
pub use session::EditSession;
pub use snapshot::{CubeSnapshot, SnapshotMetadata, SNAPSHOT_FORMAT_VERSION};

/// Type aliases for clarity
pub type CardId = String;
pub type CubeId = String;
pub type Version = u64;
pub type Position = usize;
