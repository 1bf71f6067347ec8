//! Edge case tests for cubelog-engine
//!
//! These tests cover the documented scenarios, boundary conditions and
//! unusual inputs.

use cubelog_engine::{
    apply_reversed, merge_changes, reconcile, replay, revert_changes, Board, Card, CardRemoval,
    ChangeSet, Collection, CubeSnapshot, EditSession, Error, Operation, Reconciliation,
};
use serde_json::json;

fn cube(ids: &[&str]) -> Collection {
    Collection::from_boards(ids.iter().map(|id| Card::new(*id)).collect(), vec![])
}

fn ids(cards: &[Card]) -> Vec<&str> {
    cards.iter().map(|c| c.card_id.as_str()).collect()
}

// ============================================================================
// Documented Scenarios
// ============================================================================

#[test]
fn merge_add_then_remove() {
    let card1 = Card::new("card1").at(0);
    let card2 = Card::new("card2").at(1);

    let v1 = ChangeSet::new(1).with_board(
        Board::Mainboard,
        [Operation::add(card1.clone()), Operation::add(card2.clone())],
    );
    let v2 = ChangeSet::new(2).with_board(Board::Mainboard, [Operation::remove(0, card1)]);

    let merged = merge_changes(&[v1, v2]);
    assert_eq!(
        serde_json::to_value(&merged).unwrap(),
        json!({
            "mainboard": {"adds": [{"cardID": "card2", "index": 1}]},
            "maybeboard": {},
            "version": 2
        })
    );
}

#[test]
fn revert_swap() {
    let card1 = Card::new("card1");
    let swapped = Card::new("card1").with_finish("Foil");

    let v3 = ChangeSet::new(3).with_board(
        Board::Mainboard,
        [Operation::replace(1, card1.clone(), swapped.clone())],
    );

    let reverted = revert_changes(&[v3]);
    assert_eq!(
        reverted,
        ChangeSet::new(3).with_board(
            Board::Mainboard,
            [
                Operation::add(card1),
                Operation::remove(1, swapped),
            ]
        )
    );
}

#[test]
fn replay_remove_first() {
    let changes =
        ChangeSet::new(0).with_board(Board::Mainboard, [Operation::remove(0, Card::new("A"))]);

    let next = replay(&cube(&["A", "B", "C"]), &changes).unwrap();
    assert_eq!(next, cube(&["B", "C"]));
    assert_eq!(next.mainboard[0].index, Some(0));
    assert_eq!(next.mainboard[1].index, Some(1));
}

#[test]
fn reconcile_adds_only() {
    let pending = ChangeSet::new(1).with_board(
        Board::Mainboard,
        [Operation::add(Card::new("x")), Operation::add(Card::new("y"))],
    );

    let outcome = reconcile(&cube(&["a"]), 5, &pending);
    assert_eq!(
        outcome,
        Reconciliation::FastForwarded {
            changes: pending.with_version(5)
        }
    );
}

// ============================================================================
// Empty Inputs
// ============================================================================

#[test]
fn empty_changeset_replays_to_same_cards() {
    let collection = cube(&["a", "b"]);
    assert_eq!(replay(&collection, &ChangeSet::new(0)).unwrap(), collection);
}

#[test]
fn empty_collection_accepts_adds() {
    let changes = ChangeSet::new(0)
        .with_board(Board::Maybeboard, [Operation::add(Card::new("x"))]);

    let next = replay(&Collection::new(), &changes).unwrap();
    assert!(next.mainboard.is_empty());
    assert_eq!(next.maybeboard[0].index, Some(0));
    assert_eq!(next.maybeboard[0].board, Some(Board::Maybeboard));
}

#[test]
fn revert_of_nothing() {
    let reverted = revert_changes(&Vec::<ChangeSet>::new());
    assert!(reverted.is_empty());
    assert_eq!(reverted.version, 0);
}

#[test]
fn removing_last_card() {
    let changes =
        ChangeSet::new(0).with_board(Board::Mainboard, [Operation::remove(0, Card::new("a"))]);

    let next = replay(&cube(&["a"]), &changes).unwrap();
    assert!(next.is_empty());
}

// ============================================================================
// Card Edge Cases
// ============================================================================

#[test]
fn unicode_card_ids() {
    let names = ["日本語テスト", "Привет мир", "🎉🚀💯", "Hello\nWorld\tTab"];

    let collection = cube(&names);
    let changes = ChangeSet::new(0).with_board(
        Board::Mainboard,
        [Operation::modify(
            2,
            Card::new(names[2]),
            Card::new(names[2]).with_notes("ünïcödé"),
        )],
    );

    let next = replay(&collection, &changes).unwrap();
    assert_eq!(next.mainboard[2].notes.as_deref(), Some("ünïcödé"));

    let json = serde_json::to_string(&changes).unwrap();
    let parsed: ChangeSet = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, changes);
}

#[test]
fn duplicate_cards_in_one_board() {
    // The same printing twice: positions, not ids, identify cards
    let collection = cube(&["bolt", "bolt", "bolt"]);
    let changes = ChangeSet::new(0).with_board(
        Board::Mainboard,
        [Operation::modify(
            1,
            Card::new("bolt"),
            Card::new("bolt").with_finish("Foil"),
        )],
    );

    let next = replay(&collection, &changes).unwrap();
    assert_eq!(next.mainboard[0].finish, None);
    assert_eq!(next.mainboard[1].finish.as_deref(), Some("Foil"));
    assert_eq!(next.mainboard[2].finish, None);
}

#[test]
fn located_removal_picks_last_match() {
    let collection = Collection::from_boards(
        vec![
            Card::new("bolt").with_notes("first"),
            Card::new("bolt"),
            Card::new("bolt").with_notes("last"),
            Card::new("bolt"),
        ],
        vec![],
    );
    let changes = ChangeSet::new(0).with_board(
        Board::Mainboard,
        [Operation::Remove(CardRemoval::locate(Card::new("bolt")))],
    );

    let next = replay(&collection, &changes).unwrap();
    assert_eq!(next.mainboard.len(), 3);
    assert_eq!(next.mainboard[2].notes.as_deref(), Some("last"));
}

#[test]
fn details_never_affect_equivalence() {
    let collection = Collection::from_boards(
        vec![Card::new("a").with_details(json!({"name": "Lightning Bolt", "cmc": 1}))],
        vec![],
    );
    let pending = ChangeSet::new(1)
        .with_board(Board::Mainboard, [Operation::remove(0, Card::new("a"))]);

    let outcome = reconcile(&collection, 2, &pending);
    assert!(matches!(outcome, Reconciliation::FastForwarded { .. }));
}

// ============================================================================
// Position Edge Cases
// ============================================================================

#[test]
fn removing_every_position() {
    let collection = cube(&["a", "b", "c", "d", "e"]);
    let changes = ChangeSet::new(0).with_board(
        Board::Mainboard,
        (0..5).map(|p| Operation::remove(p, collection.mainboard[p].sanitized())),
    );

    let next = replay(&collection, &changes).unwrap();
    assert!(next.mainboard.is_empty());

    let restored = apply_reversed(&next, &[changes]).unwrap();
    assert_eq!(ids(&restored.mainboard), vec!["a", "b", "c", "d", "e"]);
}

#[test]
fn out_of_bounds_leaves_no_partial_state() {
    let collection = cube(&["a", "b"]);
    let changes = ChangeSet::new(0).with_board(
        Board::Mainboard,
        [
            Operation::modify(0, Card::new("a"), Card::new("a").with_status("Owned")),
            Operation::remove(7, Card::new("z")),
        ],
    );

    let err = replay(&collection, &changes).unwrap_err();
    assert_eq!(
        err,
        Error::PositionOutOfBounds {
            board: Board::Mainboard,
            position: 7,
            len: 2
        }
    );
    assert_eq!(collection, cube(&["a", "b"]));
}

#[test]
fn large_positions() {
    let names: Vec<String> = (0..1000).map(|i| format!("card-{i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let collection = cube(&refs);

    let changes = ChangeSet::new(0).with_board(
        Board::Mainboard,
        [
            Operation::remove(999, Card::new("card-999")),
            Operation::remove(0, Card::new("card-0")),
            Operation::remove(500, Card::new("card-500")),
        ],
    );

    let next = replay(&collection, &changes).unwrap();
    assert_eq!(next.mainboard.len(), 997);
    assert_eq!(next.mainboard[0].card_id, "card-1");
    assert_eq!(next.mainboard[499].card_id, "card-501");
    assert_eq!(next.mainboard[996].card_id, "card-998");
}

// ============================================================================
// History Edge Cases
// ============================================================================

#[test]
fn long_history_reconstructs_every_version() {
    let mut snapshot = CubeSnapshot::new("cube", cube(&["a", "b", "c"]));
    let mut history = vec![snapshot.clone()];
    let mut log = Vec::new();

    let edits: Vec<Box<dyn Fn(&mut EditSession)>> = vec![
        Box::new(|s| s.add_card(Board::Mainboard, Card::new("d")).unwrap()),
        Box::new(|s| s.edit_card(Board::Mainboard, 1, Card::new("b").with_status("Owned")).unwrap()),
        Box::new(|s| s.move_card(Board::Mainboard, 0, Board::Maybeboard).unwrap()),
        Box::new(|s| s.swap_card(Board::Mainboard, 2, Card::new("z")).unwrap()),
    ];

    for edit in edits {
        let mut session = EditSession::new(snapshot.clone());
        edit(&mut session);
        log.push(snapshot.log_entry(session.changes()));
        snapshot = snapshot.commit(session.changes()).unwrap();
        history.push(snapshot.clone());
    }

    for (version, expected) in history.iter().enumerate() {
        let restored = apply_reversed(&snapshot.cards, &log[version..]).unwrap();
        assert_eq!(&restored, &expected.cards, "version {version}");

        let merged = merge_changes(&log[version..]);
        assert_eq!(replay(&expected.cards, &merged).unwrap(), snapshot.cards, "version {version}");
    }
}

/// Commit one session per edit and return the change log.
fn commit_sessions(
    snapshot: &mut CubeSnapshot,
    edits: Vec<Box<dyn Fn(&mut EditSession)>>,
) -> Vec<ChangeSet> {
    let mut log = Vec::new();
    for edit in edits {
        let mut session = EditSession::new(snapshot.clone());
        edit(&mut session);
        log.push(snapshot.log_entry(session.changes()));
        *snapshot = snapshot.commit(session.changes()).unwrap();
    }
    log
}

#[test]
fn edit_after_removing_first_card_merges_and_reverts() {
    let base = CubeSnapshot::new("cube", cube(&["a", "b", "c"]));
    let mut snapshot = base.clone();
    let edits: Vec<Box<dyn Fn(&mut EditSession)>> = vec![
        Box::new(|s| s.remove_card(Board::Mainboard, 0).unwrap()),
        Box::new(|s| s.edit_card(Board::Mainboard, 0, Card::new("b").with_status("Owned")).unwrap()),
    ];
    let log = commit_sessions(&mut snapshot, edits);

    let merged = merge_changes(&log);
    assert_eq!(merged.mainboard.edits[0].index, 1);
    assert_eq!(replay(&base.cards, &merged).unwrap(), snapshot.cards);

    let reverted = revert_changes(&log);
    assert_eq!(reverted.mainboard.edits[0].index, 0);
    let restored = replay(&snapshot.cards, &reverted).unwrap();
    assert_eq!(ids(&restored.mainboard), vec!["b", "c", "a"]);
    assert_eq!(restored.mainboard[0].status, None);
}

#[test]
fn committed_add_removed_later_leaves_no_trace() {
    let base = CubeSnapshot::new("cube", cube(&["a", "b", "c"]));
    let mut snapshot = base.clone();
    let edits: Vec<Box<dyn Fn(&mut EditSession)>> = vec![
        Box::new(|s| s.add_card(Board::Mainboard, Card::new("x")).unwrap()),
        Box::new(|s| s.remove_card(Board::Mainboard, 1).unwrap()),
        Box::new(|s| s.remove_card(Board::Mainboard, 2).unwrap()),
    ];
    let log = commit_sessions(&mut snapshot, edits);

    let merged = merge_changes(&log);
    assert!(merged.mainboard.adds.is_empty());
    assert_eq!(
        merged.mainboard.removes,
        vec![CardRemoval::at(1, Card::new("b"))]
    );
    assert_eq!(replay(&base.cards, &merged).unwrap(), snapshot.cards);
}

#[test]
fn removing_duplicate_copies_across_versions() {
    let base = CubeSnapshot::new("cube", cube(&["a", "c", "c"]));
    let mut snapshot = base.clone();
    let edits: Vec<Box<dyn Fn(&mut EditSession)>> = vec![
        Box::new(|s| s.remove_card(Board::Mainboard, 1).unwrap()),
        Box::new(|s| s.remove_card(Board::Mainboard, 1).unwrap()),
    ];
    let log = commit_sessions(&mut snapshot, edits);

    let merged = merge_changes(&log);
    assert_eq!(merged.mainboard.removes.len(), 2);
    assert_eq!(ids(&replay(&base.cards, &merged).unwrap().mainboard), vec!["a"]);
    assert_eq!(apply_reversed(&snapshot.cards, &log).unwrap(), base.cards);
}

#[test]
fn many_pending_operations() {
    let names: Vec<String> = (0..200).map(|i| format!("c{i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let mut session = EditSession::new(CubeSnapshot::new("cube", cube(&refs)));

    for p in (0..200).step_by(2) {
        session.remove_card(Board::Mainboard, p).unwrap();
    }
    for p in (1..200).step_by(2) {
        session
            .edit_card(Board::Mainboard, p, Card::new(format!("c{p}")).with_status("Owned"))
            .unwrap();
    }

    let preview = session.preview().unwrap();
    assert_eq!(preview.mainboard.len(), 100);
    assert!(preview
        .mainboard
        .iter()
        .all(|c| c.status.as_deref() == Some("Owned")));
}

#[test]
fn conflicting_sessions() {
    let base = CubeSnapshot::new("cube", cube(&["a", "b", "c"]));

    let mut alice = EditSession::new(base.clone());
    let mut bob = EditSession::new(base.clone());

    alice.remove_card(Board::Mainboard, 0).unwrap();
    bob.edit_card(Board::Mainboard, 2, Card::new("c").with_status("Owned"))
        .unwrap();
    bob.edit_card(Board::Mainboard, 0, Card::new("a").with_notes("proxy"))
        .unwrap();

    let committed = base.commit(alice.changes()).unwrap();
    alice.committed(committed.clone());

    // Bob's positions now point one card further
    assert!(matches!(
        committed.commit(bob.changes()),
        Err(Error::VersionMismatch { .. })
    ));
    let outcome = bob.reconcile(committed.clone()).unwrap();
    assert!(outcome.is_conflicted());
    assert!(bob.conflict().unwrap().salvaged.mainboard.edits.is_empty());

    bob.discard();
    assert_eq!(bob.base(), alice.base());
}
