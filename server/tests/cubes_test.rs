//! Integration tests for the cube protocol.
//!
//! The HTTP tests require a running server backed by PostgreSQL.
//! Set CUBELOG_URL (default http://localhost:3000) and run with `--ignored`.

use cubelog_engine::{
    Board, Card, CardRemoval, ChangeSet, Collection, CubeSnapshot, Operation,
    Reconciler, Reconciliation,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Commit request as sent by clients.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitRequest {
    expected_version: u64,
    changes: ChangeSet,
}

fn sample_cube() -> CubeSnapshot {
    CubeSnapshot::new(
        "cube-1",
        Collection::from_boards(
            vec![Card::new("bolt"), Card::new("counterspell"), Card::new("swords")],
            vec![Card::new("ponder")],
        ),
    )
}

#[cfg(test)]
mod protocol_tests {
    use super::*;

    #[test]
    fn test_commit_request_deserialization() {
        let body = json!({
            "expectedVersion": 3,
            "changes": {
                "mainboard": {
                    "adds": [{ "cardID": "bolt" }],
                    "removes": [{ "index": 1, "oldCard": { "cardID": "counterspell" } }]
                },
                "version": 3
            }
        });

        let request: CommitRequest = serde_json::from_value(body).unwrap();

        assert_eq!(request.expected_version, 3);
        assert_eq!(request.changes.version, 3);
        let mainboard = request.changes.board(Board::Mainboard);
        assert_eq!(mainboard.adds.len(), 1);
        assert_eq!(mainboard.removes[0].index, Some(1));
        assert!(request.changes.board(Board::Maybeboard).is_empty());
    }

    #[test]
    fn test_sanitized_changes_omit_empty_lists_and_details() {
        let changes = ChangeSet::new(0).with_board(
            Board::Mainboard,
            [Operation::add(
                Card::new("bolt").with_details(json!({ "name": "Lightning Bolt" })),
            )],
        );

        let value = serde_json::to_value(changes.sanitized()).unwrap();

        assert!(value["mainboard"].get("removes").is_none());
        assert!(value["mainboard"]["adds"][0].get("details").is_none());
        assert_eq!(value["version"], 0);
    }

    #[test]
    fn test_logged_entries_merge_to_net_change() {
        let cube = sample_cube();
        let first = ChangeSet::new(0).with_board(
            Board::Mainboard,
            [
                Operation::Remove(CardRemoval::at(0, Card::new("bolt"))),
                Operation::add(Card::new("brainstorm")),
            ],
        );
        let logged_first = cube.log_entry(&first);
        assert_eq!(logged_first.mainboard.adds[0].index, Some(2));
        let cube = cube.commit(&first).unwrap();

        let second = ChangeSet::new(1).with_board(
            Board::Mainboard,
            [
                Operation::Remove(CardRemoval::at(2, Card::new("brainstorm"))),
                Operation::modify(0, Card::new("counterspell"), Card::new("counterspell").with_status("Owned")),
            ],
        );
        let logged_second = cube.log_entry(&second);

        let merged = cubelog_engine::merge_changes(&[logged_first, logged_second]);
        assert!(merged.mainboard.adds.is_empty());
        assert_eq!(merged.mainboard.removes, vec![CardRemoval::at(0, Card::new("bolt"))]);
        assert_eq!(merged.mainboard.edits[0].index, 1);
        assert_eq!(merged.version, 1);
    }

    #[test]
    fn test_snapshot_response_shape() {
        let value = serde_json::to_value(sample_cube()).unwrap();

        assert_eq!(value["cubeId"], "cube-1");
        assert_eq!(value["version"], 0);
        assert_eq!(value["cards"]["mainboard"][2]["index"], 2);
        assert_eq!(value["cards"]["maybeboard"][0]["board"], "maybeboard");
    }

    #[test]
    fn test_commit_then_stale_commit_is_rejected() {
        let cube = sample_cube();
        let first = ChangeSet::new(0).with_board(
            Board::Mainboard,
            [Operation::Remove(CardRemoval::at(0, Card::new("bolt")))],
        );
        let next = cube.commit(&first).unwrap();
        assert_eq!(next.version, 1);

        let stale = ChangeSet::new(0)
            .with_board(Board::Maybeboard, [Operation::add(Card::new("brainstorm"))]);
        assert!(matches!(
            next.commit(&stale),
            Err(cubelog_engine::Error::VersionMismatch {
                expected: 1,
                actual: 0
            })
        ));
    }

    #[test]
    fn test_reconcile_response_serialization() {
        let cube = sample_cube();
        let committed = cube
            .commit(&ChangeSet::new(0).with_board(
                Board::Mainboard,
                [Operation::Remove(CardRemoval::at(0, Card::new("bolt")))],
            ))
            .unwrap();

        // Position 2 no longer exists after the removal
        let pending = ChangeSet::new(0).with_board(
            Board::Mainboard,
            [Operation::replace(
                2,
                Card::new("swords"),
                Card::new("path"),
            )],
        );

        let outcome = Reconciler::new(&committed.cards, committed.version).reconcile(&pending);
        assert!(outcome.is_conflicted());

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["state"], "conflicted");
        assert_eq!(value["currentVersion"], 1);
        assert_eq!(value["original"]["version"], 0);
        assert_eq!(value["salvaged"]["version"], 1);
    }

    #[test]
    fn test_fast_forward_serialization() {
        let pending = ChangeSet::new(0)
            .with_board(Board::Mainboard, [Operation::add(Card::new("brainstorm"))]);

        let outcome = cubelog_engine::reconcile(&sample_cube().cards, 5, &pending);

        match &outcome {
            Reconciliation::FastForwarded { changes } => assert_eq!(changes.version, 5),
            other => panic!("expected fast-forward, got {:?}", other),
        }
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["state"], "fastForwarded");
        assert_eq!(value["changes"]["version"], 5);
    }
}

#[cfg(test)]
mod http_tests {
    use super::*;
    use reqwest::StatusCode;

    fn base_url() -> String {
        std::env::var("CUBELOG_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
    }

    fn unique_id(prefix: &str) -> String {
        format!("{}-{}", prefix, uuid::Uuid::new_v4())
    }

    async fn create_cube(client: &reqwest::Client, id: &str) -> CubeSnapshot {
        let cube = sample_cube();
        let response = client
            .put(format!("{}/cubes/{}", base_url(), id))
            .json(&json!({ "cards": cube.cards }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        response.json().await.unwrap()
    }

    #[tokio::test]
    #[ignore]
    async fn test_health() {
        let response = reqwest::get(format!("{}/health", base_url())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    #[ignore]
    async fn test_commit_history_round_trip() {
        let client = reqwest::Client::new();
        let id = unique_id("history");
        let v0 = create_cube(&client, &id).await;

        let changes = ChangeSet::new(0).with_board(
            Board::Mainboard,
            [
                Operation::Remove(CardRemoval::at(1, Card::new("counterspell"))),
                Operation::add(Card::new("brainstorm")),
            ],
        );
        let response = client
            .post(format!("{}/cubes/{}/commit", base_url(), id))
            .json(&CommitRequest {
                expected_version: 0,
                changes,
            })
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let past: CubeSnapshot = client
            .get(format!("{}/cubes/{}/versions/0", base_url(), id))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(past.cards, v0.cards);
    }

    #[tokio::test]
    #[ignore]
    async fn test_stale_commit_conflicts() {
        let client = reqwest::Client::new();
        let id = unique_id("stale");
        create_cube(&client, &id).await;

        let changes = ChangeSet::new(0)
            .with_board(Board::Maybeboard, [Operation::add(Card::new("brainstorm"))]);
        for expected in [StatusCode::OK, StatusCode::CONFLICT] {
            let response = client
                .post(format!("{}/cubes/{}/commit", base_url(), id))
                .json(&CommitRequest {
                    expected_version: 0,
                    changes: changes.clone(),
                })
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), expected);
        }
    }
}
