//! Integration tests for graph entities, relations, and the type explorer.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The server running (cargo run -p mercantia-server)
//! - Network access to schema.org for the explorer tests
//!
//! Run with: cargo test -p mercantia-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use mercantia_integration_tests::TestContext;
use reqwest::StatusCode;
use serde_json::{Value, json};

async fn create_entity(ctx: &TestContext, entity_type: &str, name: &str) -> String {
    let resp = ctx
        .post(
            "/api/entities",
            &json!({
                "entityType": entity_type,
                "properties": { "name": name },
                "trustScore": 70,
            }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.unwrap();
    body["entity"]["id"].as_str().unwrap().to_string()
}

// ============================================================================
// Entities
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_entity_crud() {
    let ctx = TestContext::with_user().await;
    let id = create_entity(&ctx, "Person", "Graph Tester").await;

    let resp = ctx.get(&format!("/api/entities/{id}")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["entity"]["entityType"], "Person");
    assert_eq!(body["entity"]["properties"]["name"], "Graph Tester");

    let resp = ctx
        .put(
            &format!("/api/entities/{id}"),
            &json!({
                "entityType": "Person",
                "properties": { "name": "Renamed Tester" },
                "trustScore": 80,
            }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ctx.delete(&format!("/api/entities/{id}")).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ctx.get(&format!("/api/entities/{id}")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_entity_trust_score_bounds() {
    let ctx = TestContext::with_user().await;
    let resp = ctx
        .post(
            "/api/entities",
            &json!({ "entityType": "Person", "trustScore": 150 }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Relations, Proofs, Witnesses
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_relation_with_proof_and_witness() {
    let ctx = TestContext::with_user().await;
    let agent = create_entity(&ctx, "Person", "Relation Agent").await;
    let object = create_entity(&ctx, "Organization", "Relation Object").await;
    let witness = create_entity(&ctx, "Person", "Relation Witness").await;

    let resp = ctx
        .post(
            "/api/relations",
            &json!({
                "relationType": "JoinAction",
                "agentId": agent,
                "objectId": object,
            }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    let relation_id = body["relation"]["id"].as_str().unwrap().to_string();

    let resp = ctx
        .post(
            &format!("/api/relations/{relation_id}/proofs"),
            &json!({ "proofType": "document", "url": "https://example.test/contract.pdf" }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = ctx
        .post(
            &format!("/api/relations/{relation_id}/witnesses"),
            &json!({ "entityId": witness }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Detail view aggregates the evidence
    let resp = ctx.get(&format!("/api/relations/{relation_id}")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["relation"]["proofs"].as_array().unwrap().len(), 1);
    assert_eq!(body["relation"]["witnesses"].as_array().unwrap().len(), 1);

    // Deleting the relation cascades
    let resp = ctx.delete(&format!("/api/relations/{relation_id}")).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_witness_with_unknown_entity_is_conflict() {
    let ctx = TestContext::with_user().await;
    let agent = create_entity(&ctx, "Person", "Witnessed Agent").await;
    let object = create_entity(&ctx, "Person", "Witnessed Object").await;

    let resp = ctx
        .post(
            "/api/relations",
            &json!({ "relationType": "MeetAction", "agentId": agent, "objectId": object }),
        )
        .await;
    let body: Value = resp.json().await.unwrap();
    let relation_id = body["relation"]["id"].as_str().unwrap().to_string();

    // A made-up entity ID must be a client error, not a server failure.
    let resp = ctx
        .post(
            &format!("/api/relations/{relation_id}/witnesses"),
            &json!({ "entityId": uuid::Uuid::new_v4() }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_self_relation_rejected() {
    let ctx = TestContext::with_user().await;
    let entity = create_entity(&ctx, "Person", "Self Referencer").await;

    let resp = ctx
        .post(
            "/api/relations",
            &json!({
                "relationType": "FollowAction",
                "agentId": entity,
                "objectId": entity,
            }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_proof_requires_url_or_hash() {
    let ctx = TestContext::with_user().await;
    let agent = create_entity(&ctx, "Person", "Proof Agent").await;
    let object = create_entity(&ctx, "Person", "Proof Object").await;

    let resp = ctx
        .post(
            "/api/relations",
            &json!({ "relationType": "MeetAction", "agentId": agent, "objectId": object }),
        )
        .await;
    let body: Value = resp.json().await.unwrap();
    let relation_id = body["relation"]["id"].as_str().unwrap().to_string();

    let resp = ctx
        .post(
            &format!("/api/relations/{relation_id}/proofs"),
            &json!({ "proofType": "photo" }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Schema.org Explorer
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server and network access to schema.org"]
async fn test_hierarchy_root_is_thing() {
    let ctx = TestContext::new().await;
    let resp = ctx.get("/api/schema/hierarchy").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["root"]["name"], "Thing");
    assert!(!body["root"]["children"].as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires running server and network access to schema.org"]
async fn test_expand_unknown_type_not_found() {
    let ctx = TestContext::new().await;
    let resp = ctx.get("/api/schema/types/NotARealType").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running server and network access to schema.org"]
async fn test_search_finds_product() {
    let ctx = TestContext::new().await;
    let resp = ctx.get("/api/schema/search?q=product&limit=5").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    let results = body["results"].as_array().unwrap();
    assert!(!results.is_empty());
    assert!(results.len() <= 5);
}
