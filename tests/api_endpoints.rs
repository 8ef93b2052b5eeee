//! Integration tests for hashledger API endpoints
//!
//! These tests drive the router through `axum_test::TestServer` and check
//! status codes and JSON shapes for reads, appends and rejections.

use axum_test::TestServer;
use hashledger::api::{build_api_router, ApiNode, ApiStatsResponse, ValidateResponse};
use hashledger::blockchain::{generate_block_at, Block};
use hashledger::ledger::Ledger;
use hashledger::node::NodeState;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

fn test_server(state: Option<Arc<RwLock<NodeState>>>) -> (TestServer, Ledger) {
    let ledger = Ledger::new(Block::genesis_at("2024-01-01T00:00:00+00:00"))
        .expect("Failed to create ledger");
    let api_node = Arc::new(ApiNode::new(ledger.clone(), state));
    let app = build_api_router(api_node, Duration::from_secs(10));
    let server = TestServer::new(app).expect("Failed to create test server");
    (server, ledger)
}

#[tokio::test]
async fn test_get_chain_returns_genesis() {
    let (server, _) = test_server(None);

    let response = server.get("/").await;
    assert_eq!(response.status_code(), 200);

    let blocks: Vec<Block> = response.json();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].index, 0);
    assert_eq!(blocks[0].prev_hash, "");

    let json: Value = response.json();
    assert!(json[0]["Index"].is_number());
    assert!(json[0]["Timestamp"].is_string());
    assert!(json[0]["Value"].is_number());
    assert!(json[0]["Hash"].is_string());
    assert!(json[0]["PrevHash"].is_string());
}

#[tokio::test]
async fn test_chain_response_is_pretty_printed() {
    let (server, _) = test_server(None);
    let text = server.get("/").await.text();
    assert!(text.contains("\n  {"));
}

#[tokio::test]
async fn test_post_appends_block() {
    let (server, ledger) = test_server(None);

    let response = server.post("/").json(&json!({ "Value": 72 })).await;
    assert_eq!(response.status_code(), 201);

    let block: Block = response.json();
    assert_eq!(block.index, 1);
    assert_eq!(block.value, 72);
    assert!(block.has_valid_hash());

    let blocks: Vec<Block> = server.get("/").await.json();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[1], block);
    assert_eq!(blocks[1].prev_hash, blocks[0].hash);
    assert_eq!(ledger.height().await, 2);
}

#[tokio::test]
async fn test_post_accepts_legacy_bpm_field() {
    let (server, _) = test_server(None);

    let response = server.post("/").json(&json!({ "BPM": 64 })).await;
    assert_eq!(response.status_code(), 201);
    let block: Block = response.json();
    assert_eq!(block.value, 64);
}

#[tokio::test]
async fn test_post_payload_key_is_case_insensitive() {
    let (server, _) = test_server(None);

    let response = server.post("/").json(&json!({ "bpm": 5 })).await;
    assert_eq!(response.status_code(), 201);
    assert_eq!(response.json::<Block>().value, 5);

    let response = server.post("/").json(&json!({ "vALue": 3 })).await;
    assert_eq!(response.status_code(), 201);
    assert_eq!(response.json::<Block>().value, 3);
}

#[tokio::test]
async fn test_post_null_body_appends_zero() {
    let (server, ledger) = test_server(None);

    let response = server.post("/").text("null").await;
    assert_eq!(response.status_code(), 201);
    let block: Block = response.json();
    assert_eq!(block.index, 1);
    assert_eq!(block.value, 0);
    assert_eq!(ledger.height().await, 2);
}

#[tokio::test]
async fn test_malformed_body_is_echoed_with_400() {
    let (server, ledger) = test_server(None);

    let response = server.post("/").text("{not json").await;
    assert_eq!(response.status_code(), 400);
    assert_eq!(response.text(), "{not json");
    assert_eq!(ledger.height().await, 1);

    let response = server.post("/").json(&json!({ "Value": "fast" })).await;
    assert_eq!(response.status_code(), 400);
    assert_eq!(ledger.height().await, 1);
}

#[tokio::test]
async fn test_submitted_block_extending_tip_is_accepted() {
    let (server, ledger) = test_server(None);
    let genesis = ledger.latest().await;
    let block = generate_block_at(&genesis, 5, "2024-01-01T00:00:01+00:00").unwrap();

    let response = server.post("/block").json(&block).await;
    assert_eq!(response.status_code(), 201);
    let accepted: Block = response.json();
    assert_eq!(accepted, block);
    assert_eq!(ledger.height().await, 2);
}

#[tokio::test]
async fn test_tampered_block_is_rejected_with_409() {
    let (server, ledger) = test_server(None);
    let genesis = ledger.latest().await;
    let mut block = generate_block_at(&genesis, 5, "2024-01-01T00:00:01+00:00").unwrap();
    block.value = 500;

    let response = server.post("/block").json(&block).await;
    assert_eq!(response.status_code(), 409);
    let json: Value = response.json();
    assert!(json["error"].as_str().unwrap().contains("hash mismatch"));
    assert_eq!(ledger.height().await, 1);
}

#[tokio::test]
async fn test_index_skip_is_rejected_with_409() {
    let (server, ledger) = test_server(None);
    let genesis = ledger.latest().await;
    let first = generate_block_at(&genesis, 1, "t1").unwrap();
    let second = generate_block_at(&first, 2, "t2").unwrap();

    // second has index 2 but the tip is still genesis
    let response = server.post("/block").json(&second).await;
    assert_eq!(response.status_code(), 409);
    assert_eq!(ledger.height().await, 1);
}

#[tokio::test]
async fn test_get_block_by_index() {
    let (server, _) = test_server(None);
    server.post("/").json(&json!({ "Value": 1 })).await;

    let response = server.get("/block/1").await;
    assert_eq!(response.status_code(), 200);
    let block: Block = response.json();
    assert_eq!(block.index, 1);

    let response = server.get("/block/999").await;
    assert_eq!(response.status_code(), 404);
    let json: Value = response.json();
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_validate_endpoint() {
    let (server, _) = test_server(None);
    server.post("/").json(&json!({ "Value": 1 })).await;
    server.post("/").json(&json!({ "Value": 2 })).await;

    let response = server.get("/validate").await;
    assert_eq!(response.status_code(), 200);
    let report: ValidateResponse = response.json();
    assert!(report.ok);
    assert_eq!(report.height, 3);
    assert!(report.errors.is_empty());
}

#[tokio::test]
async fn test_health_follows_node_state() {
    let state = Arc::new(RwLock::new(NodeState::Booting));
    let (server, _) = test_server(Some(state.clone()));

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), 503);
    let json: Value = response.json();
    assert_eq!(json["status"], "unhealthy");

    *state.write().await = NodeState::Ready;
    let response = server.get("/health").await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["height"], 1);
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn test_stats_count_requests_and_outcomes() {
    let (server, ledger) = test_server(None);
    let genesis = ledger.latest().await;
    let mut bad = generate_block_at(&genesis, 1, "t1").unwrap();
    bad.hash = "0".repeat(64);

    server.post("/").json(&json!({ "Value": 1 })).await;
    server.post("/block").json(&bad).await;
    server.get("/block/42").await;

    let response = server.get("/stats").await;
    assert_eq!(response.status_code(), 200);
    let stats: ApiStatsResponse = response.json();
    assert_eq!(stats.blocks_appended, 1);
    assert_eq!(stats.blocks_rejected, 1);
    assert_eq!(stats.total_requests, 3);
    assert_eq!(stats.successful_requests, 1);
    assert_eq!(stats.failed_requests, 2);
    assert_eq!(stats.chain_height, 2);
}
