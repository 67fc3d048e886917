//! Import-flow tests against a mock Notion server

use notion_client::NotionClient;
use serde_json::json;
use steam_notion::game_list::{ImportMode, NotionGameList};
use steam_notion::library::{GameInfo, format_playtime};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn game(id: u64, name: &str, minutes: u64) -> GameInfo {
    GameInfo {
        id,
        name: name.to_string(),
        genres: vec!["Action".to_string()],
        release_date: Some("8 Nov, 1998".to_string()),
        playtime: format_playtime(minutes),
        playtime_minutes: minutes,
        icon_uri: None,
        logo_uri: None,
        background_uri: None,
        is_free: false,
    }
}

async fn mount_database(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/databases/db-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "db-1",
            "data_sources": [{"id": "ds-1", "name": "Game List"}]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data_sources/ds-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "ds-1",
            "properties": {
                "Name": {"type": "title", "title": {}},
                "Playtime (hours)": {"type": "number", "number": {}}
            }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_import_skips_existing_and_creates_new() {
    let server = MockServer::start().await;
    mount_database(&server).await;

    // One page already exists: Half-Life.
    Mock::given(method("POST"))
        .and(path("/data_sources/ds-1/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "id": "p1",
                "properties": {"Name": {"title": [{"plain_text": "Half-Life"}]}}
            }],
            "has_more": false
        })))
        .mount(&server)
        .await;

    // Only Portal gets created.
    Mock::given(method("POST"))
        .and(path("/pages"))
        .and(body_partial_json(json!({
            "parent": {"type": "data_source_id", "data_source_id": "ds-1"},
            "properties": {"Name": {"title": [{"text": {"content": "Portal"}}]}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "p2",
            "properties": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = NotionClient::new("secret").expect("client").with_base_url(server.uri());
    let list = NotionGameList::connect(client, "db-1").await.expect("connect");

    let games = [game(70, "Half-Life", 6135), game(400, "Portal", 311)];
    let report = list.import(&games, ImportMode::SkipExisting, false).await;

    assert!(report.is_success());
    assert_eq!(report.created, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.updated, 0);
}

#[tokio::test]
async fn test_import_update_mode_rewrites_existing() {
    let server = MockServer::start().await;
    mount_database(&server).await;

    Mock::given(method("POST"))
        .and(path("/data_sources/ds-1/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "id": "p1",
                "properties": {"Name": {"title": [{"plain_text": "Half-Life"}]}}
            }],
            "has_more": false
        })))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/pages/p1"))
        .and(body_partial_json(json!({
            "properties": {"Playtime (hours)": {"number": 102.3}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "p1",
            "properties": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = NotionClient::new("secret").expect("client").with_base_url(server.uri());
    let list = NotionGameList::connect(client, "db-1").await.expect("connect");

    let report = list
        .import(&[game(70, "Half-Life", 6135)], ImportMode::Update, false)
        .await;

    assert!(report.is_success());
    assert_eq!(report.updated, 1);
    assert_eq!(report.created, 0);
}

#[tokio::test]
async fn test_failures_do_not_abort_the_batch() {
    let server = MockServer::start().await;
    mount_database(&server).await;

    Mock::given(method("POST"))
        .and(path("/data_sources/ds-1/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [],
            "has_more": false
        })))
        .mount(&server)
        .await;

    // First create is rejected by validation, second succeeds.
    Mock::given(method("POST"))
        .and(path("/pages"))
        .and(body_partial_json(json!({
            "properties": {"Name": {"title": [{"text": {"content": "Broken"}}]}}
        })))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "object": "error",
            "code": "validation_error",
            "message": "body failed validation"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/pages"))
        .and(body_partial_json(json!({
            "properties": {"Name": {"title": [{"text": {"content": "Portal"}}]}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "p2",
            "properties": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = NotionClient::new("secret").expect("client").with_base_url(server.uri());
    let list = NotionGameList::connect(client, "db-1").await.expect("connect");

    let games = [game(1, "Broken", 0), game(400, "Portal", 311)];
    let report = list.import(&games, ImportMode::SkipExisting, false).await;

    assert_eq!(report.created, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].name, "Broken");
    assert!(report.failures[0].reason.contains("validation_error"));
}
