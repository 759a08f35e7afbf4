//! End-to-end tests of the catalog, auth and admin endpoints, run against
//! the full router in-process.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{cards, TestConfig, TestFixture};

// =============================================================================
// Health, config, metrics
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/health").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_config_hides_api_keys() {
    let fixture = TestFixture::with_config(TestConfig::with_api_keys(&[("s3cret", "ash")])).await;
    let response = fixture.get("/api/v1/config").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["auth"]["method"], "api_key");
    assert_eq!(response.body["auth"]["users"], json!(["ash"]));
    assert!(!response.text.contains("s3cret"));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new().await;
    fixture.get("/api/v1/sets").await;

    let response = fixture.get("/metrics").await;
    assert_status!(response, StatusCode::OK);
    assert!(response.text.contains("binder_catalog_cards"));
    assert!(response.text.contains("binder_http_requests_total"));
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_api_key_required_when_configured() {
    let mut fixture =
        TestFixture::with_config(TestConfig::with_api_keys(&[("key-ash", "ash")])).await;

    fixture.authenticate_as(None);
    assert_status!(fixture.get("/api/v1/sets").await, StatusCode::UNAUTHORIZED);
    // health stays reachable
    assert_status!(fixture.get("/api/v1/health").await, StatusCode::OK);

    fixture.authenticate_as(Some("wrong"));
    assert_status!(fixture.get("/api/v1/sets").await, StatusCode::UNAUTHORIZED);

    fixture.authenticate_as(Some("key-ash"));
    assert_status!(fixture.get("/api/v1/sets").await, StatusCode::OK);
}

#[tokio::test]
async fn test_cors_preflight_skips_auth() {
    let fixture = TestFixture::with_config(TestConfig::with_api_keys(&[("key-ash", "ash")])).await;

    let response = fixture.preflight("/api/v1/collection/1/owned", "PUT").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.headers["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn test_collections_are_scoped_per_key() {
    let mut fixture = TestFixture::with_config(TestConfig::with_api_keys(&[
        ("key-ash", "ash"),
        ("key-misty", "misty"),
    ]))
    .await;

    fixture.authenticate_as(Some("key-ash"));
    let response = fixture
        .put(&format!("/api/v1/collection/{}/owned", cards::SNORLAX), json!(null))
        .await;
    assert_status!(response, StatusCode::NO_CONTENT);
    assert_eq!(fixture.get("/api/v1/collection").await.body.as_array().unwrap().len(), 1);

    fixture.authenticate_as(Some("key-misty"));
    let collection = fixture.get("/api/v1/collection").await;
    assert_status!(collection, StatusCode::OK);
    assert!(collection.body.as_array().unwrap().is_empty());
}

// =============================================================================
// Sets and cards
// =============================================================================

#[tokio::test]
async fn test_list_sets_newest_first_with_completion() {
    let fixture = TestFixture::new().await;
    fixture
        .put(&format!("/api/v1/collection/{}/owned", cards::ALAKAZAM), json!(null))
        .await;

    let response = fixture.get("/api/v1/sets").await;
    assert_status!(response, StatusCode::OK);
    let sets = response.body.as_array().unwrap();
    let names: Vec<&str> = sets.iter().map(|s| s["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Clay Burst", "Jungle", "Base Set"]);

    let base = &sets[2];
    assert_eq!(base["total_cards"], 102);
    assert_eq!(base["owned_cards"], 1);
    assert_eq!(base["completion_percent"], 1);
    // no printed total: the catalogued card count is used
    assert_eq!(sets[0]["total_cards"], 1);
}

#[tokio::test]
async fn test_list_sets_filters() {
    let fixture = TestFixture::new().await;

    let japanese = fixture.get("/api/v1/sets?language=japanese").await;
    assert_status!(japanese, StatusCode::OK);
    assert_eq!(japanese.body.as_array().unwrap().len(), 1);
    assert_eq!(japanese.body[0]["code"], "SV2D");

    let by_code = fixture.get("/api/v1/sets?q=ju").await;
    assert_eq!(by_code.body.as_array().unwrap().len(), 1);
    assert_eq!(by_code.body[0]["name"], "Jungle");

    let none = fixture.get("/api/v1/sets?q=nothing-like-this").await;
    assert!(none.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_get_set_and_unknown_set() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/sets/2").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["name"], "Jungle");
    assert_eq!(response.body["total_cards"], 64);
    assert_eq!(response.body["owned_cards"], 0);

    let missing = fixture.get("/api/v1/sets/999").await;
    assert_status!(missing, StatusCode::NOT_FOUND);
    assert!(missing.body["error"].is_string());
}

#[tokio::test]
async fn test_set_cards_in_number_order_with_quantities() {
    let fixture = TestFixture::new().await;
    fixture
        .post(
            "/api/v1/collection",
            json!({ "card_id": cards::PIKACHU_BASE, "quantity": 3 }),
        )
        .await;

    let response = fixture.get("/api/v1/sets/1/cards").await;
    assert_status!(response, StatusCode::OK);
    let listed = response.body.as_array().unwrap();
    let numbers: Vec<&str> = listed.iter().map(|c| c["number"].as_str().unwrap()).collect();
    assert_eq!(numbers, vec!["1", "14", "58"]);

    let pikachu = &listed[2];
    assert_eq!(pikachu["name"], "Pikachu");
    assert_eq!(pikachu["owned"], true);
    assert_eq!(pikachu["quantity"], 3);
    assert_eq!(pikachu["type"], "Lightning");
    assert_eq!(listed[0]["owned"], false);

    let filtered = fixture.get("/api/v1/sets/1/cards?q=RARE").await;
    assert_eq!(filtered.body.as_array().unwrap().len(), 2);

    assert_status!(fixture.get("/api/v1/sets/999/cards").await, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_card_detail_and_search() {
    let fixture = TestFixture::new().await;

    let card = fixture.get(&format!("/api/v1/cards/{}", cards::SNORLAX)).await;
    assert_status!(card, StatusCode::OK);
    assert_eq!(card.body["name"], "Snorlax");
    assert_eq!(card.body["set_name"], "Jungle");
    assert_eq!(card.body["quantity"], 0);

    assert_status!(fixture.get("/api/v1/cards/999").await, StatusCode::NOT_FOUND);

    let search = fixture.get("/api/v1/cards/search?q=PIKA").await;
    assert_status!(search, StatusCode::OK);
    let found = search.body.as_array().unwrap();
    assert_eq!(found.len(), 3);
    assert!(found.iter().all(|c| c["name"] == "Pikachu"));
    assert!(found.iter().any(|c| c["set_code"] == "SV2D"));

    let by_rarity = fixture
        .get("/api/v1/cards/search?rarity=Rare%20Holo")
        .await;
    assert_eq!(by_rarity.body.as_array().unwrap().len(), 2);

    let limited = fixture.get("/api/v1/cards/search?q=pikachu&limit=1").await;
    assert_eq!(limited.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_card_listing_pages() {
    let fixture = TestFixture::new().await;
    fixture
        .put(&format!("/api/v1/collection/{}/owned", cards::ALAKAZAM), json!(null))
        .await;

    let first = fixture.get("/api/v1/cards?page=1&page_size=4").await;
    assert_status!(first, StatusCode::OK);
    assert_eq!(first.body["total_cards"], 6);
    assert_eq!(first.body["total_pages"], 2);
    let data = first.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 4);
    assert_eq!(data[0]["id"], cards::ALAKAZAM);
    assert_eq!(data[0]["quantity"], 1);
    assert_eq!(data[0]["set_name"], "Base Set");

    // last page is partial; camelCase size is accepted too
    let last = fixture.get("/api/v1/cards?page=2&pageSize=4").await;
    let ids: Vec<_> = last.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].clone())
        .collect();
    assert_eq!(ids, vec![json!(cards::SNORLAX), json!(cards::PIKACHU_CLAY_BURST)]);

    let beyond = fixture.get("/api/v1/cards?page=3&page_size=4").await;
    assert_status!(beyond, StatusCode::OK);
    assert!(beyond.body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_card_listing_page_size_clamped() {
    let fixture = TestFixture::new().await;

    let defaults = fixture.get("/api/v1/cards").await;
    assert_eq!(defaults.body["page"], 1);
    assert_eq!(defaults.body["page_size"], 50);
    assert_eq!(defaults.body["total_pages"], 1);

    let capped = fixture.get("/api/v1/cards?page_size=10000").await;
    assert_eq!(capped.body["page_size"], 200);

    let zero = fixture.get("/api/v1/cards?page=0&page_size=0").await;
    assert_eq!(zero.body["page"], 1);
    assert_eq!(zero.body["page_size"], 50);
    assert_eq!(zero.body["data"].as_array().unwrap().len(), 6);

    assert_status!(
        fixture.get("/api/v1/cards?page=abc").await,
        StatusCode::BAD_REQUEST
    );
}

// =============================================================================
// Preferences
// =============================================================================

#[tokio::test]
async fn test_theme_defaults_light_and_toggles() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/preferences").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["theme"], "light");

    let toggled = fixture.post_empty("/api/v1/preferences/theme/toggle").await;
    assert_status!(toggled, StatusCode::OK);
    assert_eq!(toggled.body["theme"], "dark");
    assert_eq!(fixture.get("/api/v1/preferences").await.body["theme"], "dark");

    let set = fixture
        .put("/api/v1/preferences/theme", json!({ "theme": "Light" }))
        .await;
    assert_status!(set, StatusCode::OK);
    assert_eq!(set.body["theme"], "light");

    let bad = fixture
        .put("/api/v1/preferences/theme", json!({ "theme": "sepia" }))
        .await;
    assert_status!(bad, StatusCode::BAD_REQUEST);

    let events = fixture.wait_for_audit("preference_changed", 2).await;
    assert_eq!(events.len(), 2);
}

// =============================================================================
// Catalog import
// =============================================================================

#[tokio::test]
async fn test_import_not_configured() {
    let fixture = TestFixture::new().await;
    let response = fixture.post_empty("/api/v1/catalog/import").await;
    assert_status!(response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_import_from_data_dir() {
    let data = tempfile::TempDir::new().unwrap();
    std::fs::create_dir_all(data.path().join("sets")).unwrap();
    std::fs::create_dir_all(data.path().join("cards/en")).unwrap();
    std::fs::write(
        data.path().join("sets/en.json"),
        json!([{
            "id": "neo1",
            "name": "Neo Genesis",
            "series": "Neo",
            "ptcgoCode": "N1",
            "printedTotal": 111,
            "total": 111,
            "releaseDate": "2000/12/16",
            "images": { "logo": "https://images.example/neo1/logo.png" }
        }])
        .to_string(),
    )
    .unwrap();
    std::fs::write(
        data.path().join("cards/en/neo1.json"),
        json!([
            { "id": "neo1-9", "name": "Lugia", "number": "9", "rarity": "Rare Holo",
              "supertype": "Pokémon", "types": ["Colorless"] },
            { "id": "neo1-17", "name": "Typhlosion", "number": "17",
              "supertype": "Pokémon", "types": ["Fire"] }
        ])
        .to_string(),
    )
    .unwrap();

    let fixture = TestFixture::with_config(TestConfig {
        import_dir: Some(data.path().to_path_buf()),
        empty_catalog: true,
        ..Default::default()
    })
    .await;

    let response = fixture.post_empty("/api/v1/catalog/import").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["sets_imported"], 1);
    assert_eq!(response.body["cards_imported"], 2);

    let sets = fixture.get("/api/v1/sets").await;
    assert_eq!(sets.body[0]["name"], "Neo Genesis");
    assert_eq!(sets.body[0]["era"], "Neo");
    assert_eq!(sets.body[0]["total_cards"], 111);

    // importing again adds nothing
    let again = fixture.post_empty("/api/v1/catalog/import").await;
    assert_eq!(again.body["sets_imported"], 0);
    assert_eq!(again.body["cards_imported"], 0);
    assert_eq!(again.body["cards_skipped"], 2);

    let events = fixture.wait_for_audit("catalog_imported", 2).await;
    assert_eq!(events.len(), 2);
}
