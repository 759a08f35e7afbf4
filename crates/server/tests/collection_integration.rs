//! Ownership mutations, collection export, statistics and wishlist, driven
//! through the HTTP API.

mod common;

use axum::http::{header, StatusCode};
use serde_json::{json, Value};

use common::{cards, TestFixture};

fn owned_url(card_id: i64) -> String {
    format!("/api/v1/collection/{card_id}/owned")
}

// =============================================================================
// Mutations
// =============================================================================

#[tokio::test]
async fn test_mark_owned_is_idempotent() {
    let fixture = TestFixture::new().await;

    for _ in 0..2 {
        let response = fixture.put(&owned_url(cards::RAICHU), Value::Null).await;
        assert_status!(response, StatusCode::NO_CONTENT);
    }

    let collection = fixture.get("/api/v1/collection").await;
    assert_status!(collection, StatusCode::OK);
    let items = collection.body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["card_name"], "Raichu");
    assert_eq!(items[0]["quantity"], 1);
    assert!(items[0]["acquired_date"].is_string());
}

#[tokio::test]
async fn test_add_increments_quantity() {
    let fixture = TestFixture::new().await;

    let first = fixture
        .post(
            "/api/v1/collection",
            json!({ "card_id": cards::PIKACHU_BASE, "acquired_date": "2024-02-01", "notes": "shadowless" }),
        )
        .await;
    assert_status!(first, StatusCode::NO_CONTENT);

    let second = fixture
        .post("/api/v1/collection", json!({ "card_id": cards::PIKACHU_BASE, "quantity": 2 }))
        .await;
    assert_status!(second, StatusCode::NO_CONTENT);

    let card = fixture.get(&format!("/api/v1/cards/{}", cards::PIKACHU_BASE)).await;
    assert_eq!(card.body["quantity"], 3);

    let collection = fixture.get("/api/v1/collection").await;
    assert_eq!(collection.body[0]["notes"], "shadowless");
    assert_eq!(collection.body[0]["acquired_date"], "2024-02-01");
}

#[tokio::test]
async fn test_add_rejects_bad_requests() {
    let fixture = TestFixture::new().await;

    let zero = fixture
        .post("/api/v1/collection", json!({ "card_id": cards::RAICHU, "quantity": 0 }))
        .await;
    assert_status!(zero, StatusCode::BAD_REQUEST);

    let unknown = fixture
        .post("/api/v1/collection", json!({ "card_id": 999 }))
        .await;
    assert_status!(unknown, StatusCode::NOT_FOUND);

    let malformed = fixture.post_raw("/api/v1/collection", "{ card_id: ").await;
    assert_status!(malformed, StatusCode::BAD_REQUEST);
    assert!(malformed.body["error"].is_string());

    let missing_field = fixture.post("/api/v1/collection", json!({ "quantity": 2 })).await;
    assert_status!(missing_field, StatusCode::BAD_REQUEST);

    assert!(fixture.get("/api/v1/collection").await.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_set_quantity_and_zero_removes() {
    let fixture = TestFixture::new().await;
    let url = format!("/api/v1/collection/{}", cards::SNORLAX);

    let set = fixture.put(&url, json!({ "quantity": 4 })).await;
    assert_status!(set, StatusCode::NO_CONTENT);
    assert_eq!(fixture.get("/api/v1/collection").await.body[0]["quantity"], 4);

    let negative = fixture.put(&url, json!({ "quantity": -1 })).await;
    assert_status!(negative, StatusCode::BAD_REQUEST);

    let zero = fixture.put(&url, json!({ "quantity": 0 })).await;
    assert_status!(zero, StatusCode::NO_CONTENT);
    assert!(fixture.get("/api/v1/collection").await.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_increment_past_max_quantity_is_bad_request() {
    let fixture = TestFixture::new().await;
    let url = format!("/api/v1/collection/{}", cards::RAICHU);
    assert_status!(
        fixture.put(&url, json!({ "quantity": u32::MAX })).await,
        StatusCode::NO_CONTENT
    );

    let overflow = fixture
        .post("/api/v1/collection", json!({ "card_id": cards::RAICHU, "quantity": 1 }))
        .await;
    assert_status!(overflow, StatusCode::BAD_REQUEST);
    assert_eq!(
        fixture.get("/api/v1/collection").await.body[0]["quantity"],
        u32::MAX
    );
}

#[tokio::test]
async fn test_mark_unowned_absent_is_success() {
    let fixture = TestFixture::new().await;
    let url = format!("/api/v1/collection/{}", cards::ALAKAZAM);

    assert_status!(fixture.delete(&url).await, StatusCode::NO_CONTENT);

    fixture.put(&owned_url(cards::ALAKAZAM), Value::Null).await;
    assert_status!(fixture.delete(&url).await, StatusCode::NO_CONTENT);
    assert!(fixture.get("/api/v1/collection").await.body.as_array().unwrap().is_empty());

    assert_status!(fixture.delete("/api/v1/collection/999").await, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_toggle_round_trip() {
    let fixture = TestFixture::new().await;
    let url = format!("/api/v1/collection/{}/toggle", cards::PIKACHU_JUNGLE);

    let on = fixture.post_empty(&url).await;
    assert_status!(on, StatusCode::OK);
    assert_eq!(on.body, json!({ "outcome": "created", "quantity": 1 }));

    let off = fixture.post_empty(&url).await;
    assert_eq!(off.body, json!({ "outcome": "removed", "previous": 1 }));
}

// =============================================================================
// Export
// =============================================================================

#[tokio::test]
async fn test_export_csv() {
    let fixture = TestFixture::new().await;
    fixture.put(&owned_url(cards::PIKACHU_CLAY_BURST), Value::Null).await;
    fixture.put(&owned_url(cards::PIKACHU_BASE), Value::Null).await;
    fixture
        .post(
            "/api/v1/collection",
            json!({ "card_id": cards::ALAKAZAM, "quantity": 2, "notes": "graded, PSA 9" }),
        )
        .await;

    let response = fixture.get("/api/v1/collection/export").await;
    assert_status!(response, StatusCode::OK);
    assert!(response.headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    let disposition = response.headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"binder_collection_"));
    assert!(disposition.ends_with(".csv\""));

    let lines: Vec<&str> = response.text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("Card Name,Card Number,Rarity"));
    // oldest set first, then printed number
    assert!(lines[1].starts_with("Alakazam,1,"));
    assert!(lines[1].contains("\"graded, PSA 9\""));
    assert!(lines[2].starts_with("Pikachu,58,"));
    assert!(lines[3].starts_with("Pikachu,TG01,"));
}

#[tokio::test]
async fn test_export_empty_collection_has_header_only() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/collection/export").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.text.lines().count(), 1);
}

// =============================================================================
// Statistics
// =============================================================================

async fn collection_for_stats(fixture: &TestFixture) {
    fixture.put(&owned_url(cards::ALAKAZAM), Value::Null).await;
    fixture
        .post("/api/v1/collection", json!({ "card_id": cards::PIKACHU_BASE, "quantity": 3 }))
        .await;
    fixture.put(&owned_url(cards::PIKACHU_CLAY_BURST), Value::Null).await;
}

#[tokio::test]
async fn test_stats_totals_and_rankings() {
    let fixture = TestFixture::new().await;
    collection_for_stats(&fixture).await;

    let response = fixture.get("/api/v1/stats").await;
    assert_status!(response, StatusCode::OK);
    let stats = &response.body;
    assert_eq!(stats["total_cards_owned"], 5);
    assert_eq!(stats["unique_cards_owned"], 3);
    // catalogued cards, not printed set sizes
    assert_eq!(stats["total_possible_cards"], 6);
    assert_eq!(stats["completion_percent"], 50);
    assert_eq!(stats["most_common_rarity"], "Rare Holo");

    let languages = stats["by_language"].as_array().unwrap();
    assert_eq!(languages[0]["key"], "English");
    assert_eq!(languages[0]["owned_cards"], 2);
    assert_eq!(languages[0]["total_cards"], 5);
    assert_eq!(languages[1]["key"], "Japanese");
    assert_eq!(languages[1]["completion_percent"], 100);

    assert_eq!(stats["top_complete_sets"][0]["name"], "Clay Burst");
    assert_eq!(stats["least_complete_sets"][0]["name"], "Jungle");
    assert_eq!(stats["least_complete_sets"][0]["completion_percent"], 0);
}

#[tokio::test]
async fn test_stats_reflect_mutations_immediately() {
    let fixture = TestFixture::new().await;
    assert_eq!(fixture.get("/api/v1/stats").await.body["unique_cards_owned"], 0);

    fixture.put(&owned_url(cards::SNORLAX), Value::Null).await;
    let after_add = fixture.get("/api/v1/stats").await;
    assert_eq!(after_add.body["unique_cards_owned"], 1);
    assert_eq!(after_add.body["most_common_rarity"], "Rare Holo");

    fixture
        .delete(&format!("/api/v1/collection/{}", cards::SNORLAX))
        .await;
    let after_remove = fixture.get("/api/v1/stats").await;
    assert_eq!(after_remove.body["unique_cards_owned"], 0);
    assert!(after_remove.body["most_common_rarity"].is_null());
}

#[tokio::test]
async fn test_stats_groups() {
    let fixture = TestFixture::new().await;
    collection_for_stats(&fixture).await;

    let eras = fixture.get("/api/v1/stats/groups/era").await;
    assert_status!(eras, StatusCode::OK);
    assert_eq!(eras.body["key"], "era");
    let groups = eras.body["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0]["key"], "Base");
    assert_eq!(groups[0]["owned_cards"], 2);
    assert_eq!(groups[1]["key"], "Scarlet & Violet");

    let sets = fixture.get("/api/v1/stats/groups/SET").await;
    assert_status!(sets, StatusCode::OK);
    assert_eq!(sets.body["groups"][0]["key"], "Clay Burst");

    let unknown = fixture.get("/api/v1/stats/groups/color").await;
    assert_status!(unknown, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Wishlist
// =============================================================================

#[tokio::test]
async fn test_wishlist_lifecycle() {
    let fixture = TestFixture::new().await;

    let added = fixture
        .post(
            "/api/v1/wishlist",
            json!({ "card_id": cards::RAICHU, "priority": "Low", "notes": "near mint only" }),
        )
        .await;
    assert_status!(added, StatusCode::CREATED);
    let raichu_id = added.body["id"].as_i64().unwrap();
    assert_eq!(added.body["priority"], "Low");

    let snorlax = fixture
        .post("/api/v1/wishlist", json!({ "card_id": cards::SNORLAX }))
        .await;
    assert_status!(snorlax, StatusCode::CREATED);
    assert_eq!(snorlax.body["priority"], "Medium");

    let listed = fixture.get("/api/v1/wishlist").await;
    assert_status!(listed, StatusCode::OK);
    let names: Vec<&str> = listed
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["card"]["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Snorlax", "Raichu"]);
    assert_eq!(listed.body[1]["set"]["name"], "Base Set");

    let updated = fixture
        .put(&format!("/api/v1/wishlist/{raichu_id}"), json!({ "priority": "High" }))
        .await;
    assert_status!(updated, StatusCode::NO_CONTENT);
    let relisted = fixture.get("/api/v1/wishlist").await;
    assert_eq!(relisted.body[0]["card"]["name"], "Raichu");
    assert_eq!(relisted.body[0]["notes"], "near mint only");

    let url = format!("/api/v1/wishlist/{raichu_id}");
    assert_status!(fixture.delete(&url).await, StatusCode::NO_CONTENT);
    assert_status!(fixture.delete(&url).await, StatusCode::NOT_FOUND);
    assert_eq!(fixture.get("/api/v1/wishlist").await.body.as_array().unwrap().len(), 1);

    let events = fixture.wait_for_audit("wishlist_item_removed", 1).await;
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn test_wishlist_rejections() {
    let fixture = TestFixture::new().await;
    fixture.put(&owned_url(cards::ALAKAZAM), Value::Null).await;

    let owned = fixture
        .post("/api/v1/wishlist", json!({ "card_id": cards::ALAKAZAM }))
        .await;
    assert_status!(owned, StatusCode::CONFLICT);

    let first = fixture
        .post("/api/v1/wishlist", json!({ "card_id": cards::RAICHU }))
        .await;
    assert_status!(first, StatusCode::CREATED);
    let duplicate = fixture
        .post("/api/v1/wishlist", json!({ "card_id": cards::RAICHU }))
        .await;
    assert_status!(duplicate, StatusCode::CONFLICT);

    let unknown = fixture.post("/api/v1/wishlist", json!({ "card_id": 999 })).await;
    assert_status!(unknown, StatusCode::NOT_FOUND);

    let bad_priority = fixture
        .post("/api/v1/wishlist", json!({ "card_id": cards::SNORLAX, "priority": "urgent" }))
        .await;
    assert_status!(bad_priority, StatusCode::BAD_REQUEST);

    let missing = fixture
        .put("/api/v1/wishlist/999", json!({ "notes": "anything" }))
        .await;
    assert_status!(missing, StatusCode::NOT_FOUND);
}

// =============================================================================
// Audit trail
// =============================================================================

#[tokio::test]
async fn test_mutations_are_audited() {
    let fixture = TestFixture::new().await;
    fixture.put(&owned_url(cards::RAICHU), Value::Null).await;
    fixture.put(&owned_url(cards::RAICHU), Value::Null).await;
    fixture
        .delete(&format!("/api/v1/collection/{}", cards::RAICHU))
        .await;
    fixture.put(&owned_url(cards::SNORLAX), Value::Null).await;

    fixture.wait_for_audit("ownership_changed", 4).await;

    let response = fixture
        .get(&format!("/api/v1/audit?card_id={}", cards::RAICHU))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["total"], 3);

    // newest first
    let events = response.body["events"].as_array().unwrap();
    assert_eq!(events[0]["data"]["operation"], "mark_unowned");
    assert_eq!(events[0]["data"]["outcome"], "removed");
    assert_eq!(events[1]["data"]["outcome"], "unchanged");
    assert_eq!(events[2]["data"]["outcome"], "created");
    assert_eq!(events[2]["user_id"], "anonymous");

    let paged = fixture
        .get("/api/v1/audit?event_type=ownership_changed&limit=1&offset=1")
        .await;
    assert_eq!(paged.body["total"], 4);
    assert_eq!(paged.body["limit"], 1);
    assert_eq!(paged.body["events"].as_array().unwrap().len(), 1);
}
