/**
 * Forum Flow Tests
 *
 * HTTP round trips for the browsing surface: categories, threads, the
 * message page, the atomic post, cascade deletes, and profiles.
 */

mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use common::{spawn_app, TestApp};

async fn signed_in_app() -> TestApp {
    let app = spawn_app();
    app.register("poster@example.com", "password123", "poster").await;
    app
}

async fn create_category(app: &TestApp, name: &str) -> Value {
    let response = app
        .server
        .post("/categories")
        .json(&json!({ "name": name }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json()
}

async fn create_thread(app: &TestApp, name: &str, category_id: &str) -> Value {
    let response = app
        .server
        .post("/threads")
        .json(&json!({ "name": name, "category_id": category_id }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json()
}

#[tokio::test]
async fn test_categories_list_is_name_ascending() {
    let app = signed_in_app().await;
    create_category(&app, "Rust").await;
    create_category(&app, "Announcements").await;
    create_category(&app, "Meta").await;

    let response = app.server.get("/categories").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Announcements", "Meta", "Rust"]);
}

#[tokio::test]
async fn test_category_create_rejects_empty_name() {
    let app = signed_in_app().await;
    let response = app
        .server
        .post("/categories")
        .json(&json!({ "name": "   " }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_category_is_404_with_null_body() {
    let app = signed_in_app().await;
    let response = app.server.get("/categories/no-such-id").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>(), Value::Null);
}

#[tokio::test]
async fn test_rename_category_bumps_updated_at() {
    let app = signed_in_app().await;
    let category = create_category(&app, "Before").await;
    let id = category["id"].as_str().unwrap();

    let response = app
        .server
        .patch(&format!("/categories/{}", id))
        .json(&json!({ "name": "After" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let renamed: Value = response.json();
    assert_eq!(renamed["name"], "After");
    assert_eq!(renamed["created_at"], category["created_at"]);
    assert!(renamed["updated_at"].as_i64() > category["updated_at"].as_i64());
}

#[tokio::test]
async fn test_post_message_bumps_thread_activity() {
    let app = signed_in_app().await;
    let category = create_category(&app, "General").await;
    let thread = create_thread(&app, "First!", category["id"].as_str().unwrap()).await;
    let thread_id = thread["id"].as_str().unwrap();

    let response = app
        .server
        .post(&format!("/threads/{}/messages", thread_id))
        .json(&json!({ "content": "hello forum" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let message: Value = response.json();

    let bumped: Value = app
        .server
        .get(&format!("/threads/{}", thread_id))
        .await
        .json();
    // The thread's activity stamp equals the message's creation stamp.
    assert_eq!(bumped["last_message_at"], message["created_at"]);
    assert!(bumped["last_message_at"].as_i64() >= thread["last_message_at"].as_i64());
}

#[tokio::test]
async fn test_post_into_missing_thread_leaves_nothing_behind() {
    let app = signed_in_app().await;

    let response = app
        .server
        .post("/threads/no-such-thread/messages")
        .json(&json!({ "content": "orphan" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    // The atomic batch rolled the message back with the failed bump.
    let messages = app
        .state
        .messages
        .get_by_thread("no-such-thread", None)
        .await
        .unwrap();
    assert!(messages.is_empty());
}

#[tokio::test]
async fn test_message_page_is_ascending_with_authors() {
    let app = signed_in_app().await;
    let category = create_category(&app, "General").await;
    let thread = create_thread(&app, "Intro", category["id"].as_str().unwrap()).await;
    let thread_id = thread["id"].as_str().unwrap();

    for content in ["first", "second", "third"] {
        app.server
            .post(&format!("/threads/{}/messages", thread_id))
            .json(&json!({ "content": content }))
            .await;
        // Distinct creation stamps keep the chronological order unambiguous.
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let page: Value = app
        .server
        .get(&format!("/threads/{}/messages", thread_id))
        .await
        .json();

    let contents: Vec<&str> = page["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["first", "second", "third"]);

    // One author wrote all three; the batch fetch collapses duplicates.
    let authors = page["authors"].as_array().unwrap();
    assert_eq!(authors.len(), 1);
    assert_eq!(authors[0]["username"], "poster");
}

#[tokio::test]
async fn test_category_threads_order_by_recent_activity() {
    let app = signed_in_app().await;
    let category = create_category(&app, "General").await;
    let category_id = category["id"].as_str().unwrap();

    let stale = create_thread(&app, "stale", category_id).await;
    let active = create_thread(&app, "active", category_id).await;

    // Keep the bump strictly newer than the creation stamps.
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    app.server
        .post(&format!("/threads/{}/messages", stale["id"].as_str().unwrap()))
        .json(&json!({ "content": "bump" }))
        .await;

    let threads: Value = app
        .server
        .get(&format!("/categories/{}/threads", category_id))
        .await
        .json();
    let names: Vec<&str> = threads
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["stale", "active"]);
    let _ = active;
}

#[tokio::test]
async fn test_cascade_delete_removes_threads_and_messages() {
    let app = signed_in_app().await;
    let category = create_category(&app, "Doomed").await;
    let category_id = category["id"].as_str().unwrap();
    let thread = create_thread(&app, "Inside", category_id).await;
    let thread_id = thread["id"].as_str().unwrap();

    app.server
        .post(&format!("/threads/{}/messages", thread_id))
        .json(&json!({ "content": "soon gone" }))
        .await;

    let response = app
        .server
        .delete(&format!("/categories/{}", category_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let response = app.server.get(&format!("/categories/{}", category_id)).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let response = app.server.get(&format!("/threads/{}", thread_id)).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let messages = app
        .state
        .messages
        .get_by_thread(thread_id, None)
        .await
        .unwrap();
    assert!(messages.is_empty());
}

#[tokio::test]
async fn test_profile_update_and_public_view() {
    let app = signed_in_app().await;

    let response = app
        .server
        .patch("/profile")
        .json(&json!({ "username": "renamed_poster", "bio": "hello" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let profile: Value = response.json();
    assert_eq!(profile["username"], "renamed_poster");
    assert_eq!(profile["bio"], "hello");

    let public: Value = app
        .server
        .get(&format!("/users/{}", profile["id"].as_str().unwrap()))
        .await
        .json();
    assert_eq!(public["username"], "renamed_poster");
}

#[tokio::test]
async fn test_profile_update_rejects_invalid_username() {
    let app = signed_in_app().await;
    let response = app
        .server
        .patch("/profile")
        .json(&json!({ "username": "1nope" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_home_dashboard_reflects_activity() {
    let app = signed_in_app().await;
    let category = create_category(&app, "General").await;
    let thread = create_thread(&app, "Mine", category["id"].as_str().unwrap()).await;
    app.server
        .post(&format!("/threads/{}/messages", thread["id"].as_str().unwrap()))
        .json(&json!({ "content": "latest" }))
        .await;

    let body: Value = app.server.get("/").await.json();
    assert_eq!(body["profile"]["username"], "poster");
    assert_eq!(body["stats"]["categories"]["count"], 1);
    assert_eq!(body["stats"]["categories"]["loaded"], true);
    assert_eq!(body["stats"]["messages"]["count"], 1);
    assert_eq!(body["stats"]["messages"]["last_message"]["content"], "latest");
    assert_eq!(
        body["stats"]["messages"]["last_message_thread"]["name"],
        "Mine"
    );
    assert_eq!(body["stats"]["threads"]["active_count"], 1);
}
