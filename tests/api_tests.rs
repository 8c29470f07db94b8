//! HTTP API tests driving the router in-process.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use std::sync::Arc;
use tower::ServiceExt;

use room_solver::web::server::{create_router, AppState};
use room_solver::{
    Participant, ParticipantId, PreferenceEntry, Room, RoomLayout, Selection, SelectionStatus,
    Workspace,
};

fn ids(names: &[&str]) -> Vec<ParticipantId> {
    names.iter().map(|n| ParticipantId::new(*n)).collect()
}

fn selection(owner: &str, choices: [&str; 3], status: SelectionStatus) -> Selection {
    let entry = PreferenceEntry::new(ParticipantId::new(owner), ids(&choices)).unwrap();
    Selection::new(entry, status, Utc::now())
}

/// Five participants: a, b and c rank each other; d and e are left over
fn workspace() -> Workspace {
    let mut ws = Workspace::default();
    for (id, name) in [("a", "Ana"), ("b", "Ben"), ("c", "Cat"), ("d", "Dan"), ("e", "Eve")] {
        ws.roster.add(Participant::new(id, name)).unwrap();
    }
    ws.selections = vec![
        selection("a", ["b", "c", "d"], SelectionStatus::Verified),
        selection("b", ["a", "c", "e"], SelectionStatus::Verified),
        selection("c", ["a", "b", "d"], SelectionStatus::Verified),
        selection("d", ["e", "a", "b"], SelectionStatus::Verified),
        selection("e", ["d", "a", "c"], SelectionStatus::Verified),
    ];
    ws
}

fn app(ws: Workspace) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(ws, None));
    (create_router(Arc::clone(&state)), state)
}

async fn send(app: &Router, method: &str, uri: &str, body: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn send_json(app: &Router, method: &str, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
    let (status, text) = send(app, method, uri, body).await;
    (status, serde_json::from_str(&text).unwrap())
}

fn member_ids(room: &serde_json::Value) -> Vec<&str> {
    room["members"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_and_security_headers() {
    let (app, _) = app(Workspace::default());
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
}

#[tokio::test]
async fn test_participants_and_selections() {
    let (app, _) = app(workspace());

    let (status, body) = send_json(&app, "GET", "/api/participants", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 5);
    assert_eq!(body["participants"][1]["name"], "Ben");

    let (_, body) = send_json(&app, "GET", "/api/selections", "").await;
    assert_eq!(body["count"], 5);
    assert_eq!(body["selections"][0]["entry"]["owner"], "a");
}

#[tokio::test]
async fn test_generate_then_validate() {
    let (app, state) = app(workspace());

    let (_, report) = send_json(&app, "GET", "/api/assignments/validate", "").await;
    assert_eq!(report["ok"], false);
    assert_eq!(report["unassigned"].as_array().unwrap().len(), 5);

    let (status, body) = send_json(&app, "POST", "/api/assignments/generate", "").await;
    assert_eq!(status, StatusCode::OK);
    let rooms = body["rooms"].as_array().unwrap();
    assert_eq!(member_ids(&rooms[0]), vec!["a", "b", "c"]);
    assert_eq!(member_ids(&rooms[1]), vec!["d", "e"]);
    assert_eq!(rooms[1]["members"][0]["name"], "Dan");
    assert_eq!(body["summary"]["mutual_triads"], 1);

    assert_eq!(state.store.read(|ws| ws.layout.len()).unwrap(), 2);

    let (_, report) = send_json(&app, "GET", "/api/assignments/validate", "").await;
    assert_eq!(report["ok"], true);
}

#[tokio::test]
async fn test_generate_dry_run_does_not_commit() {
    let (app, state) = app(workspace());

    let (status, body) =
        send_json(&app, "POST", "/api/assignments/generate?dry_run=true", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dry_run"], true);
    assert_eq!(body["rooms"].as_array().unwrap().len(), 2);
    assert!(state.store.read(|ws| ws.layout.is_empty()).unwrap());
}

#[tokio::test]
async fn test_finalize_protects_room_from_generation() {
    let (app, state) = app(workspace());
    send(&app, "POST", "/api/assignments/generate", "").await;
    let first_id = state.store.read(|ws| ws.layout.rooms[0].id.to_string()).unwrap();

    let (status, room) =
        send_json(&app, "POST", &format!("/api/rooms/{first_id}/finalize"), "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(room["finalized"], true);

    let (_, body) = send_json(&app, "POST", "/api/assignments/generate", "").await;
    assert_eq!(body["locked"], serde_json::json!(["a", "b", "c"]));

    let (_, rooms) = send_json(&app, "GET", "/api/rooms", "").await;
    assert_eq!(rooms["rooms"][0]["id"], first_id.as_str());
    assert_eq!(member_ids(&rooms["rooms"][0]), vec!["a", "b", "c"]);

    let (status, err) = send_json(&app, "DELETE", &format!("/api/rooms/{first_id}"), "").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["error_type"], "room_finalized");

    let (status, room) =
        send_json(&app, "POST", &format!("/api/rooms/{first_id}/unfinalize"), "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(room["finalized"], false);

    let (status, body) = send_json(&app, "DELETE", &format!("/api/rooms/{first_id}"), "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unassigned"], serde_json::json!(["a", "b", "c"]));
}

#[tokio::test]
async fn test_unknown_room_is_not_found() {
    let (app, _) = app(workspace());
    let (status, err) = send_json(&app, "POST", "/api/rooms/nope/finalize", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["error_type"], "room_not_found");
    assert!(err["details"].is_null());
}

#[tokio::test]
async fn test_arrange_applies_edits_and_reports_skips() {
    let mut ws = workspace();
    let open = Room::new("Room 1", ids(&["a", "b"]));
    let locked = Room::new("Room 2", ids(&["d", "e"])).finalized();
    let (open_id, locked_id) = (open.id.to_string(), locked.id.to_string());
    ws.layout = RoomLayout::new(vec![open, locked]);
    let (app, state) = app(ws);

    let edits = format!(
        r#"[
            {{"room_id": "{open_id}", "player_ids": ["a", "b", "c", "ghost"]}},
            {{"room_id": "{locked_id}", "player_ids": []}},
            {{"room_id": "new", "player_ids": ["d"]}}
        ]"#
    );
    let (status, body) = send_json(&app, "POST", "/api/rooms/arrange", &edits).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["report"]["updated"], serde_json::json!([open_id]));
    assert_eq!(body["report"]["skipped_finalized"], serde_json::json!([locked_id]));
    assert_eq!(body["report"]["unknown_participants"], serde_json::json!(["ghost"]));
    assert_eq!(body["report"]["locked_participants"], serde_json::json!(["d"]));

    let layout = state.store.snapshot().unwrap().layout;
    assert_eq!(layout.len(), 2);
    assert_eq!(layout.rooms[0].members, ids(&["a", "b", "c"]));
    assert_eq!(layout.rooms[1].members, ids(&["d", "e"]));
}

#[tokio::test]
async fn test_arrange_rejects_bad_payloads() {
    let (app, _) = app(workspace());

    let (status, err) = send_json(&app, "POST", "/api/rooms/arrange", r#"{"room_id": "new"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error_type"], "invalid_edits");

    let (status, err) = send_json(&app, "POST", "/api/rooms/arrange", "[{").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error_type"], "invalid_json");
}

#[tokio::test]
async fn test_export_formats() {
    let (app, _) = app(workspace());

    let (status, csv) = send(&app, "GET", "/api/selections/export", "").await;
    assert_eq!(status, StatusCode::OK);
    assert!(csv.starts_with("participant_id,participant,choice_1"));
    assert!(csv.contains("\na,Ana,Ben,Cat,Dan,verified,"));

    let (status, tsv) = send(&app, "GET", "/api/selections/export?format=tsv", "").await;
    assert_eq!(status, StatusCode::OK);
    assert!(tsv.contains("\nb\tBen\tAna\tCat\tEve\tverified\t"));

    let (status, _) = send(&app, "GET", "/api/selections/export?format=xlsx", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_changes_are_saved_to_workspace_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("workspace.json");
    workspace().save_to_file(&path).unwrap();

    let state = Arc::new(AppState::new(
        Workspace::load_from_file(&path).unwrap(),
        Some(path.clone()),
    ));
    let app = create_router(state);

    let (status, _) = send(&app, "POST", "/api/assignments/generate", "").await;
    assert_eq!(status, StatusCode::OK);

    let saved = Workspace::load_from_file(&path).unwrap();
    assert_eq!(saved.layout.len(), 2);
    assert!(saved.coverage().ok);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_room_changes_are_all_saved() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("workspace.json");
    let mut ws = workspace();
    let first = Room::new("Room 1", ids(&["a", "b", "c"]));
    let second = Room::new("Room 2", ids(&["d", "e"]));
    let (first_id, second_id) = (first.id.to_string(), second.id.to_string());
    ws.layout = RoomLayout::new(vec![first, second]);
    ws.save_to_file(&path).unwrap();

    let state = Arc::new(AppState::new(
        Workspace::load_from_file(&path).unwrap(),
        Some(path.clone()),
    ));
    let app = create_router(state);

    let finalize_uri = format!("/api/rooms/{first_id}/finalize");
    let delete_uri = format!("/api/rooms/{second_id}");
    let (finalized, deleted) = tokio::join!(
        send(&app, "POST", &finalize_uri, ""),
        send(&app, "DELETE", &delete_uri, ""),
    );
    assert_eq!(finalized.0, StatusCode::OK);
    assert_eq!(deleted.0, StatusCode::OK);

    let saved = Workspace::load_from_file(&path).unwrap();
    assert_eq!(saved.layout.len(), 1);
    assert_eq!(saved.layout.rooms[0].id.to_string(), first_id);
    assert!(saved.layout.rooms[0].finalized);
}
