use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use bedrock_client::{ClientConfig, FileStorage, MemoryStorage, Storage, TokenKind};
use bedrock_core::{ResourceId, ResourceKind, Severity, LOGOUT_MESSAGE, REFRESH_FAILED_MESSAGE};
use bedrock_store::{AuthStatus, Command, Store};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

type Reply = (StatusCode, Json<Value>);

fn ok(body: Value) -> Reply {
    (StatusCode::OK, Json(body))
}

fn rejected(status: StatusCode, detail: &str) -> Reply {
    (status, Json(json!({ "detail": detail })))
}

async fn login(Json(body): Json<Value>) -> Reply {
    if body["username"] == "admin" && body["password"] == "secret" {
        ok(json!({
            "access": "a1",
            "refresh": "r1",
            "user": { "username": "admin", "email": "admin@example.com" }
        }))
    } else {
        rejected(
            StatusCode::UNAUTHORIZED,
            "No active account found with the given credentials",
        )
    }
}

async fn refresh(Json(body): Json<Value>) -> Reply {
    if body["refresh"] == "r1" {
        ok(json!({ "access": "a2" }))
    } else {
        rejected(StatusCode::UNAUTHORIZED, "Token is invalid or expired")
    }
}

async fn products(headers: HeaderMap) -> Reply {
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some("Bearer a1") | Some("Bearer a2") => ok(json!([{ "id": "p1", "name": "billing" }])),
        _ => rejected(
            StatusCode::UNAUTHORIZED,
            "Authentication credentials were not provided.",
        ),
    }
}

async fn start_backend() -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let app = Router::new()
        .route("/api/auth/token/", post(login))
        .route("/api/auth/token/refresh/", post(refresh))
        .route(
            "/api/sor/servers/",
            get(|| async {
                ok(json!([
                    { "id": 1, "status": "ACTIVE", "name": "web-1" },
                    { "id": 2, "status": "INACTIVE", "name": "web-2" }
                ]))
            }),
        )
        .route(
            "/api/sor/servers",
            post(|Json(mut body): Json<Value>| async move {
                body["id"] = json!(5);
                ok(body)
            }),
        )
        .route(
            "/api/sor/servers/{id}",
            get(|Path(id): Path<i64>| async move {
                if id == 1 {
                    ok(json!({ "id": 1, "status": "DECOM", "name": "web-1" }))
                } else {
                    rejected(StatusCode::NOT_FOUND, "Not found.")
                }
            })
            .put(|Json(body): Json<Value>| async move { ok(body) })
            .delete(|| async { StatusCode::NO_CONTENT }),
        )
        .route(
            "/api/sor/clusters/",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        )
        .route("/api/sor/products/", get(products));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, handle)
}

fn config_for(addr: SocketAddr) -> ClientConfig {
    ClientConfig::with_base_url(format!("http://{addr}/api"))
}

fn memory_store(addr: SocketAddr) -> (Arc<MemoryStorage>, Store) {
    let storage = Arc::new(MemoryStorage::new());
    let store = Store::new(config_for(addr), storage.clone()).unwrap();
    (storage, store)
}

// =============================================================================
// Resources
// =============================================================================

#[tokio::test]
async fn fetch_replaces_collection_and_clears_loading() {
    let (addr, handle) = start_backend().await;
    let (_, store) = memory_store(addr);

    let records = store.fetch_resources(ResourceKind::Server).await.unwrap();

    assert_eq!(records.len(), 2);
    let servers = store.resources(ResourceKind::Server);
    assert_eq!(servers[0].get("status"), Some(&json!("ACTIVE")));
    assert_eq!(servers[1].id(), Some(ResourceId::from(2)));
    assert!(!store.is_loading());
    assert!(store.notification().is_none());
    handle.abort();
}

#[tokio::test]
async fn loading_is_raised_while_request_is_in_flight() {
    let arrived = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let app = Router::new().route(
        "/api/sor/labels/",
        get({
            let arrived = arrived.clone();
            let release = release.clone();
            move || async move {
                arrived.notify_one();
                release.notified().await;
                ok(json!([{ "id": 3, "name": "pci" }]))
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let store = Arc::new(memory_store(addr).1);
    assert!(!store.is_loading());

    let fetch = tokio::spawn({
        let store = store.clone();
        async move { store.fetch_resources(ResourceKind::Label).await }
    });

    tokio::time::timeout(Duration::from_secs(5), arrived.notified())
        .await
        .unwrap();
    assert!(store.is_loading());
    assert!(store.resources(ResourceKind::Label).is_empty());

    release.notify_one();
    let records = fetch.await.unwrap().unwrap();
    assert_eq!(records.len(), 1);
    assert!(!store.is_loading());
    handle.abort();
}

#[tokio::test]
async fn create_appends_backend_record() {
    let (addr, handle) = start_backend().await;
    let (_, store) = memory_store(addr);
    store.fetch_resources(ResourceKind::Server).await.unwrap();

    let created = store
        .create_resource(ResourceKind::Server, json!({ "name": "x" }))
        .await
        .unwrap();

    assert_eq!(created.id(), Some(ResourceId::from(5)));
    let servers = store.resources(ResourceKind::Server);
    assert_eq!(servers.len(), 3);
    assert_eq!(servers[2].name(), Some("x"));
    assert!(store.resource(ResourceKind::Server, &ResourceId::from(5)).is_some());
    handle.abort();
}

#[tokio::test]
async fn update_merges_response_into_loaded_record() {
    let (addr, handle) = start_backend().await;
    let (_, store) = memory_store(addr);
    store.fetch_resources(ResourceKind::Server).await.unwrap();

    let updated = store
        .update_resource(ResourceKind::Server, json!({ "id": 1, "status": "DECOM" }))
        .await
        .unwrap();

    assert_eq!(updated.get("status"), Some(&json!("DECOM")));
    assert_eq!(updated.name(), Some("web-1"));
    assert_eq!(store.resources(ResourceKind::Server).len(), 2);
    handle.abort();
}

#[tokio::test]
async fn update_of_unloaded_record_is_a_not_found_warning() {
    let (addr, handle) = start_backend().await;
    let (_, store) = memory_store(addr);

    let err = store
        .update_resource(ResourceKind::Server, json!({ "id": 42, "status": "DECOM" }))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    let notification = store.notification().unwrap();
    assert_eq!(notification.severity, Severity::Warning);
    assert_eq!(notification.message, "server 42 not found");
    assert!(store.resources(ResourceKind::Server).is_empty());
    assert!(!store.is_loading());
    handle.abort();
}

#[tokio::test]
async fn delete_removes_loaded_record() {
    let (addr, handle) = start_backend().await;
    let (_, store) = memory_store(addr);
    store.fetch_resources(ResourceKind::Server).await.unwrap();

    store
        .delete_resource(ResourceKind::Server, ResourceId::from(1))
        .await
        .unwrap();

    let servers = store.resources(ResourceKind::Server);
    assert_eq!(servers.len(), 1);
    assert_eq!(servers[0].id(), Some(ResourceId::from(2)));

    let err = store
        .delete_resource(ResourceKind::Server, ResourceId::from(1))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    handle.abort();
}

#[tokio::test]
async fn fetch_one_upserts_and_reports_missing() {
    let (addr, handle) = start_backend().await;
    let (_, store) = memory_store(addr);
    store.fetch_resources(ResourceKind::Server).await.unwrap();

    store
        .fetch_resource(ResourceKind::Server, ResourceId::from(1))
        .await
        .unwrap();
    let first = store.resource(ResourceKind::Server, &ResourceId::from(1)).unwrap();
    assert_eq!(first.get("status"), Some(&json!("DECOM")));
    assert_eq!(store.resources(ResourceKind::Server).len(), 2);

    let err = store
        .fetch_resource(ResourceKind::Server, ResourceId::from(7))
        .await
        .unwrap_err();
    assert!(!err.is_not_found());
    let notification = store.notification().unwrap();
    assert_eq!(notification.severity, Severity::Error);
    assert_eq!(
        notification.message,
        "Request failed with status code 404: Not found."
    );
    handle.abort();
}

#[tokio::test]
async fn server_error_leaves_collection_and_raises_error() {
    let (addr, handle) = start_backend().await;
    let (_, store) = memory_store(addr);

    let result = store.fetch_resources(ResourceKind::Cluster).await;

    assert!(result.is_err());
    assert!(store.resources(ResourceKind::Cluster).is_empty());
    assert!(!store.is_loading());
    let notification = store.notification().unwrap();
    assert_eq!(notification.severity, Severity::Error);
    assert!(notification.message.contains("500"));
    handle.abort();
}

#[tokio::test]
async fn dispatch_runs_typed_commands() {
    let (addr, handle) = start_backend().await;
    let (_, store) = memory_store(addr);

    let listed = store
        .dispatch(Command::FetchResources(ResourceKind::Server))
        .await
        .unwrap();
    assert_eq!(listed.as_array().map(Vec::len), Some(2));

    let deleted = store
        .dispatch(Command::DeleteResource {
            kind: ResourceKind::Server,
            id: ResourceId::from(2),
        })
        .await
        .unwrap();
    assert_eq!(deleted, Value::Null);
    assert_eq!(store.resources(ResourceKind::Server).len(), 1);
    handle.abort();
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn login_then_logout_leaves_no_credentials() {
    let (addr, handle) = start_backend().await;
    let (storage, store) = memory_store(addr);

    let payload = store.login("admin", "secret").await.unwrap();
    assert_eq!(payload["access"], "a1");
    assert!(store.is_authenticated());
    assert_eq!(store.auth_state().status(), AuthStatus::Authenticated);
    assert_eq!(
        store.current_user().unwrap().email.as_deref(),
        Some("admin@example.com")
    );
    assert_eq!(storage.get("id_access_token").unwrap().as_deref(), Some("a1"));
    assert_eq!(storage.get("id_refresh_token").unwrap().as_deref(), Some("r1"));

    // bearer header is installed on the resource client
    store.fetch_resources(ResourceKind::Product).await.unwrap();
    assert_eq!(store.resources(ResourceKind::Product).len(), 1);

    store.logout().await.unwrap();
    assert!(!store.is_authenticated());
    assert!(store.current_user().is_none());
    assert!(store.resources(ResourceKind::Product).is_empty());
    assert_eq!(storage.get("id_access_token").unwrap(), None);
    assert_eq!(storage.get("id_refresh_token").unwrap(), None);

    let notification = store.notification().unwrap();
    assert_eq!(notification.severity, Severity::Success);
    assert_eq!(notification.message, LOGOUT_MESSAGE);

    assert!(store.fetch_resources(ResourceKind::Product).await.is_err());
    handle.abort();
}

#[tokio::test]
async fn failed_login_records_error() {
    let (addr, handle) = start_backend().await;
    let (storage, store) = memory_store(addr);

    let err = store.login("admin", "wrong").await.unwrap_err();

    assert!(!store.is_authenticated());
    assert_eq!(store.auth_state().status(), AuthStatus::Error);
    assert_eq!(store.auth_error(), Some(err.to_string()));
    assert_eq!(storage.get("id_access_token").unwrap(), None);

    let notification = store.notification().unwrap();
    assert_eq!(notification.severity, Severity::Error);
    assert_eq!(
        notification.message,
        "Request failed with status code 401: No active account found with the given credentials"
    );
    handle.abort();
}

#[tokio::test]
async fn failed_login_ends_existing_session() {
    let (addr, handle) = start_backend().await;
    let (storage, store) = memory_store(addr);
    store.login("admin", "secret").await.unwrap();
    store.fetch_resources(ResourceKind::Product).await.unwrap();

    let err = store.login("admin", "wrong").await.unwrap_err();

    assert!(err.is_auth_rejected());
    assert_eq!(store.auth_state().status(), AuthStatus::Error);
    assert!(store.current_user().is_none());
    assert!(store.resources(ResourceKind::Product).is_empty());
    assert_eq!(storage.get("id_access_token").unwrap(), None);
    assert_eq!(storage.get("id_refresh_token").unwrap(), None);

    // the old bearer token is no longer sent
    assert!(store.fetch_resources(ResourceKind::Product).await.is_err());

    // nothing left for a restart to pick up
    store.check_auth().await.unwrap();
    assert!(!store.is_authenticated());
    handle.abort();
}

#[tokio::test]
async fn check_auth_without_token_stays_anonymous() {
    let (addr, handle) = start_backend().await;
    let (_, store) = memory_store(addr);

    store.check_auth().await.unwrap();

    assert!(!store.is_authenticated());
    assert_eq!(store.auth_state().status(), AuthStatus::Anonymous);
    handle.abort();
}

#[tokio::test]
async fn check_auth_refreshes_stored_session() {
    let (addr, handle) = start_backend().await;
    let (storage, store) = memory_store(addr);
    store.tokens().set_token(Some("a1"), Some("r1")).unwrap();

    store.check_auth().await.unwrap();

    assert!(store.is_authenticated());
    assert_eq!(storage.get("id_access_token").unwrap().as_deref(), Some("a2"));
    assert_eq!(storage.get("id_refresh_token").unwrap().as_deref(), Some("r1"));
    store.fetch_resources(ResourceKind::Product).await.unwrap();
    handle.abort();
}

#[tokio::test]
async fn rejected_refresh_purges_session() {
    let (addr, handle) = start_backend().await;
    let (storage, store) = memory_store(addr);
    store.tokens().set_token(Some("stale"), Some("expired")).unwrap();

    let result = store.check_auth().await;

    assert!(result.is_err());
    assert!(!store.is_authenticated());
    assert_eq!(storage.get("id_access_token").unwrap(), None);
    assert_eq!(storage.get("id_refresh_token").unwrap(), None);

    let notification = store.notification().unwrap();
    assert_eq!(notification.severity, Severity::Warning);
    assert_eq!(notification.message, REFRESH_FAILED_MESSAGE);
    handle.abort();
}

#[tokio::test]
async fn refresh_without_refresh_token_purges_session() {
    let (addr, handle) = start_backend().await;
    let (_, store) = memory_store(addr);
    store.tokens().set_token(Some("a1"), None).unwrap();

    let result = store.refresh_auth().await;

    assert!(result.is_err());
    assert!(!store.is_authenticated());
    assert_eq!(store.tokens().get_token(TokenKind::Access).unwrap(), None);
    handle.abort();
}

#[tokio::test]
async fn stored_session_survives_restart() {
    let (addr, handle) = start_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    {
        let storage = Arc::new(FileStorage::open(&path).unwrap());
        let store = Store::new(config_for(addr), storage).unwrap();
        store.login("admin", "secret").await.unwrap();
    }

    let mut config = config_for(addr);
    config.auth.refresh_on_check = false;
    let storage = Arc::new(FileStorage::open(&path).unwrap());
    let store = Store::new(config, storage).unwrap();

    store.check_auth().await.unwrap();
    assert!(store.is_authenticated());
    assert!(store.current_user().is_none());
    store.fetch_resources(ResourceKind::Product).await.unwrap();
    handle.abort();
}
