use api_rest::{router, AppState};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use sencare_core::{CoreConfig, FileStore, MemoryStore, PatientService};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

fn app_with(cfg: CoreConfig) -> Router {
    let service = PatientService::new(Arc::new(cfg), Arc::new(MemoryStore::new()));
    router(AppState::new(service))
}

fn app() -> Router {
    app_with(CoreConfig::in_memory())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn jane() -> Value {
    json!({ "name": "Jane Doe", "condition": "Critical", "contact": "555-0100", "age": 40 })
}

fn blood_pressure() -> Value {
    json!({ "date": "2024-01-01", "type": "BP", "value": "150/95", "condition": "Critical" })
}

async fn create(app: &Router, body: Value) -> String {
    let (status, json) = send(app, "POST", "/patients", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    json["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let (status, json) = send(&app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ok"], true);
}

#[tokio::test]
async fn test_example_scenario() {
    let app = app();

    let (status, created) = send(&app, "POST", "/patients", Some(jane())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "success");
    let id = created["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 24);
    assert_eq!(created["data"]["photo"], "/assets/patient1.png");
    assert_eq!(created["data"]["clinicalData"], json!([]));

    let uri = format!("/patients/{id}/clinical-data");
    let (status, appended) = send(&app, "POST", &uri, Some(blood_pressure())).await;
    assert_eq!(status, StatusCode::OK);
    let entry = appended["data"].clone();
    assert_eq!(entry["value"], "150/95");
    assert_eq!(entry["date"], "2024-01-01T00:00:00Z");
    assert_eq!(entry["id"].as_str().unwrap().len(), 24);

    let (status, history) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["data"], json!([entry]));

    let (status, critical) = send(&app, "GET", "/patients/critical", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(critical["data"][0]["id"], id);
}

#[tokio::test]
async fn test_list_all_is_ok_when_empty() {
    let (status, json) = send(&app(), "GET", "/patients", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "status": "success", "data": [] }));
}

#[tokio::test]
async fn test_create_missing_field_is_bad_request() {
    let app = app();
    let (status, json) = send(
        &app,
        "POST",
        "/patients",
        Some(json!({ "name": "Jane Doe", "condition": "Critical", "age": 40 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], "error");
    assert_eq!(json["message"], "Name, condition, contact, and age are required");

    let (_, listed) = send(&app, "GET", "/patients", None).await;
    assert_eq!(listed["data"], json!([]));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request_envelope() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/patients")
        .header("Content-Type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "error");
}

#[tokio::test]
async fn test_invalid_ids_are_bad_request() {
    let app = app();
    let id = create(&app, jane()).await;

    let cases = [
        ("GET", "/patients/invalid-id".to_string(), None),
        ("PUT", "/patients/invalid-id".to_string(), Some(jane())),
        ("DELETE", "/patients/invalid-id".to_string(), None),
        ("GET", "/patients/invalid-id/clinical-data".to_string(), None),
        ("POST", "/patients/invalid-id/clinical-data".to_string(), Some(blood_pressure())),
        (
            "PATCH",
            format!("/patients/{id}/clinical-data/invalid-id"),
            Some(json!({ "value": "X" })),
        ),
        ("DELETE", format!("/patients/{id}/clinical-data/1"), None),
    ];

    for (method, uri, body) in cases {
        let (status, json) = send(&app, method, &uri, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{method} {uri}");
        assert_eq!(json["message"], "Invalid ID format", "{method} {uri}");
    }
}

#[tokio::test]
async fn test_unknown_patient_is_not_found() {
    let app = app();
    let missing = "64b18a7f4c1d2b4d1c8c5123";

    for (method, uri, body) in [
        ("GET", format!("/patients/{missing}"), None),
        ("PUT", format!("/patients/{missing}"), Some(jane())),
        ("DELETE", format!("/patients/{missing}"), None),
        ("GET", format!("/patients/{missing}/clinical-data"), None),
        ("POST", format!("/patients/{missing}/clinical-data"), Some(blood_pressure())),
    ] {
        let (status, json) = send(&app, method, &uri, body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(json["message"], "Patient not found");
    }
}

#[tokio::test]
async fn test_update_requires_all_fields() {
    let app = app();
    let id = create(&app, jane()).await;
    let uri = format!("/patients/{id}");

    let (status, _) = send(&app, "PUT", &uri, Some(json!({ "name": "Jane Roe" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let body = json!({ "name": "Jane Roe", "condition": "Stable", "contact": "555-0199", "age": 41 });
    let (status, json) = send(&app, "PUT", &uri, Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["name"], "Jane Roe");
    assert_eq!(json["data"]["age"], 41);
    assert_eq!(json["data"]["id"], id);
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let app = app();
    let id = create(&app, jane()).await;
    let uri = format!("/patients/{id}");

    let (status, json) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["message"], "Patient deleted successfully");

    let (status, _) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patch_and_put_update_only_supplied_fields() {
    let app = app();
    let id = create(&app, jane()).await;
    let (_, appended) = send(
        &app,
        "POST",
        &format!("/patients/{id}/clinical-data"),
        Some(blood_pressure()),
    )
    .await;
    let entry = appended["data"].clone();
    let entry_uri = format!("/patients/{id}/clinical-data/{}", entry["id"].as_str().unwrap());

    let (status, patched) = send(
        &app,
        "PATCH",
        &entry_uri,
        Some(json!({ "value": "X", "type": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["data"]["value"], "X");
    assert_eq!(patched["data"]["type"], entry["type"]);
    assert_eq!(patched["data"]["date"], entry["date"]);
    assert_eq!(patched["data"]["condition"], entry["condition"]);

    let (status, put) = send(&app, "PUT", &entry_uri, Some(json!({ "condition": "Stable" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(put["data"]["condition"], "Stable");
    assert_eq!(put["data"]["value"], "X");
}

#[tokio::test]
async fn test_clinical_data_not_found_is_distinguished() {
    let app = app();
    let id = create(&app, jane()).await;
    let unknown_entry = "64b18a7f4c1d2b4d1c8c5123";

    let (status, json) = send(
        &app,
        "PATCH",
        &format!("/patients/{id}/clinical-data/{unknown_entry}"),
        Some(json!({ "value": "X" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Clinical data not found");

    let (status, json) = send(
        &app,
        "DELETE",
        &format!("/patients/{unknown_entry}/clinical-data/{unknown_entry}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Patient not found");
}

#[tokio::test]
async fn test_remove_is_not_found_the_second_time() {
    let app = app();
    let id = create(&app, jane()).await;
    let (_, appended) = send(
        &app,
        "POST",
        &format!("/patients/{id}/clinical-data"),
        Some(blood_pressure()),
    )
    .await;
    let entry_uri = format!(
        "/patients/{id}/clinical-data/{}",
        appended["data"]["id"].as_str().unwrap()
    );

    let (status, json) = send(&app, "DELETE", &entry_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["message"], "Clinical data deleted successfully");

    let (status, json) = send(&app, "DELETE", &entry_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Clinical data not found");
}

#[tokio::test]
async fn test_critical_filter_and_empty_policy() {
    let app = app();
    let (status, json) = send(&app, "GET", "/patients/critical", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "No critical patients found");

    create(
        &app,
        json!({ "name": "John Doe", "condition": "Stable", "contact": "555-0101", "age": 45 }),
    )
    .await;
    let (status, _) = send(&app, "GET", "/patients/critical", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let lenient = app_with(CoreConfig::in_memory().with_critical_empty_is_not_found(false));
    let (status, json) = send(&lenient, "GET", "/patients/critical", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], json!([]));
}

#[tokio::test]
async fn test_file_store_backed_router() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let store = FileStore::open(temp_dir.path().join("patients")).unwrap();
    let service = PatientService::new(Arc::new(CoreConfig::in_memory()), Arc::new(store));
    let app = router(AppState::new(service));

    let id = create(&app, jane()).await;
    let (status, json) = send(&app, "GET", &format!("/patients/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["name"], "Jane Doe");
}

#[tokio::test]
async fn test_broken_store_root_is_internal_error() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let root = temp_dir.path().join("patients");
    let store = FileStore::open(&root).unwrap();
    let service = PatientService::new(Arc::new(CoreConfig::in_memory()), Arc::new(store));
    let app = router(AppState::new(service));

    std::fs::remove_dir_all(&root).unwrap();
    std::fs::write(&root, "not a directory").unwrap();

    for uri in ["/patients", "/patients/critical"] {
        let (status, json) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json,
            json!({ "status": "error", "message": "Internal server error" })
        );
    }
}

#[tokio::test]
async fn test_padded_condition_is_not_critical() {
    let app = app();
    let id = create(
        &app,
        json!({ "name": " Jane Doe", "condition": "Critical ", "contact": "555-0100", "age": 40 }),
    )
    .await;

    let (status, json) = send(&app, "GET", &format!("/patients/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["name"], " Jane Doe");
    assert_eq!(json["data"]["condition"], "Critical ");

    let (status, _) = send(&app, "GET", "/patients/critical", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (status, json) = send(&app(), "GET", "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/patients/{id}/clinical-data"].is_object());
}
