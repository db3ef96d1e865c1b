use httpmock::prelude::*;
use poultry_ledger::core::upload::CONFLICT_MESSAGE;
use poultry_ledger::core::{Query, RowStore};
use poultry_ledger::{BulkUploader, FarmScope, LedgerError, RestRowStore, WeightStatus, WeightTracker};
use serde_json::json;

const CSV: &str = "chicken_id,date_recorded,weight_kg\n33,2025-08-03,2.5\n34,bad-date,2.8\n999,2025-08-03,3.0";

#[tokio::test]
async fn test_select_sends_postgrest_query_and_key() {
    let server = MockServer::start();
    let select_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/chicken_inventory")
            .query_param("select", "id")
            .query_param("id", "in.(33,34)")
            .query_param("farm_id", "eq.farm-a")
            .header("apikey", "anon-key")
            .header("Authorization", "Bearer anon-key");
        then.status(200).json_body(json!([{"id": 33}]));
    });

    let store = RestRowStore::new(server.url("/rest/v1")).with_api_key("anon-key");
    let query = FarmScope::new("farm-a").restrict(Query::new().columns(["id"]).any_of("id", [33, 34]));
    let rows = store.select("chicken_inventory", &query).await.unwrap();

    select_mock.assert();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], json!(33));
}

#[tokio::test]
async fn test_upload_against_rest_backend() {
    let server = MockServer::start();

    let lookup_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/chicken_inventory")
            .query_param("id", "in.(33,999)")
            .query_param("farm_id", "eq.farm-a");
        then.status(200).json_body(json!([{"id": 33}]));
    });

    let insert_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/chicken_weights")
            .header("Prefer", "return=representation")
            .json_body(json!([
                {"chicken_id": 33, "date_recorded": "2025-08-03", "weight_kg": 2.5, "farm_id": "farm-a"}
            ]));
        then.status(201).json_body(json!([
            {"id": 501, "chicken_id": 33, "date_recorded": "2025-08-03", "weight_kg": 2.5, "farm_id": "farm-a"}
        ]));
    });

    let uploader = BulkUploader::new(RestRowStore::new(server.base_url()));
    let result = uploader.upload(&FarmScope::new("farm-a"), CSV).await.unwrap();

    lookup_mock.assert();
    insert_mock.assert();
    assert_eq!(result.success_count, 1);
    assert_eq!(result.total_rows, 3);
    assert_eq!(
        result.errors,
        vec![
            "Line 3: Invalid date_recorded format (use YYYY-MM-DD)".to_string(),
            "Line 4: Chicken ID 999 not found".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_unique_violation_becomes_batch_error() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/chicken_inventory");
        then.status(200).json_body(json!([{"id": 33}, {"id": 34}]));
    });
    let insert_mock = server.mock(|when, then| {
        when.method(POST).path("/chicken_weights");
        then.status(409).json_body(json!({
            "code": "23505",
            "details": "Key (chicken_id, date_recorded)=(33, 2025-08-03) already exists.",
            "hint": null,
            "message": "duplicate key value violates unique constraint \"chicken_weights_chicken_id_date_recorded_key\""
        }));
    });

    let uploader = BulkUploader::new(RestRowStore::new(server.base_url()));
    let csv = "chicken_id,date_recorded,weight_kg\n33,2025-08-03,2.5\n34,2025-08-03,2.8";
    let result = uploader.upload(&FarmScope::new("farm-a"), csv).await.unwrap();

    insert_mock.assert();
    assert_eq!(result.success_count, 0);
    assert_eq!(result.total_rows, 2);
    assert_eq!(result.errors, vec![CONFLICT_MESSAGE.to_string()]);
}

#[tokio::test]
async fn test_server_error_aborts_upload() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/chicken_inventory");
        then.status(500).json_body(json!({
            "code": "PGRST000",
            "message": "Could not connect to the database",
            "details": null,
            "hint": null
        }));
    });

    let uploader = BulkUploader::new(RestRowStore::new(server.base_url()));
    let err = uploader
        .upload(&FarmScope::new("farm-a"), CSV)
        .await
        .unwrap_err();

    match err {
        LedgerError::StoreError {
            table,
            status,
            code,
            message,
        } => {
            assert_eq!(table, "chicken_inventory");
            assert_eq!(status, 500);
            assert_eq!(code.as_deref(), Some("PGRST000"));
            assert_eq!(message, "Could not connect to the database");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_plain_text_error_body_is_kept() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/weight_standards");
        then.status(404).body("relation does not exist");
    });

    let store = RestRowStore::new(server.base_url());
    let err = store
        .select("weight_standards", &Query::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LedgerError::StoreError { status: 404, ref message, .. } if message == "relation does not exist"
    ));
}

#[tokio::test]
async fn test_history_against_rest_backend() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET)
            .path("/chicken_inventory")
            .query_param("id", "eq.33")
            .query_param("farm_id", "eq.farm-a")
            .query_param("limit", "1");
        then.status(200).json_body(json!([
            {"id": 33, "breed": "Broiler", "age": 2, "health_status": "Healthy", "date_added": "2025-07-04T00:00:00+00:00", "date_removed": null}
        ]));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/chicken_weights")
            .query_param("chicken_id", "eq.33")
            .query_param("order", "date_recorded.desc");
        then.status(200).json_body(json!([
            {"id": 2, "chicken_id": 33, "date_recorded": "2025-08-03", "weight_kg": 1.5},
            {"id": 1, "chicken_id": 33, "date_recorded": "2025-07-14", "weight_kg": 0.31}
        ]));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/weight_standards")
            .query_param("order", "age_in_days.asc");
        then.status(200).json_body(json!([
            {"id": 1, "age_in_days": 10, "expected_weight_kg": 0.3},
            {"id": 2, "age_in_days": 30, "expected_weight_kg": 2.0}
        ]));
    });

    let tracker = WeightTracker::new(RestRowStore::new(server.base_url()));
    let today = chrono::NaiveDate::from_ymd_opt(2025, 8, 13).unwrap();
    let history = tracker
        .history(&FarmScope::new("farm-a"), 33, today)
        .await
        .unwrap();

    assert_eq!(history.current_age_in_days, Some(40));
    let statuses: Vec<WeightStatus> = history
        .entries
        .iter()
        .map(|entry| entry.classification.status)
        .collect();
    assert_eq!(statuses, vec![WeightStatus::Underweight, WeightStatus::Normal]);
}
