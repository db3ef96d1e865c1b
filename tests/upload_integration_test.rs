use poultry_ledger::core::upload::{CONFLICT_MESSAGE, TEMPLATE_CSV};
use poultry_ledger::{BulkUploader, FarmScope, InMemoryRowStore, UploadResult};
use serde_json::json;

async fn farm_store() -> InMemoryRowStore {
    let store = InMemoryRowStore::new();
    store
        .seed(
            "chicken_inventory",
            vec![
                json!({"id": 33, "breed": "Broiler", "date_added": "2025-07-04", "farm_id": "farm-a"}),
                json!({"id": 34, "breed": "Broiler", "date_added": "2025-07-04", "farm_id": "farm-a"}),
            ],
        )
        .await;
    store
        .add_unique_constraint("chicken_weights", &["chicken_id", "date_recorded"])
        .await;
    store
}

#[tokio::test]
async fn test_mixed_upload_end_to_end() {
    let store = farm_store().await;
    let uploader = BulkUploader::new(store.clone());

    let csv = "chicken_id,date_recorded,weight_kg\n33,2025-08-03,2.5\n34,bad-date,2.8\n999,2025-08-03,3.0\n";
    let result = uploader.upload(&FarmScope::new("farm-a"), csv).await.unwrap();

    assert_eq!(
        result,
        UploadResult {
            success_count: 1,
            errors: vec![
                "Line 3: Invalid date_recorded format (use YYYY-MM-DD)".to_string(),
                "Line 4: Chicken ID 999 not found".to_string(),
            ],
            total_rows: 3,
        }
    );
    assert_eq!(store.rows("chicken_weights").await.len(), 1);
}

#[tokio::test]
async fn test_template_uploads_cleanly() {
    let store = farm_store().await;
    let uploader = BulkUploader::new(store.clone());

    let result = uploader
        .upload(&FarmScope::new("farm-a"), TEMPLATE_CSV)
        .await
        .unwrap();

    assert!(result.is_clean());
    assert_eq!(result.success_count, 2);
    assert_eq!(result.total_rows, 2);
}

#[tokio::test]
async fn test_second_upload_of_same_file_conflicts() {
    let store = farm_store().await;
    let uploader = BulkUploader::new(store.clone());
    let scope = FarmScope::new("farm-a");

    let first = uploader.upload(&scope, TEMPLATE_CSV).await.unwrap();
    assert_eq!(first.success_count, 2);

    let with_new_row = format!("{}\n33,2025-08-10,2.9", TEMPLATE_CSV);
    let second = uploader.upload(&scope, &with_new_row).await.unwrap();

    // the new row is valid but shares the batch with known duplicates
    assert_eq!(second.success_count, 0);
    assert_eq!(second.total_rows, 3);
    assert_eq!(second.errors, vec![CONFLICT_MESSAGE.to_string()]);
    assert_eq!(store.rows("chicken_weights").await.len(), 2);
}

#[tokio::test]
async fn test_duplicates_within_one_file_conflict() {
    let store = farm_store().await;
    let uploader = BulkUploader::new(store.clone());

    let csv = "chicken_id,date_recorded,weight_kg\n33,2025-08-03,2.5\n33,2025-08-03,2.6";
    let result = uploader.upload(&FarmScope::new("farm-a"), csv).await.unwrap();

    assert_eq!(result.success_count, 0);
    assert_eq!(result.errors, vec![CONFLICT_MESSAGE.to_string()]);
    assert!(store.rows("chicken_weights").await.is_empty());
}

#[tokio::test]
async fn test_header_only_file() {
    let store = farm_store().await;
    let uploader = BulkUploader::new(store.clone());

    let result = uploader
        .upload(&FarmScope::new("farm-a"), "chicken_id,date_recorded,weight_kg\n\n")
        .await
        .unwrap();

    assert_eq!(result, UploadResult::default());
    assert_eq!(store.select_count("chicken_weights").await, 0);
}

#[tokio::test]
async fn test_uploads_are_independent_per_farm() {
    let store = farm_store().await;
    store
        .seed(
            "chicken_inventory",
            vec![json!({"id": 50, "breed": "Layer", "farm_id": "farm-b"})],
        )
        .await;
    let uploader = BulkUploader::new(store.clone());
    let csv = "chicken_id,date_recorded,weight_kg\n33,2025-08-03,2.5\n50,2025-08-03,1.9";

    let a = uploader.upload(&FarmScope::new("farm-a"), csv).await.unwrap();
    let b = uploader.upload(&FarmScope::new("farm-b"), csv).await.unwrap();

    assert_eq!(a.errors, vec!["Line 3: Chicken ID 50 not found".to_string()]);
    assert_eq!(b.errors, vec!["Line 2: Chicken ID 33 not found".to_string()]);

    let farms: Vec<_> = store
        .rows("chicken_weights")
        .await
        .into_iter()
        .map(|row| row["farm_id"].clone())
        .collect();
    assert_eq!(farms, vec![json!("farm-a"), json!("farm-b")]);
}
