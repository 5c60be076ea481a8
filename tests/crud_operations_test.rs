use crudservice::{
    CrudError, CrudRequest, ErrorKind, PaginationConfig, create, destroy, get, list, update,
};
use sea_orm::EntityTrait;
use serde_json::{Value, json};

mod common;
use common::{
    insert_todo, owned_todo_config, seed_todos, setup_test_db, todo_config,
    todo_entity::{Entity, Model},
};

fn titles(data: &[Value]) -> Vec<&str> {
    data.iter().map(|row| row["title"].as_str().unwrap()).collect()
}

// ============================================================================
// list
// ============================================================================

#[tokio::test]
async fn test_list_first_page_of_25() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    seed_todos(&db, 25, None).await;

    let request = CrudRequest::new().with_query("limit", "10").with_query("page", "1");
    let response = list(&db, &request, &todo_config()).await.unwrap();

    assert_eq!(response.data.len(), 10);
    assert_eq!(response.pagination.count, 25);
    assert_eq!(response.pagination.page, 1);
    assert_eq!(response.pagination.limit, 10);
    assert_eq!(response.pagination.total_pages, 3);
    assert!(response.pagination.has_next);
    assert!(!response.pagination.has_previous);
    assert_eq!(titles(&response.data)[0], "Todo 01");
}

#[tokio::test]
async fn test_list_last_partial_page() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    seed_todos(&db, 25, None).await;

    let request = CrudRequest::new().with_query("limit", "10").with_query("page", "3");
    let response = list(&db, &request, &todo_config()).await.unwrap();

    assert_eq!(titles(&response.data), vec!["Todo 21", "Todo 22", "Todo 23", "Todo 24", "Todo 25"]);
    assert!(!response.pagination.has_next);
    assert!(response.pagination.has_previous);
}

#[tokio::test]
async fn test_list_defaults_to_ten_rows() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    seed_todos(&db, 12, None).await;

    let response = list(&db, &CrudRequest::new(), &todo_config()).await.unwrap();
    assert_eq!(response.data.len(), 10);
    assert_eq!(response.pagination.limit, 10);
    assert_eq!(response.pagination.page, 1);
}

#[tokio::test]
async fn test_list_empty_table_is_not_an_error() {
    let db = setup_test_db().await.expect("Failed to setup test database");

    let response = list(&db, &CrudRequest::new(), &todo_config()).await.unwrap();
    assert!(response.data.is_empty());
    assert_eq!(response.pagination.count, 0);
    assert_eq!(response.pagination.total_pages, 0);
}

#[tokio::test]
async fn test_list_rejects_out_of_range_limit() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let config = todo_config().pagination(PaginationConfig {
        default_limit: 10,
        max_limit: 50,
    });

    for limit in ["0", "51", "ten"] {
        let request = CrudRequest::new().with_query("limit", limit);
        let err = list(&db, &request, &config).await.unwrap_err();
        assert!(matches!(err, CrudError::InvalidInput { .. }), "limit={limit}");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.validation_errors().unwrap().iter().any(|e| e.field == "limit"));
    }
}

#[tokio::test]
async fn test_list_rejects_page_beyond_sql_offset_range() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    seed_todos(&db, 3, None).await;

    let request = CrudRequest::new()
        .with_query("limit", "10")
        .with_query("page", "1000000000000000000");
    let err = list(&db, &request, &todo_config()).await.unwrap_err();
    assert!(matches!(err, CrudError::InvalidInput { .. }));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(err.validation_errors().unwrap().iter().any(|e| e.field == "page"));
}

#[tokio::test]
async fn test_list_zero_default_limit_still_returns_rows() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    seed_todos(&db, 3, None).await;
    let config = todo_config().pagination(PaginationConfig {
        default_limit: 0,
        max_limit: 50,
    });

    let response = list(&db, &CrudRequest::new(), &config).await.unwrap();
    assert_eq!(response.data.len(), 1);
    assert_eq!(response.pagination.limit, 1);
    assert_eq!(response.pagination.total_pages, 3);
}

#[tokio::test]
async fn test_list_filters_and_search() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    insert_todo(&db, "Buy milk", 3, None).await;
    insert_todo(&db, "Buy bread", 1, None).await;
    insert_todo(&db, "Walk dog", 3, None).await;

    let request = CrudRequest::new().with_query("priority", "3");
    let response = list(&db, &request, &todo_config()).await.unwrap();
    assert_eq!(titles(&response.data), vec!["Buy milk", "Walk dog"]);
    assert_eq!(response.pagination.count, 2);

    let request = CrudRequest::new()
        .with_query("q", "buy")
        .with_query("priority", "1");
    let response = list(&db, &request, &todo_config()).await.unwrap();
    assert_eq!(titles(&response.data), vec!["Buy bread"]);

    let request = CrudRequest::new().with_query("priority", "urgent");
    let err = list(&db, &request, &todo_config()).await.unwrap_err();
    assert!(matches!(err, CrudError::InvalidInput { .. }));
}

#[tokio::test]
async fn test_list_sorting() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    insert_todo(&db, "b", 1, None).await;
    insert_todo(&db, "c", 5, None).await;
    insert_todo(&db, "a", 3, None).await;

    let request = CrudRequest::new()
        .with_query("sort", "priority")
        .with_query("order", "DESC");
    let response = list(&db, &request, &todo_config()).await.unwrap();
    assert_eq!(titles(&response.data), vec!["c", "a", "b"]);

    let request = CrudRequest::new().with_query("sort", r#"["title","ASC"]"#);
    let response = list(&db, &request, &todo_config()).await.unwrap();
    assert_eq!(titles(&response.data), vec!["a", "b", "c"]);

    // not sortable: insertion order
    let request = CrudRequest::new().with_query("sort", "owner");
    let response = list(&db, &request, &todo_config()).await.unwrap();
    assert_eq!(titles(&response.data), vec!["b", "c", "a"]);
}

#[tokio::test]
async fn test_list_data_is_plain_copy_of_rows() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let row = insert_todo(&db, "Snapshot", 2, None).await;

    let response = list(&db, &CrudRequest::new(), &todo_config()).await.unwrap();
    assert_eq!(response.data, vec![serde_json::to_value(&row).unwrap()]);
}

// ============================================================================
// get
// ============================================================================

#[tokio::test]
async fn test_get_returns_plain_record() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let row = insert_todo(&db, "Read me", 4, None).await;

    let request = CrudRequest::new().with_param("id", row.id.to_string());
    let value = get(&db, &request, &todo_config()).await.unwrap();

    assert_eq!(value, serde_json::to_value(&row).unwrap());
    let back: Model = serde_json::from_value(value).unwrap();
    assert_eq!(back, row);
}

#[tokio::test]
async fn test_get_missing_and_malformed_ids_are_not_found() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    insert_todo(&db, "Only one", 1, None).await;

    for id in [json!("999"), json!("not-a-number"), Value::Null] {
        let request = CrudRequest::new().with_param("id", id.clone());
        let err = get(&db, &request, &todo_config()).await.unwrap_err();
        assert!(err.is_not_found(), "id={id}");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "NotFound");
    }

    let err = get(&db, &CrudRequest::new(), &todo_config()).await.unwrap_err();
    assert!(err.is_not_found());
}

// ============================================================================
// create
// ============================================================================

#[tokio::test]
async fn test_create_persists_only_defined_fields() {
    let db = setup_test_db().await.expect("Failed to setup test database");

    let request = CrudRequest::new().with_body(json!({
        "id": 4242,
        "title": "Fresh",
        "owner": "mallory",
        "priority": 4
    }));
    let created = create(&db, &request, &todo_config()).await.unwrap();

    assert_ne!(created.id, 4242);
    assert_eq!(created.title, "Fresh");
    assert_eq!(created.priority, 4);
    assert!(!created.completed);
    assert_eq!(created.owner, None);

    let stored = Entity::find_by_id(created.id).one(&db).await.unwrap().unwrap();
    assert_eq!(stored, created);
}

#[tokio::test]
async fn test_create_validation_failure() {
    let db = setup_test_db().await.expect("Failed to setup test database");

    let request = CrudRequest::new().with_body(json!({"priority": 9}));
    let err = create(&db, &request, &todo_config()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnprocessableEntity);
    let errors = err.validation_errors().unwrap();
    assert!(errors.iter().any(|e| e.field == "title"));
    assert!(errors.iter().any(|e| e.field == "priority"));
    assert_eq!(Entity::find().all(&db).await.unwrap().len(), 0);
}

#[tokio::test]
async fn test_create_unique_violation_is_conflict() {
    let db = setup_test_db().await.expect("Failed to setup test database");

    let request = CrudRequest::new().with_body(json!({"title": "One", "code": "A-1"}));
    create(&db, &request, &todo_config()).await.unwrap();

    let request = CrudRequest::new().with_body(json!({"title": "Two", "code": "A-1"}));
    let err = create(&db, &request, &todo_config()).await.unwrap_err();
    assert!(matches!(err, CrudError::Conflict { .. }), "got {err:?}");
    assert_eq!(err.kind(), ErrorKind::UnprocessableEntity);
}

// ============================================================================
// update
// ============================================================================

#[tokio::test]
async fn test_update_changes_only_selected_fields() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let row = insert_todo(&db, "Before", 2, None).await;

    let request = CrudRequest::new()
        .with_param("id", row.id.to_string())
        .with_body(json!({"title": "After", "owner": "mallory"}));
    let updated = update(&db, &request, &todo_config()).await.unwrap();

    assert_eq!(updated.title, "After");
    assert_eq!(updated.priority, 2);
    assert!(!updated.completed);
    assert_eq!(updated.owner, None);

    let stored = Entity::find_by_id(row.id).one(&db).await.unwrap().unwrap();
    assert_eq!(stored, updated);
}

#[tokio::test]
async fn test_update_with_empty_body_returns_current_row() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let row = insert_todo(&db, "Untouched", 2, None).await;

    let request = CrudRequest::new().with_param("id", row.id);
    let same = update(&db, &request, &todo_config()).await.unwrap();
    assert_eq!(same, row);
}

#[tokio::test]
async fn test_update_missing_id_is_not_found() {
    let db = setup_test_db().await.expect("Failed to setup test database");

    let request = CrudRequest::new()
        .with_param("id", "77")
        .with_body(json!({"title": "Ghost"}));
    let err = update(&db, &request, &todo_config()).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_update_invalid_body_is_unprocessable() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let row = insert_todo(&db, "Valid", 2, None).await;

    let request = CrudRequest::new()
        .with_param("id", row.id)
        .with_body(json!({"title": null}));
    let err = update(&db, &request, &todo_config()).await.unwrap_err();
    assert!(matches!(err, CrudError::InvalidInput { .. }));
    assert_eq!(err.kind(), ErrorKind::UnprocessableEntity);
}

// ============================================================================
// destroy
// ============================================================================

#[tokio::test]
async fn test_destroy_then_get_is_not_found() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let row = insert_todo(&db, "Doomed", 1, None).await;
    let request = CrudRequest::new().with_param("id", row.id.to_string());

    assert!(destroy(&db, &request, &todo_config()).await.unwrap());
    let err = get(&db, &request, &todo_config()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_destroy_missing_id_still_true() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    insert_todo(&db, "Survivor", 1, None).await;

    for id in ["12345", "garbage"] {
        let request = CrudRequest::new().with_param("id", id);
        assert!(destroy(&db, &request, &todo_config()).await.unwrap());
    }
    assert_eq!(Entity::find().all(&db).await.unwrap().len(), 1);
}

// ============================================================================
// batch scope
// ============================================================================

#[tokio::test]
async fn test_batch_scope_isolates_owners() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    seed_todos(&db, 3, Some("alice")).await;
    let bobs = seed_todos(&db, 2, Some("bob")).await;
    let config = owned_todo_config();

    let alice = CrudRequest::new().with_param("owner", "alice");
    let response = list(&db, &alice, &config).await.unwrap();
    assert_eq!(response.pagination.count, 3);
    assert!(response.data.iter().all(|row| row["owner"] == "alice"));

    // bob's row is invisible and untouchable for alice
    let foreign = alice.clone().with_param("id", bobs[0].id);
    assert!(get(&db, &foreign, &config).await.unwrap_err().is_not_found());
    let err = update(&db, &foreign.clone().with_body(json!({"title": "hijack"})), &config)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(destroy(&db, &foreign, &config).await.unwrap());
    assert!(Entity::find_by_id(bobs[0].id).one(&db).await.unwrap().is_some());
}

#[tokio::test]
async fn test_batch_scope_stamped_on_create() {
    let db = setup_test_db().await.expect("Failed to setup test database");

    let request = CrudRequest::new()
        .with_param("owner", "carol")
        .with_body(json!({"title": "Mine"}));
    let created = create(&db, &request, &owned_todo_config()).await.unwrap();
    assert_eq!(created.owner.as_deref(), Some("carol"));
}

#[tokio::test]
async fn test_required_batch_scope_missing() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    seed_todos(&db, 2, Some("alice")).await;

    let err = list(&db, &CrudRequest::new(), &owned_todo_config())
        .await
        .unwrap_err();
    assert!(err.validation_errors().unwrap().iter().any(|e| e.field == "owner"));
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let request = CrudRequest::new().with_body(json!({"title": "Orphan"}));
    let err = create(&db, &request, &owned_todo_config()).await.unwrap_err();
    assert!(matches!(err, CrudError::InvalidInput { .. }));
}
