#![allow(dead_code)]

use std::time::Duration;

use axum::Router;
use crudservice::{BatchScope, FieldSpec, ResourceConfig, SelectionSchema, crud_router};
use sea_orm::{
    ActiveModelTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr,
    Schema, Set,
};
use tracing_subscriber::EnvFilter;

pub mod todo_entity;

use todo_entity::{ActiveModel, Column, Entity, Model};

/// Route crate logs to the test output; `RUST_LOG=crudservice=debug` shows them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    init_tracing();

    // A single connection, so every query sees the same in-memory database
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(false);
    let db = Database::connect(options).await?;

    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    db.execute(backend.build(&schema.create_table_from_entity(Entity)))
        .await?;

    Ok(db)
}

pub fn todo_config() -> ResourceConfig<Entity> {
    ResourceConfig::new("todo", Column::Id)
        .definitions(
            SelectionSchema::new()
                .field("title", FieldSpec::string().required().max(200))
                .field("completed", FieldSpec::boolean().default_value(false))
                .field("priority", FieldSpec::integer().min(0).max(5).default_value(1))
                .field("notes", FieldSpec::string().nullable())
                .field("code", FieldSpec::string().nullable()),
        )
        .filter("completed", Column::Completed)
        .filter("priority", Column::Priority)
        .search("q", Column::Title)
        .sortable("title", Column::Title)
        .sortable("priority", Column::Priority)
}

/// Same resource, scoped to the `owner` request key.
pub fn owned_todo_config() -> ResourceConfig<Entity> {
    todo_config().batch(BatchScope::new("owner", Column::Owner).required())
}

pub async fn insert_todo(
    db: &DatabaseConnection,
    title: &str,
    priority: i32,
    owner: Option<&str>,
) -> Model {
    ActiveModel {
        title: Set(title.to_owned()),
        completed: Set(false),
        priority: Set(priority),
        owner: Set(owner.map(str::to_owned)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert todo")
}

/// Insert `count` todos titled `Todo 01`, `Todo 02`, ...
pub async fn seed_todos(db: &DatabaseConnection, count: usize, owner: Option<&str>) -> Vec<Model> {
    let mut rows = Vec::with_capacity(count);
    for i in 1..=count {
        let priority = i32::try_from(i % 5).unwrap();
        rows.push(insert_todo(db, &format!("Todo {i:02}"), priority, owner).await);
    }
    rows
}

pub fn setup_test_app(db: DatabaseConnection) -> Router {
    let api = Router::new()
        .nest("/todos", crud_router(db.clone(), todo_config()))
        .nest("/users/{owner}/todos", crud_router(db, owned_todo_config()));

    Router::new().nest("/api/v1", api)
}
