//! Axum surface for one resource.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .nest("/todos", crud_router(db.clone(), todo_config()))
//!     // enclosing path params become request params, usable as a batch scope
//!     .nest("/users/{owner}/notes", crud_router(db, note_config()));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
};
use sea_orm::{DatabaseConnection, IntoActiveModel};
use serde::Serialize;
use serde_json::Value;

use crate::core::config::ResourceConfig;
use crate::core::crud_operations::{create, destroy, get as get_one, list, update};
use crate::core::query::PageRequest;
use crate::core::request::CrudRequest;
use crate::core::traits::CrudEntity;
use crate::errors::CrudError;
use crate::filtering::calculate_content_range;
use crate::models::ListResponse;

/// Shared handler state: the pool and the resource's read-only configuration.
pub struct CrudState<E: CrudEntity> {
    pub db: DatabaseConnection,
    pub config: Arc<ResourceConfig<E>>,
}

impl<E: CrudEntity> Clone for CrudState<E> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

type Params = Option<Path<HashMap<String, String>>>;
type QueryPairs = Query<Vec<(String, String)>>;

fn build_request(params: Params, Query(query): QueryPairs, body: Option<Json<Value>>) -> CrudRequest {
    CrudRequest::from_parts(
        query,
        params.map(|Path(p)| p).unwrap_or_default(),
        body.map_or(Value::Null, |Json(b)| b),
    )
}

/// Router serving list, get, create, update and destroy for `E`.
///
/// | method | path | result |
/// |---|---|---|
/// | GET | `/` | page of rows plus `Content-Range` |
/// | GET | `/{id}` | one row |
/// | POST | `/` | `201 Created` and the new row |
/// | PUT, PATCH | `/{id}` | the updated row |
/// | DELETE | `/{id}` | `true` |
pub fn crud_router<E, S>(db: DatabaseConnection, config: ResourceConfig<E>) -> Router<S>
where
    E: CrudEntity,
    E::Model: Serialize + Sync + IntoActiveModel<E::ActiveModelType>,
    S: Clone + Send + Sync + 'static,
{
    let state = CrudState {
        db,
        config: Arc::new(config),
    };

    Router::new()
        .route("/", get(list_handler::<E>).post(create_handler::<E>))
        .route(
            "/{id}",
            get(get_handler::<E>)
                .put(update_handler::<E>)
                .patch(update_handler::<E>)
                .delete(destroy_handler::<E>),
        )
        .with_state(state)
}

async fn list_handler<E>(
    State(state): State<CrudState<E>>,
    params: Params,
    query: QueryPairs,
) -> Result<(HeaderMap, Json<ListResponse>), CrudError>
where
    E: CrudEntity,
    E::Model: Serialize + Sync,
{
    let request = build_request(params, query, None);
    let response = list(&state.db, &request, &state.config).await?;

    let p = response.pagination;
    let offset = PageRequest::new(p.page, p.limit).offset();
    let headers = calculate_content_range(offset, p.limit, p.count, &state.config.plural);
    Ok((headers, Json(response)))
}

async fn get_handler<E>(
    State(state): State<CrudState<E>>,
    params: Params,
    query: QueryPairs,
) -> Result<Json<Value>, CrudError>
where
    E: CrudEntity,
    E::Model: Serialize,
{
    let request = build_request(params, query, None);
    get_one(&state.db, &request, &state.config).await.map(Json)
}

async fn create_handler<E>(
    State(state): State<CrudState<E>>,
    params: Params,
    query: QueryPairs,
    body: Option<Json<Value>>,
) -> Result<(StatusCode, Json<E::Model>), CrudError>
where
    E: CrudEntity,
    E::Model: Serialize + IntoActiveModel<E::ActiveModelType>,
{
    let request = build_request(params, query, body);
    let created = create(&state.db, &request, &state.config).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_handler<E>(
    State(state): State<CrudState<E>>,
    params: Params,
    query: QueryPairs,
    body: Option<Json<Value>>,
) -> Result<Json<E::Model>, CrudError>
where
    E: CrudEntity,
    E::Model: Serialize + IntoActiveModel<E::ActiveModelType>,
{
    let request = build_request(params, query, body);
    update(&state.db, &request, &state.config).await.map(Json)
}

async fn destroy_handler<E>(
    State(state): State<CrudState<E>>,
    params: Params,
    query: QueryPairs,
) -> Result<Json<bool>, CrudError>
where
    E: CrudEntity,
{
    let request = build_request(params, query, None);
    destroy(&state.db, &request, &state.config).await.map(Json)
}
