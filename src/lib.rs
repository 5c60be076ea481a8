//! # crudservice
//!
//! Generic list/get/create/update/destroy handlers for SeaORM entities,
//! served through Axum.
//!
//! A resource is described once by a [`ResourceConfig`]: its writable fields
//! (a [`SelectionSchema`]), filters, sortable columns, an optional
//! [`BatchScope`] and page size bounds. The operations in [`crate::core`] turn a
//! [`CrudRequest`] into SeaORM queries through a pipeline of query composers,
//! and [`crud_router`] exposes them over HTTP.
//!
//! ```rust,ignore
//! use crudservice::{BatchScope, CrudEntity, FieldSpec, ResourceConfig, SelectionSchema, crud_router};
//!
//! impl CrudEntity for todo::Entity {
//!     type ActiveModelType = todo::ActiveModel;
//! }
//!
//! let config = ResourceConfig::<todo::Entity>::new("todo", todo::Column::Id)
//!     .definitions(
//!         SelectionSchema::new()
//!             .field("title", FieldSpec::string().required().max(200))
//!             .field("completed", FieldSpec::boolean().default_value(false)),
//!     )
//!     .filter("completed", todo::Column::Completed)
//!     .sortable("title", todo::Column::Title)
//!     .batch(BatchScope::new("owner", todo::Column::Owner).required());
//!
//! let app = axum::Router::new().nest("/users/{owner}/todos", crud_router(db, config));
//! ```
//!
//! ## Logging
//!
//! The crate emits `tracing` events and never installs a subscriber. Backend
//! failures are logged server-side and replaced by a generic message in
//! responses.

pub mod core;
pub mod errors;
pub mod filtering;
pub mod models;
pub mod routes;
pub mod selector;
pub mod validation;
pub mod values;

#[cfg(test)]
mod test_entity;

pub use crate::core::{
    Capability, CrudEntity, CrudRequest, PageRequest, PaginationConfig, QueryBuilder,
    QueryComposer, QueryOptions, ResourceConfig, create, destroy, get, list, update,
};
pub use errors::{CrudError, ErrorKind, Operation};
pub use filtering::{BatchScope, FilterField, FilterMode, Pagination, paginate};
pub use models::ListResponse;
pub use routes::{CrudState, crud_router};
pub use selector::{FieldKind, FieldSpec, Selection, SelectionSchema, UnknownFields, select};
pub use validation::{ValidationError, ValidationErrors};
