//! The five CRUD operations.
//!
//! Each operation turns a [`CrudRequest`] into query options through the
//! resource's composers, runs one or two ORM calls and normalises the outcome.
//! Reads hand back plain JSON copies of rows; writes hand back the model.

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter,
};
use serde::Serialize;
use serde_json::Value;

use crate::core::config::ResourceConfig;
use crate::core::query::{PageRequest, QueryBuilder, QueryComposer, QueryOptions};
use crate::core::request::CrudRequest;
use crate::core::traits::CrudEntity;
use crate::errors::{CrudError, Operation};
use crate::filtering::{FilterComposer, PaginationComposer, SortComposer, paginate};
use crate::models::ListResponse;
use crate::selector::Selection;
use crate::validation::{ValidationError, ValidationErrors};
use crate::values::{column_by_name, column_value};

fn scope<E: EntityTrait>(config: &ResourceConfig<E>) -> Option<&dyn QueryComposer<E>> {
    config
        .batch
        .as_ref()
        .map(|scope| scope as &dyn QueryComposer<E>)
}

fn id_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn missing<E: EntityTrait>(config: &ResourceConfig<E>, request: &CrudRequest) -> CrudError {
    CrudError::not_found(config.name.as_str(), request.id().map(id_text))
}

/// Options selecting the row named by `params.id`, batch scoped.
///
/// `None` when there is no id or it cannot be coerced to the id column, since
/// such an id can never match a row.
fn target<E: EntityTrait>(
    request: &CrudRequest,
    config: &ResourceConfig<E>,
    operation: Operation,
) -> Result<Option<QueryOptions<E>>, CrudError> {
    let Some(id) = request
        .id()
        .filter(|raw| !raw.is_null())
        .and_then(|raw| column_value(&config.id_column, raw).ok())
    else {
        return Ok(None);
    };

    let options = QueryOptions::new().filter(config.id_column.eq(id));
    QueryBuilder::new()
        .with_optional(scope(config))
        .apply(request, options)
        .map(Some)
        .map_err(|errors| CrudError::invalid(operation, errors))
}

fn plain<M: Serialize>(model: &M, operation: Operation) -> Result<Value, CrudError> {
    serde_json::to_value(model)
        .map_err(|e| CrudError::backend(operation, DbErr::Json(e.to_string())))
}

/// Read operations log their failures here, writes when rendered.
fn read_failure(resource: &str, err: CrudError) -> CrudError {
    match &err {
        CrudError::Backend { operation, source } => {
            tracing::error!(resource, operation = %operation, error = ?source, "CRUD read failed");
        }
        _ => {
            tracing::debug!(resource, error = %err.user_message(), "CRUD read rejected");
        }
    }
    err
}

/// Set every selected field on `active`, coerced to its column type.
///
/// # Errors
///
/// Reports fields that are not columns of the entity or whose value does not
/// fit the column.
pub fn merge_into_active_model<E: CrudEntity>(
    active: &mut E::ActiveModelType,
    selection: &Selection,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    for (name, value) in selection {
        let Some(column) = column_by_name::<E::Column>(name) else {
            errors.add(ValidationError::new(name.as_str(), "Not a column of this resource"));
            continue;
        };
        match column_value(&column, value) {
            Ok(value) => active.set(column, value),
            Err(e) => errors.add(e),
        }
    }

    errors.result()
}

/// List one page of rows matching the request's filters and batch scope.
///
/// # Errors
///
/// - [`CrudError::InvalidInput`] for bad `limit`/`page`, filter values or a
///   missing required batch key
/// - [`CrudError::Backend`] when the fetch or count fails
pub async fn list<E>(
    db: &DatabaseConnection,
    request: &CrudRequest,
    config: &ResourceConfig<E>,
) -> Result<ListResponse, CrudError>
where
    E: EntityTrait,
    E::Model: Serialize + Sync,
{
    let op = Operation::List;
    let resource = config.name.as_str();

    let options = {
        let filters = FilterComposer::new(&config.filters);
        let sort = SortComposer::new(&config.sortable, config.id_column);
        let paging = PaginationComposer::new(config.pagination);
        QueryBuilder::<E>::new()
            .with(&paging)
            .with(&sort)
            .with_optional(scope(config))
            .with(&filters)
            .build(request)
            .map_err(|errors| read_failure(resource, CrudError::invalid(op, errors)))?
    };
    let page = options
        .page()
        .unwrap_or_else(|| PageRequest::new(1, config.pagination.limits().0));

    let models = options
        .select()
        .all(db)
        .await
        .map_err(|e| read_failure(resource, CrudError::backend(op, e)))?;
    let count = options
        .count_select()
        .count(db)
        .await
        .map_err(|e| read_failure(resource, CrudError::backend(op, e)))?;

    let data = models
        .iter()
        .map(|model| plain(model, op))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| read_failure(resource, e))?;

    tracing::debug!(resource, rows = data.len(), count, page = page.page, "Listed rows");

    Ok(ListResponse {
        data,
        pagination: paginate(count, page.page, page.limit),
    })
}

/// Fetch the row named by `params.id` as plain JSON.
///
/// # Errors
///
/// - [`CrudError::NotFound`] when no row matches (including ids that cannot
///   be coerced to the id column)
/// - [`CrudError::InvalidInput`] for a missing required batch key
/// - [`CrudError::Backend`] when the fetch fails
pub async fn get<E>(
    db: &DatabaseConnection,
    request: &CrudRequest,
    config: &ResourceConfig<E>,
) -> Result<Value, CrudError>
where
    E: EntityTrait,
    E::Model: Serialize,
{
    let op = Operation::Get;
    let resource = config.name.as_str();

    let Some(options) = target(request, config, op).map_err(|e| read_failure(resource, e))? else {
        return Err(read_failure(resource, missing(config, request)));
    };

    let model = options
        .select()
        .one(db)
        .await
        .map_err(|e| read_failure(resource, CrudError::backend(op, e)))?
        .ok_or_else(|| read_failure(resource, missing(config, request)))?;

    tracing::debug!(resource, id = ?request.id(), "Fetched row");
    plain(&model, op).map_err(|e| read_failure(resource, e))
}

/// Insert a row built from the body's `definitions` fields.
///
/// Only the selected fields are set; everything else keeps its database
/// default. The batch scope column is stamped from the request when present.
///
/// # Errors
///
/// - [`CrudError::InvalidInput`] when the body fails validation
/// - [`CrudError::Conflict`] on a unique constraint violation
/// - [`CrudError::Backend`] for any other database failure
pub async fn create<E>(
    db: &DatabaseConnection,
    request: &CrudRequest,
    config: &ResourceConfig<E>,
) -> Result<E::Model, CrudError>
where
    E: CrudEntity,
    E::Model: IntoActiveModel<E::ActiveModelType>,
{
    let op = Operation::Create;

    let selection = config
        .definitions
        .select(&request.body)
        .map_err(|errors| CrudError::invalid(op, errors))?;

    let mut active = <E::ActiveModelType as ActiveModelBehavior>::new();
    let mut errors = match merge_into_active_model::<E>(&mut active, &selection) {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    };
    if let Some(scope) = &config.batch {
        match scope.value(request) {
            Ok(Some(value)) => active.set(scope.column, value),
            Ok(None) => {}
            Err(e) => errors.add(e),
        }
    }
    errors
        .result()
        .map_err(|errors| CrudError::invalid(op, errors))?;

    let model = active
        .insert(db)
        .await
        .map_err(|e| CrudError::from_db(op, &config.name, e))?;

    tracing::debug!(resource = %config.name, fields = selection.len(), "Created row");
    Ok(model)
}

/// Apply the body's `definitions` fields to the row named by `params.id`.
///
/// Fields absent from the body are left untouched; an empty selection returns
/// the current row without writing.
///
/// # Errors
///
/// - [`CrudError::NotFound`] when no row matches
/// - [`CrudError::InvalidInput`] when the body fails validation
/// - [`CrudError::Conflict`] on a unique constraint violation
/// - [`CrudError::Backend`] for any other database failure
pub async fn update<E>(
    db: &DatabaseConnection,
    request: &CrudRequest,
    config: &ResourceConfig<E>,
) -> Result<E::Model, CrudError>
where
    E: CrudEntity,
    E::Model: IntoActiveModel<E::ActiveModelType>,
{
    let op = Operation::Update;

    let selection = config
        .definitions
        .select_partial(&request.body)
        .map_err(|errors| CrudError::invalid(op, errors))?;

    let Some(options) = target(request, config, op)? else {
        return Err(missing(config, request));
    };

    let model = options
        .select()
        .one(db)
        .await
        .map_err(|e| CrudError::from_db(op, &config.name, e))?
        .ok_or_else(|| missing(config, request))?;

    if selection.is_empty() {
        tracing::debug!(resource = %config.name, id = ?request.id(), "Nothing to update");
        return Ok(model);
    }

    let mut active: E::ActiveModelType = model.into_active_model();
    merge_into_active_model::<E>(&mut active, &selection)
        .map_err(|errors| CrudError::invalid(op, errors))?;

    let updated = active
        .update(db)
        .await
        .map_err(|e| CrudError::from_db(op, &config.name, e))?;

    tracing::debug!(resource = %config.name, id = ?request.id(), fields = selection.len(), "Updated row");
    Ok(updated)
}

/// Delete the row named by `params.id`.
///
/// Deleting a row that does not exist is not an error; the result is always
/// `true` on success.
///
/// # Errors
///
/// - [`CrudError::InvalidInput`] for a missing required batch key
/// - [`CrudError::Backend`] when the delete fails
pub async fn destroy<E: EntityTrait>(
    db: &DatabaseConnection,
    request: &CrudRequest,
    config: &ResourceConfig<E>,
) -> Result<bool, CrudError> {
    let op = Operation::Destroy;

    let Some(options) = target(request, config, op)? else {
        tracing::debug!(resource = %config.name, id = ?request.id(), "Id cannot match, nothing deleted");
        return Ok(true);
    };

    let result = E::delete_many()
        .filter(options.condition().clone())
        .exec(db)
        .await
        .map_err(|e| CrudError::backend(op, e))?;

    tracing::debug!(resource = %config.name, rows = result.rows_affected, "Deleted rows");
    Ok(true)
}
