use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};

use crate::filtering::{BatchScope, FilterField, FilterMode};
use crate::selector::{FieldSpec, SelectionSchema};

const fn default_limit() -> u64 {
    10
}

const fn default_max_limit() -> u64 {
    1000
}

/// Page size bounds for list requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_limit")]
    pub default_limit: u64,
    #[serde(default = "default_max_limit")]
    pub max_limit: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

impl PaginationConfig {
    /// `(default, max)` page sizes, with `max` at least 1 and the default
    /// clamped into `1..=max`.
    #[must_use]
    pub fn limits(&self) -> (u64, u64) {
        let max = self.max_limit.max(1);
        (self.default_limit.clamp(1, max), max)
    }

    /// Selector fields for the `limit` and `page` query keys.
    #[must_use]
    pub fn schema(&self) -> SelectionSchema {
        let (default, max) = self.limits();
        SelectionSchema::new()
            .field("limit", FieldSpec::limit(default, max))
            .field("page", FieldSpec::page())
    }
}

/// Everything the operations need to know about one resource.
///
/// ```rust,ignore
/// let config = ResourceConfig::<todo::Entity>::new("todo", todo::Column::Id)
///     .definitions(
///         SelectionSchema::new()
///             .field("title", FieldSpec::string().required())
///             .field("completed", FieldSpec::boolean().default_value(false)),
///     )
///     .filter("completed", todo::Column::Completed)
///     .search("title", todo::Column::Title)
///     .sortable("title", todo::Column::Title)
///     .batch(BatchScope::new("owner", todo::Column::Owner).required());
/// ```
pub struct ResourceConfig<E: EntityTrait> {
    pub name: String,
    pub plural: String,
    pub id_column: E::Column,
    /// Writable fields accepted by create and update.
    pub definitions: SelectionSchema,
    pub filters: Vec<FilterField<E>>,
    pub batch: Option<BatchScope<E>>,
    pub sortable: Vec<(String, E::Column)>,
    pub pagination: PaginationConfig,
}

impl<E: EntityTrait> ResourceConfig<E> {
    /// `plural` defaults to `name` with an `s` appended.
    pub fn new(name: impl Into<String>, id_column: E::Column) -> Self {
        let name = name.into();
        Self {
            plural: format!("{name}s"),
            name,
            id_column,
            definitions: SelectionSchema::new(),
            filters: Vec::new(),
            batch: None,
            sortable: Vec::new(),
            pagination: PaginationConfig::default(),
        }
    }

    #[must_use]
    pub fn plural(mut self, plural: impl Into<String>) -> Self {
        self.plural = plural.into();
        self
    }

    #[must_use]
    pub fn definitions(mut self, definitions: SelectionSchema) -> Self {
        self.definitions = definitions;
        self
    }

    /// Exact-match filter on `column`, read from the request key `name`.
    #[must_use]
    pub fn filter(mut self, name: impl Into<String>, column: E::Column) -> Self {
        self.filters.push(FilterField::new(name, column, FilterMode::Exact));
        self
    }

    /// Substring filter on `column`, read from the request key `name`.
    #[must_use]
    pub fn search(mut self, name: impl Into<String>, column: E::Column) -> Self {
        self.filters.push(FilterField::new(name, column, FilterMode::Contains));
        self
    }

    #[must_use]
    pub fn batch(mut self, scope: BatchScope<E>) -> Self {
        self.batch = Some(scope);
        self
    }

    #[must_use]
    pub fn sortable(mut self, name: impl Into<String>, column: E::Column) -> Self {
        self.sortable.push((name.into(), column));
        self
    }

    #[must_use]
    pub const fn pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = pagination;
        self
    }
}
