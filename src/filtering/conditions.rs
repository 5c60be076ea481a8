use sea_orm::{ColumnTrait, EntityTrait};
use serde_json::Value;

use crate::core::query::{Capability, QueryComposer, QueryOptions};
use crate::core::request::CrudRequest;
use crate::validation::{ValidationError, ValidationErrors};
use crate::values::column_value;

// Basic safety limit
const MAX_FIELD_VALUE_LENGTH: usize = 10_000;

/// How a filter value is compared against its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// `column = value`, with the value coerced to the column type
    Exact,
    /// `column LIKE '%value%'`
    Contains,
}

/// A request key that narrows list results.
pub struct FilterField<E: EntityTrait> {
    pub name: String,
    pub column: E::Column,
    pub mode: FilterMode,
}

impl<E: EntityTrait> FilterField<E> {
    pub fn new(name: impl Into<String>, column: E::Column, mode: FilterMode) -> Self {
        Self {
            name: name.into(),
            column,
            mode,
        }
    }
}

impl<E: EntityTrait> Clone for FilterField<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            column: self.column,
            mode: self.mode,
        }
    }
}

/// Textual form of a filter value; `None` for values that filter nothing.
fn filter_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
        other => Some(other.to_string()),
    }
}

/// Adds one predicate per configured filter present in the request.
pub struct FilterComposer<'a, E: EntityTrait> {
    fields: &'a [FilterField<E>],
}

impl<'a, E: EntityTrait> FilterComposer<'a, E> {
    #[must_use]
    pub const fn new(fields: &'a [FilterField<E>]) -> Self {
        Self { fields }
    }
}

impl<E: EntityTrait> QueryComposer<E> for FilterComposer<'_, E> {
    fn capability(&self) -> Capability {
        Capability::Filter
    }

    fn compose(
        &self,
        request: &CrudRequest,
        mut options: QueryOptions<E>,
    ) -> Result<QueryOptions<E>, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        for field in self.fields {
            let Some(text) = request.lookup(&field.name).and_then(filter_text) else {
                continue;
            };
            if text.len() > MAX_FIELD_VALUE_LENGTH {
                errors.add(ValidationError::new(field.name.as_str(), "Value is too long"));
                continue;
            }

            match field.mode {
                FilterMode::Exact => match column_value(&field.column, &Value::String(text)) {
                    Ok(value) => options = options.filter(field.column.eq(value)),
                    Err(e) => errors.add(ValidationError::new(field.name.as_str(), e.message)),
                },
                FilterMode::Contains => options = options.filter(field.column.contains(text)),
            }
        }

        errors.result().map(|()| options)
    }
}
