//! Batch scoping: a request-derived constraint (owner, tenant, parent id)
//! applied to every query a resource runs and stamped onto every row it
//! creates, so one caller's rows are invisible to another.

use sea_orm::{ColumnTrait, EntityTrait};

use crate::core::query::{Capability, QueryComposer, QueryOptions};
use crate::core::request::CrudRequest;
use crate::validation::{ValidationError, ValidationErrors};
use crate::values::column_value;

pub struct BatchScope<E: EntityTrait> {
    /// Request key, looked up in path params first, then the query string
    pub key: String,
    pub column: E::Column,
    /// Fail instead of running unscoped when the key is missing
    pub required: bool,
}

impl<E: EntityTrait> Clone for BatchScope<E> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            column: self.column,
            required: self.required,
        }
    }
}

impl<E: EntityTrait> BatchScope<E> {
    pub fn new(key: impl Into<String>, column: E::Column) -> Self {
        Self {
            key: key.into(),
            column,
            required: false,
        }
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// The scope value carried by `request`, coerced to the column type.
    ///
    /// # Errors
    ///
    /// Fails when the value does not fit the column, or when it is missing and
    /// the scope is required.
    pub fn value(&self, request: &CrudRequest) -> Result<Option<sea_orm::Value>, ValidationError> {
        match request.lookup(&self.key).filter(|v| !v.is_null()) {
            Some(raw) => column_value(&self.column, raw)
                .map(Some)
                .map_err(|e| ValidationError::new(self.key.as_str(), e.message)),
            None if self.required => {
                Err(ValidationError::new(self.key.as_str(), "This field is required"))
            }
            None => Ok(None),
        }
    }
}

impl<E: EntityTrait> QueryComposer<E> for BatchScope<E> {
    fn capability(&self) -> Capability {
        Capability::Batch
    }

    fn compose(
        &self,
        request: &CrudRequest,
        options: QueryOptions<E>,
    ) -> Result<QueryOptions<E>, ValidationErrors> {
        Ok(match self.value(request)? {
            Some(value) => options.filter(self.column.eq(value)),
            None => options,
        })
    }
}
