use sea_orm::{EntityTrait, IdenStatic, sea_query::Order};
use serde_json::Value;

use crate::core::query::{Capability, QueryComposer, QueryOptions};
use crate::core::request::CrudRequest;
use crate::validation::ValidationErrors;

const DEFAULT_SORT_ORDER: &str = "ASC";

/// Parse sort column and order from JSON array format (`["title", "DESC"]`)
fn parse_json_sort(json: &str) -> Option<(String, String)> {
    let sort_vec: Vec<String> = serde_json::from_str(json).ok()?;
    let column = sort_vec.first()?.clone();
    let order = sort_vec
        .get(1)
        .cloned()
        .unwrap_or_else(|| DEFAULT_SORT_ORDER.to_owned());
    Some((column, order))
}

/// Anything but a case-insensitive `desc` sorts ascending
fn parse_order(sort_order: &str) -> Order {
    if sort_order.trim().eq_ignore_ascii_case("DESC") {
        Order::Desc
    } else {
        Order::Asc
    }
}

fn text(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}

/// Requested (column name, direction), supporting both `sort=title&order=desc`
/// and the React Admin `sort=["title","DESC"]` form.
fn requested_sort(request: &CrudRequest) -> Option<(String, String)> {
    let order = || {
        request
            .query
            .get("order")
            .and_then(text)
            .unwrap_or(DEFAULT_SORT_ORDER)
            .to_owned()
    };
    let sort = request
        .query
        .get("sort")
        .or_else(|| request.query.get("sort_by"))
        .and_then(text)?;

    if sort.starts_with('[') {
        parse_json_sort(sort)
    } else {
        Some((sort.to_owned(), order()))
    }
}

/// Orders list results by a whitelisted column, always finishing with the id
/// column so page boundaries are stable.
pub struct SortComposer<'a, E: EntityTrait> {
    columns: &'a [(String, E::Column)],
    id_column: E::Column,
}

impl<'a, E: EntityTrait> SortComposer<'a, E> {
    #[must_use]
    pub const fn new(columns: &'a [(String, E::Column)], id_column: E::Column) -> Self {
        Self { columns, id_column }
    }

    /// Find column by name; unknown names fall back to the id column ascending.
    #[must_use]
    pub fn resolve(&self, request: &CrudRequest) -> (E::Column, Order) {
        requested_sort(request)
            .and_then(|(name, order)| {
                self.columns
                    .iter()
                    .find(|(col_name, _)| *col_name == name)
                    .map(|&(_, column)| (column, parse_order(&order)))
            })
            .unwrap_or((self.id_column, Order::Asc))
    }
}

impl<E: EntityTrait> QueryComposer<E> for SortComposer<'_, E> {
    fn capability(&self) -> Capability {
        Capability::Sort
    }

    fn compose(
        &self,
        request: &CrudRequest,
        options: QueryOptions<E>,
    ) -> Result<QueryOptions<E>, ValidationErrors> {
        let (column, order) = self.resolve(request);
        let is_id = column.as_str() == self.id_column.as_str();
        let options = options.order_by(column, order);
        Ok(if is_id {
            options
        } else {
            options.order_by(self.id_column, Order::Asc)
        })
    }
}
