use axum::http::header::{CONTENT_RANGE, HeaderMap, HeaderValue};
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::config::PaginationConfig;
use crate::core::query::{Capability, PageRequest, QueryComposer, QueryOptions};
use crate::core::request::CrudRequest;
use crate::validation::{ValidationError, ValidationErrors};

/// Page metadata returned alongside list results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Pagination {
    /// Total rows matching the filters, across all pages
    pub count: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Compute page metadata from a total count and the requested page.
///
/// `limit` of zero is treated as one so the page count stays defined.
#[must_use]
pub fn paginate(count: u64, page: u64, limit: u64) -> Pagination {
    let limit = limit.max(1);
    let page = page.max(1);
    let total_pages = count.div_ceil(limit);
    Pagination {
        count,
        page,
        limit,
        total_pages,
        has_next: page < total_pages,
        has_previous: page > 1,
    }
}

/// Sanitize resource name by removing control characters for HTTP headers
fn sanitize_resource_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .collect()
}

/// Calculate the `Content-Range` header for a page of results.
///
/// Produces `<resource> <first>-<last>/<total>` with zero-based inclusive
/// bounds, e.g. `todos 0-9/25`. A page starting past the last row renders an
/// unsatisfied range, `todos */25`. The resource name is sanitized so it can
/// never break out of the header.
#[must_use]
pub fn calculate_content_range(
    offset: u64,
    limit: u64,
    total_count: u64,
    resource_name: &str,
) -> HeaderMap {
    let range = if total_count == 0 {
        "0-0".to_owned()
    } else if offset >= total_count {
        "*".to_owned()
    } else {
        let last = offset
            .saturating_add(limit.max(1))
            .saturating_sub(1)
            .min(total_count - 1);
        format!("{offset}-{last}")
    };

    let safe_name = sanitize_resource_name(resource_name);
    let content_range = format!("{safe_name} {range}/{total_count}");

    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(&content_range).unwrap_or_else(|_| {
        HeaderValue::from_static("items 0-0/0")
    });
    headers.insert(CONTENT_RANGE, value);
    headers
}

/// Validates `limit`/`page` from the query string and pages the query.
pub struct PaginationComposer {
    config: PaginationConfig,
}

impl PaginationComposer {
    #[must_use]
    pub const fn new(config: PaginationConfig) -> Self {
        Self { config }
    }

    /// The validated page request carried by `request`.
    ///
    /// # Errors
    ///
    /// Reports `limit` or `page` when they are not integers within bounds, and
    /// `page` when its offset does not fit a signed 64-bit SQL integer.
    pub fn page_request(&self, request: &CrudRequest) -> Result<PageRequest, ValidationErrors> {
        let input = serde_json::Value::Object(request.query.clone());
        let picked = self.config.schema().select(&input)?;

        let number = |key: &str| {
            picked
                .get(key)
                .and_then(serde_json::Value::as_u64)
                .ok_or_else(|| ValidationError::new(key, "Must be a positive integer"))
        };
        let page = PageRequest::new(number("page")?, number("limit")?);

        let offset = page
            .page
            .saturating_sub(1)
            .checked_mul(page.limit)
            .filter(|offset| i64::try_from(*offset).is_ok());
        if offset.is_none() {
            return Err(ValidationError::new("page", "Page is out of range").into());
        }
        Ok(page)
    }
}

impl<E: EntityTrait> QueryComposer<E> for PaginationComposer {
    fn capability(&self) -> Capability {
        Capability::Pagination
    }

    fn compose(
        &self,
        request: &CrudRequest,
        options: QueryOptions<E>,
    ) -> Result<QueryOptions<E>, ValidationErrors> {
        Ok(options.paginate(self.page_request(request)?))
    }
}
