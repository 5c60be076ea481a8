use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::filtering::Pagination;

/// One page of list results.
///
/// `data` holds plain JSON copies of the fetched rows, detached from the ORM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListResponse {
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<serde_json::Value>,
    pub pagination: Pagination,
}
