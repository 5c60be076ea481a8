// Request model, resource configuration, query accumulation and the five
// CRUD operations built on top of them.

pub mod config;
pub mod crud_operations;
pub mod query;
pub mod request;
pub mod traits;

// Re-export commonly used items
pub use config::{PaginationConfig, ResourceConfig};
pub use crud_operations::{create, destroy, get, list, merge_into_active_model, update};
pub use query::{Capability, PageRequest, QueryBuilder, QueryComposer, QueryOptions};
pub use request::CrudRequest;
pub use traits::CrudEntity;
