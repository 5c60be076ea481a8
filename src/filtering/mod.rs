//! # Query Composers
//!
//! Request-to-query translation, one concern per module. Each composer reads
//! the request and folds its predicates or ordering into a
//! [`QueryOptions`](crate::core::query::QueryOptions) accumulator.
//!
//! ## Query Parameter Examples
//!
//! ```text
//! GET /todos?completed=true              exact filter
//! GET /todos?q=milk                      substring filter
//! GET /todos?sort=priority&order=desc    ordering
//! GET /todos?sort=["title","DESC"]       ordering, React Admin form
//! GET /todos?limit=25&page=2             pagination
//! GET /users/7/todos                     batch scope from a path parameter
//! ```

pub mod conditions;
pub mod pagination;
pub mod scope;
pub mod sort;

// Re-export commonly used items
pub use conditions::{FilterComposer, FilterField, FilterMode};
pub use pagination::{Pagination, PaginationComposer, calculate_content_range, paginate};
pub use scope::BatchScope;
pub use sort::SortComposer;
