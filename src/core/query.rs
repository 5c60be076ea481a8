//! Query option accumulation.
//!
//! Every concern that shapes an ORM query (filters, batch scoping, ordering,
//! pagination) is a [`QueryComposer`]: a pure transformation from one
//! [`QueryOptions`] to the next. A [`QueryBuilder`] folds the registered
//! composers over an accumulator in [`Capability`] order, so registration order
//! never changes the resulting query.

use sea_orm::{
    Condition, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect, Select,
    sea_query::IntoCondition,
};

use crate::core::request::CrudRequest;
use crate::validation::ValidationErrors;

/// The concern a composer contributes. Composers run in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    Filter,
    Batch,
    Sort,
    Pagination,
}

/// Validated page request (1-based page number and page size).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    #[must_use]
    pub const fn new(page: u64, limit: u64) -> Self {
        Self { page, limit }
    }

    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// Accumulator handed from composer to composer.
#[derive(Debug)]
pub struct QueryOptions<E: EntityTrait> {
    condition: Condition,
    order: Vec<(E::Column, Order)>,
    page: Option<PageRequest>,
    applied: Vec<Capability>,
}

impl<E: EntityTrait> Default for QueryOptions<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntityTrait> Clone for QueryOptions<E> {
    fn clone(&self) -> Self {
        Self {
            condition: self.condition.clone(),
            order: self.order.clone(),
            page: self.page,
            applied: self.applied.clone(),
        }
    }
}

impl<E: EntityTrait> QueryOptions<E> {
    /// Options matching every row, unordered and unpaginated.
    #[must_use]
    pub fn new() -> Self {
        Self {
            condition: Condition::all(),
            order: Vec::new(),
            page: None,
            applied: Vec::new(),
        }
    }

    /// AND another predicate into the `where` condition.
    #[must_use]
    pub fn filter<F: IntoCondition>(mut self, predicate: F) -> Self {
        self.condition = self.condition.add(predicate.into_condition());
        self
    }

    #[must_use]
    pub fn order_by(mut self, column: E::Column, order: Order) -> Self {
        self.order.push((column, order));
        self
    }

    #[must_use]
    pub const fn paginate(mut self, page: PageRequest) -> Self {
        self.page = Some(page);
        self
    }

    /// The `where` condition; `Condition::all()` with no predicates when nothing
    /// was added.
    #[must_use]
    pub const fn condition(&self) -> &Condition {
        &self.condition
    }

    #[must_use]
    pub fn order(&self) -> &[(E::Column, Order)] {
        &self.order
    }

    #[must_use]
    pub const fn page(&self) -> Option<PageRequest> {
        self.page
    }

    /// Capabilities applied so far, in application order.
    #[must_use]
    pub fn applied(&self) -> &[Capability] {
        &self.applied
    }

    #[must_use]
    pub fn has_applied(&self, capability: Capability) -> bool {
        self.applied.contains(&capability)
    }

    fn mark(&mut self, capability: Capability) {
        if !self.has_applied(capability) {
            self.applied.push(capability);
        }
    }

    /// The fetch query: condition, ordering, limit and offset.
    #[must_use]
    pub fn select(&self) -> Select<E> {
        let mut select = self.count_select();
        for (column, order) in &self.order {
            select = select.order_by(*column, order.clone());
        }
        if let Some(page) = self.page {
            select = select.limit(page.limit).offset(page.offset());
        }
        select
    }

    /// The count query: condition only, and no `WHERE` clause when it is empty.
    #[must_use]
    pub fn count_select(&self) -> Select<E> {
        if self.condition.is_empty() {
            E::find()
        } else {
            E::find().filter(self.condition.clone())
        }
    }
}

/// One independent query concern.
pub trait QueryComposer<E: EntityTrait>: Send + Sync {
    fn capability(&self) -> Capability;

    /// Fold this concern into `options`.
    ///
    /// # Errors
    ///
    /// Returns the offending request keys when the request carries values this
    /// composer cannot use.
    fn compose(
        &self,
        request: &CrudRequest,
        options: QueryOptions<E>,
    ) -> Result<QueryOptions<E>, ValidationErrors>;
}

/// Ordered pipeline of composers.
pub struct QueryBuilder<'a, E: EntityTrait> {
    composers: Vec<&'a dyn QueryComposer<E>>,
}

impl<E: EntityTrait> Default for QueryBuilder<'_, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, E: EntityTrait> QueryBuilder<'a, E> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            composers: Vec::new(),
        }
    }

    /// Register a composer. Composers sharing a capability keep their
    /// registration order relative to each other.
    #[must_use]
    pub fn with(mut self, composer: &'a dyn QueryComposer<E>) -> Self {
        let at = self
            .composers
            .partition_point(|c| c.capability() <= composer.capability());
        self.composers.insert(at, composer);
        self
    }

    /// Register a composer only when one is present.
    #[must_use]
    pub fn with_optional(self, composer: Option<&'a dyn QueryComposer<E>>) -> Self {
        match composer {
            Some(composer) => self.with(composer),
            None => self,
        }
    }

    #[must_use]
    pub fn capabilities(&self) -> Vec<Capability> {
        self.composers.iter().map(|c| c.capability()).collect()
    }

    /// Apply every composer to fresh options.
    ///
    /// # Errors
    ///
    /// Propagates the first composer failure.
    pub fn build(&self, request: &CrudRequest) -> Result<QueryOptions<E>, ValidationErrors> {
        self.apply(request, QueryOptions::new())
    }

    /// Apply every composer to `options`.
    ///
    /// # Errors
    ///
    /// Propagates the first composer failure.
    pub fn apply(
        &self,
        request: &CrudRequest,
        options: QueryOptions<E>,
    ) -> Result<QueryOptions<E>, ValidationErrors> {
        self.composers.iter().try_fold(options, |acc, composer| {
            let mut next = composer.compose(request, acc)?;
            next.mark(composer.capability());
            Ok(next)
        })
    }
}
