//! # Release Query Composition
//!
//! Turns a [`FilterParams`] into a [`ReleaseQuery`]: an explicit value the
//! database layer translates into SQL at its boundary.
//!
//! ## Composition
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      compose(params, ctx)                               │
//! │                                                                         │
//! │  for (key, value) in params:                                           │
//! │       │                                                                 │
//! │       ├── FilterKey::parse(key) == None  → skip (unknown key)          │
//! │       │                                                                 │
//! │       └── Some(filter) → filter.build(value, ctx)?                     │
//! │                              │                                          │
//! │                              ├── Ok(clause) → clauses.push(clause)     │
//! │                              └── Err(e)     → abort, nothing executed  │
//! │                                                                         │
//! │  ReleaseQuery {                                                        │
//! │      clauses,                 ← ANDed together                         │
//! │      includes: images, style (+ category), offers                      │
//! │      distinct: true,          ← offer joins must not multiply rows     │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::filter::{
    Column, FilterClause, FilterContext, FilterKey, FilterParams, Operator, Predicate,
    TargetEntity,
};
use crate::validation::ValidationResult;

// =============================================================================
// Includes & Ordering
// =============================================================================

/// An association eager-loaded with each release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Include {
    /// All images of the release.
    Images,
    /// The style's id and brand, with its category.
    Style,
    /// Status, raffle flag and shipping of every offer.
    Offers,
}

impl Include {
    /// The associations a release listing loads.
    pub const DEFAULT: [Include; 3] = [
        Include::Images,
        Include::Style,
        Include::Offers,
    ];
}

/// Result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Latest release date first, unscheduled releases last, then by name.
    #[default]
    NewestFirst,
    /// Earliest release date first, unscheduled releases last, then by name.
    OldestFirst,
}

// =============================================================================
// Release Query
// =============================================================================

/// A composed query against the release entity.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseQuery {
    /// Active filter clauses, combined with AND.
    pub clauses: Vec<FilterClause>,
    /// Associations to eager-load.
    pub includes: Vec<Include>,
    /// Collapse rows multiplied by one-to-many joins.
    pub distinct: bool,
    pub order: SortOrder,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl Default for ReleaseQuery {
    fn default() -> Self {
        ReleaseQuery::unfiltered()
    }
}

impl ReleaseQuery {
    /// Every release, with the default eager loads.
    pub fn unfiltered() -> Self {
        ReleaseQuery {
            clauses: Vec::new(),
            includes: Include::DEFAULT.to_vec(),
            distinct: true,
            order: SortOrder::default(),
            limit: None,
            offset: None,
        }
    }

    /// A single release by id.
    pub fn by_id(id: &str) -> Self {
        ReleaseQuery::unfiltered().with_clause(FilterClause::on_release(Predicate::eq(
            Column::ReleaseId,
            id,
        )))
    }

    /// Releases dated strictly before `cutoff`, without associations.
    pub fn released_before(cutoff: NaiveDate) -> Self {
        let mut query = ReleaseQuery::unfiltered()
            .with_clause(FilterClause::on_release(Predicate::compare(
                Column::ReleaseDate,
                Operator::Lt,
                cutoff,
            )))
            .without_includes();
        query.order = SortOrder::OldestFirst;
        query
    }

    /// Releases whose slug starts with `prefix`, case-sensitively, without
    /// associations.
    pub fn slug_prefix(prefix: &str) -> Self {
        ReleaseQuery::unfiltered()
            .with_clause(FilterClause::on_release(Predicate::starts_with(
                Column::Slug,
                prefix,
            )))
            .without_includes()
    }

    pub fn with_clause(mut self, clause: FilterClause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn without_includes(mut self) -> Self {
        self.includes.clear();
        self
    }

    pub fn with_page(mut self, limit: u32, offset: u32) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }

    pub fn includes(&self, include: Include) -> bool {
        self.includes.contains(&include)
    }

    /// Entities that must be joined to evaluate the clauses.
    ///
    /// A category join implies the style join it goes through.
    pub fn joins(&self) -> BTreeSet<TargetEntity> {
        let mut joins = BTreeSet::new();

        for clause in &self.clauses {
            let entities = std::iter::once(clause.target)
                .chain(clause.predicate.columns().into_iter().map(|c| c.entity()));
            for entity in entities {
                if entity == TargetEntity::Release {
                    continue;
                }
                if entity == TargetEntity::Category {
                    joins.insert(TargetEntity::Style);
                }
                joins.insert(entity);
            }
        }

        joins
    }

    /// Whether the joins can produce duplicate release rows.
    pub fn needs_distinct(&self) -> bool {
        self.distinct && self.joins().iter().any(TargetEntity::is_one_to_many)
    }
}

// =============================================================================
// Composer
// =============================================================================

/// Composes the release query for a set of filter parameters.
///
/// ## Rules
/// - Keys without a registered filter are ignored
/// - Each registered key adds one clause; clauses are ANDed
/// - The first failing filter aborts composition
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use drops_core::filter::{FilterContext, FilterParams};
/// use drops_core::query::compose;
///
/// let params = FilterParams::new()
///     .with("gender", "m")
///     .with("page", "2");
/// let ctx = FilterContext::at(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
///
/// let query = compose(&params, &ctx).unwrap();
/// assert_eq!(query.clauses.len(), 1);
/// ```
pub fn compose(params: &FilterParams, ctx: &FilterContext) -> ValidationResult<ReleaseQuery> {
    let mut query = ReleaseQuery::unfiltered();

    for (name, value) in params.iter() {
        let Some(key) = FilterKey::parse(name) else {
            continue;
        };
        query.clauses.push(key.build(value, ctx)?);
    }

    Ok(query)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    fn ctx() -> FilterContext {
        FilterContext::at(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
    }

    #[test]
    fn test_no_filters_is_unrestricted() {
        let query = compose(&FilterParams::new(), &ctx()).unwrap();
        assert!(query.clauses.is_empty());
        assert!(query.joins().is_empty());
        assert_eq!(query.includes, Include::DEFAULT.to_vec());
        assert!(query.distinct);
    }

    #[test]
    fn test_unknown_keys_do_not_change_query() {
        let baseline = compose(&FilterParams::new().with("gender", "f"), &ctx()).unwrap();
        let noisy = compose(
            &FilterParams::new()
                .with("gender", "f")
                .with("page", "3")
                .with("sort", "price")
                .with("minPriceUsd", "oops"),
            &ctx(),
        )
        .unwrap();
        assert_eq!(baseline, noisy);
    }

    #[test]
    fn test_each_key_adds_a_clause() {
        let params = FilterParams::new()
            .with("gender", "m")
            .with("minPriceUSD", "100")
            .with("maxPriceUSD", "100")
            .with("status", vec!["live", "closed"]);
        let query = compose(&params, &ctx()).unwrap();
        assert_eq!(query.clauses.len(), 4);
    }

    #[test]
    fn test_failure_aborts_composition() {
        let params = FilterParams::new()
            .with("gender", "m")
            .with("fromDate", "yesterday");
        assert!(matches!(
            compose(&params, &ctx()),
            Err(ValidationError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_joins_follow_clause_targets() {
        let query = compose(&FilterParams::new().with("categoryId", "c1"), &ctx()).unwrap();
        let joins: Vec<_> = query.joins().into_iter().collect();
        assert_eq!(joins, vec![TargetEntity::Style, TargetEntity::Category]);
        assert!(!query.needs_distinct());

        let query = compose(&FilterParams::new().with("shipping", "eu"), &ctx()).unwrap();
        assert!(query.joins().contains(&TargetEntity::Offer));
        assert!(query.needs_distinct());
    }

    #[test]
    fn test_by_id_and_released_before() {
        let query = ReleaseQuery::by_id("abc");
        assert_eq!(query.clauses.len(), 1);
        assert!(query.includes(Include::Style));

        let cutoff = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let query = ReleaseQuery::released_before(cutoff);
        assert!(query.includes.is_empty());
        assert!(!query.includes(Include::Style));
        assert_eq!(query.order, SortOrder::OldestFirst);
        assert_eq!(
            query.clauses[0].predicate,
            Predicate::compare(Column::ReleaseDate, Operator::Lt, cutoff)
        );
    }

    #[test]
    fn test_slug_prefix() {
        let query = ReleaseQuery::slug_prefix("AJ1");
        assert!(query.includes.is_empty());
        assert!(query.joins().is_empty());
        assert_eq!(
            query.clauses[0].predicate,
            Predicate::starts_with(Column::Slug, "AJ1")
        );
    }

    #[test]
    fn test_with_page() {
        let query = ReleaseQuery::unfiltered().with_page(20, 40);
        assert_eq!(query.limit, Some(20));
        assert_eq!(query.offset, Some(40));
    }
}
