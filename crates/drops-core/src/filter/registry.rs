//! # Filter Registry
//!
//! The table of named filters. Each [`FilterKey`] is a pure function from a
//! raw [`FilterValue`] to a [`FilterClause`].
//!
//! ## The Table
//! ```text
//! ┌──────────────────────┬──────────┬──────────────────────────────────────┐
//! │ key                  │ target   │ predicate                            │
//! ├──────────────────────┼──────────┼──────────────────────────────────────┤
//! │ brandId              │ style    │ brand = v  (OR over list)            │
//! │ categoryId           │ category │ id = v     (OR over list)            │
//! │ status               │ offer    │ status = v (OR over list)            │
//! │ shipping             │ offer    │ shipping = v (OR over list)          │
//! │ outdated             │ release  │ date < today AND date NOT NULL       │
//! │ coming               │ release  │ date >= today AND date NOT NULL      │
//! │ upcoming             │ release  │ 0 → date NOT NULL, else date NULL    │
//! │ min/maxPrice{EUR,..} │ release  │ price >= v / price <= v              │
//! │ fromDate / toDate    │ release  │ date >= v / date <= v                │
//! │ gender               │ release  │ gender = v OR ... OR gender = 'u'    │
//! │ color                │ release  │ color ~ v  (OR over list)            │
//! │ query                │ release  │ (∀tok name ~ tok) OR (∀tok sku ~ tok)│
//! └──────────────────────┴──────────┴──────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};

use crate::filter::predicate::{Column, FilterClause, Operator, Predicate, TargetEntity};
use crate::filter::FilterValue;
use crate::types::UNISEX_GENDER;
use crate::validation::{
    parse_date, parse_integer, parse_number, require_text, tokenize_query, ValidationResult,
};

// =============================================================================
// Filter Context
// =============================================================================

/// Inputs a filter may depend on besides its own value.
///
/// Carrying "today" here keeps every builder deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterContext {
    /// Current UTC date.
    pub today: NaiveDate,
}

impl FilterContext {
    /// Context for a fixed date.
    pub fn at(today: NaiveDate) -> Self {
        FilterContext { today }
    }

    /// Context for the current UTC date.
    pub fn now() -> Self {
        FilterContext::at(Utc::now().date_naive())
    }
}

// =============================================================================
// Filter Key
// =============================================================================

/// Every filter the release listing understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    BrandId,
    CategoryId,
    Status,
    Shipping,
    Outdated,
    Coming,
    Upcoming,
    MinPriceEur,
    MinPriceGbp,
    MinPriceUsd,
    MaxPriceEur,
    MaxPriceGbp,
    MaxPriceUsd,
    FromDate,
    ToDate,
    Gender,
    Color,
    Query,
}

impl FilterKey {
    /// All registered filters.
    pub const ALL: [FilterKey; 18] = [
        FilterKey::BrandId,
        FilterKey::CategoryId,
        FilterKey::Status,
        FilterKey::Shipping,
        FilterKey::Outdated,
        FilterKey::Coming,
        FilterKey::Upcoming,
        FilterKey::MinPriceEur,
        FilterKey::MinPriceGbp,
        FilterKey::MinPriceUsd,
        FilterKey::MaxPriceEur,
        FilterKey::MaxPriceGbp,
        FilterKey::MaxPriceUsd,
        FilterKey::FromDate,
        FilterKey::ToDate,
        FilterKey::Gender,
        FilterKey::Color,
        FilterKey::Query,
    ];

    /// The parameter name, as it appears in a query string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            FilterKey::BrandId => "brandId",
            FilterKey::CategoryId => "categoryId",
            FilterKey::Status => "status",
            FilterKey::Shipping => "shipping",
            FilterKey::Outdated => "outdated",
            FilterKey::Coming => "coming",
            FilterKey::Upcoming => "upcoming",
            FilterKey::MinPriceEur => "minPriceEUR",
            FilterKey::MinPriceGbp => "minPriceGBP",
            FilterKey::MinPriceUsd => "minPriceUSD",
            FilterKey::MaxPriceEur => "maxPriceEUR",
            FilterKey::MaxPriceGbp => "maxPriceGBP",
            FilterKey::MaxPriceUsd => "maxPriceUSD",
            FilterKey::FromDate => "fromDate",
            FilterKey::ToDate => "toDate",
            FilterKey::Gender => "gender",
            FilterKey::Color => "color",
            FilterKey::Query => "query",
        }
    }

    /// Looks up a parameter name. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<FilterKey> {
        FilterKey::ALL.into_iter().find(|key| key.as_str() == name)
    }

    /// The entity this filter's predicate applies to.
    pub const fn target(&self) -> TargetEntity {
        match self {
            FilterKey::BrandId => TargetEntity::Style,
            FilterKey::CategoryId => TargetEntity::Category,
            FilterKey::Status | FilterKey::Shipping => TargetEntity::Offer,
            _ => TargetEntity::Release,
        }
    }

    /// Builds this filter's clause from a raw value.
    ///
    /// ## Errors
    /// `ValidationError` for unparsable numbers or dates, empty text, empty
    /// lists, or several values given to a scalar filter.
    pub fn build(&self, value: &FilterValue, ctx: &FilterContext) -> ValidationResult<FilterClause> {
        let field = self.as_str();

        let predicate = match self {
            FilterKey::BrandId => any_equal(Column::StyleBrand, field, value)?,
            FilterKey::CategoryId => any_equal(Column::CategoryId, field, value)?,
            FilterKey::Status => any_equal(Column::OfferStatus, field, value)?,
            FilterKey::Shipping => any_equal(Column::OfferShipping, field, value)?,

            FilterKey::Outdated => scheduled(Operator::Lt, ctx.today),
            FilterKey::Coming => scheduled(Operator::Gte, ctx.today),
            FilterKey::Upcoming => {
                // Only an integer zero selects scheduled releases.
                let raw = value.single(field)?;
                match parse_integer(field, raw) {
                    Ok(0) => Predicate::IsNotNull(Column::ReleaseDate),
                    _ => Predicate::IsNull(Column::ReleaseDate),
                }
            }

            FilterKey::MinPriceEur => price_bound(Column::PriceEur, Operator::Gte, field, value)?,
            FilterKey::MinPriceGbp => price_bound(Column::PriceGbp, Operator::Gte, field, value)?,
            FilterKey::MinPriceUsd => price_bound(Column::PriceUsd, Operator::Gte, field, value)?,
            FilterKey::MaxPriceEur => price_bound(Column::PriceEur, Operator::Lte, field, value)?,
            FilterKey::MaxPriceGbp => price_bound(Column::PriceGbp, Operator::Lte, field, value)?,
            FilterKey::MaxPriceUsd => price_bound(Column::PriceUsd, Operator::Lte, field, value)?,

            FilterKey::FromDate => date_bound(Operator::Gte, field, value)?,
            FilterKey::ToDate => date_bound(Operator::Lte, field, value)?,

            FilterKey::Gender => {
                let mut genders: Vec<&str> = Vec::new();
                for raw in value.non_empty(field)? {
                    let gender = require_text(field, raw)?;
                    if !genders.contains(&gender) {
                        genders.push(gender);
                    }
                }
                if !genders.contains(&UNISEX_GENDER) {
                    genders.push(UNISEX_GENDER);
                }
                Predicate::Or(
                    genders
                        .into_iter()
                        .map(|g| Predicate::eq(Column::Gender, g))
                        .collect(),
                )
            }

            FilterKey::Color => {
                let colors = value
                    .non_empty(field)?
                    .into_iter()
                    .map(|raw| require_text(field, raw).map(|c| Predicate::contains(Column::Color, c)))
                    .collect::<ValidationResult<Vec<_>>>()?;
                Predicate::any(colors)
            }

            FilterKey::Query => {
                let tokens = tokenize_query(value.single(field)?)?;
                let every_token_in = |column: Column| {
                    Predicate::all(
                        tokens
                            .iter()
                            .map(|token| Predicate::contains(column, token.as_str()))
                            .collect(),
                    )
                };
                Predicate::Or(vec![every_token_in(Column::Name), every_token_in(Column::Sku)])
            }
        };

        Ok(FilterClause::new(self.target(), predicate))
    }
}

impl std::fmt::Display for FilterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Builders
// =============================================================================

/// Equality, or OR-of-equality for a list.
fn any_equal(column: Column, field: &str, value: &FilterValue) -> ValidationResult<Predicate> {
    let predicates = value
        .non_empty(field)?
        .into_iter()
        .map(|raw| require_text(field, raw).map(|v| Predicate::eq(column, v)))
        .collect::<ValidationResult<Vec<_>>>()?;

    Ok(Predicate::any(predicates))
}

/// Release date compared with `today`, excluding unscheduled releases.
fn scheduled(op: Operator, today: NaiveDate) -> Predicate {
    Predicate::And(vec![
        Predicate::compare(Column::ReleaseDate, op, today),
        Predicate::IsNotNull(Column::ReleaseDate),
    ])
}

fn price_bound(
    column: Column,
    op: Operator,
    field: &str,
    value: &FilterValue,
) -> ValidationResult<Predicate> {
    let price = parse_number(field, value.single(field)?)?;
    Ok(Predicate::compare(column, op, price))
}

fn date_bound(op: Operator, field: &str, value: &FilterValue) -> ValidationResult<Predicate> {
    let date = parse_date(field, value.single(field)?)?;
    Ok(Predicate::compare(Column::ReleaseDate, op, date))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::filter::Operand;

    fn ctx() -> FilterContext {
        FilterContext::at(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
    }

    fn build(key: FilterKey, value: impl Into<FilterValue>) -> ValidationResult<FilterClause> {
        key.build(&value.into(), &ctx())
    }

    #[test]
    fn test_parse_round_trips_every_key() {
        for key in FilterKey::ALL {
            assert_eq!(FilterKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(FilterKey::parse("minPriceUsd"), None);
        assert_eq!(FilterKey::parse("page"), None);
    }

    #[test]
    fn test_joined_targets() {
        assert_eq!(build(FilterKey::BrandId, "nike").unwrap().target, TargetEntity::Style);
        assert_eq!(build(FilterKey::CategoryId, "c1").unwrap().target, TargetEntity::Category);
        assert_eq!(build(FilterKey::Status, "live").unwrap().target, TargetEntity::Offer);
        assert_eq!(build(FilterKey::Shipping, "eu").unwrap().target, TargetEntity::Offer);
        assert_eq!(build(FilterKey::Color, "red").unwrap().target, TargetEntity::Release);
    }

    #[test]
    fn test_equality_single_and_list() {
        let clause = build(FilterKey::BrandId, "nike").unwrap();
        assert_eq!(clause.predicate, Predicate::eq(Column::StyleBrand, "nike"));

        let clause = build(FilterKey::Status, vec!["live", "closed"]).unwrap();
        assert_eq!(
            clause.predicate,
            Predicate::Or(vec![
                Predicate::eq(Column::OfferStatus, "live"),
                Predicate::eq(Column::OfferStatus, "closed"),
            ])
        );
    }

    #[test]
    fn test_outdated_and_coming_use_today() {
        let today = ctx().today;

        let outdated = build(FilterKey::Outdated, "1").unwrap().predicate;
        assert_eq!(
            outdated,
            Predicate::And(vec![
                Predicate::compare(Column::ReleaseDate, Operator::Lt, today),
                Predicate::IsNotNull(Column::ReleaseDate),
            ])
        );

        let coming = build(FilterKey::Coming, "true").unwrap().predicate;
        assert_eq!(
            coming,
            Predicate::And(vec![
                Predicate::compare(Column::ReleaseDate, Operator::Gte, today),
                Predicate::IsNotNull(Column::ReleaseDate),
            ])
        );
    }

    #[test]
    fn test_upcoming_zero_means_scheduled() {
        assert_eq!(
            build(FilterKey::Upcoming, "0").unwrap().predicate,
            Predicate::IsNotNull(Column::ReleaseDate)
        );
        assert_eq!(
            build(FilterKey::Upcoming, " 0 ").unwrap().predicate,
            Predicate::IsNotNull(Column::ReleaseDate)
        );
        for other in ["1", "true", "", "yes"] {
            assert_eq!(
                build(FilterKey::Upcoming, other).unwrap().predicate,
                Predicate::IsNull(Column::ReleaseDate),
                "upcoming={other}"
            );
        }
    }

    #[test]
    fn test_price_bounds() {
        assert_eq!(
            build(FilterKey::MinPriceUsd, "100").unwrap().predicate,
            Predicate::compare(Column::PriceUsd, Operator::Gte, 100.0)
        );
        assert_eq!(
            build(FilterKey::MaxPriceGbp, "89.99").unwrap().predicate,
            Predicate::compare(Column::PriceGbp, Operator::Lte, 89.99)
        );
        assert!(matches!(
            build(FilterKey::MinPriceEur, "cheap"),
            Err(ValidationError::InvalidNumber { ref field, .. }) if field == "minPriceEUR"
        ));
        assert!(matches!(
            build(FilterKey::MaxPriceEur, vec!["1", "2"]),
            Err(ValidationError::ExpectedSingleValue { .. })
        ));
    }

    #[test]
    fn test_date_bounds() {
        let clause = build(FilterKey::FromDate, "2024-01-01").unwrap();
        assert_eq!(
            clause.predicate,
            Predicate::compare(
                Column::ReleaseDate,
                Operator::Gte,
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
            )
        );
        assert!(matches!(
            build(FilterKey::ToDate, "next friday"),
            Err(ValidationError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_gender_always_includes_unisex() {
        let clause = build(FilterKey::Gender, "m").unwrap();
        assert_eq!(
            clause.predicate,
            Predicate::Or(vec![
                Predicate::eq(Column::Gender, "m"),
                Predicate::eq(Column::Gender, "u"),
            ])
        );

        let clause = build(FilterKey::Gender, vec!["u", "f", "f"]).unwrap();
        assert_eq!(
            clause.predicate,
            Predicate::Or(vec![
                Predicate::eq(Column::Gender, "u"),
                Predicate::eq(Column::Gender, "f"),
            ])
        );
    }

    #[test]
    fn test_color_is_substring_or() {
        let clause = build(FilterKey::Color, vec!["red", "black"]).unwrap();
        assert_eq!(
            clause.predicate,
            Predicate::Or(vec![
                Predicate::contains(Column::Color, "red"),
                Predicate::contains(Column::Color, "black"),
            ])
        );
        assert!(build(FilterKey::Color, vec![" "]).is_err());
    }

    #[test]
    fn test_query_matches_all_tokens_per_column() {
        let clause = build(FilterKey::Query, "air  max").unwrap();
        let expected = Predicate::Or(vec![
            Predicate::And(vec![
                Predicate::contains(Column::Name, "air"),
                Predicate::contains(Column::Name, "max"),
            ]),
            Predicate::And(vec![
                Predicate::contains(Column::Sku, "air"),
                Predicate::contains(Column::Sku, "max"),
            ]),
        ]);
        assert_eq!(clause.predicate, expected);

        let single = build(FilterKey::Query, "dunk").unwrap().predicate;
        assert_eq!(
            single,
            Predicate::Or(vec![
                Predicate::contains(Column::Name, "dunk"),
                Predicate::contains(Column::Sku, "dunk"),
            ])
        );

        assert!(matches!(
            build(FilterKey::Query, "   "),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_empty_list_rejected() {
        assert!(matches!(
            build(FilterKey::Shipping, FilterValue::List(Vec::new())),
            Err(ValidationError::EmptyList { .. })
        ));
    }

    #[test]
    fn test_operands_are_typed() {
        let clause = build(FilterKey::ToDate, "2024-02-29").unwrap();
        match clause.predicate {
            Predicate::Compare { value: Operand::Date(d), .. } => {
                assert_eq!(d, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
            }
            other => panic!("unexpected predicate: {other:?}"),
        }
    }
}
