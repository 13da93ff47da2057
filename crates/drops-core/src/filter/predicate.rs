//! # Predicates
//!
//! Backend-agnostic description of a filter condition.
//!
//! A predicate names columns through the [`Column`] enum rather than raw
//! strings. The SQL layer renders only known identifiers; operands are
//! always bound parameters.

use chrono::NaiveDate;

// =============================================================================
// Target Entity
// =============================================================================

/// The entity a filter clause applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TargetEntity {
    /// The release row itself.
    Release,
    /// The release's style (joined).
    Style,
    /// The style's category (joined through style).
    Category,
    /// The release's offers (joined, one-to-many).
    Offer,
}

impl TargetEntity {
    /// Table alias used when the entity takes part in a release query.
    pub const fn alias(&self) -> &'static str {
        match self {
            TargetEntity::Release => "r",
            TargetEntity::Style => "s",
            TargetEntity::Category => "c",
            TargetEntity::Offer => "o",
        }
    }

    /// Joining this entity may yield several rows per release.
    pub const fn is_one_to_many(&self) -> bool {
        matches!(self, TargetEntity::Offer)
    }
}

// =============================================================================
// Column
// =============================================================================

/// A filterable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    ReleaseId,
    Slug,
    Name,
    Sku,
    Gender,
    Color,
    ReleaseDate,
    PriceEur,
    PriceGbp,
    PriceUsd,
    StyleBrand,
    CategoryId,
    OfferStatus,
    OfferShipping,
}

impl Column {
    /// The entity owning this column.
    pub const fn entity(&self) -> TargetEntity {
        match self {
            Column::StyleBrand => TargetEntity::Style,
            Column::CategoryId => TargetEntity::Category,
            Column::OfferStatus | Column::OfferShipping => TargetEntity::Offer,
            _ => TargetEntity::Release,
        }
    }

    /// Column name within its table.
    pub const fn name(&self) -> &'static str {
        match self {
            Column::ReleaseId | Column::CategoryId => "id",
            Column::Slug => "slug",
            Column::Name => "name",
            Column::Sku => "sku",
            Column::Gender => "gender",
            Column::Color => "color",
            Column::ReleaseDate => "release_date",
            Column::PriceEur => "price_eur",
            Column::PriceGbp => "price_gbp",
            Column::PriceUsd => "price_usd",
            Column::StyleBrand => "brand",
            Column::OfferStatus => "status",
            Column::OfferShipping => "shipping",
        }
    }

    /// `alias.name`, e.g. `r.price_usd`.
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.entity().alias(), self.name())
    }
}

// =============================================================================
// Operator / Operand
// =============================================================================

/// Comparison operator of a [`Predicate::Compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Lt,
    Lte,
    Gte,
    /// Substring match.
    Contains,
    /// Prefix match, case-sensitive.
    StartsWith,
}

/// A typed operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl From<&str> for Operand {
    fn from(value: &str) -> Self {
        Operand::Text(value.to_string())
    }
}

impl From<String> for Operand {
    fn from(value: String) -> Self {
        Operand::Text(value)
    }
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Operand::Number(value)
    }
}

impl From<NaiveDate> for Operand {
    fn from(value: NaiveDate) -> Self {
        Operand::Date(value)
    }
}

// =============================================================================
// Predicate
// =============================================================================

/// A boolean condition over release query columns.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        column: Column,
        op: Operator,
        value: Operand,
    },
    IsNull(Column),
    IsNotNull(Column),
    /// All must hold. An empty list is true.
    And(Vec<Predicate>),
    /// At least one must hold. An empty list is false.
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn compare(column: Column, op: Operator, value: impl Into<Operand>) -> Self {
        Predicate::Compare {
            column,
            op,
            value: value.into(),
        }
    }

    pub fn eq(column: Column, value: impl Into<Operand>) -> Self {
        Predicate::compare(column, Operator::Eq, value)
    }

    pub fn contains(column: Column, text: impl Into<String>) -> Self {
        Predicate::compare(column, Operator::Contains, Operand::Text(text.into()))
    }

    pub fn starts_with(column: Column, text: impl Into<String>) -> Self {
        Predicate::compare(column, Operator::StartsWith, Operand::Text(text.into()))
    }

    /// Collapses single-element groups; a lone value stays a plain compare.
    pub fn any(mut predicates: Vec<Predicate>) -> Self {
        if predicates.len() == 1 {
            return predicates.remove(0);
        }
        Predicate::Or(predicates)
    }

    pub fn all(mut predicates: Vec<Predicate>) -> Self {
        if predicates.len() == 1 {
            return predicates.remove(0);
        }
        Predicate::And(predicates)
    }

    /// Every column referenced by this predicate.
    pub fn columns(&self) -> Vec<Column> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns(&self, out: &mut Vec<Column>) {
        match self {
            Predicate::Compare { column, .. }
            | Predicate::IsNull(column)
            | Predicate::IsNotNull(column) => out.push(*column),
            Predicate::And(items) | Predicate::Or(items) => {
                for item in items {
                    item.collect_columns(out);
                }
            }
        }
    }
}

// =============================================================================
// Filter Clause
// =============================================================================

/// One active filter's contribution to a release query.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    /// The entity the predicate applies to.
    pub target: TargetEntity,
    pub predicate: Predicate,
}

impl FilterClause {
    pub fn new(target: TargetEntity, predicate: Predicate) -> Self {
        FilterClause { target, predicate }
    }

    /// A clause on the release row itself.
    pub fn on_release(predicate: Predicate) -> Self {
        FilterClause::new(TargetEntity::Release, predicate)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_qualified_names() {
        assert_eq!(Column::PriceUsd.qualified(), "r.price_usd");
        assert_eq!(Column::StyleBrand.qualified(), "s.brand");
        assert_eq!(Column::CategoryId.qualified(), "c.id");
        assert_eq!(Column::OfferShipping.qualified(), "o.shipping");
    }

    #[test]
    fn test_any_collapses_single() {
        let single = Predicate::any(vec![Predicate::eq(Column::Gender, "m")]);
        assert!(matches!(single, Predicate::Compare { .. }));

        let many = Predicate::any(vec![
            Predicate::eq(Column::Gender, "m"),
            Predicate::eq(Column::Gender, "u"),
        ]);
        assert!(matches!(many, Predicate::Or(ref items) if items.len() == 2));
    }

    #[test]
    fn test_columns_walks_groups() {
        let predicate = Predicate::And(vec![
            Predicate::IsNotNull(Column::ReleaseDate),
            Predicate::Or(vec![
                Predicate::contains(Column::Name, "air"),
                Predicate::contains(Column::Sku, "air"),
            ]),
        ]);
        assert_eq!(
            predicate.columns(),
            vec![Column::ReleaseDate, Column::Name, Column::Sku]
        );
    }
}
