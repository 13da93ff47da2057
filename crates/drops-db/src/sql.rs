//! # SQL Translation
//!
//! Renders a composed [`ReleaseQuery`] into a parameterised SQLite statement.
//!
//! ## Statement Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SELECT [DISTINCT] r.id, r.slug, ...                                    │
//! │  FROM releases r                                                       │
//! │  [LEFT JOIN styles s     ON s.id = r.style_id]      ← Style/Category   │
//! │  [LEFT JOIN categories c ON c.id = s.category_id]   ← Category         │
//! │  [LEFT JOIN offers o     ON o.release_id = r.id]    ← Offer (1..n)     │
//! │  WHERE clause₁ AND clause₂ AND ...                                     │
//! │  ORDER BY r.release_date IS NULL, r.release_date DESC, r.name ASC      │
//! │  [LIMIT ? OFFSET ?]                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Identifiers come only from [`Column`] and [`TargetEntity`]; every operand
//! is bound with `push_bind`. Text used in `LIKE` patterns has its wildcards
//! escaped, so `50%` matches the literal string. Prefix matches compare
//! `substr(column, 1, length(?))` and are case-sensitive.

use std::collections::BTreeSet;

use drops_core::filter::{Column, FilterClause, Operand, Operator, Predicate, TargetEntity};
use drops_core::query::{ReleaseQuery, SortOrder};
use sqlx::{QueryBuilder, Sqlite};

use crate::models::RELEASE_COLUMNS;

/// Escape character declared on every `LIKE`.
const LIKE_ESCAPE: char = '\\';

// =============================================================================
// Statements
// =============================================================================

/// Builds the release listing statement for `query`.
pub fn push_release_select(query: &ReleaseQuery) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new("SELECT ");
    if query.needs_distinct() {
        qb.push("DISTINCT ");
    }
    qb.push(RELEASE_COLUMNS);
    qb.push(" FROM releases r");

    push_joins(&mut qb, &query.joins());
    push_where(&mut qb, &query.clauses);
    push_order(&mut qb, query.order);

    // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded
    match (query.limit, query.offset) {
        (Some(limit), offset) => {
            qb.push(" LIMIT ").push_bind(i64::from(limit));
            if let Some(offset) = offset {
                qb.push(" OFFSET ").push_bind(i64::from(offset));
            }
        }
        (None, Some(offset)) => {
            qb.push(" LIMIT -1 OFFSET ").push_bind(i64::from(offset));
        }
        (None, None) => {}
    }

    qb
}

/// Builds `SELECT COUNT(DISTINCT r.id)` over the same joins and clauses,
/// ignoring order and paging.
pub fn push_release_count(query: &ReleaseQuery) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new("SELECT COUNT(DISTINCT r.id) FROM releases r");
    push_joins(&mut qb, &query.joins());
    push_where(&mut qb, &query.clauses);
    qb
}

// =============================================================================
// Fragments
// =============================================================================

fn push_joins(qb: &mut QueryBuilder<'static, Sqlite>, joins: &BTreeSet<TargetEntity>) {
    // BTreeSet order (Style < Category < Offer) keeps `s` ahead of `c`
    for entity in joins {
        match entity {
            TargetEntity::Release => {}
            TargetEntity::Style => {
                qb.push(" LEFT JOIN styles s ON s.id = r.style_id");
            }
            TargetEntity::Category => {
                qb.push(" LEFT JOIN categories c ON c.id = s.category_id");
            }
            TargetEntity::Offer => {
                qb.push(" LEFT JOIN offers o ON o.release_id = r.id");
            }
        }
    }
}

fn push_where(qb: &mut QueryBuilder<'static, Sqlite>, clauses: &[FilterClause]) {
    if clauses.is_empty() {
        return;
    }

    qb.push(" WHERE ");
    for (i, clause) in clauses.iter().enumerate() {
        if i > 0 {
            qb.push(" AND ");
        }
        push_predicate(qb, &clause.predicate);
    }
}

fn push_order(qb: &mut QueryBuilder<'static, Sqlite>, order: SortOrder) {
    let direction = match order {
        SortOrder::NewestFirst => "DESC",
        SortOrder::OldestFirst => "ASC",
    };
    qb.push(" ORDER BY r.release_date IS NULL, r.release_date ");
    qb.push(direction);
    qb.push(", r.name ASC");
}

/// Renders one predicate. Groups are always parenthesised.
fn push_predicate(qb: &mut QueryBuilder<'static, Sqlite>, predicate: &Predicate) {
    match predicate {
        Predicate::Compare { column, op, value } => push_compare(qb, *column, *op, value),
        Predicate::IsNull(column) => {
            qb.push(column.qualified());
            qb.push(" IS NULL");
        }
        Predicate::IsNotNull(column) => {
            qb.push(column.qualified());
            qb.push(" IS NOT NULL");
        }
        Predicate::And(items) => push_group(qb, items, " AND ", "1 = 1"),
        Predicate::Or(items) => push_group(qb, items, " OR ", "1 = 0"),
    }
}

fn push_group(
    qb: &mut QueryBuilder<'static, Sqlite>,
    items: &[Predicate],
    separator: &str,
    identity: &str,
) {
    if items.is_empty() {
        qb.push(identity);
        return;
    }

    qb.push("(");
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            qb.push(separator);
        }
        push_predicate(qb, item);
    }
    qb.push(")");
}

fn push_compare(
    qb: &mut QueryBuilder<'static, Sqlite>,
    column: Column,
    op: Operator,
    value: &Operand,
) {
    let symbol = match op {
        Operator::Eq => " = ",
        Operator::Lt => " < ",
        Operator::Lte => " <= ",
        Operator::Gte => " >= ",
        Operator::Contains => {
            qb.push(column.qualified());
            qb.push(" LIKE ")
                .push_bind(format!("%{}%", escape_like(&operand_text(value))));
            qb.push(" ESCAPE '\\'");
            return;
        }
        Operator::StartsWith => {
            // LIKE folds ASCII case; comparing the leading substring does not
            let prefix = operand_text(value);
            qb.push("substr(");
            qb.push(column.qualified());
            qb.push(", 1, length(").push_bind(prefix.clone());
            qb.push(")) = ").push_bind(prefix);
            return;
        }
    };

    qb.push(column.qualified());
    qb.push(symbol);
    push_operand(qb, value);
}

fn push_operand(qb: &mut QueryBuilder<'static, Sqlite>, value: &Operand) {
    match value {
        Operand::Text(text) => {
            qb.push_bind(text.clone());
        }
        Operand::Number(number) => {
            qb.push_bind(*number);
        }
        Operand::Date(date) => {
            qb.push_bind(*date);
        }
    }
}

fn operand_text(value: &Operand) -> String {
    match value {
        Operand::Text(text) => text.clone(),
        Operand::Number(number) => number.to_string(),
        Operand::Date(date) => date.format("%Y-%m-%d").to_string(),
    }
}

/// Escapes `LIKE` wildcards (`%`, `_`) and the escape character itself.
pub fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch == '%' || ch == '_' || ch == LIKE_ESCAPE {
            out.push(LIKE_ESCAPE);
        }
        out.push(ch);
    }
    out
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use drops_core::filter::{FilterContext, FilterParams};
    use drops_core::query::compose;

    fn ctx() -> FilterContext {
        FilterContext::at(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
    }

    fn render(params: FilterParams) -> String {
        let query = compose(&params, &ctx()).unwrap();
        push_release_select(&query).sql().to_string()
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_unfiltered_select() {
        let sql = render(FilterParams::new());
        assert_eq!(
            sql,
            format!(
                "SELECT {RELEASE_COLUMNS} FROM releases r ORDER BY r.release_date IS NULL, \
                 r.release_date DESC, r.name ASC"
            )
        );
    }

    #[test]
    fn test_category_joins_through_style() {
        let sql = render(FilterParams::new().with("categoryId", "c1"));
        assert!(sql.contains(
            " LEFT JOIN styles s ON s.id = r.style_id LEFT JOIN categories c ON c.id = s.category_id"
        ));
        assert!(sql.contains(" WHERE c.id = ?"));
        assert!(!sql.contains("DISTINCT"));
        assert!(!sql.contains("offers"));
    }

    #[test]
    fn test_offer_join_is_distinct() {
        let sql = render(FilterParams::new().with("status", vec!["live", "raffle"]));
        assert!(sql.starts_with("SELECT DISTINCT "));
        assert!(sql.contains(" LEFT JOIN offers o ON o.release_id = r.id"));
        assert!(sql.contains(" WHERE (o.status = ? OR o.status = ?)"));
    }

    #[test]
    fn test_clauses_are_anded() {
        let sql = render(
            FilterParams::new()
                .with("gender", "m")
                .with("minPriceUSD", "100"),
        );
        assert!(sql.contains(" WHERE (r.gender = ? OR r.gender = ?) AND r.price_usd >= ?"));
    }

    #[test]
    fn test_query_renders_like() {
        let sql = render(FilterParams::new().with("query", "air max"));
        assert!(sql.contains(
            "((r.name LIKE ? ESCAPE '\\' AND r.name LIKE ? ESCAPE '\\') OR \
             (r.sku LIKE ? ESCAPE '\\' AND r.sku LIKE ? ESCAPE '\\'))"
        ));
    }

    #[test]
    fn test_scheduled_filters() {
        let sql = render(FilterParams::new().with("coming", "1"));
        assert!(sql.contains("(r.release_date >= ? AND r.release_date IS NOT NULL)"));

        let sql = render(FilterParams::new().with("upcoming", "1"));
        assert!(sql.contains(" WHERE r.release_date IS NULL"));
    }

    #[test]
    fn test_prefix_is_substring_comparison() {
        let query = ReleaseQuery::unfiltered()
            .with_clause(FilterClause::on_release(Predicate::starts_with(Column::Slug, "AJ1")));
        let sql = push_release_select(&query).sql().to_string();
        assert!(sql.contains(" WHERE substr(r.slug, 1, length(?)) = ?"));
        assert!(!sql.contains("LIKE"));
    }

    #[test]
    fn test_empty_groups() {
        let query = ReleaseQuery::unfiltered()
            .with_clause(FilterClause::on_release(Predicate::And(vec![])))
            .with_clause(FilterClause::on_release(Predicate::Or(vec![])));
        let sql = push_release_select(&query).sql().to_string();
        assert!(sql.contains(" WHERE 1 = 1 AND 1 = 0"));
    }

    #[test]
    fn test_paging_and_order() {
        let sql = push_release_select(&ReleaseQuery::unfiltered().with_page(10, 20))
            .sql()
            .to_string();
        assert!(sql.ends_with(" LIMIT ? OFFSET ?"));

        let mut query = ReleaseQuery::unfiltered();
        query.offset = Some(5);
        let sql = push_release_select(&query).sql().to_string();
        assert!(sql.ends_with(" LIMIT -1 OFFSET ?"));

        let cutoff = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let sql = push_release_select(&ReleaseQuery::released_before(cutoff))
            .sql()
            .to_string();
        assert!(sql.contains("r.release_date ASC"));
    }

    #[test]
    fn test_count_statement() {
        let query = compose(&FilterParams::new().with("shipping", "eu"), &ctx()).unwrap();
        let sql = push_release_count(&query).sql().to_string();
        assert_eq!(
            sql,
            "SELECT COUNT(DISTINCT r.id) FROM releases r \
             LEFT JOIN offers o ON o.release_id = r.id WHERE o.shipping = ?"
        );
    }
}
