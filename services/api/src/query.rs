//! Shared list-query helpers: pagination, ordering and text search

use sqlx::{Postgres, QueryBuilder};

pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

/// 1-based page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) as i64 * self.limit as i64
    }

    pub fn push_limit(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" LIMIT ")
            .push_bind(self.limit as i64)
            .push(" OFFSET ")
            .push_bind(self.offset());
    }
}

/// Sortable field: query parameter name and the SQL expression behind it
pub type SortField = (&'static str, &'static str);

/// Build an `ORDER BY` clause from a comma separated `ordering` parameter.
///
/// Each entry may carry a `-` prefix for descending order. Unknown fields
/// are ignored; if nothing usable remains, `default` is used. `tiebreak` is
/// always appended so pages are stable.
pub fn order_by(raw: Option<&str>, fields: &[SortField], default: &str, tiebreak: &str) -> String {
    let mut clauses = parse_ordering(raw.unwrap_or_default(), fields);
    if clauses.is_empty() {
        clauses = parse_ordering(default, fields);
    }
    if !tiebreak.is_empty() {
        clauses.push(tiebreak.to_string());
    }

    if clauses.is_empty() {
        String::new()
    } else {
        format!(" ORDER BY {}", clauses.join(", "))
    }
}

fn parse_ordering(raw: &str, fields: &[SortField]) -> Vec<String> {
    raw.split(',')
        .filter_map(|entry| {
            let entry = entry.trim();
            let (name, direction) = match entry.strip_prefix('-') {
                Some(name) => (name, "DESC"),
                None => (entry, "ASC"),
            };
            fields
                .iter()
                .find(|(param, _)| *param == name)
                .map(|(_, column)| format!("{} {}", column, direction))
        })
        .collect()
}

/// `%term%` pattern for `ILIKE`, with wildcards in the term escaped
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Trimmed, non-empty search term
pub fn search_term(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Append ` AND (<col> ILIKE $n OR ...)` for a search over several columns
pub fn push_search(qb: &mut QueryBuilder<'_, Postgres>, term: &str, columns: &[&str]) {
    let pattern = contains_pattern(term);
    qb.push(" AND (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        qb.push(*column).push(" ILIKE ").push_bind(pattern.clone());
    }
    qb.push(")");
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[SortField] = &[
        ("shipment_date", "m.shipment_date"),
        ("serial_number", "m.serial_number"),
    ];

    #[test]
    fn test_pagination_bounds() {
        assert_eq!(Pagination::new(None, None), Pagination { page: 1, limit: 20 });
        assert_eq!(Pagination::new(Some(0), Some(0)), Pagination { page: 1, limit: 1 });
        assert_eq!(Pagination::new(Some(3), Some(500)).limit, 100);
        assert_eq!(Pagination::new(Some(3), Some(10)).offset(), 20);
    }

    #[test]
    fn test_order_by_parses_direction() {
        assert_eq!(
            order_by(Some("-shipment_date"), FIELDS, "serial_number", "m.id"),
            " ORDER BY m.shipment_date DESC, m.id"
        );
        assert_eq!(
            order_by(Some("serial_number,-shipment_date"), FIELDS, "", "m.id"),
            " ORDER BY m.serial_number ASC, m.shipment_date DESC, m.id"
        );
    }

    #[test]
    fn test_order_by_falls_back_to_default() {
        assert_eq!(
            order_by(Some("password_hash"), FIELDS, "-shipment_date", "m.id"),
            " ORDER BY m.shipment_date DESC, m.id"
        );
        assert_eq!(
            order_by(None, FIELDS, "-shipment_date", "m.id"),
            " ORDER BY m.shipment_date DESC, m.id"
        );
        assert_eq!(order_by(None, FIELDS, "", "m.id"), " ORDER BY m.id");
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("0017"), "%0017%");
        assert_eq!(contains_pattern("50%_a\\"), "%50\\%\\_a\\\\%");
    }

    #[test]
    fn test_search_term() {
        assert_eq!(search_term(&Some("  abc ".to_string())), Some("abc"));
        assert_eq!(search_term(&Some("   ".to_string())), None);
        assert_eq!(search_term(&None), None);
    }

    #[test]
    fn test_push_search() {
        let mut qb = QueryBuilder::<Postgres>::new("WHERE TRUE");
        push_search(&mut qb, "17", &["m.serial_number", "x.name"]);
        assert_eq!(
            qb.sql(),
            "WHERE TRUE AND (m.serial_number ILIKE $1 OR x.name ILIKE $2)"
        );
    }
}
