//! Complaint repository for database operations

use anyhow::Result;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};

use super::{machine_summary, optional_reference, reference};
use crate::{
    models::complaint::{
        Complaint, ComplaintPayload, ComplaintQuery, ComplaintStatistics, FailureNodeCount,
    },
    query::{Pagination, SortField, contains_pattern, order_by, push_search, search_term},
    scope::Scope,
};

const COMPLAINT_SELECT: &str = r#"
    SELECT c.id, c.machine_id, m.serial_number AS machine_serial, tm.name AS machine_model,
           c.failure_date, c.operating_hours,
           fnd.id AS failure_node_id, fnd.name AS failure_node_name,
           fnd.description AS failure_node_description,
           c.failure_description,
           rm.id AS recovery_method_id, rm.name AS recovery_method_name,
           rm.description AS recovery_method_description,
           c.spare_parts, c.recovery_date, c.downtime,
           sc.id AS service_company_id, sc.name AS service_company_name,
           sc.description AS service_company_description,
           c.created_by, c.created_at
    FROM complaints c
    JOIN machines m ON m.id = c.machine_id
    JOIN technique_models tm ON tm.id = m.technique_model_id
    JOIN failure_nodes fnd ON fnd.id = c.failure_node_id
    JOIN recovery_methods rm ON rm.id = c.recovery_method_id
    LEFT JOIN service_companies sc ON sc.id = c.service_company_id
    WHERE TRUE"#;

const COMPLAINT_FROM: &str = r#"
    FROM complaints c
    JOIN machines m ON m.id = c.machine_id"#;

const SORT_FIELDS: &[SortField] = &[
    ("failure_date", "c.failure_date"),
    ("machine_serial", "m.serial_number"),
];

const DEFAULT_ORDERING: &str = "-failure_date";

/// Complaint repository for database operations
#[derive(Clone)]
pub struct ComplaintRepository {
    pool: PgPool,
}

impl ComplaintRepository {
    /// Create a new complaint repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get complaints with pagination, sorting and filtering
    pub async fn list(
        &self,
        query: &ComplaintQuery,
        scope: Scope,
        pagination: Pagination,
    ) -> Result<(Vec<Complaint>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*)");
        count.push(COMPLAINT_FROM).push(" WHERE TRUE");
        push_filters(&mut count, query, scope);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(COMPLAINT_SELECT);
        push_filters(&mut select, query, scope);
        select.push(order_by(
            query.ordering.as_deref(),
            SORT_FIELDS,
            DEFAULT_ORDERING,
            "c.id DESC",
        ));
        pagination.push_limit(&mut select);

        let rows = select.build().fetch_all(&self.pool).await?;

        Ok((rows.iter().map(complaint_from_row).collect(), total))
    }

    /// Get a complaint by ID if its machine falls inside `scope`
    pub async fn get_by_id(&self, id: i64, scope: Scope) -> Result<Option<Complaint>> {
        let mut select = QueryBuilder::<Postgres>::new(COMPLAINT_SELECT);
        select.push(" AND c.id = ").push_bind(id);
        scope.push_filter(&mut select, "m.client_id", "m.service_organization_id");

        let row = select.build().fetch_optional(&self.pool).await?;

        Ok(row.as_ref().map(complaint_from_row))
    }

    /// Totals and per-node counts over the complaints matching `query`
    pub async fn statistics(
        &self,
        query: &ComplaintQuery,
        scope: Scope,
    ) -> Result<ComplaintStatistics> {
        let mut totals = QueryBuilder::<Postgres>::new(
            r#"
            SELECT COUNT(*) AS total,
                   COALESCE(SUM(c.downtime), 0)::BIGINT AS total_downtime,
                   COALESCE(AVG(c.downtime), 0)::FLOAT8 AS average_downtime"#,
        );
        totals.push(COMPLAINT_FROM).push(" WHERE TRUE");
        push_filters(&mut totals, query, scope);
        let row = totals.build().fetch_one(&self.pool).await?;

        let mut by_node = QueryBuilder::<Postgres>::new(
            r#"
            SELECT fnd.id AS failure_node_id, fnd.name AS failure_node_name,
                   fnd.description AS failure_node_description, COUNT(*) AS count"#,
        );
        by_node
            .push(COMPLAINT_FROM)
            .push(" JOIN failure_nodes fnd ON fnd.id = c.failure_node_id WHERE TRUE");
        push_filters(&mut by_node, query, scope);
        by_node.push(" GROUP BY fnd.id, fnd.name, fnd.description ORDER BY count DESC, fnd.name");
        let nodes = by_node.build().fetch_all(&self.pool).await?;

        Ok(ComplaintStatistics {
            total: row.get("total"),
            by_failure_node: nodes
                .iter()
                .map(|row| FailureNodeCount {
                    failure_node: reference(row, "failure_node"),
                    count: row.get("count"),
                })
                .collect(),
            average_downtime: row.get("average_downtime"),
            total_downtime: row.get("total_downtime"),
        })
    }

    /// Create a complaint, returning its ID
    pub async fn create(&self, payload: &ComplaintPayload, created_by: i64) -> Result<i64> {
        let id = sqlx::query_scalar(
            r#"
            INSERT INTO complaints (
                machine_id, failure_date, operating_hours, failure_node_id,
                failure_description, recovery_method_id, spare_parts, recovery_date,
                downtime, service_company_id, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#,
        )
        .bind(payload.machine_id)
        .bind(payload.failure_date)
        .bind(payload.operating_hours)
        .bind(payload.failure_node_id)
        .bind(&payload.failure_description)
        .bind(payload.recovery_method_id)
        .bind(&payload.spare_parts)
        .bind(payload.recovery_date)
        .bind(payload.downtime())
        .bind(payload.service_company_id)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Replace the editable fields of a complaint, recomputing downtime
    pub async fn update(&self, id: i64, payload: &ComplaintPayload) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE complaints
            SET machine_id = $2, failure_date = $3, operating_hours = $4,
                failure_node_id = $5, failure_description = $6, recovery_method_id = $7,
                spare_parts = $8, recovery_date = $9, downtime = $10,
                service_company_id = $11
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(payload.machine_id)
        .bind(payload.failure_date)
        .bind(payload.operating_hours)
        .bind(payload.failure_node_id)
        .bind(&payload.failure_description)
        .bind(payload.recovery_method_id)
        .bind(&payload.spare_parts)
        .bind(payload.recovery_date)
        .bind(payload.downtime())
        .bind(payload.service_company_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a complaint
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM complaints WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &ComplaintQuery, scope: Scope) {
    if let Some(id) = query.failure_node {
        qb.push(" AND c.failure_node_id = ").push_bind(id);
    }
    if let Some(id) = query.recovery_method {
        qb.push(" AND c.recovery_method_id = ").push_bind(id);
    }
    if let Some(id) = query.service_company {
        qb.push(" AND c.service_company_id = ").push_bind(id);
    }
    if let Some(serial) = search_term(&query.machine_serial) {
        qb.push(" AND m.serial_number ILIKE ")
            .push_bind(contains_pattern(serial));
    }
    if let Some(id) = query.machine {
        qb.push(" AND c.machine_id = ").push_bind(id);
    }
    if let Some(from) = query.failure_date_from {
        qb.push(" AND c.failure_date >= ").push_bind(from);
    }
    if let Some(to) = query.failure_date_to {
        qb.push(" AND c.failure_date <= ").push_bind(to);
    }
    if let Some(term) = search_term(&query.search) {
        push_search(qb, term, &["m.serial_number", "c.failure_description"]);
    }

    scope.push_filter(qb, "m.client_id", "m.service_organization_id");
}

fn complaint_from_row(row: &PgRow) -> Complaint {
    Complaint {
        id: row.get("id"),
        machine: machine_summary(row),
        failure_date: row.get("failure_date"),
        operating_hours: row.get("operating_hours"),
        failure_node: reference(row, "failure_node"),
        failure_description: row.get("failure_description"),
        recovery_method: reference(row, "recovery_method"),
        spare_parts: row.get("spare_parts"),
        recovery_date: row.get("recovery_date"),
        downtime: row.get("downtime"),
        service_company: optional_reference(row, "service_company"),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_sql() {
        let query = ComplaintQuery {
            failure_node: Some(1),
            machine_serial: Some("0017".to_string()),
            machine: Some(9),
            ..Default::default()
        };
        let scope = Scope::Owned {
            user_id: 2,
            as_client: true,
            as_service: true,
        };

        let mut qb = QueryBuilder::<Postgres>::new("WHERE TRUE");
        push_filters(&mut qb, &query, scope);
        assert_eq!(
            qb.sql(),
            "WHERE TRUE AND c.failure_node_id = $1 AND m.serial_number ILIKE $2 \
             AND c.machine_id = $3 AND (FALSE OR m.client_id = $4 \
             OR m.service_organization_id = $5)"
        );
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let query = ComplaintQuery {
            search: Some("  ".to_string()),
            ..Default::default()
        };

        let mut qb = QueryBuilder::<Postgres>::new("WHERE TRUE");
        push_filters(&mut qb, &query, Scope::All);
        assert_eq!(qb.sql(), "WHERE TRUE");
    }
}
