//! Maintenance repository for database operations

use anyhow::Result;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};

use super::{machine_summary, optional_reference, reference};
use crate::{
    models::maintenance::{Maintenance, MaintenancePayload, MaintenanceQuery},
    query::{Pagination, SortField, contains_pattern, order_by, push_search, search_term},
    scope::Scope,
};

const MAINTENANCE_SELECT: &str = r#"
    SELECT mt.id, mt.machine_id, m.serial_number AS machine_serial, tm.name AS machine_model,
           mty.id AS maintenance_type_id, mty.name AS maintenance_type_name,
           mty.description AS maintenance_type_description,
           mt.maintenance_date, mt.operating_hours, mt.work_order_number, mt.work_order_date,
           mt.maintenance_company,
           sc.id AS service_company_id, sc.name AS service_company_name,
           sc.description AS service_company_description,
           mt.created_by, mt.created_at
    FROM maintenances mt
    JOIN machines m ON m.id = mt.machine_id
    JOIN technique_models tm ON tm.id = m.technique_model_id
    JOIN maintenance_types mty ON mty.id = mt.maintenance_type_id
    LEFT JOIN service_companies sc ON sc.id = mt.service_company_id
    WHERE TRUE"#;

const MAINTENANCE_COUNT: &str = r#"
    SELECT COUNT(*)
    FROM maintenances mt
    JOIN machines m ON m.id = mt.machine_id
    WHERE TRUE"#;

const SORT_FIELDS: &[SortField] = &[
    ("maintenance_date", "mt.maintenance_date"),
    ("operating_hours", "mt.operating_hours"),
    ("machine_serial", "m.serial_number"),
];

const DEFAULT_ORDERING: &str = "-maintenance_date";

/// Maintenance repository for database operations
#[derive(Clone)]
pub struct MaintenanceRepository {
    pool: PgPool,
}

impl MaintenanceRepository {
    /// Create a new maintenance repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get maintenance records with pagination, sorting and filtering
    pub async fn list(
        &self,
        query: &MaintenanceQuery,
        scope: Scope,
        pagination: Pagination,
    ) -> Result<(Vec<Maintenance>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new(MAINTENANCE_COUNT);
        push_filters(&mut count, query, scope);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(MAINTENANCE_SELECT);
        push_filters(&mut select, query, scope);
        select.push(order_by(
            query.ordering.as_deref(),
            SORT_FIELDS,
            DEFAULT_ORDERING,
            "mt.id DESC",
        ));
        pagination.push_limit(&mut select);

        let rows = select.build().fetch_all(&self.pool).await?;

        Ok((rows.iter().map(maintenance_from_row).collect(), total))
    }

    /// Get a maintenance record by ID if its machine falls inside `scope`
    pub async fn get_by_id(&self, id: i64, scope: Scope) -> Result<Option<Maintenance>> {
        let mut select = QueryBuilder::<Postgres>::new(MAINTENANCE_SELECT);
        select.push(" AND mt.id = ").push_bind(id);
        scope.push_filter(&mut select, "m.client_id", "m.service_organization_id");

        let row = select.build().fetch_optional(&self.pool).await?;

        Ok(row.as_ref().map(maintenance_from_row))
    }

    /// Create a maintenance record, returning its ID
    pub async fn create(&self, payload: &MaintenancePayload, created_by: i64) -> Result<i64> {
        let id = sqlx::query_scalar(
            r#"
            INSERT INTO maintenances (
                machine_id, maintenance_type_id, maintenance_date, operating_hours,
                work_order_number, work_order_date, maintenance_company, service_company_id,
                created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(payload.machine_id)
        .bind(payload.maintenance_type_id)
        .bind(payload.maintenance_date)
        .bind(payload.operating_hours)
        .bind(&payload.work_order_number)
        .bind(payload.work_order_date)
        .bind(&payload.maintenance_company)
        .bind(payload.service_company_id)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Replace the editable fields of a maintenance record
    pub async fn update(&self, id: i64, payload: &MaintenancePayload) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE maintenances
            SET machine_id = $2, maintenance_type_id = $3, maintenance_date = $4,
                operating_hours = $5, work_order_number = $6, work_order_date = $7,
                maintenance_company = $8, service_company_id = $9
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(payload.machine_id)
        .bind(payload.maintenance_type_id)
        .bind(payload.maintenance_date)
        .bind(payload.operating_hours)
        .bind(&payload.work_order_number)
        .bind(payload.work_order_date)
        .bind(&payload.maintenance_company)
        .bind(payload.service_company_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a maintenance record
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM maintenances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &MaintenanceQuery, scope: Scope) {
    if let Some(id) = query.maintenance_type {
        qb.push(" AND mt.maintenance_type_id = ").push_bind(id);
    }
    if let Some(serial) = search_term(&query.machine_serial) {
        qb.push(" AND m.serial_number ILIKE ")
            .push_bind(contains_pattern(serial));
    }
    if let Some(id) = query.service_company {
        qb.push(" AND mt.service_company_id = ").push_bind(id);
    }
    if let Some(id) = query.machine {
        qb.push(" AND mt.machine_id = ").push_bind(id);
    }
    if let Some(from) = query.maintenance_date_from {
        qb.push(" AND mt.maintenance_date >= ").push_bind(from);
    }
    if let Some(to) = query.maintenance_date_to {
        qb.push(" AND mt.maintenance_date <= ").push_bind(to);
    }
    if let Some(term) = search_term(&query.search) {
        push_search(
            qb,
            term,
            &["m.serial_number", "mt.work_order_number", "mt.maintenance_company"],
        );
    }

    scope.push_filter(qb, "m.client_id", "m.service_organization_id");
}

fn maintenance_from_row(row: &PgRow) -> Maintenance {
    Maintenance {
        id: row.get("id"),
        machine: machine_summary(row),
        maintenance_type: reference(row, "maintenance_type"),
        maintenance_date: row.get("maintenance_date"),
        operating_hours: row.get("operating_hours"),
        work_order_number: row.get("work_order_number"),
        work_order_date: row.get("work_order_date"),
        maintenance_company: row.get("maintenance_company"),
        service_company: optional_reference(row, "service_company"),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
    }
}
