//! Machine repository for database operations

use anyhow::Result;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};

use super::{account_reference, reference};
use crate::{
    models::machine::{MachineDetail, MachineOwners, MachinePayload, MachineQuery},
    query::{Pagination, SortField, contains_pattern, order_by, push_search, search_term},
    scope::Scope,
};

const MACHINE_SELECT: &str = r#"
    SELECT m.id, m.serial_number,
           tm.id AS technique_model_id, tm.name AS technique_model_name,
           tm.description AS technique_model_description,
           em.id AS engine_model_id, em.name AS engine_model_name,
           em.description AS engine_model_description,
           m.engine_serial,
           trm.id AS transmission_model_id, trm.name AS transmission_model_name,
           trm.description AS transmission_model_description,
           m.transmission_serial,
           dam.id AS drive_axle_model_id, dam.name AS drive_axle_model_name,
           dam.description AS drive_axle_model_description,
           m.drive_axle_serial,
           sam.id AS steer_axle_model_id, sam.name AS steer_axle_model_name,
           sam.description AS steer_axle_model_description,
           m.steer_axle_serial,
           m.supply_contract, m.shipment_date, m.consignee, m.delivery_address, m.equipment,
           cu.id AS client_id,
           COALESCE(NULLIF(TRIM(CONCAT(cu.first_name, ' ', cu.last_name)), ''), cu.username)
               AS client_name,
           su.id AS service_organization_id,
           COALESCE(NULLIF(TRIM(CONCAT(su.first_name, ' ', su.last_name)), ''), su.username)
               AS service_organization_name
    FROM machines m
    JOIN technique_models tm ON tm.id = m.technique_model_id
    JOIN engine_models em ON em.id = m.engine_model_id
    JOIN transmission_models trm ON trm.id = m.transmission_model_id
    JOIN drive_axle_models dam ON dam.id = m.drive_axle_model_id
    JOIN steer_axle_models sam ON sam.id = m.steer_axle_model_id
    LEFT JOIN users cu ON cu.id = m.client_id
    LEFT JOIN users su ON su.id = m.service_organization_id
    WHERE TRUE"#;

const SORT_FIELDS: &[SortField] = &[
    ("shipment_date", "m.shipment_date"),
    ("serial_number", "m.serial_number"),
];

const DEFAULT_ORDERING: &str = "-shipment_date";

/// Machine repository for database operations
#[derive(Clone)]
pub struct MachineRepository {
    pool: PgPool,
}

impl MachineRepository {
    /// Create a new machine repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get machines with pagination, sorting and filtering
    pub async fn list(
        &self,
        query: &MachineQuery,
        scope: Scope,
        pagination: Pagination,
    ) -> Result<(Vec<MachineDetail>, i64)> {
        let mut count =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM machines m WHERE TRUE");
        push_filters(&mut count, query, scope);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(MACHINE_SELECT);
        push_filters(&mut select, query, scope);
        select.push(order_by(
            query.ordering.as_deref(),
            SORT_FIELDS,
            DEFAULT_ORDERING,
            "m.id DESC",
        ));
        pagination.push_limit(&mut select);

        let rows = select.build().fetch_all(&self.pool).await?;

        Ok((rows.iter().map(machine_from_row).collect(), total))
    }

    /// Get a machine by ID if it falls inside `scope`
    pub async fn get_by_id(&self, id: i64, scope: Scope) -> Result<Option<MachineDetail>> {
        let mut select = QueryBuilder::<Postgres>::new(MACHINE_SELECT);
        select.push(" AND m.id = ").push_bind(id);
        scope.push_filter(&mut select, "m.client_id", "m.service_organization_id");

        let row = select.build().fetch_optional(&self.pool).await?;

        Ok(row.as_ref().map(machine_from_row))
    }

    /// Client and service organization of a machine
    pub async fn owners(&self, id: i64) -> Result<Option<MachineOwners>> {
        let row = sqlx::query(
            r#"
            SELECT client_id, service_organization_id
            FROM machines
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| MachineOwners {
            client_id: row.get("client_id"),
            service_organization_id: row.get("service_organization_id"),
        }))
    }

    /// Create a machine, returning its ID
    pub async fn create(&self, payload: &MachinePayload) -> Result<i64> {
        let id = sqlx::query_scalar(
            r#"
            INSERT INTO machines (
                serial_number, technique_model_id, engine_model_id, engine_serial,
                transmission_model_id, transmission_serial, drive_axle_model_id,
                drive_axle_serial, steer_axle_model_id, steer_axle_serial, supply_contract,
                shipment_date, consignee, delivery_address, equipment, client_id,
                service_organization_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING id
            "#,
        )
        .bind(&payload.serial_number)
        .bind(payload.technique_model_id)
        .bind(payload.engine_model_id)
        .bind(&payload.engine_serial)
        .bind(payload.transmission_model_id)
        .bind(&payload.transmission_serial)
        .bind(payload.drive_axle_model_id)
        .bind(&payload.drive_axle_serial)
        .bind(payload.steer_axle_model_id)
        .bind(&payload.steer_axle_serial)
        .bind(&payload.supply_contract)
        .bind(payload.shipment_date)
        .bind(&payload.consignee)
        .bind(&payload.delivery_address)
        .bind(&payload.equipment)
        .bind(payload.client_id)
        .bind(payload.service_organization_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Replace every field of a machine. Returns false when it does not exist.
    pub async fn update(&self, id: i64, payload: &MachinePayload) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE machines
            SET serial_number = $2, technique_model_id = $3, engine_model_id = $4,
                engine_serial = $5, transmission_model_id = $6, transmission_serial = $7,
                drive_axle_model_id = $8, drive_axle_serial = $9, steer_axle_model_id = $10,
                steer_axle_serial = $11, supply_contract = $12, shipment_date = $13,
                consignee = $14, delivery_address = $15, equipment = $16, client_id = $17,
                service_organization_id = $18
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&payload.serial_number)
        .bind(payload.technique_model_id)
        .bind(payload.engine_model_id)
        .bind(&payload.engine_serial)
        .bind(payload.transmission_model_id)
        .bind(&payload.transmission_serial)
        .bind(payload.drive_axle_model_id)
        .bind(&payload.drive_axle_serial)
        .bind(payload.steer_axle_model_id)
        .bind(&payload.steer_axle_serial)
        .bind(&payload.supply_contract)
        .bind(payload.shipment_date)
        .bind(&payload.consignee)
        .bind(&payload.delivery_address)
        .bind(&payload.equipment)
        .bind(payload.client_id)
        .bind(payload.service_organization_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a machine together with its maintenance and complaint records
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM machines WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &MachineQuery, scope: Scope) {
    let models = [
        ("m.technique_model_id", query.technique_model),
        ("m.engine_model_id", query.engine_model),
        ("m.transmission_model_id", query.transmission_model),
        ("m.drive_axle_model_id", query.drive_axle_model),
        ("m.steer_axle_model_id", query.steer_axle_model),
    ];
    for (column, id) in models {
        if let Some(id) = id {
            qb.push(" AND ").push(column).push(" = ").push_bind(id);
        }
    }

    if let Some(serial) = search_term(&query.serial_number) {
        qb.push(" AND m.serial_number ILIKE ")
            .push_bind(contains_pattern(serial));
    }
    if let Some(from) = query.shipment_date_from {
        qb.push(" AND m.shipment_date >= ").push_bind(from);
    }
    if let Some(to) = query.shipment_date_to {
        qb.push(" AND m.shipment_date <= ").push_bind(to);
    }
    if let Some(term) = search_term(&query.search) {
        push_search(qb, term, &["m.serial_number"]);
    }

    scope.push_filter(qb, "m.client_id", "m.service_organization_id");
}

fn machine_from_row(row: &PgRow) -> MachineDetail {
    MachineDetail {
        id: row.get("id"),
        serial_number: row.get("serial_number"),
        technique_model: reference(row, "technique_model"),
        engine_model: reference(row, "engine_model"),
        engine_serial: row.get("engine_serial"),
        transmission_model: reference(row, "transmission_model"),
        transmission_serial: row.get("transmission_serial"),
        drive_axle_model: reference(row, "drive_axle_model"),
        drive_axle_serial: row.get("drive_axle_serial"),
        steer_axle_model: reference(row, "steer_axle_model"),
        steer_axle_serial: row.get("steer_axle_serial"),
        supply_contract: row.get("supply_contract"),
        shipment_date: row.get("shipment_date"),
        consignee: row.get("consignee"),
        delivery_address: row.get("delivery_address"),
        equipment: row.get("equipment"),
        client: account_reference(row, "client"),
        service_organization: account_reference(row, "service_organization"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_sql() {
        let query = MachineQuery {
            technique_model: Some(1),
            steer_axle_model: Some(5),
            serial_number: Some(" 17 ".to_string()),
            ..Default::default()
        };
        let scope = Scope::Owned {
            user_id: 3,
            as_client: true,
            as_service: false,
        };

        let mut qb = QueryBuilder::<Postgres>::new("WHERE TRUE");
        push_filters(&mut qb, &query, scope);
        assert_eq!(
            qb.sql(),
            "WHERE TRUE AND m.technique_model_id = $1 AND m.steer_axle_model_id = $2 \
             AND m.serial_number ILIKE $3 AND (FALSE OR m.client_id = $4)"
        );
    }

    #[test]
    fn test_empty_query_adds_nothing() {
        let mut qb = QueryBuilder::<Postgres>::new("WHERE TRUE");
        push_filters(&mut qb, &MachineQuery::default(), Scope::All);
        assert_eq!(qb.sql(), "WHERE TRUE");
    }
}
