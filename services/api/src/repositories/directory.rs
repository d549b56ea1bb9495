//! Directory repository for database operations

use anyhow::Result;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};

use crate::{
    models::directory::{DirectoryEntry, DirectoryKind, DirectoryPayload},
    query::{Pagination, push_search},
};

/// Repository over the nine lookup tables, which share one shape
#[derive(Clone)]
pub struct DirectoryRepository {
    pool: PgPool,
}

impl DirectoryRepository {
    /// Create a new directory repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get directory entries ordered by name
    pub async fn list(
        &self,
        kind: DirectoryKind,
        search: Option<&str>,
        pagination: Pagination,
    ) -> Result<(Vec<DirectoryEntry>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new(format!(
            "SELECT COUNT(*) FROM {} WHERE TRUE",
            kind.table()
        ));
        if let Some(term) = search {
            push_search(&mut count, term, &["name"]);
        }
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!(
            "SELECT id, name, description FROM {} WHERE TRUE",
            kind.table()
        ));
        if let Some(term) = search {
            push_search(&mut select, term, &["name"]);
        }
        select.push(" ORDER BY name, id");
        pagination.push_limit(&mut select);

        let rows = select.build().fetch_all(&self.pool).await?;

        Ok((rows.iter().map(entry_from_row).collect(), total))
    }

    /// Get a directory entry by ID
    pub async fn get_by_id(&self, kind: DirectoryKind, id: i64) -> Result<Option<DirectoryEntry>> {
        let row = sqlx::query(&format!(
            "SELECT id, name, description FROM {} WHERE id = $1",
            kind.table()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(entry_from_row))
    }

    /// Create a directory entry
    pub async fn create(
        &self,
        kind: DirectoryKind,
        payload: &DirectoryPayload,
    ) -> Result<DirectoryEntry> {
        let row = sqlx::query(&format!(
            "INSERT INTO {} (name, description) VALUES ($1, $2) RETURNING id, name, description",
            kind.table()
        ))
        .bind(&payload.name)
        .bind(&payload.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(entry_from_row(&row))
    }

    /// Update a directory entry, returning `None` when it does not exist
    pub async fn update(
        &self,
        kind: DirectoryKind,
        id: i64,
        payload: &DirectoryPayload,
    ) -> Result<Option<DirectoryEntry>> {
        let row = sqlx::query(&format!(
            "UPDATE {} SET name = $2, description = $3 WHERE id = $1 \
             RETURNING id, name, description",
            kind.table()
        ))
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.description)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(entry_from_row))
    }

    /// Delete a directory entry. Entries still referenced by records fail
    /// with a foreign key violation.
    pub async fn delete(&self, kind: DirectoryKind, id: i64) -> Result<bool> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", kind.table()))
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn entry_from_row(row: &PgRow) -> DirectoryEntry {
    DirectoryEntry {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
    }
}
