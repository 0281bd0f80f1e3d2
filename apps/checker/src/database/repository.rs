use anyhow::{Result, ensure};
use async_trait::async_trait;
use libsql::{Row, params};
use uuid::Uuid;

use super::models::TargetRecord;
use crate::pool::{LibsqlManager, LibsqlPool};

const TARGET_COLUMNS: &str = "id, uuid, name, url, method, headers, healthy_min_status, \
                              healthy_max_status, healthy_content, timeout_ms, enabled, \
                              created_at, updated_at";

/// Storage of target definitions
#[async_trait]
pub trait TargetStore: Send + Sync {
    /// Get all enabled targets, the set checked by a run
    async fn fetch_all(&self) -> Result<Vec<TargetRecord>>;

    /// Get every target, enabled or not
    async fn list_targets(&self) -> Result<Vec<TargetRecord>>;

    /// Get a target by UUID
    async fn get_target(&self, uuid: Uuid) -> Result<Option<TargetRecord>>;

    /// Insert or update a target, returning its row id
    async fn save_target(&self, target: &TargetRecord) -> Result<i64>;

    /// Delete a target, returning whether it existed
    async fn delete_target(&self, uuid: Uuid) -> Result<bool>;

    /// Number of stored targets, enabled or not
    async fn count(&self) -> Result<usize>;
}

/// LibSQL target store
pub struct DatabaseImpl {
    pool: LibsqlPool,
}

impl DatabaseImpl {
    /// Create a new database instance from a pool
    pub fn new_from_pool(pool: LibsqlPool) -> Self {
        Self { pool }
    }

    /// Get a connection from the pool
    async fn get_conn(&self) -> Result<deadpool::managed::Object<LibsqlManager>> {
        Ok(self.pool.get().await?)
    }

    async fn query_targets(&self, filter: &str) -> Result<Vec<TargetRecord>> {
        let conn = self.get_conn().await?;
        let mut stmt = conn
            .prepare(&format!("SELECT {TARGET_COLUMNS} FROM targets {filter} ORDER BY id"))
            .await?;

        let mut rows = stmt.query(()).await?;
        let mut targets = Vec::new();

        while let Some(row) = rows.next().await? {
            targets.push(row_to_target(&row)?);
        }

        Ok(targets)
    }
}

fn row_to_target(row: &Row) -> Result<TargetRecord> {
    let uuid = Uuid::parse_str(&row.get::<String>(1)?)?;
    let headers: String = row.get(5)?;

    Ok(TargetRecord {
        id: Some(row.get(0)?),
        uuid,
        name: row.get(2)?,
        url: row.get(3)?,
        method: row.get(4)?,
        headers: TargetRecord::parse_headers(uuid, &headers),
        healthy_min_status: u16::try_from(row.get::<i64>(6)?)?,
        healthy_max_status: u16::try_from(row.get::<i64>(7)?)?,
        healthy_content: row.get(8)?,
        timeout_ms: row.get::<i64>(9)?.max(0) as u64,
        enabled: row.get::<i64>(10)? != 0,
        created_at: TargetRecord::i64_to_timestamp(row.get(11)?),
        updated_at: TargetRecord::i64_to_timestamp(row.get(12)?),
    })
}

#[async_trait]
impl TargetStore for DatabaseImpl {
    async fn fetch_all(&self) -> Result<Vec<TargetRecord>> {
        self.query_targets("WHERE enabled = 1").await
    }

    async fn list_targets(&self) -> Result<Vec<TargetRecord>> {
        self.query_targets("").await
    }

    async fn get_target(&self, uuid: Uuid) -> Result<Option<TargetRecord>> {
        let conn = self.get_conn().await?;
        let mut stmt = conn
            .prepare(&format!("SELECT {TARGET_COLUMNS} FROM targets WHERE uuid = ?"))
            .await?;

        let mut rows = stmt.query(params![uuid.to_string()]).await?;

        match rows.next().await? {
            Some(row) => Ok(Some(row_to_target(&row)?)),
            None => Ok(None),
        }
    }

    async fn save_target(&self, target: &TargetRecord) -> Result<i64> {
        ensure!(
            target.healthy_min_status <= target.healthy_max_status,
            "healthy status range {}-{} is empty",
            target.healthy_min_status,
            target.healthy_max_status
        );

        let conn = self.get_conn().await?;
        let created_at = TargetRecord::timestamp_to_i64(target.created_at);
        let updated_at = TargetRecord::timestamp_to_i64(target.updated_at);

        if let Some(id) = target.id {
            // Update existing target
            conn.execute(
                "UPDATE targets SET name = ?, url = ?, method = ?, headers = ?, healthy_min_status = ?, healthy_max_status = ?, healthy_content = ?, timeout_ms = ?, enabled = ?, updated_at = ? WHERE id = ?",
                params![
                    target.name.clone(),
                    target.url.clone(),
                    target.method.clone(),
                    target.headers_json(),
                    target.healthy_min_status as i64,
                    target.healthy_max_status as i64,
                    target.healthy_content.clone(),
                    target.timeout_ms as i64,
                    if target.enabled { 1 } else { 0 },
                    updated_at,
                    id
                ],
            )
            .await?;
            Ok(id)
        } else {
            // Insert new target
            conn.execute(
                "INSERT INTO targets (uuid, name, url, method, headers, healthy_min_status, healthy_max_status, healthy_content, timeout_ms, enabled, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    target.uuid.to_string(),
                    target.name.clone(),
                    target.url.clone(),
                    target.method.clone(),
                    target.headers_json(),
                    target.healthy_min_status as i64,
                    target.healthy_max_status as i64,
                    target.healthy_content.clone(),
                    target.timeout_ms as i64,
                    if target.enabled { 1 } else { 0 },
                    created_at,
                    updated_at
                ],
            )
            .await?;

            Ok(conn.last_insert_rowid())
        }
    }

    async fn delete_target(&self, uuid: Uuid) -> Result<bool> {
        let conn = self.get_conn().await?;

        let deleted = conn
            .execute("DELETE FROM targets WHERE uuid = ?", params![uuid.to_string()])
            .await?;
        Ok(deleted > 0)
    }

    async fn count(&self) -> Result<usize> {
        let conn = self.get_conn().await?;
        let mut rows = conn.query("SELECT COUNT(*) FROM targets", ()).await?;

        let count = match rows.next().await? {
            Some(row) => row.get::<i64>(0)?,
            None => 0,
        };
        Ok(usize::try_from(count)?)
    }
}
