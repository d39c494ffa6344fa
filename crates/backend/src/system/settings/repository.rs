use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};
use std::collections::BTreeMap;

/// All stored settings as key → value
pub async fn load_all<C: ConnectionTrait>(conn: &C) -> Result<BTreeMap<String, String>> {
    let rows = conn
        .query_all(Statement::from_string(
            DatabaseBackend::Sqlite,
            "SELECT key, value FROM sys_settings".to_string(),
        ))
        .await?;

    let mut values = BTreeMap::new();
    for row in rows {
        let key: String = row.try_get("", "key")?;
        let value: String = row.try_get("", "value")?;
        values.insert(key, value);
    }
    Ok(values)
}

/// Insert or replace one setting
pub async fn upsert<C: ConnectionTrait>(conn: &C, key: &str, value: &str) -> Result<()> {
    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT INTO sys_settings (key, value, updated_at) VALUES (?, ?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        [
            key.into(),
            value.into(),
            Utc::now().to_rfc3339().into(),
        ],
    ))
    .await
    .with_context(|| format!("Failed to save setting {}", key))?;

    Ok(())
}

pub async fn delete<C: ConnectionTrait>(conn: &C, key: &str) -> Result<()> {
    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "DELETE FROM sys_settings WHERE key = ?",
        [key.into()],
    ))
    .await
    .with_context(|| format!("Failed to delete setting {}", key))?;

    Ok(())
}
