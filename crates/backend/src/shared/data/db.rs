use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};
use std::path::Path;

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

/// Tables of the catalog and of the system settings
const SCHEMA: &[(&str, &str)] = &[
    (
        "catalog_entity",
        r#"
        CREATE TABLE catalog_entity (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            resource TEXT NOT NULL,
            name TEXT NOT NULL,
            code TEXT,
            description TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            display_order INTEGER,
            attributes TEXT NOT NULL DEFAULT '{}',
            created_at TEXT,
            updated_at TEXT
        );
        "#,
    ),
    (
        "sys_settings",
        r#"
        CREATE TABLE sys_settings (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT
        );
        "#,
    ),
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_catalog_entity_resource_order ON catalog_entity (resource, display_order, id);",
    "CREATE INDEX IF NOT EXISTS idx_catalog_entity_resource_code ON catalog_entity (resource, code);",
];

/// Open (and create if missing) the SQLite file at `db_file`
pub async fn connect(db_file: &Path) -> anyhow::Result<DatabaseConnection> {
    if let Some(parent) = db_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if db_file.is_absolute() {
        db_file.to_path_buf()
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);
    let conn = Database::connect(&db_url).await?;
    ensure_schema(&conn).await?;
    Ok(conn)
}

/// Create missing tables and indexes
pub async fn ensure_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    for (table, create_sql) in SCHEMA {
        let check_sql = format!(
            "SELECT name FROM sqlite_master WHERE type='table' AND name='{}';",
            table
        );
        let existing = conn
            .query_all(Statement::from_string(DatabaseBackend::Sqlite, check_sql))
            .await?;

        if existing.is_empty() {
            tracing::info!("Creating {} table", table);
            conn.execute(Statement::from_string(
                DatabaseBackend::Sqlite,
                create_sql.to_string(),
            ))
            .await?;
        }
    }

    for index_sql in INDEXES {
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            index_sql.to_string(),
        ))
        .await?;
    }

    Ok(())
}

/// Connect to the configured database and keep the connection for handlers
pub async fn initialize_database(db_file: &Path) -> anyhow::Result<()> {
    tracing::info!("Opening database at {}", db_file.display());
    let conn = connect(db_file).await?;
    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    Ok(())
}

pub fn get_connection() -> anyhow::Result<&'static DatabaseConnection> {
    DB_CONN
        .get()
        .ok_or_else(|| anyhow::anyhow!("Database connection has not been initialized"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_is_created_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db").join("app.db");

        let conn = connect(&path).await.unwrap();
        // second run finds the tables and only re-checks indexes
        ensure_schema(&conn).await.unwrap();

        let tables = conn
            .query_all(Statement::from_string(
                DatabaseBackend::Sqlite,
                "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('catalog_entity', 'sys_settings');"
                    .to_string(),
            ))
            .await
            .unwrap();
        assert_eq!(tables.len(), 2);
        assert!(path.exists());
    }
}
