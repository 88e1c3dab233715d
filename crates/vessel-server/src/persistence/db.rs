//! Database connection and schema migrations.

use anyhow::{Context, Result};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::{debug, info};

/// Schema migrations, applied in order and recorded in `schema_migrations`.
const MIGRATIONS: &[(&str, &str)] = &[
    ("001_init", include_str!("../../migrations/001_init.sql")),
    (
        "002_unique_conditions",
        include_str!("../../migrations/002_unique_conditions.sql"),
    ),
];

/// Database connection wrapper.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Number of stored fuel samples.
    pub async fn fuel_sample_count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM fuel_samples")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Open (or create) the SQLite database and bring its schema up to date.
///
/// `":memory:"` opens a private in-memory database; use a single connection
/// with it, since every connection would otherwise see its own empty database.
pub async fn init_database(db_path: &str, max_connections: u32) -> Result<Database> {
    let db_url = if db_path == ":memory:" {
        "sqlite::memory:".to_string()
    } else {
        if let Some(parent) = Path::new(db_path).parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        format!("sqlite:{}?mode=rwc", db_path)
    };

    info!("Connecting to database: {}", db_path);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect(&db_url)
        .await?;

    run_migrations(&pool).await?;

    Ok(Database { pool })
}

async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await?;

    for &(name, sql) in MIGRATIONS {
        let applied: Option<(String,)> =
            sqlx::query_as("SELECT name FROM schema_migrations WHERE name = ?1")
                .bind(name)
                .fetch_optional(pool)
                .await?;
        if applied.is_some() {
            debug!("Migration {} already applied", name);
            continue;
        }

        let mut tx = pool.begin().await?;
        for statement in statements(sql) {
            sqlx::query(&statement)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("migration {} failed", name))?;
        }
        sqlx::query("INSERT INTO schema_migrations (name) VALUES (?1)")
            .bind(name)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!("Applied migration {}", name);
    }

    Ok(())
}

/// Split a migration file into statements, dropping `--` comment lines.
fn statements(sql: &str) -> Vec<String> {
    sql.split(';')
        .map(|statement| {
            statement
                .lines()
                .filter(|line| !line.trim().starts_with("--"))
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string()
        })
        .filter(|statement| !statement.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_fuel_sample_table() {
        let db = init_database(":memory:", 1).await.unwrap();

        let result: (i32,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='fuel_samples'",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();

        assert_eq!(result.0, 1);
        assert_eq!(db.fuel_sample_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn migrations_are_recorded_once() {
        let db = init_database(":memory:", 1).await.unwrap();
        run_migrations(db.pool()).await.unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM schema_migrations")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, MIGRATIONS.len() as i64);
    }

    #[test]
    fn splits_statements_and_strips_comments() {
        let sql = "-- header\nCREATE TABLE a (x INTEGER);\n\n-- index\nCREATE INDEX i ON a(x);\n";
        assert_eq!(
            statements(sql),
            vec!["CREATE TABLE a (x INTEGER)", "CREATE INDEX i ON a(x)"]
        );
    }
}
