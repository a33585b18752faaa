// ABOUTME: SQLite implementation of the DatabaseProvider trait
// ABOUTME: Owns the connection pool, schema migrations, and all SQL for the embedded backend
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFit.app

//! SQLite database implementation

use super::DatabaseProvider;
use crate::constants::database;
use crate::models::{AccessCode, User, UserStatus};
use crate::terms::models::{AcceptanceMethod, AcceptanceRecord, UserAcceptanceState};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::time::Duration;
use uuid::Uuid;

/// SQLite database provider backed by a connection pool
#[derive(Clone)]
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Direct access to the pool for test setup
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn row_to_user(row: &SqliteRow) -> Result<User> {
        let id_str: String = row.try_get("id")?;
        let status_str: String = row.try_get("status")?;
        let created_at_str: String = row.try_get("created_at")?;
        let last_active_str: String = row.try_get("last_active")?;

        Ok(User {
            id: Uuid::parse_str(&id_str)?,
            email: row.try_get("email")?,
            display_name: row.try_get("display_name")?,
            password_hash: row.try_get("password_hash")?,
            status: match status_str.as_str() {
                "suspended" => UserStatus::Suspended,
                _ => UserStatus::Active,
            },
            created_at: DateTime::parse_from_rfc3339(&created_at_str)?.with_timezone(&Utc),
            last_active: DateTime::parse_from_rfc3339(&last_active_str)?.with_timezone(&Utc),
        })
    }

    fn row_to_access_code(row: &SqliteRow) -> Result<AccessCode> {
        let created_at_str: String = row.try_get("created_at")?;
        let consumed_by_str: Option<String> = row.try_get("consumed_by")?;
        let consumed_at_str: Option<String> = row.try_get("consumed_at")?;

        Ok(AccessCode {
            code: row.try_get("code")?,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)?.with_timezone(&Utc),
            consumed_by: consumed_by_str
                .as_deref()
                .map(Uuid::parse_str)
                .transpose()?,
            consumed_at: consumed_at_str
                .as_deref()
                .map(DateTime::parse_from_rfc3339)
                .transpose()?
                .map(|dt| dt.with_timezone(&Utc)),
        })
    }

    fn row_to_terms_state(row: &SqliteRow) -> Result<UserAcceptanceState> {
        let user_id_str: String = row.try_get("user_id")?;
        let accepted_at_str: Option<String> = row.try_get("accepted_at")?;
        let last_prompted_str: Option<String> = row.try_get("last_prompted_at")?;

        Ok(UserAcceptanceState {
            user_id: Uuid::parse_str(&user_id_str)?,
            version: row.try_get("version")?,
            accepted_at: accepted_at_str
                .as_deref()
                .map(DateTime::parse_from_rfc3339)
                .transpose()?
                .map(|dt| dt.with_timezone(&Utc)),
            needs_reacceptance: row.try_get("needs_reacceptance")?,
            last_prompted_at: last_prompted_str
                .as_deref()
                .map(DateTime::parse_from_rfc3339)
                .transpose()?
                .map(|dt| dt.with_timezone(&Utc)),
        })
    }

    fn row_to_acceptance(row: &SqliteRow) -> Result<AcceptanceRecord> {
        let id_str: String = row.try_get("id")?;
        let user_id_str: String = row.try_get("user_id")?;
        let method_str: String = row.try_get("method")?;
        let accepted_at_str: String = row.try_get("accepted_at")?;

        // Audit rows are evidence; an unreadable method is an error, not a default.
        let method = AcceptanceMethod::from_str_opt(&method_str)
            .with_context(|| format!("Unknown acceptance method in audit row: {method_str}"))?;

        Ok(AcceptanceRecord {
            id: Uuid::parse_str(&id_str)?,
            user_id: Uuid::parse_str(&user_id_str)?,
            email: row.try_get("email")?,
            display_name: row.try_get("display_name")?,
            version: row.try_get("version")?,
            method,
            accepted_at: DateTime::parse_from_rfc3339(&accepted_at_str)?.with_timezone(&Utc),
            ip_address: row.try_get("ip_address")?,
            user_agent: row.try_get("user_agent")?,
        })
    }
}

#[async_trait]
impl DatabaseProvider for SqliteDatabase {
    async fn new(database_url: &str) -> Result<Self> {
        // A pooled :memory: URL gives every connection its own empty
        // database, so cap the pool at one connection for that case.
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect(database_url)
                .await?
        } else {
            let connection_string = format!("{database_url}?mode=rwc");
            SqlitePoolOptions::new()
                .max_connections(database::POOL_MAX_SIZE)
                .acquire_timeout(Duration::from_secs(database::CONNECTION_TIMEOUT_SECS))
                .connect(&connection_string)
                .await?
        };

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                display_name TEXT,
                password_hash TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'active',
                created_at TEXT NOT NULL,
                last_active TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS access_codes (
                code TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                consumed_by TEXT,
                consumed_at TEXT,
                FOREIGN KEY (consumed_by) REFERENCES users (id) ON DELETE SET NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS user_terms_state (
                user_id TEXT PRIMARY KEY,
                version TEXT,
                accepted_at TEXT,
                needs_reacceptance BOOLEAN NOT NULL DEFAULT 0,
                last_prompted_at TEXT,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS terms_acceptances (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                email TEXT NOT NULL,
                display_name TEXT,
                version TEXT NOT NULL,
                method TEXT NOT NULL,
                accepted_at TEXT NOT NULL,
                ip_address TEXT,
                user_agent TEXT,
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_terms_acceptances_user \
             ON terms_acceptances(user_id, accepted_at)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_terms_acceptances_version \
             ON terms_acceptances(version)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn create_user(&self, user: &User) -> Result<Uuid> {
        sqlx::query(
            r"
            INSERT INTO users (id, email, display_name, password_hash, status, created_at, last_active)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.password_hash)
        .bind(user.status.to_string())
        .bind(user.created_at.to_rfc3339())
        .bind(user.last_active.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(user.id)
    }

    async fn register_user_with_code(&self, user: &User, code: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO users (id, email, display_name, password_hash, status, created_at, last_active)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.password_hash)
        .bind(user.status.to_string())
        .bind(user.created_at.to_rfc3339())
        .bind(user.last_active.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        let consumed = sqlx::query(
            r"
            UPDATE access_codes
            SET consumed_by = ?1, consumed_at = ?2
            WHERE code = ?3 AND consumed_by IS NULL
            ",
        )
        .bind(user.id.to_string())
        .bind(Utc::now().to_rfc3339())
        .bind(code)
        .execute(&mut *tx)
        .await?;

        // Losing the code race drops the whole transaction, including the
        // user row, so a failed signup leaves nothing behind.
        if consumed.rows_affected() == 1 {
            tx.commit().await?;
            Ok(true)
        } else {
            tx.rollback().await?;
            Ok(false)
        }
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?1")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn get_user_by_email_required(&self, email: &str) -> Result<User> {
        self.get_user_by_email(email)
            .await?
            .with_context(|| format!("User not found for email: {email}"))
    }

    async fn get_user_count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get("count")?)
    }

    async fn create_access_code(&self, access_code: &AccessCode) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO access_codes (code, created_at, consumed_by, consumed_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(&access_code.code)
        .bind(access_code.created_at.to_rfc3339())
        .bind(access_code.consumed_by.map(|id| id.to_string()))
        .bind(access_code.consumed_at.map(|dt| dt.to_rfc3339()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_access_code(&self, code: &str) -> Result<Option<AccessCode>> {
        let row = sqlx::query("SELECT * FROM access_codes WHERE code = ?1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_access_code).transpose()
    }

    async fn consume_access_code(&self, code: &str, user_id: Uuid) -> Result<bool> {
        // Single guarded UPDATE; two racing signups cannot both win.
        let result = sqlx::query(
            r"
            UPDATE access_codes
            SET consumed_by = ?1, consumed_at = ?2
            WHERE code = ?3 AND consumed_by IS NULL
            ",
        )
        .bind(user_id.to_string())
        .bind(Utc::now().to_rfc3339())
        .bind(code)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_access_codes(&self, include_consumed: bool) -> Result<Vec<AccessCode>> {
        let query = if include_consumed {
            "SELECT * FROM access_codes ORDER BY created_at DESC"
        } else {
            "SELECT * FROM access_codes WHERE consumed_by IS NULL ORDER BY created_at DESC"
        };

        let rows = sqlx::query(query).fetch_all(&self.pool).await?;

        rows.iter().map(Self::row_to_access_code).collect()
    }

    async fn get_terms_state(&self, user_id: Uuid) -> Result<Option<UserAcceptanceState>> {
        let row = sqlx::query("SELECT * FROM user_terms_state WHERE user_id = ?1")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_terms_state).transpose()
    }

    async fn record_acceptance(&self, record: &AcceptanceRecord) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO terms_acceptances (id, user_id, email, display_name, version, method, accepted_at, ip_address, user_agent)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ",
        )
        .bind(record.id.to_string())
        .bind(record.user_id.to_string())
        .bind(&record.email)
        .bind(&record.display_name)
        .bind(&record.version)
        .bind(record.method.as_str())
        .bind(record.accepted_at.to_rfc3339())
        .bind(&record.ip_address)
        .bind(&record.user_agent)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
            INSERT INTO user_terms_state (user_id, version, accepted_at, needs_reacceptance, last_prompted_at, updated_at)
            VALUES (?1, ?2, ?3, 0, NULL, ?4)
            ON CONFLICT(user_id) DO UPDATE SET
                version = excluded.version,
                accepted_at = excluded.accepted_at,
                needs_reacceptance = 0,
                updated_at = excluded.updated_at
            ",
        )
        .bind(record.user_id.to_string())
        .bind(&record.version)
        .bind(record.accepted_at.to_rfc3339())
        .bind(record.accepted_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn apply_acceptance_to_state(&self, record: &AcceptanceRecord) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO user_terms_state (user_id, version, accepted_at, needs_reacceptance, last_prompted_at, updated_at)
            VALUES (?1, ?2, ?3, 0, NULL, ?4)
            ON CONFLICT(user_id) DO UPDATE SET
                version = excluded.version,
                accepted_at = excluded.accepted_at,
                needs_reacceptance = 0,
                updated_at = excluded.updated_at
            ",
        )
        .bind(record.user_id.to_string())
        .bind(&record.version)
        .bind(record.accepted_at.to_rfc3339())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn require_reacceptance(&self, user_id: Uuid) -> Result<()> {
        let now = Utc::now().to_rfc3339();

        // Forcing the flag also stamps last_prompted_at; normal acceptance
        // never touches that column.
        sqlx::query(
            r"
            INSERT INTO user_terms_state (user_id, version, accepted_at, needs_reacceptance, last_prompted_at, updated_at)
            VALUES (?1, NULL, NULL, 1, ?2, ?2)
            ON CONFLICT(user_id) DO UPDATE SET
                needs_reacceptance = 1,
                last_prompted_at = excluded.last_prompted_at,
                updated_at = excluded.updated_at
            ",
        )
        .bind(user_id.to_string())
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn require_reacceptance_all(&self) -> Result<u64> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r"
            UPDATE user_terms_state
            SET needs_reacceptance = 1, last_prompted_at = ?1, updated_at = ?1
            WHERE needs_reacceptance = 0
            ",
        )
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn get_acceptance_history(
        &self,
        user_id: Uuid,
        limit: Option<u32>,
    ) -> Result<Vec<AcceptanceRecord>> {
        let limit = i64::from(limit.unwrap_or(u32::MAX));

        let rows = sqlx::query(
            r"
            SELECT * FROM terms_acceptances
            WHERE user_id = ?1
            ORDER BY accepted_at DESC
            LIMIT ?2
            ",
        )
        .bind(user_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_acceptance).collect()
    }

    async fn count_acceptances_for_version(&self, version: &str) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM terms_acceptances WHERE version = ?1")
            .bind(version)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get("count")?)
    }

    async fn count_acceptances_by_method(&self) -> Result<Vec<(AcceptanceMethod, i64)>> {
        let rows = sqlx::query(
            r"
            SELECT method, COUNT(*) as count
            FROM terms_acceptances
            GROUP BY method
            ORDER BY method
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let method_str: String = row.try_get("method")?;
                let method = AcceptanceMethod::from_str_opt(&method_str).with_context(|| {
                    format!("Unknown acceptance method in audit row: {method_str}")
                })?;
                let count: i64 = row.try_get("count")?;
                Ok((method, count))
            })
            .collect()
    }

    async fn get_latest_acceptances(&self) -> Result<Vec<AcceptanceRecord>> {
        // One row per user, keeping the newest audit record.
        let rows = sqlx::query(
            r"
            SELECT t.* FROM terms_acceptances t
            INNER JOIN (
                SELECT user_id, MAX(accepted_at) as max_accepted
                FROM terms_acceptances
                GROUP BY user_id
            ) latest ON t.user_id = latest.user_id AND t.accepted_at = latest.max_accepted
            ORDER BY t.accepted_at DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_acceptance).collect()
    }

    async fn list_terms_states(&self) -> Result<Vec<UserAcceptanceState>> {
        let rows = sqlx::query("SELECT * FROM user_terms_state ORDER BY user_id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_terms_state).collect()
    }
}
