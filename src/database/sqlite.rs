// ABOUTME: SQLite food store with inline schema migration and three-pass name lookup
// ABOUTME: Persists curated and learned records so AI estimates survive restarts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{name_variations, normalize_food_name, seed_records, FoodRecord, FoodStore};
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nutriscan_core::models::{FoodIdentity, NutrientValues, NutritionProfile, SourceKind};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

const SELECT_COLUMNS: &str = "SELECT id, name, brand, barcode, ingredients, category, \
     nutrients_json, confidence, origin, learned, created_at FROM foods";

/// Food store persisted in SQLite
#[derive(Debug, Clone)]
pub struct SqliteFoodStore {
    pool: SqlitePool,
}

impl SqliteFoodStore {
    /// Connect and run migrations.
    ///
    /// File databases are created when missing. In-memory databases use a
    /// single connection so every query sees the same data.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or migration fails
    pub async fn connect(database_url: &str) -> AppResult<Self> {
        let in_memory = database_url.contains(":memory:");
        let connection_options = if in_memory || database_url.contains('?') {
            database_url.to_owned()
        } else {
            format!("{database_url}?mode=rwc")
        };

        let max_connections = if in_memory { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&connection_options)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect to {database_url}: {e}")))?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Wrap an existing pool; call [`Self::migrate`] before use
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create tables and indexes
    ///
    /// # Errors
    ///
    /// Returns an error if a statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS foods (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                name_lower TEXT NOT NULL,
                brand TEXT,
                barcode TEXT UNIQUE,
                ingredients TEXT,
                category TEXT,
                nutrients_json TEXT NOT NULL,
                confidence REAL NOT NULL,
                origin TEXT NOT NULL,
                learned INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create foods table: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_foods_name_lower ON foods(name_lower)")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to create foods index: {e}")))?;

        Ok(())
    }

    /// Load the curated seed foods when the table is empty
    ///
    /// Returns the number of records inserted.
    ///
    /// # Errors
    ///
    /// Returns an error if counting or inserting fails
    pub async fn seed_if_empty(&self, confidence: f64) -> AppResult<usize> {
        if self.count().await? > 0 {
            return Ok(0);
        }
        let records = seed_records(confidence);
        let inserted = records.len();
        for record in records {
            self.upsert(record).await?;
        }
        info!(inserted, "Seeded food store");
        Ok(inserted)
    }

    async fn fetch_one_where(&self, clause: &str, term: &str) -> AppResult<Option<FoodRecord>> {
        let sql = format!("{SELECT_COLUMNS} WHERE {clause} ORDER BY length(name), name LIMIT 1");
        let row = sqlx::query(&sql)
            .bind(term)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to query foods: {e}")))?;
        row.as_ref().map(row_to_record).transpose()
    }
}

fn row_to_record(row: &SqliteRow) -> AppResult<FoodRecord> {
    let id: String = row.get("id");
    let nutrients_json: String = row.get("nutrients_json");
    let origin: String = row.get("origin");
    let created_at: String = row.get("created_at");
    let learned: i64 = row.get("learned");

    let per_100g: NutrientValues = serde_json::from_str(&nutrients_json)
        .map_err(|e| AppError::serialization(format!("Corrupt nutrients for food {id}: {e}")))?;

    Ok(FoodRecord {
        id: Uuid::parse_str(&id)
            .map_err(|e| AppError::database(format!("Invalid food id {id}: {e}")))?,
        identity: FoodIdentity {
            name: row.get("name"),
            brand: row.get("brand"),
            barcode: row.get("barcode"),
            ingredients: row.get("ingredients"),
            category: row.get("category"),
        },
        per_100g,
        confidence: row.get("confidence"),
        origin: SourceKind::parse(&origin)
            .ok_or_else(|| AppError::database(format!("Unknown food origin: {origin}")))?,
        learned: learned != 0,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| AppError::database(format!("Invalid created_at {created_at}: {e}")))?
            .with_timezone(&Utc),
    })
}

#[async_trait]
impl FoodStore for SqliteFoodStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<FoodRecord>> {
        let query = normalize_food_name(name);
        if query.is_empty() {
            return Ok(None);
        }

        if let Some(record) = self.fetch_one_where("name_lower = $1", &query).await? {
            return Ok(Some(record));
        }
        if let Some(record) = self.fetch_one_where("instr(name_lower, $1) > 0", &query).await? {
            return Ok(Some(record));
        }
        for variation in name_variations(&query) {
            if let Some(record) = self
                .fetch_one_where("instr(name_lower, $1) > 0", &variation)
                .await?
            {
                debug!(query, variation, "Matched food by name variation");
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    async fn find_by_barcode(&self, barcode: &str) -> AppResult<Option<FoodRecord>> {
        self.fetch_one_where("barcode = $1", barcode).await
    }

    async fn upsert(&self, record: FoodRecord) -> AppResult<()> {
        let nutrients_json = serde_json::to_string(&record.per_100g)
            .map_err(|e| AppError::serialization(format!("Failed to encode nutrients: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO foods (id, name, name_lower, brand, barcode, ingredients, category,
                               nutrients_json, confidence, origin, learned, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                name_lower = excluded.name_lower,
                brand = excluded.brand,
                barcode = excluded.barcode,
                ingredients = excluded.ingredients,
                category = excluded.category,
                nutrients_json = excluded.nutrients_json,
                confidence = excluded.confidence,
                origin = excluded.origin,
                learned = excluded.learned
            ",
        )
        .bind(record.id.to_string())
        .bind(&record.identity.name)
        .bind(record.name_key())
        .bind(&record.identity.brand)
        .bind(&record.identity.barcode)
        .bind(&record.identity.ingredients)
        .bind(&record.identity.category)
        .bind(nutrients_json)
        .bind(record.confidence)
        .bind(record.origin.as_str())
        .bind(i64::from(record.learned))
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to store food: {e}")))?;

        Ok(())
    }

    async fn save_learned_profile(
        &self,
        profile: &NutritionProfile,
        confidence: f64,
    ) -> AppResult<Option<FoodRecord>> {
        let record = FoodRecord::learned(profile, confidence);
        let name_key = record.name_key();
        if name_key.is_empty() {
            return Ok(None);
        }
        let nutrients_json = serde_json::to_string(&record.per_100g)
            .map_err(|e| AppError::serialization(format!("Failed to encode nutrients: {e}")))?;

        // Single statement so concurrent learners cannot both insert
        let result = sqlx::query(
            r"
            INSERT INTO foods (id, name, name_lower, brand, barcode, ingredients, category,
                               nutrients_json, confidence, origin, learned, created_at)
            SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 1, $11
            WHERE NOT EXISTS (
                SELECT 1 FROM foods WHERE name_lower = $3 OR ($5 IS NOT NULL AND barcode = $5)
            )
            ",
        )
        .bind(record.id.to_string())
        .bind(&record.identity.name)
        .bind(&name_key)
        .bind(&record.identity.brand)
        .bind(&record.identity.barcode)
        .bind(&record.identity.ingredients)
        .bind(&record.identity.category)
        .bind(nutrients_json)
        .bind(record.confidence)
        .bind(record.origin.as_str())
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to store learned food: {e}")))?;

        if result.rows_affected() == 0 {
            debug!(food = %record.identity.name, "Skipping learned record, food already stored");
            return Ok(None);
        }
        Ok(Some(record))
    }

    async fn list(&self, limit: usize) -> AppResult<Vec<FoodRecord>> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY name LIMIT $1");
        let rows = sqlx::query(&sql)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list foods: {e}")))?;
        rows.iter().map(row_to_record).collect()
    }

    async fn count(&self) -> AppResult<usize> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM foods")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count foods: {e}")))?;
        let total: i64 = row.get("total");
        Ok(usize::try_from(total).unwrap_or(0))
    }
}
