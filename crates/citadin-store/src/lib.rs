//! # Citadin Store
//!
//! DuckDB-backed storage of persisted city indicators.
//!
//! ## Tables
//!
//! | Table | Description |
//! |-------|-------------|
//! | `cities` | Cities known to the observatory (`id`, `name`, `insee_code`) |
//! | `indicators` | One measured value per city, type and date |
//! | `schema_migrations` | Applied migration versions |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use citadin_store::{IndicatorFilter, IndicatorStore, StoreConfig};
//!
//! let store = IndicatorStore::open(StoreConfig::new("citadin.duckdb"))?;
//! let latest = store.list_indicators(&IndicatorFilter {
//!     city_id: Some(1),
//!     indicator_type: None,
//! })?;
//! println!("{} indicators", latest.len());
//! # Ok::<(), citadin_store::StoreError>(())
//! ```
//!
//! All values are bound as query parameters, never interpolated.

pub mod duckdb;
pub mod migrations;

use std::fs;
use std::path::{Path, PathBuf};

use ::duckdb::ToSql;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use duckdb::{AccessMode, DuckDbConnectionManager, PooledConnection};

/// Maximum number of indicators returned by one listing.
pub const LIST_LIMIT: usize = 1000;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    /// Idle connections kept per access mode.
    pub max_pool_size: usize,
}

impl StoreConfig {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            max_pool_size: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityRecord {
    pub id: i64,
    pub name: String,
    pub insee_code: String,
}

/// A persisted indicator as returned to API clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRecord {
    pub id: i64,
    pub city_id: i64,
    #[serde(rename = "type")]
    pub indicator_type: String,
    pub value: Option<f64>,
    /// `YYYY-MM-DD`.
    pub date: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewIndicator {
    pub city_id: i64,
    pub indicator_type: String,
    pub value: Option<f64>,
    /// `YYYY-MM-DD`.
    pub date: Option<String>,
    pub source: Option<String>,
}

/// Optional equality filters of the indicator listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicatorFilter {
    pub city_id: Option<i64>,
    pub indicator_type: Option<String>,
}

/// Indicator storage over an embedded `DuckDB` file.
#[derive(Clone)]
pub struct IndicatorStore {
    manager: DuckDbConnectionManager,
}

impl IndicatorStore {
    /// Open (creating if needed) the database and apply migrations.
    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        if let Some(parent) = config.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let manager = DuckDbConnectionManager::open(config.db_path, config.max_pool_size)?;
        let store = Self { manager };
        store.initialize()?;
        Ok(store)
    }

    pub fn initialize(&self) -> Result<(), StoreError> {
        let connection = self.manager.acquire(AccessMode::ReadWrite)?;
        migrations::apply_migrations(&connection)?;
        Ok(())
    }

    pub fn db_path(&self) -> &Path {
        self.manager.db_path()
    }

    pub fn insert_city(&self, name: &str, insee_code: &str) -> Result<CityRecord, StoreError> {
        if name.trim().is_empty() || insee_code.trim().is_empty() {
            return Err(StoreError::InvalidRecord(String::from(
                "city name and INSEE code must not be blank",
            )));
        }

        let connection = self.manager.acquire(AccessMode::ReadWrite)?;
        let params: [&dyn ToSql; 2] = [&name, &insee_code];
        let id: i64 = connection.query_row(
            "INSERT INTO cities (name, insee_code) VALUES (?, ?) RETURNING id",
            params.as_slice(),
            |row| row.get(0),
        )?;

        Ok(CityRecord {
            id,
            name: name.to_owned(),
            insee_code: insee_code.to_owned(),
        })
    }

    /// Insert indicators in one transaction; returns their ids in order.
    pub fn insert_indicators(&self, rows: &[NewIndicator]) -> Result<Vec<i64>, StoreError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let connection = self.manager.acquire(AccessMode::ReadWrite)?;
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<Vec<i64>, StoreError> {
            let mut ids = Vec::with_capacity(rows.len());
            for row in rows {
                if row.indicator_type.trim().is_empty() {
                    return Err(StoreError::InvalidRecord(String::from(
                        "indicator type must not be blank",
                    )));
                }

                let params: [&dyn ToSql; 5] = [
                    &row.city_id,
                    &row.indicator_type,
                    &row.value,
                    &row.date,
                    &row.source,
                ];
                let id: i64 = connection.query_row(
                    "INSERT INTO indicators (city_id, type, value, date, source) \
                     VALUES (?, ?, ?, CAST(? AS DATE), ?) RETURNING id",
                    params.as_slice(),
                    |record| record.get(0),
                )?;
                ids.push(id);
            }
            Ok(ids)
        })();

        match result {
            Ok(ids) => {
                connection.execute_batch("COMMIT")?;
                Ok(ids)
            }
            Err(error) => {
                let _ = connection.execute_batch("ROLLBACK");
                Err(error)
            }
        }
    }

    /// Indicators matching `filter`, newest date first, at most [`LIST_LIMIT`].
    ///
    /// Undated indicators sort after dated ones; ties keep insertion order.
    pub fn list_indicators(
        &self,
        filter: &IndicatorFilter,
    ) -> Result<Vec<IndicatorRecord>, StoreError> {
        let mut clauses = Vec::new();
        let mut params: Vec<&dyn ToSql> = Vec::new();
        if let Some(city_id) = &filter.city_id {
            clauses.push("city_id = ?");
            params.push(city_id);
        }
        if let Some(indicator_type) = &filter.indicator_type {
            clauses.push("type = ?");
            params.push(indicator_type);
        }

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };
        // Undated rows sort last. PostgreSQL's plain `DESC` would list them first.
        let sql = format!(
            "SELECT id, city_id, type, value, CAST(date AS VARCHAR), source \
             FROM indicators{where_clause} \
             ORDER BY date DESC NULLS LAST, id \
             LIMIT {LIST_LIMIT}"
        );
        debug!(sql = %sql, "listing indicators");

        let connection = self.manager.acquire(AccessMode::ReadOnly)?;
        let mut statement = connection.prepare(&sql)?;
        let rows = statement.query_map(params.as_slice(), |row| {
            Ok(IndicatorRecord {
                id: row.get(0)?,
                city_id: row.get(1)?,
                indicator_type: row.get(2)?,
                value: row.get(3)?,
                date: row.get(4)?,
                source: row.get(5)?,
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_store(temp: &tempfile::TempDir) -> IndicatorStore {
        IndicatorStore::open(StoreConfig {
            db_path: temp.path().join("store").join("citadin.duckdb"),
            max_pool_size: 2,
        })
        .expect("store open")
    }

    fn indicator(city_id: i64, kind: &str, date: Option<&str>) -> NewIndicator {
        NewIndicator {
            city_id,
            indicator_type: kind.to_owned(),
            value: Some(1.5),
            date: date.map(str::to_owned),
            source: Some(String::from("test")),
        }
    }

    #[test]
    fn filters_and_orders_newest_first() {
        let temp = tempdir().expect("tempdir");
        let store = open_store(&temp);
        let lyon = store.insert_city("Lyon", "69123").expect("city");
        let paris = store.insert_city("Paris", "75056").expect("city");

        store
            .insert_indicators(&[
                indicator(lyon.id, "pm10", Some("2024-01-01")),
                indicator(lyon.id, "pm10", None),
                indicator(lyon.id, "no2", Some("2024-06-01")),
                indicator(lyon.id, "pm10", Some("2024-03-01")),
                indicator(paris.id, "pm10", Some("2025-01-01")),
            ])
            .expect("insert");

        let rows = store
            .list_indicators(&IndicatorFilter {
                city_id: Some(lyon.id),
                indicator_type: Some(String::from("pm10")),
            })
            .expect("list");
        let dates = rows.iter().map(|row| row.date.clone()).collect::<Vec<_>>();
        assert_eq!(
            dates,
            vec![
                Some(String::from("2024-03-01")),
                Some(String::from("2024-01-01")),
                None
            ]
        );

        let all = store.list_indicators(&IndicatorFilter::default()).expect("list");
        assert_eq!(all.len(), 5);
        assert_eq!(all[0].city_id, paris.id);
    }

    #[test]
    fn listing_is_capped() {
        let temp = tempdir().expect("tempdir");
        let store = open_store(&temp);
        let city = store.insert_city("Lyon", "69123").expect("city");
        let rows = (0..LIST_LIMIT + 5)
            .map(|_| indicator(city.id, "pm10", Some("2024-01-01")))
            .collect::<Vec<_>>();
        store.insert_indicators(&rows).expect("insert");

        let listed = store.list_indicators(&IndicatorFilter::default()).expect("list");
        assert_eq!(listed.len(), LIST_LIMIT);
    }

    #[test]
    fn values_are_bound_not_interpolated() {
        let temp = tempdir().expect("tempdir");
        let store = open_store(&temp);
        let city = store.insert_city("Lyon", "69123").expect("city");
        let hostile = "pm10'; DROP TABLE indicators; --";
        store
            .insert_indicators(&[indicator(city.id, hostile, None)])
            .expect("insert");

        let rows = store
            .list_indicators(&IndicatorFilter {
                city_id: None,
                indicator_type: Some(hostile.to_owned()),
            })
            .expect("list");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].indicator_type, hostile);
    }

    #[test]
    fn failed_batch_is_rolled_back() {
        let temp = tempdir().expect("tempdir");
        let store = open_store(&temp);
        let city = store.insert_city("Lyon", "69123").expect("city");

        let error = store
            .insert_indicators(&[
                indicator(city.id, "pm10", None),
                indicator(city.id, " ", None),
            ])
            .expect_err("blank type");
        assert!(matches!(error, StoreError::InvalidRecord(_)));
        assert!(store
            .list_indicators(&IndicatorFilter::default())
            .expect("list")
            .is_empty());
    }

    #[test]
    fn records_serialize_with_public_field_names() {
        let record = IndicatorRecord {
            id: 1,
            city_id: 2,
            indicator_type: String::from("pm10"),
            value: None,
            date: Some(String::from("2024-01-01")),
            source: None,
        };
        assert_eq!(
            serde_json::to_value(record).expect("serializable"),
            serde_json::json!({
                "id": 1, "city_id": 2, "type": "pm10",
                "value": null, "date": "2024-01-01", "source": null
            })
        );
    }

    #[test]
    fn cities_require_unique_non_blank_codes() {
        let temp = tempdir().expect("tempdir");
        let store = open_store(&temp);
        let lyon = store.insert_city("Lyon", "69123").expect("city");
        let paris = store.insert_city("Paris", "75056").expect("city");

        assert_ne!(lyon.id, paris.id);
        assert_eq!(paris.insee_code, "75056");
        assert!(store.insert_city("Lyon bis", "69123").is_err());
        assert!(matches!(
            store.insert_city(" ", "13055"),
            Err(StoreError::InvalidRecord(_))
        ));
    }
}
