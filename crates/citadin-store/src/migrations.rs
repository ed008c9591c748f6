use ::duckdb::{Connection, ToSql};
use tracing::debug;

struct Migration {
    version: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "0001_cities_indicators",
        sql: r#"
CREATE SEQUENCE IF NOT EXISTS cities_id_seq START 1;
CREATE SEQUENCE IF NOT EXISTS indicators_id_seq START 1;

CREATE TABLE IF NOT EXISTS cities (
    id BIGINT PRIMARY KEY DEFAULT nextval('cities_id_seq'),
    name VARCHAR(255) NOT NULL,
    insee_code VARCHAR(50) NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS indicators (
    id BIGINT PRIMARY KEY DEFAULT nextval('indicators_id_seq'),
    city_id BIGINT NOT NULL REFERENCES cities(id),
    type VARCHAR(100) NOT NULL,
    value DOUBLE,
    date DATE,
    source VARCHAR(255)
);
"#,
    },
    Migration {
        version: "0002_indicator_indexes",
        sql: r#"
CREATE INDEX IF NOT EXISTS idx_cities_name ON cities(name);
CREATE INDEX IF NOT EXISTS idx_indicators_city_id ON indicators(city_id);
CREATE INDEX IF NOT EXISTS idx_indicators_type ON indicators(type);
CREATE INDEX IF NOT EXISTS idx_indicators_date ON indicators(date);
"#,
    },
];

/// Apply every migration not yet recorded in `schema_migrations`.
pub fn apply_migrations(connection: &Connection) -> Result<(), ::duckdb::Error> {
    connection.execute_batch(
        r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version TEXT PRIMARY KEY,
    applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#,
    )?;

    for migration in MIGRATIONS {
        let params: [&dyn ToSql; 1] = [&migration.version];
        let applied: i64 = connection.query_row(
            "SELECT COUNT(*) FROM schema_migrations WHERE version = ?",
            params.as_slice(),
            |row| row.get(0),
        )?;
        if applied > 0 {
            continue;
        }

        debug!(version = migration.version, "applying store migration");
        connection.execute_batch(migration.sql)?;
        connection.execute(
            "INSERT INTO schema_migrations (version) VALUES (?)",
            params.as_slice(),
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let connection = Connection::open_in_memory().expect("in-memory db");
        apply_migrations(&connection).expect("first run");
        apply_migrations(&connection).expect("second run");

        let versions: i64 = connection
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))
            .expect("count");
        assert_eq!(versions, MIGRATIONS.len() as i64);
    }
}
