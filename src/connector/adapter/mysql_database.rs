use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::{Column, Row, TypeInfo, ValueRef};
use tracing::{debug, info};

use crate::application::{DatabaseAccessor, DatabaseConnector};
use crate::domain::{ConnectionConfig, DomainError, QueryResult, SqlValue};

/// Rows shown per table in the schema description.
const SAMPLE_ROWS: usize = 3;
/// Sample cells longer than this are cut to keep prompts small.
const SAMPLE_VALUE_MAX_CHARS: usize = 100;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

const LIST_TABLES_SQL: &str = "SELECT table_name FROM information_schema.tables \
     WHERE table_schema = DATABASE() AND table_type = 'BASE TABLE' \
     ORDER BY table_name";

/// [`DatabaseAccessor`] over a MySQL server.
///
/// Holds a pool capped at a single connection for the lifetime of the chat
/// session. Statements go through the text protocol so any statement the
/// server accepts can be run and every value arrives as text.
pub struct MySqlDatabase {
    pool: MySqlPool,
    label: String,
}

impl MySqlDatabase {
    /// Validate `config`, open the connection and check that it answers.
    ///
    /// An empty field fails before any network I/O.
    pub async fn connect(
        config: &ConnectionConfig,
        acquire_timeout: Duration,
    ) -> Result<Self, DomainError> {
        let port = config.validate()?;

        let options = MySqlConnectOptions::new()
            .host(config.host.trim())
            .port(port)
            .username(config.user.trim())
            .password(&config.password)
            .database(config.database.trim());

        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(acquire_timeout)
            .connect_with(options)
            .await
            .map_err(|e| {
                DomainError::connection(format!("Failed to connect to {}: {}", config.url(), e))
            })?;

        sqlx::raw_sql("SELECT 1")
            .execute(&pool)
            .await
            .map_err(|e| DomainError::connection(format!("Database did not answer: {}", e)))?;

        info!("Connected to {}", config.url());
        Ok(Self {
            pool,
            label: config.url(),
        })
    }

    async fn table_names(&self) -> Result<Vec<String>, DomainError> {
        let rows = sqlx::raw_sql(LIST_TABLES_SQL)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| schema_read_error("list tables", e))?;

        Ok(rows.iter().map(|row| decode_value(row, 0).to_plain()).collect())
    }

    async fn describe_table(&self, table: &str) -> Result<String, DomainError> {
        let quoted = quote_identifier(table);

        let create_sql = format!("SHOW CREATE TABLE {quoted}");
        let create = sqlx::raw_sql(&create_sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| schema_read_error(&format!("describe table {table}"), e))?;
        let create_statement = decode_value(&create, 1).to_plain();

        let sample_sql = format!("SELECT * FROM {quoted} LIMIT {SAMPLE_ROWS}");
        let sample = sqlx::raw_sql(&sample_sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| schema_read_error(&format!("sample table {table}"), e))?;

        Ok(format!(
            "{}\n\n{}",
            create_statement.trim_end(),
            sample_block(table, &to_query_result(&sample))
        ))
    }
}

#[async_trait]
impl DatabaseAccessor for MySqlDatabase {
    async fn schema_info(&self) -> Result<String, DomainError> {
        let tables = self.table_names().await?;
        debug!("Describing {} tables", tables.len());

        let mut descriptions = Vec::with_capacity(tables.len());
        for table in &tables {
            descriptions.push(self.describe_table(table).await?);
        }
        Ok(descriptions.join("\n\n"))
    }

    async fn execute(&self, sql: &str) -> Result<QueryResult, DomainError> {
        info!("Executing generated SQL on {}: {}", self.label, sql);

        let rows = sqlx::raw_sql(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::execution(e.to_string()))?;

        Ok(to_query_result(&rows))
    }
}

/// Opens a [`MySqlDatabase`] per chat session.
pub struct MySqlConnector {
    acquire_timeout: Duration,
}

impl MySqlConnector {
    pub fn new(acquire_timeout: Duration) -> Self {
        Self { acquire_timeout }
    }
}

impl Default for MySqlConnector {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS))
    }
}

#[async_trait]
impl DatabaseConnector for MySqlConnector {
    async fn connect(
        &self,
        config: &ConnectionConfig,
    ) -> Result<Arc<dyn DatabaseAccessor>, DomainError> {
        let database = MySqlDatabase::connect(config, self.acquire_timeout).await?;
        Ok(Arc::new(database))
    }
}

fn to_query_result(rows: &[MySqlRow]) -> QueryResult {
    let columns = rows
        .first()
        .map(|row| {
            row.columns()
                .iter()
                .map(|c| c.name().to_string())
                .collect()
        })
        .unwrap_or_default();

    let values = rows
        .iter()
        .map(|row| (0..row.len()).map(|i| decode_value(row, i)).collect())
        .collect();

    QueryResult::new(columns, values)
}

/// Decode one cell by the column type the server reported.
fn decode_value(row: &MySqlRow, index: usize) -> SqlValue {
    match row.try_get_raw(index) {
        Ok(raw) if !raw.is_null() => {}
        _ => return SqlValue::Null,
    }

    let type_name = row.column(index).type_info().name().to_uppercase();
    let base_type = type_name.split_whitespace().next().unwrap_or_default();

    match base_type {
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" | "BOOLEAN" => {
            let decoded = if type_name.contains("UNSIGNED") {
                row.try_get_unchecked::<u64, _>(index).map(SqlValue::UInt)
            } else {
                row.try_get_unchecked::<i64, _>(index).map(SqlValue::Int)
            };
            if let Ok(value) = decoded {
                return value;
            }
        }
        "FLOAT" | "DOUBLE" => {
            if let Ok(value) = row.try_get_unchecked::<f64, _>(index) {
                return SqlValue::Float(value);
            }
        }
        "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BINARY" | "VARBINARY" | "BIT" => {
            if let Ok(bytes) = row.try_get_unchecked::<Vec<u8>, _>(index) {
                return match String::from_utf8(bytes) {
                    Ok(text) => SqlValue::Text(text),
                    Err(e) => SqlValue::Bytes(e.into_bytes()),
                };
            }
        }
        _ => {}
    }

    // DECIMAL, dates, times, JSON and character types all arrive as text.
    if let Ok(text) = row.try_get_unchecked::<String, _>(index) {
        return SqlValue::Text(text);
    }
    match row.try_get_unchecked::<Vec<u8>, _>(index) {
        Ok(bytes) => SqlValue::Text(String::from_utf8_lossy(&bytes).into_owned()),
        Err(_) => SqlValue::Null,
    }
}

/// Schema introspection runs before any generated SQL, so its failures are
/// reported against the connection rather than as a query error.
fn schema_read_error(action: &str, e: sqlx::Error) -> DomainError {
    DomainError::connection(format!("Failed to {action}: {e}"))
}

fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Comment block with a few sample rows, appended after each CREATE TABLE.
fn sample_block(table: &str, sample: &QueryResult) -> String {
    let mut lines = vec![
        "/*".to_string(),
        format!("{} rows from {} table:", SAMPLE_ROWS, table),
        sample.columns().join("\t"),
    ];
    for row in sample.rows() {
        let cells: Vec<String> = row
            .iter()
            .map(|value| truncate(&value.to_plain(), SAMPLE_VALUE_MAX_CHARS))
            .collect();
        lines.push(cells.join("\t"));
    }
    lines.push("*/".to_string());
    lines.join("\n")
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}
