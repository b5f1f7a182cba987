//! RelationalSink - writes the batch into a SQLite table
//!
//! Each persist runs in one transaction on a blocking thread. `Replace` drops
//! and recreates the table from the batch schema; `Append` creates the table
//! when absent and otherwise requires the existing columns to match.
//!
//! Dropping the `persist` future (e.g. at a stage deadline) interrupts the
//! running statement and the transaction rolls back instead of committing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use contracts::{Ack, Batch, ColumnType, ContractError, DataSink, Schema, Value, WriteMode, DATE_FORMAT};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection, ErrorCode, InterruptHandle};
use tracing::{debug, info, instrument};

use crate::error::DispatcherError;

const SINK_NAME: &str = "relational";

/// Parsed SQLite connection string
#[derive(Debug, Clone, PartialEq, Eq)]
enum SqliteTarget {
    Memory,
    File(String),
}

impl SqliteTarget {
    fn parse(url: &str) -> Result<Self, DispatcherError> {
        let unsupported = || DispatcherError::UnsupportedUrl {
            url: url.to_string(),
        };
        if url == "sqlite::memory:" {
            return Ok(Self::Memory);
        }
        let path = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .ok_or_else(unsupported)?;
        if path.is_empty() {
            return Err(unsupported());
        }
        Ok(Self::File(path.to_string()))
    }

    fn open(&self) -> rusqlite::Result<Connection> {
        match self {
            Self::Memory => Connection::open_in_memory(),
            Self::File(path) => Connection::open(path),
        }
    }
}

/// Open connection plus a handle that can interrupt it from another thread
struct SharedConnection {
    conn: Mutex<Connection>,
    interrupt: InterruptHandle,
}

/// Cancels an in-flight write unless disarmed after the blocking task returns
struct CancelOnDrop {
    shared: Arc<SharedConnection>,
    cancelled: Arc<AtomicBool>,
    armed: bool,
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if self.armed {
            // The flag covers the gaps between statements, where an
            // interrupt alone would be lost.
            self.cancelled.store(true, Ordering::SeqCst);
            self.shared.interrupt.interrupt();
            debug!("Write abandoned, interrupting transaction");
        }
    }
}

/// Sink that writes batches into one table
///
/// The connection is opened on first use and reused afterwards.
pub struct RelationalSink {
    url: String,
    table: String,
    mode: WriteMode,
    conn: Option<Arc<SharedConnection>>,
}

impl RelationalSink {
    pub fn new(url: impl Into<String>, table: impl Into<String>, mode: WriteMode) -> Self {
        Self {
            url: url.into(),
            table: table.into(),
            mode,
            conn: None,
        }
    }

    fn connection(&mut self) -> Result<Arc<SharedConnection>, ContractError> {
        if let Some(conn) = &self.conn {
            return Ok(conn.clone());
        }

        let target = SqliteTarget::parse(&self.url)
            .map_err(|e| ContractError::sink_unavailable(SINK_NAME, e.to_string()))?;
        let conn = target
            .open()
            .map_err(|e| ContractError::sink_unavailable(SINK_NAME, format!("{}: {e}", self.url)))?;
        info!(url = %self.url, "Database connection opened");

        let shared = Arc::new(SharedConnection {
            interrupt: conn.get_interrupt_handle(),
            conn: Mutex::new(conn),
        });
        self.conn = Some(shared.clone());
        Ok(shared)
    }
}

impl DataSink for RelationalSink {
    fn name(&self) -> &str {
        SINK_NAME
    }

    #[instrument(
        name = "relational_sink_persist",
        skip(self, batch),
        fields(table = %self.table, mode = ?self.mode, rows = batch.len())
    )]
    async fn persist(&mut self, batch: &Batch) -> Result<Ack, ContractError> {
        let shared = self.connection()?;
        let table = self.table.clone();
        let mode = self.mode;
        let owned = batch.clone();
        let cancelled = Arc::new(AtomicBool::new(false));

        let mut guard = CancelOnDrop {
            shared: shared.clone(),
            cancelled: cancelled.clone(),
            armed: true,
        };
        let joined = tokio::task::spawn_blocking(move || {
            let mut conn = shared
                .conn
                .lock()
                .map_err(|_| ContractError::sink_write(SINK_NAME, "connection lock poisoned"))?;
            write_batch(&mut conn, &table, mode, &owned, &cancelled)
        })
        .await;
        guard.armed = false;

        let rows_written =
            joined.map_err(|e| ContractError::sink_write(SINK_NAME, e.to_string()))??;

        debug!(rows = rows_written, "Transaction committed");
        Ok(Ack {
            sink: SINK_NAME.to_string(),
            destination: format!("{}#{}", self.url, self.table),
            rows_written,
            bytes_written: None,
        })
    }
}

fn write_batch(
    conn: &mut Connection,
    table: &str,
    mode: WriteMode,
    batch: &Batch,
    cancelled: &AtomicBool,
) -> Result<usize, ContractError> {
    let schema = batch.schema();
    if schema.is_empty() {
        return Err(ContractError::sink_write(SINK_NAME, "batch has no columns"));
    }

    let tx = conn.transaction().map_err(write_error)?;
    match mode {
        WriteMode::Replace => {
            tx.execute_batch(&format!(
                "DROP TABLE IF EXISTS {}; {}",
                quote_ident(table),
                create_table_sql(table, schema)
            ))
            .map_err(write_error)?;
        }
        WriteMode::Append => {
            let existing = table_columns(&tx, table).map_err(write_error)?;
            if existing.is_empty() {
                tx.execute_batch(&create_table_sql(table, schema))
                    .map_err(write_error)?;
            } else {
                check_columns(table, &existing, schema)?;
            }
        }
    }

    let placeholders: Vec<String> = (1..=schema.len()).map(|i| format!("?{i}")).collect();
    let columns: Vec<String> = schema.names().map(quote_ident).collect();
    let insert = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        columns.join(", "),
        placeholders.join(", ")
    );
    {
        let mut stmt = tx.prepare(&insert).map_err(write_error)?;
        for record in batch.records() {
            check_cancelled(cancelled)?;
            stmt.execute(params_from_iter(record.values().iter().map(sql_value)))
                .map_err(write_error)?;
        }
    }
    check_cancelled(cancelled)?;
    tx.commit().map_err(write_error)?;

    Ok(batch.len())
}

fn create_table_sql(table: &str, schema: &Schema) -> String {
    let columns: Vec<String> = schema
        .columns()
        .iter()
        .map(|c| format!("{} {}", quote_ident(&c.name), declared_type(c.column_type)))
        .collect();
    format!("CREATE TABLE {} ({});", quote_ident(table), columns.join(", "))
}

/// `(name, declared type)` of an existing table; empty when the table is absent
fn table_columns(conn: &Connection, table: &str) -> rusqlite::Result<Vec<(String, String)>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?)))?;
    rows.collect()
}

fn check_columns(
    table: &str,
    existing: &[(String, String)],
    schema: &Schema,
) -> Result<(), ContractError> {
    let expected: Vec<(String, String)> = schema
        .columns()
        .iter()
        .map(|c| (c.name.clone(), declared_type(c.column_type).to_string()))
        .collect();
    let matches = existing.len() == expected.len()
        && existing
            .iter()
            .zip(&expected)
            .all(|((name, ty), (want_name, want_ty))| {
                name == want_name && ty.eq_ignore_ascii_case(want_ty)
            });
    if matches {
        return Ok(());
    }

    let describe = |cols: &[(String, String)]| {
        cols.iter()
            .map(|(n, t)| format!("{n} {t}"))
            .collect::<Vec<_>>()
            .join(", ")
    };
    Err(ContractError::sink_write(
        SINK_NAME,
        format!(
            "table '{table}' has columns ({}) but the batch has ({})",
            describe(existing),
            describe(&expected)
        ),
    ))
}

fn declared_type(column_type: ColumnType) -> &'static str {
    match column_type {
        ColumnType::Integer => "INTEGER",
        ColumnType::Float => "REAL",
        ColumnType::Text => "TEXT",
        ColumnType::Boolean => "BOOLEAN",
        ColumnType::Date => "DATE",
    }
}

fn sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(i) => SqlValue::Integer(*i),
        Value::Float(x) => SqlValue::Real(*x),
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Boolean(b) => SqlValue::Integer(i64::from(*b)),
        Value::Date(d) => SqlValue::Text(d.format(DATE_FORMAT).to_string()),
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Rolls back (by dropping the transaction) once the caller has gone away
fn check_cancelled(cancelled: &AtomicBool) -> Result<(), ContractError> {
    if cancelled.load(Ordering::SeqCst) {
        return Err(interrupted());
    }
    Ok(())
}

fn interrupted() -> ContractError {
    ContractError::sink_unavailable(SINK_NAME, "write interrupted before commit")
}

fn write_error(e: rusqlite::Error) -> ContractError {
    if e.sqlite_error_code() == Some(ErrorCode::OperationInterrupted) {
        return interrupted();
    }
    ContractError::sink_write(SINK_NAME, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Column, ErrorKind, Record};
    use tempfile::TempDir;

    fn db_url(dir: &TempDir) -> String {
        format!("sqlite://{}", dir.path().join("warehouse.db").display())
    }

    fn batch(columns: Vec<Column>, rows: Vec<Vec<Value>>) -> Batch {
        Batch::try_new(
            Schema::new(columns).unwrap(),
            rows.into_iter().map(Record::new).collect(),
        )
        .unwrap()
    }

    fn first_batch() -> Batch {
        batch(
            vec![
                Column::new("id", ColumnType::Integer),
                Column::new("date", ColumnType::Date),
            ],
            vec![
                vec![1i64.into(), Value::Date("2024-01-01".parse().unwrap())],
                vec![2i64.into(), Value::Null],
            ],
        )
    }

    fn open(dir: &TempDir) -> Connection {
        Connection::open(dir.path().join("warehouse.db")).unwrap()
    }

    fn count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn test_parse_urls() {
        assert_eq!(SqliteTarget::parse("sqlite::memory:").unwrap(), SqliteTarget::Memory);
        assert_eq!(
            SqliteTarget::parse("sqlite://warehouse.db").unwrap(),
            SqliteTarget::File("warehouse.db".into())
        );
        assert_eq!(
            SqliteTarget::parse("sqlite:/tmp/w.db").unwrap(),
            SqliteTarget::File("/tmp/w.db".into())
        );
        assert!(SqliteTarget::parse("postgres://localhost/db").is_err());
        assert!(SqliteTarget::parse("sqlite://").is_err());
    }

    #[tokio::test]
    async fn test_replace_writes_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = RelationalSink::new(db_url(&dir), "processed_data", WriteMode::Replace);

        let ack = sink.persist(&first_batch()).await.unwrap();
        assert_eq!(ack.rows_written, 2);

        let conn = open(&dir);
        assert_eq!(count(&conn, "processed_data"), 2);
        let date: String = conn
            .query_row("SELECT date FROM processed_data WHERE id = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(date, "2024-01-01");
        let missing: Option<String> = conn
            .query_row("SELECT date FROM processed_data WHERE id = 2", [], |r| r.get(0))
            .unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn test_replace_twice_keeps_only_second_schema() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = RelationalSink::new(db_url(&dir), "t", WriteMode::Replace);
        sink.persist(&first_batch()).await.unwrap();

        let second = batch(
            vec![
                Column::new("name", ColumnType::Text),
                Column::new("score", ColumnType::Float),
                Column::new("ok", ColumnType::Boolean),
            ],
            vec![vec!["a".into(), 1.5f64.into(), true.into()]],
        );
        sink.persist(&second).await.unwrap();

        let conn = open(&dir);
        let columns = table_columns(&conn, "t").unwrap();
        assert_eq!(
            columns,
            vec![
                ("name".to_string(), "TEXT".to_string()),
                ("score".to_string(), "REAL".to_string()),
                ("ok".to_string(), "BOOLEAN".to_string()),
            ]
        );
        assert_eq!(count(&conn, "t"), 1);
    }

    #[tokio::test]
    async fn test_append_accumulates_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = RelationalSink::new(db_url(&dir), "t", WriteMode::Append);
        sink.persist(&first_batch()).await.unwrap();
        sink.persist(&first_batch()).await.unwrap();

        assert_eq!(count(&open(&dir), "t"), 4);
    }

    #[tokio::test]
    async fn test_append_schema_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = RelationalSink::new(db_url(&dir), "t", WriteMode::Append);
        sink.persist(&first_batch()).await.unwrap();

        let other = batch(
            vec![Column::new("id", ColumnType::Text)],
            vec![vec!["x".into()]],
        );
        let err = sink.persist(&other).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SinkWriteError);
        assert!(err.to_string().contains("table 't' has columns"), "got: {err}");
        assert_eq!(count(&open(&dir), "t"), 2);
    }

    #[tokio::test]
    async fn test_abandoned_write_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = RelationalSink::new(db_url(&dir), "t", WriteMode::Append);
        sink.persist(&first_batch()).await.unwrap();

        let rows = (0..200_000i64)
            .map(|i| vec![i.into(), Value::Null])
            .collect();
        let large = batch(
            vec![
                Column::new("id", ColumnType::Integer),
                Column::new("date", ColumnType::Date),
            ],
            rows,
        );
        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(1), sink.persist(&large)).await;
        assert!(timed_out.is_err());

        // Queues behind the abandoned write on the shared connection.
        sink.persist(&first_batch()).await.unwrap();
        assert_eq!(count(&open(&dir), "t"), 4);
    }

    #[test]
    fn test_interrupt_maps_to_unavailable() {
        let err = write_error(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_INTERRUPT),
            None,
        ));
        assert_eq!(err.kind(), ErrorKind::SinkUnavailable);

        let cancelled = AtomicBool::new(true);
        let err = check_cancelled(&cancelled).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SinkUnavailable);
    }

    #[tokio::test]
    async fn test_in_memory_database() {
        let mut sink = RelationalSink::new("sqlite::memory:", "t", WriteMode::Append);
        sink.persist(&first_batch()).await.unwrap();
        let ack = sink.persist(&first_batch()).await.unwrap();
        assert_eq!(ack.destination, "sqlite::memory:#t");
    }

    #[tokio::test]
    async fn test_unsupported_scheme() {
        let mut sink = RelationalSink::new("postgres://localhost/db", "t", WriteMode::Replace);
        let err = sink.persist(&first_batch()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SinkUnavailable);
    }

    #[tokio::test]
    async fn test_unreachable_database() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("missing/dir/w.db").display());
        let mut sink = RelationalSink::new(url, "t", WriteMode::Replace);
        let err = sink.persist(&first_batch()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SinkUnavailable);
    }
}
