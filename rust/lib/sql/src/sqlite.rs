use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, ErrorCode};

use crate::error::SQLError;
use crate::traits::{Executor, Row, SQLStore, Transaction, Value};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SqliteStore is a SQLStore implementation backed by rusqlite (bundled SQLite).
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path.
    pub fn open(path: &Path) -> Result<Self, SQLError> {
        let conn = Connection::open(path)
            .map_err(|e| SQLError::Connection(e.to_string()))?;

        // Enable WAL mode for better concurrent read performance.
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| SQLError::Connection(e.to_string()))?;
        // Writers from other connections queue instead of failing with SQLITE_BUSY.
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| SQLError::Connection(e.to_string()))?;

        Self::from_connection(conn)
    }

    /// Create an in-memory SQLite database (useful for tests).
    pub fn open_in_memory() -> Result<Self, SQLError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| SQLError::Connection(e.to_string()))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, SQLError> {
        // Foreign keys are off per connection unless asked for.
        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .map_err(|e| SQLError::Connection(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SQLError> {
        self.conn
            .lock()
            .map_err(|e| SQLError::Connection(e.to_string()))
    }
}

/// Convert our Value enum to rusqlite's ToSql.
fn bind_params(params: &[Value]) -> Vec<Box<dyn rusqlite::types::ToSql + '_>> {
    params
        .iter()
        .map(|v| -> Box<dyn rusqlite::types::ToSql + '_> {
            match v {
                Value::Null => Box::new(rusqlite::types::Null),
                Value::Integer(i) => Box::new(*i),
                Value::Real(f) => Box::new(*f),
                Value::Text(s) => Box::new(s.as_str()),
                Value::Blob(b) => Box::new(b.as_slice()),
            }
        })
        .collect()
}

/// Map a rusqlite error, singling out constraint violations.
fn classify(e: rusqlite::Error, fallback: fn(String) -> SQLError) -> SQLError {
    match &e {
        rusqlite::Error::SqliteFailure(err, msg) if err.code == ErrorCode::ConstraintViolation => {
            SQLError::Constraint(msg.clone().unwrap_or_else(|| e.to_string()))
        }
        _ => fallback(e.to_string()),
    }
}

fn query_conn(conn: &Connection, sql: &str, params: &[Value]) -> Result<Vec<Row>, SQLError> {
    let bound = bind_params(params);
    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        bound.iter().map(|b| b.as_ref()).collect();

    let mut stmt = conn
        .prepare_cached(sql)
        .map_err(|e| SQLError::Query(e.to_string()))?;

    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let rows = stmt
        .query_map(param_refs.as_slice(), |row| {
            let mut columns = Vec::with_capacity(column_names.len());
            for (i, name) in column_names.iter().enumerate() {
                columns.push((name.clone(), row_value_at(row, i)?));
            }
            Ok(Row { columns })
        })
        .map_err(|e| classify(e, SQLError::Query))?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(|e| classify(e, SQLError::Query))?);
    }
    Ok(result)
}

fn exec_conn(conn: &Connection, sql: &str, params: &[Value]) -> Result<u64, SQLError> {
    let bound = bind_params(params);
    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        bound.iter().map(|b| b.as_ref()).collect();

    let mut stmt = conn
        .prepare_cached(sql)
        .map_err(|e| SQLError::Execution(e.to_string()))?;
    let affected = stmt
        .execute(param_refs.as_slice())
        .map_err(|e| classify(e, SQLError::Execution))?;

    Ok(affected as u64)
}

impl Executor for SqliteStore {
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SQLError> {
        let conn = self.lock()?;
        query_conn(&conn, sql, params)
    }

    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SQLError> {
        let conn = self.lock()?;
        exec_conn(&conn, sql, params)
    }
}

impl SQLStore for SqliteStore {
    fn exec_batch(&self, sql: &str) -> Result<(), SQLError> {
        let conn = self.lock()?;
        conn.execute_batch(sql)
            .map_err(|e| classify(e, SQLError::Execution))
    }

    fn begin(&self) -> Result<Box<dyn Transaction + '_>, SQLError> {
        let conn = self.lock()?;
        // IMMEDIATE takes the write lock up front so check-then-write
        // sequences inside the transaction cannot interleave.
        conn.execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| SQLError::Execution(e.to_string()))?;
        Ok(Box::new(SqliteTransaction {
            conn,
            finished: false,
        }))
    }
}

/// A transaction holding the connection lock until commit or drop.
struct SqliteTransaction<'a> {
    conn: MutexGuard<'a, Connection>,
    finished: bool,
}

impl Executor for SqliteTransaction<'_> {
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SQLError> {
        query_conn(&self.conn, sql, params)
    }

    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SQLError> {
        exec_conn(&self.conn, sql, params)
    }
}

impl Transaction for SqliteTransaction<'_> {
    fn commit(mut self: Box<Self>) -> Result<(), SQLError> {
        self.conn
            .execute_batch("COMMIT")
            .map_err(|e| classify(e, SQLError::Execution))?;
        self.finished = true;
        Ok(())
    }
}

impl Drop for SqliteTransaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                tracing::error!("rollback failed: {}", e);
            }
        }
    }
}

/// Extract a Value from a rusqlite row at a given column index.
fn row_value_at(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Value> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .exec_batch(
                "CREATE TABLE items (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL UNIQUE);
                 CREATE TABLE notes (item_id INTEGER NOT NULL REFERENCES items(id), body TEXT);",
            )
            .unwrap();
        store
    }

    #[test]
    fn insert_and_query() {
        let store = store();
        let rows = store
            .query(
                "INSERT INTO items (name) VALUES (?1) RETURNING id",
                &[Value::from("alpha")],
            )
            .unwrap();
        let id = rows[0].get_i64("id").unwrap();

        let rows = store
            .query("SELECT id, name FROM items WHERE id = ?1", &[Value::Integer(id)])
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_str("name"), Some("alpha"));
    }

    #[test]
    fn unique_violation_is_constraint() {
        let store = store();
        store.exec("INSERT INTO items (name) VALUES ('a')", &[]).unwrap();
        let err = store.exec("INSERT INTO items (name) VALUES ('a')", &[]).unwrap_err();
        assert!(matches!(err, SQLError::Constraint(_)), "got {err:?}");
        assert!(err.to_string().contains("items.name"));
    }

    #[test]
    fn foreign_keys_enforced() {
        let store = store();
        let err = store
            .exec("INSERT INTO notes (item_id, body) VALUES (42, 'x')", &[])
            .unwrap_err();
        assert!(matches!(err, SQLError::Constraint(_)), "got {err:?}");
    }

    #[test]
    fn transaction_commit() {
        let store = store();
        let tx = store.begin().unwrap();
        tx.exec("INSERT INTO items (name) VALUES ('a')", &[]).unwrap();
        tx.exec("INSERT INTO items (name) VALUES ('b')", &[]).unwrap();
        tx.commit().unwrap();

        let rows = store.query("SELECT COUNT(*) AS cnt FROM items", &[]).unwrap();
        assert_eq!(rows[0].get_i64("cnt"), Some(2));
    }

    #[test]
    fn transaction_rolls_back_on_drop() {
        let store = store();
        {
            let tx = store.begin().unwrap();
            tx.exec("INSERT INTO items (name) VALUES ('a')", &[]).unwrap();
            assert!(tx.exec("INSERT INTO items (name) VALUES ('a')", &[]).is_err());
        }
        let rows = store.query("SELECT COUNT(*) AS cnt FROM items", &[]).unwrap();
        assert_eq!(rows[0].get_i64("cnt"), Some(0));
    }

    #[test]
    fn file_backed_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.sqlite");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.exec_batch("CREATE TABLE t (v TEXT)").unwrap();
            store.exec("INSERT INTO t (v) VALUES (?1)", &[Value::from("kept")]).unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        let rows = store.query("SELECT v FROM t", &[]).unwrap();
        assert_eq!(rows[0].get_str("v"), Some("kept"));
    }
}
