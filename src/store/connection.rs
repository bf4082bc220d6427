//! In-memory DuckDB database over the cached parquet files.

use duckdb::{types::ValueRef, Connection as DuckDbConnection};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::error::{ForgeError, Result};
use crate::store::cache::CacheManager;

/// Columns of the MTGJSON `cards` file the store reads.
const CARD_COLUMNS: &[&str] = &[
    "uuid",
    "name",
    "faceName",
    "colorIdentity",
    "type",
    "manaValue",
    "manaCost",
    "text",
];

pub type Row = HashMap<String, Value>;

/// A DuckDB connection with parquet-backed views registered on demand.
pub struct Connection {
    conn: DuckDbConnection,
    pub cache: RefCell<CacheManager>,
    registered_views: RefCell<HashSet<String>>,
}

impl Connection {
    pub fn new(cache: CacheManager) -> Result<Self> {
        Ok(Self {
            conn: DuckDbConnection::open_in_memory()?,
            cache: RefCell::new(cache),
            registered_views: RefCell::new(HashSet::new()),
        })
    }

    /// Register each view that is not registered yet, downloading its file
    /// if needed.
    pub fn ensure_views(&self, views: &[&str]) -> Result<()> {
        for name in views {
            if !self.has_view(name) {
                self.register_view(name)?;
            }
        }
        Ok(())
    }

    /// Run `sql` with positional `?` parameters, returning rows as JSON maps.
    pub fn execute(&self, sql: &str, params: &[String]) -> Result<Vec<Row>> {
        let mut stmt = self.conn.prepare(sql)?;
        let bound: Vec<&dyn duckdb::ToSql> =
            params.iter().map(|p| p as &dyn duckdb::ToSql).collect();
        let mut rows = stmt.query(bound.as_slice())?;

        // Column metadata is only available once the statement has run.
        let columns: Vec<String> = rows
            .as_ref()
            .ok_or_else(|| ForgeError::InvalidArgument("statement did not execute".to_string()))?
            .column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut map = Row::with_capacity(columns.len());
            for (i, column) in columns.iter().enumerate() {
                map.insert(column.clone(), to_json(row.get_ref(i)?));
            }
            out.push(map);
        }
        Ok(out)
    }

    /// Load a newline-delimited JSON file into a table named `table_name`
    /// and mark it registered.
    pub fn register_table_from_ndjson(&self, table_name: &str, ndjson_path: &str) -> Result<()> {
        let path = ndjson_path.replace('\\', "/");
        self.conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS {table}; \
             CREATE TABLE {table} AS SELECT * FROM read_json_auto('{path}', format='newline_delimited')",
            table = table_name,
            path = path
        ))?;
        self.registered_views
            .borrow_mut()
            .insert(table_name.to_string());
        Ok(())
    }

    pub fn has_view(&self, name: &str) -> bool {
        self.registered_views.borrow().contains(name)
    }

    pub fn views(&self) -> Vec<String> {
        let mut views: Vec<String> = self.registered_views.borrow().iter().cloned().collect();
        views.sort();
        views
    }

    /// Forget registered views so the next query re-registers them.
    pub fn reset_views(&self) {
        self.registered_views.borrow_mut().clear();
    }

    fn register_view(&self, view_name: &str) -> Result<()> {
        let path = self.cache.borrow_mut().ensure_parquet(view_name)?;
        let path = path.to_string_lossy().replace('\\', "/");

        let select = match view_name {
            "cards" => CARD_COLUMNS
                .iter()
                .map(|c| format!("\"{}\"", c))
                .collect::<Vec<_>>()
                .join(", "),
            // The legalities file is wide: one column per format.
            "card_legalities" => "uuid, commander".to_string(),
            _ => "*".to_string(),
        };
        self.conn.execute_batch(&format!(
            "CREATE OR REPLACE VIEW {} AS SELECT {} FROM read_parquet('{}')",
            view_name, select, path
        ))?;
        self.registered_views
            .borrow_mut()
            .insert(view_name.to_string());
        debug!("Registered view {} -> {}", view_name, path);
        Ok(())
    }
}

fn to_json(val: ValueRef<'_>) -> Value {
    match val {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(b) => Value::Bool(b),
        ValueRef::TinyInt(n) => n.into(),
        ValueRef::SmallInt(n) => n.into(),
        ValueRef::Int(n) => n.into(),
        ValueRef::BigInt(n) => n.into(),
        ValueRef::HugeInt(n) => i64::try_from(n)
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(n.to_string())),
        ValueRef::Float(f) => serde_json::Number::from_f64(f64::from(f))
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        _ => Value::Null,
    }
}
