use crate::application::ports::RemoteStore;
use crate::shared::error::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

/// In-memory stand-in for the authoritative backend, used by tests and
/// local development. Upserts are keyed by record id, so re-sending the
/// same payload is idempotent. Per-table failure injection lets tests
/// exercise the engine's isolated failure domains.
#[derive(Default)]
pub struct MemoryRemoteStore {
    tables: Mutex<HashMap<&'static str, HashMap<String, Value>>>,
    failing_upserts: Mutex<HashSet<&'static str>>,
    failing_queries: Mutex<HashSet<&'static str>>,
    upsert_calls: AtomicU32,
    query_calls: AtomicU32,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make upserts against `table` fail until cleared.
    pub fn set_failing_upsert(&self, table: &'static str, failing: bool) {
        toggle(&self.failing_upserts, table, failing);
    }

    /// Make changed-since queries against `table` fail until cleared.
    pub fn set_failing_query(&self, table: &'static str, failing: bool) {
        toggle(&self.failing_queries, table, failing);
    }

    /// Seed or overwrite a record directly, as another device's push
    /// would.
    pub fn put_record(&self, table: &'static str, record: Value) {
        let id = record
            .get("id")
            .and_then(Value::as_str)
            .expect("record must carry an id")
            .to_string();
        self.tables
            .lock()
            .unwrap()
            .entry(table)
            .or_default()
            .insert(id, record);
    }

    pub fn record(&self, table: &'static str, id: &str) -> Option<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .and_then(|records| records.get(id))
            .cloned()
    }

    pub fn record_count(&self, table: &'static str) -> usize {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .map(HashMap::len)
            .unwrap_or(0)
    }

    pub fn upsert_calls(&self) -> u32 {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    pub fn query_calls(&self) -> u32 {
        self.query_calls.load(Ordering::SeqCst)
    }
}

fn toggle(set: &Mutex<HashSet<&'static str>>, table: &'static str, failing: bool) {
    let mut set = set.lock().unwrap();
    if failing {
        set.insert(table);
    } else {
        set.remove(table);
    }
}

fn check_failing(set: &Mutex<HashSet<&'static str>>, table: &'static str) -> Result<()> {
    if set.lock().unwrap().contains(table) {
        return Err(AppError::remote(table, "injected failure"));
    }
    Ok(())
}

fn record_updated_at(record: &Value) -> i64 {
    record
        .get("updated_at")
        .and_then(Value::as_i64)
        .unwrap_or(0)
}

fn record_tenant(table: &str, record: &Value) -> Option<String> {
    let column = if table == "businesses" {
        "id"
    } else {
        "business_id"
    };
    record
        .get(column)
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn upsert(&self, table: &'static str, records: &[Value]) -> Result<()> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        check_failing(&self.failing_upserts, table)?;

        let mut tables = self.tables.lock().unwrap();
        let stored = tables.entry(table).or_default();
        for record in records {
            let id = record
                .get("id")
                .and_then(Value::as_str)
                .ok_or_else(|| AppError::remote(table, "record without id"))?;
            stored.insert(id.to_string(), record.clone());
        }
        Ok(())
    }

    async fn query_changed_since(
        &self,
        table: &'static str,
        business_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Value>> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        check_failing(&self.failing_queries, table)?;

        let since_ms = since.map(|at| at.timestamp_millis());
        let tables = self.tables.lock().unwrap();
        let Some(records) = tables.get(table) else {
            return Ok(Vec::new());
        };

        Ok(records
            .values()
            .filter(|record| record_tenant(table, record).as_deref() == Some(business_id))
            .filter(|record| match since_ms {
                Some(since_ms) => record_updated_at(record) > since_ms,
                None => true,
            })
            .cloned()
            .collect())
    }
}
