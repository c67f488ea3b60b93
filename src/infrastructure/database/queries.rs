//! SQL generated from entity descriptors. Every builder takes the table
//! name and column list declared once per entity, so all six tables share
//! the same statement shapes.

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

pub(super) fn insert_sql(table: &str, columns: &[&str]) -> String {
    format!(
        "INSERT INTO {table} ({cols}, sync_state) VALUES ({marks}, ?)",
        cols = columns.join(", "),
        marks = placeholders(columns.len()),
    )
}

/// Full-row write: insert, or replace every field of an existing row.
/// Used by `update` (after patching in memory) and by the pull path's
/// replica application.
pub(super) fn upsert_sql(table: &str, columns: &[&str]) -> String {
    let assignments = columns
        .iter()
        .filter(|c| **c != "id")
        .map(|c| format!("{c} = excluded.{c}"))
        .chain(std::iter::once("sync_state = excluded.sync_state".to_string()))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {table} ({cols}, sync_state) VALUES ({marks}, ?) \
         ON CONFLICT(id) DO UPDATE SET {assignments}",
        cols = columns.join(", "),
        marks = placeholders(columns.len()),
    )
}

pub(super) fn select_by_id_sql(table: &str, columns: &[&str]) -> String {
    format!(
        "SELECT {cols}, sync_state FROM {table} WHERE id = ?",
        cols = columns.join(", "),
    )
}

pub(super) fn select_list_sql(table: &str, columns: &[&str], tenant_column: &str) -> String {
    format!(
        "SELECT {cols}, sync_state FROM {table} \
         WHERE {tenant_column} = ? AND deleted_at IS NULL \
         ORDER BY updated_at DESC",
        cols = columns.join(", "),
    )
}

pub(super) fn select_pending_sql(table: &str, columns: &[&str], tenant_column: &str) -> String {
    format!(
        "SELECT {cols}, sync_state FROM {table} \
         WHERE sync_state = ? AND {tenant_column} = ? \
         ORDER BY updated_at ASC",
        cols = columns.join(", "),
    )
}

pub(super) fn select_meta_sql(table: &str) -> String {
    format!("SELECT updated_at, sync_state FROM {table} WHERE id = ?")
}

/// Compare-and-set: a row only flips to synced while it still carries the
/// exact version captured before the push. A row mutated mid-flight keeps
/// its pending state.
pub(super) fn mark_synced_sql(table: &str) -> String {
    format!(
        "UPDATE {table} SET sync_state = ? \
         WHERE id = ? AND updated_at = ? AND sync_state = ?"
    )
}

pub(super) fn exists_sql(table: &str) -> String {
    format!("SELECT 1 FROM {table} WHERE id = ?")
}

/// Cascade step for soft deletes: tombstone all live rows matching one
/// foreign-key column.
pub(super) fn tombstone_by_sql(table: &str, key_column: &str) -> String {
    format!(
        "UPDATE {table} SET deleted_at = ?, updated_at = ?, sync_state = ? \
         WHERE {key_column} = ? AND deleted_at IS NULL"
    )
}
