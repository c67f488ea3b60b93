use crate::domain::entities::SyncRecord;
use crate::shared::error::Result;
use sqlx::Sqlite;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};

/// Maps a domain entity onto its SQLite table. The column list is the one
/// schema descriptor everything else derives from: insert, full-row
/// update, replica upsert, and the pending-push scan are all generated
/// from `COLUMNS` by the builders in [`super::queries`], so no table gets
/// hand-written statement variants.
pub trait SqlEntity: SyncRecord {
    /// Data columns in bind order. Excludes the local-only `sync_state`,
    /// which the query builders append themselves.
    const COLUMNS: &'static [&'static str];

    /// Bind every `COLUMNS` value, in order.
    fn bind_columns<'q>(
        &self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>>;

    fn from_row(row: &SqliteRow) -> Result<Self>;
}
