//! Row mapping for the replicated entities. Timestamps are stored as unix
//! milliseconds, dates and times as ISO text, enums as their string form.

use super::entity::SqlEntity;
use crate::domain::entities::{
    Business, Membership, Shift, StaffProfile, TimeEntry, TimeOffRequest,
};
use crate::domain::value_objects::{
    RequestKind, RequestStatus, ShiftStatus, StaffRole, SyncState,
};
use crate::shared::error::{AppError, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Row, Sqlite};

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

fn millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

fn opt_millis(at: Option<DateTime<Utc>>) -> Option<i64> {
    at.map(|at| at.timestamp_millis())
}

pub(super) fn datetime(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .ok_or_else(|| AppError::Decode(format!("timestamp out of range: {ms}")))
}

fn opt_datetime(ms: Option<i64>) -> Result<Option<DateTime<Utc>>> {
    ms.map(datetime).transpose()
}

fn date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map_err(|e| AppError::Decode(format!("bad date {text:?}: {e}")))
}

fn time(text: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(text, TIME_FORMAT)
        .map_err(|e| AppError::Decode(format!("bad time {text:?}: {e}")))
}

pub(super) fn sync_state(row: &SqliteRow) -> Result<SyncState> {
    let raw: String = row.try_get("sync_state")?;
    SyncState::try_from(raw.as_str()).map_err(AppError::Decode)
}

fn parsed<T>(raw: &str) -> Result<T>
where
    for<'a> T: TryFrom<&'a str, Error = String>,
{
    T::try_from(raw).map_err(AppError::Decode)
}

impl SqlEntity for Business {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "timezone",
        "late_threshold_minutes",
        "created_at",
        "updated_at",
        "deleted_at",
    ];

    fn bind_columns<'q>(&self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.id.clone())
            .bind(self.name.clone())
            .bind(self.timezone.clone())
            .bind(self.late_threshold_minutes)
            .bind(millis(self.created_at))
            .bind(millis(self.updated_at))
            .bind(opt_millis(self.deleted_at))
    }

    fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            timezone: row.try_get("timezone")?,
            late_threshold_minutes: row.try_get("late_threshold_minutes")?,
            created_at: datetime(row.try_get("created_at")?)?,
            updated_at: datetime(row.try_get("updated_at")?)?,
            deleted_at: opt_datetime(row.try_get("deleted_at")?)?,
            sync_state: sync_state(row)?,
        })
    }
}

impl SqlEntity for Membership {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "business_id",
        "user_id",
        "role",
        "created_at",
        "updated_at",
        "deleted_at",
    ];

    fn bind_columns<'q>(&self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.id.clone())
            .bind(self.business_id.clone())
            .bind(self.user_id.clone())
            .bind(self.role.as_str())
            .bind(millis(self.created_at))
            .bind(millis(self.updated_at))
            .bind(opt_millis(self.deleted_at))
    }

    fn from_row(row: &SqliteRow) -> Result<Self> {
        let role: String = row.try_get("role")?;
        Ok(Self {
            id: row.try_get("id")?,
            business_id: row.try_get("business_id")?,
            user_id: row.try_get("user_id")?,
            role: parsed::<StaffRole>(&role)?,
            created_at: datetime(row.try_get("created_at")?)?,
            updated_at: datetime(row.try_get("updated_at")?)?,
            deleted_at: opt_datetime(row.try_get("deleted_at")?)?,
            sync_state: sync_state(row)?,
        })
    }
}

impl SqlEntity for StaffProfile {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "business_id",
        "user_id",
        "name",
        "role",
        "hourly_rate",
        "active",
        "created_at",
        "updated_at",
        "deleted_at",
    ];

    fn bind_columns<'q>(&self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.id.clone())
            .bind(self.business_id.clone())
            .bind(self.user_id.clone())
            .bind(self.name.clone())
            .bind(self.role.as_str())
            .bind(self.hourly_rate)
            .bind(self.active)
            .bind(millis(self.created_at))
            .bind(millis(self.updated_at))
            .bind(opt_millis(self.deleted_at))
    }

    fn from_row(row: &SqliteRow) -> Result<Self> {
        let role: String = row.try_get("role")?;
        Ok(Self {
            id: row.try_get("id")?,
            business_id: row.try_get("business_id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            role: parsed::<StaffRole>(&role)?,
            hourly_rate: row.try_get("hourly_rate")?,
            active: row.try_get("active")?,
            created_at: datetime(row.try_get("created_at")?)?,
            updated_at: datetime(row.try_get("updated_at")?)?,
            deleted_at: opt_datetime(row.try_get("deleted_at")?)?,
            sync_state: sync_state(row)?,
        })
    }
}

impl SqlEntity for Shift {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "business_id",
        "staff_id",
        "date",
        "start_time",
        "end_time",
        "status",
        "needs_coverage",
        "notes",
        "created_at",
        "updated_at",
        "deleted_at",
    ];

    fn bind_columns<'q>(&self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.id.clone())
            .bind(self.business_id.clone())
            .bind(self.staff_id.clone())
            .bind(self.date.format(DATE_FORMAT).to_string())
            .bind(self.start_time.format(TIME_FORMAT).to_string())
            .bind(self.end_time.format(TIME_FORMAT).to_string())
            .bind(self.status.as_str())
            .bind(self.needs_coverage)
            .bind(self.notes.clone())
            .bind(millis(self.created_at))
            .bind(millis(self.updated_at))
            .bind(opt_millis(self.deleted_at))
    }

    fn from_row(row: &SqliteRow) -> Result<Self> {
        let date_raw: String = row.try_get("date")?;
        let start_raw: String = row.try_get("start_time")?;
        let end_raw: String = row.try_get("end_time")?;
        let status: String = row.try_get("status")?;
        Ok(Self {
            id: row.try_get("id")?,
            business_id: row.try_get("business_id")?,
            staff_id: row.try_get("staff_id")?,
            date: date(&date_raw)?,
            start_time: time(&start_raw)?,
            end_time: time(&end_raw)?,
            status: parsed::<ShiftStatus>(&status)?,
            needs_coverage: row.try_get("needs_coverage")?,
            notes: row.try_get("notes")?,
            created_at: datetime(row.try_get("created_at")?)?,
            updated_at: datetime(row.try_get("updated_at")?)?,
            deleted_at: opt_datetime(row.try_get("deleted_at")?)?,
            sync_state: sync_state(row)?,
        })
    }
}

impl SqlEntity for TimeEntry {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "business_id",
        "shift_id",
        "staff_id",
        "clock_in",
        "clock_out",
        "minutes_late",
        "total_minutes",
        "source",
        "created_at",
        "updated_at",
        "deleted_at",
    ];

    fn bind_columns<'q>(&self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.id.clone())
            .bind(self.business_id.clone())
            .bind(self.shift_id.clone())
            .bind(self.staff_id.clone())
            .bind(millis(self.clock_in))
            .bind(opt_millis(self.clock_out))
            .bind(self.minutes_late)
            .bind(self.total_minutes)
            .bind(self.source.clone())
            .bind(millis(self.created_at))
            .bind(millis(self.updated_at))
            .bind(opt_millis(self.deleted_at))
    }

    fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            business_id: row.try_get("business_id")?,
            shift_id: row.try_get("shift_id")?,
            staff_id: row.try_get("staff_id")?,
            clock_in: datetime(row.try_get("clock_in")?)?,
            clock_out: opt_datetime(row.try_get("clock_out")?)?,
            minutes_late: row.try_get("minutes_late")?,
            total_minutes: row.try_get("total_minutes")?,
            source: row.try_get("source")?,
            created_at: datetime(row.try_get("created_at")?)?,
            updated_at: datetime(row.try_get("updated_at")?)?,
            deleted_at: opt_datetime(row.try_get("deleted_at")?)?,
            sync_state: sync_state(row)?,
        })
    }
}

impl SqlEntity for TimeOffRequest {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "business_id",
        "staff_id",
        "kind",
        "start_date",
        "end_date",
        "reason",
        "status",
        "created_at",
        "updated_at",
        "deleted_at",
    ];

    fn bind_columns<'q>(&self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.id.clone())
            .bind(self.business_id.clone())
            .bind(self.staff_id.clone())
            .bind(self.kind.as_str())
            .bind(self.start_date.format(DATE_FORMAT).to_string())
            .bind(self.end_date.format(DATE_FORMAT).to_string())
            .bind(self.reason.clone())
            .bind(self.status.as_str())
            .bind(millis(self.created_at))
            .bind(millis(self.updated_at))
            .bind(opt_millis(self.deleted_at))
    }

    fn from_row(row: &SqliteRow) -> Result<Self> {
        let kind: String = row.try_get("kind")?;
        let status: String = row.try_get("status")?;
        let start_raw: String = row.try_get("start_date")?;
        let end_raw: String = row.try_get("end_date")?;
        Ok(Self {
            id: row.try_get("id")?,
            business_id: row.try_get("business_id")?,
            staff_id: row.try_get("staff_id")?,
            kind: parsed::<RequestKind>(&kind)?,
            start_date: date(&start_raw)?,
            end_date: date(&end_raw)?,
            reason: row.try_get("reason")?,
            status: parsed::<RequestStatus>(&status)?,
            created_at: datetime(row.try_get("created_at")?)?,
            updated_at: datetime(row.try_get("updated_at")?)?,
            deleted_at: opt_datetime(row.try_get("deleted_at")?)?,
            sync_state: sync_state(row)?,
        })
    }
}
