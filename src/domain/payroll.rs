use crate::domain::entities::{StaffProfile, TimeEntry};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayrollReportItem {
    pub staff_id: String,
    pub staff_name: String,
    pub hourly_rate: f64,
    pub total_minutes: i64,
    pub total_hours: f64,
    pub late_count: u32,
    pub estimated_pay: f64,
}

/// Per-staff payroll totals over already-synced time entries. Pure
/// read-side aggregation; open sessions contribute their zero
/// `total_minutes` until clock-out fills them in.
pub fn generate_report(staff: &[StaffProfile], entries: &[TimeEntry]) -> Vec<PayrollReportItem> {
    let mut report: Vec<PayrollReportItem> = staff
        .iter()
        .map(|s| PayrollReportItem {
            staff_id: s.id.clone(),
            staff_name: s.name.clone(),
            hourly_rate: s.hourly_rate,
            total_minutes: 0,
            total_hours: 0.0,
            late_count: 0,
            estimated_pay: 0.0,
        })
        .collect();

    let by_staff: HashMap<&str, usize> = staff
        .iter()
        .enumerate()
        .map(|(idx, s)| (s.id.as_str(), idx))
        .collect();

    for entry in entries {
        let Some(&idx) = by_staff.get(entry.staff_id.as_str()) else {
            continue;
        };
        let item = &mut report[idx];
        item.total_minutes += entry.total_minutes;
        if entry.minutes_late > 0 {
            item.late_count += 1;
        }
    }

    for item in &mut report {
        let hours = item.total_minutes as f64 / 60.0;
        item.total_hours = round2(hours);
        item.estimated_pay = round2(hours * item.hourly_rate);
    }

    report
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
