use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Local, NaiveDate};

use crate::remote::toggl::TimeEntry;

/// Reporting period for `toggl breakdown`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day,
    Week,
    Month,
    Year,
}

impl Period {
    pub fn parse(s: &str) -> Option<Period> {
        match s {
            "d" | "day" => Some(Period::Day),
            "w" | "week" => Some(Period::Week),
            "m" | "month" => Some(Period::Month),
            "y" | "year" => Some(Period::Year),
            _ => None,
        }
    }

    /// First day covered by the period, calendar-aligned.
    pub fn start(self, today: NaiveDate) -> NaiveDate {
        match self {
            Period::Day => today,
            Period::Week => {
                today - chrono::Duration::days(today.weekday().num_days_from_monday() as i64)
            }
            Period::Month => today.with_day(1).unwrap_or(today),
            Period::Year => NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today),
        }
    }
}

/// Decimal hours per project per day
pub type Breakdown = BTreeMap<String, BTreeMap<NaiveDate, f64>>;

/// Flatten raw time entries into hours per project per day. Entries for the
/// still-running timer are skipped; multiple entries on the same day add up.
pub fn aggregate(entries: &[TimeEntry], projects: &HashMap<u64, String>) -> Breakdown {
    let mut data = Breakdown::new();

    for entry in entries {
        if entry.is_running() {
            continue;
        }

        let project = entry
            .project_id
            .and_then(|id| projects.get(&id).cloned())
            .unwrap_or_else(|| "(no project)".to_string());
        let day = entry.start.with_timezone(&Local).date_naive();
        let hours = entry.duration as f64 / 3600.0;

        *data.entry(project).or_default().entry(day).or_insert(0.0) += hours;
    }

    data
}

/// Render a breakdown as display lines: one block per project with per-day
/// hours and a total.
pub fn render_breakdown(data: &Breakdown) -> Vec<String> {
    let mut lines = Vec::new();

    for (project, days) in data {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(format!("{}:", project));

        let mut total = 0.0;
        for (day, hours) in days {
            lines.push(format!("  {}  {:6.2}h", day.format("%Y-%m-%d"), hours));
            total += hours;
        }
        lines.push(format!("  total       {:6.2}h", total));
    }

    if lines.is_empty() {
        lines.push("No time tracked in this period".to_string());
    }
    lines
}
