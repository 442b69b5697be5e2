use crate::dates::{canonical_key, display_label};
use crate::models::{GridCell, LedgerData, MonthSpan};
use chrono::{Datelike, Duration, NaiveDate};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub fn day_progress(data: &LedgerData, date: NaiveDate) -> u8 {
    if data.routines.is_empty() {
        return 0;
    }

    let record = data.records.get(&canonical_key(date));
    let completed = data
        .routines
        .iter()
        .filter(|routine| {
            record
                .and_then(|entries| entries.get(&routine.id))
                .copied()
                .unwrap_or(false)
        })
        .count();

    ((completed * 100) as f64 / data.routines.len() as f64).round() as u8
}

pub fn heatmap_level(percent: u8) -> u8 {
    match percent {
        0 => 0,
        1..=25 => 1,
        26..=50 => 2,
        51..=75 => 3,
        _ => 4,
    }
}

/// One cell per day from the Sunday preceding `anchor_start` through the end
/// of `today`'s week, so the count divides evenly into weekly columns.
pub fn build_year_grid(data: &LedgerData, anchor_start: NaiveDate, today: NaiveDate) -> Vec<GridCell> {
    let start = week_start(anchor_start);
    let end = week_start(today) + Duration::days(6);

    let mut cells = Vec::new();
    let mut date = start;
    while date <= end {
        let future = date > today;
        let progress = day_progress(data, date);
        cells.push(GridCell {
            date: canonical_key(date),
            label: display_label(date),
            progress,
            level: if future { 0 } else { heatmap_level(progress) },
            future,
        });
        date += Duration::days(1);
    }
    cells
}

pub fn month_spans(anchor_start: NaiveDate, today: NaiveDate) -> Vec<MonthSpan> {
    let last_week = week_start(today);

    let mut spans: Vec<MonthSpan> = Vec::new();
    let mut week = week_start(anchor_start);
    while week <= last_week {
        let first_in_range = week.max(anchor_start);
        let label = MONTHS[first_in_range.month0() as usize];
        match spans.last_mut() {
            Some(span) if span.label == label => span.weeks += 1,
            _ => spans.push(MonthSpan {
                label: label.to_string(),
                weeks: 1,
            }),
        }
        week += Duration::weeks(1);
    }
    spans
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}
