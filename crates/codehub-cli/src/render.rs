//! Terminal rendering of a contribution series as a week-by-weekday grid.
//!
//! Columns are weeks starting on Sunday; rows are weekdays. Cells outside the
//! series window are left blank so the first and last columns may be partial.

use chrono::{Datelike, NaiveDate};
use codehub_core::{ActivitySeries, SeverityTier};

const ROW_LABELS: [&str; 7] = ["", "Mon", "", "Wed", "", "Fri", ""];
const LABEL_WIDTH: usize = 4;

pub(crate) fn glyph(tier: SeverityTier) -> char {
    match tier {
        SeverityTier::None => '\u{b7}',
        SeverityTier::Low => '\u{2591}',
        SeverityTier::Medium => '\u{2592}',
        SeverityTier::High => '\u{2593}',
        SeverityTier::Max => '\u{2588}',
    }
}

/// One column per week; `None` marks days outside the series.
type WeekColumn = [Option<(NaiveDate, SeverityTier)>; 7];

fn week_columns(series: &ActivitySeries) -> Vec<WeekColumn> {
    let first_sunday = series.start()
        - chrono::Duration::days(i64::from(series.start().weekday().num_days_from_sunday()));
    let mut columns: Vec<WeekColumn> = Vec::new();

    for (date, tier) in series.iter_tiers() {
        let offset = usize::try_from((date - first_sunday).num_days()).unwrap_or(0);
        let (col, row) = (offset / 7, offset % 7);
        if columns.len() <= col {
            columns.resize(col + 1, [None; 7]);
        }
        columns[col][row] = Some((date, tier));
    }
    columns
}

/// Month abbreviations placed above the first week holding the 1st of the month.
fn month_row(columns: &[WeekColumn]) -> String {
    let mut row = vec![' '; LABEL_WIDTH + columns.len() + 3];
    for (col, week) in columns.iter().enumerate() {
        let first_of_month = week.iter().flatten().find(|(date, _)| date.day() == 1);
        if let Some((date, _)) = first_of_month {
            for (i, ch) in date.format("%b").to_string().chars().enumerate() {
                row[LABEL_WIDTH + col + i] = ch;
            }
        }
    }
    row.into_iter().collect::<String>().trim_end().to_string()
}

/// Render `series` as a month header, seven weekday rows and a legend.
pub(crate) fn render_heatmap(series: &ActivitySeries) -> String {
    let columns = week_columns(series);
    if columns.is_empty() {
        return String::new();
    }

    let mut lines = Vec::with_capacity(ROW_LABELS.len() + 2);
    lines.push(month_row(&columns));
    for (row, label) in ROW_LABELS.iter().enumerate() {
        let cells: String = columns
            .iter()
            .map(|week| week[row].map_or(' ', |(_, tier)| glyph(tier)))
            .collect();
        lines.push(format!("{label:<LABEL_WIDTH$}{cells}"));
    }

    let legend: Vec<String> = SeverityTier::ALL
        .iter()
        .map(|tier| glyph(*tier).to_string())
        .collect();
    lines.push(format!("{:LABEL_WIDTH$}Less {} More", "", legend.join(" ")));
    lines.join("\n")
}
