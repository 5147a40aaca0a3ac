//! Calendar-month windowing for date-bounded search queries.

use chrono::{Datelike, NaiveDate};

use crate::types::DateWindow;

/// Split `[start, end]` into consecutive calendar-month windows.
///
/// Windows are ascending, contiguous, never cross a month boundary, and
/// together cover exactly `[start, end]`. An inverted range yields no windows.
#[must_use]
pub fn split_date_range(start: NaiveDate, end: NaiveDate) -> Vec<DateWindow> {
    let mut windows = Vec::new();
    let Some(mut current) = start.with_day(1) else {
        return windows;
    };

    while current <= end {
        let Some(next_month) = first_of_next_month(current) else {
            // Past the representable calendar; close the range out.
            windows.push(DateWindow {
                start: current.max(start),
                end,
            });
            break;
        };
        let month_end = next_month.pred_opt().unwrap_or(next_month);

        windows.push(DateWindow {
            start: current.max(start),
            end: month_end.min(end),
        });
        current = next_month;
    }

    windows
}

fn first_of_next_month(date: NaiveDate) -> Option<NaiveDate> {
    if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    }
}
