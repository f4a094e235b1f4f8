//! Month and week arithmetic for the calendar views.

use crate::error_handler::ServiceError;
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;

// Distance kept from chrono's limits so that a date's week, month grid and
// neighbours can always be computed.
const EDGE_MARGIN: Days = Days::new(14);

fn away_from_limits(date: NaiveDate) -> bool {
    date.checked_sub_days(EDGE_MARGIN).is_some() && date.checked_add_days(EDGE_MARGIN).is_some()
}

/// A validated (year, month) pair.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// `None` for an invalid month or one touching chrono's date limits.
    pub fn new(year: i32, month: u32) -> Option<YearMonth> {
        let ym = YearMonth { year, month };
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let (_, last) = month_bounds(ym);
        (away_from_limits(first) && away_from_limits(last)).then_some(ym)
    }

    pub fn of(date: NaiveDate) -> YearMonth {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    fn first_day(&self) -> NaiveDate {
        // Only hand-built values outside chrono's range hit the default.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }
}

/// First and last date of the month.
pub fn month_bounds(ym: YearMonth) -> (NaiveDate, NaiveDate) {
    let first = ym.first_day();
    // Only December of chrono's last year has no following month.
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX);
    (first, last)
}

/// Previous and next month, wrapping across years.
pub fn month_navigation(ym: YearMonth) -> (YearMonth, YearMonth) {
    let prev = if ym.month == 1 {
        YearMonth {
            year: ym.year - 1,
            month: 12,
        }
    } else {
        YearMonth {
            year: ym.year,
            month: ym.month - 1,
        }
    };
    let next = if ym.month == 12 {
        YearMonth {
            year: ym.year + 1,
            month: 1,
        }
    } else {
        YearMonth {
            year: ym.year,
            month: ym.month + 1,
        }
    };
    (prev, next)
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(NaiveDate::MIN)
}

/// The seven days from `monday`, saturating at chrono's last date.
pub fn week_days(monday: NaiveDate) -> [NaiveDate; 7] {
    std::array::from_fn(|offset| {
        monday
            .checked_add_days(Days::new(offset as u64))
            .unwrap_or(NaiveDate::MAX)
    })
}

/// Mondays of the previous and next week.
pub fn week_navigation(monday: NaiveDate) -> (NaiveDate, NaiveDate) {
    (
        monday.checked_sub_days(Days::new(7)).unwrap_or(monday),
        monday.checked_add_days(Days::new(7)).unwrap_or(monday),
    )
}

/// The day before and the day after.
pub fn day_navigation(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    (
        day.pred_opt().unwrap_or(day),
        day.succ_opt().unwrap_or(day),
    )
}

/// Full Monday-first weeks covering the month, padded with days of the
/// neighbouring months.
pub fn month_grid(ym: YearMonth) -> Vec<[NaiveDate; 7]> {
    let (first, last) = month_bounds(ym);
    let mut weeks = Vec::new();
    let mut monday = week_start(first);
    while monday <= last {
        weeks.push(week_days(monday));
        let Some(next) = monday.checked_add_days(Days::new(7)) else {
            break;
        };
        monday = next;
    }
    weeks
}

/// First and last date shown by the month grid, padding included.
pub fn grid_bounds(ym: YearMonth) -> (NaiveDate, NaiveDate) {
    let (first, last) = month_bounds(ym);
    let weeks = month_grid(ym);
    let start = weeks.as_slice().first().map_or(first, |week| week[0]);
    let end = weeks.as_slice().last().map_or(last, |week| week[6]);
    (start, end)
}

/// Reads `year`/`month` query values. A missing part defaults to today's;
/// an unparsable or out-of-range selection means "this month".
pub fn resolve_month(year: Option<&str>, month: Option<&str>, today: NaiveDate) -> YearMonth {
    let y = match year {
        Some(raw) => raw.trim().parse::<i32>().ok(),
        None => Some(today.year()),
    };
    let m = match month {
        Some(raw) => raw.trim().parse::<u32>().ok(),
        None => Some(today.month()),
    };
    y.zip(m)
        .and_then(|(y, m)| YearMonth::new(y, m))
        .unwrap_or_else(|| {
            log::debug!(
                "Unusable month selection (year={:?}, month={:?}), showing current month",
                year,
                month
            );
            YearMonth::of(today)
        })
}

/// Monday of the requested week, or of the current week when `raw` is unusable.
pub fn resolve_week_start(raw: Option<&str>, today: NaiveDate) -> NaiveDate {
    match raw.map(parse_day) {
        Some(Ok(date)) => week_start(date),
        Some(Err(_)) => {
            log::debug!("Unusable week start {:?}, showing current week", raw);
            week_start(today)
        }
        None => week_start(today),
    }
}

/// Strict `YYYY-MM-DD` parsing for day-scoped routes. Dates within two
/// weeks of chrono's limits are rejected.
pub fn parse_day(raw: &str) -> Result<NaiveDate, ServiceError> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ServiceError::BadRequest(format!("Invalid date: {}", raw)))?;
    if !away_from_limits(date) {
        return Err(ServiceError::BadRequest(format!(
            "Date out of supported range: {}",
            raw
        )));
    }
    Ok(date)
}

/// Optional inclusive range from raw `from`/`to` values.
pub fn parse_range(
    from: Option<&str>,
    to: Option<&str>,
) -> Result<(Option<NaiveDate>, Option<NaiveDate>), ServiceError> {
    let from = from.map(parse_day).transpose()?;
    let to = to.map(parse_day).transpose()?;
    if let (Some(start), Some(end)) = (from, to) {
        if start > end {
            return Err(ServiceError::BadRequest(
                "from cannot be after to".to_string(),
            ));
        }
    }
    Ok((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_bounds_honor_leap_years() {
        let feb_2024 = YearMonth::new(2024, 2).unwrap();
        assert_eq!(month_bounds(feb_2024), (date(2024, 2, 1), date(2024, 2, 29)));
        let feb_2023 = YearMonth::new(2023, 2).unwrap();
        assert_eq!(month_bounds(feb_2023).1, date(2023, 2, 28));
        let dec = YearMonth::new(2025, 12).unwrap();
        assert_eq!(month_bounds(dec).1, date(2025, 12, 31));
    }

    #[test]
    fn navigation_wraps_at_year_boundaries() {
        let (prev, next) = month_navigation(YearMonth::new(2024, 12).unwrap());
        assert_eq!(prev, YearMonth::new(2024, 11).unwrap());
        assert_eq!(next, YearMonth::new(2025, 1).unwrap());

        let (prev, _) = month_navigation(YearMonth::new(2025, 1).unwrap());
        assert_eq!(prev, YearMonth::new(2024, 12).unwrap());
    }

    #[test]
    fn invalid_month_is_rejected() {
        assert!(YearMonth::new(2025, 13).is_none());
        assert!(YearMonth::new(2025, 0).is_none());
    }

    #[test]
    fn week_starts_on_monday() {
        // 2025-03-09 is a Sunday.
        assert_eq!(week_start(date(2025, 3, 9)), date(2025, 3, 3));
        assert_eq!(week_start(date(2025, 3, 3)), date(2025, 3, 3));
        let days = week_days(date(2025, 3, 3));
        assert_eq!(days[6], date(2025, 3, 9));
    }

    #[test]
    fn month_grid_covers_whole_weeks() {
        // September 2025 starts on a Monday and ends on a Tuesday.
        let grid = month_grid(YearMonth::new(2025, 9).unwrap());
        assert_eq!(grid.len(), 5);
        assert_eq!(grid[0][0], date(2025, 9, 1));
        assert_eq!(grid[4][6], date(2025, 10, 5));

        // March 2025 starts on a Saturday.
        let grid = month_grid(YearMonth::new(2025, 3).unwrap());
        assert_eq!(grid[0][0], date(2025, 2, 24));
        assert_eq!(grid.len(), 6);
    }

    #[test]
    fn resolve_month_falls_back_to_today() {
        let today = date(2026, 10, 19);
        assert_eq!(
            resolve_month(Some("2024"), Some("2"), today),
            YearMonth::new(2024, 2).unwrap()
        );
        assert_eq!(resolve_month(Some("abc"), Some("2"), today), YearMonth::of(today));
        assert_eq!(resolve_month(Some("2024"), Some("13"), today), YearMonth::of(today));
        assert_eq!(resolve_month(None, None, today), YearMonth::of(today));
        assert_eq!(
            resolve_month(Some("2024"), None, today),
            YearMonth::new(2024, 10).unwrap()
        );
    }

    #[test]
    fn resolve_week_start_normalizes_and_falls_back() {
        let today = date(2026, 10, 19);
        assert_eq!(
            resolve_week_start(Some("2025-03-06"), today),
            date(2025, 3, 3)
        );
        assert_eq!(resolve_week_start(Some("yesterday"), today), date(2026, 10, 19));
        assert_eq!(resolve_week_start(None, date(2026, 10, 22)), date(2026, 10, 19));
    }

    #[test]
    fn parse_day_is_strict() {
        assert_eq!(parse_day("2025-03-01").unwrap(), date(2025, 3, 1));
        assert!(matches!(parse_day("2025-02-30"), Err(ServiceError::BadRequest(_))));
        assert!(parse_day("03/01/2025").is_err());
    }

    #[test]
    fn grid_bounds_include_padding_days() {
        // June 2025 runs Sunday 1st to Monday 30th.
        assert_eq!(
            grid_bounds(YearMonth::new(2025, 6).unwrap()),
            (date(2025, 5, 26), date(2025, 7, 6))
        );
    }

    #[test]
    fn last_supported_month_has_real_bounds() {
        let ym = YearMonth::of(NaiveDate::MAX);
        let (first, last) = month_bounds(ym);
        assert_eq!(first, date(NaiveDate::MAX.year(), 12, 1));
        assert_eq!(last, NaiveDate::MAX);

        let grid = month_grid(ym);
        assert!(!grid.is_empty());
        assert!(grid[0].contains(&first));
        assert_eq!(grid[grid.len() - 1][6], NaiveDate::MAX);
    }

    #[test]
    fn months_at_chrono_limits_are_not_selectable() {
        let today = date(2026, 10, 19);
        assert!(YearMonth::new(NaiveDate::MAX.year(), 12).is_none());
        assert!(YearMonth::new(NaiveDate::MIN.year(), 1).is_none());
        let max_year = NaiveDate::MAX.year().to_string();
        assert_eq!(
            resolve_month(Some(max_year.as_str()), Some("12"), today),
            YearMonth::of(today)
        );
    }

    #[test]
    fn days_at_chrono_limits_are_rejected() {
        let today = date(2026, 10, 19);
        assert!(matches!(
            parse_day("+262142-12-31"),
            Err(ServiceError::BadRequest(_))
        ));
        assert_eq!(
            resolve_week_start(Some("+262142-12-31"), today),
            week_start(today)
        );
    }

    #[test]
    fn navigation_saturates_instead_of_overflowing() {
        let max = NaiveDate::MAX;
        assert_eq!(day_navigation(max), (max.pred_opt().unwrap(), max));
        assert_eq!(week_navigation(max).1, max);
        assert_eq!(week_days(max), [max; 7]);
        assert_eq!(
            week_navigation(date(2025, 3, 3)),
            (date(2025, 2, 24), date(2025, 3, 10))
        );
        assert_eq!(
            day_navigation(date(2025, 3, 1)),
            (date(2025, 2, 28), date(2025, 3, 2))
        );
    }

    #[test]
    fn parse_range_rejects_inverted_bounds() {
        assert!(parse_range(Some("2025-03-02"), Some("2025-03-01")).is_err());
        assert_eq!(
            parse_range(Some("2025-03-01"), None).unwrap(),
            (Some(date(2025, 3, 1)), None)
        );
    }
}
