//! Named date windows resolved against the dataset's own date range.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, Months, NaiveDate};
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::DashError;

/// User-facing interval choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WindowSelector {
    PastWeek,
    PastMonth,
    PastYear,
    PastTwoYears,
    PastThreeYears,
    PastFiveYears,
    #[default]
    AllTime,
    Custom,
}

impl WindowSelector {
    /// Every selector, in the order the sidebar lists them.
    pub const ALL: [WindowSelector; 8] = [
        WindowSelector::PastWeek,
        WindowSelector::PastMonth,
        WindowSelector::PastYear,
        WindowSelector::PastTwoYears,
        WindowSelector::PastThreeYears,
        WindowSelector::PastFiveYears,
        WindowSelector::AllTime,
        WindowSelector::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PastWeek => "past-week",
            Self::PastMonth => "past-month",
            Self::PastYear => "past-year",
            Self::PastTwoYears => "past-2-years",
            Self::PastThreeYears => "past-3-years",
            Self::PastFiveYears => "past-5-years",
            Self::AllTime => "all-time",
            Self::Custom => "custom",
        }
    }

    /// Sidebar label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PastWeek => "過去1週間",
            Self::PastMonth => "過去1ヶ月",
            Self::PastYear => "過去1年",
            Self::PastTwoYears => "過去2年",
            Self::PastThreeYears => "過去3年",
            Self::PastFiveYears => "過去5年",
            Self::AllTime => "全期間",
            Self::Custom => "期間を直接指定",
        }
    }

    /// Calendar months to step back from the max date, for month/year windows.
    fn months_back(&self) -> Option<u32> {
        match self {
            Self::PastMonth => Some(1),
            Self::PastYear => Some(12),
            Self::PastTwoYears => Some(24),
            Self::PastThreeYears => Some(36),
            Self::PastFiveYears => Some(60),
            _ => None,
        }
    }
}

impl fmt::Display for WindowSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WindowSelector {
    type Err = DashError;

    /// Accepts the kebab-case name or the sidebar label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|sel| sel.as_str().eq_ignore_ascii_case(s) || sel.label() == s)
            .ok_or_else(|| DashError::InvalidSelector(s.to_string()))
    }
}

/// Inclusive date bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Calendar days covered, both ends counted.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ～ {}",
            self.start.format("%Y/%m/%d"),
            self.end.format("%Y/%m/%d")
        )
    }
}

/// Recoverable problem with a custom range. The resolver reports it and
/// falls back to the full dataset range.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowWarning {
    #[error("有効な期間を選択してください。 (custom range needs a start and an end date)")]
    MissingCustomRange,

    #[error("有効な期間を選択してください。 (custom range needs exactly 2 dates, got {0})")]
    MalformedCustomRange(usize),

    #[error("有効な期間を選択してください。 (custom range {start} > {end})")]
    ReversedCustomRange { start: NaiveDate, end: NaiveDate },

    #[error("有効な期間を選択してください。 (custom range {start} ～ {end} lies outside the data)")]
    OutOfRangeCustomRange { start: NaiveDate, end: NaiveDate },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowResolution {
    pub window: DateWindow,
    pub warning: Option<WindowWarning>,
}

impl WindowResolution {
    fn resolved(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            window: DateWindow::new(start, end),
            warning: None,
        }
    }

    fn fallback(min_date: NaiveDate, max_date: NaiveDate, warning: WindowWarning) -> Self {
        warn!(%warning, "custom window rejected, using full range");
        Self {
            window: DateWindow::new(min_date, max_date),
            warning: Some(warning),
        }
    }
}

/// Resolve `selector` into concrete bounds anchored at the dataset's dates.
///
/// Relative windows step back from `max_date` with calendar arithmetic and
/// never start before `min_date`. A custom range must hold exactly two dates;
/// it is clamped to the data range, and any malformed input falls back to
/// `(min_date, max_date)` with a warning instead of failing.
pub fn resolve_window(
    selector: WindowSelector,
    min_date: NaiveDate,
    max_date: NaiveDate,
    custom: Option<&[NaiveDate]>,
) -> WindowResolution {
    let resolution = match selector {
        WindowSelector::PastWeek => {
            let start = max_date - Duration::days(7);
            WindowResolution::resolved(start.max(min_date), max_date)
        }
        WindowSelector::AllTime => WindowResolution::resolved(min_date, max_date),
        WindowSelector::Custom => resolve_custom(min_date, max_date, custom),
        months => {
            let back = months.months_back().unwrap_or(0);
            // checked_sub_months clamps to the last valid day of the target month
            let start = max_date
                .checked_sub_months(Months::new(back))
                .unwrap_or(min_date);
            WindowResolution::resolved(start.max(min_date), max_date)
        }
    };
    debug!(
        selector = %selector,
        start = %resolution.window.start,
        end = %resolution.window.end,
        "resolved date window"
    );
    resolution
}

fn resolve_custom(
    min_date: NaiveDate,
    max_date: NaiveDate,
    custom: Option<&[NaiveDate]>,
) -> WindowResolution {
    let (start, end) = match custom {
        None => {
            return WindowResolution::fallback(
                min_date,
                max_date,
                WindowWarning::MissingCustomRange,
            )
        }
        Some(&[start, end]) => (start, end),
        Some(other) => {
            return WindowResolution::fallback(
                min_date,
                max_date,
                WindowWarning::MalformedCustomRange(other.len()),
            )
        }
    };

    if start > end {
        return WindowResolution::fallback(
            min_date,
            max_date,
            WindowWarning::ReversedCustomRange { start, end },
        );
    }
    if end < min_date || start > max_date {
        return WindowResolution::fallback(
            min_date,
            max_date,
            WindowWarning::OutOfRangeCustomRange { start, end },
        );
    }

    WindowResolution::resolved(start.max(min_date), end.min(max_date))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn resolve(selector: WindowSelector) -> DateWindow {
        resolve_window(selector, d(2015, 1, 1), d(2024, 3, 31), None).window
    }

    #[test]
    fn test_past_week_is_seven_days_back() {
        assert_eq!(resolve(WindowSelector::PastWeek).start, d(2024, 3, 24));
        assert_eq!(resolve(WindowSelector::PastWeek).end, d(2024, 3, 31));
    }

    #[test]
    fn test_past_month_uses_calendar_arithmetic_in_leap_year() {
        let w = resolve(WindowSelector::PastMonth);
        assert_eq!(w.start, d(2024, 2, 29));
        assert_eq!(w.end, d(2024, 3, 31));
    }

    #[test]
    fn test_past_month_non_leap_year() {
        let w = resolve_window(WindowSelector::PastMonth, d(2020, 1, 1), d(2023, 3, 31), None);
        assert_eq!(w.window.start, d(2023, 2, 28));
    }

    #[test]
    fn test_past_year_from_leap_day() {
        let w = resolve_window(WindowSelector::PastYear, d(2020, 1, 1), d(2024, 2, 29), None);
        assert_eq!(w.window.start, d(2023, 2, 28));
    }

    #[test]
    fn test_multi_year_windows() {
        assert_eq!(resolve(WindowSelector::PastTwoYears).start, d(2022, 3, 31));
        assert_eq!(resolve(WindowSelector::PastThreeYears).start, d(2021, 3, 31));
        assert_eq!(resolve(WindowSelector::PastFiveYears).start, d(2019, 3, 31));
    }

    #[test]
    fn test_relative_window_never_starts_before_min() {
        let w = resolve_window(WindowSelector::PastFiveYears, d(2023, 6, 1), d(2024, 3, 31), None);
        assert_eq!(w.window.start, d(2023, 6, 1));
        assert!(w.warning.is_none());
    }

    #[test]
    fn test_all_time_spans_dataset() {
        let w = resolve(WindowSelector::AllTime);
        assert_eq!(w, DateWindow::new(d(2015, 1, 1), d(2024, 3, 31)));
    }

    #[test]
    fn test_custom_pair_is_used() {
        let pair = [d(2020, 5, 1), d(2020, 6, 30)];
        let r = resolve_window(WindowSelector::Custom, d(2015, 1, 1), d(2024, 3, 31), Some(&pair));
        assert_eq!(r.window, DateWindow::new(d(2020, 5, 1), d(2020, 6, 30)));
        assert!(r.warning.is_none());
    }

    #[test]
    fn test_custom_single_value_falls_back_with_warning() {
        let single = [d(2020, 5, 1)];
        let r = resolve_window(WindowSelector::Custom, d(2015, 1, 1), d(2024, 3, 31), Some(&single));
        assert_eq!(r.window, DateWindow::new(d(2015, 1, 1), d(2024, 3, 31)));
        assert_eq!(r.warning, Some(WindowWarning::MalformedCustomRange(1)));
    }

    #[test]
    fn test_custom_missing_and_reversed_fall_back() {
        let r = resolve_window(WindowSelector::Custom, d(2015, 1, 1), d(2024, 3, 31), None);
        assert_eq!(r.warning, Some(WindowWarning::MissingCustomRange));

        let reversed = [d(2021, 1, 1), d(2020, 1, 1)];
        let r = resolve_window(WindowSelector::Custom, d(2015, 1, 1), d(2024, 3, 31), Some(&reversed));
        assert_eq!(r.window, DateWindow::new(d(2015, 1, 1), d(2024, 3, 31)));
        assert!(matches!(r.warning, Some(WindowWarning::ReversedCustomRange { .. })));
    }

    #[test]
    fn test_custom_range_is_clamped_to_data() {
        let wide = [d(2010, 1, 1), d(2030, 1, 1)];
        let r = resolve_window(WindowSelector::Custom, d(2015, 1, 1), d(2024, 3, 31), Some(&wide));
        assert_eq!(r.window, DateWindow::new(d(2015, 1, 1), d(2024, 3, 31)));
        assert!(r.warning.is_none());
    }

    #[test]
    fn test_selector_parsing() {
        assert_eq!("past-month".parse::<WindowSelector>().unwrap(), WindowSelector::PastMonth);
        assert_eq!("全期間".parse::<WindowSelector>().unwrap(), WindowSelector::AllTime);
        assert_eq!(" Past-5-Years ".parse::<WindowSelector>().unwrap(), WindowSelector::PastFiveYears);
        assert!(matches!(
            "fortnight".parse::<WindowSelector>(),
            Err(DashError::InvalidSelector(_))
        ));
    }

    #[test]
    fn test_window_days_counts_both_ends() {
        assert_eq!(DateWindow::new(d(2024, 3, 1), d(2024, 3, 31)).days(), 31);
        assert_eq!(DateWindow::new(d(2024, 3, 1), d(2024, 3, 1)).days(), 1);
    }
}
