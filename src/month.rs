//! Calendar month windows used to scope transaction reads.

use chrono::{Datelike, Months, NaiveDate};
use std::fmt;

/// A half-open date range `[start, end)` covering one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl MonthWindow {
    /// The month containing `reference`.
    pub fn containing(reference: NaiveDate) -> Self {
        let start = reference.with_day(1).unwrap_or(reference);
        let end = start
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDate::MAX);
        Self { start, end }
    }

    /// First day of the month
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// First day of the following month (exclusive bound)
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    pub fn next(&self) -> Self {
        Self::containing(self.end)
    }

    pub fn previous(&self) -> Self {
        Self::containing(self.start.pred_opt().unwrap_or(self.start))
    }
}

impl fmt::Display for MonthWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start.format("%Y-%m"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn window_is_half_open() {
        let window = MonthWindow::containing(date(2024, 5, 17));
        assert_eq!(window.start(), date(2024, 5, 1));
        assert_eq!(window.end(), date(2024, 6, 1));
        assert!(window.contains(date(2024, 5, 1)));
        assert!(window.contains(date(2024, 5, 31)));
        assert!(!window.contains(date(2024, 6, 1)));
        assert!(!window.contains(date(2024, 4, 30)));
    }

    #[test]
    fn december_rolls_into_next_year() {
        let window = MonthWindow::containing(date(2023, 12, 31));
        assert_eq!(window.end(), date(2024, 1, 1));
        assert_eq!(window.next().start(), date(2024, 1, 1));
        assert_eq!(window.next().previous(), window);
    }

    #[test]
    fn february_in_leap_year() {
        let window = MonthWindow::containing(date(2024, 2, 29));
        assert!(window.contains(date(2024, 2, 29)));
        assert_eq!(window.end(), date(2024, 3, 1));
        assert_eq!(window.to_string(), "2024-02");
    }
}
