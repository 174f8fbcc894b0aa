//! Calendar vocabulary shared by schedules, snapshots, and projections.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Classification of a due day into the first or second half of a month.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimingBucket {
    FirstHalf,
    SecondHalf,
}

impl TimingBucket {
    /// Last day-of-month that still falls in the first half.
    pub const FIRST_HALF_END_DAY: u32 = 21;

    pub fn from_day(day: u32) -> TimingBucket {
        if day <= Self::FIRST_HALF_END_DAY {
            TimingBucket::FirstHalf
        } else {
            TimingBucket::SecondHalf
        }
    }

    pub fn matches_day(&self, day: u32) -> bool {
        TimingBucket::from_day(day) == *self
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimingBucket::FirstHalf => "first half",
            TimingBucket::SecondHalf => "second half",
        }
    }
}

/// A calendar month, the unit payment schedules are keyed by.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Period {
        debug_assert!((1..=12).contains(&month), "month out of range: {month}");
        Period { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Period {
        Period {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn next(&self) -> Period {
        if self.month == 12 {
            Period::new(self.year + 1, 1)
        } else {
            Period::new(self.year, self.month + 1)
        }
    }

    /// Advances `months` whole months forward.
    pub fn plus(&self, months: u32) -> Period {
        let index = self.year * 12 + self.month as i32 - 1 + months as i32;
        Period::new(index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("month validated at construction")
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next().first_day() - Duration::days(1)
    }

    /// Last day of the due window for status derivation. First-half billers
    /// are due by day 21, everything else by month end.
    pub fn due_end(&self, bucket: Option<TimingBucket>) -> NaiveDate {
        match bucket {
            Some(TimingBucket::FirstHalf) => NaiveDate::from_ymd_opt(
                self.year,
                self.month,
                TimingBucket::FIRST_HALF_END_DAY,
            )
            .expect("day 21 exists in every month"),
            _ => self.last_day(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", MONTH_NAMES[(self.month - 1) as usize], self.year)
    }
}

/// A month crossed with a timing half, the unit budget snapshots and
/// projections are keyed by.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HalfPeriod {
    pub period: Period,
    pub bucket: TimingBucket,
}

impl HalfPeriod {
    pub fn new(year: i32, month: u32, bucket: TimingBucket) -> HalfPeriod {
        HalfPeriod {
            period: Period::new(year, month),
            bucket,
        }
    }

    pub fn next(&self) -> HalfPeriod {
        match self.bucket {
            TimingBucket::FirstHalf => HalfPeriod {
                period: self.period,
                bucket: TimingBucket::SecondHalf,
            },
            TimingBucket::SecondHalf => HalfPeriod {
                period: self.period.next(),
                bucket: TimingBucket::FirstHalf,
            },
        }
    }

    /// Inclusive chronological range. Empty when `start > end`.
    pub fn range_inclusive(start: HalfPeriod, end: HalfPeriod) -> Vec<HalfPeriod> {
        let mut out = Vec::new();
        if start > end {
            return out;
        }
        let mut current = start;
        loop {
            out.push(current);
            if current == end {
                break;
            }
            current = current.next();
        }
        out
    }
}

impl fmt::Display for HalfPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.period, self.bucket.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_boundary_splits_at_day_21() {
        assert_eq!(TimingBucket::from_day(1), TimingBucket::FirstHalf);
        assert_eq!(TimingBucket::from_day(21), TimingBucket::FirstHalf);
        assert_eq!(TimingBucket::from_day(22), TimingBucket::SecondHalf);
        assert_eq!(TimingBucket::from_day(31), TimingBucket::SecondHalf);
    }

    #[test]
    fn periods_order_chronologically() {
        assert!(Period::new(2025, 12) < Period::new(2026, 1));
        assert!(
            HalfPeriod::new(2026, 1, TimingBucket::FirstHalf)
                < HalfPeriod::new(2026, 1, TimingBucket::SecondHalf)
        );
    }

    #[test]
    fn period_plus_wraps_years() {
        assert_eq!(Period::new(2025, 11).plus(3), Period::new(2026, 2));
        assert_eq!(Period::new(2026, 1).plus(0), Period::new(2026, 1));
    }

    #[test]
    fn half_period_range_is_inclusive_and_ordered() {
        let start = HalfPeriod::new(2026, 1, TimingBucket::SecondHalf);
        let end = HalfPeriod::new(2026, 2, TimingBucket::SecondHalf);
        let range = HalfPeriod::range_inclusive(start, end);
        assert_eq!(range.len(), 3);
        assert_eq!(range[0], start);
        assert_eq!(range[2], end);

        assert!(HalfPeriod::range_inclusive(end, start).is_empty());
    }

    #[test]
    fn due_end_honours_bucket() {
        let feb = Period::new(2026, 2);
        assert_eq!(
            feb.due_end(Some(TimingBucket::FirstHalf)),
            NaiveDate::from_ymd_opt(2026, 2, 21).unwrap()
        );
        assert_eq!(
            feb.due_end(Some(TimingBucket::SecondHalf)),
            NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()
        );
        assert_eq!(feb.due_end(None), NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
    }

    #[test]
    fn period_display_uses_month_name() {
        assert_eq!(Period::new(2026, 1).to_string(), "January 2026");
    }
}
