use chrono::{DateTime, Datelike, Months, NaiveDate, TimeZone, Utc};
use serde::Serialize;

/// Price assumed for every completed booking.
pub const MOCK_UNIT_PRICE: f64 = 120.0;

pub fn revenue_totals(completed_bookings: usize) -> f64 {
    completed_bookings as f64 * MOCK_UNIT_PRICE
}

/// Relative change from `previous` to `current`, in percent.
///
/// Returns `0.0` when there is no previous figure to compare against.
pub fn growth_percentage(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    (current - previous) / previous * 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthBucket {
    ThisMonth,
    LastMonth,
}

/// First days of the current and previous calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthBuckets {
    this_month: NaiveDate,
    last_month: NaiveDate,
}

impl MonthBuckets {
    /// `today` is taken in the processing timezone by the caller.
    pub fn for_day(today: NaiveDate) -> Self {
        let this_month = today.with_day(1).unwrap_or(today);
        let last_month = this_month
            .checked_sub_months(Months::new(1))
            .unwrap_or(this_month);
        Self { this_month, last_month }
    }

    pub fn this_month(&self) -> NaiveDate {
        self.this_month
    }

    pub fn last_month(&self) -> NaiveDate {
        self.last_month
    }

    /// Bucket a creation date by year and month.
    pub fn bucket(&self, created: NaiveDate) -> Option<MonthBucket> {
        let key = (created.year(), created.month());
        if key == (self.this_month.year(), self.this_month.month()) {
            Some(MonthBucket::ThisMonth)
        } else if key == (self.last_month.year(), self.last_month.month()) {
            Some(MonthBucket::LastMonth)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RevenueStats {
    pub total: f64,
    pub this_month: f64,
    pub last_month: f64,
    pub growth_percentage: f64,
}

impl RevenueStats {
    /// Build from the creation dates of completed bookings.
    pub fn from_completed<I>(created: I, buckets: MonthBuckets) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let (mut total, mut this_month, mut last_month) = (0usize, 0usize, 0usize);
        for day in created {
            total += 1;
            match buckets.bucket(day) {
                Some(MonthBucket::ThisMonth) => this_month += 1,
                Some(MonthBucket::LastMonth) => last_month += 1,
                None => {}
            }
        }

        let this_month = revenue_totals(this_month);
        let last_month = revenue_totals(last_month);
        Self {
            total: revenue_totals(total),
            this_month,
            last_month,
            growth_percentage: growth_percentage(this_month, last_month),
        }
    }

    /// Build from creation instants, reading both them and today's date on
    /// the calendar of `now`'s timezone.
    pub fn at<I, Tz>(created: I, now: &DateTime<Tz>) -> Self
    where
        I: IntoIterator<Item = DateTime<Utc>>,
        Tz: TimeZone,
    {
        let tz = now.timezone();
        let buckets = MonthBuckets::for_day(now.date_naive());
        Self::from_completed(
            created.into_iter().map(|c| c.with_timezone(&tz).date_naive()),
            buckets,
        )
    }
}
