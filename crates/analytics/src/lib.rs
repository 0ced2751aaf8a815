//! Analytics read models.
//!
//! Revenue figures are a stand-in: a fixed unit price times the number of
//! completed bookings. There is no ledger behind them.

pub mod breakdown;
pub mod dashboard;
pub mod revenue;

pub use breakdown::count_by;
pub use dashboard::{DashboardCounts, DashboardStats};
pub use revenue::{
    MOCK_UNIT_PRICE, MonthBucket, MonthBuckets, RevenueStats, growth_percentage, revenue_totals,
};
