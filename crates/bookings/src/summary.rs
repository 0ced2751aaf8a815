use serde::Serialize;

use crate::booking::BookingStatus;

/// Booking totals per lifecycle stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub total: usize,
    pub pending: usize,
    pub confirmed: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub no_show: usize,
}

impl StatusSummary {
    pub fn record(&mut self, status: BookingStatus) {
        self.total += 1;
        let slot = match status {
            BookingStatus::Pending => &mut self.pending,
            BookingStatus::Confirmed => &mut self.confirmed,
            BookingStatus::Completed => &mut self.completed,
            BookingStatus::Cancelled => &mut self.cancelled,
            BookingStatus::NoShow => &mut self.no_show,
        };
        *slot += 1;
    }
}

impl FromIterator<BookingStatus> for StatusSummary {
    fn from_iter<I: IntoIterator<Item = BookingStatus>>(iter: I) -> Self {
        let mut summary = Self::default();
        for status in iter {
            summary.record(status);
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_each_stage() {
        let summary: StatusSummary = [
            BookingStatus::Pending,
            BookingStatus::Pending,
            BookingStatus::Completed,
            BookingStatus::NoShow,
        ]
        .into_iter()
        .collect();

        assert_eq!(summary.total, 4);
        assert_eq!(summary.pending, 2);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.no_show, 1);
        assert_eq!(summary.confirmed, 0);
        assert_eq!(summary.cancelled, 0);
    }

    #[test]
    fn empty_summary_is_zero() {
        let summary: StatusSummary = std::iter::empty().collect();
        assert_eq!(summary, StatusSummary::default());
    }
}
