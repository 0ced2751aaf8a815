use serde::Serialize;

use crate::revenue::revenue_totals;

/// Raw counts gathered from the store for the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardCounts {
    pub total_bookings: usize,
    pub pending_bookings: usize,
    pub completed_bookings: usize,
    pub total_contacts: usize,
    pub active_staff: usize,
    pub low_stock_items: usize,
    pub overdue_forms: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_bookings: usize,
    pub pending_bookings: usize,
    pub completed_bookings: usize,
    pub total_revenue: f64,
    pub total_contacts: usize,
    pub active_staff: usize,
    pub low_stock_items: usize,
    pub overdue_forms: usize,
}

impl From<DashboardCounts> for DashboardStats {
    fn from(c: DashboardCounts) -> Self {
        Self {
            total_bookings: c.total_bookings,
            pending_bookings: c.pending_bookings,
            completed_bookings: c.completed_bookings,
            total_revenue: revenue_totals(c.completed_bookings),
            total_contacts: c.total_contacts,
            active_staff: c.active_staff,
            low_stock_items: c.low_stock_items,
            overdue_forms: c.overdue_forms,
        }
    }
}
