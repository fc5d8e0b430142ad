//! Pure aggregations behind the admin analytics tab, the overview cards and the organization
//! dashboard.

mod breakdown;
mod counts;
pub mod views;

pub use breakdown::{
    department_breakdown, display_name, monthly_trend, status_breakdown,
    status_breakdown_from_labels, top_organizations, DEPARTMENT_LIMIT, TOP_ORGANIZATION_LIMIT,
    TREND_MONTHS,
};
pub use counts::{distinct_applicants, organization_activity};
pub use views::{
    AdminOverview, AnalyticsReport, DashboardStats, DepartmentCount, MonthlyCount,
    OrganizationActivity, PlatformTotals, StatusBreakdown, StatusCount, TopOrganization,
};
