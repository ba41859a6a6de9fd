//! Sales pipeline analytics: KPIs, show-up rates, funnel flow, time and call
//! metrics, trends, lead-source and salesperson breakdowns, plus the call
//! calendar feed.
//!
//! Every calculator is a pure function of a borrowed opportunity snapshot.

pub mod calendar;
pub mod call_metrics;
pub mod dashboard;
pub mod funnel;
pub mod kpi;
pub mod lead_source;
pub mod rates;
pub mod salesperson;
pub mod show_up;
pub mod time_metrics;
pub mod trend;

#[cfg(test)]
mod fixtures;

pub use calendar::{compute_calendar, compute_calendar_month, CalendarEvent};
pub use call_metrics::{compute_call_metrics, CallMetrics};
pub use dashboard::{
    build_dashboard, build_dashboard_concurrent, DashboardData, DashboardFilter, DashboardService,
};
pub use funnel::{compute_funnel, FunnelGraph, FunnelLink, FunnelNode, FunnelStage};
pub use kpi::{compute_kpis, compute_period_kpis, KpiSummary};
pub use lead_source::{compute_lead_sources, LeadSourceStats};
pub use salesperson::{compute_salespeople, rank_by_revenue, SalespersonStats};
pub use show_up::{compute_show_up_rates, ShowUpRates};
pub use time_metrics::{average_sales_cycle, compute_time_metrics, days_between, TimeMetrics};
pub use trend::{compute_trend, TrendPoint};
