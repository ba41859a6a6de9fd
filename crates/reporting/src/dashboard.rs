//! Sales dashboard: runs every calculator against one snapshot and merges
//! the results into a single response.

use crate::calendar::{compute_calendar, compute_calendar_month, CalendarEvent};
use crate::call_metrics::{compute_call_metrics, CallMetrics};
use crate::funnel::{compute_funnel, FunnelGraph};
use crate::kpi::{compute_kpis, KpiSummary};
use crate::lead_source::{compute_lead_sources, LeadSourceStats};
use crate::salesperson::{compute_salespeople, SalespersonStats};
use crate::show_up::{compute_show_up_rates, ShowUpRates};
use crate::time_metrics::{compute_time_metrics, TimeMetrics};
use crate::trend::{compute_trend, TrendPoint};
use pipeline_core::config::DashboardConfig;
use pipeline_core::store::{month_bounds, previous_month, OpportunityStore};
use pipeline_core::types::{LeadSource, Opportunity};
use pipeline_core::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub kpis: KpiSummary,
    pub show_up_rates: ShowUpRates,
    pub funnel_data: FunnelGraph,
    pub time_metrics: TimeMetrics,
    pub call_metrics: CallMetrics,
    pub trend_data: Vec<TrendPoint>,
    pub lead_sources: Vec<LeadSourceStats>,
    pub salespeople: Vec<SalespersonStats>,
}

/// Compute every section sequentially on the calling thread.
pub fn build_dashboard(
    opportunities: &[Opportunity],
    comparison: Option<&[Opportunity]>,
) -> DashboardData {
    DashboardData {
        kpis: compute_kpis(opportunities, comparison),
        show_up_rates: compute_show_up_rates(opportunities),
        funnel_data: compute_funnel(opportunities),
        time_metrics: compute_time_metrics(opportunities),
        call_metrics: compute_call_metrics(opportunities),
        trend_data: compute_trend(opportunities),
        lead_sources: compute_lead_sources(opportunities),
        salespeople: compute_salespeople(opportunities),
    }
}

fn spawn_section<T, F>(snapshot: &Arc<[Opportunity]>, f: F) -> tokio::task::JoinHandle<T>
where
    T: Send + 'static,
    F: FnOnce(&[Opportunity]) -> T + Send + 'static,
{
    let snapshot = Arc::clone(snapshot);
    tokio::task::spawn_blocking(move || f(&snapshot[..]))
}

/// Compute every section as an independent blocking task sharing the same
/// read-only snapshot.
pub async fn build_dashboard_concurrent(
    snapshot: Arc<[Opportunity]>,
    comparison: Option<Arc<[Opportunity]>>,
) -> PipelineResult<DashboardData> {
    let kpis = {
        let snapshot = Arc::clone(&snapshot);
        tokio::task::spawn_blocking(move || compute_kpis(&snapshot, comparison.as_deref()))
    };

    let (
        kpis,
        show_up_rates,
        funnel_data,
        time_metrics,
        call_metrics,
        trend_data,
        lead_sources,
        salespeople,
    ) = tokio::try_join!(
        kpis,
        spawn_section(&snapshot, compute_show_up_rates),
        spawn_section(&snapshot, compute_funnel),
        spawn_section(&snapshot, compute_time_metrics),
        spawn_section(&snapshot, compute_call_metrics),
        spawn_section(&snapshot, compute_trend),
        spawn_section(&snapshot, compute_lead_sources),
        spawn_section(&snapshot, compute_salespeople),
    )
    .map_err(|e| PipelineError::Internal(anyhow::anyhow!("dashboard task failed: {}", e)))?;

    Ok(DashboardData {
        kpis,
        show_up_rates,
        funnel_data,
        time_metrics,
        call_metrics,
        trend_data,
        lead_sources,
        salespeople,
    })
}

/// Collaborator-side narrowing applied to a snapshot before the engine runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardFilter {
    #[serde(default)]
    pub lead_source: Option<LeadSource>,
    #[serde(default)]
    pub salesperson: Option<String>,
}

impl DashboardFilter {
    pub fn is_empty(&self) -> bool {
        self.lead_source.is_none() && self.salesperson.is_none()
    }

    pub fn matches(&self, opportunity: &Opportunity) -> bool {
        self.lead_source.map_or(true, |s| opportunity.lead_source == s)
            && self
                .salesperson
                .as_deref()
                .map_or(true, |p| opportunity.salesperson == p)
    }

    pub fn apply(&self, mut opportunities: Vec<Opportunity>) -> Vec<Opportunity> {
        if !self.is_empty() {
            opportunities.retain(|o| self.matches(o));
        }
        opportunities
    }
}

/// Fetches fresh snapshots from a store and builds dashboards from them.
/// Holds no state between runs.
pub struct DashboardService<S: OpportunityStore> {
    store: Arc<S>,
    config: DashboardConfig,
}

impl<S: OpportunityStore> DashboardService<S> {
    pub fn new(store: Arc<S>, config: DashboardConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Dashboard over every opportunity in the store.
    pub async fn for_all(&self, filter: &DashboardFilter) -> PipelineResult<DashboardData> {
        let current = filter.apply(self.store.all());
        self.build(current, None, "all").await
    }

    /// Dashboard over opportunities created in one month, compared against
    /// the previous calendar month when enabled.
    pub async fn for_month(
        &self,
        year: i32,
        month: u32,
        filter: &DashboardFilter,
    ) -> PipelineResult<DashboardData> {
        let current = filter.apply(self.store.created_in_month(year, month)?);
        let comparison = if self.config.compare_previous_month {
            let (prev_year, prev_month) = previous_month(year, month);
            Some(filter.apply(self.store.created_in_month(prev_year, prev_month)?))
        } else {
            None
        };
        self.build(current, comparison, "month").await
    }

    /// Call calendar over the filtered store, optionally narrowed to calls
    /// dated within one month.
    pub fn calendar(
        &self,
        month: Option<(i32, u32)>,
        filter: &DashboardFilter,
    ) -> PipelineResult<Vec<CalendarEvent>> {
        let opportunities = filter.apply(self.store.all());
        let events = match month {
            Some((year, month)) => {
                month_bounds(year, month)?;
                compute_calendar_month(&opportunities, year, month)
            }
            None => compute_calendar(&opportunities),
        };
        metrics::counter!("calendar.builds").increment(1);
        info!(events = events.len(), "Calendar built");
        Ok(events)
    }

    async fn build(
        &self,
        current: Vec<Opportunity>,
        comparison: Option<Vec<Opportunity>>,
        scope: &'static str,
    ) -> PipelineResult<DashboardData> {
        let start = Instant::now();
        let count = current.len();

        let data = if self.config.parallel {
            build_dashboard_concurrent(current.into(), comparison.map(Into::into)).await?
        } else {
            build_dashboard(&current, comparison.as_deref())
        };

        let elapsed = start.elapsed();
        metrics::counter!("dashboard.builds", "scope" => scope).increment(1);
        metrics::histogram!("dashboard.opportunities").record(count as f64);
        metrics::histogram!("dashboard.build_seconds").record(elapsed.as_secs_f64());

        debug!(scope, elapsed_us = elapsed.as_micros() as u64, "Dashboard sections merged");
        info!(
            scope,
            opportunities = count,
            closing_rate = data.kpis.closing_rate,
            total_revenue = data.kpis.total_revenue,
            "Dashboard built"
        );
        Ok(data)
    }
}
