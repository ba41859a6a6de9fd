//! Headline KPIs with optional period-over-period deltas.

use crate::rates::{mean, percent, percent_change, round1};
use crate::time_metrics::average_sales_cycle;
use pipeline_core::types::{Opportunity, ProposalStatus};
use serde::{Deserialize, Serialize};

/// KPI card values. The `*_change` fields are present only when a
/// comparison period was supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSummary {
    pub total_revenue: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_revenue_change: Option<f64>,
    pub cash_collected: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash_collected_change: Option<f64>,
    /// Won over total, percent, one decimal.
    pub closing_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closing_rate_change: Option<f64>,
    pub proposals_pitched: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposals_pitched_change: Option<f64>,
    /// Days, one decimal.
    pub avg_sales_cycle: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_sales_cycle_change: Option<f64>,
    pub total_calls: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_calls_change: Option<f64>,
    /// Mean revenue of won deals with positive revenue, whole units.
    pub avg_deal_size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_deal_size_change: Option<f64>,
}

/// KPIs for a single period, without deltas.
pub fn compute_period_kpis(opportunities: &[Opportunity]) -> KpiSummary {
    let total_revenue: f64 = opportunities.iter().map(Opportunity::won_revenue).sum();
    let cash_collected: f64 = opportunities.iter().map(|o| o.cash_collected.value()).sum();

    let won = opportunities.iter().filter(|o| o.is_won()).count() as u64;
    let closing_rate = round1(percent(won, opportunities.len() as u64));

    let proposals_pitched = opportunities
        .iter()
        .filter(|o| o.proposal_status == ProposalStatus::Pitched)
        .count() as u64;

    let total_calls = opportunities.iter().map(Opportunity::call_count).sum();

    let avg_deal_size = mean(
        opportunities
            .iter()
            .filter(|o| o.is_won() && o.revenue.value() > 0.0)
            .map(|o| o.revenue.value()),
    )
    .round();

    KpiSummary {
        total_revenue,
        cash_collected,
        closing_rate,
        proposals_pitched,
        avg_sales_cycle: average_sales_cycle(opportunities),
        total_calls,
        avg_deal_size,
        ..Default::default()
    }
}

/// KPIs for `opportunities`, with percent change against `comparison` when
/// one is given. Deltas compare the reported (rounded) values of each side.
pub fn compute_kpis(opportunities: &[Opportunity], comparison: Option<&[Opportunity]>) -> KpiSummary {
    let mut kpis = compute_period_kpis(opportunities);

    if let Some(previous) = comparison {
        let prev = compute_period_kpis(previous);
        kpis.total_revenue_change = Some(percent_change(kpis.total_revenue, prev.total_revenue));
        kpis.cash_collected_change =
            Some(percent_change(kpis.cash_collected, prev.cash_collected));
        kpis.closing_rate_change = Some(percent_change(kpis.closing_rate, prev.closing_rate));
        kpis.proposals_pitched_change = Some(percent_change(
            kpis.proposals_pitched as f64,
            prev.proposals_pitched as f64,
        ));
        kpis.avg_sales_cycle_change =
            Some(percent_change(kpis.avg_sales_cycle, prev.avg_sales_cycle));
        kpis.total_calls_change = Some(percent_change(
            kpis.total_calls as f64,
            prev.total_calls as f64,
        ));
        kpis.avg_deal_size_change = Some(percent_change(kpis.avg_deal_size, prev.avg_deal_size));
    }

    tracing::debug!(
        opportunities = opportunities.len(),
        compared = comparison.is_some(),
        closing_rate = kpis.closing_rate,
        "KPIs computed"
    );
    kpis
}
