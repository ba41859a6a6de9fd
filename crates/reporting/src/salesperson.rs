//! Per-salesperson leaderboard.

use crate::rates::{mean, percent};
use pipeline_core::types::Opportunity;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalespersonStats {
    pub name: String,
    pub opportunities: u64,
    pub total_revenue: f64,
    pub deals_won: u64,
    pub closing_rate: f64,
    /// Mean revenue of won deals, zero-revenue wins included.
    pub avg_deal_size: f64,
    pub total_calls: u64,
}

/// Stats per salesperson, ordered by name so consumers can re-sort
/// predictably.
pub fn compute_salespeople(opportunities: &[Opportunity]) -> Vec<SalespersonStats> {
    let mut books: BTreeMap<&str, Vec<&Opportunity>> = BTreeMap::new();
    for opportunity in opportunities {
        books
            .entry(opportunity.salesperson.as_str())
            .or_default()
            .push(opportunity);
    }

    books
        .into_iter()
        .map(|(name, members)| {
            let won: Vec<&Opportunity> =
                members.iter().copied().filter(|o| o.is_won()).collect();
            let opportunities = members.len() as u64;
            SalespersonStats {
                name: name.to_string(),
                opportunities,
                total_revenue: won.iter().map(|o| o.revenue.value()).sum(),
                deals_won: won.len() as u64,
                closing_rate: percent(won.len() as u64, opportunities),
                avg_deal_size: mean(won.iter().map(|o| o.revenue.value())),
                total_calls: members.iter().map(|o| o.call_count()).sum(),
            }
        })
        .collect()
}

/// Re-sort for "top performer" display: revenue descending, name ascending.
pub fn rank_by_revenue(stats: &mut [SalespersonStats]) {
    stats.sort_by(|a, b| {
        b.total_revenue
            .partial_cmp(&a.total_revenue)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
}
