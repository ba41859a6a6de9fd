//! Breakdown of opportunities by acquisition channel.

use crate::rates::percent_rounded;
use pipeline_core::types::{LeadSource, Opportunity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadSourceStats {
    pub source: LeadSource,
    pub count: u64,
    /// Share of all opportunities, whole percent.
    pub percentage: u32,
    pub revenue: f64,
    /// Won over count within the source, whole percent.
    pub conversion_rate: u32,
}

/// One entry per source that occurs, in declaration order of [`LeadSource`].
pub fn compute_lead_sources(opportunities: &[Opportunity]) -> Vec<LeadSourceStats> {
    let mut groups: BTreeMap<LeadSource, (u64, u64, f64)> = BTreeMap::new();

    for opportunity in opportunities {
        let (count, won, revenue) = groups.entry(opportunity.lead_source).or_default();
        *count += 1;
        *revenue += opportunity.won_revenue();
        if opportunity.is_won() {
            *won += 1;
        }
    }

    let total = opportunities.len() as u64;
    groups
        .into_iter()
        .map(|(source, (count, won, revenue))| LeadSourceStats {
            source,
            count,
            percentage: percent_rounded(count, total),
            revenue,
            conversion_rate: percent_rounded(won, count),
        })
        .collect()
}
