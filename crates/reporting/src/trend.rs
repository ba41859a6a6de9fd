//! Monthly trend series bucketed by creation date.

use crate::rates::percent;
use pipeline_core::types::Opportunity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// `YYYY-MM`.
    pub period: String,
    pub revenue: f64,
    pub deals: u64,
    pub closing_rate: f64,
    pub cash_collected: f64,
}

#[derive(Default)]
struct MonthBucket {
    revenue: f64,
    deals: u64,
    won: u64,
    cash_collected: f64,
}

/// One point per month present in the input, oldest first.
pub fn compute_trend(opportunities: &[Opportunity]) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<(i32, u32), MonthBucket> = BTreeMap::new();

    for opportunity in opportunities {
        let bucket = buckets.entry(opportunity.creation_month()).or_default();
        bucket.deals += 1;
        bucket.revenue += opportunity.won_revenue();
        bucket.cash_collected += opportunity.cash_collected.value();
        if opportunity.is_won() {
            bucket.won += 1;
        }
    }

    buckets
        .into_iter()
        .map(|((year, month), bucket)| TrendPoint {
            period: format!("{:04}-{:02}", year, month),
            revenue: bucket.revenue,
            deals: bucket.deals,
            closing_rate: percent(bucket.won, bucket.deals),
            cash_collected: bucket.cash_collected,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::opp;

    #[test]
    fn test_empty_input() {
        assert!(compute_trend(&[]).is_empty());
    }

    #[test]
    fn test_lost_revenue_excluded() {
        let opps = vec![
            opp(1).created("2024-03-04").won(5000.0).cash(1000.0).build(),
            opp(2).created("2024-03-20").revenue(3000.0).lost().cash(500.0).build(),
        ];
        let trend = compute_trend(&opps);
        assert_eq!(trend.len(), 1);
        assert_eq!(trend[0].period, "2024-03");
        assert_eq!(trend[0].revenue, 5000.0);
        assert_eq!(trend[0].deals, 2);
        assert_eq!(trend[0].closing_rate, 50.0);
        assert_eq!(trend[0].cash_collected, 1500.0);
    }

    #[test]
    fn test_chronological_without_duplicates() {
        let opps = vec![
            opp(1).created("2024-11-02").build(),
            opp(2).created("2023-12-31").build(),
            opp(3).created("2024-02-10").won(10.0).build(),
            opp(4).created("2024-11-30").build(),
        ];
        let periods: Vec<String> = compute_trend(&opps).into_iter().map(|p| p.period).collect();
        assert_eq!(periods, vec!["2023-12", "2024-02", "2024-11"]);
    }

    #[test]
    fn test_closing_rate_is_unrounded() {
        let opps = vec![
            opp(1).won(10.0).build(),
            opp(2).build(),
            opp(3).build(),
        ];
        let rate = compute_trend(&opps)[0].closing_rate;
        assert!((rate - 100.0 / 3.0).abs() < 1e-9);
    }
}
