//! End-to-end dashboard runs: flat wire records go through the store and the
//! dashboard service exactly as the tracker binary wires them.

use pipeline_core::config::DashboardConfig;
use pipeline_core::types::SlotId;
use pipeline_core::OpportunityStore;
use pipeline_reporting::{
    build_dashboard, DashboardFilter, DashboardService, FunnelStage, KpiSummary, ShowUpRates,
};
use pipeline_store::record::parse_records;
use pipeline_store::InMemoryStore;
use std::sync::Arc;

fn store_from(json: &str) -> Arc<InMemoryStore> {
    let store = InMemoryStore::new();
    for record in parse_records(json).unwrap() {
        store.create(record.into()).unwrap();
    }
    Arc::new(store)
}

fn service(json: &str) -> DashboardService<InMemoryStore> {
    DashboardService::new(store_from(json), DashboardConfig::default())
}

#[tokio::test]
async fn empty_store_yields_zeroed_dashboard() {
    let data = service("[]")
        .for_all(&DashboardFilter::default())
        .await
        .unwrap();

    assert_eq!(data.kpis, KpiSummary::default());
    assert_eq!(data.show_up_rates, ShowUpRates::default());
    assert_eq!(data.funnel_data.nodes.len(), 8);
    assert!(data.funnel_data.nodes.iter().all(|n| n.value == 0));
    assert!(data.funnel_data.links.is_empty());
    assert!(data.trend_data.is_empty());
}

#[tokio::test]
async fn single_open_opportunity_after_first_discovery() {
    let data = service(
        r#"[{
            "name": "Acme",
            "discovery1Date": "2024-03-05",
            "discovery1Duration": 45,
            "dealStatus": "Open",
            "revenue": "0",
            "createdAt": "2024-03-01"
        }]"#,
    )
    .for_all(&DashboardFilter::default())
    .await
    .unwrap();

    assert_eq!(data.kpis.total_calls, 1);
    assert_eq!(data.kpis.closing_rate, 0.0);
    assert_eq!(data.show_up_rates.first_discovery, 100);
    for slot in &SlotId::ALL[1..] {
        assert_eq!(data.show_up_rates.get(*slot), 0, "{}", slot.label());
    }

    let first = data
        .funnel_data
        .node(FunnelStage::Call(SlotId::FIRST_DISCOVERY))
        .unwrap();
    assert_eq!(first.name, "First Discovery");
    assert_eq!(first.value, 1);
}

#[tokio::test]
async fn won_deal_ten_days_after_discovery() {
    let data = service(
        r#"[{
            "name": "Acme",
            "discovery1Date": "2024-03-05",
            "closing1Date": "2024-03-15",
            "dealStatus": "Won",
            "revenue": "10000",
            "createdAt": "2024-03-01"
        }]"#,
    )
    .for_all(&DashboardFilter::default())
    .await
    .unwrap();

    assert_eq!(data.time_metrics.discovery_to_closing, 10.0);
    assert_eq!(data.kpis.total_revenue, 10000.0);
    assert_eq!(data.kpis.closing_rate, 100.0);
}

#[tokio::test]
async fn lost_revenue_stays_out_of_the_trend() {
    let data = service(
        r#"[
            {"name": "Won", "isWon": true, "revenue": 5000, "createdAt": "2024-03-02"},
            {"name": "Lost", "isLost": true, "revenue": 3000, "createdAt": "2024-03-20"}
        ]"#,
    )
    .for_all(&DashboardFilter::default())
    .await
    .unwrap();

    assert_eq!(data.trend_data.len(), 1);
    let march = &data.trend_data[0];
    assert_eq!(march.period, "2024-03");
    assert_eq!(march.revenue, 5000.0);
    assert_eq!(march.deals, 2);
    assert_eq!(march.closing_rate, 50.0);
}

#[tokio::test]
async fn month_view_compares_cash_with_previous_month() {
    let data = service(
        r#"[
            {"name": "February", "cashCollected": "100", "createdAt": "2024-02-10"},
            {"name": "March", "cashCollected": "200", "createdAt": "2024-03-10"}
        ]"#,
    )
    .for_month(2024, 3, &DashboardFilter::default())
    .await
    .unwrap();

    assert_eq!(data.kpis.cash_collected, 200.0);
    assert_eq!(data.kpis.cash_collected_change, Some(100.0));
}

#[tokio::test]
async fn january_compares_with_previous_december() {
    let data = service(
        r#"[
            {"name": "December", "isWon": true, "revenue": 400, "createdAt": "2023-12-28"},
            {"name": "January", "isWon": true, "revenue": 600, "createdAt": "2024-01-03"}
        ]"#,
    )
    .for_month(2024, 1, &DashboardFilter::default())
    .await
    .unwrap();

    assert_eq!(data.kpis.total_revenue, 600.0);
    assert_eq!(data.kpis.total_revenue_change, Some(50.0));
}

#[tokio::test]
async fn service_output_matches_direct_engine_call() {
    let store = store_from(
        r#"[
            {"name": "A", "salesperson": "Ana", "discovery1Date": "2024-03-01",
             "discovery1Duration": 30, "closing1Date": "2024-03-09", "closing1Duration": 40,
             "isWon": true, "revenue": "1200", "createdAt": "2024-03-01"},
            {"name": "B", "salesperson": "Ben", "leadSource": "Community",
             "discovery1Date": "2024-03-04", "isLost": true, "createdAt": "2024-03-03"}
        ]"#,
    );
    let direct = build_dashboard(&store.all(), None);
    let via_service = DashboardService::new(Arc::clone(&store), DashboardConfig::default())
        .for_all(&DashboardFilter::default())
        .await
        .unwrap();
    assert_eq!(direct, via_service);
}
