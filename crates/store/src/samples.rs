//! Demonstration data for development runs.

use crate::record::import_json;
use pipeline_core::{OpportunityStore, PipelineResult};
use tracing::info;

const SAMPLE_RECORDS: &str = r#"[
  {
    "name": "TechCorp Solutions",
    "leadSource": "Referrals",
    "salesperson": "Morgan",
    "discovery1Date": "2024-03-05", "discovery1Duration": 45, "discovery1Recording": "https://zoom.us/rec/123",
    "discovery2Date": "2024-03-12", "discovery2Duration": 38, "discovery2Recording": "https://zoom.us/rec/456",
    "closing1Date": "2024-03-20", "closing1Duration": 55, "closing1Recording": "https://zoom.us/rec/789",
    "proposalStatus": "Pitched",
    "revenue": "32500",
    "cashCollected": "15000",
    "isWon": true,
    "files": ["proposal_techcorp.pdf", "contract_signed.pdf"],
    "createdAt": "2024-03-01"
  },
  {
    "name": "Global Industries Inc",
    "leadSource": "Cold Calling",
    "salesperson": "Riley",
    "discovery1Date": "2024-03-08", "discovery1Duration": 42,
    "proposalStatus": "Created",
    "revenue": "0",
    "createdAt": "2024-03-04"
  },
  {
    "name": "StartupX Ventures",
    "leadSource": "Community",
    "salesperson": "Morgan",
    "discovery1Date": "2024-03-15", "discovery1Duration": 50,
    "discovery2Date": "2024-03-22", "discovery2Duration": 45,
    "discovery3Date": "2024-03-29", "discovery3Duration": 40,
    "closing1Date": "2024-04-05", "closing1Duration": 60,
    "closing2Date": "2024-04-12", "closing2Duration": 55,
    "closing3Date": "2024-04-19", "closing3Duration": 50,
    "proposalStatus": "Pitched",
    "revenue": "45000",
    "cashCollected": "45000",
    "isWon": true,
    "files": ["proposal_startupx.pdf"],
    "createdAt": "2024-04-02"
  }
]"#;

/// Insert the sample opportunities into `store`.
pub fn seed<S: OpportunityStore + ?Sized>(store: &S) -> PipelineResult<usize> {
    let count = import_json(store, SAMPLE_RECORDS)?;
    info!(count, "Sample opportunities seeded");
    Ok(count)
}
