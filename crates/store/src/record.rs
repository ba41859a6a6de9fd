//! Flat wire record for opportunities, one column per call field, as
//! exported by the tracker's spreadsheet-style data entry. Converting to the
//! structured model happens here so the reporting engine never parses text.

use chrono::NaiveDate;
use pipeline_core::store::OpportunityStore;
use pipeline_core::types::{
    deserialize_date, deserialize_label, deserialize_minutes, Amount, CallSlot, Contact,
    DealStatus, LeadSource, NewOpportunity, Opportunity, ProposalStatus,
};
use pipeline_core::PipelineResult;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use tracing::info;

/// A list that may arrive either as a JSON array or as a JSON-encoded string.
fn deserialize_embedded_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Embedded<T> {
        List(Vec<T>),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Embedded::<T>::deserialize(deserializer)? {
        Embedded::List(items) => items,
        Embedded::Text(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Embedded list could not be decoded, dropping it");
            Vec::new()
        }),
        Embedded::Other(_) => Vec::new(),
    })
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityRecord {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_embedded_list")]
    pub contacts: Vec<Contact>,
    #[serde(default, deserialize_with = "deserialize_label")]
    pub lead_source: Option<LeadSource>,
    #[serde(default)]
    pub salesperson: Option<String>,

    #[serde(default, deserialize_with = "deserialize_date")]
    pub discovery1_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_minutes")]
    pub discovery1_duration: Option<u32>,
    #[serde(default)]
    pub discovery1_recording: Option<String>,
    #[serde(default, deserialize_with = "deserialize_date")]
    pub discovery2_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_minutes")]
    pub discovery2_duration: Option<u32>,
    #[serde(default)]
    pub discovery2_recording: Option<String>,
    #[serde(default, deserialize_with = "deserialize_date")]
    pub discovery3_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_minutes")]
    pub discovery3_duration: Option<u32>,
    #[serde(default)]
    pub discovery3_recording: Option<String>,

    #[serde(default, deserialize_with = "deserialize_date")]
    pub closing1_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_minutes")]
    pub closing1_duration: Option<u32>,
    #[serde(default)]
    pub closing1_recording: Option<String>,
    #[serde(default, deserialize_with = "deserialize_date")]
    pub closing2_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_minutes")]
    pub closing2_duration: Option<u32>,
    #[serde(default)]
    pub closing2_recording: Option<String>,
    #[serde(default, deserialize_with = "deserialize_date")]
    pub closing3_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_minutes")]
    pub closing3_duration: Option<u32>,
    #[serde(default)]
    pub closing3_recording: Option<String>,

    #[serde(default, deserialize_with = "deserialize_label")]
    pub proposal_status: Option<ProposalStatus>,
    #[serde(default)]
    pub revenue: Amount,
    #[serde(default)]
    pub cash_collected: Amount,
    #[serde(default, deserialize_with = "deserialize_label")]
    pub deal_status: Option<DealStatus>,
    #[serde(default)]
    pub is_won: bool,
    #[serde(default)]
    pub is_lost: bool,

    #[serde(default, deserialize_with = "deserialize_embedded_list")]
    pub files: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "deserialize_date")]
    pub created_at: Option<NaiveDate>,
}

fn slot(date: Option<NaiveDate>, duration: Option<u32>, recording: Option<String>) -> CallSlot {
    CallSlot {
        date,
        duration,
        recording: recording.filter(|r| !r.trim().is_empty()),
    }
}

impl OpportunityRecord {
    /// Explicit `dealStatus` wins; otherwise the legacy flags decide.
    pub fn resolved_status(&self) -> DealStatus {
        self.deal_status
            .unwrap_or_else(|| DealStatus::from_flags(self.is_won, self.is_lost))
    }
}

impl From<OpportunityRecord> for NewOpportunity {
    fn from(record: OpportunityRecord) -> Self {
        let deal_status = record.resolved_status();
        let mut new = NewOpportunity::named(record.name);
        new.contacts = record.contacts;
        if let Some(source) = record.lead_source {
            new.lead_source = source;
        }
        if let Some(salesperson) = record.salesperson.filter(|s| !s.trim().is_empty()) {
            new.salesperson = salesperson;
        }
        new.created_at = record.created_at;
        new.discovery = [
            slot(record.discovery1_date, record.discovery1_duration, record.discovery1_recording),
            slot(record.discovery2_date, record.discovery2_duration, record.discovery2_recording),
            slot(record.discovery3_date, record.discovery3_duration, record.discovery3_recording),
        ];
        new.closing = [
            slot(record.closing1_date, record.closing1_duration, record.closing1_recording),
            slot(record.closing2_date, record.closing2_duration, record.closing2_recording),
            slot(record.closing3_date, record.closing3_duration, record.closing3_recording),
        ];
        new.proposal_status = record.proposal_status.unwrap_or_default();
        new.revenue = record.revenue;
        new.cash_collected = record.cash_collected;
        new.deal_status = deal_status;
        new.files = record.files;
        new.notes = record.notes;
        new
    }
}

impl From<&Opportunity> for OpportunityRecord {
    fn from(o: &Opportunity) -> Self {
        let [d1, d2, d3] = o.discovery.clone();
        let [c1, c2, c3] = o.closing.clone();
        Self {
            id: Some(o.id),
            name: o.name.clone(),
            contacts: o.contacts.clone(),
            lead_source: Some(o.lead_source),
            salesperson: Some(o.salesperson.clone()),
            discovery1_date: d1.date,
            discovery1_duration: d1.duration,
            discovery1_recording: d1.recording,
            discovery2_date: d2.date,
            discovery2_duration: d2.duration,
            discovery2_recording: d2.recording,
            discovery3_date: d3.date,
            discovery3_duration: d3.duration,
            discovery3_recording: d3.recording,
            closing1_date: c1.date,
            closing1_duration: c1.duration,
            closing1_recording: c1.recording,
            closing2_date: c2.date,
            closing2_duration: c2.duration,
            closing2_recording: c2.recording,
            closing3_date: c3.date,
            closing3_duration: c3.duration,
            closing3_recording: c3.recording,
            proposal_status: Some(o.proposal_status),
            revenue: o.revenue,
            cash_collected: o.cash_collected,
            deal_status: Some(o.deal_status),
            is_won: o.is_won(),
            is_lost: o.is_lost(),
            files: o.files.clone(),
            notes: o.notes.clone(),
            created_at: Some(o.created_at),
        }
    }
}

/// Decode a JSON array of flat records.
pub fn parse_records(json: &str) -> Result<Vec<OpportunityRecord>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Decode a JSON array of flat records and create each one in `store`.
/// Stops at the first record the store rejects.
pub fn import_json<S: OpportunityStore + ?Sized>(store: &S, json: &str) -> PipelineResult<usize> {
    let records = parse_records(json)?;
    let count = records.len();
    for record in records {
        store.create(record.into())?;
    }
    Ok(count)
}

pub fn import_file<S: OpportunityStore + ?Sized>(store: &S, path: &Path) -> PipelineResult<usize> {
    let raw = std::fs::read_to_string(path)?;
    let count = import_json(store, &raw)?;
    info!(count, path = %path.display(), "Opportunity records imported");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use pipeline_core::PipelineError;

    const TECHCORP: &str = r#"{
        "name": "TechCorp Solutions",
        "contacts": "[{\"id\":\"c1\",\"name\":\"Dana\",\"email\":\"dana@techcorp.com\",\"phone\":\"\"}]",
        "discovery1Date": "2024-03-05",
        "discovery1Duration": 45,
        "discovery1Recording": "https://zoom.us/rec/123",
        "discovery2Date": "2024-03-12",
        "discovery2Duration": "38",
        "discovery3Date": "",
        "closing1Date": "2024-03-20",
        "closing1Duration": 55,
        "proposalStatus": "Pitched",
        "revenue": "32500",
        "cashCollected": "not yet",
        "isWon": true,
        "files": "[\"proposal_techcorp.pdf\", \"contract_signed.pdf\"]",
        "conversation": "[]"
    }"#;

    #[test]
    fn test_decode_flat_record() {
        let record: OpportunityRecord = serde_json::from_str(TECHCORP).unwrap();
        assert_eq!(record.discovery2_duration, Some(38));
        assert_eq!(record.discovery3_date, None);
        assert_eq!(record.revenue.value(), 32500.0);
        assert_eq!(record.cash_collected, Amount::ZERO);
        assert_eq!(record.contacts.len(), 1);
        assert_eq!(record.files.len(), 2);
        assert_eq!(record.resolved_status(), DealStatus::Won);
    }

    #[test]
    fn test_into_new_opportunity() {
        let record: OpportunityRecord = serde_json::from_str(TECHCORP).unwrap();
        let new = NewOpportunity::from(record);
        assert_eq!(new.deal_status, DealStatus::Won);
        assert_eq!(new.salesperson, "Unknown");
        assert_eq!(new.lead_source, LeadSource::Referrals);
        assert_eq!(new.discovery[0].duration, Some(45));
        assert_eq!(new.discovery[0].recording.as_deref(), Some("https://zoom.us/rec/123"));
        assert!(new.discovery[2].date.is_none());
        assert!(new.closing[0].date.is_some());
        assert_eq!(new.proposal_status, ProposalStatus::Pitched);
    }

    #[test]
    fn test_explicit_status_beats_flags() {
        let record = OpportunityRecord {
            name: "Mixed".into(),
            deal_status: Some(DealStatus::Lost),
            is_won: true,
            ..Default::default()
        };
        assert_eq!(record.resolved_status(), DealStatus::Lost);
    }

    #[test]
    fn test_flags_follow_status_on_export() {
        let mut new = NewOpportunity::named("Lost deal");
        new.deal_status = DealStatus::Lost;
        let opportunity = new.into_opportunity(7, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        let record = OpportunityRecord::from(&opportunity);
        assert!(record.is_lost);
        assert!(!record.is_won);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["isLost"], true);
        assert_eq!(json["dealStatus"], "Lost");
        assert_eq!(json["createdAt"], "2024-01-02");
    }

    #[test]
    fn test_import_json() {
        let store = InMemoryStore::new();
        let count = import_json(
            &store,
            r#"[{"name": "A", "createdAt": "2024-02-01"}, {"name": "B", "isWon": true}]"#,
        )
        .unwrap();
        assert_eq!(count, 2);
        assert_eq!(store.created_in_month(2024, 2).unwrap().len(), 1);
        assert!(store.get(2).unwrap().is_won());
    }

    #[test]
    fn test_import_errors() {
        let store = InMemoryStore::new();
        assert!(matches!(
            import_json(&store, "{not json"),
            Err(PipelineError::Serialization(_))
        ));
        assert!(matches!(
            import_json(&store, r#"[{"name": "  "}]"#),
            Err(PipelineError::Validation(_))
        ));
        let missing = std::env::temp_dir().join("pipeline-records-does-not-exist.json");
        assert!(matches!(
            import_file(&store, &missing),
            Err(PipelineError::Io(_))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_unknown_labels_fall_back_to_defaults() {
        let store = InMemoryStore::new();
        let count = import_json(
            &store,
            r#"[
                {"name": "A", "leadSource": "LinkedIn", "proposalStatus": "pitched"},
                {"name": "B", "leadSource": "cold calling", "proposalStatus": 3},
                {"name": "C", "dealStatus": "closed", "isLost": true, "leadSource": ""}
            ]"#,
        )
        .unwrap();
        assert_eq!(count, 3);

        let all = store.all();
        assert_eq!(all[0].lead_source, LeadSource::Referrals);
        assert_eq!(all[0].proposal_status, ProposalStatus::Pitched);
        assert_eq!(all[1].lead_source, LeadSource::ColdCalling);
        assert_eq!(all[1].proposal_status, ProposalStatus::NotApplicable);
        assert_eq!(all[2].deal_status, DealStatus::Lost);
        assert_eq!(all[2].lead_source, LeadSource::Referrals);
    }

    #[test]
    fn test_malformed_embedded_lists_are_dropped() {
        let records =
            parse_records(r#"[{"name": "Odd", "files": "not json", "contacts": 5}]"#).unwrap();
        assert!(records[0].files.is_empty());
        assert!(records[0].contacts.is_empty());
    }
}
