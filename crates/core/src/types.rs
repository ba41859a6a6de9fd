//! Opportunity data model shared by the store and the reporting engine.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

use crate::error::PipelineError;

// ─── Enumerations ───────────────────────────────────────────────────────────

/// Acquisition channel that produced an opportunity.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum LeadSource {
    #[default]
    Referrals,
    #[serde(rename = "Cold Calling")]
    ColdCalling,
    Community,
    #[serde(rename = "Video-channel")]
    VideoChannel,
    #[serde(rename = "Internal team member")]
    InternalTeamMember,
}

impl LeadSource {
    pub const ALL: [LeadSource; 5] = [
        LeadSource::Referrals,
        LeadSource::ColdCalling,
        LeadSource::Community,
        LeadSource::VideoChannel,
        LeadSource::InternalTeamMember,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            LeadSource::Referrals => "Referrals",
            LeadSource::ColdCalling => "Cold Calling",
            LeadSource::Community => "Community",
            LeadSource::VideoChannel => "Video-channel",
            LeadSource::InternalTeamMember => "Internal team member",
        }
    }
}

impl std::fmt::Display for LeadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LeadSource {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        LeadSource::ALL
            .into_iter()
            .find(|source| source.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PipelineError::Validation(format!("unknown lead source '{}'", wanted)))
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProposalStatus {
    #[default]
    #[serde(rename = "N/A")]
    NotApplicable,
    Created,
    Pitched,
}

impl ProposalStatus {
    pub const ALL: [ProposalStatus; 3] = [
        ProposalStatus::NotApplicable,
        ProposalStatus::Created,
        ProposalStatus::Pitched,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ProposalStatus::NotApplicable => "N/A",
            ProposalStatus::Created => "Created",
            ProposalStatus::Pitched => "Pitched",
        }
    }
}

impl FromStr for ProposalStatus {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ProposalStatus::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                PipelineError::Validation(format!("unknown proposal status '{}'", wanted))
            })
    }
}

/// Commercial state of a deal. Exactly one holds at any time.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum DealStatus {
    #[default]
    Open,
    Won,
    Lost,
}

impl DealStatus {
    pub const ALL: [DealStatus; 3] = [DealStatus::Open, DealStatus::Won, DealStatus::Lost];

    pub fn label(&self) -> &'static str {
        match self {
            DealStatus::Open => "Open",
            DealStatus::Won => "Won",
            DealStatus::Lost => "Lost",
        }
    }

    /// Reconstruct a status from the legacy `isWon` / `isLost` flags.
    /// A record flagged both ways is treated as won.
    pub fn from_flags(is_won: bool, is_lost: bool) -> Self {
        if is_won {
            DealStatus::Won
        } else if is_lost {
            DealStatus::Lost
        } else {
            DealStatus::Open
        }
    }
}

impl FromStr for DealStatus {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        DealStatus::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PipelineError::Validation(format!("unknown deal status '{}'", wanted)))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    Discovery,
    Closing,
}

/// One of the six call slots: discovery 1–3 followed by closing 1–3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId {
    pub kind: CallKind,
    ordinal: u8,
}

impl SlotId {
    pub const FIRST_DISCOVERY: SlotId = SlotId::new(CallKind::Discovery, 1);
    pub const SECOND_DISCOVERY: SlotId = SlotId::new(CallKind::Discovery, 2);
    pub const THIRD_DISCOVERY: SlotId = SlotId::new(CallKind::Discovery, 3);
    pub const FIRST_CLOSING: SlotId = SlotId::new(CallKind::Closing, 1);
    pub const SECOND_CLOSING: SlotId = SlotId::new(CallKind::Closing, 2);
    pub const THIRD_CLOSING: SlotId = SlotId::new(CallKind::Closing, 3);

    /// Canonical slot order.
    pub const ALL: [SlotId; 6] = [
        SlotId::FIRST_DISCOVERY,
        SlotId::SECOND_DISCOVERY,
        SlotId::THIRD_DISCOVERY,
        SlotId::FIRST_CLOSING,
        SlotId::SECOND_CLOSING,
        SlotId::THIRD_CLOSING,
    ];

    const fn new(kind: CallKind, ordinal: u8) -> Self {
        Self { kind, ordinal }
    }

    /// 1-based position within its call kind.
    pub fn ordinal(&self) -> u8 {
        self.ordinal
    }

    /// 0-based position within the kind's slot array.
    pub fn index(&self) -> usize {
        usize::from(self.ordinal - 1)
    }

    /// 0-based position in [`SlotId::ALL`].
    pub fn position(&self) -> usize {
        match self.kind {
            CallKind::Discovery => self.index(),
            CallKind::Closing => 3 + self.index(),
        }
    }

    /// Stable snake_case key, e.g. `second_closing`.
    pub fn key(&self) -> &'static str {
        const KEYS: [&str; 6] = [
            "first_discovery",
            "second_discovery",
            "third_discovery",
            "first_closing",
            "second_closing",
            "third_closing",
        ];
        KEYS[self.position()]
    }

    /// Calendar event type, e.g. `closing2`.
    pub fn event_type(&self) -> &'static str {
        const TYPES: [&str; 6] = [
            "discovery1",
            "discovery2",
            "discovery3",
            "closing1",
            "closing2",
            "closing3",
        ];
        TYPES[self.position()]
    }

    pub fn label(&self) -> &'static str {
        const LABELS: [&str; 6] = [
            "First Discovery",
            "Second Discovery",
            "Third Discovery",
            "First Closing",
            "Second Closing",
            "Third Closing",
        ];
        LABELS[self.position()]
    }
}

// ─── Amount ─────────────────────────────────────────────────────────────────

/// Monetary value that never fails to parse. Non-numeric, missing or
/// non-finite input is coerced to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Amount(f64);

impl Amount {
    pub const ZERO: Amount = Amount(0.0);

    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Self(value)
        } else {
            Self::ZERO
        }
    }

    /// Parse free text such as `"32500"` or `" 1200.50 "`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(value) => Self::new(value),
            Err(_) => {
                if !raw.trim().is_empty() {
                    tracing::debug!(raw = raw, "Non-numeric amount coerced to zero");
                }
                Self::ZERO
            }
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0)
    }
}

/// Whatever shape a loosely typed numeric field arrives in.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Number(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match LooseNumber::deserialize(deserializer)? {
            LooseNumber::Number(value) => Amount::new(value),
            LooseNumber::Text(raw) => Amount::parse(&raw),
            LooseNumber::Other(_) => Amount::ZERO,
        })
    }
}

/// Lenient deserializer for optional minute counts.
pub fn deserialize_minutes<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<u32>, D::Error> {
    let minutes = match LooseNumber::deserialize(deserializer)? {
        LooseNumber::Number(value) => Some(value),
        LooseNumber::Text(raw) => raw.trim().parse::<f64>().ok(),
        LooseNumber::Other(_) => None,
    };
    Ok(minutes
        .filter(|m| m.is_finite() && *m >= 0.0)
        .map(|m| m.round().min(u32::MAX as f64) as u32))
}

/// Lenient deserializer for free-text labels such as lead source or deal
/// status. Matching is case-insensitive through `FromStr`; blank, non-string
/// or unrecognised values decode as `None` so the caller's default applies.
pub fn deserialize_label<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum LooseText {
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    Ok(match LooseText::deserialize(deserializer)? {
        LooseText::Text(raw) if raw.trim().is_empty() => None,
        LooseText::Text(raw) => match raw.parse::<T>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(value = %raw, error = %e, "Unrecognised label, using default");
                None
            }
        },
        LooseText::Other(_) => None,
    })
}

/// Lenient deserializer for optional calendar dates. Accepts `YYYY-MM-DD`,
/// a full RFC 3339 timestamp, an empty string or null.
pub fn deserialize_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_date))
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

// ─── Opportunity ────────────────────────────────────────────────────────────

/// A single discovery or closing call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CallSlot {
    #[serde(default, deserialize_with = "deserialize_date")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_minutes")]
    pub duration: Option<u32>,
    #[serde(default)]
    pub recording: Option<String>,
}

impl CallSlot {
    pub fn scheduled(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Default::default()
        }
    }

    pub fn held(date: NaiveDate, minutes: u32) -> Self {
        Self {
            date: Some(date),
            duration: Some(minutes),
            recording: None,
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.date.is_some()
    }

    /// Recorded duration, ignored when the call was never scheduled.
    pub fn held_minutes(&self) -> Option<u32> {
        self.date.and(self.duration)
    }

    /// A scheduled call with a non-zero recorded duration took place.
    pub fn showed_up(&self) -> bool {
        self.held_minutes().is_some_and(|minutes| minutes > 0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Contact {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub role: Option<String>,
}

fn default_salesperson() -> String {
    "Unknown".to_string()
}

/// A tracked sales prospect and its pipeline events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub lead_source: LeadSource,
    #[serde(default = "default_salesperson")]
    pub salesperson: String,
    pub created_at: NaiveDate,
    #[serde(default)]
    pub discovery: [CallSlot; 3],
    #[serde(default)]
    pub closing: [CallSlot; 3],
    #[serde(default)]
    pub proposal_status: ProposalStatus,
    #[serde(default)]
    pub revenue: Amount,
    #[serde(default)]
    pub cash_collected: Amount,
    #[serde(default)]
    pub deal_status: DealStatus,
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Opportunity {
    pub fn slot(&self, id: SlotId) -> &CallSlot {
        match id.kind {
            CallKind::Discovery => &self.discovery[id.index()],
            CallKind::Closing => &self.closing[id.index()],
        }
    }

    pub fn slot_mut(&mut self, id: SlotId) -> &mut CallSlot {
        match id.kind {
            CallKind::Discovery => &mut self.discovery[id.index()],
            CallKind::Closing => &mut self.closing[id.index()],
        }
    }

    /// All six slots in canonical order.
    pub fn slots(&self) -> impl Iterator<Item = (SlotId, &CallSlot)> + '_ {
        SlotId::ALL.into_iter().map(move |id| (id, self.slot(id)))
    }

    pub fn date(&self, id: SlotId) -> Option<NaiveDate> {
        self.slot(id).date
    }

    pub fn has_date(&self, id: SlotId) -> bool {
        self.slot(id).is_scheduled()
    }

    /// Number of slots with a scheduled date.
    pub fn call_count(&self) -> u64 {
        self.slots().filter(|(_, slot)| slot.is_scheduled()).count() as u64
    }

    pub fn has_any_closing(&self) -> bool {
        self.closing.iter().any(CallSlot::is_scheduled)
    }

    pub fn is_won(&self) -> bool {
        self.deal_status == DealStatus::Won
    }

    pub fn is_lost(&self) -> bool {
        self.deal_status == DealStatus::Lost
    }

    /// Contracted value if the deal is won, zero otherwise.
    pub fn won_revenue(&self) -> f64 {
        if self.is_won() {
            self.revenue.value()
        } else {
            0.0
        }
    }

    /// Latest closing call: third, else second, else first.
    pub fn final_closing_date(&self) -> Option<NaiveDate> {
        self.closing.iter().rev().find_map(|slot| slot.date)
    }

    /// Latest call of any kind, closing calls taking precedence.
    pub fn last_call_date(&self) -> Option<NaiveDate> {
        self.final_closing_date()
            .or_else(|| self.discovery.iter().rev().find_map(|slot| slot.date))
    }

    /// `(year, month)` of creation, the sole basis for period bucketing.
    pub fn creation_month(&self) -> (i32, u32) {
        (self.created_at.year(), self.created_at.month())
    }
}

// ─── Lifecycle payloads ─────────────────────────────────────────────────────

/// Insert payload. Missing fields take the documented defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewOpportunity {
    pub name: String,
    #[serde(default)]
    pub lead_source: LeadSource,
    #[serde(default = "default_salesperson")]
    pub salesperson: String,
    /// Override for imports; the store assigns today's date otherwise.
    #[serde(default)]
    pub created_at: Option<NaiveDate>,
    #[serde(default)]
    pub discovery: [CallSlot; 3],
    #[serde(default)]
    pub closing: [CallSlot; 3],
    #[serde(default)]
    pub proposal_status: ProposalStatus,
    #[serde(default)]
    pub revenue: Amount,
    #[serde(default)]
    pub cash_collected: Amount,
    #[serde(default)]
    pub deal_status: DealStatus,
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewOpportunity {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lead_source: LeadSource::default(),
            salesperson: default_salesperson(),
            created_at: None,
            discovery: Default::default(),
            closing: Default::default(),
            proposal_status: ProposalStatus::default(),
            revenue: Amount::ZERO,
            cash_collected: Amount::ZERO,
            deal_status: DealStatus::default(),
            contacts: Vec::new(),
            files: Vec::new(),
            notes: None,
        }
    }

    pub fn into_opportunity(self, id: u64, today: NaiveDate) -> Opportunity {
        Opportunity {
            id,
            name: self.name,
            lead_source: self.lead_source,
            salesperson: self.salesperson,
            created_at: self.created_at.unwrap_or(today),
            discovery: self.discovery,
            closing: self.closing,
            proposal_status: self.proposal_status,
            revenue: self.revenue,
            cash_collected: self.cash_collected,
            deal_status: self.deal_status,
            contacts: self.contacts,
            files: self.files,
            notes: self.notes,
        }
    }
}

/// Partial update. `None` leaves the field untouched; identity and creation
/// date are never patched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub lead_source: Option<LeadSource>,
    #[serde(default)]
    pub salesperson: Option<String>,
    #[serde(default)]
    pub discovery: [Option<CallSlot>; 3],
    #[serde(default)]
    pub closing: [Option<CallSlot>; 3],
    #[serde(default)]
    pub proposal_status: Option<ProposalStatus>,
    #[serde(default)]
    pub revenue: Option<Amount>,
    #[serde(default)]
    pub cash_collected: Option<Amount>,
    #[serde(default)]
    pub deal_status: Option<DealStatus>,
    #[serde(default)]
    pub contacts: Option<Vec<Contact>>,
    #[serde(default)]
    pub files: Option<Vec<String>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl OpportunityPatch {
    pub fn is_empty(&self) -> bool {
        *self == OpportunityPatch::default()
    }

    pub fn apply(self, target: &mut Opportunity) {
        if let Some(name) = self.name {
            target.name = name;
        }
        if let Some(source) = self.lead_source {
            target.lead_source = source;
        }
        if let Some(salesperson) = self.salesperson {
            target.salesperson = salesperson;
        }
        for (slot, update) in target.discovery.iter_mut().zip(self.discovery) {
            if let Some(update) = update {
                *slot = update;
            }
        }
        for (slot, update) in target.closing.iter_mut().zip(self.closing) {
            if let Some(update) = update {
                *slot = update;
            }
        }
        if let Some(status) = self.proposal_status {
            target.proposal_status = status;
        }
        if let Some(revenue) = self.revenue {
            target.revenue = revenue;
        }
        if let Some(cash) = self.cash_collected {
            target.cash_collected = cash;
        }
        if let Some(status) = self.deal_status {
            target.deal_status = status;
        }
        if let Some(contacts) = self.contacts {
            target.contacts = contacts;
        }
        if let Some(files) = self.files {
            target.files = files;
        }
        if let Some(notes) = self.notes {
            target.notes = Some(notes);
        }
    }
}
