//! Funnel flow graph: how opportunities move between pipeline stages.
//!
//! The transition model is deliberately partial. Won is always attributed
//! from the third closing stage, and only the first closing stage links to
//! Lost; exits to Lost from the second or third closing call are not drawn.

use pipeline_core::types::{Opportunity, SlotId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunnelStage {
    Call(SlotId),
    Won,
    Lost,
}

impl FunnelStage {
    pub const ALL: [FunnelStage; 8] = [
        FunnelStage::Call(SlotId::FIRST_DISCOVERY),
        FunnelStage::Call(SlotId::SECOND_DISCOVERY),
        FunnelStage::Call(SlotId::THIRD_DISCOVERY),
        FunnelStage::Call(SlotId::FIRST_CLOSING),
        FunnelStage::Call(SlotId::SECOND_CLOSING),
        FunnelStage::Call(SlotId::THIRD_CLOSING),
        FunnelStage::Won,
        FunnelStage::Lost,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            FunnelStage::Call(slot) => slot.key(),
            FunnelStage::Won => "won",
            FunnelStage::Lost => "lost",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FunnelStage::Call(slot) => slot.label(),
            FunnelStage::Won => "Won",
            FunnelStage::Lost => "Lost",
        }
    }

    /// Whether an opportunity reached this stage.
    pub fn reached(&self, opportunity: &Opportunity) -> bool {
        match self {
            FunnelStage::Call(slot) => opportunity.has_date(*slot),
            FunnelStage::Won => opportunity.is_won(),
            FunnelStage::Lost => opportunity.is_lost(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunnelNode {
    pub id: String,
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunnelLink {
    pub source: String,
    pub target: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunnelGraph {
    pub nodes: Vec<FunnelNode>,
    pub links: Vec<FunnelLink>,
}

impl FunnelGraph {
    pub fn node(&self, stage: FunnelStage) -> Option<&FunnelNode> {
        self.nodes.iter().find(|n| n.id == stage.id())
    }

    pub fn link(&self, source: FunnelStage, target: FunnelStage) -> Option<&FunnelLink> {
        self.links
            .iter()
            .find(|l| l.source == source.id() && l.target == target.id())
    }
}

type TransitionRule = (FunnelStage, FunnelStage, fn(&Opportunity) -> bool);

use FunnelStage::{Call, Lost, Won};

const D1: SlotId = SlotId::FIRST_DISCOVERY;
const D2: SlotId = SlotId::SECOND_DISCOVERY;
const D3: SlotId = SlotId::THIRD_DISCOVERY;
const C1: SlotId = SlotId::FIRST_CLOSING;
const C2: SlotId = SlotId::SECOND_CLOSING;
const C3: SlotId = SlotId::THIRD_CLOSING;

/// Edge rules in emission order. Each is evaluated independently.
const TRANSITIONS: [TransitionRule; 11] = [
    (Call(D1), Call(D2), |o: &Opportunity| o.has_date(D1) && o.has_date(D2)),
    (Call(D1), Call(C1), |o: &Opportunity| {
        o.has_date(D1) && !o.has_date(D2) && o.has_date(C1)
    }),
    (Call(D1), Lost, |o: &Opportunity| {
        o.has_date(D1) && !o.has_date(D2) && !o.has_date(C1) && o.is_lost()
    }),
    (Call(D2), Call(D3), |o: &Opportunity| o.has_date(D2) && o.has_date(D3)),
    (Call(D2), Call(C1), |o: &Opportunity| {
        o.has_date(D2) && !o.has_date(D3) && o.has_date(C1)
    }),
    (Call(D2), Lost, |o: &Opportunity| {
        o.has_date(D2) && !o.has_date(D3) && !o.has_date(C1) && o.is_lost()
    }),
    (Call(D3), Call(C1), |o: &Opportunity| o.has_date(D3) && o.has_date(C1)),
    (Call(C1), Call(C2), |o: &Opportunity| o.has_date(C1) && o.has_date(C2)),
    (Call(C2), Call(C3), |o: &Opportunity| o.has_date(C2) && o.has_date(C3)),
    (Call(C3), Won, |o: &Opportunity| o.has_any_closing() && o.is_won()),
    (Call(C1), Lost, |o: &Opportunity| o.has_date(C1) && o.is_lost()),
];

pub fn compute_funnel(opportunities: &[Opportunity]) -> FunnelGraph {
    let nodes = FunnelStage::ALL
        .iter()
        .map(|stage| FunnelNode {
            id: stage.id().to_string(),
            name: stage.name().to_string(),
            value: opportunities.iter().filter(|o| stage.reached(o)).count() as u64,
        })
        .collect();

    let links: Vec<FunnelLink> = TRANSITIONS
        .iter()
        .filter_map(|(source, target, rule)| {
            let value = opportunities.iter().filter(|o| rule(o)).count() as u64;
            (value > 0).then(|| FunnelLink {
                source: source.id().to_string(),
                target: target.id().to_string(),
                value,
            })
        })
        .collect();

    tracing::debug!(
        opportunities = opportunities.len(),
        links = links.len(),
        "Funnel graph computed"
    );

    FunnelGraph { nodes, links }
}
