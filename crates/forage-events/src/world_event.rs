//! World Event Types
//!
//! Exogenous daily perturbations to shop parameters. Agents never read these;
//! they only notice the changed prices and success rates through ordinary
//! observations and outcomes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::action::ShopId;

/// A random event that changed a shop for one day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorldEventKind {
    /// The shop's success rate dropped to zero
    ShopClosed { shop: ShopId },
    /// The shop's cost was lowered
    ShopDiscounted { shop: ShopId, amount: i64 },
}

impl WorldEventKind {
    pub fn shop(&self) -> &ShopId {
        match self {
            WorldEventKind::ShopClosed { shop } => shop,
            WorldEventKind::ShopDiscounted { shop, .. } => shop,
        }
    }

    /// Short human-readable name, e.g. "CheapShop Closed".
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for WorldEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldEventKind::ShopClosed { shop } => write!(f, "{} Closed", shop),
            WorldEventKind::ShopDiscounted { shop, .. } => write!(f, "{} Discounted", shop),
        }
    }
}

/// Day-keyed log of triggered world events.
///
/// Only days on which at least one event fired are stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldEventLog {
    days: BTreeMap<u32, Vec<WorldEventKind>>,
}

impl WorldEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the events of a day. Empty event lists are ignored.
    pub fn record(&mut self, day: u32, events: Vec<WorldEventKind>) {
        if events.is_empty() {
            return;
        }
        self.days.entry(day).or_default().extend(events);
    }

    pub fn get(&self, day: u32) -> Option<&[WorldEventKind]> {
        self.days.get(&day).map(|v| v.as_slice())
    }

    /// Event names for a day, e.g. `["CheapShop Closed"]`.
    pub fn event_names(&self, day: u32) -> Vec<String> {
        self.get(day)
            .map(|events| events.iter().map(WorldEventKind::name).collect())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &[WorldEventKind])> {
        self.days.iter().map(|(day, events)| (*day, events.as_slice()))
    }

    /// Number of days with at least one event.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn total_events(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }
}
