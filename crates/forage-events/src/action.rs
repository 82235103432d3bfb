//! Action Types
//!
//! The three things an agent can do on a simulated day, the outcomes the world
//! hands back, and the records kept for later analysis.
//!
//! # Example
//!
//! ```
//! use forage_events::{Action, ShopId};
//!
//! let action: Action = "buy_food:CheapShop".parse().unwrap();
//! assert_eq!(action, Action::BuyFood(ShopId::new("CheapShop")));
//! assert_eq!(action.to_string(), "buy_food:CheapShop");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::timestamp::SimDay;

/// Prefix of the buy-food action label.
pub const BUY_FOOD_PREFIX: &str = "buy_food:";

/// Identifier of a food shop.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShopId(pub String);

impl ShopId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShopId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A single day's choice for one agent.
///
/// Serializes to its label: `buy_food:<shopId>`, `move` or `rest`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    /// Try to buy food at a shop
    BuyFood(ShopId),
    /// Spend energy moving around
    Move,
    /// Recover energy
    Rest,
}

impl Action {
    pub fn buy_food(shop: impl Into<String>) -> Self {
        Action::BuyFood(ShopId::new(shop))
    }

    /// The shop targeted by this action, if any.
    pub fn shop(&self) -> Option<&ShopId> {
        match self {
            Action::BuyFood(shop) => Some(shop),
            Action::Move | Action::Rest => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::BuyFood(shop) => write!(f, "{}{}", BUY_FOOD_PREFIX, shop),
            Action::Move => write!(f, "move"),
            Action::Rest => write!(f, "rest"),
        }
    }
}

/// Error type for parsing an [`Action`] label.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActionParseError {
    #[error("buy_food action is missing a shop id: '{0}'")]
    MissingShop(String),
    #[error("unknown action label: '{0}'")]
    UnknownAction(String),
}

impl FromStr for Action {
    type Err = ActionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(shop) = s.strip_prefix(BUY_FOOD_PREFIX) {
            if shop.is_empty() {
                return Err(ActionParseError::MissingShop(s.to_string()));
            }
            return Ok(Action::BuyFood(ShopId::new(shop)));
        }
        match s {
            "move" => Ok(Action::Move),
            "rest" => Ok(Action::Rest),
            _ => Err(ActionParseError::UnknownAction(s.to_string())),
        }
    }
}

impl Serialize for Action {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// What the world answered to an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    /// Food was bought
    Success,
    /// The purchase failed, or the shop was already taken today
    Fail,
    /// The agent moved
    Move,
    /// The agent rested
    Rest,
}

impl fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionOutcome::Success => write!(f, "success"),
            ActionOutcome::Fail => write!(f, "fail"),
            ActionOutcome::Move => write!(f, "move"),
            ActionOutcome::Rest => write!(f, "rest"),
        }
    }
}

/// One entry of an agent's append-only history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub action: Action,
    pub outcome: ActionOutcome,
}

impl HistoryRecord {
    pub fn new(action: Action, outcome: ActionOutcome) -> Self {
        Self { action, outcome }
    }
}

/// Decision strategy identifier, as reported to downstream consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    Greedy,
    Explorer,
    Cautious,
    CheapOnly,
    Legacy,
}

impl PolicyKind {
    /// Prefix used when naming spawned agents.
    pub fn name_prefix(&self) -> &'static str {
        match self {
            PolicyKind::Greedy => "Greedy",
            PolicyKind::Explorer => "Explorer",
            PolicyKind::Cautious => "Cautious",
            PolicyKind::CheapOnly => "CheapOnly",
            PolicyKind::Legacy => "Legacy",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::Greedy => write!(f, "greedy"),
            PolicyKind::Explorer => write!(f, "explorer"),
            PolicyKind::Cautious => write!(f, "cautious"),
            PolicyKind::CheapOnly => write!(f, "cheap_only"),
            PolicyKind::Legacy => write!(f, "legacy"),
        }
    }
}

/// A resolved action, with the context needed for post-hoc analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub at: SimDay,
    pub agent_name: String,
    pub policy: PolicyKind,
    pub action: Action,
    pub outcome: ActionOutcome,
}
