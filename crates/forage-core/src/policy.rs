//! Decision Policies
//!
//! A closed set of strategies, all answering the same question: given what the
//! agent believes, what does it do today? Policies never mutate beliefs.

use rand::Rng;
use serde::{Deserialize, Serialize};

use forage_events::{Action, PolicyKind, ShopId};

use crate::components::agent::{ShopValues, TrueState};
use crate::components::belief::BeliefStore;
use crate::components::shop::ShopTable;

/// Thresholds of the fully-observed legacy strategy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegacyRules {
    /// Below this energy the agent goes shopping if it can afford to
    pub hungry_energy: f64,
    /// Below this energy, and unable to shop, the agent rests
    pub critical_energy: f64,
}

/// Decision strategy of an agent
#[derive(Debug, Clone, PartialEq)]
pub enum Policy {
    /// Epsilon-greedy on trust / expected cost
    Greedy,
    /// Same rule as greedy, spawned with a much higher epsilon
    Explorer,
    /// Highest trust, regardless of cost or epsilon
    Cautious,
    /// Always the same shop
    CheapOnly { shop: ShopId },
    /// Fully observed: learned shop values, true prices and own energy
    Legacy(LegacyRules),
}

/// Everything a policy may look at when deciding
#[derive(Debug, Clone, Copy)]
pub struct DecisionInput<'a> {
    pub beliefs: &'a BeliefStore,
    pub epsilon: f64,
    pub state: &'a TrueState,
    /// Learned per-shop values (legacy agents)
    pub values: &'a ShopValues,
    /// True shop table (legacy agents are fully observed)
    pub shops: &'a ShopTable,
}

impl Policy {
    pub fn kind(&self) -> PolicyKind {
        match self {
            Policy::Greedy => PolicyKind::Greedy,
            Policy::Explorer => PolicyKind::Explorer,
            Policy::Cautious => PolicyKind::Cautious,
            Policy::CheapOnly { .. } => PolicyKind::CheapOnly,
            Policy::Legacy(_) => PolicyKind::Legacy,
        }
    }

    /// Pick exactly one action for today.
    ///
    /// Belief-based policies only ever name shops present in `input.beliefs`;
    /// with an empty belief store they rest.
    pub fn decide<R: Rng>(&self, input: &DecisionInput<'_>, rng: &mut R) -> Action {
        match self {
            Policy::Greedy | Policy::Explorer => epsilon_greedy(input.beliefs, input.epsilon, rng),
            Policy::Cautious => first_max_by(input.beliefs.iter(), |entry| entry.trust)
                .map(|shop| Action::BuyFood(shop.clone()))
                .unwrap_or(Action::Rest),
            Policy::CheapOnly { shop } => Action::BuyFood(shop.clone()),
            Policy::Legacy(rules) => legacy_decision(rules, input, rng),
        }
    }
}

fn epsilon_greedy<R: Rng>(beliefs: &BeliefStore, epsilon: f64, rng: &mut R) -> Action {
    if beliefs.is_empty() {
        return Action::Rest;
    }

    let shop = if rng.gen::<f64>() < epsilon {
        let ids: Vec<&ShopId> = beliefs.shop_ids().collect();
        let pick = ids[rng.gen_range(0..ids.len())];
        tracing::trace!(shop = %pick, "explore");
        pick
    } else {
        match first_max_by(beliefs.iter(), |entry| entry.value_ratio()) {
            Some(best) => {
                tracing::trace!(shop = %best, "exploit");
                best
            }
            None => return Action::Rest,
        }
    };
    Action::BuyFood(shop.clone())
}

fn legacy_decision<R: Rng>(rules: &LegacyRules, input: &DecisionInput<'_>, rng: &mut R) -> Action {
    let state = input.state;
    let can_afford_cheapest = input
        .shops
        .cheapest_cost()
        .map_or(false, |cost| state.money >= cost as f64);

    if state.energy < rules.hungry_energy && can_afford_cheapest {
        let ids: Vec<&ShopId> = input.shops.ids().collect();
        if rng.gen::<f64>() < input.epsilon {
            let pick = ids[rng.gen_range(0..ids.len())];
            tracing::trace!(shop = %pick, "legacy explore");
            return Action::BuyFood(pick.clone());
        }
        let affordable = input
            .shops
            .iter()
            .filter(|(_, params)| state.money >= params.cost as f64)
            .map(|(id, _)| (id, input.values.get(id)));
        if let Some(best) = first_max_by(affordable, |value| *value) {
            tracing::trace!(shop = %best, "legacy exploit");
            return Action::BuyFood(best.clone());
        }
        Action::Rest
    } else if state.energy < rules.critical_energy {
        Action::Rest
    } else if rng.gen::<bool>() {
        Action::Move
    } else {
        Action::Rest
    }
}

/// Key of the first item with the strictly greatest score.
fn first_max_by<'a, T, I, F>(items: I, score: F) -> Option<&'a ShopId>
where
    I: IntoIterator<Item = (&'a ShopId, T)>,
    F: Fn(&T) -> f64,
{
    let mut best: Option<(&'a ShopId, f64)> = None;
    for (id, item) in items {
        let value = score(&item);
        match best {
            Some((_, top)) if value <= top => {}
            _ => best = Some((id, value)),
        }
    }
    best.map(|(id, _)| id)
}
