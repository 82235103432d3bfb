//! Agent Components
//!
//! An agent owns its true state (energy, money), its beliefs, a policy and an
//! append-only history. Both agent families, belief-driven and fully
//! observed, share the same resolution logic and differ only in policy and
//! metabolic profile.

use bevy_ecs::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use forage_events::{Action, ActionOutcome, AgentSnapshot, HistoryRecord, PolicyKind, ShopId};

use crate::components::belief::BeliefStore;
use crate::components::shop::{DailyContention, Observations, ShopTable};
use crate::error::SimError;
use crate::policy::{DecisionInput, Policy};

/// Trust gained on a successful purchase
pub const TRUST_REWARD: f64 = 0.05;
/// Trust lost on a failed purchase roll
pub const TRUST_PENALTY: f64 = 0.1;

/// Energy and money at the start of every episode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StartState {
    pub energy: f64,
    pub money: f64,
}

/// Current energy and money of an agent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrueState {
    pub energy: f64,
    pub money: f64,
}

impl TrueState {
    pub fn is_alive(&self) -> bool {
        self.energy > 0.0 && self.money > 0.0
    }

    pub fn score(&self) -> f64 {
        self.energy + self.money
    }
}

impl From<StartState> for TrueState {
    fn from(start: StartState) -> Self {
        Self {
            energy: start.energy,
            money: start.money,
        }
    }
}

/// Energy effects of the non-shopping actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionCosts {
    pub move_energy_cost: f64,
    pub rest_energy_gain: f64,
}

/// Upkeep and penalties charged to an agent family
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetabolicProfile {
    /// Charged every day before the action resolves
    pub daily_cost: f64,
    /// Charged when the chosen shop was already claimed today
    pub contention_penalty: f64,
    /// Charged when the purchase roll fails
    pub failure_penalty: f64,
}

/// Scalar value learned per shop from purchase outcomes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShopValues {
    values: BTreeMap<ShopId, f64>,
    reward: f64,
    penalty: f64,
}

impl ShopValues {
    pub fn new(initial: BTreeMap<ShopId, f64>, reward: f64, penalty: f64) -> Self {
        Self {
            values: initial,
            reward,
            penalty,
        }
    }

    /// Learned value of a shop, 0 if never seen
    pub fn get(&self, shop: &ShopId) -> f64 {
        self.values.get(shop).copied().unwrap_or(0.0)
    }

    fn record(&mut self, shop: &ShopId, success: bool) {
        let delta = if success { self.reward } else { -self.penalty };
        *self.values.entry(shop.clone()).or_insert(0.0) += delta;
    }
}

/// Stable per-day iteration position of an agent
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RosterSlot(pub u32);

/// A simulated agent
#[derive(Component, Debug, Clone)]
pub struct Agent {
    name: String,
    policy: Policy,
    profile: MetabolicProfile,
    start: StartState,
    state: TrueState,
    beliefs: BeliefStore,
    values: ShopValues,
    epsilon: f64,
    history: Vec<HistoryRecord>,
    last_observations: Option<Observations>,
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        policy: Policy,
        epsilon: f64,
        start: StartState,
        profile: MetabolicProfile,
        beliefs: BeliefStore,
    ) -> Self {
        Self {
            name: name.into(),
            policy,
            profile,
            start,
            state: start.into(),
            beliefs,
            values: ShopValues::default(),
            epsilon,
            history: Vec::new(),
            last_observations: None,
        }
    }

    pub fn with_values(mut self, values: ShopValues) -> Self {
        self.values = values;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn kind(&self) -> PolicyKind {
        self.policy.kind()
    }

    pub fn state(&self) -> &TrueState {
        &self.state
    }

    pub fn beliefs(&self) -> &BeliefStore {
        &self.beliefs
    }

    pub fn beliefs_mut(&mut self) -> &mut BeliefStore {
        &mut self.beliefs
    }

    pub fn values(&self) -> &ShopValues {
        &self.values
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn history(&self) -> &[HistoryRecord] {
        &self.history
    }

    pub fn last_observations(&self) -> Option<&Observations> {
        self.last_observations.as_ref()
    }

    /// Store today's observations. Beliefs are updated separately.
    pub fn perceive(&mut self, observations: Observations) {
        self.last_observations = Some(observations);
    }

    pub fn update_belief(&mut self, observations: &Observations) {
        self.beliefs.update(observations);
    }

    /// Ask the policy for today's action.
    pub fn think<R: Rng>(&self, shops: &ShopTable, rng: &mut R) -> Action {
        let input = DecisionInput {
            beliefs: &self.beliefs,
            epsilon: self.epsilon,
            state: &self.state,
            values: &self.values,
            shops,
        };
        let action = self.policy.decide(&input, rng);
        tracing::debug!(agent = %self.name, policy = %self.kind(), %action, "decided");
        action
    }

    /// Resolve an action against today's contention ledger and shop table.
    ///
    /// The daily upkeep is charged whatever the action. Naming a shop missing
    /// from `shops` is an [`SimError::InvalidAction`] and leaves the agent
    /// untouched.
    pub fn act<R: Rng>(
        &mut self,
        action: &Action,
        contention: &mut DailyContention,
        shops: &ShopTable,
        costs: &ActionCosts,
        rng: &mut R,
    ) -> Result<ActionOutcome, SimError> {
        let shop = match action {
            Action::BuyFood(id) => Some(
                shops
                    .get(id)
                    .map(|params| (id, params))
                    .ok_or_else(|| SimError::InvalidAction(id.clone()))?,
            ),
            Action::Move | Action::Rest => None,
        };

        self.state.energy -= self.profile.daily_cost;

        let outcome = match (action, shop) {
            (Action::BuyFood(_), Some((id, params))) => {
                if !contention.try_claim(id, &self.name) {
                    self.state.energy -= self.profile.contention_penalty;
                    tracing::trace!(agent = %self.name, shop = %id, "shop already taken today");
                    ActionOutcome::Fail
                } else if rng.gen::<f64>() < params.success_rate {
                    self.state.money -= params.cost as f64;
                    self.state.energy += params.energy_gain + params.success_bonus;
                    self.beliefs.adjust_trust(id, TRUST_REWARD);
                    self.values.record(id, true);
                    ActionOutcome::Success
                } else {
                    self.state.energy -= self.profile.failure_penalty;
                    self.beliefs.adjust_trust(id, -TRUST_PENALTY);
                    self.values.record(id, false);
                    ActionOutcome::Fail
                }
            }
            (Action::Move, _) => {
                self.state.energy -= costs.move_energy_cost;
                ActionOutcome::Move
            }
            (Action::Rest, _) => {
                self.state.energy += costs.rest_energy_gain;
                ActionOutcome::Rest
            }
            (Action::BuyFood(id), None) => return Err(SimError::InvalidAction(id.clone())),
        };

        tracing::debug!(
            agent = %self.name,
            %action,
            %outcome,
            energy = self.state.energy,
            money = self.state.money,
            "resolved"
        );
        self.history.push(HistoryRecord::new(action.clone(), outcome));
        Ok(outcome)
    }

    pub fn is_alive(&self) -> bool {
        self.state.is_alive()
    }

    /// Restore episode-start energy and money and clear the history; re-draw
    /// beliefs only when `reset_beliefs` is set.
    pub fn reset<R: Rng>(&mut self, reset_beliefs: bool, rng: &mut R) {
        self.state = self.start.into();
        self.history.clear();
        self.last_observations = None;
        self.beliefs.reset(reset_beliefs, rng);
    }

    /// Raise epsilon by `step`, never above `cap`.
    pub fn anneal_epsilon(&mut self, step: f64, cap: f64) {
        self.epsilon = (self.epsilon + step).min(cap);
    }

    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            name: self.name.clone(),
            policy: self.kind(),
            energy: self.state.energy,
            money: self.state.money,
            score: self.state.score(),
            alive: self.is_alive(),
            epsilon: self.epsilon,
        }
    }
}
