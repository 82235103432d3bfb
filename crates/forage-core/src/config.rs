//! Configuration System
//!
//! Loads tuning parameters from `forage.toml` so worlds and populations can be
//! adjusted without recompiling. Every section falls back to the reference
//! world when omitted, and every load is validated.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use forage_events::ShopId;

use crate::components::agent::{ActionCosts, MetabolicProfile, StartState};
use crate::components::belief::BeliefPrior;
use crate::error::ConfigError;

/// Default tuning file path
pub const DEFAULT_CONFIG_PATH: &str = "forage.toml";

/// Upper bound for price drift and observation noise
pub const MAX_PRICE_SPREAD: i64 = 1_000_000;

/// Top-level configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub simulation: SimulationConfig,
    pub world: WorldConfig,
    pub shops: Vec<ShopConfig>,
    pub actions: ActionCosts,
    pub exploration: ExplorationConfig,
    pub agents: AgentConfig,
    pub profiles: ProfilesConfig,
    pub population: PopulationConfig,
}

/// Run length and episode cadence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub seed: u64,
    pub episodes: u32,
    pub days_per_episode: u32,
    /// Beliefs are re-drawn on every episode divisible by this
    pub belief_reset_interval: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            episodes: 10,
            days_per_episode: 5,
            belief_reset_interval: 5,
        }
    }
}

/// World dynamics: drift, observation noise and daily events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Daily cost drift is drawn from [-price_variation, price_variation]
    pub price_variation: i64,
    /// Observation noise is drawn from [-observation_noise, observation_noise]
    pub observation_noise: i64,
    /// Trigger probability of each daily event
    pub event_probability: f64,
    pub closure: ClosureEvent,
    pub discount: DiscountEvent,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            price_variation: 2,
            observation_noise: 3,
            event_probability: 0.1,
            closure: ClosureEvent::default(),
            discount: DiscountEvent::default(),
        }
    }
}

/// Event that shuts a shop for the day (success rate 0)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosureEvent {
    pub shop: ShopId,
    /// Success rate restored on days without a closure
    pub baseline_success_rate: f64,
}

impl Default for ClosureEvent {
    fn default() -> Self {
        Self {
            shop: ShopId::new("CheapShop"),
            baseline_success_rate: 0.7,
        }
    }
}

/// Event that lowers a shop's cost for the day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountEvent {
    pub shop: ShopId,
    /// Cost restored on days without a discount
    pub baseline_cost: i64,
    pub amount: i64,
}

impl Default for DiscountEvent {
    fn default() -> Self {
        Self {
            shop: ShopId::new("PremiumShop"),
            baseline_cost: 15,
            amount: 5,
        }
    }
}

/// Starting parameters of one shop and the prior agents hold about it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopConfig {
    pub id: ShopId,
    pub cost: i64,
    pub energy_gain: f64,
    pub success_rate: f64,
    /// Extra energy granted on a successful purchase only
    #[serde(default)]
    pub success_bonus: f64,
    pub prior: BeliefPrior,
}

/// The reference two-shop world
pub fn default_shops() -> Vec<ShopConfig> {
    vec![
        ShopConfig {
            id: ShopId::new("CheapShop"),
            cost: 8,
            energy_gain: 25.0,
            success_rate: 0.7,
            success_bonus: 0.0,
            prior: BeliefPrior {
                expected_cost: 10.0,
                cost_jitter: 2.0,
                trust: 0.8,
                trust_jitter: 0.3,
            },
        },
        ShopConfig {
            id: ShopId::new("PremiumShop"),
            cost: 15,
            energy_gain: 40.0,
            success_rate: 0.9,
            success_bonus: 5.0,
            prior: BeliefPrior {
                expected_cost: 20.0,
                cost_jitter: 1.0,
                trust: 0.9,
                trust_jitter: 0.1,
            },
        },
    ]
}

/// Exploration rates and annealing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorationConfig {
    pub greedy_epsilon: f64,
    pub explorer_epsilon: f64,
    pub legacy_epsilon: f64,
    /// Added to every agent's epsilon at the start of each episode
    pub anneal_step: f64,
    pub anneal_cap: f64,
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self {
            greedy_epsilon: 0.1,
            explorer_epsilon: 0.5,
            legacy_epsilon: 0.1,
            anneal_step: 0.05,
            anneal_cap: 0.6,
        }
    }
}

/// Agent start states and per-family settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Shop always chosen by cheap-only agents
    pub cheap_shop: ShopId,
    pub belief_start: StartState,
    pub legacy_start: StartState,
    pub legacy: LegacyConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            cheap_shop: ShopId::new("CheapShop"),
            belief_start: StartState {
                energy: 120.0,
                money: 100.0,
            },
            legacy_start: StartState {
                energy: 50.0,
                money: 100.0,
            },
            legacy: LegacyConfig::default(),
        }
    }
}

/// Fully-observed agents learning a scalar value per shop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyConfig {
    /// Below this energy the agent tries to buy food
    pub hungry_energy: f64,
    /// Below this energy, and unable to afford food, the agent rests
    pub critical_energy: f64,
    pub value_reward: f64,
    pub value_penalty: f64,
    pub initial_values: BTreeMap<ShopId, f64>,
}

impl Default for LegacyConfig {
    fn default() -> Self {
        let mut initial_values = BTreeMap::new();
        initial_values.insert(ShopId::new("CheapShop"), 5.0);
        initial_values.insert(ShopId::new("PremiumShop"), 10.0);
        Self {
            hungry_energy: 50.0,
            critical_energy: 30.0,
            value_reward: 5.0,
            value_penalty: 10.0,
            initial_values,
        }
    }
}

/// Upkeep and penalties per agent family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilesConfig {
    pub belief: MetabolicProfile,
    pub legacy: MetabolicProfile,
}

impl Default for ProfilesConfig {
    fn default() -> Self {
        Self {
            belief: MetabolicProfile {
                daily_cost: 3.0,
                contention_penalty: 2.0,
                failure_penalty: 5.0,
            },
            legacy: MetabolicProfile {
                daily_cost: 5.0,
                contention_penalty: 10.0,
                failure_penalty: 5.0,
            },
        }
    }
}

/// Number of agents spawned per policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub explorer: u32,
    pub greedy: u32,
    pub cautious: u32,
    pub cheap_only: u32,
    pub legacy: u32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            explorer: 1,
            greedy: 2,
            cautious: 1,
            cheap_only: 1,
            legacy: 0,
        }
    }
}

impl PopulationConfig {
    pub fn total(&self) -> u32 {
        self.explorer + self.greedy + self.cautious + self.cheap_only + self.legacy
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            world: WorldConfig::default(),
            shops: default_shops(),
            actions: ActionCosts {
                move_energy_cost: 15.0,
                rest_energy_gain: 10.0,
            },
            exploration: ExplorationConfig::default(),
            agents: AgentConfig::default(),
            profiles: ProfilesConfig::default(),
            population: PopulationConfig::default(),
        }
    }
}

impl Config {
    /// Load and validate configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_str(&content)
    }

    /// Parse and validate configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default path, or use defaults if not found
    pub fn load_or_default() -> Self {
        Self::load(DEFAULT_CONFIG_PATH).unwrap_or_else(|e| {
            tracing::warn!("Could not load {}: {}. Using defaults.", DEFAULT_CONFIG_PATH, e);
            Self::default()
        })
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn shop(&self, id: &ShopId) -> Option<&ShopConfig> {
        self.shops.iter().find(|s| &s.id == id)
    }

    /// Reject settings the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        if sim.episodes == 0 {
            return Err(ConfigError::invalid("simulation.episodes", "must be at least 1"));
        }
        if sim.days_per_episode == 0 {
            return Err(ConfigError::invalid("simulation.days_per_episode", "must be at least 1"));
        }
        if sim.belief_reset_interval == 0 {
            return Err(ConfigError::invalid("simulation.belief_reset_interval", "must be at least 1"));
        }

        if self.shops.is_empty() {
            return Err(ConfigError::invalid("shops", "at least one shop is required"));
        }
        let mut seen = BTreeSet::new();
        for shop in &self.shops {
            let field = |name: &str| format!("shops.{}.{}", shop.id, name);
            if !seen.insert(&shop.id) {
                return Err(ConfigError::invalid("shops", format!("duplicate shop id '{}'", shop.id)));
            }
            if shop.cost < 1 {
                return Err(ConfigError::invalid(field("cost"), "must be at least 1"));
            }
            check_non_negative(&field("energy_gain"), shop.energy_gain)?;
            check_non_negative(&field("success_bonus"), shop.success_bonus)?;
            check_probability(&field("success_rate"), shop.success_rate)?;
            check_non_negative(&field("prior.cost_jitter"), shop.prior.cost_jitter)?;
            check_non_negative(&field("prior.trust_jitter"), shop.prior.trust_jitter)?;
            check_finite(&field("prior.expected_cost"), shop.prior.expected_cost)?;
            check_finite(&field("prior.trust"), shop.prior.trust)?;
        }

        let world = &self.world;
        check_spread("world.price_variation", world.price_variation)?;
        check_spread("world.observation_noise", world.observation_noise)?;
        check_probability("world.event_probability", world.event_probability)?;
        self.require_shop("world.closure.shop", &world.closure.shop)?;
        check_probability("world.closure.baseline_success_rate", world.closure.baseline_success_rate)?;
        self.require_shop("world.discount.shop", &world.discount.shop)?;
        if world.discount.baseline_cost < 1 {
            return Err(ConfigError::invalid("world.discount.baseline_cost", "must be at least 1"));
        }
        if world.discount.amount < 0 {
            return Err(ConfigError::invalid("world.discount.amount", "must not be negative"));
        }

        check_non_negative("actions.move_energy_cost", self.actions.move_energy_cost)?;
        check_non_negative("actions.rest_energy_gain", self.actions.rest_energy_gain)?;

        let exploration = &self.exploration;
        check_probability("exploration.greedy_epsilon", exploration.greedy_epsilon)?;
        check_probability("exploration.explorer_epsilon", exploration.explorer_epsilon)?;
        check_probability("exploration.legacy_epsilon", exploration.legacy_epsilon)?;
        check_probability("exploration.anneal_cap", exploration.anneal_cap)?;
        check_non_negative("exploration.anneal_step", exploration.anneal_step)?;

        self.require_shop("agents.cheap_shop", &self.agents.cheap_shop)?;
        for shop in self.agents.legacy.initial_values.keys() {
            self.require_shop("agents.legacy.initial_values", shop)?;
        }

        for (name, profile) in [("belief", &self.profiles.belief), ("legacy", &self.profiles.legacy)] {
            check_non_negative(&format!("profiles.{}.daily_cost", name), profile.daily_cost)?;
            check_non_negative(&format!("profiles.{}.contention_penalty", name), profile.contention_penalty)?;
            check_non_negative(&format!("profiles.{}.failure_penalty", name), profile.failure_penalty)?;
        }

        if self.population.total() == 0 {
            return Err(ConfigError::EmptyPopulation);
        }

        Ok(())
    }

    fn require_shop(&self, field: &str, shop: &ShopId) -> Result<(), ConfigError> {
        if self.shop(shop).is_none() {
            return Err(ConfigError::UnknownShop {
                field: field.to_string(),
                shop: shop.clone(),
            });
        }
        Ok(())
    }
}

fn check_spread(field: &str, value: i64) -> Result<(), ConfigError> {
    if !(0..=MAX_PRICE_SPREAD).contains(&value) {
        return Err(ConfigError::invalid(
            field,
            format!("must be between 0 and {}, got {}", MAX_PRICE_SPREAD, value),
        ));
    }
    Ok(())
}

fn check_probability(field: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::invalid(field, format!("{} is outside [0, 1]", value)));
    }
    Ok(())
}

fn check_non_negative(field: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::invalid(field, format!("{} must be a non-negative number", value)));
    }
    Ok(())
}

fn check_finite(field: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::invalid(field, "must be a finite number"));
    }
    Ok(())
}
