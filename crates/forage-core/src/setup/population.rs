//! Population Setup
//!
//! Spawns the configured mix of agents. Agents are spawned policy by policy
//! (explorers, greedy, cautious, cheap-only, legacy) and take their turns in
//! that order every day.

use bevy_ecs::prelude::*;
use rand::Rng;
use std::collections::BTreeMap;

use forage_events::{PolicyKind, ShopId};

use crate::components::agent::{Agent, MetabolicProfile, RosterSlot, ShopValues, StartState};
use crate::components::belief::{BeliefPrior, BeliefStore};
use crate::config::Config;
use crate::policy::{LegacyRules, Policy};

/// Build one agent of the given kind, drawing its beliefs from the shop priors.
pub fn build_agent<R: Rng>(kind: PolicyKind, name: impl Into<String>, config: &Config, rng: &mut R) -> Agent {
    let priors: BTreeMap<ShopId, BeliefPrior> = config
        .shops
        .iter()
        .map(|shop| (shop.id.clone(), shop.prior))
        .collect();
    let beliefs = BeliefStore::initialize(priors, rng);

    let exploration = &config.exploration;
    let agents = &config.agents;
    let (policy, epsilon, start, profile): (Policy, f64, StartState, MetabolicProfile) = match kind {
        PolicyKind::Greedy => (Policy::Greedy, exploration.greedy_epsilon, agents.belief_start, config.profiles.belief),
        PolicyKind::Explorer => (
            Policy::Explorer,
            exploration.explorer_epsilon,
            agents.belief_start,
            config.profiles.belief,
        ),
        PolicyKind::Cautious => (
            Policy::Cautious,
            exploration.greedy_epsilon,
            agents.belief_start,
            config.profiles.belief,
        ),
        PolicyKind::CheapOnly => (
            Policy::CheapOnly {
                shop: agents.cheap_shop.clone(),
            },
            exploration.greedy_epsilon,
            agents.belief_start,
            config.profiles.belief,
        ),
        PolicyKind::Legacy => (
            Policy::Legacy(LegacyRules {
                hungry_energy: agents.legacy.hungry_energy,
                critical_energy: agents.legacy.critical_energy,
            }),
            exploration.legacy_epsilon,
            agents.legacy_start,
            config.profiles.legacy,
        ),
    };

    let values = ShopValues::new(
        agents.legacy.initial_values.clone(),
        agents.legacy.value_reward,
        agents.legacy.value_penalty,
    );

    Agent::new(name, policy, epsilon, start, profile, beliefs).with_values(values)
}

/// Spawn the whole population. Returns the entities in turn order.
pub fn spawn_population<R: Rng>(world: &mut World, config: &Config, rng: &mut R) -> Vec<Entity> {
    let population = &config.population;
    let groups = [
        (PolicyKind::Explorer, population.explorer),
        (PolicyKind::Greedy, population.greedy),
        (PolicyKind::Cautious, population.cautious),
        (PolicyKind::CheapOnly, population.cheap_only),
        (PolicyKind::Legacy, population.legacy),
    ];

    let mut entities = Vec::with_capacity(population.total() as usize);
    let mut slot = 0u32;
    for (kind, count) in groups {
        for _ in 0..count {
            slot += 1;
            let name = format!("{}{}", kind.name_prefix(), slot);
            let agent = build_agent(kind, name, config, rng);
            entities.push(world.spawn((agent, RosterSlot(slot))).id());
        }
    }

    tracing::info!(agents = entities.len(), "Spawned population");
    entities
}

/// Summary of spawned agents
#[derive(Debug, Default)]
pub struct SpawnSummary {
    pub total_agents: u32,
    pub by_policy: BTreeMap<PolicyKind, u32>,
}

pub fn get_spawn_summary(world: &mut World) -> SpawnSummary {
    let mut summary = SpawnSummary::default();
    let mut query = world.query::<&Agent>();
    for agent in query.iter(world) {
        summary.total_agents += 1;
        *summary.by_policy.entry(agent.kind()).or_insert(0) += 1;
    }
    summary
}

impl std::fmt::Display for SpawnSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Total agents: {}", self.total_agents)?;
        for (policy, count) in &self.by_policy {
            writeln!(f, "  {}: {}", policy, count)?;
        }
        Ok(())
    }
}
