//! Snapshot Types
//!
//! Read-only views of agents, episodes and whole runs, handed to reporting
//! consumers after each day or episode.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::action::{ActionRecord, PolicyKind, ShopId};
use crate::timestamp::SimDay;
use crate::world_event::WorldEventLog;

/// One agent's belief about one shop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeliefView {
    pub expected_cost: f64,
    pub trust: f64,
}

/// Agent state at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub name: String,
    pub policy: PolicyKind,
    pub energy: f64,
    pub money: f64,
    /// energy + money
    pub score: f64,
    pub alive: bool,
    pub epsilon: f64,
}

/// Belief state of one agent after its belief update on a given day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeliefRecord {
    pub at: SimDay,
    pub agent_name: String,
    pub beliefs: BTreeMap<ShopId, BeliefView>,
}

/// End-of-episode results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub episode: u32,
    /// Days actually simulated (fewer than configured if every agent died)
    pub days_run: u32,
    pub beliefs_reset: bool,
    pub surviving_agents: u32,
    /// Survivors only
    pub agents: Vec<AgentSnapshot>,
    pub world_events: WorldEventLog,
}

impl EpisodeSummary {
    /// The surviving agent with the highest score. First one wins ties.
    pub fn best_agent(&self) -> Option<&AgentSnapshot> {
        self.agents.iter().fold(None, |best: Option<&AgentSnapshot>, agent| match best {
            Some(b) if b.score >= agent.score => Some(b),
            _ => Some(agent),
        })
    }

    /// Mean score per policy among survivors.
    pub fn mean_score_by_policy(&self) -> BTreeMap<PolicyKind, f64> {
        let mut totals: BTreeMap<PolicyKind, (f64, u32)> = BTreeMap::new();
        for agent in &self.agents {
            let entry = totals.entry(agent.policy).or_insert((0.0, 0));
            entry.0 += agent.score;
            entry.1 += 1;
        }
        totals
            .into_iter()
            .map(|(policy, (sum, count))| (policy, sum / count as f64))
            .collect()
    }
}

/// Everything a run produced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub seed: u64,
    pub episodes: Vec<EpisodeSummary>,
    pub actions: Vec<ActionRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub beliefs: Vec<BeliefRecord>,
    /// Days each agent took a turn, across all episodes
    pub days_survived: BTreeMap<String, u32>,
}

impl RunReport {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// (episode, surviving agents) pairs in episode order.
    pub fn survival_curve(&self) -> Vec<(u32, u32)> {
        self.episodes
            .iter()
            .map(|e| (e.episode, e.surviving_agents))
            .collect()
    }

    pub fn final_episode(&self) -> Option<&EpisodeSummary> {
        self.episodes.last()
    }

    pub fn actions_in_episode(&self, episode: u32) -> impl Iterator<Item = &ActionRecord> {
        self.actions.iter().filter(move |r| r.at.episode == episode)
    }
}
