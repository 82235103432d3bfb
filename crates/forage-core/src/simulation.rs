//! Simulation Driver
//!
//! Runs episodes of days over an ECS world. Every episode starts from a fresh
//! world; surviving agents carry over, get their state reset and their
//! exploration rate annealed, and periodically have their beliefs re-drawn.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use forage_events::{AgentSnapshot, EpisodeSummary, RunReport};

use crate::components::agent::Agent;
use crate::components::world::WorldDynamics;
use crate::config::Config;
use crate::error::SimError;
use crate::output::RunRecorder;
use crate::setup::{get_spawn_summary, spawn_population, SpawnSummary};
use crate::systems::{advance_world_day, cull_dead_agents, roster, run_agent_turns, EpisodeClock};
use crate::SimRng;

pub struct Simulation {
    world: World,
    config: Config,
    start_of_day: Schedule,
    end_of_day: Schedule,
    next_episode: u32,
    days_this_episode: u32,
}

impl Simulation {
    /// Validate the configuration, seed the generator and spawn the population.
    pub fn new(config: Config) -> Result<Self, SimError> {
        config.validate()?;

        let mut world = World::new();
        let mut rng = SmallRng::seed_from_u64(config.simulation.seed);
        spawn_population(&mut world, &config, &mut rng);

        world.insert_resource(SimRng(rng));
        world.insert_resource(WorldDynamics::new(&config));
        world.insert_resource(RunRecorder::new(config.simulation.seed));
        world.insert_resource(EpisodeClock::default());

        let mut start_of_day = Schedule::default();
        start_of_day.add_systems(advance_world_day);
        let mut end_of_day = Schedule::default();
        end_of_day.add_systems(cull_dead_agents);

        Ok(Self {
            world,
            config,
            start_of_day,
            end_of_day,
            next_episode: 0,
            days_this_episode: 0,
        })
    }

    /// Drop the per-turn belief trace from the report
    pub fn without_belief_trace(mut self) -> Self {
        if let Some(recorder) = self.world.remove_resource::<RunRecorder>() {
            self.world.insert_resource(recorder.without_belief_trace());
        }
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn clock(&self) -> EpisodeClock {
        self.world.get_resource::<EpisodeClock>().copied().unwrap_or_default()
    }

    pub fn world_dynamics(&self) -> Option<&WorldDynamics> {
        self.world.get_resource::<WorldDynamics>()
    }

    pub fn report(&self) -> Option<&RunReport> {
        self.world.get_resource::<RunRecorder>().map(RunRecorder::report)
    }

    /// Snapshots of every agent still on the roster, in turn order
    pub fn agents(&mut self) -> Vec<AgentSnapshot> {
        let order = roster(&mut self.world);
        order
            .into_iter()
            .filter_map(|e| self.world.get::<Agent>(e).map(Agent::snapshot))
            .collect()
    }

    /// Read access to one agent by name
    pub fn agent(&mut self, name: &str) -> Option<&Agent> {
        let mut query = self.world.query::<&Agent>();
        query.iter(&self.world).find(|a| a.name() == name)
    }

    /// Head count of the current roster per policy
    pub fn spawn_summary(&mut self) -> SpawnSummary {
        get_spawn_summary(&mut self.world)
    }

    pub fn roster_len(&mut self) -> usize {
        roster(&mut self.world).len()
    }

    /// Start the next episode: fresh world, reset and annealed agents.
    /// Returns whether beliefs were re-drawn.
    pub fn begin_episode(&mut self) -> Result<bool, SimError> {
        let episode = self.next_episode;
        let beliefs_reset = episode % self.config.simulation.belief_reset_interval == 0;

        self.world.insert_resource(WorldDynamics::new(&self.config));
        self.world.insert_resource(EpisodeClock {
            episode,
            beliefs_reset,
        });

        let mut rng = self
            .world
            .remove_resource::<SimRng>()
            .ok_or(SimError::MissingResource("SimRng"))?;
        let exploration = &self.config.exploration;
        for entity in roster(&mut self.world) {
            if let Some(mut agent) = self.world.get_mut::<Agent>(entity) {
                agent.reset(beliefs_reset, &mut rng.0);
                agent.anneal_epsilon(exploration.anneal_step, exploration.anneal_cap);
            }
        }
        self.world.insert_resource(rng);

        self.next_episode += 1;
        self.days_this_episode = 0;
        tracing::info!(episode, beliefs_reset, agents = self.roster_len(), "Episode started");
        Ok(beliefs_reset)
    }

    /// Simulate one day. Returns how many agents took a turn.
    pub fn step_day(&mut self) -> Result<usize, SimError> {
        self.start_of_day.run(&mut self.world);
        let acted = run_agent_turns(&mut self.world)?;
        self.end_of_day.run(&mut self.world);
        self.days_this_episode += 1;
        Ok(acted)
    }

    /// Close the running episode and record its summary.
    pub fn finish_episode(&mut self) -> Result<EpisodeSummary, SimError> {
        let clock = self.clock();
        let world_events = self
            .world
            .get_resource::<WorldDynamics>()
            .ok_or(SimError::MissingResource("WorldDynamics"))?
            .events()
            .clone();
        let agents = self.agents();

        let summary = EpisodeSummary {
            episode: clock.episode,
            days_run: self.days_this_episode,
            beliefs_reset: clock.beliefs_reset,
            surviving_agents: agents.len() as u32,
            agents,
            world_events,
        };

        match summary.best_agent() {
            Some(best) => tracing::info!(
                episode = summary.episode,
                days = summary.days_run,
                survivors = summary.surviving_agents,
                events = summary.world_events.total_events(),
                best = %best.name,
                best_score = best.score,
                "Episode finished"
            ),
            None => tracing::info!(
                episode = summary.episode,
                days = summary.days_run,
                "Episode finished with no survivors"
            ),
        }

        let mut recorder = self
            .world
            .get_resource_mut::<RunRecorder>()
            .ok_or(SimError::MissingResource("RunRecorder"))?;
        recorder.record_episode(summary.clone());
        Ok(summary)
    }

    /// Run one full episode, stopping early once nobody is left.
    pub fn run_episode(&mut self) -> Result<EpisodeSummary, SimError> {
        self.begin_episode()?;
        for _ in 0..self.config.simulation.days_per_episode {
            if self.roster_len() == 0 {
                tracing::info!(day = self.days_this_episode, "All agents collapsed, ending episode");
                break;
            }
            self.step_day()?;
        }
        self.finish_episode()
    }

    /// Run every configured episode and hand back the report.
    pub fn run(mut self) -> Result<RunReport, SimError> {
        for _ in 0..self.config.simulation.episodes {
            self.run_episode()?;
        }
        self.world
            .remove_resource::<RunRecorder>()
            .map(RunRecorder::into_report)
            .ok_or(SimError::MissingResource("RunRecorder"))
    }
}
