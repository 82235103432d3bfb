//! Daily Cycle Systems
//!
//! One simulated day is: advance the world, give every living agent its turn
//! in roster order, then drop the dead from the roster.

use bevy_ecs::prelude::*;

use forage_events::{ActionRecord, BeliefRecord, SimDay};

use crate::components::agent::{Agent, RosterSlot};
use crate::components::world::WorldDynamics;
use crate::error::SimError;
use crate::output::RunRecorder;
use crate::SimRng;

/// Resource: which episode is running and whether it started from fresh beliefs
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EpisodeClock {
    pub episode: u32,
    pub beliefs_reset: bool,
}

/// System: start a new day in the world (events, then price drift)
pub fn advance_world_day(mut dynamics: ResMut<WorldDynamics>, mut rng: ResMut<SimRng>) {
    dynamics.advance_day(&mut rng.0);
}

/// System: remove agents that ran out of energy or money
pub fn cull_dead_agents(mut commands: Commands, agents: Query<(Entity, &Agent)>) {
    for (entity, agent) in agents.iter() {
        if !agent.is_alive() {
            tracing::info!(
                agent = %agent.name(),
                energy = agent.state().energy,
                money = agent.state().money,
                "Agent collapsed"
            );
            commands.entity(entity).despawn();
        }
    }
}

/// Agent entities in turn order
pub fn roster(world: &mut World) -> Vec<Entity> {
    let mut query = world.query_filtered::<(Entity, &RosterSlot), With<Agent>>();
    let mut slots: Vec<(RosterSlot, Entity)> = query.iter(world).map(|(e, slot)| (*slot, e)).collect();
    slots.sort();
    slots.into_iter().map(|(_, e)| e).collect()
}

/// Give every living agent its turn for today: observe, perceive, update
/// beliefs, decide, resolve. Returns how many agents acted.
pub fn run_agent_turns(world: &mut World) -> Result<usize, SimError> {
    let order = roster(world);

    // Take the shared resources out so agents can be borrowed mutably
    let mut dynamics = world
        .remove_resource::<WorldDynamics>()
        .ok_or(SimError::MissingResource("WorldDynamics"))?;
    let Some(mut rng) = world.remove_resource::<SimRng>() else {
        world.insert_resource(dynamics);
        return Err(SimError::MissingResource("SimRng"));
    };
    let Some(mut recorder) = world.remove_resource::<RunRecorder>() else {
        world.insert_resource(dynamics);
        world.insert_resource(rng);
        return Err(SimError::MissingResource("RunRecorder"));
    };
    let clock = world.get_resource::<EpisodeClock>().copied().unwrap_or_default();

    let result = take_turns(world, &order, &mut dynamics, &mut rng, &mut recorder, clock);

    world.insert_resource(dynamics);
    world.insert_resource(rng);
    world.insert_resource(recorder);
    result
}

fn take_turns(
    world: &mut World,
    order: &[Entity],
    dynamics: &mut WorldDynamics,
    rng: &mut SimRng,
    recorder: &mut RunRecorder,
    clock: EpisodeClock,
) -> Result<usize, SimError> {
    let at = SimDay::new(clock.episode, dynamics.day());
    let mut acted = 0;

    for &entity in order {
        let Some(mut agent) = world.get_mut::<Agent>(entity) else {
            continue;
        };
        if !dynamics.is_alive(&agent) {
            continue;
        }

        let observations = dynamics.observe(&mut rng.0);
        agent.perceive(observations.clone());
        agent.update_belief(&observations);
        recorder.record_beliefs(BeliefRecord {
            at,
            agent_name: agent.name().to_string(),
            beliefs: agent.beliefs().views(),
        });

        let action = agent.think(dynamics.shops(), &mut rng.0);
        let outcome = dynamics.resolve(&mut agent, &action, &mut rng.0)?;

        recorder.record_action(ActionRecord {
            at,
            agent_name: agent.name().to_string(),
            policy: agent.kind(),
            action,
            outcome,
        });
        acted += 1;
    }

    Ok(acted)
}
