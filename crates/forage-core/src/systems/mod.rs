//! ECS Systems
//!
//! The daily cycle: world advance, agent turns and roster culling.

pub mod day;

pub use day::{advance_world_day, cull_dead_agents, roster, run_agent_turns, EpisodeClock};
