//! Foraging Simulation Core
//!
//! Agents with noisy beliefs about food shops compete for meals in a world
//! whose prices drift and whose shops close or discount at random.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

pub mod components;
pub mod config;
pub mod error;
pub mod output;
pub mod policy;
pub mod setup;
pub mod simulation;
pub mod systems;

pub use components::*;
pub use config::Config;
pub use error::{ConfigError, SimError};
pub use policy::{DecisionInput, LegacyRules, Policy};
pub use simulation::Simulation;

/// Seeded random number generator resource
#[derive(Resource)]
pub struct SimRng(pub SmallRng);
