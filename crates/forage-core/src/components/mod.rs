//! ECS Components
//!
//! Agents, their beliefs, the shop table and the world that owns it.

pub mod agent;
pub mod belief;
pub mod shop;
pub mod world;

pub use agent::*;
pub use belief::*;
pub use shop::*;
pub use world::*;
