//! Shared data types for the foraging simulation.
//!
//! This crate contains pure data structures with no simulation logic:
//! actions and outcomes, world events, timestamps and the snapshots handed to
//! reporting consumers.

pub mod action;
pub mod analysis;
pub mod snapshot;
pub mod timestamp;
pub mod world_event;

pub use action::{
    Action, ActionOutcome, ActionParseError, ActionRecord, HistoryRecord, PolicyKind, ShopId,
    BUY_FOOD_PREFIX,
};
pub use analysis::{shop_choices_on_event_days, EventDayChoices};
pub use snapshot::{AgentSnapshot, BeliefRecord, BeliefView, EpisodeSummary, RunReport};
pub use timestamp::{ParseDayError, SimDay};
pub use world_event::{WorldEventKind, WorldEventLog};
