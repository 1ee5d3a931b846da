//! Per-agent behaviour systems and the tick that drives them

pub mod action_execute;
pub mod action_select;
pub mod consumption;
pub mod movement;
pub mod perception;
pub mod reproduction;
pub mod tick;

pub use action_select::{decide, default_action, select_action};
pub use tick::{run_simulation_tick, SimulationEvent};
