pub mod agent;
pub mod needs;
pub mod personality;
pub mod relationships;
pub mod roster;
pub mod species;
pub mod thoughts;

pub use agent::Agent;
pub use roster::{Roster, RosterEntry};
pub use species::Species;
