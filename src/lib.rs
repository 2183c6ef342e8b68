//! Assigns applicants to (day, batch, index) slots from their group
//! preferences, favouring earlier submissions, and suggests a leftover slot
//! to everyone who could not be placed.

pub mod catalog;
pub mod data;
pub mod error;
pub mod greedy;
pub mod grid;
pub mod leftover;
pub mod loader;
pub mod matching;
pub mod roster;
pub mod server;
pub mod solver;
pub mod weight;

pub use data::{SchedulingInput, SchedulingOutput, Strategy};
pub use solver::{SolverConfig, solve};
