//! Collaborator interfaces the engine consumes, and their adapters.

pub mod scoreboard;
pub mod scorer;

pub use scoreboard::ScoreBoard;
pub use scorer::*;
