//! Connect 4 rules engine.
//! A `Match` owns the grid, both players and the lifecycle. Callers feed it
//! column drops one at a time (or a whole move history such as `3,3,4`) and
//! get back where the piece landed and the lifecycle that followed.
mod error;
mod game;
mod grid;
mod history;
mod player;

pub use error::GameError;
pub use game::{
    winning_line, Accepted, Lifecycle, Line, Match, MatchConfig, MatchSnapshot, Placement,
    StartPolicy, CONNECT,
};
pub use grid::Grid;
pub use history::{format_history, parse_history};
pub use player::{Order, Player, PlayerConfig};

/// Starts a match on a `width` x `height` board; the first player opens.
pub fn create_match(
    width: usize,
    height: usize,
    first: &PlayerConfig,
    second: &PlayerConfig,
) -> Result<Match, GameError> {
    let config = MatchConfig {
        width,
        height,
        ..MatchConfig::default()
    };
    Match::new(config, first, second)
}
