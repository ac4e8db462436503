//! Match lifecycle: turn order, win and draw detection, restarts.
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::GameError;
use crate::grid::Grid;
use crate::history::format_history;
use crate::player::{Order, Player, PlayerConfig};

/// Pieces in a row needed to win.
pub const CONNECT: usize = 4;

/// Scan directions as (row, column) steps: right, down, down-right, down-left.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Cells of a winning line as (row, column), in scan order.
pub type Line = [(usize, usize); CONNECT];

/// Who opens the next game after a reset.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartPolicy {
    #[default]
    AlwaysFirst,
    /// The player who did not open the previous game opens the next one.
    Alternate,
}

/// Board size and opening rule for a match.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub width: usize,
    pub height: usize,
    pub start: StartPolicy,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            width: 7,
            height: 6,
            start: StartPolicy::AlwaysFirst,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Lifecycle {
    InProgress,
    Won { winner: Order },
    Drawn,
}

impl Lifecycle {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Lifecycle::InProgress)
    }

    pub fn winner(self) -> Option<Order> {
        match self {
            Lifecycle::Won { winner } => Some(winner),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub row: usize,
    pub column: usize,
    pub player: Order,
}

/// Result of an accepted drop. `active` is the player to move next, or the
/// mover when the drop ended the game.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Accepted {
    pub row: usize,
    pub column: usize,
    pub player: Order,
    pub lifecycle: Lifecycle,
    pub active: Order,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<Vec<Option<Order>>>,
    pub players: [Player; 2],
    pub active: Order,
    pub lifecycle: Lifecycle,
    pub winning_line: Option<Line>,
    pub history: String,
}

/// One game session: the grid, both players, whose turn it is and how it ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Match {
    config: MatchConfig,
    grid: Grid,
    players: [Player; 2],
    active: Order,
    starter: Order,
    lifecycle: Lifecycle,
    winning_line: Option<Line>,
    moves: Vec<Placement>,
}

impl Match {
    pub fn new(
        config: MatchConfig,
        first: &PlayerConfig,
        second: &PlayerConfig,
    ) -> Result<Self, GameError> {
        let grid = Grid::new(config.width, config.height)?;
        Ok(Self {
            config,
            grid,
            players: [
                Player::new(Order::First, first),
                Player::new(Order::Second, second),
            ],
            active: Order::First,
            starter: Order::First,
            lifecycle: Lifecycle::InProgress,
            winning_line: None,
            moves: Vec::new(),
        })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn players(&self) -> &[Player; 2] {
        &self.players
    }

    pub fn player(&self, order: Order) -> &Player {
        &self.players[order.idx()]
    }

    pub fn active_player(&self) -> &Player {
        self.player(self.active)
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn winning_line(&self) -> Option<Line> {
        self.winning_line
    }

    pub fn moves(&self) -> &[Placement] {
        &self.moves
    }

    pub fn history(&self) -> String {
        format_history(self.moves.iter().map(|m| m.column))
    }

    /// Drops the active player's piece into `column`. On error nothing changes.
    pub fn drop_piece(&mut self, column: usize) -> Result<Accepted, GameError> {
        if self.lifecycle.is_terminal() {
            return Err(GameError::GameAlreadyOver);
        }
        let row = self
            .grid
            .lowest_open_row(column)?
            .ok_or(GameError::ColumnFull { column })?;
        let mover = self.active;
        self.grid.place(row, column, mover)?;
        self.moves.push(Placement {
            row,
            column,
            player: mover,
        });
        debug!(?mover, row, column, "piece dropped");

        if let Some(line) = winning_line(&self.grid, mover) {
            self.lifecycle = Lifecycle::Won { winner: mover };
            self.winning_line = Some(line);
            info!(winner = %self.player(mover).name, moves = self.moves.len(), "match won");
        } else if self.grid.is_full() {
            self.lifecycle = Lifecycle::Drawn;
            info!(moves = self.moves.len(), "match drawn");
        } else {
            self.active = mover.other();
        }

        Ok(Accepted {
            row,
            column,
            player: mover,
            lifecycle: self.lifecycle,
            active: self.active,
        })
    }

    /// Applies every drop in `columns`, or none of them if any is rejected.
    /// Returns the last accepted drop.
    pub fn replay(&mut self, columns: &[usize]) -> Result<Option<Accepted>, GameError> {
        let mut next = self.clone();
        let mut last = None;
        for &column in columns {
            last = Some(next.drop_piece(column)?);
        }
        *self = next;
        Ok(last)
    }

    /// Empties the grid and starts a new game with the same players.
    pub fn reset(&mut self) {
        self.starter = match self.config.start {
            StartPolicy::AlwaysFirst => Order::First,
            StartPolicy::Alternate => self.starter.other(),
        };
        self.grid.clear();
        self.moves.clear();
        self.lifecycle = Lifecycle::InProgress;
        self.winning_line = None;
        self.active = self.starter;
        debug!(starter = ?self.starter, "match reset");
    }

    pub fn reset_with_players(&mut self, first: &PlayerConfig, second: &PlayerConfig) {
        self.players = [
            Player::new(Order::First, first),
            Player::new(Order::Second, second),
        ];
        self.reset();
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            width: self.grid.width(),
            height: self.grid.height(),
            cells: self.grid.rows(),
            players: self.players.clone(),
            active: self.active,
            lifecycle: self.lifecycle,
            winning_line: self.winning_line,
            history: self.history(),
        }
    }
}

/// First line of `CONNECT` cells held by `player`, scanning rows top to
/// bottom, columns left to right, then directions in order.
pub fn winning_line(grid: &Grid, player: Order) -> Option<Line> {
    for row in 0..grid.height() as isize {
        for column in 0..grid.width() as isize {
            for (dr, dc) in DIRECTIONS {
                let held = (0..CONNECT as isize)
                    .all(|step| grid.get(row + dr * step, column + dc * step) == Some(player));
                if held {
                    let mut line = [(0, 0); CONNECT];
                    for (step, cell) in line.iter_mut().enumerate() {
                        let step = step as isize;
                        *cell = ((row + dr * step) as usize, (column + dc * step) as usize);
                    }
                    return Some(line);
                }
            }
        }
    }
    None
}
