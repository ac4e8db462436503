use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("board dimensions {width}x{height} are invalid (both must be at least 1)")]
    InvalidDimensions { width: usize, height: usize },
    #[error("column {column} is out of range (0-{})", last_index(.width))]
    ColumnOutOfRange { column: usize, width: usize },
    #[error("row {row} is out of range (0-{})", last_index(.height))]
    RowOutOfRange { row: usize, height: usize },
    #[error("column {column} is full")]
    ColumnFull { column: usize },
    #[error("cell at row {row}, column {column} is already occupied")]
    CellOccupied { row: usize, column: usize },
    #[error("the game is already over")]
    GameAlreadyOver,
    #[error("invalid move history at position {position}: {reason}")]
    ParseMove { position: usize, reason: String },
}

fn last_index(len: &usize) -> usize {
    len.saturating_sub(1)
}

impl GameError {
    /// True for errors caused by the current match state rather than a
    /// malformed request.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            GameError::ColumnFull { .. } | GameError::CellOccupied { .. } | GameError::GameAlreadyOver
        )
    }
}
