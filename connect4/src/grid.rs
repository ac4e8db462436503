use std::fmt;

use crate::error::GameError;
use crate::player::Order;

/// Fixed-size cell store. Row 0 is the top, row `height - 1` the bottom.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Option<Order>>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Result<Self, GameError> {
        let invalid = GameError::InvalidDimensions { width, height };
        if width == 0 || height == 0 {
            return Err(invalid);
        }
        // Cell count must fit an allocation and signed coordinates.
        let len = width
            .checked_mul(height)
            .filter(|&len| len <= isize::MAX as usize)
            .ok_or(invalid)?;
        Ok(Self {
            width,
            height,
            cells: vec![None; len],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Bottom-most empty row of `column`, or `None` when the column is full.
    pub fn lowest_open_row(&self, column: usize) -> Result<Option<usize>, GameError> {
        self.check_column(column)?;
        Ok((0..self.height)
            .rev()
            .find(|&row| self.cells[self.index(row, column)].is_none()))
    }

    pub fn place(&mut self, row: usize, column: usize, occupant: Order) -> Result<(), GameError> {
        self.check_row(row)?;
        self.check_column(column)?;
        let idx = self.index(row, column);
        if self.cells[idx].is_some() {
            return Err(GameError::CellOccupied { row, column });
        }
        self.cells[idx] = Some(occupant);
        Ok(())
    }

    pub fn occupant_at(&self, row: usize, column: usize) -> Result<Option<Order>, GameError> {
        self.check_row(row)?;
        self.check_column(column)?;
        Ok(self.cells[self.index(row, column)])
    }

    /// Unchecked lookup for signed coordinates; anything off the board is empty.
    pub(crate) fn get(&self, row: isize, column: isize) -> Option<Order> {
        if row < 0 || column < 0 {
            return None;
        }
        let (row, column) = (row as usize, column as usize);
        if row >= self.height || column >= self.width {
            return None;
        }
        self.cells[self.index(row, column)]
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Cells as rows, top to bottom.
    pub fn rows(&self) -> Vec<Vec<Option<Order>>> {
        self.cells.chunks(self.width).map(<[_]>::to_vec).collect()
    }

    fn index(&self, row: usize, column: usize) -> usize {
        row * self.width + column
    }

    fn check_column(&self, column: usize) -> Result<(), GameError> {
        if column >= self.width {
            return Err(GameError::ColumnOutOfRange {
                column,
                width: self.width,
            });
        }
        Ok(())
    }

    fn check_row(&self, row: usize) -> Result<(), GameError> {
        if row >= self.height {
            return Err(GameError::RowOutOfRange {
                row,
                height: self.height,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width) {
            for cell in row {
                let c = match cell {
                    None => '.',
                    Some(Order::First) => '1',
                    Some(Order::Second) => '2',
                };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
