use itertools::Itertools;

use super::{
    error::{Result, UniverseError},
    pos::Position,
    rule::Rule,
};

/// Offsets of the eight cells surrounding a position, as `[row, col]`.
const NEIGHBOR_RELATIVE_POSITIONS: &[[isize; 2]] = &[
    [-1, -1],
    [-1, 0],
    [-1, 1],
    [0, -1],
    [0, 1],
    [1, -1],
    [1, 0],
    [1, 1],
];

/// Row-major cell storage whose edges wrap around, so the grid is a torus.
///
/// `cells.len() == width * height` always holds and neither dimension is zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// An all-dead board.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let len = checked_len(width, height)?;
        Ok(Self {
            width,
            height,
            cells: vec![Cell::Dead; len],
        })
    }

    /// The deterministic starting pattern: the cell at row-major index `i` is
    /// alive iff `i` is a multiple of 2 or of 7.
    pub fn seeded(width: usize, height: usize) -> Result<Self> {
        let len = checked_len(width, height)?;
        let cells = (0..len)
            .map(|i| {
                if i % 2 == 0 || i % 7 == 0 {
                    Cell::Alive
                } else {
                    Cell::Dead
                }
            })
            .collect();

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn random(width: usize, height: usize, alive_cells: usize) -> Result<Self> {
        let mut board = Self::new(width, height)?;

        if alive_cells > board.cells.len() {
            return Err(UniverseError::TooManyAliveCells {
                requested: alive_cells,
                capacity: board.cells.len(),
            });
        }

        let mut available_positions = (0..board.height)
            .cartesian_product(0..board.width)
            .map(Position::from)
            .collect_vec();

        for _ in 0..alive_cells {
            let chosen_index = rand::random_range(0..available_positions.len());
            let chosen_position = available_positions.swap_remove(chosen_index);

            if let Some(cell) = board.cell_mut(chosen_position) {
                *cell = Cell::Alive;
            }
        }

        Ok(board)
    }

    pub fn with_cells(width: usize, height: usize, cells: Vec<Cell>) -> Result<Self> {
        let expected = checked_len(width, height)?;

        if cells.len() != expected {
            return Err(UniverseError::CellCountMismatch {
                expected,
                actual: cells.len(),
            });
        }

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn alive_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_alive()).count()
    }

    pub fn cell<P>(&self, pos: P) -> Option<Cell>
    where
        P: Into<Position>,
    {
        let index = self.pos_to_index(pos)?;
        self.cells.get(index).copied()
    }

    pub fn cell_mut<P>(&mut self, pos: P) -> Option<&mut Cell>
    where
        P: Into<Position>,
    {
        let index = self.pos_to_index(pos)?;
        self.cells.get_mut(index)
    }

    /// Like [`Board::cell_mut`], but reports positions outside the grid.
    pub fn try_cell_mut<P>(&mut self, pos: P) -> Result<&mut Cell>
    where
        P: Into<Position>,
    {
        let pos: Position = pos.into();
        let (width, height) = (self.width, self.height);

        self.cell_mut(pos).ok_or(UniverseError::OutOfBounds {
            row: pos.row,
            col: pos.col,
            width,
            height,
        })
    }

    pub fn fill(&mut self, cell: Cell) {
        self.cells.fill(cell);
    }

    pub fn enumerate_cells(&self) -> impl Iterator<Item = (Position, Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(index, cell)| (self.index_to_pos(index), *cell))
    }

    /// The eight neighbors of `pos`, wrapping across every edge and corner.
    pub fn neighbors(&self, pos: Position) -> impl Iterator<Item = Cell> + '_ {
        NEIGHBOR_RELATIVE_POSITIONS.iter().map(move |[d_row, d_col]| {
            let row = wrap(pos.row, *d_row, self.height);
            let col = wrap(pos.col, *d_col, self.width);
            self.cells[row * self.width + col]
        })
    }

    pub fn live_neighbor_count(&self, pos: Position) -> u8 {
        self.neighbors(pos).map(|cell| cell as u8).sum()
    }

    /// Writes the next generation of every cell into `next`, reading only
    /// from `self`.
    pub(crate) fn next_generation_into(&self, next: &mut Vec<Cell>, rule: &Rule) {
        next.clear();
        next.extend(
            self.enumerate_cells()
                .map(|(pos, cell)| rule.next_state(cell, self.live_neighbor_count(pos))),
        );
    }

    pub(crate) fn swap_cells(&mut self, next: &mut Vec<Cell>) {
        debug_assert_eq!(next.len(), self.cells.len());
        std::mem::swap(&mut self.cells, next);
    }

    fn pos_to_index<P>(&self, pos: P) -> Option<usize>
    where
        P: Into<Position>,
    {
        let Position { row, col } = pos.into();

        if col >= self.width {
            return None;
        }

        if row >= self.height {
            return None;
        }

        Some(row * self.width + col)
    }

    fn index_to_pos(&self, index: usize) -> Position {
        let row = index / self.width;
        let col = index % self.width;
        Position { row, col }
    }
}

fn checked_len(width: usize, height: usize) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(UniverseError::InvalidDimension { width, height });
    }

    width
        .checked_mul(height)
        .ok_or(UniverseError::InvalidDimension { width, height })
}

fn wrap(center: usize, offset: isize, size: usize) -> usize {
    (center as isize + offset).rem_euclid(size as isize) as usize
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    Alive = 1,

    #[default]
    Dead = 0,
}

impl Cell {
    pub const ALIVE_GLYPH: char = '◼';
    pub const DEAD_GLYPH: char = '◻';

    pub fn is_alive(self) -> bool {
        self == Cell::Alive
    }

    pub fn toggled(self) -> Self {
        match self {
            Cell::Alive => Cell::Dead,
            Cell::Dead => Cell::Alive,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            Cell::Alive => Self::ALIVE_GLYPH,
            Cell::Dead => Self::DEAD_GLYPH,
        }
    }

    /// Accepts the rendered glyphs as well as the usual ASCII stand-ins.
    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            Self::ALIVE_GLYPH | '#' | '*' | 'O' => Some(Cell::Alive),
            Self::DEAD_GLYPH | '.' | '-' => Some(Cell::Dead),
            _ => None,
        }
    }
}
