use std::{fmt, str::FromStr};

use board::{Board, Cell};
use error::{Result, UniverseError};
use pos::Position;
use rule::Rule;
use tracing::debug;

pub mod board;
pub mod error;
pub mod pos;
pub mod rule;

pub const DEFAULT_WIDTH: usize = 64;
pub const DEFAULT_HEIGHT: usize = 64;

/// A fixed-size toroidal Life grid.
///
/// `tick` computes every next state from the previous generation into a
/// scratch buffer and swaps it in, so the update order of cells never matters.
#[derive(Debug, Clone)]
pub struct Universe {
    board: Board,
    next: Vec<Cell>,
    rule: Rule,
    generation: u64,
}

impl Universe {
    /// Builds a universe holding the deterministic seed pattern, see
    /// [`Board::seeded`].
    pub fn new(width: usize, height: usize) -> Result<Self> {
        Self::with_rule(width, height, Rule::default())
    }

    pub fn with_rule(width: usize, height: usize, rule: Rule) -> Result<Self> {
        let board = Board::seeded(width, height)?;
        debug!(width, height, %rule, "universe created");
        Ok(Self::from_board(board, rule))
    }

    pub fn from_cells(width: usize, height: usize, cells: Vec<Cell>) -> Result<Self> {
        let board = Board::with_cells(width, height, cells)?;
        Ok(Self::from_board(board, Rule::default()))
    }

    pub fn random(width: usize, height: usize, alive_cells: usize) -> Result<Self> {
        let board = Board::random(width, height, alive_cells)?;
        Ok(Self::from_board(board, Rule::default()))
    }

    pub fn from_board(board: Board, rule: Rule) -> Self {
        Self {
            next: Vec::with_capacity(board.cells().len()),
            board,
            rule,
            generation: 0,
        }
    }

    /// Parses the output of [`Universe::render`] back into a universe.
    pub fn parse(text: &str) -> Result<Self> {
        let mut width = None;
        let mut cells = Vec::new();
        let mut height = 0;

        for (row, line) in text.lines().map(str::trim).enumerate() {
            let row_start = cells.len();

            for (col, glyph) in line.chars().enumerate() {
                let cell = Cell::from_glyph(glyph)
                    .ok_or(UniverseError::UnknownGlyph { row, col, glyph })?;
                cells.push(cell);
            }

            let row_width = cells.len() - row_start;
            match width {
                None => width = Some(row_width),
                Some(expected) if expected != row_width => {
                    return Err(UniverseError::RaggedRow {
                        row,
                        expected,
                        actual: row_width,
                    });
                }
                Some(_) => {}
            }

            height += 1;
        }

        Self::from_cells(width.unwrap_or(0), height, cells)
    }

    pub fn width(&self) -> usize {
        self.board.width()
    }

    pub fn height(&self) -> usize {
        self.board.height()
    }

    pub fn cells(&self) -> &[Cell] {
        self.board.cells()
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn set_rule(&mut self, rule: Rule) {
        self.rule = rule;
    }

    /// Ticks applied since construction or the last [`Universe::reset`].
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn alive_count(&self) -> usize {
        self.board.alive_count()
    }

    pub fn cell<P>(&self, pos: P) -> Option<Cell>
    where
        P: Into<Position>,
    {
        self.board.cell(pos)
    }

    pub fn set_cell<P>(&mut self, pos: P, cell: Cell) -> Result<()>
    where
        P: Into<Position>,
    {
        *self.board.try_cell_mut(pos)? = cell;
        Ok(())
    }

    pub fn toggle_cell<P>(&mut self, pos: P) -> Result<Cell>
    where
        P: Into<Position>,
    {
        let cell = self.board.try_cell_mut(pos)?;
        *cell = cell.toggled();
        Ok(*cell)
    }

    /// Marks every listed position alive.
    pub fn set_cells<P>(&mut self, positions: impl IntoIterator<Item = P>) -> Result<()>
    where
        P: Into<Position>,
    {
        positions
            .into_iter()
            .try_for_each(|pos| self.set_cell(pos, Cell::Alive))
    }

    /// Kills every cell. The generation counter is left untouched.
    pub fn clear(&mut self) {
        self.board.fill(Cell::Dead);
    }

    /// Restores the seed pattern for the current dimensions.
    pub fn reset(&mut self) {
        // Dimensions were already validated, so seeding cannot fail.
        if let Ok(board) = Board::seeded(self.width(), self.height()) {
            self.board = board;
        }
        self.generation = 0;
    }

    pub fn live_neighbor_count<P>(&self, pos: P) -> u8
    where
        P: Into<Position>,
    {
        let Position { row, col } = pos.into();
        let wrapped = Position::new(row % self.height(), col % self.width());
        self.board.live_neighbor_count(wrapped)
    }

    pub fn tick(&mut self) {
        self.board.next_generation_into(&mut self.next, &self.rule);
        self.board.swap_cells(&mut self.next);
        self.generation += 1;

        debug!(
            generation = self.generation,
            alive = self.alive_count(),
            "tick"
        );
    }

    pub fn step(&mut self, times: usize) {
        for _ in 0..times {
            self.tick();
        }
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl Default for Universe {
    fn default() -> Self {
        Self::from_board(
            Board::seeded(DEFAULT_WIDTH, DEFAULT_HEIGHT).expect("default dimensions are positive"),
            Rule::default(),
        )
    }
}

impl PartialEq for Universe {
    fn eq(&self, other: &Self) -> bool {
        self.board == other.board && self.rule == other.rule && self.generation == other.generation
    }
}

impl Eq for Universe {}

impl fmt::Display for Universe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.board.cells().chunks(self.width()) {
            for cell in row {
                write!(f, "{}", cell.glyph())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl FromStr for Universe {
    type Err = UniverseError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLINKER_HORIZONTAL: &str = "\
◻◻◻◻◻
◻◻◻◻◻
◻◼◼◼◻
◻◻◻◻◻
◻◻◻◻◻
";

    const BLINKER_VERTICAL: &str = "\
◻◻◻◻◻
◻◻◼◻◻
◻◻◼◻◻
◻◻◼◻◻
◻◻◻◻◻
";

    #[test]
    fn universe_displays_correctly() {
        use Cell::{Alive as A, Dead as D};

        let universe = Universe::from_cells(
            4,
            4,
            vec![
                D, D, D, D, //
                D, D, D, A, //
                D, D, A, A, //
                D, A, A, A, //
            ],
        )
        .unwrap();

        assert_eq!(
            universe.render(),
            "◻◻◻◻\n\
             ◻◻◻◼\n\
             ◻◻◼◼\n\
             ◻◼◼◼\n"
        );
    }

    #[test]
    fn new_rejects_zero_dimensions() {
        assert_eq!(
            Universe::new(0, 0),
            Err(UniverseError::InvalidDimension { width: 0, height: 0 })
        );
        assert!(Universe::new(1, 1).is_ok());
    }

    #[test]
    fn default_is_64_by_64() {
        let universe = Universe::default();

        assert_eq!((universe.width(), universe.height()), (64, 64));
        assert_eq!(universe.render(), Universe::new(64, 64).unwrap().render());
    }

    #[test]
    fn four_by_four_seed_first_tick() {
        let mut universe = Universe::new(4, 4).unwrap();
        let before = universe.render();

        assert_eq!(before, "◼◻◼◻\n◼◻◼◼\n◼◻◼◻\n◼◻◼◻\n");

        // (1, 3) sees columns 2 and 0 (through the wrap) on rows 0..=2, all
        // alive, and dies of overcrowding.
        assert_eq!(universe.live_neighbor_count((1, 3)), 6);
        assert_eq!(universe.live_neighbor_count((0, 0)), 3);

        universe.tick();
        let after = universe.render();

        assert_eq!(after, "◼◻◼◻\n◼◻◼◻\n◼◻◼◻\n◼◻◼◻\n");
        assert_eq!(universe.generation(), 1);

        let changed: Vec<_> = before
            .chars()
            .zip(after.chars())
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(i, _)| i)
            .collect();
        // Index 8 in the rendered text is row 1, col 3 (each row is 5 chars).
        assert_eq!(changed, vec![8]);
    }

    #[test]
    fn blinker_oscillates() {
        let mut universe: Universe = BLINKER_HORIZONTAL.parse().unwrap();

        universe.tick();
        assert_eq!(universe.render(), BLINKER_VERTICAL);

        universe.tick();
        assert_eq!(universe.render(), BLINKER_HORIZONTAL);
    }

    #[test]
    fn block_is_still() {
        let mut universe = Universe::from_cells(6, 6, vec![Cell::Dead; 36]).unwrap();
        universe.set_cells([(2, 2), (2, 3), (3, 2), (3, 3)]).unwrap();
        let initial = universe.render();

        for _ in 0..10 {
            universe.tick();
            assert_eq!(universe.render(), initial);
        }
    }

    #[test]
    fn block_across_the_corner_is_still() {
        let mut universe = Universe::from_cells(5, 5, vec![Cell::Dead; 25]).unwrap();
        universe.set_cells([(0, 0), (0, 4), (4, 0), (4, 4)]).unwrap();
        let initial = universe.render();

        universe.step(4);
        assert_eq!(universe.render(), initial);
    }

    #[test]
    fn tick_does_not_update_in_place() {
        // (1, 1) and (1, 3) die while (1, 2) is born from them in the same tick.
        let mut universe: Universe = "\
.....
.#.#.
..#..
.....
"
        .parse()
        .unwrap();

        universe.tick();
        assert_eq!(universe.render(), "◻◻◻◻◻\n◻◻◼◻◻\n◻◻◼◻◻\n◻◻◻◻◻\n");
    }

    #[test]
    fn render_is_pure() {
        let universe = Universe::new(9, 7).unwrap();

        assert_eq!(universe.render(), universe.render());
        assert_eq!(universe.generation(), 0);
    }

    #[test]
    fn render_round_trips() {
        let mut universe = Universe::new(11, 5).unwrap();
        universe.step(3);

        let parsed: Universe = universe.render().parse().unwrap();
        assert_eq!(parsed.cells(), universe.cells());
        assert_eq!((parsed.width(), parsed.height()), (11, 5));
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert_eq!(
            Universe::parse("##\n#\n"),
            Err(UniverseError::RaggedRow {
                row: 1,
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(
            Universe::parse("#x\n"),
            Err(UniverseError::UnknownGlyph {
                row: 0,
                col: 1,
                glyph: 'x'
            })
        );
        assert_eq!(
            Universe::parse(""),
            Err(UniverseError::InvalidDimension { width: 0, height: 0 })
        );
    }

    #[test]
    fn toggle_and_set_report_bounds() {
        let mut universe = Universe::from_cells(3, 3, vec![Cell::Dead; 9]).unwrap();

        assert_eq!(universe.toggle_cell((1, 1)), Ok(Cell::Alive));
        assert_eq!(universe.toggle_cell((1, 1)), Ok(Cell::Dead));
        assert!(matches!(
            universe.set_cell((3, 0), Cell::Alive),
            Err(UniverseError::OutOfBounds { row: 3, col: 0, .. })
        ));
    }

    #[test]
    fn clear_and_reset() {
        let mut universe = Universe::new(8, 8).unwrap();
        let seed = universe.render();
        universe.step(2);

        universe.clear();
        assert_eq!(universe.alive_count(), 0);
        assert_eq!(universe.generation(), 2);

        universe.reset();
        assert_eq!(universe.render(), seed);
        assert_eq!(universe.generation(), 0);
    }

    #[test]
    fn custom_rule_applies() {
        // B1/S: every isolated live cell dies and seeds all eight neighbors.
        let mut universe = Universe::from_cells(5, 5, vec![Cell::Dead; 25]).unwrap();
        universe.set_rule("B1/S".parse().unwrap());
        universe.set_cell((2, 2), Cell::Alive).unwrap();

        universe.tick();
        assert_eq!(universe.render(), "◻◻◻◻◻\n◻◼◼◼◻\n◻◼◻◼◻\n◻◼◼◼◻\n◻◻◻◻◻\n");
    }
}
