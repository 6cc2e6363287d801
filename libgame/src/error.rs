use thiserror::Error;

pub type Result<T> = std::result::Result<T, UniverseError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UniverseError {
    #[error("invalid dimensions {width}x{height}: width and height must be positive")]
    InvalidDimension { width: usize, height: usize },

    #[error("expected {expected} cells, got {actual}")]
    CellCountMismatch { expected: usize, actual: usize },

    #[error("position ({row}, {col}) is outside the {width}x{height} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        width: usize,
        height: usize,
    },

    #[error("cannot place {requested} alive cells on a board of {capacity}")]
    TooManyAliveCells { requested: usize, capacity: usize },

    #[error("row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("unknown glyph {glyph:?} at ({row}, {col})")]
    UnknownGlyph { row: usize, col: usize, glyph: char },

    #[error("invalid rule: {0}")]
    InvalidRule(String),
}
