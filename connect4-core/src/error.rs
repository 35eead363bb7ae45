//! Error types for board construction and mutation.

/// Errors raised when a caller breaks the board's contract.
///
/// A successful call never leaves the packed state inconsistent; every
/// precondition failure is reported here instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("board shape {columns}x{rows} does not fit the packing (max 7 columns, 6 rows)")]
    InvalidDimensions { columns: u8, rows: u8 },

    #[error("run length {run_length} is not playable on a {columns}x{rows} board")]
    InvalidRunLength { run_length: u8, columns: u8, rows: u8 },

    #[error("column {column} out of range (board has {columns} columns)")]
    ColumnOutOfRange { column: u8, columns: u8 },

    #[error("row {row} out of range (board has {rows} rows)")]
    RowOutOfRange { row: u8, rows: u8 },

    #[error("cell ({column},{row}) is already filled")]
    CellFilled { column: u8, row: u8 },

    #[error("cell ({column},{row}) cannot be filled yet")]
    CellNotReachable { column: u8, row: u8 },

    #[error("column {column} is full")]
    ColumnFull { column: u8 },

    #[error("cannot place an empty chip")]
    EmptyColor,

    #[error("invalid player number {0} (expected 1 or 2)")]
    InvalidPlayer(u8),

    #[error("invalid move character {0:?} in move string")]
    InvalidMoveChar(char),

    #[error("raw state {raw:#018x} has a column fill count above {rows}")]
    CorruptState { raw: u64, rows: u8 },

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_errors_display() {
        let err = BoardError::CellFilled { column: 3, row: 0 };
        assert_eq!(err.to_string(), "cell (3,0) is already filled");

        let err = BoardError::CellNotReachable { column: 1, row: 4 };
        assert_eq!(err.to_string(), "cell (1,4) cannot be filled yet");
    }

    #[test]
    fn test_not_implemented_is_distinct() {
        let err = BoardError::NotImplemented("position valuation");
        assert_eq!(err.to_string(), "position valuation is not implemented");
        assert_ne!(err, BoardError::EmptyColor);
    }
}
