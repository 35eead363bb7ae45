//! Board shape and winning run length.

use serde::{Deserialize, Serialize};

use crate::BoardError;

/// Widest board the packing supports (3 fill-count bits per column, 21 bits).
pub const MAX_COLUMNS: u8 = 7;
/// Tallest board the packing supports (7 × 6 colour bits fit between bit 21 and bit 63).
pub const MAX_ROWS: u8 = 6;

/// Validated game shape. Not stored in the packed state.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "RawConfig")]
pub struct GameConfig {
    columns: u8,
    rows: u8,
    run_length: u8,
}

#[derive(Deserialize)]
struct RawConfig {
    columns: u8,
    rows: u8,
    #[serde(default = "default_run_length")]
    run_length: u8,
}

fn default_run_length() -> u8 {
    4
}

impl TryFrom<RawConfig> for GameConfig {
    type Error = BoardError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        GameConfig::new(raw.columns, raw.rows, raw.run_length)
    }
}

impl GameConfig {
    /// Create a config, rejecting shapes the 64-bit packing cannot hold.
    pub fn new(columns: u8, rows: u8, run_length: u8) -> Result<GameConfig, BoardError> {
        if columns == 0 || rows == 0 || columns > MAX_COLUMNS || rows > MAX_ROWS {
            return Err(BoardError::InvalidDimensions { columns, rows });
        }
        if run_length < 2 || run_length > columns.max(rows) {
            return Err(BoardError::InvalidRunLength {
                run_length,
                columns,
                rows,
            });
        }
        Ok(GameConfig {
            columns,
            rows,
            run_length,
        })
    }

    /// Classic 7×6 Connect Four.
    pub const fn standard() -> GameConfig {
        GameConfig {
            columns: 7,
            rows: 6,
            run_length: 4,
        }
    }

    #[inline]
    pub const fn columns(&self) -> u8 {
        self.columns
    }

    #[inline]
    pub const fn rows(&self) -> u8 {
        self.rows
    }

    #[inline]
    pub const fn run_length(&self) -> u8 {
        self.run_length
    }

    /// Total number of cells on the board.
    #[inline]
    pub const fn cells(&self) -> u32 {
        self.columns as u32 * self.rows as u32
    }

    /// Fewest chips on the board before anyone can have a run:
    /// the winner needs `run_length`, the loser has moved one fewer time.
    #[inline]
    pub const fn min_chips_for_win(&self) -> u32 {
        2 * self.run_length as u32 - 1
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_shape() {
        let config = GameConfig::standard();
        assert_eq!(config.columns(), 7);
        assert_eq!(config.rows(), 6);
        assert_eq!(config.run_length(), 4);
        assert_eq!(config.cells(), 42);
        assert_eq!(config.min_chips_for_win(), 7);
        assert_eq!(GameConfig::default(), config);
    }

    #[test]
    fn test_rejects_oversized_board() {
        assert_eq!(
            GameConfig::new(8, 6, 4),
            Err(BoardError::InvalidDimensions { columns: 8, rows: 6 })
        );
        assert_eq!(
            GameConfig::new(7, 7, 4),
            Err(BoardError::InvalidDimensions { columns: 7, rows: 7 })
        );
        assert!(GameConfig::new(0, 4, 2).is_err());
    }

    #[test]
    fn test_rejects_unplayable_run_length() {
        assert!(GameConfig::new(4, 4, 5).is_err());
        assert!(GameConfig::new(4, 4, 1).is_err());
        assert!(GameConfig::new(4, 4, 3).is_ok());
        // A run can be longer than the board is tall if it fits horizontally.
        assert!(GameConfig::new(5, 3, 5).is_ok());
    }

    #[test]
    fn test_deserialize_validates() {
        let config: GameConfig = serde_json::from_str(r#"{"columns":4,"rows":4,"run_length":3}"#).unwrap();
        assert_eq!(config, GameConfig::new(4, 4, 3).unwrap());

        let config: GameConfig = serde_json::from_str(r#"{"columns":5,"rows":4}"#).unwrap();
        assert_eq!(config.run_length(), 4);

        let bad = serde_json::from_str::<GameConfig>(r#"{"columns":9,"rows":4,"run_length":3}"#);
        assert!(bad.is_err());
    }
}
