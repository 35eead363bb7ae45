//! Search errors.

use connect4_core::{BoardError, GameConfig, Outcome};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    #[error("engine was built for {expected:?} but the board is {found:?}")]
    ShapeMismatch { expected: GameConfig, found: GameConfig },

    #[error("the game is already over ({0:?})")]
    GameOver(Outcome),

    #[error("no move was evaluated on an undecided board")]
    NoMoveFound,

    #[error(transparent)]
    Board(#[from] BoardError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use connect4_core::Player;

    #[test]
    fn test_search_error_display() {
        let err = SearchError::GameOver(Outcome::Win(Player::Two));
        assert_eq!(err.to_string(), "the game is already over (Win(Two))");

        let err: SearchError = BoardError::ColumnFull { column: 2 }.into();
        assert_eq!(err.to_string(), "column 2 is full");
    }
}
