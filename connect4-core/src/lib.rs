//! Connect Four position logic with a bit-packed board representation.
//!
//! # Board Encoding (64-bit)
//!
//! ```text
//! Bits 0-20:  Column fill counts (7 columns × 3 bits, 0..=7 each)
//! Bits 21-62: Chip colours, one bit per cell (0 = Red, 1 = Yellow)
//! Bit 63:     Side to move (0 = player 1, 1 = player 2)
//!
//! Fill count of column c:   (state >> 3c) & 0b111
//! Colour bit of cell (c, r): 21 + columns*r + c     (r counted from the bottom)
//! ```
//!
//! Colour bits at or above a column's fill count are don't-care: they are
//! never read back, so a cell only has a colour once gravity has reached it.
//! The 21 count bits are always reserved, whatever the actual column count,
//! so a 7×6 board uses every one of the 64 bits.
//!
//! The shape (`columns`, `rows`) and the winning run length live beside the
//! state in [`GameConfig`], not inside it.

mod config;
mod error;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use config::{GameConfig, MAX_COLUMNS, MAX_ROWS};
pub use error::BoardError;

/// Player identifier.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Player {
    One = 1,
    Two = 2,
}

impl Player {
    /// Get the opponent player.
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Convert from u8 (1 or 2) to Player.
    #[inline]
    pub fn from_bits(bits: u8) -> Option<Player> {
        match bits {
            1 => Some(Player::One),
            2 => Some(Player::Two),
            _ => None,
        }
    }

    /// Player number, 1 or 2.
    #[inline]
    pub fn number(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Player {
    type Error = BoardError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Player::from_bits(bits).ok_or(BoardError::InvalidPlayer(bits))
    }
}

/// Display colour of a cell. Player 1 plays Red, player 2 plays Yellow.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Color {
    Empty = 0,
    Red = 1,
    Yellow = 2,
}

impl Color {
    /// The colour a player drops.
    #[inline]
    pub fn of(player: Player) -> Color {
        match player {
            Player::One => Color::Red,
            Player::Two => Color::Yellow,
        }
    }

    /// The player owning a chip of this colour.
    #[inline]
    pub fn owner(self) -> Option<Player> {
        Player::from_bits(self as u8)
    }

    fn symbol(self) -> char {
        match self {
            Color::Empty => '.',
            Color::Red => 'R',
            Color::Yellow => 'Y',
        }
    }
}

/// A cell on the board. `row` counts from the bottom (row 0 fills first).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub column: u8,
    pub row: u8,
}

impl Cell {
    #[inline]
    pub const fn new(column: u8, row: u8) -> Cell {
        Cell { column, row }
    }

    /// Convert a display coordinate (row 0 = top) on a board of `rows` rows.
    pub fn from_display(column: u8, display_row: u8, rows: u8) -> Result<Cell, BoardError> {
        if display_row >= rows {
            return Err(BoardError::RowOutOfRange {
                row: display_row,
                rows,
            });
        }
        Ok(Cell::new(column, rows - display_row - 1))
    }

    /// Row index counted from the top, for rendering.
    pub fn display_row(self, rows: u8) -> Result<u8, BoardError> {
        if self.row >= rows {
            return Err(BoardError::RowOutOfRange { row: self.row, rows });
        }
        Ok(rows - self.row - 1)
    }
}

/// Terminal status of a position.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Outcome {
    Undecided,
    Draw,
    Win(Player),
}

impl Outcome {
    /// Integer code: -1 undecided, 0 draw, 1 or 2 for the winning player.
    #[inline]
    pub fn code(self) -> i8 {
        match self {
            Outcome::Undecided => -1,
            Outcome::Draw => 0,
            Outcome::Win(player) => player as i8,
        }
    }

    pub fn from_code(code: i8) -> Option<Outcome> {
        match code {
            -1 => Some(Outcome::Undecided),
            0 => Some(Outcome::Draw),
            1 => Some(Outcome::Win(Player::One)),
            2 => Some(Outcome::Win(Player::Two)),
            _ => None,
        }
    }

    #[inline]
    pub fn is_decided(self) -> bool {
        self != Outcome::Undecided
    }
}

/// Terminal-result cache keyed by raw packed state.
///
/// Only valid for boards of a single [`GameConfig`]; the raw state does not
/// carry the shape.
pub type OutcomeCache = HashMap<u64, Outcome>;

/// Line directions as (column step, row step): horizontal, vertical,
/// rising diagonal, falling diagonal.
const DIRECTIONS: [(i8, i8); 4] = [(1, 0), (0, 1), (1, 1), (-1, 1)];

/// Compact Connect Four position - the whole game state in one u64.
///
/// See module documentation for encoding details.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(into = "BoardSnapshot", try_from = "BoardSnapshot")]
pub struct PackedBoard {
    state: u64,
    config: GameConfig,
}

impl PackedBoard {
    /// Bits per column fill count.
    const COUNT_BITS: u32 = 3;
    /// Mask for a single fill count (0b111).
    const COUNT_MASK: u64 = 0b111;
    /// First colour bit, after the 7 reserved fill counts.
    const COLOR_BASE: u32 = 21;
    /// Bit position for the side to move.
    const PLAYER_BIT: u32 = 63;

    /// Create an empty board with a four-in-a-row goal, player 1 to move.
    pub fn new(columns: u8, rows: u8) -> Result<PackedBoard, BoardError> {
        Ok(Self::with_config(GameConfig::new(columns, rows, 4)?))
    }

    /// Create an empty board of the given shape, player 1 to move.
    #[inline]
    pub fn with_config(config: GameConfig) -> PackedBoard {
        PackedBoard { state: 0, config }
    }

    /// Rebuild a board from a raw encoding, checking every fill count.
    pub fn from_raw(config: GameConfig, raw: u64) -> Result<PackedBoard, BoardError> {
        for column in 0..MAX_COLUMNS {
            let count = ((raw >> (column as u32 * Self::COUNT_BITS)) & Self::COUNT_MASK) as u8;
            let limit = if column < config.columns() { config.rows() } else { 0 };
            if count > limit {
                return Err(BoardError::CorruptState {
                    raw,
                    rows: config.rows(),
                });
            }
        }
        Ok(PackedBoard { state: raw, config })
    }

    /// Replay a string of 1-based column digits, alternating players from
    /// an empty board. Whitespace is ignored.
    pub fn from_moves(config: GameConfig, moves: &str) -> Result<PackedBoard, BoardError> {
        let mut board = PackedBoard::with_config(config);
        for ch in moves.chars().filter(|c| !c.is_whitespace()) {
            let digit = ch.to_digit(10).ok_or(BoardError::InvalidMoveChar(ch))?;
            if digit == 0 {
                return Err(BoardError::InvalidMoveChar(ch));
            }
            board.play(digit as u8 - 1)?;
        }
        Ok(board)
    }

    /// Get the raw u64 encoding (for hashing and persistence).
    #[inline]
    pub fn raw(&self) -> u64 {
        self.state
    }

    #[inline]
    pub fn config(&self) -> GameConfig {
        self.config
    }

    #[inline]
    pub fn columns(&self) -> u8 {
        self.config.columns()
    }

    #[inline]
    pub fn rows(&self) -> u8 {
        self.config.rows()
    }

    #[inline]
    pub fn run_length(&self) -> u8 {
        self.config.run_length()
    }

    /// Clear back to the empty board with player 1 to move.
    #[inline]
    pub fn reset(&mut self) {
        self.state = 0;
    }

    // ========== Raw bit access ==========

    #[inline]
    fn count(&self, column: u8) -> u8 {
        ((self.state >> (column as u32 * Self::COUNT_BITS)) & Self::COUNT_MASK) as u8
    }

    #[inline]
    fn color_bit(&self, column: u8, row: u8) -> u32 {
        Self::COLOR_BASE + self.columns() as u32 * row as u32 + column as u32
    }

    /// Colour of an in-range cell. Don't-care bits above the fill count read as Empty.
    #[inline]
    fn color_unchecked(&self, column: u8, row: u8) -> Color {
        if row >= self.count(column) {
            return Color::Empty;
        }
        if (self.state >> self.color_bit(column, row)) & 1 == 0 {
            Color::Red
        } else {
            Color::Yellow
        }
    }

    fn check_column(&self, column: u8) -> Result<(), BoardError> {
        if column >= self.columns() {
            return Err(BoardError::ColumnOutOfRange {
                column,
                columns: self.columns(),
            });
        }
        Ok(())
    }

    fn check_cell(&self, cell: Cell) -> Result<(), BoardError> {
        self.check_column(cell.column)?;
        if cell.row >= self.rows() {
            return Err(BoardError::RowOutOfRange {
                row: cell.row,
                rows: self.rows(),
            });
        }
        Ok(())
    }

    // ========== Cell queries ==========

    /// Number of chips stacked in a column.
    pub fn fill_count(&self, column: u8) -> Result<u8, BoardError> {
        self.check_column(column)?;
        Ok(self.count(column))
    }

    /// Colour at a cell; `Empty` if gravity has not reached it yet.
    pub fn color_at(&self, cell: Cell) -> Result<Color, BoardError> {
        self.check_cell(cell)?;
        Ok(self.color_unchecked(cell.column, cell.row))
    }

    /// True iff `cell` is exactly the next slot gravity fills in its column.
    pub fn is_fillable(&self, cell: Cell) -> Result<bool, BoardError> {
        self.check_cell(cell)?;
        Ok(cell.row == self.count(cell.column))
    }

    /// Sum of all column fill counts.
    #[inline]
    pub fn total_chip_count(&self) -> u32 {
        (0..self.columns()).map(|c| self.count(c) as u32).sum()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.total_chip_count() == self.config.cells()
    }

    /// Iterate over every cell: columns left to right, each bottom to top.
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let rows = self.rows();
        (0..self.columns()).flat_map(move |column| (0..rows).map(move |row| Cell::new(column, row)))
    }

    /// The fillable cells, in the same order as [`PackedBoard::cells`].
    pub fn legal_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells()
            .filter(move |cell| cell.row == self.count(cell.column))
    }

    // ========== Mutation ==========

    /// Drop a chip of `color` into `cell`.
    ///
    /// `cell` must be fillable; a filled or unreachable target is rejected
    /// and the board is left untouched. The fill count and colour bit are
    /// written in one update of the state.
    pub fn place(&mut self, cell: Cell, color: Color) -> Result<(), BoardError> {
        self.check_cell(cell)?;
        if color == Color::Empty {
            return Err(BoardError::EmptyColor);
        }

        let count = self.count(cell.column);
        if cell.row < count {
            return Err(BoardError::CellFilled {
                column: cell.column,
                row: cell.row,
            });
        }
        if cell.row > count {
            return Err(BoardError::CellNotReachable {
                column: cell.column,
                row: cell.row,
            });
        }

        let count_shift = cell.column as u32 * Self::COUNT_BITS;
        let color_shift = self.color_bit(cell.column, cell.row);
        let color_bit = (color == Color::Yellow) as u64;
        self.state = (self.state & !(Self::COUNT_MASK << count_shift) & !(1 << color_shift))
            | ((count as u64 + 1) << count_shift)
            | (color_bit << color_shift);
        Ok(())
    }

    /// Drop the side to move's chip into `column` and pass the turn.
    /// Returns the cell that was filled.
    pub fn play(&mut self, column: u8) -> Result<Cell, BoardError> {
        self.check_column(column)?;
        let count = self.count(column);
        if count >= self.rows() {
            return Err(BoardError::ColumnFull { column });
        }
        let cell = Cell::new(column, count);
        self.place(cell, Color::of(self.current_player()))?;
        self.switch_player();
        Ok(cell)
    }

    // ========== Side to move ==========

    /// Get the current player.
    #[inline]
    pub fn current_player(&self) -> Player {
        if (self.state >> Self::PLAYER_BIT) & 1 == 0 {
            Player::One
        } else {
            Player::Two
        }
    }

    /// Switch the current player.
    #[inline]
    pub fn switch_player(&mut self) {
        self.state ^= 1 << Self::PLAYER_BIT;
    }

    /// Make `player` the side to move. Idempotent.
    #[inline]
    pub fn set_player(&mut self, player: Player) {
        if self.current_player() != player {
            self.switch_player();
        }
    }

    /// Make player number `player` (1 or 2) the side to move.
    pub fn set_turn(&mut self, player: u8) -> Result<(), BoardError> {
        self.set_player(Player::try_from(player)?);
        Ok(())
    }

    // ========== Terminal detection ==========

    /// True if `run_length` cells from `(column, row)` along `dir` are on the
    /// board and all hold `color`.
    fn run_from(&self, column: u8, row: u8, dir: (i8, i8), color: Color) -> bool {
        let run = self.run_length() as i16;
        let end_c = column as i16 + dir.0 as i16 * (run - 1);
        let end_r = row as i16 + dir.1 as i16 * (run - 1);
        if end_c < 0 || end_c >= self.columns() as i16 || end_r >= self.rows() as i16 {
            return false;
        }
        (1..run).all(|i| {
            let c = (column as i16 + dir.0 as i16 * i) as u8;
            let r = (row as i16 + dir.1 as i16 * i) as u8;
            self.color_unchecked(c, r) == color
        })
    }

    /// Exhaustive scan for the first run, rows bottom to top.
    /// Returns the starting cell, its direction and colour.
    fn find_run(&self) -> Option<(Cell, (i8, i8), Color)> {
        for row in 0..self.rows() {
            for column in 0..self.columns() {
                let color = self.color_unchecked(column, row);
                // Empty never starts a run.
                if color == Color::Empty {
                    continue;
                }
                for &dir in &DIRECTIONS {
                    if self.run_from(column, row, dir, color) {
                        return Some((Cell::new(column, row), dir, color));
                    }
                }
            }
        }
        None
    }

    /// The first winning run found and its owner, if any.
    pub fn winning_run(&self) -> Option<(Player, Vec<Cell>)> {
        let (start, dir, color) = self.find_run()?;
        let cells = (0..self.run_length() as i16)
            .map(|i| {
                Cell::new(
                    (start.column as i16 + dir.0 as i16 * i) as u8,
                    (start.row as i16 + dir.1 as i16 * i) as u8,
                )
            })
            .collect();
        Some((color.owner()?, cells))
    }

    /// Terminal status of the position, without a cache.
    pub fn outcome(&self) -> Outcome {
        let chips = self.total_chip_count();
        if chips < self.config.min_chips_for_win() {
            return self.no_run_outcome(chips);
        }
        self.scan_outcome(chips)
    }

    /// Terminal status, memoized in `cache`. Only decided outcomes are stored.
    pub fn evaluate_outcome(&self, cache: &mut OutcomeCache) -> Outcome {
        let chips = self.total_chip_count();
        if chips < self.config.min_chips_for_win() {
            return self.no_run_outcome(chips);
        }
        if let Some(&outcome) = cache.get(&self.state) {
            return outcome;
        }
        let outcome = self.scan_outcome(chips);
        if outcome.is_decided() {
            cache.insert(self.state, outcome);
        }
        outcome
    }

    fn scan_outcome(&self, chips: u32) -> Outcome {
        match self.find_run().and_then(|(_, _, color)| color.owner()) {
            Some(player) => Outcome::Win(player),
            None => self.no_run_outcome(chips),
        }
    }

    /// Status of a position known to hold no run. Small boards can fill up
    /// before `min_chips_for_win` chips are down, so fullness is checked
    /// even below the chip threshold.
    #[inline]
    fn no_run_outcome(&self, chips: u32) -> Outcome {
        if chips == self.config.cells() {
            Outcome::Draw
        } else {
            Outcome::Undecided
        }
    }

    /// Terminal status judged only from runs through `cell`.
    ///
    /// Enough after a single move when the position before it was undecided.
    pub fn outcome_at(&self, cell: Cell) -> Result<Outcome, BoardError> {
        let color = self.color_at(cell)?;
        if let Some(player) = color.owner() {
            let run = self.run_length() as i16;
            for &(dc, dr) in &DIRECTIONS {
                let length = 1
                    + self.stretch(cell, (dc, dr), color)
                    + self.stretch(cell, (-dc, -dr), color);
                if length >= run {
                    return Ok(Outcome::Win(player));
                }
            }
        }
        Ok(if self.is_full() {
            Outcome::Draw
        } else {
            Outcome::Undecided
        })
    }

    /// Count of consecutive `color` chips next to `cell` along `dir`.
    fn stretch(&self, cell: Cell, dir: (i8, i8), color: Color) -> i16 {
        let mut length = 0;
        let mut c = cell.column as i16 + dir.0 as i16;
        let mut r = cell.row as i16 + dir.1 as i16;
        while c >= 0
            && r >= 0
            && c < self.columns() as i16
            && r < self.rows() as i16
            && self.color_unchecked(c as u8, r as u8) == color
        {
            length += 1;
            c += dir.0 as i16;
            r += dir.1 as i16;
        }
        length
    }

    // ========== Bitboard Win Detection ==========

    /// Occupancy masks for (Red, Yellow), one bit per cell at
    /// `row * (columns + 1) + column`. The spare bit per row stays clear so
    /// shifted runs cannot wrap from one row into the next.
    pub(crate) fn color_masks(&self) -> (u64, u64) {
        let stride = self.columns() as u32 + 1;
        let mut red = 0u64;
        let mut yellow = 0u64;
        for column in 0..self.columns() {
            for row in 0..self.count(column) {
                let bit = 1u64 << (row as u32 * stride + column as u32);
                match self.color_unchecked(column, row) {
                    Color::Red => red |= bit,
                    Color::Yellow => yellow |= bit,
                    Color::Empty => {}
                }
            }
        }
        (red, yellow)
    }

    fn mask_has_run(&self, mask: u64) -> bool {
        let stride = self.columns() as u32 + 1;
        let run = self.run_length() as u32;
        [1, stride, stride + 1, stride - 1].iter().any(|&shift| {
            let mut acc = mask;
            for i in 1..run {
                acc &= mask >> (i * shift);
            }
            acc != 0
        })
    }

    /// Shift-and win detection over the colour masks.
    ///
    /// Independent of the cell scan behind [`PackedBoard::outcome`], which
    /// the search uses; this detector is kept as a cross-check for it and
    /// for callers that only need to know who has a run. When both colours
    /// have one (only possible with hand-placed chips) Red is reported.
    pub fn winner_fast(&self) -> Option<Player> {
        let (red, yellow) = self.color_masks();
        if self.mask_has_run(red) {
            Some(Player::One)
        } else if self.mask_has_run(yellow) {
            Some(Player::Two)
        } else {
            None
        }
    }

    /// Heuristic valuation of a non-terminal position. Search scores only
    /// terminal results, so there is no valuation to return.
    pub fn value_position(&self) -> Result<f32, BoardError> {
        Err(BoardError::NotImplemented("position valuation"))
    }
}

impl fmt::Display for PackedBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..self.rows()).rev() {
            let line: Vec<String> = (0..self.columns())
                .map(|column| self.color_unchecked(column, row).symbol().to_string())
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        let footer: Vec<String> = (1..=self.columns()).map(|c| c.to_string()).collect();
        write!(f, "{}", footer.join(" "))
    }
}

/// Persisted form: the raw state plus the shape it belongs to.
#[derive(Serialize, Deserialize)]
struct BoardSnapshot {
    state: u64,
    columns: u8,
    rows: u8,
    run_length: u8,
}

impl From<PackedBoard> for BoardSnapshot {
    fn from(board: PackedBoard) -> Self {
        BoardSnapshot {
            state: board.state,
            columns: board.columns(),
            rows: board.rows(),
            run_length: board.run_length(),
        }
    }
}

impl TryFrom<BoardSnapshot> for PackedBoard {
    type Error = BoardError;

    fn try_from(snapshot: BoardSnapshot) -> Result<Self, Self::Error> {
        let config = GameConfig::new(snapshot.columns, snapshot.rows, snapshot.run_length)?;
        PackedBoard::from_raw(config, snapshot.state)
    }
}
