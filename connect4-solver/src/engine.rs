//! Memoized negamax search over packed boards.
//!
//! The search runs every line to a decided outcome; there is no depth limit
//! and no alpha-beta window. Two caches bound the work:
//!
//! - the terminal-result cache ([`OutcomeCache`]) consulted by
//!   [`PackedBoard::evaluate_outcome`], and
//! - the transposition cache, mapping a position to the [`SearchContext`]
//!   computed for it, so a position reached by another move order is not
//!   searched twice.
//!
//! Scores are from the side to move: 1 win, 0 draw, -1 loss. As soon as a
//! move scoring above zero is found its siblings are skipped.

use std::collections::HashMap;
use std::time::Instant;

use connect4_core::{Cell, Color, GameConfig, Outcome, OutcomeCache, PackedBoard};

use crate::error::SearchError;
use crate::stats::SearchStats;

/// Best move found so far for one position, and its score.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SearchContext {
    best_move: Option<Cell>,
    best_score: f32,
}

impl SearchContext {
    /// Fresh context: no move, score negative infinity.
    pub fn new() -> Self {
        Self {
            best_move: None,
            best_score: f32::NEG_INFINITY,
        }
    }

    /// Context of a finished position, scored for the side to move there.
    fn terminal(score: f32) -> Self {
        Self {
            best_move: None,
            best_score: score,
        }
    }

    pub fn best_move(&self) -> Option<Cell> {
        self.best_move
    }

    pub fn best_score(&self) -> f32 {
        self.best_score
    }

    pub fn set_best_move(&mut self, cell: Cell, score: f32) {
        self.best_move = Some(cell);
        self.best_score = score;
    }
}

/// Score from the other side's point of view. A draw stays `+0.0`.
#[inline]
fn negate(score: f32) -> f32 {
    if score == 0.0 {
        0.0
    } else {
        -score
    }
}

impl Default for SearchContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Engine answer for the side to move.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Recommendation {
    pub cell: Cell,
    pub score: f32,
}

impl Recommendation {
    /// Column to drop into.
    pub fn column(&self) -> u8 {
        self.cell.column
    }
}

/// Negamax search engine bound to one board shape.
///
/// Both caches live as long as the engine and are shared by every search it
/// runs, so later queries reuse earlier work. Call [`SearchEngine::clear`]
/// to start a new session.
pub struct SearchEngine {
    config: GameConfig,
    /// Terminal-result cache: raw state -> decided outcome
    outcomes: OutcomeCache,
    /// Transposition cache: raw state (side to move included) -> its context
    contexts: HashMap<u64, SearchContext>,
    /// Search statistics for the current session
    pub stats: SearchStats,
}

impl SearchEngine {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            outcomes: OutcomeCache::new(),
            contexts: HashMap::new(),
            stats: SearchStats::new(),
        }
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    /// Number of positions in the transposition cache.
    pub fn transposition_len(&self) -> usize {
        self.contexts.len()
    }

    /// Number of decided positions in the terminal-result cache.
    pub fn outcome_cache_len(&self) -> usize {
        self.outcomes.len()
    }

    /// Drop both caches and reset statistics.
    pub fn clear(&mut self) {
        self.outcomes.clear();
        self.contexts.clear();
        self.stats = SearchStats::new();
    }

    /// Search `board` for the side to move, writing the best move and its
    /// score into `context`.
    ///
    /// If no candidate is evaluated (no fillable cell), `context` keeps its
    /// negative-infinity sentinel and no move.
    pub fn best_move(
        &mut self,
        board: &PackedBoard,
        context: &mut SearchContext,
    ) -> Result<(), SearchError> {
        self.check_shape(board)?;
        self.search(board, context, 1)?;
        Ok(())
    }

    /// Best move for the side to move on an undecided board.
    pub fn recommend(&mut self, board: &PackedBoard) -> Result<Recommendation, SearchError> {
        self.check_shape(board)?;
        let outcome = board.evaluate_outcome(&mut self.outcomes);
        if outcome.is_decided() {
            return Err(SearchError::GameOver(outcome));
        }

        log::debug!(
            "searching {} chips, player {} to move",
            board.total_chip_count(),
            board.current_player().number()
        );
        let start = Instant::now();
        let mut context = SearchContext::new();
        self.search(board, &mut context, 1)?;
        log::debug!(
            "search done in {:.3}s: move={:?} score={} table={}",
            start.elapsed().as_secs_f64(),
            context.best_move(),
            context.best_score(),
            self.contexts.len()
        );

        match context.best_move() {
            Some(cell) => Ok(Recommendation {
                cell,
                score: context.best_score(),
            }),
            None => Err(SearchError::NoMoveFound),
        }
    }

    fn check_shape(&self, board: &PackedBoard) -> Result<(), SearchError> {
        if board.config() != self.config {
            return Err(SearchError::ShapeMismatch {
                expected: self.config,
                found: board.config(),
            });
        }
        Ok(())
    }

    fn search(
        &mut self,
        board: &PackedBoard,
        context: &mut SearchContext,
        depth: u32,
    ) -> Result<(), SearchError> {
        self.stats.nodes_searched += 1;
        self.stats.max_depth = self.stats.max_depth.max(depth);

        let player = board.current_player();
        let color = Color::of(player);
        let moves: Vec<Cell> = board.legal_cells().collect();

        for (idx, &cell) in moves.iter().enumerate() {
            self.stats.candidates += 1;
            let mut next = *board;
            next.place(cell, color)?;
            // Key on the position as the opponent sees it.
            next.set_player(player.opponent());
            let key = next.raw();

            let score = if let Some(cached) = self.contexts.get(&key) {
                self.stats.cache_hits += 1;
                negate(cached.best_score())
            } else {
                let (score, entry) = match next.evaluate_outcome(&mut self.outcomes) {
                    Outcome::Undecided => {
                        let mut child = SearchContext::new();
                        self.search(&next, &mut child, depth + 1)?;
                        (negate(child.best_score()), child)
                    }
                    outcome => {
                        // The mover cannot lose on their own move: any decided
                        // non-draw outcome is their win.
                        self.stats.record_terminal(outcome);
                        let score = if outcome == Outcome::Draw { 0.0 } else { 1.0 };
                        (score, SearchContext::terminal(negate(score)))
                    }
                };
                self.contexts.insert(key, entry);
                score
            };

            if depth == 1 {
                log::trace!("candidate column {} scores {}", cell.column + 1, score);
            }

            if score > context.best_score() {
                context.set_best_move(cell, score);
                if score > 0.0 {
                    self.stats.branches_pruned += (moves.len() - idx - 1) as u64;
                    break;
                }
            }
        }
        Ok(())
    }
}
