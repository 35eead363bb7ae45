//! Search statistics tracking.

use std::time::Instant;

use connect4_core::{Outcome, Player};

/// Statistics collected during one search session.
#[derive(Debug)]
pub struct SearchStats {
    /// Positions expanded by the recursive search
    pub nodes_searched: u64,

    /// Candidate moves tried, whatever branch answered them
    pub candidates: u64,

    /// Candidate moves answered from the transposition cache
    pub cache_hits: u64,

    /// Candidate moves that ended the game
    pub terminal_positions: u64,

    /// Breakdown of terminal outcomes
    pub p1_wins: u64,
    pub p2_wins: u64,
    pub draws: u64,

    /// Sibling moves skipped after a winning move was found
    pub branches_pruned: u64,

    /// Deepest recursion reached (1 = the root position)
    pub max_depth: u32,

    start_time: Instant,
}

impl SearchStats {
    pub fn new() -> Self {
        Self {
            nodes_searched: 0,
            candidates: 0,
            cache_hits: 0,
            terminal_positions: 0,
            p1_wins: 0,
            p2_wins: 0,
            draws: 0,
            branches_pruned: 0,
            max_depth: 0,
            start_time: Instant::now(),
        }
    }

    /// Record a decided outcome reached by a candidate move
    pub fn record_terminal(&mut self, outcome: Outcome) {
        self.terminal_positions += 1;
        match outcome {
            Outcome::Win(Player::One) => self.p1_wins += 1,
            Outcome::Win(Player::Two) => self.p2_wins += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::Undecided => {}
        }
    }

    /// Nodes per second since the session started
    pub fn nodes_per_sec(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.nodes_searched as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Share of candidate moves skipped by the winning-move cutoff
    pub fn pruned_pct(&self) -> f64 {
        let total = self.candidates + self.branches_pruned;
        if total > 0 {
            100.0 * self.branches_pruned as f64 / total as f64
        } else {
            0.0
        }
    }

    /// Emit a one-line summary through the `log` facade
    pub fn log_summary(&self, table_size: usize) {
        log::info!(
            "nodes={} unique={} cache_hits={} rate={:.0}/s depth={} pruned={:.1}%",
            self.nodes_searched,
            table_size,
            self.cache_hits,
            self.nodes_per_sec(),
            self.max_depth,
            self.pruned_pct(),
        );
        log::info!(
            "terminals: p1={} p2={} draw={}",
            self.p1_wins,
            self.p2_wins,
            self.draws
        );
    }

    /// Print final summary
    pub fn print_summary(&self) {
        println!("Nodes searched: {}", self.nodes_searched);
        println!("Candidate moves: {}", self.candidates);
        println!("Cache hits: {}", self.cache_hits);
        println!("Terminal positions: {}", self.terminal_positions);
        println!("  - P1 wins: {}", self.p1_wins);
        println!("  - P2 wins: {}", self.p2_wins);
        println!("  - Draws: {}", self.draws);
        println!("Max depth: {}", self.max_depth);
        println!("Branches pruned: {} ({:.1}%)", self.branches_pruned, self.pruned_pct());
        println!("Average rate: {:.0} nodes/sec", self.nodes_per_sec());
    }
}

impl Default for SearchStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_terminal() {
        let mut stats = SearchStats::new();
        stats.record_terminal(Outcome::Win(Player::One));
        stats.record_terminal(Outcome::Win(Player::Two));
        stats.record_terminal(Outcome::Draw);
        stats.record_terminal(Outcome::Draw);
        assert_eq!(stats.terminal_positions, 4);
        assert_eq!((stats.p1_wins, stats.p2_wins, stats.draws), (1, 1, 2));
    }

    #[test]
    fn test_pruned_pct() {
        let mut stats = SearchStats::new();
        assert_eq!(stats.pruned_pct(), 0.0);
        stats.candidates = 3;
        stats.branches_pruned = 1;
        assert!((stats.pruned_pct() - 25.0).abs() < 1e-9);

        // Expanded nodes are not candidates; the root alone adds nothing.
        stats.nodes_searched = 100;
        assert!((stats.pruned_pct() - 25.0).abs() < 1e-9);
    }
}
