//! Connect Four Solver
//!
//! Replays a move string and asks the engine for the best reply.
//!
//! ```text
//! solver [--columns N] [--rows N] [--run N] [--config FILE] [--moves DIGITS]
//! ```
//!
//! `--moves` takes 1-based column digits, e.g. `--moves 4455`. Set
//! `RUST_LOG=debug` (or `trace`) for per-search logging.

use std::env;
use std::fs;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use connect4_core::{GameConfig, PackedBoard};
use connect4_solver::SearchEngine;

struct Args {
    config: GameConfig,
    moves: String,
}

fn flag_value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str> {
    args.get(i + 1)
        .map(String::as_str)
        .with_context(|| format!("{} needs a value", flag))
}

fn parse_args(args: &[String]) -> Result<Args> {
    let standard = GameConfig::standard();
    let mut columns = standard.columns();
    let mut rows = standard.rows();
    let mut run = standard.run_length();
    let mut shape_flag = None;
    let mut config_path = None;
    let mut moves = String::new();

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--columns" => columns = flag_value(args, i, flag)?.parse()?,
            "--rows" => rows = flag_value(args, i, flag)?.parse()?,
            "--run" => run = flag_value(args, i, flag)?.parse()?,
            "--moves" => moves = flag_value(args, i, flag)?.to_string(),
            "--config" => config_path = Some(flag_value(args, i, flag)?),
            other => bail!("unknown argument: {}", other),
        }
        if matches!(flag, "--columns" | "--rows" | "--run") {
            shape_flag = Some(flag);
        }
        i += 2;
    }

    let config = match (config_path, shape_flag) {
        (Some(_), Some(flag)) => bail!("--config cannot be combined with {}", flag),
        (Some(path), None) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path))?;
            serde_json::from_str(&text)
                .with_context(|| format!("failed to parse config file {}", path))?
        }
        (None, _) => GameConfig::new(columns, rows, run)?,
    };
    Ok(Args { config, moves })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let argv: Vec<String> = env::args().skip(1).collect();
    let args = parse_args(&argv)?;
    let config = args.config;

    println!("Connect Four Solver");
    println!("===================");
    println!(
        "Board: {}x{}, connect {}",
        config.columns(),
        config.rows(),
        config.run_length()
    );
    println!();

    let board = PackedBoard::from_moves(config, &args.moves)
        .with_context(|| format!("invalid move string {:?}", args.moves))?;
    println!("{}", board);
    println!();
    println!("Player {} to move", board.current_player().number());

    let mut engine = SearchEngine::new(config);
    let start = Instant::now();
    let rec = engine.recommend(&board)?;
    let elapsed = start.elapsed();

    println!("\n===================");
    println!("Search complete!");
    println!("===================");
    println!("Best column: {}", rec.column() + 1);
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!();
    engine.stats.print_summary();
    engine.stats.log_summary(engine.transposition_len());

    match rec.score {
        s if s > 0.0 => println!("\nSide to move wins with optimal play!"),
        s if s < 0.0 => println!("\nSide to move loses with optimal play."),
        _ => println!("\nGame is a draw with optimal play."),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_shape_flags() {
        let args = parse_args(&argv(&["--columns", "4", "--rows", "4", "--run", "3", "--moves", "12"]))
            .unwrap();
        assert_eq!(args.config, GameConfig::new(4, 4, 3).unwrap());
        assert_eq!(args.moves, "12");

        let args = parse_args(&[]).unwrap();
        assert_eq!(args.config, GameConfig::standard());
    }

    #[test]
    fn test_config_file_conflicts_with_shape_flags() {
        for flags in [["--rows", "4"], ["--run", "3"], ["--columns", "5"]] {
            let mut args = argv(&["--config", "board.json"]);
            args.extend(argv(&flags));
            let err = parse_args(&args).err().unwrap();
            assert!(err.to_string().contains("cannot be combined"), "{}", err);
        }

        // Order does not matter.
        let err = parse_args(&argv(&["--rows", "4", "--config", "board.json"]))
            .err()
            .unwrap();
        assert!(err.to_string().contains("--rows"), "{}", err);
    }

    #[test]
    fn test_rejects_unknown_flag() {
        assert!(parse_args(&argv(&["--depth", "3"])).is_err());
    }
}
