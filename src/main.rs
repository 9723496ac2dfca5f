//! CLI entry point for the 8-puzzle solver.
//!
//! Usage:
//!   eight-puzzle shuffle [--depth <n>] [--seed <n>]
//!   eight-puzzle validate <board> [--allow-unsolvable]
//!   eight-puzzle solve <board> [options]
//!   eight-puzzle solve --stdin [options]
//!   eight-puzzle compare [<board>] [--depth <n>] [--seed <n>]
//!
//! Boards are written as `1,2,3,4,5,6,7,0,8` or `123456708`. Results are
//! printed as JSON on stdout; logs go to stderr (set `RUST_LOG=debug`).

use std::io::{self, Read};
use std::process;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;

use eight_puzzle::api::{self, SolveRequest, DEFAULT_SHUFFLE_DEPTH};
use eight_puzzle::solver::{self, DEFAULT_DEPTH_LIMIT};
use eight_puzzle::{Algorithm, Board, HeuristicKind, PuzzleError, SearchResult, SolverConfig, GOAL};

#[derive(Parser)]
#[command(name = "eight-puzzle")]
#[command(about = "Optimal 8-puzzle solver (A*, BFS, depth-limited DFS)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a solvable, non-goal start board
    Shuffle {
        /// Number of random blank moves away from the goal
        #[arg(long, default_value_t = DEFAULT_SHUFFLE_DEPTH)]
        depth: usize,

        /// Seed for a reproducible walk
        #[arg(long)]
        seed: Option<u64>,

        /// Also print the board as a grid on stderr
        #[arg(long)]
        pretty: bool,
    },

    /// Check that a board is a permutation of 0..8 (and solvable)
    Validate {
        #[arg(value_name = "BOARD")]
        board: String,

        /// Skip the parity check
        #[arg(long)]
        allow_unsolvable: bool,
    },

    /// Solve a board
    Solve {
        #[arg(value_name = "BOARD")]
        board: Option<String>,

        /// Read a JSON solve request from stdin instead
        #[arg(long)]
        stdin: bool,

        /// astar, bfs or dfs
        #[arg(long, default_value = "astar")]
        algo: Algorithm,

        /// manhattan, misplaced or manhattan_linear_conflict (A* only)
        #[arg(long, default_value = "manhattan")]
        heuristic: HeuristicKind,

        /// Depth limit (DFS only)
        #[arg(long, default_value_t = DEFAULT_DEPTH_LIMIT)]
        depth_limit: usize,

        /// Abort after this many expansions
        #[arg(long)]
        max_expansions: Option<usize>,

        /// Abort after this many milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Also print every state as a grid on stderr
        #[arg(long)]
        pretty: bool,
    },

    /// Run every algorithm on the same start and report cost and effort
    Compare {
        /// Start board (generated when omitted)
        #[arg(value_name = "BOARD")]
        board: Option<String>,

        #[arg(long, default_value_t = DEFAULT_SHUFFLE_DEPTH)]
        depth: usize,

        #[arg(long)]
        seed: Option<u64>,

        /// Depth limit for the DFS run
        #[arg(long, default_value_t = DEFAULT_DEPTH_LIMIT)]
        depth_limit: usize,
    },
}

#[derive(Debug, Serialize)]
struct ShuffleOutput {
    state: Board,
}

#[derive(Debug, Serialize)]
struct ErrorOutput {
    kind: &'static str,
    error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ComparisonRow {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    cost: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expanded: Option<usize>,
    time_elapsed_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ComparisonOutput {
    start: Board,
    runs: Vec<ComparisonRow>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(2);
        }
    }
}

fn run(command: Commands) -> anyhow::Result<i32> {
    match command {
        Commands::Shuffle { depth, seed, pretty } => {
            let board = api::generate_start(depth, seed);
            if pretty {
                eprint!("{}", board);
            }
            print_json(&ShuffleOutput { state: board })?;
            Ok(0)
        }

        Commands::Validate {
            board,
            allow_unsolvable,
        } => {
            let validation = match parse_values(&board) {
                Ok(values) => api::validate(&values, !allow_unsolvable),
                Err(e) => api::Validation {
                    ok: false,
                    error: Some(e.to_string()),
                },
            };
            print_json(&validation)?;
            Ok(if validation.ok { 0 } else { 1 })
        }

        Commands::Solve {
            board,
            stdin,
            algo,
            heuristic,
            depth_limit,
            max_expansions,
            timeout_ms,
            pretty,
        } => {
            let request = if stdin {
                let mut buffer = String::new();
                io::stdin()
                    .read_to_string(&mut buffer)
                    .context("failed to read from stdin")?;
                serde_json::from_str::<SolveRequest>(&buffer)
                    .context("failed to parse solve request JSON")?
            } else if let Some(board) = board {
                match parse_values(&board) {
                    Ok(start) => SolveRequest {
                        start,
                        algorithm: algo,
                        heuristic,
                        depth_limit,
                    },
                    Err(e) => return report_error(&e),
                }
            } else {
                bail!("must provide either a board or --stdin");
            };

            let config = SolverConfig {
                max_expansions,
                timeout: timeout_ms.map(Duration::from_millis),
            };

            match api::solve_request(&request, &config) {
                Ok(result) => {
                    if pretty {
                        print_states(&result);
                    }
                    print_json(&result)?;
                    Ok(0)
                }
                Err(e) => report_error(&e),
            }
        }

        Commands::Compare {
            board,
            depth,
            seed,
            depth_limit,
        } => {
            let start = match board {
                Some(board) => match parse_values(&board).and_then(|v| api::check(&v, true)) {
                    Ok(start) => start,
                    Err(e) => return report_error(&e),
                },
                None => api::generate_start(depth, seed),
            };
            info!("comparing algorithms on {:?}", start.tiles());
            print_json(&compare(start, depth_limit))?;
            Ok(0)
        }
    }
}

fn compare(start: Board, depth_limit: usize) -> ComparisonOutput {
    let unbounded = SolverConfig::unbounded();
    let mut runs = Vec::new();

    for heuristic in [HeuristicKind::Manhattan, HeuristicKind::ManhattanLinearConflict] {
        runs.push(timed(format!("astar/{}", heuristic), || {
            solver::astar(start, GOAL, heuristic, &unbounded)
        }));
    }
    runs.push(timed("bfs".to_string(), || solver::bfs(start, GOAL, &unbounded)));
    runs.push(timed(format!("dfs/limit={}", depth_limit), || {
        solver::dfs(start, GOAL, depth_limit, &unbounded)
    }));

    ComparisonOutput { start, runs }
}

fn timed<F>(name: String, run: F) -> ComparisonRow
where
    F: FnOnce() -> Result<SearchResult, PuzzleError>,
{
    let started = Instant::now();
    let outcome = run();
    let time_elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

    match outcome {
        Ok(result) => ComparisonRow {
            name,
            cost: Some(result.cost),
            expanded: Some(result.expanded),
            time_elapsed_ms,
            error: None,
        },
        Err(e) => ComparisonRow {
            name,
            cost: None,
            expanded: None,
            time_elapsed_ms,
            error: Some(e.to_string()),
        },
    }
}

/// Parse a board argument into raw integers; validation happens in `api`.
fn parse_values(s: &str) -> Result<Vec<i64>, PuzzleError> {
    s.parse::<Board>().map(|b| b.tiles().iter().map(|&t| t as i64).collect())
}

fn report_error(e: &PuzzleError) -> anyhow::Result<i32> {
    print_json(&ErrorOutput {
        kind: e.kind(),
        error: e.to_string(),
    })?;
    Ok(1)
}

fn print_states(result: &SearchResult) {
    for (step, state) in result.states.iter().enumerate() {
        eprintln!("Step {}:", step);
        eprintln!("{}", state);
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
