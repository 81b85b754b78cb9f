//! Weiqi-Rust: command line driver.
//!
//! ## Usage
//!
//! - `weiqi-rust` - Show a demo
//! - `weiqi-rust demo` - Search one position and print the result
//! - `weiqi-rust match` - Let a rollout search play a random player
//! - `weiqi-rust selfplay` - Generate self-play examples

use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use flexi_logger::Logger;

use weiqi_rust::board::{Color, vertex_string};
use weiqi_rust::constants::{
    C_PUCT, DEFAULT_BOARD_SIZE, DEFAULT_KOMI, N_PLAYOUT_ROLLOUT, ROLLOUT_LIMIT, STANDARD_SIZES,
};
use weiqi_rust::evaluator::UniformEvaluator;
use weiqi_rust::game::Game;
use weiqi_rust::mcts::MctsConfig;
use weiqi_rust::player::{Decision, EvaluatorPlayer, MctsPlayer, Player, RandomPlayer};
use weiqi_rust::playout::RolloutEvaluator;
use weiqi_rust::selfplay::{SelfPlayConfig, augment, self_play_game};
use weiqi_rust::worker::{SearchEvent, SearchWorker};

/// Weiqi-Rust: Go rules and PUCT search
#[derive(Parser)]
#[command(name = "weiqi-rust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone)]
struct CommonArgs {
    /// Board size (2 to 19)
    #[arg(long, default_value_t = DEFAULT_BOARD_SIZE, global = true)]
    size: usize,

    #[arg(long, default_value_t = DEFAULT_KOMI, global = true)]
    komi: f32,

    /// Playouts per move
    #[arg(long, default_value_t = N_PLAYOUT_ROLLOUT, global = true)]
    playouts: usize,

    #[arg(long, default_value_t = C_PUCT, global = true)]
    c_puct: f64,

    /// Seed for every random choice
    #[arg(long, global = true)]
    seed: Option<u64>,
}

impl CommonArgs {
    fn config(&self) -> MctsConfig {
        MctsConfig {
            c_puct: self.c_puct,
            n_playout: self.playouts,
        }
    }

    fn rng(&self) -> fastrand::Rng {
        self.seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Search the empty board on a worker thread and print the chosen move
    Demo,
    /// Play a rollout search engine (black) against a random player (white)
    Match {
        #[arg(long, default_value_t = 1)]
        games: usize,
    },
    /// Generate self-play games with a uniform evaluator
    Selfplay {
        #[arg(long, default_value_t = 1)]
        games: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let _logger = Logger::try_with_env_or_str("info")?
        .format(flexi_logger::colored_default_format)
        .start()?;

    let cli = Cli::parse();
    if !STANDARD_SIZES.contains(&cli.common.size) {
        log::warn!("board size {} is not one of {STANDARD_SIZES:?}", cli.common.size);
    }

    match cli.command {
        Some(Commands::Match { games }) => run_match(&cli.common, games),
        Some(Commands::Selfplay { games }) => run_selfplay(&cli.common, games),
        Some(Commands::Demo) | None => run_demo(&cli.common),
    }
}

fn run_demo(args: &CommonArgs) -> anyhow::Result<()> {
    println!("Weiqi-Rust: Go rules and PUCT search\n");

    let game = Game::new(args.size, args.komi)?;
    println!("{}\n", game.position());

    let evaluator = match args.seed {
        Some(seed) => RolloutEvaluator::with_seed(seed),
        None => RolloutEvaluator::new(),
    };
    let worker = SearchWorker::spawn(evaluator, args.config());
    worker.start_search(game.simulator())?;

    let event = loop {
        if let Some(event) = worker
            .recv_timeout(Duration::from_millis(200))
            .context("search worker died")?
        {
            break event;
        }
        let (completed, total) = worker.progress();
        println!("searching... {completed}/{total}");
    };

    match event {
        SearchEvent::Move(action) => println!("Best move: {}", vertex_string(action, args.size)),
        SearchEvent::Aborted { completed, total } => {
            println!("Search cancelled after {completed}/{total} playouts")
        }
        SearchEvent::Failed(err) => bail!(err),
    }
    Ok(())
}

fn run_match(args: &CommonArgs, games: usize) -> anyhow::Result<()> {
    let mut rng = args.rng();
    let mut black_wins = 0;

    for index in 0..games {
        let mut players = [
            Player::TreeSearch(MctsPlayer::new(
                RolloutEvaluator::with_rng(rng.fork(), ROLLOUT_LIMIT),
                args.config(),
            )),
            Player::UniformRandom(RandomPlayer::new(rng.fork())),
        ];
        let mut game = Game::new(args.size, args.komi)?;

        while !game.is_over() {
            let player = &mut players[game.turn().index()];
            match player.get_action(&game)? {
                Decision::Play(action) => {
                    game.play(action)
                        .with_context(|| format!("{} played an illegal move", player.name()))?;
                }
                Decision::AwaitInput | Decision::Aborted { .. } => {
                    bail!("{} did not produce a move", player.name())
                }
            }
        }

        let (black, white) = game.areas();
        let winner = game.winner();
        if winner == Some(Color::Black) {
            black_wins += 1;
        }
        println!("{}", game.position());
        println!(
            "game {}: {} moves, black {black} white {white}, winner {}",
            index + 1,
            game.moves().len(),
            winner.map_or("none".to_string(), |c| c.to_string())
        );
    }

    println!("mcts (black) won {black_wins} of {games}");
    Ok(())
}

fn run_selfplay(args: &CommonArgs, games: usize) -> anyhow::Result<()> {
    let mut player = EvaluatorPlayer::new(Box::new(UniformEvaluator), args.config(), args.rng())
        .self_play(true)
        .temperature(1.0);
    let config = SelfPlayConfig::new(args.size, args.komi);
    let mut total = 0;

    for index in 0..games {
        let Some(record) = self_play_game(&mut player, &config)?.completed() else {
            bail!("self-play search was cancelled");
        };
        let examples = augment(&record.examples, args.size);
        total += examples.len();
        println!(
            "game {}: {} moves, {:?}, {} examples",
            index + 1,
            record.moves.len(),
            record.outcome,
            examples.len()
        );
    }

    println!("{total} augmented examples");
    Ok(())
}
