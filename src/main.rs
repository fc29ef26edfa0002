use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use wild_grass::{
    FileStore, GameConfig, GameSession, PlayerIntent, SceneOrchestrator, TurnRng,
};

/// Text-mode driver for Wild Grass.
#[derive(Parser, Debug)]
#[command(author, version, about = "Catch wild creatures in the tall grass", long_about = None)]
struct Args {
    /// Save file (JSON key-value store)
    #[arg(long, default_value = "wild-grass-save.json")]
    save: PathBuf,

    /// Game config in RON; built-in defaults when absent
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for every random draw, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Opponents answer immediately instead of after the pacing delay
    #[arg(long)]
    no_pacing: bool,

    /// Log filter, e.g. `info` or `wild_grass=debug`. Overrides RUST_LOG.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = match &args.log_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => GameConfig::from_file(path)?,
        None => GameConfig::default(),
    };
    if args.no_pacing {
        config.battle.pacing_delay_ms = 0;
    }
    let rng = match args.seed {
        Some(seed) => TurnRng::seeded(seed),
        None => TurnRng::new_random(),
    };
    let step_ms = config.world.step_duration_ms;
    let wait_ms = config.encounter.check_interval_ms;

    info!(save = ?args.save, seed = ?args.seed, "starting");
    let mut session = GameSession::open(config, FileStore::new(&args.save), rng)?;
    let (mut orchestrator, lines) = SceneOrchestrator::start(&mut session)?;
    print_lines(&lines);
    print!("{}", orchestrator.render(&session));

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = input.next_line().await? {
        if matches!(line.trim(), "q" | "quit") {
            break;
        }
        let intent = match line.parse::<PlayerIntent>() {
            Ok(intent) => intent,
            Err(err) => {
                println!("{}", err);
                continue;
            }
        };
        let delta_ms = match intent {
            PlayerIntent::Move(_) => step_ms,
            PlayerIntent::Wait => wait_ms,
            _ => 0,
        };
        update(&mut orchestrator, &mut session, delta_ms, Some(intent));

        // Let the opponent answer once its pacing delay has passed.
        while let Some(delay_ms) = orchestrator.pending_delay(&session) {
            if delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
            update(&mut orchestrator, &mut session, delay_ms, None);
        }

        print!("{}", orchestrator.render(&session));
    }

    info!("goodbye");
    Ok(())
}

/// Run one orchestrator update. A failed save is reported and play continues
/// with the in-memory state.
fn update(
    orchestrator: &mut SceneOrchestrator,
    session: &mut GameSession<FileStore>,
    delta_ms: u64,
    intent: Option<PlayerIntent>,
) {
    match orchestrator.update(session, delta_ms, intent) {
        Ok(lines) => print_lines(&lines),
        Err(err) => {
            error!(error = %err, "save failed");
            println!("Could not save progress: {}", err);
        }
    }
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}
