//! Headless runner: generates the startup map, puts two trains on the seed
//! network and runs the simulation without a frontend.
//!
//! ```text
//! headless [--ticks N] [--seed S] [--config sim.json]
//! ```
//!
//! Log output is controlled with `RUST_LOG` (default `info`). The final
//! snapshot is printed to stdout as JSON.

use anyhow::{bail, Context};
use env_logger::{Builder, Env};
use hex_trainz::{EditorCommand, HexCoord, SimConfig, Simulation, TileId};

/// Ticks to run when `--ticks` is not given.
const DEFAULT_TICKS: u64 = 600;

/// Snapshot log interval in ticks.
const REPORT_INTERVAL: u64 = 100;

struct Args {
    ticks: u64,
    seed: Option<u64>,
    config: Option<String>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        ticks: DEFAULT_TICKS,
        seed: None,
        config: None,
    };

    let mut it = std::env::args().skip(1);
    while let Some(flag) = it.next() {
        let mut value = || it.next().with_context(|| format!("{flag} needs a value"));
        match flag.as_str() {
            "--ticks" => args.ticks = value()?.parse().context("--ticks must be a number")?,
            "--seed" => args.seed = Some(value()?.parse().context("--seed must be a number")?),
            "--config" => args.config = Some(value()?),
            other => bail!("unknown argument: {other}"),
        }
    }
    Ok(args)
}

fn load_config(args: &Args) -> anyhow::Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {path}"))?;
            serde_json::from_str::<SimConfig>(&text)
                .with_context(|| format!("parsing config file {path}"))?
        }
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.generator.seed = seed;
    }
    Ok(config)
}

fn tile(sim: &Simulation, x: i32, y: i32) -> anyhow::Result<TileId> {
    sim.map()
        .tile_at(HexCoord::new(x, y))
        .with_context(|| format!("seed network has no tile at ({x}, {y})"))
}

fn spawn(sim: &mut Simulation, at: TileId, from: TileId, target: TileId) -> anyhow::Result<()> {
    let outcome = sim.apply_command(EditorCommand::SpawnTrain {
        tile: at,
        last_tile: from,
    });
    let train = outcome
        .train_id()
        .with_context(|| format!("spawning train failed: {outcome:?}"))?;
    sim.apply_command(EditorCommand::AddWaypoint {
        train,
        tile: target,
    });
    Ok(())
}

fn main() -> anyhow::Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = parse_args()?;
    let config = load_config(&args)?;
    let mut sim = Simulation::generated(config);

    // One train down the eastern branch, one down the southern line
    let (a, b, c) = (tile(&sim, 1, 0)?, tile(&sim, 2, 0)?, tile(&sim, 6, 1)?);
    spawn(&mut sim, b, a, c)?;
    let (a, b, c) = (tile(&sim, 0, 1)?, tile(&sim, 0, 2)?, tile(&sim, 0, 5)?);
    spawn(&mut sim, b, a, c)?;

    log::info!(
        "running {} ticks on {} tiles with {} trains",
        args.ticks,
        sim.map().len(),
        sim.train_count()
    );

    for _ in 0..args.ticks {
        sim.tick();
        if sim.tick_count() % REPORT_INTERVAL == 0 {
            for train in sim.trains() {
                log::info!(
                    "tick {}: train {} on tile {} {:?} v={:.2} reserved={}",
                    sim.tick_count(),
                    train.id(),
                    train.tile_id(),
                    train.state(),
                    train.velocity(),
                    train.reserved_path().len()
                );
            }
        }
    }

    let snapshot = serde_json::to_string_pretty(&sim.snapshot())?;
    println!("{snapshot}");
    Ok(())
}
