#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line runner for the Warden tower-defense engine.
//!
//! The runner loads a level, optional rules and an optional saved session,
//! performs scripted builds through the builder system, then drives the world
//! on a fixed frame until the requested time elapses or the session ends.

mod session_transfer;

use std::{fs, path::PathBuf, str::FromStr, time::Duration};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use warden_core::{
    CellCoord, Command, Event, HeroUpgrades, HudSnapshot, SessionSnapshot, TowerKind, UpgradeTrack,
};
use warden_system_builder::{Builder, BuilderInput, PlacementPreview};
use warden_world::{apply, query, step, GridMap, SimConfig, World};

/// Command-line arguments accepted by the runner.
#[derive(Debug, Parser)]
#[command(name = "warden", about = "Run a Warden level headlessly")]
struct Args {
    /// Level definition in JSON.
    #[arg(long)]
    level: PathBuf,
    /// Session rules in TOML; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Saved session to resume, as JSON or a transfer string.
    #[arg(long)]
    session: Option<PathBuf>,
    /// Towers to build before the first frame, as `kind@column,row`.
    #[arg(long = "build", value_name = "KIND@COLUMN,ROW")]
    builds: Vec<BuildOrder>,
    /// Cells whose towers are upgraded once after the builds.
    #[arg(long = "upgrade", value_name = "COLUMN,ROW", value_parser = parse_cell)]
    upgrades: Vec<CellCoord>,
    /// Hero upgrade tracks to buy with banked upgrade experience.
    #[arg(long = "buy", value_name = "TRACK", value_parser = parse_track)]
    purchases: Vec<UpgradeTrack>,
    /// Seconds of real time to simulate.
    #[arg(long, default_value_t = 120.0)]
    seconds: f32,
    /// Length of one frame in milliseconds.
    #[arg(long, default_value_t = 50)]
    frame_ms: u64,
    /// Multiplier applied to every frame.
    #[arg(long, default_value_t = 1.0)]
    time_scale: f32,
    /// Skip every countdown between waves.
    #[arg(long)]
    rush: bool,
    /// File that receives the session JSON when the run stops between waves.
    #[arg(long)]
    save: Option<PathBuf>,
    /// Print the session transfer string when the run stops between waves.
    #[arg(long)]
    print_transfer: bool,
}

/// Scripted tower placement.
#[derive(Clone, Copy, Debug, PartialEq)]
struct BuildOrder {
    kind: TowerKind,
    cell: CellCoord,
}

impl FromStr for BuildOrder {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (kind, cell) = value
            .split_once('@')
            .ok_or_else(|| format!("expected KIND@COLUMN,ROW, got '{value}'"))?;
        Ok(Self {
            kind: parse_kind(kind)?,
            cell: parse_cell(cell)?,
        })
    }
}

fn parse_kind(value: &str) -> Result<TowerKind, String> {
    TowerKind::ALL
        .into_iter()
        .find(|kind| format!("{kind:?}").eq_ignore_ascii_case(value.trim()))
        .ok_or_else(|| format!("unknown tower kind '{value}'"))
}

fn parse_track(value: &str) -> Result<UpgradeTrack, String> {
    let wanted: String = value
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .collect();
    UpgradeTrack::ALL
        .into_iter()
        .find(|track| format!("{track:?}").eq_ignore_ascii_case(&wanted))
        .ok_or_else(|| format!("unknown upgrade track '{value}'"))
}

fn parse_cell(value: &str) -> Result<CellCoord, String> {
    let (column, row) = value
        .split_once(',')
        .ok_or_else(|| format!("expected COLUMN,ROW, got '{value}'"))?;
    let column = column
        .trim()
        .parse::<i32>()
        .map_err(|error| format!("invalid column '{column}': {error}"))?;
    let row = row
        .trim()
        .parse::<i32>()
        .map_err(|error| format!("invalid row '{row}': {error}"))?;
    Ok(CellCoord::new(column, row))
}

/// Frame-level totals the world does not keep itself.
#[derive(Clone, Copy, Debug, Default)]
struct RunTally {
    frames: u64,
    escapes: u32,
    towers_lost: u32,
}

impl RunTally {
    fn record(&mut self, events: &[Event]) {
        self.frames += 1;
        for event in events {
            match event {
                Event::EnemyEscaped { .. } => self.escapes += 1,
                Event::TowerDestroyed { .. } => self.towers_lost += 1,
                Event::WaveStarted { wave, boss } => info!(wave, boss, "wave underway"),
                Event::Victory => info!("all waves cleared"),
                Event::Defeat => info!("the defences fell"),
                _ => {}
            }
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if args.frame_ms == 0 {
        return Err(anyhow!("--frame-ms must be positive"));
    }

    let map = load_level(&args.level)?;
    let config = load_config(args.config.as_ref())?;
    let mut world = match &args.session {
        Some(path) => {
            let snapshot = load_session(path)?;
            World::from_session(map, config, &snapshot)
                .with_context(|| format!("restoring session from {}", path.display()))?
        }
        None => World::new(map, config),
    };

    let mut events = Vec::new();
    if args.time_scale != 1.0 {
        apply(
            &mut world,
            Command::SetTimeScale {
                scale: args.time_scale,
            },
            &mut events,
        );
    }
    for track in &args.purchases {
        apply(
            &mut world,
            Command::PurchaseHeroUpgrade { track: *track },
            &mut events,
        );
    }
    let mut builder = Builder::new();
    run_builds(&mut world, &mut builder, &args, &mut events);
    report_setup_events(&events);

    let frame = Duration::from_millis(args.frame_ms);
    let millis = f64::from(args.seconds.max(0.0)) * 1_000.0;
    let frames = (millis / args.frame_ms as f64).ceil() as u64;
    let mut tally = RunTally::default();
    for _ in 0..frames {
        if args.rush {
            apply(&mut world, Command::StartNextWave, &mut events);
        }
        let frame_events = step(&mut world, frame);
        tally.record(&frame_events);
        if query::outcome(&world).is_some() {
            break;
        }
    }

    print_summary(&query::hud(&world), &query::hero_upgrades(&world), &tally);
    persist(&world, &args)
}

fn load_level(path: &PathBuf) -> Result<GridMap> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("reading level from {}", path.display()))?;
    GridMap::from_json(&json).with_context(|| format!("parsing level {}", path.display()))
}

fn load_config(path: Option<&PathBuf>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn load_session(path: &PathBuf) -> Result<SessionSnapshot> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading session from {}", path.display()))?;
    if session_transfer::is_transfer_string(&text) {
        return session_transfer::decode(&text)
            .with_context(|| format!("decoding session string in {}", path.display()));
    }
    serde_json::from_str(&text).with_context(|| format!("parsing session {}", path.display()))
}

fn run_builds(world: &mut World, builder: &mut Builder, args: &Args, events: &mut Vec<Event>) {
    let mut commands = Vec::new();
    for order in &args.builds {
        let preview = PlacementPreview::new(
            order.kind,
            order.cell,
            query::can_place_tower(world, order.cell),
        );
        let input = BuilderInput {
            confirm_action: true,
            cursor_cell: Some(order.cell),
            ..BuilderInput::default()
        };
        builder.handle(
            events.as_slice(),
            Some(preview),
            input,
            |cell| query::tower_at(world, cell),
            &mut commands,
        );
        if commands.is_empty() {
            warn!(kind = ?order.kind, cell = ?order.cell, "build skipped, cell is not placeable");
        }
        for command in commands.drain(..) {
            apply(world, command, events);
        }
    }

    for cell in &args.upgrades {
        let input = BuilderInput {
            upgrade_action: true,
            cursor_cell: Some(*cell),
            ..BuilderInput::default()
        };
        builder.handle(
            events.as_slice(),
            None,
            input,
            |cell| query::tower_at(world, cell),
            &mut commands,
        );
        if commands.is_empty() {
            warn!(cell = ?cell, "upgrade skipped, no tower on the cell");
        }
        for command in commands.drain(..) {
            apply(world, command, events);
        }
    }
}

fn report_setup_events(events: &[Event]) {
    for event in events {
        match event {
            Event::TowerPlacementRejected { kind, cell, reason } => {
                warn!(?kind, ?cell, ?reason, "placement rejected");
            }
            Event::TowerCommandRejected { tower, reason } => {
                warn!(?tower, ?reason, "tower command rejected");
            }
            Event::HeroUpgradeRejected { track, reason } => {
                warn!(?track, ?reason, "hero upgrade rejected");
            }
            Event::HeroUpgradePurchased { track, level, cost } => {
                info!(?track, level, cost, "hero upgrade bought");
            }
            _ => {}
        }
    }
}

fn print_summary(hud: &HudSnapshot, upgrades: &HeroUpgrades, tally: &RunTally) {
    let stats = &hud.stats;
    println!("frames simulated : {}", tally.frames);
    println!("wave             : {}/{}", hud.wave, hud.total_waves);
    println!("gold             : {}", hud.gold);
    println!("lives            : {}", hud.lives);
    println!(
        "hero             : level {} ({}/{} xp)",
        hud.hero_level, hud.hero_xp, hud.hero_xp_to_next
    );
    println!("hero deaths      : {}", stats.hero_deaths);
    println!("enemies killed   : {} ({} bosses)", stats.total_kills, stats.boss_kills);
    println!("enemies escaped  : {}", tally.escapes);
    println!("gold flow        : {} earned, {} spent", stats.gold_earned, stats.gold_spent);
    println!(
        "towers           : {} built, {} sold, {} lost",
        stats.towers_built, stats.towers_sold, tally.towers_lost
    );
    let levels: Vec<String> = UpgradeTrack::ALL
        .into_iter()
        .map(|track| format!("{track:?} {}", upgrades.level(track)))
        .collect();
    println!("hero upgrades    : {}", levels.join(", "));
    println!("upgrade xp       : {}", hud.upgrade_xp);
    match hud.outcome {
        Some(outcome) => println!("outcome          : {outcome:?}"),
        None if hud.wave_active => {
            println!("outcome          : wave in progress ({} alive)", hud.live_enemies);
        }
        None => println!("outcome          : between waves"),
    }
}

fn persist(world: &World, args: &Args) -> Result<()> {
    if args.save.is_none() && !args.print_transfer {
        return Ok(());
    }
    let Some(snapshot) = query::session_snapshot(world) else {
        warn!("session can only be saved between waves of an unfinished run");
        return Ok(());
    };

    if let Some(path) = &args.save {
        let json = serde_json::to_string_pretty(&snapshot).context("serializing session")?;
        fs::write(path, json).with_context(|| format!("writing session to {}", path.display()))?;
        info!(path = %path.display(), wave = snapshot.wave, "session saved");
    }
    if args.print_transfer {
        let encoded = session_transfer::encode(&snapshot).context("encoding session string")?;
        println!("{encoded}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_orders_parse_kind_and_cell() {
        let order: BuildOrder = "cannon@4,2".parse().expect("valid order");
        assert_eq!(order.kind, TowerKind::Cannon);
        assert_eq!(order.cell, CellCoord::new(4, 2));

        let order: BuildOrder = "Laser@ 7 , 1".parse().expect("valid order");
        assert_eq!(order.kind, TowerKind::Laser);
        assert_eq!(order.cell, CellCoord::new(7, 1));
    }

    #[test]
    fn malformed_build_orders_are_rejected() {
        assert!("arrow".parse::<BuildOrder>().is_err());
        assert!("mortar@1,1".parse::<BuildOrder>().is_err());
        assert!("arrow@1".parse::<BuildOrder>().is_err());
        assert!("arrow@x,1".parse::<BuildOrder>().is_err());
    }

    #[test]
    fn arguments_accept_repeated_builds() {
        let args = Args::try_parse_from([
            "warden",
            "--level",
            "levels/meadow.json",
            "--build",
            "arrow@1,1",
            "--build",
            "ice@2,1",
            "--upgrade",
            "1,1",
            "--buy",
            "max-hp",
            "--buy",
            "attack_speed",
            "--rush",
        ])
        .expect("valid arguments");
        assert_eq!(args.builds.len(), 2);
        assert_eq!(args.upgrades, vec![CellCoord::new(1, 1)]);
        assert_eq!(args.purchases, vec![UpgradeTrack::MaxHp, UpgradeTrack::AttackSpeed]);
        assert!(args.rush);
        assert_eq!(args.frame_ms, 50);
    }

    #[test]
    fn unknown_upgrade_tracks_are_rejected() {
        assert_eq!(parse_track("Magnet"), Ok(UpgradeTrack::Magnet));
        assert!(parse_track("armor").is_err());
    }

    #[test]
    fn tally_counts_frame_events() {
        let mut tally = RunTally::default();
        tally.record(&[
            Event::GoldCollected {
                amount: 12,
                total: 40,
            },
            Event::Victory,
        ]);
        tally.record(&[]);
        assert_eq!(tally.frames, 2);
        assert_eq!(tally.escapes, 0);
        assert_eq!(tally.towers_lost, 0);
    }
}
