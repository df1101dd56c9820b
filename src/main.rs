use clap::Parser;
use log::info;
use traffic_toolkit::cgmath::InnerSpace;
use traffic_toolkit::math::{OrientedBox, Point2d, Vector2d};
use traffic_toolkit::{
    ControllerId, DayNightNotifier, SignalAttributes, SignalGroupAttributes, SimConfig,
    Simulation, SourceAttributes, SpawnMode, WeightedPath,
};

/// Half the distance between the centre lines of opposing lanes, in m.
const LANE_OFFSET: f64 = 2.0;

/// How far each approach reaches from the centre of the crossroad, in m.
const APPROACH_LEN: f64 = 100.0;

#[derive(Parser)]
#[command(name = "traffic-toolkit")]
#[command(about = "Runs a headless signalised crossroad scenario")]
struct Cli {
    /// JSON simulation config; defaults are used for anything missing
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Simulated duration in seconds
    #[arg(long)]
    duration: Option<f64>,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Spawn scheduler mode: "periodic" or "random"
    #[arg(long)]
    mode: Option<String>,
}

fn main() -> traffic_toolkit::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(duration) = cli.duration {
        config.duration = duration;
    }
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(mode) = &cli.mode {
        config.spawn_mode = mode.parse::<SpawnMode>()?;
    }
    config.validate()?;

    let mut sim = Simulation::from_config(&config);
    let controller = build_crossroad(&mut sim, &config)?;

    info!(
        "Running {:?} spawning for {} s with a {} s step",
        config.spawn_mode, config.duration, config.time_step
    );
    let steps = (config.duration / config.time_step).ceil() as usize;
    let report_every = (1.0 / config.time_step).round().max(1.0) as usize;
    for step in 0..steps {
        sim.step(config.time_step);
        if step % report_every == 0 {
            let green = sim
                .get_controller(controller)
                .and_then(|c| c.current_group())
                .and_then(|group| sim.get_signal_group(group))
                .map_or("none", |group| group.name());
            info!(
                "t = {:.1} s: {} vehicles, green: {}",
                sim.time(),
                sim.iter_vehicles().count(),
                green
            );
        }
    }

    let stats = sim.stats();
    println!(
        "Simulated {:.1} s over {} frames: {} spawned, {} completed, {} still driving",
        sim.time(),
        sim.frame(),
        stats.spawned,
        stats.completed,
        sim.iter_vehicles().count()
    );
    Ok(())
}

/// Builds a four-way crossroad with one critical zone in the middle, a signal
/// on every approach, and a source at the far end of every approach.
fn build_crossroad(sim: &mut Simulation, config: &SimConfig) -> traffic_toolkit::Result<ControllerId> {
    let centre = OrientedBox::axis_aligned(Point2d::new(0.0, 0.0), 6.0, 6.0);
    sim.add_zone(centre);

    let mut notifier = DayNightNotifier::default();
    let mut group_signals = [vec![], vec![]];

    // Eastbound, northbound, westbound and southbound approaches
    let headings = [
        Vector2d::new(1.0, 0.0),
        Vector2d::new(0.0, 1.0),
        Vector2d::new(-1.0, 0.0),
        Vector2d::new(0.0, -1.0),
    ];
    let mut straights = vec![];

    for (idx, dir) in headings.into_iter().enumerate() {
        // The lane keeps to the right of the road's centre line
        let right = Vector2d::new(dir.y, -dir.x);
        let start = Point2d::new(0.0, 0.0) - dir * APPROACH_LEN + right * LANE_OFFSET;
        let end = Point2d::new(0.0, 0.0) + dir * APPROACH_LEN + right * LANE_OFFSET;
        let straight = sim.add_path_through(&[start, end])?;

        // Vehicles leave a little before the end of the outgoing lane
        sim.add_sink(OrientedBox::new(end - dir * 5.0, dir, 2.0, 3.0));

        // Right turn onto the crossing road
        let exit_dir = right;
        let exit_right = Vector2d::new(exit_dir.y, -exit_dir.x);
        let turn = sim.add_path_through(&[
            start,
            Point2d::new(0.0, 0.0) - dir * 10.0 + right * LANE_OFFSET,
            Point2d::new(0.0, 0.0) - dir * 4.0 + right * 4.0,
            Point2d::new(0.0, 0.0) + exit_dir * 10.0 + exit_right * LANE_OFFSET,
            Point2d::new(0.0, 0.0) + exit_dir * APPROACH_LEN + exit_right * LANE_OFFSET,
        ])?;
        sim.relate_paths(straight, turn);
        straights.push(straight);

        let stop_line = Point2d::new(0.0, 0.0) - dir * 9.0 + right * LANE_OFFSET;
        let signal = sim.add_signal(&SignalAttributes::new(OrientedBox::new(
            stop_line,
            dir,
            0.5,
            1.5,
        )));
        group_signals[idx % 2].push(signal);

        let paths = [WeightedPath::new(straight, 0.8), WeightedPath::new(turn, 0.2)];
        let source = sim.add_source(&SourceAttributes::new(start, dir.normalize(), &paths));
        notifier.register(source);
    }

    // Opposing straight movements do not cross
    sim.relate_paths(straights[0], straights[2]);
    sim.relate_paths(straights[1], straights[3]);

    let east_west = sim.add_signal_group(&SignalGroupAttributes {
        state_change_time: 15.0,
        ..SignalGroupAttributes::new("east-west", &group_signals[0])
    });
    let north_south = sim.add_signal_group(&SignalGroupAttributes {
        state_change_time: 10.0,
        ..SignalGroupAttributes::new("north-south", &group_signals[1])
    });
    let controller = sim.add_signal_controller(&[east_west, north_south], config.signal_clearance);

    sim.register_all_sources();
    notifier.apply(sim, config.day_time);
    Ok(controller)
}
