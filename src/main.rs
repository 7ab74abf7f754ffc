use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use voxel_navigator::pathfinding::Goal;
use voxel_navigator::simulation::NavSet;
use voxel_navigator::types::BlockPos;
use voxel_navigator::{
    BlockTable, NavigatorConfig, NavigatorPlugin, Planner, SandboxWorld, WorldHandle,
};

/// Headless sandbox demo: a flat world, one agent, one goal
#[derive(Parser, Debug)]
#[command(name = "voxel-navigator", about = "Voxel navigation demo on a sandbox world")]
struct Args {
    /// Loaded world half-extent in blocks
    #[arg(long, default_value_t = 32)]
    extent: i32,

    /// Floor height of the flat world
    #[arg(long, default_value_t = 63)]
    floor_y: i32,

    /// Goal X coordinate
    #[arg(long, default_value_t = 20)]
    goal_x: i32,

    /// Goal Z coordinate
    #[arg(long, default_value_t = 14)]
    goal_z: i32,

    /// Optional RON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Give up after this many ticks
    #[arg(long, default_value_t = 2000)]
    max_ticks: u64,
}

#[derive(Resource)]
struct DemoTarget {
    goal: BlockPos,
    max_ticks: u64,
}

#[derive(Default)]
struct DemoState {
    ticks: u64,
    goal_set: bool,
}

fn main() {
    let args = Args::parse();
    println!("🚀 Starting voxel navigator (headless sandbox demo)");

    let config = match &args.config {
        Some(path) => match NavigatorConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Could not load config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => NavigatorConfig::default(),
    };

    let mut sandbox = SandboxWorld::flat(args.extent, args.floor_y);
    sandbox.emit_initial_chunk_loads();
    let table = sandbox.table().clone();
    let goal = BlockPos::new(args.goal_x, args.floor_y + 1, args.goal_z);
    println!("🧭 Goal: {}", goal);

    App::new()
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_millis(50))),
        )
        .add_plugins(bevy::log::LogPlugin::default())
        .insert_resource(WorldHandle::new(Box::new(sandbox)))
        .insert_resource(BlockTable(table))
        .insert_resource(config)
        .insert_resource(DemoTarget {
            goal,
            max_ticks: args.max_ticks,
        })
        .add_plugins(NavigatorPlugin)
        .add_systems(Update, demo_driver.after(NavSet::Controls))
        .run();
}

/// Installs the demo goal once, then watches for arrival
fn demo_driver(
    mut state: Local<DemoState>,
    target: Res<DemoTarget>,
    mut planner: ResMut<Planner>,
    world: Res<WorldHandle>,
    mut exit: EventWriter<AppExit>,
) {
    state.ticks += 1;

    // Give the event bridge a couple of ticks to cache the world
    if !state.goal_set && state.ticks > 2 {
        let start = world.get().self_block_pos();
        planner.set_goal(Goal::Block { pos: target.goal }, start);
        state.goal_set = true;
        info!("🧭 Pathing {} → {}", start, target.goal);
    }

    if state.goal_set && world.get().self_block_pos() == target.goal {
        info!("🎉 Arrived at {} after {} ticks", target.goal, state.ticks);
        exit.send(AppExit::Success);
        return;
    }

    if state.ticks >= target.max_ticks {
        warn!("⏱️ Gave up after {} ticks", state.ticks);
        exit.send(AppExit::error());
    }
}
