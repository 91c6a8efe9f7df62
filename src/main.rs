use std::time::Duration;

use anyhow::Context;
use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use tracing::info;

use twenty48_core::board::Board;
use twenty48_core::config::GameConfig;
use twenty48_core::direction::RandomInput;
use twenty48_core::logging::LoggingPlugin;
use twenty48_core::plugin::{BoardPlugin, BoardResource, BoardSet, BoardStatus, DirectionInput};

/// Random direction feed for the headless run
#[derive(Resource)]
struct Autoplay(RandomInput);

fn main() -> anyhow::Result<()> {
    // installs the subscriber as soon as it is added
    let mut app = App::new();
    app.add_plugins(LoggingPlugin::default());

    let config = match std::env::var("TWENTY48_CONFIG") {
        Ok(path) => {
            GameConfig::load(&path).with_context(|| format!("loading config from {path}"))?
        }
        Err(_) => GameConfig::default(),
    };
    let seed = config.resolve_seed();
    let board = Board::from_config(&config, seed).context("creating board")?;
    info!(
        seed,
        size = config.board_size,
        tick_rate = config.tick_rate,
        "starting headless autoplay"
    );

    let frame = Duration::from_secs_f64(1.0 / f64::from(config.tick_rate));
    let exit = app
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(frame)))
        .add_plugins(BoardPlugin::new(board))
        .insert_resource(Autoplay(RandomInput::new(!seed)))
        .add_systems(Update, autoplay.in_set(BoardSet::Input))
        .add_systems(Update, exit_when_over.after(BoardSet::Tick))
        .run();

    match exit {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => anyhow::bail!("board stopped with exit code {code}"),
    }
}

fn autoplay(
    board: Res<BoardResource>,
    mut autoplay: ResMut<Autoplay>,
    mut input: ResMut<DirectionInput>,
) {
    if board.0.is_idle() {
        input.press(autoplay.0.next_direction());
    }
}

fn exit_when_over(
    status: Res<BoardStatus>,
    board: Res<BoardResource>,
    mut exit: EventWriter<AppExit>,
) {
    if !status.game_over {
        return;
    }
    info!(
        moves = status.moves,
        ticks = status.ticks,
        highest = board.0.highest_tile(),
        grid = ?board.0.grid(),
        "final board"
    );
    exit.send(AppExit::Success);
}
