//! Bevy host integration.
//!
//! The board lives in a resource and advances exactly once per `Update`. Input
//! is collected into a one-shot slot during [`BoardSet::Input`] and consumed
//! (or dropped) during [`BoardSet::Tick`].

use bevy::prelude::*;
use tracing::{error, info};

use crate::board::{Board, Tick};
use crate::config::{ConfigError, GameConfig};
use crate::direction::{Direction, InputSource};

/// Arrow keys and WASD
const KEY_BINDINGS: [(KeyCode, Direction); 8] = [
    (KeyCode::ArrowUp, Direction::Up),
    (KeyCode::ArrowRight, Direction::Right),
    (KeyCode::ArrowDown, Direction::Down),
    (KeyCode::ArrowLeft, Direction::Left),
    (KeyCode::KeyW, Direction::Up),
    (KeyCode::KeyD, Direction::Right),
    (KeyCode::KeyS, Direction::Down),
    (KeyCode::KeyA, Direction::Left),
];

pub struct BoardPlugin {
    board: Board,
}

impl BoardPlugin {
    pub fn new(board: Board) -> Self {
        Self { board }
    }

    pub fn from_config(config: &GameConfig) -> Result<Self, ConfigError> {
        let board = Board::from_config(config, config.resolve_seed())?;
        Ok(Self::new(board))
    }
}

impl Plugin for BoardPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(BoardResource(self.board.clone()))
            .init_resource::<DirectionInput>()
            .init_resource::<BoardStatus>()
            .add_event::<BoardEvent>()
            .configure_sets(Update, (BoardSet::Input, BoardSet::Tick).chain())
            .add_systems(Update, read_keyboard.in_set(BoardSet::Input))
            .add_systems(Update, tick_board.in_set(BoardSet::Tick));
    }
}

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardSet {
    /// Anything that wants to steer the board runs here
    Input,
    Tick,
}

#[derive(Resource, Debug, Clone)]
pub struct BoardResource(pub Board);

/// One-shot direction for the coming tick
#[derive(Resource, Debug, Default)]
pub struct DirectionInput {
    pending: Option<Direction>,
}

impl DirectionInput {
    /// Later presses in the same frame replace earlier ones
    pub fn press(&mut self, dir: Direction) {
        self.pending = Some(dir);
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    pub fn pending(&self) -> Option<Direction> {
        self.pending
    }
}

impl InputSource for DirectionInput {
    fn dir(&mut self) -> Option<Direction> {
        self.pending.take()
    }
}

#[derive(Resource, Debug, Default, Clone)]
pub struct BoardStatus {
    pub ticks: u64,
    pub moves: u64,
    pub game_over: bool,
    pub last_error: Option<String>,
}

impl BoardStatus {
    /// The board will not be driven any further
    pub fn is_stopped(&self) -> bool {
        self.game_over || self.last_error.is_some()
    }
}

#[derive(Event, Debug, Clone, PartialEq)]
pub enum BoardEvent {
    Moved(Direction),
    Spawned { value: u32, x: usize, y: usize },
    GameOver { moves: u64, highest: u32 },
    Defect(String),
}

pub fn read_keyboard(keys: Option<Res<ButtonInput<KeyCode>>>, mut input: ResMut<DirectionInput>) {
    let Some(keys) = keys else {
        return;
    };
    if let Some((_, dir)) = KEY_BINDINGS.iter().find(|(key, _)| keys.just_pressed(*key)) {
        input.press(*dir);
    }
}

pub fn tick_board(
    mut board: ResMut<BoardResource>,
    mut input: ResMut<DirectionInput>,
    mut status: ResMut<BoardStatus>,
    mut events: EventWriter<BoardEvent>,
    mut exit: EventWriter<AppExit>,
) {
    if status.is_stopped() {
        input.clear();
        return;
    }
    status.ticks += 1;
    let result = board.0.update(&mut *input);
    // not buffered: a press the board did not take is gone
    input.clear();

    match result {
        Ok(Tick::Moved(dir)) => {
            status.moves += 1;
            events.send(BoardEvent::Moved(dir));
        }
        Ok(Tick::Spawned(id)) => {
            if let Some(tile) = board.0.tile(id) {
                let (x, y) = tile.pos();
                events.send(BoardEvent::Spawned {
                    value: tile.value(),
                    x,
                    y,
                });
            }
            if !board.0.has_moves() {
                finish(&board.0, &mut status, &mut events);
            }
        }
        Ok(Tick::Idle | Tick::Blocked(_) | Tick::Settling) => {}
        Err(err) if err.is_game_over() => finish(&board.0, &mut status, &mut events),
        Err(err) => {
            error!(error = %err, tick = status.ticks, "board stopped");
            status.last_error = Some(err.to_string());
            events.send(BoardEvent::Defect(err.to_string()));
            exit.send(AppExit::error());
        }
    }
}

fn finish(board: &Board, status: &mut BoardStatus, events: &mut EventWriter<BoardEvent>) {
    status.game_over = true;
    let highest = board.highest_tile();
    info!(moves = status.moves, highest, "game over");
    events.send(BoardEvent::GameOver {
        moves: status.moves,
        highest,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Resource, Default)]
    struct Seen(Vec<BoardEvent>);

    fn record(mut reader: EventReader<BoardEvent>, mut seen: ResMut<Seen>) {
        seen.0.extend(reader.read().cloned());
    }

    fn app_with(board: Board) -> App {
        let mut app = App::new();
        app.add_plugins(BoardPlugin::new(board))
            .init_resource::<Seen>()
            .add_systems(Update, record.after(BoardSet::Tick));
        app
    }

    fn press(app: &mut App, dir: Direction) {
        app.world_mut().resource_mut::<DirectionInput>().press(dir);
    }

    #[test]
    fn test_plugin_inserts_resources() {
        let mut app = app_with(Board::new(4, 1).unwrap());
        app.update();
        let status = app.world().resource::<BoardStatus>();
        assert_eq!(status.ticks, 1);
        assert_eq!(status.moves, 0);
        assert!(!status.is_stopped());
        assert_eq!(app.world().resource::<BoardResource>().0.tiles().count(), 2);
    }

    #[test]
    fn test_move_runs_to_spawn() {
        let board = Board::from_values(2, &[2, 2, 0, 0], 5).unwrap();
        let mut app = app_with(board);
        press(&mut app, Direction::Left);
        for _ in 0..7 {
            app.update();
        }
        let board = &app.world().resource::<BoardResource>().0;
        assert!(board.is_idle());
        assert_eq!(board.grid()[0], 4);

        let seen = &app.world().resource::<Seen>().0;
        assert_eq!(seen[0], BoardEvent::Moved(Direction::Left));
        assert!(matches!(seen[1], BoardEvent::Spawned { .. }));
        assert_eq!(app.world().resource::<BoardStatus>().moves, 1);
    }

    #[test]
    fn test_input_during_settle_is_dropped() {
        let board = Board::from_values(2, &[2, 2, 0, 0], 5).unwrap();
        let mut app = app_with(board);
        press(&mut app, Direction::Left);
        app.update();
        press(&mut app, Direction::Right);
        app.update();
        assert_eq!(app.world().resource::<DirectionInput>().pending(), None);
        for _ in 0..10 {
            app.update();
        }
        assert_eq!(app.world().resource::<BoardStatus>().moves, 1);
        assert_eq!(app.world().resource::<BoardResource>().0.grid()[0], 4);
    }

    #[test]
    fn test_game_over_when_no_moves_remain() {
        // after Right the bottom-left cell is the only gap; whatever spawns
        // there cannot merge with 16 above or 8 beside it
        let board = Board::from_values(2, &[16, 4, 8, 0], 5).unwrap();
        let mut app = app_with(board);
        press(&mut app, Direction::Right);
        for _ in 0..7 {
            app.update();
        }
        let status = app.world().resource::<BoardStatus>().clone();
        assert!(status.game_over);
        assert!(status.last_error.is_none());
        assert!(app
            .world()
            .resource::<Seen>()
            .0
            .iter()
            .any(|e| matches!(e, BoardEvent::GameOver { highest: 16, .. })));

        app.update();
        assert_eq!(app.world().resource::<BoardStatus>().ticks, status.ticks);
    }

    #[test]
    fn test_from_config_rejects_invalid_config() {
        let config = GameConfig {
            board_size: 40,
            seed: Some(3),
            ..GameConfig::default()
        };
        assert!(matches!(
            BoardPlugin::from_config(&config),
            Err(ConfigError::Invalid(_))
        ));

        let config = GameConfig {
            board_size: 3,
            seed: Some(3),
            ..GameConfig::default()
        };
        let mut app = App::new();
        app.add_plugins(BoardPlugin::from_config(&config).unwrap());
        app.update();
        assert_eq!(app.world().resource::<BoardResource>().0.size(), 3);
    }

    #[test]
    fn test_keyboard_without_input_resource_is_noop() {
        let mut app = app_with(Board::from_values(2, &[2, 0, 0, 0], 0).unwrap());
        app.update();
        assert_eq!(app.world().resource::<BoardStatus>().moves, 0);
    }

    #[test]
    fn test_keyboard_press_moves_board() {
        let mut app = app_with(Board::from_values(2, &[2, 0, 0, 0], 0).unwrap());
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::KeyD);
        app.insert_resource(keys);
        app.update();
        let seen = &app.world().resource::<Seen>().0;
        assert_eq!(seen.first(), Some(&BoardEvent::Moved(Direction::Right)));
    }
}
