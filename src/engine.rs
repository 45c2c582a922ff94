//! The simulation: one `update` per timer tick, input applied between ticks.

use std::collections::HashSet;

use log::{debug, info, warn};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::{Board, Point};
use crate::config::Config;
use crate::error::{ConfigError, PlacementError};
use crate::snake::{Direction, Snake};
use crate::timer::{Timer, TimerHandle};

const INITIAL_DIRECTION: Direction = Direction::Down;
// Random draws per tile before falling back to a scan of the free tiles
const PLACEMENT_ATTEMPTS_PER_TILE: usize = 4;

/// Per-session state. Everything but `record` is reset on restart.
#[derive(Debug)]
pub struct GameState {
    pub score: u32,
    pub record: u32,
    pub is_game_over: bool,
    pub is_game_paused: bool,
    /// Set when the snake covers every tile and no apple can be placed.
    pub is_board_full: bool,
    pub can_change_direction: bool,
    pub velocity: Direction,
    pub occupied_cells: HashSet<Point>,
}

impl GameState {
    fn new(record: u32) -> Self {
        GameState {
            score: 0,
            record,
            is_game_over: false,
            is_game_paused: true,
            is_board_full: false,
            can_change_direction: true,
            velocity: INITIAL_DIRECTION,
            occupied_cells: HashSet::new(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Input {
    Turn(Direction),
    Restart,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    Turned,
    Ignored,
    Restarted,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Waiting for the first turn; nothing moved.
    Paused,
    Moved,
    Ate,
    GameOver,
}

/// Read-only view of everything a renderer needs.
#[derive(Debug)]
pub struct Snapshot<'a> {
    pub head: Point,
    pub tail: &'a [Point],
    pub apple: Point,
    pub borders: &'a [Point],
    pub velocity: Direction,
    pub tile_count: i32,
    pub score: u32,
    pub record: u32,
    pub is_game_over: bool,
    pub is_game_paused: bool,
    pub is_board_full: bool,
}

pub struct Engine<R: Rng, T: Timer> {
    config: Config,
    board: Board,
    snake: Snake,
    apple: Point,
    state: GameState,
    rng: R,
    timer: T,
    next_update: Option<TimerHandle>,
}

impl<R: Rng, T: Timer> Engine<R, T> {
    /// Builds the board and starts a paused session, scheduling the first update.
    pub fn new(config: Config, rng: R, timer: T) -> Result<Self, ConfigError> {
        config.validate()?;

        let board = Board::new(config.tile_count);
        let snake = starting_snake(&config);
        let mut engine = Engine {
            config,
            board,
            snake,
            apple: Point::new(0, 0),
            state: GameState::new(0),
            rng,
            timer,
            next_update: None,
        };
        engine.init_game();
        Ok(engine)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            head: self.snake.head(),
            tail: self.snake.tail(),
            apple: self.apple,
            borders: self.board.borders(),
            velocity: self.state.velocity,
            tile_count: self.board.tile_count(),
            score: self.state.score,
            record: self.state.record,
            is_game_over: self.state.is_game_over,
            is_game_paused: self.state.is_game_paused,
            is_board_full: self.state.is_board_full,
        }
    }

    /// The timer callback: advances one step unless paused, then schedules the
    /// next update. Once the game is over nothing more is scheduled.
    pub fn update(&mut self) -> StepOutcome {
        self.next_update = None;

        let outcome = if self.state.is_game_paused {
            StepOutcome::Paused
        } else {
            self.shift()
        };

        if self.state.is_game_over {
            return StepOutcome::GameOver;
        }

        self.next_update = Some(self.timer.schedule_once(self.config.update_interval));
        outcome
    }

    /// Moves the snake one cell, then resolves collisions and apple eating.
    pub fn shift(&mut self) -> StepOutcome {
        let shift = self.snake.shift(self.state.velocity);
        let head = shift.new_head;

        // The vacated tail cell stays occupied for this tick's apple placement
        self.state.occupied_cells = self.snake.cells().collect();
        self.state.occupied_cells.insert(shift.tail_end);

        if self.snake.bites_itself() || self.board.is_border(head) {
            info!("Game over at {:?} with score {}", head, self.state.score);
            self.state.is_game_over = true;
        }

        // Checked even after a collision, so a crash onto the apple still scores
        let mut ate = false;
        if head == self.apple {
            ate = true;
            self.state.score += 1;
            self.snake.grow(shift.tail_end);
            info!("Ate apple at {:?}, score {}", head, self.state.score);
            self.respawn_apple();
        }

        self.state.can_change_direction = true;

        if self.state.is_game_over {
            StepOutcome::GameOver
        } else if ate {
            StepOutcome::Ate
        } else {
            StepOutcome::Moved
        }
    }

    pub fn handle_input(&mut self, input: Input) -> InputOutcome {
        let direction = match input {
            Input::Restart => {
                self.restart();
                return InputOutcome::Restarted;
            }
            Input::Turn(direction) => direction,
        };

        if self.state.is_game_over
            || !self.state.can_change_direction
            || direction == self.state.velocity.opposite()
        {
            return InputOutcome::Ignored;
        }

        debug!("Turning {:?}", direction);
        self.state.velocity = direction;
        self.state.can_change_direction = false;
        self.state.is_game_paused = false;
        InputOutcome::Turned
    }

    pub fn restart(&mut self) {
        if let Some(handle) = self.next_update.take() {
            self.timer.cancel(handle);
        }
        self.state.record = self.state.record.max(self.state.score);
        info!("Restarting, record is {}", self.state.record);
        self.init_game();
    }

    /// Picks a free tile for the apple. Random draws first, then a uniform
    /// choice among the tiles left, so a nearly full board still terminates.
    pub fn place_apple(&mut self) -> Result<Point, PlacementError> {
        let occupied = &self.state.occupied_cells;
        let board = &self.board;

        let taken = occupied.iter().filter(|p| board.is_inside(**p)).count();
        if taken >= board.capacity() {
            return Err(PlacementError::BoardFull);
        }

        let max = board.tile_count();
        for _ in 0..board.capacity() * PLACEMENT_ATTEMPTS_PER_TILE {
            let pos = Point::new(self.rng.gen_range(0..max), self.rng.gen_range(0..max));
            if !occupied.contains(&pos) {
                return Ok(pos);
            }
        }

        let free: Vec<Point> = board.cells().filter(|p| !occupied.contains(p)).collect();
        free.choose(&mut self.rng).copied().ok_or(PlacementError::BoardFull)
    }

    fn respawn_apple(&mut self) {
        match self.place_apple() {
            Ok(apple) => {
                debug!("Apple placed at {:?}", apple);
                self.apple = apple;
            }
            Err(err) => {
                warn!("{}, ending the game with score {}", err, self.state.score);
                self.state.is_board_full = true;
                self.state.is_game_over = true;
            }
        }
    }

    fn init_game(&mut self) {
        self.state = GameState::new(self.state.record);
        self.snake = starting_snake(&self.config);
        self.state.occupied_cells = self.snake.cells().collect();
        self.respawn_apple();
        info!("New game on a {0}x{0} board", self.config.tile_count);
        self.update();
    }
}

fn starting_snake(config: &Config) -> Snake {
    let head = Point::new(
        config.tile_count as i32 / 2 - 1,
        config.initial_snake_length as i32 - 1,
    );
    Snake::new(head, config.initial_snake_length as usize, INITIAL_DIRECTION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snake::Direction::*;
    use crate::timer::ManualTimer;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    fn engine() -> Engine<StdRng, ManualTimer> {
        engine_with(Config::default())
    }

    fn engine_with(config: Config) -> Engine<StdRng, ManualTimer> {
        Engine::new(config, StdRng::seed_from_u64(7), ManualTimer::new()).unwrap()
    }

    fn scheduled(engine: &Engine<StdRng, ManualTimer>) -> usize {
        engine.timer.scheduled.len()
    }

    #[test]
    fn starts_paused_in_canonical_layout() {
        let engine = engine();
        let snap = engine.snapshot();

        assert_eq!(snap.head, Point::new(4, 2));
        assert_eq!(snap.tail, &[Point::new(4, 1), Point::new(4, 0)]);
        assert_eq!(engine.state.velocity.delta(), (0, 1));
        assert!(snap.is_game_paused);
        assert!(!snap.is_game_over);
        assert_eq!(snap.score, 0);
        assert_eq!(snap.borders.len(), 48);
        assert!(engine.board.is_inside(snap.apple));
        assert!(!engine.snake.cells().any(|c| c == snap.apple));

        // The paused first update still keeps the clock running
        assert_eq!(engine.timer.scheduled, vec![(engine.next_update.unwrap(), Duration::from_millis(100))]);
    }

    #[test]
    fn paused_update_does_not_move() {
        let mut engine = engine();
        assert_eq!(engine.update(), StepOutcome::Paused);
        assert_eq!(engine.snake.head(), Point::new(4, 2));
        assert_eq!(scheduled(&engine), 2);
    }

    #[test]
    fn one_step_moves_head_and_tail() {
        let mut engine = engine();
        engine.apple = Point::new(0, 10);

        assert_eq!(engine.handle_input(Input::Turn(Down)), InputOutcome::Turned);
        assert!(!engine.state.is_game_paused);
        assert_eq!(engine.update(), StepOutcome::Moved);

        assert_eq!(engine.snake.head(), Point::new(4, 3));
        assert_eq!(engine.snake.tail(), &[Point::new(4, 2), Point::new(4, 1)]);
        assert_eq!(engine.state.score, 0);
        assert!(!engine.state.is_game_over);

        let expected: HashSet<_> =
            [Point::new(4, 3), Point::new(4, 2), Point::new(4, 1), Point::new(4, 0)].iter().copied().collect();
        assert_eq!(engine.state.occupied_cells, expected);
    }

    #[test]
    fn reversal_is_ignored() {
        let mut engine = engine();
        engine.apple = Point::new(0, 10);
        engine.handle_input(Input::Turn(Right));
        engine.update();

        for (current, reverse) in &[(Right, Left), (Down, Up), (Left, Right), (Up, Down)] {
            engine.state.velocity = *current;
            engine.state.can_change_direction = true;
            assert_eq!(engine.handle_input(Input::Turn(*reverse)), InputOutcome::Ignored);
            assert_eq!(engine.state.velocity, *current);
            assert!(engine.state.can_change_direction);
        }
    }

    #[test]
    fn reversal_does_not_unpause() {
        let mut engine = engine();
        assert_eq!(engine.handle_input(Input::Turn(Up)), InputOutcome::Ignored);
        assert!(engine.state.is_game_paused);
    }

    #[test]
    fn one_turn_per_step() {
        let mut engine = engine();
        engine.apple = Point::new(0, 10);

        assert_eq!(engine.handle_input(Input::Turn(Right)), InputOutcome::Turned);
        assert_eq!(engine.handle_input(Input::Turn(Up)), InputOutcome::Ignored);
        assert_eq!(engine.handle_input(Input::Turn(Down)), InputOutcome::Ignored);
        assert_eq!(engine.state.velocity, Right);

        engine.update();
        assert_eq!(engine.snake.head(), Point::new(5, 2));

        // The latch reopens after the step
        assert_eq!(engine.handle_input(Input::Turn(Down)), InputOutcome::Turned);
        engine.update();
        assert_eq!(engine.snake.head(), Point::new(5, 3));
    }

    #[test]
    fn eating_grows_by_one_and_scores() {
        let mut engine = engine();
        engine.apple = Point::new(4, 3);
        engine.handle_input(Input::Turn(Down));

        assert_eq!(engine.update(), StepOutcome::Ate);
        assert_eq!(engine.state.score, 1);
        assert_eq!(engine.snake.tail(), &[Point::new(4, 2), Point::new(4, 1), Point::new(4, 0)]);
        assert!(!engine.state.occupied_cells.contains(&engine.apple));
        assert!(engine.board.is_inside(engine.apple));
    }

    #[test]
    fn apple_never_lands_on_snake() {
        let mut engine = engine();
        engine.handle_input(Input::Turn(Down));

        for _ in 0..200 {
            engine.apple = engine.snake.head().offset(engine.state.velocity.delta());
            let len = engine.snake.len();
            engine.shift();
            assert_eq!(engine.snake.len(), len + 1);
            assert!(!engine.state.occupied_cells.contains(&engine.apple));

            // Head back to the start before running into anything
            engine.snake = starting_snake(&engine.config);
            engine.state.is_game_over = false;
        }
    }

    #[test]
    fn wall_collision_ends_game_and_stops_updates() {
        let mut engine = engine();
        engine.apple = Point::new(10, 10);
        engine.handle_input(Input::Turn(Left));

        for x in (0..4).rev() {
            assert_eq!(engine.update(), StepOutcome::Moved);
            assert_eq!(engine.snake.head(), Point::new(x, 2));
        }

        let before = scheduled(&engine);
        assert_eq!(engine.update(), StepOutcome::GameOver);
        assert!(engine.state.is_game_over);
        assert_eq!(scheduled(&engine), before);
        assert!(engine.next_update.is_none());

        assert_eq!(engine.handle_input(Input::Turn(Down)), InputOutcome::Ignored);
    }

    #[test]
    fn self_collision_ends_game() {
        let mut engine = engine_with(Config { initial_snake_length: 5, ..Config::default() });
        engine.apple = Point::new(10, 10);

        engine.handle_input(Input::Turn(Right));
        engine.update();
        engine.handle_input(Input::Turn(Up));
        engine.update();
        engine.handle_input(Input::Turn(Left));
        assert_eq!(engine.update(), StepOutcome::GameOver);
        assert!(engine.snake.bites_itself());
    }

    #[test]
    fn collision_on_apple_still_scores() {
        let mut engine = engine();
        engine.state.is_game_paused = false;
        engine.state.velocity = Up;
        // Body curled so the tile above the head stays covered after the shift
        engine.snake = Snake::from_parts(
            Point::new(5, 1),
            vec![Point::new(5, 2), Point::new(4, 2), Point::new(4, 1), Point::new(4, 0), Point::new(5, 0), Point::new(6, 0)],
        );
        engine.apple = Point::new(5, 0);

        assert_eq!(engine.update(), StepOutcome::GameOver);
        assert_eq!(engine.state.score, 1);
        assert_eq!(engine.snake.len(), 8);
    }

    #[test]
    fn restart_keeps_record_and_resets_the_rest() {
        let mut engine = engine();
        engine.handle_input(Input::Turn(Right));
        engine.update();
        engine.state.score = 5;
        let pending = engine.next_update;

        assert_eq!(engine.handle_input(Input::Restart), InputOutcome::Restarted);

        assert_eq!(engine.timer.cancelled, vec![pending.unwrap()]);
        assert_eq!(engine.state.record, 5);
        assert_eq!(engine.state.score, 0);
        assert!(engine.state.is_game_paused);
        assert!(engine.state.can_change_direction);
        assert_eq!(engine.state.velocity, Down);
        assert_eq!(engine.snake.head(), Point::new(4, 2));
        assert_eq!(engine.snake.tail(), &[Point::new(4, 1), Point::new(4, 0)]);
        assert!(engine.next_update.is_some());

        // A lower score doesn't overwrite the record
        engine.state.score = 2;
        engine.restart();
        assert_eq!(engine.state.record, 5);
    }

    #[test]
    fn restart_is_accepted_after_game_over_and_mid_step() {
        let mut engine = engine();
        engine.handle_input(Input::Turn(Right));
        assert_eq!(engine.handle_input(Input::Restart), InputOutcome::Restarted);
        assert!(engine.state.can_change_direction);

        engine.state.is_game_over = true;
        engine.next_update = None;
        assert_eq!(engine.handle_input(Input::Restart), InputOutcome::Restarted);
        assert!(!engine.state.is_game_over);
    }

    #[test]
    fn placement_finds_the_last_free_tile() {
        let mut engine = engine();
        engine.state.occupied_cells = engine.board.cells().filter(|c| *c != Point::new(0, 0)).collect();

        assert_eq!(engine.place_apple(), Ok(Point::new(0, 0)));
    }

    #[test]
    fn placement_reports_full_board() {
        let mut engine = engine_with(Config { tile_count: 2, initial_snake_length: 2, ..Config::default() });
        engine.state.occupied_cells = engine.board.cells().collect();
        // Border cells don't count towards saturation
        engine.state.occupied_cells.insert(Point::new(-1, 0));

        assert_eq!(engine.place_apple(), Err(PlacementError::BoardFull));
    }

    #[test]
    fn filling_the_board_ends_the_game() {
        // 2x2 board: head (0,1), tail [(0,0)], apples on the two remaining tiles
        let mut engine = engine_with(Config { tile_count: 2, initial_snake_length: 2, ..Config::default() });
        assert_eq!(engine.snake.head(), Point::new(0, 1));

        engine.apple = Point::new(1, 1);
        engine.handle_input(Input::Turn(Right));
        assert_eq!(engine.update(), StepOutcome::Ate);
        assert_eq!(engine.apple, Point::new(1, 0));

        engine.handle_input(Input::Turn(Up));
        assert_eq!(engine.update(), StepOutcome::GameOver);
        assert!(engine.state.is_board_full);
        assert_eq!(engine.state.score, 2);
        assert_eq!(engine.snake.len(), 4);
    }

    #[test]
    fn rejects_invalid_config() {
        let config = Config { tile_count: 0, ..Config::default() };
        let result = Engine::new(config, StdRng::seed_from_u64(1), ManualTimer::new());
        assert_eq!(result.err(), Some(ConfigError::ZeroTileCount));

        let config = Config { tile_count: 50_000, ..Config::default() };
        let result = Engine::new(config, StdRng::seed_from_u64(1), ManualTimer::new());
        assert!(matches!(result.err(), Some(ConfigError::BoardTooLarge { tile_count: 50_000, .. })));
    }
}
