use std::{thread::sleep, time::{Duration, Instant}};

use anyhow::{bail, Result};
use crossterm::event::{KeyEvent, KeyModifiers, KeyCode};
use log::info;
use rand::rngs::StdRng;

use crate::{Coords, TermInt};
use crate::board::Point;
use crate::config::Config;
use crate::engine::{Engine, Input, InputOutcome, Snapshot, StepOutcome};
use crate::snake::Direction::{*, self};
use crate::term::TermManager;
use crate::timer::DeadlineTimer;

const TICK_INTERVAL_MS: u64 = 5;

const SNAKE_BODY_CHAR: char = '█';
const APPLE_CHAR: char = 'O';
const DEAD_SNAKE_CHAR: char = 'X';
const GRID_CHAR: char = '·';

// Every tile is two columns wide so the board looks square
const CELL_WIDTH: TermInt = 2;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Play(Input),
    Quit,
}

pub struct SnakeGame {
    term: TermManager,
    engine: Engine<StdRng, DeadlineTimer>,
    draw_grid: bool,
    origin: Coords,
}

impl SnakeGame {
    pub fn new(config: Config, rng: StdRng, draw_grid: bool) -> Result<Self> {
        let engine = Engine::new(config, rng, DeadlineTimer::new())?;
        let term = TermManager::new()?;
        Ok(SnakeGame { term, engine, draw_grid, origin: (0, 0) })
    }

    pub fn initialize(&mut self) -> Result<()> {
        let tile_count = self.engine.snapshot().tile_count as TermInt;
        let needed = ((tile_count + 2) * CELL_WIDTH, tile_count + 3);
        let (w, h) = self.term.get_terminal_size();

        if w < needed.0 || h < needed.1 {
            bail!("terminal is {}x{}, the board needs at least {}x{}", w, h, needed.0, needed.1);
        }

        // Status line on top, board centered below it
        self.origin = ((w - needed.0) / 2, (h - needed.1) / 2 + 1);

        self.term.setup()?;
        self.term.clear()?;
        self.render()
    }

    pub fn restore(&mut self) -> Result<()> {
        self.term.restore()?;
        Ok(())
    }

    /// Runs until the player quits. The engine's timer decides when the
    /// snake moves; this loop just polls keys and the deadline.
    pub fn play(&mut self) -> Result<()> {
        loop {
            sleep(Duration::from_millis(TICK_INTERVAL_MS));

            let mut redraw = false;

            for key_ev in self.term.read_key_events_queue()? {
                match key_command(&key_ev) {
                    Some(Command::Quit) => {
                        info!("Quit requested");
                        return Ok(());
                    }
                    Some(Command::Play(input)) => {
                        if self.engine.handle_input(input) == InputOutcome::Restarted {
                            redraw = true;
                        }
                    }
                    None => {}
                }
            }

            if self.engine.timer_mut().take_due(Instant::now()) {
                if self.engine.update() == StepOutcome::GameOver {
                    info!("Final score {}", self.engine.state().score);
                }
                redraw = true;
            }

            if redraw {
                self.render()?;
            }
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn render(&mut self) -> Result<()> {
        let snap = self.engine.snapshot();
        let origin = self.origin;

        let status = format!("Score: {}   Record: {}", snap.score, snap.record);
        let board_width = (snap.tile_count as TermInt + 2) * CELL_WIDTH;
        let status_line = format!("{:^width$}", status, width = board_width as usize);
        self.term.print_str_at((origin.0, origin.1 - 1), &status_line)?;

        for pos in snap.borders {
            let glyph = border_glyph(*pos, snap.tile_count);
            print_cell(&mut self.term, origin, *pos, glyph)?;
        }

        let empty = if self.draw_grid { GRID_CHAR } else { ' ' };
        for y in 0..snap.tile_count {
            for x in 0..snap.tile_count {
                print_cell(&mut self.term, origin, Point::new(x, y), [empty, ' '])?;
            }
        }

        print_cell(&mut self.term, origin, snap.apple, [APPLE_CHAR, ' '])?;

        let (body, head) = if snap.is_game_over && !snap.is_board_full {
            (DEAD_SNAKE_CHAR, DEAD_SNAKE_CHAR)
        } else {
            (SNAKE_BODY_CHAR, head_char(snap.velocity))
        };
        for pos in snap.tail {
            print_cell(&mut self.term, origin, *pos, [body, ' '])?;
        }
        print_cell(&mut self.term, origin, snap.head, [head, ' '])?;

        match overlay(&snap) {
            Some(lines) => {
                let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
                self.term.show_message(&lines)?;
            }
            None => self.term.hide_message()?,
        }

        self.term.flush()?;
        Ok(())
    }
}

fn print_cell(term: &mut TermManager, origin: Coords, pos: Point, glyph: [char; 2]) -> Result<()> {
    let (x, y) = to_screen(origin, pos);
    term.print_at((x, y), glyph[0])?;
    term.print_at((x + 1, y), glyph[1])?;
    Ok(())
}

/// Border cells are at -1, so everything is shifted by one tile.
fn to_screen(origin: Coords, pos: Point) -> Coords {
    let x = (pos.x + 1) as TermInt * CELL_WIDTH;
    let y = (pos.y + 1) as TermInt;
    (origin.0 + x, origin.1 + y)
}

fn border_glyph(pos: Point, tile_count: i32) -> [char; 2] {
    let on_row = pos.y == -1 || pos.y == tile_count;
    match (pos.x, on_row) {
        (-1, true) => [' ', '+'],
        (-1, false) => [' ', '|'],
        (x, true) if x == tile_count => ['+', ' '],
        (x, false) if x == tile_count => ['|', ' '],
        _ => ['-', '-'],
    }
}

fn head_char(direction: Direction) -> char {
    match direction {
        Up => '^',
        Down => 'v',
        Left => '<',
        Right => '>',
    }
}

fn overlay(snap: &Snapshot) -> Option<Vec<String>> {
    if snap.is_board_full {
        Some(vec![
            "Board full, you won!".to_string(),
            format!("Score: {}", snap.score),
            "".to_string(),
            "R to play again, CTRL+C to quit".to_string(),
        ])
    } else if snap.is_game_over {
        Some(vec![
            "Game over!".to_string(),
            format!("Score: {}", snap.score),
            "".to_string(),
            "R to play again, CTRL+C to quit".to_string(),
        ])
    } else if snap.is_game_paused {
        Some(vec![
            "WASD or arrow keys to start".to_string(),
            "R to restart, CTRL+C to quit".to_string(),
        ])
    } else {
        None
    }
}

fn key_command(ev: &KeyEvent) -> Option<Command> {
    if is_ctrl_c(ev) {
        return Some(Command::Quit);
    }

    let input = match ev.code {
        KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Up => Input::Turn(Up),
        KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => Input::Turn(Left),
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Down => Input::Turn(Down),
        KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => Input::Turn(Right),
        KeyCode::Char('r') | KeyCode::Char('R') => Input::Restart,
        _ => return None,
    };
    Some(Command::Play(input))
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}
