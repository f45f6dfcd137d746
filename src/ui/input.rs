/// Keyboard input: terminal key events → queued game commands.
///
/// Every frame `drain_events()` reads all pending crossterm events without
/// blocking and appends the matching `Command`s to a FIFO queue. The game loop
/// takes at most one command per processed frame, so keys pressed during an
/// animation are kept rather than dropped.
///
/// Key repeats count as presses (holding an arrow keeps moving); releases are
/// ignored.

use std::collections::VecDeque;
use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::direction::Direction;

/// Queued commands beyond this are dropped (a held key must not build a backlog).
const QUEUE_LIMIT: usize = 4;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Move(Direction),
    Restart,
    KeepPlaying,
    Quit,
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A'), KeyCode::Char('h')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D'), KeyCode::Char('l')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W'), KeyCode::Char('k')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S'), KeyCode::Char('j')];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_CONTINUE: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

/// Map one key event to a command. Unbound keys and releases map to nothing.
pub fn command_for_key(key: &KeyEvent) -> Option<Command> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(Command::Quit),
            _ => None,
        };
    }
    let code = &key.code;
    if KEYS_LEFT.contains(code) {
        Some(Command::Move(Direction::Left))
    } else if KEYS_RIGHT.contains(code) {
        Some(Command::Move(Direction::Right))
    } else if KEYS_UP.contains(code) {
        Some(Command::Move(Direction::Up))
    } else if KEYS_DOWN.contains(code) {
        Some(Command::Move(Direction::Down))
    } else if KEYS_RESTART.contains(code) {
        Some(Command::Restart)
    } else if KEYS_CONTINUE.contains(code) {
        Some(Command::KeepPlaying)
    } else if KEYS_QUIT.contains(code) {
        Some(Command::Quit)
    } else {
        None
    }
}

pub struct InputState {
    queue: VecDeque<Command>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            queue: VecDeque::with_capacity(QUEUE_LIMIT),
        }
    }

    /// Drain all pending terminal events into the command queue.
    /// Call once per frame.
    pub fn drain_events(&mut self) -> std::io::Result<()> {
        while poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if let Some(cmd) = command_for_key(&key) {
                    self.push(cmd);
                }
            }
        }
        Ok(())
    }

    /// Queue a command from any source (keyboard or gamepad).
    pub fn push(&mut self, cmd: Command) {
        // Quit and Restart always get through; moves may be dropped.
        match cmd {
            Command::Quit | Command::Restart => {
                self.queue.retain(|c| matches!(c, Command::Quit));
                self.queue.push_back(cmd);
            }
            _ if self.queue.len() < QUEUE_LIMIT => self.queue.push_back(cmd),
            _ => {}
        }
    }

    /// Take the next command, oldest first.
    pub fn next_command(&mut self) -> Option<Command> {
        self.queue.pop_front()
    }

    /// A restart is next in line; the caller may cut the running animation short.
    pub fn restart_pending(&self) -> bool {
        self.queue.front() == Some(&Command::Restart)
    }

    /// Quit is honoured immediately, even mid-animation.
    pub fn quit_requested(&self) -> bool {
        self.queue.contains(&Command::Quit)
    }
}
