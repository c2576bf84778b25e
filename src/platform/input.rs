//! Held-direction tracking
//!
//! Keyboard and touch buttons both feed key names in here; the simulation only
//! ever sees the resolved [`TickInput`] snapshot.

use crate::sim::TickInput;

/// A steering direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Map a DOM `KeyboardEvent.key` value (arrows or WASD)
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" | "a" | "A" => Some(Direction::Left),
            "ArrowRight" | "d" | "D" => Some(Direction::Right),
            "ArrowUp" | "w" | "W" => Some(Direction::Up),
            "ArrowDown" | "s" | "S" => Some(Direction::Down),
            _ => None,
        }
    }
}

/// Level-triggered input state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    left: bool,
    right: bool,
    up: bool,
    down: bool,
}

impl InputState {
    pub fn set(&mut self, dir: Direction, held: bool) {
        match dir {
            Direction::Left => self.left = held,
            Direction::Right => self.right = held,
            Direction::Up => self.up = held,
            Direction::Down => self.down = held,
        }
    }

    /// Returns true if the key steers (so the caller can swallow the event)
    pub fn key_down(&mut self, key: &str) -> bool {
        match Direction::from_key(key) {
            Some(dir) => {
                self.set(dir, true);
                true
            }
            None => false,
        }
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        match Direction::from_key(key) {
            Some(dir) => {
                self.set(dir, false);
                true
            }
            None => false,
        }
    }

    /// Drop every held direction (focus loss, level start)
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_idle(&self) -> bool {
        !(self.left || self.right || self.up || self.down)
    }

    /// Snapshot for this frame
    pub fn intent(&self) -> TickInput {
        TickInput {
            left: self.left,
            right: self.right,
            up: self.up,
            down: self.down,
        }
    }
}
