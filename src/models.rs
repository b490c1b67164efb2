//! Core data models shared by the game engines

use crate::error::ArcadeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

//
// ================= Geometry =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// True when both axis offsets are strictly below `radius`.
    pub fn within_box(&self, other: &Position, radius: f32) -> bool {
        (self.x - other.x).abs() < radius && (self.y - other.y).abs() < radius
    }
}

/// Axis-aligned rectangle, origin at the top-left corner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Square of side `size` anchored at `pos`.
    pub fn square_at(pos: Position, size: f32) -> Self {
        Self::new(pos.x, pos.y, size, size)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// Open-interval containment test, matching the placement checks.
    pub fn contains(&self, pos: &Position) -> bool {
        pos.x > self.x
            && pos.x < self.x + self.width
            && pos.y > self.y
            && pos.y < self.y + self.height
    }

    pub fn inflate(&self, margin: f32) -> Rect {
        Rect::new(
            self.x - margin,
            self.y - margin,
            self.width + margin * 2.0,
            self.height + margin * 2.0,
        )
    }
}

/// Inclusive clamp range for the player position.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Bounds {
    pub const fn new(min_x: f32, max_x: f32, min_y: f32, max_y: f32) -> Self {
        Self { min_x, max_x, min_y, max_y }
    }

    pub fn clamp(&self, pos: Position) -> Position {
        Position::new(
            pos.x.clamp(self.min_x, self.max_x),
            pos.y.clamp(self.min_y, self.max_y),
        )
    }
}

//
// ================= Input =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Move `pos` one step in this direction, then clamp to `bounds`.
    pub fn step(self, pos: Position, step: f32, bounds: &Bounds) -> Position {
        let candidate = match self {
            Direction::Up => Position::new(pos.x, pos.y - step),
            Direction::Down => Position::new(pos.x, pos.y + step),
            Direction::Left => Position::new(pos.x - step, pos.y),
            Direction::Right => Position::new(pos.x + step, pos.y),
        };
        bounds.clamp(candidate)
    }
}

/// The whole keyboard surface of the games: four arrows and one action key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameKey {
    Move(Direction),
    Action,
}

impl FromStr for GameKey {
    type Err = ArcadeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ArrowUp" | "up" => Ok(GameKey::Move(Direction::Up)),
            "ArrowDown" | "down" => Ok(GameKey::Move(Direction::Down)),
            "ArrowLeft" | "left" => Ok(GameKey::Move(Direction::Left)),
            "ArrowRight" | "right" => Ok(GameKey::Move(Direction::Right)),
            " " | "Space" | "space" | "action" => Ok(GameKey::Action),
            other => Err(ArcadeError::UnknownKey(other.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Up => "Up",
            Direction::Down => "Down",
            Direction::Left => "Left",
            Direction::Right => "Right",
        };
        write!(f, "{}", s)
    }
}
