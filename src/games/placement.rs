//! Random entity placement
//!
//! Positions are rejection-sampled against obstacles and reserved areas.
//! The function is pure given the RNG, so a seeded RNG yields a fixed layout.

use crate::models::{Position, Rect};
use rand::Rng;
use tracing::warn;

/// Sampling region and rejection rules for [`place_entities`].
#[derive(Debug, Clone)]
pub struct PlacementArea {
    /// Candidates are drawn from `[x, x + width) x [y, y + height)`.
    pub region: Rect,
    /// Extra clearance kept around every obstacle.
    pub clearance: f32,
    /// Areas where no entity may land (e.g. the goal display).
    pub reserved: Vec<Rect>,
    pub max_attempts: u32,
}

impl PlacementArea {
    fn is_free(&self, pos: &Position, obstacles: &[Rect]) -> bool {
        let blocked = obstacles
            .iter()
            .any(|obstacle| obstacle.inflate(self.clearance).contains(pos));
        let reserved = self.reserved.iter().any(|area| area.contains(pos));
        !blocked && !reserved
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Position {
        Position::new(
            self.region.x + rng.gen::<f32>() * self.region.width,
            self.region.y + rng.gen::<f32>() * self.region.height,
        )
    }
}

/// Place `count` entities inside `area`, avoiding `obstacles`.
///
/// Each entity gets at most `area.max_attempts` candidates; when all of them
/// are rejected the last candidate is kept.
pub fn place_entities<R: Rng + ?Sized>(
    obstacles: &[Rect],
    area: &PlacementArea,
    count: usize,
    rng: &mut R,
) -> Vec<Position> {
    let mut positions = Vec::with_capacity(count);

    for index in 0..count {
        let mut candidate = area.sample(rng);
        let mut attempts = 1;

        while !area.is_free(&candidate, obstacles) && attempts < area.max_attempts {
            candidate = area.sample(rng);
            attempts += 1;
        }

        if !area.is_free(&candidate, obstacles) {
            warn!(index, attempts, "Placement retries exhausted, keeping last candidate");
        }

        positions.push(candidate);
    }

    positions
}
