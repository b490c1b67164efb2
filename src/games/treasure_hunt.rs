//! Treasure Coin Hunt engine
//!
//! The player walks a walled field, reaches coins and notes, and answers a
//! buying challenge for each one. Correct answers bank the money; the round
//! is won once the bank covers the price of the shopping goal.
//!
//! PHASES:
//! Instructions → Playing ⇄ Challenge → Won | GameOver
//!
//! All transitions are synchronous. Randomness comes from a seeded
//! `ChaCha8Rng`, so a seed fully determines layouts, options and goals.

use crate::error::ArcadeError;
use crate::games::badges::{create_default_badge_book, BadgeAward, BadgeBook, CollectionContext};
use crate::games::catalog::{generate_options, ChallengeOption, ShopItem, CATALOG, GOAL_ITEMS};
use crate::games::placement::{place_entities, PlacementArea};
use crate::models::{Bounds, Direction, GameKey, Position, Rect};
use crate::progress::PlayerProgress;
use crate::Result;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const FIELD: Bounds = Bounds::new(50.0, 750.0, 120.0, 550.0);
pub const PLAYER_START: Position = Position::new(100.0, 500.0);
pub const PLAYER_SIZE: f32 = 32.0;
pub const STEP: f32 = 20.0;
pub const PICKUP_RADIUS: f32 = 40.0;
pub const SCORE_PER_PICKUP: u32 = 10;

const COIN_VALUES: &[u32] = &[1, 2, 5, 10];
const NOTE_VALUES: &[u32] = &[10, 20, 50, 100, 200, 500];
const COIN_PROBABILITY: f64 = 0.6;

const CLASSIC_WALLS: [Rect; 4] = [
    Rect::new(200.0, 150.0, 100.0, 20.0),
    Rect::new(400.0, 250.0, 20.0, 100.0),
    Rect::new(600.0, 200.0, 80.0, 20.0),
    Rect::new(300.0, 400.0, 150.0, 20.0),
];

/// Corner of the field where the shopping goal is displayed.
const GOAL_AREA: Rect = Rect::new(750.0, 0.0, 250.0, 120.0);

//
// ================= Configuration =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum WallLayout {
    Classic,
    Random { count: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HuntConfig {
    #[serde(default)]
    pub show_instructions: bool,
    #[serde(default = "default_layout")]
    pub wall_layout: WallLayout,
    #[serde(default = "default_lives")]
    pub start_lives: u32,
    #[serde(default = "default_round_seconds")]
    pub round_seconds: u32,
    #[serde(default = "default_collectibles")]
    pub collectible_count: usize,
}

fn default_layout() -> WallLayout {
    WallLayout::Classic
}

fn default_lives() -> u32 {
    3
}

fn default_round_seconds() -> u32 {
    60
}

fn default_collectibles() -> usize {
    10
}

/// Upper bounds accepted from clients; layouts beyond these do not fit the field.
pub const MAX_COLLECTIBLES: usize = 50;
pub const MAX_RANDOM_WALLS: usize = 20;

impl HuntConfig {
    /// Reject configs that would start a round already lost or too large to lay out.
    pub fn validate(&self) -> Result<()> {
        if self.start_lives == 0 {
            return Err(ArcadeError::InvalidConfig("start_lives must be at least 1".to_string()));
        }
        if self.round_seconds == 0 {
            return Err(ArcadeError::InvalidConfig("round_seconds must be at least 1".to_string()));
        }
        if self.collectible_count > MAX_COLLECTIBLES {
            return Err(ArcadeError::InvalidConfig(format!(
                "collectible_count must be at most {}",
                MAX_COLLECTIBLES
            )));
        }
        if let WallLayout::Random { count } = self.wall_layout {
            if count > MAX_RANDOM_WALLS {
                return Err(ArcadeError::InvalidConfig(format!(
                    "random wall count must be at most {}",
                    MAX_RANDOM_WALLS
                )));
            }
        }
        Ok(())
    }
}

impl Default for HuntConfig {
    fn default() -> Self {
        Self {
            show_instructions: false,
            wall_layout: default_layout(),
            start_lives: default_lives(),
            round_seconds: default_round_seconds(),
            collectible_count: default_collectibles(),
        }
    }
}

//
// ================= State =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HuntPhase {
    Instructions,
    Playing,
    Challenge,
    Won,
    GameOver,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CollectibleKind {
    Coin,
    Note,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Collectible {
    pub id: u32,
    pub position: Position,
    pub value: u32,
    pub kind: CollectibleKind,
    pub collected: bool,
}

impl Collectible {
    pub fn new(id: u32, position: Position, value: u32, kind: CollectibleKind) -> Self {
        Self {
            id,
            position,
            value,
            kind,
            collected: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Challenge {
    pub collectible_id: u32,
    pub value: u32,
    pub options: Vec<ChallengeOption>,
}

/// Explicit round layout, mostly for scripted sessions and tests.
#[derive(Debug, Clone)]
pub struct RoundSetup {
    pub target: ShopItem,
    pub walls: Vec<Rect>,
    pub collectibles: Vec<Collectible>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum KeyOutcome {
    Ignored,
    Started,
    Blocked,
    Moved { position: Position },
    ChallengeOpened { collectible_id: u32, value: u32 },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum TickOutcome {
    Ignored,
    Counting { time_left: u32 },
    Expired { lives: u32 },
    GameOver,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum AnswerOutcome {
    Correct {
        value: u32,
        inventory_total: u32,
        awards: Vec<BadgeAward>,
        won: bool,
    },
    Wrong {
        lives: u32,
        game_over: bool,
    },
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RoundOutcome {
    InProgress,
    Won,
    GameOver,
}

/// Serializable snapshot of the whole round
#[derive(Debug, Clone, Serialize)]
pub struct HuntView {
    pub phase: HuntPhase,
    pub outcome: RoundOutcome,
    pub round: u32,
    pub player: Position,
    pub walls: Vec<Rect>,
    pub collectibles: Vec<Collectible>,
    pub inventory: Vec<Collectible>,
    pub inventory_total: u32,
    pub target: ShopItem,
    pub score: u32,
    pub lives: u32,
    pub time_left: u32,
    pub challenge: Option<Challenge>,
    pub badges: Vec<String>,
    pub stars: u32,
}

pub struct TreasureHunt {
    config: HuntConfig,
    rng: ChaCha8Rng,
    phase: HuntPhase,
    round: u32,
    player: Position,
    walls: Vec<Rect>,
    collectibles: Vec<Collectible>,
    inventory: Vec<Collectible>,
    target: ShopItem,
    score: u32,
    lives: u32,
    lives_lost: u32,
    time_left: u32,
    challenge: Option<Challenge>,
    badges: BadgeBook,
}

impl TreasureHunt {
    /// New randomly generated round. The first goal is always the first goal item.
    pub fn new(config: HuntConfig, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let walls = build_walls(config.wall_layout, &mut rng);
        let collectibles = scatter_collectibles(&walls, config.collectible_count, &mut rng);
        let setup = RoundSetup {
            target: GOAL_ITEMS[0],
            walls,
            collectibles,
        };
        Self::assemble(config, rng, setup)
    }

    /// Round with a fixed layout. Later resets are still random.
    pub fn with_setup(config: HuntConfig, seed: u64, setup: RoundSetup) -> Self {
        Self::assemble(config, ChaCha8Rng::seed_from_u64(seed), setup)
    }

    fn assemble(config: HuntConfig, rng: ChaCha8Rng, setup: RoundSetup) -> Self {
        let phase = if config.show_instructions {
            HuntPhase::Instructions
        } else {
            HuntPhase::Playing
        };

        Self {
            lives: config.start_lives,
            time_left: config.round_seconds,
            config,
            rng,
            phase,
            round: 1,
            player: PLAYER_START,
            walls: setup.walls,
            collectibles: setup.collectibles,
            inventory: Vec::new(),
            target: setup.target,
            score: 0,
            lives_lost: 0,
            challenge: None,
            badges: create_default_badge_book(),
        }
    }

    pub fn phase(&self) -> HuntPhase {
        self.phase
    }

    pub fn player(&self) -> Position {
        self.player
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn target(&self) -> &ShopItem {
        &self.target
    }

    pub fn collectibles(&self) -> &[Collectible] {
        &self.collectibles
    }

    pub fn inventory(&self) -> &[Collectible] {
        &self.inventory
    }

    pub fn challenge(&self) -> Option<&Challenge> {
        self.challenge.as_ref()
    }

    pub fn walls(&self) -> &[Rect] {
        &self.walls
    }

    pub fn inventory_total(&self) -> u32 {
        self.inventory.iter().map(|c| c.value).sum()
    }

    /// True iff the banked money covers the goal price.
    pub fn check_win(&self) -> bool {
        self.inventory_total() >= self.target.price
    }

    /// Game over wins ties: a round with no lives left is never won.
    pub fn outcome(&self) -> RoundOutcome {
        if self.lives == 0 {
            RoundOutcome::GameOver
        } else if self.check_win() {
            RoundOutcome::Won
        } else {
            RoundOutcome::InProgress
        }
    }

    pub fn start(&mut self) -> KeyOutcome {
        if self.phase != HuntPhase::Instructions {
            return KeyOutcome::Ignored;
        }
        self.phase = HuntPhase::Playing;
        debug!("Treasure hunt started");
        KeyOutcome::Started
    }

    pub fn handle_key(&mut self, key: GameKey) -> KeyOutcome {
        match key {
            GameKey::Move(direction) => self.move_player(direction),
            GameKey::Action => self.start(),
        }
    }

    /// One step in `direction`; walls block the whole step.
    pub fn move_player(&mut self, direction: Direction) -> KeyOutcome {
        if self.phase != HuntPhase::Playing {
            return KeyOutcome::Ignored;
        }

        let candidate = direction.step(self.player, STEP, &FIELD);
        let body = Rect::square_at(candidate, PLAYER_SIZE);
        if self.walls.iter().any(|wall| wall.intersects(&body)) {
            debug!(%direction, "Move blocked by wall");
            return KeyOutcome::Blocked;
        }

        self.player = candidate;
        self.proximity_check()
            .unwrap_or(KeyOutcome::Moved { position: candidate })
    }

    /// Open a challenge for the first uncollected collectible in reach.
    fn proximity_check(&mut self) -> Option<KeyOutcome> {
        let (id, value) = self
            .collectibles
            .iter()
            .find(|c| !c.collected && self.player.within_box(&c.position, PICKUP_RADIUS))
            .map(|c| (c.id, c.value))?;

        let options = generate_options(CATALOG, value, &mut self.rng);
        self.challenge = Some(Challenge {
            collectible_id: id,
            value,
            options,
        });
        self.phase = HuntPhase::Challenge;
        debug!(collectible_id = id, value, "Challenge opened");

        Some(KeyOutcome::ChallengeOpened {
            collectible_id: id,
            value,
        })
    }

    /// Once-per-second timer callback.
    pub fn tick(&mut self) -> TickOutcome {
        if !matches!(self.phase, HuntPhase::Playing | HuntPhase::Challenge) {
            return TickOutcome::Ignored;
        }

        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left > 0 {
            return TickOutcome::Counting {
                time_left: self.time_left,
            };
        }

        self.time_left = self.config.round_seconds;
        self.lose_life();
        debug!(lives = self.lives, "Timer expired");

        if self.phase == HuntPhase::GameOver {
            TickOutcome::GameOver
        } else {
            TickOutcome::Expired { lives: self.lives }
        }
    }

    /// Pick option `index` of the open challenge.
    pub fn answer(&mut self, index: usize) -> Result<AnswerOutcome> {
        if self.phase != HuntPhase::Challenge {
            return Err(ArcadeError::transition(self.phase, "answer"));
        }
        let challenge = self
            .challenge
            .as_ref()
            .ok_or_else(|| ArcadeError::transition(self.phase, "answer"))?;
        let option = challenge
            .options
            .get(index)
            .ok_or(ArcadeError::InvalidOption(index))?;

        let correct = option.price <= challenge.value;
        let collectible_id = challenge.collectible_id;
        self.challenge = None;
        self.phase = HuntPhase::Playing;

        if !correct {
            self.lose_life();
            return Ok(AnswerOutcome::Wrong {
                lives: self.lives,
                game_over: self.phase == HuntPhase::GameOver,
            });
        }

        let collectible = self
            .collectibles
            .iter_mut()
            .find(|c| c.id == collectible_id && !c.collected)
            .ok_or_else(|| ArcadeError::transition(HuntPhase::Challenge, "collect"))?;
        collectible.collected = true;
        let value = collectible.value;
        self.inventory.push(collectible.clone());
        self.score += SCORE_PER_PICKUP;

        let awards = self.badges.evaluate(&CollectionContext {
            collected_count: self.inventory.len(),
            inventory_total: self.inventory_total(),
            target: self.target.price,
            time_left: self.time_left,
            lives_lost: self.lives_lost,
        });

        let won = self.check_win();
        if won {
            self.phase = HuntPhase::Won;
            info!(
                round = self.round,
                total = self.inventory_total(),
                target = self.target.price,
                "Treasure hunt won"
            );
        }

        Ok(AnswerOutcome::Correct {
            value,
            inventory_total: self.inventory_total(),
            awards,
            won,
        })
    }

    fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        self.lives_lost += 1;
        if self.lives == 0 {
            self.phase = HuntPhase::GameOver;
            self.challenge = None;
            info!(round = self.round, score = self.score, "Treasure hunt over");
        }
    }

    /// Fresh round: counters zeroed, new goal, walls and collectibles.
    pub fn reset(&mut self) {
        self.round += 1;
        self.player = PLAYER_START;
        self.score = 0;
        self.lives = self.config.start_lives;
        self.lives_lost = 0;
        self.time_left = self.config.round_seconds;
        self.inventory.clear();
        self.challenge = None;
        if let Some(goal) = GOAL_ITEMS.choose(&mut self.rng) {
            self.target = *goal;
        }
        self.walls = build_walls(self.config.wall_layout, &mut self.rng);
        self.collectibles =
            scatter_collectibles(&self.walls, self.config.collectible_count, &mut self.rng);
        self.phase = HuntPhase::Playing;
        debug!(round = self.round, target = self.target.name, "Round reset");
    }

    /// Record a won round in the player's kid zone progress.
    pub fn record_completion(&self, progress: &mut PlayerProgress) -> bool {
        if self.phase != HuntPhase::Won {
            return false;
        }
        progress.mark_kid_zone_completed(1);
        true
    }

    pub fn view(&self) -> HuntView {
        HuntView {
            phase: self.phase,
            outcome: self.outcome(),
            round: self.round,
            player: self.player,
            walls: self.walls.clone(),
            collectibles: self.collectibles.clone(),
            inventory: self.inventory.clone(),
            inventory_total: self.inventory_total(),
            target: self.target,
            score: self.score,
            lives: self.lives,
            time_left: self.time_left,
            challenge: self.challenge.clone(),
            badges: self.badges.badges().to_vec(),
            stars: self.badges.stars(),
        }
    }
}

//
// ================= Generation =================
//

fn build_walls(layout: WallLayout, rng: &mut ChaCha8Rng) -> Vec<Rect> {
    match layout {
        WallLayout::Classic => CLASSIC_WALLS.to_vec(),
        WallLayout::Random { count } => random_walls(count, rng),
    }
}

fn random_walls(count: usize, rng: &mut ChaCha8Rng) -> Vec<Rect> {
    const MAX_ATTEMPTS: usize = 50;
    let spawn = Rect::square_at(PLAYER_START, PLAYER_SIZE).inflate(STEP * 2.0);
    let mut walls = Vec::with_capacity(count);

    for _ in 0..count * MAX_ATTEMPTS {
        if walls.len() == count {
            break;
        }
        let (w, h) = if rng.gen_bool(0.5) {
            (rng.gen_range(60.0..160.0), 20.0)
        } else {
            (20.0, rng.gen_range(60.0..120.0))
        };
        let wall = Rect::new(
            rng.gen_range(FIELD.min_x + 80.0..FIELD.max_x - 160.0),
            rng.gen_range(FIELD.min_y + 30.0..FIELD.max_y - 140.0),
            w,
            h,
        );
        if !wall.intersects(&spawn) && !wall.intersects(&GOAL_AREA) {
            walls.push(wall);
        }
    }

    walls
}

fn scatter_collectibles(walls: &[Rect], count: usize, rng: &mut ChaCha8Rng) -> Vec<Collectible> {
    let area = PlacementArea {
        region: Rect::new(75.0, 150.0, 550.0, 350.0),
        clearance: 40.0,
        reserved: vec![GOAL_AREA],
        max_attempts: 50,
    };

    place_entities(walls, &area, count, rng)
        .into_iter()
        .enumerate()
        .map(|(id, position)| {
            let (kind, values) = if rng.gen_bool(COIN_PROBABILITY) {
                (CollectibleKind::Coin, COIN_VALUES)
            } else {
                (CollectibleKind::Note, NOTE_VALUES)
            };
            let value = values.choose(rng).copied().unwrap_or(1);
            Collectible::new(id as u32, position, value, kind)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BALL: usize = 3;

    /// Two collectibles east of the start, one step apart from each other.
    fn scripted(values: [u32; 2]) -> TreasureHunt {
        let setup = RoundSetup {
            target: GOAL_ITEMS[BALL],
            walls: CLASSIC_WALLS.to_vec(),
            collectibles: vec![
                Collectible::new(0, Position::new(140.0, 500.0), values[0], CollectibleKind::Note),
                Collectible::new(1, Position::new(180.0, 500.0), values[1], CollectibleKind::Coin),
            ],
        };
        TreasureHunt::with_setup(HuntConfig::default(), 1, setup)
    }

    fn option_index(game: &TreasureHunt, correct: bool) -> usize {
        let challenge = game.challenge().expect("challenge open");
        challenge
            .options
            .iter()
            .position(|o| (o.price <= challenge.value) == correct)
            .expect("option exists")
    }

    #[test]
    fn test_collect_to_target_wins() {
        let mut game = scripted([10, 5]);
        assert_eq!(game.target().price, 15);

        let outcome = game.move_player(Direction::Right);
        assert_eq!(outcome, KeyOutcome::ChallengeOpened { collectible_id: 0, value: 10 });
        let idx = option_index(&game, true);
        game.answer(idx).unwrap();
        assert!(!game.check_win());

        // (140, 500): first collectible is gone, second still out of reach
        assert_eq!(game.move_player(Direction::Right), KeyOutcome::Moved { position: Position::new(140.0, 500.0) });
        let outcome = game.move_player(Direction::Right);
        assert_eq!(outcome, KeyOutcome::ChallengeOpened { collectible_id: 1, value: 5 });
        let idx = option_index(&game, true);
        let result = game.answer(idx).unwrap();

        assert!(matches!(result, AnswerOutcome::Correct { won: true, inventory_total: 15, .. }));
        assert_eq!(game.inventory_total(), 15);
        assert!(game.check_win());
        assert_eq!(game.phase(), HuntPhase::Won);
        assert_eq!(game.score(), 20);
    }

    #[test]
    fn test_three_wrong_answers_end_the_game() {
        let mut game = scripted([10, 5]);
        game.move_player(Direction::Right);

        for expected_lives in [2, 1, 0] {
            let idx = option_index(&game, false);
            let result = game.answer(idx).unwrap();
            assert_eq!(
                result,
                AnswerOutcome::Wrong { lives: expected_lives, game_over: expected_lives == 0 }
            );
            if expected_lives > 0 {
                // Step away and back to reopen the same collectible
                game.move_player(Direction::Left);
                game.move_player(Direction::Right);
                assert_eq!(game.phase(), HuntPhase::Challenge);
            }
        }

        assert_eq!(game.lives(), 0);
        assert_eq!(game.phase(), HuntPhase::GameOver);
        assert_eq!(game.outcome(), RoundOutcome::GameOver);
        assert!(!game.check_win());
        assert!(!game.collectibles()[0].collected);
    }

    #[test]
    fn test_timer_can_end_a_round() {
        let mut game = scripted([20, 5]);
        game.move_player(Direction::Right);
        let idx = option_index(&game, true);
        game.answer(idx).unwrap();
        assert_eq!(game.outcome(), RoundOutcome::Won);

        // Drain lives through the timer after banking part of the goal
        let mut game = scripted([10, 5]);
        game.move_player(Direction::Right);
        let idx = option_index(&game, true);
        game.answer(idx).unwrap();
        for _ in 0..(60 * 3) {
            game.tick();
        }
        assert_eq!(game.lives(), 0);
        assert_eq!(game.outcome(), RoundOutcome::GameOver);
    }

    #[test]
    fn test_collected_items_never_reopen() {
        let mut game = scripted([10, 5]);
        game.move_player(Direction::Right);
        let idx = option_index(&game, true);
        game.answer(idx).unwrap();

        // Walk off and back onto the collected note
        assert!(matches!(game.move_player(Direction::Left), KeyOutcome::Moved { .. }));
        assert!(matches!(game.move_player(Direction::Right), KeyOutcome::Moved { .. }));
        assert_eq!(game.phase(), HuntPhase::Playing);
        assert_eq!(game.inventory().len(), 1);
    }

    #[test]
    fn test_wrong_answer_keeps_inventory_sum() {
        let mut game = scripted([10, 5]);
        game.move_player(Direction::Right);
        let idx = option_index(&game, true);
        game.answer(idx).unwrap();
        let before = game.inventory_total();

        game.move_player(Direction::Right);
        game.move_player(Direction::Right);
        let idx = option_index(&game, false);
        game.answer(idx).unwrap();
        assert_eq!(game.inventory_total(), before);
    }

    #[test]
    fn test_timer_expiry_costs_one_life() {
        let mut game = scripted([10, 5]);
        game.move_player(Direction::Right);
        let idx = option_index(&game, true);
        game.answer(idx).unwrap();

        for _ in 0..59 {
            assert!(matches!(game.tick(), TickOutcome::Counting { .. }));
        }
        assert_eq!(game.time_left(), 1);
        assert_eq!(game.tick(), TickOutcome::Expired { lives: 2 });
        assert_eq!(game.time_left(), 60);
        assert_eq!(game.inventory_total(), 10);
        assert_eq!(game.player(), Position::new(120.0, 500.0));
    }

    #[test]
    fn test_movement_blocked_outside_playing() {
        let mut game = scripted([10, 5]);
        game.move_player(Direction::Right);
        assert_eq!(game.phase(), HuntPhase::Challenge);
        assert_eq!(game.move_player(Direction::Up), KeyOutcome::Ignored);
        assert!(game.answer(99).is_err());
        assert_eq!(game.phase(), HuntPhase::Challenge);
    }

    #[test]
    fn test_answer_outside_challenge_is_rejected() {
        let mut game = scripted([10, 5]);
        assert!(matches!(game.answer(0), Err(ArcadeError::InvalidTransition { .. })));
    }

    #[test]
    fn test_walls_block_movement() {
        let setup = RoundSetup {
            target: GOAL_ITEMS[0],
            walls: vec![Rect::new(140.0, 490.0, 20.0, 60.0)],
            collectibles: vec![],
        };
        let mut game = TreasureHunt::with_setup(HuntConfig::default(), 1, setup);
        assert_eq!(game.move_player(Direction::Right), KeyOutcome::Blocked);
        assert_eq!(game.player(), PLAYER_START);
    }

    #[test]
    fn test_movement_clamped_to_field() {
        let setup = RoundSetup {
            target: GOAL_ITEMS[0],
            walls: vec![],
            collectibles: vec![],
        };
        let mut game = TreasureHunt::with_setup(HuntConfig::default(), 1, setup);
        for _ in 0..10 {
            game.move_player(Direction::Down);
            game.move_player(Direction::Left);
        }
        assert_eq!(game.player(), Position::new(FIELD.min_x, FIELD.max_y));
    }

    #[test]
    fn test_instructions_gate_input() {
        let config = HuntConfig {
            show_instructions: true,
            ..HuntConfig::default()
        };
        let mut game = TreasureHunt::new(config, 9);
        assert_eq!(game.phase(), HuntPhase::Instructions);
        assert_eq!(game.tick(), TickOutcome::Ignored);
        assert_eq!(game.handle_key(GameKey::Move(Direction::Up)), KeyOutcome::Ignored);
        assert_eq!(game.handle_key(GameKey::Action), KeyOutcome::Started);
        assert_eq!(game.phase(), HuntPhase::Playing);
    }

    #[test]
    fn test_generated_round_respects_layout() {
        let game = TreasureHunt::new(HuntConfig::default(), 2024);
        assert_eq!(game.collectibles().len(), 10);
        assert_eq!(game.target().name, "Cupcake");
        for c in game.collectibles() {
            let allowed = match c.kind {
                CollectibleKind::Coin => COIN_VALUES,
                CollectibleKind::Note => NOTE_VALUES,
            };
            assert!(allowed.contains(&c.value));
            assert!(!c.collected);
        }
    }

    #[test]
    fn test_reset_restores_counters_and_keeps_badges() {
        let mut game = scripted([10, 5]);
        game.move_player(Direction::Right);
        let idx = option_index(&game, true);
        game.answer(idx).unwrap();
        let stars = game.view().stars;

        game.reset();
        assert_eq!(game.phase(), HuntPhase::Playing);
        assert_eq!(game.score(), 0);
        assert_eq!(game.lives(), 3);
        assert_eq!(game.time_left(), 60);
        assert!(game.inventory().is_empty());
        assert_eq!(game.player(), PLAYER_START);
        assert_eq!(game.collectibles().len(), 10);
        assert!(GOAL_ITEMS.iter().any(|g| g.name == game.target().name));
        assert_eq!(game.view().stars, stars);
    }

    #[test]
    fn test_random_walls_avoid_spawn() {
        let config = HuntConfig {
            wall_layout: WallLayout::Random { count: 5 },
            ..HuntConfig::default()
        };
        let game = TreasureHunt::new(config, 77);
        let spawn = Rect::square_at(PLAYER_START, PLAYER_SIZE);
        assert!(game.walls().iter().all(|w| !w.intersects(&spawn)));
    }

    #[test]
    fn test_record_completion_only_when_won() {
        let mut progress = PlayerProgress::default();
        let mut game = scripted([20, 5]);
        assert!(!game.record_completion(&mut progress));

        game.move_player(Direction::Right);
        let idx = option_index(&game, true);
        game.answer(idx).unwrap();
        assert!(game.record_completion(&mut progress));
        assert_eq!(progress.kid_zone_completed, 1);
    }

    #[test]
    fn test_win_boundary_around_target() {
        // Ball costs 15; bank a single collectible of each value
        for (value, wins) in [(14, false), (15, true), (16, true)] {
            let mut game = scripted([value, 1]);
            game.move_player(Direction::Right);
            let idx = option_index(&game, true);
            game.answer(idx).unwrap();

            assert_eq!(game.inventory_total(), value);
            assert_eq!(game.check_win(), wins, "inventory {}", value);
            let expected = if wins { RoundOutcome::Won } else { RoundOutcome::InProgress };
            assert_eq!(game.outcome(), expected, "inventory {}", value);
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(HuntConfig::default().validate().is_ok());

        let no_lives = HuntConfig { start_lives: 0, ..HuntConfig::default() };
        assert!(matches!(no_lives.validate(), Err(ArcadeError::InvalidConfig(_))));

        let no_time = HuntConfig { round_seconds: 0, ..HuntConfig::default() };
        assert!(matches!(no_time.validate(), Err(ArcadeError::InvalidConfig(_))));

        let crowded = HuntConfig { collectible_count: MAX_COLLECTIBLES + 1, ..HuntConfig::default() };
        assert!(matches!(crowded.validate(), Err(ArcadeError::InvalidConfig(_))));

        let walled = HuntConfig {
            wall_layout: WallLayout::Random { count: usize::MAX },
            ..HuntConfig::default()
        };
        assert!(matches!(walled.validate(), Err(ArcadeError::InvalidConfig(_))));

        let at_limits = HuntConfig {
            wall_layout: WallLayout::Random { count: MAX_RANDOM_WALLS },
            collectible_count: MAX_COLLECTIBLES,
            start_lives: 1,
            round_seconds: 1,
            ..HuntConfig::default()
        };
        assert!(at_limits.validate().is_ok());
    }
}
