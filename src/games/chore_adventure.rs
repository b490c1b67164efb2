//! Chore Adventure engine
//!
//! The player walks through three rooms, presses the action key next to a
//! chore to earn coins, and spends them in a small cosmetics shop. Finishing
//! every chore completes the level and pays a bonus.
//!
//! Coins, level and unlocked items live in [`PlayerProgress`]. The engine
//! marks the progress dirty after each mutation; callers persist it with
//! [`ChoreAdventure::take_dirty_progress`].

use crate::error::ArcadeError;
use crate::models::{Bounds, Direction, GameKey, Position, Rect};
use crate::progress::{PlayerProgress, CHORE_ADVENTURE_KEY};
use crate::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const FIELD: Bounds = Bounds::new(50.0, 950.0, 50.0, 550.0);
pub const PLAYER_START: Position = Position::new(70.0, 450.0);
pub const STEP: f32 = 20.0;
pub const CHORE_RADIUS: f32 = 80.0;
pub const LEVEL_BONUS: u32 = 10;
pub const LEVEL_PROGRESS_PERCENT: u32 = 20;

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Room {
    pub name: &'static str,
    pub area: Rect,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChoreSize {
    Simple,
    Medium,
    Big,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Chore {
    pub id: u32,
    pub room: &'static str,
    pub size: ChoreSize,
    pub name: &'static str,
    pub icon: &'static str,
    pub spot: Position,
    pub reward: u32,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ShopOffer {
    pub item: &'static str,
    pub price: u32,
    pub unlock_key: &'static str,
    pub sprite: &'static str,
}

pub const ROOMS: &[Room] = &[
    Room { name: "Bedroom", area: Rect::new(0.0, 0.0, 340.0, 500.0) },
    Room { name: "Hall", area: Rect::new(340.0, 0.0, 340.0, 500.0) },
    Room { name: "Garden", area: Rect::new(680.0, 0.0, 320.0, 500.0) },
];

pub const CHORES: &[Chore] = &[
    Chore { id: 1, room: "Bedroom", size: ChoreSize::Simple, name: "Make Bed", icon: "🛏️", spot: Position::new(100.0, 100.0), reward: 2 },
    Chore { id: 2, room: "Bedroom", size: ChoreSize::Medium, name: "Pick Toys", icon: "🧸", spot: Position::new(120.0, 250.0), reward: 3 },
    Chore { id: 3, room: "Hall", size: ChoreSize::Simple, name: "Wipe Table", icon: "🧽", spot: Position::new(370.0, 120.0), reward: 2 },
    Chore { id: 4, room: "Hall", size: ChoreSize::Big, name: "Feed Pet", icon: "🐶", spot: Position::new(420.0, 320.0), reward: 4 },
    Chore { id: 5, room: "Garden", size: ChoreSize::Medium, name: "Water Plants", icon: "🌱", spot: Position::new(775.0, 200.0), reward: 3 },
];

pub const SHOP: &[ShopOffer] = &[
    ShopOffer { item: "Hat", price: 10, unlock_key: "hat", sprite: "🧢" },
    ShopOffer { item: "Shirt", price: 15, unlock_key: "shirt", sprite: "👕" },
    ShopOffer { item: "Room Decor", price: 20, unlock_key: "decor", sprite: "🖼️" },
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChorePhase {
    Instructions,
    Playing,
    Shop,
    Celebration,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum ChoreEvent {
    Ignored,
    Started,
    Moved { position: Position, near_chore: Option<u32> },
    ChoreDone { chore: &'static str, coins: u32 },
    LevelComplete { chore: &'static str, bonus: u32, level: u32 },
    ShopOpened,
    ShopClosed,
    Bought { item: &'static str, coins_left: u32 },
    AlreadyOwned { item: &'static str },
    NotEnoughCoins { item: &'static str, needed: u32 },
    NextLevel { level: u32 },
}

#[derive(Debug, Clone, Serialize)]
pub struct ChoreView {
    pub phase: ChorePhase,
    pub player: Position,
    pub rooms: &'static [Room],
    pub chores: &'static [Chore],
    pub completed: Vec<u32>,
    pub near_chore: Option<u32>,
    pub shop: &'static [ShopOffer],
    pub progress: PlayerProgress,
}

pub struct ChoreAdventure {
    phase: ChorePhase,
    player: Position,
    completed: Vec<u32>,
    near_chore: Option<u32>,
    progress: PlayerProgress,
    dirty: bool,
}

impl ChoreAdventure {
    /// Start a session on top of previously saved progress.
    pub fn new(progress: PlayerProgress) -> Self {
        Self {
            phase: ChorePhase::Instructions,
            player: PLAYER_START,
            completed: Vec::new(),
            near_chore: None,
            progress,
            dirty: false,
        }
    }

    pub fn phase(&self) -> ChorePhase {
        self.phase
    }

    pub fn player(&self) -> Position {
        self.player
    }

    pub fn progress(&self) -> &PlayerProgress {
        &self.progress
    }

    pub fn near_chore(&self) -> Option<u32> {
        self.near_chore
    }

    pub fn completed(&self) -> &[u32] {
        &self.completed
    }

    /// Progress to persist, if anything changed since the last call.
    pub fn take_dirty_progress(&mut self) -> Option<PlayerProgress> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(self.progress.clone())
    }

    /// Hand the progress back after a failed save so the next call retries it.
    pub fn mark_unsaved(&mut self) {
        self.dirty = true;
    }

    pub fn start(&mut self) -> ChoreEvent {
        if self.phase != ChorePhase::Instructions {
            return ChoreEvent::Ignored;
        }
        self.phase = ChorePhase::Playing;
        self.refresh_near_chore();
        ChoreEvent::Started
    }

    pub fn handle_key(&mut self, key: GameKey) -> ChoreEvent {
        match key {
            GameKey::Move(direction) => self.move_player(direction),
            GameKey::Action => self.act(),
        }
    }

    pub fn move_player(&mut self, direction: Direction) -> ChoreEvent {
        if self.phase != ChorePhase::Playing {
            return ChoreEvent::Ignored;
        }
        self.player = direction.step(self.player, STEP, &FIELD);
        self.refresh_near_chore();
        ChoreEvent::Moved {
            position: self.player,
            near_chore: self.near_chore,
        }
    }

    /// Action key: finish the nearby chore, if any.
    pub fn act(&mut self) -> ChoreEvent {
        if self.phase != ChorePhase::Playing {
            return ChoreEvent::Ignored;
        }
        let Some(chore) = self
            .near_chore
            .and_then(|id| CHORES.iter().find(|c| c.id == id))
        else {
            return ChoreEvent::Ignored;
        };
        self.complete_chore(chore)
    }

    fn complete_chore(&mut self, chore: &'static Chore) -> ChoreEvent {
        if self.completed.contains(&chore.id) {
            return ChoreEvent::Ignored;
        }

        self.completed.push(chore.id);
        self.progress.chore_coins += chore.reward;
        self.dirty = true;
        self.refresh_near_chore();
        debug!(chore = chore.name, coins = self.progress.chore_coins, "Chore done");

        if self.completed.len() < CHORES.len() {
            return ChoreEvent::ChoreDone {
                chore: chore.name,
                coins: chore.reward,
            };
        }

        self.progress.chore_coins += LEVEL_BONUS;
        self.progress
            .add_game_progress(CHORE_ADVENTURE_KEY, LEVEL_PROGRESS_PERCENT);
        self.progress.chore_level += 1;
        self.phase = ChorePhase::Celebration;
        info!(
            level = self.progress.chore_level,
            coins = self.progress.chore_coins,
            "Chore level complete"
        );

        ChoreEvent::LevelComplete {
            chore: chore.name,
            bonus: LEVEL_BONUS,
            level: self.progress.chore_level,
        }
    }

    fn refresh_near_chore(&mut self) {
        self.near_chore = CHORES
            .iter()
            .filter(|c| !self.completed.contains(&c.id))
            .find(|c| self.player.distance(&c.spot) < CHORE_RADIUS)
            .map(|c| c.id);
    }

    pub fn open_shop(&mut self) -> Result<ChoreEvent> {
        if self.phase != ChorePhase::Playing {
            return Err(ArcadeError::transition(self.phase, "open_shop"));
        }
        self.phase = ChorePhase::Shop;
        Ok(ChoreEvent::ShopOpened)
    }

    pub fn close_shop(&mut self) -> Result<ChoreEvent> {
        if self.phase != ChorePhase::Shop {
            return Err(ArcadeError::transition(self.phase, "close_shop"));
        }
        self.phase = ChorePhase::Playing;
        Ok(ChoreEvent::ShopClosed)
    }

    /// Buy by unlock key. Owned items and short funds are reported, not errors.
    pub fn buy(&mut self, unlock_key: &str) -> Result<ChoreEvent> {
        if self.phase != ChorePhase::Shop {
            return Err(ArcadeError::transition(self.phase, "buy"));
        }
        let offer = SHOP
            .iter()
            .find(|o| o.unlock_key == unlock_key)
            .ok_or_else(|| ArcadeError::UnknownShopItem(unlock_key.to_string()))?;

        if self.progress.owns(offer.unlock_key) {
            return Ok(ChoreEvent::AlreadyOwned { item: offer.item });
        }
        if self.progress.chore_coins < offer.price {
            return Ok(ChoreEvent::NotEnoughCoins {
                item: offer.item,
                needed: offer.price - self.progress.chore_coins,
            });
        }

        self.progress.chore_coins -= offer.price;
        self.progress.chore_items.push(offer.unlock_key.to_string());
        self.dirty = true;
        info!(item = offer.item, coins_left = self.progress.chore_coins, "Shop purchase");

        Ok(ChoreEvent::Bought {
            item: offer.item,
            coins_left: self.progress.chore_coins,
        })
    }

    /// Leave the celebration screen with a fresh set of chores.
    pub fn next_level(&mut self) -> Result<ChoreEvent> {
        if self.phase != ChorePhase::Celebration {
            return Err(ArcadeError::transition(self.phase, "next_level"));
        }
        self.completed.clear();
        self.phase = ChorePhase::Playing;
        self.refresh_near_chore();
        Ok(ChoreEvent::NextLevel {
            level: self.progress.chore_level,
        })
    }

    pub fn view(&self) -> ChoreView {
        ChoreView {
            phase: self.phase,
            player: self.player,
            rooms: ROOMS,
            chores: CHORES,
            completed: self.completed.clone(),
            near_chore: self.near_chore,
            shop: SHOP,
            progress: self.progress.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(progress: PlayerProgress) -> ChoreAdventure {
        let mut game = ChoreAdventure::new(progress);
        assert_eq!(game.start(), ChoreEvent::Started);
        game
    }

    /// Drive the player to `target` along the step grid, x first.
    fn walk_to(game: &mut ChoreAdventure, target: Position) {
        while (game.player().x - target.x).abs() >= STEP {
            let dir = if game.player().x < target.x { Direction::Right } else { Direction::Left };
            game.move_player(dir);
        }
        while (game.player().y - target.y).abs() >= STEP {
            let dir = if game.player().y < target.y { Direction::Down } else { Direction::Up };
            game.move_player(dir);
        }
    }

    fn do_all_chores(game: &mut ChoreAdventure) -> ChoreEvent {
        let mut last = ChoreEvent::Ignored;
        for chore in CHORES {
            walk_to(game, chore.spot);
            assert_eq!(game.near_chore(), Some(chore.id), "near {}", chore.name);
            last = game.act();
        }
        last
    }

    #[test]
    fn test_input_ignored_before_start() {
        let mut game = ChoreAdventure::new(PlayerProgress::default());
        assert_eq!(game.move_player(Direction::Up), ChoreEvent::Ignored);
        assert_eq!(game.player(), PLAYER_START);
    }

    #[test]
    fn test_chore_pays_once() {
        let mut game = started(PlayerProgress::default());
        walk_to(&mut game, CHORES[0].spot);
        assert_eq!(
            game.act(),
            ChoreEvent::ChoreDone { chore: "Make Bed", coins: 2 }
        );
        assert_eq!(game.act(), ChoreEvent::Ignored);
        assert_eq!(game.progress().chore_coins, 2);
        assert!(game.take_dirty_progress().is_some());
        assert!(game.take_dirty_progress().is_none());

        game.mark_unsaved();
        assert_eq!(game.take_dirty_progress().map(|p| p.chore_coins), Some(2));
    }

    #[test]
    fn test_action_away_from_chores_does_nothing() {
        let mut game = started(PlayerProgress::default());
        assert_eq!(game.handle_key(GameKey::Action), ChoreEvent::Ignored);
        assert!(game.take_dirty_progress().is_none());
    }

    #[test]
    fn test_level_completion_pays_bonus() {
        let mut game = started(PlayerProgress::default());
        let last = do_all_chores(&mut game);

        assert_eq!(
            last,
            ChoreEvent::LevelComplete { chore: "Water Plants", bonus: 10, level: 2 }
        );
        assert_eq!(game.phase(), ChorePhase::Celebration);
        // 2 + 3 + 2 + 4 + 3 + bonus
        assert_eq!(game.progress().chore_coins, 24);
        assert_eq!(game.progress().kid_zone_progress[CHORE_ADVENTURE_KEY], 20);

        assert_eq!(game.move_player(Direction::Up), ChoreEvent::Ignored);
        assert_eq!(game.next_level().unwrap(), ChoreEvent::NextLevel { level: 2 });
        assert!(game.completed().is_empty());
    }

    #[test]
    fn test_shop_purchase_rules() {
        let mut progress = PlayerProgress::default();
        progress.chore_coins = 12;
        let mut game = started(progress);

        assert!(game.buy("hat").is_err());
        game.open_shop().unwrap();
        assert_eq!(game.move_player(Direction::Up), ChoreEvent::Ignored);

        assert_eq!(
            game.buy("shirt").unwrap(),
            ChoreEvent::NotEnoughCoins { item: "Shirt", needed: 3 }
        );
        assert_eq!(
            game.buy("hat").unwrap(),
            ChoreEvent::Bought { item: "Hat", coins_left: 2 }
        );
        assert_eq!(game.buy("hat").unwrap(), ChoreEvent::AlreadyOwned { item: "Hat" });
        assert!(matches!(game.buy("cape"), Err(ArcadeError::UnknownShopItem(_))));

        let saved = game.take_dirty_progress().unwrap();
        assert_eq!(saved.chore_items, vec!["hat".to_string()]);
        assert_eq!(saved.chore_coins, 2);

        game.close_shop().unwrap();
        assert_eq!(game.phase(), ChorePhase::Playing);
    }

    #[test]
    fn test_progress_carries_over_sessions() {
        let mut first = started(PlayerProgress::default());
        do_all_chores(&mut first);
        let saved = first.take_dirty_progress().unwrap();

        let mut second = started(saved);
        do_all_chores(&mut second);
        assert_eq!(second.progress().chore_level, 3);
        assert_eq!(second.progress().chore_coins, 48);
        assert_eq!(second.progress().kid_zone_progress[CHORE_ADVENTURE_KEY], 40);
    }
}
