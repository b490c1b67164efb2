//! Badge rules for the treasure hunt
//!
//! The award predicates are product rules that are still being settled, so
//! each one lives behind [`BadgeRule`] and the engine takes any set of them.

use serde::{Deserialize, Serialize};

/// Snapshot of the round at the moment an item was collected.
#[derive(Debug, Clone)]
pub struct CollectionContext {
    pub collected_count: usize,
    pub inventory_total: u32,
    pub target: u32,
    pub time_left: u32,
    /// Lives lost this round, from wrong answers or timer expiry.
    pub lives_lost: u32,
}

pub trait BadgeRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Stars granted alongside the badge
    fn stars(&self) -> u32;

    fn earned(&self, ctx: &CollectionContext) -> bool;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BadgeAward {
    pub badge: String,
    pub stars: u32,
}

/// Three or more items collected without losing a life.
pub struct PerfectStreakRule;

impl BadgeRule for PerfectStreakRule {
    fn name(&self) -> &'static str {
        "Perfect Streak"
    }

    fn stars(&self) -> u32 {
        1
    }

    fn earned(&self, ctx: &CollectionContext) -> bool {
        ctx.lives_lost == 0 && ctx.collected_count >= 3
    }
}

pub struct FastThinkerRule;

impl BadgeRule for FastThinkerRule {
    fn name(&self) -> &'static str {
        "Fast Thinker"
    }

    fn stars(&self) -> u32 {
        1
    }

    fn earned(&self, ctx: &CollectionContext) -> bool {
        ctx.time_left > 45
    }
}

/// Inventory hits the shopping goal exactly, with no change left over.
pub struct SmartSaverRule;

impl BadgeRule for SmartSaverRule {
    fn name(&self) -> &'static str {
        "Smart Saver"
    }

    fn stars(&self) -> u32 {
        2
    }

    fn earned(&self, ctx: &CollectionContext) -> bool {
        ctx.inventory_total == ctx.target
    }
}

/// Holds the rules and everything awarded so far.
pub struct BadgeBook {
    rules: Vec<Box<dyn BadgeRule>>,
    earned: Vec<String>,
    stars: u32,
}

impl BadgeBook {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            earned: Vec::new(),
            stars: 0,
        }
    }

    pub fn add_rule(&mut self, rule: Box<dyn BadgeRule>) {
        self.rules.push(rule);
    }

    /// Award every badge whose rule passes and that was not earned before.
    pub fn evaluate(&mut self, ctx: &CollectionContext) -> Vec<BadgeAward> {
        let mut awards = Vec::new();

        for rule in &self.rules {
            if self.earned.iter().any(|b| b == rule.name()) || !rule.earned(ctx) {
                continue;
            }
            self.stars += rule.stars();
            self.earned.push(rule.name().to_string());
            awards.push(BadgeAward {
                badge: rule.name().to_string(),
                stars: rule.stars(),
            });
        }

        awards
    }

    pub fn badges(&self) -> &[String] {
        &self.earned
    }

    pub fn stars(&self) -> u32 {
        self.stars
    }
}

impl Default for BadgeBook {
    fn default() -> Self {
        Self::new()
    }
}

/// Badge book with the standard treasure hunt rules
pub fn create_default_badge_book() -> BadgeBook {
    let mut book = BadgeBook::new();
    book.add_rule(Box::new(PerfectStreakRule));
    book.add_rule(Box::new(FastThinkerRule));
    book.add_rule(Box::new(SmartSaverRule));
    book
}
