//! Static item catalog and buying-challenge generation

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ShopItem {
    pub name: &'static str,
    pub price: u32,
    pub emoji: &'static str,
}

impl ShopItem {
    const fn new(name: &'static str, price: u32, emoji: &'static str) -> Self {
        Self { name, price, emoji }
    }

    fn same_listing(&self, other: &ShopItem) -> bool {
        self.name == other.name && self.price == other.price
    }
}

/// Items a collectible can "buy", ordered by price.
pub const CATALOG: &[ShopItem] = &[
    ShopItem::new("Candy", 1, "🍬"),
    ShopItem::new("Cookie", 2, "🍪"),
    ShopItem::new("Banana", 3, "🍌"),
    ShopItem::new("Candy", 5, "🍭"),
    ShopItem::new("Apple", 8, "🍎"),
    ShopItem::new("Juice", 10, "🧃"),
    ShopItem::new("Ice Cream", 15, "🍦"),
    ShopItem::new("Chocolate", 20, "🍫"),
    ShopItem::new("Cake", 50, "🍰"),
    ShopItem::new("Pizza", 100, "🍕"),
];

/// Shopping goals for a treasure hunt round. The first round always uses the first entry.
pub const GOAL_ITEMS: &[ShopItem] = &[
    ShopItem::new("Cupcake", 12, "🧁"),
    ShopItem::new("Toy Car", 25, "🚗"),
    ShopItem::new("Book", 18, "📚"),
    ShopItem::new("Ball", 15, "⚽"),
];

const MAX_OPTIONS: usize = 3;
const FALLBACK_PRICE_CEILING: u32 = 5;

/// Owned copy of a catalog entry, as shown to the player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChallengeOption {
    pub name: String,
    pub price: u32,
    pub emoji: String,
}

impl From<&ShopItem> for ChallengeOption {
    fn from(item: &ShopItem) -> Self {
        Self {
            name: item.name.to_string(),
            price: item.price,
            emoji: item.emoji.to_string(),
        }
    }
}

/// Build the options shown when the player reaches a collectible worth `value`.
///
/// One randomly chosen affordable item plus up to two of the cheapest items
/// priced above `value`, deduplicated by name and price, then shuffled.
/// When nothing is affordable the cheapest fixed set is returned instead.
pub fn generate_options<R: Rng + ?Sized>(
    catalog: &[ShopItem],
    value: u32,
    rng: &mut R,
) -> Vec<ChallengeOption> {
    let affordable: Vec<&ShopItem> = catalog.iter().filter(|i| i.price <= value).collect();
    let expensive: Vec<&ShopItem> = catalog.iter().filter(|i| i.price > value).collect();

    let Some(correct) = affordable.choose(rng).copied() else {
        return catalog
            .iter()
            .filter(|i| i.price <= FALLBACK_PRICE_CEILING)
            .take(MAX_OPTIONS)
            .map(ChallengeOption::from)
            .collect();
    };

    let mut picked: Vec<&ShopItem> = vec![correct];
    for item in expensive {
        if picked.len() == MAX_OPTIONS {
            break;
        }
        if !picked.iter().any(|p| p.same_listing(item)) {
            picked.push(item);
        }
    }

    picked.shuffle(rng);
    picked.into_iter().map(ChallengeOption::from).collect()
}
