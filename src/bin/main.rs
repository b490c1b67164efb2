use financial_literacy_arcade::{
    config::ArcadeConfig,
    currency::{CurrencyConverter, HttpRateSource},
    games::{
        chore_adventure::{ChoreEvent, ChorePhase, CHORES},
        treasure_hunt::{AnswerOutcome, KeyOutcome, RoundOutcome},
        ChoreAdventure, HuntConfig, TreasureHunt,
    },
    models::{Direction, GameKey, Position},
    progress::{InMemoryProgressStore, ProgressStore},
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const MAX_MOVES: usize = 600;

/// Step toward `target` along the wider axis, falling back to the other one.
fn directions_toward(from: Position, to: Position) -> [Direction; 2] {
    let horizontal = if to.x > from.x { Direction::Right } else { Direction::Left };
    let vertical = if to.y > from.y { Direction::Down } else { Direction::Up };
    if (to.x - from.x).abs() >= (to.y - from.y).abs() {
        [horizontal, vertical]
    } else {
        [vertical, horizontal]
    }
}

fn play_treasure_hunt(seed: u64) -> Result<RoundOutcome, Box<dyn std::error::Error>> {
    let mut game = TreasureHunt::new(HuntConfig::default(), seed);
    info!(seed, target = game.target().name, price = game.target().price, "Treasure hunt started");

    for _ in 0..MAX_MOVES {
        if game.outcome() != RoundOutcome::InProgress {
            break;
        }
        let Some(goal) = game
            .collectibles()
            .iter()
            .filter(|c| !c.collected)
            .min_by(|a, b| {
                game.player()
                    .distance(&a.position)
                    .total_cmp(&game.player().distance(&b.position))
            })
            .map(|c| c.position)
        else {
            break;
        };

        let [primary, secondary] = directions_toward(game.player(), goal);
        if game.handle_key(GameKey::Move(primary)) == KeyOutcome::Blocked
            && game.handle_key(GameKey::Move(secondary)) == KeyOutcome::Blocked
        {
            // Slide along the wall
            game.handle_key(GameKey::Move(Direction::Up));
        }
        game.tick();

        let Some((value, index)) = game.challenge().map(|c| {
            let index = c.options.iter().position(|o| o.price <= c.value).unwrap_or(0);
            (c.value, index)
        }) else {
            continue;
        };
        match game.answer(index)? {
            AnswerOutcome::Correct { inventory_total, awards, .. } => {
                println!("  picked up {} (total {})", value, inventory_total);
                for award in awards {
                    println!("  🏅 {} (+{} stars)", award.badge, award.stars);
                }
            }
            AnswerOutcome::Wrong { lives, .. } => println!("  wrong answer, {} lives left", lives),
        }
    }

    Ok(game.outcome())
}

async fn play_chore_adventure(
    store: &dyn ProgressStore,
    profile: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut game = ChoreAdventure::new(store.load(profile).await?);
    game.start();

    for chore in CHORES {
        for _ in 0..MAX_MOVES {
            if game.player().distance(&chore.spot) < 20.0 {
                break;
            }
            let [direction, _] = directions_toward(game.player(), chore.spot);
            game.move_player(direction);
        }
        match game.act() {
            ChoreEvent::ChoreDone { chore, coins } => println!("  {} (+{} coins)", chore, coins),
            ChoreEvent::LevelComplete { chore, bonus, level } => {
                println!("  {} and level complete! +{} bonus, now level {}", chore, bonus, level)
            }
            other => println!("  {:?}", other),
        }
        if let Some(progress) = game.take_dirty_progress() {
            store.save(profile, &progress).await?;
        }
    }

    if game.phase() == ChorePhase::Celebration {
        game.next_level()?;
    }
    game.open_shop()?;
    println!("  shop: {:?}", game.buy("hat")?);
    if let Some(progress) = game.take_dirty_progress() {
        store.save(profile, &progress).await?;
    }

    let saved = store.load(profile).await?;
    println!(
        "  saved progress: {} coins, level {}, items {:?}",
        saved.chore_coins, saved.chore_level, saved.chore_items
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Financial Literacy Arcade demo starting");
    let config = ArcadeConfig::from_env()?;

    println!("\n=== TREASURE COIN HUNT ===");
    let outcome = play_treasure_hunt(2024)?;
    println!("Round result: {:?}", outcome);

    println!("\n=== CHORE ADVENTURE ===");
    let store = InMemoryProgressStore::new();
    play_chore_adventure(&store, "demo").await?;

    println!("\n=== CURRENCY CONVERTER ===");
    let rates = HttpRateSource::new(config.rates_api_base_url.clone(), config.rates_timeout)?;
    let converter = CurrencyConverter::new(Arc::new(rates));
    for (from, to, amount) in [("INR", "USD", "1000"), ("USD", "EUR", "25.50"), ("EUR", "EUR", "10")] {
        match converter.convert(from, to, amount).await {
            Ok(result) => println!(
                "  {} {} = {} {} (rate {}, {:?})",
                amount,
                from,
                result.converted.unwrap_or_default(),
                to,
                result.quote.rate,
                result.quote.source
            ),
            Err(e) => warn!(%from, %to, error = %e, "Conversion failed"),
        }
    }

    Ok(())
}
