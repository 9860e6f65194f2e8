use colored::Colorize;
use rand::SeedableRng;
use rand::rngs::StdRng;

use dv_mechanics::{Card, Deck, Suit};

pub fn run(seed: u64, draws: usize, major: bool) -> Result<(), String> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut deck = if major {
        Deck::tarot()
    } else {
        Deck::minor_arcana()
    };
    deck.shuffle(&mut rng);

    println!(
        "  {} {}",
        "Drawing".bold(),
        format!("{draws} from {} cards (seed={seed})", deck.total()).dimmed()
    );

    for n in 1..=draws {
        let Some(draw) = deck.draw(&mut rng) else {
            println!("  {}", "(every card is in play)".dimmed());
            break;
        };
        if draw.reshuffled {
            println!("  {}", "(discards shuffled back in)".dimmed());
        }
        println!("  {n:>3}. {}", paint(&draw.card));
        // Drawn cards go straight to the discard pile, so long runs cycle.
        deck.discard(draw.card);
    }

    if deck.reshuffle_pending() {
        println!("  {}", "The Fool was drawn: the deck owes a reshuffle.".magenta());
    }
    Ok(())
}

fn paint(card: &Card) -> colored::ColoredString {
    let text = card.to_string();
    match card.suit() {
        Suit::Major => text.magenta().bold(),
        Suit::Swords => text.cyan(),
        Suit::Wands => text.red(),
        Suit::Cups => text.blue(),
        Suit::Pentacles => text.yellow(),
    }
}
