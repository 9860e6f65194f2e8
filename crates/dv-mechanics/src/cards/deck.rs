//! Draw piles, discard piles, and reshuffling.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::{Card, Suit};

/// The result of drawing a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draw {
    /// The card drawn.
    pub card: Card,
    /// True if the discard pile had to be shuffled back in first.
    pub reshuffled: bool,
}

/// A deck of cards with a draw pile and a discard pile.
///
/// Cards that have been drawn and not yet discarded are counted as in
/// play, so `remaining + discarded + in_play` never changes unless a card
/// from outside the deck is discarded into it.
///
/// Drawing The Fool does not reshuffle by itself; it raises a pending flag
/// that the owner settles with [`Deck::settle_fool`] at a point of its
/// choosing (the challenge controller does so at the end of a round).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Deck {
    draw_pile: Vec<Card>,
    discard_pile: Vec<Card>,
    in_play: usize,
    reshuffle_pending: bool,
    reshuffles: u32,
}

impl Deck {
    /// Create a deck whose draw pile is `cards`, the last card on top.
    pub fn new(cards: Vec<Card>) -> Self {
        Self {
            draw_pile: cards,
            ..Self::default()
        }
    }

    /// Create a deck that deals `cards` in the given order, first card first.
    pub fn stacked(mut cards: Vec<Card>) -> Self {
        cards.reverse();
        Self::new(cards)
    }

    /// The 56 minor arcana, unshuffled.
    pub fn minor_arcana() -> Self {
        let cards = Suit::minor()
            .iter()
            .flat_map(|&suit| suit.values().filter_map(move |v| Card::new(suit, v).ok()))
            .collect();
        Self::new(cards)
    }

    /// The full 78-card tarot, unshuffled.
    pub fn tarot() -> Self {
        let mut deck = Self::minor_arcana();
        deck.draw_pile.extend(
            Suit::Major
                .values()
                .filter_map(|v| Card::new(Suit::Major, v).ok()),
        );
        deck
    }

    /// Shuffle the draw pile.
    pub fn shuffle(&mut self, rng: &mut StdRng) {
        self.draw_pile.shuffle(rng);
    }

    /// Draw the top card, folding the discard pile back in if the draw pile
    /// is empty. Returns `None` only when every card is in play.
    pub fn draw(&mut self, rng: &mut StdRng) -> Option<Draw> {
        let mut reshuffled = false;
        if self.draw_pile.is_empty() {
            if self.discard_pile.is_empty() {
                return None;
            }
            self.fold_discards(rng);
            reshuffled = true;
        }

        let card = self.draw_pile.pop()?;
        self.in_play += 1;
        if card.is_fool() {
            tracing::debug!("the Fool was drawn; reshuffle pending");
            self.reshuffle_pending = true;
        }
        Some(Draw { card, reshuffled })
    }

    /// Put a card on the discard pile.
    pub fn discard(&mut self, card: Card) {
        self.in_play = self.in_play.saturating_sub(1);
        self.discard_pile.push(card);
    }

    /// Shuffle the discard pile back into the draw pile.
    pub fn fold_discards(&mut self, rng: &mut StdRng) {
        self.draw_pile.append(&mut self.discard_pile);
        self.draw_pile.shuffle(rng);
        self.reshuffle_pending = false;
        self.reshuffles += 1;
    }

    /// Perform the reshuffle owed for drawing The Fool, if any.
    /// Returns true if a reshuffle happened.
    pub fn settle_fool(&mut self, rng: &mut StdRng) -> bool {
        if !self.reshuffle_pending {
            return false;
        }
        self.fold_discards(rng);
        true
    }

    /// The card that would be drawn next.
    pub fn peek(&self) -> Option<&Card> {
        self.draw_pile.last()
    }

    /// Cards left in the draw pile.
    pub fn remaining(&self) -> usize {
        self.draw_pile.len()
    }

    /// Cards in the discard pile.
    pub fn discarded(&self) -> usize {
        self.discard_pile.len()
    }

    /// Cards drawn and not yet discarded.
    pub fn in_play(&self) -> usize {
        self.in_play
    }

    /// Every card the deck accounts for.
    pub fn total(&self) -> usize {
        self.remaining() + self.discarded() + self.in_play
    }

    /// Whether The Fool has been drawn since the last reshuffle.
    pub fn reshuffle_pending(&self) -> bool {
        self.reshuffle_pending
    }

    /// How many times the discard pile has been folded back in.
    pub fn reshuffles(&self) -> u32 {
        self.reshuffles
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn card(suit: Suit, value: u32) -> Card {
        Card::new(suit, value).unwrap()
    }

    #[test]
    fn standard_sizes() {
        assert_eq!(Deck::minor_arcana().remaining(), 56);
        assert_eq!(Deck::tarot().remaining(), 78);
    }

    #[test]
    fn stacked_deals_in_order() {
        let mut rng = rng();
        let mut deck = Deck::stacked(vec![card(Suit::Cups, 5), card(Suit::Swords, 9)]);
        assert_eq!(deck.peek(), Some(&card(Suit::Cups, 5)));
        assert_eq!(deck.draw(&mut rng).unwrap().card, card(Suit::Cups, 5));
        assert_eq!(deck.draw(&mut rng).unwrap().card, card(Suit::Swords, 9));
        assert!(deck.draw(&mut rng).is_none());
    }

    #[test]
    fn empty_draw_pile_reshuffles_discards() {
        let mut rng = rng();
        let mut deck = Deck::stacked(vec![card(Suit::Wands, 3)]);
        let first = deck.draw(&mut rng).unwrap();
        assert!(!first.reshuffled);
        deck.discard(first.card);

        let again = deck.draw(&mut rng).unwrap();
        assert!(again.reshuffled);
        assert_eq!(again.card, card(Suit::Wands, 3));
        assert_eq!(deck.reshuffles(), 1);
    }

    #[test]
    fn fool_defers_reshuffle_until_settled() {
        let mut rng = rng();
        let mut deck = Deck::stacked(vec![card(Suit::Cups, 2), Card::fool(), card(Suit::Cups, 4)]);
        let two = deck.draw(&mut rng).unwrap().card;
        deck.discard(two);
        assert!(!deck.reshuffle_pending());

        let fool = deck.draw(&mut rng).unwrap().card;
        assert!(fool.is_fool());
        assert!(deck.reshuffle_pending());
        assert_eq!(deck.discarded(), 1);

        assert!(deck.settle_fool(&mut rng));
        assert!(!deck.reshuffle_pending());
        assert_eq!(deck.discarded(), 0);
        assert_eq!(deck.remaining(), 2);
        assert!(!deck.settle_fool(&mut rng));
    }

    #[test]
    fn shuffle_is_deterministic_per_seed() {
        let mut a = Deck::tarot();
        let mut b = Deck::tarot();
        a.shuffle(&mut StdRng::seed_from_u64(7));
        b.shuffle(&mut StdRng::seed_from_u64(7));
        assert_eq!(a.peek(), b.peek());
    }

    proptest::proptest! {
        #[test]
        fn cards_are_conserved(ops in proptest::collection::vec(proptest::bool::ANY, 0..200), seed in 0u64..1000) {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut deck = Deck::tarot();
            deck.shuffle(&mut rng);
            let mut hand = Vec::new();
            for draw in ops {
                if draw {
                    if let Some(d) = deck.draw(&mut rng) {
                        hand.push(d.card);
                    }
                } else if let Some(c) = hand.pop() {
                    deck.discard(c);
                }
                deck.settle_fool(&mut rng);
                proptest::prop_assert_eq!(deck.total(), 78);
                proptest::prop_assert_eq!(deck.in_play(), hand.len());
            }
        }
    }
}
