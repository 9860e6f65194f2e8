//! Cards held by a player character.

use serde::{Deserialize, Serialize};

use super::Card;

/// The cards a combatant is holding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    /// Create an empty hand.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hand holding `cards`.
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    /// Take a card into the hand.
    pub fn add(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Remove and return a matching card, if held.
    pub fn remove(&mut self, card: &Card) -> Option<Card> {
        let index = self.cards.iter().position(|c| c == card)?;
        Some(self.cards.remove(index))
    }

    /// Returns true if a matching card is held.
    pub fn contains(&self, card: &Card) -> bool {
        self.cards.contains(card)
    }

    /// The card at a position, as shown to the player.
    pub fn get(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    /// All held cards, in the order they were received.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// The highest-valued card held. Ties go to the earlier card.
    pub fn highest(&self) -> Option<&Card> {
        self.cards
            .iter()
            .rev()
            .max_by_key(|c| (c.value(), c.suit().precedence()))
    }

    /// The lowest-valued card held. Ties go to the earlier card.
    pub fn lowest(&self) -> Option<&Card> {
        self.cards
            .iter()
            .min_by_key(|c| (c.value(), c.suit().precedence()))
    }

    /// Number of cards held.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether the hand is empty.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Suit;

    fn card(suit: Suit, value: u32) -> Card {
        Card::new(suit, value).unwrap()
    }

    #[test]
    fn add_and_remove() {
        let mut hand = Hand::new();
        hand.add(card(Suit::Cups, 3));
        hand.add(card(Suit::Swords, 9));
        assert!(hand.contains(&card(Suit::Cups, 3)));
        assert_eq!(hand.remove(&card(Suit::Cups, 3)), Some(card(Suit::Cups, 3)));
        assert_eq!(hand.remove(&card(Suit::Cups, 3)), None);
        assert_eq!(hand.len(), 1);
    }

    #[test]
    fn highest_and_lowest() {
        let hand = Hand::from_cards(vec![
            card(Suit::Cups, 9),
            card(Suit::Wands, 2),
            card(Suit::Swords, 9),
        ]);
        assert_eq!(hand.highest(), Some(&card(Suit::Swords, 9)));
        assert_eq!(hand.lowest(), Some(&card(Suit::Wands, 2)));
        assert!(Hand::new().highest().is_none());
    }
}
