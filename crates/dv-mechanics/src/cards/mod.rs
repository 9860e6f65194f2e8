//! Tarot cards, decks, and hands.
//!
//! Four minor suits run from Ace (1) to King (14); the Major Arcana run
//! from The Fool (0) to The World (21). Card values drive every check in
//! a challenge, so a card is an immutable value that moves between a
//! deck's draw pile, a hand, and a discard pile.

pub mod deck;
pub mod hand;

pub use deck::{Deck, Draw};
pub use hand::Hand;

use serde::{Deserialize, Serialize};

use crate::error::{MechError, MechResult};

/// The suit of a tarot card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Suit {
    /// Swords: conflict and steel.
    Swords,
    /// Pentacles: earth and coin.
    Pentacles,
    /// Cups: water and heart.
    Cups,
    /// Wands: fire and will.
    Wands,
    /// The Major Arcana.
    Major,
}

impl Suit {
    /// The four minor suits.
    pub fn minor() -> &'static [Self] {
        &[Self::Swords, Self::Pentacles, Self::Cups, Self::Wands]
    }

    /// Rank used to break ties between equal card values.
    ///
    /// Major > Swords > Wands > Cups > Pentacles.
    pub fn precedence(self) -> u8 {
        match self {
            Self::Major => 4,
            Self::Swords => 3,
            Self::Wands => 2,
            Self::Cups => 1,
            Self::Pentacles => 0,
        }
    }

    /// Valid value range for cards of this suit.
    pub fn values(self) -> std::ops::RangeInclusive<u32> {
        match self {
            Self::Major => 0..=21,
            _ => 1..=14,
        }
    }

    /// Parse a suit from user input (`"swords"`, `"cups"`, `"major"`, …).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "swords" | "sword" => Some(Self::Swords),
            "pentacles" | "pentacle" | "coins" => Some(Self::Pentacles),
            "cups" | "cup" => Some(Self::Cups),
            "wands" | "wand" => Some(Self::Wands),
            "major" | "trump" | "trumps" => Some(Self::Major),
            _ => None,
        }
    }
}

impl std::fmt::Display for Suit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Swords => write!(f, "Swords"),
            Self::Pentacles => write!(f, "Pentacles"),
            Self::Cups => write!(f, "Cups"),
            Self::Wands => write!(f, "Wands"),
            Self::Major => write!(f, "Major Arcana"),
        }
    }
}

const RANKS: [&str; 14] = [
    "Ace", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Page",
    "Knight", "Queen", "King",
];

const TRUMPS: [&str; 22] = [
    "The Fool",
    "The Magician",
    "The High Priestess",
    "The Empress",
    "The Emperor",
    "The Hierophant",
    "The Lovers",
    "The Chariot",
    "Strength",
    "The Hermit",
    "Wheel of Fortune",
    "Justice",
    "The Hanged Man",
    "Death",
    "Temperance",
    "The Devil",
    "The Tower",
    "The Star",
    "The Moon",
    "The Sun",
    "Judgement",
    "The World",
];

/// A single tarot card.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    suit: Suit,
    value: u32,
    name: String,
}

impl Card {
    /// Create a card, rejecting values outside the suit's range.
    pub fn new(suit: Suit, value: u32) -> MechResult<Self> {
        if !suit.values().contains(&value) {
            return Err(MechError::InvalidCard { suit, value });
        }
        let name = match suit {
            Suit::Major => TRUMPS[value as usize].to_string(),
            _ => format!("{} of {suit}", RANKS[value as usize - 1]),
        };
        Ok(Self { suit, value, name })
    }

    /// The Fool, Major Arcana 0.
    pub fn fool() -> Self {
        Self {
            suit: Suit::Major,
            value: 0,
            name: TRUMPS[0].to_string(),
        }
    }

    /// The card's suit.
    pub fn suit(&self) -> Suit {
        self.suit
    }

    /// The card's face value.
    pub fn value(&self) -> u32 {
        self.value
    }

    /// The card's display name, e.g. "Seven of Swords".
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true for The Fool.
    pub fn is_fool(&self) -> bool {
        self.suit == Suit::Major && self.value == 0
    }

    /// Returns true for any Major Arcana card.
    pub fn is_major(&self) -> bool {
        self.suit == Suit::Major
    }

    /// Parse user input such as `"7 swords"`, `"swords 7"`, or `"major 0"`.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split_whitespace();
        let first = parts.next()?;
        let second = parts.next()?;
        if parts.next().is_some() {
            return None;
        }
        let (suit, value) = match first.parse::<u32>() {
            Ok(v) => (Suit::parse(second)?, v),
            Err(_) => (Suit::parse(first)?, second.parse::<u32>().ok()?),
        };
        Self::new(suit, value).ok()
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.value)
    }
}
